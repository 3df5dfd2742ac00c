//! Defines the central, mutable state of one session.

use crate::config::AppConfig;
use crate::core::ExportReport;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::view_model::FileListViewModel;

/// Holds the complete, mutable state of a session.
///
/// Wrapped in an `Arc<Mutex<...>>` so the front-end, command handlers and
/// background tasks can share it.
pub struct AppState {
    /// The session configuration.
    pub config: AppConfig,
    /// The folder currently loaded, or being scanned.
    pub current_path: Option<PathBuf>,
    /// The last completed scan and its selection state.
    pub file_list: Option<FileListViewModel>,
    /// `true` while a scan task is running.
    pub is_scanning: bool,
    /// `true` while an export task is running.
    pub is_exporting: bool,
    /// A one-line, human-readable status.
    pub status_message: String,
    /// Handle of the running scan task, allowing it to be aborted.
    pub scan_task: Option<JoinHandle<()>>,
    /// Flag checked by the walker before each directory.
    pub scan_cancellation_flag: Arc<AtomicBool>,
    /// Incremented whenever a scan starts or is cancelled. A finishing scan whose
    /// generation no longer matches is stale and its result is dropped.
    pub scan_generation: u64,
    /// Handle of the running export task.
    pub export_task: Option<JoinHandle<()>>,
    /// The most recent successful export.
    pub last_export: Option<ExportReport>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            current_path: None,
            file_list: None,
            is_scanning: false,
            is_exporting: false,
            status_message: "Ready.".to_string(),
            scan_task: None,
            scan_cancellation_flag: Arc::new(AtomicBool::new(false)),
            scan_generation: 0,
            export_task: None,
            last_export: None,
        }
    }

    /// Prepares a new scan of `path`, superseding any scan in flight.
    ///
    /// Returns the generation and the cancellation flag the new scan must use.
    pub fn begin_scan(&mut self, path: PathBuf) -> (u64, Arc<AtomicBool>) {
        self.cancel_current_scan();

        self.scan_generation += 1;
        self.scan_cancellation_flag = Arc::new(AtomicBool::new(false));
        self.current_path = Some(path);
        self.file_list = None;
        self.is_scanning = true;
        self.status_message = "Scanning...".to_string();

        (self.scan_generation, self.scan_cancellation_flag.clone())
    }

    /// Cancels the current scan task, if any, and resets the scanning state.
    pub fn cancel_current_scan(&mut self) {
        if let Some(handle) = self.scan_task.take() {
            tracing::info!("Cancelling scan generation {}", self.scan_generation);
            // Aborting the task does not stop its blocking walk; the flag does.
            self.scan_cancellation_flag.store(true, Ordering::SeqCst);
            handle.abort();
            self.scan_generation += 1;
            self.is_scanning = false;
            self.status_message = "Scan cancelled.".to_string();
        }
    }

    /// Whether a finishing scan with `generation` is still the current one.
    pub fn is_current_scan(&self, generation: u64) -> bool {
        self.is_scanning && self.scan_generation == generation
    }

    /// Resets all state related to a loaded directory.
    pub fn reset_directory_state(&mut self) {
        self.cancel_current_scan();
        if let Some(handle) = self.export_task.take() {
            handle.abort();
        }

        self.current_path = None;
        self.file_list = None;
        self.is_scanning = false;
        self.is_exporting = false;
        self.last_export = None;
        self.status_message = "Ready.".to_string();
    }
}
