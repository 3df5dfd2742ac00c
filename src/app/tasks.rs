//! Long-running background work: scanning, exporting and tree rendering.
//!
//! The filesystem work itself is blocking, so each task moves it onto
//! `spawn_blocking` and only touches the shared state to publish the outcome.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use super::events::UserEvent;
use super::proxy::EventProxy;
use super::state::AppState;
use super::view_model::{generate_ui_state, FileListViewModel};
use crate::core::{CoreError, DirectoryScanner, ExtraIgnore, FileHandler, TreeGenerator};

/// Starts scanning `path`, superseding any scan already in flight.
///
/// A file path is replaced by its parent directory. Anything that still is not
/// a directory is reported with `ShowError` and leaves the state untouched.
pub fn start_scan_on_path<P: EventProxy>(path: PathBuf, proxy: P, state: Arc<Mutex<AppState>>) {
    let directory_path = scan_directory_for(path);

    if !directory_path.is_dir() {
        tracing::warn!("Rejected scan of {}", directory_path.display());
        let message = format!("Invalid folder path: {}", directory_path.display());
        let mut state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        state_guard.status_message = message.clone();
        proxy.send_event(UserEvent::ShowError(message));
        proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
            &state_guard,
        ))));
        return;
    }

    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    let (generation, cancel_flag) = state_guard.begin_scan(directory_path.clone());
    let extra_ignore = state_guard.config.extra_ignore.clone();

    tracing::info!(
        "Starting scan generation {} of {}",
        generation,
        directory_path.display()
    );

    let proxy_clone = proxy.clone();
    let state_clone = state.clone();
    // The lock is held until the handle is stored, so the task cannot publish
    // its result before `scan_task` is set.
    let handle = tokio::spawn(async move {
        scan_directory_task(
            directory_path,
            extra_ignore,
            generation,
            cancel_flag,
            proxy_clone,
            state_clone,
        )
        .await;
    });
    state_guard.scan_task = Some(handle);

    proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
        &state_guard,
    ))));
}

/// The folder to scan for `path`: the path itself, or the folder containing it
/// when it names a file. A bare file name resolves to the working directory.
fn scan_directory_for(path: PathBuf) -> PathBuf {
    if !path.is_file() {
        return path;
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Runs one scan and publishes its result if it is still the current one.
async fn scan_directory_task<P: EventProxy>(
    path: PathBuf,
    extra_ignore: ExtraIgnore,
    generation: u64,
    cancel_flag: Arc<AtomicBool>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let scan_path = path.clone();
    let result = tokio::task::spawn_blocking(move || {
        DirectoryScanner::new(extra_ignore).scan_with_cancel(&scan_path, &cancel_flag)
    })
    .await
    .map_err(CoreError::from)
    .and_then(|result| result);

    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    if !state_guard.is_current_scan(generation) {
        tracing::debug!("Discarding result of stale scan generation {}", generation);
        return;
    }

    state_guard.is_scanning = false;
    state_guard.scan_task = None;

    match result {
        Ok(scan) if scan.is_empty() => {
            tracing::info!("Scan of {} found no eligible files", path.display());
            state_guard.status_message = "No eligible files found.".to_string();
            state_guard.file_list = Some(FileListViewModel::new(scan));
            proxy.send_event(UserEvent::ShowInfo(format!(
                "No eligible files found in {}",
                path.display()
            )));
        }
        Ok(scan) => {
            tracing::info!(
                "Scan of {} complete: {} files, {:?}",
                path.display(),
                scan.len(),
                scan.stats()
            );
            state_guard.status_message =
                format!("Scan complete. Found {} eligible files.", scan.len());
            state_guard.file_list = Some(FileListViewModel::new(scan));
        }
        Err(CoreError::Cancelled) => {
            state_guard.status_message = "Scan cancelled.".to_string();
        }
        Err(e) => {
            tracing::error!("Scan of {} failed: {}", path.display(), e);
            state_guard.status_message = format!("Scan failed: {e}");
            proxy.send_event(UserEvent::ShowError(e.to_string()));
        }
    }

    proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
        &state_guard,
    ))));
}

/// Writes the selected files of the current list to the configured output path.
///
/// Sends `ExportComplete` on success, `ShowError` otherwise. An empty selection
/// is an error and no file is written.
pub fn start_export<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");

    if state_guard.is_exporting {
        tracing::debug!("Export already running, ignoring request");
        return;
    }

    let selected = state_guard
        .file_list
        .as_ref()
        .map(|list| list.selected_paths())
        .unwrap_or_default();
    let output_path = state_guard.config.output_path();

    state_guard.is_exporting = true;
    state_guard.status_message = "Exporting...".to_string();
    proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
        &state_guard,
    ))));

    let proxy_clone = proxy.clone();
    let state_clone = state.clone();
    let handle = tokio::spawn(async move {
        export_task(selected, output_path, proxy_clone, state_clone).await;
    });
    state_guard.export_task = Some(handle);
}

async fn export_task<P: EventProxy>(
    selected: Vec<PathBuf>,
    output_path: PathBuf,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let result =
        tokio::task::spawn_blocking(move || FileHandler::write_export(&selected, &output_path))
            .await
            .map_err(CoreError::from)
            .and_then(|result| result);

    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    state_guard.is_exporting = false;
    state_guard.export_task = None;

    match result {
        Ok(report) => {
            state_guard.status_message = format!(
                "Exported {} files to {}",
                report.files_written,
                report.output_path.display()
            );
            state_guard.last_export = Some(report.clone());
            proxy.send_event(UserEvent::ExportComplete(report));
        }
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            state_guard.status_message = format!("Export failed: {e}");
            proxy.send_event(UserEvent::ShowError(e.to_string()));
        }
    }

    proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
        &state_guard,
    ))));
}

/// Renders the structure tree of the current folder.
///
/// The tree walks the folder again with the same rules as the scan, so it
/// does not depend on a completed scan.
pub async fn render_tree<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    let (root, extra_ignore) = {
        let state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        (
            state_guard.current_path.clone(),
            state_guard.config.extra_ignore.clone(),
        )
    };

    let Some(root) = root else {
        proxy.send_event(UserEvent::ShowError("No folder loaded.".to_string()));
        return;
    };

    let result = tokio::task::spawn_blocking(move || {
        TreeGenerator::generate_for_root(&root, &extra_ignore)
    })
    .await
    .map_err(CoreError::from)
    .and_then(|result| result);

    match result {
        Ok(tree) => proxy.send_event(UserEvent::ShowTree(tree)),
        Err(e) => {
            tracing::error!("Tree rendering failed: {}", e);
            proxy.send_event(UserEvent::ShowError(e.to_string()));
        }
    }
}
