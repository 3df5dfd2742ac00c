//! Responsible for transforming the `AppState` into a `UiState` view model.
//!
//! The scan result and the user's selection live together in
//! `FileListViewModel`: one flag per scanned file, index-aligned with it.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::state::AppState;
use crate::core::ScanResult;

/// A scan result plus a parallel selection flag per file.
#[derive(Debug, Clone)]
pub struct FileListViewModel {
    scan: ScanResult,
    labels: Vec<String>,
    selected: Vec<bool>,
}

impl FileListViewModel {
    /// Wraps `scan` with nothing selected.
    pub fn new(scan: ScanResult) -> Self {
        let labels = scan.labels();
        let selected = vec![false; scan.len()];
        Self {
            scan,
            labels,
            selected,
        }
    }

    pub fn scan(&self) -> &ScanResult {
        &self.scan
    }

    pub fn root(&self) -> &Path {
        self.scan.root()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    /// Flips one file's flag. Returns `false` if `index` is out of range.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self.selected.get_mut(index) {
            Some(flag) => {
                *flag = !*flag;
                true
            }
            None => false,
        }
    }

    pub fn set_all(&mut self, value: bool) {
        self.selected.iter_mut().for_each(|flag| *flag = value);
    }

    pub fn invert(&mut self) {
        self.selected.iter_mut().for_each(|flag| *flag = !*flag);
    }

    /// Selects every file whose label equals one of `labels`, or lies under one
    /// of them taken as a directory. Returns how many files matched.
    pub fn select_labels<S: AsRef<str>>(&mut self, labels: &[S]) -> usize {
        let wanted: Vec<String> = labels
            .iter()
            .filter_map(|label| normalize_label(label.as_ref()))
            .collect();

        let mut matched = 0;
        for (label, flag) in self.labels.iter().zip(self.selected.iter_mut()) {
            if wanted.iter().any(|w| label_matches(label, w)) {
                *flag = true;
                matched += 1;
            }
        }
        matched
    }

    /// True only for a non-empty list with every file selected.
    pub fn all_selected(&self) -> bool {
        !self.selected.is_empty() && self.selected.iter().all(|flag| *flag)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|flag| **flag).count()
    }

    /// The selected files in scan order.
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        self.scan
            .files()
            .iter()
            .zip(&self.selected)
            .filter(|(_, selected)| **selected)
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn entries(&self) -> Vec<FileEntry> {
        self.scan
            .files()
            .iter()
            .zip(&self.labels)
            .zip(&self.selected)
            .map(|((path, label), selected)| FileEntry {
                label: label.clone(),
                path: path.clone(),
                selected: *selected,
            })
            .collect()
    }
}

/// Accepts `./src/`, `src\\main.rs` and similar spellings of a label.
fn normalize_label(label: &str) -> Option<String> {
    let label = label.trim().replace('\\', "/");
    let label = label.trim_start_matches("./").trim_end_matches('/');
    if label.is_empty() || label == "." {
        None
    } else {
        Some(label.to_string())
    }
}

fn label_matches(label: &str, wanted: &str) -> bool {
    label == wanted
        || label
            .strip_prefix(wanted)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// A serializable representation of the session for the front-end.
#[derive(Serialize, Clone, Debug)]
pub struct UiState {
    pub current_path: String,
    pub files: Vec<FileEntry>,
    pub total_files: usize,
    pub selected_files_count: usize,
    /// Drives a "select all" checkbox.
    pub all_selected: bool,
    pub is_scanning: bool,
    pub is_exporting: bool,
    pub status_message: String,
}

/// One row of the file list.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the scan root, `/`-separated.
    pub label: String,
    pub path: PathBuf,
    pub selected: bool,
}

/// Creates the complete `UiState` from the current `AppState`.
pub fn generate_ui_state(state: &AppState) -> UiState {
    let (files, selected_files_count, all_selected) = match &state.file_list {
        Some(list) if !state.is_scanning => {
            (list.entries(), list.selected_count(), list.all_selected())
        }
        _ => (Vec::new(), 0, false),
    };

    UiState {
        current_path: state
            .current_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        total_files: files.len(),
        files,
        selected_files_count,
        all_selected,
        is_scanning: state.is_scanning,
        is_exporting: state.is_exporting,
        status_message: state.status_message.clone(),
    }
}
