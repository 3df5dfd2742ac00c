//! Front-end independent logic: ignore rules, scanning, tree rendering and export.

pub mod error;
pub mod file_handler;
pub mod ignore;
pub mod scanner;
pub mod tree_generator;

use serde::Serialize;
use std::path::{Path, PathBuf};

pub use error::CoreError;
pub use file_handler::{ExportReport, FileHandler};
pub use ignore::{load_gitignore, ExtraIgnore, GitignoreRules, IgnoreRuleSet};
pub use scanner::{DirectoryScanner, ScanStats};
pub use tree_generator::TreeGenerator;

/// The eligible files found under a scan root, in traversal order.
///
/// Every path is absolute, lies under `root`, and named a regular file when it
/// was listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    root: PathBuf,
    files: Vec<PathBuf>,
    stats: ScanStats,
}

impl ScanResult {
    pub(crate) fn new(root: PathBuf, files: Vec<PathBuf>, stats: ScanStats) -> Self {
        Self { root, files, stats }
    }

    /// The canonical scan root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Root-relative, `/`-separated display label for every file.
    pub fn labels(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|path| display_label(&self.root, path))
            .collect()
    }
}

/// The `/`-separated path of `path` relative to `root`.
pub fn display_label(root: &Path, path: &Path) -> String {
    ignore::relative_to(root, path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
