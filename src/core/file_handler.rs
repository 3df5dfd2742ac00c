use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use super::CoreError;

const EMPTY_FILE_MARKER: &str = "empty file.";
const UNREADABLE_FILE_MARKER: &str = "[Could not read file]";

/// Outcome of a completed export.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    pub output_path: PathBuf,
    pub files_written: usize,
    /// Selected files whose content was replaced by the unreadable marker.
    pub unreadable_files: Vec<PathBuf>,
    pub bytes_written: u64,
}

/// Concatenates selected files into a single text export.
pub struct FileHandler;

impl FileHandler {
    /// Builds the export text for `selected_files`, in the given order.
    ///
    /// Each file becomes `"<path>:\n<content>\n\n"` with the content trimmed.
    /// Unreadable or non-UTF-8 files get a marker instead of aborting the export.
    /// Returns the text and the files that could not be read.
    pub fn concatenate(selected_files: &[PathBuf]) -> (String, Vec<PathBuf>) {
        let sections: Vec<(String, bool)> = selected_files
            .par_iter()
            .map(|path| match Self::read_file_content(path) {
                Ok(content) => {
                    let content = content.trim();
                    let body = if content.is_empty() {
                        EMPTY_FILE_MARKER
                    } else {
                        content
                    };
                    (format!("{}:\n{}\n\n", path.display(), body), true)
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    (
                        format!("{}:\n{}\n\n", path.display(), UNREADABLE_FILE_MARKER),
                        false,
                    )
                }
            })
            .collect();

        let mut content = String::new();
        let mut unreadable = Vec::new();
        for ((section, readable), path) in sections.into_iter().zip(selected_files) {
            content.push_str(&section);
            if !readable {
                unreadable.push(path.clone());
            }
        }

        (content, unreadable)
    }

    /// Writes the export for `selected_files` to `output_path`.
    ///
    /// The parent directory is created if needed, and the file is replaced
    /// atomically so a failed export never leaves a truncated file behind.
    pub fn write_export(
        selected_files: &[PathBuf],
        output_path: &Path,
    ) -> Result<ExportReport, CoreError> {
        if selected_files.is_empty() {
            return Err(CoreError::NothingSelected);
        }

        let (content, unreadable_files) = Self::concatenate(selected_files);

        let parent = match output_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| CoreError::Io(e, parent.clone()))?;

        let mut temp = tempfile::NamedTempFile::new_in(&parent)
            .map_err(|e| CoreError::Io(e, parent.clone()))?;
        let temp_path = temp.path().to_path_buf();
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| CoreError::Io(e, temp_path))?;
        temp.persist(output_path)
            .map_err(|e| CoreError::Io(e.error, output_path.to_path_buf()))?;

        tracing::info!(
            "Exported {} files ({} unreadable) to {}",
            selected_files.len(),
            unreadable_files.len(),
            output_path.display()
        );

        Ok(ExportReport {
            output_path: output_path.to_path_buf(),
            files_written: selected_files.len(),
            unreadable_files,
            bytes_written: content.len() as u64,
        })
    }

    fn read_file_content(file_path: &Path) -> Result<String, CoreError> {
        fs::read_to_string(file_path)
            .map_err(|e| CoreError::FileUnreadable(e, file_path.to_path_buf()))
    }
}
