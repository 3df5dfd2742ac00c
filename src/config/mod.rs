use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::ExtraIgnore;

const DEFAULT_OUTPUT_FILENAME: &str = "project_export.txt";

/// Session settings. Built from defaults and command-line overrides; never
/// written to disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Directory the export is written into.
    pub output_directory: PathBuf,
    pub output_filename: String,
    /// Rules added on top of the built-in denylists for every scan.
    #[serde(default)]
    pub extra_ignore: ExtraIgnore,
}

impl AppConfig {
    /// Full path of the export file.
    pub fn output_path(&self) -> PathBuf {
        self.output_directory.join(&self.output_filename)
    }

    /// Points the export at `path`, splitting it into directory and filename.
    /// A bare filename keeps the current directory.
    pub fn set_output_path(&mut self, path: &Path) {
        if let Some(name) = path.file_name() {
            self.output_filename = name.to_string_lossy().to_string();
        }
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                self.output_directory = parent.to_path_buf();
            }
            _ => self.output_directory = PathBuf::from("."),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            extra_ignore: ExtraIgnore::default(),
        }
    }
}

/// The user's Downloads directory, falling back to home and then the working directory.
pub fn default_output_directory() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_uses_default_filename() {
        let config = AppConfig::default();
        assert_eq!(
            config.output_path().file_name().unwrap(),
            "project_export.txt"
        );
    }

    #[test]
    fn test_set_output_path_splits_directory_and_name() {
        let mut config = AppConfig::default();
        config.set_output_path(Path::new("/tmp/exports/context.txt"));
        assert_eq!(config.output_directory, PathBuf::from("/tmp/exports"));
        assert_eq!(config.output_filename, "context.txt");
        assert_eq!(config.output_path(), PathBuf::from("/tmp/exports/context.txt"));
    }

    #[test]
    fn test_set_output_path_bare_filename_uses_working_directory() {
        let mut config = AppConfig::default();
        config.set_output_path(Path::new("out.txt"));
        assert_eq!(config.output_path(), PathBuf::from("./out.txt"));
    }

    #[test]
    fn test_config_round_trips_through_json_without_extras() {
        let json = r#"{"output_directory":"/x","output_filename":"y.txt"}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.extra_ignore, ExtraIgnore::default());
        assert_eq!(config.output_path(), PathBuf::from("/x/y.txt"));
    }
}
