//! The ignore-rule engine shared by the scanner and the tree generator.
//!
//! Rules come from two sources that are only ever unioned: the built-in denylists
//! below and a deliberately small subset of the root `.gitignore` syntax
//! (`dir/`, `*.ext`, exact names).

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::CoreError;

/// Directory names that are never descended into.
pub const SKIP_DIRS: &[&str] = &[
    ".git", ".svn", ".hg", ".idea", ".vscode", ".cache",
    "__pycache__", "venv", ".venv", "env", ".mypy_cache", ".pytest_cache",
    ".tox", ".ruff_cache",
    "node_modules", ".yarn", ".pnp", ".pnpm-store", ".parcel-cache",
    "dist", "build", "coverage", ".next", ".nuxt", ".svelte-kit", ".angular", "out",
    "target", ".gradle", ".cxx", ".cargo", "vendor", "Pods", ".bundle", ".swiftpm",
    ".build", "Packages", ".sass-cache", ".nyc_output",
    ".godot", "shader_cache",
];

/// Exact file names that are never listed.
pub const SKIP_FILE_NAMES: &[&str] = &[
    ".DS_Store", "Thumbs.db", "desktop.ini", ".gitignore", ".pnp.cjs",
    "package-lock.json", "yarn.lock", "pnpm-lock.yaml",
    "Pipfile.lock", "poetry.lock", "composer.lock",
    "Cargo.lock", "Podfile.lock", "Gemfile.lock",
];

/// Lower-cased extensions, leading dot included, that are never listed.
pub const SKIP_EXTENSIONS: &[&str] = &[
    ".pyc", ".pyo", ".class", ".o", ".obj", ".dll", ".so", ".dylib",
    ".exe", ".log", ".tmp", ".bak", ".swp", ".swo",
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".ico",
    ".zip", ".tar", ".gz", ".bz2", ".7z", ".mp4", ".mov",
    ".avi", ".mp3", ".wav", ".cfg", ".import", ".translation",
    ".svg", ".tiff", ".bmp", ".blend", ".fbx", ".stl",
    ".dae", ".lock", ".orig", ".rej", ".psd", ".pdf", ".doc",
    ".docx", ".ppt", ".pptx", ".xls", ".xlsx", ".epub", ".mobi",
    ".rtf", ".odt", ".ods", ".odp",
];

const GITIGNORE_FILE: &str = ".gitignore";

/// Rules parsed from a root `.gitignore`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitignoreRules {
    /// Directory names from `name/` lines.
    pub dirs: HashSet<String>,
    /// Exact names, plus `.ext` for every `*.ext` line.
    pub names: HashSet<String>,
}

impl GitignoreRules {
    /// Parses `.gitignore` text into the supported rule vocabulary.
    ///
    /// Anything that is not `dir/` or `*.ext` degrades to an exact-name rule, so
    /// `!keep.txt` or `src/*.rs` simply never match a real file name.
    pub fn parse(content: &str) -> Self {
        let mut rules = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix('/').unwrap_or(line);

            if let Some(dir) = line.strip_suffix('/') {
                let dir = dir.trim_end_matches('/');
                if !dir.is_empty() {
                    rules.dirs.insert(dir.to_string());
                }
                continue;
            }

            if let Some(ext) = line.strip_prefix('*') {
                if ext.starts_with('.') {
                    rules.names.insert(ext.to_string());
                    continue;
                }
            }

            if !line.is_empty() {
                rules.names.insert(line.to_string());
            }
        }

        rules
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.names.is_empty()
    }
}

/// Reads `.gitignore` directly under `root`.
///
/// A missing file yields empty rules. A file that exists but cannot be read is
/// logged and also yields empty rules; it never aborts a scan.
pub fn load_gitignore(root: &Path) -> GitignoreRules {
    let path = root.join(GITIGNORE_FILE);

    match fs::read_to_string(&path) {
        Ok(content) => {
            let rules = GitignoreRules::parse(&content);
            tracing::debug!(
                "Loaded {} directory and {} name rules from {}",
                rules.dirs.len(),
                rules.names.len(),
                path.display()
            );
            rules
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => GitignoreRules::default(),
        Err(e) => {
            let err = CoreError::GitignoreUnreadable(e, path);
            tracing::debug!("{}. Continuing without .gitignore rules.", err);
            GitignoreRules::default()
        }
    }
}

/// Additional rules merged into the built-in denylists.
///
/// Extensions may be given with or without the leading dot and are matched
/// case-insensitively like the built-in ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExtraIgnore {
    #[serde(default)]
    pub dirs: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// The complete, immutable rule set for one scan.
#[derive(Debug, Clone)]
pub struct IgnoreRuleSet {
    skip_dirs: HashSet<String>,
    skip_file_names: HashSet<String>,
    skip_extensions: HashSet<String>,
    gitignore: GitignoreRules,
}

impl Default for IgnoreRuleSet {
    fn default() -> Self {
        Self::with_gitignore(GitignoreRules::default())
    }
}

impl IgnoreRuleSet {
    /// Built-in denylists plus the given `.gitignore` rules.
    pub fn with_gitignore(gitignore: GitignoreRules) -> Self {
        Self {
            skip_dirs: SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            skip_file_names: SKIP_FILE_NAMES.iter().map(|s| s.to_string()).collect(),
            skip_extensions: SKIP_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            gitignore,
        }
    }

    /// Builds the rule set for a scan of `root`, re-reading its `.gitignore`.
    pub fn for_root(root: &Path) -> Self {
        Self::with_gitignore(load_gitignore(root))
    }

    /// Unions `extra` into the built-in lists.
    pub fn with_extra(mut self, extra: &ExtraIgnore) -> Self {
        self.skip_dirs.extend(extra.dirs.iter().cloned());
        self.skip_file_names.extend(extra.names.iter().cloned());
        self.skip_extensions.extend(extra.extensions.iter().map(|ext| {
            let ext = ext.to_lowercase();
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{ext}")
            }
        }));
        self
    }

    pub fn gitignore(&self) -> &GitignoreRules {
        &self.gitignore
    }

    /// Whether a directory with this single-segment `name` must not be descended into.
    pub fn should_prune_directory(&self, name: &str) -> bool {
        should_prune_directory(&self.skip_dirs, name, &self.gitignore.dirs)
    }

    /// Whether a file is excluded. Looks at the name only; never touches the file.
    pub fn should_skip_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return true;
        };

        if self.skip_file_names.contains(name.as_ref())
            || self.gitignore.names.contains(name.as_ref())
        {
            return true;
        }

        match dotted_extension(path) {
            Some(ext) => {
                self.skip_extensions.contains(&ext.to_lowercase())
                    || self.gitignore.names.contains(&ext)
            }
            None => false,
        }
    }

    /// Whether any component of `relative` names a pruned directory.
    ///
    /// The walker never descends into such directories, so this only fires when a
    /// path reached the result some other way.
    pub fn is_inside_pruned_directory(&self, relative: &Path) -> bool {
        let Some(parent) = relative.parent() else {
            return false;
        };
        parent
            .components()
            .any(|c| self.should_prune_directory(&c.as_os_str().to_string_lossy()))
    }
}

/// True if `name` is in `skip_dirs` or in the `.gitignore` directory rules.
pub fn should_prune_directory(
    skip_dirs: &HashSet<String>,
    name: &str,
    gitignore_dirs: &HashSet<String>,
) -> bool {
    skip_dirs.contains(name) || gitignore_dirs.contains(name)
}

/// The extension of `path` with its leading dot, as written on disk.
fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

/// Convenience used by tests and callers holding only a path.
pub fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
