use super::ignore::relative_to;
use super::{CoreError, ExtraIgnore, IgnoreRuleSet, ScanResult};
use serde::Serialize;
use std::cmp::Ordering as CmpOrdering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::{DirEntry, WalkDir};

/// Counters collected during one scan, reported in logs and the UI status line.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub directories_visited: usize,
    pub directories_pruned: usize,
    pub directories_unreadable: usize,
    pub files_skipped: usize,
}

/// Case-insensitive name order with the exact name as tie-breaker, so the order is
/// total and does not depend on what the filesystem returned first.
pub(crate) fn name_sort_key(name: &str) -> (String, String) {
    (name.to_lowercase(), name.to_string())
}

/// Sibling order for the walk: files (and symlinks) before directories, each
/// group by name.
fn compare_entries(a: &DirEntry, b: &DirEntry) -> CmpOrdering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| {
            name_sort_key(&a.file_name().to_string_lossy())
                .cmp(&name_sort_key(&b.file_name().to_string_lossy()))
        })
}

/// Resolves `root` to a canonical directory path or fails with `InvalidRoot`.
pub(crate) fn resolve_root(root: &Path) -> Result<PathBuf, CoreError> {
    match fs::canonicalize(root) {
        Ok(resolved) if resolved.is_dir() => Ok(resolved),
        _ => Err(CoreError::InvalidRoot(root.to_path_buf())),
    }
}

/// Walks a directory tree and collects the files that survive the ignore rules.
///
/// The rule set is rebuilt from the built-in lists, the root `.gitignore` and the
/// configured extras at the start of every scan.
pub struct DirectoryScanner {
    extra_ignore: ExtraIgnore,
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new(ExtraIgnore::default())
    }
}

impl DirectoryScanner {
    pub fn new(extra_ignore: ExtraIgnore) -> Self {
        Self { extra_ignore }
    }

    /// The rule set a scan of `root` would use.
    pub fn rules_for(&self, root: &Path) -> IgnoreRuleSet {
        IgnoreRuleSet::for_root(root).with_extra(&self.extra_ignore)
    }

    pub fn scan(&self, root_path: &Path) -> Result<ScanResult, CoreError> {
        self.scan_with_cancel(root_path, &AtomicBool::new(false))
    }

    /// Scans `root_path` depth-first, checking `cancel_flag` at every entry.
    ///
    /// Within a directory, its files are collected before any subdirectory is
    /// entered. Fails only for an invalid or unreadable root, or on cancellation.
    /// Directories below the root that cannot be listed contribute nothing.
    pub fn scan_with_cancel(
        &self,
        root_path: &Path,
        cancel_flag: &AtomicBool,
    ) -> Result<ScanResult, CoreError> {
        let root = resolve_root(root_path)?;
        let rules = self.rules_for(&root);

        tracing::info!(
            "Scanning {} ({} .gitignore directory rules, {} name rules)",
            root.display(),
            rules.gitignore().dirs.len(),
            rules.gitignore().names.len()
        );

        let mut files = Vec::new();
        let mut stats = ScanStats::default();

        let mut walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by(compare_entries)
            .into_iter();

        while let Some(entry) = walker.next() {
            if cancel_flag.load(Ordering::Relaxed) {
                tracing::info!("Scan of {} cancelled", root.display());
                return Err(CoreError::Cancelled);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let io_error = e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop"));
                    let err = CoreError::DirectoryUnreadable(io_error, path.clone());
                    if path == root {
                        return Err(err);
                    }
                    tracing::warn!("{}", err);
                    stats.directories_unreadable += 1;
                    continue;
                }
            };

            let file_type = entry.file_type();

            if file_type.is_dir() {
                if entry.depth() > 0
                    && rules.should_prune_directory(&entry.file_name().to_string_lossy())
                {
                    tracing::debug!("Pruned {}", entry.path().display());
                    stats.directories_pruned += 1;
                    walker.skip_current_dir();
                } else {
                    stats.directories_visited += 1;
                }
                continue;
            }

            if file_type.is_symlink() {
                match fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_file() => {}
                    Ok(_) => {
                        tracing::debug!(
                            "Not following directory symlink {}",
                            entry.path().display()
                        );
                        continue;
                    }
                    Err(_) => {
                        tracing::debug!("Dropping dangling symlink {}", entry.path().display());
                        continue;
                    }
                }
            } else if !file_type.is_file() {
                continue;
            }

            let path = entry.into_path();
            if rules.should_skip_file(&path) {
                stats.files_skipped += 1;
                continue;
            }
            if rules.is_inside_pruned_directory(&relative_to(&root, &path)) {
                tracing::warn!(
                    "Dropping {} reached through a pruned directory",
                    path.display()
                );
                stats.files_skipped += 1;
                continue;
            }
            files.push(path);
        }

        tracing::info!(
            "Scan of {} completed: {} eligible files, {} directories visited, {} pruned, {} unreadable",
            root.display(),
            files.len(),
            stats.directories_visited,
            stats.directories_pruned,
            stats.directories_unreadable
        );

        Ok(ScanResult::new(root, files, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ignore::SKIP_DIRS;
    use crate::utils::test_helpers::{running_as_root, setup_test_logging};
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        dir
    }

    fn labels(dir: &TempDir) -> Vec<String> {
        DirectoryScanner::default().scan(dir.path()).unwrap().labels()
    }

    #[test]
    fn test_union_of_static_and_gitignore_rules() {
        setup_test_logging();
        let dir = project(&[
            ("a.txt", "a"),
            ("b.log", "b"),
            ("build/c.txt", "c"),
            (".gitignore", "*.log\n"),
        ]);

        assert_eq!(labels(&dir), vec!["a.txt"]);
    }

    #[test]
    fn test_files_come_before_subdirectories() {
        let dir = project(&[
            ("src/main.rs", ""),
            ("src/app/mod.rs", ""),
            ("zeta.md", ""),
            ("Alpha.md", ""),
            ("docs/guide.md", ""),
        ]);

        assert_eq!(
            labels(&dir),
            vec![
                "Alpha.md",
                "zeta.md",
                "docs/guide.md",
                "src/main.rs",
                "src/app/mod.rs",
            ]
        );
    }

    #[test]
    fn test_static_directories_are_pruned_at_any_depth() {
        let mut files = vec![("keep.rs", "")];
        let nested: Vec<String> = SKIP_DIRS
            .iter()
            .flat_map(|d| [format!("{d}/inner.rs"), format!("pkg/{d}/deep/inner.rs")])
            .collect();
        files.extend(nested.iter().map(|p| (p.as_str(), "")));
        let dir = project(&files);

        assert_eq!(labels(&dir), vec!["keep.rs"]);
    }

    #[test]
    fn test_gitignore_directory_rule_prunes_everywhere() {
        let dir = project(&[
            (".gitignore", "foo/\n"),
            ("foo/a.rs", ""),
            ("src/foo/b.rs", ""),
            ("src/foobar/c.rs", ""),
        ]);

        assert_eq!(labels(&dir), vec!["src/foobar/c.rs"]);
    }

    #[test]
    fn test_gitignore_extension_rule_excludes_files() {
        let dir = project(&[(".gitignore", "*.gen\n"), ("x.gen", ""), ("y.rs", "")]);
        assert_eq!(labels(&dir), vec!["y.rs"]);
    }

    #[test]
    fn test_extra_ignore_applies() {
        let dir = project(&[("fixtures/a.json", ""), ("data.csv", ""), ("b.rs", "")]);
        let scanner = DirectoryScanner::new(ExtraIgnore {
            dirs: vec!["fixtures".into()],
            names: vec![],
            extensions: vec!["csv".into()],
        });

        assert_eq!(scanner.scan(dir.path()).unwrap().labels(), vec!["b.rs"]);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let dir = project(&[("b.rs", ""), ("a/c.rs", ""), ("a/b/d.rs", "")]);
        let scanner = DirectoryScanner::default();
        assert_eq!(
            scanner.scan(dir.path()).unwrap(),
            scanner.scan(dir.path()).unwrap()
        );
    }

    #[test]
    fn test_empty_directory_is_not_an_error() {
        let dir = tempdir().unwrap();
        let result = DirectoryScanner::default().scan(dir.path()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_missing_root_is_invalid() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = DirectoryScanner::default().scan(&missing).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRoot(p) if p == missing));
    }

    #[test]
    fn test_file_root_is_invalid() {
        let dir = project(&[("file.rs", "")]);
        let err = DirectoryScanner::default()
            .scan(&dir.path().join("file.rs"))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidRoot(_)));
    }

    #[test]
    fn test_result_paths_are_absolute_and_under_root() {
        let dir = project(&[("a/b.rs", ""), ("c.rs", "")]);
        let result = DirectoryScanner::default().scan(dir.path()).unwrap();
        for path in result.files() {
            assert!(path.is_absolute());
            assert!(path.starts_with(result.root()));
            assert!(path.is_file());
        }
    }

    #[test]
    fn test_cancelled_scan_returns_error() {
        let dir = project(&[("a.rs", "")]);
        let flag = AtomicBool::new(true);
        let err = DirectoryScanner::default()
            .scan_with_cancel(dir.path(), &flag)
            .unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = project(&[("real/a.rs", ""), ("b.rs", "")]);
        symlink(dir.path().join("real"), dir.path().join("linked_dir")).unwrap();
        symlink(dir.path().join("b.rs"), dir.path().join("linked_file.rs")).unwrap();
        symlink(dir.path().join("missing.rs"), dir.path().join("dangling.rs")).unwrap();

        assert_eq!(labels(&dir), vec!["b.rs", "linked_file.rs", "real/a.rs"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        if running_as_root() {
            return;
        }

        let dir = project(&[("locked/secret.rs", ""), ("open/ok.rs", ""), ("top.rs", "")]);
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = DirectoryScanner::default().scan(dir.path());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let result = result.unwrap();
        assert_eq!(result.labels(), vec!["top.rs", "open/ok.rs"]);
        assert_eq!(result.stats().directories_unreadable, 1);
    }
}
