//! Generates an ASCII representation of a directory tree.

use std::fs;
use std::path::{Path, PathBuf};

use super::scanner::{name_sort_key, resolve_root};
use super::{CoreError, ExtraIgnore, IgnoreRuleSet};

/// The immediate children of one directory, each list sorted by name.
#[derive(Debug, Default)]
struct DirListing {
    dirs: Vec<(String, PathBuf)>,
    files: Vec<(String, PathBuf)>,
}

/// Lists `dir` in one pass.
///
/// Symlinks to files count as files. Symlinks to directories are not followed and
/// dangling symlinks are dropped, matching what the scanner lists.
fn read_dir_sorted(dir: &Path) -> Result<DirListing, CoreError> {
    let entries =
        fs::read_dir(dir).map_err(|e| CoreError::DirectoryUnreadable(e, dir.to_path_buf()))?;

    let mut listing = DirListing::default();

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            listing.dirs.push((name, path));
        } else if file_type.is_file()
            || (file_type.is_symlink() && fs::metadata(&path).is_ok_and(|m| m.is_file()))
        {
            listing.files.push((name, path));
        }
    }

    listing.dirs.sort_by_cached_key(|(name, _)| name_sort_key(name));
    listing.files.sort_by_cached_key(|(name, _)| name_sort_key(name));

    Ok(listing)
}

/// A utility struct for generating an ASCII directory tree.
///
/// It walks the root itself rather than reusing a scan result, applying the same
/// rule set the scanner uses. Directories without any eligible file below them
/// are left out.
pub struct TreeGenerator;

impl TreeGenerator {
    /// Renders the tree of `root_path` under the built-in rules, the root
    /// `.gitignore` and `extra_ignore`.
    pub fn generate_for_root(
        root_path: &Path,
        extra_ignore: &ExtraIgnore,
    ) -> Result<String, CoreError> {
        let root = resolve_root(root_path)?;
        let rules = IgnoreRuleSet::for_root(&root).with_extra(extra_ignore);
        Self::generate_tree(&root, &rules)
    }

    /// Renders the tree of `root_path` under an explicit rule set.
    pub fn generate_tree(root_path: &Path, rules: &IgnoreRuleSet) -> Result<String, CoreError> {
        let root = resolve_root(root_path)?;
        let children = Self::build_children(&root, rules, true)?;

        let root_name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());

        let mut result = format!("{}/\n", root_name.trim_end_matches('/'));
        Self::render_children(&children, &mut result, "");

        Ok(result)
    }

    /// Collects the eligible children of `dir`, sorted case-insensitively with
    /// files and directories interleaved.
    ///
    /// Only a failure to list the root itself is returned as an error.
    fn build_children(
        dir: &Path,
        rules: &IgnoreRuleSet,
        is_root: bool,
    ) -> Result<Vec<TreeNode>, CoreError> {
        let listing = match read_dir_sorted(dir) {
            Ok(listing) => listing,
            Err(e) if is_root => return Err(e),
            Err(e) => {
                tracing::warn!("{}", e);
                return Ok(Vec::new());
            }
        };

        let mut nodes = Vec::new();

        for (name, path) in listing.files {
            if !rules.should_skip_file(&path) {
                nodes.push(TreeNode {
                    name,
                    is_directory: false,
                    children: Vec::new(),
                });
            }
        }

        for (name, path) in listing.dirs {
            if rules.should_prune_directory(&name) {
                continue;
            }
            let children = Self::build_children(&path, rules, false)?;
            if !children.is_empty() {
                nodes.push(TreeNode {
                    name,
                    is_directory: true,
                    children,
                });
            }
        }

        nodes.sort_by_cached_key(|node| name_sort_key(&node.name));
        Ok(nodes)
    }

    /// Renders the children of a tree node.
    fn render_children(children: &[TreeNode], result: &mut String, prefix: &str) {
        for (i, node) in children.iter().enumerate() {
            let is_last = i == children.len() - 1;

            let connector = if is_last { "└── " } else { "├── " };
            let suffix = if node.is_directory { "/" } else { "" };

            result.push_str(&format!("{prefix}{connector}{}{suffix}\n", node.name));

            if !node.children.is_empty() {
                let new_prefix = if is_last {
                    format!("{prefix}    ")
                } else {
                    format!("{prefix}│   ")
                };

                Self::render_children(&node.children, result, &new_prefix);
            }
        }
    }
}

/// A transient node used for building the ASCII tree.
#[derive(Debug, Clone)]
struct TreeNode {
    name: String,
    is_directory: bool,
    children: Vec<TreeNode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GitignoreRules;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    /// Creates `<tmp>/project` so the root line is predictable.
    fn project(files: &[&str]) -> (TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let root = dir.path().join("project");
        fs::create_dir(&root).unwrap();
        for path in files {
            let full = root.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, "x").unwrap();
        }
        (dir, root)
    }

    #[test]
    fn test_case_insensitive_order_interleaves_files_and_dirs() {
        let (_dir, root) = project(&["Zebra/z.rs", "apple.txt", "Mango.md"]);
        let tree = TreeGenerator::generate_for_root(&root, &ExtraIgnore::default()).unwrap();

        insta::assert_snapshot!(tree, @r"
        project/
        ├── apple.txt
        ├── Mango.md
        └── Zebra/
            └── z.rs
        ");
    }

    #[test]
    fn test_nested_connectors() {
        let (_dir, root) = project(&[
            "src/app/mod.rs",
            "src/main.rs",
            "README.md",
            "docs/guide.md",
        ]);
        let tree = TreeGenerator::generate_for_root(&root, &ExtraIgnore::default()).unwrap();

        insta::assert_snapshot!(tree, @r"
        project/
        ├── docs/
        │   └── guide.md
        ├── README.md
        └── src/
            ├── app/
            │   └── mod.rs
            └── main.rs
        ");
    }

    #[test]
    fn test_same_rules_as_scanner() {
        let (_dir, root) = project(&[
            "a.txt",
            "b.log",
            "build/c.txt",
            "node_modules/pkg/index.js",
            "assets/logo.png",
            "gen/out.rs",
        ]);
        fs::write(root.join(".gitignore"), "gen/\n").unwrap();

        let tree = TreeGenerator::generate_for_root(&root, &ExtraIgnore::default()).unwrap();
        assert_eq!(tree, "project/\n└── a.txt\n");
    }

    #[test]
    fn test_explicit_rule_set() {
        let (_dir, root) = project(&["keep.rs", "drop.me"]);
        let rules = IgnoreRuleSet::with_gitignore(GitignoreRules::parse("*.me\n"));
        let tree = TreeGenerator::generate_tree(&root, &rules).unwrap();
        assert_eq!(tree, "project/\n└── keep.rs\n");
    }

    #[test]
    fn test_empty_root_renders_only_root_line() {
        let (_dir, root) = project(&[]);
        let tree = TreeGenerator::generate_for_root(&root, &ExtraIgnore::default()).unwrap();
        assert_eq!(tree, "project/\n");
    }

    #[test]
    fn test_invalid_root() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = TreeGenerator::generate_for_root(&missing, &ExtraIgnore::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRoot(_)));
    }
}
