//! Integration tests for the file-exporter CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("project");
    fs::create_dir(&root).unwrap();
    for (path, content) in files {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    (temp_dir, root)
}

fn file_exporter() -> Command {
    let mut cmd = Command::cargo_bin("file-exporter").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}

/// Test CLI binary exists and responds to --help
#[test]
fn test_cli_help() {
    file_exporter()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--export"));
}

/// Test a missing path argument is a usage error
#[test]
fn test_missing_path_is_usage_error() {
    file_exporter()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<PATH>"));
}

#[test]
fn test_lists_eligible_files() {
    let (_tmp, root) = project(&[
        ("src/main.rs", "fn main() {}"),
        ("README.md", "# readme"),
        ("target/debug/app", ""),
        ("debug.log", ""),
    ]);

    file_exporter()
        .arg(&root)
        .assert()
        .success()
        .stdout("README.md\nsrc/main.rs\n");
}

#[test]
fn test_extra_ignore_flags() {
    let (_tmp, root) = project(&[
        ("keep.rs", ""),
        ("data.csv", ""),
        ("NOTES.md", ""),
        ("fixtures/a.rs", ""),
    ]);

    file_exporter()
        .arg(&root)
        .args(["--ignore-ext", "csv", "--ignore-name", "NOTES.md"])
        .args(["--ignore-dir", "fixtures"])
        .assert()
        .success()
        .stdout("keep.rs\n");
}

#[test]
fn test_selection_marks() {
    let (_tmp, root) = project(&[("a.rs", ""), ("src/b.rs", ""), ("src/c.rs", "")]);

    file_exporter()
        .arg(&root)
        .args(["--select", "src", "--invert"])
        .assert()
        .success()
        .stdout("[x] a.rs\n[ ] src/b.rs\n[ ] src/c.rs\n");
}

#[test]
fn test_json_listing() {
    let (_tmp, root) = project(&[("lib.rs", "")]);

    let output = file_exporter().arg(&root).arg("--json").output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["root"], canonical(&root).display().to_string());
    assert_eq!(json["files"][0]["label"], "lib.rs");
    assert_eq!(
        json["files"][0]["path"],
        canonical(&root).join("lib.rs").display().to_string()
    );
}

#[test]
fn test_tree_output() {
    let (_tmp, root) = project(&[("Zebra/z.rs", ""), ("apple.txt", ""), ("node_modules/x.js", "")]);

    file_exporter()
        .arg(&root)
        .arg("--tree")
        .assert()
        .success()
        .stdout("project/\n├── apple.txt\n└── Zebra/\n    └── z.rs\n");
}

#[test]
fn test_export_all_files() {
    let (tmp, root) = project(&[("b.rs", "fn b() {}\n"), ("a.rs", "\n fn a() {} \n")]);
    let out = tmp.path().join("exports/context.txt");

    file_exporter()
        .arg(&root)
        .arg("--export")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 files"));

    let root = canonical(&root);
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        format!(
            "{}:\nfn a() {{}}\n\n{}:\nfn b() {{}}\n\n",
            root.join("a.rs").display(),
            root.join("b.rs").display()
        )
    );
}

#[test]
fn test_export_with_unmatched_selection_fails() {
    let (tmp, root) = project(&[("a.rs", "")]);
    let out = tmp.path().join("out.txt");

    file_exporter()
        .arg(&root)
        .args(["--export", "--select", "nothing-here"])
        .arg("-o")
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No files selected for export"))
        .stderr(predicate::str::contains("No export file was written"));

    assert!(!out.exists());
}

#[test]
fn test_invalid_root_exits_with_error() {
    let tmp = TempDir::new().unwrap();

    file_exporter()
        .arg(tmp.path().join("missing"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid folder path"));
}

#[test]
fn test_empty_folder_is_not_an_error() {
    let (_tmp, root) = project(&[("only.log", "")]);

    file_exporter()
        .arg(&root)
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("No eligible files found in"))
        .stderr(predicate::str::contains("Invalid folder path").not());
}

#[test]
fn test_json_listing_of_empty_folder() {
    let (_tmp, root) = project(&[("only.log", "")]);

    let output = file_exporter().arg(&root).arg("--json").output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["root"], canonical(&root).display().to_string());
    assert_eq!(json["files"], serde_json::json!([]));
}

#[test]
fn test_bare_file_name_scans_working_directory() {
    let (_tmp, root) = project(&[("main.rs", "fn main() {}"), ("lib.rs", "")]);

    file_exporter()
        .current_dir(&root)
        .arg("main.rs")
        .assert()
        .success()
        .stdout("lib.rs\nmain.rs\n");
}
