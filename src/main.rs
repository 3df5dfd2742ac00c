//! CLI entry point for file-exporter

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing_subscriber::EnvFilter;

use file_exporter::app::commands;
use file_exporter::app::events::UserEvent;
use file_exporter::app::state::AppState;
use file_exporter::app::view_model::{FileEntry, UiState};
use file_exporter::config::AppConfig;
use file_exporter::core::ExtraIgnore;

#[derive(Parser, Debug)]
#[command(name = "file-exporter")]
#[command(about = "List, select and export the source files of a folder as one text file")]
#[command(version)]
struct Args {
    /// Folder to scan. A file path scans its parent folder
    path: String,

    /// Print the structure tree of the folder instead of the file list
    #[arg(long, conflicts_with_all = ["json", "export"])]
    tree: bool,

    /// Print the file list as JSON
    #[arg(long)]
    json: bool,

    /// Export the selected files (all files unless --select or --invert is given)
    #[arg(long)]
    export: bool,

    /// Export file to write (default: project_export.txt in Downloads)
    #[arg(short, long, value_name = "FILE", requires = "export")]
    output: Option<PathBuf>,

    /// Select a file or every file below a folder, by relative path (repeatable)
    #[arg(long = "select", value_name = "LABEL")]
    select: Vec<String>,

    /// Invert the selection
    #[arg(long)]
    invert: bool,

    /// Also skip folders with this name (repeatable)
    #[arg(long = "ignore-dir", value_name = "NAME")]
    ignore_dir: Vec<String>,

    /// Also skip files with this exact name (repeatable)
    #[arg(long = "ignore-name", value_name = "NAME")]
    ignore_name: Vec<String>,

    /// Also skip files with this extension, e.g. `csv` or `.csv` (repeatable)
    #[arg(long = "ignore-ext", value_name = "EXT")]
    ignore_ext: Vec<String>,
}

impl Args {
    fn has_selection(&self) -> bool {
        !self.select.is_empty() || self.invert
    }

    fn config(&self) -> AppConfig {
        let mut config = AppConfig {
            extra_ignore: ExtraIgnore {
                dirs: self.ignore_dir.clone(),
                names: self.ignore_name.clone(),
                extensions: self.ignore_ext.clone(),
            },
            ..AppConfig::default()
        };
        if let Some(output) = &self.output {
            config.set_output_path(output);
        }
        config
    }
}

#[derive(Serialize)]
struct Listing<'a> {
    root: PathBuf,
    files: &'a [FileEntry],
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let state = Arc::new(Mutex::new(AppState::new(args.config())));
    let (tx, mut rx) = mpsc::unbounded_channel();

    commands::open_folder(&args.path, tx.clone(), state.clone());
    let (ui, failed) = wait_for_scan(&mut rx).await?;
    if failed {
        return Ok(ExitCode::FAILURE);
    }

    if args.tree {
        return print_tree(&tx, &mut rx, &state).await;
    }

    if ui.total_files == 0 && (args.export || !args.json) {
        // The empty-scan notice has already been printed. `--json` still
        // writes a listing with no files.
        return Ok(ExitCode::SUCCESS);
    }

    let ui = apply_selection(&args, &tx, &mut rx, &state).await?;

    if args.export {
        return export(&tx, &mut rx, &state).await;
    }

    if args.json {
        let root = {
            let state_guard = state.lock().map_err(|_| anyhow!("state lock poisoned"))?;
            state_guard
                .file_list
                .as_ref()
                .map(|list| list.root().to_path_buf())
                .unwrap_or_default()
        };
        let listing = Listing {
            root,
            files: &ui.files,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&listing).context("Failed to serialize file list")?
        );
    } else {
        for file in &ui.files {
            if args.has_selection() {
                let mark = if file.selected { "x" } else { " " };
                println!("[{mark}] {}", file.label);
            } else {
                println!("{}", file.label);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn next_event(rx: &mut UnboundedReceiver<UserEvent>) -> Result<UserEvent> {
    rx.recv().await.context("Event channel closed unexpectedly")
}

/// Waits for the scan to settle. Returns the final state and whether an error
/// was reported along the way.
async fn wait_for_scan(rx: &mut UnboundedReceiver<UserEvent>) -> Result<(Box<UiState>, bool)> {
    let mut failed = false;
    loop {
        match next_event(rx).await? {
            UserEvent::StateUpdate(ui) if !ui.is_scanning => return Ok((ui, failed)),
            UserEvent::ShowError(msg) => {
                eprintln!("Error: {msg}");
                failed = true;
            }
            UserEvent::ShowInfo(msg) => eprintln!("{msg}"),
            _ => {}
        }
    }
}

async fn next_state(rx: &mut UnboundedReceiver<UserEvent>) -> Result<Box<UiState>> {
    loop {
        if let UserEvent::StateUpdate(ui) = next_event(rx).await? {
            return Ok(ui);
        }
    }
}

async fn apply_selection(
    args: &Args,
    tx: &UnboundedSender<UserEvent>,
    rx: &mut UnboundedReceiver<UserEvent>,
    state: &Arc<Mutex<AppState>>,
) -> Result<Box<UiState>> {
    if !args.select.is_empty() {
        commands::select_labels(&args.select, tx.clone(), state.clone());
        let ui = next_state(rx).await?;
        if ui.selected_files_count == 0 {
            eprintln!("Warning: --select matched no files");
        }
    }
    if args.invert {
        commands::invert_selection(tx.clone(), state.clone());
        next_state(rx).await?;
    }
    if args.export && !args.has_selection() {
        commands::select_all(tx.clone(), state.clone());
        next_state(rx).await?;
    }

    commands::initialize(tx.clone(), state.clone());
    next_state(rx).await
}

async fn print_tree(
    tx: &UnboundedSender<UserEvent>,
    rx: &mut UnboundedReceiver<UserEvent>,
    state: &Arc<Mutex<AppState>>,
) -> Result<ExitCode> {
    commands::show_tree(tx.clone(), state.clone()).await;
    loop {
        match next_event(rx).await? {
            UserEvent::ShowTree(tree) => {
                print!("{tree}");
                return Ok(ExitCode::SUCCESS);
            }
            UserEvent::ShowError(msg) => {
                eprintln!("Error: {msg}");
                return Ok(ExitCode::FAILURE);
            }
            _ => {}
        }
    }
}

async fn export(
    tx: &UnboundedSender<UserEvent>,
    rx: &mut UnboundedReceiver<UserEvent>,
    state: &Arc<Mutex<AppState>>,
) -> Result<ExitCode> {
    commands::export_selection(tx.clone(), state.clone());
    loop {
        match next_event(rx).await? {
            UserEvent::ExportComplete(report) => {
                for path in &report.unreadable_files {
                    eprintln!("Warning: could not read {}", path.display());
                }
                println!(
                    "Exported {} files to {}",
                    report.files_written,
                    report.output_path.display()
                );
                return Ok(ExitCode::SUCCESS);
            }
            UserEvent::ShowError(msg) => {
                // Exports are written atomically, so a failure leaves no file behind.
                eprintln!("Error: {msg}. No export file was written.");
                return Ok(ExitCode::FAILURE);
            }
            _ => {}
        }
    }
}
