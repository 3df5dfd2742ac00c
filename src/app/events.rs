//! Defines the events sent from the session layer to the front-end.

use super::view_model::UiState;
use crate::core::ExportReport;

/// Events sent from the background tasks and command handlers to the front-end.
#[derive(Debug)]
pub enum UserEvent {
    /// A complete state update to re-render the file list.
    StateUpdate(Box<UiState>),
    /// An error message to be displayed to the user.
    ShowError(String),
    /// An informational message, e.g. a valid folder without eligible files.
    ShowInfo(String),
    /// The rendered structure tree of the current folder.
    ShowTree(String),
    /// The export finished and was written to disk.
    ExportComplete(ExportReport),
}
