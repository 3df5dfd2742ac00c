//! Contains the command handlers a front-end calls in response to user input.
//!
//! Each handler mutates the `AppState` and notifies the front-end with a
//! `StateUpdate`, or hands off to a background task in `tasks`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::events::UserEvent;
use super::helpers::with_state_and_notify;
use super::proxy::EventProxy;
use super::state::AppState;
use super::tasks::{self, start_scan_on_path};
use super::view_model::generate_ui_state;
use crate::utils::path_input::normalize_drop_payload;

/// Handles the initial request for state from the front-end.
pub fn initialize<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    let state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    let event = UserEvent::StateUpdate(Box::new(generate_ui_state(&state_guard)));
    proxy.send_event(event);
}

/// Starts a scan of a folder given as raw text, e.g. a drag-and-drop payload.
pub fn open_folder<P: EventProxy>(payload: &str, proxy: P, state: Arc<Mutex<AppState>>) {
    let path = normalize_drop_payload(payload);
    tracing::debug!("Opening folder from payload {:?}", payload);
    start_scan_on_path(path, proxy, state);
}

/// Clears the currently loaded folder and resets the session.
pub fn clear_directory<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        s.reset_directory_state();
    });
}

/// Scans the currently loaded folder again. Selections are not carried over.
pub fn rescan_directory<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    let current_path = {
        let state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        state_guard.current_path.clone()
    };

    if let Some(path) = current_path {
        start_scan_on_path(path, proxy, state);
    }
}

/// Cancels the ongoing folder scan.
pub fn cancel_scan<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        s.cancel_current_scan();
    });
}

/// Flips the selection of the file at `index` in the current list.
pub fn toggle_selection<P: EventProxy>(index: usize, proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        let toggled = s
            .file_list
            .as_mut()
            .is_some_and(|list| list.toggle(index));
        if !toggled {
            tracing::warn!("Ignoring toggle of unknown file index {}", index);
        }
    });
}

/// Selects every file of the current list.
pub fn select_all<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        if let Some(list) = s.file_list.as_mut() {
            list.set_all(true);
        }
    });
}

/// Deselects all files.
pub fn deselect_all<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        if let Some(list) = s.file_list.as_mut() {
            list.set_all(false);
        }
    });
}

/// Flips the selection of every file.
pub fn invert_selection<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        if let Some(list) = s.file_list.as_mut() {
            list.invert();
        }
    });
}

/// Selects files by their relative label. A label naming a directory selects
/// everything below it.
pub fn select_labels<P: EventProxy>(labels: &[String], proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        let Some(list) = s.file_list.as_mut() else {
            return;
        };
        let matched = list.select_labels(labels);
        if matched == 0 {
            tracing::warn!("No files matched the selection {:?}", labels);
        }
        s.status_message = format!("{} of {} files selected.", list.selected_count(), list.len());
    });
}

/// Changes where the next export is written.
pub fn set_output_path<P: EventProxy>(path: PathBuf, proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        s.config.set_output_path(&path);
    });
}

/// Exports the selected files of the current list.
pub fn export_selection<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    tasks::start_export(proxy, state);
}

/// Renders the structure tree of the current folder.
pub async fn show_tree<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    tasks::render_tree(proxy, state).await;
}
