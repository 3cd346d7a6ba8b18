use tauri::{AppHandle, Manager};

use crate::{append_shutdown_log, BackendState};

pub(crate) fn handle_exit_requested(app_handle: &AppHandle, code: Option<i32>) {
    let state = app_handle.state::<BackendState>();
    state.mark_quitting();
    append_shutdown_log(&format!(
        "exit requested (code {})",
        code.map(|code| code.to_string())
            .unwrap_or_else(|| "none".to_string())
    ));
}

/// Final hook before the process ends. Signals the backend exactly once.
pub(crate) fn handle_exit_event(app_handle: &AppHandle) {
    let state = app_handle.state::<BackendState>();
    state.stop_backend();
    append_shutdown_log("desktop process exiting");
}
