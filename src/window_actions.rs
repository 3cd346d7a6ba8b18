use tauri::{AppHandle, Manager};

use crate::{
    append_shutdown_log,
    main_window::{self, ClosePolicy},
    BackendState, MAIN_WINDOW_LABEL,
};

pub fn show_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    main_window::show_main_window(app_handle, &log);
}

pub fn reload_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    main_window::reload_main_window(app_handle, log);
}

/// Issues a history back step in the main window. Returns false when the
/// history has nothing to go back to or the script could not run. The
/// cursor moves when the previous entry reports its key.
pub fn go_back_main_window<F>(app_handle: &AppHandle, log: F) -> bool
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("go back skipped: main window not found");
        return false;
    };

    let state = app_handle.state::<BackendState>();
    if !state.with_navigation(|history| history.can_go_back()) {
        return false;
    }

    match window.eval("window.history.back();") {
        Ok(()) => true,
        Err(error) => {
            log(&format!("failed to navigate back: {error}"));
            false
        }
    }
}

/// Applies the platform close policy. Returns true when the close must be
/// prevented.
pub fn handle_close_requested<F>(app_handle: &AppHandle, log: F) -> bool
where
    F: Fn(&str),
{
    let state = app_handle.state::<BackendState>();
    if state.is_quitting() {
        return false;
    }

    match main_window::current_close_policy() {
        ClosePolicy::HideWindow => {
            main_window::hide_main_window(app_handle, log);
            true
        }
        ClosePolicy::Quit => {
            state.mark_quitting();
            append_shutdown_log("main window closed, exiting desktop process");
            false
        }
    }
}
