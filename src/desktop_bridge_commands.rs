use tauri::{AppHandle, Manager};

use crate::{
    append_desktop_log, navigation_history::NavigationChange, window_actions, BackendState,
};

/// Records the history entry the calling page reported, if any.
fn record_history_entry(app_handle: &AppHandle, entry: Option<&str>) {
    let Some(entry) = entry.filter(|entry| !entry.is_empty()) else {
        return;
    };

    let state = app_handle.state::<BackendState>();
    let (change, position) = state.with_navigation(|history| {
        let change = history.record_entry(entry);
        (change, history.position().unwrap_or_default())
    });
    if change == NavigationChange::Pushed {
        append_desktop_log(&format!("navigation entry {entry} pushed at {position}"));
    }
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_server_url(
    app_handle: AppHandle,
    entry: Option<String>,
) -> String {
    record_history_entry(&app_handle, entry.as_deref());
    app_handle.state::<BackendState>().server_url()
}

#[tauri::command]
pub(crate) fn desktop_bridge_go_back(app_handle: AppHandle, entry: Option<String>) -> bool {
    record_history_entry(&app_handle, entry.as_deref());
    window_actions::go_back_main_window(&app_handle, append_desktop_log)
}

#[tauri::command]
pub(crate) fn desktop_bridge_can_go_back(app_handle: AppHandle, entry: Option<String>) -> bool {
    record_history_entry(&app_handle, entry.as_deref());
    app_handle
        .state::<BackendState>()
        .with_navigation(|history| history.can_go_back())
}
