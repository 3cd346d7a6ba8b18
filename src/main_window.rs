use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use url::Url;

use crate::{
    error::DesktopResult, BackendState, APP_DISPLAY_NAME, MAIN_WINDOW_LABEL, PLACEHOLDER_PAGE,
    WINDOW_HEIGHT, WINDOW_MIN_HEIGHT, WINDOW_MIN_WIDTH, WINDOW_WIDTH,
};

/// What closing the main window does on this platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClosePolicy {
    HideWindow,
    Quit,
}

pub(crate) fn close_policy_for(target_os: &str) -> ClosePolicy {
    if target_os == "macos" {
        ClosePolicy::HideWindow
    } else {
        ClosePolicy::Quit
    }
}

pub(crate) fn current_close_policy() -> ClosePolicy {
    close_policy_for(std::env::consts::OS)
}

/// Creates the main window showing the bundled placeholder. It stays hidden
/// until the placeholder has finished loading.
pub(crate) fn create_main_window(app_handle: &AppHandle) -> DesktopResult<WebviewWindow> {
    if let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) {
        return Ok(window);
    }

    let window = WebviewWindowBuilder::new(
        app_handle,
        MAIN_WINDOW_LABEL,
        WebviewUrl::App(PLACEHOLDER_PAGE.into()),
    )
    .title(APP_DISPLAY_NAME)
    .inner_size(WINDOW_WIDTH, WINDOW_HEIGHT)
    .min_inner_size(WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT)
    .center()
    .visible(false)
    .build()?;
    Ok(window)
}

pub(crate) fn is_placeholder_url(url: &Url) -> bool {
    url.path().trim_start_matches('/') == PLACEHOLDER_PAGE
}

pub(crate) fn show_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("show_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.unminimize() {
        log(&format!("failed to unminimize main window: {error}"));
    }
    if let Err(error) = window.show() {
        log(&format!("failed to show main window: {error}"));
    }
    if let Err(error) = window.set_focus() {
        log(&format!("failed to focus main window: {error}"));
    }
}

pub(crate) fn hide_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("hide_main_window skipped: main window not found");
        return;
    };

    if let Err(error) = window.hide() {
        log(&format!("failed to hide main window: {error}"));
    }
}

pub(crate) fn reload_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("reload skipped: main window not found");
        return;
    };

    if let Err(error) = window.eval("window.location.reload();") {
        log(&format!("failed to reload main window: {error}"));
    }
}

/// Points the main window at the backend. History restarts from the
/// backend root.
pub(crate) fn navigate_main_window_to_backend(app_handle: &AppHandle) -> Result<(), String> {
    let window = app_handle
        .get_webview_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| "main window not found".to_string())?;
    let state = app_handle.state::<BackendState>();
    let url = state
        .endpoint
        .parsed_url()
        .map_err(|error| format!("Invalid backend URL {}: {error}", state.server_url()))?;

    state.with_navigation(|history| history.reset());
    window
        .navigate(url)
        .map_err(|error| format!("Failed to navigate main window: {error}"))?;
    window
        .show()
        .map_err(|error| format!("Failed to show main window: {error}"))
}
