use tauri::{AppHandle, Manager};

use crate::{BackendState, MAIN_WINDOW_LABEL, ZOOM_DEFAULT, ZOOM_MIN, ZOOM_STEP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ZoomCommand {
    In,
    Out,
    Reset,
}

/// Page scale factor of the main window. Never drops below `ZOOM_MIN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ZoomLevel {
    factor: f64,
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self {
            factor: ZOOM_DEFAULT,
        }
    }
}

impl ZoomLevel {
    pub(crate) fn factor(self) -> f64 {
        self.factor
    }

    pub(crate) fn apply(&mut self, command: ZoomCommand) -> f64 {
        let next = match command {
            ZoomCommand::In => self.factor + ZOOM_STEP,
            ZoomCommand::Out => self.factor - ZOOM_STEP,
            ZoomCommand::Reset => ZOOM_DEFAULT,
        };
        // Round to two decimals so repeated steps don't drift.
        self.factor = (next.max(ZOOM_MIN) * 100.0).round() / 100.0;
        self.factor
    }
}

pub(crate) fn apply_zoom_command<F>(app_handle: &AppHandle, command: ZoomCommand, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("zoom skipped: main window not found");
        return;
    };

    let state = app_handle.state::<BackendState>();
    let factor = state.with_zoom(|zoom| {
        zoom.apply(command);
        zoom.factor()
    });
    if let Err(error) = window.set_zoom(factor) {
        log(&format!("failed to set main window zoom to {factor}: {error}"));
    }
}
