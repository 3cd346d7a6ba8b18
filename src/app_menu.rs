use tauri::{
    menu::{Menu, MenuBuilder, MenuItem, SubmenuBuilder},
    AppHandle, Manager, Runtime,
};

use crate::{
    append_desktop_log, append_shutdown_log, window_actions,
    zoom::{self, ZoomCommand},
    BackendState, APP_DISPLAY_NAME,
};

pub(crate) const MENU_GO_BACK: &str = "menu_go_back";
pub(crate) const MENU_RELOAD: &str = "menu_reload";
pub(crate) const MENU_ZOOM_IN: &str = "menu_zoom_in";
pub(crate) const MENU_ZOOM_OUT: &str = "menu_zoom_out";
pub(crate) const MENU_ZOOM_RESET: &str = "menu_zoom_reset";
pub(crate) const MENU_QUIT: &str = "menu_quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AppMenuAction {
    GoBack,
    Reload,
    Zoom(ZoomCommand),
    Quit,
}

pub(crate) fn action_from_menu_id(menu_id: &str) -> Option<AppMenuAction> {
    match menu_id {
        MENU_GO_BACK => Some(AppMenuAction::GoBack),
        MENU_RELOAD => Some(AppMenuAction::Reload),
        MENU_ZOOM_IN => Some(AppMenuAction::Zoom(ZoomCommand::In)),
        MENU_ZOOM_OUT => Some(AppMenuAction::Zoom(ZoomCommand::Out)),
        MENU_ZOOM_RESET => Some(AppMenuAction::Zoom(ZoomCommand::Reset)),
        MENU_QUIT => Some(AppMenuAction::Quit),
        _ => None,
    }
}

pub(crate) fn build_app_menu<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<Menu<R>> {
    let quit = MenuItem::with_id(
        app,
        MENU_QUIT,
        format!("Quit {APP_DISPLAY_NAME}"),
        true,
        Some("CmdOrCtrl+Q"),
    )?;
    let app_menu = SubmenuBuilder::new(app, APP_DISPLAY_NAME)
        .item(&quit)
        .build()?;

    let edit_menu = SubmenuBuilder::new(app, "Edit")
        .undo()
        .redo()
        .separator()
        .cut()
        .copy()
        .paste()
        .separator()
        .select_all()
        .build()?;

    let go_back = MenuItem::with_id(app, MENU_GO_BACK, "Back", true, Some("Alt+Left"))?;
    let reload = MenuItem::with_id(app, MENU_RELOAD, "Reload", true, Some("CmdOrCtrl+R"))?;
    let zoom_in = MenuItem::with_id(app, MENU_ZOOM_IN, "Zoom In", true, Some("CmdOrCtrl+="))?;
    let zoom_out = MenuItem::with_id(app, MENU_ZOOM_OUT, "Zoom Out", true, Some("CmdOrCtrl+-"))?;
    let zoom_reset = MenuItem::with_id(
        app,
        MENU_ZOOM_RESET,
        "Actual Size",
        true,
        Some("CmdOrCtrl+0"),
    )?;
    let view_menu = SubmenuBuilder::new(app, "View")
        .item(&go_back)
        .item(&reload)
        .separator()
        .item(&zoom_in)
        .item(&zoom_out)
        .item(&zoom_reset)
        .build()?;

    MenuBuilder::new(app)
        .item(&app_menu)
        .item(&edit_menu)
        .item(&view_menu)
        .build()
}

pub(crate) fn handle_app_menu_event(app_handle: &AppHandle, menu_id: &str) {
    match action_from_menu_id(menu_id) {
        Some(AppMenuAction::GoBack) => {
            window_actions::go_back_main_window(app_handle, append_desktop_log);
        }
        Some(AppMenuAction::Reload) => {
            window_actions::reload_main_window(app_handle, append_desktop_log)
        }
        Some(AppMenuAction::Zoom(command)) => {
            zoom::apply_zoom_command(app_handle, command, append_desktop_log)
        }
        Some(AppMenuAction::Quit) => {
            let state = app_handle.state::<BackendState>();
            state.mark_quitting();
            append_shutdown_log("menu quit requested, exiting desktop process");
            app_handle.exit(0);
        }
        None => {}
    }
}
