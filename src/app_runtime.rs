use std::{env, process};

use tauri::{webview::PageLoadEvent, Manager, RunEvent, Webview, WindowEvent};
use url::Url;

use crate::{
    app_helpers, app_menu, append_desktop_log, append_startup_log, desktop_bridge, exit_events,
    main_window, port_allocator, runtime_paths, startup_mode::StartupMode, startup_task,
    tray_setup, window_actions, BackendEndpoint, BackendState, DesktopConfig, DESKTOP_LOG_FILE,
    MAIN_WINDOW_LABEL,
};

fn handle_page_load_finished(webview: &Webview, url: &Url) {
    let state = webview.app_handle().state::<BackendState>();
    if desktop_bridge::should_inject_desktop_bridge(&state.server_url(), url) {
        desktop_bridge::inject_desktop_bridge(webview, append_desktop_log);
    } else if main_window::is_placeholder_url(url) {
        window_actions::show_main_window(webview.app_handle(), append_startup_log);
    }
}

pub(crate) fn run() {
    let log_root = runtime_paths::default_root_dir();
    app_helpers::init_log_root(log_root.clone());
    append_startup_log("desktop process starting");
    append_startup_log(&format!(
        "desktop log path: {}",
        crate::logging::resolve_desktop_log_path(log_root, DESKTOP_LOG_FILE).display()
    ));

    let startup_mode = StartupMode::from_args(env::args());
    let config = DesktopConfig::from_env(startup_mode);
    append_startup_log(&format!(
        "startup mode: {}; preferred port {}",
        startup_mode.as_str(),
        config.preferred_port
    ));

    let port = match port_allocator::allocate_port(config.preferred_port) {
        Ok(port) => port,
        Err(error) => {
            append_startup_log(&format!("port allocation failed: {error}"));
            eprintln!("Failed to start: {error}");
            process::exit(1);
        }
    };
    let endpoint = BackendEndpoint::loopback(port);
    append_startup_log(&format!("backend endpoint: {}", endpoint.url()));

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            window_actions::show_main_window(app, append_desktop_log);
        }))
        .manage(BackendState::new(endpoint, config))
        .menu(app_menu::build_app_menu)
        .on_menu_event(|app, event| app_menu::handle_app_menu_event(app, event.id().as_ref()))
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_get_server_url,
            crate::desktop_bridge_commands::desktop_bridge_go_back,
            crate::desktop_bridge_commands::desktop_bridge_can_go_back,
        ])
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }

            if let WindowEvent::CloseRequested { api, .. } = event {
                if window_actions::handle_close_requested(window.app_handle(), append_desktop_log)
                {
                    api.prevent_close();
                }
            }
        })
        .on_page_load(|webview, payload| match payload.event() {
            PageLoadEvent::Started => {
                let state = webview.app_handle().state::<BackendState>();
                if desktop_bridge::should_inject_desktop_bridge(&state.server_url(), payload.url())
                {
                    desktop_bridge::inject_desktop_bridge(webview, append_desktop_log);
                }
            }
            PageLoadEvent::Finished => {
                append_desktop_log(&format!("page-load finished: {}", payload.url()));
                handle_page_load_finished(webview, payload.url());
            }
        })
        .setup(|app| {
            let app_handle = app.handle().clone();
            let endpoint = app_handle.state::<BackendState>().endpoint.clone();
            if let Err(error) = desktop_bridge::register_bridge_capability(&app_handle, &endpoint)
            {
                append_startup_log(&error);
            }
            if let Err(error) = tray_setup::setup_tray(&app_handle) {
                append_startup_log(&format!("failed to initialize tray: {error}"));
            }

            startup_task::spawn_startup_task(app_handle, append_startup_log);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { code, .. } => {
                exit_events::handle_exit_requested(app_handle, code);
            }
            RunEvent::Exit => {
                exit_events::handle_exit_event(app_handle);
            }
            #[cfg(target_os = "macos")]
            RunEvent::Reopen { .. } => {
                window_actions::show_main_window(app_handle, append_desktop_log);
            }
            _ => {}
        });
}
