#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_helpers;
mod app_menu;
mod app_runtime;
mod app_types;
mod backend_config;
mod backend_launch;
mod backend_readiness;
mod desktop_bridge;
mod desktop_bridge_commands;
mod error;
mod exit_events;
mod launch_plan;
mod logging;
mod main_window;
mod navigation_history;
mod port_allocator;
mod process_control;
mod runtime_paths;
mod startup_mode;
mod startup_task;
mod tray_actions;
mod tray_menu_handler;
mod tray_setup;
mod window_actions;
mod zoom;

pub(crate) use app_constants::*;
pub(crate) use app_helpers::{
    append_backend_log, append_backend_stderr_log, append_desktop_log, append_shutdown_log,
    append_startup_log,
};
pub(crate) use app_types::{BackendEndpoint, BackendState};
pub(crate) use backend_config::DesktopConfig;
pub(crate) use main_window::navigate_main_window_to_backend;

fn main() {
    app_runtime::run();
}
