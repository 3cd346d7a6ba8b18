use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

use crate::{
    logging::{self, DesktopLogCategory},
    DESKTOP_LOG_FILE, DESKTOP_LOG_MAX_BYTES, LOG_BACKUP_COUNT,
};

static DESKTOP_LOG_WRITE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
static DESKTOP_LOG_ROOT: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Sets where the desktop log file lives. Until then log lines are only
/// mirrored to stderr in debug builds.
pub(crate) fn init_log_root(root_dir: Option<PathBuf>) {
    if DESKTOP_LOG_ROOT.set(root_dir).is_err() {
        append_desktop_log("desktop log root already initialized");
    }
}

pub(crate) fn append_desktop_log(message: &str) {
    append_desktop_log_with_category(DesktopLogCategory::Runtime, message);
}

pub(crate) fn append_startup_log(message: &str) {
    append_desktop_log_with_category(DesktopLogCategory::Startup, message);
}

pub(crate) fn append_shutdown_log(message: &str) {
    append_desktop_log_with_category(DesktopLogCategory::Shutdown, message);
}

pub(crate) fn append_backend_log(line: &str) {
    append_desktop_log_with_category(DesktopLogCategory::Backend, line);
}

pub(crate) fn append_backend_stderr_log(line: &str) {
    append_desktop_log_with_category(DesktopLogCategory::BackendStderr, line);
}

fn append_desktop_log_with_category(category: DesktopLogCategory, message: &str) {
    let Some(root_dir) = DESKTOP_LOG_ROOT.get() else {
        if cfg!(debug_assertions) {
            eprintln!("[{}] {message}", category.as_str());
        }
        return;
    };

    logging::append_desktop_log(
        category,
        message,
        root_dir.clone(),
        DESKTOP_LOG_FILE,
        DESKTOP_LOG_MAX_BYTES,
        LOG_BACKUP_COUNT,
        &DESKTOP_LOG_WRITE_LOCK,
    )
}
