use std::{env, path::PathBuf, sync::OnceLock};

use tauri::{path::BaseDirectory, AppHandle, Manager};

use crate::{DEFAULT_ROOT_DIR_NAME, ROOT_DIR_ENV};

static DEFAULT_ROOT_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

fn non_empty_env_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Log root from an explicit override, else a dot directory under home.
pub(crate) fn resolve_root_dir(
    env_root: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    env_root.or_else(|| home.map(|home| home.join(DEFAULT_ROOT_DIR_NAME)))
}

/// Directory holding desktop logs; `QPG_ROOT` or `~/.question-paper-desktop`.
pub(crate) fn default_root_dir() -> Option<PathBuf> {
    DEFAULT_ROOT_DIR
        .get_or_init(|| resolve_root_dir(non_empty_env_path(ROOT_DIR_ENV), home::home_dir()))
        .clone()
}

pub(crate) fn env_path(key: &str) -> Option<PathBuf> {
    non_empty_env_path(key)
}

pub(crate) fn workspace_root_dir() -> PathBuf {
    let candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    candidate.canonicalize().unwrap_or(candidate)
}

pub(crate) fn resolve_resource_path(app: &AppHandle, relative_path: &str) -> Option<PathBuf> {
    app.path()
        .resolve(relative_path, BaseDirectory::Resource)
        .ok()
}
