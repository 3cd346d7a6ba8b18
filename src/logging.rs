use std::{
    env,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock, PoisonError},
};

use chrono::{Local, SecondsFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DesktopLogCategory {
    Startup,
    Runtime,
    Shutdown,
    Backend,
    BackendStderr,
}

impl DesktopLogCategory {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Runtime => "runtime",
            Self::Shutdown => "shutdown",
            Self::Backend => "backend",
            Self::BackendStderr => "backend-stderr",
        }
    }
}

pub(crate) fn resolve_desktop_log_path(root_dir: Option<PathBuf>, file_name: &str) -> PathBuf {
    match root_dir {
        Some(root) => root.join("logs").join(file_name),
        None => env::temp_dir()
            .join("question-paper-desktop")
            .join(file_name),
    }
}

fn format_log_line(category: DesktopLogCategory, message: &str, timestamp: &str) -> String {
    format!(
        "[{timestamp}] [{}] {}\n",
        category.as_str(),
        message.trim_end_matches(['\r', '\n'])
    )
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(format!(".{index}"));
    PathBuf::from(raw)
}

fn rotate_if_needed(path: &Path, max_bytes: u64, backup_count: usize) -> io::Result<()> {
    let Ok(metadata) = fs::metadata(path) else {
        return Ok(());
    };
    if metadata.len() < max_bytes {
        return Ok(());
    }

    if backup_count == 0 {
        return fs::remove_file(path);
    }

    for index in (1..backup_count).rev() {
        let source = backup_path(path, index);
        if source.exists() {
            fs::rename(&source, backup_path(path, index + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))
}

fn write_log_line(path: &Path, line: &str, max_bytes: u64, backup_count: usize) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    rotate_if_needed(path, max_bytes, backup_count)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

pub(crate) fn append_desktop_log(
    category: DesktopLogCategory,
    message: &str,
    root_dir: Option<PathBuf>,
    file_name: &str,
    max_bytes: u64,
    backup_count: usize,
    write_lock: &OnceLock<Mutex<()>>,
) {
    let path = resolve_desktop_log_path(root_dir, file_name);
    let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Millis, false);
    let line = format_log_line(category, message, &timestamp);
    if cfg!(debug_assertions) {
        eprint!("{line}");
    }

    let _guard = write_lock
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Err(error) = write_log_line(&path, &line, max_bytes, backup_count) {
        eprintln!("failed to write desktop log {}: {error}", path.display());
    }
}
