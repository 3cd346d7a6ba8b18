pub(crate) const APP_DISPLAY_NAME: &str = "Question Paper Generator";
pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const PLACEHOLDER_PAGE: &str = "loading.html";
pub(crate) const TRAY_ID: &str = "question-paper-tray";
pub(crate) const BRIDGE_CAPABILITY_ID: &str = "backend-desktop-bridge";

pub(crate) const BACKEND_HOST: &str = "127.0.0.1";
pub(crate) const DEFAULT_PREFERRED_PORT: u16 = 8000;
pub(crate) const PORT_SCAN_SPAN: u16 = 100;

pub(crate) const DEV_MODE_FLAG: &str = "--dev";
pub(crate) const DEFAULT_ENTRY_SCRIPT: &str = "server.py";
pub(crate) const DEFAULT_SETTINGS_MODULE: &str = "question_paper_project.settings";
pub(crate) const RUNTIME_MANIFEST_RESOURCE: &str = "backend/runtime-manifest.json";
pub(crate) const BACKEND_RESOURCE_DIR: &str = "backend";

pub(crate) const PREFERRED_PORT_ENV: &str = "QPG_PREFERRED_PORT";
pub(crate) const BACKEND_TIMEOUT_ENV: &str = "QPG_BACKEND_TIMEOUT_MS";
pub(crate) const NAVIGATION_DELAY_ENV: &str = "QPG_NAVIGATION_DELAY_MS";
pub(crate) const SETTINGS_MODULE_ENV: &str = "QPG_SETTINGS_MODULE";
pub(crate) const PYTHON_ENV: &str = "QPG_PYTHON";
pub(crate) const BACKEND_CMD_ENV: &str = "QPG_BACKEND_CMD";
pub(crate) const BACKEND_DIR_ENV: &str = "QPG_BACKEND_DIR";
pub(crate) const BACKEND_CWD_ENV: &str = "QPG_BACKEND_CWD";
pub(crate) const ROOT_DIR_ENV: &str = "QPG_ROOT";

pub(crate) const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 20_000;
pub(crate) const BACKEND_TIMEOUT_MIN_MS: u64 = 1_000;
pub(crate) const DEFAULT_NAVIGATION_DELAY_MS: u64 = 1_500;

pub(crate) const READINESS_MARKERS: [&str; 2] = ["Starting development server", "Quit the server"];

pub(crate) const WINDOW_WIDTH: f64 = 1400.0;
pub(crate) const WINDOW_HEIGHT: f64 = 900.0;
pub(crate) const WINDOW_MIN_WIDTH: f64 = 1024.0;
pub(crate) const WINDOW_MIN_HEIGHT: f64 = 700.0;

pub(crate) const ZOOM_STEP: f64 = 0.1;
pub(crate) const ZOOM_MIN: f64 = 0.5;
pub(crate) const ZOOM_DEFAULT: f64 = 1.0;

pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";
pub(crate) const DESKTOP_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub(crate) const LOG_BACKUP_COUNT: usize = 5;
pub(crate) const DEFAULT_ROOT_DIR_NAME: &str = ".question-paper-desktop";
