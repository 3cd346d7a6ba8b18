use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use tokio::process::Child;
use url::Url;

use crate::{
    append_desktop_log, append_shutdown_log,
    navigation_history::NavigationHistory,
    process_control::{ProcessSlot, TerminateOutcome},
    zoom::ZoomLevel,
    DesktopConfig, BACKEND_HOST,
};

/// Loopback address the backend is told to bind. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BackendEndpoint {
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl BackendEndpoint {
    pub(crate) fn loopback(port: u16) -> Self {
        Self {
            host: BACKEND_HOST.to_string(),
            port,
        }
    }

    pub(crate) fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn url(&self) -> String {
        format!("http://{}", self.socket_addr())
    }

    pub(crate) fn parsed_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.url())
    }

    /// Remote URL pattern covering every page served by the backend.
    pub(crate) fn origin_pattern(&self) -> String {
        format!("{}/*", self.url())
    }
}

/// Application context shared by every component for the lifetime of the
/// process. Created before the Tauri app is built and handed to `manage`.
#[derive(Debug)]
pub(crate) struct BackendState {
    pub(crate) endpoint: BackendEndpoint,
    pub(crate) config: DesktopConfig,
    pub(crate) process: ProcessSlot<Child>,
    navigation: Mutex<NavigationHistory>,
    zoom: Mutex<ZoomLevel>,
    quitting: AtomicBool,
}

impl BackendState {
    pub(crate) fn new(endpoint: BackendEndpoint, config: DesktopConfig) -> Self {
        Self {
            endpoint,
            config,
            process: ProcessSlot::default(),
            navigation: Mutex::new(NavigationHistory::default()),
            zoom: Mutex::new(ZoomLevel::default()),
            quitting: AtomicBool::new(false),
        }
    }

    pub(crate) fn server_url(&self) -> String {
        self.endpoint.url()
    }

    pub(crate) fn mark_quitting(&self) {
        self.quitting.store(true, Ordering::Release);
    }

    pub(crate) fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::Acquire)
    }

    pub(crate) fn with_navigation<R>(&self, f: impl FnOnce(&mut NavigationHistory) -> R) -> R {
        match self.navigation.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(error) => {
                append_desktop_log(&format!("navigation history lock poisoned: {error}"));
                f(&mut error.into_inner())
            }
        }
    }

    pub(crate) fn with_zoom<R>(&self, f: impl FnOnce(&mut ZoomLevel) -> R) -> R {
        match self.zoom.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(error) => {
                append_desktop_log(&format!("zoom state lock poisoned: {error}"));
                f(&mut error.into_inner())
            }
        }
    }

    /// Sends the termination signal to the backend, once. Later calls and
    /// calls before any launch do nothing.
    pub(crate) fn stop_backend(&self) {
        match self.process.terminate() {
            TerminateOutcome::NoProcess => {
                append_shutdown_log("no backend process to stop");
            }
            TerminateOutcome::Signalled { pid } => {
                append_shutdown_log(&format!(
                    "sent termination signal to backend process (pid {})",
                    describe_pid(pid)
                ));
            }
            TerminateOutcome::Failed { pid, error } => {
                append_shutdown_log(&format!(
                    "failed to signal backend process (pid {}): {error}",
                    describe_pid(pid)
                ));
            }
        }
    }
}

fn describe_pid(pid: Option<u32>) -> String {
    pid.map(|pid| pid.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
