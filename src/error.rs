//! Errors that abort desktop startup.
//!
//! Everything after startup (tray, menu, window chrome) logs its failures and
//! carries on, so only the launch path needs a typed error.

use std::io;

#[derive(Debug, thiserror::Error)]
pub(crate) enum DesktopError {
    /// Neither the preferred range nor the OS could provide a free port.
    #[error("no free loopback port found starting from {preferred}")]
    PortUnavailable { preferred: u16 },

    /// The launch plan could not be resolved (missing script, bad manifest).
    #[error("{0}")]
    LaunchPlan(String),

    /// The backend executable could not be started.
    #[error("failed to spawn backend process {command:?}: {source}")]
    Spawn {
        command: Vec<String>,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("tauri error: {0}")]
    Tauri(#[from] tauri::Error),
}

pub(crate) type DesktopResult<T> = Result<T, DesktopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_error_message_names_command_and_cause() {
        let error = DesktopError::Spawn {
            command: vec!["python3".to_string(), "server.py".to_string()],
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        let message = error.to_string();
        assert!(message.contains("python3"));
        assert!(message.contains("not found"));
    }

    #[test]
    fn port_unavailable_mentions_preferred_port() {
        let error = DesktopError::PortUnavailable { preferred: 8000 };
        assert_eq!(
            error.to_string(),
            "no free loopback port found starting from 8000"
        );
    }
}
