use std::{env, time::Duration};

use crate::{
    startup_mode::StartupMode, BACKEND_TIMEOUT_ENV, BACKEND_TIMEOUT_MIN_MS,
    DEFAULT_BACKEND_TIMEOUT_MS, DEFAULT_NAVIGATION_DELAY_MS, DEFAULT_PREFERRED_PORT,
    DEFAULT_SETTINGS_MODULE, NAVIGATION_DELAY_ENV, PREFERRED_PORT_ENV, SETTINGS_MODULE_ENV,
};

/// Startup settings, resolved once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DesktopConfig {
    pub(crate) startup_mode: StartupMode,
    pub(crate) preferred_port: u16,
    pub(crate) backend_timeout: Duration,
    pub(crate) navigation_delay: Duration,
    pub(crate) settings_module: String,
}

impl DesktopConfig {
    pub(crate) fn from_env(startup_mode: StartupMode) -> Self {
        Self::from_lookup(startup_mode, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(startup_mode: StartupMode, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let preferred_port = lookup(PREFERRED_PORT_ENV)
            .and_then(|value| value.trim().parse::<u16>().ok())
            .filter(|port| *port > 0)
            .unwrap_or(DEFAULT_PREFERRED_PORT);
        let backend_timeout_ms = parse_millis(lookup(BACKEND_TIMEOUT_ENV).as_deref())
            .unwrap_or(DEFAULT_BACKEND_TIMEOUT_MS)
            .max(BACKEND_TIMEOUT_MIN_MS);
        let navigation_delay_ms = parse_millis(lookup(NAVIGATION_DELAY_ENV).as_deref())
            .unwrap_or(DEFAULT_NAVIGATION_DELAY_MS);
        let settings_module = lookup(SETTINGS_MODULE_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SETTINGS_MODULE.to_string());

        Self {
            startup_mode,
            preferred_port,
            backend_timeout: Duration::from_millis(backend_timeout_ms),
            navigation_delay: Duration::from_millis(navigation_delay_ms),
            settings_module,
        }
    }
}

fn parse_millis(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> DesktopConfig {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        DesktopConfig::from_lookup(StartupMode::Packaged, |key| values.get(key).cloned())
    }

    #[test]
    fn from_lookup_uses_defaults_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config.preferred_port, 8000);
        assert_eq!(config.backend_timeout, Duration::from_secs(20));
        assert_eq!(config.navigation_delay, Duration::from_millis(1500));
        assert_eq!(config.settings_module, "question_paper_project.settings");
    }

    #[test]
    fn from_lookup_reads_overrides() {
        let config = config_from(&[
            (PREFERRED_PORT_ENV, " 9100 "),
            (BACKEND_TIMEOUT_ENV, "30000"),
            (NAVIGATION_DELAY_ENV, "0"),
            (SETTINGS_MODULE_ENV, "exam.settings.desktop"),
        ]);
        assert_eq!(config.preferred_port, 9100);
        assert_eq!(config.backend_timeout, Duration::from_secs(30));
        assert_eq!(config.navigation_delay, Duration::ZERO);
        assert_eq!(config.settings_module, "exam.settings.desktop");
    }

    #[test]
    fn from_lookup_falls_back_on_invalid_values() {
        let config = config_from(&[
            (PREFERRED_PORT_ENV, "0"),
            (BACKEND_TIMEOUT_ENV, "soon"),
            (SETTINGS_MODULE_ENV, "   "),
        ]);
        assert_eq!(config.preferred_port, 8000);
        assert_eq!(config.backend_timeout, Duration::from_secs(20));
        assert_eq!(config.settings_module, "question_paper_project.settings");
    }

    #[test]
    fn from_lookup_clamps_tiny_timeouts() {
        let config = config_from(&[(BACKEND_TIMEOUT_ENV, "10")]);
        assert_eq!(config.backend_timeout, Duration::from_millis(1000));
    }
}
