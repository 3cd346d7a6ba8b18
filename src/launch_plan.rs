use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tauri::AppHandle;

use crate::{
    error::{DesktopError, DesktopResult},
    runtime_paths,
    startup_mode::StartupMode,
    BackendEndpoint, DesktopConfig, BACKEND_CMD_ENV, BACKEND_CWD_ENV, BACKEND_DIR_ENV,
    BACKEND_RESOURCE_DIR, DEFAULT_ENTRY_SCRIPT, PYTHON_ENV, RUNTIME_MANIFEST_RESOURCE,
};

const MANIFEST_FILE_NAME: &str = "runtime-manifest.json";

/// How the entry script is told which port to bind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum LaunchStyle {
    /// `<python> <entry> <port>`
    PositionalPort,
    /// `<python> <entry> runserver <host:port> --noreload`
    #[default]
    Runserver,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RuntimeManifest {
    pub(crate) python: Option<String>,
    pub(crate) entrypoint: Option<String>,
    pub(crate) launch: Option<LaunchStyle>,
    pub(crate) settings_module: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LaunchPlan {
    pub(crate) cmd: String,
    pub(crate) args: Vec<String>,
    pub(crate) cwd: PathBuf,
    pub(crate) env: Vec<(String, String)>,
    pub(crate) packaged_mode: bool,
}

impl LaunchPlan {
    pub(crate) fn debug_command(&self) -> Vec<String> {
        let mut parts = vec![self.cmd.clone()];
        parts.extend(self.args.iter().cloned());
        parts
    }
}

/// Environment-provided launch overrides.
#[derive(Debug, Default, Clone)]
pub(crate) struct LaunchOverrides {
    pub(crate) custom_cmd: Option<String>,
    pub(crate) python: Option<String>,
    pub(crate) backend_dir: Option<PathBuf>,
    pub(crate) cwd: Option<PathBuf>,
}

impl LaunchOverrides {
    pub(crate) fn from_env() -> Self {
        Self {
            custom_cmd: env::var(BACKEND_CMD_ENV)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            python: env::var(PYTHON_ENV)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            backend_dir: runtime_paths::env_path(BACKEND_DIR_ENV),
            cwd: runtime_paths::env_path(BACKEND_CWD_ENV),
        }
    }
}

/// Interpreter used when nothing more specific is configured.
pub(crate) fn default_python_command(target_os: &str) -> &'static str {
    match target_os {
        "windows" => "python",
        _ => "python3",
    }
}

pub(crate) fn python_command(overrides: &LaunchOverrides) -> String {
    overrides
        .python
        .clone()
        .unwrap_or_else(|| default_python_command(env::consts::OS).to_string())
}

pub(crate) fn backend_args(
    style: LaunchStyle,
    entry_script: &Path,
    endpoint: &BackendEndpoint,
) -> Vec<String> {
    let entry = entry_script.to_string_lossy().to_string();
    match style {
        LaunchStyle::PositionalPort => vec![entry, endpoint.port.to_string()],
        LaunchStyle::Runserver => vec![
            entry,
            "runserver".to_string(),
            endpoint.socket_addr(),
            "--noreload".to_string(),
        ],
    }
}

pub(crate) fn backend_env<F>(settings_module: &str, inherited: F) -> Vec<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    let mut vars = vec![
        ("PYTHONUNBUFFERED".to_string(), "1".to_string()),
        (
            "DJANGO_SETTINGS_MODULE".to_string(),
            settings_module.to_string(),
        ),
    ];
    if inherited("PYTHONIOENCODING").is_none() {
        vars.push(("PYTHONIOENCODING".to_string(), "utf-8".to_string()));
    }
    vars
}

fn inherited_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Where the launch plan comes from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LaunchSource {
    Custom,
    Development,
    Packaged,
}

pub(crate) fn launch_source(has_custom_cmd: bool, startup_mode: StartupMode) -> LaunchSource {
    if has_custom_cmd {
        LaunchSource::Custom
    } else if startup_mode.is_development() {
        LaunchSource::Development
    } else {
        LaunchSource::Packaged
    }
}

pub(crate) fn resolve_launch_plan(
    app: &AppHandle,
    config: &DesktopConfig,
    endpoint: &BackendEndpoint,
) -> DesktopResult<LaunchPlan> {
    let overrides = LaunchOverrides::from_env();
    let source = launch_source(overrides.custom_cmd.is_some(), config.startup_mode);
    if let (LaunchSource::Custom, Some(custom_cmd)) = (source, overrides.custom_cmd.as_deref()) {
        return resolve_custom_launch(custom_cmd, config, endpoint, &overrides);
    }

    if source == LaunchSource::Development {
        let backend_dir = overrides
            .backend_dir
            .clone()
            .unwrap_or_else(default_dev_backend_dir);
        return resolve_dev_launch(&backend_dir, config, endpoint, &overrides);
    }

    let backend_dir = overrides
        .backend_dir
        .clone()
        .or_else(|| runtime_paths::resolve_resource_path(app, BACKEND_RESOURCE_DIR))
        .ok_or_else(|| {
            DesktopError::LaunchPlan(format!(
                "Cannot resolve packaged backend resources ({RUNTIME_MANIFEST_RESOURCE})."
            ))
        })?;
    resolve_packaged_launch(&backend_dir, config, endpoint, &overrides)
}

fn default_dev_backend_dir() -> PathBuf {
    let candidate = runtime_paths::workspace_root_dir().join(BACKEND_RESOURCE_DIR);
    if candidate.join(DEFAULT_ENTRY_SCRIPT).is_file() {
        return candidate;
    }
    env::current_dir().unwrap_or(candidate)
}

fn substitute_endpoint_tokens(arg: &str, endpoint: &BackendEndpoint) -> String {
    arg.replace("{addr}", &endpoint.socket_addr())
        .replace("{host}", &endpoint.host)
        .replace("{port}", &endpoint.port.to_string())
}

pub(crate) fn resolve_custom_launch(
    custom_cmd: &str,
    config: &DesktopConfig,
    endpoint: &BackendEndpoint,
    overrides: &LaunchOverrides,
) -> DesktopResult<LaunchPlan> {
    let mut pieces = shlex::split(custom_cmd).ok_or_else(|| {
        DesktopError::LaunchPlan(format!("Invalid {BACKEND_CMD_ENV}: {custom_cmd}"))
    })?;
    if pieces.is_empty() {
        return Err(DesktopError::LaunchPlan(format!(
            "{BACKEND_CMD_ENV} is empty."
        )));
    }

    let cmd = pieces.remove(0);
    let args = pieces
        .iter()
        .map(|arg| substitute_endpoint_tokens(arg, endpoint))
        .collect();
    let cwd = overrides
        .cwd
        .clone()
        .or_else(|| overrides.backend_dir.clone())
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(runtime_paths::workspace_root_dir);

    Ok(LaunchPlan {
        cmd,
        args,
        cwd,
        env: backend_env(&config.settings_module, inherited_env),
        packaged_mode: false,
    })
}

pub(crate) fn resolve_dev_launch(
    backend_dir: &Path,
    config: &DesktopConfig,
    endpoint: &BackendEndpoint,
    overrides: &LaunchOverrides,
) -> DesktopResult<LaunchPlan> {
    let entry_script = backend_dir.join(DEFAULT_ENTRY_SCRIPT);
    if !entry_script.is_file() {
        return Err(DesktopError::LaunchPlan(format!(
            "Cannot locate backend entry script {}. Set {BACKEND_DIR_ENV} to the backend source directory.",
            entry_script.display()
        )));
    }

    Ok(LaunchPlan {
        cmd: python_command(overrides),
        args: backend_args(LaunchStyle::default(), &entry_script, endpoint),
        cwd: overrides
            .cwd
            .clone()
            .unwrap_or_else(|| backend_dir.to_path_buf()),
        env: backend_env(&config.settings_module, inherited_env),
        packaged_mode: false,
    })
}

fn read_runtime_manifest(backend_dir: &Path) -> DesktopResult<RuntimeManifest> {
    let manifest_path = backend_dir.join(MANIFEST_FILE_NAME);
    if !manifest_path.is_file() {
        return Ok(RuntimeManifest::default());
    }

    let manifest_text = fs::read_to_string(&manifest_path).map_err(|error| {
        DesktopError::LaunchPlan(format!(
            "Failed to read packaged backend manifest {}: {}",
            manifest_path.display(),
            error
        ))
    })?;
    serde_json::from_str(&manifest_text).map_err(|error| {
        DesktopError::LaunchPlan(format!(
            "Failed to parse packaged backend manifest {}: {}",
            manifest_path.display(),
            error
        ))
    })
}

pub(crate) fn resolve_packaged_launch(
    backend_dir: &Path,
    config: &DesktopConfig,
    endpoint: &BackendEndpoint,
    overrides: &LaunchOverrides,
) -> DesktopResult<LaunchPlan> {
    let manifest = read_runtime_manifest(backend_dir)?;

    let cmd = match manifest.python.as_deref() {
        Some(relative) => {
            let python_path = backend_dir.join(relative);
            if !python_path.is_file() {
                return Err(DesktopError::LaunchPlan(format!(
                    "Packaged runtime python executable is missing: {}",
                    python_path.display()
                )));
            }
            python_path.to_string_lossy().to_string()
        }
        None => python_command(overrides),
    };

    let entry_script = backend_dir.join(
        manifest
            .entrypoint
            .as_deref()
            .unwrap_or(DEFAULT_ENTRY_SCRIPT),
    );
    if !entry_script.is_file() {
        return Err(DesktopError::LaunchPlan(format!(
            "Packaged backend entry script is missing: {}",
            entry_script.display()
        )));
    }

    let settings_module = manifest
        .settings_module
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(config.settings_module.as_str());

    Ok(LaunchPlan {
        cmd,
        args: backend_args(manifest.launch.unwrap_or_default(), &entry_script, endpoint),
        cwd: overrides
            .cwd
            .clone()
            .unwrap_or_else(|| backend_dir.to_path_buf()),
        env: backend_env(settings_module, inherited_env),
        packaged_mode: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> BackendEndpoint {
        BackendEndpoint::loopback(8123)
    }

    fn config() -> DesktopConfig {
        DesktopConfig::from_lookup(StartupMode::Packaged, |_| None)
    }

    fn env_value<'a>(plan: &'a LaunchPlan, key: &str) -> Option<&'a str> {
        plan.env
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn launch_source_prefers_custom_then_development_then_packaged() {
        assert_eq!(
            launch_source(true, StartupMode::Development),
            LaunchSource::Custom
        );
        assert_eq!(launch_source(true, StartupMode::Packaged), LaunchSource::Custom);
        assert_eq!(
            launch_source(false, StartupMode::Development),
            LaunchSource::Development
        );
        assert_eq!(
            launch_source(false, StartupMode::Packaged),
            LaunchSource::Packaged
        );
    }

    #[test]
    fn bundle_ships_backend_resource_dir() {
        let conf: serde_json::Value =
            serde_json::from_str(include_str!("../tauri.conf.json")).expect("tauri.conf.json");
        let source = format!("{BACKEND_RESOURCE_DIR}/");
        assert_eq!(
            conf["bundle"]["resources"][source.as_str()].as_str(),
            Some(source.as_str())
        );
        assert!(RUNTIME_MANIFEST_RESOURCE.starts_with(&source));
    }

    #[test]
    fn default_python_command_follows_platform_table() {
        assert_eq!(default_python_command("windows"), "python");
        assert_eq!(default_python_command("linux"), "python3");
        assert_eq!(default_python_command("macos"), "python3");
    }

    #[test]
    fn backend_args_renders_positional_port_style() {
        let args = backend_args(
            LaunchStyle::PositionalPort,
            Path::new("server.py"),
            &endpoint(),
        );
        assert_eq!(args, vec!["server.py", "8123"]);
    }

    #[test]
    fn backend_args_renders_runserver_style() {
        let args = backend_args(LaunchStyle::Runserver, Path::new("server.py"), &endpoint());
        assert_eq!(
            args,
            vec!["server.py", "runserver", "127.0.0.1:8123", "--noreload"]
        );
    }

    #[test]
    fn backend_env_sets_unbuffered_output_and_settings_module() {
        let vars = backend_env("exam.settings", |_| None);
        assert!(vars.contains(&("PYTHONUNBUFFERED".to_string(), "1".to_string())));
        assert!(vars.contains(&(
            "DJANGO_SETTINGS_MODULE".to_string(),
            "exam.settings".to_string()
        )));
        assert!(vars.contains(&("PYTHONIOENCODING".to_string(), "utf-8".to_string())));
    }

    #[test]
    fn backend_env_keeps_inherited_io_encoding() {
        let vars = backend_env("exam.settings", |key| {
            (key == "PYTHONIOENCODING").then(|| "latin-1".to_string())
        });
        assert!(!vars.iter().any(|(key, _)| key == "PYTHONIOENCODING"));
    }

    #[test]
    fn resolve_custom_launch_splits_and_substitutes_tokens() {
        let overrides = LaunchOverrides {
            cwd: Some(PathBuf::from("/srv/backend")),
            ..LaunchOverrides::default()
        };
        let plan = resolve_custom_launch(
            "\"/opt/py env/bin/python\" manage.py runserver {addr} --port={port}",
            &config(),
            &endpoint(),
            &overrides,
        )
        .expect("custom plan");
        assert_eq!(plan.cmd, "/opt/py env/bin/python");
        assert_eq!(
            plan.args,
            vec!["manage.py", "runserver", "127.0.0.1:8123", "--port=8123"]
        );
        assert_eq!(plan.cwd, PathBuf::from("/srv/backend"));
        assert!(!plan.packaged_mode);
    }

    #[test]
    fn resolve_custom_launch_rejects_unbalanced_quotes() {
        let error = resolve_custom_launch(
            "python \"server.py",
            &config(),
            &endpoint(),
            &LaunchOverrides::default(),
        )
        .expect_err("invalid command");
        assert!(matches!(error, DesktopError::LaunchPlan(_)));
    }

    #[test]
    fn resolve_dev_launch_requires_entry_script() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let error = resolve_dev_launch(
            dir.path(),
            &config(),
            &endpoint(),
            &LaunchOverrides::default(),
        )
        .expect_err("missing server.py");
        assert!(error.to_string().contains("server.py"));
    }

    #[test]
    fn resolve_dev_launch_uses_python_override_and_backend_dir() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("server.py"), "").expect("write server.py");
        let overrides = LaunchOverrides {
            python: Some("/usr/local/bin/python3.12".to_string()),
            ..LaunchOverrides::default()
        };

        let plan = resolve_dev_launch(dir.path(), &config(), &endpoint(), &overrides)
            .expect("dev plan");
        assert_eq!(plan.cmd, "/usr/local/bin/python3.12");
        assert_eq!(plan.cwd, dir.path());
        assert_eq!(plan.args[1], "runserver");
        assert_eq!(
            env_value(&plan, "DJANGO_SETTINGS_MODULE"),
            Some("question_paper_project.settings")
        );
    }

    #[test]
    fn resolve_packaged_launch_without_manifest_uses_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("server.py"), "").expect("write server.py");

        let plan = resolve_packaged_launch(
            dir.path(),
            &config(),
            &endpoint(),
            &LaunchOverrides::default(),
        )
        .expect("packaged plan");
        assert_eq!(plan.cmd, default_python_command(env::consts::OS));
        assert!(plan.packaged_mode);
        assert_eq!(plan.args.last().map(String::as_str), Some("--noreload"));
    }

    #[test]
    fn resolve_packaged_launch_honours_manifest() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(dir.path().join("runtime").join("bin")).expect("create runtime dir");
        fs::write(dir.path().join("runtime").join("bin").join("python3"), "")
            .expect("write python");
        fs::write(dir.path().join("launch.py"), "").expect("write entry");
        fs::write(
            dir.path().join(MANIFEST_FILE_NAME),
            r#"{
                "python": "runtime/bin/python3",
                "entrypoint": "launch.py",
                "launch": "positional-port",
                "settings_module": "exam.settings.packaged"
            }"#,
        )
        .expect("write manifest");

        let plan = resolve_packaged_launch(
            dir.path(),
            &config(),
            &endpoint(),
            &LaunchOverrides::default(),
        )
        .expect("packaged plan");
        assert!(plan.cmd.ends_with("python3"));
        assert_eq!(plan.args.len(), 2);
        assert!(plan.args[0].ends_with("launch.py"));
        assert_eq!(plan.args[1], "8123");
        assert_eq!(
            env_value(&plan, "DJANGO_SETTINGS_MODULE"),
            Some("exam.settings.packaged")
        );
    }

    #[test]
    fn resolve_packaged_launch_reports_missing_bundled_python() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("server.py"), "").expect("write entry");
        fs::write(
            dir.path().join(MANIFEST_FILE_NAME),
            r#"{ "python": "runtime/bin/python3" }"#,
        )
        .expect("write manifest");

        let error = resolve_packaged_launch(
            dir.path(),
            &config(),
            &endpoint(),
            &LaunchOverrides::default(),
        )
        .expect_err("missing python");
        assert!(error.to_string().contains("python executable is missing"));
    }

    #[test]
    fn resolve_packaged_launch_reports_invalid_manifest() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join(MANIFEST_FILE_NAME), "{ not json").expect("write manifest");

        let error = resolve_packaged_launch(
            dir.path(),
            &config(),
            &endpoint(),
            &LaunchOverrides::default(),
        )
        .expect_err("invalid manifest");
        assert!(error.to_string().contains("Failed to parse"));
    }
}
