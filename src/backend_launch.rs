use std::{fs, process::Stdio, time::Duration};

use tokio::process::{Child, Command};

use crate::{
    append_backend_log, append_backend_stderr_log, append_startup_log,
    backend_readiness::{self, PendingReadiness, ReadinessLatch},
    error::{DesktopError, DesktopResult},
    launch_plan::LaunchPlan,
    BackendState,
};

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// A freshly spawned backend with its output watchers attached.
#[derive(Debug)]
pub(crate) struct BackendLaunch {
    pub(crate) child: Child,
    pub(crate) readiness: PendingReadiness,
}

fn build_command(plan: &LaunchPlan) -> Command {
    let mut command = Command::new(&plan.cmd);
    command
        .args(&plan.args)
        .current_dir(&plan.cwd)
        .envs(plan.env.iter().map(|(key, value)| (key.as_str(), value.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(target_os = "windows")]
    command.creation_flags(CREATE_NO_WINDOW);

    command
}

/// Spawns the backend and starts draining its output. The readiness
/// deadline starts counting at spawn time.
pub(crate) fn spawn_backend(plan: &LaunchPlan, timeout: Duration) -> DesktopResult<BackendLaunch> {
    if !plan.cwd.exists() {
        fs::create_dir_all(&plan.cwd)?;
    }

    append_startup_log(&format!(
        "spawning backend: cmd={:?} cwd={} packaged={}",
        plan.debug_command(),
        plan.cwd.display(),
        plan.packaged_mode
    ));

    let mut child = build_command(plan)
        .spawn()
        .map_err(|source| DesktopError::Spawn {
            command: plan.debug_command(),
            source,
        })?;

    let (latch, receiver) = ReadinessLatch::channel();
    let readiness = PendingReadiness::new(receiver, timeout);

    match child.stdout.take() {
        Some(stdout) => {
            backend_readiness::watch_stdout(stdout, latch, append_backend_log);
        }
        None => append_startup_log("backend stdout was not captured"),
    }
    if let Some(stderr) = child.stderr.take() {
        backend_readiness::watch_stderr(stderr, append_backend_stderr_log);
    }

    Ok(BackendLaunch { child, readiness })
}

/// Spawns the backend and hands the child to the shared state, which owns
/// it until shutdown.
pub(crate) fn launch_backend(
    state: &BackendState,
    plan: &LaunchPlan,
) -> DesktopResult<PendingReadiness> {
    if state.process.is_occupied() {
        return Err(DesktopError::LaunchPlan(
            "A backend process is already running.".to_string(),
        ));
    }

    let BackendLaunch { child, readiness } = spawn_backend(plan, state.config.backend_timeout)?;
    let pid = child.id();
    if let Err(mut duplicate) = state.process.install(child) {
        append_startup_log("backend already running; stopping duplicate process");
        if let Err(error) = duplicate.start_kill() {
            append_startup_log(&format!("failed to stop duplicate backend process: {error}"));
        }
        return Err(DesktopError::LaunchPlan(
            "A backend process is already running.".to_string(),
        ));
    }

    append_startup_log(&format!(
        "backend spawned (pid {})",
        pid.map(|pid| pid.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    ));
    Ok(readiness)
}
