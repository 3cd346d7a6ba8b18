use std::time::Duration;

use tauri::{AppHandle, Manager};
use tokio::time::{self, Instant};

use crate::{
    backend_launch,
    backend_readiness::PendingReadiness,
    error::{DesktopError, DesktopResult},
    launch_plan, main_window, navigate_main_window_to_backend, BackendState,
};

/// Time still to wait so the placeholder stays up for at least `delay`.
pub(crate) fn remaining_placeholder_delay(shown_for: Duration, delay: Duration) -> Duration {
    delay.saturating_sub(shown_for)
}

/// The pieces of the app the startup sequence drives.
pub(crate) trait StartupShell {
    fn launch_backend(&self) -> DesktopResult<PendingReadiness>;
    fn create_window(&self) -> DesktopResult<()>;
    fn navigate(&self) -> Result<(), String>;
    /// Ends the app after a failed launch.
    fn abort(&self, error: &DesktopError);
    fn is_quitting(&self) -> bool;
    fn server_url(&self) -> String;
    fn log(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartupOutcome {
    Aborted,
    Navigated,
    NavigationFailed,
    Cancelled,
}

/// Launches the backend, opens the placeholder window and navigates to the
/// backend once readiness has settled and the placeholder delay has passed.
/// A launch failure aborts before any window is created.
pub(crate) async fn run_startup<S: StartupShell>(
    shell: &S,
    navigation_delay: Duration,
) -> StartupOutcome {
    let readiness = match shell.launch_backend() {
        Ok(readiness) => readiness,
        Err(error) => {
            shell.log(&format!("backend launch failed: {error}"));
            shell.abort(&error);
            return StartupOutcome::Aborted;
        }
    };

    let window_created_at = Instant::now();
    if let Err(error) = shell.create_window() {
        shell.log(&format!("failed to create main window: {error}"));
    }

    let outcome = readiness.wait().await;
    shell.log(&format!(
        "backend readiness {} after {}ms; url={}",
        outcome.as_str(),
        window_created_at.elapsed().as_millis(),
        shell.server_url()
    ));

    let remaining = remaining_placeholder_delay(window_created_at.elapsed(), navigation_delay);
    if !remaining.is_zero() {
        time::sleep(remaining).await;
    }

    if shell.is_quitting() {
        shell.log("startup navigation skipped: application is quitting");
        return StartupOutcome::Cancelled;
    }
    match shell.navigate() {
        Ok(()) => {
            shell.log(&format!("main window navigated to {}", shell.server_url()));
            StartupOutcome::Navigated
        }
        Err(error) => {
            shell.log(&format!("failed to navigate to backend: {error}"));
            StartupOutcome::NavigationFailed
        }
    }
}

struct AppStartupShell<F> {
    app_handle: AppHandle,
    log: F,
}

impl<F> StartupShell for AppStartupShell<F>
where
    F: Fn(&str),
{
    fn launch_backend(&self) -> DesktopResult<PendingReadiness> {
        let state = self.app_handle.state::<BackendState>();
        launch_plan::resolve_launch_plan(&self.app_handle, &state.config, &state.endpoint)
            .and_then(|plan| backend_launch::launch_backend(&state, &plan))
    }

    fn create_window(&self) -> DesktopResult<()> {
        main_window::create_main_window(&self.app_handle).map(|_| ())
    }

    fn navigate(&self) -> Result<(), String> {
        navigate_main_window_to_backend(&self.app_handle)
    }

    fn abort(&self, error: &DesktopError) {
        eprintln!("Failed to start the backend: {error}");
        self.app_handle.state::<BackendState>().mark_quitting();
        self.app_handle.exit(1);
    }

    fn is_quitting(&self) -> bool {
        self.app_handle.state::<BackendState>().is_quitting()
    }

    fn server_url(&self) -> String {
        self.app_handle.state::<BackendState>().server_url()
    }

    fn log(&self, message: &str) {
        (self.log)(message);
    }
}

pub(crate) fn spawn_startup_task<F>(app_handle: AppHandle, log: F)
where
    F: Fn(&str) + Send + Sync + 'static,
{
    let navigation_delay = app_handle.state::<BackendState>().config.navigation_delay;
    let shell = AppStartupShell { app_handle, log };
    tauri::async_runtime::spawn(async move {
        run_startup(&shell, navigation_delay).await;
    });
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    };

    use super::*;
    use crate::backend_readiness::ReadinessLatch;

    const DELAY: Duration = Duration::from_millis(1500);
    const TIMEOUT: Duration = Duration::from_secs(20);

    #[test]
    fn fast_readiness_waits_out_the_placeholder_delay() {
        assert_eq!(
            remaining_placeholder_delay(Duration::from_millis(400), DELAY),
            Duration::from_millis(1100)
        );
    }

    #[test]
    fn slow_readiness_navigates_immediately() {
        assert_eq!(
            remaining_placeholder_delay(Duration::from_secs(3), DELAY),
            Duration::ZERO
        );
        assert_eq!(remaining_placeholder_delay(DELAY, DELAY), Duration::ZERO);
    }

    enum Backend {
        FailsToLaunch,
        ReadyAfter(Duration),
        Silent,
    }

    struct FakeShell {
        started: Instant,
        backend: Backend,
        quitting: AtomicBool,
        silent_latch: Mutex<Option<ReadinessLatch>>,
        events: Mutex<Vec<(&'static str, Duration)>>,
    }

    impl FakeShell {
        fn new(backend: Backend) -> Self {
            Self {
                started: Instant::now(),
                backend,
                quitting: AtomicBool::new(false),
                silent_latch: Mutex::new(None),
                events: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, event: &'static str) {
            self.events
                .lock()
                .expect("events lock")
                .push((event, self.started.elapsed()));
        }

        fn events(&self) -> Vec<(&'static str, Duration)> {
            self.events.lock().expect("events lock").clone()
        }

        fn time_of(&self, event: &str) -> Option<Duration> {
            self.events()
                .into_iter()
                .find(|(name, _)| *name == event)
                .map(|(_, at)| at)
        }
    }

    impl StartupShell for FakeShell {
        fn launch_backend(&self) -> DesktopResult<PendingReadiness> {
            self.record("launch");
            let (mut latch, receiver) = ReadinessLatch::channel();
            match self.backend {
                Backend::FailsToLaunch => {
                    return Err(DesktopError::LaunchPlan("missing manage.py".to_string()));
                }
                Backend::ReadyAfter(after) => {
                    tokio::spawn(async move {
                        time::sleep(after).await;
                        latch.observe("Starting development server at http://127.0.0.1:8000/");
                    });
                }
                Backend::Silent => {
                    *self.silent_latch.lock().expect("latch lock") = Some(latch);
                }
            }
            Ok(PendingReadiness::new(receiver, TIMEOUT))
        }

        fn create_window(&self) -> DesktopResult<()> {
            self.record("window");
            Ok(())
        }

        fn navigate(&self) -> Result<(), String> {
            self.record("navigate");
            Ok(())
        }

        fn abort(&self, _error: &DesktopError) {
            self.record("abort");
            self.quitting.store(true, Ordering::SeqCst);
        }

        fn is_quitting(&self) -> bool {
            self.quitting.load(Ordering::SeqCst)
        }

        fn server_url(&self) -> String {
            "http://127.0.0.1:8000".to_string()
        }

        fn log(&self, _message: &str) {}
    }

    #[tokio::test(start_paused = true)]
    async fn launch_failure_aborts_without_a_window() {
        let shell = FakeShell::new(Backend::FailsToLaunch);

        assert_eq!(run_startup(&shell, DELAY).await, StartupOutcome::Aborted);
        assert_eq!(
            shell.events(),
            vec![("launch", Duration::ZERO), ("abort", Duration::ZERO)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn window_is_created_right_after_launch() {
        let shell = FakeShell::new(Backend::ReadyAfter(Duration::from_millis(300)));

        assert_eq!(run_startup(&shell, DELAY).await, StartupOutcome::Navigated);
        let names = shell
            .events()
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["launch", "window", "navigate"]);
        assert_eq!(shell.time_of("window"), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_backend_navigates_after_placeholder_delay() {
        let shell = FakeShell::new(Backend::ReadyAfter(Duration::from_millis(300)));

        run_startup(&shell, DELAY).await;
        let navigated_at = shell.time_of("navigate").expect("navigated");
        assert!(navigated_at >= DELAY, "navigated early: {navigated_at:?}");
        assert!(
            navigated_at < DELAY + Duration::from_millis(100),
            "navigated late: {navigated_at:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_navigates_as_soon_as_ready() {
        let shell = FakeShell::new(Backend::ReadyAfter(Duration::from_secs(3)));

        run_startup(&shell, DELAY).await;
        let navigated_at = shell.time_of("navigate").expect("navigated");
        assert!(navigated_at >= Duration::from_secs(3), "navigated early: {navigated_at:?}");
        assert!(
            navigated_at < Duration::from_millis(3100),
            "navigated late: {navigated_at:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn silent_backend_navigates_at_the_deadline() {
        let shell = FakeShell::new(Backend::Silent);

        assert_eq!(run_startup(&shell, DELAY).await, StartupOutcome::Navigated);
        assert_eq!(shell.time_of("navigate"), Some(TIMEOUT));
    }

    #[tokio::test(start_paused = true)]
    async fn quitting_during_startup_skips_navigation() {
        let shell = FakeShell::new(Backend::ReadyAfter(Duration::from_millis(300)));
        shell.quitting.store(true, Ordering::SeqCst);

        assert_eq!(run_startup(&shell, DELAY).await, StartupOutcome::Cancelled);
        assert_eq!(shell.time_of("navigate"), None);
    }
}
