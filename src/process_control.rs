use std::{
    io,
    sync::{Mutex, PoisonError},
};

use tokio::process::Child;

/// A running process that can be asked to terminate.
pub(crate) trait TerminateProcess {
    fn pid(&self) -> Option<u32>;
    fn terminate(&mut self) -> io::Result<()>;
}

impl TerminateProcess for Child {
    fn pid(&self) -> Option<u32> {
        self.id()
    }

    fn terminate(&mut self) -> io::Result<()> {
        send_termination_signal(self)
    }
}

#[cfg(unix)]
fn send_termination_signal(child: &mut Child) -> io::Result<()> {
    let Some(pid) = child.id() else {
        // Already reaped.
        return Ok(());
    };
    let pid = libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;

    // SAFETY: `pid` is our own child and has not been reaped, so it cannot
    // refer to an unrelated process.
    let result = unsafe { libc::kill(pid, libc::SIGTERM) };
    if result == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn send_termination_signal(child: &mut Child) -> io::Result<()> {
    child.start_kill()
}

#[derive(Debug)]
pub(crate) enum TerminateOutcome {
    NoProcess,
    Signalled { pid: Option<u32> },
    Failed { pid: Option<u32>, error: io::Error },
}

/// Holds at most one backend process for the lifetime of the app.
#[derive(Debug)]
pub(crate) struct ProcessSlot<P> {
    process: Mutex<Option<P>>,
}

impl<P> Default for ProcessSlot<P> {
    fn default() -> Self {
        Self {
            process: Mutex::new(None),
        }
    }
}

impl<P: TerminateProcess> ProcessSlot<P> {
    /// Stores `process`; hands it back if a process is already installed.
    pub(crate) fn install(&self, process: P) -> Result<(), P> {
        let mut guard = self.process.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some() {
            return Err(process);
        }
        *guard = Some(process);
        Ok(())
    }

    pub(crate) fn is_occupied(&self) -> bool {
        self.process
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Takes the process out of the slot and signals it once.
    pub(crate) fn terminate(&self) -> TerminateOutcome {
        let taken = self
            .process
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut process) = taken else {
            return TerminateOutcome::NoProcess;
        };

        let pid = process.pid();
        match process.terminate() {
            Ok(()) => TerminateOutcome::Signalled { pid },
            Err(error) => TerminateOutcome::Failed { pid, error },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    struct FakeProcess {
        pid: u32,
        signals: Arc<AtomicUsize>,
        fail: bool,
    }

    impl FakeProcess {
        fn new(pid: u32, signals: &Arc<AtomicUsize>) -> Self {
            Self {
                pid,
                signals: Arc::clone(signals),
                fail: false,
            }
        }
    }

    impl TerminateProcess for FakeProcess {
        fn pid(&self) -> Option<u32> {
            Some(self.pid)
        }

        fn terminate(&mut self) -> io::Result<()> {
            self.signals.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn terminate_signals_installed_process_exactly_once() {
        let signals = Arc::new(AtomicUsize::new(0));
        let slot = ProcessSlot::default();
        assert!(slot.install(FakeProcess::new(42, &signals)).is_ok());

        assert!(matches!(
            slot.terminate(),
            TerminateOutcome::Signalled { pid: Some(42) }
        ));
        assert!(matches!(slot.terminate(), TerminateOutcome::NoProcess));
        assert_eq!(signals.load(Ordering::SeqCst), 1);
        assert!(!slot.is_occupied());
    }

    #[test]
    fn terminate_without_process_is_noop() {
        let slot: ProcessSlot<FakeProcess> = ProcessSlot::default();
        assert!(matches!(slot.terminate(), TerminateOutcome::NoProcess));
    }

    #[test]
    fn install_rejects_second_process() {
        let signals = Arc::new(AtomicUsize::new(0));
        let slot = ProcessSlot::default();
        assert!(slot.install(FakeProcess::new(1, &signals)).is_ok());

        let rejected = slot
            .install(FakeProcess::new(2, &signals))
            .expect_err("second install should be rejected");
        assert_eq!(rejected.pid, 2);
        assert!(slot.is_occupied());
    }

    #[test]
    fn terminate_reports_signal_failure_and_empties_slot() {
        let signals = Arc::new(AtomicUsize::new(0));
        let slot = ProcessSlot::default();
        let mut process = FakeProcess::new(7, &signals);
        process.fail = true;
        assert!(slot.install(process).is_ok());

        assert!(matches!(
            slot.terminate(),
            TerminateOutcome::Failed { pid: Some(7), .. }
        ));
        assert!(!slot.is_occupied());
        assert_eq!(signals.load(Ordering::SeqCst), 1);
    }
}
