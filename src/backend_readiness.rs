//! Readiness detection for the backend process.
//!
//! The stdout watcher is the only writer of a one-shot readiness signal and
//! the startup task is its only reader. Whichever comes first, the marker or
//! the deadline, settles the wait; the other is ignored.

use std::{io, time::Duration};

use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::oneshot,
    task::JoinHandle,
    time::{self, Instant},
};

use crate::{append_startup_log, READINESS_MARKERS};

pub(crate) fn contains_readiness_marker(text: &str) -> bool {
    READINESS_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

/// Fires the readiness signal on the first line carrying a marker.
#[derive(Debug)]
pub(crate) struct ReadinessLatch {
    sender: Option<oneshot::Sender<()>>,
}

impl ReadinessLatch {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<()>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Returns true only for the line that fired the signal.
    pub(crate) fn observe(&mut self, line: &str) -> bool {
        if self.has_fired() || !contains_readiness_marker(line) {
            return false;
        }
        if let Some(sender) = self.sender.take() {
            // The reader is gone once the deadline has passed.
            let _ = sender.send(());
        }
        true
    }

    pub(crate) fn has_fired(&self) -> bool {
        self.sender.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadinessOutcome {
    Ready,
    TimedOut,
}

impl ReadinessOutcome {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::TimedOut => "timed out",
        }
    }
}

/// Reader side of the readiness signal, with the deadline fixed at launch.
#[derive(Debug)]
pub(crate) struct PendingReadiness {
    receiver: oneshot::Receiver<()>,
    deadline: Instant,
}

impl PendingReadiness {
    pub(crate) fn new(receiver: oneshot::Receiver<()>, timeout: Duration) -> Self {
        Self {
            receiver,
            deadline: Instant::now() + timeout,
        }
    }

    /// Resolves `Ready` on the first marker, otherwise `TimedOut` exactly at
    /// the deadline. A backend that closes stdout early still waits out the
    /// deadline; process exit is not treated as a failure.
    pub(crate) async fn wait(self) -> ReadinessOutcome {
        match time::timeout_at(self.deadline, self.receiver).await {
            Ok(Ok(())) => ReadinessOutcome::Ready,
            Ok(Err(_)) => {
                append_startup_log(
                    "backend output closed before readiness marker; waiting for the deadline",
                );
                time::sleep_until(self.deadline).await;
                ReadinessOutcome::TimedOut
            }
            Err(_) => ReadinessOutcome::TimedOut,
        }
    }
}

async fn for_each_line<R, F>(reader: R, mut on_line: F) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer).await? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buffer);
        on_line(line.trim_end_matches(['\r', '\n']));
    }
}

/// Logs every stdout line and feeds it to the latch. Keeps draining after
/// readiness so the backend never blocks on a full pipe.
pub(crate) fn watch_stdout<R, F>(
    stdout: R,
    mut latch: ReadinessLatch,
    log_line: F,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    F: Fn(&str) + Send + 'static,
{
    tokio::spawn(async move {
        let result = for_each_line(stdout, move |line| {
            log_line(line);
            if latch.observe(line) {
                append_startup_log("backend readiness marker detected");
            }
        })
        .await;
        if let Err(error) = result {
            append_startup_log(&format!("failed to read backend stdout: {error}"));
        }
    })
}

/// Logs stderr lines. Never inspected for readiness.
pub(crate) fn watch_stderr<R, F>(stderr: R, log_line: F) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    F: Fn(&str) + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(error) = for_each_line(stderr, log_line).await {
            append_startup_log(&format!("failed to read backend stderr: {error}"));
        }
    })
}
