//! Stop signal shared by every long-running operation
//!
//! A [`StopSignal`] combines an external cancel request (a tokio `watch`
//! channel flipped by [`StopHandle::stop`]) with an optional deadline. Loops
//! check it between steps and race it against every device wait.

use std::fmt;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why an operation ended early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Stop requested through the handle
    Cancelled,
    /// The run deadline passed
    DeadlineElapsed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::DeadlineElapsed => write!(f, "deadline elapsed"),
        }
    }
}

/// Requests a stop on every signal cloned from its pair
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes stop requests and an optional deadline
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

impl StopSignal {
    /// Create a connected handle/signal pair
    pub fn new() -> (StopHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (StopHandle { tx }, Self { rx, deadline: None })
    }

    /// A signal that never fires
    pub fn never() -> Self {
        let (_handle, signal) = Self::new();
        signal
    }

    /// Also stop once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Non-blocking check, used between steps
    pub fn check(&self) -> Option<StopReason> {
        if *self.rx.borrow() {
            return Some(StopReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(StopReason::DeadlineElapsed),
            _ => None,
        }
    }

    /// Resolve once a stop is requested or the deadline passes
    pub async fn stopped(&mut self) -> StopReason {
        let deadline = self.deadline;
        let rx = &mut self.rx;

        let cancelled = async move {
            loop {
                if *rx.borrow_and_update() {
                    return;
                }
                if rx.changed().await.is_err() {
                    // Handle dropped without stopping
                    std::future::pending::<()>().await;
                }
            }
        };

        match deadline {
            Some(deadline) => tokio::select! {
                _ = cancelled => StopReason::Cancelled,
                _ = tokio::time::sleep_until(deadline) => StopReason::DeadlineElapsed,
            },
            None => {
                cancelled.await;
                StopReason::Cancelled
            }
        }
    }
}
