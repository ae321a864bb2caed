//! Run-wide stop coordination

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Configured run time elapsed
    RunTimeElapsed,
    /// Ctrl-C or another external interrupt
    Interrupted,
    /// Stopped programmatically
    Requested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::RunTimeElapsed => write!(f, "run time elapsed"),
            StopReason::Interrupted => write!(f, "interrupted"),
            StopReason::Requested => write!(f, "requested"),
        }
    }
}

/// Cloneable, level-triggered stop flag.
///
/// Once triggered it stays triggered, and the first reason is kept.
#[derive(Debug, Clone)]
pub struct StopSignal {
    sender: Arc<watch::Sender<Option<StopReason>>>,
    receiver: watch::Receiver<Option<StopReason>>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// Trigger the stop. Returns `false` if it was already triggered.
    pub fn trigger(&self, reason: StopReason) -> bool {
        self.sender.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    pub fn is_stopped(&self) -> bool {
        self.receiver.borrow().is_some()
    }

    pub fn reason(&self) -> Option<StopReason> {
        *self.receiver.borrow()
    }

    /// Resolves once the signal has been triggered
    pub async fn stopped(&self) -> StopReason {
        let mut receiver = self.receiver.clone();
        loop {
            if let Some(reason) = *receiver.borrow_and_update() {
                return reason;
            }
            // The sender lives as long as any clone of this signal
            if receiver.changed().await.is_err() {
                return StopReason::Requested;
            }
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}
