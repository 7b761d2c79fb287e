//! Operator console state machine.
//!
//! A verification moves the console from `Idle` (or a previous result) to
//! `Waiting` for the simulated device latency, then to `Allowed` or
//! `Denied`. Only one verification may be pending at a time; the status is
//! published on a [`tokio::sync::watch`] channel.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use crate::{
    control::{AccessControl, ControlError},
    models::{AccessRecord, AccessResult},
    store::KeyValueStore,
    verification::Verification,
};

/// Visible state of the console.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConsoleStatus {
    /// No verification yet.
    #[default]
    Idle,
    /// A verification is pending.
    Waiting,
    /// The last verification admitted the badge.
    Allowed,
    /// The last verification refused the badge.
    Denied,
}

impl From<AccessResult> for ConsoleStatus {
    fn from(result: AccessResult) -> Self {
        match result {
            AccessResult::Allowed => Self::Allowed,
            AccessResult::Denied => Self::Denied,
        }
    }
}

impl fmt::Display for ConsoleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Allowed => "allowed",
            Self::Denied => "denied",
        })
    }
}

/// Errors raised by [`OperatorConsole::verify`].
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Another verification is still pending.
    #[error("a verification is already in progress")]
    Busy,
    /// Recording the verification failed.
    #[error(transparent)]
    Control(#[from] ControlError),
}

/// Clears the pending flag however the verification ends.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) { self.0.store(false, Ordering::Release); }
}

/// Front end for badge verification with simulated latency.
#[derive(Debug)]
pub struct OperatorConsole<S> {
    control: Arc<Mutex<AccessControl<S>>>,
    delay: Duration,
    pending: AtomicBool,
    status: watch::Sender<ConsoleStatus>,
}

impl<S: KeyValueStore> OperatorConsole<S> {
    /// Console over `control`, waiting `delay` before each result.
    #[must_use]
    pub fn new(control: Arc<Mutex<AccessControl<S>>>, delay: Duration) -> Self {
        let (status, _) = watch::channel(ConsoleStatus::Idle);
        Self {
            control,
            delay,
            pending: AtomicBool::new(false),
            status,
        }
    }

    /// Shared access-control state.
    #[must_use]
    pub fn control(&self) -> Arc<Mutex<AccessControl<S>>> { Arc::clone(&self.control) }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> ConsoleStatus { *self.status.borrow() }

    /// Receiver notified on every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConsoleStatus> { self.status.subscribe() }

    /// Whether a verification is pending.
    #[must_use]
    pub fn is_busy(&self) -> bool { self.pending.load(Ordering::Acquire) }

    /// Up to `limit` most recent records, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<AccessRecord> {
        self.control.lock().await.accesses().recent(limit).cloned().collect()
    }

    /// Verify `code` after the simulated delay and record the attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Busy`] without recording anything while
    /// another verification is pending, or [`ConsoleError::Control`] if the
    /// record cannot be persisted. The console returns to `Idle` on a
    /// persistence failure.
    pub async fn verify(&self, code: &str) -> Result<Verification, ConsoleError> {
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("verification rejected while another is pending");
            return Err(ConsoleError::Busy);
        }
        let _pending = PendingGuard(&self.pending);

        self.status.send_replace(ConsoleStatus::Waiting);
        tokio::time::sleep(self.delay).await;

        let result = self.control.lock().await.verify(code, Utc::now());
        match result {
            Ok(verification) => {
                self.status
                    .send_replace(verification.outcome.result().into());
                Ok(verification)
            }
            Err(e) => {
                warn!(error = %e, "verification could not be recorded");
                self.status.send_replace(ConsoleStatus::Idle);
                Err(e.into())
            }
        }
    }

    /// Return to `Idle` unless a verification is pending.
    pub fn reset(&self) {
        if !self.is_busy() {
            self.status.send_replace(ConsoleStatus::Idle);
        }
    }
}
