//! Bounded reconciliation after external events
//!
//! A chat turn can change the server cart without the client knowing when the
//! change commits. Reconciling means one immediate authoritative fetch plus
//! exactly two delayed re-fetches, then stop. The schedule is a fixed-size
//! array so the attempt count cannot drift.

use crate::types::CartSnapshot;
use crate::{ClientError, ClientResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Schedule of the delayed re-fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilePolicy {
    /// Offsets, measured from the end of the immediate fetch
    rechecks: [Duration; 2],
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            rechecks: [Duration::from_millis(100), Duration::from_millis(300)],
        }
    }
}

impl ReconcilePolicy {
    /// Total fetch attempts per reconciliation (immediate + delayed)
    pub const ATTEMPTS: u32 = 3;

    /// Build a schedule; offsets must be strictly increasing
    pub fn new(first: Duration, second: Duration) -> ClientResult<Self> {
        if second <= first {
            return Err(ClientError::Config(format!(
                "reconcile offsets must increase: {:?} then {:?}",
                first, second
            )));
        }
        Ok(Self {
            rechecks: [first, second],
        })
    }

    /// Parse `"100,300"` (milliseconds)
    pub fn parse_millis(raw: &str) -> ClientResult<Self> {
        let offsets = raw
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|e| ClientError::Config(format!("bad offset {:?}: {}", part, e)))
            })
            .collect::<ClientResult<Vec<_>>>()?;

        match offsets.as_slice() {
            [first, second] => Self::new(*first, *second),
            _ => Err(ClientError::Config(format!(
                "expected two offsets, got {}",
                offsets.len()
            ))),
        }
    }

    pub fn rechecks(&self) -> [Duration; 2] {
        self.rechecks
    }
}

/// Handle to one reconciliation run.
///
/// Dropping it does not cancel the delayed re-fetches; they are idempotent
/// overwrites and stop on their own (or on controller teardown).
#[derive(Debug)]
pub struct ReconcileHandle {
    pub(crate) immediate: CartSnapshot,
    pub(crate) attempts: Arc<AtomicU32>,
    pub(crate) join: JoinHandle<()>,
}

impl ReconcileHandle {
    /// Mirror after the immediate fetch
    pub fn immediate(&self) -> &CartSnapshot {
        &self.immediate
    }

    /// Fetch attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the delayed re-fetches and return the number of attempts made
    pub async fn finished(self) -> u32 {
        if let Err(e) = self.join.await {
            tracing::debug!(error = %e, "Reconcile task ended abnormally");
        }
        self.attempts.load(Ordering::SeqCst)
    }
}
