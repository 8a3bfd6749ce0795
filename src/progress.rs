//! Progress tokens: cooperative cancellation and checkpoints for one pass run.
//!
//! A [`ProgressToken`] is shared (cheaply cloned) by every piece of work that
//! belongs to one run of a pass. Work calls [`ProgressToken::check_canceled`]
//! at every node and propagates the resulting [`Cancelled`] with `?`; only
//! the outermost run loop is allowed to consume it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Control-flow signal raised when a run is canceled.
///
/// Not a failure: it unwinds the current call stack up to the pass's run
/// loop, which decides whether to restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("processing canceled")]
pub struct Cancelled;

/// Result of a step that may be interrupted by cancellation.
pub type Cancellable<T> = Result<T, Cancelled>;

#[derive(Debug)]
struct Inner {
    id: Uuid,
    cancel: CancellationToken,
    /// Number of passes currently running under this token.
    running: Mutex<u32>,
    stopped: Condvar,
    limit: AtomicU64,
    processed: AtomicU64,
    full_pass_applied: AtomicBool,
}

/// Cancellation and checkpoint object for one pass run.
#[derive(Debug, Clone)]
pub struct ProgressToken {
    inner: Arc<Inner>,
}

impl Default for ProgressToken {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressToken {
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Wrap an existing cancellation token, e.g. a child of a scheduler-wide
    /// token so that canceling the scheduler cancels every run.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                cancel,
                running: Mutex::new(0),
                stopped: Condvar::new(),
                limit: AtomicU64::new(0),
                processed: AtomicU64::new(0),
                full_pass_applied: AtomicBool::new(false),
            }),
        }
    }

    /// Run id, used to correlate log events.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The underlying cancellation token; async consumers can await
    /// `cancellation().cancelled()`.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    // ------------------------------------------------------------------------
    // Cancellation
    // ------------------------------------------------------------------------

    pub fn cancel(&self) {
        self.inner.cancel.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Raise [`Cancelled`] if the token was canceled. Never blocks.
    #[inline]
    pub fn check_canceled(&self) -> Cancellable<()> {
        if self.is_canceled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Mark one pass as started.
    ///
    /// Passes sharing a token each call `start` and `stop`; the token stays
    /// running until the last of them stops.
    pub fn start(&self) {
        *self.inner.running.lock() += 1;
    }

    /// Mark one pass as finished; wakes every waiter once none is left.
    pub fn stop(&self) {
        let mut running = self.inner.running.lock();
        *running = running.saturating_sub(1);
        if *running == 0 {
            self.inner.stopped.notify_all();
        }
    }

    pub fn is_running(&self) -> bool {
        *self.inner.running.lock() > 0
    }

    /// Block until every pass stops or `timeout` elapses.
    ///
    /// Returns `true` if nothing is running any more.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let mut running = self.inner.running.lock();
        if *running > 0 {
            let _ = self
                .inner
                .stopped
                .wait_while_for(&mut running, |running| *running > 0, timeout);
        }
        *running == 0
    }

    // ------------------------------------------------------------------------
    // Progress
    // ------------------------------------------------------------------------

    /// Add `work` units to the total amount of work.
    ///
    /// Each pass under the token adds its own total once, so the fraction
    /// covers all of them and no pass resets another's progress.
    pub fn add_limit(&self, work: u64) {
        self.inner.limit.fetch_add(work, Ordering::Relaxed);
    }

    pub fn limit(&self) -> u64 {
        self.inner.limit.load(Ordering::Relaxed)
    }

    pub fn advance(&self, delta: u64) {
        self.inner.processed.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.inner.processed.load(Ordering::Relaxed)
    }

    /// `processed / limit`, or `None` while no limit is set.
    pub fn fraction(&self) -> Option<f64> {
        let limit = self.limit();
        if limit == 0 {
            return None;
        }
        let processed = self.processed().min(limit);
        Some(processed as f64 / limit as f64)
    }

    // ------------------------------------------------------------------------
    // Pass coordination
    // ------------------------------------------------------------------------

    /// Record that a full-document pass applied its results under this token.
    pub(crate) fn mark_full_pass_applied(&self) {
        self.inner.full_pass_applied.store(true, Ordering::Release);
    }

    /// True once a full-document pass applied under this token; a visible
    /// pass finishing later must not overwrite those results.
    pub fn full_pass_applied(&self) -> bool {
        self.inner.full_pass_applied.load(Ordering::Acquire)
    }
}
