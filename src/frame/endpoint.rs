//! # Endpoint trait and the per-timing queue implementation.
//!
//! [`Endpoint`] is the whole contract between the runtime and a frame loop.
//! [`FrameEndpoint`] keeps one FIFO queue per [`FrameTiming`] and lets the
//! loop drain them phase by phase.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{FanoutError, TaskError};
use crate::frame::FrameTiming;

/// A one-shot resumption posted to an endpoint.
pub type Continuation = Box<dyn FnOnce() + Send + 'static>;

/// Scheduling point owned by a frame loop.
///
/// ### Rules
/// - `post` must not run the continuation while holding internal locks.
/// - A continuation is run at most once; dropping it is allowed (awaiters observe it).
pub trait Endpoint: Send + Sync + 'static {
    /// Hands `continuation` to the loop, tagged with the phase it should run in.
    fn post(&self, timing: FrameTiming, continuation: Continuation);
}

/// Reference [`Endpoint`] with one queue per [`FrameTiming`].
///
/// The owning loop calls [`run_queued`](Self::run_queued) for each phase of
/// every frame. Posting with [`FrameTiming::NotSpecified`] runs the
/// continuation immediately on the posting thread.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use taskfan::{Endpoint, FrameEndpoint, FrameTiming};
///
/// let endpoint = FrameEndpoint::new();
/// let ran = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&ran);
/// endpoint.post(FrameTiming::Update, Box::new(move || flag.store(true, Ordering::SeqCst)));
///
/// assert_eq!(endpoint.pending(FrameTiming::Update), 1);
/// assert_eq!(endpoint.run_queued(FrameTiming::Update), 1);
/// assert!(ran.load(Ordering::SeqCst));
/// ```
pub struct FrameEndpoint {
    queues: [Mutex<VecDeque<Continuation>>; FrameTiming::ALL.len()],
}

impl FrameEndpoint {
    /// Creates an endpoint with empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queues: std::array::from_fn(|_| Mutex::new(VecDeque::new())),
        }
    }

    fn queue(&self, timing: FrameTiming) -> &Mutex<VecDeque<Continuation>> {
        &self.queues[timing.index()]
    }

    /// Runs the continuations queued for `timing` when the call starts.
    ///
    /// Continuations posted while draining (including re-posts from a
    /// running continuation) wait for the next call. A panicking continuation
    /// is logged and skipped. Returns the number of continuations run.
    pub fn run_queued(&self, timing: FrameTiming) -> usize {
        let batch: Vec<Continuation> = self.queue(timing).lock().drain(..).collect();
        let count = batch.len();

        for continuation in batch {
            if let Err(panic) = std::panic::catch_unwind(AssertUnwindSafe(continuation)) {
                let err = TaskError::from_panic(panic);
                warn!(timing = timing.as_label(), error = %err, "continuation panicked");
            }
        }
        if count > 0 {
            debug!(timing = timing.as_label(), count, "frame queue drained");
        }
        count
    }

    /// Drops every queued continuation without running it.
    ///
    /// Promises waiting on a dropped continuation resolve
    /// [`FanoutError::Abandoned`]. Returns the number dropped.
    pub fn abort_all(&self) -> usize {
        let mut dropped = 0;
        for (queue, timing) in self.queues.iter().zip(FrameTiming::ALL) {
            let drained: Vec<Continuation> = queue.lock().drain(..).collect();
            if !drained.is_empty() {
                warn!(
                    timing = timing.as_label(),
                    count = drained.len(),
                    "aborting queued continuations"
                );
            }
            dropped += drained.len();
        }
        dropped
    }

    /// Number of continuations waiting for `timing`.
    pub fn pending(&self, timing: FrameTiming) -> usize {
        self.queue(timing).lock().len()
    }

    /// Suspends the caller until the loop drains `timing`.
    ///
    /// Returns [`FanoutError::Canceled`] if `ctx` fires first and
    /// [`FanoutError::Abandoned`] if the queue is aborted.
    pub async fn at(&self, timing: FrameTiming, ctx: &CancellationToken) -> Result<(), FanoutError> {
        if ctx.is_cancelled() {
            return Err(FanoutError::Canceled);
        }

        let (tx, rx) = oneshot::channel::<()>();
        self.post(
            timing,
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        tokio::select! {
            _ = ctx.cancelled() => Err(FanoutError::Canceled),
            resumed = rx => resumed.map_err(|_| FanoutError::Abandoned),
        }
    }
}

impl Default for FrameEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl Endpoint for FrameEndpoint {
    fn post(&self, timing: FrameTiming, continuation: Continuation) {
        if !timing.is_specified() {
            continuation();
            return;
        }
        self.queue(timing).lock().push_back(continuation);
    }
}
