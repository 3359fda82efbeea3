//! # Bounded parallel scheduler.
//!
//! [`Scheduler::schedule`] runs a [`WorkBatch`] on at most `plan` worker
//! routines spawned on the tokio runtime and returns a [`Promise`] for the
//! combined outcome.
//!
//! ## Architecture
//! ```text
//! schedule(batch, cap, ctx)
//!   ├─ ctx cancelled?  ──► Promise::ready(Err(Canceled))   (no item invoked)
//!   ├─ batch empty?    ──► Promise::ready(Ok(()))
//!   └─ plan = cfg.plan(len, cap)
//!        queue.next = plan
//!        spawn worker 0..plan:
//!          run item[worker_id]
//!          loop { claim_next() ─► run item[i] }   until None or own item fails
//!        driver: join all workers
//!          ├─ timing unspecified / no endpoint ──► complete inline
//!          └─ otherwise ──► endpoint.post(timing, complete)
//! ```
//!
//! ## Rules
//! - Every index in `[0, len)` is run at most once; exactly once when no item fails.
//! - At most `plan` items are in flight at any instant.
//! - The first recorded error wins (compare-and-set); later errors are logged and dropped.
//! - A failing worker stops its own path; the others keep draining.
//! - Panics inside items are caught and recorded as [`TaskError::Panicked`].

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};

use futures::future::join_all;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::core::builder::SchedulerBuilder;
use crate::core::config::FanoutConfig;
use crate::core::promise::{Outcome, Promise};
use crate::core::queue::WorkQueue;
use crate::error::{FanoutError, TaskError};
use crate::frame::{Endpoint, FrameTiming};
use crate::tasks::WorkBatch;

/// State shared by the workers of one schedule.
struct Drain<A> {
    batch: WorkBatch<A>,
    queue: WorkQueue,
    ctx: CancellationToken,
    first_error: OnceLock<TaskError>,
}

impl<A> Drain<A> {
    fn record(&self, err: TaskError) {
        if let Err(later) = self.first_error.set(err) {
            trace!(error = %later, "later failure discarded");
        }
    }

    fn outcome(&self) -> Outcome {
        match self.first_error.get() {
            None => Ok(()),
            Some(err) => Err(FanoutError::from(err.clone())),
        }
    }
}

/// Bounded parallel scheduler.
///
/// Cheap to clone; clones share the configuration and endpoint.
///
/// ### Notes
/// - `schedule` must be called from within a tokio runtime.
/// - The runtime's worker threads are the pool; this type owns no threads.
#[derive(Clone)]
pub struct Scheduler {
    cfg: FanoutConfig,
    endpoint: Option<Arc<dyn Endpoint>>,
}

impl Scheduler {
    /// Creates a scheduler that always completes inline.
    pub fn new(cfg: FanoutConfig) -> Self {
        Self::new_internal(cfg, None)
    }

    /// Returns a builder for a scheduler with optional features.
    pub fn builder(cfg: FanoutConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: FanoutConfig, endpoint: Option<Arc<dyn Endpoint>>) -> Self {
        Self { cfg, endpoint }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &FanoutConfig {
        &self.cfg
    }

    /// Runs `batch` with at most `cap` concurrent items.
    ///
    /// `cap` is clamped to `[1, max_parallel]` and further limited by the
    /// hardware parallelism and the batch length.
    ///
    /// # Example
    /// ```
    /// use tokio_util::sync::CancellationToken;
    /// use taskfan::{FanoutConfig, Scheduler, TaskError, WorkBatch, WorkFn, WorkRef};
    ///
    /// # #[tokio::main(flavor = "multi_thread", worker_threads = 2)]
    /// # async fn main() {
    /// let sched = Scheduler::new(FanoutConfig::default());
    /// let item: WorkRef = WorkFn::arc("noop", |_ctx: CancellationToken| async { Ok::<_, TaskError>(()) });
    ///
    /// let done = sched.schedule(WorkBatch::repeat(item, 16, ()), 4, &CancellationToken::new());
    /// assert_eq!(done.await, Ok(()));
    /// # }
    /// ```
    pub fn schedule<A>(&self, batch: WorkBatch<A>, cap: usize, ctx: &CancellationToken) -> Promise
    where
        A: Clone + Send + Sync + 'static,
    {
        self.schedule_at(batch, cap, FrameTiming::NotSpecified, ctx)
    }

    /// Like [`schedule`](Self::schedule), but delivers the completion through
    /// the configured endpoint tagged with `timing`.
    ///
    /// Without an endpoint, or with [`FrameTiming::NotSpecified`], the
    /// completion is delivered inline.
    pub fn schedule_at<A>(
        &self,
        batch: WorkBatch<A>,
        cap: usize,
        timing: FrameTiming,
        ctx: &CancellationToken,
    ) -> Promise
    where
        A: Clone + Send + Sync + 'static,
    {
        if ctx.is_cancelled() {
            debug!(items = batch.len(), "schedule skipped: already cancelled");
            return Promise::ready(Err(FanoutError::Canceled));
        }
        if batch.is_empty() {
            return Promise::ready(Ok(()));
        }

        let len = batch.len();
        let plan = self.cfg.plan(len, cap);
        debug!(items = len, cap, plan, timing = timing.as_label(), "scheduling batch");

        let shared = Arc::new(Drain {
            batch,
            queue: WorkQueue::new(plan, len),
            ctx: ctx.clone(),
            first_error: OnceLock::new(),
        });

        let workers: Vec<_> = (0..plan)
            .map(|worker_id| tokio::spawn(drain(Arc::clone(&shared), worker_id)))
            .collect();

        let endpoint = if timing.is_specified() {
            self.endpoint.clone()
        } else {
            None
        };
        let (completer, promise) = Promise::pending();

        tokio::spawn(async move {
            for joined in join_all(workers).await {
                if let Err(err) = joined {
                    shared.record(TaskError::from_join(err));
                }
            }

            let outcome = shared.outcome();
            match &outcome {
                Ok(()) => debug!(items = len, "batch completed"),
                Err(err) => debug!(items = len, outcome = err.as_label(), "batch finished with error"),
            }

            match endpoint {
                Some(endpoint) => {
                    endpoint.post(timing, Box::new(move || completer.complete(outcome)))
                }
                None => completer.complete(outcome),
            }
        });

        promise
    }
}

/// One worker routine: run the statically assigned item, then keep claiming.
async fn drain<A>(shared: Arc<Drain<A>>, worker_id: usize)
where
    A: Clone + Send + Sync + 'static,
{
    let mut next = Some(worker_id);
    let mut ran = 0usize;

    while let Some(index) = next {
        let Some(item) = shared.batch.get(index) else {
            break;
        };

        let arg = shared.batch.arg().clone();
        let ctx = shared.ctx.clone();
        let res = AssertUnwindSafe(async { item.spawn(arg, ctx).await })
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(TaskError::from_panic(panic)));
        ran += 1;

        if let Err(err) = res {
            if err.is_canceled() {
                debug!(worker_id, item = item.name(), "item observed cancellation");
            } else {
                warn!(worker_id, item = item.name(), error = %err, "item failed");
            }
            shared.record(err);
            break;
        }

        next = shared.queue.claim_next();
    }

    trace!(worker_id, ran, "worker drained");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameEndpoint;
    use crate::tasks::{ArgWorkFn, WorkFn, WorkRef};
    use crate::core::config::MAX_PARALLEL;
    use crate::PromiseState;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn scheduler(parallelism: usize) -> Scheduler {
        Scheduler::new(FanoutConfig {
            parallelism,
            ..FanoutConfig::default()
        })
    }

    fn counting(hits: &Arc<Vec<AtomicUsize>>) -> WorkBatch<()> {
        let items: Vec<WorkRef> = (0..hits.len())
            .map(|i| {
                let hits = Arc::clone(hits);
                let w: WorkRef = WorkFn::arc(format!("item-{i}"), move |_ctx: CancellationToken| {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits[i].fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        Ok::<_, TaskError>(())
                    }
                });
                w
            })
            .collect();
        WorkBatch::new(items)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_item_runs_exactly_once() {
        for n in [1usize, 2, 3, 7, 64] {
            for cap in [0usize, 1, 3, 32, 100] {
                let hits: Arc<Vec<AtomicUsize>> = Arc::new((0..n).map(|_| AtomicUsize::new(0)).collect());
                let res = scheduler(4).schedule(counting(&hits), cap, &CancellationToken::new()).await;
                assert_eq!(res, Ok(()));
                for (i, h) in hits.iter().enumerate() {
                    assert_eq!(h.load(Ordering::SeqCst), 1, "n={n} cap={cap} item={i}");
                }
            }
        }
    }

    #[tokio::test]
    async fn test_empty_batch_is_ready() {
        let p = scheduler(2).schedule(WorkBatch::new(Vec::new()), 4, &CancellationToken::new());
        assert_eq!(p.status(), PromiseState::Succeeded);
        assert_eq!(p.await, Ok(()));
    }

    #[tokio::test]
    async fn test_precancelled_invokes_nothing() {
        let hits: Arc<Vec<AtomicUsize>> = Arc::new((0..5).map(|_| AtomicUsize::new(0)).collect());
        let ctx = CancellationToken::new();
        ctx.cancel();

        let p = scheduler(2).schedule(counting(&hits), 4, &ctx);
        assert_eq!(p.status(), PromiseState::Canceled);
        assert_eq!(p.await, Err(FanoutError::Canceled));
        assert!(hits.iter().all(|h| h.load(Ordering::SeqCst) == 0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fault_is_surfaced_and_siblings_keep_draining() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        let item: WorkRef<usize> = ArgWorkFn::arc("maybe-fail", move |fail_at: usize, _ctx: CancellationToken| {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n == fail_at {
                    return Err(TaskError::fail("bad item"));
                }
                Ok(())
            }
        });

        let p = scheduler(4).schedule(WorkBatch::repeat(item, 40, 0usize), 2, &CancellationToken::new());
        let res = p.wait().await;
        assert_eq!(res, Err(FanoutError::Faulted(TaskError::fail("bad item"))));
        // One worker stopped after the failure, the other drained the rest.
        assert_eq!(ran.load(Ordering::SeqCst), 40);
        assert_eq!(p.status(), PromiseState::Faulted);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panic_becomes_fault() {
        fn explode() -> Result<(), TaskError> {
            panic!("item exploded")
        }
        let item: WorkRef = WorkFn::arc("panics", |_ctx: CancellationToken| async { explode() });
        let res = scheduler(2)
            .schedule(WorkBatch::repeat(item, 3, ()), 2, &CancellationToken::new())
            .await;
        assert_eq!(
            res,
            Err(FanoutError::Faulted(TaskError::Panicked {
                info: "item exploded".into()
            }))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancellation_during_execution_resolves_canceled() {
        let ctx = CancellationToken::new();
        let item: WorkRef = WorkFn::arc("waits", |ctx: CancellationToken| async move {
            tokio::select! {
                _ = ctx.cancelled() => Err(TaskError::Canceled),
                _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(()),
            }
        });

        let p = scheduler(2).schedule(WorkBatch::repeat(item, 4, ()), 2, &ctx);
        tokio::time::sleep(Duration::from_millis(20)).await;
        ctx.cancel();
        assert_eq!(p.await, Err(FanoutError::Canceled));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_completion_waits_for_frame_drain() {
        let endpoint = Arc::new(FrameEndpoint::new());
        let sched = Scheduler::builder(FanoutConfig::default())
            .with_endpoint(endpoint.clone())
            .build();
        assert_eq!(sched.config().max_parallel, MAX_PARALLEL);
        let item: WorkRef = WorkFn::arc("noop", |_ctx: CancellationToken| async { Ok::<_, TaskError>(()) });

        let p = sched.schedule_at(
            WorkBatch::repeat(item, 3, ()),
            2,
            FrameTiming::LateUpdate,
            &CancellationToken::new(),
        );
        while endpoint.pending(FrameTiming::LateUpdate) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(p.status(), PromiseState::Pending);
        assert!(!p.status().is_terminal());

        assert_eq!(endpoint.run_queued(FrameTiming::LateUpdate), 1);
        assert_eq!(p.await, Ok(()));
    }
}
