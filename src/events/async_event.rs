//! # Asynchronous multicast event.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::events::{limited, parallel, sequential, Dispatch};
use crate::subscribers::{ListenerFn, ListenerRef, Registry, Subscription};

/// Event with asynchronous listeners and three dispatch disciplines.
///
/// | Raise               | Order                         | Concurrency            |
/// |---------------------|-------------------------------|------------------------|
/// | `raise_sequential`  | total, subscription order     | one listener at a time |
/// | `raise_parallel`    | none                          | all listeners          |
/// | `raise_limited`     | within a round-robin group    | `max_parallel` chains  |
///
/// Every raise snapshots the listeners synchronously and returns a `'static`
/// [`Dispatch`] future; subscribing or disposing afterwards does not affect it.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use tokio_util::sync::CancellationToken;
/// use taskfan::{AsyncEvent, TaskError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let resized: AsyncEvent<u32> = AsyncEvent::new();
/// let total = Arc::new(AtomicUsize::new(0));
///
/// let sink = Arc::clone(&total);
/// let sub = resized.subscribe_fn("sum", move |w: u32, _ctx: CancellationToken| {
///     let sink = Arc::clone(&sink);
///     async move {
///         sink.fetch_add(w as usize, Ordering::SeqCst);
///         Ok::<_, TaskError>(())
///     }
/// });
///
/// resized.raise_sequential(640, &CancellationToken::new()).await.unwrap();
/// assert_eq!(total.load(Ordering::SeqCst), 640);
///
/// sub.dispose();
/// assert_eq!(resized.count(), 0);
/// # }
/// ```
pub struct AsyncEvent<T> {
    registry: Registry<ListenerRef<T>>,
}

impl<T> Clone for AsyncEvent<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<T> Default for AsyncEvent<T> {
    fn default() -> Self {
        Self {
            registry: Registry::default(),
        }
    }
}

impl<T> AsyncEvent<T>
where
    T: Send + Sync + 'static,
{
    /// Creates an event with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a listener.
    pub fn subscribe(&self, listener: ListenerRef<T>) -> Subscription {
        self.registry.subscribe(listener)
    }

    /// Subscribes a closure; the payload is cloned into each call.
    pub fn subscribe_fn<F, Fut>(&self, name: &'static str, f: F) -> Subscription
    where
        T: Clone,
        F: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let listener: ListenerRef<T> = ListenerFn::arc(name, f);
        self.subscribe(listener)
    }

    /// Number of live listeners.
    pub fn count(&self) -> usize {
        self.registry.count()
    }

    /// True when nobody listens; callers may skip building the payload.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Removes every listener; returns how many were removed.
    pub fn clear(&self) -> usize {
        self.registry.clear()
    }

    /// Underlying registry.
    pub fn registry(&self) -> &Registry<ListenerRef<T>> {
        &self.registry
    }

    /// Invokes listeners one at a time in subscription order.
    pub fn raise_sequential(&self, payload: T, ctx: &CancellationToken) -> Dispatch {
        sequential::raise_sequential(&self.registry, payload, ctx)
    }

    /// Invokes all listeners concurrently.
    pub fn raise_parallel(&self, payload: T, ctx: &CancellationToken) -> Dispatch {
        parallel::raise_parallel(&self.registry, payload, ctx)
    }

    /// Invokes listeners as at most `max_parallel` round-robin sequential chains.
    pub fn raise_limited(&self, payload: T, max_parallel: usize, ctx: &CancellationToken) -> Dispatch {
        let listeners = if max_parallel == 0 || ctx.is_cancelled() {
            Vec::new()
        } else {
            self.registry.snapshot()
        };
        limited::limited_parallel(listeners, payload, max_parallel, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FanoutError;
    use crate::subscribers::Listen;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Appends its index after sleeping `delay_ms`.
    struct Recorder {
        index: usize,
        delay_ms: u64,
        log: Arc<Mutex<Vec<usize>>>,
    }

    #[async_trait]
    impl Listen<()> for Recorder {
        async fn on_event(&self, _payload: &(), _ctx: &CancellationToken) -> Result<(), TaskError> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            self.log.lock().push(self.index);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Listen<()> for Failing {
        async fn on_event(&self, _payload: &(), _ctx: &CancellationToken) -> Result<(), TaskError> {
            Err(TaskError::fail("listener failed"))
        }
    }

    fn recorders(event: &AsyncEvent<()>, delays: &[u64]) -> (Arc<Mutex<Vec<usize>>>, Vec<Subscription>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let subs = delays
            .iter()
            .enumerate()
            .map(|(index, &delay_ms)| {
                event.subscribe(Arc::new(Recorder {
                    index,
                    delay_ms,
                    log: Arc::clone(&log),
                }))
            })
            .collect();
        (log, subs)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sequential_follows_subscription_order() {
        let event = AsyncEvent::new();
        let (log, _subs) = recorders(&event, &[30, 1, 20, 0, 10]);

        event.raise_sequential((), &CancellationToken::new()).await.expect("raise");
        assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sequential_fault_stops_chain() {
        let event = AsyncEvent::new();
        let (log, _subs) = recorders(&event, &[0]);
        let _failing = event.subscribe(Arc::new(Failing));
        let late = event.subscribe(Arc::new(Recorder {
            index: 9,
            delay_ms: 0,
            log: Arc::clone(&log),
        }));

        let res = event.raise_sequential((), &CancellationToken::new()).await;
        assert_eq!(res, Err(FanoutError::Faulted(TaskError::fail("listener failed"))));
        assert_eq!(*log.lock(), vec![0]);
        assert!(late.dispose());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_runs_concurrently() {
        let event = AsyncEvent::new();
        let (log, _subs) = recorders(&event, &[200, 200, 200, 200]);

        let started = tokio::time::Instant::now();
        event.raise_parallel((), &CancellationToken::new()).await.expect("raise");
        assert!(started.elapsed() < Duration::from_millis(600));

        let mut seen = log.lock().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_surfaces_fault() {
        let event = AsyncEvent::new();
        let (_log, _subs) = recorders(&event, &[5, 5]);
        let _failing = event.subscribe(Arc::new(Failing));

        let res = event.raise_parallel((), &CancellationToken::new()).await;
        assert_eq!(res, Err(FanoutError::Faulted(TaskError::fail("listener failed"))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_limited_keeps_order_within_groups() {
        let event = AsyncEvent::new();
        let (log, _subs) = recorders(&event, &[40, 5, 30, 5, 20, 5]);

        event.raise_limited((), 2, &CancellationToken::new()).await.expect("raise");
        let log = log.lock().clone();
        assert_eq!(log.len(), 6);

        let pos = |i: usize| log.iter().position(|&x| x == i).expect("listener ran");
        // group 0: 0, 2, 4 / group 1: 1, 3, 5
        assert!(pos(0) < pos(2) && pos(2) < pos(4));
        assert!(pos(1) < pos(3) && pos(3) < pos(5));
    }

    /// Cancels the shared token after `delay_ms`, then reports cancellation like its peers.
    struct Canceller {
        delay_ms: u64,
        ctx: CancellationToken,
    }

    #[async_trait]
    impl Listen<()> for Canceller {
        async fn on_event(&self, _payload: &(), _ctx: &CancellationToken) -> Result<(), TaskError> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            self.ctx.cancel();
            Err(TaskError::Canceled)
        }
    }

    /// Waits for the token and reports it.
    struct Waiter;

    #[async_trait]
    impl Listen<()> for Waiter {
        async fn on_event(&self, _payload: &(), ctx: &CancellationToken) -> Result<(), TaskError> {
            tokio::select! {
                _ = ctx.cancelled() => Err(TaskError::Canceled),
                _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(()),
            }
        }
    }

    struct Exploding;

    #[async_trait]
    impl Listen<()> for Exploding {
        async fn on_event(&self, _payload: &(), _ctx: &CancellationToken) -> Result<(), TaskError> {
            panic!("listener exploded")
        }
    }

    /// Tracks how many listeners are inside `on_event` at once.
    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
        done: AtomicUsize,
    }

    struct Metered {
        delay_ms: u64,
        gauge: Arc<Gauge>,
    }

    #[async_trait]
    impl Listen<()> for Metered {
        async fn on_event(&self, _payload: &(), _ctx: &CancellationToken) -> Result<(), TaskError> {
            let now = self.gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.gauge.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            self.gauge.current.fetch_sub(1, Ordering::SeqCst);
            self.gauge.done.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn metered(event: &AsyncEvent<()>, count: usize, delay_ms: u64) -> (Arc<Gauge>, Vec<Subscription>) {
        let gauge = Arc::new(Gauge::default());
        let subs = (0..count)
            .map(|_| {
                event.subscribe(Arc::new(Metered {
                    delay_ms,
                    gauge: Arc::clone(&gauge),
                }))
            })
            .collect();
        (gauge, subs)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_cancel_mid_flight() {
        let event = AsyncEvent::new();
        let ctx = CancellationToken::new();
        let _canceller = event.subscribe(Arc::new(Canceller {
            delay_ms: 20,
            ctx: ctx.clone(),
        }));
        let _waiters: Vec<_> = (0..3).map(|_| event.subscribe(Arc::new(Waiter))).collect();

        let started = tokio::time::Instant::now();
        let res = event.raise_parallel((), &ctx).await;
        assert_eq!(res, Err(FanoutError::Canceled));
        assert!(ctx.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_panic_becomes_fault() {
        let event = AsyncEvent::new();
        let (_log, _subs) = recorders(&event, &[5, 5]);
        let _exploding = event.subscribe(Arc::new(Exploding));

        let res = event.raise_parallel((), &CancellationToken::new()).await;
        assert_eq!(
            res,
            Err(FanoutError::Faulted(TaskError::Panicked {
                info: "listener exploded".into()
            }))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_limited_bounds_chains_in_flight() {
        let event = AsyncEvent::new();
        let (gauge, _subs) = metered(&event, 12, 20);

        event.raise_limited((), 3, &CancellationToken::new()).await.expect("raise");
        assert_eq!(gauge.done.load(Ordering::SeqCst), 12);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(gauge.current.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_limited_gives_each_listener_a_chain_when_few() {
        let event = AsyncEvent::new();
        let (gauge, _subs) = metered(&event, 3, 200);

        let started = tokio::time::Instant::now();
        event.raise_limited((), 8, &CancellationToken::new()).await.expect("raise");
        // three one-listener chains side by side, not one after another
        assert!(started.elapsed() < Duration::from_millis(550));
        assert_eq!(gauge.done.load(Ordering::SeqCst), 3);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_sequential_cancel_in_last_listener_needs_report() {
        let event: AsyncEvent<()> = AsyncEvent::new();
        let (log, _subs) = recorders(&event, &[0]);
        let ctx = CancellationToken::new();
        let token = ctx.clone();
        let _last = event.subscribe_fn("cancels-quietly", move |_: (), _ctx: CancellationToken| {
            token.cancel();
            async { Ok::<_, TaskError>(()) }
        });

        assert_eq!(event.raise_sequential((), &ctx).await, Ok(()));
        assert!(ctx.is_cancelled());
        assert_eq!(*log.lock(), vec![0]);
    }

    #[test]
    fn test_registry_shares_listeners_with_event() {
        let event: AsyncEvent<()> = AsyncEvent::new();
        let sub = event.subscribe(Arc::new(Failing));
        assert_eq!(event.registry().count(), 1);
        assert_eq!(event.registry().snapshot().len(), event.count());

        sub.dispose();
        assert!(event.registry().is_empty());
    }

    #[tokio::test]
    async fn test_limited_rejects_zero_groups() {
        let event = AsyncEvent::new();
        let (log, _subs) = recorders(&event, &[0, 0]);

        let ctx = CancellationToken::new();
        ctx.cancel();
        let res = event.raise_limited((), 0, &ctx).await;
        assert_eq!(
            res,
            Err(FanoutError::InvalidArgument {
                name: "max_parallel",
                value: 0
            })
        );
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_listener_can_dispose_itself_during_raise() {
        let event: AsyncEvent<()> = AsyncEvent::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let own: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let counter = Arc::clone(&calls);
        let slot = Arc::clone(&own);
        let sub = event.subscribe_fn("once", move |_: (), _ctx: CancellationToken| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(sub) = slot.lock().as_ref() {
                sub.dispose();
            }
            async { Ok::<_, TaskError>(()) }
        });
        *own.lock() = Some(sub);
        let (_log, _others) = recorders(&event, &[0, 0]);

        event.raise_sequential((), &CancellationToken::new()).await.expect("first");
        assert_eq!(event.count(), 2);
        event.raise_sequential((), &CancellationToken::new()).await.expect("second");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
