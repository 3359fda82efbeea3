//! # taskfan
//!
//! **Taskfan** is a small async coordination library on top of tokio.
//!
//! It provides two families of primitives:
//! - a **bounded parallel scheduler** that drains a batch of independent work
//!   items with at most `cap` workers, using a shared atomic index instead of a
//!   static partition;
//! - **multicast events** with dynamically subscribed listeners and three
//!   dispatch disciplines (sequential, parallel, round-robin limited).
//!
//! Both share one cancellation model: a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! checked eagerly before anything starts, then honoured cooperatively by the
//! items and listeners themselves.
//!
//! ## Architecture
//! ### Scheduler
//! ```text
//!   WorkBatch [w0 w1 w2 w3 w4 w5 w6 ...]          FanoutConfig
//!        │                                       (max_parallel, parallelism)
//!        ▼                                              │
//! ┌─────────────────────────────────────────────────────┴──────────┐
//! │ Scheduler::schedule(batch, cap, ctx)                           │
//! │   plan = min(len, hw_parallelism, clamp(cap, 1, max_parallel)) │
//! └──────┬──────────────────┬──────────────────┬───────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐
//!   │ worker 0 │       │ worker 1 │  ...  │ worker p │   run item[id], then
//!   └────┬─────┘       └────┬─────┘       └────┬─────┘   claim_next() until None
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!                   WorkQueue (AtomicUsize)
//!                           │ all workers joined
//!                           ▼
//!        Promise ◄── inline, or Endpoint::post(FrameTiming, continuation)
//! ```
//!
//! ### Events
//! ```text
//! subscribe(l) ──► Registry ──► Subscription ──► dispose()
//!                     │
//!    raise_* ─────────┴─► snapshot ──► sequential | parallel | limited ──► Dispatch
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Scheduling**    | Bounded parallel drain of a work batch.                        | [`Scheduler`], [`Promise`], [`WorkBatch`]   |
//! | **Work items**    | Async, argument-taking and blocking callables.                 | [`Work`], [`WorkFn`], [`ArgWorkFn`], [`BlockingWorkFn`] |
//! | **Events**        | Multicast with sequential / parallel / limited dispatch.       | [`AsyncEvent`], [`SyncEvent`], [`Listen`]   |
//! | **Subscriptions** | Ordered registry, disposable tokens, bags.                     | [`Registry`], [`Subscription`], [`SubscriptionBag`] |
//! | **Frame hand-off**| Resume awaiters at a chosen phase of a frame loop.             | [`Endpoint`], [`FrameEndpoint`], [`FrameTiming`] |
//! | **Errors**        | Typed item errors and schedule/raise outcomes.                 | [`TaskError`], [`FanoutError`]              |
//! | **Configuration** | Parallel ceiling and hardware parallelism override.            | [`FanoutConfig`]                            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`TraceListener`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use taskfan::{AsyncEvent, FanoutConfig, Scheduler, TaskError, WorkBatch, WorkFn, WorkRef};
//!
//! #[tokio::main(flavor = "multi_thread", worker_threads = 2)]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = CancellationToken::new();
//!
//!     // Load 8 resources, at most 3 at a time.
//!     let loaded = Arc::new(AtomicUsize::new(0));
//!     let counter = Arc::clone(&loaded);
//!     let load: WorkRef = WorkFn::arc("load", move |_ctx: CancellationToken| {
//!         let counter = Arc::clone(&counter);
//!         async move {
//!             counter.fetch_add(1, Ordering::SeqCst);
//!             Ok::<_, TaskError>(())
//!         }
//!     });
//!     let scheduler = Scheduler::new(FanoutConfig::default());
//!     scheduler.schedule(WorkBatch::repeat(load, 8, ()), 3, &ctx).await?;
//!     assert_eq!(loaded.load(Ordering::SeqCst), 8);
//!
//!     // Tell listeners, in subscription order.
//!     let ready: AsyncEvent<usize> = AsyncEvent::new();
//!     let _sub = ready.subscribe_fn("report", |n: usize, _ctx: CancellationToken| async move {
//!         println!("{n} resources ready");
//!         Ok::<_, TaskError>(())
//!     });
//!     ready.raise_sequential(8, &ctx).await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod frame;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    claim_next, FanoutConfig, Outcome, Promise, PromiseState, Scheduler, SchedulerBuilder, WorkQueue,
    MAX_PARALLEL,
};
pub use error::{FanoutError, TaskError};
pub use events::{
    limited_parallel, raise_parallel, raise_sequential, round_robin_groups, AsyncEvent, Dispatch, SyncEvent,
    SyncListener,
};
pub use frame::{Continuation, Endpoint, FrameEndpoint, FrameTiming};
pub use subscribers::{Listen, ListenerFn, ListenerRef, Registry, Subscription, SubscriptionBag, SubscriptionId};
pub use tasks::{ArgWorkFn, BlockingWorkFn, BoxWorkFuture, Work, WorkBatch, WorkFn, WorkRef};

// Optional: expose a simple built-in tracing listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::TraceListener;
