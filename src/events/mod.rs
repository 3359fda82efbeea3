//! # Multicast events.
//!
//! [`AsyncEvent`] dispatches a payload to asynchronous listeners with one of
//! three disciplines; [`SyncEvent`] calls plain closures on the raising thread.
//!
//! ## Architecture
//! ```text
//!                      ┌──► raise_sequential ──► L1 ─► L2 ─► ... ─► Lk
//! AsyncEvent::raise_* ─┼──► raise_parallel   ──► spawn L1 | L2 | ... | Lk
//!        │             └──► raise_limited    ──► C chains (round-robin), in parallel
//!        ▼
//!   Registry::snapshot()  (taken synchronously, at call time)
//! ```
//!
//! ## Rules
//! - A pre-cancelled token resolves [`FanoutError::Canceled`](crate::FanoutError::Canceled)
//!   before anything is invoked, whatever the listener count.
//! - A listener returning [`TaskError::Canceled`](crate::TaskError::Canceled) resolves the raise as canceled.
//! - Any other listener error or panic resolves it as faulted.
//! - The returned [`Dispatch`] is `'static`; it does not borrow the event.

mod async_event;
mod limited;
mod parallel;
mod sequential;
mod sync_event;

use futures::future::BoxFuture;

use crate::error::FanoutError;

/// Future returned by every asynchronous raise.
pub type Dispatch = BoxFuture<'static, Result<(), FanoutError>>;

pub use async_event::AsyncEvent;
pub use limited::{limited_parallel, round_robin_groups};
pub use parallel::raise_parallel;
pub use sequential::raise_sequential;
pub use sync_event::{SyncEvent, SyncListener};
