//! # Listeners and subscriptions.
//!
//! This module provides the [`Listen`] trait, the [`Registry`] that stores
//! listeners in subscription order, and the [`Subscription`] tokens that
//! remove them.
//!
//! ## Architecture
//! ```text
//!   AsyncEvent<T> / SyncEvent<T>
//!          │ owns
//!          ▼
//!   Registry<L> ── subscribe(l) ──► Subscription ──► SubscriptionBag (optional)
//!          │
//!          └── snapshot() ──► [L1, L2, ... Lk] ──► dispatch discipline
//!                                                  (sequential / parallel / limited)
//! ```
//!
//! ## Listener types
//! - **Trait listeners** - implement [`Listen`] for a type
//! - **Closure listeners** - wrap `Fn(T, CancellationToken) -> Fut` in [`ListenerFn`]
//! - **TraceListener** - logs payloads (feature `logging`)

mod bag;
mod listener;
mod registry;

#[cfg(feature = "logging")]
mod trace;

pub use bag::SubscriptionBag;
pub use listener::{Listen, ListenerFn, ListenerRef};
pub use registry::{Registry, Subscription, SubscriptionId};

pub(crate) use listener::invoke;

#[cfg(feature = "logging")]
pub use trace::TraceListener;
