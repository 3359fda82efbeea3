//! # Event listener trait.
//!
//! Provides [`Listen`], the extension point for plugging handlers into an
//! [`AsyncEvent`](crate::AsyncEvent).
//!
//! ## Rules
//! - A listener receives the payload by reference and the shared [`CancellationToken`].
//! - Returning [`TaskError::Canceled`] resolves the raise as canceled.
//! - Any other error resolves the raise as faulted.
//! - Panics are caught and reported as [`TaskError::Panicked`].
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use taskfan::{Listen, TaskError};
//!
//! struct Resize;
//!
//! #[async_trait]
//! impl Listen<(u32, u32)> for Resize {
//!     async fn on_event(&self, size: &(u32, u32), ctx: &CancellationToken) -> Result<(), TaskError> {
//!         if ctx.is_cancelled() {
//!             return Err(TaskError::Canceled);
//!         }
//!         let _ = size;
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str { "resize" }
//! }
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Asynchronous listener for payloads of type `T`.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Honour `ctx` at your own suspension points.
#[async_trait]
pub trait Listen<T>: Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    /// Handles one raise.
    async fn on_event(&self, payload: &T, ctx: &CancellationToken) -> Result<(), TaskError>;

    /// Returns the listener name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a listener.
pub type ListenerRef<T> = Arc<dyn Listen<T>>;

/// Closure-backed listener: `Fn(T, CancellationToken) -> Fut`.
///
/// The payload is cloned into every call so the future can be `'static`.
pub struct ListenerFn<F> {
    name: &'static str,
    f: F,
}

impl<F> ListenerFn<F> {
    /// Creates a new closure-backed listener.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc(name: &'static str, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<T, F, Fut> Listen<T> for ListenerFn<F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    async fn on_event(&self, payload: &T, ctx: &CancellationToken) -> Result<(), TaskError> {
        (self.f)(payload.clone(), ctx.clone()).await
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Invokes one listener, converting a panic into [`TaskError::Panicked`].
///
/// **Warning**: `AssertUnwindSafe` is used; a listener that panics while
/// holding a lock on shared state may leave that state inconsistent.
pub(crate) async fn invoke<T>(
    listener: &dyn Listen<T>,
    payload: &T,
    ctx: &CancellationToken,
) -> Result<(), TaskError>
where
    T: Send + Sync + 'static,
{
    match AssertUnwindSafe(listener.on_event(payload, ctx)).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => Err(TaskError::from_panic(panic)),
    }
}
