//! # Function-backed work items.
//!
//! - [`WorkFn`]: `Fn(CancellationToken) -> Fut`
//! - [`ArgWorkFn`]: `Fn(A, CancellationToken) -> Fut`
//! - [`BlockingWorkFn`]: synchronous `Fn() -> Result<(), TaskError>` run on the blocking pool
//!
//! ## Concurrency semantics
//! - Every [`Work::spawn`] call creates a **new** future that owns its state.
//! - No hidden mutation between invocations; shared state goes behind an explicit `Arc<...>`
//!   inside the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use taskfan::{TaskError, WorkFn, WorkRef};
//!
//! let w: WorkRef = WorkFn::arc("load-mesh", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(TaskError::Canceled);
//!     }
//!     Ok(())
//! });
//!
//! assert_eq!(w.name(), "load-mesh");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::work::{BoxWorkFuture, Work};

/// Zero-argument async work item.
#[derive(Debug)]
pub struct WorkFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkFn<F> {
    /// Creates a new function-backed item.
    ///
    /// Prefer [`WorkFn::arc`] when you immediately need a [`WorkRef`](crate::WorkRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the item and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Work<()> for WorkFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, _arg: (), ctx: CancellationToken) -> BoxWorkFuture {
        Box::pin((self.f)(ctx))
    }
}

/// Single-argument async work item; the batch argument is cloned into each call.
#[derive(Debug)]
pub struct ArgWorkFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ArgWorkFn<F> {
    /// Creates a new function-backed item.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the item and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<A, F, Fut> Work<A> for ArgWorkFn<F>
where
    F: Fn(A, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, arg: A, ctx: CancellationToken) -> BoxWorkFuture {
        Box::pin((self.f)(arg, ctx))
    }
}

/// Synchronous work item executed with [`tokio::task::spawn_blocking`].
///
/// ### Notes
/// - Cancellation is checked once, before the closure starts; a running
///   closure cannot be interrupted.
/// - A panic inside the closure becomes [`TaskError::Panicked`].
#[derive(Debug)]
pub struct BlockingWorkFn<F> {
    name: Cow<'static, str>,
    f: Arc<F>,
}

impl<F> BlockingWorkFn<F> {
    /// Creates a new blocking item.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    /// Creates the item and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Work<()> for BlockingWorkFn<F>
where
    F: Fn() -> Result<(), TaskError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, _arg: (), ctx: CancellationToken) -> BoxWorkFuture {
        let f = Arc::clone(&self.f);
        Box::pin(async move {
            if ctx.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            tokio::task::spawn_blocking(move || f())
                .await
                .unwrap_or_else(|err| Err(TaskError::from_join(err)))
        })
    }
}
