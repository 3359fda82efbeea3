//! # Work item abstraction.
//!
//! A work item is a callable the scheduler invokes once per batch slot.
//! [`Work::spawn`] produces a fresh `'static` future per invocation, so the
//! same item may appear many times in a batch (see `WorkBatch::repeat`) and
//! run on several workers at once.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed future returned by [`Work::spawn`].
pub type BoxWorkFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Shared handle to a work item taking an argument of type `A`.
pub type WorkRef<A = ()> = Arc<dyn Work<A>>;

/// # Asynchronous, cancelable work item.
///
/// Implementors receive the batch argument and the shared
/// [`CancellationToken`]. Returning [`TaskError::Canceled`] after observing the
/// token resolves the whole schedule as canceled.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use taskfan::{BoxWorkFuture, TaskError, Work};
///
/// struct Decode;
///
/// impl Work<u32> for Decode {
///     fn name(&self) -> &str { "decode" }
///
///     fn spawn(&self, frame: u32, ctx: CancellationToken) -> BoxWorkFuture {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(TaskError::Canceled);
///             }
///             let _ = frame;
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Work<A = ()>: Send + Sync + 'static {
    /// Returns a stable, human-readable item name used in logs.
    fn name(&self) -> &str;

    /// Creates the future for one invocation.
    fn spawn(&self, arg: A, ctx: CancellationToken) -> BoxWorkFuture;
}
