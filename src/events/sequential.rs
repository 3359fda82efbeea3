//! # Sequential event chain.
//!
//! ```text
//! raise_sequential(payload, ctx)
//!   ├─ ctx cancelled? ──► Err(Canceled)        (no listener invoked)
//!   └─ for L in snapshot (subscription order):
//!        ├─ ctx cancelled? ──► Err(Canceled)   (rest skipped)
//!        ├─ L.on_event().await                 (fully, incl. its own suspensions)
//!        └─ Err(e) ──► Err(e.into())           (rest skipped)
//! ```
//!
//! ## Rules
//! - The side effects of `L1` are complete before `L2` starts.
//! - The token is checked only between listeners; a cancel that fires during
//!   the last listener surfaces only if that listener returns `Err(Canceled)`.

use std::sync::Arc;

use futures::future::{self, FutureExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::FanoutError;
use crate::events::Dispatch;
use crate::subscribers::{invoke, ListenerRef, Registry};

/// Runs `listeners` one at a time, stopping at the first failure or cancellation.
pub(crate) async fn run_chain<T>(
    listeners: Vec<ListenerRef<T>>,
    payload: Arc<T>,
    ctx: CancellationToken,
) -> Result<(), FanoutError>
where
    T: Send + Sync + 'static,
{
    for (position, listener) in listeners.iter().enumerate() {
        if ctx.is_cancelled() {
            debug!(position, remaining = listeners.len() - position, "chain cancelled");
            return Err(FanoutError::Canceled);
        }
        if let Err(err) = invoke(listener.as_ref(), &*payload, &ctx).await {
            debug!(position, listener = listener.name(), error = %err, "chain stopped");
            return Err(err.into());
        }
    }
    Ok(())
}

/// Invokes every listener of `registry` in subscription order.
///
/// The subscriber snapshot is taken when this function is called; the
/// returned future owns it, so listeners may unsubscribe themselves freely.
pub fn raise_sequential<T>(registry: &Registry<ListenerRef<T>>, payload: T, ctx: &CancellationToken) -> Dispatch
where
    T: Send + Sync + 'static,
{
    if ctx.is_cancelled() {
        return future::ready(Err(FanoutError::Canceled)).boxed();
    }
    let listeners = registry.snapshot();
    if listeners.is_empty() {
        return future::ready(Ok(())).boxed();
    }
    run_chain(listeners, Arc::new(payload), ctx.clone()).boxed()
}
