//! # Parallel event fan-out.
//!
//! ```text
//! raise_parallel(payload, ctx)
//!   ├─ ctx cancelled? ──► Err(Canceled)
//!   ├─ one listener   ──► run inline
//!   └─ otherwise:
//!        spawn L1 ─┐
//!        spawn L2 ─┼──► FuturesUnordered ──► first Err wins, else Ok after all
//!        spawn Lk ─┘
//! ```
//!
//! ## Rules
//! - No ordering between listeners.
//! - On the first failure the raise resolves; the remaining listeners keep
//!   running detached and are expected to honour the shared token.

use std::sync::Arc;

use futures::future::{self, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{FanoutError, TaskError};
use crate::events::Dispatch;
use crate::subscribers::{invoke, ListenerRef, Registry};

/// Awaits spawned routines, returning the first failure observed.
///
/// Handles still running when a failure is seen are dropped, which detaches them.
pub(crate) async fn first_failure(handles: Vec<JoinHandle<Result<(), FanoutError>>>) -> Result<(), FanoutError> {
    let mut running: FuturesUnordered<_> = handles.into_iter().collect();
    while let Some(joined) = running.next().await {
        let res = joined.unwrap_or_else(|err| Err(TaskError::from_join(err).into()));
        if let Err(err) = res {
            debug!(detached = running.len(), outcome = err.as_label(), "fan-out resolved early");
            return Err(err);
        }
    }
    Ok(())
}

async fn fan_out<T>(listeners: Vec<ListenerRef<T>>, payload: Arc<T>, ctx: CancellationToken) -> Result<(), FanoutError>
where
    T: Send + Sync + 'static,
{
    if let [only] = listeners.as_slice() {
        return invoke(only.as_ref(), &*payload, &ctx).await.map_err(FanoutError::from);
    }

    let handles = listeners
        .into_iter()
        .map(|listener| {
            let payload = Arc::clone(&payload);
            let ctx = ctx.clone();
            tokio::spawn(async move {
                invoke(listener.as_ref(), &*payload, &ctx)
                    .await
                    .map_err(FanoutError::from)
            })
        })
        .collect();
    first_failure(handles).await
}

/// Starts every listener of `registry` concurrently.
///
/// Must be awaited within a tokio runtime when more than one listener is subscribed.
pub fn raise_parallel<T>(registry: &Registry<ListenerRef<T>>, payload: T, ctx: &CancellationToken) -> Dispatch
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
    fan_out(listeners, Arc::new(payload), ctx.clone()).boxed()
}
