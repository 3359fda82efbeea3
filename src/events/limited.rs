//! # Round-robin grouping scheduler.
//!
//! Spreads `N` heterogeneous listeners over `C` independent sequential chains
//! running in parallel. Listener `i` joins group `i mod C`, so each chain keeps
//! the relative subscription order of its members.
//!
//! ```text
//! N = 7, C = 3
//!   group 0: L0 ─► L3 ─► L6
//!   group 1: L1 ─► L4                 (groups run concurrently)
//!   group 2: L2 ─► L5
//! ```
//!
//! ## Rules
//! - `max_parallel == 0` resolves [`FanoutError::InvalidArgument`].
//! - `C = min(N, max_parallel)`; with `N <= max_parallel` every listener gets its own group.
//! - Order is guaranteed within a group only.
//! - Checks run argument → cancellation → empty.

use std::sync::Arc;

use futures::future::{self, FutureExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::FanoutError;
use crate::events::parallel::first_failure;
use crate::events::sequential::run_chain;
use crate::events::Dispatch;
use crate::subscribers::ListenerRef;

/// Assigns indices `0..n` to `min(n, groups)` groups round-robin.
///
/// Returns an empty vector when `n == 0` or `groups == 0`.
///
/// # Example
/// ```
/// use taskfan::round_robin_groups;
///
/// assert_eq!(
///     round_robin_groups(7, 3),
///     vec![vec![0, 3, 6], vec![1, 4], vec![2, 5]],
/// );
/// assert_eq!(round_robin_groups(2, 8), vec![vec![0], vec![1]]);
/// ```
pub fn round_robin_groups(n: usize, groups: usize) -> Vec<Vec<usize>> {
    let groups = groups.min(n);
    if groups == 0 {
        return Vec::new();
    }

    let mut out: Vec<Vec<usize>> = (0..groups)
        .map(|_| Vec::with_capacity(n.div_ceil(groups)))
        .collect();
    for i in 0..n {
        out[i % groups].push(i);
    }
    out
}

/// Runs `listeners` as at most `max_parallel` concurrent sequential chains.
///
/// Resolves on the first failing chain; the other chains keep running detached
/// and are expected to honour `ctx`.
pub fn limited_parallel<T>(
    listeners: Vec<ListenerRef<T>>,
    payload: T,
    max_parallel: usize,
    ctx: &CancellationToken,
) -> Dispatch
where
    T: Send + Sync + 'static,
{
    if max_parallel == 0 {
        return future::ready(Err(FanoutError::InvalidArgument {
            name: "max_parallel",
            value: max_parallel,
        }))
        .boxed();
    }
    if ctx.is_cancelled() {
        return future::ready(Err(FanoutError::Canceled)).boxed();
    }
    if listeners.is_empty() {
        return future::ready(Ok(())).boxed();
    }

    let payload = Arc::new(payload);
    let groups = round_robin_groups(listeners.len(), max_parallel);
    debug!(listeners = listeners.len(), groups = groups.len(), "limited raise");

    let chains: Vec<Vec<ListenerRef<T>>> = groups
        .into_iter()
        .map(|group| group.into_iter().map(|i| Arc::clone(&listeners[i])).collect())
        .collect();

    if chains.len() == 1 {
        let chain = chains.into_iter().flatten().collect();
        return run_chain(chain, payload, ctx.clone()).boxed();
    }

    let ctx = ctx.clone();
    async move {
        let handles = chains
            .into_iter()
            .map(|chain| tokio::spawn(run_chain(chain, Arc::clone(&payload), ctx.clone())))
            .collect();
        first_failure(handles).await
    }
    .boxed()
}
