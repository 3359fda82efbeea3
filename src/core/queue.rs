//! # Work queue core: lock-free index claiming.
//!
//! N worker routines agree on which item runs next through one shared
//! atomic counter. The counter starts at the number of items already handed
//! out statically (one per worker) and every claim is a single
//! fetch-and-increment.
//!
//! ```text
//! items:   [0] [1] [2] | [3] [4] [5] [6] ...
//!           ▲   ▲   ▲     ▲
//!           w0  w1  w2    next (shared AtomicUsize)
//! ```
//!
//! ## Rules
//! - Every index in `[0, limit)` is returned to exactly one caller.
//! - Wait-free, no allocation, no locks.
//! - After exhaustion the counter keeps growing by at most one per failed claim.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Claims the next index from `counter`, or `None` once `limit` is reached.
///
/// Only the atomicity of the increment matters for uniqueness, so a relaxed
/// read-modify-write is sufficient.
#[inline]
pub fn claim_next(counter: &AtomicUsize, limit: usize) -> Option<usize> {
    let index = counter.fetch_add(1, Ordering::Relaxed);
    (index < limit).then_some(index)
}

/// Shared cursor over `limit` items.
#[derive(Debug)]
pub struct WorkQueue {
    next: AtomicUsize,
    limit: usize,
}

impl WorkQueue {
    /// Creates a queue whose first `claimed` indices are already assigned.
    pub fn new(claimed: usize, limit: usize) -> Self {
        Self {
            next: AtomicUsize::new(claimed),
            limit,
        }
    }

    /// Claims the next unassigned index.
    #[inline]
    pub fn claim_next(&self) -> Option<usize> {
        claim_next(&self.next, self.limit)
    }

    /// Total number of items.
    pub fn limit(&self) -> usize {
        self.limit
    }
}
