//! # Immutable batch of work items.
//!
//! A [`WorkBatch`] is what the scheduler drains: an ordered list of items (or
//! one item repeated `count` times) plus one argument cloned into every call.
//! Once handed to `Scheduler::schedule` it is shared read-only by all workers.

use std::sync::Arc;

use crate::tasks::work::WorkRef;

enum Items<A> {
    List(Arc<[WorkRef<A>]>),
    Repeat { item: WorkRef<A>, count: usize },
}

impl<A> Clone for Items<A> {
    fn clone(&self) -> Self {
        match self {
            Items::List(list) => Items::List(Arc::clone(list)),
            Items::Repeat { item, count } => Items::Repeat {
                item: Arc::clone(item),
                count: *count,
            },
        }
    }
}

/// Ordered, immutable sequence of work items sharing one argument.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use taskfan::{TaskError, WorkBatch, WorkFn, WorkRef};
///
/// let ping: WorkRef = WorkFn::arc("ping", |_ctx: CancellationToken| async { Ok::<_, TaskError>(()) });
///
/// let list = WorkBatch::new(vec![ping.clone(), ping.clone()]);
/// assert_eq!(list.len(), 2);
///
/// let repeated = WorkBatch::repeat(ping, 10, ());
/// assert_eq!(repeated.len(), 10);
/// assert!(repeated.get(10).is_none());
/// ```
#[derive(Clone)]
pub struct WorkBatch<A = ()> {
    items: Items<A>,
    arg: A,
}

impl WorkBatch<()> {
    /// Creates a batch of zero-argument items.
    pub fn new(items: impl IntoIterator<Item = WorkRef>) -> Self {
        Self::with_arg(items, ())
    }
}

impl<A> WorkBatch<A> {
    /// Creates a batch whose items all receive a clone of `arg`.
    pub fn with_arg(items: impl IntoIterator<Item = WorkRef<A>>, arg: A) -> Self {
        Self {
            items: Items::List(items.into_iter().collect()),
            arg,
        }
    }

    /// Creates a batch that invokes `item` exactly `count` times.
    pub fn repeat(item: WorkRef<A>, count: usize, arg: A) -> Self {
        Self {
            items: Items::Repeat { item, count },
            arg,
        }
    }

    /// Number of invocations in the batch.
    pub fn len(&self) -> usize {
        match &self.items {
            Items::List(list) => list.len(),
            Items::Repeat { count, .. } => *count,
        }
    }

    /// True when the batch has no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&WorkRef<A>> {
        match &self.items {
            Items::List(list) => list.get(index),
            Items::Repeat { item, count } => (index < *count).then_some(item),
        }
    }

    /// The argument shared by every invocation.
    pub fn arg(&self) -> &A {
        &self.arg
    }
}

impl<A: 'static> std::fmt::Debug for WorkBatch<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = (0..self.len().min(8))
            .filter_map(|i| self.get(i).map(|w| w.name()))
            .collect();
        f.debug_struct("WorkBatch")
            .field("len", &self.len())
            .field("head", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::WorkFn;
    use tokio_util::sync::CancellationToken;

    fn named(name: &'static str) -> WorkRef {
        WorkFn::arc(name, |_ctx: CancellationToken| async { Ok::<_, TaskError>(()) })
    }

    #[test]
    fn test_debug_lists_len_and_head() {
        let batch = WorkBatch::new(vec![named("load"), named("parse")]);
        assert_eq!(format!("{batch:?}"), r#"WorkBatch { len: 2, head: ["load", "parse"] }"#);
    }

    #[test]
    fn test_debug_head_is_bounded() {
        let batch = WorkBatch::repeat(named("tick"), 20, ());
        let shown = format!("{batch:?}");
        assert!(shown.starts_with("WorkBatch { len: 20, head: ["));
        assert_eq!(shown.matches("\"tick\"").count(), 8);
    }
}
