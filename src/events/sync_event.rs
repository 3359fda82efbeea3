//! # Synchronous multicast event.

use std::sync::Arc;

use crate::subscribers::{Registry, Subscription};

/// Shared synchronous listener.
pub type SyncListener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Event whose listeners run on the raising thread, in subscription order.
///
/// Same registry and token semantics as [`AsyncEvent`](crate::AsyncEvent):
/// the raise iterates a snapshot, so a listener may dispose any token
/// (including its own) while being invoked. A panicking listener unwinds
/// into the caller of [`raise`](Self::raise).
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
/// use taskfan::SyncEvent;
///
/// let closed: SyncEvent<u32> = SyncEvent::new();
/// let last = Arc::new(AtomicU32::new(0));
/// let sink = Arc::clone(&last);
/// let _sub = closed.subscribe(move |code: &u32| sink.store(*code, Ordering::SeqCst));
///
/// assert_eq!(closed.raise(&7), 1);
/// assert_eq!(last.load(Ordering::SeqCst), 7);
/// ```
pub struct SyncEvent<T> {
    registry: Registry<SyncListener<T>>,
}

impl<T> Clone for SyncEvent<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<T> Default for SyncEvent<T> {
    fn default() -> Self {
        Self {
            registry: Registry::default(),
        }
    }
}

impl<T: 'static> SyncEvent<T> {
    /// Creates an event with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a listener.
    pub fn subscribe(&self, f: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.registry.subscribe(Arc::new(f))
    }

    /// Number of live listeners.
    pub fn count(&self) -> usize {
        self.registry.count()
    }

    /// True when nobody listens.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Removes every listener; returns how many were removed.
    pub fn clear(&self) -> usize {
        self.registry.clear()
    }

    /// Invokes the current listeners in order; returns how many ran.
    pub fn raise(&self, payload: &T) -> usize {
        let listeners = self.registry.snapshot();
        for listener in &listeners {
            listener(payload);
        }
        listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_raise_runs_in_order() {
        let event: SyncEvent<&'static str> = SyncEvent::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let subs: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|tag| {
                let log = Arc::clone(&log);
                event.subscribe(move |p: &&'static str| log.lock().push(format!("{tag}:{p}")))
            })
            .collect();

        assert_eq!(event.raise(&"x"), 3);
        assert_eq!(*log.lock(), vec!["a:x", "b:x", "c:x"]);

        subs[1].dispose();
        log.lock().clear();
        assert_eq!(event.raise(&"y"), 2);
        assert_eq!(*log.lock(), vec!["a:y", "c:y"]);
    }

    #[test]
    fn test_dispose_during_raise_affects_next_raise_only() {
        let event: SyncEvent<()> = SyncEvent::new();
        let later: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&later);
        let _first = event.subscribe(move |_| {
            if let Some(sub) = slot.lock().as_ref() {
                sub.dispose();
            }
        });
        *later.lock() = Some(event.subscribe(|_| {}));

        assert_eq!(event.raise(&()), 2);
        assert_eq!(event.count(), 1);
        assert_eq!(event.raise(&()), 1);
    }
}
