//! # Subscription registry.
//!
//! [`Registry`] keeps listeners in subscription order and hands out
//! [`Subscription`] tokens that remove exactly their own entry.
//!
//! ## Architecture
//! ```text
//! subscribe(l) ──► entries.push(Entry{ id, l }) ──► Subscription{ id, Weak<registry> }
//!
//! raise ──► snapshot() (clone of listeners, lock released) ──► invoke in order
//!                                 ▲
//! token.dispose() ──► remove by id (order of the rest unchanged)
//! ```
//!
//! ## Rules
//! - Removal is by identity, never by index.
//! - Dispatch iterates a snapshot, so disposal during a raise cannot corrupt it.
//! - `dispose` is idempotent; a token outliving its registry is a no-op.
//! - The lock is held only to push, remove or copy; never while a listener runs.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

/// Identity of one registry entry.
pub type SubscriptionId = u64;

struct Entry<L> {
    id: SubscriptionId,
    listener: L,
}

struct Inner<L> {
    entries: RwLock<Vec<Entry<L>>>,
    next_id: AtomicU64,
}

/// Removal hook a [`Subscription`] calls on disposal.
trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

impl<L: Send + Sync> Unsubscribe for Inner<L> {
    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        match entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// Ordered, mutable collection of listeners of type `L`.
///
/// Cloning is cheap and yields a handle to the same registry.
///
/// # Example
/// ```
/// use taskfan::Registry;
///
/// let reg: Registry<&'static str> = Registry::new();
/// let a = reg.subscribe("a");
/// let _b = reg.subscribe("b");
/// assert_eq!(reg.snapshot(), vec!["a", "b"]);
///
/// a.dispose();
/// a.dispose();
/// assert_eq!(reg.count(), 1);
/// ```
pub struct Registry<L> {
    inner: Arc<Inner<L>>,
}

impl<L> Clone for Registry<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L> Default for Registry<L> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }
}

impl<L> Registry<L>
where
    L: Clone + Send + Sync + 'static,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` and returns the token that removes it.
    pub fn subscribe(&self, listener: L) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.entries.write().push(Entry { id, listener });

        let inner: Arc<dyn Unsubscribe> = self.inner.clone();
        Subscription {
            id,
            source: Arc::downgrade(&inner),
            disposed: AtomicBool::new(false),
        }
    }

    /// Number of live entries.
    pub fn count(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// True when no listener is subscribed.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Copies the current listeners in subscription order.
    pub fn snapshot(&self) -> Vec<L> {
        self.inner
            .entries
            .read()
            .iter()
            .map(|e| e.listener.clone())
            .collect()
    }

    /// Removes every entry and returns how many were removed.
    ///
    /// Outstanding tokens become no-ops.
    pub fn clear(&self) -> usize {
        let mut entries = self.inner.entries.write();
        let removed = entries.len();
        entries.clear();
        removed
    }
}

/// Disposable handle for one registry entry.
///
/// Dropping the token does **not** unsubscribe; call
/// [`dispose`](Self::dispose) or collect tokens in a
/// [`SubscriptionBag`](crate::SubscriptionBag).
#[must_use = "dropping a Subscription keeps the listener subscribed; call dispose() to remove it"]
pub struct Subscription {
    id: SubscriptionId,
    source: Weak<dyn Unsubscribe>,
    disposed: AtomicBool,
}

impl Subscription {
    /// Identity of the entry this token controls.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the entry. Returns `true` only for the call that removed it.
    ///
    /// Safe to call from inside a listener that is currently being invoked.
    pub fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        match self.source.upgrade() {
            Some(source) => source.unsubscribe(self.id),
            None => false,
        }
    }

    /// True once [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
