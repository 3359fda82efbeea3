//! # Subscription bag.
//!
//! Collects [`Subscription`]s owned by one component (a scene object, a
//! window, ...) and disposes them together when it goes away.

use parking_lot::Mutex;

use crate::subscribers::registry::Subscription;

#[derive(Default)]
struct BagState {
    subs: Vec<Subscription>,
    disposed: bool,
}

/// Group of subscriptions disposed together, on [`dispose`](Self::dispose) or drop.
///
/// Adding to an already-disposed bag disposes the new subscription immediately.
///
/// # Example
/// ```
/// use taskfan::{Registry, SubscriptionBag};
///
/// let reg: Registry<u8> = Registry::new();
/// {
///     let bag = SubscriptionBag::new();
///     bag.add(reg.subscribe(1));
///     bag.add(reg.subscribe(2));
///     assert_eq!(reg.count(), 2);
/// }
/// assert_eq!(reg.count(), 0);
/// ```
#[derive(Default)]
pub struct SubscriptionBag {
    state: Mutex<BagState>,
}

impl SubscriptionBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `sub`.
    pub fn add(&self, sub: Subscription) {
        let mut state = self.state.lock();
        if state.disposed {
            drop(state);
            sub.dispose();
            return;
        }
        state.subs.push(sub);
    }

    /// Disposes every collected subscription; returns how many entries were removed.
    ///
    /// Idempotent. Tokens are disposed outside the bag lock.
    pub fn dispose(&self) -> usize {
        let subs = {
            let mut state = self.state.lock();
            state.disposed = true;
            std::mem::take(&mut state.subs)
        };
        subs.iter().filter(|s| s.dispose()).count()
    }

    /// Number of subscriptions held.
    pub fn len(&self) -> usize {
        self.state.lock().subs.len()
    }

    /// True when the bag holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }
}

impl Drop for SubscriptionBag {
    fn drop(&mut self) {
        self.dispose();
    }
}
