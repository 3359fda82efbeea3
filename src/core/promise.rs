//! # Promise: a cloneable, awaitable handle to a scheduled batch.
//!
//! A [`Promise`] is either already resolved (empty batch, pre-canceled signal)
//! or pending on a [`watch`] channel fed by the batch driver.
//!
//! ```text
//! Scheduler::schedule ──► driver task ──► Completer::complete(outcome)
//!                                              │ (inline or via Endpoint::post)
//!                                              ▼
//!                                   watch<Option<Outcome>>
//!                                   ├──► promise.wait()
//!                                   ├──► clone.await
//!                                   └──► promise.status()
//! ```
//!
//! ## Rules
//! - The outcome is stored once; every clone and every await observes the same value.
//! - Awaiting never re-runs work.
//! - If the completer is dropped without completing, awaiters get [`FanoutError::Abandoned`].

use std::future::IntoFuture;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;

use crate::error::FanoutError;

/// Terminal value of a schedule.
pub type Outcome = Result<(), FanoutError>;

/// Observable state of a [`Promise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseState {
    /// Workers are still running, or the completion has not been delivered yet.
    Pending,
    /// Every item ran to completion without error.
    Succeeded,
    /// An item failed, panicked, or the completion was abandoned.
    Faulted,
    /// The cancellation signal was observed.
    Canceled,
}

impl PromiseState {
    fn of(outcome: &Outcome) -> Self {
        match outcome {
            Ok(()) => PromiseState::Succeeded,
            Err(FanoutError::Canceled) => PromiseState::Canceled,
            Err(_) => PromiseState::Faulted,
        }
    }

    /// True for every state except [`PromiseState::Pending`].
    pub fn is_terminal(self) -> bool {
        !matches!(self, PromiseState::Pending)
    }
}

#[derive(Clone, Debug)]
enum Slot {
    Ready(Outcome),
    Pending(watch::Receiver<Option<Outcome>>),
}

/// Awaitable handle returned by `Scheduler::schedule`.
///
/// `Promise` implements [`IntoFuture`], so it can be awaited directly;
/// use [`Promise::wait`] to await a borrowed handle.
///
/// # Example
/// ```
/// use taskfan::{Promise, PromiseState};
///
/// let p = Promise::ready(Ok(()));
/// assert_eq!(p.status(), PromiseState::Succeeded);
/// ```
#[derive(Clone, Debug)]
#[must_use = "a promise does nothing unless awaited or inspected"]
pub struct Promise {
    slot: Slot,
}

impl Promise {
    /// Creates an already-resolved promise.
    pub fn ready(outcome: Outcome) -> Self {
        Self {
            slot: Slot::Ready(outcome),
        }
    }

    /// Creates a pending promise and the completer that resolves it.
    pub(crate) fn pending() -> (Completer, Self) {
        let (tx, rx) = watch::channel(None);
        (
            Completer { tx },
            Self {
                slot: Slot::Pending(rx),
            },
        )
    }

    /// Returns the current state without awaiting.
    pub fn status(&self) -> PromiseState {
        match &self.slot {
            Slot::Ready(outcome) => PromiseState::of(outcome),
            Slot::Pending(rx) => {
                let closed = rx.has_changed().is_err();
                match &*rx.borrow() {
                    Some(outcome) => PromiseState::of(outcome),
                    None if closed => PromiseState::Faulted,
                    None => PromiseState::Pending,
                }
            }
        }
    }

    /// Waits for the outcome.
    ///
    /// Can be called any number of times, from any clone.
    pub async fn wait(&self) -> Outcome {
        let rx = match &self.slot {
            Slot::Ready(outcome) => return outcome.clone(),
            Slot::Pending(rx) => rx,
        };

        let mut rx = rx.clone();
        let received = rx.wait_for(Option::is_some).await;
        let stored = match received {
            Ok(value) => (*value).clone(),
            Err(_) => None,
        };
        stored.unwrap_or(Err(FanoutError::Abandoned))
    }
}

impl IntoFuture for Promise {
    type Output = Outcome;
    type IntoFuture = BoxFuture<'static, Outcome>;

    fn into_future(self) -> Self::IntoFuture {
        async move { self.wait().await }.boxed()
    }
}

/// Write side of a pending [`Promise`].
///
/// Dropping it without calling [`Completer::complete`] abandons the promise.
#[derive(Debug)]
pub(crate) struct Completer {
    tx: watch::Sender<Option<Outcome>>,
}

impl Completer {
    /// Stores the outcome and wakes every awaiter.
    pub(crate) fn complete(self, outcome: Outcome) {
        self.tx.send_replace(Some(outcome));
    }
}
