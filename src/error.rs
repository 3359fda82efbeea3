//! Error types used by the taskfan runtime, work items and listeners.
//!
//! This module defines two main error enums:
//!
//! - [`TaskError`] - errors raised by individual work items and listeners.
//! - [`FanoutError`] - the outcome of a schedule or raise, as observed by the caller.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging
//! and are `Clone`, so a stored outcome can be observed any number of times.

use thiserror::Error;

/// # Errors produced by a single work item or listener.
///
/// A work item or listener reports failure by returning one of these.
/// Panics are caught by the runtime and converted to [`TaskError::Panicked`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Execution failed with a domain error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Execution panicked; the panic payload was captured as text.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic message (or `"unknown panic"`).
        info: String,
    },

    /// Execution observed the shared cancellation signal and unwound.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskfan::TaskError;
    ///
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// True for the cancellation kind.
    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }

    /// Builds a [`TaskError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        TaskError::Panicked { info }
    }

    /// Maps a failed join of a spawned routine.
    ///
    /// A panic keeps its payload; an aborted task (runtime shutting down)
    /// counts as cancellation.
    pub(crate) fn from_join(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            Self::from_panic(err.into_panic())
        } else {
            TaskError::Canceled
        }
    }
}

/// # Outcome errors of a schedule or raise.
///
/// Every `schedule`/`raise` resolves to `Result<(), FanoutError>`.
/// A pre-canceled signal and a cancellation observed mid-flight both
/// surface as [`FanoutError::Canceled`], so callers await uniformly.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FanoutError {
    /// An argument can never make progress (e.g. zero parallel groups).
    #[error("invalid argument `{name}` = {value}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// Rejected value.
        value: usize,
    },

    /// The cancellation signal was active before start or fired during execution.
    #[error("operation canceled")]
    Canceled,

    /// A work item or listener failed; carries the first captured error.
    #[error("work faulted: {0}")]
    Faulted(TaskError),

    /// The completion was dropped before it could be delivered
    /// (e.g. the frame endpoint holding it was aborted).
    #[error("completion abandoned before delivery")]
    Abandoned,
}

impl FanoutError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FanoutError::InvalidArgument { .. } => "fanout_invalid_argument",
            FanoutError::Canceled => "fanout_canceled",
            FanoutError::Faulted(_) => "fanout_faulted",
            FanoutError::Abandoned => "fanout_abandoned",
        }
    }

    /// True for the cancellation kind.
    pub fn is_canceled(&self) -> bool {
        matches!(self, FanoutError::Canceled)
    }

    /// The captured work error, if this is a fault.
    pub fn task_error(&self) -> Option<&TaskError> {
        match self {
            FanoutError::Faulted(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TaskError> for FanoutError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Canceled => FanoutError::Canceled,
            other => FanoutError::Faulted(other),
        }
    }
}
