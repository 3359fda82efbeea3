//! Runtime core: planning, work claiming and completion.
//!
//! The public API from this module is [`Scheduler`] (with its builder),
//! [`FanoutConfig`] and the [`Promise`] it returns.
//!
//! Internal modules:
//! - [`queue`]: lock-free index claiming shared by the workers of one batch;
//! - [`scheduler`]: spawns workers, records the first error, completes the promise;
//! - [`promise`]: cloneable awaitable outcome;
//! - [`config`]: ceiling and parallelism settings;
//! - [`builder`]: optional endpoint wiring.

mod builder;
mod config;
mod promise;
mod queue;
mod scheduler;

pub use builder::SchedulerBuilder;
pub use config::{FanoutConfig, MAX_PARALLEL};
pub use promise::{Outcome, Promise, PromiseState};
pub use queue::{claim_next, WorkQueue};
pub use scheduler::Scheduler;
