use std::sync::Arc;

use crate::core::{config::FanoutConfig, scheduler::Scheduler};
use crate::frame::Endpoint;

/// Builder for constructing a [`Scheduler`] with optional features.
pub struct SchedulerBuilder {
    cfg: FanoutConfig,
    endpoint: Option<Arc<dyn Endpoint>>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: FanoutConfig) -> Self {
        Self {
            cfg,
            endpoint: None,
        }
    }

    /// Sets the frame endpoint used by `Scheduler::schedule_at`.
    ///
    /// Completions of batches scheduled with a specified
    /// [`FrameTiming`](crate::FrameTiming) are posted here instead of being
    /// delivered inline.
    pub fn with_endpoint(mut self, endpoint: Arc<dyn Endpoint>) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Builds and returns the scheduler.
    pub fn build(self) -> Scheduler {
        Scheduler::new_internal(self.cfg, self.endpoint)
    }
}
