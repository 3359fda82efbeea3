//! # TraceListener - payload logger
//!
//! A minimal listener that logs every payload it receives through `tracing`.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! INFO taskfan::subscribers::trace: event raised listener="frame" payload=Tick(3)
//! ```

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::subscribers::Listen;

/// Payload logging listener.
pub struct TraceListener<T> {
    name: &'static str,
    _payload: PhantomData<fn(&T)>,
}

impl<T> TraceListener<T> {
    /// Construct a new [`TraceListener`] logging under `name`.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }
}

impl<T> Default for TraceListener<T> {
    fn default() -> Self {
        Self::new("trace")
    }
}

#[async_trait]
impl<T> Listen<T> for TraceListener<T>
where
    T: Debug + Send + Sync + 'static,
{
    async fn on_event(&self, payload: &T, _ctx: &CancellationToken) -> Result<(), TaskError> {
        tracing::info!(listener = self.name, ?payload, "event raised");
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
