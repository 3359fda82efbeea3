//! # Continuation hand-off to a frame loop.
//!
//! A scheduled batch can resume its awaiters at a chosen phase of the next
//! frame instead of inline. The runtime depends on the single method
//! [`Endpoint::post`]; [`FrameEndpoint`] is the reference implementation a
//! frame loop drives by calling [`FrameEndpoint::run_queued`] once per phase.
//!
//! ## Architecture
//! ```text
//! Scheduler::schedule_at(.., FrameTiming::Update, ..)
//!         │
//!         └─ batch done ──► endpoint.post(Update, continuation)
//!                                     │
//! frame loop:                         ▼
//!   run_queued(EarlyUpdate)   [EarlyUpdate] [Update] [LateUpdate] ...
//!   run_queued(Update)  ──────────────► continuation() ──► awaiter resumes
//!   run_queued(LateUpdate)
//! ```
//!
//! ## Rules
//! - [`FrameTiming::NotSpecified`] means "no hand-off": the continuation runs inline.
//! - A drain runs only the continuations queued when it started.
//! - Dropped continuations (see [`FrameEndpoint::abort_all`]) never leave awaiters hanging.

mod endpoint;
mod timing;

pub use endpoint::{Continuation, Endpoint, FrameEndpoint};
pub use timing::FrameTiming;
