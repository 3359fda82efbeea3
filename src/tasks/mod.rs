//! # Work items and batches.
//!
//! This module provides the types the scheduler consumes:
//! - [`Work`] - trait for async cancelable work items
//! - [`WorkFn`], [`ArgWorkFn`], [`BlockingWorkFn`] - function-based implementations
//! - [`WorkRef`] - shared reference to an item (`Arc<dyn Work<A>>`)
//! - [`WorkBatch`] - immutable ordered batch plus its shared argument

mod batch;
mod work;
mod work_fn;

pub use batch::WorkBatch;
pub use work::{BoxWorkFuture, Work, WorkRef};
pub use work_fn::{ArgWorkFn, BlockingWorkFn, WorkFn};
