//! # Example: parallel_load
//!
//! Loads a batch of fake resources with bounded parallelism.
//!
//! Shows how to:
//! - Build a [`WorkBatch`] from argument-taking items.
//! - Schedule it with a cap and await the [`Promise`](taskfan::Promise).
//! - Cancel a second, slow batch halfway through.
//!
//! ## Flow
//! ```text
//! WorkBatch(12 textures) ──► Scheduler::schedule(cap = 3)
//!     ├─► worker 0 ─► tex 0 ─► claim ─► tex 3 ─► ...
//!     ├─► worker 1 ─► tex 1 ─► claim ─► ...
//!     └─► worker 2 ─► tex 2 ─► claim ─► ...
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=taskfan=debug cargo run --example parallel_load
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use taskfan::{ArgWorkFn, FanoutConfig, Scheduler, TaskError, WorkBatch, WorkRef};

/// Pretends to decode texture `index` from `root`.
fn texture(index: usize) -> WorkRef<Arc<str>> {
    ArgWorkFn::arc(format!("texture-{index}"), move |root: Arc<str>, ctx: CancellationToken| async move {
        tokio::select! {
            _ = ctx.cancelled() => Err(TaskError::Canceled),
            _ = tokio::time::sleep(Duration::from_millis(80 + 10 * index as u64)) => {
                println!("[load] {root}/tex_{index:02}.png");
                Ok(())
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let scheduler = Scheduler::new(FanoutConfig::default());
    let root: Arc<str> = Arc::from("assets/textures");

    let batch = WorkBatch::with_arg((0..12).map(texture), Arc::clone(&root));
    let started = Instant::now();
    scheduler.schedule(batch, 3, &CancellationToken::new()).await?;
    println!("[done] 12 textures in {:?}", started.elapsed());

    let ctx = CancellationToken::new();
    let slow = WorkBatch::with_arg((0..40).map(texture), root);
    let promise = scheduler.schedule(slow, 2, &ctx);

    tokio::time::sleep(Duration::from_millis(250)).await;
    ctx.cancel();
    match promise.await {
        Err(err) if err.is_canceled() => println!("[cancel] slow batch stopped"),
        other => println!("[cancel] unexpected outcome: {other:?}"),
    }
    Ok(())
}
