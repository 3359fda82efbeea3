//! # Example: frame_events
//!
//! Drives a tiny frame loop that notifies listeners and resumes a batch at a
//! chosen phase.
//!
//! Shows how to:
//! - Subscribe trait, closure and [`TraceListener`] listeners to an [`AsyncEvent`].
//! - Raise sequentially (ordered) and in parallel every frame.
//! - Resume a scheduled batch in `LateUpdate` through a [`FrameEndpoint`].
//!
//! ## Flow
//! ```text
//! frame N:
//!   run_queued(EarlyUpdate)
//!   update.raise_sequential(tick)   ──► physics ─► animation ─► trace
//!   run_queued(Update)
//!   run_queued(LateUpdate)          ──► batch completion delivered here
//!   render.raise_parallel(tick)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example frame_events --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use taskfan::{
    AsyncEvent, FanoutConfig, FrameEndpoint, FrameTiming, Listen, PromiseState, Scheduler, SubscriptionBag,
    TaskError, TraceListener, WorkBatch, WorkFn, WorkRef,
};

#[derive(Debug, Clone, Copy)]
struct Tick(u64);

struct Physics;

#[async_trait]
impl Listen<Tick> for Physics {
    async fn on_event(&self, tick: &Tick, _ctx: &CancellationToken) -> Result<(), TaskError> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        println!("[physics] step {}", tick.0);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "physics"
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let endpoint = Arc::new(FrameEndpoint::new());
    let scheduler = Scheduler::builder(FanoutConfig::default())
        .with_endpoint(endpoint.clone())
        .build();
    let ctx = CancellationToken::new();

    let update: AsyncEvent<Tick> = AsyncEvent::new();
    let render: AsyncEvent<Tick> = AsyncEvent::new();
    let bag = SubscriptionBag::new();

    bag.add(update.subscribe(Arc::new(Physics)));
    bag.add(update.subscribe_fn("animation", |tick: Tick, _ctx: CancellationToken| async move {
        println!("[animation] pose {}", tick.0);
        Ok::<_, TaskError>(())
    }));
    bag.add(update.subscribe(Arc::new(TraceListener::<Tick>::new("update"))));
    for layer in ["sky", "terrain", "ui"] {
        bag.add(render.subscribe_fn(layer, move |tick: Tick, _ctx: CancellationToken| async move {
            println!("[render] {layer} frame {}", tick.0);
            Ok::<_, TaskError>(())
        }));
    }

    let mesh: WorkRef = WorkFn::arc("mesh", |_ctx: CancellationToken| async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok::<_, TaskError>(())
    });
    let loading = scheduler.schedule_at(WorkBatch::repeat(mesh, 6, ()), 4, FrameTiming::LateUpdate, &ctx);

    for frame in 0..5 {
        let tick = Tick(frame);
        endpoint.run_queued(FrameTiming::EarlyUpdate);
        update.raise_sequential(tick, &ctx).await?;
        endpoint.run_queued(FrameTiming::Update);
        endpoint.run_queued(FrameTiming::LateUpdate);
        render.raise_parallel(tick, &ctx).await?;

        println!("[frame {frame}] meshes: {:?}", loading.status());
        if loading.status() == PromiseState::Succeeded {
            break;
        }
        tokio::time::sleep(Duration::from_millis(16)).await;
    }

    println!("[exit] disposed {} subscriptions", bag.dispose());
    endpoint.abort_all();
    Ok(())
}
