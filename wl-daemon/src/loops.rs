//! Periodic sampler and controller tasks
//!
//! The sampler runs every 100 ms and the controller every second. They share
//! nothing but the history buffer, so neither can stall the other: a slow
//! sensor read delays the next sample, never a control decision.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};
use wl_core::{Controller, HistoryBuffer, Sampler};

/// Feed the history forever, one reading (or gap) per period
pub async fn run_sampler(sampler: Arc<Sampler>, period: Duration) {
    info!(period_ms = period.as_millis() as u64, "SAMPLE: sampler loop starting");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        // Echo timing busy-waits on sysfs reads; keep it off the async workers
        let s = sampler.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || s.sample_once()).await {
            // A panicking read leaves no slot behind; record the gap ourselves
            error!(error = %e, "SAMPLE: sensor task failed");
            sampler.history().append(None);
        }
    }
}

/// Decide once per period over the latest snapshot
pub async fn run_controller(mut controller: Controller, history: Arc<HistoryBuffer>, period: Duration) {
    info!(period_ms = period.as_millis() as u64, "CONTROL: controller loop starting");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let snapshot = history.snapshot();
        // Single sysfs write at most; not worth a blocking hop
        controller.tick(&snapshot);
    }
}
