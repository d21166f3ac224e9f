// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Long-running poll loop.
//!
//! Cycles run strictly one after another. The loop ends when the runtime
//! budget is spent or shutdown is signaled, whichever comes first.

use crate::cycle::{run_cycle, CycleContext, CycleStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

pub const DEFAULT_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub interval: Duration,
    /// Stop after this much wall time. `None` runs until shutdown.
    pub max_runtime: Option<Duration>,
    /// Wall clock handed to each cycle for date targeting.
    pub clock: fn() -> DateTime<Utc>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            max_runtime: None,
            clock: Utc::now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Deadline,
    Shutdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchSummary {
    pub cycles: u64,
    pub delivered: u64,
    pub fetch_failures: u64,
    pub stopped: StopReason,
}

/// Poll until the deadline or `shutdown` fires.
pub async fn run_watch(ctx: &CycleContext, opts: &WatchOptions, shutdown: Arc<Notify>) -> WatchSummary {
    let started = Instant::now();
    let deadline = opts.max_runtime.map(|d| started + d);
    let mut memory = ctx.store.load();
    let mut summary = WatchSummary {
        cycles: 0,
        delivered: 0,
        fetch_failures: 0,
        stopped: StopReason::Shutdown,
    };

    tracing::info!(
        "watching {} every {}s{} (state: {})",
        ctx.url,
        opts.interval.as_secs(),
        opts.max_runtime
            .map(|d| format!(", for at most {}s", d.as_secs()))
            .unwrap_or_default(),
        ctx.store.describe()
    );

    loop {
        let cycle = tokio::select! {
            _ = shutdown.notified() => None,
            outcome = run_cycle(ctx, memory.clone(), (opts.clock)()) => Some(outcome),
        };
        let Some(outcome) = cycle else {
            tracing::info!("shutdown requested mid-cycle");
            break;
        };

        summary.cycles += 1;
        summary.delivered += outcome.report.delivered.len() as u64;
        if outcome.report.status == CycleStatus::FetchFailed {
            summary.fetch_failures += 1;
        }
        memory = outcome.memory;

        let mut wake = Instant::now() + opts.interval;
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                summary.stopped = StopReason::Deadline;
                break;
            }
            wake = wake.min(deadline);
        }

        tokio::select! {
            _ = shutdown.notified() => {
                tracing::info!("shutdown requested");
                break;
            }
            _ = tokio::time::sleep_until(wake) => {}
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            summary.stopped = StopReason::Deadline;
            break;
        }
    }

    tracing::info!(
        "watch finished after {} cycle(s): {} delivered, {} fetch failure(s)",
        summary.cycles,
        summary.delivered,
        summary.fetch_failures
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::tests::{context, Outbox, PAGE};
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Noon in Kyiv on the date `PAGE` is headed with.
    fn frozen_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 26, 10, 0, 0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_until_deadline() {
        let page = Arc::new(Mutex::new(Some(PAGE.to_string())));
        let outbox = Outbox::default();
        let ctx = context(page, outbox.clone());
        let opts = WatchOptions {
            interval: Duration::from_secs(60),
            max_runtime: Some(Duration::from_secs(150)),
            clock: frozen_clock,
        };

        let summary = run_watch(&ctx, &opts, Arc::new(Notify::new())).await;
        assert_eq!(summary.stopped, StopReason::Deadline);
        // t=0, t=60, t=120, then the sleep is cut short at t=150.
        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.delivered, 1);
        assert_eq!(outbox.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_shutdown() {
        let page = Arc::new(Mutex::new(None));
        let ctx = context(page, Outbox::default());
        let shutdown = Arc::new(Notify::new());
        let opts = WatchOptions {
            interval: Duration::from_secs(300),
            max_runtime: None,
            clock: frozen_clock,
        };

        let trigger = Arc::clone(&shutdown);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1000)).await;
            trigger.notify_one();
        });

        let summary = run_watch(&ctx, &opts, shutdown).await;
        assert_eq!(summary.stopped, StopReason::Shutdown);
        assert_eq!(summary.fetch_failures, summary.cycles);
        assert!(summary.cycles >= 3);
    }
}
