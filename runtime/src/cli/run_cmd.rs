// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! `svitlo once` and `svitlo watch`.

use super::output;
use crate::config::Settings;
use crate::cycle::{run_cycle, CycleContext, CycleReport, CycleStatus};
use crate::state::{FileStateStore, InMemoryStateStore, StateStore};
use crate::watch::{run_watch, WatchOptions};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Assemble a cycle context from settings.
///
/// Dry runs start from the persisted memory but never write it back.
pub fn build_context(settings: &Settings, state: Option<&Path>, dry_run: bool) -> Result<CycleContext> {
    let file_store = FileStateStore::new(settings.resolve_state_path(state));
    let store: Box<dyn StateStore> = if dry_run {
        Box::new(InMemoryStateStore::new(file_store.load()))
    } else {
        Box::new(file_store)
    };

    Ok(CycleContext {
        url: settings.url.clone(),
        fetcher: settings.build_fetcher()?,
        extractor: settings.extractor(),
        resolver: settings.resolver()?,
        strictness: settings.strictness,
        notifier: settings.notifier(dry_run)?,
        store,
    })
}

/// Run a single cycle.
pub async fn run_once(settings: &Settings, state: Option<&Path>, dry_run: bool) -> Result<()> {
    let ctx = build_context(settings, state, dry_run)?;
    let memory = ctx.store.load();
    let outcome = run_cycle(&ctx, memory, chrono::Utc::now()).await;
    print_report(&outcome.report);
    Ok(())
}

/// Poll until the runtime budget is spent or Ctrl-C.
pub async fn run_watch_cmd(
    settings: &Settings,
    state: Option<&Path>,
    dry_run: bool,
    interval_secs: Option<u64>,
    max_runtime_secs: Option<u64>,
) -> Result<()> {
    let ctx = build_context(settings, state, dry_run)?;
    let opts = WatchOptions {
        interval: interval_secs
            .map(Duration::from_secs)
            .unwrap_or(settings.poll_interval),
        max_runtime: match max_runtime_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => settings.max_runtime,
        },
        ..WatchOptions::default()
    };

    let shutdown = Arc::new(Notify::new());
    let signal = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.notify_one();
        }
    });

    let summary = run_watch(&ctx, &opts, shutdown).await;
    if output::is_json() {
        output::print_json(&summary);
    } else {
        output::say(format!(
            "{} cycle(s), {} message(s) delivered, {} fetch failure(s)",
            summary.cycles, summary.delivered, summary.fetch_failures
        ));
    }
    Ok(())
}

fn print_report(report: &CycleReport) {
    if output::is_json() {
        output::print_json(report);
        return;
    }
    let via = report.transport.as_deref().unwrap_or("-");
    match report.status {
        CycleStatus::FetchFailed => output::say(format!(
            "Fetch failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        )),
        CycleStatus::NoSchedule => output::say(format!(
            "No schedule for {} or the next day (via {via})",
            report.today
        )),
        CycleStatus::Completed => {
            let list = |slots: &[svitlo_core::Slot]| {
                slots.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
            };
            output::say(format!("Fetched via {via}"));
            if !report.delivered.is_empty() {
                output::say(format!("  delivered:  {}", list(&report.delivered)));
            }
            if !report.suppressed.is_empty() {
                output::say(format!("  unchanged:  {}", list(&report.suppressed)));
            }
            for failure in &report.failed {
                output::say(format!("  failed:     {} ({})", failure.slot, failure.error));
            }
        }
    }
}
