// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! One fetch, extract, compare, notify pass.
//!
//! A cycle never fails as a whole: transport exhaustion and delivery
//! errors are folded into the [`CycleReport`]. Memory only moves forward
//! for slots that were actually delivered, and each delivery is persisted
//! before the next one is attempted.

use crate::acquisition::{FetchAttempt, FetchError, Fetcher};
use crate::notify::Notifier;
use crate::state::StateStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use svitlo_core::{detect_changes, DateResolver, Extractor, Memory, Slot, Strictness};

/// Everything a cycle needs, built once per process.
pub struct CycleContext {
    pub url: String,
    pub fetcher: Fetcher,
    pub extractor: Extractor,
    pub resolver: DateResolver,
    pub strictness: Strictness,
    pub notifier: Box<dyn Notifier>,
    pub store: Box<dyn StateStore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Page fetched and processed (possibly nothing new).
    Completed,
    /// Page fetched but no block matched today or tomorrow.
    NoSchedule,
    /// Every transport failed; nothing was sent and memory is unchanged.
    FetchFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotFailure {
    pub slot: Slot,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub status: CycleStatus,
    pub today: NaiveDate,
    pub transport: Option<String>,
    /// Slots with a schedule on the page.
    pub found: Vec<Slot>,
    pub delivered: Vec<Slot>,
    /// Slots identical to what was last delivered.
    pub suppressed: Vec<Slot>,
    pub failed: Vec<SlotFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-transport failures when the page could not be fetched.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<FetchAttempt>,
}

impl CycleReport {
    fn new(status: CycleStatus, today: NaiveDate) -> Self {
        Self {
            status,
            today,
            transport: None,
            found: Vec::new(),
            delivered: Vec::new(),
            suppressed: Vec::new(),
            failed: Vec::new(),
            error: None,
            attempts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub memory: Memory,
    pub report: CycleReport,
}

/// Run one cycle against `memory` as of `now`.
pub async fn run_cycle(ctx: &CycleContext, memory: Memory, now: DateTime<Utc>) -> CycleOutcome {
    let targets = ctx.resolver.targets(now);

    let fetched = match ctx.fetcher.fetch(&ctx.url).await {
        Ok(fetched) => fetched,
        Err(e) => {
            tracing::warn!("cycle aborted, page unavailable: {e}");
            let mut report = CycleReport::new(CycleStatus::FetchFailed, targets.today);
            report.error = Some(e.to_string());
            if let FetchError::Exhausted(attempts) = e {
                report.attempts = attempts;
            }
            return CycleOutcome { memory, report };
        }
    };

    let slots = ctx.extractor.extract(&fetched.html, &targets);
    let mut report = CycleReport::new(CycleStatus::Completed, targets.today);
    report.transport = Some(fetched.transport);
    report.found = slots.iter().map(|(slot, _)| slot).collect();

    if slots.is_empty() {
        tracing::info!(
            "no schedule for {} or {} on the page",
            targets.today,
            targets.tomorrow
        );
        report.status = CycleStatus::NoSchedule;
        return CycleOutcome { memory, report };
    }

    let updates = detect_changes(&memory, &slots, ctx.strictness);
    report.suppressed = report
        .found
        .iter()
        .copied()
        .filter(|slot| !updates.iter().any(|u| u.slot == *slot))
        .collect();

    let mut memory = memory;
    for update in updates {
        match ctx.notifier.send(&update.message).await {
            Ok(()) => {
                tracing::info!("{}: schedule delivered via {}", update.slot, ctx.notifier.name());
                memory.record(update.slot, update.text);
                if let Err(e) = ctx.store.save(&memory) {
                    tracing::error!("{}: delivered but not persisted: {e:#}", update.slot);
                }
                report.delivered.push(update.slot);
            }
            Err(e) => {
                tracing::error!("{}: delivery failed: {e}", update.slot);
                report.failed.push(SlotFailure {
                    slot: update.slot,
                    error: e.to_string(),
                });
            }
        }
    }

    CycleOutcome { memory, report }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::acquisition::{HttpResponse, Transport};
    use crate::notify::NotifyError;
    use crate::state::InMemoryStateStore;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    pub(crate) struct PageTransport {
        pub body: Arc<Mutex<Option<String>>>,
    }

    #[async_trait]
    impl Transport for PageTransport {
        fn name(&self) -> String {
            "page".to_string()
        }

        async fn fetch(&self, url: &str) -> anyhow::Result<HttpResponse> {
            let body = self
                .body
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| anyhow::anyhow!("timed out"))?;
            Ok(HttpResponse {
                url: url.to_string(),
                final_url: url.to_string(),
                status: 200,
                body,
            })
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct Outbox {
        pub sent: Arc<Mutex<Vec<String>>>,
        pub fail: Arc<Mutex<bool>>,
    }

    #[async_trait]
    impl Notifier for Outbox {
        fn name(&self) -> &str {
            "outbox"
        }

        async fn send(&self, text: &str) -> Result<(), NotifyError> {
            if *self.fail.lock().unwrap() {
                return Err(NotifyError::Api {
                    code: 400,
                    description: "Bad Request: chat not found".to_string(),
                });
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    pub(crate) fn context(page: Arc<Mutex<Option<String>>>, outbox: Outbox) -> CycleContext {
        CycleContext {
            url: "https://example.com/page".to_string(),
            fetcher: Fetcher::new(vec![Box::new(PageTransport { body: page }) as Box<dyn Transport>]),
            extractor: Extractor::default(),
            resolver: DateResolver::default(),
            strictness: Strictness::FullBlock,
            notifier: Box::new(outbox),
            store: Box::new(InMemoryStateStore::default()),
        }
    }

    pub(crate) const PAGE: &str = "<p>26 ГРУДНЯ ОНОВЛЕНО ГПВ</p><p>1.1: 00:00-03:00</p><p>1.2: 03:00-06:00</p>";

    fn noon_26_december() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 26, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_delivers_then_suppresses() {
        let page = Arc::new(Mutex::new(Some(PAGE.to_string())));
        let outbox = Outbox::default();
        let ctx = context(page, outbox.clone());

        let first = run_cycle(&ctx, Memory::default(), noon_26_december()).await;
        assert_eq!(first.report.status, CycleStatus::Completed);
        assert_eq!(first.report.delivered, vec![Slot::Today]);
        assert_eq!(ctx.store.load(), first.memory);

        let second = run_cycle(&ctx, first.memory, noon_26_december()).await;
        assert!(second.report.delivered.is_empty());
        assert_eq!(second.report.suppressed, vec![Slot::Today]);
        assert_eq!(outbox.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_memory() {
        let page = Arc::new(Mutex::new(None));
        let ctx = context(page, Outbox::default());
        let mut memory = Memory::default();
        memory.record(Slot::Today, "old");

        let outcome = run_cycle(&ctx, memory.clone(), noon_26_december()).await;
        assert_eq!(outcome.report.status, CycleStatus::FetchFailed);
        assert!(outcome.report.error.unwrap().contains("timed out"));
        assert_eq!(outcome.memory, memory);
    }

    #[tokio::test]
    async fn test_no_schedule_for_other_dates() {
        let page = Arc::new(Mutex::new(Some(PAGE.to_string())));
        let ctx = context(page, Outbox::default());
        let later = Utc.with_ymd_and_hms(2024, 12, 28, 10, 0, 0).unwrap();

        let outcome = run_cycle(&ctx, Memory::default(), later).await;
        assert_eq!(outcome.report.status, CycleStatus::NoSchedule);
        assert!(outcome.memory.is_empty());
    }

    #[tokio::test]
    async fn test_failed_delivery_is_retried_next_cycle() {
        let page = Arc::new(Mutex::new(Some(PAGE.to_string())));
        let outbox = Outbox::default();
        *outbox.fail.lock().unwrap() = true;
        let ctx = context(page, outbox.clone());

        let failed = run_cycle(&ctx, Memory::default(), noon_26_december()).await;
        assert_eq!(failed.report.failed.len(), 1);
        assert!(failed.memory.is_empty());

        *outbox.fail.lock().unwrap() = false;
        let retried = run_cycle(&ctx, failed.memory, noon_26_december()).await;
        assert_eq!(retried.report.delivered, vec![Slot::Today]);
    }
}
