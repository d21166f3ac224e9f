// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Full-cycle tests against mock HTTP servers: the schedule page, a CORS
//! relay, and the Telegram Bot API.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use svitlo_core::{Memory, MemoryFile, Slot};
use svitlo_runtime::cli::run_cmd::build_context;
use svitlo_runtime::config::Settings;
use svitlo_runtime::cycle::{run_cycle, CycleStatus};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Fixtures ──

const TOKEN: &str = "123456:TEST";
const CHAT: &str = "-1001234";

const RENDERED: &str = "<p><strong>26 ГРУДНЯ ОНОВЛЕНО ГПВ</strong></p>\
    <p>1.1: 00:00-03:00</p>\
    <p>1.2: 03:00-06:00</p>\
    <p><strong>ГПВ НА 27 ГРУДНЯ</strong></p>\
    <p>1.1: 06:00-09:00</p>\
    <p>Орієнтовна схема ГПВ на 28 грудня</p>";

fn wordpress_page() -> serde_json::Value {
    json!({
        "id": 371392,
        "title": {"rendered": "ГПВ"},
        "content": {"rendered": RENDERED, "protected": false}
    })
}

/// 12:00 Kyiv time, 26 December.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 26, 10, 0, 0).unwrap()
}

fn settings(vars: &[(&str, String)]) -> Settings {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    Settings::from_lookup(|name| map.get(name).cloned()).unwrap()
}

fn base_vars(page: &MockServer, telegram: &MockServer, state: &Path) -> Vec<(&'static str, String)> {
    vec![
        ("BOT_TOKEN", TOKEN.to_string()),
        ("CHAT_ID", CHAT.to_string()),
        ("SVITLO_URL", format!("{}/wp-json/wp/v2/pages/371392", page.uri())),
        ("TELEGRAM_API_BASE", telegram.uri()),
        ("SVITLO_STATE_FILE", state.display().to_string()),
        ("SVITLO_FETCH_TIMEOUT_MS", "2000".to_string()),
        ("SVITLO_FETCH_RETRIES", "0".to_string()),
    ]
}

async fn telegram_ok(server: &MockServer, expected_sends: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_partial_json(json!({
            "chat_id": CHAT,
            "parse_mode": "HTML",
            "disable_web_page_preview": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
        .expect(expected_sends)
        .mount(server)
        .await;
}

async fn sent_texts(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).ok())
        .filter_map(|v| v["text"].as_str().map(str::to_string))
        .collect()
}

// ── Scenarios ──

#[tokio::test]
async fn direct_fetch_delivers_both_slots_and_persists() {
    let page = MockServer::start().await;
    let telegram = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/pages/371392"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wordpress_page()))
        .mount(&page)
        .await;
    telegram_ok(&telegram, 2).await;

    let settings = settings(&base_vars(&page, &telegram, &state));
    let ctx = build_context(&settings, None, false).unwrap();

    let outcome = run_cycle(&ctx, Memory::default(), now()).await;
    assert_eq!(outcome.report.status, CycleStatus::Completed);
    assert_eq!(outcome.report.delivered, vec![Slot::Today, Slot::Tomorrow]);

    let texts = sent_texts(&telegram).await;
    assert_eq!(texts.len(), 2);
    assert!(texts[0].starts_with("\u{26A1}\u{FE0F} <b>26 ГРУДНЯ ОНОВЛЕНО ГПВ</b>\n\n1.1: 00:00-03:00"));
    assert!(texts[1].contains("<b>ГПВ НА 27 ГРУДНЯ</b>"));

    let stored = MemoryFile::try_load(&state).unwrap().unwrap();
    assert_eq!(stored, outcome.memory);
    assert!(stored.get(Slot::Tomorrow).unwrap().ends_with("1.1: 06:00-09:00"));

    // Same page again: nothing new to say.
    let again = run_cycle(&ctx, outcome.memory, now()).await;
    assert!(again.report.delivered.is_empty());
    assert_eq!(again.report.suppressed, vec![Slot::Today, Slot::Tomorrow]);
}

#[tokio::test]
async fn falls_back_to_relay_when_origin_blocks() {
    let page = MockServer::start().await;
    let relay = MockServer::start().await;
    let telegram = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .expect(1)
        .mount(&page)
        .await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contents": wordpress_page().to_string(),
            "status": {"http_code": 200}
        })))
        .expect(1)
        .mount(&relay)
        .await;
    telegram_ok(&telegram, 2).await;

    let mut vars = base_vars(&page, &telegram, &state);
    vars.push((
        "SVITLO_TRANSPORTS",
        format!("direct,relay:{}/get?url={{url}}", relay.uri()),
    ));
    vars.push(("SVITLO_MARKERS", "ГПВ".to_string()));
    let ctx = build_context(&settings(&vars), None, false).unwrap();

    let outcome = run_cycle(&ctx, Memory::default(), now()).await;
    assert_eq!(outcome.report.status, CycleStatus::Completed);
    assert!(outcome.report.transport.unwrap().starts_with("relay:"));
    assert_eq!(outcome.report.delivered.len(), 2);

    let relayed = relay.received_requests().await.unwrap();
    let target = relayed[0]
        .url
        .query_pairs()
        .find(|(k, _)| k == "url")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert!(target.starts_with(&format!("{}/wp-json/wp/v2/pages/371392?t=", page.uri())));
}

#[tokio::test]
async fn challenge_page_from_origin_moves_on_to_relay() {
    let page = MockServer::start().await;
    let relay = MockServer::start().await;
    let telegram = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><title>Just a moment...</title></html>"),
        )
        .expect(1)
        .mount(&page)
        .await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contents": wordpress_page().to_string()
        })))
        .expect(1)
        .mount(&relay)
        .await;
    telegram_ok(&telegram, 2).await;

    let mut vars = base_vars(&page, &telegram, &state);
    vars.push((
        "SVITLO_TRANSPORTS",
        format!("direct,relay:{}/get?url={{url}}", relay.uri()),
    ));
    let ctx = build_context(&settings(&vars), None, false).unwrap();

    let outcome = run_cycle(&ctx, Memory::default(), now()).await;
    assert_eq!(outcome.report.status, CycleStatus::Completed);
    assert!(outcome.report.transport.unwrap().starts_with("relay:"));
    assert_eq!(outcome.report.delivered, vec![Slot::Today, Slot::Tomorrow]);
}

#[tokio::test]
async fn exhausted_transports_leave_state_alone() {
    let page = MockServer::start().await;
    let telegram = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    let mut previous = Memory::default();
    previous.record(Slot::Today, "25 ГРУДНЯ ГПВ\n1.1: 00:00-03:00");
    MemoryFile::save(&state, &previous).unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&page)
        .await;
    telegram_ok(&telegram, 0).await;

    let ctx = build_context(&settings(&base_vars(&page, &telegram, &state)), None, false).unwrap();
    let memory = ctx.store.load();
    let outcome = run_cycle(&ctx, memory, now()).await;

    assert_eq!(outcome.report.status, CycleStatus::FetchFailed);
    assert!(outcome.report.error.unwrap().contains("HTTP 503"));
    assert_eq!(MemoryFile::try_load(&state).unwrap().unwrap(), previous);
}

#[tokio::test]
async fn rejected_message_is_not_recorded() {
    let page = MockServer::start().await;
    let telegram = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wordpress_page()))
        .mount(&page)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: can't parse entities"
        })))
        .mount(&telegram)
        .await;

    let ctx = build_context(&settings(&base_vars(&page, &telegram, &state)), None, false).unwrap();
    let outcome = run_cycle(&ctx, Memory::default(), now()).await;

    assert!(outcome.report.delivered.is_empty());
    assert_eq!(outcome.report.failed.len(), 2);
    assert!(outcome.report.failed[0].error.contains("can't parse entities"));
    assert!(outcome.memory.is_empty());
    assert!(!state.exists());
}

#[tokio::test]
async fn dry_run_never_touches_telegram_or_disk() {
    let page = MockServer::start().await;
    let telegram = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wordpress_page()))
        .mount(&page)
        .await;
    telegram_ok(&telegram, 0).await;

    let mut vars = base_vars(&page, &telegram, &state);
    vars.retain(|(k, _)| *k != "BOT_TOKEN");
    let ctx = build_context(&settings(&vars), None, true).unwrap();

    let outcome = run_cycle(&ctx, Memory::default(), now()).await;
    assert_eq!(outcome.report.delivered.len(), 2);
    assert!(!state.exists());
}

#[tokio::test]
async fn legacy_state_string_suppresses_matching_today() {
    let page = MockServer::start().await;
    let telegram = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    std::fs::write(
        &state,
        "\"26 ГРУДНЯ ОНОВЛЕНО ГПВ\\n1.1: 00:00-03:00\\n1.2: 03:00-06:00\"",
    )
    .unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wordpress_page()))
        .mount(&page)
        .await;
    telegram_ok(&telegram, 1).await;

    let ctx = build_context(&settings(&base_vars(&page, &telegram, &state)), None, false).unwrap();
    let outcome = run_cycle(&ctx, ctx.store.load(), now()).await;

    assert_eq!(outcome.report.suppressed, vec![Slot::Today]);
    assert_eq!(outcome.report.delivered, vec![Slot::Tomorrow]);
}
