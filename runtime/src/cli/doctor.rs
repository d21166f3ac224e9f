// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration readiness check.

use super::output;
use crate::config::Settings;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct Check {
    name: &'static str,
    ok: bool,
    detail: String,
}

/// Report credentials, state path, clock, and (unless offline) a live fetch.
pub async fn run(settings: &Settings, state: Option<&Path>, offline: bool) -> Result<()> {
    let mut checks = Vec::new();

    checks.push(Check {
        name: "credentials",
        ok: settings.credentials().is_ok(),
        detail: match settings.credentials() {
            Ok((_, chat)) => format!("BOT_TOKEN set, CHAT_ID={chat}"),
            Err(e) => e.to_string(),
        },
    });

    let state_path = settings.resolve_state_path(state);
    let state_dir = state_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let writable = std::fs::create_dir_all(state_dir).is_ok()
        && !std::fs::metadata(state_dir)
            .map(|m| m.permissions().readonly())
            .unwrap_or(true);
    checks.push(Check {
        name: "state",
        ok: writable,
        detail: state_path.display().to_string(),
    });

    match settings.resolver() {
        Ok(resolver) => {
            let targets = resolver.targets(chrono::Utc::now());
            checks.push(Check {
                name: "clock",
                ok: true,
                detail: format!(
                    "{}: today {}, tomorrow {}",
                    settings.timezone, targets.today, targets.tomorrow
                ),
            });
        }
        Err(e) => checks.push(Check {
            name: "clock",
            ok: false,
            detail: format!("{e:#}"),
        }),
    }

    let names: Vec<String> = settings.transports.iter().map(ToString::to_string).collect();
    checks.push(Check {
        name: "transports",
        ok: !names.is_empty(),
        detail: format!("{} ({:?})", names.join(", "), settings.order),
    });

    if !offline {
        let probe = match settings.build_fetcher() {
            Ok(fetcher) => fetcher.fetch(&settings.url).await.map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };
        checks.push(match probe {
            Ok(fetched) => {
                let blocks = settings.extractor().blocks(&fetched.html);
                Check {
                    name: "page",
                    ok: true,
                    detail: format!(
                        "{} bytes via {}, {} schedule block(s)",
                        fetched.html.len(),
                        fetched.transport,
                        blocks.len()
                    ),
                }
            }
            Err(e) => Check {
                name: "page",
                ok: false,
                detail: format!("{e:#}"),
            },
        });
    }

    let ready = checks.iter().all(|c| c.ok);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "ready": ready,
            "url": settings.url,
            "checks": checks,
        }));
        return Ok(());
    }

    println!("Svitlo Doctor");
    println!("=============");
    println!();
    println!("URL: {}", settings.url);
    println!();
    for check in &checks {
        let mark = if check.ok { "[OK]" } else { "[!!]" };
        println!("{mark} {:<12} {}", check.name, check.detail);
    }
    println!();
    println!("Status: {}", if ready { "READY" } else { "NOT READY" });
    Ok(())
}
