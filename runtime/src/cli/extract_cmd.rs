// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! `svitlo extract`: show what the parser sees, without notifying.

use super::output;
use crate::acquisition::extract_html;
use crate::config::Settings;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use svitlo_core::{assign_slots, ScheduleBlock, TargetDates};

pub async fn run(settings: &Settings, file: Option<&Path>, date: Option<NaiveDate>) -> Result<()> {
    let (source, html) = match file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let html = extract_html(&raw).with_context(|| format!("unwrapping {}", path.display()))?;
            (path.display().to_string(), html)
        }
        None => {
            let fetched = settings.build_fetcher()?.fetch(&settings.url).await?;
            (format!("{} via {}", settings.url, fetched.transport), fetched.html)
        }
    };

    let targets = match date {
        Some(day) => TargetDates::from_date(day),
        None => settings.resolver()?.targets(chrono::Utc::now()),
    };

    let extractor = settings.extractor();
    let blocks = extractor.blocks(&html);
    let slots = assign_slots(blocks.clone(), &targets);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "source": source,
            "today": targets.today,
            "tomorrow": targets.tomorrow,
            "blocks": blocks,
            "slots": slots,
        }));
        return Ok(());
    }

    println!("Source:   {source}");
    println!("Today:    {}", targets.today);
    println!("Tomorrow: {}", targets.tomorrow);
    println!();
    if blocks.is_empty() {
        println!("No schedule blocks found.");
        return Ok(());
    }
    for block in &blocks {
        let slot = targets
            .slot_for(block.header.day, block.header.month)
            .map(|s| s.as_str())
            .unwrap_or("other date");
        print_block(block, slot);
    }
    for (slot, block) in slots.iter() {
        println!("{slot}: {}", block.header.display_text());
    }
    Ok(())
}

fn print_block(block: &ScheduleBlock, slot: &str) {
    let marks = match block.header.rank() {
        (true, true) => " [prominent, uppercase]",
        (true, false) => " [prominent]",
        (false, true) => " [uppercase]",
        (false, false) => "",
    };
    println!("[{slot}] {}{marks}", block.header.display_text());
    for entry in &block.entries {
        println!("    {}", entry.text);
    }
    println!();
}
