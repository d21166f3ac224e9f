//! Change detection between extracted schedules and delivered memory.
//!
//! Comparison runs on a normalized form that keeps only Latin/Cyrillic letters
//! and decimal digits, lowercased. Emoji, punctuation, and whitespace edits
//! therefore never count as a change.

use crate::memory::Memory;
use crate::message::render_message;
use crate::text::is_script_letter;
use crate::types::{Slot, SlotBlocks, SvitloError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How much of a block participates in the comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Header and every queue entry.
    #[default]
    FullBlock,
    /// Only the first line (the header).
    HeaderOnly,
}

impl FromStr for Strictness {
    type Err = SvitloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" | "full" | "full_block" | "full-block" => Ok(Self::FullBlock),
            "header" | "header_only" | "header-only" => Ok(Self::HeaderOnly),
            other => Err(SvitloError::InvalidInput(format!(
                "unknown strictness '{other}' (expected 'block' or 'header')"
            ))),
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullBlock => f.write_str("block"),
            Self::HeaderOnly => f.write_str("header"),
        }
    }
}

/// Keep Latin/Cyrillic letters and ASCII digits, lowercased.
pub fn normalize_for_compare(text: &str) -> String {
    text.chars()
        .filter(|c| is_script_letter(*c) || c.is_ascii_digit())
        .flat_map(char::to_lowercase)
        .collect()
}

fn comparison_key(text: &str, strictness: Strictness) -> String {
    match strictness {
        Strictness::FullBlock => normalize_for_compare(text),
        Strictness::HeaderOnly => {
            let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
            normalize_for_compare(header)
        }
    }
}

/// Whether `current` is materially different from what was last delivered.
pub fn is_changed(previous: Option<&str>, current: &str, strictness: Strictness) -> bool {
    match previous {
        None => true,
        Some(prev) => comparison_key(prev, strictness) != comparison_key(current, strictness),
    }
}

/// A slot whose schedule should be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub slot: Slot,
    /// Plain block text, stored in memory after delivery.
    pub text: String,
    /// HTML message sent to subscribers.
    pub message: String,
}

/// Compare every filled slot against memory; unchanged slots are suppressed.
pub fn detect_changes(
    memory: &Memory,
    blocks: &SlotBlocks,
    strictness: Strictness,
) -> Vec<ScheduleUpdate> {
    blocks
        .iter()
        .filter_map(|(slot, block)| {
            let text = block.plain_text();
            if !is_changed(memory.get(slot), &text, strictness) {
                tracing::debug!("{slot}: schedule unchanged, suppressing");
                return None;
            }
            Some(ScheduleUpdate {
                slot,
                text,
                message: render_message(block),
            })
        })
        .collect()
}
