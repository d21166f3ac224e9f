//! Core data types for schedule extraction and delivery memory.

use chrono::Month;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trimmed, tag-free line of visible page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    /// Visible text. Never empty.
    pub content: String,
    /// True when the line came from a visually prominent markup region.
    pub emphasis: bool,
}

impl TextLine {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            emphasis: false,
        }
    }

    pub fn emphasized(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            emphasis: true,
        }
    }
}

/// A title line announcing an outage schedule for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleHeader {
    /// Day of month, 1-31.
    pub day: u32,
    pub month: Month,
    /// The line exactly as it appeared on the page.
    pub raw_text: String,
    /// Came from a prominent (large-font) span.
    pub emphasis: bool,
    /// More than 70% of its letters are uppercase.
    pub uppercase: bool,
}

impl ScheduleHeader {
    /// Tie-break rank: prominence first, then uppercase.
    pub fn rank(&self) -> (bool, bool) {
        (self.emphasis, self.uppercase)
    }

    /// Whether this candidate should replace `other` for the same date.
    ///
    /// Equal ranks never replace, so the topmost candidate wins ties.
    pub fn outranks(&self, other: &ScheduleHeader) -> bool {
        self.rank() > other.rank()
    }

    pub fn same_date(&self, other: &ScheduleHeader) -> bool {
        self.day == other.day && self.month == other.month
    }
}

/// One `major.minor` queue line with its free-text time ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Group number, 1-6.
    pub major: u8,
    /// Sub-group number, 1-2.
    pub minor: u8,
    /// The full trimmed line, including the group prefix.
    pub text: String,
}

impl QueueEntry {
    /// `1.1` opens every rendered schedule, so seeing it again marks a repeat.
    pub fn is_first(&self) -> bool {
        self.major == 1 && self.minor == 1
    }
}

/// A header with the queue entries listed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub header: ScheduleHeader,
    pub entries: Vec<QueueEntry>,
}

impl ScheduleBlock {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain block text: display header, then one entry per line.
    ///
    /// This is the form stored in [`crate::Memory`] and compared between cycles.
    pub fn plain_text(&self) -> String {
        let mut out = self.header.display_text();
        for entry in &self.entries {
            out.push('\n');
            out.push_str(&entry.text);
        }
        out
    }
}

/// The two logical dates the watcher tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Today,
    Tomorrow,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Today, Slot::Tomorrow];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Today => "today",
            Slot::Tomorrow => "tomorrow",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schedule blocks matched to target slots. At most one per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotBlocks {
    pub today: Option<ScheduleBlock>,
    pub tomorrow: Option<ScheduleBlock>,
}

impl SlotBlocks {
    pub fn get(&self, slot: Slot) -> Option<&ScheduleBlock> {
        match slot {
            Slot::Today => self.today.as_ref(),
            Slot::Tomorrow => self.tomorrow.as_ref(),
        }
    }

    pub fn set(&mut self, slot: Slot, block: ScheduleBlock) {
        match slot {
            Slot::Today => self.today = Some(block),
            Slot::Tomorrow => self.tomorrow = Some(block),
        }
    }

    /// Filled slots in `today`, `tomorrow` order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &ScheduleBlock)> {
        Slot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|block| (slot, block)))
    }

    pub fn is_empty(&self) -> bool {
        self.today.is_none() && self.tomorrow.is_none()
    }
}

/// Errors that can occur in the core library.
#[derive(thiserror::Error, Debug)]
pub enum SvitloError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Convenience result type.
pub type SvitloResult<T> = Result<T, SvitloError>;
