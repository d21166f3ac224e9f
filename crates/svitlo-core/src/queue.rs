//! Queue-entry recognition and per-block collection.

use crate::types::QueueEntry;
use regex::Regex;
use std::sync::OnceLock;

fn queue_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([1-6])\.([1-2])\s*[:.\-\u{2013}\u{2014}]").expect("queue regex is valid")
    })
}

/// Parse a `major.minor` queue line such as `"1.1: 00:00-03:00"`.
///
/// Only groups 1-6 with sub-groups 1-2 followed by a separator match.
pub fn parse_queue_entry(line: &str) -> Option<QueueEntry> {
    let caps = queue_regex().captures(line)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some(QueueEntry {
        major,
        minor,
        text: line.trim().to_string(),
    })
}

/// Outcome of offering an entry to a [`QueueCollector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    /// A `1.1` after earlier entries; the block is now closed.
    Repeated,
    /// The block was already closed.
    Ignored,
}

/// Accumulates the queue entries of one schedule block.
#[derive(Debug, Default)]
pub struct QueueCollector {
    entries: Vec<QueueEntry>,
    closed: bool,
}

impl QueueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offer(&mut self, entry: QueueEntry) -> Offer {
        if self.closed {
            return Offer::Ignored;
        }
        if entry.is_first() && !self.entries.is_empty() {
            self.closed = true;
            return Offer::Repeated;
        }
        self.entries.push(entry);
        Offer::Accepted
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_entries(self) -> Vec<QueueEntry> {
        self.entries
    }
}
