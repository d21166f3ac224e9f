//! Schedule extraction: lines → header-bounded blocks → target slots.
//!
//! Header candidates for the same date compete until the first queue entry
//! arrives (prominence beats uppercase beats position). Once a block holds
//! entries, the next header closes it. A repeated `1.1` closes it too, and the
//! entries after it are dropped until the next header opens a fresh block.

use crate::dates::{month_genitive, TargetDates};
use crate::header::detect_header;
use crate::queue::{parse_queue_entry, Offer, QueueCollector};
use crate::text::{document_lines, ProminenceRule};
use crate::types::{ScheduleBlock, ScheduleHeader, SlotBlocks, TextLine};

/// Split a line sequence into non-empty schedule blocks, in document order.
pub fn extract_blocks(lines: &[TextLine]) -> Vec<ScheduleBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(ScheduleHeader, QueueCollector)> = None;

    for line in lines {
        if let Some(candidate) = detect_header(line) {
            current = Some(match current.take() {
                Some((held, collector)) if collector.is_empty() && held.same_date(&candidate) => {
                    if candidate.outranks(&held) {
                        (candidate, collector)
                    } else {
                        (held, collector)
                    }
                }
                Some((held, collector)) => {
                    close_block(&mut blocks, held, collector);
                    (candidate, QueueCollector::new())
                }
                None => (candidate, QueueCollector::new()),
            });
            continue;
        }

        let Some(entry) = parse_queue_entry(&line.content) else {
            continue;
        };
        match current.as_mut() {
            Some((header, collector)) => {
                if collector.offer(entry) == Offer::Repeated {
                    tracing::debug!(
                        "repeated 1.1 under '{}', closing block after {} entries",
                        header.raw_text,
                        collector.len()
                    );
                }
            }
            None => tracing::trace!("queue entry without a header: {}", entry.text),
        }
    }

    if let Some((held, collector)) = current {
        close_block(&mut blocks, held, collector);
    }

    blocks
}

fn close_block(blocks: &mut Vec<ScheduleBlock>, header: ScheduleHeader, collector: QueueCollector) {
    if collector.is_empty() {
        tracing::debug!("dropping empty block '{}'", header.raw_text);
        return;
    }
    blocks.push(ScheduleBlock {
        header,
        entries: collector.into_entries(),
    });
}

/// Assign blocks to the today/tomorrow slots.
///
/// Blocks for other dates are discarded. A later block for an already filled
/// slot replaces it only when its header strictly outranks the held one.
pub fn assign_slots(blocks: Vec<ScheduleBlock>, targets: &TargetDates) -> SlotBlocks {
    let mut slots = SlotBlocks::default();

    for block in blocks {
        let (day, month) = (block.header.day, block.header.month);
        let Some(slot) = targets.slot_for(day, month) else {
            tracing::debug!(
                "discarding schedule for {day} {}: neither today nor tomorrow",
                month_genitive(month)
            );
            continue;
        };
        let replace = match slots.get(slot) {
            None => true,
            Some(held) => block.header.outranks(&held.header),
        };
        if replace {
            slots.set(slot, block);
        }
    }

    slots
}

/// Markup-to-slots pipeline with a configurable prominence rule.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    prominence: Option<ProminenceRule>,
}

impl Extractor {
    pub fn new(prominence: Option<ProminenceRule>) -> Self {
        Self { prominence }
    }

    pub fn lines(&self, html: &str) -> Vec<TextLine> {
        document_lines(html, self.prominence.as_ref())
    }

    pub fn blocks(&self, html: &str) -> Vec<ScheduleBlock> {
        extract_blocks(&self.lines(html))
    }

    pub fn extract(&self, html: &str, targets: &TargetDates) -> SlotBlocks {
        assign_slots(self.blocks(html), targets)
    }
}
