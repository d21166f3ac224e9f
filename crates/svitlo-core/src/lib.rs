//! svitlo-core: outage schedule extraction, date targeting and change detection.
//!
//! Pipeline: markup → [`text`] lines → [`header`] + [`queue`] blocks →
//! [`dates`] slots → [`diff`] against [`memory`].

pub mod dates;
pub mod diff;
pub mod extract;
pub mod header;
pub mod memory;
pub mod message;
pub mod queue;
pub mod text;
pub mod types;

pub use dates::{DateResolver, TargetDates};
pub use diff::{detect_changes, is_changed, normalize_for_compare, ScheduleUpdate, Strictness};
pub use extract::{assign_slots, extract_blocks, Extractor};
pub use header::detect_header;
pub use memory::{Memory, MemoryFile};
pub use message::render_message;
pub use queue::{parse_queue_entry, QueueCollector};
pub use text::{document_lines, html_to_lines, prominent_line, ProminenceRule};
pub use types::*;
