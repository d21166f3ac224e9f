//! Subscriber-facing message rendering (Telegram HTML parse mode).

use crate::types::ScheduleBlock;

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// `⚡️ <b>header</b>`, a blank line, then one queue entry per line.
pub fn render_message(block: &ScheduleBlock) -> String {
    let mut out = format!(
        "\u{26A1}\u{FE0F} <b>{}</b>\n",
        escape_html(&block.header.display_text())
    );
    for entry in &block.entries {
        out.push('\n');
        out.push_str(&escape_html(&entry.text));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QueueEntry, ScheduleHeader};
    use chrono::Month;

    #[test]
    fn test_escape() {
        assert_eq!(escape_html("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn test_render() {
        let block = ScheduleBlock {
            header: ScheduleHeader {
                day: 26,
                month: Month::December,
                raw_text: "26 ГРУДНЯ ОНОВЛЕНО ГПВ".to_string(),
                emphasis: false,
                uppercase: true,
            },
            entries: vec![
                QueueEntry {
                    major: 1,
                    minor: 1,
                    text: "1.1: 00:00-03:00".to_string(),
                },
                QueueEntry {
                    major: 1,
                    minor: 2,
                    text: "1.2: <03:00".to_string(),
                },
            ],
        };
        assert_eq!(
            render_message(&block),
            "\u{26A1}\u{FE0F} <b>26 ГРУДНЯ ОНОВЛЕНО ГПВ</b>\n\n1.1: 00:00-03:00\n1.2: &lt;03:00"
        );
    }
}
