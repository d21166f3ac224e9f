//! Schedule header detection, ranking, and display text.
//!
//! A header is a line that carries a date (`26 грудня`, `26.12`) and at least
//! one schedule keyword. Known false positives (the "approximate diagram"
//! caption) are rejected outright.

use crate::dates::{month_from_number, month_genitive, parse_month};
use crate::queue::parse_queue_entry;
use crate::text::is_script_letter;
use crate::types::{ScheduleHeader, TextLine};
use chrono::Month;
use regex::Regex;
use std::sync::OnceLock;

/// Lowercase keyword fragments; a header needs at least one.
pub const HEADER_KEYWORDS: &[&str] = &[
    "гпв",
    "гав",
    "оновлено",
    "графік",
    "діятиме",
    "діятимуть",
    "буде діяти",
    "відключ",
];

/// Lines containing any of these are never headers.
pub const EXCLUDED_PHRASES: &[&str] = &["орієнтовна схема"];

/// Phrases marking a wordy announcement rather than a title.
pub const BOILERPLATE_PHRASES: &[&str] = &["відповідно до", "згідно з", "укренерго"];

/// Raw header lines longer than this (in chars) are replaced for display.
pub const MAX_DISPLAY_CHARS: usize = 90;

/// Share of uppercase letters above which a line counts as uppercase.
const UPPERCASE_RATIO: f64 = 0.7;

struct DatePatterns {
    word: Regex,
    numeric: Regex,
}

fn date_patterns() -> &'static DatePatterns {
    static PATTERNS: OnceLock<DatePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| DatePatterns {
        word: Regex::new(
            r"(?i)(?:^|\D)(\d{1,2})\s*[.\-/]?\s*(січня|лютого|березня|квітня|травня|червня|липня|серпня|вересня|жовтня|листопада|грудня)",
        )
        .expect("month-name date regex is valid"),
        numeric: Regex::new(r"(?:^|\D)(\d{1,2})[./](\d{1,2})(?:[./](?:\d{4}|\d{2}))?(?:\D|$)")
            .expect("numeric date regex is valid"),
    })
}

/// Find the first valid `(day, month)` in a line. Month names win over
/// numeric dates.
pub fn find_date(text: &str) -> Option<(u32, Month)> {
    let patterns = date_patterns();

    let by_name = patterns.word.captures_iter(text).find_map(|caps| {
        let day = valid_day(caps.get(1)?.as_str())?;
        let month = parse_month(caps.get(2)?.as_str())?;
        Some((day, month))
    });
    if by_name.is_some() {
        return by_name;
    }

    patterns.numeric.captures_iter(text).find_map(|caps| {
        let day = valid_day(caps.get(1)?.as_str())?;
        let month = month_from_number(caps.get(2)?.as_str().parse().ok()?)?;
        Some((day, month))
    })
}

fn valid_day(digits: &str) -> Option<u32> {
    let day: u32 = digits.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

/// More than 70% of the line's Latin/Cyrillic letters are uppercase.
pub fn is_mostly_uppercase(text: &str) -> bool {
    let (letters, upper) = text
        .chars()
        .filter(|c| is_script_letter(*c))
        .fold((0usize, 0usize), |(letters, upper), c| {
            (letters + 1, upper + usize::from(c.is_uppercase()))
        });
    letters > 0 && (upper as f64 / letters as f64) > UPPERCASE_RATIO
}

/// Decide whether a line is a schedule header candidate.
pub fn detect_header(line: &TextLine) -> Option<ScheduleHeader> {
    let text = line.content.as_str();
    let lower = text.to_lowercase();

    if EXCLUDED_PHRASES.iter().any(|p| lower.contains(p)) {
        return None;
    }
    if parse_queue_entry(text).is_some() {
        return None;
    }
    if !HEADER_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return None;
    }

    let (day, month) = find_date(text)?;
    Some(ScheduleHeader {
        day,
        month,
        raw_text: text.to_string(),
        emphasis: line.emphasis,
        uppercase: is_mostly_uppercase(text),
    })
}

impl ScheduleHeader {
    /// Header as shown to subscribers.
    ///
    /// Long or boilerplate-laden announcements collapse to a canonical
    /// `ГРАФІК ВІДКЛЮЧЕНЬ НА <day> <МІСЯЦЯ>`; anything else is echoed verbatim.
    pub fn display_text(&self) -> String {
        let lower = self.raw_text.to_lowercase();
        let too_long = self.raw_text.chars().count() > MAX_DISPLAY_CHARS;
        if too_long || BOILERPLATE_PHRASES.iter().any(|p| lower.contains(p)) {
            canonical_title(self.day, self.month)
        } else {
            self.raw_text.clone()
        }
    }
}

pub fn canonical_title(day: u32, month: Month) -> String {
    format!(
        "ГРАФІК ВІДКЛЮЧЕНЬ НА {day} {}",
        month_genitive(month).to_uppercase()
    )
}
