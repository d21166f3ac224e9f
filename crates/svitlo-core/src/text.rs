//! HTML-to-text normalization.
//!
//! Turns rendered page markup into the ordered line sequence the header
//! detector and queue collector work on. This is line-oriented regex work,
//! not a DOM walk: block closes and `<br>` become newlines, table cells become
//! spaces, everything else is stripped. Best effort only; malformed markup and
//! entities outside the decoded set pass through unchanged.
//!
//! The prominence extractor is the one place that parses the DOM (`scraper`),
//! because it needs the inline `style` of a specific span.

use crate::types::TextLine;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

/// Entities decoded after tag stripping. `&amp;` must stay last so that
/// `&amp;nbsp;` decodes to the literal text `&nbsp;`.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&#160;", " "),
    ("&ndash;", "\u{2013}"),
    ("&#8211;", "\u{2013}"),
    ("&rsquo;", "\u{2019}"),
    ("&#8217;", "\u{2019}"),
    ("&quot;", "\""),
    ("&#34;", "\""),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

/// Points per CSS pixel.
const PT_PER_PX: f32 = 0.75;

struct Patterns {
    style: Regex,
    script: Regex,
    comment: Regex,
    line_break: Regex,
    block_close: Regex,
    cell_close: Regex,
    tag: Regex,
    font_size: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        style: Regex::new(r"(?is)<style\b.*?</style\s*>").expect("style regex is valid"),
        script: Regex::new(r"(?is)<script\b.*?</script\s*>").expect("script regex is valid"),
        comment: Regex::new(r"(?s)<!--.*?-->").expect("comment regex is valid"),
        line_break: Regex::new(r"(?i)<br\s*/?>").expect("br regex is valid"),
        block_close: Regex::new(r"(?i)</(?:p|div|li|tr|h[1-6])\s*>")
            .expect("block close regex is valid"),
        cell_close: Regex::new(r"(?i)</t[dh]\s*>").expect("cell close regex is valid"),
        tag: Regex::new(r"<[^>]*>").expect("tag regex is valid"),
        font_size: Regex::new(r"(?i)font-size\s*:\s*([0-9]+(?:\.[0-9]+)?)\s*(pt|px)")
            .expect("font-size regex is valid"),
    })
}

/// Convert markup into non-empty, whitespace-collapsed lines in document order.
pub fn html_to_lines(html: &str) -> Vec<TextLine> {
    let p = patterns();

    let text = p.style.replace_all(html, "");
    let text = p.script.replace_all(&text, "");
    let text = p.comment.replace_all(&text, "");
    let text = p.line_break.replace_all(&text, "\n");
    let text = p.block_close.replace_all(&text, "\n");
    let text = p.cell_close.replace_all(&text, " ");
    let text = p.tag.replace_all(&text, "");
    let text = decode_entities(&text);

    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .map(TextLine::plain)
        .collect()
}

/// Decode the fixed entity set.
pub fn decode_entities(text: &str) -> String {
    let mut out = text.to_string();
    for (entity, literal) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, literal);
        }
    }
    out
}

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Latin or Cyrillic letter. Digits, emoji, and punctuation are not.
pub(crate) fn is_script_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || (('\u{0400}'..='\u{04FF}').contains(&c) && c.is_alphabetic())
}

/// Which spans count as a visually prominent banner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProminenceRule {
    /// Minimum inline `font-size`, in points. Pixel sizes are converted.
    pub min_font_pt: f32,
}

impl Default for ProminenceRule {
    fn default() -> Self {
        Self { min_font_pt: 14.0 }
    }
}

/// Find the first large-font span and return its text as an emphasized line.
pub fn prominent_line(html: &str, rule: &ProminenceRule) -> Option<TextLine> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("span[style]").ok()?;

    for element in document.select(&selector) {
        let Some(style) = element.value().attr("style") else {
            continue;
        };
        match font_size_pt(style) {
            Some(size) if size >= rule.min_font_pt => {}
            _ => continue,
        }
        let text = collapse_whitespace(&element.text().collect::<String>());
        if !text.is_empty() {
            return Some(TextLine::emphasized(text));
        }
    }

    None
}

/// Normalized lines, with the prominent banner (if any) prepended.
pub fn document_lines(html: &str, prominence: Option<&ProminenceRule>) -> Vec<TextLine> {
    let mut lines = Vec::new();
    if let Some(line) = prominence.and_then(|rule| prominent_line(html, rule)) {
        lines.push(line);
    }
    lines.extend(html_to_lines(html));
    lines
}

fn font_size_pt(style: &str) -> Option<f32> {
    let caps = patterns().font_size.captures(style)?;
    let value: f32 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_ascii_lowercase();
    if unit == "px" {
        Some(value * PT_PER_PX)
    } else {
        Some(value)
    }
}
