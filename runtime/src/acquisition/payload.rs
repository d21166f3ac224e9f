// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Payload unwrapping: find the rendered HTML inside whatever a transport returned.
//!
//! The origin serves a WordPress REST page (`content.rendered`). Relays wrap
//! that JSON again, usually as a string field (`contents`, `body`, `data`),
//! sometimes twice. Plain HTML passes through untouched.

use serde_json::Value;

/// How many JSON envelopes deep we are willing to look.
const MAX_DEPTH: usize = 3;

const WRAPPER_FIELDS: &[&str] = &["contents", "body", "data"];

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON payload has no rendered HTML field")]
    MissingHtml,

    #[error("expected a JSON page but got markup")]
    NotJson,

    #[error("rendered HTML is empty")]
    Empty,

    #[error("JSON payload nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

/// Extract rendered HTML from a raw body. Plain markup passes through.
pub fn extract_html(body: &str) -> Result<String, PayloadError> {
    non_empty(unwrap_text(body, 0, false)?)
}

/// Like [`extract_html`], but only accepts HTML found in a WordPress
/// `content.rendered` field. Bare markup, such as a challenge page served
/// with status 200, is rejected.
pub fn extract_rendered(body: &str) -> Result<String, PayloadError> {
    non_empty(unwrap_text(body, 0, true)?)
}

fn non_empty(html: String) -> Result<String, PayloadError> {
    if html.trim().is_empty() {
        return Err(PayloadError::Empty);
    }
    Ok(html)
}

fn looks_like_json(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some('{') | Some('['))
}

/// `depth` counts JSON documents parsed so far; only parsing moves it.
fn unwrap_text(text: &str, depth: usize, rendered_only: bool) -> Result<String, PayloadError> {
    if !looks_like_json(text) {
        if rendered_only {
            return Err(PayloadError::NotJson);
        }
        return Ok(text.to_string());
    }
    if depth >= MAX_DEPTH {
        return Err(PayloadError::TooDeep);
    }
    let value: Value = serde_json::from_str(text.trim())?;
    unwrap_value(&value, depth + 1, rendered_only)
}

fn unwrap_value(value: &Value, depth: usize, rendered_only: bool) -> Result<String, PayloadError> {
    match value {
        Value::String(s) => unwrap_text(s, depth, rendered_only),
        Value::Array(items) => items
            .first()
            .ok_or(PayloadError::MissingHtml)
            .and_then(|first| unwrap_value(first, depth, rendered_only)),
        Value::Object(_) => {
            if let Some(html) = value.pointer("/content/rendered").and_then(Value::as_str) {
                return Ok(html.to_string());
            }
            for field in WRAPPER_FIELDS {
                match value.get(*field) {
                    Some(inner @ (Value::String(_) | Value::Object(_) | Value::Array(_))) => {
                        return unwrap_value(inner, depth, rendered_only);
                    }
                    _ => continue,
                }
            }
            Err(PayloadError::MissingHtml)
        }
        _ => Err(PayloadError::MissingHtml),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_html_passthrough() {
        let html = "<html><body><p>26 ГРУДНЯ</p></body></html>";
        assert_eq!(extract_html(html).unwrap(), html);
    }

    #[test]
    fn test_wordpress_page() {
        let body = json!({"id": 1, "content": {"rendered": "<p>ГПВ</p>", "protected": false}});
        assert_eq!(extract_html(&body.to_string()).unwrap(), "<p>ГПВ</p>");
    }

    #[test]
    fn test_wordpress_array() {
        let body = json!([{"content": {"rendered": "<p>перша</p>"}}, {"content": {"rendered": "x"}}]);
        assert_eq!(extract_html(&body.to_string()).unwrap(), "<p>перша</p>");
    }

    #[test]
    fn test_relay_single_wrap() {
        let inner = json!({"content": {"rendered": "<p>ГПВ</p>"}}).to_string();
        let body = json!({"contents": inner, "status": {"http_code": 200}});
        assert_eq!(extract_html(&body.to_string()).unwrap(), "<p>ГПВ</p>");
    }

    #[test]
    fn test_relay_double_wrap() {
        let page = json!({"content": {"rendered": "<p>ГПВ</p>"}}).to_string();
        let once = json!({"body": page}).to_string();
        let twice = json!({"contents": once}).to_string();
        assert_eq!(extract_html(&twice).unwrap(), "<p>ГПВ</p>");
    }

    #[test]
    fn test_relay_double_wrap_of_markup() {
        let body = r#"{"contents": "{\"contents\":\"<p>ГПВ</p>\"}"}"#;
        assert_eq!(extract_html(body).unwrap(), "<p>ГПВ</p>");
    }

    #[test]
    fn test_relay_double_wrap_object_field() {
        let page = json!({"content": {"rendered": "<p>ГПВ</p>"}});
        let once = json!({"data": {"body": page.to_string()}}).to_string();
        let twice = json!({"contents": once}).to_string();
        assert_eq!(extract_html(&twice).unwrap(), "<p>ГПВ</p>");
    }

    #[test]
    fn test_empty_payload() {
        assert!(matches!(extract_html(""), Err(PayloadError::Empty)));
        assert!(matches!(extract_html("  \n "), Err(PayloadError::Empty)));
        let body = json!({"content": {"rendered": ""}});
        assert!(matches!(
            extract_html(&body.to_string()),
            Err(PayloadError::Empty)
        ));
    }

    #[test]
    fn test_rendered_only() {
        let page = json!({"content": {"rendered": "<p>ГПВ</p>"}}).to_string();
        let relayed = json!({"contents": page}).to_string();
        assert_eq!(extract_rendered(&relayed).unwrap(), "<p>ГПВ</p>");

        let challenge = "<html><title>Just a moment...</title></html>";
        assert!(matches!(extract_rendered(challenge), Err(PayloadError::NotJson)));
        let relayed_markup = json!({"contents": challenge}).to_string();
        assert!(matches!(
            extract_rendered(&relayed_markup),
            Err(PayloadError::NotJson)
        ));
    }

    #[test]
    fn test_relay_wrapping_html() {
        let body = json!({"contents": "<html><p>ГПВ</p></html>"});
        assert_eq!(extract_html(&body.to_string()).unwrap(), "<html><p>ГПВ</p></html>");
    }

    #[test]
    fn test_missing_field() {
        let body = json!({"id": 1, "title": {"rendered": "Графік"}});
        assert!(matches!(
            extract_html(&body.to_string()),
            Err(PayloadError::MissingHtml)
        ));
        assert!(matches!(extract_html("[]"), Err(PayloadError::MissingHtml)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            extract_html("{\"content\": "),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn test_too_deep() {
        let mut body = json!({"content": {"rendered": "<p>x</p>"}}).to_string();
        for _ in 0..4 {
            body = json!({ "contents": body }).to_string();
        }
        assert!(matches!(extract_html(&body), Err(PayloadError::TooDeep)));
    }
}
