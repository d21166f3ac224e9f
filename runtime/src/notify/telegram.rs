// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Telegram Bot API `sendMessage` client.

use super::{Notifier, NotifyError};
use crate::acquisition::HttpClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

const SEND_TIMEOUT_MS: u64 = 15_000;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: HttpClient,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: HttpClient::new(SEND_TIMEOUT_MS).with_retries(0),
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Point at a different Bot API server (local bot API, test double).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        // The token is part of the URL, keep it out of error text.
        let response = self
            .client
            .post_json(&self.endpoint(), &body)
            .await
            .map_err(|e| NotifyError::Http(redact(&format!("{e:#}"), &self.token)))?;

        match serde_json::from_str::<ApiReply>(&response.body) {
            Ok(reply) if reply.ok => Ok(()),
            Ok(reply) => Err(NotifyError::Api {
                code: reply.error_code.unwrap_or(response.status),
                description: reply.description.unwrap_or_default(),
            }),
            Err(_) if response.is_ok() => Ok(()),
            Err(_) => Err(NotifyError::Status(response.status)),
        }
    }
}

fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        text.to_string()
    } else {
        text.replace(secret, "<redacted>")
    }
}
