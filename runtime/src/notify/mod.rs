// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Notification boundary.
//!
//! A `Notifier` delivers one rendered HTML message. Delivery is attempted
//! once per cycle; failures are reported to the caller and retried on the
//! next cycle because memory is left untouched.

pub mod telegram;

use async_trait::async_trait;

pub use telegram::TelegramNotifier;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API rejected message ({code}): {description}")]
    Api { code: u16, description: String },

    #[error("unexpected response status {0}")]
    Status(u16),
}

/// Something that can deliver a message to subscribers.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Logs messages instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        tracing::info!("dry run, not sending:\n{text}");
        Ok(())
    }
}
