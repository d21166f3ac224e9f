// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Environment-driven settings.
//!
//! Everything comes from process environment (optionally seeded from a
//! `.env` file by the binary). Malformed numbers fall back to defaults.
//! Malformed transport lists, strictness and timezone are hard errors.

use crate::acquisition::{FetchOrder, Fetcher, TransportSpec};
use crate::acquisition::http_client::DEFAULT_MAX_RETRIES;
use crate::notify::telegram::DEFAULT_API_BASE;
use crate::notify::{DryRunNotifier, Notifier, TelegramNotifier};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use svitlo_core::{DateResolver, Extractor, ProminenceRule, Strictness};

pub const DEFAULT_URL: &str = "https://www.zoe.com.ua/wp-json/wp/v2/pages/371392";
pub const DEFAULT_TIMEZONE: &str = "Europe/Kyiv";
const DEFAULT_POLL_SECS: u64 = 300;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 20_000;
const MIN_POLL_SECS: u64 = 10;

/// State file relative to the working directory or home.
const STATE_RELATIVE: &str = ".svitlo/state.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub url: String,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub telegram_api_base: String,
    pub state_file: Option<PathBuf>,
    pub timezone: String,
    pub poll_interval: Duration,
    pub max_runtime: Option<Duration>,
    pub fetch_timeout_ms: u64,
    pub fetch_retries: u32,
    pub transports: Vec<TransportSpec>,
    pub order: FetchOrder,
    pub markers: Vec<String>,
    /// Accept only HTML from a WordPress `content.rendered` field.
    pub rendered_only: bool,
    pub strictness: Strictness,
    pub prominence: Option<ProminenceRule>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let transports = match env.string("SVITLO_TRANSPORTS") {
            Some(raw) => TransportSpec::parse_list(&raw).context("SVITLO_TRANSPORTS")?,
            None => vec![TransportSpec::Direct],
        };
        if transports.is_empty() {
            bail!("SVITLO_TRANSPORTS is set but lists no transports");
        }

        let strictness = match env.string("SVITLO_STRICTNESS") {
            Some(raw) => raw
                .parse::<Strictness>()
                .map_err(|e| anyhow::anyhow!("SVITLO_STRICTNESS: {e}"))?,
            None => Strictness::default(),
        };

        let timezone = env
            .string("SVITLO_TIMEZONE")
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        DateResolver::from_name(&timezone).context("SVITLO_TIMEZONE")?;

        let prominence = match env.string("SVITLO_PROMINENT_FONT_PT") {
            Some(raw) if raw.eq_ignore_ascii_case("off") => None,
            Some(raw) => match raw.parse::<f32>() {
                Ok(pt) if pt > 0.0 => Some(ProminenceRule { min_font_pt: pt }),
                Ok(_) => None,
                Err(_) => {
                    tracing::warn!("SVITLO_PROMINENT_FONT_PT={raw} is not a number, using default");
                    Some(ProminenceRule::default())
                }
            },
            None => Some(ProminenceRule::default()),
        };

        let markers = env
            .string("SVITLO_MARKERS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let max_runtime_secs = env.u64("SVITLO_MAX_RUNTIME_SECS", 0);
        let url = env.string("SVITLO_URL").unwrap_or_else(|| DEFAULT_URL.to_string());
        let rendered_only = env
            .flag("SVITLO_RENDERED_ONLY")
            .unwrap_or_else(|| url.contains("/wp-json/"));

        Ok(Self {
            url,
            bot_token: env.string("BOT_TOKEN"),
            chat_id: env.string("CHAT_ID"),
            telegram_api_base: env
                .string("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            state_file: env.string("SVITLO_STATE_FILE").map(PathBuf::from),
            timezone,
            poll_interval: Duration::from_secs(
                env.u64("SVITLO_POLL_SECS", DEFAULT_POLL_SECS).max(MIN_POLL_SECS),
            ),
            max_runtime: (max_runtime_secs > 0).then(|| Duration::from_secs(max_runtime_secs)),
            fetch_timeout_ms: env.u64("SVITLO_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS).max(1),
            fetch_retries: env.u32("SVITLO_FETCH_RETRIES", DEFAULT_MAX_RETRIES),
            transports,
            order: if env.bool("SVITLO_SHUFFLE") {
                FetchOrder::Shuffled
            } else {
                FetchOrder::Sequential
            },
            markers,
            rendered_only,
            strictness,
            prominence,
        })
    }

    /// Telegram credentials, required for real delivery.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.bot_token.as_deref(), self.chat_id.as_deref()) {
            (Some(token), Some(chat)) => Ok((token, chat)),
            (None, _) => bail!("BOT_TOKEN is not set (use --dry-run to skip delivery)"),
            (_, None) => bail!("CHAT_ID is not set (use --dry-run to skip delivery)"),
        }
    }

    pub fn notifier(&self, dry_run: bool) -> Result<Box<dyn Notifier>> {
        if dry_run {
            return Ok(Box::new(DryRunNotifier));
        }
        let (token, chat_id) = self.credentials()?;
        Ok(Box::new(
            TelegramNotifier::new(token, chat_id).with_api_base(&self.telegram_api_base),
        ))
    }

    pub fn build_fetcher(&self) -> Result<Fetcher> {
        let transports = self
            .transports
            .iter()
            .map(|spec| spec.build(self.fetch_timeout_ms, self.fetch_retries))
            .collect::<Result<Vec<_>>>()?;
        Ok(Fetcher::new(transports)
            .with_order(self.order)
            .with_markers(self.markers.clone())
            .with_rendered_only(self.rendered_only))
    }

    pub fn extractor(&self) -> Extractor {
        Extractor::new(self.prominence)
    }

    pub fn resolver(&self) -> Result<DateResolver> {
        DateResolver::from_name(&self.timezone).context("SVITLO_TIMEZONE")
    }

    /// State file: explicit flag, then `SVITLO_STATE_FILE`, then
    /// `.svitlo/state.json` in the working directory if it exists, then home.
    pub fn resolve_state_path(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Some(path) = &self.state_file {
            return path.clone();
        }
        let local = PathBuf::from(STATE_RELATIVE);
        if local.exists() {
            return local;
        }
        match dirs::home_dir() {
            Some(home) => home.join(STATE_RELATIVE),
            None => local,
        }
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn u64(&self, name: &str, default_value: u64) -> u64 {
        self.string(name)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(default_value)
    }

    fn u32(&self, name: &str, default_value: u32) -> u32 {
        self.string(name)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(default_value)
    }

    fn bool(&self, name: &str) -> bool {
        self.flag(name).unwrap_or(false)
    }

    /// `None` when unset or unrecognized.
    fn flag(&self, name: &str) -> Option<bool> {
        match self.string(name)?.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}
