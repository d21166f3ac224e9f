// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fetch transports: the alternate paths a page request can take.
//!
//! Every strategy exposes the same `fetch(url)` capability. The fetcher
//! iterates a configured list of them and keeps the first usable payload.

use super::http_client::{cache_busted, HttpClient, HttpResponse};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// Placeholder replaced by the URL-encoded target in relay templates.
pub const URL_PLACEHOLDER: &str = "{url}";

/// One way of retrieving a URL.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short label for logs and reports.
    fn name(&self) -> String;
    /// Fetch the target URL through this path.
    async fn fetch(&self, url: &str) -> Result<HttpResponse>;
}

/// Plain GET against the origin.
pub struct DirectTransport {
    client: HttpClient,
}

impl DirectTransport {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    fn name(&self) -> String {
        "direct".to_string()
    }

    async fn fetch(&self, url: &str) -> Result<HttpResponse> {
        let target = cache_busted(url, chrono::Utc::now().timestamp_millis());
        self.client.get(&target).await
    }
}

/// GET through a public CORS relay such as `https://relay.example/get?url={url}`.
pub struct RelayTransport {
    template: String,
    client: HttpClient,
}

impl RelayTransport {
    pub fn new(template: impl Into<String>, client: HttpClient) -> Self {
        Self {
            template: template.into(),
            client,
        }
    }

    /// Relay URL for a target. Templates without `{url}` get it appended.
    pub fn relay_url(&self, target: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        if self.template.contains(URL_PLACEHOLDER) {
            self.template.replace(URL_PLACEHOLDER, &encoded)
        } else {
            format!("{}{encoded}", self.template)
        }
    }
}

#[async_trait]
impl Transport for RelayTransport {
    fn name(&self) -> String {
        let host = url::Url::parse(&self.template)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.template.clone());
        format!("relay:{host}")
    }

    async fn fetch(&self, url: &str) -> Result<HttpResponse> {
        let target = cache_busted(url, chrono::Utc::now().timestamp_millis());
        self.client.get(&self.relay_url(&target)).await
    }
}

/// GET through an HTTP or SOCKS5 proxy.
pub struct ProxyTransport {
    proxy_url: String,
    client: HttpClient,
}

impl ProxyTransport {
    pub fn new(proxy_url: &str, timeout_ms: u64, retries: u32) -> Result<Self> {
        Ok(Self {
            proxy_url: proxy_url.to_string(),
            client: HttpClient::with_proxy(timeout_ms, proxy_url)?.with_retries(retries),
        })
    }
}

#[async_trait]
impl Transport for ProxyTransport {
    fn name(&self) -> String {
        let shown = url::Url::parse(&self.proxy_url)
            .ok()
            .map(|u| {
                format!(
                    "{}://{}:{}",
                    u.scheme(),
                    u.host_str().unwrap_or("?"),
                    u.port_or_known_default().unwrap_or(0)
                )
            })
            .unwrap_or_else(|| self.proxy_url.clone());
        format!("proxy:{shown}")
    }

    async fn fetch(&self, url: &str) -> Result<HttpResponse> {
        let target = cache_busted(url, chrono::Utc::now().timestamp_millis());
        self.client.get(&target).await
    }
}

/// Configured transport, parsed from `direct`, `relay:<template>`, or `proxy:<url>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSpec {
    Direct,
    Relay(String),
    Proxy(String),
}

impl TransportSpec {
    /// Parse a comma/whitespace separated list.
    pub fn parse_list(raw: &str) -> Result<Vec<TransportSpec>> {
        raw.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }

    pub fn build(&self, timeout_ms: u64, retries: u32) -> Result<Box<dyn Transport>> {
        let client = || HttpClient::new(timeout_ms).with_retries(retries);
        let transport: Box<dyn Transport> = match self {
            Self::Direct => Box::new(DirectTransport::new(client())),
            Self::Relay(template) => Box::new(RelayTransport::new(template.clone(), client())),
            Self::Proxy(proxy_url) => Box::new(ProxyTransport::new(proxy_url, timeout_ms, retries)?),
        };
        Ok(transport)
    }
}

impl FromStr for TransportSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("direct") {
            return Ok(Self::Direct);
        }
        if let Some(template) = s.strip_prefix("relay:") {
            if url::Url::parse(&template.replace(URL_PLACEHOLDER, "x")).is_err() {
                bail!("invalid relay template: {template}");
            }
            return Ok(Self::Relay(template.to_string()));
        }
        if let Some(proxy) = s.strip_prefix("proxy:") {
            if url::Url::parse(proxy).is_err() {
                bail!("invalid proxy url: {proxy}");
            }
            return Ok(Self::Proxy(proxy.to_string()));
        }
        bail!("unknown transport '{s}' (expected direct, relay:<template>, or proxy:<url>)")
    }
}

impl fmt::Display for TransportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Relay(t) => write!(f, "relay:{t}"),
            Self::Proxy(p) => write!(f, "proxy:{p}"),
        }
    }
}
