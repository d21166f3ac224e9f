// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fetch orchestration over an ordered or shuffled list of transports.

use super::payload::{extract_html, extract_rendered};
use super::transport::Transport;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::fmt;

/// Order in which transports are tried each cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchOrder {
    #[default]
    Sequential,
    Shuffled,
}

/// A usable page: the rendered HTML and the transport that produced it.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub transport: String,
    pub html: String,
}

/// One failed transport attempt.
#[derive(Debug, Clone, Serialize)]
pub struct FetchAttempt {
    pub transport: String,
    pub reason: String,
}

impl fmt::Display for FetchAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.transport, self.reason)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no transports configured")]
    NoTransports,

    #[error("all {} transport(s) failed: {}", .0.len(), join_attempts(.0))]
    Exhausted(Vec<FetchAttempt>),
}

fn join_attempts(attempts: &[FetchAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Tries each transport until one yields a 200 response whose rendered HTML
/// is non-empty and carries every marker.
pub struct Fetcher {
    transports: Vec<Box<dyn Transport>>,
    order: FetchOrder,
    markers: Vec<String>,
    rendered_only: bool,
}

impl Fetcher {
    pub fn new(transports: Vec<Box<dyn Transport>>) -> Self {
        Self {
            transports,
            order: FetchOrder::Sequential,
            markers: Vec::new(),
            rendered_only: false,
        }
    }

    pub fn with_order(mut self, order: FetchOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_markers(mut self, markers: Vec<String>) -> Self {
        self.markers = markers;
        self
    }

    /// Only accept HTML taken from a `content.rendered` JSON field.
    pub fn with_rendered_only(mut self, rendered_only: bool) -> Self {
        self.rendered_only = rendered_only;
        self
    }

    pub fn transport_names(&self) -> Vec<String> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn order(&self) -> FetchOrder {
        self.order
    }

    fn attempt_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.transports.len()).collect();
        if self.order == FetchOrder::Shuffled {
            order.shuffle(&mut rand::thread_rng());
        }
        order
    }

    /// Fetch `url`, returning the first usable payload.
    pub async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        if self.transports.is_empty() {
            return Err(FetchError::NoTransports);
        }

        let mut attempts = Vec::new();
        for idx in self.attempt_order() {
            let transport = &self.transports[idx];
            let name = transport.name();
            match self.try_transport(transport.as_ref(), url).await {
                Ok(html) => {
                    tracing::debug!("fetched {url} via {name} ({} bytes)", html.len());
                    return Ok(Fetched {
                        transport: name,
                        html,
                    });
                }
                Err(reason) => {
                    tracing::warn!("transport {name} failed: {reason}");
                    attempts.push(FetchAttempt {
                        transport: name,
                        reason,
                    });
                }
            }
        }
        Err(FetchError::Exhausted(attempts))
    }

    async fn try_transport(&self, transport: &dyn Transport, url: &str) -> Result<String, String> {
        let response = transport.fetch(url).await.map_err(|e| format!("{e:#}"))?;
        if !response.is_ok() {
            return Err(format!("HTTP {}", response.status));
        }
        let html = if self.rendered_only {
            extract_rendered(&response.body)
        } else {
            extract_html(&response.body)
        }
        .map_err(|e| e.to_string())?;
        if let Some(missing) = self.markers.iter().find(|m| !html.contains(m.as_str())) {
            return Err(format!("marker '{missing}' not found"));
        }
        Ok(html)
    }
}
