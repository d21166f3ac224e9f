// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page acquisition over plain HTTP.
//!
//! The origin page is often unreachable from abroad or behind a bot wall,
//! so requests can go direct, through CORS relays, or through proxies.
//! Whatever comes back is unwrapped to the rendered HTML.

pub mod fetcher;
pub mod http_client;
pub mod payload;
pub mod transport;

pub use fetcher::{FetchAttempt, FetchError, FetchOrder, Fetched, Fetcher};
pub use http_client::{HttpClient, HttpResponse};
pub use payload::{extract_html, extract_rendered, PayloadError};
pub use transport::{Transport, TransportSpec};
