// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Svitlo runtime library: fetch transports, Telegram delivery, state
//! persistence, and the poll loop around `svitlo-core`.
//!
//! This library crate exposes the runtime modules for integration testing.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod cycle;
pub mod notify;
pub mod state;
pub mod watch;
