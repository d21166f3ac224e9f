// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the `svitlo` binary.

pub mod doctor;
pub mod extract_cmd;
pub mod output;
pub mod run_cmd;
pub mod state_cmd;
