// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Process-wide output mode set once from the global CLI flags.

use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default)]
struct Mode {
    json: bool,
    quiet: bool,
}

static MODE: OnceLock<Mode> = OnceLock::new();

pub fn init(json: bool, quiet: bool) {
    let _ = MODE.set(Mode { json, quiet });
}

fn mode() -> Mode {
    MODE.get().copied().unwrap_or_default()
}

pub fn is_json() -> bool {
    mode().json
}

pub fn is_quiet() -> bool {
    mode().quiet
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::error!("failed to encode output: {e}"),
    }
}

/// Human line on stdout, suppressed by `--quiet` and `--json`.
pub fn say(line: impl AsRef<str>) {
    if !is_quiet() && !is_json() {
        println!("{}", line.as_ref());
    }
}
