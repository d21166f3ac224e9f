// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! `svitlo state show|clear`.

use super::output;
use crate::config::Settings;
use crate::state::FileStateStore;
use anyhow::Result;
use std::path::Path;
use svitlo_core::{MemoryFile, Slot};

pub fn show(settings: &Settings, state: Option<&Path>) -> Result<()> {
    let store = FileStateStore::new(settings.resolve_state_path(state));
    let memory = MemoryFile::try_load(store.path())?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "path": store.path(),
            "exists": memory.is_some(),
            "memory": memory,
        }));
        return Ok(());
    }

    println!("State file: {}", store.path().display());
    let Some(memory) = memory else {
        println!("(no state yet)");
        return Ok(());
    };
    for slot in Slot::ALL {
        println!();
        match memory.get(slot) {
            Some(text) => {
                println!("[{slot}]");
                println!("{text}");
            }
            None => println!("[{slot}] (nothing delivered)"),
        }
    }
    Ok(())
}

pub fn clear(settings: &Settings, state: Option<&Path>) -> Result<()> {
    let store = FileStateStore::new(settings.resolve_state_path(state));
    let removed = store.clear()?;
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "path": store.path(),
            "removed": removed,
        }));
    } else if removed {
        output::say(format!("Removed {}", store.path().display()));
    } else {
        output::say(format!("Nothing to remove at {}", store.path().display()));
    }
    Ok(())
}
