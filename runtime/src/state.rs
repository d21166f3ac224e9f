// Copyright 2026 Svitlo Contributors
// SPDX-License-Identifier: Apache-2.0

//! Where the last delivered schedules live between cycles and restarts.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use svitlo_core::{Memory, MemoryFile};

pub trait StateStore: Send + Sync {
    /// Current memory. Unreadable state degrades to an empty baseline.
    fn load(&self) -> Memory;
    fn save(&self, memory: &Memory) -> Result<()>;
    /// Human-readable location, for logs and `state show`.
    fn describe(&self) -> String;
}

/// JSON file on disk, written atomically.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file. Missing files are not an error.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Memory {
        MemoryFile::load(&self.path)
    }

    fn save(&self, memory: &Memory) -> Result<()> {
        MemoryFile::save(&self.path, memory)
            .with_context(|| format!("saving state to {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Process-local store, used by dry runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    memory: Mutex<Memory>,
}

impl InMemoryStateStore {
    pub fn new(memory: Memory) -> Self {
        Self {
            memory: Mutex::new(memory),
        }
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> Memory {
        self.memory
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    fn save(&self, memory: &Memory) -> Result<()> {
        let mut guard = self
            .memory
            .lock()
            .map_err(|_| anyhow::anyhow!("state lock poisoned"))?;
        *guard = memory.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
