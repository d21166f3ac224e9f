//! Last-delivered schedule memory and its on-disk form.
//!
//! The file is a small JSON object `{"today": "...", "tomorrow": "..."}`.
//! Older deployments wrote a bare last-seen string; that is still accepted
//! and adopted as the `today` value. Anything unreadable degrades to an
//! empty baseline, so the next valid schedule is delivered again.

use crate::types::{Slot, SvitloError, SvitloResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Last delivered plain block text per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub today: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tomorrow: Option<String>,
}

impl Memory {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Today => self.today.as_deref(),
            Slot::Tomorrow => self.tomorrow.as_deref(),
        }
    }

    /// Overwrite a slot with newly delivered text.
    pub fn record(&mut self, slot: Slot, text: impl Into<String>) {
        let text = Some(text.into());
        match slot {
            Slot::Today => self.today = text,
            Slot::Tomorrow => self.tomorrow = text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.today.is_none() && self.tomorrow.is_none()
    }

    /// Parse file contents, accepting the legacy bare-string form.
    pub fn parse(contents: &str) -> SvitloResult<Self> {
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        if trimmed.starts_with('{') {
            return serde_json::from_str(trimmed)
                .map_err(|e| SvitloError::Storage(format!("corrupt state file: {e}")));
        }
        let legacy = if trimmed.starts_with('"') {
            serde_json::from_str::<String>(trimmed)
                .map_err(|e| SvitloError::Storage(format!("corrupt state file: {e}")))?
        } else {
            trimmed.to_string()
        };
        Ok(Self {
            today: Some(legacy),
            tomorrow: None,
        })
    }
}

/// Reader/writer for the memory file.
pub struct MemoryFile;

impl MemoryFile {
    /// Strict load: `Ok(None)` when the file does not exist.
    pub fn try_load(path: &Path) -> SvitloResult<Option<Memory>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Memory::parse(&contents).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Load memory, falling back to an empty baseline on any failure.
    pub fn load(path: &Path) -> Memory {
        match Self::try_load(path) {
            Ok(Some(memory)) => memory,
            Ok(None) => {
                tracing::info!("no state at {}, starting fresh", path.display());
                Memory::default()
            }
            Err(e) => {
                tracing::warn!(
                    "state at {} unusable ({e}), starting from an empty baseline",
                    path.display()
                );
                Memory::default()
            }
        }
    }

    /// Write memory atomically (temp file, then rename).
    pub fn save(path: &Path, memory: &Memory) -> SvitloResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = temp_path(path);
        std::fs::write(&tmp, serde_json::to_vec_pretty(memory)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "state.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
