//! JSON file persistence for availability records.
//!
//! The whole map is read at the start of a cycle and written back wholesale.
//! A missing or unreadable file is an empty map, never an error.

use namewatch_core::error::{NameWatchError, Result};
use namewatch_core::types::PersistedState;
use std::path::{Path, PathBuf};

/// File-backed store of identifier → first-seen-available timestamp.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted state.
    pub fn load(&self) -> PersistedState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No state file at {}, starting empty", self.path.display());
                return PersistedState::new();
            }
            Err(e) => {
                tracing::warn!("Cannot read state file {}: {e}", self.path.display());
                return PersistedState::new();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("State file {} is corrupt ({e}), starting empty", self.path.display());
            PersistedState::new()
        })
    }

    /// Save the state as pretty-printed JSON.
    ///
    /// The file is left untouched when its content would not change.
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        let mut content = serde_json::to_string_pretty(state)?;
        content.push('\n');

        if std::fs::read_to_string(&self.path).is_ok_and(|existing| existing == content) {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                NameWatchError::persistence(format!("create {}: {e}", parent.display()))
            })?;
        }
        std::fs::write(&self.path, content).map_err(|e| {
            NameWatchError::persistence(format!("write {}: {e}", self.path.display()))
        })?;
        tracing::debug!("Saved {} record(s) to {}", state.len(), self.path.display());
        Ok(())
    }
}
