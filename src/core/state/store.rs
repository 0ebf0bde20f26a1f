//! Checkpoint persistence
//!
//! The store is a single mutable record. Exactly one engine may use a given
//! location at a time; running two transfers against the same checkpoint file
//! is unsupported and not detected.

use crate::core::state::checkpoint::CheckpointState;
use crate::domain::{Result, SheetPipeError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Checkpoint storage trait
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Where the checkpoint lives, for log messages
    fn location(&self) -> String;

    /// Load the persisted state
    ///
    /// Returns the zero state when nothing was persisted yet or the stored
    /// record cannot be read or parsed. Corruption means "start fresh".
    async fn load(&self) -> CheckpointState;

    /// Persist the full state, replacing any previous version
    ///
    /// # Errors
    ///
    /// Returns `SheetPipeError::Checkpoint` if the state could not be written.
    async fn save(&self, state: &CheckpointState) -> Result<()>;
}

/// JSON file checkpoint store
///
/// Writes go to a sibling temporary file which is then renamed over the
/// checkpoint, so a crash mid-write leaves the previous record intact.
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    /// Create a store for the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Checkpoint file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "checkpoint".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> CheckpointState {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No checkpoint found, starting fresh");
                return CheckpointState::default();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Checkpoint unreadable, starting fresh"
                );
                return CheckpointState::default();
            }
        };

        match serde_json::from_str::<CheckpointState>(&contents) {
            Ok(state) => {
                tracing::info!(
                    path = %self.path.display(),
                    on_row = state.cursor_row,
                    committed_batches = state.committed_batches(),
                    "Loaded checkpoint"
                );
                state
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Checkpoint corrupt, starting fresh"
                );
                CheckpointState::default()
            }
        }
    }

    async fn save(&self, state: &CheckpointState) -> Result<()> {
        let body = serde_json::to_vec(state)?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, &body).await.map_err(|e| {
            SheetPipeError::Checkpoint(format!("Failed to write {}: {}", temp.display(), e))
        })?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            SheetPipeError::Checkpoint(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            on_row = state.cursor_row,
            "Checkpoint saved"
        );
        Ok(())
    }
}

/// In-memory checkpoint store
///
/// Used for dry runs, where progress must not be persisted, and in tests.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    state: Mutex<Option<CheckpointState>>,
    saves: Mutex<usize>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing state
    pub fn with_state(state: CheckpointState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            saves: Mutex::new(0),
        }
    }

    /// The last saved state, if any
    pub fn snapshot(&self) -> Option<CheckpointState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// How many times `save` was called
    pub fn save_count(&self) -> usize {
        *self
            .saves
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    async fn load(&self) -> CheckpointState {
        self.snapshot().unwrap_or_default()
    }

    async fn save(&self, state: &CheckpointState) -> Result<()> {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(state.clone());
        *self
            .saves
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;
        Ok(())
    }
}
