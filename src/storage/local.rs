//! Local filesystem storage implementation.
//!
//! Every write goes to a temporary sibling first and is renamed into place,
//! so readers never observe a half-written state file or plan.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CategoryGroup, SyncState};
use crate::storage::TrackerStorage;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    state_file: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, state_file: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            state_file: state_file.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Full path of the state file.
    pub fn state_path(&self) -> PathBuf {
        self.path(&self.state_file)
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.flush().await?;
            drop(file);
            tokio::fs::rename(&tmp, &path).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::Io(e));
        }
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TrackerStorage for LocalStorage {
    async fn load_state(&self) -> Result<SyncState> {
        let display = self.state_path().display().to_string();

        match self.read_json::<SyncState>(&self.state_file).await {
            Ok(Some(mut state)) => {
                let filled = state.backfill();
                if filled > 0 {
                    log::info!("Back-filled output paths for {} tracked files", filled);
                }
                log::info!("Loaded state for {} tracked files from {}", state.len(), display);
                Ok(state)
            }
            Ok(None) => {
                log::info!("No state file at {}, starting fresh", display);
                Ok(SyncState::default())
            }
            Err(e) => {
                log::warn!(
                    "State file {} is unreadable; refusing to start from an empty state",
                    display
                );
                Err(AppError::persistence(display, e))
            }
        }
    }

    async fn save_state(&self, state: &SyncState) -> Result<()> {
        self.write_json(&self.state_file, state)
            .await
            .map_err(|e| AppError::persistence(self.state_path().display().to_string(), e))?;
        log::debug!("State saved ({} entries)", state.len());
        Ok(())
    }

    async fn write_output(&self, name: &str, groups: &[CategoryGroup]) -> Result<()> {
        self.write_json(name, groups).await
    }

    async fn load_output(&self, name: &str) -> Result<Option<Vec<CategoryGroup>>> {
        self.read_json(name).await
    }

    async fn output_exists(&self, name: &str) -> bool {
        tokio::fs::try_exists(self.path(name)).await.unwrap_or(false)
    }

    async fn remove_output(&self, name: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
