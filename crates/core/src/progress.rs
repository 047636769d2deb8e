//! Progress Store
//!
//! A flat `topic -> status` map kept in one pretty-printed JSON file. Every
//! update reads the whole file, changes one key and rewrites the whole file.
//! Writers inside this process are serialized; separate processes writing the
//! same file still race, and the last write wins.

use crate::error::ProgressError;
use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};
use tracing::info;

pub const COMPLETED: &str = "Completed";

pub type ProgressMap = BTreeMap<String, String>;

pub struct ProgressStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ProgressStore {
    /// Creates a store backed by the JSON file at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - The progress file. It and its parent directories are created
    ///   on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole map, creating an empty file first if none exists.
    pub async fn get_all(&self) -> Result<ProgressMap, ProgressError> {
        if let Some(progress) = self.read().await? {
            return Ok(progress);
        }
        let _guard = self.write_lock.lock().await;
        self.read_or_init().await
    }

    /// Marks `topic` as completed and returns the updated map as pretty JSON.
    pub async fn mark_completed(&self, topic: &str) -> Result<String, ProgressError> {
        let _guard = self.write_lock.lock().await;
        let mut progress = self.read_or_init().await?;
        progress.insert(topic.to_string(), COMPLETED.to_string());
        let text = self.write(&progress).await?;
        info!(%topic, topics = progress.len(), "Topic marked as completed");
        Ok(text)
    }

    async fn read(&self) -> Result<Option<ProgressMap>, ProgressError> {
        match fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Caller must hold `write_lock`.
    async fn read_or_init(&self) -> Result<ProgressMap, ProgressError> {
        if let Some(progress) = self.read().await? {
            return Ok(progress);
        }
        let empty = ProgressMap::new();
        self.write(&empty).await?;
        info!(path = %self.path.display(), "Created empty progress file");
        Ok(empty)
    }

    /// Writes through a sibling temp file and a rename, so readers never see
    /// a partially written file.
    async fn write(&self, progress: &ProgressMap) -> Result<String, ProgressError> {
        let text = serde_json::to_string_pretty(progress)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        fs::write(&tmp_path, &text).await?;
        fs::rename(&tmp_path, &self.path).await?;
        Ok(text)
    }
}
