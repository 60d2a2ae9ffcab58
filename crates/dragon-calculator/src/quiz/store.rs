//! Progress persistence
//!
//! One JSON record under one key. Reads fall back to a fresh record and
//! writes are best effort; both log failures instead of returning them.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::quiz::GameProgress;

/// Key of the saved progress record
pub const STORAGE_KEY: &str = "dragonMathProgress";

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from reading or writing the progress record
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Record could not be encoded or decoded
    #[error("Malformed progress record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing storage is missing or refused the operation
    #[error("Storage unavailable: {message}")]
    Unavailable {
        /// Error message
        message: String,
    },
}

impl StoreError {
    /// Create an unavailable-storage error
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Load/save of the single progress record
pub trait ProgressStore {
    /// Reads the record; `Ok(None)` when nothing has been saved
    fn try_load(&self) -> StoreResult<Option<GameProgress>>;

    /// Overwrites the record
    fn try_save(&mut self, progress: &GameProgress) -> StoreResult<()>;

    /// Reads the record, or a fresh one if it is absent or unreadable
    fn load(&self) -> GameProgress {
        match self.try_load() {
            Ok(Some(progress)) => progress,
            Ok(None) => GameProgress::default(),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable progress record");
                GameProgress::default()
            }
        }
    }

    /// Best-effort write; failures are logged and dropped
    fn save(&mut self, progress: &GameProgress) {
        if let Err(err) = self.try_save(progress) {
            tracing::warn!(error = %err, "failed to save progress");
        }
    }
}

impl<S: ProgressStore + ?Sized> ProgressStore for Box<S> {
    fn try_load(&self) -> StoreResult<Option<GameProgress>> {
        (**self).try_load()
    }

    fn try_save(&mut self, progress: &GameProgress) -> StoreResult<()> {
        (**self).try_save(progress)
    }
}

fn decode(raw: &str) -> StoreResult<GameProgress> {
    let progress: GameProgress = serde_json::from_str(raw)?;
    Ok(progress.normalized())
}

fn encode(progress: &GameProgress) -> StoreResult<String> {
    Ok(serde_json::to_string(progress)?)
}

/// In-memory key-value store standing in for browser storage
#[derive(Debug, Clone)]
pub struct MemoryStore {
    key: String,
    entries: HashMap<String, String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store using the default key
    #[must_use]
    pub fn new() -> Self {
        Self::with_key(STORAGE_KEY)
    }

    /// Empty store using a custom key
    #[must_use]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: HashMap::new(),
        }
    }

    /// Raw stored text for the progress key
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.entries.get(&self.key).map(String::as_str)
    }

    /// Stores raw text under the progress key
    pub fn set_raw(&mut self, value: impl Into<String>) {
        self.entries.insert(self.key.clone(), value.into());
    }
}

impl ProgressStore for MemoryStore {
    fn try_load(&self) -> StoreResult<Option<GameProgress>> {
        self.raw().map(decode).transpose()
    }

    fn try_save(&mut self, progress: &GameProgress) -> StoreResult<()> {
        let json = encode(progress)?;
        self.set_raw(json);
        Ok(())
    }
}

/// JSON file on the local filesystem
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by the file at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/<key>.json`
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>, key: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{key}.json")))
    }

    /// Backing file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for FileStore {
    fn try_load(&self) -> StoreResult<Option<GameProgress>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn try_save(&mut self, progress: &GameProgress) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = encode(progress)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "progress saved");
        Ok(())
    }
}
