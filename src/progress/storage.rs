//! Persistence for the progress aggregate
//!
//! The engine only needs load/save of a whole [`UserProgress`]. On disk it
//! is a single file:
//! ```text
//! {data-dir}/
//! └── progress.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use super::models::UserProgress;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Progress has not been loaded")]
    NotReady,

    #[error("Unknown level: {0}")]
    UnknownLevel(u8),
}

pub type Result<T> = std::result::Result<T, ProgressError>;

/// Durable home of one [`UserProgress`]
pub trait ProgressStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<UserProgress>>;

    fn save(&self, progress: &UserProgress) -> Result<()>;
}

/// Store backed by a pretty-printed JSON file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at `{data_dir}/progress.json`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("progress.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Where an unreadable document is moved by [`Self::quarantine`]
    pub fn corrupt_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    /// Move the current document aside so the next save cannot overwrite
    /// it. Returns the new location, or `None` when there was no file.
    pub fn quarantine(&self) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let target = self.corrupt_path();
        fs::rename(&self.path, &target)?;
        log::warn!(
            "Moved unreadable progress {} to {}",
            self.path.display(),
            target.display()
        );
        Ok(Some(target))
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self) -> Result<Option<UserProgress>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let progress: UserProgress = serde_json::from_str(&content)?;
        Ok(Some(progress))
    }

    /// Write to a temp file then rename, so a crash never leaves a
    /// half-written document behind
    fn save(&self, progress: &UserProgress) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(progress)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;

        log::debug!("Saved progress to {}", self.path.display());
        Ok(())
    }
}

/// In-process store holding the serialized document
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with a raw document, which may be invalid
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
        }
    }

    /// The last saved document
    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<Option<UserProgress>> {
        match self.document() {
            Some(document) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }

    fn save(&self, progress: &UserProgress) -> Result<()> {
        let document = serde_json::to_string(progress)?;
        *self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(document);
        Ok(())
    }
}
