//! Persistence adapters for the encrypted vault envelope.
//!
//! The engine never looks inside what it hands to storage: an adapter only
//! ever sees an `EncryptedVault` and must return it unmodified.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::errors::{Result, VaultError};
use crate::vault::EncryptedVault;

/// Where the engine persists and reloads the opaque blob.
pub trait StorageAdapter: Send + Sync {
    /// Persist `blob`, replacing whatever was stored before.
    fn save(&self, blob: &EncryptedVault) -> Result<()>;

    /// Load the stored blob, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<EncryptedVault>>;
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// Stores the envelope as a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl StorageAdapter for FileStorage {
    /// Write the envelope **atomically**: temp file in the same directory,
    /// then rename over the target, so readers never see a half-written
    /// file.
    fn save(&self, blob: &EncryptedVault) -> Result<()> {
        let json = blob.to_json()?;

        let parent = self.path.parent().unwrap_or(Path::new("."));
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        ));

        fs::write(&tmp_path, json.as_bytes())?;
        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), "encrypted vault written");
        Ok(())
    }

    fn load(&self) -> Result<Option<EncryptedVault>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let blob: EncryptedVault = serde_json::from_str(&contents).map_err(|e| {
            VaultError::Storage(format!("failed to parse {}: {e}", self.path.display()))
        })?;

        Ok(Some(blob))
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// Keeps the envelope in process memory.  Useful for tests and for
/// embedders that persist the blob themselves.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<EncryptedVault>>,
    saves: Mutex<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl StorageAdapter for MemoryStorage {
    fn save(&self, blob: &EncryptedVault) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| VaultError::Storage("memory storage poisoned".into()))?;
        *slot = Some(blob.clone());
        if let Ok(mut n) = self.saves.lock() {
            *n += 1;
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<EncryptedVault>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| VaultError::Storage("memory storage poisoned".into()))?;
        Ok(slot.clone())
    }
}
