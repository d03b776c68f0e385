//! File storage: the identity map plus the JSON artifact behind it.
//!
//! Rules:
//!   - `save` rewrites the whole file: write `<path>.tmp`, fsync, rename
//!   - a missing file on `reload` is an empty store, not an error
//!   - a corrupt file or unknown kind on `reload` is an error, and the
//!     in-memory map is left as it was

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use hbnb_engine::{IdentityMap, KindRegistry};

use crate::error::StorageError;
use crate::storage_codec::{encode_storage, restore_storage};

/// Default artifact name, relative to the working directory.
pub const DEFAULT_STORAGE_PATH: &str = "file.json";

/// Owns the identity map and the file it is persisted to.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    map: IdentityMap,
}

impl FileStorage {
    /// An empty store bound to `path`. Nothing is read.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            map: IdentityMap::new(),
        }
    }

    /// Bind to `path` and load whatever is already there.
    pub fn open(path: impl Into<PathBuf>, registry: &KindRegistry) -> Result<Self, StorageError> {
        let mut storage = Self::new(path);
        storage.reload(registry)?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn map(&self) -> &IdentityMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut IdentityMap {
        &mut self.map
    }

    /// Serialize the full map and atomically replace the artifact.
    pub fn save(&self) -> Result<(), StorageError> {
        let json = encode_storage(&self.map)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StorageError::io(parent))?;
        }

        let tmp = self.temp_path();
        if let Err(err) = write_synced(&tmp, json.as_bytes()) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        fs::rename(&tmp, &self.path).map_err(StorageError::io(&self.path))?;

        debug!(
            path = %self.path.display(),
            records = self.map.len(),
            bytes = json.len(),
            "storage saved"
        );
        Ok(())
    }

    /// Load the artifact into the map, keeping records already present
    /// unless the file holds the same key. Returns the number loaded.
    pub fn reload(&mut self, registry: &KindRegistry) -> Result<usize, StorageError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no storage file, starting empty");
            return Ok(0);
        }

        let content = fs::read_to_string(&self.path).map_err(StorageError::io(&self.path))?;
        let loaded = restore_storage(&content, registry, &mut self.map)?;
        debug!(path = %self.path.display(), records = loaded, "storage reloaded");
        Ok(loaded)
    }

    /// SHA-256 of the artifact bytes, lowercase hex. `None` if absent.
    pub fn fingerprint(&self) -> Result<Option<String>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path).map_err(StorageError::io(&self.path))?;
        let digest = Sha256::digest(&bytes);
        Ok(Some(digest.iter().map(|b| format!("{:02x}", b)).collect()))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let mut file = File::create(path).map_err(StorageError::io(path))?;
    file.write_all(bytes).map_err(StorageError::io(path))?;
    file.sync_all().map_err(StorageError::io(path))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
