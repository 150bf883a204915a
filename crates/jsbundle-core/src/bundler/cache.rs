//! Per-file build cache.
//!
//! Compiled modules are keyed by path and reused while the file's
//! modification time is unchanged. The cache can be persisted as JSON
//! between runs.

use crate::error::Error;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};

/// File name of the persisted cache inside the cache directory.
pub const CACHE_FILE_NAME: &str = "cache.json";

/// A compiled module as of a given modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFile {
    pub code: String,
    pub imports: Vec<String>,
    pub modified: SystemTime,
}

/// Compiled modules by path.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FileCache {
    files: HashMap<String, CachedFile>,
}

impl FileCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached module for `path`, if it was built from the same
    /// modification time.
    #[must_use]
    pub fn get(&self, path: &str, modified: SystemTime) -> Option<&CachedFile> {
        self.files.get(path).filter(|file| file.modified == modified)
    }

    pub fn insert(&mut self, path: String, file: CachedFile) {
        self.files.insert(path, file);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Load a persisted cache from `dir`.
    ///
    /// A missing cache starts empty. A corrupt one is discarded with a
    /// warning.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CACHE_FILE_NAME);
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::new();
        };
        match serde_json::from_str::<Self>(&contents) {
            Ok(cache) => {
                debug!(path = %path.display(), files = cache.len(), "loaded file cache");
                cache
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache file is corrupted, ignoring it");
                Self::new()
            }
        }
    }

    /// Persist the cache to `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<(), Error> {
        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string(self).map_err(|e| Error::other(e.to_string()))?;
        std::fs::write(dir.join(CACHE_FILE_NAME), json)?;
        Ok(())
    }
}
