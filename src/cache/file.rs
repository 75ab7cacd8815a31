//! On-disk cache backend
//!
//! Each entry lives in its own JSON file named after a hash of the key, so
//! arbitrary URLs map to safe file names. Writes go through a uniquely named
//! temporary file and an atomic rename, so concurrent writers and readers of
//! one key never observe a partial entry. Expired files are deleted when read.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::{CacheBackend, CacheError, Clock, SystemClock};
use crate::types::CacheKey;

/// Directory name used under the platform cache directory
const CACHE_DIR_NAME: &str = "untappd-sdk";

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    /// Unix timestamp after which the entry is stale
    expires_at: u64,
    value: String,
}

/// Cache that persists entries as files in a directory
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    prefix: String,
    clock: Arc<dyn Clock>,
}

impl FileCache {
    /// Create a cache rooted at `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: String::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Platform-specific default location (e.g. `~/.cache/untappd-sdk` on Linux)
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join(CACHE_DIR_NAME))
    }

    /// Prefix every entry file name
    ///
    /// Characters other than ASCII alphanumerics, `-`, `_` and `.` are
    /// replaced with `_`, so the prefix can never leave the cache directory.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix
            .into()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self
    }

    /// Use a custom time source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Directory holding the entry files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        let name = format!("{}{}.json", self.prefix, URL_SAFE_NO_PAD.encode(digest));
        self.dir.join(name)
    }

    async fn load_live(&self, key: &CacheKey) -> Result<Option<StoredEntry>, CacheError> {
        let path = self.entry_path(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: StoredEntry = serde_json::from_str(&content)?;
        if entry.key != key.as_str() {
            return Ok(None);
        }
        if self.clock.now_secs() >= entry.expires_at {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(key = %key, "Removed expired cache file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(key = %key, error = %e, "Could not remove expired cache file"),
            }
            return Ok(None);
        }
        Ok(Some(entry))
    }
}

#[async_trait]
impl CacheBackend for FileCache {
    async fn has(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.load_live(key).await?.is_some())
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        Ok(self.load_live(key).await?.map(|entry| entry.value))
    }

    async fn put(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let entry = StoredEntry {
            key: key.to_string(),
            expires_at: self.clock.now_secs().saturating_add(ttl.as_secs()),
            value: value.to_string(),
        };
        let content = serde_json::to_string(&entry)?;
        let dir = self.dir.clone();
        let path = self.entry_path(key);

        // NamedTempFile is created with 0600 permissions on unix
        tokio::task::spawn_blocking(move || -> Result<(), CacheError> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(content.as_bytes())?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| CacheError::Backend(format!("cache write task failed: {e}")))?
    }
}
