//! Response cache backends
//!
//! The query layer consults a [`CacheBackend`] before going to the network and
//! writes fresh responses back with a fixed TTL. Two backends ship with the
//! crate:
//!
//! - [`MemoryCache`]: process-local, lost on exit
//! - [`FileCache`]: one JSON file per entry, survives restarts
//!
//! Any other store (Redis, memcached, ...) can be plugged in by implementing
//! the trait.
//!
//! The query layer never deletes entries; they stop being reported once
//! `written_at + ttl` has passed and the backends reclaim them on access.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::config::{CacheConfig, CacheDriver};
use crate::types::CacheKey;

pub use file::FileCache;
pub use memory::MemoryCache;

/// TTL applied to every cached API response
pub const RESPONSE_TTL: Duration = Duration::from_secs(60 * 60);

/// Errors raised by cache backends
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error in a storage backend
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored entry could not be (de)serialized
    #[error("Cache entry JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend-specific failure
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Storage for serialized API responses
#[async_trait]
pub trait CacheBackend: Send + Sync + std::fmt::Debug {
    /// Whether a live (unexpired) entry exists for `key`
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    async fn has(&self, key: &CacheKey) -> Result<bool, CacheError>;

    /// Read a live entry; `None` if absent or expired
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, live for `ttl` from now
    ///
    /// A `ttl` too large to represent keeps the entry live indefinitely.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    async fn put(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

// ============================================================================
// Clock
// ============================================================================

/// Time source for expiry checks
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current wall-clock time
    fn now(&self) -> SystemTime;

    /// Current time as whole seconds since the Unix epoch
    fn now_secs(&self) -> u64 {
        self.now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }
}

/// The real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to
///
/// Starts at the system time it was created with; useful for exercising
/// expiry without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    start: SystemTime,
    offset_secs: AtomicU64,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a clock frozen at the current system time
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: SystemTime::now(),
            offset_secs: AtomicU64::new(0),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.offset_secs.fetch_add(by.as_secs(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.start + Duration::from_secs(self.offset_secs.load(Ordering::SeqCst))
    }
}

/// Build the backend selected by `config`
///
/// # Errors
///
/// Returns an error if the file cache directory cannot be resolved.
pub fn from_config(config: &CacheConfig) -> Result<Arc<dyn CacheBackend>, CacheError> {
    let backend: Arc<dyn CacheBackend> = match config.driver {
        CacheDriver::Memory => Arc::new(
            MemoryCache::with_capacity(config.max_entries).with_prefix(config.prefix.clone()),
        ),
        CacheDriver::File => {
            let dir = match &config.path {
                Some(path) => path.clone(),
                None => FileCache::default_dir().ok_or_else(|| {
                    CacheError::Backend("no platform cache directory available".to_string())
                })?,
            };
            Arc::new(FileCache::new(dir).with_prefix(config.prefix.clone()))
        }
    };
    tracing::debug!(driver = ?config.driver, prefix = %config.prefix, "Response cache enabled");
    Ok(backend)
}
