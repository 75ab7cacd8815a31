//! Client configuration
//!
//! Everything the client needs at construction: OAuth credentials, endpoint
//! URLs and the optional response cache. Configuration can be assembled with
//! the builder, deserialized with serde, or read from the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use typed_builder::TypedBuilder;

use crate::error::{Result, UntappdError};

/// Default API base; resource paths are appended verbatim
pub const DEFAULT_API_BASE: &str = "https://api.untappd.com/v4/";
/// Default end-user authentication page
pub const DEFAULT_AUTHENTICATE_URL: &str = "https://untappd.com/oauth/authenticate/";
/// Default code exchange endpoint
pub const DEFAULT_AUTHORIZE_URL: &str = "https://untappd.com/oauth/authorize/";

// ============================================================================
// Endpoints
// ============================================================================

/// Provider endpoint URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Base URL for resource queries
    pub api_base: String,
    /// Where end users are sent to log in
    pub authenticate_url: String,
    /// Where authorization codes are exchanged for tokens
    pub authorize_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            authenticate_url: DEFAULT_AUTHENTICATE_URL.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point all three endpoints at one host, keeping the default paths.
    ///
    /// Handy for staging proxies and mock servers.
    #[must_use]
    pub fn with_host(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            api_base: format!("{host}/v4/"),
            authenticate_url: format!("{host}/oauth/authenticate/"),
            authorize_url: format!("{host}/oauth/authorize/"),
        }
    }
}

// ============================================================================
// Cache Configuration
// ============================================================================

/// Which built-in cache backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheDriver {
    /// In-process `HashMap`
    #[default]
    Memory,
    /// JSON files in a directory
    File,
}

impl FromStr for CacheDriver {
    type Err = UntappdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "array" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(UntappdError::invalid_config(format!(
                "unknown cache driver '{other}' (expected 'memory' or 'file')"
            ))),
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend to construct
    pub driver: CacheDriver,
    /// Storage directory for the file driver; platform cache dir when unset
    pub path: Option<PathBuf>,
    /// Prefix applied to every stored key
    pub prefix: String,
    /// Entry cap for the memory driver; `0` selects the default of 1000
    pub max_entries: usize,
}

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration accepted by [`UntappdClient`](crate::UntappdClient)
///
/// Absent fields default to empty strings and caching disabled.
///
/// ```
/// use untappd_sdk::{CacheConfig, UntappdConfig};
///
/// let config = UntappdConfig::builder()
///     .client_id("my-client-id")
///     .client_secret("my-secret")
///     .redirect_url("https://my-app.example/callback")
///     .cache(CacheConfig::default())
///     .build();
/// assert!(config.cache.is_some());
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for UntappdConfig"),
    builder_type(doc = "Builder for UntappdConfig", vis = "pub")
)]
#[serde(default)]
pub struct UntappdConfig {
    /// OAuth client ID
    #[builder(default, setter(into))]
    pub client_id: String,

    /// OAuth client secret
    #[builder(default, setter(into))]
    pub client_secret: String,

    /// Redirect URL registered with the provider
    #[builder(default, setter(into))]
    pub redirect_url: String,

    /// Provider endpoints
    #[builder(default)]
    pub endpoints: Endpoints,

    /// Per-request timeout; transport default when unset
    #[builder(default, setter(strip_option))]
    #[serde(with = "optional_secs", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    /// Response cache; disabled when unset
    #[builder(default, setter(strip_option))]
    pub cache: Option<CacheConfig>,
}

impl std::fmt::Debug for UntappdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UntappdConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .field("cache", &self.cache)
            .finish()
    }
}

impl UntappdConfig {
    /// Read configuration from `UNTAPPD_*` environment variables
    ///
    /// Recognized: `UNTAPPD_CLIENT_ID`, `UNTAPPD_CLIENT_SECRET`,
    /// `UNTAPPD_REDIRECT_URL`, `UNTAPPD_API_BASE`, `UNTAPPD_TIMEOUT_SECS`,
    /// `UNTAPPD_CACHE_DRIVER`, `UNTAPPD_CACHE_PATH`, `UNTAPPD_CACHE_PREFIX`,
    /// `UNTAPPD_CACHE_MAX_ENTRIES`.
    /// Caching is enabled iff `UNTAPPD_CACHE_DRIVER` is set.
    ///
    /// # Errors
    ///
    /// Returns `UntappdError::InvalidConfig` for an unknown cache driver or a
    /// non-numeric timeout or entry cap.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self {
            client_id: lookup("UNTAPPD_CLIENT_ID").unwrap_or_default(),
            client_secret: lookup("UNTAPPD_CLIENT_SECRET").unwrap_or_default(),
            redirect_url: lookup("UNTAPPD_REDIRECT_URL").unwrap_or_default(),
            ..Self::default()
        };

        if let Some(api_base) = lookup("UNTAPPD_API_BASE") {
            config.endpoints.api_base = api_base;
        }

        if let Some(secs) = lookup("UNTAPPD_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                UntappdError::invalid_config(format!("UNTAPPD_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        if let Some(driver) = lookup("UNTAPPD_CACHE_DRIVER") {
            let max_entries = match lookup("UNTAPPD_CACHE_MAX_ENTRIES") {
                Some(max) => max.trim().parse().map_err(|_| {
                    UntappdError::invalid_config(format!(
                        "UNTAPPD_CACHE_MAX_ENTRIES is not a number: {max}"
                    ))
                })?,
                None => 0,
            };
            config.cache = Some(CacheConfig {
                driver: driver.parse()?,
                path: lookup("UNTAPPD_CACHE_PATH").map(PathBuf::from),
                prefix: lookup("UNTAPPD_CACHE_PREFIX").unwrap_or_default(),
                max_entries,
            });
        }

        Ok(config)
    }
}

mod optional_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_u64(d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}
