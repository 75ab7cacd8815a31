//! Authenticated, optionally cached resource queries
//!
//! [`QueryClient::query`] returns the provider's envelope verbatim. It never
//! looks at `meta.http_code`; use [`Envelope::from_value`](crate::types::Envelope::from_value)
//! if you want a typed view.
//!
//! # Cache identity
//!
//! A response is cached under its request URL, plus `&min_id=<value>` when the
//! call carries a `min_id` parameter. No other parameter, including the access
//! token, takes part in the key: two calls to the same resource that differ
//! only in, say, `limit` share one cache slot.

use serde_json::Value;
use std::sync::Arc;

use crate::cache::{CacheBackend, RESPONSE_TTL};
use crate::error::Result;
use crate::transport::HttpTransport;
use crate::types::{AccessToken, CacheKey, QueryParams};

/// Parameter that distinguishes pages of a list resource
pub const MIN_ID_PARAM: &str = "min_id";

/// Parameter carrying the access token on the wire
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Derive the cache key for a request
///
/// # Example
/// ```
/// use untappd_sdk::query::cache_key;
/// use untappd_sdk::types::QueryParams;
///
/// let mut params = QueryParams::new();
/// params.insert("min_id".to_string(), "5".to_string());
/// params.insert("limit".to_string(), "25".to_string());
///
/// let key = cache_key("https://api.untappd.com/v4/checkin/recent", &params);
/// assert_eq!(key.as_str(), "https://api.untappd.com/v4/checkin/recent&min_id=5");
/// ```
#[must_use]
pub fn cache_key(url: &str, params: &QueryParams) -> CacheKey {
    match params.get(MIN_ID_PARAM) {
        Some(min_id) => CacheKey::new(format!("{url}&{MIN_ID_PARAM}={min_id}")),
        None => CacheKey::new(url),
    }
}

/// Issues GETs against the API base, consulting a cache first when configured
#[derive(Debug, Clone)]
pub struct QueryClient {
    api_base: String,
    transport: Arc<dyn HttpTransport>,
    cache: Option<Arc<dyn CacheBackend>>,
}

impl QueryClient {
    /// Create an uncached client
    #[must_use]
    pub fn new(api_base: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            api_base: api_base.into(),
            transport,
            cache: None,
        }
    }

    /// Enable response caching
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Base URL resource paths are appended to
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Whether a cache is configured
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Fetch `method` (e.g. `"user/info"`) with `params`
    ///
    /// A live cache entry is returned without touching the network; nothing,
    /// not even the token, is sent in that case. Otherwise `token` is merged
    /// into the parameters (replacing any caller-supplied `access_token`), the
    /// decoded body is written back to the cache for an hour, and returned.
    ///
    /// Cache failures never fail the call: a broken read falls through to
    /// the network and a failed write is logged and skipped.
    ///
    /// # Errors
    ///
    /// - `UntappdError::Transport` if the API cannot be reached
    /// - `UntappdError::Decode` if the body is not JSON
    pub async fn query(
        &self,
        token: &AccessToken,
        method: &str,
        mut params: QueryParams,
    ) -> Result<Value> {
        let url = format!("{}{method}", self.api_base);
        let key = cache_key(&url, &params);

        if let Some(cached) = self.read_cache(&key).await {
            return Ok(cached);
        }

        params.insert(ACCESS_TOKEN_PARAM.to_string(), token.as_str().to_string());

        tracing::debug!(url = %url, "Querying API");
        let value = self.transport.get(&url, &params).await?.json()?;

        self.write_cache(&key, &value).await;
        Ok(value)
    }

    async fn read_cache(&self, key: &CacheKey) -> Option<Value> {
        let cache = self.cache.as_ref()?;

        let stored = match cache.has(key).await {
            Ok(true) => cache.get(key).await,
            Ok(false) => Ok(None),
            Err(e) => Err(e),
        };

        match stored {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => {
                    tracing::debug!(key = %key, "Cache hit");
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Cached entry is not valid JSON, refetching");
                    None
                }
            },
            Ok(None) => {
                tracing::debug!(key = %key, "Cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, falling back to network");
                None
            }
        }
    }

    async fn write_cache(&self, key: &CacheKey, value: &Value) {
        let Some(cache) = &self.cache else {
            return;
        };

        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Could not serialize response for cache");
                return;
            }
        };

        if let Err(e) = cache.put(key, &text, RESPONSE_TTL).await {
            tracing::warn!(key = %key, error = %e, "Cache write failed, continuing uncached");
        }
    }
}
