//! High-level Untappd client
//!
//! [`UntappdClient`] pairs one [`AuthSession`] with one [`QueryClient`] and
//! feeds the session's token into every query at call time, so a query made
//! after re-authorizing always carries the new token.
//!
//! ```no_run
//! use untappd_sdk::{CacheConfig, QueryParams, UntappdClient, UntappdConfig};
//!
//! # async fn example(code: &str) -> Result<(), untappd_sdk::UntappdError> {
//! let config = UntappdConfig::builder()
//!     .client_id("client-id")
//!     .client_secret("client-secret")
//!     .redirect_url("https://my-app.example/cb")
//!     .cache(CacheConfig::default())
//!     .build();
//!
//! let mut client = UntappdClient::new(config)?;
//! client.authorise_code(code).await?;
//!
//! let mut params = QueryParams::new();
//! params.insert("min_id".to_string(), "5".to_string());
//! let recent = client.query("checkin/recent", params).await?;
//! println!("{}", recent["meta"]["http_code"]);
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use std::sync::Arc;

use crate::auth::{AuthSession, AuthState, Credentials};
use crate::cache::{self, CacheBackend};
use crate::config::UntappdConfig;
use crate::error::{Result, UntappdError};
use crate::query::QueryClient;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{AccessToken, Envelope, QueryParams};

/// Builder for [`UntappdClient`]
#[derive(Debug, Default)]
pub struct UntappdClientBuilder {
    config: Option<UntappdConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    cache: Option<Arc<dyn CacheBackend>>,
}

impl UntappdClientBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration
    #[must_use]
    pub fn config(mut self, config: UntappdConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom transport instead of reqwest
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom cache backend; takes precedence over `config.cache`
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns `UntappdError::Transport` if the HTTP client cannot be built,
    /// or `UntappdError::Cache` if the configured cache cannot be set up.
    pub fn build(self) -> Result<UntappdClient> {
        let config = self.config.unwrap_or_default();

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => match config.timeout {
                Some(timeout) => Arc::new(ReqwestTransport::with_timeout(timeout)?),
                None => Arc::new(ReqwestTransport::new()),
            },
        };

        let cache = match (self.cache, &config.cache) {
            (Some(cache), _) => Some(cache),
            (None, Some(cache_config)) => Some(cache::from_config(cache_config)?),
            (None, None) => None,
        };

        let credentials = Credentials::new(
            config.client_id.clone(),
            config.client_secret.clone(),
            config.redirect_url.clone(),
        );
        let session = AuthSession::new(credentials, &config.endpoints, transport.clone());

        let mut queries = QueryClient::new(config.endpoints.api_base.clone(), transport);
        if let Some(cache) = cache {
            queries = queries.with_cache(cache);
        }

        Ok(UntappdClient { session, queries })
    }
}

/// Client for the Untappd API
#[derive(Debug, Clone)]
pub struct UntappdClient {
    session: AuthSession,
    queries: QueryClient,
}

impl UntappdClient {
    /// Create a client from configuration, using reqwest and the configured cache
    ///
    /// # Errors
    ///
    /// See [`UntappdClientBuilder::build`].
    pub fn new(config: UntappdConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a client configured from `UNTAPPD_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns `UntappdError::InvalidConfig` for malformed variables, or any
    /// error from [`UntappdClientBuilder::build`].
    pub fn from_env() -> Result<Self> {
        Self::new(UntappdConfig::from_env()?)
    }

    /// Create a builder for custom transports or caches
    #[must_use]
    pub fn builder() -> UntappdClientBuilder {
        UntappdClientBuilder::new()
    }

    /// The auth session
    #[must_use]
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Mutable access to the auth session
    pub fn session_mut(&mut self) -> &mut AuthSession {
        &mut self.session
    }

    /// The underlying query client
    #[must_use]
    pub fn query_client(&self) -> &QueryClient {
        &self.queries
    }

    /// See [`AuthSession::authenticate_url`]
    #[must_use]
    pub fn authenticate_url(&self) -> String {
        self.session.authenticate_url()
    }

    /// See [`AuthSession::authorize_url`]
    #[must_use]
    pub fn authorize_url(&self, code: &str) -> String {
        self.session.authorize_url(code)
    }

    /// See [`AuthSession::exchange_code_for_token`]
    ///
    /// # Errors
    ///
    /// `AuthRejected`, `Transport` or `Decode`; see the session method.
    pub async fn exchange_code_for_token(&mut self, url: &str) -> Result<AccessToken> {
        self.session.exchange_code_for_token(url).await
    }

    /// See [`AuthSession::authorise_code`]
    ///
    /// # Errors
    ///
    /// `AuthRejected`, `Transport` or `Decode`; see the session method.
    pub async fn authorise_code(&mut self, code: &str) -> Result<AccessToken> {
        self.session.authorise_code(code).await
    }

    /// See [`AuthSession::last_error`]
    #[must_use]
    pub fn last_error(&self) -> &str {
        self.session.last_error()
    }

    /// See [`AuthSession::access_token`]
    #[must_use]
    pub fn access_token(&self) -> &AccessToken {
        self.session.access_token()
    }

    /// See [`AuthSession::set_access_token`]
    pub fn set_access_token(&mut self, token: impl Into<AccessToken>) {
        self.session.set_access_token(token);
    }

    /// See [`AuthSession::state`]
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.session.state()
    }

    /// Query a resource with the session's current token
    ///
    /// Querying before authorization is allowed and sends an empty token;
    /// the provider's envelope will say so.
    ///
    /// # Errors
    ///
    /// `Transport` or `Decode`; see [`QueryClient::query`].
    pub async fn query(&self, method: &str, params: QueryParams) -> Result<Value> {
        if !self.session.is_authenticated() {
            tracing::debug!(method, "Querying without an access token");
        }
        self.queries
            .query(self.session.access_token(), method, params)
            .await
    }

    /// Query a resource and fail on a non-200 envelope
    ///
    /// # Errors
    ///
    /// As [`query`](Self::query), plus `Decode` if the body is not an
    /// envelope and `Api` carrying `meta.http_code` and `meta.error_detail`
    /// when the code is not 200. On success only `response` is returned.
    pub async fn query_checked(&self, method: &str, params: QueryParams) -> Result<Value> {
        let value = self.query(method, params).await?;
        let envelope = Envelope::from_value(&value)?;
        if envelope.is_success() {
            Ok(envelope.response)
        } else {
            Err(UntappdError::api(
                envelope.meta.http_code.unwrap_or_default(),
                envelope.meta.error_detail.unwrap_or_default(),
            ))
        }
    }
}
