//! Error types for the Untappd SDK

use thiserror::Error;

use crate::cache::CacheError;

/// Main error type for the Untappd SDK
///
/// Provider rejections, transport failures and undecodable bodies are kept
/// apart so callers can tell "the provider said no" from "we couldn't reach
/// the provider".
#[derive(Error, Debug)]
pub enum UntappdError {
    /// The provider answered with a non-200 envelope during code exchange
    #[error("Authorization rejected by provider: {detail}")]
    AuthRejected {
        /// `meta.error_detail` from the envelope
        detail: String,
    },

    /// A query came back with a non-200 envelope (only from checked queries)
    #[error("API error (http_code {http_code}): {detail}")]
    Api {
        /// `meta.http_code` as sent by the provider
        http_code: String,
        /// `meta.error_detail`, empty if absent
        detail: String,
    },

    /// Network-level failure reaching the provider (DNS, TLS, connect, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was not valid JSON or lacked a required field
    #[error("Decode error: {message}")]
    Decode {
        /// What went wrong
        message: String,
        /// Truncated raw body for diagnostics
        body: Option<String>,
    },

    /// Cache backend failure (only surfaced when a backend is used directly)
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for Untappd SDK operations
pub type Result<T> = std::result::Result<T, UntappdError>;

impl UntappdError {
    /// Create a provider rejection error
    pub fn auth_rejected(detail: impl Into<String>) -> Self {
        Self::AuthRejected {
            detail: detail.into(),
        }
    }

    /// Create an API error from envelope fields
    pub fn api(http_code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Api {
            http_code: http_code.into(),
            detail: detail.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error with optional raw body
    pub fn decode(msg: impl Into<String>, body: Option<String>) -> Self {
        Self::Decode {
            message: msg.into(),
            body,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether retrying the same call might succeed.
    ///
    /// Only transport failures qualify; a rejection or a malformed body will
    /// come back the same way.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Provider rejection detail, if this is an [`UntappdError::AuthRejected`]
    #[must_use]
    pub fn rejection_detail(&self) -> Option<&str> {
        match self {
            Self::AuthRejected { detail } => Some(detail),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UntappdError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
