//! Transport layer for talking to the Untappd API
//!
//! This module provides the transport abstraction and the default
//! reqwest-backed implementation. The SDK only ever issues GET requests and
//! never sets headers of its own.

pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, UntappdError};
use crate::types::QueryParams;
use crate::utils::truncate_for_display;

/// Maximum number of body bytes quoted in decode errors
const MAX_BODY_IN_ERROR: usize = 512;

/// Raw response from a transport
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status; informational only, the envelope carries the real outcome
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Decode the body as JSON
    ///
    /// # Errors
    ///
    /// Returns `UntappdError::Decode` if the body is not valid JSON.
    pub fn json(&self) -> Result<Value> {
        decode_json(&self.body)
    }
}

/// Transport trait for issuing GET requests
///
/// Implement this to plug in a different HTTP stack or a test double.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Issue one GET to `url` with `params` appended to its query string
    ///
    /// # Arguments
    /// * `url` - Absolute URL, may already carry a query string
    /// * `params` - Extra query parameters; empty means none are added
    ///
    /// # Errors
    /// Returns `UntappdError::Transport` if the request cannot be completed.
    /// Non-2xx statuses are not errors.
    async fn get(&self, url: &str, params: &QueryParams) -> Result<TransportResponse>;
}

/// Decode a response body as JSON, keeping a truncated copy of the body on failure
///
/// # Errors
///
/// Returns `UntappdError::Decode` if the body is not valid JSON.
pub fn decode_json(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| {
        let text = String::from_utf8_lossy(body);
        UntappdError::decode(
            format!("Response is not valid JSON: {e}"),
            Some(truncate_for_display(&text, MAX_BODY_IN_ERROR)),
        )
    })
}

pub use http::ReqwestTransport;
