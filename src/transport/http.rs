//! reqwest-backed [`HttpTransport`]

use async_trait::async_trait;
use std::time::Duration;

use super::{HttpTransport, TransportResponse};
use crate::error::Result;
use crate::types::QueryParams;

/// Default transport built on a pooled `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with reqwest's defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns `UntappdError::Transport` if the client cannot be built
    /// (e.g. the TLS backend fails to initialize).
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing)
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, params: &QueryParams) -> Result<TransportResponse> {
        let mut request = self.client.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        tracing::trace!(status, bytes = body.len(), "Received response");

        Ok(TransportResponse { status, body })
    }
}
