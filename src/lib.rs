//! # Untappd SDK for Rust
//!
//! Client library for the [Untappd](https://untappd.com) check-in API.
//! Async/await, strong typing, tokio-based.
//!
//! ## Quick Start
//!
//! ```no_run
//! use untappd_sdk::{QueryParams, UntappdClient, UntappdConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UntappdConfig::builder()
//!         .client_id("client-id")
//!         .client_secret("client-secret")
//!         .redirect_url("https://my-app.example/callback")
//!         .build();
//!     let mut client = UntappdClient::new(config)?;
//!
//!     // 1. Send the user here
//!     println!("Log in at: {}", client.authenticate_url());
//!
//!     // 2. Untappd redirects back with ?code=...
//!     let code = "code-from-redirect";
//!     let url = client.authorize_url(code);
//!     client.exchange_code_for_token(&url).await?;
//!
//!     // 3. Query resources with the session's token
//!     let info = client.query("user/info", QueryParams::new()).await?;
//!     println!("{}", info["response"]["user"]["user_name"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Core Features
//!
//! ### 1. OAuth code-grant flow with [`auth::AuthSession`]
//!
//! URL builders are pure; the exchange issues exactly one request and either
//! stores the token or records the provider's rejection detail.
//!
//! ### 2. Cached queries with [`query::QueryClient`]
//!
//! Enable caching through [`CacheConfig`] (memory or file backend) or pass
//! any [`cache::CacheBackend`] to the builder. Responses are kept for one
//! hour, keyed by URL plus `min_id`.
//!
//! ## Architecture
//!
//! - [`client`]: [`UntappdClient`], the facade most applications use
//! - [`auth`]: OAuth session and URL builders
//! - [`query`]: resource queries and cache-key derivation
//! - [`cache`]: cache backend trait and the memory/file backends
//! - [`transport`]: HTTP transport trait and the reqwest implementation
//! - [`config`]: configuration, builder and environment loading
//! - [`types`]: newtypes and the response envelope
//! - [`error`]: error types and handling
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for structured logging.
//! Tracing events are always emitted but are zero-cost when no subscriber is attached.
//! Access tokens and client secrets are never logged.
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, UntappdError>`](Result):
//!
//! ```no_run
//! # use untappd_sdk::{UntappdClient, UntappdError};
//! # async fn example(client: &mut UntappdClient, url: &str) {
//! match client.exchange_code_for_token(url).await {
//!     Ok(_) => {}
//!     Err(UntappdError::AuthRejected { detail }) => eprintln!("Rejected: {detail}"),
//!     Err(e) if e.is_retryable() => eprintln!("Network trouble, try again: {e}"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use auth::{AuthSession, AuthState, Credentials};
pub use cache::{CacheBackend, CacheError, FileCache, MemoryCache};
pub use client::{UntappdClient, UntappdClientBuilder};
pub use config::{CacheConfig, CacheDriver, Endpoints, UntappdConfig};
pub use error::{Result, UntappdError};
pub use query::QueryClient;
pub use transport::{HttpTransport, ReqwestTransport, TransportResponse};
pub use types::{AccessToken, CacheKey, Envelope, Meta, QueryParams};

/// Version of the SDK
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
