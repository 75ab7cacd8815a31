//! Core type definitions for the Untappd SDK
//!
//! - **identifiers**: Newtype wrappers (`AccessToken`, `CacheKey`) and `QueryParams`
//! - **envelope**: The provider's `meta` + `response` wrapper

pub mod envelope;
pub mod identifiers;

pub use envelope::{Envelope, Meta};
pub use identifiers::{AccessToken, CacheKey, QueryParams};
