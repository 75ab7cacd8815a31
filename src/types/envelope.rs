//! Untappd response envelope
//!
//! Every API payload arrives wrapped as
//! `{ "meta": { "http_code": .., "error_detail": .. }, "response": { .. } }`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, UntappdError};

/// Envelope `meta` block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// HTTP-like status reported by the provider, normalized to text.
    ///
    /// The provider sends either `200` or `"200"`.
    #[serde(default, deserialize_with = "deserialize_http_code")]
    pub http_code: Option<String>,

    /// Human readable failure detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,

    /// Machine readable failure category (e.g. `invalid_auth`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl Meta {
    /// Whether `http_code` is 200
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.http_code.as_deref().map(str::trim) == Some("200")
    }
}

/// Typed view over a decoded response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Status block
    pub meta: Meta,

    /// Payload, left untyped
    #[serde(default)]
    pub response: Value,
}

impl Envelope {
    /// Interpret a decoded JSON value as an envelope
    ///
    /// # Errors
    ///
    /// Returns `UntappdError::Decode` if the value has no `meta` object.
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::deserialize(value)
            .map_err(|e| UntappdError::decode(format!("Malformed envelope: {e}"), None))
    }

    /// Whether the provider reported success
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.meta.is_success()
    }

    /// `response.access_token`, if present and a string
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.response.get("access_token").and_then(Value::as_str)
    }
}

fn deserialize_http_code<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCode {
        Int(i64),
        Text(String),
    }

    Ok(Option::<RawCode>::deserialize(deserializer)?.map(|code| match code {
        RawCode::Int(n) => n.to_string(),
        RawCode::Text(s) => s,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_code_accepts_int_and_string() {
        let numeric = Envelope::from_value(&json!({"meta": {"http_code": 200}})).unwrap();
        let textual = Envelope::from_value(&json!({"meta": {"http_code": "200"}})).unwrap();
        assert!(numeric.is_success());
        assert!(textual.is_success());
        assert_eq!(numeric.meta.http_code.as_deref(), Some("200"));
    }

    #[test]
    fn test_rejection_envelope() {
        let envelope = Envelope::from_value(&json!({
            "meta": {"http_code": 400, "error_detail": "invalid_code", "error_type": "invalid_param"}
        }))
        .unwrap();
        assert!(!envelope.is_success());
        assert_eq!(envelope.meta.error_detail.as_deref(), Some("invalid_code"));
        assert!(envelope.access_token().is_none());
    }

    #[test]
    fn test_access_token_extraction() {
        let envelope = Envelope::from_value(&json!({
            "meta": {"http_code": 200},
            "response": {"access_token": "T"}
        }))
        .unwrap();
        assert_eq!(envelope.access_token(), Some("T"));
    }

    #[test]
    fn test_missing_meta_is_decode_error() {
        let err = Envelope::from_value(&json!({"response": {}})).unwrap_err();
        assert!(matches!(err, UntappdError::Decode { .. }));

        let err = Envelope::from_value(&json!(null)).unwrap_err();
        assert!(matches!(err, UntappdError::Decode { .. }));
    }
}
