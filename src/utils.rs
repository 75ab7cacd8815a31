//! Utility functions for the Untappd SDK
//!
//! URL assembly for the OAuth redirect URLs, plus UTF-8 safe truncation used
//! when embedding response bodies in error messages.

use std::fmt::Write;

/// Percent-encode a query value.
///
/// Preserves unreserved characters per RFC 3986.
///
/// # Example
/// ```
/// use untappd_sdk::utils::percent_encode;
///
/// assert_eq!(percent_encode("https://example.com/cb"), "https%3A%2F%2Fexample.com%2Fcb");
/// ```
#[must_use]
pub fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                // Writing to a String cannot fail
                let _ = write!(result, "%{byte:02X}");
            }
        }
    }
    result
}

/// Append `key=value` pairs to a base URL, in the given order.
///
/// # Example
/// ```
/// use untappd_sdk::utils::url_with_query;
///
/// let url = url_with_query("https://untappd.com/oauth/authenticate/", &[
///     ("client_id", "abc"),
///     ("response_type", "code"),
/// ]);
/// assert_eq!(url, "https://untappd.com/oauth/authenticate/?client_id=abc&response_type=code");
/// ```
#[must_use]
pub fn url_with_query(base: &str, pairs: &[(&str, &str)]) -> String {
    let query = pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

/// Safely truncate a string at a UTF-8 character boundary.
///
/// Returns a slice of at most `max_bytes` bytes.
#[inline]
#[must_use]
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    &s[..boundary]
}

/// Truncate a string for display, appending "..." if anything was cut.
#[must_use]
pub fn truncate_for_display(s: &str, max_bytes: usize) -> String {
    let truncated = safe_truncate(s, max_bytes);
    if truncated.len() < s.len() {
        format!("{truncated}...")
    } else {
        truncated.to_string()
    }
}
