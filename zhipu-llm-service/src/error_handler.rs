//! Unified error handling for `zhipu-llm-service`.
//!
//! This module exposes a single top-level error type [`GlmServiceError`] for
//! the whole library, and groups domain-specific errors in nested enums
//! ([`ConfigError`], [`CredentialError`]). Small helpers for reading and
//! validating environment variables return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[GLM Service]` to simplify attribution in
//! logs. Every failure surfaces immediately to the caller; nothing is retried
//! or swallowed inside the library.

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, GlmServiceError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `zhipu-llm-service` crate.
///
/// The invoke-path variants mirror the order of the response validation
/// ladder: transport, HTTP status, JSON decode, payload shape, remote
/// application code, missing content.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GlmServiceError {
    /// Configuration/validation errors (startup/readiness).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// API-key errors (missing or malformed credential).
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[GLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Upstream returned an HTTP status other than 200.
    #[error("[GLM Service] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the raw response body (trimmed).
        snippet: String,
    },

    /// Response body could not be parsed as JSON.
    #[error("[GLM Service] failed to decode response body as JSON: {snippet}")]
    Decode {
        /// Short snippet of the raw response body (trimmed).
        snippet: String,
    },

    /// Response body parsed, but is not a JSON object.
    #[error("[GLM Service] unexpected response payload: not a JSON object")]
    UnexpectedPayload,

    /// The service reported an application-level failure in the envelope.
    #[error("[GLM Service] remote service failed with code {code}: {msg}")]
    Remote {
        /// The envelope `code` field (0 when absent).
        code: i64,
        /// The envelope `msg` field (empty when absent).
        msg: String,
    },

    /// Well-formed envelope without the expected generated content.
    #[error("[GLM Service] response envelope is missing generated content")]
    MissingContent,
}

/* ------------------------------------------------------------------------- */
/* Credential errors                                                         */
/* ------------------------------------------------------------------------- */

/// Error enum for the `ZHIPUAI_API_KEY` credential.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The API key environment variable is absent or empty.
    #[error("[GLM Service] ZHIPUAI_API_KEY is not set or empty")]
    Missing,

    /// The API key does not split into `<id>.<secret>`.
    #[error("[GLM Service] malformed API key: expected \"<id>.<secret>\"")]
    Malformed,
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
///
/// Keep this focused: only errors that realistically happen at config
/// load/validation time.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[GLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like token limits or sampling parameters).
    #[error("[GLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `GLM_MAX_TOKENS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[GLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `ZHIPUAI_ENDPOINT_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[GLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range (e.g., `expected 0.0..=1.0`).
        detail: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty environment variable.
///
/// # Errors
/// Returns [`ConfigError::MissingVar`] if the variable is absent or empty.
pub fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Parses an optional `u32` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but not a
/// valid `u32`.
pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.parse::<u32>().map(Some).map_err(|_| {
            GlmServiceError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        _ => Ok(None),
    }
}

/// Parses an optional `f32` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but not a
/// valid `f32`.
pub fn env_opt_f32(name: &'static str) -> Result<Option<f32>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.parse::<f32>().map(Some).map_err(|_| {
            GlmServiceError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected f32",
            })
        }),
        _ => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers (return unified `Result<T>`)                           */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] when the string does not start with
/// a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// Useful for parameters like `temperature` (`0.0..=10.0` for ChatGLM) or
/// `top_p` (`0.0..=1.0`).
///
/// # Errors
/// Returns [`ConfigError::OutOfRange`] if `value` is not finite or outside
/// `[min, max]`.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected value in inclusive range",
        }
        .into())
    }
}

/// Trims a raw response body to a short single-line snippet for logs/errors.
pub fn make_snippet(raw: &str) -> String {
    const MAX: usize = 300;
    let flat = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.len() <= MAX {
        flat
    } else {
        let mut end = MAX;
        while !flat.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &flat[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_collapses_whitespace_and_caps_length() {
        assert_eq!(make_snippet("a \n b\t c"), "a b c");
        let long = "x".repeat(1000);
        let s = make_snippet(&long);
        assert!(s.chars().count() <= 301);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn range_validation() {
        assert!(validate_range_f32("temperature", 0.1, 0.0, 10.0).is_ok());
        assert!(matches!(
            validate_range_f32("top_p", 1.5, 0.0, 1.0),
            Err(GlmServiceError::Config(ConfigError::OutOfRange { .. }))
        ));
        assert!(matches!(
            validate_range_f32("top_p", f32::NAN, 0.0, 1.0),
            Err(GlmServiceError::Config(ConfigError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn endpoint_validation() {
        assert!(validate_http_endpoint("ZHIPUAI_ENDPOINT_URL", "http://127.0.0.1:8000/").is_ok());
        assert!(matches!(
            validate_http_endpoint("ZHIPUAI_ENDPOINT_URL", "ftp://x"),
            Err(GlmServiceError::Config(ConfigError::InvalidFormat { .. }))
        ));
    }
}
