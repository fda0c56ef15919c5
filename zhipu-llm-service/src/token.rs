//! Bearer-token generation for the ChatGLM invoke API.
//!
//! The endpoint authenticates requests with a short-lived compact JWS signed
//! with HMAC-SHA256, keyed by the secret half of the `"<id>.<secret>"` API
//! key. The token header carries the service's custom `sign_type: "SIGN"`
//! marker next to the standard `alg` field, so the token is assembled by hand
//! (JWT crates expose no room for custom header fields).
//!
//! Header and claim field names are wire contract with the service and must
//! not change: header `{"alg":"HS256","sign_type":"SIGN"}`, claims
//! `{"api_key","exp","timestamp"}` with millisecond timestamps.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error_handler::{CredentialError, Result};

/// Token header. Field order and values are fixed by the service.
#[derive(Serialize)]
struct Header {
    alg: &'static str,
    sign_type: &'static str,
}

/// Token claims: key id plus expiry and issue time in ms since epoch.
#[derive(Serialize)]
struct Claims<'a> {
    api_key: &'a str,
    exp: u64,
    timestamp: u64,
}

/// Produces a signed bearer token valid for `exp_seconds` from now.
///
/// The credential must split into exactly two `.`-separated parts
/// (`<id>.<secret>`); the id goes into the claims, the secret keys the
/// signature. The clock is read once, so `exp - timestamp` is exactly
/// `exp_seconds * 1000`.
///
/// # Errors
/// Returns [`CredentialError::Malformed`] if the key is not two-part.
pub fn generate_token(api_key: &str, exp_seconds: u64) -> Result<String> {
    let (id, secret) = split_credential(api_key)?;

    let now_ms = chrono::Utc::now().timestamp_millis() as u64;
    let claims = Claims {
        api_key: id,
        exp: now_ms + exp_seconds * 1000,
        timestamp: now_ms,
    };

    Ok(sign(&claims, secret))
}

/// Splits `"<id>.<secret>"` into its two halves.
fn split_credential(api_key: &str) -> Result<(&str, &str)> {
    let mut parts = api_key.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(id), Some(secret), None) => Ok((id, secret)),
        _ => Err(CredentialError::Malformed.into()),
    }
}

/// Serializes header and claims, signs `b64(header).b64(claims)` with
/// HMAC-SHA256, and appends the base64url signature segment.
fn sign(claims: &Claims<'_>, secret: &str) -> String {
    let header = Header {
        alg: "HS256",
        sign_type: "SIGN",
    };

    // Two flat structs of strings/integers; serialization cannot fail.
    let header_json = serde_json::to_vec(&header).expect("header serializes");
    let claims_json = serde_json::to_vec(claims).expect("claims serialize");

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{signing_input}.{signature}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::GlmServiceError;
    use serde_json::Value;

    fn decode_segment(seg: &str) -> Value {
        let bytes = URL_SAFE_NO_PAD.decode(seg).expect("valid base64url");
        serde_json::from_slice(&bytes).expect("valid JSON segment")
    }

    #[test]
    fn token_has_three_segments_and_exact_expiry_offset() {
        let token = generate_token("my-id.my-secret", 300).unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);

        let claims = decode_segment(segments[1]);
        assert_eq!(claims["api_key"], "my-id");
        let exp = claims["exp"].as_u64().unwrap();
        let ts = claims["timestamp"].as_u64().unwrap();
        assert_eq!(exp - ts, 300_000);
    }

    #[test]
    fn header_is_verbatim_wire_contract() {
        let token = generate_token("id.secret", 60).unwrap();
        let header_b64 = token.split('.').next().unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(header_b64).unwrap();
        assert_eq!(bytes, br#"{"alg":"HS256","sign_type":"SIGN"}"#);
    }

    #[test]
    fn signature_verifies_with_the_secret() {
        let token = generate_token("id.secret", 10).unwrap();
        let (input, sig_b64) = token.rsplit_once('.').unwrap();

        let mut mac = Hmac::<Sha256>::new_from_slice(b"secret").unwrap();
        mac.update(input.as_bytes());
        let expected = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        assert_eq!(sig_b64, expected);
    }

    #[test]
    fn credential_without_separator_is_rejected() {
        assert!(matches!(
            generate_token("no-separator", 300),
            Err(GlmServiceError::Credential(CredentialError::Malformed))
        ));
    }

    #[test]
    fn credential_with_extra_separator_is_rejected() {
        assert!(matches!(
            generate_token("a.b.c", 300),
            Err(GlmServiceError::Credential(CredentialError::Malformed))
        ));
    }
}
