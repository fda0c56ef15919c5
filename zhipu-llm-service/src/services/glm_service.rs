//! ChatGLM invoke service for single-shot text generation.
//!
//! Thin client for the ZhipuAI ChatGLM `invoke` API:
//! - `POST {endpoint_url}` — non-streaming completion
//!
//! Every call reads `ZHIPUAI_API_KEY` from the environment and signs a fresh
//! bearer token (see [`crate::token`]); nothing is cached or retried, and the
//! client carries no timeout — deadlines are the caller's job.
//!
//! Response envelope: `{"code": 200, "msg": "...", "data": {"choices":
//! [{"content": "..."}]}}`. The `code` field must be 200 and `data` must be
//! present, or the call fails with a typed error.

use std::time::Instant;

use reqwest::{StatusCode, header};
use serde_json::{Map, Value, json};
use tracing::{debug, error, info};

use crate::config::glm_config::GlmEndpointConfig;
use crate::error_handler::{
    CredentialError, GlmServiceError, Result, make_snippet, validate_http_endpoint,
};
use crate::services::TextCompletion;
use crate::token::generate_token;

/// Environment variable holding the `"<id>.<secret>"` API key.
pub const API_KEY_VAR: &str = "ZHIPUAI_API_KEY";

/// Lifetime of the bearer token signed for each request.
const TOKEN_TTL_SECS: u64 = 300;

/// Application-level success code inside the response envelope.
const SUCCESS_CODE: i64 = 200;

/// Thin client for a ChatGLM invoke endpoint.
///
/// Constructed from a [`GlmEndpointConfig`]. Internally keeps a preconfigured
/// `reqwest::Client` with the JSON content type as a default header; the
/// `Authorization` header is set per request because the token is short-lived.
#[derive(Debug)]
pub struct GlmService {
    client: reqwest::Client,
    cfg: GlmEndpointConfig,
}

impl GlmService {
    /// Creates a new [`GlmService`] from the given config.
    ///
    /// Validates the endpoint scheme and builds the HTTP client. The client
    /// is deliberately built without a timeout: the adapter imposes no
    /// deadline, callers wrap the invoke future with their own if needed.
    ///
    /// # Errors
    /// - [`GlmServiceError::Config`] if the endpoint URL is not http/https
    /// - [`GlmServiceError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: GlmEndpointConfig) -> Result<Self> {
        validate_http_endpoint("endpoint_url", cfg.endpoint_url.trim())?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        info!(
            endpoint = %cfg.endpoint_url,
            max_tokens = cfg.max_tokens,
            temperature = cfg.temperature,
            top_p = cfg.top_p,
            "GlmService initialized"
        );

        Ok(Self { client, cfg })
    }

    /// Performs a single invoke call and returns the generated text.
    ///
    /// Payload is `{prompt, temperature, max_length, top_p}` overlaid with
    /// the configured `model_params`, then with `overrides` (later merges win
    /// on key collision). On success the text of `data.choices[0].content` is
    /// truncated at the earliest stop sequence (if any) and finally stripped
    /// of its wrapping quote characters.
    ///
    /// # Errors
    /// Checked in order:
    /// - [`GlmServiceError::Credential`] — API key absent or malformed
    /// - [`GlmServiceError::HttpTransport`] — network/connection failure
    /// - [`GlmServiceError::HttpStatus`] — HTTP status other than 200
    /// - [`GlmServiceError::Decode`] — body not valid JSON
    /// - [`GlmServiceError::UnexpectedPayload`] — body not a JSON object
    /// - [`GlmServiceError::Remote`] — envelope `code` other than 200
    /// - [`GlmServiceError::MissingContent`] — `data` or its content missing
    pub async fn invoke(
        &self,
        prompt: &str,
        stop: Option<&[String]>,
        overrides: &Map<String, Value>,
    ) -> Result<String> {
        let started = Instant::now();

        // The credential is read per call, never stored on the service.
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(CredentialError::Missing)?;
        let bearer = generate_token(&api_key, TOKEN_TTL_SECS)?;

        let payload = build_payload(&self.cfg, prompt, overrides);

        debug!(
            endpoint = %self.cfg.endpoint_url,
            prompt_len = prompt.len(),
            payload_keys = payload.len(),
            "POST {}", self.cfg.endpoint_url
        );

        let resp = self
            .client
            .post(&self.cfg.endpoint_url)
            .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let url = self.cfg.endpoint_url.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "invoke returned non-200 status"
            );

            return Err(GlmServiceError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        let body = resp.text().await?;
        let mut text = unwrap_envelope(&body)?;

        if let Some(stop) = stop {
            text = enforce_stop_tokens(text, stop);
        }
        let out = strip_wrapping_quotes(&text);

        info!(
            endpoint = %self.cfg.endpoint_url,
            latency_ms = started.elapsed().as_millis(),
            chars = out.len(),
            "invoke completed"
        );

        Ok(out)
    }
}

impl TextCompletion for GlmService {
    async fn complete(
        &self,
        prompt: &str,
        stop: Option<&[String]>,
        overrides: &Map<String, Value>,
    ) -> Result<String> {
        self.invoke(prompt, stop, overrides).await
    }
}

/* ===========================================================================
Payload construction & envelope unwrapping
======================================================================== */

/// Builds the request payload: base sampling fields, then configured model
/// parameters, then per-call overrides. Later inserts win on key collision.
fn build_payload(
    cfg: &GlmEndpointConfig,
    prompt: &str,
    overrides: &Map<String, Value>,
) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("prompt".into(), Value::String(prompt.to_string()));
    payload.insert("temperature".into(), json!(cfg.temperature));
    // Wire name is `max_length`, not `max_tokens`.
    payload.insert("max_length".into(), json!(cfg.max_tokens));
    payload.insert("top_p".into(), json!(cfg.top_p));

    for (k, v) in &cfg.model_params {
        payload.insert(k.clone(), v.clone());
    }
    for (k, v) in overrides {
        payload.insert(k.clone(), v.clone());
    }
    payload
}

/// Validates the `{code, msg, data}` envelope and extracts
/// `data.choices[0].content`.
///
/// The checks run in the contract's order: valid JSON, JSON object,
/// `code == 200`, `data` present, content reachable.
fn unwrap_envelope(body: &str) -> Result<String> {
    let parsed: Value = serde_json::from_str(body).map_err(|e| {
        let snippet = make_snippet(body);
        error!(error = %e, %snippet, "response body is not valid JSON");
        GlmServiceError::Decode { snippet }
    })?;

    let Some(obj) = parsed.as_object() else {
        return Err(GlmServiceError::UnexpectedPayload);
    };

    let code = obj.get("code").and_then(Value::as_i64);
    if code != Some(SUCCESS_CODE) {
        let msg = obj
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(GlmServiceError::Remote {
            code: code.unwrap_or_default(),
            msg,
        });
    }

    let Some(data) = obj.get("data") else {
        return Err(GlmServiceError::MissingContent);
    };

    data.get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(GlmServiceError::MissingContent)
}

/// Truncates `text` strictly before the earliest occurrence of any stop
/// sequence; text without a match passes through unchanged. Empty stop
/// sequences are ignored.
fn enforce_stop_tokens(text: String, stop: &[String]) -> String {
    let cut = stop
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min();
    match cut {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

/// Drops exactly one leading and one trailing character.
///
/// The invoke API wraps generated text in literal quote characters and the
/// upstream contract strips them positionally, without checking that they are
/// actually quotes. If the service ever stops quoting output this eats real
/// characters; the behavior is kept verbatim for wire compatibility.
fn strip_wrapping_quotes(text: &str) -> String {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_with_content_unwraps_raw_text() {
        let body = r#"{"code":200,"data":{"choices":[{"content":"\"hello\""}]}}"#;
        let text = unwrap_envelope(body).unwrap();
        assert_eq!(text, "\"hello\"");
        assert_eq!(strip_wrapping_quotes(&text), "hello");
    }

    #[test]
    fn remote_error_carries_code_and_message() {
        let body = r#"{"code":500,"msg":"bad request","data":{}}"#;
        match unwrap_envelope(body) {
            Err(GlmServiceError::Remote { code, msg }) => {
                assert_eq!(code, 500);
                assert_eq!(msg, "bad request");
            }
            other => panic!("expected Remote error, got {other:?}"),
        }
    }

    #[test]
    fn missing_data_key_is_missing_content() {
        let body = r#"{"code":200,"msg":"ok"}"#;
        assert!(matches!(
            unwrap_envelope(body),
            Err(GlmServiceError::MissingContent)
        ));
    }

    #[test]
    fn empty_choices_is_missing_content() {
        let body = r#"{"code":200,"data":{"choices":[]}}"#;
        assert!(matches!(
            unwrap_envelope(body),
            Err(GlmServiceError::MissingContent)
        ));
    }

    #[test]
    fn non_object_body_is_unexpected_payload() {
        assert!(matches!(
            unwrap_envelope("[1,2,3]"),
            Err(GlmServiceError::UnexpectedPayload)
        ));
    }

    #[test]
    fn invalid_json_is_decode_error() {
        assert!(matches!(
            unwrap_envelope("<html>oops</html>"),
            Err(GlmServiceError::Decode { .. })
        ));
    }

    #[test]
    fn payload_merge_precedence_overrides_win() {
        let mut cfg = GlmEndpointConfig::default();
        cfg.model_params.insert("top_p".into(), json!(0.9));

        let mut overrides = Map::new();
        overrides.insert("top_p".into(), json!(0.5));

        let payload = build_payload(&cfg, "hi", &overrides);
        assert_eq!(payload["prompt"], "hi");
        assert_eq!(payload["max_length"], json!(20000));
        // config 0.7 < model_params 0.9 < per-call override 0.5
        assert_eq!(payload["top_p"], json!(0.5));
    }

    #[test]
    fn model_params_override_base_fields() {
        let mut cfg = GlmEndpointConfig::default();
        cfg.model_params.insert("temperature".into(), json!(1.5));

        let payload = build_payload(&cfg, "hi", &Map::new());
        assert_eq!(payload["temperature"], json!(1.5));
    }

    #[test]
    fn earliest_stop_sequence_wins() {
        let stops = vec!["late".to_string(), "soon".to_string()];
        assert_eq!(
            enforce_stop_tokens("text soon and late".into(), &stops),
            "text "
        );
        assert_eq!(
            enforce_stop_tokens("no match here".into(), &stops),
            "no match here"
        );
    }

    #[test]
    fn stop_truncation_runs_before_quote_strip() {
        // Raw extracted content still carries the wrapping quotes when the
        // stop list is applied; the positional strip runs last.
        let raw = "\"foo STOP bar\"".to_string();
        let truncated = enforce_stop_tokens(raw, &["STOP".to_string()]);
        assert_eq!(truncated, "\"foo ");
        assert_eq!(strip_wrapping_quotes(&truncated), "foo");
    }

    #[test]
    fn quote_strip_is_positional_not_conditional() {
        assert_eq!(strip_wrapping_quotes("\"hi\""), "hi");
        // No quotes: real characters are eaten, by contract.
        assert_eq!(strip_wrapping_quotes("abc"), "b");
        assert_eq!(strip_wrapping_quotes("ab"), "");
        assert_eq!(strip_wrapping_quotes("a"), "");
        assert_eq!(strip_wrapping_quotes(""), "");
    }

    #[test]
    fn service_rejects_non_http_endpoint() {
        let cfg = GlmEndpointConfig {
            endpoint_url: "not-a-url".into(),
            ..GlmEndpointConfig::default()
        };
        assert!(matches!(
            GlmService::new(cfg),
            Err(GlmServiceError::Config(_))
        ));
    }

    #[tokio::test]
    async fn transport_failure_surfaces_immediately() {
        // Port 1 (tcpmux) is unassigned on loopback; the connection is
        // refused before any retry or timeout could matter.
        unsafe { std::env::set_var(API_KEY_VAR, "id.secret") };

        let cfg = GlmEndpointConfig {
            endpoint_url: "http://127.0.0.1:1/".into(),
            ..GlmEndpointConfig::default()
        };
        let svc = GlmService::new(cfg).unwrap();

        let err = svc.invoke("hi", None, &Map::new()).await.unwrap_err();
        assert!(matches!(err, GlmServiceError::HttpTransport(_)));
    }
}
