//! Default ChatGLM config loaded strictly from environment variables.
//!
//! This module provides a convenience constructor for [`GlmEndpointConfig`].
//! Sampling parameters are range-checked here (cheap at load time); the
//! struct itself leaves them unenforced.
//!
//! # Environment variables
//!
//! - `ZHIPUAI_ENDPOINT_URL` = optional invoke URL (must be http/https if set)
//! - `GLM_MAX_TOKENS`       = optional max output length (u32)
//! - `GLM_TEMPERATURE`      = optional sampling temperature (f32, 0–10)
//! - `GLM_TOP_P`            = optional nucleus cutoff (f32, 0–1)
//!
//! The API key itself (`ZHIPUAI_API_KEY`) is intentionally *not* part of the
//! config: the service reads it from the environment on every call.

use serde_json::Map;

use crate::config::glm_config::{
    DEFAULT_ENDPOINT_URL, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
    GlmEndpointConfig,
};
use crate::error_handler::{
    Result, env_opt_f32, env_opt_u32, validate_http_endpoint, validate_range_f32,
};

/// Constructs a [`GlmEndpointConfig`] from the environment.
///
/// Unset variables fall back to the endpoint-contract defaults
/// (`max_tokens = 20000`, `temperature = 0.1`, `top_p = 0.7`, local endpoint
/// URL). `model_params` starts empty; callers add extra parameters on the
/// returned config.
///
/// # Errors
///
/// - [`ConfigError::InvalidFormat`] if `ZHIPUAI_ENDPOINT_URL` is set but not
///   an http/https URL
/// - [`ConfigError::InvalidNumber`] if a numeric variable does not parse
/// - [`ConfigError::OutOfRange`] if temperature/top_p fall outside the
///   documented ChatGLM ranges
///
/// [`ConfigError::InvalidFormat`]: crate::error_handler::ConfigError::InvalidFormat
/// [`ConfigError::InvalidNumber`]: crate::error_handler::ConfigError::InvalidNumber
/// [`ConfigError::OutOfRange`]: crate::error_handler::ConfigError::OutOfRange
pub fn config_from_env() -> Result<GlmEndpointConfig> {
    let endpoint_url = match std::env::var("ZHIPUAI_ENDPOINT_URL") {
        Ok(url) if !url.trim().is_empty() => {
            validate_http_endpoint("ZHIPUAI_ENDPOINT_URL", &url)?;
            url
        }
        _ => DEFAULT_ENDPOINT_URL.to_string(),
    };

    let max_tokens = env_opt_u32("GLM_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS);

    let temperature = env_opt_f32("GLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("temperature", temperature, 0.0, 10.0)?;

    let top_p = env_opt_f32("GLM_TOP_P")?.unwrap_or(DEFAULT_TOP_P);
    validate_range_f32("top_p", top_p, 0.0, 1.0)?;

    Ok(GlmEndpointConfig {
        endpoint_url,
        model_params: Map::new(),
        max_tokens,
        temperature,
        top_p,
    })
}
