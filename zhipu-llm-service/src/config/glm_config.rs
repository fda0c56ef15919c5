use serde_json::{Map, Value};

/// Endpoint URL used when `ZHIPUAI_ENDPOINT_URL` is not set.
pub const DEFAULT_ENDPOINT_URL: &str = "http://127.0.0.1:8000/";

/// Default maximum output length passed to the model (wire name `max_length`).
pub const DEFAULT_MAX_TOKENS: u32 = 20000;

/// Default sampling temperature. ChatGLM accepts 0–10.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default nucleus-sampling cutoff. ChatGLM accepts 0–1.
pub const DEFAULT_TOP_P: f32 = 0.7;

/// Configuration for a ChatGLM invoke-endpoint call.
///
/// Constructed once by the caller and read-only thereafter; the service never
/// mutates it. Sampling ranges are documented but not enforced on the struct
/// itself — the env loader in [`crate::config::default_config`] validates
/// them at load time.
///
/// # Fields
///
/// - `endpoint_url`: full invoke URL, e.g.
///   `https://open.bigmodel.cn/api/paas/v3/model-api/chatglm_lite/invoke`.
/// - `model_params`: extra model parameters merged into every payload.
/// - `max_tokens`: maximum output length (sent as `max_length`).
/// - `temperature`: sampling temperature (expected 0–10).
/// - `top_p`: nucleus sampling cutoff (expected 0–1).
///
/// # Examples
///
/// ```
/// use zhipu_llm_service::GlmEndpointConfig;
///
/// let cfg = GlmEndpointConfig {
///     endpoint_url: "https://open.bigmodel.cn/api/paas/v3/model-api/chatglm_lite/invoke".into(),
///     ..GlmEndpointConfig::default()
/// };
/// assert_eq!(cfg.max_tokens, 20000);
/// ```
#[derive(Debug, Clone)]
pub struct GlmEndpointConfig {
    /// Full URL of the model's invoke endpoint.
    pub endpoint_url: String,

    /// Extra model parameters merged into the request payload.
    ///
    /// Per-call overrides passed to the invoker win over these on key
    /// collision.
    pub model_params: Map<String, Value>,

    /// Maximum number of tokens the model may generate.
    pub max_tokens: u32,

    /// Sampling temperature (expected 0–10, unenforced here).
    pub temperature: f32,

    /// Nucleus sampling cutoff (expected 0–1, unenforced here).
    pub top_p: f32,
}

impl Default for GlmEndpointConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            model_params: Map::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_endpoint_contract() {
        let cfg = GlmEndpointConfig::default();
        assert_eq!(cfg.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert!(cfg.model_params.is_empty());
        assert_eq!(cfg.max_tokens, 20000);
        assert_eq!(cfg.temperature, 0.1);
        assert_eq!(cfg.top_p, 0.7);
    }
}
