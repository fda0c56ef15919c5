//! Shared service for the ZhipuAI ChatGLM `invoke` API (https://open.bigmodel.cn).
//!
//! A thin, single-shot client: every call signs a fresh bearer token from
//! `ZHIPUAI_API_KEY`, POSTs the prompt with sampling parameters, validates the
//! `{code, msg, data}` response envelope, and returns plain text. No retries,
//! no caching, no streaming.
//!
//! - [`config`] — endpoint/sampling configuration plus env-driven defaults
//! - [`token`] — HMAC-SHA256 bearer-token generation
//! - [`services`] — [`GlmService`] and the [`TextCompletion`] trait
//! - [`error_handler`] — unified [`GlmServiceError`] and env/validation helpers
//! - [`telemetry`] — library-scoped tracing layer for host binaries

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;
pub mod token;

pub use config::glm_config::GlmEndpointConfig;
pub use error_handler::{CredentialError, GlmServiceError, Result};
pub use services::TextCompletion;
pub use services::glm_service::GlmService;
