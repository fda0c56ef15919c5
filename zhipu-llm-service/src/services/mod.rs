//! HTTP services for the ChatGLM invoke API.

pub mod glm_service;

use serde_json::{Map, Value};

use crate::error_handler::Result;

/// A capability that turns a prompt into generated text.
///
/// This is the seam the host application programs against: one method that
/// accepts a prompt, an optional stop list, and per-call parameter overrides,
/// and returns text or a typed failure. [`glm_service::GlmService`] is the
/// only implementation in this crate; further backends implement the same
/// trait without touching callers.
#[allow(async_fn_in_trait)]
pub trait TextCompletion {
    /// Generates text for `prompt`.
    ///
    /// `stop` truncates the result strictly before the earliest occurrence of
    /// any stop sequence; `overrides` win over configured model parameters on
    /// key collision.
    async fn complete(
        &self,
        prompt: &str,
        stop: Option<&[String]>,
        overrides: &Map<String, Value>,
    ) -> Result<String>;
}
