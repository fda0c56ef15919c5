//! Configuration for the ChatGLM invoke endpoint.

pub mod default_config;
pub mod glm_config;
