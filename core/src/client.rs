use async_trait::async_trait;
use eventplan_gemini::{GeminiClient, GeminiError};
use thiserror::Error;

use crate::config::Config;
use crate::error::ConfigError;

/// Failure of a single generation call, carrying a user-presentable reason.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct GenerationError {
    pub reason: String,
}

impl GenerationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl From<GeminiError> for GenerationError {
    fn from(err: GeminiError) -> Self {
        Self::new(err.to_string())
    }
}

/// One prompt in, one completed text out. No retry, no caching.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Adapter to wrap GeminiClient into ModelClient
pub struct GeminiAdapter {
    inner: GeminiClient,
}

impl GeminiAdapter {
    pub fn new(inner: GeminiClient) -> Self {
        Self { inner }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?;
        let inner = GeminiClient::new_with_model(api_key.to_string(), config.model.clone())
            .with_endpoint(config.endpoint.clone())
            .with_temperature(config.temperature);
        Ok(Self { inner })
    }

    pub fn model(&self) -> &str {
        &self.inner.model
    }
}

#[async_trait]
impl ModelClient for GeminiAdapter {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(self.inner.generate(prompt).await?)
    }
}
