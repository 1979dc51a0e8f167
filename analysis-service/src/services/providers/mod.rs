//! Remote inference provider abstractions and implementations.
//!
//! The pipeline only talks to these traits, so the Hugging Face and Groq
//! clients can be swapped for the mocks in tests.

pub mod groq;
pub mod huggingface;
pub mod mock;

use crate::models::{PreparedImage, Prediction};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("{0}")]
    ApiError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::RateLimited(_) => "rate_limited",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// A role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling parameters for chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Image classification backend (e.g., Hugging Face Inference API).
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Provider name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Classify the image with the given model. Predictions come back in
    /// whatever order the remote returns them.
    async fn classify(
        &self,
        image: &PreparedImage,
        model_id: &str,
    ) -> Result<Vec<Prediction>, ProviderError>;

    /// Configuration check; does not call the remote.
    fn is_configured(&self) -> bool;
}

/// Chat completion backend (e.g., Groq).
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    fn name(&self) -> &'static str;

    /// Model the completions are requested from.
    fn model(&self) -> &str;

    /// Run one completion. Returns an empty string when the remote produced
    /// no content.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String, ProviderError>;

    fn is_configured(&self) -> bool;
}
