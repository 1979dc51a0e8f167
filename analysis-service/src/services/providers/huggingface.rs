//! Hugging Face Inference API image classifier.

use super::{ImageClassifier, ProviderError};
use crate::config::HuggingFaceConfig;
use crate::models::{PreparedImage, Prediction};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::Duration;

pub struct HuggingFaceClassifier {
    config: HuggingFaceConfig,
    client: Client,
}

impl HuggingFaceClassifier {
    pub fn new(config: HuggingFaceConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn api_url(&self, model_id: &str) -> String {
        format!(
            "{}/models/{}",
            self.config.api_base.trim_end_matches('/'),
            model_id
        )
    }
}

#[async_trait]
impl ImageClassifier for HuggingFaceClassifier {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn classify(
        &self,
        image: &PreparedImage,
        model_id: &str,
    ) -> Result<Vec<Prediction>, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured(
                "Hugging Face API key not configured".to_string(),
            ));
        }

        tracing::debug!(
            model = %model_id,
            image_bytes = image.bytes().len(),
            "Sending image to Hugging Face classifier"
        );

        let response = self
            .client
            .post(self.api_url(model_id))
            .bearer_auth(self.config.api_key.expose_secret())
            .header(header::CONTENT_TYPE, image.mime_type())
            .body(image.bytes().to_vec())
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            let message = extract_error_message(&body).unwrap_or(body);

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited(message));
            }

            return Err(ProviderError::ApiError(format!("{} {}", status, message)));
        }

        let predictions: Vec<ClassificationItem> = serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("{}: {}", e, body)))?;

        Ok(predictions
            .into_iter()
            .map(|item| Prediction::new(item.label, item.score))
            .collect())
    }

    fn is_configured(&self) -> bool {
        !self.config.api_key.expose_secret().is_empty()
    }
}

/// The inference API reports failures as `{"error": "..."}`, sometimes with
/// an array of messages.
fn extract_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.error {
        ErrorField::Single(msg) => Some(msg),
        ErrorField::Many(msgs) if !msgs.is_empty() => Some(msgs.join("; ")),
        ErrorField::Many(_) => None,
    }
}

// ============================================================================
// Hugging Face API Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ClassificationItem {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Single(String),
    Many(Vec<String>),
}
