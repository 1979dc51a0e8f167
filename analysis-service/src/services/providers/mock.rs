//! Mock provider implementations for testing.

use super::{ChatCompletion, ChatMessage, GenerationParams, ImageClassifier, ProviderError};
use crate::models::{PreparedImage, Prediction};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock classifier returning fixed predictions, or failing on demand.
pub struct MockClassifier {
    predictions: Vec<Prediction>,
    failure: Option<String>,
    calls: AtomicUsize,
    last_model: Mutex<Option<String>>,
}

impl MockClassifier {
    pub fn with_scores(scores: &[f64]) -> Self {
        let predictions = scores
            .iter()
            .enumerate()
            .map(|(i, score)| Prediction::new(format!("label_{}", i), *score))
            .collect();

        Self {
            predictions,
            failure: None,
            calls: AtomicUsize::new(0),
            last_model: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::with_scores(&[])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_model(&self) -> Option<String> {
        self.last_model.lock().ok().and_then(|m| m.clone())
    }
}

#[async_trait]
impl ImageClassifier for MockClassifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn classify(
        &self,
        image: &PreparedImage,
        model_id: &str,
    ) -> Result<Vec<Prediction>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_model.lock() {
            *last = Some(model_id.to_string());
        }

        if let Some(message) = &self.failure {
            return Err(ProviderError::ApiError(message.clone()));
        }

        if image.bytes().is_empty() {
            return Err(ProviderError::InvalidResponse("empty image".to_string()));
        }

        Ok(self.predictions.clone())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Mock chat provider that echoes a fixed narrative and records prompts.
pub struct MockNarrator {
    response: String,
    failure: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockNarrator {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            failure: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatCompletion for MockNarrator {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-chat"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.extend(messages.iter().map(|m| m.content.clone()));
        }

        match &self.failure {
            Some(message) => Err(ProviderError::ApiError(message.clone())),
            None => Ok(self.response.clone()),
        }
    }

    fn is_configured(&self) -> bool {
        true
    }
}
