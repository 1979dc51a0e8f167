//! Pipeline error taxonomy.
//!
//! Every failure is tagged with the stage that produced it, so the HTTP
//! boundary can pick a status class without inspecting message text.

use service_core::error::AppError;
use std::fmt;
use thiserror::Error;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Preprocess,
    Classify,
    BuildPrompt,
    Narrate,
    Compose,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::Preprocess => "preprocess",
            Stage::Classify => "classify",
            Stage::BuildPrompt => "build_prompt",
            Stage::Narrate => "narrate",
            Stage::Compose => "compose",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Bad, missing or oversized upload.
    #[error("{0}")]
    InputValidation(String),

    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("Hugging Face API error: {0}")]
    ClassificationService(String),

    #[error("Groq API error: {0}")]
    NarrativeService(String),

    /// Missing credentials. Only reachable at startup.
    #[error("{0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AnalysisError::InputValidation(_) => Some(Stage::Validate),
            AnalysisError::ImageDecode(_) => Some(Stage::Preprocess),
            AnalysisError::ClassificationService(_) => Some(Stage::Classify),
            AnalysisError::NarrativeService(_) => Some(Stage::Narrate),
            AnalysisError::Configuration(_) | AnalysisError::Internal(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InputValidation(_) => "input_validation",
            AnalysisError::ImageDecode(_) => "image_decode",
            AnalysisError::ClassificationService(_) => "classification_service",
            AnalysisError::NarrativeService(_) => "narrative_service",
            AnalysisError::Configuration(_) => "configuration",
            AnalysisError::Internal(_) => "internal",
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InputValidation(_) | AnalysisError::ImageDecode(_) => {
                AppError::BadRequest(anyhow::anyhow!(err.to_string()))
            }
            AnalysisError::ClassificationService(_) | AnalysisError::NarrativeService(_) => {
                AppError::BadGateway(err.to_string())
            }
            AnalysisError::Configuration(msg) => AppError::ConfigError(anyhow::anyhow!(msg)),
            AnalysisError::Internal(msg) => AppError::InternalError(anyhow::anyhow!(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status(err: AnalysisError) -> StatusCode {
        AppError::from(err).status_code()
    }

    #[test]
    fn status_classes_follow_error_kind() {
        assert_eq!(
            status(AnalysisError::InputValidation("Missing image or type".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AnalysisError::ImageDecode("bad magic".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AnalysisError::ClassificationService("503".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(AnalysisError::NarrativeService("timeout".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(AnalysisError::Configuration("GROQ_API_KEY".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AnalysisError::Internal("join error".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn remote_failures_name_the_provider() {
        let err = AnalysisError::NarrativeService("rate limited".into());

        assert_eq!(err.to_string(), "Groq API error: rate limited");
        assert_eq!(err.stage(), Some(Stage::Narrate));

        match AppError::from(err) {
            AppError::BadGateway(msg) => assert_eq!(msg, "Groq API error: rate limited"),
            other => panic!("unexpected mapping: {:?}", other),
        }
    }
}
