//! The analysis pipeline.
//!
//! `Preprocess -> Classify -> BuildPrompt -> Narrate -> Compose`, strictly in
//! order. The first failing stage ends the request; nothing partial is
//! returned and nothing is retried.

use crate::config::HuggingFaceConfig;
use crate::models::{AnalysisReport, ClassificationResult, Modality, PreparedImage, UploadedImage};
use crate::services::error::{AnalysisError, Stage};
use crate::services::metrics;
use crate::services::preprocess::ImagePreprocessor;
use crate::services::prompts;
use crate::services::providers::{
    ChatCompletion, ChatMessage, GenerationParams, ImageClassifier, ProviderError,
};
use crate::services::report;
use std::sync::Arc;
use std::time::Instant;

/// Classifier model identifier per modality.
#[derive(Debug, Clone)]
pub struct ModelSelection {
    mri: String,
    xray: String,
}

impl ModelSelection {
    pub fn new(mri_model: impl Into<String>, xray_model: impl Into<String>) -> Self {
        Self {
            mri: mri_model.into(),
            xray: xray_model.into(),
        }
    }

    pub fn model_for(&self, modality: Modality) -> &str {
        match modality {
            Modality::Mri => &self.mri,
            Modality::Xray => &self.xray,
        }
    }
}

impl From<&HuggingFaceConfig> for ModelSelection {
    fn from(config: &HuggingFaceConfig) -> Self {
        Self::new(config.model_for(Modality::Mri), config.model_for(Modality::Xray))
    }
}

/// Runs one upload through the pipeline. Shared across requests; holds no
/// per-request state.
pub struct AnalysisOrchestrator {
    preprocessor: ImagePreprocessor,
    classifier: Arc<dyn ImageClassifier>,
    narrator: Arc<dyn ChatCompletion>,
    models: ModelSelection,
    generation: GenerationParams,
}

impl AnalysisOrchestrator {
    pub fn new(
        preprocessor: ImagePreprocessor,
        classifier: Arc<dyn ImageClassifier>,
        narrator: Arc<dyn ChatCompletion>,
        models: ModelSelection,
        generation: GenerationParams,
    ) -> Self {
        Self {
            preprocessor,
            classifier,
            narrator,
            models,
            generation,
        }
    }

    pub fn classifier(&self) -> &Arc<dyn ImageClassifier> {
        &self.classifier
    }

    pub fn narrator(&self) -> &Arc<dyn ChatCompletion> {
        &self.narrator
    }

    #[tracing::instrument(
        skip(self, upload),
        fields(
            modality = %upload.modality,
            file_name = %upload.file_name,
            size = upload.size(),
        )
    )]
    pub async fn analyze(&self, upload: UploadedImage) -> Result<AnalysisReport, AnalysisError> {
        let modality = upload.modality;

        let result = self.run(upload).await;

        match &result {
            Ok(_) => {
                metrics::record_analysis(modality.as_str(), "success");
                tracing::info!("Analysis completed");
            }
            Err(e) => {
                metrics::record_analysis(modality.as_str(), e.kind());
                if let Some(stage) = e.stage() {
                    metrics::record_stage_failure(stage.as_str(), e.kind());
                }
                tracing::warn!(error = %e, stage = ?e.stage(), "Analysis failed");
            }
        }

        result
    }

    async fn run(&self, upload: UploadedImage) -> Result<AnalysisReport, AnalysisError> {
        let modality = upload.modality;

        let prepared = timed(Stage::Preprocess, self.preprocess(upload)).await?;
        let classification = timed(Stage::Classify, self.classify(&prepared, modality)).await?;

        let started = Instant::now();
        let prompt = prompts::instruction_for(modality);
        metrics::record_stage_latency(Stage::BuildPrompt.as_str(), started.elapsed().as_secs_f64());

        let narrative = timed(Stage::Narrate, self.narrate(prompt)).await?;

        let started = Instant::now();
        let report = report::compose(modality, &classification, &narrative);
        metrics::record_stage_latency(Stage::Compose.as_str(), started.elapsed().as_secs_f64());

        Ok(report)
    }

    async fn preprocess(&self, upload: UploadedImage) -> Result<PreparedImage, AnalysisError> {
        let preprocessor = self.preprocessor.clone();

        tokio::task::spawn_blocking(move || preprocessor.prepare(&upload))
            .await
            .map_err(|e| AnalysisError::Internal(format!("preprocessing task failed: {}", e)))?
    }

    async fn classify(
        &self,
        image: &PreparedImage,
        modality: Modality,
    ) -> Result<ClassificationResult, AnalysisError> {
        let model_id = self.models.model_for(modality);
        let provider = self.classifier.name();
        tracing::info!(provider, model = %model_id, "Classifying image");

        let started = Instant::now();
        let predictions = self
            .classifier
            .classify(image, model_id)
            .await
            .map_err(|e| {
                metrics::record_provider_error(provider, e.kind());
                match e {
                    ProviderError::NotConfigured(msg) => AnalysisError::Configuration(msg),
                    other => AnalysisError::ClassificationService(other.to_string()),
                }
            })?;
        metrics::record_provider_latency(provider, model_id, started.elapsed().as_secs_f64());

        let classification = ClassificationResult::from_predictions(predictions).ok_or_else(|| {
            AnalysisError::ClassificationService("classifier returned no predictions".to_string())
        })?;

        tracing::debug!(
            prediction_count = classification.len(),
            top_score = classification.predictions()[0].score,
            "Classification received"
        );

        Ok(classification)
    }

    async fn narrate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let provider = self.narrator.name();
        let model = self.narrator.model();
        tracing::info!(provider, model = %model, prompt_len = prompt.len(), "Requesting narrative");

        let started = Instant::now();
        let narrative = self
            .narrator
            .complete(&[ChatMessage::user(prompt)], &self.generation)
            .await
            .map_err(|e| {
                metrics::record_provider_error(provider, e.kind());
                match e {
                    ProviderError::NotConfigured(msg) => AnalysisError::Configuration(msg),
                    other => AnalysisError::NarrativeService(other.to_string()),
                }
            })?;
        metrics::record_provider_latency(provider, model, started.elapsed().as_secs_f64());

        if narrative.is_empty() {
            tracing::warn!("Narrative model returned no content");
        }

        Ok(narrative)
    }
}

async fn timed<T, F>(stage: Stage, fut: F) -> Result<T, AnalysisError>
where
    F: std::future::Future<Output = Result<T, AnalysisError>>,
{
    let started = Instant::now();
    let result = fut.await;
    metrics::record_stage_latency(stage.as_str(), started.elapsed().as_secs_f64());
    result
}
