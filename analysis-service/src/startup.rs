//! Application startup and lifecycle management.

use crate::config::AnalysisConfig;
use crate::handlers;
use crate::services::providers::groq::GroqChatProvider;
use crate::services::providers::huggingface::HuggingFaceClassifier;
use crate::services::providers::{ChatCompletion, GenerationParams, ImageClassifier};
use crate::services::{AnalysisOrchestrator, ImagePreprocessor, ModelSelection};
use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    http_request_span, metrics_middleware, request_id_middleware, security_headers_middleware,
};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and the `type` field on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: AnalysisConfig,
    pub analyzer: Arc<AnalysisOrchestrator>,
}

impl AppState {
    pub fn new(
        config: AnalysisConfig,
        classifier: Arc<dyn ImageClassifier>,
        narrator: Arc<dyn ChatCompletion>,
    ) -> Self {
        let analyzer = AnalysisOrchestrator::new(
            ImagePreprocessor::new(config.preprocessing.clone()),
            classifier,
            narrator,
            ModelSelection::from(&config.huggingface),
            GenerationParams {
                temperature: config.groq.temperature,
                max_tokens: config.groq.max_tokens,
            },
        );

        Self {
            config,
            analyzer: Arc::new(analyzer),
        }
    }
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("No route for {}", uri.path()))
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.upload.max_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/api/analyze-image", post(handlers::analyze_image))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(http_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    /// Build the application with the Hugging Face classifier and Groq narrator.
    pub async fn build(config: AnalysisConfig) -> Result<Self, AppError> {
        let classifier = HuggingFaceClassifier::new(config.huggingface.clone()).map_err(|e| {
            tracing::error!("Failed to initialize Hugging Face client: {}", e);
            AppError::ConfigError(anyhow::anyhow!(e))
        })?;
        let narrator = GroqChatProvider::new(config.groq.clone()).map_err(|e| {
            tracing::error!("Failed to initialize Groq client: {}", e);
            AppError::ConfigError(anyhow::anyhow!(e))
        })?;

        tracing::info!(
            mri_model = %config.huggingface.mri_model,
            xray_model = %config.huggingface.xray_model,
            chat_model = %config.groq.model,
            "Initialized inference providers"
        );

        Self::build_with_providers(config, Arc::new(classifier), Arc::new(narrator)).await
    }

    /// Build the application around arbitrary providers. Port 0 binds a random port.
    pub async fn build_with_providers(
        config: AnalysisConfig,
        classifier: Arc<dyn ImageClassifier>,
        narrator: Arc<dyn ChatCompletion>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(config, classifier, narrator);
        let app = router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
