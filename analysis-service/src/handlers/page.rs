use crate::models::Modality;
use crate::startup::AppState;
use askama::Template;
use axum::{extract::State, response::IntoResponse};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub modalities: Vec<ModalityOption>,
    pub max_upload_mb: usize,
}

pub struct ModalityOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    IndexTemplate {
        modalities: Modality::ALL
            .iter()
            .map(|m| ModalityOption {
                value: m.as_str(),
                label: m.display_name(),
            })
            .collect(),
        max_upload_mb: state.config.upload.max_bytes / (1024 * 1024),
    }
}
