#![allow(dead_code)]

use analysis_service::config::AnalysisConfig;
use analysis_service::services::providers::{ChatCompletion, ImageClassifier};
use analysis_service::startup::Application;
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use service_core::config::Config;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// Config with test credentials and a random port. `overrides` replace or add keys.
pub fn test_config(overrides: &[(&str, &str)]) -> AnalysisConfig {
    let mut vars: HashMap<String, String> = [
        ("HUGGINGFACE_API_KEY", "test-hf-key"),
        ("GROQ_API_KEY", "test-groq-key"),
        ("HUGGINGFACE_MODEL_MRI", "test/mri-model"),
        ("HUGGINGFACE_MODEL_XRAY", "test/xray-model"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }

    let common = Config {
        port: 0,
        environment: "test".to_string(),
    };

    AnalysisConfig::from_source(common, |key| vars.get(key).cloned())
        .expect("Failed to build test config")
}

/// Spawn the application on a random port and return the base URL.
pub async fn spawn_app(
    config: AnalysisConfig,
    classifier: Arc<dyn ImageClassifier>,
    narrator: Arc<dyn ChatCompletion>,
) -> String {
    let app = Application::build_with_providers(config, classifier, narrator)
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    format!("http://localhost:{}", port)
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 3) as u8, (y * 5) as u8, 90])
    }))
    .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
    .expect("Failed to encode test PNG");
    bytes
}
