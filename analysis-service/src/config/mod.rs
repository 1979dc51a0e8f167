use crate::models::Modality;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Upload ceiling for a single image (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Side length of the square image the classifier receives.
pub const CLASSIFIER_INPUT_SIZE: u32 = 224;

const DEFAULT_CLASSIFIER_MODEL: &str = "microsoft/resnet-50";
const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 700;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub common: core_config::Config,
    pub huggingface: HuggingFaceConfig,
    pub groq: GroqConfig,
    pub upload: UploadConfig,
    pub preprocessing: PreprocessingConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    /// Classifier used for MRI scans.
    pub mri_model: String,
    /// Classifier used for X-ray scans. Same general-purpose model as MRI by default.
    pub xray_model: String,
    pub timeout_secs: u64,
}

impl HuggingFaceConfig {
    pub fn model_for(&self, modality: Modality) -> &str {
        match modality {
            Modality::Mri => &self.mri_model,
            Modality::Xray => &self.xray_model,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct PreprocessingConfig {
    pub target_size: u32,
    pub normalize: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            target_size: CLASSIFIER_INPUT_SIZE,
            normalize: true,
        }
    }
}

impl AnalysisConfig {
    /// Load from the process environment. Fails if either provider
    /// credential is missing.
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_source(common_config, |key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_source<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = common.is_prod();
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        let timeout_secs = parse_or(
            &get("PROVIDER_TIMEOUT_SECS", Some(&DEFAULT_TIMEOUT_SECS.to_string()))?,
            DEFAULT_TIMEOUT_SECS,
        );

        Ok(AnalysisConfig {
            huggingface: HuggingFaceConfig {
                api_key: Secret::new(require(&lookup, "HUGGINGFACE_API_KEY")?),
                api_base: get(
                    "HUGGINGFACE_API_BASE",
                    Some("https://api-inference.huggingface.co"),
                )?,
                mri_model: get("HUGGINGFACE_MODEL_MRI", Some(DEFAULT_CLASSIFIER_MODEL))?,
                xray_model: get("HUGGINGFACE_MODEL_XRAY", Some(DEFAULT_CLASSIFIER_MODEL))?,
                timeout_secs,
            },
            groq: GroqConfig {
                api_key: Secret::new(require(&lookup, "GROQ_API_KEY")?),
                api_base: get("GROQ_API_BASE", Some("https://api.groq.com"))?,
                model: get("GROQ_MODEL", Some(DEFAULT_CHAT_MODEL))?,
                temperature: parse_or(
                    &get("GROQ_TEMPERATURE", Some(&DEFAULT_TEMPERATURE.to_string()))?,
                    DEFAULT_TEMPERATURE,
                ),
                max_tokens: parse_or(
                    &get("GROQ_MAX_TOKENS", Some(&DEFAULT_MAX_TOKENS.to_string()))?,
                    DEFAULT_MAX_TOKENS,
                ),
                timeout_secs,
            },
            upload: UploadConfig {
                max_bytes: parse_or(
                    &get(
                        "UPLOAD_MAX_BYTES",
                        Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                    )?,
                    DEFAULT_MAX_UPLOAD_BYTES,
                ),
            },
            preprocessing: PreprocessingConfig {
                target_size: CLASSIFIER_INPUT_SIZE,
                normalize: parse_or(&get("IMAGE_NORMALIZE", Some("true"))?, true),
            },
            otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|v| !v.is_empty()),
            common,
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: &str, fallback: T) -> T {
    value.trim().parse().unwrap_or(fallback)
}

/// Credentials have no default in any environment.
fn require<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} environment variable is not set",
            key
        ))),
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if let Some(def) = default {
                if is_prod {
                    tracing::warn!(key, default = def, "Using default value in production");
                }
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn common() -> core_config::Config {
        core_config::Config {
            port: 0,
            environment: "test".to_string(),
        }
    }

    fn load(vars: &[(&str, &str)]) -> Result<AnalysisConfig, AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AnalysisConfig::from_source(common(), |key| map.get(key).cloned())
    }

    const KEYS: [(&str, &str); 2] = [("HUGGINGFACE_API_KEY", "hf-key"), ("GROQ_API_KEY", "groq-key")];

    #[test]
    fn defaults_match_reference_pipeline() {
        let config = load(&KEYS).unwrap();

        assert_eq!(config.huggingface.api_key.expose_secret(), "hf-key");
        assert_eq!(config.huggingface.model_for(Modality::Mri), "microsoft/resnet-50");
        assert_eq!(config.huggingface.model_for(Modality::Xray), "microsoft/resnet-50");
        assert_eq!(config.groq.model, "llama-3.3-70b-versatile");
        assert!((config.groq.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.groq.max_tokens, 700);
        assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.preprocessing.target_size, 224);
        assert!(config.preprocessing.normalize);
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn missing_huggingface_key_fails_fast() {
        let err = load(&[("GROQ_API_KEY", "groq-key")]).unwrap_err();

        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("HUGGINGFACE_API_KEY"));
    }

    #[test]
    fn blank_groq_key_counts_as_missing() {
        let err = load(&[("HUGGINGFACE_API_KEY", "hf-key"), ("GROQ_API_KEY", "  ")]).unwrap_err();

        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn overrides_are_applied_and_bad_numbers_fall_back() {
        let mut vars = KEYS.to_vec();
        vars.extend([
            ("HUGGINGFACE_MODEL_XRAY", "custom/xray-model"),
            ("GROQ_MAX_TOKENS", "1024"),
            ("GROQ_TEMPERATURE", "not-a-number"),
            ("IMAGE_NORMALIZE", "false"),
            ("OTLP_ENDPOINT", "http://tempo:4317"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.huggingface.model_for(Modality::Xray), "custom/xray-model");
        assert_eq!(config.groq.max_tokens, 1024);
        assert!((config.groq.temperature - 0.7).abs() < f32::EPSILON);
        assert!(!config.preprocessing.normalize);
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://tempo:4317"));
    }
}
