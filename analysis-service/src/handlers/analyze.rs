use crate::models::{AnalysisResponse, Modality, UploadedImage};
use crate::services::AnalysisError;
use crate::startup::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

const IMAGE_FIELD: &str = "image";
const TYPE_FIELD: &str = "type";

/// Raw form contents before validation.
#[derive(Debug, Default)]
struct AnalyzeForm {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Option<Vec<u8>>,
    oversized: bool,
    /// The body hit the transport limit; later fields were never read.
    truncated: bool,
    image_type: Option<String>,
}

impl AnalyzeForm {
    /// Boundary checks, in order: presence, MIME prefix, size, modality.
    fn validate(self, max_bytes: usize) -> Result<UploadedImage, AnalysisError> {
        // A truncated body can still be judged on the image headers already seen.
        if self.truncated {
            return match self.content_type.as_deref() {
                Some(ct) if !ct.starts_with("image/") => Err(invalid_type()),
                _ => Err(AnalysisError::InputValidation(size_message(max_bytes))),
            };
        }

        let (bytes, image_type) = match (self.bytes, self.image_type) {
            (Some(bytes), Some(image_type)) if !image_type.trim().is_empty() => {
                (bytes, image_type)
            }
            _ => {
                return Err(AnalysisError::InputValidation(
                    "Missing image or type".to_string(),
                ))
            }
        };

        let mime_type = self.content_type.unwrap_or_default();
        if !mime_type.starts_with("image/") {
            return Err(invalid_type());
        }

        if self.oversized || bytes.len() > max_bytes {
            return Err(AnalysisError::InputValidation(size_message(max_bytes)));
        }

        let modality: Modality = image_type
            .trim()
            .parse()
            .map_err(AnalysisError::InputValidation)?;

        Ok(UploadedImage {
            bytes,
            mime_type,
            modality,
            file_name: self.file_name.unwrap_or_else(|| "unnamed".to_string()),
        })
    }
}

fn invalid_type() -> AnalysisError {
    AnalysisError::InputValidation("Invalid file type. Please upload an image file.".to_string())
}

/// Limit rendered in whole MB, or KB below one MiB. Rounded up.
fn size_message(max_bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * KIB;

    let limit = if max_bytes >= MIB {
        format!("{}MB", max_bytes.div_ceil(MIB))
    } else {
        format!("{}KB", max_bytes.div_ceil(KIB))
    };
    format!("File size too large. Maximum size is {}.", limit)
}

/// Collect the `image` and `type` fields. The image is read chunk by chunk
/// and dropped as soon as it passes `max_bytes`.
async fn read_fields(
    multipart: &mut Multipart,
    max_bytes: usize,
    form: &mut AnalyzeForm,
) -> Result<(), MultipartError> {
    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(IMAGE_FIELD) => {
                form.file_name = field.file_name().map(|s| s.to_string());
                form.content_type = field.content_type().map(|s| s.to_string());

                let mut data = Vec::new();
                while let Some(chunk) = field.chunk().await? {
                    if data.len() + chunk.len() > max_bytes {
                        form.oversized = true;
                        break;
                    }
                    data.extend_from_slice(&chunk);
                }
                form.bytes = Some(data);
            }
            Some(TYPE_FIELD) => {
                form.image_type = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(())
}

async fn read_form(multipart: &mut Multipart, max_bytes: usize) -> Result<AnalyzeForm, AnalysisError> {
    let mut form = AnalyzeForm::default();

    match read_fields(multipart, max_bytes, &mut form).await {
        Ok(()) => Ok(form),
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            form.truncated = true;
            Ok(form)
        }
        Err(e) => Err(AnalysisError::InputValidation(format!(
            "Failed to read multipart field: {}",
            e
        ))),
    }
}

/// `POST /api/analyze-image`
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| {
        AppError::from(AnalysisError::InputValidation(format!(
            "Expected a multipart form: {}",
            e
        )))
    })?;

    let max_bytes = state.config.upload.max_bytes;
    let upload = read_form(&mut multipart, max_bytes)
        .await
        .and_then(|form| form.validate(max_bytes))?;

    tracing::info!(
        file_name = %upload.file_name,
        file_type = %upload.mime_type,
        file_size = upload.size(),
        image_type = %upload.modality,
        "Processing image"
    );

    let analysis = state.analyzer.analyze(upload).await?;

    Ok(Json(AnalysisResponse { analysis }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(content_type: Option<&str>, size: usize, image_type: Option<&str>) -> AnalyzeForm {
        AnalyzeForm {
            file_name: Some("scan.png".to_string()),
            content_type: content_type.map(str::to_string),
            bytes: Some(vec![0u8; size]),
            oversized: false,
            truncated: false,
            image_type: image_type.map(str::to_string),
        }
    }

    fn message(result: Result<UploadedImage, AnalysisError>) -> String {
        match result {
            Err(AnalysisError::InputValidation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_valid_form() {
        let upload = form(Some("image/png"), 10, Some("xray"))
            .validate(1024)
            .unwrap();

        assert_eq!(upload.modality, Modality::Xray);
        assert_eq!(upload.mime_type, "image/png");
        assert_eq!(upload.size(), 10);
    }

    #[test]
    fn missing_fields_are_rejected_first() {
        let mut no_image = form(Some("text/plain"), 10, Some("mri"));
        no_image.bytes = None;

        assert_eq!(message(no_image.validate(1024)), "Missing image or type");
        assert_eq!(
            message(form(Some("image/png"), 10, None).validate(1024)),
            "Missing image or type"
        );
    }

    #[test]
    fn non_image_mime_is_rejected_before_size() {
        assert_eq!(
            message(form(Some("application/pdf"), 4096, Some("mri")).validate(1024)),
            "Invalid file type. Please upload an image file."
        );
        assert_eq!(
            message(form(None, 10, Some("mri")).validate(1024)),
            "Invalid file type. Please upload an image file."
        );
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let max = 10 * 1024 * 1024;

        assert_eq!(
            message(form(Some("image/jpeg"), max + 1, Some("mri")).validate(max)),
            "File size too large. Maximum size is 10MB."
        );

        let mut truncated = form(Some("image/jpeg"), 10, Some("mri"));
        truncated.oversized = true;
        assert!(message(truncated.validate(max)).starts_with("File size too large"));
    }

    #[test]
    fn exactly_max_size_is_accepted() {
        assert!(form(Some("image/jpeg"), 1024, Some("mri"))
            .validate(1024)
            .is_ok());
    }

    #[test]
    fn unknown_modality_is_rejected() {
        assert!(message(form(Some("image/png"), 10, Some("ct")).validate(1024))
            .contains("Expected 'mri' or 'xray'"));
    }

    #[test]
    fn truncated_body_with_non_image_type_reports_mime_first() {
        let mut truncated = form(Some("application/pdf"), 10, None);
        truncated.truncated = true;

        assert_eq!(
            message(truncated.validate(1024 * 1024)),
            "Invalid file type. Please upload an image file."
        );
    }

    #[test]
    fn truncated_body_with_image_type_reports_size() {
        let mut truncated = form(Some("image/png"), 10, None);
        truncated.truncated = true;
        assert_eq!(
            message(truncated.validate(10 * 1024 * 1024)),
            "File size too large. Maximum size is 10MB."
        );

        let headerless = AnalyzeForm {
            truncated: true,
            ..Default::default()
        };
        assert!(message(headerless.validate(1024)).starts_with("File size too large"));
    }

    #[test]
    fn size_message_never_rounds_to_zero() {
        assert_eq!(size_message(10 * 1024 * 1024), "File size too large. Maximum size is 10MB.");
        assert_eq!(size_message(500_000), "File size too large. Maximum size is 489KB.");
        assert_eq!(size_message(1536 * 1024), "File size too large. Maximum size is 2MB.");
        assert_eq!(size_message(1), "File size too large. Maximum size is 1KB.");
    }
}
