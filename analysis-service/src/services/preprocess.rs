//! Image normalisation for the classifier.
//!
//! Decodes whatever the user uploaded, stretches it to a fixed square,
//! optionally stretches contrast, and re-encodes as JPEG.

use crate::config::PreprocessingConfig;
use crate::models::{PreparedImage, UploadedImage};
use crate::services::error::AnalysisError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, RgbImage};

const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Default)]
pub struct ImagePreprocessor {
    config: PreprocessingConfig,
}

impl ImagePreprocessor {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    /// Decode, resize to `target_size`², normalise and encode as JPEG.
    ///
    /// Aspect ratio is not preserved. CPU-bound; call from a blocking task.
    pub fn prepare(&self, upload: &UploadedImage) -> Result<PreparedImage, AnalysisError> {
        let decoded = image::load_from_memory(&upload.bytes)
            .map_err(|e| AnalysisError::ImageDecode(e.to_string()))?;

        let size = self.config.target_size;
        let mut rgb = decoded
            .resize_exact(size, size, FilterType::Triangle)
            .to_rgb8();

        if self.config.normalize {
            stretch_contrast(&mut rgb);
        }

        let mut buffer: Vec<u8> = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(|e| AnalysisError::Internal(format!("JPEG encoding failed: {}", e)))?;

        tracing::debug!(
            source_width = decoded.width(),
            source_height = decoded.height(),
            encoded_bytes = buffer.len(),
            "Image prepared for classification"
        );

        Ok(PreparedImage::new(buffer, rgb.width(), rgb.height()))
    }
}

/// Linear per-channel stretch so each channel spans 0..=255.
/// Flat channels are left untouched.
fn stretch_contrast(img: &mut RgbImage) {
    let mut min = [u8::MAX; 3];
    let mut max = [u8::MIN; 3];

    for pixel in img.pixels() {
        for c in 0..3 {
            min[c] = min[c].min(pixel.0[c]);
            max[c] = max[c].max(pixel.0[c]);
        }
    }

    for pixel in img.pixels_mut() {
        for c in 0..3 {
            let range = max[c].saturating_sub(min[c]);
            if range == 0 {
                continue;
            }
            let shifted = u32::from(pixel.0[c] - min[c]);
            pixel.0[c] = ((shifted * 255 + u32::from(range) / 2) / u32::from(range)) as u8;
        }
    }
}
