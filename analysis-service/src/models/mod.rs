pub mod classification;
pub mod report;
pub mod scan;

pub use classification::{ClassificationResult, Prediction};
pub use report::{AnalysisReport, AnalysisResponse};
pub use scan::{Modality, PreparedImage, UploadedImage};
