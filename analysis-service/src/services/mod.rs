pub mod analyzer;
pub mod error;
pub mod metrics;
pub mod preprocess;
pub mod prompts;
pub mod providers;
pub mod report;

pub use analyzer::{AnalysisOrchestrator, ModelSelection};
pub use error::{AnalysisError, Stage};
pub use preprocess::ImagePreprocessor;
