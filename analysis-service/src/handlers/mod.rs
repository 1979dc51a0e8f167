//! HTTP handlers for the analysis service.

pub mod analyze;
pub mod health;
pub mod metrics;
pub mod page;

pub use analyze::analyze_image;
pub use health::{health_check, readiness_check};
pub use page::index;
