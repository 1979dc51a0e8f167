//! Report composition: confidence summary, narrative, disclaimer.

use crate::models::{AnalysisReport, ClassificationResult, Modality};

/// Number of top predictions averaged into the confidence summary.
pub const SUMMARY_TOP_N: usize = 3;

pub const DISCLAIMER: &str = "Important Note: This analysis is provided for informational purposes only. It is not a substitute for professional medical advice, diagnosis, or treatment. Always seek the advice of your physician or other qualified health provider with any questions you may have regarding a medical condition.";

/// Mean of the top-3 scores as a percentage with two decimals, e.g. `80.00`.
pub fn average_confidence(classification: &ClassificationResult) -> String {
    format!(
        "{:.2}",
        classification.mean_top_score(SUMMARY_TOP_N) * 100.0
    )
}

/// Preliminary section derived from the classifier alone.
pub fn initial_summary(modality: Modality, classification: &ClassificationResult) -> String {
    format!(
        "Initial Analysis of {} Image:\n\n\
         Key Findings:\n\
         Image Quality Assessment: {}% confidence in image clarity\n\
         Note: This is a preliminary assessment. A detailed analysis follows below.\n",
        modality.display_name(),
        average_confidence(classification)
    )
}

/// Summary, narrative and disclaimer, always in that order.
pub fn compose(
    modality: Modality,
    classification: &ClassificationResult,
    narrative: &str,
) -> AnalysisReport {
    AnalysisReport::new(format!(
        "{}\nPatient-Friendly Analysis:\n{}\n\n{}",
        initial_summary(modality, classification),
        narrative.trim_end(),
        DISCLAIMER
    ))
}
