use serde::Serialize;
use std::fmt;

/// Final text returned to the caller. Built once by the report composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnalysisReport(String);

impl AnalysisReport {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response body of `POST /api/analyze-image`.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: AnalysisReport,
}
