use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single label/score pair returned by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Classifier output, ordered by descending score. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    predictions: Vec<Prediction>,
}

impl ClassificationResult {
    /// Sort `predictions` by descending score. Returns `None` for an empty list.
    pub fn from_predictions(mut predictions: Vec<Prediction>) -> Option<Self> {
        if predictions.is_empty() {
            return None;
        }

        predictions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        Some(Self { predictions })
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn top(&self, n: usize) -> &[Prediction] {
        &self.predictions[..n.min(self.predictions.len())]
    }

    /// Mean score of the top `n` predictions, in [0, 1].
    pub fn mean_top_score(&self, n: usize) -> f64 {
        let top = self.top(n);
        top.iter().map(|p| p.score).sum::<f64>() / top.len() as f64
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(result: &ClassificationResult) -> Vec<f64> {
        result.predictions().iter().map(|p| p.score).collect()
    }

    #[test]
    fn predictions_are_sorted_descending() {
        let result = ClassificationResult::from_predictions(vec![
            Prediction::new("a", 0.2),
            Prediction::new("b", 0.9),
            Prediction::new("c", 0.5),
        ])
        .unwrap();

        assert_eq!(scores(&result), vec![0.9, 0.5, 0.2]);
        assert_eq!(result.predictions()[0].label, "b");
    }

    #[test]
    fn empty_predictions_are_rejected() {
        assert!(ClassificationResult::from_predictions(vec![]).is_none());
    }

    #[test]
    fn top_is_capped_at_available_predictions() {
        let result =
            ClassificationResult::from_predictions(vec![Prediction::new("only", 0.4)]).unwrap();

        assert_eq!(result.top(3).len(), 1);
        assert!((result.mean_top_score(3) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn mean_ignores_predictions_beyond_n() {
        let result = ClassificationResult::from_predictions(vec![
            Prediction::new("a", 0.9),
            Prediction::new("b", 0.8),
            Prediction::new("c", 0.7),
            Prediction::new("d", 0.0),
        ])
        .unwrap();

        assert!((result.mean_top_score(3) - 0.8).abs() < 1e-9);
    }
}
