// src/evaluation/report.rs
//! Serializable evaluation summary

use serde::{Deserialize, Serialize};

use crate::config::{ErrorDistance, ErrorMethod, EvaluationConfig};
use crate::evaluation::{BatchEvaluation, TrialEvaluation};
use crate::model::{ModelParams, ScoringRange, Trim};

/// Summary of one evaluation call, suitable for logging or export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Arrangement of the evaluated batch
    pub batch_shape: (usize, usize),
    /// Per-trial errors in row-major order of the arrangement
    pub errors: Vec<f64>,
    pub mean_error: f64,
    pub min_error: f64,
    pub max_error: f64,
    pub scored_range: ScoringRange,
    pub params: ModelParams,
    pub trim: Trim,
    pub edist: ErrorDistance,
    pub emeth: ErrorMethod,
}

impl EvaluationReport {
    pub fn from_batch(
        evaluation: &BatchEvaluation,
        params: &ModelParams,
        trim: &Trim,
        config: &EvaluationConfig,
    ) -> Self {
        Self::summarize(
            evaluation.errors.dim(),
            evaluation.errors.iter().copied().collect(),
            evaluation.range,
            params,
            trim,
            config,
        )
    }

    pub fn from_single(
        evaluation: &TrialEvaluation,
        params: &ModelParams,
        trim: &Trim,
        config: &EvaluationConfig,
    ) -> Self {
        Self::summarize((1, 1), vec![evaluation.error], evaluation.range, params, trim, config)
    }

    fn summarize(
        batch_shape: (usize, usize),
        errors: Vec<f64>,
        scored_range: ScoringRange,
        params: &ModelParams,
        trim: &Trim,
        config: &EvaluationConfig,
    ) -> Self {
        let count = errors.len().max(1) as f64;
        let mean_error = errors.iter().sum::<f64>() / count;
        let min_error = errors.iter().copied().fold(f64::INFINITY, f64::min);
        let max_error = errors.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            batch_shape,
            errors,
            mean_error,
            min_error,
            max_error,
            scored_range,
            params: *params,
            trim: *trim,
            edist: config.edist,
            emeth: config.emeth,
        }
    }

    /// Render as compact JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Render as indented JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn sample_batch() -> BatchEvaluation {
        BatchEvaluation {
            errors: array![[0.5, 1.5], [1.0, 3.0]],
            estimates: Array2::from_shape_vec((2, 2), vec![Array2::zeros((4, 1)); 4]).unwrap(),
            range: ScoringRange { start: 2, end: 4 },
        }
    }

    #[test]
    fn test_batch_summary() {
        let params = ModelParams::new(1, 1, 0.0, 0).unwrap();
        let report = EvaluationReport::from_batch(
            &sample_batch(),
            &params,
            &Trim::default(),
            &EvaluationConfig::default(),
        );

        assert_eq!(report.batch_shape, (2, 2));
        assert_eq!(report.errors, vec![0.5, 1.5, 1.0, 3.0]);
        assert_eq!(report.mean_error, 1.5);
        assert_eq!(report.min_error, 0.5);
        assert_eq!(report.max_error, 3.0);
    }

    #[test]
    fn test_json_rendering() {
        let params = ModelParams::new(1, 1, 0.0, 0).unwrap();
        let config = EvaluationConfig::default().with_edist(ErrorDistance::Distance);
        let report = EvaluationReport::from_batch(&sample_batch(), &params, &Trim::new(1, 0), &config);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"edist\":\"distance\""));
        assert!(json.contains("\"emeth\":\"rms\""));

        let parsed: EvaluationReport = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, report);
    }
}
