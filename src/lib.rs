//! EMG-FIR-Eval: evaluation of fitted EMG-to-torque FIR models
//!
//! Given the coefficients of a non-linear FIR model fitted elsewhere, this
//! library reconstructs a time-aligned torque estimate from held-out EMG
//! amplitude and scores it against the measured torque. It features:
//!
//! - Single trials or batches of equally-shaped trials
//! - Automatic orientation of EMG and torque matrices
//! - Per-component or Euclidean-distance error, reduced by RMS or MAV
//! - Pluggable design matrix construction
//! - Layered TOML/environment configuration
//!
//! # Quick Start
//!
//! ```rust
//! use emg_fir_eval::{Evaluator, EvaluationConfig, ModelCoefficients, ModelParams, Trim};
//! use ndarray::{array, Array2};
//!
//! # fn main() -> Result<(), emg_fir_eval::EvalError> {
//! let emg = Array2::from_shape_fn((50, 1), |(t, _)| (t as f64 * 0.2).sin() + 1.0);
//! let torque = Array2::from_shape_fn((50, 1), |(t, _)| 2.0 * emg[[t.saturating_sub(1), 0]]);
//!
//! // Q = 0, D = 1, Tol = 0, ii = 1
//! let params = ModelParams::from_slice(&[0.0, 1.0, 0.0, 1.0])?;
//! let coefficients = ModelCoefficients::from_vector(array![2.0]);
//! let config = EvaluationConfig::from_option_pairs(&["Edist", "Component", "Emeth", "MAV"])?;
//!
//! let result = Evaluator::new(config)
//!     .evaluate_single(&coefficients, &emg, &torque, &params, &Trim::new(5, 5))?;
//! assert!(result.error < 1e-12);
//! assert_eq!(result.estimate.dim(), torque.dim());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{ConfigError, ConfigLoader, ErrorDistance, ErrorMethod, EvaluationConfig, Orientation};
pub use error::{EvalError, EvalResult};
pub use evaluation::{
    BatchEvaluation, Evaluation, EvaluationReport, EvaluationRequest, Evaluator, Signals,
    TrialEvaluation,
};
pub use model::{
    DesignMatrix, DesignMatrixBuilder, LaggedPolynomialDesign, ModelCoefficients, ModelParams,
    ScoringRange, Trim,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    let mut features = vec![
        "Single and batched trial evaluation".to_string(),
        "Component and distance error metrics".to_string(),
        "RMS and MAV reductions".to_string(),
        "Pluggable design matrix construction".to_string(),
    ];
    if cfg!(feature = "parallel") {
        features.push("Parallel trial evaluation".to_string());
    }

    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Evaluation of fitted EMG-to-torque FIR models".to_string(),
        features,
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert!(!info.features.is_empty());
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert!(!NAME.is_empty());
    }
}
