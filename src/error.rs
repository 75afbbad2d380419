// src/error.rs
//! Unified error handling for FIR model evaluation
//!
//! Every failure in this crate is an input-validation failure detected before
//! any trial is scored. There are no transient or retryable errors: a caller
//! receiving an [`EvalError`] must fix its inputs and call again.

use thiserror::Error;

use crate::config::ConfigError;
use crate::utils::validation::ValidationError;

/// Unified error type for the evaluation pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A required input was not supplied
    #[error("Too few arguments: missing required input '{missing}'")]
    TooFewArguments { missing: String },

    /// Batch arrangement or per-trial shapes are inconsistent
    #[error("Shape mismatch in {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Model parameters `[Q, D, Tol, ii]` are malformed
    #[error("Invalid model parameters: {reason}")]
    InvalidParams { reason: String },

    /// Trim `[head, tail]` is malformed
    #[error("Invalid trim: {reason}")]
    InvalidTrim { reason: String },

    /// The option list has an odd number of entries
    #[error("Malformed options: expected name/value pairs, got {count} arguments")]
    MalformedOptions { count: usize },

    /// Option name outside the recognized set
    #[error("Unknown option '{name}'")]
    UnknownOption { name: String },

    /// Recognized option with a value outside its enumerated set
    #[error("Invalid value '{value}' for option '{name}', valid values: [{}]", .valid.join(", "))]
    InvalidOptionValue {
        name: String,
        value: String,
        valid: Vec<String>,
    },

    /// The scored window is empty or inverted (1-based, inclusive bounds)
    #[error("Invalid scoring range [{start}, {end}] for a trial of {samples} samples")]
    InvalidRange {
        start: usize,
        end: usize,
        samples: usize,
    },

    /// Coefficients and design matrix are dimensionally incompatible
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: String,
        actual: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    /// Shorthand for a shape mismatch between two `(rows, cols)` shapes
    pub fn shape_mismatch(what: &str, expected: (usize, usize), actual: (usize, usize)) -> Self {
        EvalError::ShapeMismatch {
            what: what.to_string(),
            expected,
            actual,
        }
    }

    /// Shorthand for a dimension mismatch
    pub fn dimension_mismatch(
        what: &str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        EvalError::DimensionMismatch {
            what: what.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl From<ValidationError> for EvalError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidEnumValue { field, value, valid_values } => {
                EvalError::InvalidOptionValue {
                    name: field,
                    value,
                    valid: valid_values,
                }
            }
            ValidationError::UnknownField(name) => EvalError::UnknownOption { name },
            other if other.field().starts_with("trim") => EvalError::InvalidTrim {
                reason: other.to_string(),
            },
            other => EvalError::InvalidParams {
                reason: other.to_string(),
            },
        }
    }
}
