//! Validation utilities for evaluation inputs
//!
//! Provides the checks shared by model parameters, trim and option parsing:
//! - Fixed-length numeric arrays
//! - Integral, range-bounded numeric fields
//! - Case-insensitive enumerated string values
//!
//! Field names follow a dotted path (`params.q`, `trim.head`) so that
//! callers can map failures onto the right error kind.

use thiserror::Error;

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Value out of valid range
    #[error("Field '{field}' value '{value}' is out of range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },
    /// Invalid field format
    #[error("Field '{field}' has invalid format '{value}', expected {expected}")]
    InvalidFormat {
        field: String,
        value: String,
        expected: String,
    },
    /// Array size violation
    #[error("Field '{field}' array size {actual} doesn't match expected {expected}")]
    InvalidArraySize {
        field: String,
        actual: usize,
        expected: usize,
    },
    /// Invalid enum value
    #[error("Field '{field}' value '{value}' is invalid, valid values: [{}]", .valid_values.join(", "))]
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// Field name not recognized
    #[error("Unknown field '{0}'")]
    UnknownField(String),
}

impl ValidationError {
    /// Name of the field the error refers to
    pub fn field(&self) -> &str {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::InvalidArraySize { field, .. }
            | ValidationError::InvalidEnumValue { field, .. } => field,
            ValidationError::UnknownField(field) => field,
        }
    }
}

/// Validate that a numeric array has exactly `expected` elements
pub fn validate_array_size<T>(array: &[T], expected: usize, field: &str) -> ValidationResult<()> {
    if array.len() != expected {
        return Err(ValidationError::InvalidArraySize {
            field: field.to_string(),
            actual: array.len(),
            expected,
        });
    }
    Ok(())
}

/// Validate that `value` is a finite whole number no smaller than `min`
/// that fits in `usize`, returning it as a count.
pub fn validate_count(value: f64, min: usize, field: &str) -> ValidationResult<usize> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            value: value.to_string(),
            expected: "a finite integer".to_string(),
        });
    }
    // usize::MAX rounds up to 2^64 as f64, so equality is already too large
    if value < min as f64 || value >= usize::MAX as f64 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: usize::MAX.to_string(),
        });
    }
    Ok(value as usize)
}

/// Match `value` case-insensitively against `valid`, returning the index of
/// the matching entry.
pub fn validate_enum(value: &str, valid: &[&str], field: &str) -> ValidationResult<usize> {
    valid
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| ValidationError::InvalidEnumValue {
            field: field.to_string(),
            value: value.to_string(),
            valid_values: valid.iter().map(|v| v.to_string()).collect(),
        })
}
