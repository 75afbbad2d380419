//! Common utility functions for the evaluator
//!
//! - Validation of numeric parameter arrays and enumerated option values

pub mod validation;

pub use validation::{
    validate_array_size,
    validate_count,
    validate_enum,
    ValidationError,
    ValidationResult,
};
