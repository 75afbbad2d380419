// src/config/mod.rs
//! Evaluation options and configuration loading

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};
use crate::utils::validation::{validate_enum, ValidationError};

/// How multi-output errors are combined (`Edist`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorDistance {
    /// Each output channel contributes independently
    Component,
    /// Euclidean distance across output channels at each time step
    Distance,
}

/// Statistical reduction applied over the scored window (`Emeth`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMethod {
    /// Root mean square
    Rms,
    /// Mean absolute value
    Mav,
}

/// Matrix orientation handling on ingestion
///
/// `Auto` guesses from the shape: EMG is transposed when it has more columns
/// than rows, torque when it has fewer rows than columns. The guess is wrong
/// for trials with fewer samples than channels; use `AsGiven` for those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Auto,
    AsGiven,
}

/// Complete evaluation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "defaults::edist")]
    pub edist: ErrorDistance,

    #[serde(default = "defaults::emeth")]
    pub emeth: ErrorMethod,

    #[serde(default = "defaults::orientation")]
    pub orientation: Orientation,
}

/// Default value providers
mod defaults {
    use super::{ErrorDistance, ErrorMethod, Orientation};

    pub fn edist() -> ErrorDistance { ErrorDistance::Component }
    pub fn emeth() -> ErrorMethod { ErrorMethod::Rms }
    pub fn orientation() -> Orientation { Orientation::Auto }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            edist: defaults::edist(),
            emeth: defaults::emeth(),
            orientation: defaults::orientation(),
        }
    }
}

impl EvaluationConfig {
    /// Parse a flat name/value option list such as
    /// `["Edist", "Distance", "Emeth", "MAV"]`.
    ///
    /// Names and values match case-insensitively; a later pair overrides an
    /// earlier one for the same option. Omitted options keep their defaults.
    pub fn from_option_pairs(args: &[&str]) -> EvalResult<Self> {
        if args.len() % 2 != 0 {
            return Err(EvalError::MalformedOptions { count: args.len() });
        }

        let mut config = Self::default();
        for pair in args.chunks_exact(2) {
            let (name, value) = (pair[0], pair[1]);
            match validate_enum(name, &options::KNOWN_OPTIONS, "option") {
                Ok(0) => config.edist = value.parse::<ErrorDistance>()?,
                Ok(_) => config.emeth = value.parse::<ErrorMethod>()?,
                Err(_) => return Err(EvalError::UnknownOption { name: name.to_string() }),
            }
        }
        Ok(config)
    }

    /// Load from the default file locations and `EMG_EVAL_*` environment
    /// variables
    pub fn load() -> EvalResult<Self> {
        Ok(ConfigLoader::new().load()?)
    }

    /// Builder-style setter for `Edist`
    pub fn with_edist(mut self, edist: ErrorDistance) -> Self {
        self.edist = edist;
        self
    }

    /// Builder-style setter for `Emeth`
    pub fn with_emeth(mut self, emeth: ErrorMethod) -> Self {
        self.emeth = emeth;
        self
    }

    /// Builder-style setter for orientation handling
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

impl FromStr for ErrorDistance {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match validate_enum(s, &options::EDIST_VALUES, options::EDIST)? {
            0 => Ok(ErrorDistance::Component),
            _ => Ok(ErrorDistance::Distance),
        }
    }
}

impl FromStr for ErrorMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match validate_enum(s, &options::EMETH_VALUES, options::EMETH)? {
            0 => Ok(ErrorMethod::Rms),
            _ => Ok(ErrorMethod::Mav),
        }
    }
}

impl fmt::Display for ErrorDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDistance::Component => write!(f, "Component"),
            ErrorDistance::Distance => write!(f, "Distance"),
        }
    }
}

impl fmt::Display for ErrorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMethod::Rms => write!(f, "RMS"),
            ErrorMethod::Mav => write!(f, "MAV"),
        }
    }
}
