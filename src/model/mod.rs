// src/model/mod.rs
//! Fitted FIR model description
//!
//! A model is a coefficient matrix plus the lag structure it was fitted with.
//! Neither is interpreted here beyond dimension checks; the design matrix
//! builder in [`design`] owns the meaning of each coefficient row.

pub mod design;

pub use design::{DesignMatrix, DesignMatrixBuilder, LaggedPolynomialDesign};

use std::ops::Range;

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::config::constants::model;
use crate::error::{EvalError, EvalResult};
use crate::utils::validation::{validate_array_size, validate_count};

/// Model structure parameters `[Q, D, Tol, ii]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// `Q`: number of lag taps
    pub lag_taps: usize,
    /// `D`: polynomial degree of the amplitude non-linearity
    pub degree: usize,
    /// `Tol`: fitting tolerance, carried through but unused during evaluation
    pub tolerance: f64,
    /// `ii`: look-ahead horizon in samples
    pub look_ahead: usize,
}

impl ModelParams {
    /// Create validated model parameters
    pub fn new(lag_taps: usize, degree: usize, tolerance: f64, look_ahead: usize) -> EvalResult<Self> {
        if degree < model::MIN_DEGREE {
            return Err(EvalError::InvalidParams {
                reason: format!("D must be at least {}, got {}", model::MIN_DEGREE, degree),
            });
        }
        if lag_taps.checked_add(look_ahead).and_then(|n| n.checked_add(1)).is_none() {
            return Err(EvalError::InvalidParams {
                reason: format!("Q + ii overflows the sample index (Q = {}, ii = {})", lag_taps, look_ahead),
            });
        }
        Ok(Self { lag_taps, degree, tolerance, look_ahead })
    }

    /// Parse the raw `[Q, D, Tol, ii]` vector.
    ///
    /// `Q`, `D` and `ii` must be whole numbers; `Tol` is accepted as-is.
    pub fn from_slice(values: &[f64]) -> EvalResult<Self> {
        validate_array_size(values, model::PARAM_COUNT, "params")?;

        let lag_taps = validate_count(values[0], model::MIN_LAG_TAPS, "params.q")?;
        let degree = validate_count(values[1], model::MIN_DEGREE, "params.d")?;
        let look_ahead = validate_count(values[3], model::MIN_LOOK_AHEAD, "params.ii")?;

        Self::new(lag_taps, degree, values[2], look_ahead)
    }

    /// Number of leading samples the model cannot predict (`Q + ii`).
    ///
    /// Saturates at `usize::MAX`.
    pub fn lead_in(&self) -> usize {
        self.lag_taps.saturating_add(self.look_ahead)
    }

    /// Column count of the design matrix for `channels` EMG channels
    pub fn design_columns(&self, channels: usize) -> EvalResult<usize> {
        self.lag_taps
            .checked_add(1)
            .and_then(|taps| taps.checked_mul(channels))
            .and_then(|n| n.checked_mul(self.degree))
            .ok_or_else(|| EvalError::InvalidParams {
                reason: format!(
                    "design matrix width overflows for Q = {}, D = {}, {} channels",
                    self.lag_taps, self.degree, channels
                ),
            })
    }
}

/// Extra samples excluded from scoring at each end of a trial
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trim {
    pub head: usize,
    pub tail: usize,
}

impl Trim {
    pub fn new(head: usize, tail: usize) -> Self {
        Self { head, tail }
    }

    /// Parse the raw `[head, tail]` vector
    pub fn from_slice(values: &[f64]) -> EvalResult<Self> {
        validate_array_size(values, model::TRIM_COUNT, "trim")?;

        Ok(Self {
            head: validate_count(values[0], 0, "trim.head")?,
            tail: validate_count(values[1], 0, "trim.tail")?,
        })
    }

    /// Scored window for a trial of `samples` samples under `params`.
    ///
    /// Fails with `InvalidRange` when the window is empty, including when
    /// the start index does not fit in `usize`.
    pub fn scoring_range(&self, samples: usize, params: &ModelParams) -> EvalResult<ScoringRange> {
        let end = samples.saturating_sub(self.tail);

        match params.lead_in().checked_add(self.head).and_then(|n| n.checked_add(1)) {
            Some(start) if start <= end => Ok(ScoringRange { start, end }),
            start => Err(EvalError::InvalidRange { start: start.unwrap_or(usize::MAX), end, samples }),
        }
    }
}

/// Inclusive, 1-based sample window used for scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRange {
    pub start: usize,
    pub end: usize,
}

impl ScoringRange {
    /// Validated window; `start` is 1-based and must not exceed `end`
    pub fn new(start: usize, end: usize) -> EvalResult<Self> {
        let range = Self { start, end };
        if !range.is_valid() {
            return Err(EvalError::InvalidRange { start, end, samples: end });
        }
        Ok(range)
    }

    /// Whether the window is non-empty and 1-based
    pub fn is_valid(&self) -> bool {
        self.start >= 1 && self.start <= self.end
    }

    /// Number of scored samples
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end - self.start.max(1) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start.max(1)
    }

    /// Equivalent 0-based half-open row range
    pub fn rows(&self) -> Range<usize> {
        self.start.saturating_sub(1)..self.end
    }
}

/// Fitted coefficients, one column per torque output
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCoefficients {
    weights: Array2<f64>,
}

impl ModelCoefficients {
    pub fn new(weights: Array2<f64>) -> Self {
        Self { weights }
    }

    /// Coefficients of a single-output model
    pub fn from_vector(weights: Array1<f64>) -> Self {
        Self { weights: weights.insert_axis(Axis(1)) }
    }

    /// Number of regressors the coefficients expect
    pub fn regressors(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of torque outputs produced
    pub fn outputs(&self) -> usize {
        self.weights.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }
}

impl From<Array2<f64>> for ModelCoefficients {
    fn from(weights: Array2<f64>) -> Self {
        Self::new(weights)
    }
}

impl From<Array1<f64>> for ModelCoefficients {
    fn from(weights: Array1<f64>) -> Self {
        Self::from_vector(weights)
    }
}
