// src/evaluation/scorer.rs
//! Error metrics over the scored window
//!
//! | Edist \ Emeth | MAV                      | RMS                          |
//! |---------------|--------------------------|------------------------------|
//! | Component     | mean of \|e\|            | sqrt of mean of e²           |
//! | Distance      | mean of per-step ‖e‖     | sqrt of mean of per-step ‖e‖² |
//!
//! Component means run over both time and output channels.

use ndarray::{s, ArrayView2, Axis};

use crate::config::{ErrorDistance, ErrorMethod};
use crate::error::{EvalError, EvalResult};
use crate::model::ScoringRange;

/// Score `estimate` against `target` over `range`
pub fn score(
    estimate: ArrayView2<'_, f64>,
    target: ArrayView2<'_, f64>,
    range: ScoringRange,
    edist: ErrorDistance,
    emeth: ErrorMethod,
) -> EvalResult<f64> {
    if estimate.dim() != target.dim() {
        return Err(EvalError::shape_mismatch("estimate vs target", target.dim(), estimate.dim()));
    }
    if !range.is_valid() || range.end > estimate.nrows() {
        return Err(EvalError::InvalidRange {
            start: range.start,
            end: range.end,
            samples: estimate.nrows(),
        });
    }

    let rows = range.rows();
    let residual = &estimate.slice(s![rows.clone(), ..]) - &target.slice(s![rows, ..]);

    let value = match edist {
        ErrorDistance::Component => match emeth {
            ErrorMethod::Mav => residual.mapv(f64::abs).mean(),
            ErrorMethod::Rms => residual.mapv(|e| e * e).mean().map(f64::sqrt),
        },
        ErrorDistance::Distance => {
            let squared_distance = residual.mapv(|e| e * e).sum_axis(Axis(1));
            match emeth {
                ErrorMethod::Mav => squared_distance.mapv(f64::sqrt).mean(),
                ErrorMethod::Rms => squared_distance.mean().map(f64::sqrt),
            }
        }
    };

    value.ok_or_else(|| {
        EvalError::dimension_mismatch("scored window", "at least one output", format!("{:?}", residual.dim()))
    })
}
