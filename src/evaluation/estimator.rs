// src/evaluation/estimator.rs
//! Model application and time re-alignment

use ndarray::{Array2, ArrayView2};

use crate::error::{EvalError, EvalResult};
use crate::evaluation::normalizer::Trial;
use crate::model::{DesignMatrixBuilder, ModelCoefficients, ModelParams};

/// Estimate and target, both with the full length of the input trial
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedEstimate {
    /// Predicted torque, (samples x outputs)
    pub estimate: Array2<f64>,
    /// Measured torque aligned with `estimate`
    pub target: Array2<f64>,
}

/// Apply `coefficients` to one trial.
///
/// The first `Q + ii` samples cannot be predicted; they are filled with the
/// first predicted row (and the first target row respectively), so both
/// outputs line up sample-for-sample with the input torque.
pub fn estimate_trial<B>(
    builder: &B,
    trial: &Trial,
    coefficients: &ModelCoefficients,
    params: &ModelParams,
) -> EvalResult<AlignedEstimate>
where
    B: DesignMatrixBuilder + ?Sized,
{
    let design = builder.build(trial.emg.view(), trial.torque.view(), params)?;

    let lead_in = params.lead_in();
    let rows = trial.samples().saturating_sub(lead_in);

    if design.a.dim() != (rows, coefficients.regressors()) {
        return Err(EvalError::dimension_mismatch(
            "design matrix",
            format!("{:?}", (rows, coefficients.regressors())),
            format!("{:?}", design.a.dim()),
        ));
    }
    if design.b1.dim() != (rows, trial.outputs()) {
        return Err(EvalError::dimension_mismatch(
            "design target",
            format!("{:?}", (rows, trial.outputs())),
            format!("{:?}", design.b1.dim()),
        ));
    }
    if rows == 0 {
        return Err(EvalError::InvalidRange {
            start: lead_in + 1,
            end: trial.samples(),
            samples: trial.samples(),
        });
    }

    let raw = design.a.dot(&coefficients.view());

    Ok(AlignedEstimate {
        estimate: pad_leading(raw.view(), lead_in),
        target: pad_leading(design.b1.view(), lead_in),
    })
}

/// Prepend `count` copies of the first row
fn pad_leading(rows: ArrayView2<'_, f64>, count: usize) -> Array2<f64> {
    let (n, cols) = rows.dim();
    Array2::from_shape_fn((n + count, cols), |(r, c)| rows[[r.saturating_sub(count), c]])
}
