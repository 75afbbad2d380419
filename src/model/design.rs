// src/model/design.rs
//! Regression design matrix construction
//!
//! The evaluator only relies on the shape contract of [`DesignMatrixBuilder`]:
//! for a trial of `N` samples, `a` has `N - Q - ii` rows and
//! `(Q + 1) * channels * D` columns, and `b1` holds the matching torque rows.

use ndarray::{s, Array2, ArrayView2};

use crate::error::{EvalError, EvalResult};
use crate::model::ModelParams;

/// Design matrix and aligned target torque for one trial
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    /// Regressors, one row per predictable sample
    pub a: Array2<f64>,
    /// Target torque rows corresponding to `a`
    pub b1: Array2<f64>,
}

/// Builds the regression problem for one trial.
///
/// `emg` is (samples x channels) and `torque` is (samples x outputs), both
/// already in canonical orientation.
pub trait DesignMatrixBuilder: Send + Sync {
    fn build(
        &self,
        emg: ArrayView2<'_, f64>,
        torque: ArrayView2<'_, f64>,
        params: &ModelParams,
    ) -> EvalResult<DesignMatrix>;
}

impl<F> DesignMatrixBuilder for F
where
    F: Fn(ArrayView2<'_, f64>, ArrayView2<'_, f64>, &ModelParams) -> EvalResult<DesignMatrix>
        + Send
        + Sync,
{
    fn build(
        &self,
        emg: ArrayView2<'_, f64>,
        torque: ArrayView2<'_, f64>,
        params: &ModelParams,
    ) -> EvalResult<DesignMatrix> {
        self(emg, torque, params)
    }
}

/// Lagged polynomial FIR regressors.
///
/// Row `r` targets torque sample `t = r + Q + ii` and uses EMG samples
/// `t - ii - q` for `q = 0..=Q`, each raised to powers `1..=D`. Columns are
/// ordered channel-major, then power, then lag:
/// `col = (c * D + (p - 1)) * (Q + 1) + q`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaggedPolynomialDesign;

impl LaggedPolynomialDesign {
    /// Column index of (channel, power, lag)
    pub fn column(params: &ModelParams, channel: usize, power: usize, lag: usize) -> usize {
        (channel * params.degree + (power - 1)) * (params.lag_taps + 1) + lag
    }
}

impl DesignMatrixBuilder for LaggedPolynomialDesign {
    fn build(
        &self,
        emg: ArrayView2<'_, f64>,
        torque: ArrayView2<'_, f64>,
        params: &ModelParams,
    ) -> EvalResult<DesignMatrix> {
        let samples = emg.nrows();
        let lead_in = params.lead_in();

        if torque.nrows() != samples {
            return Err(EvalError::shape_mismatch("design torque", emg.dim(), torque.dim()));
        }
        if samples <= lead_in {
            return Err(EvalError::InvalidRange { start: lead_in.saturating_add(1), end: samples, samples });
        }

        let rows = samples - lead_in;
        let taps = params.lag_taps + 1;
        let cols = params.design_columns(emg.ncols())?;

        let a = Array2::from_shape_fn((rows, cols), |(r, col)| {
            let lag = col % taps;
            let power = (col / taps) % params.degree + 1;
            let channel = col / taps / params.degree;
            emg[[r + params.lag_taps - lag, channel]].powi(power as i32)
        });
        let b1 = torque.slice(s![lead_in.., ..]).to_owned();

        Ok(DesignMatrix { a, b1 })
    }
}
