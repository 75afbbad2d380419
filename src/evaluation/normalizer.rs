// src/evaluation/normalizer.rs
//! Input canonicalization
//!
//! Brings single trials and batches into one shape: a row-major list of
//! trials whose EMG is (samples x channels) and whose torque is
//! (samples x outputs), together with the arrangement of the original batch.

use ndarray::Array2;
use tracing::debug;

use crate::config::Orientation;
use crate::error::{EvalError, EvalResult};

/// One canonical EMG/torque pair
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    /// EMG amplitude, (samples x channels)
    pub emg: Array2<f64>,
    /// Measured torque, (samples x outputs)
    pub torque: Array2<f64>,
}

impl Trial {
    pub fn samples(&self) -> usize {
        self.emg.nrows()
    }

    pub fn channels(&self) -> usize {
        self.emg.ncols()
    }

    pub fn outputs(&self) -> usize {
        self.torque.ncols()
    }
}

/// Trials in row-major order of the batch arrangement
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBatch {
    /// Arrangement of the caller's batch; `(1, 1)` for a single trial
    pub shape: (usize, usize),
    pub trials: Vec<Trial>,
}

impl NormalizedBatch {
    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Common (samples, channels, outputs) of every trial
    pub fn trial_dims(&self) -> Option<(usize, usize, usize)> {
        self.trials
            .first()
            .map(|t| (t.samples(), t.channels(), t.outputs()))
    }
}

/// Normalize a single EMG/torque pair into a batch of one
pub fn normalize_single(
    emg: &Array2<f64>,
    torque: &Array2<f64>,
    orientation: Orientation,
) -> EvalResult<NormalizedBatch> {
    let trial = canonical_trial(emg, torque, orientation)?;
    Ok(NormalizedBatch { shape: (1, 1), trials: vec![trial] })
}

/// Normalize a batch of EMG/torque pairs.
///
/// Both arrangements must match, every EMG trial must have the shape of the
/// first EMG trial, and likewise for torque.
pub fn normalize_batch(
    emg: &Array2<Array2<f64>>,
    torque: &Array2<Array2<f64>>,
    orientation: Orientation,
) -> EvalResult<NormalizedBatch> {
    if emg.dim() != torque.dim() {
        return Err(EvalError::shape_mismatch("batch arrangement", emg.dim(), torque.dim()));
    }

    let (Some(first_emg), Some(first_torque)) = (emg.iter().next(), torque.iter().next()) else {
        return Err(EvalError::TooFewArguments { missing: "trials".to_string() });
    };

    let mut trials = Vec::with_capacity(emg.len());
    for (index, (trial_emg, trial_torque)) in emg.iter().zip(torque.iter()).enumerate() {
        if trial_emg.dim() != first_emg.dim() {
            return Err(EvalError::shape_mismatch(
                &format!("EMG amplitude of trial {}", index),
                first_emg.dim(),
                trial_emg.dim(),
            ));
        }
        if trial_torque.dim() != first_torque.dim() {
            return Err(EvalError::shape_mismatch(
                &format!("torque of trial {}", index),
                first_torque.dim(),
                trial_torque.dim(),
            ));
        }
        trials.push(canonical_trial(trial_emg, trial_torque, orientation)?);
    }

    Ok(NormalizedBatch { shape: emg.dim(), trials })
}

fn canonical_trial(
    emg: &Array2<f64>,
    torque: &Array2<f64>,
    orientation: Orientation,
) -> EvalResult<Trial> {
    let (emg, torque) = match orientation {
        Orientation::Auto => (canonical_emg(emg), canonical_torque(torque)),
        Orientation::AsGiven => (emg.clone(), torque.clone()),
    };

    if emg.nrows() != torque.nrows() {
        return Err(EvalError::shape_mismatch(
            "trial sample count (EMG vs torque)",
            emg.dim(),
            torque.dim(),
        ));
    }
    if emg.is_empty() || torque.is_empty() {
        return Err(EvalError::shape_mismatch("empty trial", emg.dim(), torque.dim()));
    }

    Ok(Trial { emg, torque })
}

/// Channels are the narrow axis of EMG
fn canonical_emg(emg: &Array2<f64>) -> Array2<f64> {
    if emg.ncols() > emg.nrows() {
        debug!(shape = ?emg.dim(), "transposing EMG amplitude to (samples x channels)");
        emg.t().to_owned()
    } else {
        emg.clone()
    }
}

/// Samples are the long axis of torque
fn canonical_torque(torque: &Array2<f64>) -> Array2<f64> {
    if torque.nrows() < torque.ncols() {
        debug!(shape = ?torque.dim(), "transposing torque to (samples x outputs)");
        torque.t().to_owned()
    } else {
        torque.clone()
    }
}
