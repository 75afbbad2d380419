// src/evaluation/mod.rs
//! Batch evaluation of a fitted FIR model
//!
//! Inputs flow through three stages per call:
//!
//! 1. [`normalizer`] validates shapes and canonicalizes orientation
//! 2. [`estimator`] applies the coefficients and re-aligns the estimate
//! 3. [`scorer`] reduces the residual over the scored window to one scalar
//!
//! All validation happens before the first trial is estimated, so a call
//! either scores every trial or returns an error without partial results.

pub mod estimator;
pub mod normalizer;
pub mod report;
pub mod scorer;

pub use estimator::{estimate_trial, AlignedEstimate};
pub use normalizer::{normalize_batch, normalize_single, NormalizedBatch, Trial};
pub use report::EvaluationReport;
pub use scorer::score;

use ndarray::{Array1, Array2, Axis};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::config::EvaluationConfig;
use crate::error::{EvalError, EvalResult};
use crate::model::{
    DesignMatrixBuilder, LaggedPolynomialDesign, ModelCoefficients, ModelParams, ScoringRange, Trim,
};

/// Result of evaluating one trial
#[derive(Debug, Clone, PartialEq)]
pub struct TrialEvaluation {
    /// Scalar error over the scored window
    pub error: f64,
    /// Torque estimate with the shape of the canonical input torque
    pub estimate: Array2<f64>,
    /// Window the error was computed over
    pub range: ScoringRange,
}

/// Result of evaluating a batch, arranged like the input batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEvaluation {
    pub errors: Array2<f64>,
    pub estimates: Array2<Array2<f64>>,
    /// Window shared by every trial of the batch
    pub range: ScoringRange,
}

impl BatchEvaluation {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Evaluates fitted coefficients against held-out trials
pub struct Evaluator<B = LaggedPolynomialDesign> {
    builder: B,
    config: EvaluationConfig,
}

impl Evaluator<LaggedPolynomialDesign> {
    /// Evaluator using the lagged polynomial design matrix
    pub fn new(config: EvaluationConfig) -> Self {
        Self::with_builder(LaggedPolynomialDesign, config)
    }
}

impl Default for Evaluator<LaggedPolynomialDesign> {
    fn default() -> Self {
        Self::new(EvaluationConfig::default())
    }
}

impl<B: DesignMatrixBuilder> Evaluator<B> {
    /// Evaluator using a caller-supplied design matrix builder
    pub fn with_builder(builder: B, config: EvaluationConfig) -> Self {
        Self { builder, config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluate a single trial
    pub fn evaluate_single(
        &self,
        coefficients: &ModelCoefficients,
        emg: &Array2<f64>,
        torque: &Array2<f64>,
        params: &ModelParams,
        trim: &Trim,
    ) -> EvalResult<TrialEvaluation> {
        let batch = normalize_single(emg, torque, self.config.orientation)?;
        evaluate_normalized(&self.builder, coefficients, batch, params, trim, &self.config)
            .and_then(into_single)
    }

    /// Evaluate a batch of trials
    pub fn evaluate_batch(
        &self,
        coefficients: &ModelCoefficients,
        emg: &Array2<Array2<f64>>,
        torque: &Array2<Array2<f64>>,
        params: &ModelParams,
        trim: &Trim,
    ) -> EvalResult<BatchEvaluation> {
        let batch = normalize_batch(emg, torque, self.config.orientation)?;
        evaluate_normalized(&self.builder, coefficients, batch, params, trim, &self.config)
    }
}

/// EMG or torque input: one matrix, or a batch of matrices
#[derive(Debug, Clone, PartialEq)]
pub enum Signals {
    Single(Array2<f64>),
    Batch(Array2<Array2<f64>>),
}

impl From<Array2<f64>> for Signals {
    fn from(matrix: Array2<f64>) -> Self {
        Signals::Single(matrix)
    }
}

impl From<Array2<Array2<f64>>> for Signals {
    fn from(batch: Array2<Array2<f64>>) -> Self {
        Signals::Batch(batch)
    }
}

impl From<Vec<Array2<f64>>> for Signals {
    /// A list of trials becomes a column batch
    fn from(trials: Vec<Array2<f64>>) -> Self {
        Signals::Batch(Array1::from(trials).insert_axis(Axis(1)))
    }
}

/// Output mirroring the input form of an [`EvaluationRequest`]
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Single(TrialEvaluation),
    Batch(BatchEvaluation),
}

/// A complete, validated evaluation call
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    coefficients: ModelCoefficients,
    emg: Signals,
    torque: Signals,
    params: ModelParams,
    trim: Trim,
    config: EvaluationConfig,
}

impl EvaluationRequest {
    pub fn builder() -> EvaluationRequestBuilder {
        EvaluationRequestBuilder::default()
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Run the request with `builder` supplying design matrices
    pub fn run<B>(&self, builder: &B) -> EvalResult<Evaluation>
    where
        B: DesignMatrixBuilder + ?Sized,
    {
        let orientation = self.config.orientation;
        match (&self.emg, &self.torque) {
            (Signals::Single(emg), Signals::Single(torque)) => {
                let batch = normalize_single(emg, torque, orientation)?;
                evaluate_normalized(builder, &self.coefficients, batch, &self.params, &self.trim, &self.config)
                    .and_then(into_single)
                    .map(Evaluation::Single)
            }
            (Signals::Batch(emg), Signals::Batch(torque)) => {
                let batch = normalize_batch(emg, torque, orientation)?;
                evaluate_normalized(builder, &self.coefficients, batch, &self.params, &self.trim, &self.config)
                    .map(Evaluation::Batch)
            }
            (Signals::Single(_), Signals::Batch(torque)) => {
                Err(EvalError::shape_mismatch("batch arrangement", (1, 1), torque.dim()))
            }
            (Signals::Batch(emg), Signals::Single(_)) => {
                Err(EvalError::shape_mismatch("batch arrangement", emg.dim(), (1, 1)))
            }
        }
    }
}

/// Collects the inputs of an [`EvaluationRequest`]
#[derive(Debug, Default)]
pub struct EvaluationRequestBuilder {
    coefficients: Option<ModelCoefficients>,
    emg: Option<Signals>,
    torque: Option<Signals>,
    params: Option<ModelParams>,
    trim: Option<Trim>,
    config: Option<EvaluationConfig>,
    options: Vec<String>,
}

impl EvaluationRequestBuilder {
    pub fn coefficients(mut self, coefficients: impl Into<ModelCoefficients>) -> Self {
        self.coefficients = Some(coefficients.into());
        self
    }

    pub fn emg(mut self, emg: impl Into<Signals>) -> Self {
        self.emg = Some(emg.into());
        self
    }

    pub fn torque(mut self, torque: impl Into<Signals>) -> Self {
        self.torque = Some(torque.into());
        self
    }

    pub fn params(mut self, params: ModelParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn trim(mut self, trim: Trim) -> Self {
        self.trim = Some(trim);
        self
    }

    /// Base configuration; option pairs are applied on top of it
    pub fn config(mut self, config: EvaluationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Name/value option pairs, e.g. `["Edist", "Distance"]`
    pub fn options(mut self, pairs: &[&str]) -> Self {
        self.options.extend(pairs.iter().map(|s| s.to_string()));
        self
    }

    /// Validate and assemble the request
    pub fn build(self) -> EvalResult<EvaluationRequest> {
        let coefficients = required(self.coefficients, "coefficients")?;
        let emg = required(self.emg, "emg")?;
        let torque = required(self.torque, "torque")?;
        let params = required(self.params, "params")?;
        let trim = required(self.trim, "trim")?;

        if coefficients.is_empty() {
            return Err(EvalError::TooFewArguments { missing: "coefficients".to_string() });
        }

        let pairs: Vec<&str> = self.options.iter().map(String::as_str).collect();
        let parsed = EvaluationConfig::from_option_pairs(&pairs)?;
        let mut config = self.config.unwrap_or_default();
        apply_explicit_options(&mut config, &parsed, &pairs);

        Ok(EvaluationRequest { coefficients, emg, torque, params, trim, config })
    }
}

fn required<T>(value: Option<T>, name: &str) -> EvalResult<T> {
    value.ok_or_else(|| EvalError::TooFewArguments { missing: name.to_string() })
}

/// Copy only the options that were actually named in `pairs` onto `config`
fn apply_explicit_options(config: &mut EvaluationConfig, parsed: &EvaluationConfig, pairs: &[&str]) {
    use crate::config::options;

    for name in pairs.iter().step_by(2) {
        if name.eq_ignore_ascii_case(options::EDIST) {
            config.edist = parsed.edist;
        } else if name.eq_ignore_ascii_case(options::EMETH) {
            config.emeth = parsed.emeth;
        }
    }
}

fn into_single(batch: BatchEvaluation) -> EvalResult<TrialEvaluation> {
    let range = batch.range;
    match (batch.errors.iter().next().copied(), batch.estimates.into_raw_vec().pop()) {
        (Some(error), Some(estimate)) => Ok(TrialEvaluation { error, estimate, range }),
        _ => Err(EvalError::TooFewArguments { missing: "trials".to_string() }),
    }
}

/// Shared core of every entry point
fn evaluate_normalized<B>(
    builder: &B,
    coefficients: &ModelCoefficients,
    batch: NormalizedBatch,
    params: &ModelParams,
    trim: &Trim,
    config: &EvaluationConfig,
) -> EvalResult<BatchEvaluation>
where
    B: DesignMatrixBuilder + ?Sized,
{
    let Some((samples, channels, outputs)) = batch.trial_dims() else {
        return Err(EvalError::TooFewArguments { missing: "trials".to_string() });
    };

    let range = trim.scoring_range(samples, params)?;

    let expected_regressors = params.design_columns(channels)?;
    if coefficients.regressors() != expected_regressors {
        return Err(EvalError::dimension_mismatch(
            "coefficient rows",
            expected_regressors,
            coefficients.regressors(),
        ));
    }
    if coefficients.outputs() != outputs {
        return Err(EvalError::dimension_mismatch(
            "coefficient outputs",
            outputs,
            coefficients.outputs(),
        ));
    }

    debug!(
        trials = batch.len(),
        samples,
        channels,
        outputs,
        q = params.lag_taps,
        d = params.degree,
        ii = params.look_ahead,
        start = range.start,
        end = range.end,
        edist = %config.edist,
        emeth = %config.emeth,
        "evaluating FIR model"
    );

    let evaluate = |(index, trial): (usize, &Trial)| -> EvalResult<(f64, Array2<f64>)> {
        let aligned = estimate_trial(builder, trial, coefficients, params)?;
        let error = score(aligned.estimate.view(), aligned.target.view(), range, config.edist, config.emeth)?;
        trace!(trial = index, error, "trial scored");
        Ok((error, aligned.estimate))
    };

    #[cfg(feature = "parallel")]
    let scored: Vec<(f64, Array2<f64>)> = batch
        .trials
        .par_iter()
        .enumerate()
        .map(evaluate)
        .collect::<EvalResult<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let scored: Vec<(f64, Array2<f64>)> = batch
        .trials
        .iter()
        .enumerate()
        .map(evaluate)
        .collect::<EvalResult<_>>()?;

    let (errors, estimates): (Vec<f64>, Vec<Array2<f64>>) = scored.into_iter().unzip();

    Ok(BatchEvaluation {
        errors: arrange(batch.shape, errors)?,
        estimates: arrange(batch.shape, estimates)?,
        range,
    })
}

fn arrange<T>(shape: (usize, usize), items: Vec<T>) -> EvalResult<Array2<T>> {
    let count = items.len();
    Array2::from_shape_vec(shape, items)
        .map_err(|_| EvalError::dimension_mismatch("batch arrangement", shape.0 * shape.1, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ErrorDistance, ErrorMethod};
    use ndarray::array;

    /// EMG whose one-sample-delayed value is the torque
    fn delayed_trial(samples: usize, phase: f64) -> (Array2<f64>, Array2<f64>) {
        let emg = Array2::from_shape_fn((samples, 1), |(t, _)| (t as f64 * 0.3 + phase).cos() + 2.0);
        let torque = Array2::from_shape_fn((samples, 1), |(t, _)| {
            if t == 0 { 0.0 } else { emg[[t - 1, 0]] }
        });
        (emg, torque)
    }

    #[test]
    fn test_exact_model_scores_zero() {
        let (emg, torque) = delayed_trial(10, 0.0);
        // Q = 0, ii = 1: torque[t] = emg[t - 1]
        let params = ModelParams::new(0, 1, 0.0, 1).unwrap();
        let coeffs = ModelCoefficients::from_vector(array![1.0]);

        for emeth in [ErrorMethod::Rms, ErrorMethod::Mav] {
            let evaluator = Evaluator::new(EvaluationConfig::default().with_emeth(emeth));
            let result = evaluator.evaluate_single(&coeffs, &emg, &torque, &params, &Trim::default()).unwrap();
            assert_eq!(result.error, 0.0);
            assert_eq!(result.estimate.dim(), torque.dim());
        }
    }

    #[test]
    fn test_batch_matches_single() {
        let trials: Vec<_> = (0..3).map(|k| delayed_trial(16, k as f64)).collect();
        let params = ModelParams::new(1, 1, 0.0, 0).unwrap();
        let coeffs = ModelCoefficients::from_vector(array![0.4, 0.6]);
        let trim = Trim::new(2, 1);
        let evaluator = Evaluator::default();

        let emg = Array2::from_shape_vec((1, 3), trials.iter().map(|t| t.0.clone()).collect()).unwrap();
        let torque = Array2::from_shape_vec((1, 3), trials.iter().map(|t| t.1.clone()).collect()).unwrap();
        let batch = evaluator.evaluate_batch(&coeffs, &emg, &torque, &params, &trim).unwrap();

        assert_eq!(batch.errors.dim(), (1, 3));
        assert_eq!(batch.estimates.dim(), (1, 3));
        for (k, (emg, torque)) in trials.iter().enumerate() {
            let single = evaluator.evaluate_single(&coeffs, emg, torque, &params, &trim).unwrap();
            assert_eq!(batch.errors[[0, k]], single.error);
            assert_eq!(batch.estimates[[0, k]], single.estimate);
        }
    }

    #[test]
    fn test_validation_precedes_estimation() {
        let (emg, torque) = delayed_trial(10, 0.0);
        let params = ModelParams::new(2, 1, 0.0, 1).unwrap();
        let evaluator = Evaluator::default();

        let wrong_rows = ModelCoefficients::from_vector(Array1::ones(2));
        assert!(matches!(
            evaluator.evaluate_single(&wrong_rows, &emg, &torque, &params, &Trim::default()),
            Err(EvalError::DimensionMismatch { .. })
        ));

        let coeffs = ModelCoefficients::from_vector(Array1::ones(3));
        assert!(matches!(
            evaluator.evaluate_single(&coeffs, &emg, &torque, &params, &Trim::new(4, 4)),
            Err(EvalError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_request_builder() {
        let (emg, torque) = delayed_trial(12, 0.5);
        let request = EvaluationRequest::builder()
            .coefficients(array![1.0])
            .emg(emg)
            .torque(torque)
            .params(ModelParams::new(0, 1, 0.0, 1).unwrap())
            .trim(Trim::default())
            .config(EvaluationConfig::default().with_edist(ErrorDistance::Distance))
            .options(&["Emeth", "MAV"])
            .build()
            .unwrap();

        assert_eq!(request.config().edist, ErrorDistance::Distance);
        assert_eq!(request.config().emeth, ErrorMethod::Mav);

        match request.run(&LaggedPolynomialDesign).unwrap() {
            Evaluation::Single(result) => assert_eq!(result.error, 0.0),
            other => panic!("Expected single evaluation, got {:?}", other),
        }
    }

    #[test]
    fn test_request_builder_missing_inputs() {
        let result = EvaluationRequest::builder().coefficients(array![1.0]).build();
        assert_eq!(
            result.err(),
            Some(EvalError::TooFewArguments { missing: "emg".to_string() })
        );
    }

    #[test]
    fn test_request_mixed_forms() {
        let (emg, torque) = delayed_trial(12, 0.5);
        let request = EvaluationRequest::builder()
            .coefficients(array![1.0])
            .emg(emg)
            .torque(vec![torque])
            .params(ModelParams::new(0, 1, 0.0, 1).unwrap())
            .trim(Trim::default())
            .build()
            .unwrap();

        assert!(matches!(
            request.run(&LaggedPolynomialDesign),
            Err(EvalError::ShapeMismatch { .. })
        ));
    }
}
