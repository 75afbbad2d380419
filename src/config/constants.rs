// src/config/constants.rs
//! Evaluator-wide constants

/// Name/value option vocabulary
pub mod options {
    pub const EDIST: &str = "Edist";
    pub const EMETH: &str = "Emeth";
    pub const KNOWN_OPTIONS: [&str; 2] = [EDIST, EMETH];

    pub const EDIST_VALUES: [&str; 2] = ["Component", "Distance"];
    pub const EMETH_VALUES: [&str; 2] = ["RMS", "MAV"];
}

/// Model parameter layout
pub mod model {
    /// `[Q, D, Tol, ii]`
    pub const PARAM_COUNT: usize = 4;
    /// `[head, tail]`
    pub const TRIM_COUNT: usize = 2;
    pub const MIN_LAG_TAPS: usize = 0;
    pub const MIN_DEGREE: usize = 1;
    pub const MIN_LOOK_AHEAD: usize = 0;
}

/// Configuration file locations and environment overrides
pub mod paths {
    pub const CONFIG_SECTION: &str = "evaluation";
    pub const ENV_PREFIX: &str = "EMG_EVAL_";
    pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["emg_fir_eval.toml", "config/evaluation.toml"];
}
