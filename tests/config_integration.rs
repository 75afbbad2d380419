// tests/config_integration.rs
//! Configuration loading against the real process environment

use emg_fir_eval::{ConfigLoader, ErrorDistance, ErrorMethod, EvalError, EvaluationConfig, Orientation};
use serial_test::serial;
use std::path::PathBuf;

struct EnvGuard(&'static [&'static str]);

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in self.0 {
            std::env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_environment_overrides() {
    let _guard = EnvGuard(&["EMG_EVAL_EDIST", "EMG_EVAL_EMETH"]);
    std::env::set_var("EMG_EVAL_EDIST", "Distance");
    std::env::set_var("EMG_EVAL_EMETH", "mav");

    let mut loader = ConfigLoader::with_paths(vec![PathBuf::from("/nonexistent/evaluation.toml")]);
    let config = loader.load().unwrap();

    assert_eq!(config.edist, ErrorDistance::Distance);
    assert_eq!(config.emeth, ErrorMethod::Mav);
    assert_eq!(config.orientation, Orientation::Auto);
}

#[test]
#[serial]
fn test_invalid_environment_value() {
    let _guard = EnvGuard(&["EMG_EVAL_EMETH"]);
    std::env::set_var("EMG_EVAL_EMETH", "median");

    let mut loader = ConfigLoader::with_paths(Vec::new());
    assert!(loader.load().is_err());
}

#[test]
#[serial]
fn test_file_then_environment() {
    let _guard = EnvGuard(&["EMG_EVAL_ORIENTATION"]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("evaluation.toml");
    std::fs::write(&path, "[evaluation]\nedist = \"Distance\"\norientation = \"auto\"\n").unwrap();
    std::env::set_var("EMG_EVAL_ORIENTATION", "as_given");

    let mut loader = ConfigLoader::with_paths(vec![path]);
    let config = loader.load().unwrap();

    assert_eq!(config.edist, ErrorDistance::Distance);
    assert_eq!(config.orientation, Orientation::AsGiven);
}

#[test]
#[serial]
fn test_default_load_surfaces_config_errors() {
    let _guard = EnvGuard(&["EMG_EVAL_EDIST"]);
    std::env::set_var("EMG_EVAL_EDIST", "hamming");

    match EvaluationConfig::load() {
        Err(EvalError::Config(_)) => {}
        other => panic!("Expected configuration error, got {:?}", other),
    }
}
