// src/config/loader.rs
//! Layered configuration loader
//!
//! Sources are merged in order: built-in defaults, each existing TOML file in
//! the path list (its `[evaluation]` table), then `EMG_EVAL_*` environment
//! variables. Later sources override earlier ones key by key.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::constants::paths;
use crate::config::EvaluationConfig;
use crate::utils::validation::{validate_enum, ValidationError};

/// Configuration loading errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration validation errors: {}", format_validation_errors(.0))]
    ValidationError(Vec<ValidationError>),

    #[error("IO error: {0}")]
    IoError(String),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Configuration loader
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    current_config: EvaluationConfig,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader over the default file locations
    pub fn new() -> Self {
        Self::with_paths(paths::DEFAULT_CONFIG_FILES.iter().map(PathBuf::from).collect())
    }

    /// Create loader with custom paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            current_config: EvaluationConfig::default(),
        }
    }

    /// Load configuration from files and the process environment
    pub fn load(&mut self) -> Result<EvaluationConfig, ConfigError> {
        self.load_with_env(std::env::vars())
    }

    /// Load configuration with an explicit set of environment variables
    pub fn load_with_env<I>(&mut self, vars: I) -> Result<EvaluationConfig, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged = toml::Value::try_from(EvaluationConfig::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        for config_path in &self.config_paths {
            match load_config_file(config_path) {
                Ok(Some(section)) => {
                    debug!(path = %config_path.display(), "merging evaluation config file");
                    merge_toml_values(&mut merged, section);
                }
                Ok(None) => continue,
                Err(ConfigError::FileNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        apply_environment_overrides(&mut merged, vars);
        validate_section(&merged)?;

        let config: EvaluationConfig = merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(e.to_string()))?;

        self.current_config = config.clone();
        Ok(config)
    }

    /// Get current configuration
    pub fn current_config(&self) -> &EvaluationConfig {
        &self.current_config
    }

    /// Validate a configuration file without loading it
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        match load_config_file(path.as_ref())? {
            Some(section) => validate_section(&section),
            None => Ok(()),
        }
    }

    /// Export current configuration to file
    pub fn export_config<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let mut root = toml::value::Table::new();
        let section = toml::Value::try_from(&self.current_config)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        root.insert(paths::CONFIG_SECTION.to_string(), section);

        let toml_content = toml::to_string_pretty(&toml::Value::Table(root))
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }
}

/// Read a file and return its `[evaluation]` table, if it has one
fn load_config_file(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let mut document: toml::Value = toml::from_str(&content)?;

    match document.as_table_mut().and_then(|t| t.remove(paths::CONFIG_SECTION)) {
        Some(toml::Value::Table(mut section)) => {
            // Enumerated values are matched case-insensitively
            for (_, value) in section.iter_mut() {
                if let toml::Value::String(s) = value {
                    *s = s.trim().to_lowercase();
                }
            }
            Ok(Some(toml::Value::Table(section)))
        }
        Some(_) => Err(ConfigError::ParseError(format!(
            "'{}' must be a table in {}",
            paths::CONFIG_SECTION,
            path.display()
        ))),
        None => Ok(None),
    }
}

fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml_values(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn apply_environment_overrides<I>(config: &mut toml::Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    let Some(table) = config.as_table_mut() else {
        return;
    };

    for (key, value) in vars {
        if let Some(field) = key.strip_prefix(paths::ENV_PREFIX) {
            let field = field.to_lowercase();
            debug!(field = %field, "applying environment override");
            table.insert(field, toml::Value::String(value.trim().to_lowercase()));
        }
    }
}

/// Check keys and enumerated values before deserializing so failures name
/// the offending field.
fn validate_section(section: &toml::Value) -> Result<(), ConfigError> {
    let Some(table) = section.as_table() else {
        return Err(ConfigError::ParseError("evaluation config must be a table".to_string()));
    };

    let mut errors = Vec::new();
    for (key, value) in table {
        let valid: &[&str] = match key.as_str() {
            "edist" => &["component", "distance"],
            "emeth" => &["rms", "mav"],
            "orientation" => &["auto", "as_given"],
            _ => {
                errors.push(ValidationError::UnknownField(key.clone()));
                continue;
            }
        };

        match value.as_str() {
            Some(s) => {
                if let Err(e) = validate_enum(s, valid, key) {
                    errors.push(e);
                }
            }
            None => errors.push(ValidationError::InvalidFormat {
                field: key.clone(),
                value: value.to_string(),
                expected: "a string".to_string(),
            }),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        debug!(count = errors.len(), "evaluation config rejected");
        Err(ConfigError::ValidationError(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ErrorDistance, ErrorMethod, Orientation};
    use std::io::Write;

    fn write_config(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn no_env() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let mut loader = ConfigLoader::with_paths(vec![PathBuf::from("/nonexistent/eval.toml")]);
        let config = loader.load_with_env(no_env()).unwrap();
        assert_eq!(config, EvaluationConfig::default());
    }

    #[test]
    fn test_later_files_override_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let base = write_config(&dir, "base.toml", "[evaluation]\nedist = \"distance\"\nemeth = \"mav\"\n");
        let local = write_config(&dir, "local.toml", "[evaluation]\nemeth = \"RMS\"\n");

        let mut loader = ConfigLoader::with_paths(vec![base, local]);
        let config = loader.load_with_env(no_env()).unwrap();

        assert_eq!(config.edist, ErrorDistance::Distance);
        assert_eq!(config.emeth, ErrorMethod::Rms);
        assert_eq!(loader.current_config(), &config);
    }

    #[test]
    fn test_environment_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "eval.toml", "[evaluation]\nemeth = \"mav\"\n");

        let mut loader = ConfigLoader::with_paths(vec![path]);
        let env = vec![
            ("EMG_EVAL_EMETH".to_string(), "RMS".to_string()),
            ("EMG_EVAL_ORIENTATION".to_string(), "as_given".to_string()),
            ("UNRELATED".to_string(), "value".to_string()),
        ];
        let config = loader.load_with_env(env).unwrap();

        assert_eq!(config.emeth, ErrorMethod::Rms);
        assert_eq!(config.orientation, Orientation::AsGiven);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "eval.toml", "[evaluation]\nedist = \"manhattan\"\nwindow = \"x\"\n");

        let mut loader = ConfigLoader::with_paths(vec![path.clone()]);
        match loader.load_with_env(no_env()) {
            Err(ConfigError::ValidationError(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().any(|e| e.field() == "edist"));
                assert!(errors.contains(&ValidationError::UnknownField("window".to_string())));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(loader.validate_config_file(&path).is_err());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "eval.toml", "[evaluation\nedist = ");

        let mut loader = ConfigLoader::with_paths(vec![path]);
        assert!(matches!(loader.load_with_env(no_env()), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_export_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_config(&dir, "eval.toml", "[evaluation]\nedist = \"distance\"\n");
        let exported = dir.path().join("exported.toml");

        let mut loader = ConfigLoader::with_paths(vec![source]);
        let config = loader.load_with_env(no_env()).unwrap();
        loader.export_config(&exported).unwrap();

        let mut reloaded = ConfigLoader::with_paths(vec![exported]);
        assert_eq!(reloaded.load_with_env(no_env()).unwrap(), config);
    }
}
