//! Validation configuration.
//!
//! Defaults suit a checkout of the intake service: schema documents in
//! `./schemas` and the built-in format-message table. Override via
//! environment variables or explicit construction for tests.

use std::path::{Path, PathBuf};

use crate::error::TranslateError;
use crate::patterns::PatternMessages;

/// Default directory holding the application schema documents.
pub const DEFAULT_SCHEMA_DIR: &str = "schemas";

const SCHEMA_DIR_VAR: &str = "EPERMIT_SCHEMA_DIR";
const PATTERN_MESSAGES_VAR: &str = "EPERMIT_PATTERN_MESSAGES";

/// Where the validation layer finds its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Directory of `*.json` / `*.yaml` application schema documents.
    pub schema_dir: PathBuf,
    /// JSON table of format-message suffixes; the built-in table is used
    /// when unset.
    pub pattern_messages: Option<PathBuf>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_DIR)
    }
}

impl ValidationConfig {
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            pattern_messages: None,
        }
    }

    pub fn with_pattern_messages(mut self, path: impl Into<PathBuf>) -> Self {
        self.pattern_messages = Some(path.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `EPERMIT_SCHEMA_DIR` (default: `schemas`)
    /// - `EPERMIT_PATTERN_MESSAGES` (optional)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyValue` if a variable is set to an empty
    /// string.
    pub fn from_env() -> Result<Self, ConfigError> {
        let schema_dir = env_path(SCHEMA_DIR_VAR)?
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA_DIR));
        Ok(Self {
            schema_dir,
            pattern_messages: env_path(PATTERN_MESSAGES_VAR)?,
        })
    }

    /// The configured message table, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::PatternMessagesLoad` if the configured
    /// file cannot be loaded.
    pub fn load_pattern_messages(&self) -> Result<PatternMessages, TranslateError> {
        match &self.pattern_messages {
            Some(path) => PatternMessages::from_path(path),
            None => Ok(PatternMessages::default()),
        }
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }
}

fn env_path(var: &str) -> Result<Option<PathBuf>, ConfigError> {
    match std::env::var_os(var) {
        None => Ok(None),
        Some(value) if value.is_empty() => Err(ConfigError::EmptyValue(var.to_string())),
        Some(value) => Ok(Some(PathBuf::from(value))),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is set but empty")]
    EmptyValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ValidationConfig::default();
        assert_eq!(cfg.schema_dir(), Path::new("schemas"));
        assert!(cfg.pattern_messages.is_none());
        assert!(cfg.load_pattern_messages().is_ok());
    }

    #[test]
    fn test_env_path_absent_and_empty() {
        assert_eq!(env_path("EPERMIT_NONEXISTENT_VAR_12345").unwrap(), None);

        std::env::set_var("EPERMIT_TEST_EMPTY_VAR", "");
        let result = env_path("EPERMIT_TEST_EMPTY_VAR");
        std::env::remove_var("EPERMIT_TEST_EMPTY_VAR");
        assert!(matches!(result, Err(ConfigError::EmptyValue(_))));
    }

    #[test]
    fn test_env_path_set() {
        std::env::set_var("EPERMIT_TEST_PATH_VAR", "/srv/schemas");
        let result = env_path("EPERMIT_TEST_PATH_VAR");
        std::env::remove_var("EPERMIT_TEST_PATH_VAR");
        assert_eq!(result.unwrap(), Some(PathBuf::from("/srv/schemas")));
    }

    #[test]
    fn test_missing_pattern_file_fails_to_load() {
        let cfg = ValidationConfig::new("schemas").with_pattern_messages("/nonexistent/messages.json");
        assert!(matches!(
            cfg.load_pattern_messages(),
            Err(TranslateError::PatternMessagesLoad { .. })
        ));
    }
}
