//! # epermit-cli: Intake Validation from the Command Line
//!
//! Runs the same validation the intake endpoint runs, against files on
//! disk, so schema authors can check a change before deploying it.
//!
//! ## Subcommands
//!
//! - `epermit validate`: validate a request body (and upload files)
//!   against a route schema and print the errors and summary.
//! - `epermit files`: list the file fields a route schema declares.
//!
//! ```bash
//! epermit validate --route validation.json#noncommercialApplication --body body.json
//! epermit validate --route validation.json#tempOutfitterApplication --body body.json \
//!     --file guideDocumentation=docs/guide.pdf
//! epermit files --route validation.json#tempOutfitterApplication
//! ```

pub mod files;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use epermit_validation::{RequestValidator, ValidationConfig};

/// Apply command-line overrides to the environment configuration.
pub fn resolve_config(
    mut config: ValidationConfig,
    schema_dir: Option<&Path>,
    pattern_messages: Option<&Path>,
) -> ValidationConfig {
    if let Some(dir) = schema_dir {
        config.schema_dir = dir.to_path_buf();
    }
    if let Some(path) = pattern_messages {
        config.pattern_messages = Some(path.to_path_buf());
    }
    config
}

/// Build the request validator for `config`.
pub fn load_validator(config: &ValidationConfig) -> Result<RequestValidator> {
    RequestValidator::from_config(config).with_context(|| {
        format!(
            "failed to load schemas from {}",
            config.schema_dir().display()
        )
    })
}

/// Read a JSON or YAML document; the format follows the file extension.
pub fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "yaml" || e == "yml");
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))
    }
}
