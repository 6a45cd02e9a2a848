//! # Request Validation
//!
//! The entry points the intake endpoint calls for each submission:
//!
//! 1. [`RequestValidator::field_validation_errors`]: resolve the route's
//!    schema, validate the body, translate the failures.
//! 2. [`RequestValidator::file_validation_errors`]: check each file field
//!    the schema declares against the uploads.
//! 3. [`RequestValidator::generate_error_message`]: render the summary.
//!
//! [`RequestValidator::validate_request`] runs all three.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use epermit_schema::{BodyValidator, ResolvedSchema, RouteSchemaRef, SchemaRepository};

use crate::config::ValidationConfig;
use crate::error::{NormalizedError, TranslateError};
use crate::files::{discover_file_fields, validate_file, FileField, UploadedFile};
use crate::message;
use crate::patterns::PatternMessages;
use crate::translate::ErrorTranslator;

/// Uploaded files keyed by the file field they were sent in.
pub type UploadedFiles = HashMap<String, UploadedFile>;

/// Outcome of validating one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Field errors followed by file errors, each with its message set.
    pub errors: Vec<NormalizedError>,
    /// All messages joined with single spaces; empty when valid.
    pub message: String,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates permit submissions against the loaded schema documents.
///
/// Immutable after construction.
#[derive(Debug)]
pub struct RequestValidator {
    repository: SchemaRepository,
    body_validator: BodyValidator,
    translator: ErrorTranslator,
    patterns: PatternMessages,
}

impl RequestValidator {
    /// A validator over `repository` with the built-in message table.
    pub fn new(repository: SchemaRepository) -> Self {
        Self {
            repository,
            body_validator: BodyValidator::new(),
            translator: ErrorTranslator::new(),
            patterns: PatternMessages::default(),
        }
    }

    pub fn with_patterns(mut self, patterns: PatternMessages) -> Self {
        self.patterns = patterns;
        self
    }

    /// Load the schema documents and message table `config` names.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::Schema` if the schema directory cannot be
    /// loaded, or `TranslateError::PatternMessagesLoad` for a bad table.
    pub fn from_config(config: &ValidationConfig) -> Result<Self, TranslateError> {
        let repository = SchemaRepository::load(config.schema_dir())?;
        tracing::info!(
            schema_dir = %config.schema_dir().display(),
            documents = repository.document_count(),
            "loaded schema documents"
        );
        Ok(Self::new(repository).with_patterns(config.load_pattern_messages()?))
    }

    pub fn repository(&self) -> &SchemaRepository {
        &self.repository
    }

    pub fn patterns(&self) -> &PatternMessages {
        &self.patterns
    }

    /// Resolve a `"<file>#<schemaName>"` route reference.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::Schema` for a malformed reference or an
    /// unknown document or sub-schema.
    pub fn resolve(&self, route_ref: &str) -> Result<ResolvedSchema, TranslateError> {
        let route: RouteSchemaRef = route_ref.parse()?;
        Ok(self.repository.resolve(&route)?)
    }

    /// Field errors for `body` against the schema `route_ref` names.
    /// Messages are not yet rendered.
    ///
    /// # Errors
    ///
    /// Schema resolution and validator build failures, and failures the
    /// translator cannot interpret.
    pub fn field_validation_errors(
        &self,
        body: &Value,
        route_ref: &str,
    ) -> Result<Vec<NormalizedError>, TranslateError> {
        let resolved = self.resolve(route_ref)?;
        self.body_errors(body, &resolved)
    }

    fn body_errors(
        &self,
        body: &Value,
        resolved: &ResolvedSchema,
    ) -> Result<Vec<NormalizedError>, TranslateError> {
        let failures = self.body_validator.validate(body, resolved)?;
        if failures.is_empty() {
            return Ok(Vec::new());
        }
        self.translator.translate(&failures, resolved.dereferenced())
    }

    /// The file fields the schema `route_ref` names declares.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::Schema` if the route cannot be resolved.
    pub fn expected_file_fields(&self, route_ref: &str) -> Result<Vec<FileField>, TranslateError> {
        let resolved = self.resolve(route_ref)?;
        Ok(discover_file_fields(resolved.dereferenced()))
    }

    /// File errors for `files` against the file fields of `schema`.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::FileConstraints` for a malformed file
    /// field declaration.
    pub fn file_validation_errors(
        &self,
        files: &UploadedFiles,
        schema: &Value,
    ) -> Result<Vec<NormalizedError>, TranslateError> {
        file_validation_errors(files, schema)
    }

    /// Render messages onto `errors` and return the summary.
    pub fn generate_error_message(&self, errors: &mut [NormalizedError]) -> String {
        message::generate_error_message(errors, &self.patterns)
    }

    /// Validate body and files of one submission.
    ///
    /// # Errors
    ///
    /// As [`Self::field_validation_errors`] and
    /// [`Self::file_validation_errors`].
    pub fn validate_request(
        &self,
        body: &Value,
        files: &UploadedFiles,
        route_ref: &str,
    ) -> Result<ValidationReport, TranslateError> {
        let resolved = self.resolve(route_ref)?;
        let mut errors = self.body_errors(body, &resolved)?;
        errors.extend(file_validation_errors(files, resolved.dereferenced())?);
        let message = self.generate_error_message(&mut errors);

        if !errors.is_empty() {
            tracing::debug!(route = route_ref, errors = errors.len(), "submission rejected");
        }
        Ok(ValidationReport { errors, message })
    }
}

/// File errors for `files` against every file field `schema` declares.
///
/// # Errors
///
/// Returns `TranslateError::FileConstraints` for a malformed file field
/// declaration.
pub fn file_validation_errors(
    files: &UploadedFiles,
    schema: &Value,
) -> Result<Vec<NormalizedError>, TranslateError> {
    let mut errors = Vec::new();
    for field in discover_file_fields(schema) {
        let constraints = field.constraints()?;
        errors.extend(validate_file(&field.name, &constraints, files.get(&field.name))?);
    }
    Ok(errors)
}
