//! Dependency-name extraction for `dependencies` failures.
//!
//! The legacy validator reports a dependency failure only as text:
//!
//! ```text
//! instance.applicantInfo property firstName not found, required by instance.applicantInfo.orgType
//! ```
//!
//! and the missing field's name has to be cut out of that stack line.
//! Validators that know the name report it in
//! [`RawValidationFailure::dependency`]; [`StructuredDependency`] prefers
//! it and parses the stack only as a fallback.

use epermit_schema::RawValidationFailure;

use crate::error::TranslateError;

const PROPERTY_MARKER: &str = " property ";
const NOT_MARKER: &str = " not ";

/// Finds the name of the missing field in a `dependencies` failure.
pub trait DependencyExtractor {
    /// The bare (unqualified) name of the field the dependent requires.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::DependencyMessageFormat` if the name
    /// cannot be determined.
    fn dependency_name(&self, failure: &RawValidationFailure) -> Result<String, TranslateError>;
}

/// Cuts the name out of the stack line, between `" property "` and
/// `" not "`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackMessageExtractor;

impl DependencyExtractor for StackMessageExtractor {
    fn dependency_name(&self, failure: &RawValidationFailure) -> Result<String, TranslateError> {
        let malformed = || TranslateError::DependencyMessageFormat {
            stack: failure.stack.clone(),
        };
        let (_, after) = failure
            .stack
            .split_once(PROPERTY_MARKER)
            .ok_or_else(malformed)?;
        let (name, _) = after.split_once(NOT_MARKER).ok_or_else(malformed)?;
        Ok(name.to_string())
    }
}

/// Uses the validator-supplied name, falling back to the stack line.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredDependency;

impl DependencyExtractor for StructuredDependency {
    fn dependency_name(&self, failure: &RawValidationFailure) -> Result<String, TranslateError> {
        match &failure.dependency {
            Some(name) => Ok(name.clone()),
            None => StackMessageExtractor.dependency_name(failure),
        }
    }
}
