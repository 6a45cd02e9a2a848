//! # Normalized Errors
//!
//! [`NormalizedError`] is the record the intake endpoint returns for each
//! problem with a submission, and [`TranslateError`] is the hard-failure
//! type of the translation layer itself.
//!
//! Every record has exactly one [`ErrorType`], and carries only the
//! optional fields that type's message template reads. Records are built
//! through one constructor per error type, so a record with the wrong
//! payload cannot be made.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use epermit_schema::{FailureKind, SchemaError};

use crate::config::ConfigError;

/// The kind of problem a [`NormalizedError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    Missing,
    Type,
    Format,
    Enum,
    Dependencies,
    AnyOf,
    RequiredFileMissing,
    InvalidExtension,
    InvalidMime,
    InvalidSizeSmall,
    InvalidSizeLarge,
}

impl ErrorType {
    /// Wire name of the error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Missing => "missing",
            ErrorType::Type => "type",
            ErrorType::Format => "format",
            ErrorType::Enum => "enum",
            ErrorType::Dependencies => "dependencies",
            ErrorType::AnyOf => "anyOf",
            ErrorType::RequiredFileMissing => "requiredFileMissing",
            ErrorType::InvalidExtension => "invalidExtension",
            ErrorType::InvalidMime => "invalidMime",
            ErrorType::InvalidSizeSmall => "invalidSizeSmall",
            ErrorType::InvalidSizeLarge => "invalidSizeLarge",
        }
    }

    /// True for the error types produced by file validation.
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            ErrorType::RequiredFileMissing
                | ErrorType::InvalidExtension
                | ErrorType::InvalidMime
                | ErrorType::InvalidSizeSmall
                | ErrorType::InvalidSizeLarge
        )
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of `expectedFieldType`: a type name, an allowlist, or a size
/// limit in megabytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectedFieldType {
    Name(String),
    List(Vec<String>),
    Megabytes(f64),
}

impl fmt::Display for ExpectedFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedFieldType::Name(name) => f.write_str(name),
            ExpectedFieldType::List(items) => f.write_str(&items.join(", ")),
            ExpectedFieldType::Megabytes(mb) => write!(f, "{mb}"),
        }
    }
}

/// One problem with a submission, in the form the client renders.
///
/// `field` holds the dotted path with the `instance` marker already
/// stripped; it is `None` only for `anyOf` records, whose fields are
/// listed in `anyOfFields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedError {
    field: Option<String>,
    error_type: ErrorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expected_field_type: Option<ExpectedFieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enum_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dependency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    any_of_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl NormalizedError {
    fn base(field: Option<String>, error_type: ErrorType) -> Self {
        Self {
            field,
            error_type,
            expected_field_type: None,
            enum_message: None,
            dependency: None,
            any_of_fields: None,
            message: None,
        }
    }

    /// A required field is absent.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::base(Some(field.into()), ErrorType::Missing)
    }

    /// A field has the wrong type.
    pub fn type_mismatch(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            expected_field_type: Some(ExpectedFieldType::Name(expected.into())),
            ..Self::base(Some(field.into()), ErrorType::Type)
        }
    }

    /// A field failed a `format` or `pattern` check.
    pub fn format(field: impl Into<String>) -> Self {
        Self::base(Some(field.into()), ErrorType::Format)
    }

    /// A field is not one of its allowed values.
    pub fn enumeration(field: impl Into<String>, enum_message: impl Into<String>) -> Self {
        Self {
            enum_message: Some(enum_message.into()),
            ..Self::base(Some(field.into()), ErrorType::Enum)
        }
    }

    /// `field` is present but `dependency`, which it requires, is not.
    pub fn dependency(field: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            dependency: Some(dependency.into()),
            ..Self::base(Some(field.into()), ErrorType::Dependencies)
        }
    }

    /// At least one of `fields` is required.
    pub fn any_of(fields: Vec<String>) -> Self {
        Self {
            any_of_fields: Some(fields),
            ..Self::base(None, ErrorType::AnyOf)
        }
    }

    pub fn required_file_missing(field: impl Into<String>) -> Self {
        Self::base(Some(field.into()), ErrorType::RequiredFileMissing)
    }

    pub fn invalid_extension(field: impl Into<String>, allowed: Vec<String>) -> Self {
        Self {
            expected_field_type: Some(ExpectedFieldType::List(allowed)),
            ..Self::base(Some(field.into()), ErrorType::InvalidExtension)
        }
    }

    pub fn invalid_mime(field: impl Into<String>, allowed: Vec<String>) -> Self {
        Self {
            expected_field_type: Some(ExpectedFieldType::List(allowed)),
            ..Self::base(Some(field.into()), ErrorType::InvalidMime)
        }
    }

    pub fn invalid_size_small(field: impl Into<String>) -> Self {
        Self::base(Some(field.into()), ErrorType::InvalidSizeSmall)
    }

    pub fn invalid_size_large(field: impl Into<String>, max_megabytes: f64) -> Self {
        Self {
            expected_field_type: Some(ExpectedFieldType::Megabytes(max_megabytes)),
            ..Self::base(Some(field.into()), ErrorType::InvalidSizeLarge)
        }
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn expected_field_type(&self) -> Option<&ExpectedFieldType> {
        self.expected_field_type.as_ref()
    }

    pub fn enum_message(&self) -> Option<&str> {
        self.enum_message.as_deref()
    }

    pub fn dependency_field(&self) -> Option<&str> {
        self.dependency.as_deref()
    }

    pub fn any_of_fields(&self) -> Option<&[String]> {
        self.any_of_fields.as_deref()
    }

    /// The rendered message, once [`crate::generate_error_message`] ran.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub(crate) fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }
}

/// Hard failures of the translation layer.
#[derive(Error, Debug)]
pub enum TranslateError {
    /// A `dependencies` failure whose stack text lacks the
    /// `" property "` / `" not "` markers the dependency name sits between.
    #[error("cannot extract dependency name from stack '{stack}'")]
    DependencyMessageFormat {
        /// The stack line as reported by the validator.
        stack: String,
    },

    /// A failure is missing the argument its kind needs.
    #[error("{kind} failure at '{property}' has no usable argument")]
    MissingArgument {
        kind: FailureKind,
        property: String,
    },

    /// A file field's schema fragment is not a valid constraint object.
    #[error("invalid file constraints for field '{field}': {reason}")]
    FileConstraints {
        field: String,
        reason: String,
    },

    /// The pattern message table could not be loaded.
    #[error("cannot load pattern messages from '{path}': {reason}")]
    PatternMessagesLoad {
        path: String,
        reason: String,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
