//! # epermit-validation: Error Translation for Permit Intake
//!
//! Turns what the schema validator reports about a permit submission into
//! errors an applicant can act on. A raw failure such as
//!
//! ```text
//! instance requires property "applicantInfo"
//! ```
//!
//! becomes one `missing` record per field the applicant has to fill in,
//! and a summary like `Applicant Info/First Name is a required field.`
//!
//! ## Modules
//!
//! - [`translate`]: per-kind handlers from raw failures to
//!   [`NormalizedError`] records.
//! - [`required`], [`locate`]: the schema walks behind `required`
//!   expansion.
//! - [`readable`], [`message`], [`patterns`]: message rendering.
//! - [`files`]: file-field discovery and upload checks.
//! - [`request`]: the per-submission entry points.
//! - [`config`]: environment-driven configuration.

pub mod config;
pub mod dependency;
pub mod error;
pub mod files;
pub mod locate;
pub mod message;
pub mod path;
pub mod patterns;
pub mod readable;
pub mod request;
pub mod required;
pub mod translate;

pub use config::{ConfigError, ValidationConfig};
pub use dependency::{DependencyExtractor, StackMessageExtractor, StructuredDependency};
pub use error::{ErrorType, ExpectedFieldType, NormalizedError, TranslateError};
pub use files::{
    discover_file_fields, validate_file, FieldConstraints, FileField, UploadedFile,
    UploadedFileInfo, ALLOWED_MIME_TYPES,
};
pub use message::{generate_error_message, render_message};
pub use path::{combine_prop_argument, remove_instance};
pub use patterns::PatternMessages;
pub use readable::{make_field_readable, make_path_readable, readable_path};
pub use request::{file_validation_errors, RequestValidator, UploadedFiles, ValidationReport};
pub use required::collect_required;
pub use translate::ErrorTranslator;
