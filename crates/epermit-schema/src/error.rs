//! # Schema Errors
//!
//! Infrastructure failures of the schema layer. A document that fails
//! validation is *not* an error here: validation failures are data and
//! come back as [`crate::RawValidationFailure`] records.

use thiserror::Error;

/// Error loading, resolving, or compiling a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema directory or a schema document could not be read or parsed.
    #[error("schema load error for '{path}': {reason}")]
    DocumentLoad {
        /// Directory or file that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// A route reference is not of the form `<file>#<schemaName>`.
    #[error("invalid route schema reference '{reference}': {reason}")]
    InvalidRouteRef {
        /// The reference as written in the route descriptor.
        reference: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No document with this file name was loaded.
    #[error("schema document '{document}' not found")]
    DocumentNotFound {
        /// Document file name.
        document: String,
    },

    /// The document exists but has no top-level sub-schema with this name.
    #[error("schema '{schema_name}' not found in document '{document}'")]
    SchemaNotFound {
        /// Document file name.
        document: String,
        /// Requested sub-schema name.
        schema_name: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuild {
        /// Schema the validator was built for.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// IO error reading schema documents.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
