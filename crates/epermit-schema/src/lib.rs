//! # epermit-schema: Schema Resolution & Body Validation
//!
//! The schema side of ePermit application intake. Request bodies for each
//! permit route are validated against a named sub-schema of an application
//! schema document; this crate finds that sub-schema, runs the validator,
//! and hands back the raw failures for the translation layer in
//! `epermit-validation`.
//!
//! ## Modules
//!
//! - [`repository`]: loads schema documents from a directory and resolves
//!   route references of the form `"<file>#<schemaName>"`. Also inlines
//!   sibling `$ref`s so the translation layer can walk a single tree.
//! - [`validate`]: builds a `jsonschema` validator (Draft 7) with every
//!   sub-schema of the document registered for `$ref` resolution, and maps
//!   each crate error into a [`RawValidationFailure`].
//! - [`node`]: the typed composition model ([`SchemaNode`], [`Branch`])
//!   and the single generic walk every schema traversal is built on.
//! - [`formats`]: the `areaCodeFormat` and `phoneNumberFormat` checks.
//! - [`failure`]: the raw failure record the validator produces.
//!
//! ## Crate Policy
//!
//! - No network access: `$ref` URIs are resolved from the loaded document.
//! - Rule execution is delegated to `jsonschema`; this crate only adapts
//!   its input and output.

pub mod error;
pub mod failure;
pub mod formats;
pub mod node;
pub mod repository;
pub mod validate;

pub use error::SchemaError;
pub use failure::{FailureArgument, FailureKind, RawValidationFailure};
pub use node::{Branch, Edge, SchemaNode, SchemaVisitor};
pub use repository::{dereference, ResolvedSchema, RouteSchemaRef, SchemaRepository};
pub use validate::BodyValidator;
