//! # Body Validation
//!
//! Runs a permit request body through a `jsonschema` validator and maps
//! each error into a [`RawValidationFailure`].
//!
//! ## Schema Resolution
//!
//! The validator is compiled from the route's dereferenced sub-schema, so
//! schema paths reported by `jsonschema` point straight into that tree.
//! Refs the dereferencer could not inline are resolved by
//! [`LocalSchemaRetriever`] against the document's top-level sub-schemas;
//! nothing is fetched over the network.
//!
//! ## Failure Mapping
//!
//! | `jsonschema` schema path | failure kind |
//! |---|---|
//! | contains `dependencies/<field>` (or `dependentRequired`) | `dependencies` |
//! | ends in `required`, `type`, `format`, `pattern`, `enum`, `anyOf` | that keyword |
//! | anything else | dropped |
//!
//! Messages and stack lines use the textual form the translation layer
//! was written against, e.g. `instance.applicant requires property "zip"`.
//!
//! ## File Fields
//!
//! Upload slots are declared `"type": "file"`, which is not a JSON Schema
//! type. Files arrive outside the body, so the compiled schema simply
//! drops that `type` keyword; the upload checks live in
//! `epermit-validation`.

use std::collections::HashMap;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Retrieve, Uri, ValidationError, Validator};
use serde_json::Value;

use crate::error::SchemaError;
use crate::failure::{instance_property, FailureArgument, FailureKind, RawValidationFailure};
use crate::formats::{
    area_code_format, format_message, numeric_format_failures, phone_number_format,
    AREA_CODE_FORMAT, PHONE_NUMBER_FORMAT,
};
use crate::repository::{ref_target_name, ResolvedSchema};

/// Keywords whose errors are reported as `dependencies` failures.
const DEPENDENCY_KEYWORDS: [&str; 2] = ["dependencies", "dependentRequired"];

/// Type name of upload slots.
const FILE_TYPE: &str = "file";

/// Local retriever that resolves `$ref` URIs to sub-schemas of the
/// route's document.
struct LocalSchemaRetriever {
    /// Map from sub-schema name to schema value.
    schemas_by_name: HashMap<String, Value>,
}

impl LocalSchemaRetriever {
    fn for_document(document: &Value) -> Self {
        let mut schemas_by_name = HashMap::new();
        if let Some(definitions) = document.get("definitions").and_then(Value::as_object) {
            for (name, schema) in definitions {
                schemas_by_name.insert(name.clone(), schema.clone());
            }
        }
        // Top-level sub-schemas win over `definitions` on a name clash.
        if let Some(top_level) = document.as_object() {
            for (name, schema) in top_level {
                schemas_by_name.insert(name.clone(), schema.clone());
            }
        }
        Self { schemas_by_name }
    }
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_name.get(uri_str) {
            return Ok(value.clone());
        }
        if let Some(value) = self.schemas_by_name.get(ref_target_name(uri_str)) {
            return Ok(value.clone());
        }

        // Unknown refs validate nothing rather than failing the whole route.
        tracing::warn!(uri = uri_str, "unresolved schema ref; treating as permissive");
        Ok(serde_json::json!({}))
    }
}

/// A request-body validator backed by the `jsonschema` crate.
///
/// Registers the `areaCodeFormat` and `phoneNumberFormat` checks and
/// always validates formats. Stateless apart from the draft; one instance
/// can serve every route.
#[derive(Debug, Clone, Copy)]
pub struct BodyValidator {
    draft: Draft,
}

impl Default for BodyValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyValidator {
    /// A Draft 7 validator; permit schemas use `dependencies`.
    pub fn new() -> Self {
        Self {
            draft: Draft::Draft7,
        }
    }

    /// Validate with a different JSON Schema draft.
    pub fn with_draft(draft: Draft) -> Self {
        Self { draft }
    }

    /// Build a compiled `Validator` for the route's dereferenced sub-schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidatorBuild` if the schema does not compile.
    pub fn build_validator(&self, resolved: &ResolvedSchema) -> Result<Validator, SchemaError> {
        let mut opts = jsonschema::options();
        opts.with_draft(self.draft);
        opts.should_validate_formats(true);
        opts.with_format(AREA_CODE_FORMAT, area_code_format);
        opts.with_format(PHONE_NUMBER_FORMAT, phone_number_format);
        opts.with_retriever(LocalSchemaRetriever::for_document(resolved.full_schema()));

        opts.build(&body_schema(resolved.dereferenced()))
            .map_err(|e| SchemaError::ValidatorBuild {
                schema_name: resolved.route().to_string(),
                reason: e.to_string(),
            })
    }

    /// Validate a request body, returning every failure in validator order
    /// followed by the numeric format failures.
    ///
    /// An empty list means the body is valid.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidatorBuild` if the schema does not compile.
    pub fn validate(
        &self,
        body: &Value,
        resolved: &ResolvedSchema,
    ) -> Result<Vec<RawValidationFailure>, SchemaError> {
        let validator = self.build_validator(resolved)?;
        let schema = resolved.dereferenced();

        let mut failures: Vec<RawValidationFailure> = validator
            .iter_errors(body)
            .filter_map(|e| to_failure(&e, schema, body))
            .collect();
        failures.extend(numeric_format_failures(schema, body));

        tracing::debug!(
            route = %resolved.route(),
            failures = failures.len(),
            "validated request body"
        );
        Ok(failures)
    }
}

/// `schema` with the `type` keyword of every file field removed.
fn body_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(object) => Value::Object(
            object
                .iter()
                .filter(|(key, value)| !(key.as_str() == "type" && value.as_str() == Some(FILE_TYPE)))
                .map(|(key, value)| (key.clone(), body_schema(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(body_schema).collect()),
        _ => schema.clone(),
    }
}

/// Split a JSON Pointer into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Build a JSON Pointer from segments.
fn to_pointer(segments: &[String]) -> String {
    segments
        .iter()
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect()
}

/// Index of a dependency keyword in a schema path, ignoring properties
/// that happen to be named like one.
fn dependency_keyword_index(segments: &[String]) -> Option<usize> {
    segments.iter().enumerate().rev().find_map(|(i, segment)| {
        let is_keyword = DEPENDENCY_KEYWORDS.contains(&segment.as_str());
        let is_property_name = i > 0 && segments[i - 1] == "properties";
        (is_keyword && !is_property_name).then_some(i)
    })
}

/// The property a `required` check found missing.
fn required_property(error: &ValidationError<'_>) -> Option<String> {
    match &error.kind {
        ValidationErrorKind::Required { property } => Some(
            property
                .as_str()
                .map_or_else(|| property.to_string(), str::to_string),
        ),
        _ => None,
    }
}

/// Find which property of `instance` declares `dependency` in a
/// `dependencies` map, for paths that do not name the dependent field.
fn dependent_from_map(dependencies: &Value, dependency: &str, instance: Option<&Value>) -> Option<String> {
    dependencies.as_object()?.iter().find_map(|(dependent, required)| {
        let declares = required
            .as_array()
            .is_some_and(|names| names.iter().any(|n| n.as_str() == Some(dependency)));
        let present = instance.is_some_and(|i| i.get(dependent).is_some());
        (declares && present).then(|| dependent.clone())
    })
}

fn type_names(keyword_value: Option<&Value>) -> Vec<String> {
    match keyword_value {
        Some(Value::String(name)) => vec![name.clone()],
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn enum_options(keyword_value: Option<&Value>) -> Vec<String> {
    keyword_value
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .map(|option| option.as_str().map_or_else(|| option.to_string(), str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Map one `jsonschema` error to a raw failure; `None` for keywords the
/// translation layer does not handle.
fn to_failure(error: &ValidationError<'_>, schema: &Value, body: &Value) -> Option<RawValidationFailure> {
    let instance_pointer = error.instance_path.to_string();
    let property = instance_property(&pointer_segments(&instance_pointer));
    let schema_pointer = error.schema_path.to_string();
    let schema_segments = pointer_segments(&schema_pointer);

    if let Some(index) = dependency_keyword_index(&schema_segments) {
        let holder = schema
            .pointer(&to_pointer(&schema_segments[..index]))
            .cloned()
            .unwrap_or(Value::Null);
        let dependency = required_property(error)?;
        let dependent = match schema_segments.get(index + 1) {
            Some(dependent) => dependent.clone(),
            None => dependent_from_map(
                &holder[schema_segments[index].as_str()],
                &dependency,
                body.pointer(&instance_pointer),
            )?,
        };
        let dependent_path = format!("{property}.{dependent}");
        let message = format!("property {dependency} not found, required by {dependent_path}");
        return Some(
            RawValidationFailure::new(
                property,
                FailureKind::Dependencies,
                FailureArgument::Text(dependent_path),
                message,
            )
            .with_schema(holder)
            .with_dependency(dependency),
        );
    }

    let keyword = schema_segments.last()?;
    let Some(kind) = FailureKind::from_keyword(keyword) else {
        tracing::debug!(%keyword, %property, "skipping unhandled validation keyword");
        return None;
    };
    let keyword_value = schema.pointer(&schema_pointer);
    let holder = schema
        .pointer(&to_pointer(&schema_segments[..schema_segments.len() - 1]))
        .cloned()
        .unwrap_or(Value::Null);

    let (argument, message) = match kind {
        FailureKind::Required => {
            let missing = required_property(error)?;
            let message = format!("requires property \"{missing}\"");
            (FailureArgument::Text(missing), message)
        }
        FailureKind::Type => {
            let types = type_names(keyword_value);
            let message = format!("is not of a type(s) {}", types.join(","));
            (FailureArgument::List(types), message)
        }
        FailureKind::Format => {
            let format = keyword_value.and_then(Value::as_str).unwrap_or_default();
            (FailureArgument::Text(format.to_string()), format_message(format))
        }
        FailureKind::Pattern => {
            let pattern = keyword_value.and_then(Value::as_str).unwrap_or_default();
            let message = format!("does not match pattern \"{pattern}\"");
            (FailureArgument::Text(pattern.to_string()), message)
        }
        FailureKind::Enum => {
            let options = enum_options(keyword_value);
            let message = format!("is not one of enum values: {}", options.join(","));
            (FailureArgument::List(options), message)
        }
        FailureKind::AnyOf => {
            let count = keyword_value.and_then(Value::as_array).map_or(0, Vec::len);
            let branches: Vec<String> = (0..count).map(|i| format!("[subschema {i}]")).collect();
            let message = format!("is not any of {}", branches.join(","));
            (FailureArgument::List(branches), message)
        }
        FailureKind::Dependencies => return None,
    };

    Some(RawValidationFailure::new(property, kind, argument, message).with_schema(holder))
}
