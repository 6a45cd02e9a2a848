//! # Raw Validation Failures
//!
//! The record a validator produces for each rule a request body breaks.
//! The shape follows the classic `jsonschema` failure format used by the
//! permit routes: a dotted `property` path rooted at `instance`, the
//! failing keyword as `name`, a keyword-specific `argument`, and a
//! `stack` line of the form `"<property> <message>"`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker every instance path starts with.
pub const INSTANCE_ROOT: &str = "instance";

/// Failing schema keyword. Only the keywords the translation layer
/// understands are represented; the validator drops everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// A required property is absent.
    Required,
    /// The value has the wrong JSON type.
    Type,
    /// A `format` check failed.
    Format,
    /// A `pattern` check failed.
    Pattern,
    /// The value is not one of the `enum` options.
    Enum,
    /// A property is present without the property it depends on.
    Dependencies,
    /// None of the `anyOf` alternatives matched.
    AnyOf,
}

impl FailureKind {
    /// Every kind, in keyword order.
    pub const ALL: [FailureKind; 7] = [
        FailureKind::Required,
        FailureKind::Type,
        FailureKind::Format,
        FailureKind::Pattern,
        FailureKind::Enum,
        FailureKind::Dependencies,
        FailureKind::AnyOf,
    ];

    /// The JSON Schema keyword this kind stands for.
    pub fn keyword(&self) -> &'static str {
        match self {
            FailureKind::Required => "required",
            FailureKind::Type => "type",
            FailureKind::Format => "format",
            FailureKind::Pattern => "pattern",
            FailureKind::Enum => "enum",
            FailureKind::Dependencies => "dependencies",
            FailureKind::AnyOf => "anyOf",
        }
    }

    /// Look up a kind by its JSON Schema keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Keyword-specific argument of a failure: a single name (required
/// property, dependent property, format name) or a list (expected types,
/// enum options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FailureArgument {
    /// A single string argument.
    Text(String),
    /// A list argument.
    List(Vec<String>),
}

impl FailureArgument {
    /// The argument as a single string, if it is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FailureArgument::Text(text) => Some(text),
            FailureArgument::List(_) => None,
        }
    }

    /// The text argument, or the first element of a list argument.
    pub fn first(&self) -> Option<&str> {
        match self {
            FailureArgument::Text(text) => Some(text),
            FailureArgument::List(items) => items.first().map(String::as_str),
        }
    }
}

/// One rule a request body breaks, as reported by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawValidationFailure {
    /// Dotted path of the offending instance, e.g. `instance.applicant`.
    pub property: String,
    /// Failing keyword.
    pub name: FailureKind,
    /// Keyword-specific argument.
    pub argument: FailureArgument,
    /// Validator message, without the property prefix.
    pub message: String,
    /// Schema fragment holding the failing keyword.
    #[serde(default)]
    pub schema: Value,
    /// `"<property> <message>"`.
    pub stack: String,
    /// Name of the missing property a `dependencies` failure is about,
    /// when the validator can report it directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
}

impl RawValidationFailure {
    /// Build a failure; `stack` is derived from `property` and `message`.
    pub fn new(
        property: impl Into<String>,
        name: FailureKind,
        argument: FailureArgument,
        message: impl Into<String>,
    ) -> Self {
        let property = property.into();
        let message = message.into();
        let stack = format!("{property} {message}");
        Self {
            property,
            name,
            argument,
            message,
            schema: Value::Null,
            stack,
            dependency: None,
        }
    }

    /// Attach the schema fragment holding the failing keyword.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    /// Attach a structured dependency name.
    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependency = Some(dependency.into());
        self
    }
}

/// Build the dotted `instance` path for a list of instance segments.
pub fn instance_property<S: AsRef<str>>(segments: &[S]) -> String {
    let mut property = String::from(INSTANCE_ROOT);
    for segment in segments {
        property.push('.');
        property.push_str(segment.as_ref());
    }
    property
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyword_round_trip() {
        for kind in FailureKind::ALL {
            assert_eq!(FailureKind::from_keyword(kind.keyword()), Some(kind));
        }
        assert_eq!(FailureKind::from_keyword("minLength"), None);
    }

    #[test]
    fn test_stack_is_property_and_message() {
        let failure = RawValidationFailure::new(
            "instance.applicant",
            FailureKind::Required,
            FailureArgument::Text("firstName".into()),
            "requires property \"firstName\"",
        );
        assert_eq!(
            failure.stack,
            "instance.applicant requires property \"firstName\""
        );
        assert_eq!(failure.schema, Value::Null);
        assert!(failure.dependency.is_none());
    }

    #[test]
    fn test_argument_first() {
        assert_eq!(FailureArgument::Text("a".into()).first(), Some("a"));
        assert_eq!(
            FailureArgument::List(vec!["string".into(), "null".into()]).first(),
            Some("string")
        );
        assert_eq!(FailureArgument::List(vec![]).first(), None);
        assert_eq!(FailureArgument::List(vec!["x".into()]).as_text(), None);
    }

    #[test]
    fn test_deserialize_legacy_failure() {
        let failure: RawValidationFailure = serde_json::from_value(json!({
            "property": "instance.applicantInfo",
            "name": "type",
            "argument": ["string"],
            "message": "is not of a type(s) string",
            "schema": {"type": "string"},
            "stack": "instance.applicantInfo is not of a type(s) string"
        }))
        .unwrap();
        assert_eq!(failure.name, FailureKind::Type);
        assert_eq!(failure.argument.first(), Some("string"));
        assert!(failure.dependency.is_none());
    }

    #[test]
    fn test_instance_property() {
        assert_eq!(instance_property::<&str>(&[]), "instance");
        assert_eq!(
            instance_property(&["applicant", "zipCode"]),
            "instance.applicant.zipCode"
        );
    }
}
