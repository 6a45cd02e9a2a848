//! # Failure Translation
//!
//! Turns raw validator failures into [`NormalizedError`] records.
//!
//! | failure kind | records |
//! |---|---|
//! | `required` | `missing` for the field, plus one per field it requires in turn |
//! | `type` | `type` carrying the first expected type |
//! | `format`, `pattern` | `format` |
//! | `enum` | `enum` carrying the validator message |
//! | `dependencies` | `dependencies` linking the dependent field to the missing one |
//! | `anyOf` | one `anyOf` listing the first required field of each branch |
//!
//! Paths in the output have the `instance` marker stripped.

use serde_json::Value;

use epermit_schema::{FailureKind, RawValidationFailure};

use crate::dependency::{DependencyExtractor, StructuredDependency};
use crate::error::{NormalizedError, TranslateError};
use crate::path::{combine_prop_argument, remove_instance};
use crate::required::collect_required;

/// Translates validator failures against the schema they came from.
///
/// Holds no per-request state; one translator serves any number of
/// requests.
#[derive(Debug, Clone, Default)]
pub struct ErrorTranslator<D = StructuredDependency> {
    extractor: D,
}

impl ErrorTranslator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: DependencyExtractor> ErrorTranslator<D> {
    /// A translator using a custom dependency-name extractor.
    pub fn with_extractor(extractor: D) -> Self {
        Self { extractor }
    }

    /// Translate `failures` in order. `schema` is the dereferenced schema
    /// the body was validated against; `required` expansion walks it.
    ///
    /// # Errors
    ///
    /// Fails on the first failure that cannot be translated: a
    /// `dependencies` failure whose dependency name cannot be found, or a
    /// failure missing the argument its kind needs.
    pub fn translate(
        &self,
        failures: &[RawValidationFailure],
        schema: &Value,
    ) -> Result<Vec<NormalizedError>, TranslateError> {
        let mut errors = Vec::with_capacity(failures.len());
        for failure in failures {
            match failure.name {
                FailureKind::Required => handle_missing(&mut errors, failure, schema)?,
                FailureKind::Type => handle_type(&mut errors, failure)?,
                FailureKind::Format | FailureKind::Pattern => {
                    errors.push(NormalizedError::format(remove_instance(&failure.property)));
                }
                FailureKind::Enum => errors.push(NormalizedError::enumeration(
                    remove_instance(&failure.property),
                    failure.message.as_str(),
                )),
                FailureKind::Dependencies => self.handle_dependency(&mut errors, failure)?,
                FailureKind::AnyOf => handle_any_of(&mut errors, failure),
            }
        }
        Ok(errors)
    }

    fn handle_dependency(
        &self,
        errors: &mut Vec<NormalizedError>,
        failure: &RawValidationFailure,
    ) -> Result<(), TranslateError> {
        let dependent = failure
            .argument
            .as_text()
            .ok_or_else(|| missing_argument(failure))?;
        let name = self.extractor.dependency_name(failure)?;
        let dependency = combine_prop_argument(remove_instance(&failure.property), &name);
        errors.push(NormalizedError::dependency(remove_instance(dependent), dependency));
        Ok(())
    }
}

fn missing_argument(failure: &RawValidationFailure) -> TranslateError {
    TranslateError::MissingArgument {
        kind: failure.name,
        property: failure.property.clone(),
    }
}

fn handle_missing(
    errors: &mut Vec<NormalizedError>,
    failure: &RawValidationFailure,
    schema: &Value,
) -> Result<(), TranslateError> {
    let missing = failure
        .argument
        .first()
        .ok_or_else(|| missing_argument(failure))?;
    let field = combine_prop_argument(remove_instance(&failure.property), missing);

    errors.push(NormalizedError::missing(field.as_str()));
    errors.extend(
        collect_required(schema, &field)
            .into_iter()
            .map(NormalizedError::missing),
    );
    Ok(())
}

fn handle_type(
    errors: &mut Vec<NormalizedError>,
    failure: &RawValidationFailure,
) -> Result<(), TranslateError> {
    let expected = failure
        .argument
        .first()
        .ok_or_else(|| missing_argument(failure))?;
    errors.push(NormalizedError::type_mismatch(
        remove_instance(&failure.property),
        expected,
    ));
    Ok(())
}

fn handle_any_of(errors: &mut Vec<NormalizedError>, failure: &RawValidationFailure) {
    let property = remove_instance(&failure.property);
    let branches = failure
        .schema
        .get("anyOf")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let fields: Vec<String> = branches
        .iter()
        .filter_map(|branch| {
            let first = branch
                .get("required")
                .and_then(Value::as_array)
                .and_then(|required| required.first())
                .and_then(Value::as_str);
            if first.is_none() {
                tracing::debug!(%property, "anyOf branch without required field skipped");
            }
            first
        })
        .map(|name| combine_prop_argument(property, name))
        .collect();

    if fields.is_empty() {
        tracing::warn!(%property, "anyOf failure without required alternatives");
        return;
    }
    errors.push(NormalizedError::any_of(fields));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::StackMessageExtractor;
    use crate::error::ErrorType;
    use epermit_schema::FailureArgument;
    use serde_json::json;

    fn failure(property: &str, kind: FailureKind, argument: FailureArgument, message: &str) -> RawValidationFailure {
        RawValidationFailure::new(property, kind, argument, message)
    }

    fn text(s: &str) -> FailureArgument {
        FailureArgument::Text(s.to_string())
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "applicantInfo": {
                    "type": "object",
                    "allOf": [{"required": ["firstName", "lastName"]}],
                    "properties": {
                        "firstName": {"type": "string"},
                        "lastName": {"type": "string"}
                    }
                }
            }
        })
    }

    fn fields(errors: &[NormalizedError]) -> Vec<&str> {
        errors.iter().filter_map(NormalizedError::field).collect()
    }

    #[test]
    fn test_required_expands_all_of_siblings() {
        let failures = [failure(
            "instance",
            FailureKind::Required,
            text("applicantInfo"),
            "requires property \"applicantInfo\"",
        )];
        let errors = ErrorTranslator::new().translate(&failures, &schema()).unwrap();
        assert_eq!(
            fields(&errors),
            vec!["applicantInfo", "applicantInfo.firstName", "applicantInfo.lastName"]
        );
        assert!(errors.iter().all(|e| e.error_type() == ErrorType::Missing));
    }

    #[test]
    fn test_required_nested_field() {
        let failures = [failure(
            "instance.applicantInfo",
            FailureKind::Required,
            text("lastName"),
            "requires property \"lastName\"",
        )];
        let errors = ErrorTranslator::new().translate(&failures, &schema()).unwrap();
        assert_eq!(fields(&errors), vec!["applicantInfo.lastName"]);
    }

    #[test]
    fn test_type_uses_first_expected_type() {
        let failures = [failure(
            "instance.applicantInfo.firstName",
            FailureKind::Type,
            FailureArgument::List(vec!["string".into(), "null".into()]),
            "is not of a type(s) string,null",
        )];
        let errors = ErrorTranslator::new().translate(&failures, &schema()).unwrap();
        assert_eq!(errors, vec![NormalizedError::type_mismatch("applicantInfo.firstName", "string")]);
    }

    #[test]
    fn test_type_without_argument_is_an_error() {
        let failures = [failure(
            "instance.x",
            FailureKind::Type,
            FailureArgument::List(vec![]),
            "is not of a type(s) ",
        )];
        let err = ErrorTranslator::new().translate(&failures, &schema()).unwrap_err();
        assert!(matches!(err, TranslateError::MissingArgument { kind: FailureKind::Type, .. }));
    }

    #[test]
    fn test_format_pattern_and_enum() {
        let failures = [
            failure("instance.dayPhone.areaCode", FailureKind::Format, text("areaCodeFormat"), "x"),
            failure("instance.email", FailureKind::Pattern, text("^.+@.+$"), "x"),
            failure(
                "instance.orgType",
                FailureKind::Enum,
                FailureArgument::List(vec!["Person".into()]),
                "is not one of enum values: Person",
            ),
        ];
        let errors = ErrorTranslator::new().translate(&failures, &schema()).unwrap();
        assert_eq!(
            errors,
            vec![
                NormalizedError::format("dayPhone.areaCode"),
                NormalizedError::format("email"),
                NormalizedError::enumeration("orgType", "is not one of enum values: Person"),
            ]
        );
    }

    #[test]
    fn test_dependency_from_stack() {
        let failures = [failure(
            "instance.applicantInfo",
            FailureKind::Dependencies,
            text("instance.applicantInfo.orgType"),
            "property firstName not found, required by instance.applicantInfo.orgType",
        )];
        let errors = ErrorTranslator::with_extractor(StackMessageExtractor)
            .translate(&failures, &schema())
            .unwrap();
        assert_eq!(
            errors,
            vec![NormalizedError::dependency("applicantInfo.orgType", "applicantInfo.firstName")]
        );
    }

    #[test]
    fn test_dependency_at_root_has_no_leading_dot() {
        let failures = [failure(
            "instance",
            FailureKind::Dependencies,
            text("instance.orgType"),
            "property orgName not found, required by instance.orgType",
        )];
        let errors = ErrorTranslator::new().translate(&failures, &schema()).unwrap();
        assert_eq!(errors[0].dependency_field(), Some("orgName"));
        assert_eq!(errors[0].field(), Some("orgType"));
    }

    #[test]
    fn test_dependency_without_markers_fails() {
        let failures = [failure(
            "instance",
            FailureKind::Dependencies,
            text("instance.orgType"),
            "needs orgName",
        )];
        let err = ErrorTranslator::new().translate(&failures, &schema()).unwrap_err();
        assert!(matches!(err, TranslateError::DependencyMessageFormat { .. }));
    }

    #[test]
    fn test_any_of_lists_first_required_of_each_branch() {
        let failures = [failure(
            "instance.contact",
            FailureKind::AnyOf,
            FailureArgument::List(vec!["[subschema 0]".into(), "[subschema 1]".into()]),
            "is not any of [subschema 0],[subschema 1]",
        )
        .with_schema(json!({
            "anyOf": [
                {"required": ["email"]},
                {"properties": {}},
                {"required": ["phone", "fax"]}
            ]
        }))];
        let errors = ErrorTranslator::new().translate(&failures, &schema()).unwrap();
        assert_eq!(
            errors,
            vec![NormalizedError::any_of(vec!["contact.email".into(), "contact.phone".into()])]
        );
    }

    #[test]
    fn test_any_of_without_alternatives_emits_nothing() {
        let failures = [failure("instance", FailureKind::AnyOf, FailureArgument::List(vec![]), "x")
            .with_schema(json!({"anyOf": []}))];
        let errors = ErrorTranslator::new().translate(&failures, &schema()).unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let errors = ErrorTranslator::new().translate(&[], &schema()).unwrap();
        assert!(errors.is_empty());
    }
}
