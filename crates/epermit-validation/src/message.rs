//! # Message Generation
//!
//! Renders one sentence per [`NormalizedError`] and joins them into the
//! summary shown above the form.
//!
//! | errorType | template |
//! |---|---|
//! | `missing` | `<Field> is a required field.` |
//! | `type` | `<Field> is expected to be type '<type>'.` |
//! | `format` | `<Field><suffix>` (suffix from [`PatternMessages`]) |
//! | `enum` | `<Field> <enumMessage>.` |
//! | `dependencies` | `Having <Field> requires that <Dependency> be provided.` |
//! | `anyOf` | `Either <A> or <B> is a required field.` |
//! | `requiredFileMissing` | `<Field> is a required file.` |
//! | `invalidExtension` | `<Field> must be one of the following extensions: a, b.` |
//! | `invalidMime` | `<Field> must be one of the following mime types: a, b.` |
//! | `invalidSizeSmall` | `<Field> cannot be an empty file.` |
//! | `invalidSizeLarge` | `<Field> cannot be larger than <max> MB.` |

use crate::error::{ErrorType, ExpectedFieldType, NormalizedError};
use crate::patterns::PatternMessages;
use crate::readable::readable_path;

/// Render the message for one record.
///
/// `None` if the record lacks data its template needs, which only
/// happens for records deserialized from elsewhere.
pub fn render_message(error: &NormalizedError, patterns: &PatternMessages) -> Option<String> {
    if error.error_type() == ErrorType::AnyOf {
        return any_of_message(error.any_of_fields()?);
    }

    let path = error.field()?;
    let field = readable_path(path);
    let message = match error.error_type() {
        ErrorType::Missing => format!("{field} is a required field."),
        ErrorType::Type => {
            let expected = error.expected_field_type()?;
            format!("{field} is expected to be type '{expected}'.")
        }
        ErrorType::Format => {
            let name = path.rsplit('.').next().unwrap_or(path);
            format!("{field}{}", patterns.suffix_for(name))
        }
        ErrorType::Enum => format!("{field} {}.", error.enum_message()?),
        ErrorType::Dependencies => {
            let dependency = readable_path(error.dependency_field()?);
            format!("Having {field} requires that {dependency} be provided.")
        }
        ErrorType::AnyOf => return None,
        file_error => return file_message(file_error, &field, error.expected_field_type()),
    };
    Some(message)
}

fn any_of_message(fields: &[String]) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    let alternatives: Vec<String> = fields.iter().map(|f| readable_path(f)).collect();
    Some(format!("Either {} is a required field.", alternatives.join(" or ")))
}

fn file_message(
    error_type: ErrorType,
    field: &str,
    expected: Option<&ExpectedFieldType>,
) -> Option<String> {
    let message = match (error_type, expected) {
        (ErrorType::RequiredFileMissing, _) => format!("{field} is a required file."),
        (ErrorType::InvalidExtension, Some(ExpectedFieldType::List(allowed))) => format!(
            "{field} must be one of the following extensions: {}.",
            allowed.join(", ")
        ),
        (ErrorType::InvalidMime, Some(ExpectedFieldType::List(allowed))) => format!(
            "{field} must be one of the following mime types: {}.",
            allowed.join(", ")
        ),
        (ErrorType::InvalidSizeSmall, _) => format!("{field} cannot be an empty file."),
        (ErrorType::InvalidSizeLarge, Some(max)) => {
            format!("{field} cannot be larger than {max} MB.")
        }
        _ => return None,
    };
    Some(message)
}

/// Render every record, store each message on its record, and join the
/// messages with single spaces.
///
/// Records that cannot be rendered are left without a message and
/// contribute nothing to the summary. No records yield `""`.
pub fn generate_error_message(errors: &mut [NormalizedError], patterns: &PatternMessages) -> String {
    let mut messages = Vec::with_capacity(errors.len());
    for error in errors.iter_mut() {
        match render_message(error, patterns) {
            Some(message) => {
                messages.push(message.clone());
                error.set_message(message);
            }
            None => {
                tracing::warn!(error_type = %error.error_type(), "error record lacks template data");
            }
        }
    }
    messages.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(error: &NormalizedError) -> String {
        render_message(error, &PatternMessages::default()).unwrap()
    }

    #[test]
    fn test_field_templates() {
        assert_eq!(
            render(&NormalizedError::missing("applicantInfo.firstName")),
            "Applicant Info/First Name is a required field."
        );
        assert_eq!(
            render(&NormalizedError::type_mismatch("numberParticipants", "integer")),
            "Number Participants is expected to be type 'integer'."
        );
        assert_eq!(
            render(&NormalizedError::enumeration(
                "applicantInfo.orgType",
                "is not one of enum values: Person,Corporation"
            )),
            "Applicant Info/Org Type is not one of enum values: Person,Corporation."
        );
        assert_eq!(
            render(&NormalizedError::dependency(
                "applicantInfo.orgType",
                "applicantInfo.firstName"
            )),
            "Having Applicant Info/Org Type requires that Applicant Info/First Name be provided."
        );
    }

    #[test]
    fn test_format_suffix_by_last_segment() {
        assert_eq!(
            render(&NormalizedError::format("applicantInfo.dayPhone.areaCode")),
            "Applicant Info/Day Phone/Area Code must be a 3 digit number."
        );
        assert_eq!(
            render(&NormalizedError::format("applicantInfo.nickname")),
            "Applicant Info/Nickname is not in a valid format."
        );
    }

    #[test]
    fn test_any_of_template() {
        let error = NormalizedError::any_of(vec!["contact.email".into(), "contact.phone".into()]);
        assert_eq!(
            render(&error),
            "Either Contact/Email or Contact/Phone is a required field."
        );
    }

    #[test]
    fn test_file_templates() {
        assert_eq!(
            render(&NormalizedError::required_file_missing("guideDocumentation")),
            "Guide Documentation is a required file."
        );
        assert_eq!(
            render(&NormalizedError::invalid_extension(
                "guideDocumentation",
                vec!["pdf".into(), "docx".into()]
            )),
            "Guide Documentation must be one of the following extensions: pdf, docx."
        );
        assert_eq!(
            render(&NormalizedError::invalid_mime(
                "guideDocumentation",
                vec!["application/pdf".into(), "text/rtf".into()]
            )),
            "Guide Documentation must be one of the following mime types: application/pdf, text/rtf."
        );
        assert_eq!(
            render(&NormalizedError::invalid_size_small("guideDocumentation")),
            "Guide Documentation cannot be an empty file."
        );
        assert_eq!(
            render(&NormalizedError::invalid_size_large("guideDocumentation", 2.5)),
            "Guide Documentation cannot be larger than 2.5 MB."
        );
    }

    #[test]
    fn test_generate_sets_messages_and_joins() {
        let mut errors = vec![
            NormalizedError::missing("applicantInfo"),
            NormalizedError::format("applicantInfo.zipCode"),
        ];
        let summary = generate_error_message(&mut errors, &PatternMessages::default());
        assert_eq!(
            summary,
            "Applicant Info is a required field. Applicant Info/Zip Code must be a 5 or 9 digit zip code."
        );
        assert_eq!(errors[0].message(), Some("Applicant Info is a required field."));
        assert!(errors[1].message().is_some());
    }

    #[test]
    fn test_empty_list_yields_empty_summary() {
        assert_eq!(generate_error_message(&mut [], &PatternMessages::default()), "");
    }

    #[test]
    fn test_incomplete_record_is_skipped() {
        let error: NormalizedError =
            serde_json::from_value(json!({"field": "a", "errorType": "type"})).unwrap();
        let mut errors = vec![error, NormalizedError::missing("b")];
        let summary = generate_error_message(&mut errors, &PatternMessages::default());
        assert_eq!(summary, "B is a required field.");
        assert!(errors[0].message().is_none());
    }
}
