//! Human-readable field names.
//!
//! Schema field names are camelCase (`zipCode`, `contactURL`); messages
//! show them as words (`Zip Code`, `Contact URL`) and nested paths as
//! `Applicant Info/Zip Code`.

use serde_json::Value;

/// Turn a camelCase field name into capitalized words.
///
/// A space goes before every upper-case letter and the first letter is
/// upper-cased; the spelled-out acronyms `Z I P` and `U R L` are then
/// collapsed to `Zip` and `URL` (first occurrence each). A name that
/// already starts upper-case gets no leading space.
pub fn make_field_readable(field: &str) -> String {
    let mut spaced = String::with_capacity(field.len() * 2);
    for c in field.chars() {
        if c.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(c);
    }

    let mut chars = spaced.trim_start().chars();
    let readable = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };

    readable
        .replacen("Z I P", "Zip", 1)
        .replacen("U R L", "URL", 1)
}

/// Readable form of a dotted path: segments made readable and joined
/// with `/`.
pub fn readable_path(path: &str) -> String {
    path.split('.')
        .map(make_field_readable)
        .collect::<Vec<_>>()
        .join("/")
}

/// [`readable_path`] for a JSON value; `None` unless it is a string.
pub fn make_path_readable(path: &Value) -> Option<String> {
    path.as_str().map(readable_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_make_field_readable() {
        assert_eq!(make_field_readable("zipCode"), "Zip Code");
        assert_eq!(make_field_readable("contactURL"), "Contact URL");
        assert_eq!(make_field_readable("firstName"), "First Name");
        assert_eq!(make_field_readable("ZIP"), "Zip");
        assert_eq!(make_field_readable("email"), "Email");
        assert_eq!(make_field_readable(""), "");
    }

    #[test]
    fn test_capitalized_input_has_no_leading_space() {
        assert_eq!(make_field_readable("Name"), "Name");
        assert_eq!(make_field_readable("URLPath"), "URL Path");
    }

    #[test]
    fn test_make_path_readable() {
        assert_eq!(
            make_path_readable(&json!("applicant.zipCode")).as_deref(),
            Some("Applicant/Zip Code")
        );
        assert_eq!(
            make_path_readable(&json!("applicantInfo.dayPhone.areaCode")).as_deref(),
            Some("Applicant Info/Day Phone/Area Code")
        );
        assert_eq!(make_path_readable(&json!(42)), None);
        assert_eq!(make_path_readable(&Value::Null), None);
    }

    proptest! {
        /// One path segment per readable segment.
        #[test]
        fn readable_path_preserves_segment_count(path in "[a-z][a-zA-Z]{0,8}(\\.[a-z][a-zA-Z]{0,8}){0,4}") {
            let readable = readable_path(&path);
            prop_assert_eq!(readable.split('/').count(), path.split('.').count());
        }

        /// Lower-case-led names start with an upper-case letter and keep
        /// every letter.
        #[test]
        fn field_readable_keeps_letters(field in "[a-z][a-z]{0,6}([A-Z][a-z]{1,6}){0,3}") {
            let readable = make_field_readable(&field);
            prop_assert!(readable.chars().next().is_some_and(|c| c.is_ascii_uppercase()));
            let letters: String = readable.chars().filter(|c| !c.is_whitespace()).collect();
            prop_assert_eq!(letters.to_lowercase(), field.to_lowercase());
        }
    }
}
