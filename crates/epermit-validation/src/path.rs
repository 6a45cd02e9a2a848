//! Dotted field paths.

/// Strip the leading `instance` marker from a validator property path.
///
/// Everything after the first `.` is kept; a path without a dot (the bare
/// `instance` root) yields the empty string.
pub fn remove_instance(property: &str) -> &str {
    property.split_once('.').map_or("", |(_, rest)| rest)
}

/// Append `argument` to `property`, or return `argument` alone at the root.
pub fn combine_prop_argument(property: &str, argument: &str) -> String {
    if property.is_empty() {
        argument.to_string()
    } else {
        format!("{property}.{argument}")
    }
}

/// Split a dotted path into segments; the root path has none.
pub fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_remove_instance() {
        assert_eq!(remove_instance("instance.applicantInfo.zipCode"), "applicantInfo.zipCode");
        assert_eq!(remove_instance("instance.a"), "a");
        assert_eq!(remove_instance("instance"), "");
        assert_eq!(remove_instance(""), "");
    }

    #[test]
    fn test_combine_prop_argument() {
        assert_eq!(combine_prop_argument("", "applicantInfo"), "applicantInfo");
        assert_eq!(
            combine_prop_argument("applicantInfo", "firstName"),
            "applicantInfo.firstName"
        );
    }

    #[test]
    fn test_segments() {
        assert!(segments("").is_empty());
        assert_eq!(segments("a.b"), vec!["a", "b"]);
    }

    proptest! {
        /// Stripping the marker from an `instance.` path recovers the path.
        #[test]
        fn remove_instance_inverts_prefix(path in "[a-zA-Z]{1,8}(\\.[a-zA-Z]{1,8}){0,4}") {
            let property = format!("instance.{path}");
            prop_assert_eq!(remove_instance(&property), path.as_str());
        }

        /// Dotless input always yields the empty string.
        #[test]
        fn remove_instance_dotless_is_empty(word in "[a-zA-Z]{0,12}") {
            prop_assert_eq!(remove_instance(&word), "");
        }
    }
}
