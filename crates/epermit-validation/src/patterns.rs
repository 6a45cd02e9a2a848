//! Format-error message table.
//!
//! `format` and `pattern` failures are rendered as the readable field
//! path followed by a suffix looked up by the field's own name (the last
//! path segment), e.g. `Applicant Info/Day Phone/Area Code` +
//! `" must be a 3 digit number."`.

use std::collections::HashMap;
use std::path::Path;

use crate::error::TranslateError;

/// Suffix for fields the table has no entry for.
pub const DEFAULT_FORMAT_SUFFIX: &str = " is not in a valid format.";

/// Built-in suffixes for the fields of the permit application schemas.
const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("areaCode", " must be a 3 digit number."),
    ("number", " must be a 7 digit number."),
    ("extension", " must be a number."),
    ("zipCode", " must be a 5 or 9 digit zip code."),
    ("mailingZIP", " must be a 5 or 9 digit zip code."),
    ("emailAddress", " must be a valid email address."),
    ("email", " must be a valid email address."),
    ("website", " must be a valid URL."),
    ("contactURL", " must be a valid URL."),
    ("mailingState", " must be a 2 letter state abbreviation."),
    ("dateTimeRange", " must be a valid date and time."),
    ("startDateTime", " must be formatted as YYYY-MM-DDThh:mm:ssZ."),
    ("endDateTime", " must be formatted as YYYY-MM-DDThh:mm:ssZ."),
    ("numberParticipants", " must be a whole number."),
    ("numberSpectators", " must be a whole number."),
];

/// Field name to message-suffix table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMessages {
    messages: HashMap<String, String>,
}

impl Default for PatternMessages {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGES
                .iter()
                .map(|(field, suffix)| (field.to_string(), suffix.to_string()))
                .collect(),
        }
    }
}

impl PatternMessages {
    /// Parse a JSON object of `{"fieldName": " suffix."}` entries.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::PatternMessagesLoad` if `json` is not such
    /// an object.
    pub fn from_json_str(json: &str) -> Result<Self, TranslateError> {
        let messages: HashMap<String, String> =
            serde_json::from_str(json).map_err(|e| TranslateError::PatternMessagesLoad {
                path: "<inline>".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { messages })
    }

    /// Load a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::PatternMessagesLoad` if the file cannot be
    /// read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TranslateError> {
        let path = path.as_ref();
        let load_error = |reason: String| TranslateError::PatternMessagesLoad {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let messages: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?;
        tracing::debug!(path = %path.display(), entries = messages.len(), "loaded pattern messages");
        Ok(Self { messages })
    }

    /// The configured suffix for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.messages.get(field).map(String::as_str)
    }

    /// The suffix for `field`, or [`DEFAULT_FORMAT_SUFFIX`].
    pub fn suffix_for(&self, field: &str) -> &str {
        self.get(field).unwrap_or(DEFAULT_FORMAT_SUFFIX)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
