//! # Upload Files
//!
//! Permit applications carry supporting documents (insurance
//! certificates, operating plans, guide documentation) as multipart file
//! fields. The application schema declares each slot as a property of
//! `type: file` whose fragment holds the upload constraints:
//!
//! ```json
//! "guideDocumentation": {
//!   "type": "file",
//!   "filetypecode": "gud",
//!   "validExtensions": ["pdf", "doc", "docx", "rtf"],
//!   "maxSize": 10,
//!   "requiredFile": false
//! }
//! ```
//!
//! [`discover_file_fields`] finds those slots; [`validate_file`] checks
//! one upload against its slot.

use std::path::Path;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use epermit_schema::{Edge, SchemaNode, SchemaVisitor};

use crate::error::{NormalizedError, TranslateError};

/// MIME types accepted for every file field: Word (docx and doc), RTF,
/// and PDF.
pub const ALLOWED_MIME_TYPES: [&str; 4] = [
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "text/rtf",
    "application/pdf",
];

const BYTES_PER_MEGABYTE: f64 = 1_000_000.0;

/// Upload constraints of one file field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConstraints {
    /// Document category code recorded with stored files.
    #[serde(default)]
    pub filetypecode: Option<String>,
    /// Allowed extensions, without the dot. Empty means any extension.
    #[serde(default)]
    pub valid_extensions: Vec<String>,
    /// Size limit in megabytes (10^6 bytes). `None` means no limit.
    #[serde(default)]
    pub max_size: Option<f64>,
    #[serde(default)]
    pub required_file: bool,
}

impl FieldConstraints {
    /// Read the constraints from a file field's schema fragment.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::FileConstraints` if a constraint keyword
    /// has the wrong shape.
    pub fn from_schema(field: &str, schema: &Value) -> Result<Self, TranslateError> {
        Self::deserialize(schema).map_err(|e| TranslateError::FileConstraints {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }

    /// Case-insensitive anchored alternation over the allowed extensions,
    /// or `None` when any extension is allowed.
    fn extension_pattern(&self, field: &str) -> Result<Option<Regex>, TranslateError> {
        if self.valid_extensions.is_empty() {
            return Ok(None);
        }
        let alternation = self
            .valid_extensions
            .iter()
            .map(|ext| regex::escape(ext))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("(?i)^(?:{alternation})$"))
            .map(Some)
            .map_err(|e| TranslateError::FileConstraints {
                field: field.to_string(),
                reason: format!("invalid extension pattern: {e}"),
            })
    }
}

/// One uploaded file as received from the multipart carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub original_name: String,
    pub size: u64,
    pub mime_type: String,
    pub encoding: String,
    pub buffer: Vec<u8>,
}

impl UploadedFile {
    /// An upload whose size is the buffer length.
    pub fn new(original_name: impl Into<String>, mime_type: impl Into<String>, buffer: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            size: buffer.len() as u64,
            mime_type: mime_type.into(),
            encoding: "7bit".to_string(),
            buffer,
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }
}

/// What the intake layer records about an accepted upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileInfo {
    /// The file field the upload was sent in.
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filetypecode: Option<String>,
    pub original_name: String,
    /// Extension without the dot, as uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    pub size: u64,
    pub mime_type: String,
    pub encoding: String,
    /// Storage name: `<field>-<original stem>-<unix millis>.<ext>`.
    pub filename: String,
}

impl UploadedFileInfo {
    /// Derive the info for `file`, stamped with the current time.
    pub fn derive(file: &UploadedFile, field: &str, constraints: &FieldConstraints) -> Self {
        Self::derive_at(file, field, constraints, Utc::now())
    }

    /// Derive the info for `file`, stamped with `now`.
    pub fn derive_at(
        file: &UploadedFile,
        field: &str,
        constraints: &FieldConstraints,
        now: DateTime<Utc>,
    ) -> Self {
        let original = Path::new(&file.original_name);
        let stem = original
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file.original_name.as_str());
        let extension = original
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string);
        let millis = now.timestamp_millis();
        let filename = match &extension {
            Some(ext) => format!("{field}-{stem}-{millis}.{ext}"),
            None => format!("{field}-{stem}-{millis}"),
        };

        Self {
            field: field.to_string(),
            filetypecode: constraints.filetypecode.clone(),
            original_name: file.original_name.clone(),
            extension,
            size: file.size,
            mime_type: file.mime_type.clone(),
            encoding: file.encoding.clone(),
            filename,
        }
    }
}

/// A file field declared in a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FileField {
    /// Bare field name; uploads are keyed by it.
    pub name: String,
    /// The field's schema fragment.
    pub schema: Value,
}

impl FileField {
    pub fn constraints(&self) -> Result<FieldConstraints, TranslateError> {
        FieldConstraints::from_schema(&self.name, &self.schema)
    }
}

/// Every field declared `type: file` in `schema`, in walk order.
///
/// Looks through `allOf` and `oneOf` branches and into properties
/// declared `type: object`. A name declared more than once is reported
/// once, with its first declaration.
pub fn discover_file_fields(schema: &Value) -> Vec<FileField> {
    let mut discovery = FileDiscovery::default();
    SchemaNode::parse(schema).walk(&mut discovery);
    discovery.fields
}

#[derive(Default)]
struct FileDiscovery {
    fields: Vec<FileField>,
}

impl<'s> SchemaVisitor<'s> for FileDiscovery {
    fn visit(&mut self, path: &[&'s str], node: &SchemaNode<'s>) {
        let Some(name) = path.last() else {
            return;
        };
        if node.declared_type() != Some("file") {
            return;
        }
        if self.fields.iter().any(|f| f.name == *name) {
            tracing::debug!(field = %name, "duplicate file field declaration ignored");
            return;
        }
        self.fields.push(FileField {
            name: name.to_string(),
            schema: node.fragment().clone(),
        });
    }

    fn follow(&mut self, _path: &[&'s str], edge: Edge<'s>, child: &SchemaNode<'s>) -> bool {
        match edge {
            Edge::AllOf | Edge::OneOf => true,
            Edge::Property(_) => matches!(child.declared_type(), Some("file" | "object")),
        }
    }
}

/// `text/rtf; charset=utf-8` and `TEXT/RTF` both become `text/rtf`.
fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Check one file field.
///
/// With an upload: an empty file gives exactly one `invalidSizeSmall`.
/// Otherwise an extension outside the allowlist gives
/// `invalidExtension`, else a MIME type outside [`ALLOWED_MIME_TYPES`]
/// gives `invalidMime`; independently, a file over the limit gives
/// `invalidSizeLarge`. Without an upload, a required field gives
/// `requiredFileMissing`.
///
/// # Errors
///
/// Returns `TranslateError::FileConstraints` if the extension allowlist
/// does not compile.
pub fn validate_file(
    field: &str,
    constraints: &FieldConstraints,
    upload: Option<&UploadedFile>,
) -> Result<Vec<NormalizedError>, TranslateError> {
    let mut errors = Vec::new();

    let Some(file) = upload else {
        if constraints.required_file {
            errors.push(NormalizedError::required_file_missing(field));
        }
        return Ok(errors);
    };

    let info = UploadedFileInfo::derive(file, field, constraints);
    if info.size == 0 {
        tracing::debug!(field, filename = %info.filename, "empty upload");
        errors.push(NormalizedError::invalid_size_small(field));
        return Ok(errors);
    }

    let extension_ok = match constraints.extension_pattern(field)? {
        Some(pattern) => info
            .extension
            .as_deref()
            .is_some_and(|ext| pattern.is_match(ext)),
        None => true,
    };

    if !extension_ok {
        errors.push(NormalizedError::invalid_extension(
            field,
            constraints.valid_extensions.clone(),
        ));
    } else if !ALLOWED_MIME_TYPES.contains(&normalize_mime(&info.mime_type).as_str()) {
        errors.push(NormalizedError::invalid_mime(
            field,
            ALLOWED_MIME_TYPES.iter().map(|m| m.to_string()).collect(),
        ));
    }

    if let Some(max_size) = constraints.max_size {
        let megabytes = info.size as f64 / BYTES_PER_MEGABYTE;
        if megabytes > max_size {
            errors.push(NormalizedError::invalid_size_large(field, max_size));
        }
    }

    tracing::debug!(
        field,
        filename = %info.filename,
        errors = errors.len(),
        "checked uploaded file"
    );
    Ok(errors)
}
