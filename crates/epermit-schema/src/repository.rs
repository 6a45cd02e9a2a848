//! # Schema Repository
//!
//! Loads application schema documents and resolves route references.
//!
//! ## Route References
//!
//! Each permit route names the schema its body is validated against as
//! `"<file>#<schemaName>"`, e.g. `"validation.json#tempOutfitterApplication"`.
//! The file part selects a loaded document (by file name), the fragment
//! selects one of its top-level sub-schemas.
//!
//! ## Dereferencing
//!
//! Sub-schemas reference each other by name (`{"$ref": "phoneNumber"}`,
//! `"#/definitions/phoneNumber"`, ...). The validator resolves those lazily
//! through its retriever, but the translation layer walks schemas directly
//! and needs them inlined: [`dereference`] produces that tree.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;

use crate::error::SchemaError;

/// File extensions recognized as schema documents.
const DOCUMENT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// A parsed `"<file>#<schemaName>"` route reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteSchemaRef {
    document: String,
    schema_name: String,
}

impl RouteSchemaRef {
    /// Build a reference from its parts.
    pub fn new(document: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            schema_name: schema_name.into(),
        }
    }

    /// Document file name (directory components stripped).
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Top-level sub-schema name.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }
}

impl FromStr for RouteSchemaRef {
    type Err = SchemaError;

    fn from_str(reference: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| SchemaError::InvalidRouteRef {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };
        let (file, fragment) = reference
            .split_once('#')
            .ok_or_else(|| invalid("missing '#' separator"))?;
        let document = Path::new(file.trim())
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| invalid("missing document file name"))?;
        let schema_name = fragment.trim().trim_start_matches('/');
        if schema_name.is_empty() {
            return Err(invalid("missing schema name after '#'"));
        }
        Ok(Self::new(document, schema_name))
    }
}

impl fmt::Display for RouteSchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document, self.schema_name)
    }
}

/// A route reference resolved against a loaded document.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    route: RouteSchemaRef,
    full_schema: Value,
    schema_to_use: Value,
    dereferenced: Value,
}

impl ResolvedSchema {
    /// The reference this schema was resolved from.
    pub fn route(&self) -> &RouteSchemaRef {
        &self.route
    }

    /// The whole document, holding every sub-schema.
    pub fn full_schema(&self) -> &Value {
        &self.full_schema
    }

    /// The sub-schema the route's body is validated against.
    pub fn schema_to_use(&self) -> &Value {
        &self.schema_to_use
    }

    /// The route's sub-schema with sibling `$ref`s inlined.
    pub fn dereferenced(&self) -> &Value {
        &self.dereferenced
    }
}

/// Schema documents loaded from a directory, indexed by file name.
#[derive(Debug, Default)]
pub struct SchemaRepository {
    schema_dir: PathBuf,
    documents: HashMap<String, Value>,
}

impl SchemaRepository {
    /// Load every `*.json`, `*.yaml` and `*.yml` document in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DocumentLoad` if the directory cannot be read
    /// or any document cannot be parsed.
    pub fn load(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let mut documents = HashMap::new();

        let entries = std::fs::read_dir(&schema_dir).map_err(|e| SchemaError::DocumentLoad {
            path: schema_dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !DOCUMENT_EXTENSIONS.contains(&extension) {
                continue;
            }
            let value = load_document(&path, extension)?;
            tracing::debug!(document = name, "loaded schema document");
            documents.insert(name.to_string(), value);
        }

        Ok(Self {
            schema_dir,
            documents,
        })
    }

    /// Build a repository from documents already in memory.
    pub fn from_documents<I, N>(documents: I) -> Self
    where
        I: IntoIterator<Item = (N, Value)>,
        N: Into<String>,
    {
        Self {
            schema_dir: PathBuf::new(),
            documents: documents
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Directory the documents were loaded from.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Number of loaded documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Names of all loaded documents, sorted alphabetically.
    pub fn document_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a loaded document by file name.
    pub fn get_document(&self, name: &str) -> Option<&Value> {
        self.documents.get(name)
    }

    /// Resolve a route reference to its document and sub-schema.
    ///
    /// # Errors
    ///
    /// `SchemaError::DocumentNotFound` if no such document was loaded,
    /// `SchemaError::SchemaNotFound` if it has no such top-level key.
    pub fn resolve(&self, route: &RouteSchemaRef) -> Result<ResolvedSchema, SchemaError> {
        let full_schema =
            self.documents
                .get(route.document())
                .ok_or_else(|| SchemaError::DocumentNotFound {
                    document: route.document().to_string(),
                })?;
        let schema_to_use =
            full_schema
                .get(route.schema_name())
                .ok_or_else(|| SchemaError::SchemaNotFound {
                    document: route.document().to_string(),
                    schema_name: route.schema_name().to_string(),
                })?;
        Ok(ResolvedSchema {
            route: route.clone(),
            full_schema: full_schema.clone(),
            schema_to_use: schema_to_use.clone(),
            dereferenced: dereference(schema_to_use, full_schema),
        })
    }
}

fn load_document(path: &Path, extension: &str) -> Result<Value, SchemaError> {
    let content = std::fs::read_to_string(path)?;
    let load_error = |reason: String| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    };
    match extension {
        "yaml" | "yml" => {
            serde_yaml::from_str(&content).map_err(|e| load_error(format!("invalid YAML: {e}")))
        }
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}

/// Name of the sub-schema a `$ref` points at.
///
/// Accepts `"name"`, `"#name"`, `"#/name"`, `"#/definitions/name"`,
/// `"file.json#name"` and URIs ending in `/name`.
pub fn ref_target_name(reference: &str) -> &str {
    let target = match reference.rsplit_once('#') {
        Some((_, fragment)) if !fragment.is_empty() => fragment,
        Some((base, _)) => base,
        None => reference,
    };
    let target = target.trim_start_matches('/');
    let target = target.strip_prefix("definitions/").unwrap_or(target);
    target.rsplit('/').next().unwrap_or(target)
}

/// Look up a `$ref` target among the document's top-level sub-schemas
/// and its `definitions`.
pub fn lookup_ref<'d>(reference: &str, document: &'d Value) -> Option<&'d Value> {
    let name = ref_target_name(reference);
    document
        .get(name)
        .or_else(|| document.get("definitions").and_then(|d| d.get(name)))
}

/// Inline every `$ref` in `schema` that names a sub-schema of `document`.
///
/// A `$ref` node is replaced by its target (sibling keywords are dropped,
/// as in Draft 7). Unresolvable refs are left in place, and so is a ref
/// whose target is already being inlined further up the same branch: a
/// recursive sub-schema is expanded once and then stays a ref.
pub fn dereference(schema: &Value, document: &Value) -> Value {
    let mut expanding = Vec::new();
    inline_refs(schema, document, &mut expanding)
}

fn inline_refs<'r>(value: &'r Value, document: &'r Value, expanding: &mut Vec<&'r str>) -> Value {
    match value {
        Value::Object(object) => {
            if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
                let name = ref_target_name(reference);
                if expanding.contains(&name) {
                    tracing::debug!(reference, "recursive schema ref; leaving unresolved");
                    return value.clone();
                }
                return match lookup_ref(reference, document) {
                    Some(target) => {
                        expanding.push(name);
                        let inlined = inline_refs(target, document, expanding);
                        expanding.pop();
                        inlined
                    }
                    None => {
                        tracing::warn!(reference, "unresolved schema ref");
                        value.clone()
                    }
                };
            }
            Value::Object(
                object
                    .iter()
                    .map(|(key, child)| (key.clone(), inline_refs(child, document, expanding)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| inline_refs(item, document, expanding))
                .collect(),
        ),
        _ => value.clone(),
    }
}
