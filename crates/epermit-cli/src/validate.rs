//! # Validate Subcommand
//!
//! Validates a request body, plus any upload files, against a route
//! schema and prints what the intake endpoint would answer.
//!
//! Exit codes: `0` for a valid submission, `1` for one with errors,
//! `2` when the schemas, body, or uploads cannot be loaded.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use epermit_validation::{RequestValidator, UploadedFile, UploadedFiles, ValidationReport};

/// Arguments for the `epermit validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Route schema reference, e.g. `validation.json#noncommercialApplication`.
    #[arg(long)]
    pub route: String,

    /// Request body (JSON, or YAML by extension).
    #[arg(long)]
    pub body: PathBuf,

    /// Upload file as `FIELD=PATH` or `FIELD=PATH:MIME`. Repeatable.
    #[arg(long = "file", value_name = "FIELD=PATH[:MIME]")]
    pub files: Vec<String>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One `--file` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub field: String,
    pub path: PathBuf,
    pub mime_type: String,
}

/// Parse a `FIELD=PATH[:MIME]` argument. Without a MIME type, one is
/// guessed from the extension.
pub fn parse_file_spec(spec: &str) -> Result<FileSpec> {
    let Some((field, rest)) = spec.split_once('=') else {
        bail!("invalid --file '{spec}': expected FIELD=PATH[:MIME]");
    };
    if field.is_empty() || rest.is_empty() {
        bail!("invalid --file '{spec}': field and path must not be empty");
    }
    let (path, mime_type) = match rest.rsplit_once(':') {
        Some((path, mime)) if is_mime_type(mime) && !path.is_empty() => {
            (PathBuf::from(path), mime.to_string())
        }
        _ => {
            let path = PathBuf::from(rest);
            let mime = guess_mime_type(&path).to_string();
            (path, mime)
        }
    };
    Ok(FileSpec {
        field: field.to_string(),
        path,
        mime_type,
    })
}

/// `type/subtype`, both parts non-empty.
fn is_mime_type(candidate: &str) -> bool {
    candidate
        .split_once('/')
        .is_some_and(|(kind, subtype)| !kind.is_empty() && !subtype.is_empty() && !subtype.contains('/'))
}

fn guess_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("rtf") => "text/rtf",
        Some("txt") => "text/plain",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Read the files named by `specs`, keyed by field.
pub fn load_uploads(specs: &[FileSpec]) -> Result<UploadedFiles> {
    let mut files = UploadedFiles::new();
    for spec in specs {
        let buffer = std::fs::read(&spec.path)
            .with_context(|| format!("failed to read upload {}", spec.path.display()))?;
        let original_name = spec
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if files.contains_key(&spec.field) {
            tracing::warn!(field = %spec.field, "field given more than once; last file wins");
        }
        files.insert(
            spec.field.clone(),
            UploadedFile::new(original_name, spec.mime_type.clone(), buffer),
        );
    }
    Ok(files)
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, validator: &RequestValidator) -> Result<u8> {
    let body = crate::read_document(&args.body)?;
    let specs = args
        .files
        .iter()
        .map(|spec| parse_file_spec(spec))
        .collect::<Result<Vec<_>>>()?;
    let files = load_uploads(&specs)?;

    let report = validator
        .validate_request(&body, &files, &args.route)
        .with_context(|| format!("failed to validate against {}", args.route))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(if report.is_valid() { 0 } else { 1 })
}

/// Plain-text report: `OK`, or the summary followed by one line per error.
pub fn render_report(report: &ValidationReport) -> String {
    if report.is_valid() {
        return "OK\n".to_string();
    }
    let mut out = format!("{}\n", report.message);
    for error in &report.errors {
        let field = match (error.field(), error.any_of_fields()) {
            (Some(field), _) => field.to_string(),
            (None, Some(fields)) => fields.join(" | "),
            (None, None) => String::new(),
        };
        out.push_str(&format!("  [{}] {}\n", error.error_type(), field));
    }
    out
}
