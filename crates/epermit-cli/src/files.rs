//! # Files Subcommand
//!
//! Lists the upload slots a route schema declares and their constraints.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use epermit_validation::{FieldConstraints, RequestValidator};

/// Arguments for the `epermit files` subcommand.
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Route schema reference, e.g. `validation.json#tempOutfitterApplication`.
    #[arg(long)]
    pub route: String,

    /// Print the list as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One listed file field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFieldSummary {
    pub name: String,
    #[serde(flatten)]
    pub constraints: FieldConstraints,
}

/// Collect the file fields of `route` with their parsed constraints.
pub fn file_field_summaries(validator: &RequestValidator, route: &str) -> Result<Vec<FileFieldSummary>> {
    let fields = validator
        .expected_file_fields(route)
        .with_context(|| format!("failed to resolve {route}"))?;
    fields
        .into_iter()
        .map(|field| -> Result<FileFieldSummary> {
            let constraints = field.constraints()?;
            Ok(FileFieldSummary {
                name: field.name,
                constraints,
            })
        })
        .collect()
}

fn describe(summary: &FileFieldSummary) -> String {
    let c = &summary.constraints;
    let required = if c.required_file { "required" } else { "optional" };
    let extensions = if c.valid_extensions.is_empty() {
        "any".to_string()
    } else {
        c.valid_extensions.join(", ")
    };
    let max_size = c
        .max_size
        .map_or_else(|| "unlimited".to_string(), |mb| format!("{mb} MB"));
    format!(
        "{} ({required}; extensions: {extensions}; max size: {max_size})",
        summary.name
    )
}

/// Execute the files subcommand.
pub fn run_files(args: &FilesArgs, validator: &RequestValidator) -> Result<u8> {
    let summaries = file_field_summaries(validator, &args.route)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if summaries.is_empty() {
        println!("{} declares no file fields", args.route);
    } else {
        for summary in &summaries {
            println!("{}", describe(summary));
        }
    }
    Ok(0)
}
