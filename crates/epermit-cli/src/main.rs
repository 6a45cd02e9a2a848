//! # epermit CLI entry point
//!
//! Parses command-line arguments, loads the schema documents, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use epermit_cli::files::{run_files, FilesArgs};
use epermit_cli::validate::{run_validate, ValidateArgs};
use epermit_cli::{load_validator, resolve_config};
use epermit_validation::ValidationConfig;

/// ePermit intake validation.
///
/// Checks permit application bodies and upload files against the route
/// schemas and prints the errors an applicant would see.
#[derive(Parser, Debug)]
#[command(name = "epermit", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Schema document directory (overrides EPERMIT_SCHEMA_DIR).
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    /// Format-message table (overrides EPERMIT_PATTERN_MESSAGES).
    #[arg(long, global = true)]
    pattern_messages: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a request body and upload files against a route schema.
    Validate(ValidateArgs),

    /// List the file fields a route schema declares.
    Files(FilesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise verbosity picks the level.
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = ValidationConfig::from_env()
        .map_err(anyhow::Error::from)
        .map(|config| {
            resolve_config(
                config,
                cli.schema_dir.as_deref(),
                cli.pattern_messages.as_deref(),
            )
        })
        .and_then(|config| load_validator(&config))
        .and_then(|validator| match &cli.command {
            Commands::Validate(args) => run_validate(args, &validator),
            Commands::Files(args) => run_files(args, &validator),
        });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_validate() {
        let cli = Cli::try_parse_from([
            "epermit",
            "validate",
            "--route",
            "validation.json#noncommercialApplication",
            "--body",
            "body.json",
            "--file",
            "guideDocumentation=guide.pdf",
            "--file",
            "insurance=ins.pdf:application/pdf",
        ])
        .unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.route, "validation.json#noncommercialApplication");
        assert_eq!(args.files.len(), 2);
        assert!(!args.json);
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "epermit",
            "files",
            "--route",
            "validation.json#tempOutfitterApplication",
            "--schema-dir",
            "/srv/schemas",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.schema_dir, Some(PathBuf::from("/srv/schemas")));
        assert!(matches!(cli.command, Commands::Files(_)));
    }

    #[test]
    fn cli_requires_route() {
        assert!(Cli::try_parse_from(["epermit", "validate", "--body", "b.json"]).is_err());
    }
}
