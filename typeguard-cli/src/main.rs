//! # typeguard-cli
//!
//! Check JSON values against typeguard schema files.
//!
//! ## Usage
//!
//! ```bash
//! # Check a value against a schema
//! typeguard check --schema user.schema.json user.json
//!
//! # Silent check (exit code only)
//! typeguard check --schema user.schema.json --quiet user.json
//!
//! # Print the combinator source for a schema
//! typeguard emit --schema user.schema.json
//! ```
//!
//! Schema files hold a serialized schema graph plus its root node:
//!
//! ```json
//! {
//!   "root": 2,
//!   "nodes": [
//!     {"type": "primitive", "value": "string"},
//!     {"type": "primitive", "value": "number"},
//!     {"type": "object", "value": [
//!       {"name": "name", "node": 0},
//!       {"name": "age", "node": 1, "optional": true}
//!     ]}
//!   ]
//! }
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use typeguard::{build_validator, emit, Checker, NodeId, SchemaGraph, ValueGraph};
use typeguard_cli::error::CliError;

#[derive(Parser)]
#[command(name = "typeguard")]
#[command(author, version, about = "Check JSON values against typeguard schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a JSON value against a schema
    Check {
        /// Schema file (JSON schema graph with a root node)
        #[arg(short, long)]
        schema: PathBuf,

        /// JSON file holding the value to check
        value: PathBuf,

        /// Suppress error output; report via exit code only
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the combinator source and referenced combinators for a schema
    Emit {
        /// Schema file (JSON schema graph with a root node)
        #[arg(short, long)]
        schema: PathBuf,
    },
}

/// On-disk schema: a serialized graph plus its root node id.
#[derive(Debug, Serialize, Deserialize)]
struct SchemaFile {
    root: NodeId,
    #[serde(flatten)]
    graph: SchemaGraph,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            match e {
                CliError::Validation(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Check {
            schema,
            value,
            quiet,
        } => cmd_check(&schema, &value, quiet),
        Commands::Emit { schema } => cmd_emit(&schema),
    }
}

/// Check command implementation.
fn cmd_check(schema_path: &Path, value_path: &Path, quiet: bool) -> Result<(), CliError> {
    let schema = load_schema(schema_path)?;
    let json = load_json(value_path)?;
    let (values, root) = ValueGraph::from_json(&json);

    if quiet {
        let validator = build_validator(&schema.graph, schema.root)?;
        if validator.check(&values, root) {
            return Ok(());
        }
        return Err(CliError::Validation(format!(
            "{} does not conform to {}",
            value_path.display(),
            schema_path.display()
        )));
    }

    let mut checker = Checker::build(&schema.graph, schema.root)?;
    if checker.check_with_errors(&values, root) {
        println!(
            "{} {} conforms to {}",
            "✓".green(),
            value_path.display(),
            schema_path.display()
        );
        return Ok(());
    }

    let errors = checker.read_errors();
    println!(
        "{} {} error(s):",
        "✗".red(),
        errors.len().to_string().red()
    );
    println!("{}", serde_json::to_string_pretty(errors)?);

    Err(CliError::Validation(format!(
        "{} does not conform to {}",
        value_path.display(),
        schema_path.display()
    )))
}

/// Emit command implementation.
fn cmd_emit(schema_path: &Path) -> Result<(), CliError> {
    let schema = load_schema(schema_path)?;
    let expr = typeguard::compile(&schema.graph, schema.root)?;
    let emitted = emit(&expr);

    println!("{}", emitted.source);
    println!(
        "{} {}",
        "combinators:".cyan(),
        emitted
            .imports
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}

fn load_schema(path: &Path) -> Result<SchemaFile, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| CliError::read(path.to_path_buf(), source))?;
    serde_json::from_str(&content).map_err(|source| CliError::json(path.to_path_buf(), source))
}

fn load_json(path: &Path) -> Result<serde_json::Value, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| CliError::read(path.to_path_buf(), source))?;
    serde_json::from_str(&content).map_err(|source| CliError::json(path.to_path_buf(), source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_file_format() {
        let file: SchemaFile = serde_json::from_value(json!({
            "root": 2,
            "nodes": [
                {"type": "primitive", "value": "string"},
                {"type": "primitive", "value": "number"},
                {"type": "object", "value": [
                    {"name": "name", "node": 0},
                    {"name": "age", "node": 1, "optional": true}
                ]}
            ]
        }))
        .expect("schema file parses");

        assert_eq!(file.root, NodeId(2));

        let validator = build_validator(&file.graph, file.root).expect("schema compiles");
        let (values, root) = ValueGraph::from_json(&json!({"name": "John"}));
        assert!(validator.check(&values, root));
        let (values, root) = ValueGraph::from_json(&json!({"name": 1}));
        assert!(!validator.check(&values, root));
    }
}
