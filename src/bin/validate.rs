//! Schema Validate CLI
//!
//! Validates JSON records against an entity schema.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use dgardn_schemas::{Catalog, EntityKind, SchemaConfig, SchemaError, ValidationFailure};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-validate")]
#[command(about = "Validate JSON records against Dgardn entity schemas")]
struct Cli {
    /// Entity to validate as (class or collection name, e.g. "Event" or "saveditem")
    #[arg(required_unless_present = "list")]
    entity: Option<String>,

    /// JSON files or directories of JSON files; reads stdin when empty
    paths: Vec<PathBuf>,

    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Reject fields that are not part of the schema
    #[arg(long)]
    strict: bool,

    /// Print failures as JSON
    #[arg(long)]
    json: bool,

    /// List known entities and exit
    #[arg(long)]
    list: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every record was valid
fn run(cli: Cli) -> anyhow::Result<bool> {
    if cli.list {
        for kind in EntityKind::ALL {
            let owner = if kind.is_content() { "organization content" } else { "" };
            println!("{:<16} {:<16} {}", kind.name(), kind.collection(), owner);
        }
        return Ok(true);
    }

    let mut config = SchemaConfig::load_from(cli.config.as_deref())?;
    if cli.strict {
        config.validation.reject_unknown_fields = true;
    }
    let catalog = Catalog::with_config(&config.validation)?;

    let name = cli.entity.as_deref().unwrap_or_default();
    let kind = EntityKind::from_name(name)?;

    let documents = if cli.paths.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("reading stdin")?;
        vec![("<stdin>".to_string(), input)]
    } else {
        collect_documents(&cli.paths)?
    };

    if documents.is_empty() {
        bail!("no JSON documents found");
    }

    let mut failures: Vec<(String, ValidationFailure)> = Vec::new();
    let mut valid = 0usize;

    for (source, content) in &documents {
        let value: Value =
            serde_json::from_str(content).with_context(|| format!("parsing {}", source))?;

        // A top-level array is a batch of records
        let records = match value {
            Value::Array(items) => items,
            other => vec![other],
        };

        for (i, record) in records.iter().enumerate() {
            let label = if records.len() > 1 {
                format!("{}[{}]", source, i)
            } else {
                source.clone()
            };

            match catalog.validate(kind, record) {
                Ok(_) => valid += 1,
                Err(SchemaError::Validation(failure)) => failures.push((label, failure)),
                Err(e) => return Err(e.into()),
            }
        }
    }

    if cli.json {
        let report: Vec<Value> = failures
            .iter()
            .map(|(source, failure)| {
                serde_json::json!({
                    "source": source,
                    "entity": failure.entity,
                    "violations": failure.violations,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (source, failure) in &failures {
            println!("❌ {}", source);
            for violation in &failure.violations {
                println!("   └─ {}", violation);
            }
        }
        println!();
        println!(
            "{} {} valid, {} invalid ({})",
            if failures.is_empty() { "✅" } else { "❌" },
            valid,
            failures.len(),
            kind
        );
    }

    Ok(failures.is_empty())
}

fn collect_documents(paths: &[PathBuf]) -> anyhow::Result<Vec<(String, String)>> {
    let mut documents = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && is_json(entry.path()) {
                    documents.push(read_document(entry.path())?);
                }
            }
        } else {
            documents.push(read_document(path)?);
        }
    }
    Ok(documents)
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |e| e == "json")
}

fn read_document(path: &Path) -> anyhow::Result<(String, String)> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    Ok((path.display().to_string(), content))
}
