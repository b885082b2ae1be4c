//! Schema Export CLI
//!
//! Writes every entity's JSON Schema plus a checksummed manifest, or checks
//! a previous export against the built-in schemas.

use std::path::PathBuf;

use clap::Parser;
use dgardn_schemas::{Catalog, OutputFormat, SchemaConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-export")]
#[command(about = "Export Dgardn entity schemas with a checksummed manifest")]
struct Cli {
    /// Output directory (defaults to export.output_dir from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    /// Verify an existing export instead of writing one
    #[arg(long)]
    verify: bool,

    /// Print what would be exported without writing
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = SchemaConfig::load_from(cli.config.as_deref())?;
    if cli.compact {
        config.export.output_format = OutputFormat::Compact;
    }
    let output = cli.output.unwrap_or_else(|| config.export.output_dir.clone());

    let catalog = Catalog::with_config(&config.validation)?;
    let manifest = catalog.manifest();

    if cli.verify {
        println!("🔍 Verifying export at {:?}", output);
        manifest.verify_export(&output)?;
        println!("✅ {} schemas match", manifest.entities.len());
        return Ok(());
    }

    println!("📦 Schema Export");
    println!("  Version: {}", manifest.version);
    println!("  Output: {:?}", output);
    println!();
    for entry in &manifest.entities {
        println!("  {:<16} {}  {}", entry.name, &entry.checksum.as_str()[..12], entry.filename());
    }

    if cli.dry_run {
        println!();
        println!("🔍 Dry run - not writing schemas");
        return Ok(());
    }

    manifest.export(&output, &config.export)?;
    println!();
    println!("✅ Exported {} schemas", manifest.entities.len());
    Ok(())
}
