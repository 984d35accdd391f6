use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use guard_audit::{render_lines, AuditConfig, Analyzer, BddBackend, ExclusionTable, Grafcet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "guard-audit")]
#[command(about = "Check GRAFCET transition guards against mutual-exclusion facts")]
#[command(version)]
struct Cli {
    /// GRAFCET model as JSON
    #[arg(long)]
    model: PathBuf,

    /// Exclusion table with a header row containing Var1 and Var2
    #[arg(long)]
    exclusions: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field delimiter of the exclusion table, overrides the config
    #[arg(long)]
    delimiter: Option<char>,

    #[arg(long, value_enum, default_value = "text")]
    format: Format,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AuditConfig::from_path(path)?,
        None => AuditConfig::default(),
    };
    let delimiter = cli.delimiter.unwrap_or(config.exclusions.delimiter);

    let grafcet = Grafcet::from_path(&cli.model)?;
    let table = ExclusionTable::from_path(&cli.exclusions, delimiter)?;
    tracing::info!(
        "{}: {} partial grafcets, {} exclusion rows",
        grafcet.name,
        grafcet.partial_grafcets.len(),
        table.len()
    );

    let backend = BddBackend::new(config.solver.clone());
    let rows = Analyzer::new(&backend, &table)
        .analyze(&grafcet)
        .with_context(|| format!("auditing {}", cli.model.display()))?;

    match cli.format {
        Format::Text => {
            if !rows.is_empty() {
                println!("{}", render_lines(&rows));
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(())
}
