//! cdmigrate CLI
//!
//! Reads a debate-map JSON export (bare node array or `general` envelope) and
//! rebuilds the canonical debate graph in ArangoDB: `claims` and `arguments`
//! vertices, `inferences`, `base_claims` and `premises` edges.
//!
//! The target collections are truncated on every run. `--dry-run` performs
//! the whole migration against an in-memory store instead.

use anyhow::{Context, Result};
use cdmigrate_ingest_json::load_path;
use cdmigrate_model::{SourceGraph, UuidAllocator};
use cdmigrate_normalize::{migrate, MigrationReport};
use cdmigrate_storage::{ArangoStore, DocumentStore, MemoryStore, StoreConfig};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod summary;

#[derive(Parser, Debug)]
#[command(name = "cdmigrate")]
#[command(
    author,
    version,
    about = "Migrate a debate-map export into the canonical debate model"
)]
struct Cli {
    /// Input JSON export
    #[arg(short = 'f', long, default_value = "data/Test1.json")]
    file: PathBuf,

    /// ArangoDB server URL
    #[arg(short = 's', long, default_value = "http://localhost:8529")]
    server: String,

    /// Target database
    #[arg(long = "db", default_value = "canonical_debate")]
    database: String,

    #[arg(short = 'u', long, default_value = "root")]
    username: String,

    #[arg(short = 'p', long, default_value = "", hide_default_value = true)]
    password: String,

    /// Run against an in-memory store; nothing is written to ArangoDB
    #[arg(long)]
    dry_run: bool,

    /// Write the run report (counts and notices) as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. `debug`, `cdmigrate_normalize=debug`)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn store_config(&self) -> StoreConfig {
        StoreConfig {
            server: self.server.clone(),
            database: self.database.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let loaded = load_path(&cli.file)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;
    let config = cli.store_config();

    let report = if cli.dry_run {
        let mut store = MemoryStore::new();
        run(&mut store, loaded.graph)?
    } else {
        let mut store = ArangoStore::connect(&config).with_context(|| {
            format!(
                "failed to connect to database `{}` at {}",
                config.database, config.server
            )
        })?;
        run(&mut store, loaded.graph)?
    };

    let target = if cli.dry_run {
        "in-memory store (dry run)".to_string()
    } else {
        format!("{}/{}", config.server.trim_end_matches('/'), config.database)
    };
    println!(
        "{} {} ({}) {} {}",
        "migrated".green().bold(),
        cli.file.display(),
        loaded.dialect.as_str(),
        "→".cyan(),
        target
    );
    for line in summary::render(&report) {
        println!("{line}");
    }

    if let Some(path) = &cli.report {
        write_report(path, &report)?;
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }
    Ok(())
}

fn run(store: &mut dyn DocumentStore, graph: SourceGraph) -> Result<MigrationReport> {
    let mut ids = UuidAllocator;
    migrate(graph, store, &mut ids).context("migration aborted")
}

fn write_report(path: &Path, report: &MigrationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
