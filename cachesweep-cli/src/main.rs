//! cachesweep
//!
//! Flushes the file cache store and its storage areas, and exposes the
//! store's single-entry operations for operators.

use anyhow::{Context, Result};
use cachesweep_core::{
    CacheError, CacheFlusher, FileCacheStore, FlushReport, SweepConfig, init_logging,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "cachesweep")]
#[command(about = "Flush file cache storage areas and manage cache entries", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to YAML configuration (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Flush the cache store and every configured storage area
    Flush {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show cache store statistics
    Stats,

    /// Print the value stored for a key
    Get { key: String },

    /// Store a value for a key
    Set {
        key: String,
        value: String,

        /// Lifetime in seconds, 0 for no expiry (defaults to cache.max_age_secs)
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Delete the value stored for a key
    Delete { key: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SweepConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => SweepConfig::default(),
    };

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    init_logging(&logging);

    let store = FileCacheStore::new(&config.cache).context("Invalid cache configuration")?;
    debug!(directory = ?store.directory(), "Using cache store");

    match cli.command {
        Commands::Flush { json } => {
            let registry = config.area_registry();
            info!(areas = registry.len(), "Flushing cache");

            let report = CacheFlusher::new(store).flush(Some(&registry));
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            if report.has_failures() {
                std::process::exit(1);
            }
        }

        Commands::Stats => {
            let stats = store.stats();
            println!("{}", "Cache store".bold().cyan());
            println!("  directory: {}", stats.directory.display());
            println!("  entries:   {}", stats.entries);
            println!(
                "  size:      {:.2} MB",
                stats.size_bytes as f64 / 1_048_576.0
            );
        }

        Commands::Get { key } => match store.get(&key) {
            Ok(value) => write_value(&mut std::io::stdout().lock(), Some(value.as_slice()))?,
            Err(CacheError::NotFound(_)) => {
                debug!(key = %key, "Cache miss");
                write_value(&mut std::io::stdout().lock(), None)?;
                std::process::exit(1);
            }
            Err(e) => return Err(e).context("Failed to read cache entry"),
        },

        Commands::Set { key, value, ttl } => {
            let ttl = Duration::from_secs(ttl.unwrap_or(config.cache.max_age_secs));
            store
                .set_with_ttl(&key, value.as_bytes(), ttl)
                .context("Failed to write cache entry")?;
            println!("{}", "OK".green());
        }

        Commands::Delete { key } => {
            store.delete(&key).context("Failed to delete cache entry")?;
            println!("{}", "OK".green());
        }
    }

    Ok(())
}

/// Raw payload for a hit, a dimmed `(nil)` for a miss
fn write_value(out: &mut impl Write, value: Option<&[u8]>) -> std::io::Result<()> {
    match value {
        Some(value) => {
            out.write_all(value)?;
            out.write_all(b"\n")
        }
        None => writeln!(out, "{}", "(nil)".dimmed()),
    }
}

fn print_report(report: &FlushReport) {
    let failed_count = |n: usize| {
        if n > 0 {
            n.to_string().red().bold()
        } else {
            n.to_string().normal()
        }
    };

    println!("{}", "Cache flush".bold().cyan());
    println!(
        "  files:   {} deleted, {} failed",
        report.success_files.to_string().green(),
        failed_count(report.failed_files)
    );
    println!(
        "  folders: {} deleted, {} failed",
        report.success_folders.to_string().green(),
        failed_count(report.failed_folders)
    );

    if !report.failed.is_empty() {
        println!("{}", "Could not delete:".bold());
        for path in &report.failed {
            println!("  {}", path.red());
        }
    }

    if !report.log.is_empty() {
        println!("{}", report.log.dimmed());
    }
}
