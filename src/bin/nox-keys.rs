// src/bin/nox-keys.rs
//! List the keys of a nox store, for debugging

use anyhow::{Context, Result};
use clap::Parser;
use nox_ingest::config::{DEFAULT_STORE_DIR, STORE_DIR_ENV};
use nox_ingest::logging::init_console_logging;
use nox_ingest::store::{ScanOptions, SqliteStore, Store, StoreOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nox-keys")]
#[command(version)]
#[command(about = "List the keys held in a nox store", long_about = None)]
struct Cli {
    /// Store directory
    #[arg(env = STORE_DIR_ENV, default_value = DEFAULT_STORE_DIR)]
    store_dir: PathBuf,

    /// Only list keys starting with this prefix
    #[arg(short, long)]
    prefix: Option<String>,

    /// List keys in descending order
    #[arg(short, long)]
    reverse: bool,

    /// Print each value next to its key
    #[arg(long)]
    values: bool,
}

fn main() -> Result<()> {
    init_console_logging();
    let cli = Cli::parse();

    let store = SqliteStore::open(&StoreOptions::new(&cli.store_dir))
        .with_context(|| format!("Failed to open store at {}", cli.store_dir.display()))?;

    let mut options = match cli.prefix {
        Some(prefix) => ScanOptions::with_prefix(prefix),
        None => ScanOptions::default(),
    };
    options.reverse = cli.reverse;

    let entries = store.scan(&options)?;

    println!("Existing keys in the store:");
    for entry in &entries {
        let key = String::from_utf8_lossy(&entry.key);
        if cli.values {
            println!("  {} = {}", key, String::from_utf8_lossy(&entry.value));
        } else {
            println!("  {}", key);
        }
    }
    println!("{} keys", entries.len());

    store.close()?;
    Ok(())
}
