// src/cli.rs
//! CLI definitions for nox-ingest
//!
//! Argument parsing only; the run itself lives in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nox-ingest")]
#[command(author = "Nox Contributors")]
#[command(version)]
#[command(about = "Normalize package manifests into canonical descriptors", long_about = None)]
pub struct Cli {
    /// Directory containing the source manifests (*.json)
    pub source_dir: PathBuf,

    /// Store directory (default: $NOX_STORE_DIR or ./nox_packages)
    pub store_dir: Option<PathBuf>,

    /// Number of parallel workers (default: half the available cores)
    pub workers: Option<usize>,

    /// Print every processed file, record field diagnostics and write the
    /// processing details file
    #[arg(long)]
    pub debug: bool,

    /// Processing log path
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Processing details path, written with --debug
    #[arg(long, value_name = "PATH")]
    pub details_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["nox-ingest", "manifests", "store", "4"]).unwrap();
        assert_eq!(cli.source_dir, PathBuf::from("manifests"));
        assert_eq!(cli.store_dir, Some(PathBuf::from("store")));
        assert_eq!(cli.workers, Some(4));
        assert!(!cli.debug);
    }

    #[test]
    fn test_debug_anywhere() {
        let first = Cli::try_parse_from(["nox-ingest", "--debug", "manifests"]).unwrap();
        let middle = Cli::try_parse_from(["nox-ingest", "manifests", "--debug", "store"]).unwrap();
        let last = Cli::try_parse_from(["nox-ingest", "manifests", "store", "2", "--debug"]).unwrap();
        assert!(first.debug && middle.debug && last.debug);
        assert_eq!(middle.store_dir, Some(PathBuf::from("store")));
        assert_eq!(last.workers, Some(2));
    }

    #[test]
    fn test_source_dir_required() {
        assert!(Cli::try_parse_from(["nox-ingest"]).is_err());
    }

    #[test]
    fn test_invalid_worker_count() {
        assert!(Cli::try_parse_from(["nox-ingest", "manifests", "store", "many"]).is_err());
    }
}
