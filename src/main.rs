// src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use nox_ingest::logging::init_logging;
use nox_ingest::RunConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = RunConfig::new(cli.source_dir)
        .with_store_dir(cli.store_dir)
        .with_workers(cli.workers)
        .with_debug(cli.debug)
        .with_log_path(cli.log_file)
        .with_details_path(cli.details_file);

    init_logging(&config);

    match commands::cmd_ingest(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
