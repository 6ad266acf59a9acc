//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `ip_ranges` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Exit codes
//!
//! All loading logic is implemented in the library crate.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use ip_ranges::config::Opt;
use ip_ranges::initialization::{init_logger_with, load_env_file};
use ip_ranges::{check_datasets, run_reload, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // IP_RANGES_DB_PATH may come from a .env in the working directory or
    // next to the executable
    let env_file = load_env_file();

    let opt = Opt::parse();
    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;
    match &env_file {
        Some(path) => debug!("Loaded environment from {}", path.display()),
        None => debug!("No .env file found; using process environment only"),
    }

    let check_only = opt.check;
    let config = match Config::from_opt(opt) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ip_ranges error: {:#}", e);
            process::exit(2);
        }
    };

    if check_only {
        let missing = check_datasets(&config).await?;
        if missing.is_empty() {
            println!("All datasets are loaded");
            return Ok(());
        }
        for kind in &missing {
            println!("missing: {kind}");
        }
        process::exit(1);
    }

    if config.requests.is_empty() {
        eprintln!("ip_ranges error: nothing to load (use --dataset or --manifest)");
        process::exit(2);
    }

    match run_reload(config).await {
        Ok(report) => {
            println!(
                "Loaded {} of {} dataset{} ({} rows) in {:.1}s",
                report.succeeded().count(),
                report.requested,
                if report.requested == 1 { "" } else { "s" },
                report.total_rows(),
                report.elapsed_seconds
            );
            if !report.is_success() {
                process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("ip_ranges error: {:#}", e);
            process::exit(1);
        }
    }
}

