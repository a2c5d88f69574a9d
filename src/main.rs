//! Mango CLI entry point.

use anyhow::Context;
use clap::Parser;

use mango::cli::{Cli, Commands};
use mango::infrastructure::logging::{LogConfig, LoggerImpl};
use mango::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load().context("Invalid configuration") {
        Ok(config) => config,
        Err(err) => mango::cli::handle_error(err, cli.json),
    };

    // A logging failure only warns
    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Init(args) => mango::cli::commands::init::execute(args, cli.json).await,
        Commands::Goal(args) => mango::cli::commands::goal::execute(args, &config, cli.json).await,
        Commands::Export(args) => mango::cli::commands::exchange::execute_export(args, &config, cli.json).await,
        Commands::Import(args) => mango::cli::commands::exchange::execute_import(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        mango::cli::handle_error(err, cli.json);
    }
}
