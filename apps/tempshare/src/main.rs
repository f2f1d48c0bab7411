//! tempshare - reference-counted temp files shared across managers
//!
//! The binary loads configuration, installs logging and drives the resource
//! managers through scripted runs.

mod cli;
mod display;
mod error;
mod scenario;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::scenario::FanoutPlan;
use clap::Parser;
use std::process;
use tempshare_config::Config;
use tempshare_resources::TempFileFactory;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    let config = match load_config(&cli.global).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    init_tracing(&config, json_mode, cli.global.debug);

    if let Err(e) = run(cli, config) {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Resolve configuration: file (or defaults), then environment, then flags
async fn load_config(global: &GlobalArgs) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(global.config.as_deref()).await?;
    config.merge_env()?;

    if let Some(dir) = &global.temp_dir {
        config.temp.dir = Some(dir.clone());
    }
    Ok(config)
}

fn run(cli: Cli, config: Config) -> Result<(), CliError> {
    info!("Starting tempshare v{}", env!("CARGO_PKG_VERSION"));
    let renderer = OutputRenderer::new(cli.global.json);

    match cli.command {
        Commands::Fanout {
            clones,
            suffix,
            keep,
            by_name,
        } => {
            if keep > clones + 1 {
                return Err(CliError::InvalidArguments(format!(
                    "--keep {keep} exceeds the {} managers in the run",
                    clones + 1
                )));
            }
            let plan = FanoutPlan {
                clones,
                suffix,
                keep,
                by_name,
            };
            let report = scenario::run_fanout(TempFileFactory::from_config(&config), &plan)?;
            renderer.render_fanout(&report)?;
        }
        Commands::Config => renderer.render_config(&config)?,
    }

    info!("Command completed successfully");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(config: &Config, json_mode: bool, debug_flag: bool) {
    let default_filter = if debug_flag {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    if json_mode || config.logging.json {
        // stdout is reserved for command output
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }
}
