//! Assetry - asset bundle resolution and publishing.

mod cli;

use anyhow::Result;
use assetry::config::AssetConfig;
use assetry::logger;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = AssetConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Check => cli::check::check_bundles(&config),
        Commands::Resolve { bundle } => cli::check::resolve_bundle(&config, bundle),
        Commands::Publish { args } => cli::publish::publish_bundles(&config, args),
        Commands::Register { args } => cli::register::register_bundles(&config, args),
        Commands::Clean => cli::publish::clean(&config),
    }
}
