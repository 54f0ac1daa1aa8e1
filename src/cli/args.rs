//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Asset bundle resolution and publishing
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: search upward for assetry.toml)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate all bundles: unknown dependencies, cycles, position conflicts
    #[command(visible_alias = "c")]
    Check,

    /// Print the registration order of a bundle
    #[command(visible_alias = "r")]
    Resolve {
        /// Bundle identity
        bundle: String,
    },

    /// Publish bundles into the publish directory
    #[command(visible_alias = "p")]
    Publish {
        #[command(flatten)]
        args: PublishArgs,
    },

    /// Register bundles in one session and print the files to render
    Register {
        #[command(flatten)]
        args: RegisterArgs,
    },

    /// Remove the publish directory
    Clean,
}

/// Publish command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct PublishArgs {
    /// Bundles to publish (with their dependencies)
    #[arg(value_name = "BUNDLE", required_unless_present = "all")]
    pub bundles: Vec<String>,

    /// Publish every bundle in the config
    #[arg(short, long)]
    pub all: bool,

    /// Republish even if the destination exists
    #[arg(short, long)]
    pub force: bool,
}

/// Register command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct RegisterArgs {
    /// Bundles to register, in order
    #[arg(value_name = "BUNDLE", required = true)]
    pub bundles: Vec<String>,

    /// Print JSON instead of grouped text
    #[arg(short, long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_publish() {
        let cli = Cli::parse_from(["assetry", "-V", "publish", "--force", "jquery", "app"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Publish { args } => {
                assert_eq!(args.bundles, vec!["jquery", "app"]);
                assert!(args.force);
                assert!(!args.all);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_publish_requires_bundles_or_all() {
        assert!(Cli::try_parse_from(["assetry", "publish"]).is_err());
        assert!(Cli::try_parse_from(["assetry", "publish", "--all"]).is_ok());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["assetry", "check", "--config", "site/assetry.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("site/assetry.toml")));
        assert!(matches!(cli.command, Commands::Check));
    }
}
