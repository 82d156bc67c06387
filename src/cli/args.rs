//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Soft navigation engine, driven from the terminal
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Log every engine decision (cache hits, head plans, discarded fetches)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: softnav.toml)
    #[arg(short = 'C', long, global = true, default_value = "softnav.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Replay a scripted browsing session against a built site
    #[command(visible_alias = "r")]
    Replay {
        /// Replay script (TOML)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        script: PathBuf,
    },

    /// Show how a page's head elements are tracked
    #[command(visible_alias = "i")]
    Inspect {
        /// HTML file to inspect
        #[arg(value_hint = clap::ValueHint::FilePath)]
        page: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay() {
        let cli = Cli::parse_from(["softnav", "-v", "replay", "session.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("softnav.toml"));
        assert!(matches!(cli.command, Commands::Replay { ref script } if script == &PathBuf::from("session.toml")));
    }

    #[test]
    fn test_parse_inspect_with_config() {
        let cli = Cli::parse_from(["softnav", "i", "index.html", "-C", "site/softnav.toml"]);
        assert_eq!(cli.config, PathBuf::from("site/softnav.toml"));
        assert!(matches!(cli.command, Commands::Inspect { .. }));
    }
}
