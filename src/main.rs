//! Softnav - replay and inspect soft navigation sessions from the terminal.

mod cli;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use softnav::{Config, logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Config::load_or_default(&cli.config)?;

    match &cli.command {
        Commands::Replay { script } => cli::replay::run_replay(script, &config.nav).map(|_| ()),
        Commands::Inspect { page } => cli::inspect::inspect_page(page, &config.nav),
    }
}
