// CLI module - command-line argument parsing and handlers
//
// Without a subcommand the workspace starts. The config subcommand manages
// the preferences file:
// - config --show: Display effective configuration
// - config --path: Show config file path
// - config --reset: Regenerate config file with defaults

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use regina_tui::config::{Config, VERSION};
use std::io::Write;

/// Regina packet workspace in the terminal
#[derive(Parser)]
#[command(name = "regina-tui")]
#[command(version = VERSION)]
#[command(about = "Browse and edit Regina packet trees in the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Open the document read-only
    #[arg(long)]
    pub read_only: bool,

    /// Start with an empty document instead of the sample one
    #[arg(long)]
    pub no_demo: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Run a subcommand if one was given. Returns true if the program should exit.
pub fn handle_command(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Some(Commands::Config { show, reset, path }) => {
            if *path {
                handle_config_path()?;
            } else if *show {
                handle_config_show()?;
            } else if *reset {
                handle_config_reset()?;
            } else {
                println!("Usage: regina-tui config [--show|--reset|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --path    Show config file path");
            }
            Ok(true)
        }
        None => Ok(false),
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::load()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());
    println!();
    println!("# read_only = {} (runtime only)", config.read_only);

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush().context("Failed to flush stderr")?;

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read answer")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    Config::default().save()?;
    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_and_subcommand() {
        let cli = Cli::parse_from(["regina-tui", "--read-only", "--no-demo"]);
        assert!(cli.read_only);
        assert!(cli.no_demo);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["regina-tui", "config", "--path"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config { path: true, .. })
        ));
    }
}
