//! `unitrack config` subcommands

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use unitrack_core::UnitrackConfig;
use unitrack_db::pool::redact;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with default settings
    Init(InitArgs),
    /// Print the effective configuration (file + environment)
    Show,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Database URL to store instead of the default
    #[arg(long)]
    pub database_url: Option<String>,

    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Path => run_path(),
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let config_path = UnitrackConfig::config_path();

    if config_path.exists() && !args.force {
        bail!(
            "Config already exists at {}\n\nUse --force to overwrite",
            config_path.display()
        );
    }

    let mut config = UnitrackConfig::default();
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    config
        .save_to(&config_path)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    println!("Created config at: {}", config_path.display());
    Ok(())
}

fn run_show() -> Result<()> {
    let mut config = UnitrackConfig::load().context("Failed to load config")?;
    config.database.url = redact(&config.database.url);
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", UnitrackConfig::config_path().display());
    Ok(())
}
