//! Config command - inspect and edit the configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use gstsplit_core::GstsplitConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Get a value by dotted key (e.g. "server.port")
    Get { key: String },

    /// Set a value by dotted key; the value is parsed as JSON, else taken as a string
    Set { key: String, value: String },

    /// Show configuration file path
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_file(config_path);

    match args.command {
        ConfigCommand::Show => {
            if !path.exists() {
                println!(
                    "{} No config file at {}, showing defaults.",
                    style("ℹ").blue(),
                    path.display()
                );
            }
            println!("{}", serde_json::to_string_pretty(&load_config(config_path)?)?);
        }
        ConfigCommand::Init { force } => init_config(&path, force)?,
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(load_config(config_path)?)?;
            let value = lookup(&json, &key)
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => set_config(&path, config_path, &key, &value)?,
        ConfigCommand::Path => {
            println!("Configuration file: {}", path.display());
            if path.exists() {
                println!("Status: {}", style("exists").green());
            } else {
                println!("Status: {}", style("not created").yellow());
                println!("Run 'gstsplit config init' to create it.");
            }
        }
    }

    Ok(())
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gstsplit")
        .join("config.json")
}

fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Resolve the configuration used by every command: an explicit path must
/// exist; the default file is used only if present; otherwise defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<GstsplitConfig> {
    if let Some(path) = config_path {
        return Ok(GstsplitConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        Ok(GstsplitConfig::from_file(&default_path)?)
    } else {
        Ok(GstsplitConfig::default())
    }
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    GstsplitConfig::default().save(path)?;
    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn set_config(
    path: &Path,
    config_path: Option<&str>,
    key: &str,
    raw: &str,
) -> anyhow::Result<()> {
    let config = if path.exists() {
        load_config(config_path)?
    } else {
        GstsplitConfig::default()
    };

    let parsed: Value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut json = serde_json::to_value(&config)?;
    let slot = lookup_mut(&mut json, key)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = parsed.clone();

    // Round-trip so type mismatches are rejected before anything is written
    let updated: GstsplitConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    updated.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed)?
    );
    Ok(())
}

fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |node, part| node.get(part))
}

fn lookup_mut<'a>(json: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    key.split('.').try_fold(json, |node, part| node.get_mut(part))
}
