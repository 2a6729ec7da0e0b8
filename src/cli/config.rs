//
//  graph-client
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! `get` and `list` show effective values, including `GRAPH_API_VERSION` and
//! `GRAPH_SERVER` overrides. `set` and `unset` edit the file only, so an
//! environment override is never written back to disk.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde_json::{json, Map, Value};

use crate::config::Config;
use crate::output::{OutputFormat, TableBuilder};

use super::{output_writer, GlobalOptions};

/// Manage CLI configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get a configuration value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Reset a configuration value to its default
    Unset(UnsetArgs),

    /// List all configuration values
    #[command(visible_alias = "ls")]
    List,

    /// Show configuration file path
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Configuration key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Configuration key
    pub key: String,

    /// Configuration value
    pub value: String,
}

#[derive(Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key
    pub key: String,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => self.get(args, global),
            ConfigSubcommand::Set(args) => self.set(args, global),
            ConfigSubcommand::Unset(args) => self.unset(args, global),
            ConfigSubcommand::List => self.list(global),
            ConfigSubcommand::Path => self.path(),
        }
    }

    fn get(&self, args: &GetArgs, _global: &GlobalOptions) -> Result<()> {
        ensure_known(&args.key)?;
        let config = Config::load()?;
        if let Some(value) = config.get(&args.key) {
            println!("{value}");
        }
        Ok(())
    }

    fn set(&self, args: &SetArgs, global: &GlobalOptions) -> Result<()> {
        ensure_known(&args.key)?;
        let path = Config::config_path()?;
        let mut config = Config::load_from(&path)?;
        config.set(&args.key, &args.value)?;
        config.save_to(&path)?;

        tracing::debug!(key = %args.key, path = %path.display(), "Saved configuration");
        let output = output_writer(global, &config);
        output.write_success(&format!("Set {} to {}", args.key, args.value));
        Ok(())
    }

    fn unset(&self, args: &UnsetArgs, global: &GlobalOptions) -> Result<()> {
        ensure_known(&args.key)?;
        let path = Config::config_path()?;
        let mut config = Config::load_from(&path)?;
        let default = Config::default().get(&args.key).unwrap_or_default();
        config.set(&args.key, &default)?;
        config.save_to(&path)?;

        let output = output_writer(global, &config);
        output.write_success(&format!("Reset {}", args.key));
        Ok(())
    }

    fn list(&self, global: &GlobalOptions) -> Result<()> {
        let config = Config::load()?;
        let output = output_writer(global, &config);

        if output.format() == OutputFormat::Table {
            let mut table = TableBuilder::new().color(output.color_enabled()).headers(["key", "value"]);
            for key in Config::keys() {
                table = table.row([key.to_string(), config.get(key).unwrap_or_default()]);
            }
            table.print();
            return Ok(());
        }

        output.write_value(&config_json(&config))
    }

    fn path(&self) -> Result<()> {
        println!("{}", Config::config_path()?.display());
        Ok(())
    }
}

fn ensure_known(key: &str) -> Result<()> {
    if !Config::keys().contains(&key) {
        bail!(
            "Unknown configuration key: {key}\nValid keys: {}",
            Config::keys().join(", ")
        );
    }
    Ok(())
}

/// Every key with its effective value, `null` when unset.
fn config_json(config: &Config) -> Value {
    let map: Map<String, Value> = Config::keys()
        .iter()
        .map(|key| {
            let value = config.get(key).map_or(Value::Null, Value::String);
            (key.to_string(), value)
        })
        .collect();
    json!(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_known() {
        assert!(ensure_known("api_version").is_ok());
        assert!(ensure_known("editor").is_err());
    }

    #[test]
    fn test_config_json() {
        let value = config_json(&Config::default());
        assert_eq!(value["graph_server"], "graph.facebook.com");
        assert_eq!(value["api_version"], Value::Null);
        assert_eq!(value.as_object().unwrap().len(), Config::keys().len());
    }
}
