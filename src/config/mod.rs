//
//  graph-client
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! This module provides configuration management for the Graph client. It
//! handles loading, saving, and accessing settings from a TOML file stored in
//! a platform-specific directory.
//!
//! ## Overview
//!
//! The configuration is organized into two sections:
//!
//! - **Server Configuration**: Hostnames for the graph, REST and dialog
//!   endpoints, the beta/video host rewriting rules, and the API version
//! - **Defaults**: Transport timeout and output preferences for the CLI
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/graph/config.toml`
//! - **macOS**: `~/Library/Application Support/graph/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\graph\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [server]
//! graph_server = "graph.facebook.com"
//! rest_server = "api.facebook.com"
//! dialog_host = "www.facebook.com"
//! host_path_matcher = "\\.facebook"
//! video_replace = "-video.facebook"
//! beta_replace = ".beta.facebook"
//! api_version = "v2.8"
//! use_ssl = true
//!
//! [defaults]
//! timeout_secs = 30
//! pretty = true
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `GRAPH_API_VERSION` | `server.api_version` |
//! | `GRAPH_SERVER` | `server.graph_server` |
//!
//! ## Submodules
//!
//! - [`file`]: Low-level configuration file I/O operations
//! - [`hosts`]: Compiled endpoint resolution ([`Endpoints`])

mod file;
mod hosts;

pub use file::*;
pub use hosts::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the API version.
pub const API_VERSION_ENV: &str = "GRAPH_API_VERSION";

/// Environment variable overriding the graph server host.
pub const GRAPH_SERVER_ENV: &str = "GRAPH_SERVER";

/// Global configuration container.
///
/// # Examples
///
/// ```rust
/// use graph_client::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.server.graph_server, "graph.facebook.com");
/// assert_eq!(config.defaults.timeout_secs, 30);
/// ```
///
/// # Notes
///
/// - All fields use `#[serde(default)]`, so partial files are accepted
/// - The file is created on first save
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Remote endpoint settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Transport and output defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Remote endpoint settings.
///
/// # Default Values
///
/// | Field | Default |
/// |-------|---------|
/// | `graph_server` | `graph.facebook.com` |
/// | `rest_server` | `api.facebook.com` |
/// | `dialog_host` | `www.facebook.com` |
/// | `host_path_matcher` | `\.facebook` |
/// | `video_replace` | `-video.facebook` |
/// | `beta_replace` | `.beta.facebook` |
/// | `api_version` | `None` (unversioned paths) |
/// | `use_ssl` | `true` |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Host serving Graph API calls.
    #[serde(default = "default_graph_server")]
    pub graph_server: String,

    /// Host serving legacy REST API calls.
    #[serde(default = "default_rest_server")]
    pub rest_server: String,

    /// Host serving OAuth dialogs. Not used by API calls themselves.
    #[serde(default = "default_dialog_host")]
    pub dialog_host: String,

    /// Regex locating the part of a host to rewrite for beta/video routing.
    #[serde(default = "default_host_path_matcher")]
    pub host_path_matcher: String,

    /// Replacement applied to the matcher for video uploads.
    #[serde(default = "default_video_replace")]
    pub video_replace: String,

    /// Replacement applied to the matcher for beta routing.
    #[serde(default = "default_beta_replace")]
    pub beta_replace: String,

    /// Version prefix for Graph paths, e.g. `v2.8`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Use `https://` (default) or `http://`.
    #[serde(default = "default_true")]
    pub use_ssl: bool,
}

fn default_graph_server() -> String {
    GRAPH_SERVER.to_string()
}

fn default_rest_server() -> String {
    REST_SERVER.to_string()
}

fn default_dialog_host() -> String {
    DIALOG_HOST.to_string()
}

fn default_host_path_matcher() -> String {
    HOST_PATH_MATCHER.to_string()
}

fn default_video_replace() -> String {
    VIDEO_REPLACE.to_string()
}

fn default_beta_replace() -> String {
    BETA_REPLACE.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            graph_server: default_graph_server(),
            rest_server: default_rest_server(),
            dialog_host: default_dialog_host(),
            host_path_matcher: default_host_path_matcher(),
            video_replace: default_video_replace(),
            beta_replace: default_beta_replace(),
            api_version: None,
            use_ssl: true,
        }
    }
}

/// Transport and output defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    /// Request timeout in seconds for the reqwest transport.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pretty-print JSON output in the CLI.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            pretty: true,
        }
    }
}

impl Config {
    /// Loads configuration from the default location, then applies
    /// environment overrides.
    ///
    /// A missing file is not an error; defaults are used.
    ///
    /// ```rust,no_run
    /// use graph_client::config::Config;
    ///
    /// let config = Config::load()?;
    /// println!("Graph host: {}", config.server.graph_server);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads configuration from an explicit path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !config_exists(path) {
            return Ok(Self::default());
        }
        let content = read_config_file(path)?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Endpoints::from_config(&config.server)
            .with_context(|| format!("Invalid server settings in {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_config_file(path, &content)
    }

    /// Applies environment overrides using the given lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(version) = lookup(API_VERSION_ENV).filter(|v| !v.is_empty()) {
            self.server.api_version = Some(version);
        }
        if let Some(server) = lookup(GRAPH_SERVER_ENV).filter(|v| !v.is_empty()) {
            self.server.graph_server = server;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Platform-Specific Paths
    ///
    /// | Platform | Path |
    /// |----------|------|
    /// | Linux | `~/.config/graph/config.toml` |
    /// | macOS | `~/Library/Application Support/graph/config.toml` |
    /// | Windows | `C:\Users\<User>\AppData\Roaming\graph\config.toml` |
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Gets a configuration value by dotted key.
    ///
    /// # Supported Keys
    ///
    /// | Key | Field |
    /// |-----|-------|
    /// | `graph_server` | `server.graph_server` |
    /// | `rest_server` | `server.rest_server` |
    /// | `dialog_host` | `server.dialog_host` |
    /// | `host_path_matcher` | `server.host_path_matcher` |
    /// | `video_replace` | `server.video_replace` |
    /// | `beta_replace` | `server.beta_replace` |
    /// | `api_version` | `server.api_version` |
    /// | `use_ssl` | `server.use_ssl` |
    /// | `timeout_secs` | `defaults.timeout_secs` |
    /// | `pretty` | `defaults.pretty` |
    ///
    /// ```rust
    /// use graph_client::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.get("rest_server"), Some("api.facebook.com".to_string()));
    /// assert_eq!(config.get("api_version"), None);
    /// assert_eq!(config.get("unknown_key"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "graph_server" => Some(self.server.graph_server.clone()),
            "rest_server" => Some(self.server.rest_server.clone()),
            "dialog_host" => Some(self.server.dialog_host.clone()),
            "host_path_matcher" => Some(self.server.host_path_matcher.clone()),
            "video_replace" => Some(self.server.video_replace.clone()),
            "beta_replace" => Some(self.server.beta_replace.clone()),
            "api_version" => self.server.api_version.clone(),
            "use_ssl" => Some(self.server.use_ssl.to_string()),
            "timeout_secs" => Some(self.defaults.timeout_secs.to_string()),
            "pretty" => Some(self.defaults.pretty.to_string()),
            _ => None,
        }
    }

    /// Sets a configuration value by key.
    ///
    /// Returns an error for unknown keys or values that do not parse.
    /// Changes are only persisted when [`Config::save`] is called.
    ///
    /// ```rust
    /// use graph_client::config::Config;
    ///
    /// let mut config = Config::default();
    /// config.set("api_version", "v2.8").unwrap();
    /// assert_eq!(config.get("api_version"), Some("v2.8".to_string()));
    /// assert!(config.set("timeout_secs", "soon").is_err());
    /// ```
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "graph_server" => self.server.graph_server = value.to_string(),
            "rest_server" => self.server.rest_server = value.to_string(),
            "dialog_host" => self.server.dialog_host = value.to_string(),
            "host_path_matcher" => {
                regex::Regex::new(value)
                    .with_context(|| format!("Invalid host_path_matcher: {value}"))?;
                self.server.host_path_matcher = value.to_string();
            }
            "video_replace" => self.server.video_replace = value.to_string(),
            "beta_replace" => self.server.beta_replace = value.to_string(),
            "api_version" => {
                self.server.api_version = (!value.is_empty()).then(|| value.to_string());
            }
            "use_ssl" => {
                self.server.use_ssl = value
                    .parse()
                    .with_context(|| format!("use_ssl must be true or false, got {value}"))?;
            }
            "timeout_secs" => {
                self.defaults.timeout_secs = value
                    .parse()
                    .with_context(|| format!("timeout_secs must be a number, got {value}"))?;
            }
            "pretty" => {
                self.defaults.pretty = value
                    .parse()
                    .with_context(|| format!("pretty must be true or false, got {value}"))?;
            }
            _ => anyhow::bail!("Unknown configuration key: {key}"),
        }
        Ok(())
    }

    /// All known keys, in display order.
    pub fn keys() -> &'static [&'static str] {
        &[
            "graph_server",
            "rest_server",
            "dialog_host",
            "host_path_matcher",
            "video_replace",
            "beta_replace",
            "api_version",
            "use_ssl",
            "timeout_secs",
            "pretty",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[server]\napi_version = \"v3.0\"\n").unwrap();
        assert_eq!(config.server.api_version.as_deref(), Some("v3.0"));
        assert_eq!(config.server.graph_server, "graph.facebook.com");
        assert!(config.server.use_ssl);
        assert_eq!(config.defaults, DefaultsConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            API_VERSION_ENV => Some("v9.0".to_string()),
            GRAPH_SERVER_ENV => Some("graph.example.com".to_string()),
            _ => None,
        });
        assert_eq!(config.server.api_version.as_deref(), Some("v9.0"));
        assert_eq!(config.server.graph_server, "graph.example.com");
    }

    #[test]
    fn test_set_rejects_bad_matcher() {
        let mut config = Config::default();
        assert!(config.set("host_path_matcher", "(").is_err());
        assert_eq!(config.server.host_path_matcher, HOST_PATH_MATCHER);
    }

    #[test]
    fn test_every_key_is_gettable_or_optional() {
        let config = Config::default();
        for key in Config::keys() {
            if *key != "api_version" {
                assert!(config.get(key).is_some(), "missing {key}");
            }
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("api_version", "v2.8").unwrap();
        config.set("timeout_secs", "5").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
