//
//  graph-client
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration File I/O
//!
//! Low-level helpers used by [`Config`](super::Config) to persist
//! `config.toml`. Each helper attaches the file path to its error.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use graph_client::config::{config_exists, read_config_file, write_config_file};
//!
//! let path = Path::new("/tmp/graph/config.toml");
//! if !config_exists(path) {
//!     write_config_file(path, "[server]\napi_version = \"v2.8\"\n")?;
//! }
//! let content = read_config_file(path)?;
//! println!("{content}");
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::Path;

use anyhow::{Context, Result};

/// Reads the whole configuration file as UTF-8.
///
/// # Errors
///
/// Fails if the file is missing, unreadable, or not valid UTF-8.
pub fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))
}

/// Writes the configuration file, creating parent directories first.
///
/// Existing content is overwritten.
pub fn write_config_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file {}", path.display()))
}

/// True when a regular file exists at `path`.
pub fn config_exists(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("config.toml");

        assert!(!config_exists(&path));
        write_config_file(&path, "[defaults]\npretty = false\n").unwrap();
        assert!(config_exists(&path));
        assert_eq!(read_config_file(&path).unwrap(), "[defaults]\npretty = false\n");
    }

    #[test]
    fn test_directory_is_not_a_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!config_exists(dir.path()));
    }

    #[test]
    fn test_read_missing_mentions_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = read_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }
}
