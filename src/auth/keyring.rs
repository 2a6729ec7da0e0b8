//
//  graph-client
//  auth/keyring.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Access Token Storage
//!
//! Stores access tokens in the system keyring (Keychain on macOS, Secret
//! Service on Linux, Credential Manager on Windows).
//!
//! ## Storage Model
//!
//! | Keyring field | Value |
//! |---------------|-------|
//! | Service | `graph-client` |
//! | Account | the Graph host, e.g. `graph.facebook.com` |
//! | Secret | the access token |
//!
//! Keying by host keeps tokens for a test deployment and production apart.
//!
//! ## Example
//!
//! ```rust,no_run
//! use graph_client::auth::KeyringStore;
//!
//! let store = KeyringStore::new();
//! store.store("graph.facebook.com", "EAAB...")?;
//! if let Some(token) = store.get("graph.facebook.com")? {
//!     println!("Found a stored token ({} chars)", token.len());
//! }
//! store.delete("graph.facebook.com")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use keyring::Entry;

/// Service name for every entry this crate writes.
const SERVICE_NAME: &str = "graph-client";

/// Keyring-backed token storage.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringStore {
    /// Creates a store for the default service name.
    ///
    /// No keyring access happens until a method is called.
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Creates a store under a custom service name, e.g. for an isolated profile.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Saves the token for `host`, replacing any previous one.
    pub fn store(&self, host: &str, token: &str) -> Result<()> {
        let entry = Entry::new(&self.service, host)?;
        entry
            .set_password(token)
            .with_context(|| format!("Failed to store token for {host} in the keyring"))?;
        Ok(())
    }

    /// Reads the token for `host`. A missing entry is `Ok(None)`.
    pub fn get(&self, host: &str) -> Result<Option<String>> {
        let entry = Entry::new(&self.service, host)?;
        match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the token for `host`. Removing a missing entry succeeds.
    pub fn delete(&self, host: &str) -> Result<()> {
        let entry = Entry::new(&self.service, host)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
