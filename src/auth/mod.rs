//
//  graph-client
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Access-token handling for the `graph` binary. The library itself only
//! needs a token string; this module decides where that string comes from.
//!
//! ## Submodules
//!
//! - [`keyring`]: Token storage in the system keyring ([`KeyringStore`])
//! - [`token`]: Resolution order and helpers ([`resolve_token`])
//!
//! OAuth dialogs and token exchange are not handled here; tokens are obtained
//! elsewhere and pasted into `graph auth login`.

mod keyring;
mod token;

pub use keyring::*;
pub use token::*;

/// Resolves the token for `host` from the flag, the environment, then the
/// keyring.
///
/// Keyring failures (for example no secret service on a headless box) are
/// logged and treated as "no token".
pub fn token_for_host(flag: Option<&str>, host: &str) -> Option<ResolvedToken> {
    let store = KeyringStore::new();
    let lookup = || match store.get(host) {
        Ok(token) => Ok(token),
        Err(e) => {
            tracing::debug!(host, "Keyring unavailable: {:#}", e);
            Ok(None)
        }
    };

    resolve_token(flag, |key| std::env::var(key).ok(), lookup).unwrap_or(None)
}
