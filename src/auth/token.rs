//
//  graph-client
//  auth/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Access Token Resolution
//!
//! The CLI looks for an access token in three places, first match wins:
//!
//! | Order | Source |
//! |-------|--------|
//! | 1 | `--token` flag |
//! | 2 | `GRAPH_ACCESS_TOKEN` environment variable |
//! | 3 | the keyring entry for the configured Graph host |
//!
//! Reads and writes that don't need a token still work without one; writes
//! fail locally with an authentication error.

use std::fmt;

use anyhow::Result;

/// Environment variable holding an access token.
pub const TOKEN_ENV: &str = "GRAPH_ACCESS_TOKEN";

/// Where a token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Flag,
    Environment,
    Keyring,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => write!(f, "--token flag"),
            Self::Environment => write!(f, "{TOKEN_ENV}"),
            Self::Keyring => write!(f, "keyring"),
        }
    }
}

/// A token together with its source.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub token: String,
    pub source: TokenSource,
}

impl fmt::Debug for ResolvedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedToken")
            .field("token", &mask_token(&self.token))
            .field("source", &self.source)
            .finish()
    }
}

/// Picks the first non-empty token from the flag, the environment, then the
/// keyring.
///
/// The lookups are passed in so resolution can be tested without touching
/// the process environment or the system keyring. `keyring` is only called
/// when the other two come up empty.
///
/// ```rust
/// use graph_client::auth::{resolve_token, TokenSource};
///
/// let resolved = resolve_token(None, |_| Some("from-env".to_string()), || Ok(None))
///     .unwrap()
///     .unwrap();
/// assert_eq!(resolved.token, "from-env");
/// assert_eq!(resolved.source, TokenSource::Environment);
/// ```
pub fn resolve_token(
    flag: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl FnOnce() -> Result<Option<String>>,
) -> Result<Option<ResolvedToken>> {
    let non_empty = |t: String| {
        let t = t.trim().to_string();
        (!t.is_empty()).then_some(t)
    };

    if let Some(token) = flag.map(String::from).and_then(non_empty) {
        return Ok(Some(ResolvedToken {
            token,
            source: TokenSource::Flag,
        }));
    }
    if let Some(token) = env(TOKEN_ENV).and_then(non_empty) {
        return Ok(Some(ResolvedToken {
            token,
            source: TokenSource::Environment,
        }));
    }
    Ok(keyring()?.and_then(non_empty).map(|token| ResolvedToken {
        token,
        source: TokenSource::Keyring,
    }))
}

/// Reads a token from one line of standard input.
pub fn read_token_from_stdin() -> Result<String> {
    use std::io::{self, BufRead};

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Basic shape check: non-empty, printable, no whitespace.
pub fn validate_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_graphic())
}

/// Shows the first few characters of a token, for status output.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    if token.chars().count() <= 6 {
        "*".repeat(token.chars().count())
    } else {
        format!("{visible}...")
    }
}
