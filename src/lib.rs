//
//  graph-client
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Graph Client Library
//!
//! A client for a social-graph HTTP API: objects addressed by id, typed
//! connections between them, and a batch endpoint that runs many calls in
//! one request.
//!
//! ## Overview
//!
//! Every call goes through the same pipeline:
//!
//! ```text
//! GraphCall -> encode_request -> Transport::send -> decode_response
//!           -> GraphCollection::evaluate -> post-process -> GraphResult
//! ```
//!
//! The same operations can be queued on a [`BatchScope`](api::BatchScope)
//! instead, which sends them as one request and hands back one result per
//! operation, in order.
//!
//! ## Features
//!
//! - **Pluggable transport**: [`Transport`](api::Transport) with a reqwest
//!   adapter and an in-memory fake for tests
//! - **Error classification**: authentication, client, server and bad-response
//!   errors with the decoded error descriptor
//! - **Paging**: collection results that fetch their next and previous pages
//! - **Batching**: compound requests with per-operation tokens, names,
//!   dependencies and file uploads
//! - **Legacy endpoints**: REST methods and FQL queries
//!
//! ## Module Structure
//!
//! - [`api`]: Requests, responses, the client, paging and batching
//! - [`auth`]: Access token resolution and keyring storage
//! - [`config`]: Configuration file and host settings
//! - [`output`]: JSON and table output for the CLI
//! - [`cli`]: Command-line interface definitions using clap
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use graph_client::api::{GraphApi, GraphClient, Params, RequestOptions};
//! use graph_client::Config;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = GraphClient::from_config(&Config::load()?)?.with_access_token("token");
//!
//! let me = client
//!     .get_object("me", Params::new().with("fields", "id,name"), RequestOptions::default())
//!     .await?;
//! println!("{}", me.to_json());
//!
//! let batch = client.batch()?;
//! batch.get_object("me", Params::new(), RequestOptions::default()).await?;
//! batch.get_connections("me", "friends", Params::new(), RequestOptions::default()).await?;
//! for slot in batch.execute().await? {
//!     match slot {
//!         Ok(result) => println!("{}", result.to_json()),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Request encoding, response decoding, the client and batching.
pub mod api;

/// Access token resolution and storage.
pub mod auth;

/// Command-line interface definitions.
pub mod cli;

/// Configuration file management.
///
/// Stored in platform-specific locations:
/// - Linux: `~/.config/graph/config.toml`
/// - macOS: `~/Library/Application Support/graph/config.toml`
/// - Windows: `%APPDATA%\graph\config.toml`
pub mod config;

/// Output formatting for the CLI.
pub mod output;

pub use cli::Cli;
pub use config::Config;

/// Name of the CLI binary, also used for the configuration directory.
pub const APP_NAME: &str = "graph";

/// Crate version, from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// # Exit Code Ranges
///
/// - `0`: Success
/// - `1-3`: General errors and usage issues
/// - `4-7`: Authentication-related issues
/// - `8-15`: Resource-related issues
/// - `32+`: External service issues
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error. Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    pub const USAGE: i32 = 2;

    /// The access token is missing, invalid or expired.
    pub const AUTH_ERROR: i32 = 4;

    /// The requested object does not exist or is not visible.
    pub const NOT_FOUND: i32 = 8;

    /// The service failed or returned an unreadable response.
    pub const SERVER_ERROR: i32 = 32;
}
