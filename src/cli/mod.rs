//
//  graph-client
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod api;
mod auth;
mod batch;
mod config;
mod object;
mod publish;

pub use api::ApiCommand;
pub use auth::AuthCommand;
pub use batch::BatchCommand;
pub use config::ConfigCommand;
pub use object::ObjectCommand;
pub use publish::PublishCommand;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use serde_json::Value;

use crate::api::{GraphClient, GraphResult, Params, RequestOptions, UploadFile};
use crate::auth::{token_for_host, ResolvedToken};
use crate::config::Config;
use crate::output::{OutputFormat, OutputWriter};

/// Graph CLI - Work with a social-graph API from the command line
#[derive(Parser, Debug)]
#[command(
    name = "graph",
    version,
    about = "Work with a social-graph API from the command line",
    long_about = "graph reads and writes objects and connections on a Graph API server.\n\n\
                  It supports paging, batched requests, uploads and the legacy REST and FQL endpoints.",
    propagate_version = true,
    after_help = "Use 'graph <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Access token (overrides GRAPH_ACCESS_TOKEN and the keyring)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// API version prefix for this invocation, e.g. v2.8
    #[arg(long, global = true)]
    pub api_version: Option<String>,

    /// Print collections as a table instead of JSON
    #[arg(long, global = true, conflicts_with = "compact")]
    pub table: bool,

    /// Print compact single-line JSON
    #[arg(long, global = true)]
    pub compact: bool,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Make a raw Graph or REST API call
    Api(ApiCommand),

    /// Read objects, connections and search results
    #[command(visible_alias = "obj")]
    Object(ObjectCommand),

    /// Write posts, comments, likes and uploads
    #[command(visible_alias = "pub")]
    Publish(PublishCommand),

    /// Send several calls as one batch request
    Batch(BatchCommand),

    /// Manage the stored access token
    Auth(AuthCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Print version information
    Version,
}

/// Everything a command needs to talk to the server.
pub(crate) struct Session {
    pub client: GraphClient,
    pub token: Option<ResolvedToken>,
    pub output: OutputWriter,
}

impl Session {
    /// Loads config, resolves the token, and builds the client.
    pub fn open(global: &GlobalOptions) -> Result<Self> {
        let config = Config::load()?;
        let token = token_for_host(global.token.as_deref(), &config.server.graph_server);
        if let Some(resolved) = &token {
            tracing::debug!(source = %resolved.source, "Using access token");
        }

        let mut client = GraphClient::from_config(&config)?;
        if let Some(resolved) = &token {
            client = client.with_access_token(resolved.token.clone());
        }

        let output = output_writer(global, &config);
        Ok(Self {
            client,
            token,
            output,
        })
    }

    /// Base options for a call made by this invocation.
    pub fn options(&self, global: &GlobalOptions) -> RequestOptions {
        request_options(global)
    }
}

/// Options derived from the global flags.
pub(crate) fn request_options(global: &GlobalOptions) -> RequestOptions {
    let mut options = RequestOptions::new();
    if let Some(version) = &global.api_version {
        options = options.with_api_version(version.clone());
    }
    options
}

/// Picks the output format from the flags and the configured default.
pub(crate) fn output_writer(global: &GlobalOptions, config: &Config) -> OutputWriter {
    let format = if global.table {
        OutputFormat::Table
    } else {
        OutputFormat::Json
    };
    OutputWriter::new(format, config.defaults.pretty && !global.compact)
}

/// Parses `key=value` fields into parameters.
///
/// | Form | Sent as |
/// |------|---------|
/// | `key=text` | text |
/// | `key:=json` | parsed JSON |
/// | `key=@path` | file upload |
pub(crate) async fn parse_fields(fields: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for field in fields {
        if let Some((key, raw)) = field.split_once(":=") {
            let value: serde_json::Value = serde_json::from_str(raw)
                .with_context(|| format!("Invalid JSON in field '{key}'"))?;
            params.insert(key, value);
        } else if let Some((key, value)) = field.split_once('=') {
            if key.is_empty() {
                bail!("Invalid field (empty key): {field}");
            }
            match value.strip_prefix('@') {
                Some(path) => {
                    let file = UploadFile::open(path)
                        .await
                        .with_context(|| format!("Failed to read {path}"))?;
                    params.insert(key, file);
                }
                None => {
                    params.insert(key, value);
                }
            }
        } else {
            bail!("Invalid field (expected key=value): {field}");
        }
    }
    Ok(params)
}

/// Walks `paging.next` from a first page, up to `max_pages` pages.
///
/// Stops early at an empty page, since some connections keep returning a
/// `next` link after the last item.
pub(crate) async fn collect_pages(first: GraphResult, max_pages: usize) -> Result<Vec<Value>> {
    let Some(mut page) = first.into_collection() else {
        bail!("Response is not a paged collection");
    };

    let mut items = Vec::new();
    let mut fetched = 1;
    loop {
        items.extend(page.items().iter().cloned());
        if fetched >= max_pages {
            tracing::warn!(pages = fetched, "Stopping at page limit");
            break;
        }
        let next = match page.next_page(Params::new()).await? {
            Some(next) => next,
            None => break,
        };
        match next.into_collection() {
            Some(collection) if !collection.items().is_empty() => page = collection,
            _ => break,
        }
        fetched += 1;
    }
    Ok(items)
}
