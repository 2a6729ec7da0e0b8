//
//  graph-client
//  cli/auth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Access token commands.
//!
//! Tokens are stored in the system keyring under the configured Graph host,
//! so a test deployment and production keep separate tokens.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use crate::api::{GraphApi, GraphClient, Params};
use crate::auth::{mask_token, read_token_from_stdin, validate_token, KeyringStore};
use crate::config::Config;

use super::{output_writer, request_options, GlobalOptions, Session};

/// Manage the stored access token.
#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Store an access token in the keyring
    Login(LoginArgs),

    /// Remove the stored access token
    Logout,

    /// Show where the active token comes from
    Status(StatusArgs),

    /// Print the active access token
    Token,

    /// Inspect a token with the debug_token endpoint
    Debug(DebugArgs),

    /// Fetch the access token of a page you manage
    #[command(name = "page-token")]
    PageToken(PageTokenArgs),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Read the token from standard input instead of --token
    #[arg(long)]
    pub with_token: bool,

    /// Check the token with a request for `me` before storing it
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show the beginning of the token
    #[arg(long, short = 't')]
    pub show_token: bool,
}

#[derive(Args, Debug)]
pub struct DebugArgs {
    /// Token to inspect (defaults to the active token)
    pub input_token: Option<String>,
}

#[derive(Args, Debug)]
pub struct PageTokenArgs {
    /// Page id
    pub page_id: String,
}

impl AuthCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            AuthSubcommand::Login(args) => login(args, global).await,
            AuthSubcommand::Logout => logout(global),
            AuthSubcommand::Status(args) => status(args, global),
            AuthSubcommand::Token => token(global),
            AuthSubcommand::Debug(args) => debug(args, global).await,
            AuthSubcommand::PageToken(args) => page_token(args, global).await,
        }
    }
}

async fn login(args: &LoginArgs, global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let host = config.server.graph_server.clone();
    let output = output_writer(global, &config);

    let token = if args.with_token {
        read_token_from_stdin()?
    } else {
        match &global.token {
            Some(token) => token.trim().to_string(),
            None => bail!("Pass the token with --token, or pipe it in with --with-token"),
        }
    };

    if !validate_token(&token) {
        bail!("Invalid token format");
    }

    if args.verify {
        let client = GraphClient::from_config(&config)?.with_access_token(token.clone());
        let me = client
            .get_object("me", Params::new().with("fields", "id,name"), request_options(global))
            .await?;
        let who = me
            .get("name")
            .or_else(|| me.get("id"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        output.write_info(&format!("Token belongs to {who}"));
    }

    KeyringStore::new().store(&host, &token)?;
    output.write_success(&format!("Stored access token for {host}"));
    Ok(())
}

fn logout(global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let output = output_writer(global, &config);
    let host = &config.server.graph_server;

    let store = KeyringStore::new();
    if store.get(host)?.is_none() {
        output.write_info(&format!("No stored token for {host}"));
        return Ok(());
    }
    store.delete(host)?;
    output.write_success(&format!("Removed access token for {host}"));
    Ok(())
}

fn status(args: &StatusArgs, global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let output = output_writer(global, &config);
    let host = &config.server.graph_server;
    let resolved = crate::auth::token_for_host(global.token.as_deref(), host);

    let status = match &resolved {
        Some(resolved) => json!({
            "host": host,
            "authenticated": true,
            "source": resolved.source.to_string(),
            "token": args.show_token.then(|| mask_token(&resolved.token)),
        }),
        None => json!({
            "host": host,
            "authenticated": false,
        }),
    };

    if global.table {
        let authenticated = resolved.is_some();
        output.write_info(host);
        output.write_info(&format!(
            "  Authenticated: {}",
            crate::output::format_bool(authenticated, output.color_enabled())
        ));
        if let Some(resolved) = &resolved {
            output.write_info(&format!("  Source: {}", resolved.source));
            if args.show_token {
                output.write_info(&format!("  Token: {}", mask_token(&resolved.token)));
            }
        } else {
            output.write_info("  Run 'graph auth login --token <TOKEN>' to store one");
        }
        return Ok(());
    }
    output.write_value(&status)
}

fn token(global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let host = &config.server.graph_server;
    match crate::auth::token_for_host(global.token.as_deref(), host) {
        Some(resolved) => {
            // Bare token, for piping.
            println!("{}", resolved.token);
            Ok(())
        }
        None => bail!("No access token found for {host}"),
    }
}

async fn debug(args: &DebugArgs, global: &GlobalOptions) -> Result<()> {
    let session = Session::open(global)?;
    let input = match (&args.input_token, &session.token) {
        (Some(input), _) => input.clone(),
        (None, Some(resolved)) => resolved.token.clone(),
        (None, None) => bail!("No token to inspect"),
    };
    let result = session.client.debug_token(&input, session.options(global)).await?;
    session.output.write_result(&result, None)
}

async fn page_token(args: &PageTokenArgs, global: &GlobalOptions) -> Result<()> {
    let session = Session::open(global)?;
    let result = session
        .client
        .get_page_access_token(&args.page_id, session.options(global))
        .await?;
    match result.as_value().and_then(|v| v.as_str()) {
        Some(token) => {
            println!("{token}");
            Ok(())
        }
        None => bail!("No access token returned for page {}", args.page_id),
    }
}
