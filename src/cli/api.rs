//
//  graph-client
//  cli/api.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Direct API access command
//!
//! Makes a single call through the full client pipeline (token injection,
//! host routing, error classification, paging), similar to `gh api`.
//!
//! ## Examples
//!
//! ```bash
//! # Read an object
//! graph api me -F fields=id,name
//!
//! # Create a post
//! graph api -X POST me/feed -F message="Hello"
//!
//! # Follow every page of a connection, printing only the ids
//! graph api me/friends --paginate --filter '.[].id'
//!
//! # Legacy REST method
//! graph api --rest admin.getAppProperties -F properties:='["app_name"]'
//! ```

use anyhow::{bail, Result};
use clap::Args;
use serde_json::Value;

use crate::api::{GraphApi, GraphCall, HttpComponent, HttpVerb};

use super::{collect_pages, parse_fields, GlobalOptions, Session};

/// Make a raw API call
#[derive(Args, Debug)]
pub struct ApiCommand {
    /// Path (e.g. me/feed) or, with --rest, the REST method name
    pub path: String,

    /// HTTP method (GET, POST, PUT, DELETE)
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Parameters: key=value, key:=json, key=@file (repeatable)
    #[arg(long, short = 'F', action = clap::ArgAction::Append)]
    pub field: Vec<String>,

    /// Call the legacy REST API instead of the Graph API
    #[arg(long)]
    pub rest: bool,

    /// Route through the beta host
    #[arg(long)]
    pub beta: bool,

    /// Follow `paging.next` links and print every item
    #[arg(long, conflicts_with_all = ["rest", "include"])]
    pub paginate: bool,

    /// Stop after this many pages when paginating
    #[arg(long, default_value = "100")]
    pub max_pages: usize,

    /// Print the response status and headers instead of the body
    #[arg(long, short = 'i')]
    pub include: bool,

    /// Select part of the output, e.g. .data[0].id
    #[arg(long, short = 'q')]
    pub filter: Option<String>,
}

impl ApiCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let verb = self.parse_method()?;
        let params = parse_fields(&self.field).await?;

        let mut options = session.options(global);
        if self.beta {
            options = options.beta();
        }
        if self.include {
            options = options.with_component(HttpComponent::Response);
        }

        let result = if self.rest {
            session
                .client
                .rest_call(&self.path, params, verb, options)
                .await?
        } else {
            if verb != HttpVerb::Get {
                session.client.require_token(&options)?;
            }
            session
                .client
                .dispatch(GraphCall::new(self.path.as_str(), params, verb, options))
                .await?
        };

        if self.paginate {
            let items = collect_pages(result, self.max_pages).await?;
            let items = Value::Array(items);
            return match &self.filter {
                Some(filter) => session.output.write_value(&crate::output::apply_filter(&items, filter)?),
                None => session.output.write_value(&items),
            };
        }

        session.output.write_result(&result, self.filter.as_deref())
    }

    fn parse_method(&self) -> Result<HttpVerb> {
        match HttpVerb::parse(&self.method) {
            Some(verb) => Ok(verb),
            None => bail!("Unsupported HTTP method: {}", self.method),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::{Cli, Commands};

    fn parse(args: &[&str]) -> ApiCommand {
        let mut argv = vec!["graph", "api"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Api(cmd) => cmd,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(parse(&["me"]).parse_method().unwrap(), HttpVerb::Get);
        assert_eq!(parse(&["-X", "delete", "123"]).parse_method().unwrap(), HttpVerb::Delete);
        assert!(parse(&["-X", "PATCH", "123"]).parse_method().is_err());
    }

    #[test]
    fn test_rest_and_paginate_conflict() {
        let argv = ["graph", "api", "--rest", "--paginate", "users.getInfo"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_include_and_paginate_conflict() {
        let argv = ["graph", "api", "-i", "--paginate", "me/friends"];
        assert!(Cli::try_parse_from(argv).is_err());
        assert!(parse(&["-i", "me"]).include);
    }
}
