//
//  graph-client
//  cli/object.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Object and connection commands
//!
//! ## Examples
//!
//! ```bash
//! graph object get me --fields id,name
//! graph object get 4 5 6                # several ids in one request
//! graph object connections me friends --limit 10 --table
//! graph object connections me friends --all
//! graph object search coffee --type place
//! graph object picture 4 --type large
//! graph object delete 123_456
//! graph object fql "SELECT uid FROM user WHERE uid = me()"
//! graph object fql -n me="SELECT uid FROM user WHERE uid = me()" -n friends="SELECT uid2 FROM friend WHERE uid1 = me()"
//! ```

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::api::{GraphApi, Params};

use super::{collect_pages, GlobalOptions, Session};

/// Read objects and connections
#[derive(Args, Debug)]
pub struct ObjectCommand {
    #[command(subcommand)]
    pub command: ObjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ObjectSubcommand {
    /// Fetch one or more objects by id
    Get(GetArgs),

    /// Fetch a connection of an object
    #[command(visible_alias = "conn")]
    Connections(ConnectionsArgs),

    /// Search the graph
    Search(SearchArgs),

    /// Print the image URL of an object's picture
    Picture(PictureArgs),

    /// Delete an object, or one item of a connection
    Delete(DeleteArgs),

    /// Fetch comments attached to external URLs
    Comments(CommentsArgs),

    /// Run one FQL query, or several named ones
    Fql(FqlArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Object ids (several ids are fetched in one request)
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Comma-separated fields to return
    #[arg(long)]
    pub fields: Option<String>,

    /// Include introspection metadata (single id only)
    #[arg(long)]
    pub metadata: bool,
}

#[derive(Args, Debug)]
pub struct ConnectionsArgs {
    /// Object id
    pub id: String,

    /// Connection name, e.g. friends or feed
    pub connection: String,

    /// Comma-separated fields to return
    #[arg(long)]
    pub fields: Option<String>,

    /// Page size
    #[arg(long, short = 'L')]
    pub limit: Option<u32>,

    /// Follow every page and print all items
    #[arg(long)]
    pub all: bool,

    /// Stop after this many pages with --all
    #[arg(long, default_value = "100")]
    pub max_pages: usize,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search terms
    pub query: String,

    /// Object type to search for, e.g. user, page, place
    #[arg(long, short = 't')]
    pub r#type: Option<String>,

    /// Page size
    #[arg(long, short = 'L')]
    pub limit: Option<u32>,
}

#[derive(Args, Debug)]
pub struct PictureArgs {
    /// Object id
    pub id: String,

    /// Picture size: square, small, normal or large
    #[arg(long, short = 't')]
    pub r#type: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Object id
    pub id: String,

    /// Delete from this connection instead of deleting the object
    #[arg(long)]
    pub connection: Option<String>,
}

#[derive(Args, Debug)]
pub struct CommentsArgs {
    /// External URLs
    #[arg(required = true)]
    pub urls: Vec<String>,
}

#[derive(Args, Debug)]
pub struct FqlArgs {
    /// A single query
    #[arg(conflicts_with = "named", required_unless_present = "named")]
    pub query: Option<String>,

    /// Named query for a multiquery: name=query (repeatable)
    #[arg(long = "named", short = 'n', action = clap::ArgAction::Append)]
    pub named: Vec<String>,
}

impl ObjectCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let options = session.options(global);
        let client = &session.client;

        let result = match &self.command {
            ObjectSubcommand::Get(args) => {
                let params = fields_param(args.fields.as_deref());
                match args.ids.as_slice() {
                    [id] if args.metadata => {
                        if args.fields.is_some() {
                            tracing::warn!("--fields is ignored with --metadata");
                        }
                        client.get_object_metadata(id, options).await?
                    }
                    [id] => client.get_object(id, params, options).await?,
                    ids => {
                        if args.metadata {
                            bail!("--metadata needs exactly one id");
                        }
                        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
                        client.get_objects(&ids, params, options).await?
                    }
                }
            }
            ObjectSubcommand::Connections(args) => {
                let mut params = fields_param(args.fields.as_deref());
                if let Some(limit) = args.limit {
                    params.insert("limit", limit);
                }
                let result = client
                    .get_connections(&args.id, &args.connection, params, options)
                    .await?;
                if args.all {
                    let items = collect_pages(result, args.max_pages).await?;
                    return session.output.write_items(&items);
                }
                result
            }
            ObjectSubcommand::Search(args) => {
                let mut params = Params::new();
                if let Some(kind) = &args.r#type {
                    params.insert("type", kind);
                }
                if let Some(limit) = args.limit {
                    params.insert("limit", limit);
                }
                client.search(&args.query, params, options).await?
            }
            ObjectSubcommand::Picture(args) => {
                let mut params = Params::new();
                if let Some(kind) = &args.r#type {
                    params.insert("type", kind);
                }
                client.get_picture(&args.id, params, options).await?
            }
            ObjectSubcommand::Delete(args) => match &args.connection {
                Some(connection) => {
                    client
                        .delete_connections(&args.id, connection, Params::new(), options)
                        .await?
                }
                None => client.delete_object(&args.id, options).await?,
            },
            ObjectSubcommand::Comments(args) => {
                let urls: Vec<&str> = args.urls.iter().map(String::as_str).collect();
                client.get_comments_for_urls(&urls, options).await?
            }
            ObjectSubcommand::Fql(args) => match &args.query {
                Some(query) => client.fql_query(query, options).await?,
                None => {
                    let queries = parse_named_queries(&args.named)?;
                    client.fql_multiquery(&queries, options).await?
                }
            },
        };

        session.output.write_result(&result, None)
    }
}

fn fields_param(fields: Option<&str>) -> Params {
    match fields {
        Some(fields) => Params::new().with("fields", fields),
        None => Params::new(),
    }
}

/// Splits `name=query` pairs on the first `=`.
fn parse_named_queries(named: &[String]) -> Result<BTreeMap<String, String>> {
    let mut queries = BTreeMap::new();
    for entry in named {
        match entry.split_once('=') {
            Some((name, query)) if !name.is_empty() && !query.is_empty() => {
                queries.insert(name.to_string(), query.to_string());
            }
            _ => bail!("Invalid named query (expected name=query): {entry}"),
        }
    }
    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_queries() {
        let named = vec![
            "me=SELECT uid FROM user WHERE uid = me()".to_string(),
            "pics=SELECT pid FROM photo WHERE owner = 4".to_string(),
        ];
        let queries = parse_named_queries(&named).unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries["pics"], "SELECT pid FROM photo WHERE owner = 4");
    }

    #[test]
    fn test_parse_named_queries_rejects_missing_name() {
        assert!(parse_named_queries(&["=SELECT 1".to_string()]).is_err());
        assert!(parse_named_queries(&["nothing".to_string()]).is_err());
    }

    #[test]
    fn test_fields_param() {
        assert!(fields_param(None).is_empty());
        assert_eq!(fields_param(Some("id,name")).encode(), "fields=id%2Cname");
    }
}
