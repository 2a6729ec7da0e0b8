//
//  graph-client
//  cli/batch.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Batch command
//!
//! Reads a JSON array of operations and sends them as one batch request.
//! The output is an array with one entry per operation, in input order;
//! failed operations appear as `{"error": {...}}` without failing the rest.
//!
//! ## Input Format
//!
//! ```json
//! [
//!   {"path": "me", "params": {"fields": "id,name"}, "name": "me"},
//!   {"method": "GET", "path": "me/friends", "params": {"limit": 5}},
//!   {"method": "POST", "path": "me/photos", "params": {"source": "@cat.jpg"}},
//!   {"method": "DELETE", "path": "123_456", "access_token": "other-token"}
//! ]
//! ```
//!
//! | Field | Default | Meaning |
//! |-------|---------|---------|
//! | `method` | `GET` | GET, POST, PUT or DELETE |
//! | `path` | required | Graph path |
//! | `params` | `{}` | Strings starting with `@` are uploaded as files |
//! | `name` | none | Name other operations can reference |
//! | `depends_on` | none | Name of an operation that must run first |
//! | `omit_response_on_success` | none | Drop the body when it succeeds |
//! | `access_token` | the CLI token | Token for this operation only |

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::common::ApiError;
use crate::api::{BatchResult, GraphApi, GraphCall, HttpVerb, Params, RequestOptions, UploadFile};

use super::{GlobalOptions, Session};

/// Send several calls in one request
#[derive(Args, Debug)]
pub struct BatchCommand {
    /// JSON file with the operations (- for stdin)
    pub input: PathBuf,

    /// Select part of the output, e.g. .[0].id
    #[arg(long, short = 'q')]
    pub filter: Option<String>,
}

/// One operation as written in the input file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct BatchEntry {
    #[serde(default = "default_method")]
    method: String,
    path: String,
    #[serde(default)]
    params: BTreeMap<String, Value>,
    name: Option<String>,
    depends_on: Option<String>,
    omit_response_on_success: Option<bool>,
    access_token: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl BatchEntry {
    /// Converts the entry into a call, reading `@file` parameters.
    async fn into_call(self, base: &RequestOptions) -> Result<GraphCall> {
        let Some(verb) = HttpVerb::parse(&self.method) else {
            bail!("Unsupported HTTP method in batch: {}", self.method);
        };

        let mut params = Params::new();
        for (key, value) in self.params {
            match value {
                Value::String(s) => match s.strip_prefix('@') {
                    Some(path) => {
                        let file = UploadFile::open(path)
                            .await
                            .with_context(|| format!("Failed to read {path}"))?;
                        params.insert(key, file);
                    }
                    None => {
                        params.insert(key, s);
                    }
                },
                other => {
                    params.insert(key, other);
                }
            }
        }

        let mut options = base.clone();
        if let Some(token) = self.access_token {
            options = options.with_access_token(token);
        }
        if let Some(name) = self.name {
            options = options.named(name);
        }
        if let Some(depends_on) = self.depends_on {
            options = options.depends_on(depends_on);
        }
        if let Some(omit) = self.omit_response_on_success {
            options = options.omit_response_on_success(omit);
        }

        Ok(GraphCall::new(self.path, params, verb, options))
    }
}

impl BatchCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = Session::open(global)?;
        let entries = parse_entries(&self.read_input()?)?;
        let options = session.options(global);

        let scope = session.client.batch()?;
        for entry in entries {
            let call = entry.into_call(&options).await?;
            scope.dispatch(call).await?;
        }
        tracing::debug!(operations = scope.len(), "Batch queued");

        let results = scope.execute_with(options).await?;
        let output = Value::Array(results.iter().map(slot_json).collect());

        match &self.filter {
            Some(filter) => session.output.write_value(&crate::output::apply_filter(&output, filter)?),
            None => session.output.write_value(&output),
        }
    }

    fn read_input(&self) -> Result<String> {
        if self.input.as_os_str() == "-" {
            use std::io::Read;
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        } else {
            std::fs::read_to_string(&self.input)
                .with_context(|| format!("Failed to read {}", self.input.display()))
        }
    }
}

pub(crate) fn parse_entries(input: &str) -> Result<Vec<BatchEntry>> {
    let entries: Vec<BatchEntry> =
        serde_json::from_str(input).context("Batch input must be a JSON array of operations")?;
    if entries.is_empty() {
        tracing::warn!("Batch input is empty");
    }
    Ok(entries)
}

/// Renders one slot for output.
fn slot_json(slot: &BatchResult) -> Value {
    match slot {
        Ok(result) => result.to_json(),
        Err(error) => json!({ "error": error_json(error) }),
    }
}

fn error_json(error: &ApiError) -> Value {
    let kind = match error {
        ApiError::Authentication(_) => "authentication",
        ApiError::Client(_) => "client",
        ApiError::Server(_) => "server",
        ApiError::BadResponse(_) => "bad_response",
        _ => "other",
    };
    let mut value = json!({
        "kind": kind,
        "message": error.to_string(),
        "status": error.http_status(),
    });
    if let Some(info) = error.info().filter(|info| !info.is_empty()) {
        value["info"] = serde_json::to_value(info).unwrap_or(Value::Null);
    }
    value
}
