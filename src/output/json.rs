//
//  graph-client
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # JSON Output
//!
//! Printing helpers for JSON results, plus a small path filter for the
//! `--jq`-style `--filter` flag of `graph api`.
//!
//! ## Filter Syntax
//!
//! | Filter | Selects |
//! |--------|---------|
//! | `.` | the whole value |
//! | `.name` | a field |
//! | `.paging.next` | a nested field |
//! | `.data[0].id` | an array element, then a field |
//! | `.data[].id` | a field of every array element |
//!
//! ```rust
//! use graph_client::output::apply_filter;
//! use serde_json::json;
//!
//! let body = json!({"data": [{"id": "1"}, {"id": "2"}]});
//! assert_eq!(apply_filter(&body, ".data[].id").unwrap(), json!(["1", "2"]));
//! assert_eq!(apply_filter(&body, ".data[1]").unwrap(), json!({"id": "2"}));
//! ```

use std::io::{self, Write};

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;

/// Prints a value as JSON, pretty or compact.
pub fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json_to(&mut handle, value, pretty)
}

/// Writes a value as JSON followed by a newline.
pub fn write_json_to<W: Write, T: Serialize>(writer: &mut W, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, value)?;
    } else {
        serde_json::to_writer(&mut *writer, value)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Prints one compact JSON document per line.
pub fn write_json_lines<T: Serialize>(values: &[T]) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for value in values {
        serde_json::to_writer(&mut handle, value)?;
        writeln!(handle)?;
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Step {
    Field(String),
    Index(usize),
    Each,
}

/// Selects part of a value with a dotted path.
///
/// Missing fields and out-of-range indexes select `null`. Only a malformed
/// filter is an error.
pub fn apply_filter(value: &Value, filter: &str) -> Result<Value> {
    let steps = parse_filter(filter)?;
    Ok(select(value, &steps))
}

fn parse_filter(filter: &str) -> Result<Vec<Step>> {
    let filter = filter.trim();
    let Some(rest) = filter.strip_prefix('.') else {
        bail!("Filter must start with '.': {filter}");
    };

    let mut steps = Vec::new();
    for segment in rest.split('.').filter(|s| !s.is_empty()) {
        let (field, mut brackets) = match segment.find('[') {
            Some(pos) => segment.split_at(pos),
            None => (segment, ""),
        };
        if !field.is_empty() {
            steps.push(Step::Field(field.to_string()));
        }
        while let Some(open) = brackets.strip_prefix('[') {
            let Some(close) = open.find(']') else {
                bail!("Unclosed '[' in filter: {filter}");
            };
            let inner = &open[..close];
            if inner.is_empty() {
                steps.push(Step::Each);
            } else {
                match inner.parse() {
                    Ok(index) => steps.push(Step::Index(index)),
                    Err(_) => bail!("Invalid index '{inner}' in filter: {filter}"),
                }
            }
            brackets = &open[close + 1..];
        }
        if !brackets.is_empty() {
            bail!("Unexpected '{brackets}' in filter: {filter}");
        }
    }
    Ok(steps)
}

fn select(value: &Value, steps: &[Step]) -> Value {
    let Some((step, rest)) = steps.split_first() else {
        return value.clone();
    };
    match step {
        Step::Field(name) => select(value.get(name).unwrap_or(&Value::Null), rest),
        Step::Index(index) => select(value.get(*index).unwrap_or(&Value::Null), rest),
        Step::Each => match value {
            Value::Array(items) => Value::Array(items.iter().map(|item| select(item, rest)).collect()),
            Value::Object(map) => Value::Array(map.values().map(|item| select(item, rest)).collect()),
            _ => Value::Null,
        },
    }
}
