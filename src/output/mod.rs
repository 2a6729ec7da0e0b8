//
//  graph-client
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Formatting Module
//!
//! How the `graph` binary prints results.
//!
//! | Format | Use |
//! |--------|-----|
//! | [`OutputFormat::Json`] | Default; pretty or compact JSON, optionally filtered |
//! | [`OutputFormat::Table`] | Lists of objects as a terminal table |
//!
//! Status messages go through [`OutputWriter`] so they respect the terminal's
//! color support.

mod json;
mod table;

pub use json::*;
pub use table::*;

use serde_json::Value;

use crate::api::GraphResult;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

/// Prints results and status messages.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    format: OutputFormat,
    pretty: bool,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, pretty: bool) -> Self {
        Self {
            format,
            pretty,
            color: console::colors_enabled(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    /// Prints one call result.
    ///
    /// Tables are only used for collections and arrays; anything else falls
    /// back to JSON.
    pub fn write_result(&self, result: &GraphResult, filter: Option<&str>) -> anyhow::Result<()> {
        let json = match filter {
            Some(filter) => apply_filter(&result.to_json(), filter)?,
            None => match (self.format, result) {
                (OutputFormat::Table, GraphResult::Collection(collection)) => {
                    return self.write_items(collection.items());
                }
                _ => result.to_json(),
            },
        };
        self.write_value(&json)
    }

    /// Prints a plain JSON value, as a table when it is an array and the
    /// table format is selected.
    pub fn write_value(&self, value: &Value) -> anyhow::Result<()> {
        match (self.format, value) {
            (OutputFormat::Table, Value::Array(items)) => self.write_items(items),
            _ => write_json(value, self.pretty),
        }
    }

    /// Prints a list of items.
    pub fn write_items(&self, items: &[Value]) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Table => {
                TableBuilder::new().color(self.color).items(items, None).print();
                Ok(())
            }
            OutputFormat::Json => write_json(&items, self.pretty),
        }
    }

    pub fn write_error(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("error:").red().bold(), msg);
        } else {
            eprintln!("error: {}", msg);
        }
    }

    pub fn write_warning(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    pub fn write_info(&self, msg: &str) {
        println!("{}", msg);
    }

    pub fn write_success(&self, msg: &str) {
        use console::style;
        if self.color {
            println!("{} {}", style("✓").green().bold(), msg);
        } else {
            println!("✓ {}", msg);
        }
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new(OutputFormat::Json, true)
    }
}
