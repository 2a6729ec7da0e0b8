//
//  graph-client
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Table Output
//!
//! Renders lists of Graph objects as terminal tables using `comfy-table`.
//!
//! Columns are the scalar fields of the objects, in first-seen order, with
//! `id` always first when present. Nested values are shown as compact JSON.
//!
//! ```rust
//! use graph_client::output::{infer_columns, TableBuilder};
//! use serde_json::json;
//!
//! let items = vec![json!({"name": "Mark", "id": "4"}), json!({"id": "5", "link": "x"})];
//! assert_eq!(infer_columns(&items), vec!["id", "name", "link"]);
//!
//! let table = TableBuilder::new().color(false).items(&items, None).build();
//! assert!(table.to_string().contains("Mark"));
//! ```

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde_json::Value;

/// Creates a table with the crate's standard styling.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Builder for output tables.
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Sets the header row (cyan when color is enabled).
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        if self.color {
            let cells: Vec<Cell> = headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
            self.table.set_header(cells);
        } else {
            self.table.set_header(headers);
        }
        self
    }

    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = cells.into_iter().map(Into::into).collect();
        self.table.add_row(row);
        self
    }

    /// Adds one row per item, using `columns` or the inferred columns.
    pub fn items(self, items: &[Value], columns: Option<&[String]>) -> Self {
        let columns: Vec<String> = match columns {
            Some(columns) if !columns.is_empty() => columns.to_vec(),
            _ => infer_columns(items),
        };

        let mut builder = self.headers(columns.iter().cloned());
        for item in items {
            let cells: Vec<String> = if columns.is_empty() {
                vec![format_cell(item)]
            } else {
                columns
                    .iter()
                    .map(|c| item.get(c).map(format_cell).unwrap_or_default())
                    .collect()
            };
            builder = builder.row(cells);
        }
        builder
    }

    pub fn print(self) {
        println!("{}", self.table);
    }

    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scalar field names across `items`, `id` first, then first-seen order.
pub fn infer_columns(items: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for item in items {
        let Some(map) = item.as_object() else { continue };
        for (key, value) in map {
            if !value.is_object() && !value.is_array() && !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    if let Some(pos) = columns.iter().position(|c| c == "id") {
        let id = columns.remove(pos);
        columns.insert(0, id);
    }
    columns
}

/// Renders one value for a table cell.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders a boolean as a check mark or cross.
pub fn format_bool(value: bool, color: bool) -> String {
    use console::style;
    match (value, color) {
        (true, true) => style("✓").green().to_string(),
        (false, true) => style("✗").red().to_string(),
        (true, false) => "yes".to_string(),
        (false, false) => "no".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_values_are_not_columns() {
        let items = vec![json!({"id": "1", "from": {"id": "2"}, "tags": []})];
        assert_eq!(infer_columns(&items), vec!["id"]);
    }

    #[test]
    fn test_explicit_columns() {
        let items = vec![json!({"id": "1", "name": "A"})];
        let columns = vec!["name".to_string(), "missing".to_string()];
        let rendered = TableBuilder::new().color(false).items(&items, Some(&columns)).build().to_string();
        assert!(rendered.contains("name"));
        assert!(rendered.contains("missing"));
        assert!(!rendered.contains("id"));
    }

    #[test]
    fn test_scalar_items() {
        let items = vec![json!(1), json!("two")];
        let rendered = TableBuilder::new().color(false).items(&items, None).build().to_string();
        assert!(rendered.contains("two"));
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&json!(null)), "");
        assert_eq!(format_cell(&json!("x")), "x");
        assert_eq!(format_cell(&json!({"a": 1})), "{\"a\":1}");
    }

    #[test]
    fn test_format_bool_plain() {
        assert_eq!(format_bool(true, false), "yes");
        assert_eq!(format_bool(false, false), "no");
    }
}
