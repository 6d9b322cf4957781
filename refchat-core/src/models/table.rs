use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Shown in place of a cell a row does not provide.
pub const EMPTY_CELL: &str = "-";

pub type Row = BTreeMap<String, serde_json::Value>;

/// Tabular payload attached to an assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Build a table from string cells, mostly for corpus literals.
    pub fn from_rows<const N: usize>(columns: [&str; N], rows: &[[&str; N]]) -> Self {
        let rows = rows
            .iter()
            .map(|cells| {
                columns
                    .iter()
                    .zip(cells.iter())
                    .map(|(c, v)| (c.to_string(), serde_json::Value::from(*v)))
                    .collect()
            })
            .collect();
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// Display text for one cell. Missing, null and empty cells become [`EMPTY_CELL`].
    pub fn cell_text(row: &Row, column: &str) -> String {
        match row.get(column) {
            None | Some(serde_json::Value::Null) => EMPTY_CELL.to_string(),
            Some(serde_json::Value::String(s)) if s.is_empty() => EMPTY_CELL.to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Row keys that are not declared columns. Such cells are never rendered.
    pub fn undeclared_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .rows
            .iter()
            .flat_map(|r| r.keys())
            .filter(|k| !self.columns.iter().any(|c| c == *k))
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}
