//! On-disk table definitions.
//!
//! These mirror the file schema one-to-one and are what the parsers and the
//! converters read and write. [`TableDef::into_table`] validates a
//! definition into the typed [`Table`](super::Table) model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};

/// A quantity field: dice notation or a literal.
///
/// Files may write it as a string (`"2d6"`) or a bare integer (`20`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "QuantityRepr")]
pub struct Quantity(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum QuantityRepr {
    Text(String),
    Number(i64),
}

impl From<QuantityRepr> for Quantity {
    fn from(repr: QuantityRepr) -> Self {
        match repr {
            QuantityRepr::Text(s) => Self(s),
            QuantityRepr::Number(n) => Self(n.to_string()),
        }
    }
}

impl From<&str> for Quantity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A row as written in a definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDef {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Share of the table's total weight (default 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    /// Delegate the whole row to another table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Append a roll on another table to this row's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtable: Option<String>,
    /// How many of the item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
    /// Unit appended to the rolled quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// A column as written in a definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Percent chance the column fires on a pass (default 100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chance: Option<i64>,
    /// Table rolled on when the column fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Item count, or number of rolls when `table` is set (default `"1"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
}

/// A whole definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TableDef {
    /// Display name of the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sum of all row weights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<i64>,
    /// Present on row tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<RowDef>>,
    /// Present on column tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnDef>>,
}

impl ColumnDef {
    /// The column's chance in percent, defaulting to 100.
    ///
    /// Values outside `1..=100` are rejected.
    pub fn chance(&self, table: &str) -> TableResult<u32> {
        match self.chance {
            None => Ok(100),
            Some(c) if (1..=100).contains(&c) => Ok(c as u32),
            Some(c) => Err(TableError::invalid(
                table,
                format!("column chance out of range: {c}"),
            )),
        }
    }
}

/// Serialization format of a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl Format {
    /// Recognized file extensions in lookup priority order.
    pub const EXTENSIONS: &'static [(&'static str, Format)] = &[
        ("json", Format::Json),
        ("yaml", Format::Yaml),
        ("yml", Format::Yaml),
    ];

    /// Look up the format for a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, format)| *format)
    }

    /// Parse definition text; `origin` names the source in error messages.
    pub fn parse(self, text: &str, origin: &str) -> TableResult<TableDef> {
        let parsed = match self {
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|reason| TableError::Parse {
            origin: origin.to_string(),
            reason,
        })
    }

    /// Serialize a definition; JSON is pretty-printed.
    pub fn write(self, def: &TableDef) -> TableResult<String> {
        let written = match self {
            Self::Json => serde_json::to_string_pretty(def)
                .map(|s| s + "\n")
                .map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::to_string(def).map_err(|e| e.to_string()),
        };
        written.map_err(TableError::Write)
    }
}
