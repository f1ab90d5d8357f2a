//! Validated table model.
//!
//! A table is either a *row table*, rolled once by weighted draw, or a
//! *column table*, where every column gets its own chance roll on each pass.
//! The shape is decided once, when a [`TableDef`] is validated.

pub mod def;

pub use def::{ColumnDef, Format, Quantity, RowDef, TableDef};

use tracing::debug;

use crate::error::{TableError, TableResult};

/// A loaded, validated table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Table {
    /// Rolled by one weighted draw among its rows.
    Rows(RowTable),
    /// Rolled by one pass over all of its columns.
    Columns(ColumnTable),
}

impl Table {
    /// The table's display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Rows(t) => &t.name,
            Self::Columns(t) => &t.name,
        }
    }

    /// Parse and validate a JSON definition.
    pub fn from_json_str(text: &str) -> TableResult<Self> {
        Format::Json.parse(text, "<json>")?.into_table()
    }

    /// Parse and validate a YAML definition.
    pub fn from_yaml_str(text: &str) -> TableResult<Self> {
        Format::Yaml.parse(text, "<yaml>")?.into_table()
    }
}

/// A table resolved by a single weighted draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTable {
    /// Display name.
    pub name: String,
    /// Sum of all row weights; the die size.
    pub total_weight: u32,
    /// Rows in declaration order.
    pub rows: Vec<Row>,
}

impl RowTable {
    /// The row selected by a draw in `1..=total_weight`.
    ///
    /// Rows are scanned in order and the first whose cumulative weight
    /// reaches `draw` wins.
    pub fn row_for_draw(&self, draw: u32) -> Option<&Row> {
        let mut cumulative = 0u32;
        self.rows.iter().find(|row| {
            cumulative += row.weight;
            cumulative >= draw
        })
    }
}

/// One weighted entry of a row table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Display name; only absent on delegating rows.
    pub name: Option<String>,
    /// Effective weight (1 when the file omits it).
    pub weight: u32,
    /// Table the whole row delegates to.
    pub table: Option<String>,
    /// Table rolled for a parenthesized sub-item.
    pub subtable: Option<String>,
    /// Quantity expression.
    pub quantity: Option<String>,
    /// Units appended to the rolled quantity.
    pub units: Option<String>,
}

/// A table resolved by one pass over independent columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTable {
    /// Display name.
    pub name: String,
    /// Declared total weight, if any. Always equals the column count.
    pub total_weight: Option<u32>,
    /// Columns in declaration order; order is kept in the output.
    pub columns: Vec<Column>,
}

/// One entry of a column table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Display name.
    pub name: Option<String>,
    /// Percent chance of firing on a pass, in `1..=100`.
    pub chance: u32,
    /// Table rolled on when the column fires.
    pub table: Option<String>,
    /// Item count, or the number of rolls on `table`.
    pub quantity: String,
}

impl TableDef {
    /// Validate this definition into a [`Table`].
    ///
    /// Checks that exactly one of `rows`/`columns` is present, that row
    /// weights are positive and add up to `total-weight`, that every row
    /// can be named, and that column chances are in range.
    pub fn into_table(self) -> TableResult<Table> {
        let name = self
            .name
            .ok_or_else(|| TableError::invalid("<unnamed>", "missing `name`"))?;

        match (self.rows, self.columns) {
            (Some(rows), None) => {
                let total_weight = self
                    .total_weight
                    .ok_or_else(|| TableError::invalid(&name, "row table missing `total-weight`"))?;
                let total_weight = positive(&name, "total-weight", total_weight)?;
                validate_rows(name, total_weight, rows).map(Table::Rows)
            }
            (None, Some(columns)) => {
                validate_columns(name, self.total_weight, columns).map(Table::Columns)
            }
            (Some(_), Some(_)) => Err(TableError::invalid(
                name,
                "has both `rows` and `columns`",
            )),
            (None, None) => Err(TableError::invalid(name, "has neither `rows` nor `columns`")),
        }
    }
}

fn positive(table: &str, field: &str, value: i64) -> TableResult<u32> {
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(TableError::invalid(
            table,
            format!("`{field}` must be a positive integer, got {value}"),
        )),
    }
}

fn validate_rows(name: String, total_weight: u32, defs: Vec<RowDef>) -> TableResult<RowTable> {
    if defs.is_empty() {
        return Err(TableError::invalid(name, "`rows` is empty"));
    }

    let mut rows = Vec::with_capacity(defs.len());
    let mut weight_total: u64 = 0;
    for (index, def) in defs.into_iter().enumerate() {
        if def.name.is_none() && def.table.is_none() {
            return Err(TableError::invalid(
                name,
                format!("row {index} needs a `name` or a `table`"),
            ));
        }
        let weight = match def.weight {
            Some(w) => positive(&name, "weight", w)?,
            None => 1,
        };
        weight_total += u64::from(weight);
        rows.push(Row {
            name: def.name,
            weight,
            table: def.table,
            subtable: def.subtable,
            quantity: def.quantity.map(|q| q.0),
            units: def.units,
        });
    }

    debug!(table = %name, weight_total, total_weight, "checked weights");
    if weight_total != u64::from(total_weight) {
        return Err(TableError::invalid(
            name,
            format!("row weights don't add up: {weight_total} of {total_weight}"),
        ));
    }

    Ok(RowTable {
        name,
        total_weight,
        rows,
    })
}

fn validate_columns(
    name: String,
    total_weight: Option<i64>,
    defs: Vec<ColumnDef>,
) -> TableResult<ColumnTable> {
    if defs.is_empty() {
        return Err(TableError::invalid(name, "`columns` is empty"));
    }

    let total_weight = match total_weight {
        Some(w) => {
            let w = positive(&name, "total-weight", w)?;
            if w as usize != defs.len() {
                return Err(TableError::invalid(
                    name,
                    format!("`total-weight` is {w} but there are {} columns", defs.len()),
                ));
            }
            Some(w)
        }
        None => None,
    };

    let columns = defs
        .into_iter()
        .map(|def| {
            Ok(Column {
                chance: def.chance(&name)?,
                name: def.name,
                table: def.table,
                quantity: def.quantity.map_or_else(|| "1".to_string(), |q| q.0),
            })
        })
        .collect::<TableResult<Vec<_>>>()?;

    Ok(ColumnTable {
        name,
        total_weight,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_ITEM: &str = r#"{
        "name": "One Item Table",
        "total-weight": 1,
        "rows": [{"weight": 1, "name": "only row"}]
    }"#;

    fn rows(table: Table) -> RowTable {
        match table {
            Table::Rows(t) => t,
            Table::Columns(t) => panic!("expected a row table, got columns of {}", t.name),
        }
    }

    fn invalid_reason(text: &str) -> String {
        match Table::from_json_str(text) {
            Err(TableError::InvalidTable { reason, .. }) => reason,
            other => panic!("expected InvalidTable, got {other:?}"),
        }
    }

    #[test]
    fn one_item_table() {
        let t = rows(Table::from_json_str(ONE_ITEM).unwrap());
        assert_eq!(t.name, "One Item Table");
        assert_eq!(t.total_weight, 1);
        assert_eq!(t.rows[0].name.as_deref(), Some("only row"));
    }

    #[test]
    fn weights_one_through_nine() {
        let rows_json: Vec<String> = (1..=9)
            .map(|w| format!(r#"{{"weight": {w}, "name": "row {w}"}}"#))
            .collect();
        let text = format!(
            r#"{{"name": "Nine Item Table", "total-weight": 45, "rows": [{}]}}"#,
            rows_json.join(",")
        );
        let t = rows(Table::from_json_str(&text).unwrap());
        assert_eq!(t.rows.len(), 9);
    }

    #[test]
    fn default_weight_is_one() {
        let t = rows(
            Table::from_yaml_str(
                "name: Defaults\ntotal-weight: 5\nrows:\n  - name: a\n  - name: b\n  - name: c\n  - name: d\n  - name: e\n",
            )
            .unwrap(),
        );
        assert!(t.rows.iter().all(|r| r.weight == 1));
    }

    #[test]
    fn bad_weights_are_rejected() {
        let reason = invalid_reason(
            r#"{"name": "Bad", "total-weight": 10, "rows": [
                {"weight": 1, "name": "a"}, {"weight": 3, "name": "b"},
                {"weight": 5, "name": "c"}, {"weight": 3, "name": "d"},
                {"weight": 1, "name": "e"}]}"#,
        );
        assert_eq!(reason, "row weights don't add up: 13 of 10");
    }

    #[test]
    fn non_positive_weights_are_rejected() {
        let reason =
            invalid_reason(r#"{"name": "Z", "total-weight": 1, "rows": [{"weight": 0, "name": "a"}, {"name": "b"}]}"#);
        assert!(reason.contains("`weight` must be a positive integer, got 0"));
        let reason = invalid_reason(r#"{"name": "Z", "total-weight": 0, "rows": [{"name": "a"}]}"#);
        assert!(reason.contains("total-weight"));
    }

    #[test]
    fn row_table_requires_total_weight() {
        let reason = invalid_reason(r#"{"name": "NoTotal", "rows": [{"name": "a"}]}"#);
        assert_eq!(reason, "row table missing `total-weight`");
    }

    #[test]
    fn shape_must_be_exactly_one() {
        assert_eq!(
            invalid_reason(r#"{"name": "Unknown", "type": "unknown"}"#),
            "has neither `rows` nor `columns`"
        );
        assert_eq!(
            invalid_reason(
                r#"{"name": "Both", "total-weight": 1, "rows": [{"name": "a"}], "columns": [{"name": "b"}]}"#
            ),
            "has both `rows` and `columns`"
        );
        assert_eq!(invalid_reason(r#"{"name": "Empty", "total-weight": 1, "rows": []}"#), "`rows` is empty");
    }

    #[test]
    fn nameless_rows_need_a_table() {
        let reason = invalid_reason(r#"{"name": "N", "total-weight": 1, "rows": [{"weight": 1}]}"#);
        assert_eq!(reason, "row 0 needs a `name` or a `table`");
        assert!(Table::from_json_str(
            r#"{"name": "N", "total-weight": 1, "rows": [{"table": "other"}]}"#
        )
        .is_ok());
    }

    #[test]
    fn missing_name() {
        assert_eq!(invalid_reason(r#"{"total-weight": 1, "rows": [{"name": "a"}]}"#), "missing `name`");
    }

    #[test]
    fn column_defaults() {
        let t = Table::from_json_str(
            r#"{"name": "Table List, No Chance", "columns": [
                {"name": "First Table", "quantity": "1"},
                {"name": "Second Table", "quantity": "2d10"},
                {"table": "gems"}]}"#,
        )
        .unwrap();
        let Table::Columns(t) = t else {
            panic!("expected a column table");
        };
        assert_eq!(t.total_weight, None);
        assert!(t.columns.iter().all(|c| c.chance == 100));
        assert_eq!(t.columns[1].quantity, "2d10");
        assert_eq!(t.columns[2].quantity, "1");
    }

    #[test]
    fn column_chance_out_of_range() {
        let reason = invalid_reason(
            r#"{"name": "Bad Chance", "columns": [{"name": "First", "chance": -99, "table": "x"}]}"#,
        );
        assert_eq!(reason, "column chance out of range: -99");
        let reason = invalid_reason(
            r#"{"name": "Bad Chance", "columns": [{"name": "Second", "chance": 1234, "table": "x"}]}"#,
        );
        assert_eq!(reason, "column chance out of range: 1234");
    }

    #[test]
    fn column_total_weight_must_match_count() {
        assert!(Table::from_json_str(
            r#"{"name": "C", "total-weight": 2, "columns": [{"name": "a"}, {"name": "b"}]}"#
        )
        .is_ok());
        let reason =
            invalid_reason(r#"{"name": "C", "total-weight": 50, "columns": [{"name": "a"}, {"name": "b"}]}"#);
        assert_eq!(reason, "`total-weight` is 50 but there are 2 columns");
    }

    #[test]
    fn draw_boundaries() {
        let t = rows(
            Table::from_json_str(
                r#"{"name": "Two", "total-weight": 2, "rows": [{"weight": 1, "name": "row one"}, {"weight": 1, "name": "row two"}]}"#,
            )
            .unwrap(),
        );
        assert_eq!(t.row_for_draw(1).unwrap().name.as_deref(), Some("row one"));
        assert_eq!(t.row_for_draw(2).unwrap().name.as_deref(), Some("row two"));
        assert!(t.row_for_draw(3).is_none());
    }

    #[test]
    fn draw_walks_cumulative_weights() {
        let t = rows(
            Table::from_json_str(
                r#"{"name": "W", "total-weight": 6, "rows": [{"weight": 1, "name": "a"}, {"weight": 2, "name": "b"}, {"weight": 3, "name": "c"}]}"#,
            )
            .unwrap(),
        );
        let picks: Vec<_> = (1..=6)
            .map(|i| t.row_for_draw(i).unwrap().name.clone().unwrap())
            .collect();
        assert_eq!(picks, ["a", "b", "b", "c", "c", "c"]);
    }
}
