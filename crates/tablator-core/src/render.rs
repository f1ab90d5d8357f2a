//! Plain-text rendering of tables.
//!
//! Row tables render as a die header followed by one line per row with the
//! range of draws that selects it. Column tables render one line per column
//! with its chance. Referenced tables are shown by their display name.

use crate::error::TableResult;
use crate::store::TableStore;
use crate::table::{ColumnTable, RowTable, Table};

/// Render `table` as plain text, looking up referenced titles in `store`.
pub fn render(table: &Table, store: &mut TableStore) -> TableResult<String> {
    match table {
        Table::Rows(t) => render_rows(t, store),
        Table::Columns(t) => render_columns(t, store),
    }
}

fn render_rows(table: &RowTable, store: &mut TableStore) -> TableResult<String> {
    let die = match table.total_weight {
        100 => "%".to_string(),
        n => n.to_string(),
    };

    let mut out = String::new();
    out.push_str(&format!(" d{die}\t{}\n", table.name));
    out.push_str(&format!("-----\t{}\n", rule(&table.name)));

    let mut low = 1u32;
    for row in &table.rows {
        let high = low + row.weight - 1;
        let mut label = match (&row.name, &row.table) {
            (Some(name), _) => name.clone(),
            (None, Some(target)) => store.table_title(target)?,
            (None, None) => String::new(),
        };
        if let Some(quantity) = row.quantity.as_deref().filter(|q| *q != "1") {
            label.push_str(&format!(" ({quantity}"));
            if let Some(units) = &row.units {
                label.push_str(&format!(" {units}"));
            }
            label.push(')');
        }

        if low == high {
            out.push_str(&format!("{low:02}\t{label}\n"));
        } else {
            out.push_str(&format!("{low:02}-{high:02}\t{label}\n"));
        }
        low = high + 1;
    }

    out.push('\n');
    Ok(out)
}

fn render_columns(table: &ColumnTable, store: &mut TableStore) -> TableResult<String> {
    let mut out = String::new();
    out.push_str(&format!("{}\n", table.name));
    out.push_str(&format!("{}\n", rule(&table.name)));

    for column in &table.columns {
        let label = match (&column.name, &column.table) {
            (Some(name), _) => name.clone(),
            (None, Some(target)) => store.table_title(target)?,
            (None, None) => String::new(),
        };
        out.push_str(&format!("{:>3}% ", column.chance));
        if column.quantity != "1" {
            out.push_str(&format!("{} ", column.quantity));
        }
        out.push_str(&format!("{label}\n"));
    }

    out.push('\n');
    Ok(out)
}

fn rule(name: &str) -> String {
    "-".repeat(name.chars().count())
}
