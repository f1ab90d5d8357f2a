//! Table resolution.
//!
//! A [`Generator`] owns the [`TableStore`] and the random source and turns
//! tables into result strings. Row tables produce one string per roll.
//! Column tables produce a list per pass, one entry per column that fires
//! (or several, when a column rolls repeatedly on another table).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::dice::roll_quantity;
use crate::error::{TableError, TableResult};
use crate::render;
use crate::store::TableStore;
use crate::table::{ColumnTable, Row, RowTable, Table};

/// Deepest chain of table references followed before giving up.
pub const MAX_DEPTH: usize = 64;

/// Rolls on tables from a store.
#[derive(Debug)]
pub struct Generator {
    store: TableStore,
    rng: StdRng,
    depth: usize,
}

impl Generator {
    /// Create a generator seeded from the operating system.
    pub fn new(store: TableStore) -> Self {
        Self::with_rng(store, StdRng::from_os_rng())
    }

    /// Create a generator with a fixed seed for reproducible rolls.
    pub fn with_seed(store: TableStore, seed: u64) -> Self {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(store: TableStore, rng: StdRng) -> Self {
        Self {
            store,
            rng,
            depth: 0,
        }
    }

    /// The underlying table store.
    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// Mutable access to the table store.
    pub fn store_mut(&mut self) -> &mut TableStore {
        &mut self.store
    }

    /// Roll `count` times on the table called `name`.
    ///
    /// Row tables contribute one string per roll, column tables the whole
    /// list of each pass.
    pub fn generate(&mut self, name: &str, count: usize) -> TableResult<Vec<String>> {
        trace!(table = name, count, "generate");
        let mut values = Vec::new();
        self.resolve_into(name, count, &mut values)?;
        Ok(values)
    }

    /// Render the table called `name` as plain text.
    pub fn render(&mut self, name: &str) -> TableResult<String> {
        let table = self.store.load(name)?;
        render::render(&table, &mut self.store)
    }

    /// Pick a row by weighted draw.
    pub fn select_row<'t>(&mut self, table: &'t RowTable) -> TableResult<&'t Row> {
        let draw = self.rng.random_range(1..=table.total_weight);
        trace!(table = %table.name, draw, "select_row");
        table
            .row_for_draw(draw)
            .ok_or_else(|| TableError::RowIndexOutOfBounds {
                table: table.name.clone(),
                index: draw,
                total_weight: table.total_weight,
            })
    }

    /// Roll once on a row table and format the result.
    ///
    /// The result is `name`, `name (subitem)`, `name (quantity)` or
    /// `name (subitem, quantity)`. A quantity of exactly `1` is left out.
    pub fn resolve_row_result(&mut self, table: &RowTable) -> TableResult<String> {
        let row = self.select_row(table)?;

        if let Some(target) = &row.table {
            debug!(table = %table.name, target = %target, "row delegates");
            return self.resolve_joined(target);
        }

        let name = row.name.as_deref().unwrap_or_default();

        let subitem = match &row.subtable {
            Some(subtable) => {
                debug!(subtable = %subtable, "roll on subtable");
                Some(self.resolve_joined(subtable)?)
            }
            None => None,
        };

        let quantity = row.quantity.as_deref().and_then(|expr| {
            let value = roll_quantity(expr, &mut self.rng);
            let value = match &row.units {
                Some(units) => format!("{value} {units}"),
                None => value,
            };
            (value != "1").then_some(value)
        });

        Ok(match (subitem, quantity) {
            (Some(sub), Some(qty)) => format!("{name} ({sub}, {qty})"),
            (Some(sub), None) => format!("{name} ({sub})"),
            (None, Some(qty)) => format!("{name} ({qty})"),
            (None, None) => name.to_string(),
        })
    }

    /// Make one pass over a column table.
    ///
    /// Each column fires independently with its own chance. A column without
    /// a table reference yields `"<quantity> <name>"`; one with a table
    /// reference rolls on that table `quantity` times.
    pub fn resolve_columns_result(&mut self, table: &ColumnTable) -> TableResult<Vec<String>> {
        trace!(table = %table.name, "resolve_columns_result");
        let mut values = Vec::new();

        for (index, column) in table.columns.iter().enumerate() {
            let target = match (&column.table, &column.name) {
                (Some(target), _) => Ok(target),
                (None, Some(name)) => Err(name),
                (None, None) => {
                    return Err(TableError::InvalidColumn {
                        table: table.name.clone(),
                        index,
                    });
                }
            };

            let roll = self.rng.random_range(1..=100u32);
            if roll > column.chance {
                debug!(table = %table.name, index, roll, chance = column.chance, "skip column");
                continue;
            }

            let quantity = roll_quantity(&column.quantity, &mut self.rng);
            match target {
                Ok(target) => {
                    let repeats = repeat_count(&table.name, &quantity)?;
                    if repeats > 0 {
                        debug!(target = %target, repeats, "rolling on table");
                        self.resolve_into(target, repeats, &mut values)?;
                    }
                }
                Err(name) => values.push(format!("{quantity} {name}")),
            }
        }

        Ok(values)
    }

    /// Resolve `name` once and collapse the result into one string.
    fn resolve_joined(&mut self, name: &str) -> TableResult<String> {
        self.nested(name, |g, table| match table {
            Table::Rows(t) => g.resolve_row_result(t),
            Table::Columns(t) => Ok(g.resolve_columns_result(t)?.join(", ")),
        })
    }

    /// Resolve `name` `times` times, appending every produced string to `out`.
    fn resolve_into(&mut self, name: &str, times: usize, out: &mut Vec<String>) -> TableResult<()> {
        self.nested(name, |g, table| {
            for _ in 0..times {
                match table {
                    Table::Rows(t) => out.push(g.resolve_row_result(t)?),
                    Table::Columns(t) => out.extend(g.resolve_columns_result(t)?),
                }
            }
            Ok(())
        })
    }

    /// Load `name` and run `f` on it one level deeper.
    fn nested<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Self, &Table) -> TableResult<T>,
    ) -> TableResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(TableError::CyclicReference {
                table: name.to_string(),
                depth: self.depth,
            });
        }
        let table = self.store.load(name)?;
        self.depth += 1;
        let result = f(self, &table);
        self.depth -= 1;
        result
    }
}

/// Interpret an evaluated quantity as a number of rolls.
///
/// Negative values roll zero times.
fn repeat_count(table: &str, quantity: &str) -> TableResult<usize> {
    let n: i64 = quantity
        .trim()
        .parse()
        .map_err(|_| TableError::InvalidQuantity {
            table: table.to_string(),
            value: quantity.to_string(),
        })?;
    Ok(usize::try_from(n).unwrap_or(0))
}
