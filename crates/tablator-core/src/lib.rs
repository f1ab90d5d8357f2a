//! Weighted random tables that roll on each other.
//!
//! Tables are defined one per file (JSON or YAML) in a data directory. A
//! *row table* is rolled by one weighted draw; a *column table* gives every
//! column an independent percentage chance. Rows and columns may refer to
//! other tables, and quantities may be written in dice notation (`3d6x10`).
//!
//! ```no_run
//! use tablator_core::{Generator, TableStore};
//!
//! # fn main() -> tablator_core::TableResult<()> {
//! let store = TableStore::open("/usr/share/tablator")?;
//! let mut generator = Generator::new(store);
//! for result in generator.generate("treasure", 3)? {
//!     println!("{result}");
//! }
//! # Ok(())
//! # }
//! ```

/// Text and tab-separated lists to table definitions.
pub mod convert;
/// Dice notation parsing and rolling.
pub mod dice;
/// Table resolution.
pub mod engine;
/// Error types used throughout the crate.
pub mod error;
/// Plain-text rendering.
pub mod render;
/// Data directory access and the table cache.
pub mod store;
/// Table definitions and the validated table model.
pub mod table;

pub use convert::{ConvertOptions, InputStyle, convert, output_path};
pub use dice::{DiceExpr, roll_quantity};
pub use engine::{Generator, MAX_DEPTH};
pub use error::{TableError, TableResult};
pub use render::render;
pub use store::TableStore;
pub use table::{Column, ColumnTable, Format, Row, RowTable, Table, TableDef};
