//! Conversion of plain text and tab-separated lists into table definitions.
//!
//! Three input styles are understood:
//!
//! - [`InputStyle::Text`]: every non-blank line is a row name.
//! - [`InputStyle::Tabbed`]: up to four tab-separated fields per line,
//!   `name`, `weight`, `quantity` and `subtable`, in that order.
//! - [`InputStyle::Headed`]: the first line names the columns; `name` is
//!   required, `weight`, `min`/`max`, `quantity` and `subtable` are optional.
//!
//! The resulting [`TableDef`] always satisfies the weight invariant, so it
//! can be written out and loaded back unchanged.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{TableError, TableResult};
use crate::table::{Format, Quantity, RowDef, TableDef};

/// Input extensions replaced by the output extension.
const INPUT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// How the input lines are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputStyle {
    /// One row name per line.
    #[default]
    Text,
    /// Positional tab-separated fields.
    Tabbed,
    /// Tab-separated fields named by a header line.
    Headed,
}

/// Settings for one conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Display name of the produced table.
    pub name: String,
    /// Input layout.
    pub style: InputStyle,
    /// Keep explicit weights of 1 on every row.
    pub weights: bool,
}

/// Convert `text` into a row table definition.
pub fn convert(text: &str, options: &ConvertOptions) -> TableResult<TableDef> {
    trace!(style = ?options.style, weights = options.weights, "convert");
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let numbered: Vec<(usize, RowDef)> = match options.style {
        InputStyle::Text => lines
            .map(|(number, line)| {
                let row = RowDef {
                    name: Some(line.trim().to_string()),
                    ..RowDef::default()
                };
                (number, row)
            })
            .collect(),
        InputStyle::Tabbed => lines
            .map(|(number, line)| Ok((number, tabbed_row(number, line)?)))
            .collect::<TableResult<_>>()?,
        InputStyle::Headed => {
            let Some((number, header)) = lines.next() else {
                return Err(TableError::Convert {
                    line: 1,
                    reason: "missing header line".to_string(),
                });
            };
            let header = Header::parse(number, header)?;
            lines
                .map(|(number, line)| Ok((number, header.row(number, line)?)))
                .collect::<TableResult<_>>()?
        }
    };

    if numbered.is_empty() {
        return Err(TableError::Convert {
            line: 1,
            reason: "no rows".to_string(),
        });
    }

    let mut total_weight: u32 = 0;
    for (number, row) in &numbered {
        let line = *number;
        let weight = match row.weight {
            None => 1,
            Some(w) => u32::try_from(w).map_err(|_| TableError::Convert {
                line,
                reason: format!("invalid weight `{w}`"),
            })?,
        };
        total_weight = total_weight
            .checked_add(weight)
            .ok_or_else(|| TableError::Convert {
                line,
                reason: "total weight too large".to_string(),
            })?;
    }

    let mut rows: Vec<RowDef> = numbered.into_iter().map(|(_, row)| row).collect();
    for row in &mut rows {
        clean_up(row, options.weights);
    }
    debug!(rows = rows.len(), total_weight, "converted");

    Ok(TableDef {
        name: Some(options.name.clone()),
        total_weight: Some(i64::from(total_weight)),
        rows: Some(rows),
        columns: None,
    })
}

/// Where the converted table for `input` is written.
///
/// A `.csv`, `.tsv` or `.txt` extension is replaced, anything else gets the
/// output extension appended. With `out_dir` the file name is kept and the
/// directory replaced.
pub fn output_path(input: &Path, format: Format, out_dir: Option<&Path>) -> PathBuf {
    let ext = match format {
        Format::Json => "json",
        Format::Yaml => "yml",
    };
    let mut path = match (out_dir, input.file_name()) {
        (Some(dir), Some(file)) => dir.join(file),
        _ => input.to_path_buf(),
    };
    let replace = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| INPUT_EXTENSIONS.contains(&e));
    if replace {
        path.set_extension(ext);
    } else {
        let mut name = path.into_os_string();
        name.push(".");
        name.push(ext);
        path = PathBuf::from(name);
    }
    path
}

fn clean_up(row: &mut RowDef, weights: bool) {
    if row.quantity.as_ref().is_some_and(|q| q.0 == "1") {
        row.quantity = None;
    }
    if weights {
        row.weight.get_or_insert(1);
    } else if row.weight == Some(1) {
        row.weight = None;
    }
}

fn tabbed_row(line: usize, text: &str) -> TableResult<RowDef> {
    let fields: Vec<&str> = text.split('\t').map(str::trim).collect();
    if fields.len() > 4 {
        return Err(TableError::Convert {
            line,
            reason: format!("{} fields, at most 4 allowed", fields.len()),
        });
    }
    Ok(RowDef {
        name: Some(fields[0].to_string()),
        weight: fields
            .get(1)
            .map(|w| parse_weight(line, w).map(i64::from))
            .transpose()?,
        quantity: fields.get(2).copied().and_then(non_empty).map(Quantity::from),
        subtable: fields.get(3).copied().and_then(non_empty).map(str::to_string),
        ..RowDef::default()
    })
}

fn parse_weight(line: usize, text: &str) -> TableResult<u32> {
    match text.parse::<u32>() {
        Ok(w) if w > 0 => Ok(w),
        _ => Err(TableError::Convert {
            line,
            reason: format!("invalid weight `{text}`"),
        }),
    }
}

fn non_empty(text: &str) -> Option<&str> {
    (!text.is_empty()).then_some(text)
}

/// Field positions named by a header line.
#[derive(Debug)]
struct Header {
    name: usize,
    weight: Option<usize>,
    range: Option<(usize, usize)>,
    quantity: Option<usize>,
    subtable: Option<usize>,
}

impl Header {
    fn parse(line: usize, text: &str) -> TableResult<Self> {
        let fields: Vec<String> = text.split('\t').map(|f| f.trim().to_lowercase()).collect();
        let position = |key: &str| fields.iter().position(|f| f == key);

        let name = position("name").ok_or_else(|| TableError::Convert {
            line,
            reason: "header has no `name` field".to_string(),
        })?;
        let header = Self {
            name,
            weight: position("weight"),
            range: position("min").zip(position("max")),
            quantity: position("quantity"),
            subtable: position("subtable"),
        };
        debug!(?header, "parsed header");
        Ok(header)
    }

    fn row(&self, line: usize, text: &str) -> TableResult<RowDef> {
        let fields: Vec<&str> = text.split('\t').map(str::trim).collect();
        let field = |index: usize| {
            fields.get(index).copied().ok_or_else(|| TableError::Convert {
                line,
                reason: format!("missing field {}", index + 1),
            })
        };
        let optional = |index: Option<usize>| index.and_then(|i| fields.get(i).copied()).and_then(non_empty);

        let weight = match (self.weight, self.range) {
            (Some(w), _) => Some(parse_weight(line, field(w)?)?),
            (None, Some((min, max))) => {
                let low = parse_bound(line, field(min)?)?;
                let high = parse_bound(line, field(max)?)?;
                if high < low {
                    return Err(TableError::Convert {
                        line,
                        reason: format!("range {low}-{high} is empty"),
                    });
                }
                let width = high
                    .checked_sub(low)
                    .and_then(|d| d.checked_add(1))
                    .and_then(|w| u32::try_from(w).ok())
                    .ok_or_else(|| TableError::Convert {
                        line,
                        reason: format!("range {low}-{high} is too wide"),
                    })?;
                Some(width)
            }
            (None, None) => None,
        };

        Ok(RowDef {
            name: Some(field(self.name)?.to_string()),
            weight: weight.map(i64::from),
            quantity: optional(self.quantity).map(Quantity::from),
            subtable: optional(self.subtable).map(str::to_string),
            ..RowDef::default()
        })
    }
}

fn parse_bound(line: usize, text: &str) -> TableResult<i64> {
    text.parse().map_err(|_| TableError::Convert {
        line,
        reason: format!("invalid range bound `{text}`"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    fn options(style: InputStyle, weights: bool) -> ConvertOptions {
        ConvertOptions {
            name: "Converted".to_string(),
            style,
            weights,
        }
    }

    fn row(name: &str) -> RowDef {
        RowDef {
            name: Some(name.to_string()),
            ..RowDef::default()
        }
    }

    #[test]
    fn plain_text_lines() {
        let def = convert("apple\n\nbanana\n  cherry  \n", &options(InputStyle::Text, false)).unwrap();
        assert_eq!(def.name.as_deref(), Some("Converted"));
        assert_eq!(def.total_weight, Some(3));
        assert_eq!(def.rows.unwrap(), [row("apple"), row("banana"), row("cherry")]);
    }

    #[test]
    fn plain_text_with_weights() {
        let def = convert("apple\nbanana\n", &options(InputStyle::Text, true)).unwrap();
        assert!(def.rows.unwrap().iter().all(|r| r.weight == Some(1)));
    }

    #[test]
    fn tabbed_fields() {
        let text = "dagger\nsword\t3\narrows\t2\t2d10\nbag\t1\t1\tbag-contents\n";
        let def = convert(text, &options(InputStyle::Tabbed, false)).unwrap();
        assert_eq!(def.total_weight, Some(7));
        let rows = def.rows.unwrap();
        assert_eq!(rows[0], row("dagger"));
        assert_eq!(rows[1].weight, Some(3));
        assert_eq!(rows[2].quantity, Some(Quantity::from("2d10")));
        assert_eq!(rows[3].weight, None);
        assert_eq!(rows[3].quantity, None);
        assert_eq!(rows[3].subtable.as_deref(), Some("bag-contents"));
    }

    #[test]
    fn too_many_fields() {
        let err = convert("a\nb\t1\t1\tc\td\n", &options(InputStyle::Tabbed, false)).unwrap_err();
        assert!(matches!(err, TableError::Convert { line: 2, .. }));
        assert_eq!(err.to_string(), "line 2: 5 fields, at most 4 allowed");
    }

    #[test]
    fn bad_weight() {
        let err = convert("a\tmany\n", &options(InputStyle::Tabbed, false)).unwrap_err();
        assert_eq!(err.to_string(), "line 1: invalid weight `many`");
        assert!(convert("a\t0\n", &options(InputStyle::Tabbed, false)).is_err());
    }

    #[test]
    fn weights_must_fit_in_u32() {
        let err = convert("a\t5000000000\n", &options(InputStyle::Tabbed, false)).unwrap_err();
        assert_eq!(err.to_string(), "line 1: invalid weight `5000000000`");
        let err = convert("a\t-3\n", &options(InputStyle::Tabbed, false)).unwrap_err();
        assert_eq!(err.to_string(), "line 1: invalid weight `-3`");
    }

    #[test]
    fn total_weight_overflow() {
        let text = "a\t4294967295\nb\t1\n";
        let err = convert(text, &options(InputStyle::Tabbed, false)).unwrap_err();
        assert_eq!(err.to_string(), "line 2: total weight too large");

        let err = convert("a\t9223372036854775807\nb\t1\n", &options(InputStyle::Tabbed, false))
            .unwrap_err();
        assert!(matches!(err, TableError::Convert { line: 1, .. }));
    }

    #[test]
    fn empty_input_has_no_rows() {
        for style in [InputStyle::Text, InputStyle::Tabbed] {
            let err = convert("\n  \n\n", &options(style, false)).unwrap_err();
            assert_eq!(err.to_string(), "line 1: no rows");
            assert!(convert("", &options(style, false)).is_err());
        }
        let err = convert("name\tweight\n\n", &options(InputStyle::Headed, false)).unwrap_err();
        assert_eq!(err.to_string(), "line 1: no rows");
    }

    #[test]
    fn headed_min_max() {
        let text = "Min\tMax\tName\n1\t3\tgoblins\n4\t4\torc\n5\t10\tnothing\n";
        let def = convert(text, &options(InputStyle::Headed, false)).unwrap();
        assert_eq!(def.total_weight, Some(10));
        let rows = def.rows.unwrap();
        assert_eq!(rows[0].weight, Some(3));
        assert_eq!(rows[1], row("orc"));
        assert_eq!(rows[2].weight, Some(6));
    }

    #[test]
    fn headed_reversed_range() {
        let err = convert("min\tmax\tname\n5\t2\tx\n", &options(InputStyle::Headed, false)).unwrap_err();
        assert_eq!(err.to_string(), "line 2: range 5-2 is empty");
    }

    #[test]
    fn headed_extreme_ranges() {
        let text = "min\tmax\tname\n-9223372036854775808\t9223372036854775807\tall\n";
        let err = convert(text, &options(InputStyle::Headed, false)).unwrap_err();
        assert!(err.to_string().ends_with("is too wide"));

        let text = "min\tmax\tname\n1\t4294967296\tall\n";
        assert!(convert(text, &options(InputStyle::Headed, false)).is_err());

        let def = convert("min\tmax\tname\n-2\t2\tnear\n", &options(InputStyle::Headed, false)).unwrap();
        assert_eq!(def.total_weight, Some(5));
    }

    #[test]
    fn headed_optional_fields() {
        let text = "weight\tname\tsubtable\tquantity\n2\tgems\tgem-types\t1d4\n1\tcoin\t\t\n";
        let def = convert(text, &options(InputStyle::Headed, false)).unwrap();
        let rows = def.rows.unwrap();
        assert_eq!(rows[0].subtable.as_deref(), Some("gem-types"));
        assert_eq!(rows[0].quantity, Some(Quantity::from("1d4")));
        assert_eq!(rows[1], row("coin"));
    }

    #[test]
    fn header_needs_a_name() {
        let err = convert("weight\tlabel\n1\ta\n", &options(InputStyle::Headed, false)).unwrap_err();
        assert_eq!(err.to_string(), "line 1: header has no `name` field");
        assert!(convert("", &options(InputStyle::Headed, false)).is_err());
    }

    #[test]
    fn short_headed_line() {
        let err = convert("weight\tname\n3\n", &options(InputStyle::Headed, false)).unwrap_err();
        assert_eq!(err.to_string(), "line 2: missing field 2");
    }

    #[test]
    fn converted_tables_load() {
        let text = "a\t5\nb\nc\t2\t3d6\n";
        let def = convert(text, &options(InputStyle::Tabbed, false)).unwrap();
        for format in [Format::Json, Format::Yaml] {
            let written = format.write(&def).unwrap();
            let table = format.parse(&written, "converted").unwrap().into_table().unwrap();
            let Table::Rows(table) = table else {
                panic!("expected a row table");
            };
            assert_eq!(table.total_weight, 8);
        }
    }

    #[test]
    fn output_paths() {
        assert_eq!(
            output_path(Path::new("lists/gems.txt"), Format::Json, None),
            Path::new("lists/gems.json")
        );
        assert_eq!(
            output_path(Path::new("lists/gems.csv"), Format::Yaml, None),
            Path::new("lists/gems.yml")
        );
        assert_eq!(
            output_path(Path::new("lists/gems"), Format::Json, None),
            Path::new("lists/gems.json")
        );
        assert_eq!(
            output_path(Path::new("lists/gems.tsv"), Format::Json, Some(Path::new("out"))),
            Path::new("out/gems.json")
        );
        assert_eq!(
            output_path(Path::new("gems.list"), Format::Json, None),
            Path::new("gems.list.json")
        );
    }
}
