//! SCP key extraction.
//!
//! Symbol and equation cells embed an SCP signal address of the form
//! `<compound>:<block>.<point>` inside free text such as `(A+B)PLANT1:BLK2 + X`.
//! [`strip`] cuts the address out of the surrounding expression and
//! [`extract_keys`] writes it to the `MISC5` column of every row that talks to
//! a selected SCP engine.

use crate::error::XrefError;
use crate::table::{Table, XrefColumns, KEY_COLUMN};
use std::fmt;

/// Characters that end an address token inside an expression
pub const BOUNDARY_CHARS: [char; 9] = ['(', ')', ' ', '+', '-', '*', '/', '^', '\''];

fn is_boundary(c: char) -> bool {
    BOUNDARY_CHARS.contains(&c)
}

/// An SCP address cut out of an expression
///
/// # Examples
///
/// - `PLANT1:BLK2.PT3` - compound `PLANT1`, block/point `:BLK2.PT3`
/// - `ABC(PLANT1:BLK2 EXTRA` - compound `PLANT1`, block/point `:BLK2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScpAddress {
    /// Text left of the first `:`, back to the nearest boundary character
    pub compound: String,
    /// Text from the first `:` (inclusive) up to the next boundary character
    pub block_param: String,
}

impl ScpAddress {
    /// Locate the address in `text`. Only the first `:` is significant.
    ///
    /// Returns `None` when `text` has no `:`.
    pub fn parse(text: &str) -> Option<Self> {
        let colon = text.find(':')?;
        let (left, right) = text.split_at(colon);

        // boundary characters are all ASCII, so +1 lands on a char boundary
        let compound = match left.rfind(is_boundary) {
            Some(index) => &left[index + 1..],
            None => left,
        };

        let block_param = match right.find(is_boundary) {
            Some(index) => &right[..index],
            None => right,
        };

        Some(Self {
            compound: compound.to_string(),
            block_param: block_param.to_string(),
        })
    }
}

impl fmt::Display for ScpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.compound, self.block_param)
    }
}

/// Derive the `compound:block.point` key from an address expression.
///
/// Total: any input without a `:` yields `""`.
pub fn strip(address: &str) -> String {
    ScpAddress::parse(address)
        .map(|scp| scp.to_string())
        .unwrap_or_default()
}

/// Output of [`extract_keys`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedTable {
    /// Input table with missing cells as `""` and `MISC5` filled in
    pub table: Table,
    /// Number of (row, selected engine) matches
    pub key_count: usize,
}

/// Fill `MISC5` with the SCP key of each row that references a selected engine.
///
/// For every row, each selected engine is tried in order. A row whose
/// `TO ENGINE` is the engine takes its key from `TO SYMBOL`; otherwise a row
/// whose `FROM ENGINE` is the engine takes it from `FROM SYMBOL` followed by
/// `EQUATION`. Every match adds one to `key_count`, and when several engines
/// match the same row the last one's key is kept. Unmatched rows get `""`.
///
/// The input table is not modified.
///
/// # Errors
///
/// `MissingColumn` if any of the engine, symbol or equation columns is absent.
pub fn extract_keys<S: AsRef<str>>(
    table: &Table,
    engines: &[S],
) -> Result<KeyedTable, XrefError> {
    let columns = XrefColumns::resolve(table)?;
    let mut table = table.normalized();

    let mut key_count = 0;
    let keys: Vec<String> = table
        .rows()
        .iter()
        .map(|row| {
            let value = |index: usize| row[index].as_deref().unwrap_or_default();
            let mut key = String::new();

            for engine in engines {
                let engine = engine.as_ref();
                if value(columns.to_engine) == engine {
                    key = strip(value(columns.to_symbol));
                    key_count += 1;
                } else if value(columns.from_engine) == engine {
                    let address = format!(
                        "{}{}",
                        value(columns.from_symbol),
                        value(columns.equation)
                    );
                    key = strip(&address);
                    key_count += 1;
                }
            }

            key
        })
        .collect();

    table.set_column(KEY_COLUMN, keys);

    tracing::debug!(
        "Generated {} keys over {} rows for {} engines",
        key_count,
        table.len(),
        engines.len()
    );

    Ok(KeyedTable { table, key_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::{cells, header};

    #[test]
    fn test_strip_plain_address() {
        assert_eq!(strip("PLANT1:BLK2.PT3"), "PLANT1:BLK2.PT3");
    }

    #[test]
    fn test_strip_embedded_address() {
        assert_eq!(strip("ABC(PLANT1:BLK2 EXTRA"), "PLANT1:BLK2");
        assert_eq!(strip("(A+B)PLANT1:BLK2 + X"), "PLANT1:BLK2");
        assert_eq!(strip("'C1:B1.PV'*2"), "C1:B1.PV");
        assert_eq!(strip("X^C2:B2.OUT/100"), "C2:B2.OUT");
    }

    #[test]
    fn test_strip_parts() {
        let scp = ScpAddress::parse("ABC(PLANT1:BLK2 EXTRA").unwrap();
        assert_eq!(scp.compound, "PLANT1");
        assert_eq!(scp.block_param, ":BLK2");
    }

    #[test]
    fn test_strip_without_colon() {
        assert_eq!(strip("NOCOLONHERE"), "");
        assert_eq!(strip(""), "");
        assert_eq!(strip("(+ - * /)"), "");
        assert!(ScpAddress::parse("NOCOLONHERE").is_none());
    }

    #[test]
    fn test_strip_colon_at_edges() {
        assert_eq!(strip(":BLK2.PT3"), ":BLK2.PT3");
        assert_eq!(strip("PLANT1:"), "PLANT1:");
        assert_eq!(strip(":"), ":");
        assert_eq!(strip("(:)"), ":");
    }

    #[test]
    fn test_strip_multiple_colons() {
        assert_eq!(strip("A:B:C.D"), "A:B:C.D");
        assert_eq!(strip("X+A:B C:D"), "A:B");
    }

    #[test]
    fn test_strip_non_ascii_text() {
        assert_eq!(strip("Température(P1:B1.PV)"), "P1:B1.PV");
        assert_eq!(strip("ÄÖ:ü"), "ÄÖ:ü");
    }

    fn xref() -> Table {
        Table::with_rows(
            header(&["#TYPE", "TO ENGINE", "TO SYMBOL", "FROM ENGINE", "FROM SYMBOL", "EQUATION"]),
            vec![
                cells(&["AI", "SCP1", "X+P1:B1.PV", "DCS", "TAG1", ""]),
                cells(&["AO", "DCS", "TAG2", "SCP2", "P2:B2", ".OUT*2"]),
                cells(&["AI", "SCP1", "P3:B3.PV", "SCP2", "P4:", "B4.OUT"]),
                cells(&["AI", "DCS", "TAG4", "", "", ""]),
            ],
        )
    }

    #[test]
    fn test_extract_keys_no_selection() {
        let keyed = extract_keys::<&str>(&xref(), &[]).unwrap();

        assert_eq!(keyed.key_count, 0);
        let misc5 = keyed.table.require_column(KEY_COLUMN).unwrap();
        for row in keyed.table.rows() {
            assert_eq!(row[misc5].as_deref(), Some(""));
        }
    }

    #[test]
    fn test_extract_keys_single_match_per_row() {
        let keyed = extract_keys(&xref(), &["SCP1"]).unwrap();
        let misc5 = keyed.table.require_column(KEY_COLUMN).unwrap();

        assert_eq!(keyed.key_count, 2);
        assert_eq!(keyed.table.cell(0, misc5), Some("P1:B1.PV"));
        assert_eq!(keyed.table.cell(1, misc5), Some(""));
        assert_eq!(keyed.table.cell(2, misc5), Some("P3:B3.PV"));
        assert_eq!(keyed.table.cell(3, misc5), Some(""));
    }

    #[test]
    fn test_extract_keys_from_side_joins_symbol_and_equation() {
        let keyed = extract_keys(&xref(), &["SCP2"]).unwrap();
        let misc5 = keyed.table.require_column(KEY_COLUMN).unwrap();

        assert_eq!(keyed.key_count, 2);
        assert_eq!(keyed.table.cell(1, misc5), Some("P2:B2.OUT"));
        assert_eq!(keyed.table.cell(2, misc5), Some("P4:B4.OUT"));
    }

    #[test]
    fn test_extract_keys_two_matches_counts_both_keeps_last() {
        let keyed = extract_keys(&xref(), &["SCP1", "SCP2"]).unwrap();
        let misc5 = keyed.table.require_column(KEY_COLUMN).unwrap();

        // row 2 matches both engines
        assert_eq!(keyed.key_count, 4);
        assert_eq!(keyed.table.cell(2, misc5), Some("P4:B4.OUT"));

        let reversed = extract_keys(&xref(), &["SCP2", "SCP1"]).unwrap();
        assert_eq!(reversed.key_count, 4);
        assert_eq!(reversed.table.cell(2, misc5), Some("P3:B3.PV"));
    }

    #[test]
    fn test_extract_keys_match_without_address_still_counts() {
        let table = Table::with_rows(
            header(&["#TYPE", "TO ENGINE", "TO SYMBOL", "FROM ENGINE", "FROM SYMBOL", "EQUATION"]),
            vec![
                cells(&["AI", "SCP", "NOKEY", "", "", ""]),
                cells(&["AO", "", "", "SCP", "", ""]),
            ],
        );
        let keyed = extract_keys(&table, &["SCP"]).unwrap();
        let misc5 = keyed.table.require_column(KEY_COLUMN).unwrap();

        assert_eq!(keyed.key_count, 2);
        assert_eq!(keyed.table.cell(0, misc5), Some(""));
        assert_eq!(keyed.table.cell(1, misc5), Some(""));
    }

    #[test]
    fn test_extract_keys_to_side_wins_for_same_engine() {
        let table = Table::with_rows(
            header(&["TO ENGINE", "TO SYMBOL", "FROM ENGINE", "FROM SYMBOL", "EQUATION"]),
            vec![cells(&["SCP1", "A:B", "SCP1", "C:D", ""])],
        );
        let keyed = extract_keys(&table, &["SCP1"]).unwrap();

        assert_eq!(keyed.key_count, 1);
        assert_eq!(keyed.table.cell(0, 5), Some("A:B"));
    }

    #[test]
    fn test_extract_keys_overwrites_existing_misc5() {
        let table = Table::with_rows(
            header(&["TO ENGINE", "TO SYMBOL", "FROM ENGINE", "FROM SYMBOL", "EQUATION", "MISC5"]),
            vec![
                cells(&["SCP1", "A:B", "", "", "", "old"]),
                cells(&["DCS", "T", "", "", "", "old"]),
            ],
        );
        let keyed = extract_keys(&table, &["SCP1"]).unwrap();

        assert_eq!(keyed.table.columns().len(), 6);
        assert_eq!(keyed.table.cell(0, 5), Some("A:B"));
        assert_eq!(keyed.table.cell(1, 5), Some(""));
    }

    #[test]
    fn test_extract_keys_is_repeatable_and_leaves_input_alone() {
        let table = xref();
        let first = extract_keys(&table, &["SCP1", "SCP2"]).unwrap();
        let second = extract_keys(&table, &["SCP1", "SCP2"]).unwrap();

        assert_eq!(first, second);
        assert_eq!(table, xref());
        assert!(table.column_index(KEY_COLUMN).is_none());
    }

    #[test]
    fn test_extract_keys_missing_column() {
        let table = Table::new(header(&["TO ENGINE", "FROM ENGINE"]));
        assert!(matches!(
            extract_keys(&table, &["SCP1"]),
            Err(XrefError::MissingColumn { .. })
        ));
    }
}
