//! Tabular data model for cross reference files.
//!
//! A [`Table`] is an ordered header plus rows of optional string cells. A
//! missing cell (`None`) stands in for the "no value" marker of the source
//! file; [`Table::normalized`] turns every missing cell into an empty string
//! before any string work is done on it.

use crate::error::XrefError;
use indexmap::IndexMap;
use serde::Serialize;

/// Column holding the row type; its sentinel row starts the digital section
pub const TYPE_COLUMN: &str = "#TYPE";
pub const TO_ENGINE: &str = "TO ENGINE";
pub const FROM_ENGINE: &str = "FROM ENGINE";
pub const TO_SYMBOL: &str = "TO SYMBOL";
pub const FROM_SYMBOL: &str = "FROM SYMBOL";
pub const EQUATION: &str = "EQUATION";
/// Output column filled with the derived SCP key
pub const KEY_COLUMN: &str = "MISC5";

/// A single cell; `None` when the source had no value
pub type Cell = Option<String>;

/// One preview row, keyed by column name in header order
pub type Record = IndexMap<String, String>;

/// Ordered header plus rows. Every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given header
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table from a header and rows; rows are resized to the header width
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Append a row, padding with missing cells (or truncating) to the header width
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with this exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`Table::column_index`] but fails with `MissingColumn`
    pub fn require_column(&self, name: &str) -> Result<usize, XrefError> {
        self.column_index(name)
            .ok_or_else(|| XrefError::missing_column(name))
    }

    /// Cell value at (row, column), `None` if missing or out of range
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    /// All values of a named column, in row order
    pub fn column_values<'a>(
        &'a self,
        name: &str,
    ) -> Result<impl Iterator<Item = Option<&'a str>> + 'a, XrefError> {
        let index = self.require_column(name)?;
        Ok(self.rows.iter().map(move |row| row[index].as_deref()))
    }

    /// Copy of the table with every missing cell replaced by `""`
    pub fn normalized(&self) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| Some(cell.clone().unwrap_or_default()))
                    .collect()
            })
            .collect();

        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Overwrite the named column, or append it if absent.
    ///
    /// `values` must hold one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());

        let index = match self.column_index(name) {
            Some(index) => index,
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(None);
                }
                self.columns.len() - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            row[index] = Some(value);
        }
    }

    /// First `limit` rows restricted to `columns`, missing cells as `""`
    pub fn preview<S: AsRef<str>>(
        &self,
        columns: &[S],
        limit: usize,
    ) -> Result<Vec<Record>, XrefError> {
        let indices = columns
            .iter()
            .map(|name| Ok((name.as_ref(), self.require_column(name.as_ref())?)))
            .collect::<Result<Vec<_>, XrefError>>()?;

        Ok(self
            .rows
            .iter()
            .take(limit)
            .map(|row| {
                indices
                    .iter()
                    .map(|(name, index)| {
                        (name.to_string(), row[*index].clone().unwrap_or_default())
                    })
                    .collect()
            })
            .collect())
    }

    /// Clone of rows `[start, end)`
    pub(crate) fn slice_rows(&self, start: usize, end: usize) -> Vec<Vec<Cell>> {
        self.rows[start..end].to_vec()
    }
}

/// Positions of the columns key extraction reads, resolved once per call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XrefColumns {
    pub to_engine: usize,
    pub from_engine: usize,
    pub to_symbol: usize,
    pub from_symbol: usize,
    pub equation: usize,
}

impl XrefColumns {
    pub fn resolve(table: &Table) -> Result<Self, XrefError> {
        Ok(Self {
            to_engine: table.require_column(TO_ENGINE)?,
            from_engine: table.require_column(FROM_ENGINE)?,
            to_symbol: table.require_column(TO_SYMBOL)?,
            from_symbol: table.require_column(FROM_SYMBOL)?,
            equation: table.require_column(EQUATION)?,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn cells(values: &[&str]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect()
    }

    pub(crate) fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_push_row_pads_to_header_width() {
        let mut table = Table::new(header(&["A", "B", "C"]));
        table.push_row(cells(&["1"]));

        assert_eq!(table.rows()[0], vec![Some("1".to_string()), None, None]);
        assert_eq!(table.cell(0, 0), Some("1"));
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.cell(5, 0), None);
    }

    #[test]
    fn test_require_column_reports_name() {
        let table = Table::new(header(&["A"]));
        let err = table.require_column("TO ENGINE").unwrap_err();
        assert!(matches!(err, XrefError::MissingColumn { column } if column == "TO ENGINE"));
    }

    #[test]
    fn test_normalized_fills_missing_cells() {
        let table = Table::with_rows(header(&["A", "B"]), vec![cells(&["x", ""])]);
        let normalized = table.normalized();

        assert_eq!(
            normalized.rows()[0],
            vec![Some("x".to_string()), Some(String::new())]
        );
        // original untouched
        assert_eq!(table.rows()[0][1], None);
    }

    #[test]
    fn test_set_column_appends_then_overwrites() {
        let mut table = Table::with_rows(header(&["A"]), vec![cells(&["1"]), cells(&["2"])]);

        table.set_column(KEY_COLUMN, vec!["k1".to_string(), String::new()]);
        assert_eq!(table.columns(), &["A".to_string(), "MISC5".to_string()]);
        assert_eq!(table.cell(0, 1), Some("k1"));

        table.set_column(KEY_COLUMN, vec!["k2".to_string(), "k3".to_string()]);
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.cell(0, 1), Some("k2"));
        assert_eq!(table.cell(1, 1), Some("k3"));
    }

    #[test]
    fn test_preview_selects_columns_and_limits_rows() {
        let rows = (0..8).map(|i| cells(&[&i.to_string(), "x", ""])).collect();
        let table = Table::with_rows(header(&["N", "X", "Y"]), rows);

        let preview = table.preview(&["Y", "N"], 5).unwrap();
        assert_eq!(preview.len(), 5);
        let keys: Vec<&String> = preview[0].keys().collect();
        assert_eq!(keys, vec!["Y", "N"]);
        assert_eq!(preview[4]["N"], "4");
        assert_eq!(preview[4]["Y"], "");

        assert!(table.preview(&["MISSING"], 5).is_err());
    }

    #[test]
    fn test_xref_columns_resolve() {
        let table = Table::new(header(&[
            "#TYPE",
            "FROM ENGINE",
            "FROM SYMBOL",
            "EQUATION",
            "TO ENGINE",
            "TO SYMBOL",
        ]));
        let columns = XrefColumns::resolve(&table).unwrap();
        assert_eq!(columns.from_engine, 1);
        assert_eq!(columns.to_symbol, 5);

        let partial = Table::new(header(&["TO ENGINE", "FROM ENGINE"]));
        assert!(matches!(
            XrefColumns::resolve(&partial),
            Err(XrefError::MissingColumn { column }) if column == "TO SYMBOL"
        ));
    }
}
