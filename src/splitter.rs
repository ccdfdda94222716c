//! Partition a cross reference into its analog and digital sections.
//!
//! The digital section starts at the first row whose `#TYPE` cell is the
//! literal `#TYPE`. That row carries the digital column names and becomes
//! the digital section's header.

use crate::error::XrefError;
use crate::table::{Table, TYPE_COLUMN};

/// Split a cross reference into `(analog, digital)` sections.
///
/// Rows before the sentinel keep the original header. The sentinel row's
/// values (missing cells as `""`) become the digital header and the rows
/// after it, in order, its data. When several sentinel rows exist the first
/// one wins and the rest stay digital data rows.
///
/// # Errors
///
/// * `MissingColumn` if the table has no `#TYPE` column
/// * `MalformedTable` if no sentinel row exists
pub fn split(table: &Table) -> Result<(Table, Table), XrefError> {
    let first_d = table
        .column_values(TYPE_COLUMN)?
        .position(|value| value == Some(TYPE_COLUMN))
        .ok_or(XrefError::MalformedTable)?;

    tracing::debug!(
        "Digital section starts at row {} of {}",
        first_d,
        table.len()
    );

    let analog = Table::with_rows(table.columns().to_vec(), table.slice_rows(0, first_d));

    let digital_header: Vec<String> = table.rows()[first_d]
        .iter()
        .map(|cell| cell.clone().unwrap_or_default())
        .collect();
    let digital = Table::with_rows(digital_header, table.slice_rows(first_d + 1, table.len()));

    Ok((analog, digital))
}
