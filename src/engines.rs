//! Catalog of engine names referenced by a cross reference.

use crate::error::XrefError;
use crate::table::{Table, FROM_ENGINE, TO_ENGINE};
use std::collections::BTreeSet;

/// Values that appear in the engine columns but never name an engine:
/// the "no value" spellings and the repeated digital header labels.
pub const EXCLUDED_ENGINE_VALUES: [&str; 5] = ["nan", "None", "", FROM_ENGINE, TO_ENGINE];

/// True if `value` names an engine
pub fn is_engine_name(value: &str) -> bool {
    !EXCLUDED_ENGINE_VALUES.contains(&value)
}

/// Distinct engine names from the `TO ENGINE` and `FROM ENGINE` columns,
/// sorted lexicographically. Missing cells are skipped.
pub fn list_engines(table: &Table) -> Result<BTreeSet<String>, XrefError> {
    let engines: BTreeSet<String> = table
        .column_values(TO_ENGINE)?
        .chain(table.column_values(FROM_ENGINE)?)
        .flatten()
        .filter(|value| is_engine_name(value))
        .map(str::to_string)
        .collect();

    tracing::debug!("Found {} engines in {} rows", engines.len(), table.len());

    Ok(engines)
}
