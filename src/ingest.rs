//! Decode uploaded cross reference files into a [`Table`].
//!
//! CSV exports start with a title row which is skipped; the next record is
//! the header. Spreadsheets are read from their first worksheet.

use crate::config::IngestConfig;
use crate::error::XrefError;
use crate::table::Table;
use std::path::Path;

/// Upload formats, chosen from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    /// Detect the format the way uploads are named: anything mentioning
    /// `csv` is CSV, anything mentioning `xls` or `ods` is a spreadsheet.
    pub fn detect(filename: &str) -> Result<Self, XrefError> {
        let name = filename.to_lowercase();
        if name.contains("csv") {
            Ok(FileFormat::Csv)
        } else if name.contains("xls") || name.ends_with(".ods") {
            Ok(FileFormat::Spreadsheet)
        } else {
            Err(XrefError::UnsupportedFormat {
                filename: filename.to_string(),
            })
        }
    }
}

/// Decode an uploaded file
pub fn read_table(
    bytes: &[u8],
    filename: &str,
    options: &IngestConfig,
) -> Result<Table, XrefError> {
    let table = match FileFormat::detect(filename)? {
        FileFormat::Csv => read_csv(bytes, options)?,
        FileFormat::Spreadsheet => read_spreadsheet(bytes, options)?,
    };

    tracing::debug!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        filename
    );

    Ok(table)
}

/// Read a cross reference from disk
pub fn read_path<P: AsRef<Path>>(path: P, options: &IngestConfig) -> Result<Table, XrefError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    read_table(&bytes, &filename, options)
}

/// Decode UTF-8 CSV bytes
pub fn read_csv(bytes: &[u8], options: &IngestConfig) -> Result<Table, XrefError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| XrefError::Decode(format!("File is not valid UTF-8: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect());
    }

    build_table(records, options.csv_title_rows, &options.null_values)
}

#[cfg(feature = "excel")]
fn read_spreadsheet(bytes: &[u8], options: &IngestConfig) -> Result<Table, XrefError> {
    use calamine::{open_workbook_auto_from_rs, Reader};
    use std::io::Cursor;

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| XrefError::Decode(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(XrefError::EmptyTable)?
        .map_err(|e| XrefError::Decode(e.to_string()))?;

    let records = range
        .rows()
        .map(|row| row.iter().map(spreadsheet_text).collect())
        .collect();

    build_table(records, options.excel_title_rows, &options.null_values)
}

#[cfg(not(feature = "excel"))]
fn read_spreadsheet(_bytes: &[u8], _options: &IngestConfig) -> Result<Table, XrefError> {
    Err(XrefError::Decode(
        "Spreadsheet support is disabled (build with the `excel` feature)".to_string(),
    ))
}

#[cfg(feature = "excel")]
fn spreadsheet_text(cell: &calamine::Data) -> String {
    use calamine::Data;

    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        Data::Error(_) => String::new(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Integral values print without a fractional part
#[cfg(feature = "excel")]
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Skip `title_rows` records, take the next as header and the rest as rows.
///
/// The table is as wide as its widest record. Empty header cells and
/// columns past the header are named `Unnamed: <index>`.
fn build_table(
    records: Vec<Vec<String>>,
    title_rows: usize,
    null_values: &[String],
) -> Result<Table, XrefError> {
    let mut records = records.into_iter().skip(title_rows);
    let header = records.next().ok_or(XrefError::EmptyTable)?;
    let rows: Vec<Vec<String>> = records.collect();

    let width = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or_default();

    let columns = (0..width)
        .map(|index| match header.get(index) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Unnamed: {}", index),
        })
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(
            row.into_iter()
                .map(|value| (!null_values.contains(&value)).then_some(value))
                .collect(),
        );
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XREF_CSV: &str = "\
Cross Reference Export,,,
#TYPE,TO ENGINE,TO SYMBOL,FROM ENGINE
AI,SCP1,P1:B1.PV,DCS
AO,,,SCP1
#TYPE,TO ENGINE,TO SYMBOL,FROM ENGINE
DI,SCP2,\"P2:B2.IN, spare\",DCS
";

    #[test]
    fn test_detect_format() {
        assert_eq!(FileFormat::detect("xref.csv").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::detect("XREF.CSV").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::detect("xref.xlsx").unwrap(), FileFormat::Spreadsheet);
        assert_eq!(FileFormat::detect("xref.xls").unwrap(), FileFormat::Spreadsheet);
        assert_eq!(FileFormat::detect("xref.ods").unwrap(), FileFormat::Spreadsheet);
        assert!(matches!(
            FileFormat::detect("xref.txt"),
            Err(XrefError::UnsupportedFormat { filename }) if filename == "xref.txt"
        ));
    }

    #[test]
    fn test_read_csv_skips_title_row() {
        let table = read_table(XREF_CSV.as_bytes(), "xref.csv", &IngestConfig::default()).unwrap();

        assert_eq!(table.columns(), &["#TYPE", "TO ENGINE", "TO SYMBOL", "FROM ENGINE"]);
        assert_eq!(table.len(), 4);
        assert_eq!(table.cell(0, 2), Some("P1:B1.PV"));
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.cell(2, 0), Some("#TYPE"));
        assert_eq!(table.cell(3, 2), Some("P2:B2.IN, spare"));
    }

    #[test]
    fn test_read_csv_without_title_row() {
        let options = IngestConfig {
            csv_title_rows: 0,
            ..IngestConfig::default()
        };
        let table = read_csv(b"A,B\n1,2\n", &options).unwrap();

        assert_eq!(table.columns(), &["A", "B"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_read_csv_ragged_rows_and_unnamed_columns() {
        let table = read_csv(b"title\nA,,C\n1\n1,2,3,4\n", &IngestConfig::default()).unwrap();

        assert_eq!(table.columns(), &["A", "Unnamed: 1", "C", "Unnamed: 3"]);
        assert_eq!(table.rows()[0], vec![Some("1".to_string()), None, None, None]);
        assert_eq!(table.cell(1, 3), Some("4"));
    }

    #[test]
    fn test_read_csv_null_values() {
        let options = IngestConfig {
            null_values: vec![String::new(), "nan".to_string()],
            ..IngestConfig::default()
        };
        let table = read_csv(b"title\nA,B\nnan,x\n", &options).unwrap();

        assert_eq!(table.cell(0, 0), None);
        assert_eq!(table.cell(0, 1), Some("x"));
    }

    #[test]
    fn test_default_null_literals_are_missing() {
        let csv = "\
title
#TYPE,TO ENGINE,TO SYMBOL,FROM ENGINE,FROM SYMBOL,EQUATION
AO,DCS,X,SCP,nan,C1:B1.OUT
AO,NA,X,SCP,NA,C1:B1.OUT
AI,N/A,NULL,<NA>,None,
";
        let table = read_table(csv.as_bytes(), "xref.csv", &IngestConfig::default()).unwrap();

        assert_eq!(table.cell(0, 4), None);
        assert_eq!(table.cell(1, 1), None);
        assert!(table.rows()[2][1..].iter().all(Option::is_none));

        let engines: Vec<String> = crate::engines::list_engines(&table)
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(engines, vec!["DCS", "SCP"]);

        let keyed = crate::extraction::extract_keys(&table, &["SCP"]).unwrap();
        let misc5 = keyed.table.require_column(crate::table::KEY_COLUMN).unwrap();
        assert_eq!(keyed.key_count, 2);
        assert_eq!(keyed.table.cell(0, misc5), Some("C1:B1.OUT"));
        assert_eq!(keyed.table.cell(1, misc5), Some("C1:B1.OUT"));
    }

    #[test]
    fn test_read_csv_strips_bom() {
        let table = read_csv("\u{feff}title\n#TYPE,X\n".as_bytes(), &IngestConfig::default()).unwrap();
        assert_eq!(table.columns()[0], "#TYPE");
    }

    #[test]
    fn test_read_csv_empty() {
        assert!(matches!(
            read_csv(b"only a title\n", &IngestConfig::default()),
            Err(XrefError::EmptyTable)
        ));
        assert!(matches!(
            read_csv(b"", &IngestConfig::default()),
            Err(XrefError::EmptyTable)
        ));
    }

    #[test]
    fn test_read_csv_invalid_utf8() {
        let err = read_csv(&[b't', b'\n', 0xff, 0xfe, b'\n'], &IngestConfig::default()).unwrap_err();
        assert!(matches!(err, XrefError::Decode(_)));
        assert!(err.is_file_error());
    }

    #[test]
    fn test_read_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant_xref.csv");
        std::fs::write(&path, XREF_CSV).unwrap();

        let table = read_path(&path, &IngestConfig::default()).unwrap();
        assert_eq!(table.len(), 4);
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_read_spreadsheet_rejects_garbage() {
        let err = read_table(b"not a workbook", "xref.xlsx", &IngestConfig::default()).unwrap_err();
        assert!(matches!(err, XrefError::Decode(_)));
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(2.5), "2.5");
    }
}
