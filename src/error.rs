//! Error type shared by the core operations and the ingestion/export layer.

use std::fmt;

/// Error type for cross reference processing
#[derive(Debug)]
pub enum XrefError {
    /// No `#TYPE` sentinel row separates the analog and digital sections
    MalformedTable,
    /// A column the operation reads is not in the table header
    MissingColumn {
        column: String,
    },
    /// The input held no header row at all
    EmptyTable,
    /// The file name does not identify a CSV or spreadsheet upload
    UnsupportedFormat {
        filename: String,
    },
    /// The bytes could not be decoded into rows
    Decode(String),
    Csv(csv::Error),
    Io(std::io::Error),
    Config(String),
}

impl XrefError {
    pub(crate) fn missing_column(column: &str) -> Self {
        XrefError::MissingColumn {
            column: column.to_string(),
        }
    }

    /// True for errors caused by the uploaded file itself rather than the
    /// environment; callers report these as "error processing file".
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            XrefError::MalformedTable
                | XrefError::MissingColumn { .. }
                | XrefError::EmptyTable
                | XrefError::UnsupportedFormat { .. }
                | XrefError::Decode(_)
                | XrefError::Csv(_)
        )
    }
}

impl fmt::Display for XrefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XrefError::MalformedTable => {
                write!(f, "Malformed table: no '#TYPE' row marks the start of the digital section")
            }
            XrefError::MissingColumn { column } => {
                write!(f, "Required column '{}' is missing", column)
            }
            XrefError::EmptyTable => write!(f, "File contains no header row"),
            XrefError::UnsupportedFormat { filename } => {
                write!(f, "Cannot detect file format for '{}'", filename)
            }
            XrefError::Decode(msg) => write!(f, "Decode error: {}", msg),
            XrefError::Csv(e) => write!(f, "CSV error: {}", e),
            XrefError::Io(e) => write!(f, "IO error: {}", e),
            XrefError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for XrefError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XrefError::Csv(e) => Some(e),
            XrefError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for XrefError {
    fn from(err: csv::Error) -> Self {
        XrefError::Csv(err)
    }
}

impl From<std::io::Error> for XrefError {
    fn from(err: std::io::Error) -> Self {
        XrefError::Io(err)
    }
}
