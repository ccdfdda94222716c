//! Export of keyed cross references.
//!
//! The downloadable file is a banner line followed by the analog section and
//! then the digital section, each written as CSV with its own header line.

use crate::error::XrefError;
use crate::table::Table;
use std::io::Write;

/// Writes the banner once, then any number of table sections
pub struct XrefCsvWriter<W: Write> {
    writer: W,
}

impl<W: Write> XrefCsvWriter<W> {
    /// Create a writer and emit the banner line
    pub fn new(mut writer: W, banner: &str) -> Result<Self, XrefError> {
        writeln!(writer, "{}", banner)?;
        Ok(Self { writer })
    }

    /// Write a section: header line then rows, missing cells as empty fields
    pub fn write_section(&mut self, table: &Table) -> Result<(), XrefError> {
        let mut csv = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(&mut self.writer);

        csv.write_record(table.columns())?;
        for row in table.rows() {
            csv.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or_default()))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W, XrefError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Render the full export for an analog and a digital section
pub fn export_string(analog: &Table, digital: &Table, banner: &str) -> Result<String, XrefError> {
    let mut writer = XrefCsvWriter::new(Vec::new(), banner)?;
    writer.write_section(analog)?;
    writer.write_section(digital)?;
    let bytes = writer.finish()?;

    String::from_utf8(bytes).map_err(|e| XrefError::Decode(e.to_string()))
}
