//! One uploaded cross reference and the reports generated from it.
//!
//! A document is loaded once per upload: the file is decoded, its engines
//! are listed and it is split into sections. Every change of the engine
//! selection then calls [`XrefDocument::generate`], which recomputes the
//! keys of both sections from scratch.

use crate::config::XrefConfig;
use crate::engines::list_engines;
use crate::error::XrefError;
use crate::extraction::extract_keys;
use crate::ingest::read_table;
use crate::serialization::export_string;
use crate::splitter::split;
use crate::table::{Record, Table};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

const EXAMPLE_CSV: &str = include_str!("../resources/design_data.csv");

/// A decoded, split cross reference
#[derive(Debug, Clone)]
pub struct XrefDocument {
    pub id: Uuid,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    table: Table,
    analog: Table,
    digital: Table,
    engines: BTreeSet<String>,
}

/// Result of one key generation run
#[derive(Debug, Clone, Serialize)]
pub struct KeyReport {
    pub filename: String,
    pub engines: Vec<String>,
    /// Matches over both sections
    pub key_count: usize,
    /// e.g. "12 Keys Generated"
    pub summary: String,
    pub analog_preview: Vec<Record>,
    pub digital_preview: Vec<Record>,
    #[serde(skip)]
    pub analog: Table,
    #[serde(skip)]
    pub digital: Table,
    /// Banner, analog section, digital section
    #[serde(skip)]
    pub export: String,
}

impl XrefDocument {
    pub const EXAMPLE_FILENAME: &'static str = "Example_Xref.csv";
    /// Engines preselected for the bundled example
    pub const EXAMPLE_ENGINES: [&'static str; 2] = ["ExampleSCP1", "ExampleSCP2"];

    /// Decode and prepare an uploaded file.
    ///
    /// Fails without producing a document when the file cannot be decoded or
    /// has no digital section marker.
    pub fn load(bytes: &[u8], filename: &str, config: &XrefConfig) -> Result<Self, XrefError> {
        let table = read_table(bytes, filename, &config.ingest).map_err(|e| {
            tracing::warn!("Rejected {}: {}", filename, e);
            e
        })?;

        Self::from_table(table, filename)
    }

    /// Prepare an already decoded table
    pub fn from_table(table: Table, filename: &str) -> Result<Self, XrefError> {
        let engines = list_engines(&table)?;
        let (analog, digital) = split(&table).map_err(|e| {
            tracing::warn!("Rejected {}: {}", filename, e);
            e
        })?;

        let document = Self {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            uploaded_at: Utc::now(),
            table,
            analog,
            digital,
            engines,
        };

        tracing::info!(
            "Loaded {} ({}): {} analog rows, {} digital rows, {} engines",
            document.filename,
            document.id,
            document.analog.len(),
            document.digital.len(),
            document.engines.len()
        );

        Ok(document)
    }

    /// The bundled example cross reference
    pub fn example() -> Result<Self, XrefError> {
        Self::load(
            EXAMPLE_CSV.as_bytes(),
            Self::EXAMPLE_FILENAME,
            &XrefConfig::default(),
        )
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn analog(&self) -> &Table {
        &self.analog
    }

    pub fn digital(&self) -> &Table {
        &self.digital
    }

    /// Engine names offered for selection, sorted
    pub fn engines(&self) -> &BTreeSet<String> {
        &self.engines
    }

    /// Generate keys for both sections with the given engine selection
    pub fn generate<S: AsRef<str>>(
        &self,
        selection: &[S],
        config: &XrefConfig,
    ) -> Result<KeyReport, XrefError> {
        let analog = extract_keys(&self.analog, selection)?;
        let digital = extract_keys(&self.digital, selection)?;
        let key_count = analog.key_count + digital.key_count;

        let preview = &config.preview;
        let analog_preview = analog.table.preview(&preview.columns, preview.rows)?;
        let digital_preview = digital.table.preview(&preview.columns, preview.rows)?;
        let export = export_string(&analog.table, &digital.table, &config.export.banner)?;

        tracing::info!("{}: {} keys generated", self.filename, key_count);

        Ok(KeyReport {
            filename: self.filename.clone(),
            engines: selection.iter().map(|e| e.as_ref().to_string()).collect(),
            key_count,
            summary: format!("{} Keys Generated", key_count),
            analog_preview,
            digital_preview,
            analog: analog.table,
            digital: digital.table,
            export,
        })
    }

    /// Download name for the export, e.g. `plant_keys.csv`
    pub fn export_filename(&self) -> String {
        let stem = std::path::Path::new(&self.filename)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "xref".to_string());

        format!("{}_keys.csv", stem)
    }
}
