//! Tool configuration (xrefkey.yaml)
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Environment variables override the file.

use crate::error::XrefError;
use crate::table::{EQUATION, FROM_ENGINE, KEY_COLUMN, TYPE_COLUMN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "XREF_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct XrefConfig {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// How uploaded bytes become a table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Records skipped before the header in CSV files (the title row)
    #[serde(default = "default_csv_title_rows")]
    pub csv_title_rows: usize,
    /// Rows skipped before the header in spreadsheet files
    #[serde(default)]
    pub excel_title_rows: usize,
    /// Cell texts read as missing values
    #[serde(default = "default_null_values")]
    pub null_values: Vec<String>,
}

/// Preview shown after key generation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_rows")]
    pub rows: usize,
    #[serde(default = "default_preview_columns")]
    pub columns: Vec<String>,
}

/// Downloadable export
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExportConfig {
    /// First line of the export file
    #[serde(default = "default_banner")]
    pub banner: String,
}

/// HTTP server settings for xref-api
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Uploads kept in memory before the oldest is evicted
    #[serde(default = "default_max_uploads")]
    pub max_uploads: usize,
}

fn default_csv_title_rows() -> usize {
    1
}

/// Cell texts that spreadsheet tools write for "no value"
pub const DEFAULT_NULL_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn default_null_values() -> Vec<String> {
    DEFAULT_NULL_VALUES.iter().map(|v| v.to_string()).collect()
}

fn default_preview_rows() -> usize {
    5
}

fn default_preview_columns() -> Vec<String> {
    [TYPE_COLUMN, FROM_ENGINE, EQUATION, KEY_COLUMN]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_banner() -> String {
    "SIM4ME".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_uploads() -> usize {
    64
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            csv_title_rows: default_csv_title_rows(),
            excel_title_rows: 0,
            null_values: default_null_values(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            rows: default_preview_rows(),
            columns: default_preview_columns(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            banner: default_banner(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            max_uploads: default_max_uploads(),
        }
    }
}

impl XrefConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, XrefError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            XrefError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_yaml(&contents)
            .map_err(|e| XrefError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self, XrefError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(contents)
            .map_err(|e| XrefError::Config(format!("Failed to parse YAML: {}", e)))
    }

    /// Resolve the configuration: explicit path, then `XREF_CONFIG`, then
    /// defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, XrefError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `PORT` and `XREF_MAX_UPLOAD_BYTES` from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), XrefError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| XrefError::Config(format!("Invalid PORT: {}", port)))?;
        }

        if let Some(bytes) = lookup("XREF_MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = bytes.parse().map_err(|_| {
                XrefError::Config(format!("Invalid XREF_MAX_UPLOAD_BYTES: {}", bytes))
            })?;
        }

        Ok(())
    }
}
