//! # xrefkey: Unique SCP Keys for Dynsim Cross References
//!
//! A Dynsim cross reference lists the analog and digital I/O points exchanged
//! between engines. Rows that talk to an SCP engine carry the SCP signal
//! address somewhere in a symbol or equation cell; xrefkey cuts that address
//! out and stores it in the `MISC5` column so cross references can be merged
//! and compared on a stable key.
//!
//! ## Features
//!
//! - **Section splitting**: the `#TYPE` sentinel row separates analog from digital rows
//! - **Engine catalog**: distinct engine names for selection
//! - **Key extraction**: `compound:block.point` keys from free-text addresses
//! - **CSV and Excel input**: title row handling, ragged rows (feature: `excel`)
//! - **Export**: `SIM4ME` banner plus both keyed sections as one CSV
//! - **CLI and HTTP API**: `xrefkey` and `xref-api` binaries
//!
//! ## Example
//!
//! ```ignore
//! use xrefkey::{extract_keys, split, list_engines, read_table, XrefConfig};
//!
//! let config = XrefConfig::default();
//! let table = read_table(&bytes, "plant.csv", &config.ingest)?;
//! let engines = list_engines(&table)?;
//! let (analog, digital) = split(&table)?;
//!
//! let analog = extract_keys(&analog, &["SCP1"])?;
//! println!("{} keys", analog.key_count);
//! ```
//!
//! Key derivation on its own:
//!
//! ```
//! assert_eq!(xrefkey::strip("ABC(PLANT1:BLK2 EXTRA"), "PLANT1:BLK2");
//! assert_eq!(xrefkey::strip("NOCOLONHERE"), "");
//! ```

// Core operations
pub mod table;
pub mod error;
pub mod splitter;
pub mod engines;
pub mod extraction;

// Ingestion, export and workflow around the core
pub mod ingest;
pub mod serialization;
pub mod document;
pub mod config;

// HTTP API
pub mod api;

// Re-export key types
pub use table::{Table, Cell, Record, XrefColumns};
pub use error::XrefError;
pub use splitter::split;
pub use engines::list_engines;
pub use extraction::{extract_keys, strip, KeyedTable, ScpAddress};
pub use ingest::{read_table, read_path, FileFormat};
pub use serialization::{export_string, XrefCsvWriter};
pub use document::{KeyReport, XrefDocument};
pub use config::XrefConfig;
