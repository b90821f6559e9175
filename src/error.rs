use std::path::PathBuf;
use thiserror::Error;

/// The main error type for export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse dataset JSON from {path}: {source}")]
    DatasetJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse map origins from {path}: {source}")]
    OriginsParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unknown map location '{0}'")]
    UnknownLocation(String),

    #[error("Invalid UTM zone {number}{letter} (expected 1-60 and C-X without I/O)")]
    InvalidZone { number: u8, letter: char },

    #[error("UTM position ({easting}, {northing}) in zone {zone} cannot be projected: {reason}")]
    OutOfProjectionRange {
        easting: f64,
        northing: f64,
        zone: u8,
        reason: String,
    },

    #[error("Record '{token}' not found in table '{table}'")]
    MissingRecord { table: &'static str, token: String },

    #[error("Malformed geometry in record '{token}': {message}")]
    MalformedGeometry { token: String, message: String },

    #[error("Sample '{sample}' has no key-frame data for channel '{channel}'")]
    MissingSensorData { sample: String, channel: String },

    #[error("Failed to build tags for record '{token}': {source}")]
    TagBlock {
        token: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Sample chain revisits sample '{0}'")]
    SampleCycle(String),

    #[error("Timestamp {0} is outside the representable range")]
    InvalidTimestamp(i64),

    #[error("{failed} of {total} export unit(s) failed")]
    UnitsFailed { failed: usize, total: usize },
}

impl ExportError {
    /// Shorthand for a lookup failure against a dataset table.
    pub fn missing(table: &'static str, token: impl Into<String>) -> Self {
        Self::MissingRecord {
            table,
            token: token.into(),
        }
    }
}
