use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors, any of which aborts the run.
#[derive(Debug, Error)]
pub enum ReslicerError {
    #[error("No slices matched the series filter")]
    EmptySeries,

    /// The first matching slice lacks a field every output record needs.
    #[error("Malformed template {origin}: missing or non-numeric {field}")]
    MalformedTemplate { origin: String, field: &'static str },

    #[error("Malformed slice {origin}: missing or non-numeric {field}")]
    MalformedSlice { origin: String, field: &'static str },

    #[error("Inconsistent image dimensions in {origin}: expected {expected:?}, got {actual:?}")]
    InconsistentDimensions {
        origin: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Dimension {0} does not fit in Rows/Columns")]
    DimensionOverflow(usize),

    #[error("Identifier capacity exceeded: {0}")]
    IdentifierExhaustion(String),

    #[error("Failed to write {path}: {source}")]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a candidate file is left out of the series. These never abort a
/// run; the loader logs them and moves on.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("unreadable file: {0}")]
    UnreadableFile(String),

    #[error("non-matching SOP class {0:?}")]
    NonMatchingSeries(Option<String>),

    #[error("unsupported pixel data: {0}")]
    UnsupportedPixelData(String),
}
