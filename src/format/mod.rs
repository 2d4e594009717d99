//! The on-disk horcrux container.
//!
//! A standard horcrux file is text-then-binary: a human-readable banner, a
//! `-- HEADER --` line, the JSON-encoded [`Header`], a `-- BODY --` line,
//! and the raw shard bytes to end of stream. Headerless ("paranoiac") files
//! carry only the raw body and are deliberately unparseable.

pub mod header;
pub mod reader;
pub mod writer;

pub use header::{Header, HeaderError};
pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

/// Marks the start of the JSON metadata.
pub const HEADER_MARKER: &str = "-- HEADER --";

/// Marks the start of the binary body.
pub const BODY_MARKER: &str = "-- BODY --";

/// How many lines the reader scans for the header marker before giving up.
/// Keeps garbage input from being read to the end.
pub(crate) const MARKER_SCAN_LIMIT: usize = 50;

/// Errors from writing or parsing the container.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("invalid header: {0}")]
    Header(#[from] HeaderError),

    #[error("header json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid format: could not find {0:?} marker")]
    MissingMarker(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
