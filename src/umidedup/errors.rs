use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Problems with a single SAM record line. These carry no line number;
/// the caller attaches one through `DedupError::MalformedRecord`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected at least {expected} tab-delimited fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("invalid {field} field \"{value}\"")]
    InvalidNumber { field: &'static str, value: String },

    #[error("read name \"{0}\" has fewer than 8 colon-delimited segments, no UMI")]
    MissingUmi(String),

    #[error("invalid CIGAR \"{cigar}\": {reason}")]
    InvalidCigar { cigar: String, reason: String },
}

#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Cannot read UMI list \"{}\": {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed record at line {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: RecordError,
    },

    #[error("Read failed at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("Write failed: {0}")]
    Write(#[from] io::Error),

    #[error("Unsupported read layout {0}: only single-end (1) input is handled")]
    UnsupportedLayout(u8),
}
