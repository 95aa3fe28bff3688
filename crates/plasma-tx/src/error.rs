//! Error types for the transaction codec

use thiserror::Error;

/// Errors decoding a child-chain transaction
///
/// A decode failure means the bytes did not come from the canonical
/// encoder: corrupt transport rather than adversarial-but-well-formed
/// data, so it surfaces as a hard error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before the field being read
    #[error("truncated input while reading {field}")]
    UnexpectedEnd { field: &'static str },

    /// Bytes remained after the last field
    #[error("{0} trailing bytes after a complete record")]
    TrailingBytes(usize),

    /// Unknown codec version byte
    #[error("unsupported codec version {0}")]
    UnsupportedVersion(u8),

    /// A string field held invalid UTF-8
    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },
}
