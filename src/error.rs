//! Error types for the trace parser
//!
//! Decoding errors (short payloads, unexpected markers, malformed values) are
//! recovered locally by the parsers: the offending record is skipped. Only
//! read failures on the underlying trace file end a stream.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for trace parsing and payload decoding
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    // =========================================================================
    // Payload Errors
    // =========================================================================
    /// Buffer underflow - not enough data to read
    #[error("buffer underflow: need {needed} bytes but only {available} available")]
    BufferUnderflow { needed: usize, available: usize },

    /// Invalid length indicator
    #[error("invalid length indicator: {0}")]
    InvalidLengthIndicator(u8),

    /// Packet too short to contain valid header
    #[error("packet too short: expected at least {expected} bytes, got {actual}")]
    PacketTooShort { expected: usize, actual: usize },

    /// A fixed marker byte did not hold the expected value
    #[error("unexpected marker at offset {offset:#x}: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedMarker {
        offset: usize,
        expected: u8,
        actual: u8,
    },

    /// Data conversion error
    #[error("data conversion error: {0}")]
    DataConversionError(String),

    // =========================================================================
    // Timestamp Errors
    // =========================================================================
    /// Timestamp mask not handled by the timestamp codec
    #[error("unsupported timestamp format: '{0}'")]
    UnsupportedTimestampFormat(String),

    /// Timestamp text does not match the configured mask
    #[error("can't parse timestamp '{text}': {reason}")]
    TimestampParse { text: String, reason: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Read failure on a trace file
    #[error("error reading {source_name} at line {line}: {source}")]
    TraceRead {
        source_name: String,
        line: usize,
        #[source]
        source: io::Error,
    },

    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Background producer stopped without reporting why
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a data conversion error
    pub fn conversion(message: impl Into<String>) -> Self {
        Error::DataConversionError(message.into())
    }

    /// Check if this error comes from decoding a single record
    ///
    /// These errors only invalidate the record being decoded.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::BufferUnderflow { .. }
                | Error::InvalidLengthIndicator(_)
                | Error::PacketTooShort { .. }
                | Error::UnexpectedMarker { .. }
                | Error::DataConversionError(_)
        )
    }

    /// Check if this is a read failure that terminates a stream
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::TraceRead { .. } | Error::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_read_display() {
        let err = Error::TraceRead {
            source_name: "cli_1234.trc".to_string(),
            line: 42,
            source: io::Error::new(io::ErrorKind::InvalidData, "bad sector"),
        };
        assert_eq!(
            err.to_string(),
            "error reading cli_1234.trc at line 42: bad sector"
        );
    }

    #[test]
    fn test_unexpected_marker_display() {
        let err = Error::UnexpectedMarker {
            offset: 0x13,
            expected: 0x5e,
            actual: 0x01,
        };
        assert_eq!(
            err.to_string(),
            "unexpected marker at offset 0x13: expected 0x5e, got 0x01"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::BufferUnderflow {
            needed: 4,
            available: 1
        }
        .is_decode_error());
        assert!(Error::conversion("bad date").is_decode_error());
        assert!(!Error::UnsupportedTimestampFormat("YYYY".into()).is_decode_error());

        let io_err = Error::Io(io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(io_err.is_io_error());
        assert!(!io_err.is_decode_error());
    }
}
