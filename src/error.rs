//! Error handling for the huffpack library
//!
//! Every fallible operation in the crate returns [`Result`], whose error type
//! distinguishes the failure classes of the compressed format: wrong magic
//! number, truncated bitstream, a byte with no code in the active table, and
//! plain I/O failures from the underlying streams.

use thiserror::Error;

/// Main error type for the huffpack library
#[derive(Error, Debug)]
pub enum HuffpackError {
    /// I/O errors from the underlying byte streams, propagated unchanged
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Magic number mismatch: the input is not a product of this codec
    #[error("bad magic number: expected {expected:#010x}, got {actual:#010x}")]
    BadMagic {
        /// The magic value this codec writes
        expected: u32,
        /// The value actually read from the stream
        actual: u32,
    },

    /// Bit source exhausted before a structurally required token was read
    #[error("truncated stream: {context}")]
    Truncated {
        /// What the codec was reading when the stream ran out
        context: &'static str,
    },

    /// A byte to be encoded has no entry in the current code table
    ///
    /// This indicates the table was built from different data than the
    /// stream being encoded, which is a caller-contract violation rather
    /// than a recoverable runtime condition.
    #[error("symbol {symbol} has no code in the current table")]
    UnencodableSymbol {
        /// The symbol that could not be encoded
        symbol: u16,
    },

    /// Invalid data or argument outside the more specific kinds above
    #[error("invalid data: {message}")]
    InvalidData {
        /// Error message describing the issue
        message: String,
    },
}

impl HuffpackError {
    /// Create a bad magic error
    pub fn bad_magic(expected: u32, actual: u32) -> Self {
        Self::BadMagic { expected, actual }
    }

    /// Create a truncated stream error
    pub fn truncated(context: &'static str) -> Self {
        Self::Truncated { context }
    }

    /// Create an unencodable symbol error
    pub fn unencodable(symbol: u16) -> Self {
        Self::UnencodableSymbol { symbol }
    }

    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Only I/O failures are considered recoverable (the caller may retry
    /// against the underlying stream); format-level failures are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::BadMagic { .. } => false,
            Self::Truncated { .. } => false,
            Self::UnencodableSymbol { .. } => false,
            Self::InvalidData { .. } => false,
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::BadMagic { .. } => "format",
            Self::Truncated { .. } => "truncated",
            Self::UnencodableSymbol { .. } => "contract",
            Self::InvalidData { .. } => "data",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, HuffpackError>;
