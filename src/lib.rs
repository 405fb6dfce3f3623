//! # Huffpack: Byte-Oriented Huffman Compression
//!
//! This crate builds a prefix code from the observed byte frequencies of an
//! input, serializes that code as a self-describing bit-level header, and
//! encodes the input as a bitstream. The whole process reverses losslessly
//! from the compressed form alone.
//!
//! ## Key pieces
//!
//! - **Frequency counting**: dense per-byte occurrence table
//! - **Code tree**: greedy min-heap construction with a deterministic
//!   tie-break, one reserved sentinel symbol marking end of stream
//! - **Header codec**: 32-bit magic plus a preorder bit encoding of the tree
//! - **Stream codec**: prefix-code encode, root-to-leaf tree-walk decode
//! - **Size estimator**: exact compressed bit count without writing output,
//!   driving the skip-when-not-smaller policy
//!
//! ## Quick Start
//!
//! ```rust
//! use huffpack::{compress, decompress_to_vec, CompressOutcome};
//!
//! let input = b"abracadabra, abracadabra!";
//!
//! let mut compressed = Vec::new();
//! let outcome = compress(input, &mut compressed, true)?;
//! assert!(matches!(outcome, CompressOutcome::Written { .. }));
//!
//! let restored = decompress_to_vec(&compressed[..])?;
//! assert_eq!(restored, input);
//! # Ok::<(), huffpack::HuffpackError>(())
//! ```

#![warn(missing_docs)]

pub mod bits;
pub mod codec;
pub mod error;
pub mod freq;
pub mod header;
pub mod tree;

// Re-export the main types
pub use bits::{BitReader, BitWriter};
pub use codec::{
    compress, decompress, decompress_to_vec, CompressOutcome, CompressionReport, HuffSession,
};
pub use error::{HuffpackError, Result};
pub use freq::FrequencyTable;
pub use header::{MAGIC, MAGIC_BITS, SYMBOL_BITS};
pub use tree::{CodeTable, HuffNode, HuffTree, Symbol, PSEUDO_EOF};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
