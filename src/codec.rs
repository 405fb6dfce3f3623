//! Stream encoding, decoding, and the compress-or-reject decision
//!
//! A [`HuffSession`] owns the frequency table, code tree, and code table for
//! one compression run; nothing is shared across sessions, so independent
//! runs never interfere. Encoding appends each input byte's code followed by
//! the sentinel's code as terminator; decoding walks the reconstructed tree
//! root-to-leaf per symbol until it reaches the sentinel.
//!
//! The size estimator computes the exact bit count a forced compression
//! would produce, which drives the skip-when-not-smaller policy.

use std::io::{Read, Write};

use crate::bits::{BitReader, BitWriter};
use crate::error::{HuffpackError, Result};
use crate::freq::FrequencyTable;
use crate::header::{header_bits, read_header, write_header};
use crate::tree::{CodeTable, HuffNode, HuffTree, Symbol, PSEUDO_EOF};

/// Result of a [`compress`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompressOutcome {
    /// Compressed output was produced
    Written {
        /// Exact bits written, excluding trailing byte-boundary padding
        bits: u64,
    },
    /// Compression was skipped because it would not shrink the input
    Skipped {
        /// Bits a forced compression would have written
        estimated_bits: u64,
    },
}

impl CompressOutcome {
    /// Bits written, or bits that would have been written
    pub fn bits(&self) -> u64 {
        match self {
            CompressOutcome::Written { bits } => *bits,
            CompressOutcome::Skipped { estimated_bits } => *estimated_bits,
        }
    }

    /// Whether output was actually produced
    pub fn was_written(&self) -> bool {
        matches!(self, CompressOutcome::Written { .. })
    }
}

/// One compression/decompression session: frequency table, code tree, and
/// code table built from a single input
#[derive(Debug, Clone)]
pub struct HuffSession {
    frequencies: FrequencyTable,
    tree: HuffTree,
    table: CodeTable,
}

impl HuffSession {
    /// Build the tree and table from an in-memory input
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_frequencies(FrequencyTable::from_bytes(data))
    }

    /// Build the tree and table by consuming a reader to the end
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::from_frequencies(FrequencyTable::from_reader(reader)?))
    }

    /// Build the tree and table from an existing frequency table
    pub fn from_frequencies(frequencies: FrequencyTable) -> Self {
        let tree = HuffTree::from_frequencies(&frequencies);
        let table = tree.code_table();
        log::debug!(
            "built code tree: {} distinct bytes, root weight {}",
            frequencies.distinct_symbols(),
            tree.weight()
        );
        Self {
            frequencies,
            tree,
            table,
        }
    }

    /// The session's frequency table
    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    /// The session's code tree
    pub fn tree(&self) -> &HuffTree {
        &self.tree
    }

    /// The session's code table
    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    /// Exact bit count a forced compression of the session's input would
    /// produce: header bits plus every symbol's code length times its
    /// frequency, plus the terminator once
    ///
    /// Pure function of the session state; calling it repeatedly yields the
    /// same value, and any divergence from the bits actually written is a
    /// correctness bug.
    pub fn estimated_bits(&self) -> u64 {
        let mut bits = header_bits(&self.tree);
        for (symbol, code) in self.table.iter() {
            if symbol == PSEUDO_EOF {
                bits += code.len() as u64;
            } else {
                bits += self.frequencies.count(symbol as u8) * code.len() as u64;
            }
        }
        bits
    }

    /// Compress `data` into `output` using this session's code
    ///
    /// When `force` is false and the estimated compressed size is not
    /// smaller than the input, nothing is written and the estimate is
    /// reported via [`CompressOutcome::Skipped`]. `data` must be the input
    /// the session was built from (or a subset of its alphabet), otherwise
    /// encoding fails with [`HuffpackError::UnencodableSymbol`].
    pub fn compress_into<W: Write>(
        &self,
        data: &[u8],
        output: W,
        force: bool,
    ) -> Result<CompressOutcome> {
        let estimated_bits = self.estimated_bits();
        let original_bits = data.len() as u64 * 8;
        if !force && estimated_bits >= original_bits {
            log::debug!(
                "skipping compression: {} estimated bits >= {} input bits",
                estimated_bits,
                original_bits
            );
            return Ok(CompressOutcome::Skipped { estimated_bits });
        }

        let mut writer = BitWriter::new(output);
        let header = write_header(&self.tree, &mut writer)?;
        let body = self.encode_body(data, &mut writer)?;
        writer.finish()?;

        let bits = header + body;
        debug_assert_eq!(bits, estimated_bits);
        log::debug!(
            "compressed {} bytes to {} bits ({} header + {} body)",
            data.len(),
            bits,
            header,
            body
        );
        Ok(CompressOutcome::Written { bits })
    }

    /// Append each byte's code and the sentinel terminator, returning the
    /// body bits written
    fn encode_body<W: Write>(&self, data: &[u8], out: &mut BitWriter<W>) -> Result<u64> {
        let start = out.bits_written();
        for &byte in data {
            let code = self
                .table
                .get(byte as Symbol)
                .ok_or_else(|| HuffpackError::unencodable(byte as u16))?;
            for &bit in code {
                out.write_bit(bit)?;
            }
        }
        let terminator = self
            .table
            .get(PSEUDO_EOF)
            .ok_or_else(|| HuffpackError::unencodable(PSEUDO_EOF))?;
        for &bit in terminator {
            out.write_bit(bit)?;
        }
        Ok(out.bits_written() - start)
    }

    /// Compression statistics for this session's input, based on the exact
    /// size estimate
    pub fn report(&self) -> CompressionReport {
        CompressionReport::new(
            self.frequencies.total_bytes(),
            self.estimated_bits(),
            CompressionReport::shannon_entropy(&self.frequencies),
        )
    }
}

/// Compress `input` into `output`, building a fresh session
///
/// Returns the bits written. When `force` is false and compression would
/// not shrink the input, nothing is written and the result carries the bits
/// a forced run would have produced.
pub fn compress<W: Write>(input: &[u8], output: W, force: bool) -> Result<CompressOutcome> {
    HuffSession::from_bytes(input).compress_into(input, output, force)
}

/// Decompress a stream produced by [`compress`], returning the bytes written
///
/// Reads and validates the header, reconstructs the tree, then walks it one
/// bit at a time per output byte until the sentinel leaf terminates the
/// stream. Trailing byte-boundary padding is never consumed as content.
pub fn decompress<R: Read, W: Write>(input: R, mut output: W) -> Result<u64> {
    let mut reader = BitReader::new(input);
    let tree = read_header(&mut reader)?;
    log::debug!("reconstructed code tree with {} leaves", tree.leaf_count());

    // A lone non-sentinel leaf could never reach a terminator.
    if let HuffNode::Leaf { symbol, .. } = tree.root() {
        if *symbol != PSEUDO_EOF {
            return Err(HuffpackError::invalid_data(
                "single-leaf tree without terminator",
            ));
        }
    }

    let mut bytes_written = 0u64;
    'stream: loop {
        let mut node = tree.root();
        loop {
            match node {
                HuffNode::Leaf { symbol, .. } => {
                    if *symbol == PSEUDO_EOF {
                        break 'stream;
                    }
                    output.write_all(&[*symbol as u8])?;
                    bytes_written += 1;
                    break;
                }
                HuffNode::Internal { left, right, .. } => {
                    let bit = reader
                        .read_bit()?
                        .ok_or_else(|| HuffpackError::truncated("encoded body"))?;
                    node = if bit { right } else { left };
                }
            }
        }
    }

    output.flush()?;
    log::debug!("decompressed {} bytes", bytes_written);
    Ok(bytes_written)
}

/// Decompress into a freshly allocated vector
pub fn decompress_to_vec<R: Read>(input: R) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(input, &mut out)?;
    Ok(out)
}

/// Statistics for one compression run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompressionReport {
    /// Original size in bytes
    pub input_bytes: u64,
    /// Compressed size in bits (header plus body plus terminator)
    pub compressed_bits: u64,
    /// Compressed over original size (bits over bits)
    pub compression_ratio: f64,
    /// Compressed bits per input byte
    pub bits_per_symbol: f64,
    /// Shannon entropy of the input in bits per byte
    pub entropy: f64,
}

impl CompressionReport {
    /// Build a report from sizes and precomputed entropy
    pub fn new(input_bytes: u64, compressed_bits: u64, entropy: f64) -> Self {
        let input_bits = input_bytes * 8;
        let compression_ratio = if input_bits > 0 {
            compressed_bits as f64 / input_bits as f64
        } else {
            0.0
        };
        let bits_per_symbol = if input_bytes > 0 {
            compressed_bits as f64 / input_bytes as f64
        } else {
            0.0
        };
        Self {
            input_bytes,
            compressed_bits,
            compression_ratio,
            bits_per_symbol,
            entropy,
        }
    }

    /// Space savings as a percentage of the original size
    pub fn space_savings(&self) -> f64 {
        (1.0 - self.compression_ratio) * 100.0
    }

    /// Shannon entropy of a frequency distribution, in bits per byte
    pub fn shannon_entropy(frequencies: &FrequencyTable) -> f64 {
        let total = frequencies.total_bytes();
        if total == 0 {
            return 0.0;
        }
        let mut entropy = 0.0;
        for (_, count) in frequencies.iter() {
            let p = count as f64 / total as f64;
            entropy -= p * p.log2();
        }
        entropy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::MAGIC;

    #[test]
    fn test_teststring_reference_numbers() {
        let session = HuffSession::from_bytes(b"teststring");
        assert_eq!(session.tree().weight(), 11);
        assert_eq!(session.table().len(), 8);
        // 119 header bits + 32 body bits including the terminator
        assert_eq!(session.estimated_bits(), 151);

        let mut out = Vec::new();
        let outcome = session.compress_into(b"teststring", &mut out, true).unwrap();
        assert_eq!(outcome, CompressOutcome::Written { bits: 151 });
        assert_eq!(out.len(), 19); // 151 bits padded to byte boundary

        let decoded = decompress_to_vec(&out[..]).unwrap();
        assert_eq!(decoded, b"teststring");
    }

    #[test]
    fn test_decompress_returns_byte_count() {
        let mut out = Vec::new();
        compress(b"teststring", &mut out, true).unwrap();
        let mut decoded = Vec::new();
        assert_eq!(decompress(&out[..], &mut decoded).unwrap(), 10);
    }

    #[test]
    fn test_estimate_matches_forced_compress() {
        let inputs: [&[u8]; 5] = [
            b"",
            b"a",
            b"teststring",
            b"aaaaaaaaaaaaaaaaaaaaaaaaaaaabbbbbbbbcccc",
            b"the quick brown fox jumps over the lazy dog",
        ];
        for input in inputs {
            let session = HuffSession::from_bytes(input);
            let mut out = Vec::new();
            let outcome = session.compress_into(input, &mut out, true).unwrap();
            assert_eq!(
                outcome.bits(),
                session.estimated_bits(),
                "estimate diverged for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_estimate_idempotent() {
        let session = HuffSession::from_bytes(b"idempotence check input");
        let first = session.estimated_bits();
        for _ in 0..3 {
            assert_eq!(session.estimated_bits(), first);
        }
    }

    #[test]
    fn test_rejection_path_writes_nothing() {
        // 151 estimated bits >= 80 input bits, so an unforced run must skip.
        let mut out = Vec::new();
        let outcome = compress(b"teststring", &mut out, false).unwrap();
        assert_eq!(
            outcome,
            CompressOutcome::Skipped {
                estimated_bits: 151
            }
        );
        assert!(!outcome.was_written());
        assert!(out.is_empty());
    }

    #[test]
    fn test_compressible_input_written_without_force() {
        let data = vec![b'a'; 4096];
        let mut out = Vec::new();
        let outcome = compress(&data, &mut out, false).unwrap();
        assert!(outcome.was_written());
        assert!(out.len() < data.len());
        assert_eq!(decompress_to_vec(&out[..]).unwrap(), data);
    }

    #[test]
    fn test_empty_input_roundtrip() {
        let mut out = Vec::new();
        let outcome = compress(b"", &mut out, true).unwrap();
        // Header only: 32 magic + 10 bits for the lone sentinel leaf.
        assert_eq!(outcome, CompressOutcome::Written { bits: 42 });
        assert_eq!(decompress_to_vec(&out[..]).unwrap(), b"");

        // Unforced, an empty input can never shrink.
        let mut out = Vec::new();
        let outcome = compress(b"", &mut out, false).unwrap();
        assert!(!outcome.was_written());
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_distinct_byte_roundtrip() {
        let data = vec![42u8; 1000];
        let mut out = Vec::new();
        compress(&data, &mut out, true).unwrap();
        assert_eq!(decompress_to_vec(&out[..]).unwrap(), data);
    }

    #[test]
    fn test_all_byte_values_roundtrip() {
        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let mut out = Vec::new();
        compress(&data, &mut out, true).unwrap();
        assert_eq!(decompress_to_vec(&out[..]).unwrap(), data);
    }

    #[test]
    fn test_unencodable_symbol_is_contract_violation() {
        let session = HuffSession::from_bytes(b"abc");
        let mut out = Vec::new();
        let err = session.compress_into(b"xyz", &mut out, true).unwrap_err();
        assert!(matches!(
            err,
            HuffpackError::UnencodableSymbol { symbol } if symbol == b'x' as u16
        ));
    }

    #[test]
    fn test_truncated_body_rejected() {
        let mut out = Vec::new();
        compress(b"teststring", &mut out, true).unwrap();
        // 15 bytes cover the 119-bit header but almost none of the body.
        let err = decompress_to_vec(&out[..15]).unwrap_err();
        assert!(matches!(err, HuffpackError::Truncated { .. }));
    }

    #[test]
    fn test_garbage_input_rejected() {
        let err = decompress_to_vec(&b"not a huffpack stream"[..]).unwrap_err();
        assert!(matches!(err, HuffpackError::BadMagic { .. }));
    }

    #[test]
    fn test_single_leaf_without_sentinel_rejected() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(32, MAGIC).unwrap();
        writer.write_bits(1, 1).unwrap();
        writer.write_bits(9, b'a' as u32).unwrap();
        let bytes = writer.finish().unwrap();

        let err = decompress_to_vec(&bytes[..]).unwrap_err();
        assert!(matches!(err, HuffpackError::InvalidData { .. }));
    }

    #[test]
    fn test_zero_run_after_magic_rejected() {
        // Every 0 bit opens another internal node; a stream that is all
        // zeros after the magic must error out instead of exhausting the
        // stack.
        let mut stream = vec![0x48, 0x55, 0x46, 0x50];
        stream.extend(std::iter::repeat(0u8).take(250_000));

        let err = decompress_to_vec(&stream[..]).unwrap_err();
        assert!(matches!(err, HuffpackError::InvalidData { .. }));
    }

    #[test]
    fn test_session_from_reader() {
        let data = b"streamed session input";
        let session = HuffSession::from_reader(&data[..]).unwrap();
        let mut out = Vec::new();
        session.compress_into(data, &mut out, true).unwrap();
        assert_eq!(decompress_to_vec(&out[..]).unwrap(), data);
    }

    #[test]
    fn test_report_statistics() {
        let data = vec![b'a'; 900];
        let session = HuffSession::from_bytes(&data);
        let report = session.report();
        assert_eq!(report.input_bytes, 900);
        assert_eq!(report.compressed_bits, session.estimated_bits());
        assert!(report.compression_ratio < 1.0);
        assert!(report.space_savings() > 0.0);
        // Single-symbol input has zero entropy.
        assert!(report.entropy < 1e-9);

        let uniform: Vec<u8> = (0..=255u8).collect();
        let entropy =
            CompressionReport::shannon_entropy(&FrequencyTable::from_bytes(&uniform));
        assert!((entropy - 8.0).abs() < 1e-9);
    }
}
