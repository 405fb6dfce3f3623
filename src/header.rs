//! Self-describing header (de)serialization
//!
//! The header frames a preorder bit encoding of the code tree behind a
//! 32-bit magic number: each internal node is a single `0` bit followed by
//! its left then right subtree, each leaf a `1` bit followed by a 9-bit
//! symbol field. Nine bits, not eight, because the sentinel value 256 must
//! be distinguishable from every real byte.

use std::io::{Read, Write};

use crate::bits::{BitReader, BitWriter};
use crate::error::{HuffpackError, Result};
use crate::tree::{HuffNode, HuffTree, Symbol, PSEUDO_EOF};

/// Format identifier written at the start of every compressed stream
pub const MAGIC: u32 = 0x4855_4650; // "HUFP"

/// Width of the magic number field in bits
pub const MAGIC_BITS: u32 = 32;

/// Width of the leaf symbol field in bits
pub const SYMBOL_BITS: u32 = 9;

// A prefix tree over at most 257 symbols never nests deeper than 256
// internal nodes, so anything deeper is corrupt rather than merely large.
const MAX_TREE_DEPTH: u32 = 256;

/// Serialize the magic number and tree, returning the exact bits written
pub fn write_header<W: Write>(tree: &HuffTree, out: &mut BitWriter<W>) -> Result<u64> {
    let start = out.bits_written();
    out.write_bits(MAGIC_BITS, MAGIC)?;
    write_node(tree.root(), out)?;
    Ok(out.bits_written() - start)
}

fn write_node<W: Write>(node: &HuffNode, out: &mut BitWriter<W>) -> Result<()> {
    match node {
        HuffNode::Leaf { symbol, .. } => {
            out.write_bits(1, 1)?;
            out.write_bits(SYMBOL_BITS, *symbol as u32)?;
        }
        HuffNode::Internal { left, right, .. } => {
            out.write_bits(1, 0)?;
            write_node(left, out)?;
            write_node(right, out)?;
        }
    }
    Ok(())
}

/// Bit count [`write_header`] would produce, without writing anything
///
/// The size estimator relies on this matching the real serialization
/// bit-for-bit.
pub fn header_bits(tree: &HuffTree) -> u64 {
    MAGIC_BITS as u64 + node_bits(tree.root())
}

fn node_bits(node: &HuffNode) -> u64 {
    match node {
        HuffNode::Leaf { .. } => 1 + SYMBOL_BITS as u64,
        HuffNode::Internal { left, right, .. } => 1 + node_bits(left) + node_bits(right),
    }
}

/// Validate the magic number and reconstruct the tree
///
/// Fails with [`HuffpackError::BadMagic`] when the stream is not a product
/// of this codec and [`HuffpackError::Truncated`] when the bits run out
/// before the tree is structurally complete. Reconstructed nodes carry
/// weight zero; weights are only meaningful on the encoding side.
pub fn read_header<R: Read>(input: &mut BitReader<R>) -> Result<HuffTree> {
    let magic = input
        .read_bits(MAGIC_BITS)?
        .ok_or_else(|| HuffpackError::truncated("magic number"))?;
    if magic != MAGIC {
        return Err(HuffpackError::bad_magic(MAGIC, magic));
    }
    let root = read_node(input, 0)?;
    Ok(HuffTree::from_root(root))
}

fn read_node<R: Read>(input: &mut BitReader<R>, depth: u32) -> Result<HuffNode> {
    if depth > MAX_TREE_DEPTH {
        return Err(HuffpackError::invalid_data("code tree too deep"));
    }
    let is_leaf = input
        .read_bit()?
        .ok_or_else(|| HuffpackError::truncated("code tree"))?;
    if is_leaf {
        let symbol = input
            .read_bits(SYMBOL_BITS)?
            .ok_or_else(|| HuffpackError::truncated("leaf symbol"))? as Symbol;
        if symbol > PSEUDO_EOF {
            return Err(HuffpackError::invalid_data(format!(
                "leaf symbol {} out of range",
                symbol
            )));
        }
        Ok(HuffNode::Leaf { symbol, weight: 0 })
    } else {
        let left = read_node(input, depth + 1)?;
        let right = read_node(input, depth + 1)?;
        Ok(HuffNode::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}
