//! Huffman code tree construction and code table generation
//!
//! The tree is built greedily from a [`FrequencyTable`] plus one reserved
//! sentinel symbol: every leaf is a symbol, every internal node the merge of
//! the two lightest subtrees, so leaf depth equals code length. Walking the
//! tree left=0 / right=1 yields the prefix-free code table used by the
//! stream codec.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use crate::freq::FrequencyTable;

/// A code alphabet symbol: a byte value in `0..=255`, or [`PSEUDO_EOF`]
pub type Symbol = u16;

/// The pseudo end-of-stream sentinel
///
/// One sentinel leaf is added to every tree with a weight of 1; its code
/// terminates the encoded body. The value 256 is what forces the 9-bit leaf
/// field in the header format: 8 bits could not distinguish it from a real
/// byte.
pub const PSEUDO_EOF: Symbol = 256;

/// Node in the Huffman tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    /// A symbol with its frequency weight
    Leaf {
        /// The symbol at this leaf
        symbol: Symbol,
        /// The symbol's weight (frequency, or 1 for the sentinel)
        weight: u64,
    },
    /// A merge of two subtrees
    Internal {
        /// Sum of the children's weights
        weight: u64,
        /// Left subtree, path bit 0
        left: Box<HuffNode>,
        /// Right subtree, path bit 1
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    /// Weight of this node
    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    /// Whether this node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }
}

/// Heap entry carrying the deterministic ordering keys
///
/// Equal-weight nodes are ordered by insertion sequence: leaves enter in
/// ascending symbol order with the sentinel last, merged nodes append after.
/// This fixes the tie-break so identical input always yields the identical
/// tree.
#[derive(Debug, PartialEq, Eq)]
struct HeapEntry {
    weight: u64,
    seq: u32,
    node: HuffNode,
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Huffman code tree for one compression or decompression session
///
/// The session owns the tree exclusively; nodes own their children directly
/// with no sharing, so no cycles are possible by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffTree {
    root: HuffNode,
}

impl HuffTree {
    /// Build the tree from a frequency table plus the sentinel leaf
    ///
    /// The root's weight equals the sum of all byte counts plus 1 for the
    /// sentinel. An empty table still yields a tree: the sentinel leaf alone
    /// as root.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Self {
        let mut heap = BinaryHeap::new();
        let mut seq = 0u32;

        for (byte, count) in frequencies.iter() {
            heap.push(Reverse(HeapEntry {
                weight: count,
                seq,
                node: HuffNode::Leaf {
                    symbol: byte as Symbol,
                    weight: count,
                },
            }));
            seq += 1;
        }

        heap.push(Reverse(HeapEntry {
            weight: 1,
            seq,
            node: HuffNode::Leaf {
                symbol: PSEUDO_EOF,
                weight: 1,
            },
        }));
        seq += 1;

        while heap.len() > 1 {
            let Reverse(first) = heap.pop().unwrap();
            let Reverse(second) = heap.pop().unwrap();
            let weight = first.weight + second.weight;
            heap.push(Reverse(HeapEntry {
                weight,
                seq,
                node: HuffNode::Internal {
                    weight,
                    left: Box::new(first.node),
                    right: Box::new(second.node),
                },
            }));
            seq += 1;
        }

        // The sentinel guarantees the heap is never empty.
        let Reverse(entry) = heap.pop().unwrap();
        Self { root: entry.node }
    }

    /// Wrap an already constructed root, used by header reconstruction
    pub(crate) fn from_root(root: HuffNode) -> Self {
        Self { root }
    }

    /// The root node
    pub fn root(&self) -> &HuffNode {
        &self.root
    }

    /// Total weight of the tree (input bytes plus 1 for the sentinel)
    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        fn count(node: &HuffNode) -> usize {
            match node {
                HuffNode::Leaf { .. } => 1,
                HuffNode::Internal { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }

    /// Number of internal nodes (always `leaf_count() - 1`)
    pub fn internal_count(&self) -> usize {
        self.leaf_count() - 1
    }

    /// Derive the symbol-to-code mapping by depth-first traversal
    pub fn code_table(&self) -> CodeTable {
        let mut codes = HashMap::new();
        collect_codes(&self.root, Vec::new(), &mut codes);
        CodeTable { codes }
    }
}

fn collect_codes(node: &HuffNode, path: Vec<bool>, codes: &mut HashMap<Symbol, Vec<bool>>) {
    match node {
        HuffNode::Leaf { symbol, .. } => {
            // A root leaf gets the empty code.
            codes.insert(*symbol, path);
        }
        HuffNode::Internal { left, right, .. } => {
            let mut left_path = path.clone();
            left_path.push(false);
            collect_codes(left, left_path, codes);

            let mut right_path = path;
            right_path.push(true);
            collect_codes(right, right_path, codes);
        }
    }
}

/// Symbol-to-bit-string mapping derived from a [`HuffTree`]
///
/// Structurally prefix-free: codes are root-to-leaf paths and no leaf lies
/// on the path to another. Regenerated whenever the tree changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: HashMap<Symbol, Vec<bool>>,
}

impl CodeTable {
    /// Code bits for `symbol`, `None` if the symbol is not in the tree
    ///
    /// A miss is the "symbol not encodable" condition, not a crash; callers
    /// surface it as [`crate::HuffpackError::UnencodableSymbol`].
    pub fn get(&self, symbol: Symbol) -> Option<&[bool]> {
        self.codes.get(&symbol).map(|c| c.as_slice())
    }

    /// Code length in bits for `symbol`, `None` if absent
    pub fn code_len(&self, symbol: Symbol) -> Option<usize> {
        self.codes.get(&symbol).map(|c| c.len())
    }

    /// Number of symbols with a code
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the table is empty (never true for a table from a built tree)
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterate over `(symbol, code)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &[bool])> + '_ {
        self.codes.iter().map(|(&s, c)| (s, c.as_slice()))
    }
}
