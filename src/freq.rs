//! Byte frequency counting
//!
//! A [`FrequencyTable`] tallies how often each byte value occurs in an input.
//! It is built once per compression run and stays immutable afterwards; the
//! code tree builder consumes it to assign short codes to frequent bytes.

use std::io::{BufReader, Read};

use crate::error::Result;

/// Occurrence counts for every byte value in a consumed input
///
/// Counts are kept in a dense 256-entry array rather than a map: the alphabet
/// is fixed and small, and iteration in ascending byte order is what gives
/// the tree builder its deterministic insertion sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
    total: u64,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            counts: [0u64; 256],
            total: 0,
        }
    }

    /// Build a table from an in-memory byte slice
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.tally(data);
        table
    }

    /// Build a table by consuming a reader to the end
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut table = Self::new();
        let mut reader = BufReader::new(reader);
        let mut buf = [0u8; 8192];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            table.tally(&buf[..n]);
        }
        Ok(table)
    }

    /// Count every byte in `data`, accumulating into the table
    pub fn tally(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
        self.total += data.len() as u64;
    }

    /// Count a single byte
    pub fn add(&mut self, byte: u8) {
        self.counts[byte as usize] += 1;
        self.total += 1;
    }

    /// Occurrence count for `byte`, zero if it never appeared
    pub fn count(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// Overwrite the count for `byte`, adjusting the running total
    pub fn set(&mut self, byte: u8, count: u64) {
        let old = self.counts[byte as usize];
        self.counts[byte as usize] = count;
        self.total = self.total - old + count;
    }

    /// Reset all counts to zero
    pub fn clear(&mut self) {
        self.counts = [0u64; 256];
        self.total = 0;
    }

    /// Number of distinct byte values with a nonzero count
    pub fn distinct_symbols(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Total number of bytes tallied
    pub fn total_bytes(&self) -> u64 {
        self.total
    }

    /// Iterate over `(byte, count)` pairs with nonzero counts, in ascending
    /// byte order
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(b, &c)| (b as u8, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table() {
        let table = FrequencyTable::new();
        assert_eq!(table.total_bytes(), 0);
        assert_eq!(table.distinct_symbols(), 0);
        assert_eq!(table.count(0), 0);
        assert_eq!(table.count(255), 0);
    }

    #[test]
    fn test_tally_counts() {
        let table = FrequencyTable::from_bytes(b"teststring");
        assert_eq!(table.total_bytes(), 10);
        assert_eq!(table.distinct_symbols(), 7);
        assert_eq!(table.count(b't'), 3);
        assert_eq!(table.count(b's'), 2);
        assert_eq!(table.count(b'e'), 1);
        assert_eq!(table.count(b'i'), 1);
        assert_eq!(table.count(b'g'), 1);
        assert_eq!(table.count(b'\n'), 0);
    }

    #[test]
    fn test_from_reader_matches_from_bytes() {
        let data: Vec<u8> = (0..=255u8).cycle().take(20000).collect();
        let from_bytes = FrequencyTable::from_bytes(&data);
        let from_reader = FrequencyTable::from_reader(&data[..]).unwrap();
        assert_eq!(from_bytes, from_reader);
    }

    #[test]
    fn test_iter_ascending_order() {
        let table = FrequencyTable::from_bytes(b"cba");
        let pairs: Vec<(u8, u64)> = table.iter().collect();
        assert_eq!(pairs, vec![(b'a', 1), (b'b', 1), (b'c', 1)]);
    }

    #[test]
    fn test_set_and_clear() {
        let mut table = FrequencyTable::from_bytes(b"aaa");
        table.set(b'a', 1);
        assert_eq!(table.count(b'a'), 1);
        assert_eq!(table.total_bytes(), 1);

        table.add(b'b');
        assert_eq!(table.total_bytes(), 2);

        table.clear();
        assert_eq!(table.total_bytes(), 0);
        assert_eq!(table.distinct_symbols(), 0);
    }
}
