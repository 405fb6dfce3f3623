//! Bit-granular stream I/O
//!
//! [`BitWriter`] and [`BitReader`] move 1 to 32 bits at a time across an
//! underlying byte-oriented stream, maintaining a partial-byte buffer in
//! between. Bits are packed MSB-first: the first bit written lands in the
//! high bit of the first output byte, which is the order the header and body
//! formats are defined in.
//!
//! Neither type performs its own buffering of whole bytes; wrap the inner
//! stream in a [`std::io::BufReader`]/[`std::io::BufWriter`] when it is a
//! file or socket.

use std::io::{self, Read, Write};

use crate::error::{HuffpackError, Result};

/// Smallest number of bits a single call may transfer
pub const MIN_BIT_COUNT: u32 = 1;
/// Largest number of bits a single call may transfer
pub const MAX_BIT_COUNT: u32 = 32;

fn check_bit_count(count: u32) -> Result<()> {
    if !(MIN_BIT_COUNT..=MAX_BIT_COUNT).contains(&count) {
        return Err(HuffpackError::invalid_data(format!(
            "bit count {} outside {}..={}",
            count, MIN_BIT_COUNT, MAX_BIT_COUNT
        )));
    }
    Ok(())
}

/// Sequential bit-level writer over a byte stream
///
/// Call [`BitWriter::finish`] when done: it flushes the trailing partial
/// byte, zero-padded to the next byte boundary, and hands back the inner
/// writer. Dropping the writer without finishing loses up to 7 buffered
/// bits.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: W,
    buffer: u8,
    pending: u32,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a writer over `inner`
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: 0,
            pending: 0,
            bits_written: 0,
        }
    }

    /// Write the low `count` bits of `value`, most significant first
    pub fn write_bits(&mut self, count: u32, value: u32) -> Result<()> {
        check_bit_count(count)?;
        for i in (0..count).rev() {
            let bit = (value >> i) & 1 == 1;
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Write a single bit
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.buffer = (self.buffer << 1) | bit as u8;
        self.pending += 1;
        self.bits_written += 1;
        if self.pending == 8 {
            self.inner.write_all(&[self.buffer])?;
            self.buffer = 0;
            self.pending = 0;
        }
        Ok(())
    }

    /// Exact number of bits written so far, excluding any final padding
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Flush the trailing partial byte (zero-padded) and return the inner
    /// writer
    pub fn finish(mut self) -> Result<W> {
        if self.pending > 0 {
            let padded = self.buffer << (8 - self.pending);
            self.inner.write_all(&[padded])?;
            self.buffer = 0;
            self.pending = 0;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Sequential bit-level reader over a byte stream
///
/// [`BitReader::read_bits`] returns `Ok(None)` as the end-of-stream marker
/// when fewer than the requested number of bits remain; callers decide
/// whether that is a clean end or a truncation.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: R,
    buffer: u8,
    remaining: u32,
}

impl<R: Read> BitReader<R> {
    /// Create a reader over `inner`
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: 0,
            remaining: 0,
        }
    }

    /// Read `count` bits into the low bits of a `u32`, most significant
    /// first; `Ok(None)` if the stream ends before all bits are available
    pub fn read_bits(&mut self, count: u32) -> Result<Option<u32>> {
        check_bit_count(count)?;
        let mut value = 0u32;
        for _ in 0..count {
            match self.read_bit()? {
                Some(bit) => value = (value << 1) | bit as u32,
                None => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    /// Read a single bit, `Ok(None)` at end of stream
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        if self.remaining == 0 {
            let mut byte = [0u8; 1];
            match self.inner.read_exact(&mut byte) {
                Ok(()) => {
                    self.buffer = byte[0];
                    self.remaining = 8;
                }
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
        self.remaining -= 1;
        let bit = (self.buffer >> self.remaining) & 1 == 1;
        Ok(Some(bit))
    }
}
