//! Bit-addressable stream
//!
//! A growable buffer that can be read and written one bit at a time. Bits are
//! stored most significant bit first within each byte and multi-bit values are
//! written most significant bit first, so a value written with
//! `write_bits(v, 8)` at a byte boundary occupies exactly one byte equal to `v`.
//!
//! The stream tracks its length in bits separately from the backing buffer so
//! that a document written as 81 bits reads back as 81 bits when the stream is
//! handed over in memory. Serializing to bytes pads the final byte with zeros.

use crate::error::{ProtocolError, Result};
use bytes::{Bytes, BytesMut};

/// Growable, seekable, bit-addressable buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitStream {
    /// Backing bytes; bits past `len` are always zero
    data: BytesMut,

    /// Number of valid bits
    len: usize,

    /// Read/write cursor in bits, always `<= len`
    pos: usize,
}

impl BitStream {
    /// Create an empty stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stream with room for `bytes` bytes
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(bytes),
            len: 0,
            pos: 0,
        }
    }

    /// Create a stream positioned at the start of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
            len: bytes.len() * 8,
            pos: 0,
        }
    }

    /// Length of the stream in bits
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.len
    }

    /// Length of the stream in whole bytes, rounding up
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.len.div_ceil(8)
    }

    /// Current cursor position in bits
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bits between the cursor and the end of the stream
    #[inline]
    pub fn remaining_bits(&self) -> usize {
        self.len - self.pos
    }

    /// Move the cursor to an absolute bit position
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.len {
            return Err(ProtocolError::SeekOutOfRange {
                position,
                len: self.len,
            });
        }
        self.pos = position;
        Ok(())
    }

    /// Write a single bit, overwriting or growing as needed
    pub fn write_bit(&mut self, bit: bool) {
        let byte = self.pos / 8;
        if byte >= self.data.len() {
            self.data.resize(byte + 1, 0);
        }

        let mask = 0x80u8 >> (self.pos % 8);
        if bit {
            self.data[byte] |= mask;
        } else {
            self.data[byte] &= !mask;
        }

        self.advance_write(1);
    }

    /// Write the low `bits` bits of `value`, most significant first
    pub fn write_bits(&mut self, value: u64, bits: u32) -> Result<()> {
        check_bit_count(bits, 64)?;

        let mut left = bits;
        while left > 0 {
            if self.pos % 8 == 0 && left >= 8 {
                let byte = (value >> (left - 8)) as u8;
                self.write_aligned_byte(byte);
                left -= 8;
            } else {
                left -= 1;
                self.write_bit((value >> left) & 1 == 1);
            }
        }
        Ok(())
    }

    /// Write the low `bits` bits of a two's complement value
    pub fn write_signed_bits(&mut self, value: i64, bits: u32) -> Result<()> {
        self.write_bits(value as u64, bits)
    }

    /// Write raw bytes starting at the cursor (no length prefix)
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.pos % 8 == 0 {
            let start = self.pos / 8;
            let end = start + bytes.len();
            if end > self.data.len() {
                self.data.resize(end, 0);
            }
            self.data[start..end].copy_from_slice(bytes);
            self.advance_write(bytes.len() * 8);
        } else {
            for &byte in bytes {
                for i in (0..8).rev() {
                    self.write_bit((byte >> i) & 1 == 1);
                }
            }
        }
    }

    /// Read a single bit
    pub fn read_bit(&mut self) -> Result<bool> {
        self.ensure_remaining(1)?;
        let bit = self.bit_at(self.pos);
        self.pos += 1;
        Ok(bit)
    }

    /// Read `bits` bits as an unsigned value
    ///
    /// Nothing is consumed when the stream holds fewer than `bits` bits.
    pub fn read_bits(&mut self, bits: u32) -> Result<u64> {
        check_bit_count(bits, 64)?;
        self.ensure_remaining(bits as usize)?;

        let mut value: u64 = 0;
        let mut left = bits;
        while left > 0 {
            if self.pos % 8 == 0 && left >= 8 {
                value = (value << 8) | self.data[self.pos / 8] as u64;
                self.pos += 8;
                left -= 8;
            } else {
                value = (value << 1) | self.bit_at(self.pos) as u64;
                self.pos += 1;
                left -= 1;
            }
        }
        Ok(value)
    }

    /// Read `bits` bits as a two's complement value, sign extending
    pub fn read_signed_bits(&mut self, bits: u32) -> Result<i64> {
        let raw = self.read_bits(bits)?;
        if bits == 64 {
            return Ok(raw as i64);
        }
        let shift = 64 - bits;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Read `count` raw bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.ensure_remaining(count * 8)?;

        if self.pos % 8 == 0 {
            let start = self.pos / 8;
            let out = self.data[start..start + count].to_vec();
            self.pos += count * 8;
            return Ok(out);
        }

        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.byte_at(self.pos));
            self.pos += 8;
        }
        Ok(out)
    }

    /// Copy `bits` bits starting at `start` into a fresh stream
    ///
    /// The returned stream owns only that range and is positioned at its start.
    pub fn slice(&self, start: usize, bits: usize) -> Result<BitStream> {
        let available = self.len.saturating_sub(start);
        if bits > available {
            return Err(ProtocolError::NotEnoughBits {
                requested: bits,
                remaining: available,
            });
        }

        let byte_count = bits.div_ceil(8);
        let mut data = BytesMut::with_capacity(byte_count);

        if start % 8 == 0 {
            let first = start / 8;
            data.extend_from_slice(&self.data[first..first + byte_count]);
        } else {
            for i in 0..byte_count {
                data.extend_from_slice(&[self.byte_at(start + i * 8)]);
            }
        }

        // Clear anything past the end of the range
        let tail = bits % 8;
        if tail != 0 {
            if let Some(last) = data.last_mut() {
                *last &= 0xFFu8 << (8 - tail);
            }
        }

        Ok(BitStream {
            data,
            len: bits,
            pos: 0,
        })
    }

    /// Copy the stream contents out, zero padded to a whole byte
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.data[..self.byte_len()])
    }

    /// Consume the stream, zero padded to a whole byte
    pub fn into_bytes(mut self) -> Bytes {
        let byte_len = self.byte_len();
        self.data.truncate(byte_len);
        self.data.freeze()
    }

    #[inline]
    fn advance_write(&mut self, bits: usize) {
        self.pos += bits;
        if self.pos > self.len {
            self.len = self.pos;
        }
    }

    fn write_aligned_byte(&mut self, byte: u8) {
        let index = self.pos / 8;
        if index >= self.data.len() {
            self.data.resize(index + 1, 0);
        }
        self.data[index] = byte;
        self.advance_write(8);
    }

    fn ensure_remaining(&self, requested: usize) -> Result<()> {
        let remaining = self.remaining_bits();
        if requested > remaining {
            return Err(ProtocolError::NotEnoughBits {
                requested,
                remaining,
            });
        }
        Ok(())
    }

    #[inline]
    fn bit_at(&self, index: usize) -> bool {
        self.data[index / 8] & (0x80u8 >> (index % 8)) != 0
    }

    /// Eight bits starting at an arbitrary bit index; missing bytes read as zero
    fn byte_at(&self, index: usize) -> u8 {
        let byte = index / 8;
        let offset = index % 8;
        let high = self.data.get(byte).copied().unwrap_or(0);
        if offset == 0 {
            return high;
        }
        let low = self.data.get(byte + 1).copied().unwrap_or(0);
        (high << offset) | (low >> (8 - offset))
    }
}

pub(crate) fn check_bit_count(bits: u32, max: u32) -> Result<()> {
    if bits == 0 || bits > max {
        return Err(ProtocolError::InvalidBitCount { bits, max });
    }
    Ok(())
}
