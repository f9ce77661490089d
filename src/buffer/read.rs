//! Read cursor over a reconstructed TNS payload
//!
//! Provides the primitive reads of the TTC wire format: raw bytes, fixed-size
//! integers in either byte order, Oracle "compressed" integers, and
//! length-prefixed (optionally chunked) byte strings.

use bytes::Bytes;

use crate::constants::length;
use crate::error::{Error, Result};

/// A forward-only cursor over payload bytes
#[derive(Debug)]
pub struct ReadBuffer {
    /// The underlying byte data
    data: Bytes,
    /// Current read position
    pos: usize,
}

impl ReadBuffer {
    /// Create a new ReadBuffer from a byte slice
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(data),
            pos: 0,
        }
    }

    /// Get the current position in the buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get the total length of the buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of bytes remaining to be read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Skip `n` bytes in the buffer
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure_remaining(n)?;
        self.pos += n;
        Ok(())
    }

    /// Set the buffer position
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::BufferUnderflow {
                needed: pos,
                available: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Step back over the last byte read
    pub fn unread(&mut self) -> Result<()> {
        if self.pos == 0 {
            return Err(Error::Internal("unread at start of buffer".to_string()));
        }
        self.pos -= 1;
        Ok(())
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    #[inline]
    fn ensure_remaining(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            Err(Error::BufferUnderflow {
                needed: n,
                available: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // Raw byte reads
    // =========================================================================

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure_remaining(1)?;
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Peek at the next byte without consuming it
    pub fn peek_u8(&self) -> Result<u8> {
        self.ensure_remaining(1)?;
        Ok(self.data[self.pos])
    }

    /// Read raw bytes and return as a Vec
    pub fn read_bytes_vec(&mut self, n: usize) -> Result<Vec<u8>> {
        self.ensure_remaining(n)?;
        let bytes = self.data[self.pos..self.pos + n].to_vec();
        self.pos += n;
        Ok(bytes)
    }

    // =========================================================================
    // Fixed-size integer reads
    // =========================================================================

    /// Read a 16-bit unsigned integer in big-endian format
    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.ensure_remaining(2)?;
        let value = u16::from_be_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
    }

    // =========================================================================
    // TTC integer reads
    // =========================================================================

    /// Read an integer of up to 8 bytes
    ///
    /// In compressed form a count byte precedes the magnitude: bits 0-6 give
    /// the number of magnitude bytes (overriding `size`) and bit 7 marks a
    /// negative value. Compressed magnitudes are always big-endian. Otherwise
    /// exactly `size` bytes are read in the requested byte order and
    /// zero-extended. A size of 0 yields 0 without consuming magnitude bytes.
    pub fn read_integer(&mut self, size: usize, compressed: bool, big_endian: bool) -> Result<i64> {
        let (size, negative, big_endian) = if compressed {
            let count = self.read_u8()?;
            ((count & 0x7F) as usize, count & 0x80 != 0, true)
        } else {
            (size, false, big_endian)
        };

        if size == 0 {
            return Ok(0);
        }
        if size > length::MAX_INTEGER_BYTES {
            return Err(Error::InvalidLengthIndicator(size as u8));
        }

        self.ensure_remaining(size)?;
        let bytes = &self.data[self.pos..self.pos + size];
        let mut wide = [0u8; 8];
        let value = if big_endian {
            wide[8 - size..].copy_from_slice(bytes);
            u64::from_be_bytes(wide)
        } else {
            wide[..size].copy_from_slice(bytes);
            u64::from_le_bytes(wide)
        };
        self.pos += size;

        let value = value as i64;
        Ok(if negative { value.wrapping_neg() } else { value })
    }

    /// Read a compressed integer declared as 2 bytes wide
    pub fn read_ub2(&mut self) -> Result<u16> {
        Ok(self.read_integer(2, true, true)? as u16)
    }

    /// Read a compressed integer declared as 4 bytes wide
    pub fn read_ub4(&mut self) -> Result<u32> {
        Ok(self.read_integer(4, true, true)? as u32)
    }

    /// Read a signed compressed integer declared as 4 bytes wide
    pub fn read_sb4(&mut self) -> Result<i32> {
        Ok(self.read_integer(4, true, true)? as i32)
    }

    /// Skip a compressed integer
    pub fn skip_ub(&mut self) -> Result<()> {
        self.read_integer(0, true, true).map(|_| ())
    }

    // =========================================================================
    // Length-prefixed byte strings
    // =========================================================================

    /// Read a length-prefixed byte sequence
    ///
    /// A plain length byte is followed by that many bytes. The
    /// [`length::LONG_INDICATOR`] marker instead introduces a run of chunks,
    /// each with its own single-byte length, ended by a zero-length chunk.
    pub fn read_length_prefixed_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u8()?;
        if len != length::LONG_INDICATOR {
            return self.read_bytes_vec(len as usize);
        }

        let mut result = Vec::new();
        loop {
            let chunk_len = self.read_u8()? as usize;
            if chunk_len == 0 {
                break;
            }
            self.ensure_remaining(chunk_len)?;
            result.extend_from_slice(&self.data[self.pos..self.pos + chunk_len]);
            self.pos += chunk_len;
        }
        Ok(result)
    }
}
