//! Binary reader for font table data

use crate::tag::Tag;
use crate::{Result, ShapeError};

/// Big-endian cursor with bounds checking
///
/// Every overrun is a `MalformedFont`; callers decide whether that degrades
/// the surrounding structure or only the one rule being read.
pub struct FontReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FontReader<'a> {
    /// Create a new reader over a table slice
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current position
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Set position
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Skip bytes
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if self.pos + n > self.data.len() {
            return Err(ShapeError::MalformedFont);
        }
        self.pos += n;
        Ok(())
    }

    /// Read u8
    pub fn read_u8(&mut self) -> Result<u8> {
        if self.pos >= self.data.len() {
            return Err(ShapeError::MalformedFont);
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    /// Read big-endian u16
    pub fn read_u16(&mut self) -> Result<u16> {
        if self.pos + 2 > self.data.len() {
            return Err(ShapeError::MalformedFont);
        }
        let v = u16::from_be_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(v)
    }

    /// Read big-endian i16
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    /// Read big-endian u32
    pub fn read_u32(&mut self) -> Result<u32> {
        if self.pos + 4 > self.data.len() {
            return Err(ShapeError::MalformedFont);
        }
        let v = u32::from_be_bytes([
            self.data[self.pos],
            self.data[self.pos + 1],
            self.data[self.pos + 2],
            self.data[self.pos + 3],
        ]);
        self.pos += 4;
        Ok(v)
    }

    /// Read a 4-byte tag
    pub fn read_tag(&mut self) -> Result<Tag> {
        Ok(Tag(self.read_u32()?))
    }

    /// Read `n` raw bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.data.len() {
            return Err(ShapeError::MalformedFont);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read `count` big-endian u16 values
    pub fn read_array16(&mut self, count: usize) -> Result<Vec<u16>> {
        let bytes = self.read_bytes(count.checked_mul(2).ok_or(ShapeError::MalformedFont)?)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect())
    }

    /// Remaining byte count
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// The whole underlying slice
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Sub-slice starting at `offset` into the underlying data
    pub fn slice_at(&self, offset: usize) -> Result<&'a [u8]> {
        self.data.get(offset..).ok_or(ShapeError::MalformedFont)
    }
}
