//! OpenType tags
//!
//! Four-byte identifiers used for tables, scripts, language systems and
//! features.

use std::fmt;
use std::str::FromStr;

/// Four-byte big-endian OpenType tag
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    /// The `DFLT` script tag
    pub const DEFAULT_SCRIPT: Tag = Tag::from_bytes(b"DFLT");
    /// The `dflt` language-system tag
    pub const DEFAULT_LANGUAGE: Tag = Tag::from_bytes(b"dflt");
    /// Glyph substitution table
    pub const GSUB: Tag = Tag::from_bytes(b"GSUB");
    /// Glyph positioning table
    pub const GPOS: Tag = Tag::from_bytes(b"GPOS");
    /// Glyph definition table
    pub const GDEF: Tag = Tag::from_bytes(b"GDEF");

    /// Create a tag from 4 bytes
    pub const fn from_bytes(bytes: &[u8; 4]) -> Self {
        Tag(((bytes[0] as u32) << 24)
            | ((bytes[1] as u32) << 16)
            | ((bytes[2] as u32) << 8)
            | (bytes[3] as u32))
    }

    /// Get the tag bytes
    pub const fn to_bytes(self) -> [u8; 4] {
        [
            ((self.0 >> 24) & 0xFF) as u8,
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        ]
    }

    /// Build a tag from up to 4 ASCII characters, space padded
    pub fn from_str_lossy(s: &str) -> Self {
        let mut bytes = [b' '; 4];
        for (i, b) in s.bytes().take(4).enumerate() {
            bytes[i] = b;
        }
        Tag::from_bytes(&bytes)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

impl FromStr for Tag {
    type Err = crate::ShapeError;

    fn from_str(s: &str) -> crate::Result<Self> {
        if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            return Err(crate::ShapeError::InvalidOperation("tag must be 1-4 ASCII bytes"));
        }
        Ok(Tag::from_str_lossy(s))
    }
}
