//! Character-to-glyph mapping (`cmap`)
//!
//! Picks the best Unicode subtable at load time and resolves codepoints
//! through it. Formats 4 (BMP segments), 12 (full-range groups), 6 and 0
//! are supported; anything else is skipped.

use super::reader::FontReader;
use crate::Result;

/// A resolved `cmap` with one chosen subtable
pub struct Cmap<'a> {
    subtable: &'a [u8],
    format: u16,
}

impl<'a> Cmap<'a> {
    /// Parse the table and choose the best Unicode encoding record
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let _version = reader.read_u16()?;
        let num_tables = reader.read_u16()?;

        let mut best: Option<(u32, usize)> = None; // (priority, offset)
        for _ in 0..num_tables {
            let platform = reader.read_u16()?;
            let encoding = reader.read_u16()?;
            let offset = reader.read_u32()? as usize;

            // Higher wins; full-repertoire Unicode first, then BMP.
            let priority = match (platform, encoding) {
                (3, 10) => 5, // Windows, UCS-4
                (0, 6) => 5,  // Unicode, full repertoire
                (0, 4) => 4,
                (3, 1) => 3, // Windows, BMP
                (0, 3) => 3,
                (0, 0..=2) => 2,
                _ => 0,
            };
            if priority > 0 && best.is_none_or(|(p, _)| priority > p) {
                best = Some((priority, offset));
            }
        }

        let (_, offset) = best.ok_or(crate::ShapeError::MalformedFont)?;
        let subtable = FontReader::new(data).slice_at(offset)?;
        let format = FontReader::new(subtable).read_u16()?;
        Ok(Cmap { subtable, format })
    }

    /// Glyph index for a codepoint; `None` when unmapped
    pub fn glyph_index(&self, codepoint: u32) -> Option<u16> {
        match self.format {
            0 => self.lookup_format0(codepoint),
            4 => self.lookup_format4(codepoint),
            6 => self.lookup_format6(codepoint),
            12 => self.lookup_format12(codepoint),
            _ => None,
        }
    }

    fn lookup_format0(&self, codepoint: u32) -> Option<u16> {
        if codepoint > 0xFF {
            return None;
        }
        let glyph = *self.subtable.get(6 + codepoint as usize)?;
        (glyph != 0).then_some(glyph as u16)
    }

    fn lookup_format4(&self, codepoint: u32) -> Option<u16> {
        if codepoint > 0xFFFF {
            return None;
        }
        let c = codepoint as u16;
        let mut reader = FontReader::new(self.subtable);
        reader.skip(6).ok()?; // format, length, language
        let seg_count = (reader.read_u16().ok()? / 2) as usize;
        reader.skip(6).ok()?; // searchRange, entrySelector, rangeShift

        let end_codes = reader.read_array16(seg_count).ok()?;
        let _reserved = reader.read_u16().ok()?;
        let start_codes = reader.read_array16(seg_count).ok()?;
        let id_deltas = reader.read_array16(seg_count).ok()?;
        let id_range_offsets_pos = reader.pos();
        let id_range_offsets = reader.read_array16(seg_count).ok()?;

        let seg = end_codes.partition_point(|&end| end < c);
        if seg >= seg_count || start_codes[seg] > c {
            return None;
        }

        let glyph = if id_range_offsets[seg] == 0 {
            (c as i32 + id_deltas[seg] as i16 as i32) as u16
        } else {
            // idRangeOffset is relative to its own position in the table.
            let entry = id_range_offsets_pos
                + seg * 2
                + id_range_offsets[seg] as usize
                + (c - start_codes[seg]) as usize * 2;
            let bytes = self.subtable.get(entry..entry + 2)?;
            let raw = u16::from_be_bytes([bytes[0], bytes[1]]);
            if raw == 0 {
                return None;
            }
            (raw as i32 + id_deltas[seg] as i16 as i32) as u16
        };
        (glyph != 0).then_some(glyph)
    }

    fn lookup_format6(&self, codepoint: u32) -> Option<u16> {
        let mut reader = FontReader::new(self.subtable);
        reader.skip(6).ok()?;
        let first = reader.read_u16().ok()? as u32;
        let count = reader.read_u16().ok()? as u32;
        if codepoint < first || codepoint >= first + count {
            return None;
        }
        reader.skip((codepoint - first) as usize * 2).ok()?;
        let glyph = reader.read_u16().ok()?;
        (glyph != 0).then_some(glyph)
    }

    fn lookup_format12(&self, codepoint: u32) -> Option<u16> {
        let mut reader = FontReader::new(self.subtable);
        reader.skip(12).ok()?; // format, reserved, length, language
        let num_groups = reader.read_u32().ok()? as usize;
        let groups_pos = reader.pos();

        let mut lo = 0usize;
        let mut hi = num_groups;
        while lo < hi {
            let mid = (lo + hi) / 2;
            let mut g = FontReader::new(self.subtable);
            g.set_pos(groups_pos + mid * 12);
            let start = g.read_u32().ok()?;
            let end = g.read_u32().ok()?;
            let start_glyph = g.read_u32().ok()?;
            if codepoint < start {
                hi = mid;
            } else if codepoint > end {
                lo = mid + 1;
            } else {
                let glyph = start_glyph.checked_add(codepoint - start)?;
                return u16::try_from(glyph).ok().filter(|&g| g != 0);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// cmap with one (3,1) format 4 subtable mapping A..=C to glyphs 1..=3
    fn format4_table() -> Vec<u8> {
        let mut t = Vec::new();
        t.extend_from_slice(&0u16.to_be_bytes()); // version
        t.extend_from_slice(&1u16.to_be_bytes()); // numTables
        t.extend_from_slice(&3u16.to_be_bytes()); // platform
        t.extend_from_slice(&1u16.to_be_bytes()); // encoding
        t.extend_from_slice(&12u32.to_be_bytes()); // offset

        // Two segments: A-C, and the required 0xFFFF terminator.
        t.extend_from_slice(&4u16.to_be_bytes()); // format
        t.extend_from_slice(&40u16.to_be_bytes()); // length
        t.extend_from_slice(&0u16.to_be_bytes()); // language
        t.extend_from_slice(&4u16.to_be_bytes()); // segCountX2
        t.extend_from_slice(&4u16.to_be_bytes()); // searchRange
        t.extend_from_slice(&1u16.to_be_bytes()); // entrySelector
        t.extend_from_slice(&0u16.to_be_bytes()); // rangeShift
        t.extend_from_slice(&0x0043u16.to_be_bytes()); // endCode[0] = 'C'
        t.extend_from_slice(&0xFFFFu16.to_be_bytes()); // endCode[1]
        t.extend_from_slice(&0u16.to_be_bytes()); // reserved
        t.extend_from_slice(&0x0041u16.to_be_bytes()); // startCode[0] = 'A'
        t.extend_from_slice(&0xFFFFu16.to_be_bytes()); // startCode[1]
        t.extend_from_slice(&(-0x40i16).to_be_bytes()); // idDelta[0]: A(0x41)+delta = 1
        t.extend_from_slice(&1u16.to_be_bytes()); // idDelta[1]
        t.extend_from_slice(&0u16.to_be_bytes()); // idRangeOffset[0]
        t.extend_from_slice(&0u16.to_be_bytes()); // idRangeOffset[1]
        t
    }

    #[test]
    fn test_format4_lookup() {
        let table = format4_table();
        let cmap = Cmap::parse(&table).unwrap();
        assert_eq!(cmap.glyph_index('A' as u32), Some(1));
        assert_eq!(cmap.glyph_index('C' as u32), Some(3));
        assert_eq!(cmap.glyph_index('D' as u32), None);
        assert_eq!(cmap.glyph_index(0x1F600), None);
    }

    #[test]
    fn test_format12_lookup() {
        let mut t = Vec::new();
        t.extend_from_slice(&0u16.to_be_bytes());
        t.extend_from_slice(&1u16.to_be_bytes());
        t.extend_from_slice(&3u16.to_be_bytes());
        t.extend_from_slice(&10u16.to_be_bytes());
        t.extend_from_slice(&12u32.to_be_bytes());

        t.extend_from_slice(&12u16.to_be_bytes()); // format
        t.extend_from_slice(&0u16.to_be_bytes()); // reserved
        t.extend_from_slice(&28u32.to_be_bytes()); // length
        t.extend_from_slice(&0u32.to_be_bytes()); // language
        t.extend_from_slice(&1u32.to_be_bytes()); // numGroups
        t.extend_from_slice(&0x1F600u32.to_be_bytes()); // start
        t.extend_from_slice(&0x1F602u32.to_be_bytes()); // end
        t.extend_from_slice(&7u32.to_be_bytes()); // startGlyph

        let cmap = Cmap::parse(&t).unwrap();
        assert_eq!(cmap.glyph_index(0x1F601), Some(8));
        assert_eq!(cmap.glyph_index(0x1F603), None);
    }

    #[test]
    fn test_truncated_table_is_error() {
        assert!(Cmap::parse(&[0x00]).is_err());
    }
}
