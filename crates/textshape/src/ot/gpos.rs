//! Glyph positioning table (`GPOS`)
//!
//! Typed views over the nine positioning lookup types. Values and anchors
//! are kept in design units; the engine scales them when applying.

use super::common::{ChainContextSubtable, ClassDef, ContextSubtable, Coverage};
use super::layout::{LayoutTable, Lookup};
use crate::font::reader::FontReader;
use crate::{Result, ShapeError};

/// GPOS lookup types
pub const LOOKUP_SINGLE: u16 = 1;
pub const LOOKUP_PAIR: u16 = 2;
pub const LOOKUP_CURSIVE: u16 = 3;
pub const LOOKUP_MARK_TO_BASE: u16 = 4;
pub const LOOKUP_MARK_TO_LIGATURE: u16 = 5;
pub const LOOKUP_MARK_TO_MARK: u16 = 6;
pub const LOOKUP_CONTEXT: u16 = 7;
pub const LOOKUP_CHAIN_CONTEXT: u16 = 8;
pub const LOOKUP_EXTENSION: u16 = 9;

/// Parsed GPOS header
pub struct GposTable<'a> {
    pub layout: LayoutTable<'a>,
}

impl<'a> GposTable<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        Ok(GposTable { layout: LayoutTable::parse(data)? })
    }

    /// Lookup with extension indirection already unwrapped
    pub fn lookup(&self, index: u16) -> Option<Lookup<'a>> {
        self.layout.lookup(index, LOOKUP_EXTENSION)
    }
}

/// Position adjustments, gated by a format bitmask on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueRecord {
    pub x_placement: i16,
    pub y_placement: i16,
    pub x_advance: i16,
    pub y_advance: i16,
}

impl ValueRecord {
    const X_PLACEMENT: u16 = 0x0001;
    const Y_PLACEMENT: u16 = 0x0002;
    const X_ADVANCE: u16 = 0x0004;
    const Y_ADVANCE: u16 = 0x0008;
    const DEVICE_FLAGS: [u16; 4] = [0x0010, 0x0020, 0x0040, 0x0080];

    /// Read the fields `format` marks as present
    pub fn parse(reader: &mut FontReader<'_>, format: u16) -> Result<Self> {
        let mut record = ValueRecord::default();
        if format & Self::X_PLACEMENT != 0 {
            record.x_placement = reader.read_i16()?;
        }
        if format & Self::Y_PLACEMENT != 0 {
            record.y_placement = reader.read_i16()?;
        }
        if format & Self::X_ADVANCE != 0 {
            record.x_advance = reader.read_i16()?;
        }
        if format & Self::Y_ADVANCE != 0 {
            record.y_advance = reader.read_i16()?;
        }
        // Device/variation offsets carry hinting deltas this engine does
        // not consume; skip them to stay in sync.
        for flag in Self::DEVICE_FLAGS {
            if format & flag != 0 {
                reader.skip(2)?;
            }
        }
        Ok(record)
    }

    pub fn is_zero(&self) -> bool {
        *self == ValueRecord::default()
    }
}

/// Attachment point in design units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    pub x: i16,
    pub y: i16,
}

impl Anchor {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let _format = reader.read_u16()?;
        let x = reader.read_i16()?;
        let y = reader.read_i16()?;
        // Formats 2 and 3 add contour-point / device refinements which the
        // engine ignores.
        Ok(Anchor { x, y })
    }
}

fn parse_optional_anchor(data: &[u8], offset: usize) -> Result<Option<Anchor>> {
    if offset == 0 {
        return Ok(None);
    }
    Ok(Some(Anchor::parse(FontReader::new(data).slice_at(offset)?)?))
}

/// Type 1: single-glyph adjustment
#[derive(Debug, Clone)]
pub enum SinglePos {
    Format1 { coverage: Coverage, value: ValueRecord },
    Format2 { coverage: Coverage, values: Vec<ValueRecord> },
}

impl SinglePos {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        let coverage_offset = reader.read_u16()? as usize;
        let value_format = reader.read_u16()?;
        let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;
        match format {
            1 => {
                let value = ValueRecord::parse(&mut reader, value_format)?;
                Ok(SinglePos::Format1 { coverage, value })
            }
            2 => {
                let count = reader.read_u16()? as usize;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(ValueRecord::parse(&mut reader, value_format)?);
                }
                Ok(SinglePos::Format2 { coverage, values })
            }
            _ => Err(ShapeError::MalformedFont),
        }
    }

    pub fn apply(&self, glyph: u16) -> Option<ValueRecord> {
        match self {
            SinglePos::Format1 { coverage, value } => {
                coverage.get(glyph)?;
                Some(*value)
            }
            SinglePos::Format2 { coverage, values } => {
                let index = coverage.get(glyph)?;
                values.get(index as usize).copied()
            }
        }
    }
}

/// Type 2: pair adjustment (kerning)
#[derive(Debug, Clone)]
pub enum PairPos {
    Format1 {
        coverage: Coverage,
        sets: Vec<Vec<(u16, ValueRecord, ValueRecord)>>,
    },
    Format2 {
        coverage: Coverage,
        class1: ClassDef,
        class2: ClassDef,
        class2_count: u16,
        matrix: Vec<(ValueRecord, ValueRecord)>,
    },
}

impl PairPos {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        let coverage_offset = reader.read_u16()? as usize;
        let vf1 = reader.read_u16()?;
        let vf2 = reader.read_u16()?;
        let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;
        match format {
            1 => {
                let set_count = reader.read_u16()? as usize;
                let set_offsets = reader.read_array16(set_count)?;
                let mut sets = Vec::with_capacity(set_count);
                for set_offset in set_offsets {
                    let mut set =
                        FontReader::new(FontReader::new(data).slice_at(set_offset as usize)?);
                    let pair_count = set.read_u16()? as usize;
                    let mut pairs = Vec::with_capacity(pair_count);
                    for _ in 0..pair_count {
                        let second = set.read_u16()?;
                        let v1 = ValueRecord::parse(&mut set, vf1)?;
                        let v2 = ValueRecord::parse(&mut set, vf2)?;
                        pairs.push((second, v1, v2));
                    }
                    sets.push(pairs);
                }
                Ok(PairPos::Format1 { coverage, sets })
            }
            2 => {
                let class1_offset = reader.read_u16()? as usize;
                let class2_offset = reader.read_u16()? as usize;
                let class1_count = reader.read_u16()?;
                let class2_count = reader.read_u16()?;
                let class1 = ClassDef::parse(reader.slice_at(class1_offset)?)?;
                let class2 = ClassDef::parse(reader.slice_at(class2_offset)?)?;
                let cells = class1_count as usize * class2_count as usize;
                let mut matrix = Vec::with_capacity(cells);
                for _ in 0..cells {
                    let v1 = ValueRecord::parse(&mut reader, vf1)?;
                    let v2 = ValueRecord::parse(&mut reader, vf2)?;
                    matrix.push((v1, v2));
                }
                Ok(PairPos::Format2 { coverage, class1, class2, class2_count, matrix })
            }
            _ => Err(ShapeError::MalformedFont),
        }
    }

    /// Adjustments for an adjacent glyph pair
    pub fn apply(&self, first: u16, second: u16) -> Option<(ValueRecord, ValueRecord)> {
        match self {
            PairPos::Format1 { coverage, sets } => {
                let index = coverage.get(first)?;
                let set = sets.get(index as usize)?;
                set.iter()
                    .find(|&&(g, _, _)| g == second)
                    .map(|&(_, v1, v2)| (v1, v2))
            }
            PairPos::Format2 { coverage, class1, class2, class2_count, matrix } => {
                coverage.get(first)?;
                let c1 = class1.get(first) as usize;
                let c2 = class2.get(second) as usize;
                let cell = matrix.get(c1 * *class2_count as usize + c2)?;
                Some(*cell)
            }
        }
    }
}

/// Type 3: cursive attachment via entry/exit anchors
#[derive(Debug, Clone)]
pub struct CursivePos {
    coverage: Coverage,
    entry_exit: Vec<(Option<Anchor>, Option<Anchor>)>,
}

impl CursivePos {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        if format != 1 {
            return Err(ShapeError::MalformedFont);
        }
        let coverage_offset = reader.read_u16()? as usize;
        let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;
        let count = reader.read_u16()? as usize;
        let mut entry_exit = Vec::with_capacity(count);
        for _ in 0..count {
            let entry_offset = reader.read_u16()? as usize;
            let exit_offset = reader.read_u16()? as usize;
            entry_exit.push((
                parse_optional_anchor(data, entry_offset)?,
                parse_optional_anchor(data, exit_offset)?,
            ));
        }
        Ok(CursivePos { coverage, entry_exit })
    }

    /// Entry anchor of a glyph
    pub fn entry(&self, glyph: u16) -> Option<Anchor> {
        let index = self.coverage.get(glyph)?;
        self.entry_exit.get(index as usize)?.0
    }

    /// Exit anchor of a glyph
    pub fn exit(&self, glyph: u16) -> Option<Anchor> {
        let index = self.coverage.get(glyph)?;
        self.entry_exit.get(index as usize)?.1
    }
}

#[derive(Debug, Clone)]
struct MarkRecord {
    class: u16,
    anchor: Anchor,
}

fn parse_mark_array(data: &[u8], offset: usize) -> Result<Vec<MarkRecord>> {
    let array_data = FontReader::new(data).slice_at(offset)?;
    let mut reader = FontReader::new(array_data);
    let count = reader.read_u16()? as usize;
    let mut marks = Vec::with_capacity(count);
    for _ in 0..count {
        let class = reader.read_u16()?;
        let anchor_offset = reader.read_u16()? as usize;
        let anchor = Anchor::parse(FontReader::new(array_data).slice_at(anchor_offset)?)?;
        marks.push(MarkRecord { class, anchor });
    }
    Ok(marks)
}

/// Types 4 and 6: mark attachment to a base or to another mark
///
/// The two share one wire layout; only which glyphs the "base" coverage
/// names differs.
#[derive(Debug, Clone)]
pub struct MarkAttachPos {
    mark_coverage: Coverage,
    base_coverage: Coverage,
    class_count: u16,
    marks: Vec<MarkRecord>,
    /// Per base glyph, one optional anchor per mark class
    bases: Vec<Vec<Option<Anchor>>>,
}

impl MarkAttachPos {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        if format != 1 {
            return Err(ShapeError::MalformedFont);
        }
        let mark_coverage_offset = reader.read_u16()? as usize;
        let base_coverage_offset = reader.read_u16()? as usize;
        let class_count = reader.read_u16()?;
        let mark_array_offset = reader.read_u16()? as usize;
        let base_array_offset = reader.read_u16()? as usize;

        let mark_coverage = Coverage::parse(reader.slice_at(mark_coverage_offset)?)?;
        let base_coverage = Coverage::parse(reader.slice_at(base_coverage_offset)?)?;
        let marks = parse_mark_array(data, mark_array_offset)?;

        let base_array_data = FontReader::new(data).slice_at(base_array_offset)?;
        let mut base_reader = FontReader::new(base_array_data);
        let base_count = base_reader.read_u16()? as usize;
        let mut bases = Vec::with_capacity(base_count);
        for _ in 0..base_count {
            let mut anchors = Vec::with_capacity(class_count as usize);
            for _ in 0..class_count {
                let anchor_offset = base_reader.read_u16()? as usize;
                anchors.push(parse_optional_anchor(base_array_data, anchor_offset)?);
            }
            bases.push(anchors);
        }

        Ok(MarkAttachPos { mark_coverage, base_coverage, class_count, marks, bases })
    }

    /// Anchors joining `mark` to `base`, when both are covered
    pub fn apply(&self, mark: u16, base: u16) -> Option<(Anchor, Anchor)> {
        let mark_index = self.mark_coverage.get(mark)? as usize;
        let base_index = self.base_coverage.get(base)? as usize;
        let record = self.marks.get(mark_index)?;
        if record.class >= self.class_count {
            return None;
        }
        let base_anchor = (*self.bases.get(base_index)?.get(record.class as usize)?)?;
        Some((record.anchor, base_anchor))
    }
}

/// Type 5: mark attachment to a ligature component
#[derive(Debug, Clone)]
pub struct MarkLigPos {
    mark_coverage: Coverage,
    lig_coverage: Coverage,
    class_count: u16,
    marks: Vec<MarkRecord>,
    /// Per ligature, per component, one optional anchor per mark class
    ligatures: Vec<Vec<Vec<Option<Anchor>>>>,
}

impl MarkLigPos {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        if format != 1 {
            return Err(ShapeError::MalformedFont);
        }
        let mark_coverage_offset = reader.read_u16()? as usize;
        let lig_coverage_offset = reader.read_u16()? as usize;
        let class_count = reader.read_u16()?;
        let mark_array_offset = reader.read_u16()? as usize;
        let lig_array_offset = reader.read_u16()? as usize;

        let mark_coverage = Coverage::parse(reader.slice_at(mark_coverage_offset)?)?;
        let lig_coverage = Coverage::parse(reader.slice_at(lig_coverage_offset)?)?;
        let marks = parse_mark_array(data, mark_array_offset)?;

        let lig_array_data = FontReader::new(data).slice_at(lig_array_offset)?;
        let mut lig_reader = FontReader::new(lig_array_data);
        let lig_count = lig_reader.read_u16()? as usize;
        let attach_offsets = lig_reader.read_array16(lig_count)?;

        let mut ligatures = Vec::with_capacity(lig_count);
        for attach_offset in attach_offsets {
            let attach_data = FontReader::new(lig_array_data).slice_at(attach_offset as usize)?;
            let mut attach_reader = FontReader::new(attach_data);
            let component_count = attach_reader.read_u16()? as usize;
            let mut components = Vec::with_capacity(component_count);
            for _ in 0..component_count {
                let mut anchors = Vec::with_capacity(class_count as usize);
                for _ in 0..class_count {
                    let anchor_offset = attach_reader.read_u16()? as usize;
                    anchors.push(parse_optional_anchor(attach_data, anchor_offset)?);
                }
                components.push(anchors);
            }
            ligatures.push(components);
        }

        Ok(MarkLigPos { mark_coverage, lig_coverage, class_count, marks, ligatures })
    }

    /// Anchors joining `mark` to component `component` of `ligature`
    pub fn apply(&self, mark: u16, ligature: u16, component: usize) -> Option<(Anchor, Anchor)> {
        let mark_index = self.mark_coverage.get(mark)? as usize;
        let lig_index = self.lig_coverage.get(ligature)? as usize;
        let record = self.marks.get(mark_index)?;
        if record.class >= self.class_count {
            return None;
        }
        let components = self.ligatures.get(lig_index)?;
        // Clamp to the last component so marks past the end still attach.
        let component = component.min(components.len().saturating_sub(1));
        let lig_anchor = (*components.get(component)?.get(record.class as usize)?)?;
        Some((record.anchor, lig_anchor))
    }
}

/// A parsed GPOS subtable of any type
pub enum GposSubtable {
    Single(SinglePos),
    Pair(PairPos),
    Cursive(CursivePos),
    MarkToBase(MarkAttachPos),
    MarkToLigature(MarkLigPos),
    MarkToMark(MarkAttachPos),
    Context(ContextSubtable),
    ChainContext(ChainContextSubtable),
}

/// Parse one subtable of a lookup of the given type
pub fn parse_subtable(kind: u16, data: &[u8]) -> Result<GposSubtable> {
    match kind {
        LOOKUP_SINGLE => Ok(GposSubtable::Single(SinglePos::parse(data)?)),
        LOOKUP_PAIR => Ok(GposSubtable::Pair(PairPos::parse(data)?)),
        LOOKUP_CURSIVE => Ok(GposSubtable::Cursive(CursivePos::parse(data)?)),
        LOOKUP_MARK_TO_BASE => Ok(GposSubtable::MarkToBase(MarkAttachPos::parse(data)?)),
        LOOKUP_MARK_TO_LIGATURE => Ok(GposSubtable::MarkToLigature(MarkLigPos::parse(data)?)),
        LOOKUP_MARK_TO_MARK => Ok(GposSubtable::MarkToMark(MarkAttachPos::parse(data)?)),
        LOOKUP_CONTEXT => Ok(GposSubtable::Context(ContextSubtable::parse(data)?)),
        LOOKUP_CHAIN_CONTEXT => Ok(GposSubtable::ChainContext(ChainContextSubtable::parse(data)?)),
        _ => Err(ShapeError::MalformedFont),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_record_partial_format() {
        // Only xAdvance present
        let data = [0xFF, 0x38]; // -200
        let mut reader = FontReader::new(&data);
        let vr = ValueRecord::parse(&mut reader, 0x0004).unwrap();
        assert_eq!(vr.x_advance, -200);
        assert_eq!(vr.x_placement, 0);
    }

    #[test]
    fn test_value_record_skips_device_offsets() {
        let data = [0x00, 0x0A, 0x12, 0x34, 0x00, 0x05];
        let mut reader = FontReader::new(&data);
        // xPlacement + xPlaDevice, then next record's xPlacement
        let vr = ValueRecord::parse(&mut reader, 0x0001 | 0x0010).unwrap();
        assert_eq!(vr.x_placement, 10);
        assert_eq!(reader.read_i16().unwrap(), 5);
    }

    #[test]
    fn test_single_pos_format1() {
        let data = [
            0x00, 0x01, 0x00, 0x08, 0x00, 0x04, 0xFF, 0xEC, // format, cov@8, vf, xAdv -20
            0x00, 0x01, 0x00, 0x01, 0x00, 0x05, // coverage: glyph 5
        ];
        let pos = SinglePos::parse(&data).unwrap();
        assert_eq!(pos.apply(5).unwrap().x_advance, -20);
        assert!(pos.apply(6).is_none());
    }

    #[test]
    fn test_pair_pos_format1() {
        // Pair (4, 5) kerned -50 on the first glyph
        let data = [
            0x00, 0x01, 0x00, 0x0C, 0x00, 0x04, 0x00, 0x00, // format, cov@12, vf1 xAdv, vf2 none
            0x00, 0x01, 0x00, 0x12, // setCount 1, set @18
            0x00, 0x01, 0x00, 0x01, 0x00, 0x04, // coverage @12: glyph 4
            0x00, 0x01, 0x00, 0x05, 0xFF, 0xCE, // set @18: 1 pair: second 5, xAdv -50
        ];
        let pos = PairPos::parse(&data).unwrap();
        let (v1, v2) = pos.apply(4, 5).unwrap();
        assert_eq!(v1.x_advance, -50);
        assert!(v2.is_zero());
        assert!(pos.apply(4, 6).is_none());
        assert!(pos.apply(5, 5).is_none());
    }

    #[test]
    fn test_pair_pos_format2() {
        // 2x2 class matrix; class1 of glyph 4 = 1, class2 of glyph 5 = 1
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_be_bytes()); // format
        data.extend_from_slice(&32u16.to_be_bytes()); // coverage
        data.extend_from_slice(&0x0004u16.to_be_bytes()); // vf1
        data.extend_from_slice(&0u16.to_be_bytes()); // vf2
        data.extend_from_slice(&38u16.to_be_bytes()); // classDef1
        data.extend_from_slice(&48u16.to_be_bytes()); // classDef2
        data.extend_from_slice(&2u16.to_be_bytes()); // class1Count
        data.extend_from_slice(&2u16.to_be_bytes()); // class2Count
        // matrix: 4 cells of vf1 only (2 bytes each)
        data.extend_from_slice(&0i16.to_be_bytes()); // (0,0)
        data.extend_from_slice(&0i16.to_be_bytes()); // (0,1)
        data.extend_from_slice(&0i16.to_be_bytes()); // (1,0)
        data.extend_from_slice(&(-75i16).to_be_bytes()); // (1,1)
        assert_eq!(data.len(), 24);
        data.extend_from_slice(&[0u8; 8]); // pad to 32
        data.extend_from_slice(&[0x00, 0x01, 0x00, 0x01, 0x00, 0x04]); // coverage @32
        // classDef1 @38: format 1, start 4, count 1, class 1
        data.extend_from_slice(&[0x00, 0x01, 0x00, 0x04, 0x00, 0x01, 0x00, 0x01]);
        assert_eq!(data.len(), 46);
        data.extend_from_slice(&[0u8; 2]); // pad to 48
        // classDef2 @48: format 1, start 5, count 1, class 1
        data.extend_from_slice(&[0x00, 0x01, 0x00, 0x05, 0x00, 0x01, 0x00, 0x01]);

        let pos = PairPos::parse(&data).unwrap();
        let (v1, _) = pos.apply(4, 5).unwrap();
        assert_eq!(v1.x_advance, -75);
        let (v1, _) = pos.apply(4, 9).unwrap(); // class2 0 cell
        assert_eq!(v1.x_advance, 0);
    }

    #[test]
    fn test_mark_to_base() {
        // Mark glyph 7 (class 0), base glyph 2, base anchor (300, 600),
        // mark anchor (10, 20)
        let mut data = Vec::new();
        data.extend_from_slice(&1u16.to_be_bytes()); // format
        data.extend_from_slice(&12u16.to_be_bytes()); // markCoverage
        data.extend_from_slice(&18u16.to_be_bytes()); // baseCoverage
        data.extend_from_slice(&1u16.to_be_bytes()); // classCount
        data.extend_from_slice(&24u16.to_be_bytes()); // markArray
        data.extend_from_slice(&36u16.to_be_bytes()); // baseArray
        data.extend_from_slice(&[0x00, 0x01, 0x00, 0x01, 0x00, 0x07]); // markCov @12
        data.extend_from_slice(&[0x00, 0x01, 0x00, 0x01, 0x00, 0x02]); // baseCov @18
        // markArray @24: count 1, (class 0, anchor @6)
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&6u16.to_be_bytes());
        // anchor @24+6: format 1, x 10, y 20
        data.extend_from_slice(&[0x00, 0x01, 0x00, 0x0A, 0x00, 0x14]);
        // baseArray @36: count 1, anchor offset 4
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&4u16.to_be_bytes());
        // anchor @36+4: format 1, x 300, y 600
        data.extend_from_slice(&[0x00, 0x01, 0x01, 0x2C, 0x02, 0x58]);

        let pos = MarkAttachPos::parse(&data).unwrap();
        let (mark_anchor, base_anchor) = pos.apply(7, 2).unwrap();
        assert_eq!((mark_anchor.x, mark_anchor.y), (10, 20));
        assert_eq!((base_anchor.x, base_anchor.y), (300, 600));
        assert!(pos.apply(7, 3).is_none());
        assert!(pos.apply(8, 2).is_none());
    }

    #[test]
    fn test_cursive_anchors() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u16.to_be_bytes()); // format
        data.extend_from_slice(&10u16.to_be_bytes()); // coverage
        data.extend_from_slice(&1u16.to_be_bytes()); // count
        data.extend_from_slice(&16u16.to_be_bytes()); // entry anchor @16
        data.extend_from_slice(&0u16.to_be_bytes()); // no exit anchor
        data.extend_from_slice(&[0x00, 0x01, 0x00, 0x01, 0x00, 0x06]); // coverage @10: glyph 6
        data.extend_from_slice(&[0x00, 0x01, 0x00, 0x64, 0x00, 0x00]); // anchor @16: (100, 0)

        let pos = CursivePos::parse(&data).unwrap();
        assert_eq!(pos.entry(6), Some(Anchor { x: 100, y: 0 }));
        assert_eq!(pos.exit(6), None);
        assert_eq!(pos.entry(7), None);
    }

    #[test]
    fn test_unknown_format_is_malformed() {
        assert!(SinglePos::parse(&[0x00, 0x07, 0x00, 0x00, 0x00, 0x00]).is_err());
        assert!(parse_subtable(42, &[0, 0]).is_err());
    }
}
