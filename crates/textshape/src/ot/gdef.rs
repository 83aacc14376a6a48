//! Glyph definition table (`GDEF`)
//!
//! Supplies the glyph classes and mark filtering data the lookup flags
//! consult when deciding which glyphs a lookup may skip.

use super::common::{ClassDef, Coverage};
use crate::font::reader::FontReader;
use crate::ot::layout::LookupFlag;
use crate::Result;

/// GDEF glyph classes
pub const GLYPH_CLASS_BASE: u16 = 1;
pub const GLYPH_CLASS_LIGATURE: u16 = 2;
pub const GLYPH_CLASS_MARK: u16 = 3;
pub const GLYPH_CLASS_COMPONENT: u16 = 4;

/// Parsed GDEF data
#[derive(Default)]
pub struct Gdef {
    glyph_classes: Option<ClassDef>,
    mark_attach_classes: Option<ClassDef>,
    mark_glyph_sets: Vec<Coverage>,
}

impl Gdef {
    /// Parse a GDEF table
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let _major = reader.read_u16()?;
        let minor = reader.read_u16()?;
        let glyph_class_offset = reader.read_u16()? as usize;
        let _attach_list_offset = reader.read_u16()?;
        let _lig_caret_offset = reader.read_u16()?;
        let mark_attach_offset = reader.read_u16()? as usize;
        let mark_glyph_sets_offset = if minor >= 2 {
            reader.read_u16()? as usize
        } else {
            0
        };

        let glyph_classes = if glyph_class_offset != 0 {
            Some(ClassDef::parse(reader.slice_at(glyph_class_offset)?)?)
        } else {
            None
        };
        let mark_attach_classes = if mark_attach_offset != 0 {
            Some(ClassDef::parse(reader.slice_at(mark_attach_offset)?)?)
        } else {
            None
        };

        let mut mark_glyph_sets = Vec::new();
        if mark_glyph_sets_offset != 0 {
            let sets_data = reader.slice_at(mark_glyph_sets_offset)?;
            let mut sets = FontReader::new(sets_data);
            let _format = sets.read_u16()?;
            let count = sets.read_u16()? as usize;
            for _ in 0..count {
                let offset = sets.read_u32()? as usize;
                mark_glyph_sets.push(Coverage::parse(
                    FontReader::new(sets_data).slice_at(offset)?,
                )?);
            }
        }

        Ok(Gdef { glyph_classes, mark_attach_classes, mark_glyph_sets })
    }

    /// GDEF class of a glyph, 0 when unclassified
    pub fn glyph_class(&self, glyph: u16) -> u16 {
        self.glyph_classes.as_ref().map_or(0, |cd| cd.get(glyph))
    }

    /// Check if a glyph is classified as a mark
    pub fn is_mark(&self, glyph: u16) -> bool {
        self.glyph_class(glyph) == GLYPH_CLASS_MARK
    }

    /// Decide whether a lookup with `flag` skips this glyph
    pub fn should_skip(&self, glyph: u16, flag: LookupFlag, mark_filtering_set: Option<u16>) -> bool {
        let class = self.glyph_class(glyph);
        if flag.ignore_base_glyphs() && class == GLYPH_CLASS_BASE {
            return true;
        }
        if flag.ignore_ligatures() && class == GLYPH_CLASS_LIGATURE {
            return true;
        }
        if class == GLYPH_CLASS_MARK {
            if flag.ignore_marks() {
                return true;
            }
            if let Some(set) = mark_filtering_set {
                let covered = self
                    .mark_glyph_sets
                    .get(set as usize)
                    .is_some_and(|cov| cov.contains(glyph));
                if !covered {
                    return true;
                }
            } else if flag.mark_attachment_type() != 0 {
                let attach_class = self
                    .mark_attach_classes
                    .as_ref()
                    .map_or(0, |cd| cd.get(glyph));
                if attach_class != flag.mark_attachment_type() {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// GDEF 1.2 with glyph classes (glyph 1 base, 2 mark, 3 ligature),
    /// mark attachment classes (glyph 2 -> class 1), and one mark set
    /// containing glyph 2.
    fn sample_gdef() -> Vec<u8> {
        let mut t = Vec::new();
        t.extend_from_slice(&1u16.to_be_bytes()); // major
        t.extend_from_slice(&2u16.to_be_bytes()); // minor
        t.extend_from_slice(&14u16.to_be_bytes()); // glyphClassDef
        t.extend_from_slice(&0u16.to_be_bytes()); // attachList
        t.extend_from_slice(&0u16.to_be_bytes()); // ligCaretList
        t.extend_from_slice(&26u16.to_be_bytes()); // markAttachClassDef
        t.extend_from_slice(&36u16.to_be_bytes()); // markGlyphSetsDef

        // glyphClassDef @14: format 1, start 1, count 3: base, mark, ligature
        t.extend_from_slice(&1u16.to_be_bytes());
        t.extend_from_slice(&1u16.to_be_bytes());
        t.extend_from_slice(&3u16.to_be_bytes());
        t.extend_from_slice(&GLYPH_CLASS_BASE.to_be_bytes());
        t.extend_from_slice(&GLYPH_CLASS_MARK.to_be_bytes());
        t.extend_from_slice(&GLYPH_CLASS_LIGATURE.to_be_bytes());

        // markAttachClassDef @26: format 1, start 2, count 1, class 1
        t.extend_from_slice(&1u16.to_be_bytes());
        t.extend_from_slice(&2u16.to_be_bytes());
        t.extend_from_slice(&1u16.to_be_bytes());
        t.extend_from_slice(&1u16.to_be_bytes());
        t.extend_from_slice(&0u16.to_be_bytes()); // pad to 36

        // markGlyphSets @36: format 1, count 1, offset u32 = 10
        t.extend_from_slice(&1u16.to_be_bytes());
        t.extend_from_slice(&1u16.to_be_bytes());
        t.extend_from_slice(&8u32.to_be_bytes());
        // coverage @36+8: format 1, 1 glyph: 2
        t.extend_from_slice(&[0x00, 0x01, 0x00, 0x01, 0x00, 0x02]);
        t
    }

    #[test]
    fn test_glyph_classes() {
        let data = sample_gdef();
        let gdef = Gdef::parse(&data).unwrap();
        assert_eq!(gdef.glyph_class(1), GLYPH_CLASS_BASE);
        assert!(gdef.is_mark(2));
        assert_eq!(gdef.glyph_class(3), GLYPH_CLASS_LIGATURE);
        assert_eq!(gdef.glyph_class(9), 0);
    }

    #[test]
    fn test_skip_rules() {
        let data = sample_gdef();
        let gdef = Gdef::parse(&data).unwrap();

        let ignore_marks = LookupFlag(LookupFlag::IGNORE_MARKS);
        assert!(gdef.should_skip(2, ignore_marks, None));
        assert!(!gdef.should_skip(1, ignore_marks, None));

        let ignore_bases = LookupFlag(LookupFlag::IGNORE_BASE_GLYPHS);
        assert!(gdef.should_skip(1, ignore_bases, None));
        assert!(!gdef.should_skip(2, ignore_bases, None));

        // Mark filtering set 0 contains glyph 2, so it is kept.
        let filtering = LookupFlag(LookupFlag::USE_MARK_FILTERING_SET);
        assert!(!gdef.should_skip(2, filtering, Some(0)));
        assert!(gdef.should_skip(2, filtering, Some(7)));

        // Attachment type 2 does not match glyph 2's class 1.
        let attach = LookupFlag(2 << 8);
        assert!(gdef.should_skip(2, attach, None));
        let attach1 = LookupFlag(1 << 8);
        assert!(!gdef.should_skip(2, attach1, None));
    }

    #[test]
    fn test_empty_gdef_skips_nothing() {
        let gdef = Gdef::default();
        assert!(!gdef.should_skip(5, LookupFlag(LookupFlag::IGNORE_MARKS), None));
    }
}
