//! Common layout-table plumbing
//!
//! GSUB and GPOS share one header shape: a script list resolving to
//! language systems, a feature list grouping lookup indices under tags,
//! and a lookup list. Script and language selection fall back in two
//! stages (exact script, then `DFLT`; exact language, then the script's
//! default language system).

use crate::font::reader::FontReader;
use crate::tag::Tag;
use crate::Result;

/// Lookup qualifier flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LookupFlag(pub u16);

impl LookupFlag {
    pub const RIGHT_TO_LEFT: u16 = 0x0001;
    pub const IGNORE_BASE_GLYPHS: u16 = 0x0002;
    pub const IGNORE_LIGATURES: u16 = 0x0004;
    pub const IGNORE_MARKS: u16 = 0x0008;
    pub const USE_MARK_FILTERING_SET: u16 = 0x0010;
    pub const MARK_ATTACHMENT_TYPE_MASK: u16 = 0xFF00;

    pub fn ignore_base_glyphs(self) -> bool {
        self.0 & Self::IGNORE_BASE_GLYPHS != 0
    }

    pub fn ignore_ligatures(self) -> bool {
        self.0 & Self::IGNORE_LIGATURES != 0
    }

    pub fn ignore_marks(self) -> bool {
        self.0 & Self::IGNORE_MARKS != 0
    }

    pub fn use_mark_filtering_set(self) -> bool {
        self.0 & Self::USE_MARK_FILTERING_SET != 0
    }

    /// Mark attachment class filter, 0 meaning "all marks"
    pub fn mark_attachment_type(self) -> u16 {
        (self.0 & Self::MARK_ATTACHMENT_TYPE_MASK) >> 8
    }
}

/// A resolved language system: the feature indices active for one
/// script/language pair
#[derive(Debug, Clone)]
pub struct LangSys {
    pub required_feature: Option<u16>,
    pub feature_indices: Vec<u16>,
}

/// One lookup with its subtable slices resolved
#[derive(Debug, Clone)]
pub struct Lookup<'a> {
    pub kind: u16,
    pub flag: LookupFlag,
    pub mark_filtering_set: Option<u16>,
    pub subtables: Vec<&'a [u8]>,
}

/// Parsed GSUB/GPOS header with list slices resolved
pub struct LayoutTable<'a> {
    script_list: &'a [u8],
    feature_list: &'a [u8],
    lookup_list: &'a [u8],
}

impl<'a> LayoutTable<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let _version = reader.read_u32()?;
        let script_list_offset = reader.read_u16()? as usize;
        let feature_list_offset = reader.read_u16()? as usize;
        let lookup_list_offset = reader.read_u16()? as usize;

        Ok(LayoutTable {
            script_list: reader.slice_at(script_list_offset)?,
            feature_list: reader.slice_at(feature_list_offset)?,
            lookup_list: reader.slice_at(lookup_list_offset)?,
        })
    }

    /// Resolve the language system for a script/language pair
    ///
    /// Missing script falls back to `DFLT`; missing language falls back to
    /// the script's default language system. `None` only when the table
    /// serves neither the script nor `DFLT`.
    pub fn select_lang_sys(&self, script: Tag, language: Tag) -> Option<LangSys> {
        let script_data = find_tagged_record(self.script_list, 2, script)
            .or_else(|| {
                tracing::debug!(script = %script, "script not in font, falling back to DFLT");
                find_tagged_record(self.script_list, 2, Tag::DEFAULT_SCRIPT)
            })?;

        let mut reader = FontReader::new(script_data);
        let default_lang_sys_offset = reader.read_u16().ok()? as usize;
        let lang_sys_data = find_tagged_record(script_data, 4, language)
            .or_else(|| {
                if default_lang_sys_offset == 0 {
                    return None;
                }
                FontReader::new(script_data).slice_at(default_lang_sys_offset).ok()
            })?;

        let mut ls = FontReader::new(lang_sys_data);
        let _lookup_order = ls.read_u16().ok()?;
        let required = ls.read_u16().ok()?;
        let count = ls.read_u16().ok()? as usize;
        let feature_indices = ls.read_array16(count).ok()?;
        Some(LangSys {
            required_feature: (required != 0xFFFF).then_some(required),
            feature_indices,
        })
    }

    /// Tag of the feature at a feature-list index
    pub fn feature_tag(&self, index: u16) -> Option<Tag> {
        let mut reader = FontReader::new(self.feature_list);
        let count = reader.read_u16().ok()?;
        if index >= count {
            return None;
        }
        reader.skip(index as usize * 6).ok()?;
        reader.read_tag().ok()
    }

    /// Lookup indices grouped under the feature at `index`
    pub fn feature_lookups(&self, index: u16) -> Option<Vec<u16>> {
        let mut reader = FontReader::new(self.feature_list);
        let count = reader.read_u16().ok()?;
        if index >= count {
            return None;
        }
        reader.skip(index as usize * 6 + 4).ok()?;
        let offset = reader.read_u16().ok()? as usize;

        let mut feature = FontReader::new(FontReader::new(self.feature_list).slice_at(offset).ok()?);
        let _params = feature.read_u16().ok()?;
        let lookup_count = feature.read_u16().ok()? as usize;
        feature.read_array16(lookup_count).ok()
    }

    /// Number of lookups in the lookup list
    pub fn lookup_count(&self) -> u16 {
        FontReader::new(self.lookup_list).read_u16().unwrap_or(0)
    }

    /// Parse the lookup at `index`
    ///
    /// `extension_kind` is the table's extension lookup type (7 for GSUB,
    /// 9 for GPOS); extension lookups are unwrapped to their wrapped kind
    /// and subtables here so callers never see the indirection.
    pub fn lookup(&self, index: u16, extension_kind: u16) -> Option<Lookup<'a>> {
        let mut reader = FontReader::new(self.lookup_list);
        let count = reader.read_u16().ok()?;
        if index >= count {
            return None;
        }
        reader.skip(index as usize * 2).ok()?;
        let lookup_offset = reader.read_u16().ok()? as usize;
        let lookup_data = FontReader::new(self.lookup_list).slice_at(lookup_offset).ok()?;

        let mut lr = FontReader::new(lookup_data);
        let mut kind = lr.read_u16().ok()?;
        let flag = LookupFlag(lr.read_u16().ok()?);
        let subtable_count = lr.read_u16().ok()? as usize;
        let subtable_offsets = lr.read_array16(subtable_count).ok()?;
        let mark_filtering_set = if flag.use_mark_filtering_set() {
            Some(lr.read_u16().ok()?)
        } else {
            None
        };

        let is_extension = kind == extension_kind;
        let mut subtables = Vec::with_capacity(subtable_count);
        for offset in subtable_offsets {
            let subtable = FontReader::new(lookup_data).slice_at(offset as usize).ok()?;
            if is_extension {
                let mut ext = FontReader::new(subtable);
                let format = ext.read_u16().ok()?;
                if format != 1 {
                    tracing::warn!(index, "unknown extension subtable format, skipping lookup");
                    return None;
                }
                let wrapped_kind = ext.read_u16().ok()?;
                let ext_offset = ext.read_u32().ok()? as usize;
                subtables.push(FontReader::new(subtable).slice_at(ext_offset).ok()?);
                kind = wrapped_kind;
            } else {
                subtables.push(subtable);
            }
        }

        // An extension lookup with no subtables never resolved a real kind.
        if kind == extension_kind {
            return None;
        }
        Some(Lookup { kind, flag, mark_filtering_set, subtables })
    }

}

/// Find a `(tag, offset16)` record in a list whose count sits right before
/// `records_start`, resolving the offset relative to the list start.
fn find_tagged_record(list: &[u8], records_start: usize, tag: Tag) -> Option<&[u8]> {
    let mut counter = FontReader::new(list);
    counter.skip(records_start - 2).ok()?;
    let count = counter.read_u16().ok()?;

    let mut r = FontReader::new(list);
    r.set_pos(records_start);
    for _ in 0..count {
        let record_tag = r.read_tag().ok()?;
        let offset = r.read_u16().ok()? as usize;
        if record_tag == tag {
            return FontReader::new(list).slice_at(offset).ok();
        }
    }
    None
}
