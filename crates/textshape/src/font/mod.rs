//! Font access
//!
//! `RawFace` is the capability the font-loading collaborator provides: raw
//! table bytes by tag. `Face` resolves the metrics-bearing tables once and
//! is shared read-only; `Font` binds a `Face` to a device scale plus
//! synthetic adjustments and owns the shape-plan cache.

pub mod cmap;
pub mod reader;

use crate::shape::plan::{PlanKey, ShapePlan};
use crate::tag::Tag;
use crate::{Result, ShapeError};
use cmap::Cmap;
use reader::FontReader;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Source of raw font table bytes
///
/// Implementations are read-only and shareable across threads.
pub trait RawFace: Sync {
    /// Raw bytes of the table with the given tag, if present
    fn table(&self, tag: Tag) -> Option<&[u8]>;
}

/// An OpenType table directory over a borrowed font file
///
/// Handles both single fonts and TrueType collections. Offsets are resolved
/// and bounds-checked once at parse time.
pub struct SfntFace<'a> {
    data: &'a [u8],
    tables: Vec<(Tag, usize, usize)>, // (tag, offset, length)
}

impl<'a> SfntFace<'a> {
    /// Parse the table directory of font number `index` in `data`
    pub fn parse(data: &'a [u8], index: u32) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let magic = reader.read_u32()?;

        let dir_offset = if magic == u32::from_be_bytes(*b"ttcf") {
            let _version = reader.read_u32()?;
            let num_fonts = reader.read_u32()?;
            if index >= num_fonts {
                return Err(ShapeError::MalformedFont);
            }
            reader.skip(index as usize * 4)?;
            reader.read_u32()? as usize
        } else {
            0
        };

        let mut dir = FontReader::new(data);
        dir.set_pos(dir_offset);
        let version = dir.read_u32()?;
        if version != 0x0001_0000
            && version != u32::from_be_bytes(*b"OTTO")
            && version != u32::from_be_bytes(*b"true")
        {
            return Err(ShapeError::MalformedFont);
        }

        let num_tables = dir.read_u16()?;
        let _search_range = dir.read_u16()?;
        let _entry_selector = dir.read_u16()?;
        let _range_shift = dir.read_u16()?;

        let mut tables = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            let tag = dir.read_tag()?;
            let _checksum = dir.read_u32()?;
            let offset = dir.read_u32()? as usize;
            let length = dir.read_u32()? as usize;
            if offset.checked_add(length).is_none_or(|end| end > data.len()) {
                return Err(ShapeError::MalformedFont);
            }
            tables.push((tag, offset, length));
        }
        Ok(SfntFace { data, tables })
    }
}

impl RawFace for SfntFace<'_> {
    fn table(&self, tag: Tag) -> Option<&[u8]> {
        self.tables
            .iter()
            .find(|&&(t, _, _)| t == tag)
            .map(|&(_, offset, length)| &self.data[offset..offset + length])
    }
}

const TAG_HEAD: Tag = Tag::from_bytes(b"head");
const TAG_MAXP: Tag = Tag::from_bytes(b"maxp");
const TAG_HHEA: Tag = Tag::from_bytes(b"hhea");
const TAG_HMTX: Tag = Tag::from_bytes(b"hmtx");
const TAG_CMAP: Tag = Tag::from_bytes(b"cmap");

/// Immutable shaping view over one font's tables
///
/// Borrows the raw face; missing or damaged metric tables degrade to
/// defaults with a diagnostic rather than failing construction.
pub struct Face<'a> {
    raw: &'a dyn RawFace,
    units_per_em: u16,
    glyph_count: u16,
    num_h_metrics: u16,
    cmap: Option<Cmap<'a>>,
    hmtx: Option<&'a [u8]>,
}

impl<'a> Face<'a> {
    /// Build a face over a raw table source
    pub fn new(raw: &'a dyn RawFace) -> Self {
        let units_per_em = raw
            .table(TAG_HEAD)
            .and_then(|head| {
                let mut r = FontReader::new(head);
                r.skip(18).ok()?;
                r.read_u16().ok()
            })
            .filter(|&upem| upem != 0)
            .unwrap_or_else(|| {
                tracing::warn!("head table missing or damaged, assuming 1000 units per em");
                1000
            });

        let glyph_count = raw
            .table(TAG_MAXP)
            .and_then(|maxp| {
                let mut r = FontReader::new(maxp);
                r.skip(4).ok()?;
                r.read_u16().ok()
            })
            .unwrap_or(0);

        let num_h_metrics = raw
            .table(TAG_HHEA)
            .and_then(|hhea| {
                let mut r = FontReader::new(hhea);
                r.skip(34).ok()?;
                r.read_u16().ok()
            })
            .unwrap_or(0);

        let cmap = raw.table(TAG_CMAP).and_then(|data| {
            Cmap::parse(data)
                .map_err(|_| tracing::warn!("cmap table unusable, all codepoints map to .notdef"))
                .ok()
        });

        Face {
            raw,
            units_per_em,
            glyph_count,
            num_h_metrics,
            cmap,
            hmtx: raw.table(TAG_HMTX),
        }
    }

    /// Design units per em
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Number of glyphs
    pub fn glyph_count(&self) -> u16 {
        self.glyph_count
    }

    /// Raw table bytes by tag
    pub fn table(&self, tag: Tag) -> Option<&'a [u8]> {
        self.raw.table(tag)
    }

    /// Glyph index of a codepoint, `None` when uncovered
    pub fn glyph_index(&self, codepoint: u32) -> Option<u16> {
        self.cmap.as_ref()?.glyph_index(codepoint)
    }

    /// Check character coverage
    pub fn has_codepoint(&self, c: char) -> bool {
        self.glyph_index(c as u32).is_some()
    }

    /// Horizontal advance in design units
    ///
    /// Glyphs past `numberOfHMetrics` reuse the last advance, per `hmtx`.
    pub fn glyph_h_advance(&self, glyph: u16) -> u16 {
        let Some(hmtx) = self.hmtx else { return 0 };
        if self.num_h_metrics == 0 {
            return 0;
        }
        let index = glyph.min(self.num_h_metrics - 1) as usize;
        let Some(bytes) = hmtx.get(index * 4..index * 4 + 2) else {
            return 0;
        };
        u16::from_be_bytes([bytes[0], bytes[1]])
    }
}

/// A face bound to a device scale, with the per-font plan cache
///
/// Shared by many buffers; all mutation is interior and thread-safe.
pub struct Font<'a> {
    face: &'a Face<'a>,
    x_scale: i32,
    y_scale: i32,
    slant: f32,
    embolden: i32,
    plan_cache: Mutex<HashMap<PlanKey, Arc<ShapePlan>>>,
}

impl<'a> Font<'a> {
    /// Bind a face to one scale for both axes
    pub fn create(face: &'a Face<'a>, scale: i32) -> Self {
        Self::new(face, scale, scale)
    }

    /// Bind a face to per-axis scales
    pub fn new(face: &'a Face<'a>, x_scale: i32, y_scale: i32) -> Self {
        Font {
            face,
            x_scale,
            y_scale,
            slant: 0.0,
            embolden: 0,
            plan_cache: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying face
    pub fn face(&self) -> &'a Face<'a> {
        self.face
    }

    /// Horizontal scale (device units per em)
    pub fn x_scale(&self) -> i32 {
        self.x_scale
    }

    /// Vertical scale (device units per em)
    pub fn y_scale(&self) -> i32 {
        self.y_scale
    }

    /// Synthetic slant as a horizontal shear ratio
    pub fn set_slant(&mut self, slant: f32) {
        self.slant = slant;
    }

    pub fn slant(&self) -> f32 {
        self.slant
    }

    /// Synthetic embolden strength, added to every advance in design units
    pub fn set_embolden(&mut self, embolden: i32) {
        self.embolden = embolden;
    }

    pub fn embolden(&self) -> i32 {
        self.embolden
    }

    /// Scale a design-unit value along x
    pub fn em_scale_x(&self, v: i32) -> i32 {
        em_scale(v, self.x_scale, self.face.units_per_em)
    }

    /// Scale a design-unit value along y
    pub fn em_scale_y(&self, v: i32) -> i32 {
        em_scale(v, self.y_scale, self.face.units_per_em)
    }

    /// Scaled horizontal advance, including synthetic embolden
    pub fn glyph_h_advance(&self, glyph: u16) -> i32 {
        self.em_scale_x(self.face.glyph_h_advance(glyph) as i32 + self.embolden)
    }

    /// Fetch or build the plan for a key
    pub(crate) fn shape_plan(
        &self,
        key: PlanKey,
        build: impl FnOnce() -> ShapePlan,
    ) -> Arc<ShapePlan> {
        let mut cache = match self.plan_cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.entry(key).or_insert_with(|| Arc::new(build())).clone()
    }
}

fn em_scale(v: i32, scale: i32, upem: u16) -> i32 {
    (v as i64 * scale as i64 / upem.max(1) as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TableMap(Vec<(Tag, Vec<u8>)>);

    impl RawFace for TableMap {
        fn table(&self, tag: Tag) -> Option<&[u8]> {
            self.0.iter().find(|(t, _)| *t == tag).map(|(_, d)| d.as_slice())
        }
    }

    fn head_table(upem: u16) -> Vec<u8> {
        let mut head = vec![0u8; 54];
        head[18..20].copy_from_slice(&upem.to_be_bytes());
        head
    }

    fn simple_face_tables() -> TableMap {
        let mut maxp = vec![0u8; 6];
        maxp[4..6].copy_from_slice(&4u16.to_be_bytes());
        let mut hhea = vec![0u8; 36];
        hhea[34..36].copy_from_slice(&2u16.to_be_bytes());
        // Two full metrics: advances 500 and 600.
        let mut hmtx = Vec::new();
        hmtx.extend_from_slice(&500u16.to_be_bytes());
        hmtx.extend_from_slice(&0u16.to_be_bytes());
        hmtx.extend_from_slice(&600u16.to_be_bytes());
        hmtx.extend_from_slice(&0u16.to_be_bytes());
        TableMap(vec![
            (TAG_HEAD, head_table(1000)),
            (TAG_MAXP, maxp),
            (TAG_HHEA, hhea),
            (TAG_HMTX, hmtx),
        ])
    }

    #[test]
    fn test_face_metrics() {
        let tables = simple_face_tables();
        let face = Face::new(&tables);
        assert_eq!(face.units_per_em(), 1000);
        assert_eq!(face.glyph_count(), 4);
        assert_eq!(face.glyph_h_advance(0), 500);
        assert_eq!(face.glyph_h_advance(1), 600);
        // Past numberOfHMetrics: last advance repeats.
        assert_eq!(face.glyph_h_advance(3), 600);
    }

    #[test]
    fn test_face_defaults_without_tables() {
        let tables = TableMap(Vec::new());
        let face = Face::new(&tables);
        assert_eq!(face.units_per_em(), 1000);
        assert_eq!(face.glyph_index('A' as u32), None);
        assert_eq!(face.glyph_h_advance(0), 0);
    }

    #[test]
    fn test_font_scaling() {
        let tables = simple_face_tables();
        let face = Face::new(&tables);
        let font = Font::create(&face, 2000);
        assert_eq!(font.glyph_h_advance(0), 1000); // 500 * 2000 / 1000
        let mut bold = Font::create(&face, 1000);
        bold.set_embolden(20);
        assert_eq!(bold.glyph_h_advance(0), 520);
    }

    #[test]
    fn test_sfnt_directory_parse() {
        // Directory with a single 4-byte table.
        let mut data = Vec::new();
        data.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        data.extend_from_slice(&1u16.to_be_bytes()); // numTables
        data.extend_from_slice(&[0u8; 6]); // binary-search fields
        data.extend_from_slice(b"test");
        data.extend_from_slice(&0u32.to_be_bytes()); // checksum
        data.extend_from_slice(&28u32.to_be_bytes()); // offset
        data.extend_from_slice(&4u32.to_be_bytes()); // length
        data.extend_from_slice(&[1, 2, 3, 4]);

        let sfnt = SfntFace::parse(&data, 0).unwrap();
        assert_eq!(sfnt.table(Tag::from_bytes(b"test")), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(sfnt.table(Tag::from_bytes(b"none")), None);
    }

    #[test]
    fn test_sfnt_rejects_bad_offsets() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&[0u8; 6]);
        data.extend_from_slice(b"test");
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&9999u32.to_be_bytes());
        data.extend_from_slice(&4u32.to_be_bytes());
        assert!(SfntFace::parse(&data, 0).is_err());
    }
}
