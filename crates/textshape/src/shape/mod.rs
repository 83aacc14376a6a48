//! The shaping pipeline
//!
//! `shape` is the crate's main entry point. One call takes a buffer of
//! codepoints through planning, normalization, script-specific
//! preprocessing, glyph mapping, substitution and positioning, leaving
//! positioned glyphs behind. Damaged layout data degrades stage by stage
//! instead of failing the call.

pub mod arabic;
pub mod indic;
pub mod normalize;
pub mod plan;
pub mod position;
pub mod substitute;

use crate::buffer::{Buffer, ContentType};
use crate::direction::Direction;
use crate::feature::Feature;
use crate::font::Font;
use crate::ot::gdef::Gdef;
use crate::ot::gpos::GposTable;
use crate::ot::gsub::GsubTable;
use crate::tag::Tag;
use crate::unicode;
use crate::{Result, ShapeError};
use plan::{PlanKey, ShapePlan, ShaperKind};

/// Script-specific hooks into the pipeline
///
/// A shaper sees the buffer twice: once in codepoint form before glyph
/// mapping (to reorder or tag forms) and once after all lookups ran.
trait ScriptShaper {
    /// Adjust masks or reorder codepoints before glyph mapping
    fn preprocess(&self, _plan: &ShapePlan, _buffer: &mut Buffer) {}

    /// Touch up the shaped result
    fn postprocess(&self, _plan: &ShapePlan, _buffer: &mut Buffer) {}
}

struct DefaultShaper;

impl ScriptShaper for DefaultShaper {}

struct ArabicShaper;

impl ScriptShaper for ArabicShaper {
    fn preprocess(&self, plan: &ShapePlan, buffer: &mut Buffer) {
        arabic::assign_joining_masks(plan, buffer);
    }
}

struct IndicShaper;

impl ScriptShaper for IndicShaper {
    fn preprocess(&self, _plan: &ShapePlan, buffer: &mut Buffer) {
        if let Some(script) = buffer.script() {
            indic::reorder(script, buffer);
        }
    }
}

fn shaper_for(kind: ShaperKind) -> &'static dyn ScriptShaper {
    match kind {
        ShaperKind::Default => &DefaultShaper,
        ShaperKind::Arabic => &ArabicShaper,
        ShaperKind::Indic => &IndicShaper,
    }
}

/// Shape the buffer's text with the font
///
/// On return the buffer holds glyph indices with positions; item order is
/// visual for backward directions. Segment properties not set by the
/// caller are guessed from the content.
pub fn shape(font: &Font<'_>, buffer: &mut Buffer, features: &[Feature]) -> Result<()> {
    match buffer.content_type() {
        ContentType::Empty => {
            // Nothing to shape; an empty glyph run is a valid result.
            buffer.set_content_type(ContentType::Glyphs);
            return Ok(());
        }
        ContentType::Unicode => {}
        _ => return Err(ShapeError::InvalidOperation("buffer does not hold unshaped text")),
    }

    buffer.guess_segment_properties()?;
    let direction = buffer.direction().unwrap_or_default();
    let script = buffer.script().unwrap_or_default();
    let language = buffer.language().unwrap_or_default();

    let key = PlanKey { direction, script, language, features: features.to_vec() };
    let face = font.face();
    let plan = font.shape_plan(key.clone(), || ShapePlan::build(face, &key));

    let gsub = face.table(Tag::GSUB).and_then(|data| GsubTable::parse(data).ok());
    let gpos = face.table(Tag::GPOS).and_then(|data| GposTable::parse(data).ok());
    let gdef = face
        .table(Tag::GDEF)
        .and_then(|data| {
            Gdef::parse(data)
                .map_err(|_| tracing::warn!("GDEF unusable, lookups will not skip glyphs"))
                .ok()
        })
        .unwrap_or_default();

    tracing::debug!(
        ?direction,
        ?script,
        glyphs = buffer.len(),
        gsub = gsub.is_some(),
        gpos = gpos.is_some(),
        "shaping run"
    );

    normalize::normalize(face, buffer);

    // Feature masks: the global bit everywhere, then each requested
    // feature's timeline over its cluster ranges.
    buffer.reset_masks(plan.global_mask);
    for feature in &plan.mask_features {
        for &(value, start, end) in &feature.settings {
            buffer.update_masks(feature.mask, value != 0, start, end);
        }
    }

    let shaper = shaper_for(plan.shaper);
    shaper.preprocess(&plan, buffer);

    if direction == Direction::RightToLeft {
        mirror_codepoints(face, buffer);
    }
    buffer.remove_default_ignorables();

    map_glyphs(face, buffer);

    if let Some(gsub) = &gsub {
        substitute::substitute(gsub, &gdef, &plan, buffer);
    }

    position::position(font, gpos.as_ref(), &gdef, &plan, direction, buffer);

    shaper.postprocess(&plan, buffer);

    if direction.is_backward() {
        buffer.reverse();
    }
    apply_slant(font, buffer);

    buffer.set_content_type(ContentType::Glyphs);
    Ok(())
}

/// Swap paired characters (brackets, guillemets) for right-to-left runs
///
/// Only swaps when the font covers the mirrored character, so text never
/// loses a glyph to mirroring.
fn mirror_codepoints(face: &crate::font::Face<'_>, buffer: &mut Buffer) {
    for info in &mut buffer.infos {
        let mirrored = char::from_u32(info.codepoint)
            .and_then(unicode::mirror)
            .filter(|&m| face.has_codepoint(m));
        if let Some(m) = mirrored {
            info.codepoint = m as u32;
        }
    }
}

/// Replace codepoints with glyph indices; uncovered codepoints and C0
/// controls map to glyph 0 (.notdef) and keep their cluster
fn map_glyphs(face: &crate::font::Face<'_>, buffer: &mut Buffer) {
    for info in &mut buffer.infos {
        info.codepoint = if info.codepoint < 0x20 {
            0
        } else {
            face.glyph_index(info.codepoint).unwrap_or(0) as u32
        };
    }
}

/// Shear offsets horizontally for synthetic oblique rendering
fn apply_slant(font: &Font<'_>, buffer: &mut Buffer) {
    let slant = font.slant();
    if slant == 0.0 {
        return;
    }
    for pos in &mut buffer.positions {
        pos.x_offset += (pos.y_offset as f32 * slant) as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{Face, RawFace};

    struct BareFace;

    impl RawFace for BareFace {
        fn table(&self, _tag: Tag) -> Option<&[u8]> {
            None
        }
    }

    #[test]
    fn test_empty_buffer_shapes_to_empty_glyphs() {
        let raw = BareFace;
        let face = Face::new(&raw);
        let font = Font::create(&face, 1000);
        let mut buf = Buffer::new();
        shape(&font, &mut buf, &[]).unwrap();
        assert_eq!(buf.content_type(), ContentType::Glyphs);
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.total_advance(), 0);
    }

    #[test]
    fn test_shaping_twice_is_rejected() {
        let raw = BareFace;
        let face = Face::new(&raw);
        let font = Font::create(&face, 1000);
        let mut buf = Buffer::new();
        buf.add_str("hi").unwrap();
        shape(&font, &mut buf, &[]).unwrap();
        assert!(matches!(
            shape(&font, &mut buf, &[]),
            Err(ShapeError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_uncovered_text_maps_to_notdef_with_clusters() {
        let raw = BareFace;
        let face = Face::new(&raw);
        let font = Font::create(&face, 1000);
        let mut buf = Buffer::new();
        buf.add_str("ab").unwrap();
        shape(&font, &mut buf, &[]).unwrap();
        assert_eq!(buf.len(), 2);
        for (i, info) in buf.glyph_infos().iter().enumerate() {
            assert_eq!(info.codepoint, 0);
            assert_eq!(info.cluster, i as u32);
        }
        assert_eq!(buf.glyph_positions().len(), 2);
    }

    #[test]
    fn test_rtl_output_is_reversed() {
        let raw = BareFace;
        let face = Face::new(&raw);
        let font = Font::create(&face, 1000);
        let mut buf = Buffer::new();
        buf.add_str("\u{05D0}\u{05D1}").unwrap(); // alef, bet
        shape(&font, &mut buf, &[]).unwrap();
        let clusters: Vec<u32> = buf.glyph_infos().iter().map(|i| i.cluster).collect();
        assert_eq!(clusters, [1, 0]);
    }

    #[test]
    fn test_reset_then_reshape() {
        let raw = BareFace;
        let face = Face::new(&raw);
        let font = Font::create(&face, 1000);
        let mut buf = Buffer::new();
        buf.add_str("a").unwrap();
        shape(&font, &mut buf, &[]).unwrap();
        buf.reset();
        buf.add_str("a").unwrap();
        shape(&font, &mut buf, &[]).unwrap();
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.content_type(), ContentType::Glyphs);
    }
}
