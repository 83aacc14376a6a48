//! Shape planning
//!
//! A plan resolves, once per `(direction, script, language, features)` key,
//! which lookups run in what order and which per-glyph mask bit gates each
//! feature. Plans cache on the owning `Font` and are reused across buffers.

use crate::direction::Direction;
use crate::feature::Feature;
use crate::font::Face;
use crate::language::Language;
use crate::ot::gpos::GposTable;
use crate::ot::gsub::GsubTable;
use crate::ot::layout::LayoutTable;
use crate::script::Script;
use crate::tag::Tag;

/// Mask bit carried by every glyph a global feature applies to
pub const GLOBAL_MASK: u32 = 0x0000_0001;

/// Arabic positional-form feature tags, in mask-slot order
pub const ARABIC_FORM_TAGS: [Tag; 4] = [
    Tag::from_bytes(b"isol"),
    Tag::from_bytes(b"fina"),
    Tag::from_bytes(b"medi"),
    Tag::from_bytes(b"init"),
];

/// Which script family drives shaping for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaperKind {
    Default,
    Arabic,
    Indic,
}

impl ShaperKind {
    pub fn of(script: Script) -> Self {
        if script.uses_joining() {
            ShaperKind::Arabic
        } else if script.is_indic() {
            ShaperKind::Indic
        } else {
            ShaperKind::Default
        }
    }
}

/// Cache key; one plan per distinct key per font
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey {
    pub direction: Direction,
    pub script: Script,
    pub language: Language,
    pub features: Vec<Feature>,
}

/// One lookup scheduled for execution
#[derive(Debug, Clone, Copy)]
pub struct PlannedLookup {
    pub index: u16,
    /// Glyphs participate when `info.mask & mask != 0`
    pub mask: u32,
    /// Feature value, consumed by alternate substitution
    pub alt_value: u32,
}

/// A feature that needs its own mask bit, with its value timeline
#[derive(Debug, Clone)]
pub struct MaskFeature {
    pub mask: u32,
    /// `(value, start, end)` in request order; later entries override
    pub settings: Vec<(u32, u32, u32)>,
}

/// The resolved execution plan for one key
pub struct ShapePlan {
    pub shaper: ShaperKind,
    pub global_mask: u32,
    /// Features gated by their own bit over cluster ranges
    pub mask_features: Vec<MaskFeature>,
    /// Mask bits of isol/fina/medi/init, zero outside joining scripts
    pub arabic_masks: [u32; 4],
    pub gsub_lookups: Vec<PlannedLookup>,
    pub gpos_lookups: Vec<PlannedLookup>,
}

/// A feature request accumulated during planning
struct PlannedFeature {
    tag: Tag,
    /// Per-glyph features get a bit even when global; the shaper decides
    /// glyph by glyph (Arabic forms).
    per_glyph: bool,
    settings: Vec<(u32, u32, u32)>,
    /// Assigned at mask-allocation time; 0 for inactive features
    mask: u32,
    alt_value: u32,
}

struct FeatureCollector {
    features: Vec<PlannedFeature>,
}

impl FeatureCollector {
    fn new() -> Self {
        FeatureCollector { features: Vec::new() }
    }

    fn add_global(&mut self, tag: &[u8; 4]) {
        self.push(Feature::enable(Tag::from_bytes(tag)), false);
    }

    fn add_per_glyph(&mut self, tag: Tag) {
        self.push(Feature { tag, value: 1, start: 0, end: u32::MAX }, true);
    }

    fn push(&mut self, feature: Feature, per_glyph: bool) {
        let setting = (feature.value, feature.start, feature.end);
        match self.features.iter_mut().find(|f| f.tag == feature.tag) {
            Some(existing) => {
                existing.per_glyph |= per_glyph;
                if feature.is_global() {
                    // A global request supersedes the whole prior timeline.
                    existing.settings.retain(|&(_, s, e)| !(s == 0 && e == u32::MAX));
                }
                existing.settings.push(setting);
            }
            None => self.features.push(PlannedFeature {
                tag: feature.tag,
                per_glyph,
                settings: vec![setting],
                mask: 0,
                alt_value: 1,
            }),
        }
    }
}

impl ShapePlan {
    /// Build a plan against a face's layout tables
    pub fn build(face: &Face<'_>, key: &PlanKey) -> Self {
        let shaper = ShaperKind::of(key.script);
        let mut collector = FeatureCollector::new();

        // Composition and localized forms precede everything else.
        collector.add_global(b"ccmp");
        collector.add_global(b"locl");

        match shaper {
            ShaperKind::Arabic => {
                for tag in ARABIC_FORM_TAGS {
                    collector.add_per_glyph(tag);
                }
                for tag in [b"rlig", b"calt", b"liga", b"mset"] {
                    collector.add_global(tag);
                }
            }
            ShaperKind::Indic => {
                for tag in [
                    b"nukt", b"akhn", b"rphf", b"rkrf", b"blwf", b"half", b"pstf", b"vatu",
                    b"cjct", b"pres", b"abvs", b"blws", b"psts", b"haln", b"calt", b"liga",
                ] {
                    collector.add_global(tag);
                }
            }
            ShaperKind::Default => {
                for tag in [b"liga", b"clig", b"calt"] {
                    collector.add_global(tag);
                }
            }
        }

        if key.direction == Direction::RightToLeft {
            collector.add_global(b"rtlm");
        }
        if key.direction.is_vertical() {
            collector.add_global(b"vert");
        }

        // Positioning defaults.
        collector.add_global(b"kern");
        collector.add_global(b"dist");
        collector.add_global(b"mark");
        collector.add_global(b"mkmk");
        if shaper == ShaperKind::Arabic {
            collector.add_global(b"curs");
        }
        if shaper == ShaperKind::Indic {
            collector.add_global(b"abvm");
            collector.add_global(b"blwm");
        }

        // User requests merge last; within one tag, later entries win.
        for feature in &key.features {
            collector.push(*feature, false);
        }

        // Mask allocation.
        let mut next_bit: u32 = GLOBAL_MASK << 1;
        let mut mask_features = Vec::new();
        let mut arabic_masks = [0u32; 4];
        for f in &mut collector.features {
            let all_global = f.settings.iter().all(|&(_, s, e)| s == 0 && e == u32::MAX);
            let last_value = f.settings.last().map(|&(v, _, _)| v).unwrap_or(0);
            if f.per_glyph || !all_global {
                if next_bit == 0 {
                    tracing::warn!(tag = %f.tag, "out of mask bits, applying feature globally");
                    f.mask = GLOBAL_MASK;
                } else {
                    f.mask = next_bit;
                    next_bit = next_bit.checked_shl(1).unwrap_or(0);
                }
                if !f.per_glyph {
                    mask_features.push(MaskFeature { mask: f.mask, settings: f.settings.clone() });
                }
                if let Some(slot) = ARABIC_FORM_TAGS.iter().position(|&t| t == f.tag) {
                    arabic_masks[slot] = f.mask;
                }
            } else if last_value > 0 {
                f.mask = GLOBAL_MASK;
            } // value 0: feature disabled, mask stays 0
            f.alt_value = last_value.max(1);
        }

        // Lookup resolution per table.
        let gsub_lookups = face
            .table(Tag::GSUB)
            .and_then(|data| GsubTable::parse(data).ok())
            .map(|t| resolve_lookups(&t.layout, key, &collector.features))
            .unwrap_or_default();
        let gpos_lookups = face
            .table(Tag::GPOS)
            .and_then(|data| GposTable::parse(data).ok())
            .map(|t| resolve_lookups(&t.layout, key, &collector.features))
            .unwrap_or_default();

        ShapePlan {
            shaper,
            global_mask: GLOBAL_MASK,
            mask_features,
            arabic_masks,
            gsub_lookups,
            gpos_lookups,
        }
    }
}

fn resolve_lookups(
    layout: &LayoutTable<'_>,
    key: &PlanKey,
    features: &[PlannedFeature],
) -> Vec<PlannedLookup> {
    let Some(lang_sys) = layout.select_lang_sys(key.script.tag(), key.language.tag()) else {
        tracing::debug!(script = %key.script.tag(), "no applicable script in layout table");
        return Vec::new();
    };

    // lookup index -> (mask, alt_value)
    let mut planned: Vec<(u16, u32, u32)> = Vec::new();
    let mut add = |index: u16, mask: u32, alt_value: u32| {
        match planned.iter_mut().find(|(i, _, _)| *i == index) {
            Some((_, m, v)) => {
                *m |= mask;
                *v = (*v).max(alt_value);
            }
            None => planned.push((index, mask, alt_value)),
        }
    };

    let mut indices = lang_sys.feature_indices.clone();
    if let Some(required) = lang_sys.required_feature {
        indices.insert(0, required);
    }
    for feature_index in indices {
        let Some(tag) = layout.feature_tag(feature_index) else { continue };
        let entry = features.iter().find(|f| f.tag == tag);
        let (mask, alt_value) = match entry {
            Some(f) if f.mask != 0 => (f.mask, f.alt_value),
            // Required features run even when unrequested.
            None if Some(feature_index) == lang_sys.required_feature => (GLOBAL_MASK, 1),
            _ => continue,
        };
        for lookup_index in layout.feature_lookups(feature_index).unwrap_or_default() {
            add(lookup_index, mask, alt_value);
        }
    }

    planned.sort_by_key(|&(index, _, _)| index);
    planned
        .into_iter()
        .map(|(index, mask, alt_value)| PlannedLookup { index, mask, alt_value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shaper_selection() {
        assert_eq!(ShaperKind::of(Script::Arabic), ShaperKind::Arabic);
        assert_eq!(ShaperKind::of(Script::Syriac), ShaperKind::Arabic);
        assert_eq!(ShaperKind::of(Script::Devanagari), ShaperKind::Indic);
        assert_eq!(ShaperKind::of(Script::Latin), ShaperKind::Default);
        assert_eq!(ShaperKind::of(Script::Common), ShaperKind::Default);
    }

    #[test]
    fn test_collector_later_global_wins() {
        let mut c = FeatureCollector::new();
        c.add_global(b"liga");
        c.push(Feature::disable(Tag::from_bytes(b"liga")), false);
        let f = &c.features[0];
        assert_eq!(f.settings, vec![(0, 0, u32::MAX)]);
    }

    #[test]
    fn test_collector_ranged_setting_appends() {
        let mut c = FeatureCollector::new();
        c.add_global(b"liga");
        c.push("liga=0=2:4".parse().unwrap(), false);
        let f = &c.features[0];
        assert_eq!(f.settings.len(), 2);
        assert_eq!(f.settings[1], (0, 2, 4));
    }
}
