//! Shaping buffer
//!
//! The mutable sequence-of-items structure text flows through: raw
//! codepoints in, positioned glyphs out. A content-type tag gates which
//! operations are legal at each stage, so misuse surfaces as a typed error
//! instead of silently reinterpreted data.

use crate::direction::Direction;
use crate::language::Language;
use crate::script::Script;
use crate::unicode;
use crate::{Result, ShapeError};

/// What the buffer currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// No items yet
    #[default]
    Empty,
    /// Unicode codepoints, pre-shaping
    Unicode,
    /// Glyph indices and positions, post-shaping
    Glyphs,
    /// An operation was rejected; contents are unusable
    Invalid,
}

/// Granularity of cluster values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterLevel {
    /// Monotone clusters, grapheme-sized merging
    #[default]
    MonotoneGraphemes,
    /// Monotone clusters, one per character
    MonotoneCharacters,
    /// Raw character indices, never merged across characters
    Characters,
}

/// One item in the buffer
///
/// Before substitution `codepoint` is a Unicode scalar value; afterwards it
/// is a glyph index. `cluster` tracks the original logical position;
/// `mask` carries per-glyph feature bits assigned at planning time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphInfo {
    pub codepoint: u32,
    pub cluster: u32,
    pub mask: u32,
}

/// Position of one output glyph, in scaled font units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphPosition {
    pub x_advance: i32,
    pub y_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

/// Replacement for invalid input codepoints
pub const REPLACEMENT_CODEPOINT: char = '\u{FFFD}';

/// Text-in-flight between the caller and the shaper
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    content_type: ContentType,
    pub(crate) infos: Vec<GlyphInfo>,
    pub(crate) positions: Vec<GlyphPosition>,
    direction: Option<Direction>,
    script: Option<Script>,
    language: Option<Language>,
    cluster_level: ClusterLevel,
    replacement: char,
}

impl Buffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Buffer {
            replacement: REPLACEMENT_CODEPOINT,
            ..Default::default()
        }
    }

    /// Current content type
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Check if there are no items
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Reserve capacity ahead of `add_str`
    pub fn pre_allocate(&mut self, size: usize) {
        if size > self.infos.len() {
            self.infos.reserve(size - self.infos.len());
        }
    }

    /// Append text; clusters are assigned sequential character indices
    /// continuing from the items already present.
    pub fn add_str(&mut self, text: &str) -> Result<()> {
        self.check_can_add()?;
        let base = self.infos.len() as u32;
        for (i, c) in text.chars().enumerate() {
            self.infos.push(GlyphInfo {
                codepoint: c as u32,
                cluster: base + i as u32,
                mask: 0,
            });
        }
        if !self.infos.is_empty() {
            self.content_type = ContentType::Unicode;
        }
        Ok(())
    }

    /// Append a window of a codepoint array
    ///
    /// Clusters are indices into `codepoints`, so surrounding context keeps
    /// its logical positions. Values that are not Unicode scalars become the
    /// replacement codepoint.
    pub fn add_codepoints(
        &mut self,
        codepoints: &[u32],
        item_offset: usize,
        item_length: usize,
    ) -> Result<()> {
        self.check_can_add()?;
        let end = item_offset
            .checked_add(item_length)
            .filter(|&e| e <= codepoints.len())
            .ok_or(ShapeError::InvalidOperation("item window exceeds codepoint slice"))?;
        for (i, &cp) in codepoints[item_offset..end].iter().enumerate() {
            let valid = char::from_u32(cp).map(|c| c as u32).unwrap_or(self.replacement as u32);
            self.infos.push(GlyphInfo {
                codepoint: valid,
                cluster: (item_offset + i) as u32,
                mask: 0,
            });
        }
        if !self.infos.is_empty() {
            self.content_type = ContentType::Unicode;
        }
        Ok(())
    }

    fn check_can_add(&mut self) -> Result<()> {
        match self.content_type {
            ContentType::Empty | ContentType::Unicode => Ok(()),
            _ => {
                self.content_type = ContentType::Invalid;
                Err(ShapeError::InvalidOperation("cannot add text to a shaped or invalid buffer"))
            }
        }
    }

    /// Set the layout direction
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = Some(direction);
    }

    /// Set the script
    pub fn set_script(&mut self, script: Script) {
        self.script = Some(script);
    }

    /// Set the language system
    pub fn set_language(&mut self, language: Language) {
        self.language = Some(language);
    }

    /// Direction, if set or guessed
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Script, if set or guessed
    pub fn script(&self) -> Option<Script> {
        self.script
    }

    /// Language, if set or guessed
    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// Set cluster merging granularity
    pub fn set_cluster_level(&mut self, level: ClusterLevel) {
        self.cluster_level = level;
    }

    /// Cluster merging granularity
    pub fn cluster_level(&self) -> ClusterLevel {
        self.cluster_level
    }

    /// Set the replacement codepoint used for invalid input
    pub fn set_replacement_codepoint(&mut self, replacement: char) {
        self.replacement = replacement;
    }

    /// Fill in direction, script and language that are still unset, from
    /// the buffer contents and the environment.
    ///
    /// Script comes from the first codepoint with a real script; direction
    /// from the script's horizontal direction; language from `LANG` when
    /// available.
    pub fn guess_segment_properties(&mut self) -> Result<()> {
        match self.content_type {
            ContentType::Empty | ContentType::Unicode => {}
            _ => return Err(ShapeError::InvalidOperation("cannot guess properties of shaped buffer")),
        }

        if self.script.is_none() {
            let script = self
                .infos
                .iter()
                .filter_map(|info| char::from_u32(info.codepoint))
                .map(Script::of)
                .find(|s| !matches!(s, Script::Common | Script::Inherited))
                .unwrap_or(Script::Common);
            self.script = Some(script);
        }
        if self.direction.is_none() {
            let script = self.script.unwrap_or_default();
            self.direction = Some(script.horizontal_direction());
        }
        if self.language.is_none() {
            self.language = Some(Language::from_env().unwrap_or_default());
        }
        Ok(())
    }

    /// Reverse item order in place
    pub fn reverse(&mut self) {
        let len = self.infos.len();
        self.reverse_range(0, len);
    }

    /// Reverse a sub-range of items in place
    pub fn reverse_range(&mut self, start: usize, end: usize) {
        let end = end.min(self.infos.len());
        if start >= end {
            return;
        }
        self.infos[start..end].reverse();
        if !self.positions.is_empty() {
            self.positions[start..end].reverse();
        }
    }

    /// Clear items and segment properties, back to a fresh buffer
    pub fn reset(&mut self) {
        self.clear_contents();
        self.direction = None;
        self.script = None;
        self.language = None;
        self.cluster_level = ClusterLevel::default();
        self.replacement = REPLACEMENT_CODEPOINT;
    }

    /// Clear items but keep segment properties for the next run
    pub fn clear_contents(&mut self) {
        self.infos.clear();
        self.positions.clear();
        self.content_type = ContentType::Empty;
    }

    /// Glyph records; meaningful after shaping, codepoints before
    pub fn glyph_infos(&self) -> &[GlyphInfo] {
        &self.infos
    }

    /// Glyph positions; empty until shaping has run
    pub fn glyph_positions(&self) -> &[GlyphPosition] {
        &self.positions
    }

    /// Sum of advances along the main axis
    pub fn total_advance(&self) -> i32 {
        let vertical = self.direction.is_some_and(Direction::is_vertical);
        self.positions
            .iter()
            .map(|p| if vertical { p.y_advance } else { p.x_advance })
            .sum()
    }

    // ---- internal, used by the shaping pipeline ----

    pub(crate) fn set_content_type(&mut self, ct: ContentType) {
        self.content_type = ct;
    }

    /// Overwrite every item's mask
    pub(crate) fn reset_masks(&mut self, mask: u32) {
        for info in &mut self.infos {
            info.mask = mask;
        }
    }

    /// OR `mask` into every item whose cluster lies in `[start, end)`
    pub(crate) fn set_masks(&mut self, mask: u32, start: u32, end: u32) {
        for info in &mut self.infos {
            if start <= info.cluster && info.cluster < end {
                info.mask |= mask;
            }
        }
    }

    /// Set or clear `mask` over a cluster range
    pub(crate) fn update_masks(&mut self, mask: u32, on: bool, start: u32, end: u32) {
        for info in &mut self.infos {
            if start <= info.cluster && info.cluster < end {
                if on {
                    info.mask |= mask;
                } else {
                    info.mask &= !mask;
                }
            }
        }
    }

    /// Merge the clusters of items `[start, end)` to their minimum
    ///
    /// With `ClusterLevel::Characters` clusters are left untouched.
    pub(crate) fn merge_clusters(&mut self, start: usize, end: usize) {
        if matches!(self.cluster_level, ClusterLevel::Characters) {
            return;
        }
        let end = end.min(self.infos.len());
        if start + 1 >= end {
            return;
        }
        let min = self.infos[start..end]
            .iter()
            .map(|i| i.cluster)
            .min()
            .unwrap_or(0);
        for info in &mut self.infos[start..end] {
            info.cluster = min;
        }
    }

    /// Delete default-ignorable codepoints still in Unicode form
    pub(crate) fn remove_default_ignorables(&mut self) {
        self.infos.retain(|info| {
            char::from_u32(info.codepoint).is_none_or(|c| !unicode::is_default_ignorable(c))
        });
    }
}
