//! textshape - OpenType Text Shaping Engine
//!
//! This crate converts Unicode text plus a font's layout tables into a
//! positioned glyph stream:
//! - Buffer management (text input, segment properties, glyph output)
//! - Script itemization into shapeable runs
//! - OpenType table access (cmap, GSUB, GPOS, GDEF, metrics)
//! - Shaping pipeline (planning, normalization, substitution, positioning)
//! - Script-specific shapers (Arabic joining, Indic reordering)

pub mod buffer;
pub mod direction;
pub mod feature;
pub mod font;
pub mod language;
pub mod ot;
pub mod script;
pub mod segment;
pub mod shape;
pub mod tag;
pub mod unicode;

pub use buffer::{Buffer, ClusterLevel, ContentType, GlyphInfo, GlyphPosition};
pub use direction::Direction;
pub use feature::Feature;
pub use font::{Face, Font, RawFace, SfntFace};
pub use language::Language;
pub use script::Script;
pub use segment::{ScriptRun, ScriptSegmenter};
pub use shape::shape;
pub use tag::Tag;

/// Shaping error types
///
/// API misuse is loud and typed. Damaged font data is not an error at this
/// level: the engine degrades to identity shaping per rule or table and
/// reports through `tracing` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    #[error("malformed font data")]
    MalformedFont,
}

pub type Result<T> = std::result::Result<T, ShapeError>;
