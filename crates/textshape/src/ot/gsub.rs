//! Glyph substitution table (`GSUB`)
//!
//! Typed views over the eight substitution lookup types. Parsing stops at
//! structure; applying rules against a buffer (with skip rules and nested
//! lookups) lives in the shaping engine.

use super::common::{ChainContextSubtable, ContextSubtable, Coverage};
use super::layout::{LayoutTable, Lookup};
use crate::font::reader::FontReader;
use crate::{Result, ShapeError};

/// GSUB lookup types
pub const LOOKUP_SINGLE: u16 = 1;
pub const LOOKUP_MULTIPLE: u16 = 2;
pub const LOOKUP_ALTERNATE: u16 = 3;
pub const LOOKUP_LIGATURE: u16 = 4;
pub const LOOKUP_CONTEXT: u16 = 5;
pub const LOOKUP_CHAIN_CONTEXT: u16 = 6;
pub const LOOKUP_EXTENSION: u16 = 7;
pub const LOOKUP_REVERSE_CHAIN_SINGLE: u16 = 8;

/// Parsed GSUB header
pub struct GsubTable<'a> {
    pub layout: LayoutTable<'a>,
}

impl<'a> GsubTable<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        Ok(GsubTable { layout: LayoutTable::parse(data)? })
    }

    /// Lookup with extension indirection already unwrapped
    pub fn lookup(&self, index: u16) -> Option<Lookup<'a>> {
        self.layout.lookup(index, LOOKUP_EXTENSION)
    }
}

/// Type 1: one glyph replaces another
#[derive(Debug, Clone)]
pub enum SingleSubst {
    Delta { coverage: Coverage, delta: i16 },
    Array { coverage: Coverage, substitutes: Vec<u16> },
}

impl SingleSubst {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        let coverage_offset = reader.read_u16()? as usize;
        let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;
        match format {
            1 => {
                let delta = reader.read_i16()?;
                Ok(SingleSubst::Delta { coverage, delta })
            }
            2 => {
                let count = reader.read_u16()? as usize;
                let substitutes = reader.read_array16(count)?;
                Ok(SingleSubst::Array { coverage, substitutes })
            }
            _ => Err(ShapeError::MalformedFont),
        }
    }

    /// Substitute for `glyph`, if covered
    pub fn apply(&self, glyph: u16) -> Option<u16> {
        match self {
            SingleSubst::Delta { coverage, delta } => {
                coverage.get(glyph)?;
                Some((glyph as i32 + *delta as i32) as u16)
            }
            SingleSubst::Array { coverage, substitutes } => {
                let index = coverage.get(glyph)?;
                substitutes.get(index as usize).copied()
            }
        }
    }
}

/// Type 2: one glyph becomes a sequence
#[derive(Debug, Clone)]
pub struct MultipleSubst {
    coverage: Coverage,
    sequences: Vec<Vec<u16>>,
}

impl MultipleSubst {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        if format != 1 {
            return Err(ShapeError::MalformedFont);
        }
        let coverage_offset = reader.read_u16()? as usize;
        let count = reader.read_u16()? as usize;
        let offsets = reader.read_array16(count)?;
        let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;

        let mut sequences = Vec::with_capacity(count);
        for offset in offsets {
            let mut seq = FontReader::new(FontReader::new(data).slice_at(offset as usize)?);
            let glyph_count = seq.read_u16()? as usize;
            sequences.push(seq.read_array16(glyph_count)?);
        }
        Ok(MultipleSubst { coverage, sequences })
    }

    /// Replacement sequence for `glyph`, if covered
    pub fn apply(&self, glyph: u16) -> Option<&[u16]> {
        let index = self.coverage.get(glyph)?;
        self.sequences.get(index as usize).map(Vec::as_slice)
    }
}

/// Type 3: one glyph has selectable alternates
#[derive(Debug, Clone)]
pub struct AlternateSubst {
    coverage: Coverage,
    sets: Vec<Vec<u16>>,
}

impl AlternateSubst {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        if format != 1 {
            return Err(ShapeError::MalformedFont);
        }
        let coverage_offset = reader.read_u16()? as usize;
        let count = reader.read_u16()? as usize;
        let offsets = reader.read_array16(count)?;
        let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;

        let mut sets = Vec::with_capacity(count);
        for offset in offsets {
            let mut set = FontReader::new(FontReader::new(data).slice_at(offset as usize)?);
            let glyph_count = set.read_u16()? as usize;
            sets.push(set.read_array16(glyph_count)?);
        }
        Ok(AlternateSubst { coverage, sets })
    }

    /// The `value`-th alternate (1-based, per feature value conventions)
    pub fn apply(&self, glyph: u16, value: u32) -> Option<u16> {
        let index = self.coverage.get(glyph)?;
        let set = self.sets.get(index as usize)?;
        let choice = (value.max(1) as usize - 1).min(set.len().saturating_sub(1));
        set.get(choice).copied()
    }
}

/// One ligature rule: first component is implied by coverage
#[derive(Debug, Clone)]
pub struct Ligature {
    pub glyph: u16,
    /// Components after the first
    pub components: Vec<u16>,
}

/// Type 4: several glyphs become one
#[derive(Debug, Clone)]
pub struct LigatureSubst {
    coverage: Coverage,
    sets: Vec<Vec<Ligature>>,
}

impl LigatureSubst {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        if format != 1 {
            return Err(ShapeError::MalformedFont);
        }
        let coverage_offset = reader.read_u16()? as usize;
        let set_count = reader.read_u16()? as usize;
        let set_offsets = reader.read_array16(set_count)?;
        let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;

        let mut sets = Vec::with_capacity(set_count);
        for set_offset in set_offsets {
            let set_data = FontReader::new(data).slice_at(set_offset as usize)?;
            let mut set_reader = FontReader::new(set_data);
            let lig_count = set_reader.read_u16()? as usize;
            let lig_offsets = set_reader.read_array16(lig_count)?;

            let mut ligatures = Vec::with_capacity(lig_count);
            for lig_offset in lig_offsets {
                let mut lig = FontReader::new(FontReader::new(set_data).slice_at(lig_offset as usize)?);
                let lig_glyph = lig.read_u16()?;
                let comp_count = lig.read_u16()? as usize;
                if comp_count == 0 {
                    return Err(ShapeError::MalformedFont);
                }
                let components = lig.read_array16(comp_count - 1)?;
                ligatures.push(Ligature { glyph: lig_glyph, components });
            }
            sets.push(ligatures);
        }
        Ok(LigatureSubst { coverage, sets })
    }

    /// Candidate ligatures starting with `glyph`
    ///
    /// Longer rules are tried first by the engine; fonts already order
    /// them that way within a set.
    pub fn ligatures_for(&self, glyph: u16) -> Option<&[Ligature]> {
        let index = self.coverage.get(glyph)?;
        self.sets.get(index as usize).map(Vec::as_slice)
    }
}

/// Type 8: single substitution matched right-to-left with chain context
#[derive(Debug, Clone)]
pub struct ReverseChainSingleSubst {
    pub coverage: Coverage,
    pub backtrack: Vec<Coverage>,
    pub lookahead: Vec<Coverage>,
    pub substitutes: Vec<u16>,
}

impl ReverseChainSingleSubst {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        if format != 1 {
            return Err(ShapeError::MalformedFont);
        }
        let coverage_offset = reader.read_u16()? as usize;
        let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;

        let backtrack_count = reader.read_u16()? as usize;
        let backtrack_offsets = reader.read_array16(backtrack_count)?;
        let lookahead_count = reader.read_u16()? as usize;
        let lookahead_offsets = reader.read_array16(lookahead_count)?;
        let glyph_count = reader.read_u16()? as usize;
        let substitutes = reader.read_array16(glyph_count)?;

        let parse_all = |offsets: Vec<u16>| -> Result<Vec<Coverage>> {
            offsets
                .into_iter()
                .map(|o| Coverage::parse(FontReader::new(data).slice_at(o as usize)?))
                .collect()
        };
        Ok(ReverseChainSingleSubst {
            coverage,
            backtrack: parse_all(backtrack_offsets)?,
            lookahead: parse_all(lookahead_offsets)?,
            substitutes,
        })
    }
}

/// A parsed GSUB subtable of any type
pub enum GsubSubtable {
    Single(SingleSubst),
    Multiple(MultipleSubst),
    Alternate(AlternateSubst),
    Ligature(LigatureSubst),
    Context(ContextSubtable),
    ChainContext(ChainContextSubtable),
    ReverseChainSingle(ReverseChainSingleSubst),
}

/// Parse one subtable of a lookup of the given type
pub fn parse_subtable(kind: u16, data: &[u8]) -> Result<GsubSubtable> {
    match kind {
        LOOKUP_SINGLE => Ok(GsubSubtable::Single(SingleSubst::parse(data)?)),
        LOOKUP_MULTIPLE => Ok(GsubSubtable::Multiple(MultipleSubst::parse(data)?)),
        LOOKUP_ALTERNATE => Ok(GsubSubtable::Alternate(AlternateSubst::parse(data)?)),
        LOOKUP_LIGATURE => Ok(GsubSubtable::Ligature(LigatureSubst::parse(data)?)),
        LOOKUP_CONTEXT => Ok(GsubSubtable::Context(ContextSubtable::parse(data)?)),
        LOOKUP_CHAIN_CONTEXT => Ok(GsubSubtable::ChainContext(ChainContextSubtable::parse(data)?)),
        LOOKUP_REVERSE_CHAIN_SINGLE => Ok(GsubSubtable::ReverseChainSingle(
            ReverseChainSingleSubst::parse(data)?,
        )),
        _ => Err(ShapeError::MalformedFont),
    }
}
