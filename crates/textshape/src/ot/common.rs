//! Structures shared between the layout tables
//!
//! Coverage and class definitions appear in nearly every GSUB/GPOS
//! subtable; the contextual rule formats are byte-identical between the
//! two tables and parse here once.

use crate::font::reader::FontReader;
use crate::Result;

/// Coverage table: which glyphs a subtable applies to
#[derive(Debug, Clone)]
pub enum Coverage {
    /// Format 1: sorted glyph list
    Format1 { glyphs: Vec<u16> },
    /// Format 2: glyph ranges with start coverage indices
    Format2 { ranges: Vec<(u16, u16, u16)> },
}

impl Coverage {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        match format {
            1 => {
                let count = reader.read_u16()? as usize;
                let glyphs = reader.read_array16(count)?;
                Ok(Coverage::Format1 { glyphs })
            }
            2 => {
                let count = reader.read_u16()? as usize;
                let mut ranges = Vec::with_capacity(count);
                for _ in 0..count {
                    let start = reader.read_u16()?;
                    let end = reader.read_u16()?;
                    let start_index = reader.read_u16()?;
                    ranges.push((start, end, start_index));
                }
                Ok(Coverage::Format2 { ranges })
            }
            _ => Err(crate::ShapeError::MalformedFont),
        }
    }

    /// Coverage index of a glyph, `None` when not covered
    pub fn get(&self, glyph: u16) -> Option<u16> {
        match self {
            Coverage::Format1 { glyphs } => {
                glyphs.binary_search(&glyph).ok().map(|i| i as u16)
            }
            Coverage::Format2 { ranges } => {
                let i = ranges.partition_point(|&(_, end, _)| end < glyph);
                let &(start, end, start_index) = ranges.get(i)?;
                (start <= glyph && glyph <= end)
                    .then(|| start_index + (glyph - start))
            }
        }
    }

    /// Check membership without needing the index
    pub fn contains(&self, glyph: u16) -> bool {
        self.get(glyph).is_some()
    }
}

/// Class definition table: glyph to class id
#[derive(Debug, Clone)]
pub enum ClassDef {
    /// Format 1: consecutive glyphs starting at `start`
    Format1 { start: u16, classes: Vec<u16> },
    /// Format 2: glyph ranges sharing one class
    Format2 { ranges: Vec<(u16, u16, u16)> },
}

impl ClassDef {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        match format {
            1 => {
                let start = reader.read_u16()?;
                let count = reader.read_u16()? as usize;
                let classes = reader.read_array16(count)?;
                Ok(ClassDef::Format1 { start, classes })
            }
            2 => {
                let count = reader.read_u16()? as usize;
                let mut ranges = Vec::with_capacity(count);
                for _ in 0..count {
                    let start = reader.read_u16()?;
                    let end = reader.read_u16()?;
                    let class = reader.read_u16()?;
                    ranges.push((start, end, class));
                }
                Ok(ClassDef::Format2 { ranges })
            }
            _ => Err(crate::ShapeError::MalformedFont),
        }
    }

    /// Class of a glyph; unlisted glyphs are class 0
    pub fn get(&self, glyph: u16) -> u16 {
        match self {
            ClassDef::Format1 { start, classes } => glyph
                .checked_sub(*start)
                .and_then(|i| classes.get(i as usize).copied())
                .unwrap_or(0),
            ClassDef::Format2 { ranges } => {
                let i = ranges.partition_point(|&(_, end, _)| end < glyph);
                match ranges.get(i) {
                    Some(&(start, end, class)) if start <= glyph && glyph <= end => class,
                    _ => 0,
                }
            }
        }
    }
}

/// Nested lookup applied at a position inside a matched context
#[derive(Debug, Clone, Copy)]
pub struct LookupRecord {
    pub sequence_index: u16,
    pub lookup_index: u16,
}

fn read_lookup_records(reader: &mut FontReader<'_>, count: usize) -> Result<Vec<LookupRecord>> {
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(LookupRecord {
            sequence_index: reader.read_u16()?,
            lookup_index: reader.read_u16()?,
        });
    }
    Ok(records)
}

/// One rule of a format 1/2 context subtable
///
/// `input` holds the glyphs (format 1) or classes (format 2) after the
/// first position.
#[derive(Debug, Clone)]
pub struct SequenceRule {
    pub input: Vec<u16>,
    pub records: Vec<LookupRecord>,
}

/// One rule of a format 1/2 chained context subtable
#[derive(Debug, Clone)]
pub struct ChainRule {
    pub backtrack: Vec<u16>,
    pub input: Vec<u16>,
    pub lookahead: Vec<u16>,
    pub records: Vec<LookupRecord>,
}

/// Context subtable (GSUB type 5 / GPOS type 7)
#[derive(Debug, Clone)]
pub enum ContextSubtable {
    Format1 {
        coverage: Coverage,
        rule_sets: Vec<Vec<SequenceRule>>,
    },
    Format2 {
        coverage: Coverage,
        class_def: ClassDef,
        rule_sets: Vec<Vec<SequenceRule>>,
    },
    Format3 {
        coverages: Vec<Coverage>,
        records: Vec<LookupRecord>,
    },
}

impl ContextSubtable {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        match format {
            1 => {
                let coverage_offset = reader.read_u16()? as usize;
                let set_count = reader.read_u16()? as usize;
                let set_offsets = reader.read_array16(set_count)?;
                let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;
                let mut rule_sets = Vec::with_capacity(set_count);
                for set_offset in set_offsets {
                    rule_sets.push(parse_rule_set(data, set_offset as usize)?);
                }
                Ok(ContextSubtable::Format1 { coverage, rule_sets })
            }
            2 => {
                let coverage_offset = reader.read_u16()? as usize;
                let class_def_offset = reader.read_u16()? as usize;
                let set_count = reader.read_u16()? as usize;
                let set_offsets = reader.read_array16(set_count)?;
                let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;
                let class_def = ClassDef::parse(reader.slice_at(class_def_offset)?)?;
                let mut rule_sets = Vec::with_capacity(set_count);
                for set_offset in set_offsets {
                    if set_offset == 0 {
                        rule_sets.push(Vec::new());
                        continue;
                    }
                    rule_sets.push(parse_rule_set(data, set_offset as usize)?);
                }
                Ok(ContextSubtable::Format2 { coverage, class_def, rule_sets })
            }
            3 => {
                let glyph_count = reader.read_u16()? as usize;
                let record_count = reader.read_u16()? as usize;
                let coverage_offsets = reader.read_array16(glyph_count)?;
                let records = read_lookup_records(&mut reader, record_count)?;
                let mut coverages = Vec::with_capacity(glyph_count);
                for offset in coverage_offsets {
                    coverages.push(Coverage::parse(
                        FontReader::new(data).slice_at(offset as usize)?,
                    )?);
                }
                Ok(ContextSubtable::Format3 { coverages, records })
            }
            _ => Err(crate::ShapeError::MalformedFont),
        }
    }
}

fn parse_rule_set(data: &[u8], set_offset: usize) -> Result<Vec<SequenceRule>> {
    let set_data = FontReader::new(data).slice_at(set_offset)?;
    let mut set_reader = FontReader::new(set_data);
    let rule_count = set_reader.read_u16()? as usize;
    let rule_offsets = set_reader.read_array16(rule_count)?;

    let mut rules = Vec::with_capacity(rule_count);
    for rule_offset in rule_offsets {
        let rule_data = FontReader::new(set_data).slice_at(rule_offset as usize)?;
        let mut r = FontReader::new(rule_data);
        let glyph_count = r.read_u16()? as usize;
        let record_count = r.read_u16()? as usize;
        if glyph_count == 0 {
            return Err(crate::ShapeError::MalformedFont);
        }
        let input = r.read_array16(glyph_count - 1)?;
        let records = read_lookup_records(&mut r, record_count)?;
        rules.push(SequenceRule { input, records });
    }
    Ok(rules)
}

/// Chained context subtable (GSUB type 6 / GPOS type 8)
#[derive(Debug, Clone)]
pub enum ChainContextSubtable {
    Format1 {
        coverage: Coverage,
        rule_sets: Vec<Vec<ChainRule>>,
    },
    Format2 {
        coverage: Coverage,
        backtrack_classes: ClassDef,
        input_classes: ClassDef,
        lookahead_classes: ClassDef,
        rule_sets: Vec<Vec<ChainRule>>,
    },
    Format3 {
        backtrack: Vec<Coverage>,
        input: Vec<Coverage>,
        lookahead: Vec<Coverage>,
        records: Vec<LookupRecord>,
    },
}

impl ChainContextSubtable {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = FontReader::new(data);
        let format = reader.read_u16()?;
        match format {
            1 => {
                let coverage_offset = reader.read_u16()? as usize;
                let set_count = reader.read_u16()? as usize;
                let set_offsets = reader.read_array16(set_count)?;
                let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;
                let mut rule_sets = Vec::with_capacity(set_count);
                for set_offset in set_offsets {
                    if set_offset == 0 {
                        rule_sets.push(Vec::new());
                        continue;
                    }
                    rule_sets.push(parse_chain_rule_set(data, set_offset as usize)?);
                }
                Ok(ChainContextSubtable::Format1 { coverage, rule_sets })
            }
            2 => {
                let coverage_offset = reader.read_u16()? as usize;
                let backtrack_offset = reader.read_u16()? as usize;
                let input_offset = reader.read_u16()? as usize;
                let lookahead_offset = reader.read_u16()? as usize;
                let set_count = reader.read_u16()? as usize;
                let set_offsets = reader.read_array16(set_count)?;
                let coverage = Coverage::parse(reader.slice_at(coverage_offset)?)?;
                let backtrack_classes = ClassDef::parse(reader.slice_at(backtrack_offset)?)?;
                let input_classes = ClassDef::parse(reader.slice_at(input_offset)?)?;
                let lookahead_classes = ClassDef::parse(reader.slice_at(lookahead_offset)?)?;
                let mut rule_sets = Vec::with_capacity(set_count);
                for set_offset in set_offsets {
                    if set_offset == 0 {
                        rule_sets.push(Vec::new());
                        continue;
                    }
                    rule_sets.push(parse_chain_rule_set(data, set_offset as usize)?);
                }
                Ok(ChainContextSubtable::Format2 {
                    coverage,
                    backtrack_classes,
                    input_classes,
                    lookahead_classes,
                    rule_sets,
                })
            }
            3 => {
                let backtrack = parse_coverage_array(data, &mut reader)?;
                let input = parse_coverage_array(data, &mut reader)?;
                let lookahead = parse_coverage_array(data, &mut reader)?;
                let record_count = reader.read_u16()? as usize;
                let records = read_lookup_records(&mut reader, record_count)?;
                Ok(ChainContextSubtable::Format3 { backtrack, input, lookahead, records })
            }
            _ => Err(crate::ShapeError::MalformedFont),
        }
    }
}

fn parse_coverage_array(data: &[u8], reader: &mut FontReader<'_>) -> Result<Vec<Coverage>> {
    let count = reader.read_u16()? as usize;
    let offsets = reader.read_array16(count)?;
    let mut coverages = Vec::with_capacity(count);
    for offset in offsets {
        coverages.push(Coverage::parse(FontReader::new(data).slice_at(offset as usize)?)?);
    }
    Ok(coverages)
}

fn parse_chain_rule_set(data: &[u8], set_offset: usize) -> Result<Vec<ChainRule>> {
    let set_data = FontReader::new(data).slice_at(set_offset)?;
    let mut set_reader = FontReader::new(set_data);
    let rule_count = set_reader.read_u16()? as usize;
    let rule_offsets = set_reader.read_array16(rule_count)?;

    let mut rules = Vec::with_capacity(rule_count);
    for rule_offset in rule_offsets {
        let rule_data = FontReader::new(set_data).slice_at(rule_offset as usize)?;
        let mut r = FontReader::new(rule_data);
        let backtrack_count = r.read_u16()? as usize;
        let backtrack = r.read_array16(backtrack_count)?;
        let input_count = r.read_u16()? as usize;
        if input_count == 0 {
            return Err(crate::ShapeError::MalformedFont);
        }
        let input = r.read_array16(input_count - 1)?;
        let lookahead_count = r.read_u16()? as usize;
        let lookahead = r.read_array16(lookahead_count)?;
        let record_count = r.read_u16()? as usize;
        let records = read_lookup_records(&mut r, record_count)?;
        rules.push(ChainRule { backtrack, input, lookahead, records });
    }
    Ok(rules)
}
