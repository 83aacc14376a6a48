//! GPOS application and advance setup
//!
//! Seeds advances from the horizontal metrics, then applies the planned
//! positioning lookups. When the font carries no GPOS at all, the legacy
//! `kern` table (format 0 subtables) stands in for pair adjustment.

use crate::buffer::{Buffer, GlyphInfo};
use crate::direction::Direction;
use crate::font::reader::FontReader;
use crate::font::Font;
use crate::ot::common::LookupRecord;
use crate::ot::gdef::Gdef;
use crate::ot::gpos::{self, GposSubtable, GposTable, ValueRecord};
use crate::ot::layout::Lookup;
use crate::shape::plan::{PlannedLookup, ShapePlan};
use crate::shape::substitute::{
    match_chain_context, match_context, Skipper, MAX_NESTED_LOOKUPS,
};
use crate::tag::Tag;
use crate::Result;

const TAG_KERN: Tag = Tag::from_bytes(b"kern");

/// Position every glyph in the buffer
pub(crate) fn position(
    font: &Font<'_>,
    gpos: Option<&GposTable<'_>>,
    gdef: &Gdef,
    plan: &ShapePlan,
    direction: Direction,
    buffer: &mut Buffer,
) {
    seed_advances(font, direction, buffer);

    match gpos {
        Some(gpos) => {
            for planned in &plan.gpos_lookups {
                let Some(lookup) = gpos.lookup(planned.index) else {
                    tracing::debug!(index = planned.index, "unresolvable positioning lookup");
                    continue;
                };
                apply_lookup(font, gpos, gdef, &lookup, planned, direction, buffer, 0);
            }
        }
        None => apply_kern_table(font, gdef, buffer),
    }
}

fn seed_advances(font: &Font<'_>, direction: Direction, buffer: &mut Buffer) {
    buffer.positions.clear();
    buffer.positions.reserve(buffer.infos.len());
    let upem = font.face().units_per_em() as i32;
    for info in &buffer.infos {
        let mut pos = crate::buffer::GlyphPosition::default();
        if direction.is_vertical() {
            // No vertical metrics tables are consumed; fall back to one em
            // downward per glyph.
            pos.y_advance = -font.em_scale_y(upem);
        } else {
            pos.x_advance = font.glyph_h_advance(info.codepoint as u16);
        }
        buffer.positions.push(pos);
    }
}

fn apply_value(font: &Font<'_>, value: &ValueRecord, pos: &mut crate::buffer::GlyphPosition) {
    pos.x_offset += font.em_scale_x(value.x_placement as i32);
    pos.y_offset += font.em_scale_y(value.y_placement as i32);
    pos.x_advance += font.em_scale_x(value.x_advance as i32);
    pos.y_advance += font.em_scale_y(value.y_advance as i32);
}

fn parse_subtables(lookup: &Lookup<'_>) -> Vec<GposSubtable> {
    lookup
        .subtables
        .iter()
        .filter_map(|data| {
            gpos::parse_subtable(lookup.kind, data)
                .map_err(|_| tracing::debug!(kind = lookup.kind, "skipping damaged subtable"))
                .ok()
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn apply_lookup(
    font: &Font<'_>,
    gpos: &GposTable<'_>,
    gdef: &Gdef,
    lookup: &Lookup<'_>,
    planned: &PlannedLookup,
    direction: Direction,
    buffer: &mut Buffer,
    depth: usize,
) {
    if depth > MAX_NESTED_LOOKUPS {
        tracing::warn!("contextual lookup nesting too deep, stopping");
        return;
    }
    let subtables = parse_subtables(lookup);
    let skipper = Skipper::new(gdef, lookup);

    let mut i = 0;
    while i < buffer.infos.len() {
        let info = buffer.infos[i];
        if info.mask & planned.mask == 0 || skipper.skips(&info) {
            i += 1;
            continue;
        }
        i = apply_at(font, gpos, gdef, &subtables, &skipper, planned, direction, buffer, i, depth)
            .unwrap_or(i + 1);
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_at(
    font: &Font<'_>,
    gpos: &GposTable<'_>,
    gdef: &Gdef,
    subtables: &[GposSubtable],
    skipper: &Skipper<'_>,
    planned: &PlannedLookup,
    direction: Direction,
    buffer: &mut Buffer,
    i: usize,
    depth: usize,
) -> Option<usize> {
    let glyph = buffer.infos[i].codepoint as u16;
    for subtable in subtables {
        match subtable {
            GposSubtable::Single(s) => {
                if let Some(value) = s.apply(glyph) {
                    apply_value(font, &value, &mut buffer.positions[i]);
                    return Some(i + 1);
                }
            }
            GposSubtable::Pair(s) => {
                let j = skipper.next(&buffer.infos, i)?;
                let second = buffer.infos[j].codepoint as u16;
                if let Some((v1, v2)) = s.apply(glyph, second) {
                    apply_value(font, &v1, &mut buffer.positions[i]);
                    apply_value(font, &v2, &mut buffer.positions[j]);
                    // The second glyph only re-enters matching when its own
                    // record was untouched.
                    return Some(if v2.is_zero() { j } else { j + 1 });
                }
            }
            GposSubtable::Cursive(s) => {
                if let Some(next) = apply_cursive(font, s, skipper, direction, buffer, i) {
                    return Some(next);
                }
            }
            GposSubtable::MarkToBase(s) => {
                let base = find_preceding_base(gdef, &buffer.infos, i)?;
                let base_glyph = buffer.infos[base].codepoint as u16;
                if let Some((mark_anchor, base_anchor)) = s.apply(glyph, base_glyph) {
                    attach_mark(font, buffer, i, base, mark_anchor, base_anchor);
                    return Some(i + 1);
                }
            }
            GposSubtable::MarkToMark(s) => {
                let prev = skipper.prev(&buffer.infos, i)?;
                if !gdef.is_mark(buffer.infos[prev].codepoint as u16) {
                    return None;
                }
                let prev_glyph = buffer.infos[prev].codepoint as u16;
                if let Some((mark_anchor, base_anchor)) = s.apply(glyph, prev_glyph) {
                    attach_mark(font, buffer, i, prev, mark_anchor, base_anchor);
                    return Some(i + 1);
                }
            }
            GposSubtable::MarkToLigature(s) => {
                let lig = find_preceding_base(gdef, &buffer.infos, i)?;
                let lig_glyph = buffer.infos[lig].codepoint as u16;
                // Which component the mark belongs to is recovered from the
                // cluster distance inside the merged ligature cluster.
                let component =
                    buffer.infos[i].cluster.saturating_sub(buffer.infos[lig].cluster) as usize;
                if let Some((mark_anchor, lig_anchor)) = s.apply(glyph, lig_glyph, component) {
                    attach_mark(font, buffer, i, lig, mark_anchor, lig_anchor);
                    return Some(i + 1);
                }
            }
            GposSubtable::Context(s) => {
                if let Some(m) = match_context(&buffer.infos, skipper, i, s) {
                    let records = m.records.to_vec();
                    let input = m.input;
                    apply_records(
                        font, gpos, gdef, &records, &input, planned, direction, buffer, depth,
                    );
                    return Some(i + 1);
                }
            }
            GposSubtable::ChainContext(s) => {
                if let Some(m) = match_chain_context(&buffer.infos, skipper, i, s) {
                    let records = m.records.to_vec();
                    let input = m.input;
                    apply_records(
                        font, gpos, gdef, &records, &input, planned, direction, buffer, depth,
                    );
                    return Some(i + 1);
                }
            }
        }
    }
    None
}

#[allow(clippy::too_many_arguments)]
fn apply_records(
    font: &Font<'_>,
    gpos: &GposTable<'_>,
    gdef: &Gdef,
    records: &[LookupRecord],
    input: &[usize],
    planned: &PlannedLookup,
    direction: Direction,
    buffer: &mut Buffer,
    depth: usize,
) {
    if depth >= MAX_NESTED_LOOKUPS {
        tracing::warn!("contextual lookup nesting too deep, stopping");
        return;
    }
    for record in records {
        let Some(&pos) = input.get(record.sequence_index as usize) else { continue };
        let Some(nested) = gpos.lookup(record.lookup_index) else { continue };
        let subtables = parse_subtables(&nested);
        let skipper = Skipper::new(gdef, &nested);
        if pos < buffer.infos.len() {
            let nested_planned = PlannedLookup {
                index: record.lookup_index,
                mask: planned.mask,
                alt_value: planned.alt_value,
            };
            apply_at(
                font, gpos, gdef, &subtables, &skipper, &nested_planned, direction, buffer, pos,
                depth + 1,
            );
        }
    }
}

/// Nearest preceding glyph GDEF does not class as a mark
fn find_preceding_base(gdef: &Gdef, infos: &[GlyphInfo], i: usize) -> Option<usize> {
    infos[..i]
        .iter()
        .rposition(|info| !gdef.is_mark(info.codepoint as u16))
}

/// Offset the mark at `i` so its anchor lands on the base anchor
///
/// The base may sit several advances back; those advances are subtracted
/// so the offset is relative to the mark's own pen position. Attached
/// marks take no advance of their own.
fn attach_mark(
    font: &Font<'_>,
    buffer: &mut Buffer,
    mark: usize,
    base: usize,
    mark_anchor: gpos::Anchor,
    base_anchor: gpos::Anchor,
) {
    let advance_between: i32 = buffer.positions[base..mark].iter().map(|p| p.x_advance).sum();
    let base_pos = buffer.positions[base];
    let pos = &mut buffer.positions[mark];
    pos.x_offset = base_pos.x_offset + font.em_scale_x(base_anchor.x as i32)
        - font.em_scale_x(mark_anchor.x as i32)
        - advance_between;
    pos.y_offset = base_pos.y_offset + font.em_scale_y(base_anchor.y as i32)
        - font.em_scale_y(mark_anchor.y as i32);
    pos.x_advance = 0;
    pos.y_advance = 0;
}

/// Align the entry anchor of the glyph at `i` with the exit anchor of the
/// preceding glyph
fn apply_cursive(
    font: &Font<'_>,
    s: &gpos::CursivePos,
    skipper: &Skipper<'_>,
    direction: Direction,
    buffer: &mut Buffer,
    i: usize,
) -> Option<usize> {
    let entry = s.entry(buffer.infos[i].codepoint as u16)?;
    let prev = skipper.prev(&buffer.infos, i)?;
    let exit = s.exit(buffer.infos[prev].codepoint as u16)?;

    let exit_x = font.em_scale_x(exit.x as i32);
    let exit_y = font.em_scale_y(exit.y as i32);
    let entry_x = font.em_scale_x(entry.x as i32);
    let entry_y = font.em_scale_y(entry.y as i32);

    if direction.is_backward() {
        let prev_offset = buffer.positions[i].x_offset;
        buffer.positions[i].x_advance = entry_x + prev_offset;
        buffer.positions[prev].x_offset = -exit_x;
        buffer.positions[prev].y_offset = buffer.positions[i].y_offset + entry_y - exit_y;
    } else {
        buffer.positions[prev].x_advance = exit_x + buffer.positions[prev].x_offset;
        buffer.positions[i].x_offset = -entry_x;
        buffer.positions[i].y_offset = buffer.positions[prev].y_offset + exit_y - entry_y;
    }
    Some(i + 1)
}

/// Legacy `kern` pair adjustment, used only when GPOS is absent
fn apply_kern_table(font: &Font<'_>, gdef: &Gdef, buffer: &mut Buffer) {
    let Some(data) = font.face().table(TAG_KERN) else { return };
    let Ok(pairs) = parse_kern_format0(data) else {
        tracing::warn!("kern table unusable, skipping legacy kerning");
        return;
    };
    if pairs.is_empty() {
        return;
    }

    let mut i = 0;
    while let Some(j) = next_non_mark(gdef, &buffer.infos, i) {
        let left = buffer.infos[i].codepoint as u16;
        let right = buffer.infos[j].codepoint as u16;
        let key = ((left as u32) << 16) | right as u32;
        if let Ok(found) = pairs.binary_search_by_key(&key, |&(k, _)| k) {
            buffer.positions[i].x_advance += font.em_scale_x(pairs[found].1 as i32);
        }
        i = j;
    }
}

fn next_non_mark(gdef: &Gdef, infos: &[GlyphInfo], from: usize) -> Option<usize> {
    infos
        .iter()
        .enumerate()
        .skip(from + 1)
        .find(|(_, info)| !gdef.is_mark(info.codepoint as u16))
        .map(|(i, _)| i)
}

/// Collect all horizontal format 0 pairs, sorted by packed (left, right)
fn parse_kern_format0(data: &[u8]) -> Result<Vec<(u32, i16)>> {
    let mut reader = FontReader::new(data);
    let _version = reader.read_u16()?;
    let table_count = reader.read_u16()?;

    let mut pairs = Vec::new();
    for _ in 0..table_count {
        let _subtable_version = reader.read_u16()?;
        let length = reader.read_u16()? as usize;
        let coverage = reader.read_u16()?;
        let horizontal = coverage & 0x0001 != 0;
        let format = coverage >> 8;
        if format != 0 || !horizontal {
            reader.skip(length.saturating_sub(6))?;
            continue;
        }
        let pair_count = reader.read_u16()? as usize;
        reader.skip(6)?; // binary-search fields
        for _ in 0..pair_count {
            let left = reader.read_u16()?;
            let right = reader.read_u16()?;
            let value = reader.read_i16()?;
            pairs.push((((left as u32) << 16) | right as u32, value));
        }
    }
    pairs.sort_by_key(|&(k, _)| k);
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::GlyphPosition;

    fn glyph_buffer(glyphs: &[u16]) -> Buffer {
        let mut buf = Buffer::new();
        for (i, &g) in glyphs.iter().enumerate() {
            buf.infos.push(GlyphInfo { codepoint: g as u32, cluster: i as u32, mask: 1 });
            buf.positions.push(GlyphPosition { x_advance: 100, ..Default::default() });
        }
        buf
    }

    fn kern_table(pairs: &[(u16, u16, i16)]) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend_from_slice(&0u16.to_be_bytes()); // version
        t.extend_from_slice(&1u16.to_be_bytes()); // nTables
        t.extend_from_slice(&0u16.to_be_bytes()); // subtable version
        t.extend_from_slice(&((14 + pairs.len() * 6) as u16).to_be_bytes()); // length
        t.extend_from_slice(&0x0001u16.to_be_bytes()); // coverage: horizontal, format 0
        t.extend_from_slice(&(pairs.len() as u16).to_be_bytes());
        t.extend_from_slice(&[0u8; 6]); // binary-search fields
        for &(l, r, v) in pairs {
            t.extend_from_slice(&l.to_be_bytes());
            t.extend_from_slice(&r.to_be_bytes());
            t.extend_from_slice(&v.to_be_bytes());
        }
        t
    }

    #[test]
    fn test_kern_format0_parse() {
        let data = kern_table(&[(4, 5, -80), (2, 3, 40)]);
        let pairs = parse_kern_format0(&data).unwrap();
        assert_eq!(pairs.len(), 2);
        // Sorted by packed key.
        assert_eq!(pairs[0], (((2u32) << 16) | 3, 40));
        assert_eq!(pairs[1], (((4u32) << 16) | 5, -80));
    }

    #[test]
    fn test_kern_format0_skips_vertical_subtable() {
        let mut data = kern_table(&[(4, 5, -80)]);
        data[10] = 0x00; // clear the horizontal bit
        data[11] = 0x00;
        let pairs = parse_kern_format0(&data).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_find_preceding_base_skips_marks() {
        let gdef = Gdef::default();
        let buf = glyph_buffer(&[1, 2, 3]);
        // Without GDEF classes nothing is a mark; nearest predecessor wins.
        assert_eq!(find_preceding_base(&gdef, &buf.infos, 2), Some(1));
        assert_eq!(find_preceding_base(&gdef, &buf.infos, 0), None);
    }

    #[test]
    fn test_attach_mark_offsets_and_zeroes_advance() {
        struct Empty;
        impl crate::font::RawFace for Empty {
            fn table(&self, _tag: Tag) -> Option<&[u8]> {
                None
            }
        }
        let raw = Empty;
        let face = crate::font::Face::new(&raw);
        let font = Font::create(&face, 1000); // upem default 1000, scale 1:1

        let mut buf = glyph_buffer(&[1, 2]);
        let mark_anchor = gpos::Anchor { x: 10, y: 20 };
        let base_anchor = gpos::Anchor { x: 300, y: 600 };
        attach_mark(&font, &mut buf, 1, 0, mark_anchor, base_anchor);
        let pos = buf.positions[1];
        // 300 - 10 minus the base's 100-unit advance.
        assert_eq!(pos.x_offset, 190);
        assert_eq!(pos.y_offset, 580);
        assert_eq!(pos.x_advance, 0);
    }
}
