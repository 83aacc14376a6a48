//! GSUB application
//!
//! Walks the buffer applying planned substitution lookups. Skip decisions
//! come from GDEF plus the lookup flag; mask bits gate which glyphs a
//! lookup may touch. The context matchers here are shared with the
//! positioning engine, whose contextual lookup types use the same wire
//! formats.

use crate::buffer::{Buffer, GlyphInfo};
use crate::ot::common::{ChainContextSubtable, ContextSubtable, Coverage, LookupRecord};
use crate::ot::gdef::Gdef;
use crate::ot::gsub::{self, GsubSubtable, GsubTable};
use crate::ot::layout::{Lookup, LookupFlag};
use crate::shape::plan::{PlannedLookup, ShapePlan};

/// Cap on contextual lookup recursion; malicious fonts can self-reference
pub(crate) const MAX_NESTED_LOOKUPS: usize = 6;

/// Skip decisions for one lookup, bundling GDEF with the lookup flag
#[derive(Clone, Copy)]
pub(crate) struct Skipper<'a> {
    gdef: &'a Gdef,
    flag: LookupFlag,
    filtering_set: Option<u16>,
}

impl<'a> Skipper<'a> {
    pub(crate) fn new(gdef: &'a Gdef, lookup: &Lookup<'_>) -> Self {
        Skipper { gdef, flag: lookup.flag, filtering_set: lookup.mark_filtering_set }
    }

    pub(crate) fn skips(&self, info: &GlyphInfo) -> bool {
        self.gdef.should_skip(info.codepoint as u16, self.flag, self.filtering_set)
    }

    /// Next non-skipped index after `from`
    pub(crate) fn next(&self, infos: &[GlyphInfo], from: usize) -> Option<usize> {
        infos
            .iter()
            .enumerate()
            .skip(from + 1)
            .find(|(_, info)| !self.skips(info))
            .map(|(i, _)| i)
    }

    /// Previous non-skipped index before `from`
    pub(crate) fn prev(&self, infos: &[GlyphInfo], from: usize) -> Option<usize> {
        infos[..from]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, info)| !self.skips(info))
            .map(|(i, _)| i)
    }
}

/// Match `count` glyphs after `start`, honoring skips
///
/// `pred` sees the sequence position (1-based, position 0 being `start`
/// itself) and the glyph id. Returns the matched indices.
pub(crate) fn match_forward(
    infos: &[GlyphInfo],
    skipper: &Skipper<'_>,
    start: usize,
    count: usize,
    pred: impl Fn(usize, u16) -> bool,
) -> Option<Vec<usize>> {
    let mut matched = Vec::with_capacity(count);
    let mut at = start;
    for seq_pos in 1..=count {
        at = skipper.next(infos, at)?;
        if !pred(seq_pos, infos[at].codepoint as u16) {
            return None;
        }
        matched.push(at);
    }
    Some(matched)
}

/// Match `count` glyphs before `start` going backward
pub(crate) fn match_backward(
    infos: &[GlyphInfo],
    skipper: &Skipper<'_>,
    start: usize,
    count: usize,
    pred: impl Fn(usize, u16) -> bool,
) -> bool {
    let mut at = start;
    for seq_pos in 0..count {
        let Some(prev) = skipper.prev(infos, at) else { return false };
        if !pred(seq_pos, infos[prev].codepoint as u16) {
            return false;
        }
        at = prev;
    }
    true
}

/// A matched context: the input glyph indices (position 0 included) and
/// the nested lookups to run over them
pub(crate) struct ContextMatch<'a> {
    pub(crate) input: Vec<usize>,
    pub(crate) records: &'a [LookupRecord],
}

/// Try a context subtable at position `i`
pub(crate) fn match_context<'a>(
    infos: &[GlyphInfo],
    skipper: &Skipper<'_>,
    i: usize,
    subtable: &'a ContextSubtable,
) -> Option<ContextMatch<'a>> {
    let glyph = infos[i].codepoint as u16;
    match subtable {
        ContextSubtable::Format1 { coverage, rule_sets } => {
            let set = rule_sets.get(coverage.get(glyph)? as usize)?;
            for rule in set {
                if let Some(rest) =
                    match_forward(infos, skipper, i, rule.input.len(), |pos, g| {
                        rule.input[pos - 1] == g
                    })
                {
                    return Some(ContextMatch {
                        input: prepend(i, rest),
                        records: &rule.records,
                    });
                }
            }
            None
        }
        ContextSubtable::Format2 { coverage, class_def, rule_sets } => {
            coverage.get(glyph)?;
            let set = rule_sets.get(class_def.get(glyph) as usize)?;
            for rule in set {
                if let Some(rest) =
                    match_forward(infos, skipper, i, rule.input.len(), |pos, g| {
                        rule.input[pos - 1] == class_def.get(g)
                    })
                {
                    return Some(ContextMatch {
                        input: prepend(i, rest),
                        records: &rule.records,
                    });
                }
            }
            None
        }
        ContextSubtable::Format3 { coverages, records } => {
            let (first, rest) = coverages.split_first()?;
            first.get(glyph)?;
            let matched = match_forward(infos, skipper, i, rest.len(), |pos, g| {
                rest[pos - 1].contains(g)
            })?;
            Some(ContextMatch { input: prepend(i, matched), records })
        }
    }
}

/// Try a chained context subtable at position `i`
pub(crate) fn match_chain_context<'a>(
    infos: &[GlyphInfo],
    skipper: &Skipper<'_>,
    i: usize,
    subtable: &'a ChainContextSubtable,
) -> Option<ContextMatch<'a>> {
    let glyph = infos[i].codepoint as u16;
    match subtable {
        ChainContextSubtable::Format1 { coverage, rule_sets } => {
            let set = rule_sets.get(coverage.get(glyph)? as usize)?;
            for rule in set {
                let input = match_forward(infos, skipper, i, rule.input.len(), |pos, g| {
                    rule.input[pos - 1] == g
                });
                let Some(input) = input else { continue };
                let last = input.last().copied().unwrap_or(i);
                if !match_backward(infos, skipper, i, rule.backtrack.len(), |pos, g| {
                    rule.backtrack[pos] == g
                }) {
                    continue;
                }
                if match_forward(infos, skipper, last, rule.lookahead.len(), |pos, g| {
                    rule.lookahead[pos - 1] == g
                })
                .is_none()
                {
                    continue;
                }
                return Some(ContextMatch { input: prepend(i, input), records: &rule.records });
            }
            None
        }
        ChainContextSubtable::Format2 {
            coverage,
            backtrack_classes,
            input_classes,
            lookahead_classes,
            rule_sets,
        } => {
            coverage.get(glyph)?;
            let set = rule_sets.get(input_classes.get(glyph) as usize)?;
            for rule in set {
                let input = match_forward(infos, skipper, i, rule.input.len(), |pos, g| {
                    rule.input[pos - 1] == input_classes.get(g)
                });
                let Some(input) = input else { continue };
                let last = input.last().copied().unwrap_or(i);
                if !match_backward(infos, skipper, i, rule.backtrack.len(), |pos, g| {
                    rule.backtrack[pos] == backtrack_classes.get(g)
                }) {
                    continue;
                }
                if match_forward(infos, skipper, last, rule.lookahead.len(), |pos, g| {
                    rule.lookahead[pos - 1] == lookahead_classes.get(g)
                })
                .is_none()
                {
                    continue;
                }
                return Some(ContextMatch { input: prepend(i, input), records: &rule.records });
            }
            None
        }
        ChainContextSubtable::Format3 { backtrack, input, lookahead, records } => {
            let (first, rest) = input.split_first()?;
            first.get(glyph)?;
            let matched = match_forward(infos, skipper, i, rest.len(), |pos, g| {
                rest[pos - 1].contains(g)
            })?;
            let last = matched.last().copied().unwrap_or(i);
            if !match_backward(infos, skipper, i, backtrack.len(), |pos, g| {
                backtrack[pos].contains(g)
            }) {
                return None;
            }
            match_forward(infos, skipper, last, lookahead.len(), |pos, g| {
                lookahead[pos - 1].contains(g)
            })?;
            Some(ContextMatch { input: prepend(i, matched), records })
        }
    }
}

fn prepend(first: usize, rest: Vec<usize>) -> Vec<usize> {
    let mut input = Vec::with_capacity(rest.len() + 1);
    input.push(first);
    input.extend(rest);
    input
}

/// Apply every planned GSUB lookup to the buffer
pub(crate) fn substitute(gsub: &GsubTable<'_>, gdef: &Gdef, plan: &ShapePlan, buffer: &mut Buffer) {
    for planned in &plan.gsub_lookups {
        let Some(lookup) = gsub.lookup(planned.index) else {
            tracing::debug!(index = planned.index, "unresolvable substitution lookup");
            continue;
        };
        apply_lookup(gsub, gdef, &lookup, planned, buffer, 0);
    }
}

fn parse_subtables(lookup: &Lookup<'_>) -> Vec<GsubSubtable> {
    lookup
        .subtables
        .iter()
        .filter_map(|data| {
            gsub::parse_subtable(lookup.kind, data)
                .map_err(|_| tracing::debug!(kind = lookup.kind, "skipping damaged subtable"))
                .ok()
        })
        .collect()
}

fn apply_lookup(
    gsub: &GsubTable<'_>,
    gdef: &Gdef,
    lookup: &Lookup<'_>,
    planned: &PlannedLookup,
    buffer: &mut Buffer,
    depth: usize,
) {
    if depth > MAX_NESTED_LOOKUPS {
        tracing::warn!("contextual lookup nesting too deep, stopping");
        return;
    }
    let subtables = parse_subtables(lookup);
    let skipper = Skipper::new(gdef, lookup);

    if lookup.kind == gsub::LOOKUP_REVERSE_CHAIN_SINGLE {
        apply_reverse_chain(&subtables, &skipper, planned.mask, buffer);
        return;
    }

    let mut i = 0;
    while i < buffer.infos.len() {
        let info = buffer.infos[i];
        if info.mask & planned.mask == 0 || skipper.skips(&info) {
            i += 1;
            continue;
        }
        i = apply_at(gsub, gdef, &subtables, &skipper, planned, buffer, i, depth).unwrap_or(i + 1);
    }
}

/// Apply the first matching subtable at `i`; returns the index to resume
/// the forward walk from
fn apply_at(
    gsub: &GsubTable<'_>,
    gdef: &Gdef,
    subtables: &[GsubSubtable],
    skipper: &Skipper<'_>,
    planned: &PlannedLookup,
    buffer: &mut Buffer,
    i: usize,
    depth: usize,
) -> Option<usize> {
    let glyph = buffer.infos[i].codepoint as u16;
    for subtable in subtables {
        match subtable {
            GsubSubtable::Single(s) => {
                if let Some(out) = s.apply(glyph) {
                    buffer.infos[i].codepoint = out as u32;
                    return Some(i + 1);
                }
            }
            GsubSubtable::Alternate(s) => {
                if let Some(out) = s.apply(glyph, planned.alt_value) {
                    buffer.infos[i].codepoint = out as u32;
                    return Some(i + 1);
                }
            }
            GsubSubtable::Multiple(s) => {
                if let Some(seq) = s.apply(glyph) {
                    return Some(expand_at(buffer, i, seq));
                }
            }
            GsubSubtable::Ligature(s) => {
                if let Some(ligs) = s.ligatures_for(glyph) {
                    for lig in ligs {
                        if let Some(next) = try_ligate(buffer, skipper, i, lig) {
                            return Some(next);
                        }
                    }
                }
            }
            GsubSubtable::Context(s) => {
                if let Some(m) = match_context(&buffer.infos, skipper, i, s) {
                    let records = m.records.to_vec();
                    apply_records(gsub, gdef, &records, m.input, planned, buffer, depth);
                    return Some(i + 1);
                }
            }
            GsubSubtable::ChainContext(s) => {
                if let Some(m) = match_chain_context(&buffer.infos, skipper, i, s) {
                    let records = m.records.to_vec();
                    apply_records(gsub, gdef, &records, m.input, planned, buffer, depth);
                    return Some(i + 1);
                }
            }
            // Reverse chain never reaches the forward walk.
            GsubSubtable::ReverseChainSingle(_) => {}
        }
    }
    None
}

/// Replace the glyph at `i` with a sequence inheriting cluster and mask
fn expand_at(buffer: &mut Buffer, i: usize, seq: &[u16]) -> usize {
    let template = buffer.infos[i];
    let replacement = seq.iter().map(|&g| GlyphInfo { codepoint: g as u32, ..template });
    buffer.infos.splice(i..=i, replacement);
    // An empty sequence deletes the glyph; resume at the same index.
    i + seq.len().max(1)
}

/// Match and apply one ligature rule starting at `i`
fn try_ligate(
    buffer: &mut Buffer,
    skipper: &Skipper<'_>,
    i: usize,
    lig: &gsub::Ligature,
) -> Option<usize> {
    let matched = match_forward(&buffer.infos, skipper, i, lig.components.len(), |pos, g| {
        lig.components[pos - 1] == g
    })?;
    let last = matched.last().copied().unwrap_or(i);
    buffer.merge_clusters(i, last + 1);
    buffer.infos[i].codepoint = lig.glyph as u32;
    // Remove the trailing components; skipped glyphs in between stay put.
    for &index in matched.iter().rev() {
        buffer.infos.remove(index);
    }
    Some(i + 1)
}

/// Run nested lookups over a matched input sequence
fn apply_records(
    gsub: &GsubTable<'_>,
    gdef: &Gdef,
    records: &[LookupRecord],
    mut input: Vec<usize>,
    planned: &PlannedLookup,
    buffer: &mut Buffer,
    depth: usize,
) {
    if depth >= MAX_NESTED_LOOKUPS {
        tracing::warn!("contextual lookup nesting too deep, stopping");
        return;
    }
    for record in records {
        let Some(&pos) = input.get(record.sequence_index as usize) else { continue };
        let Some(nested) = gsub.lookup(record.lookup_index) else { continue };
        if nested.kind == gsub::LOOKUP_REVERSE_CHAIN_SINGLE {
            continue;
        }
        let before = buffer.infos.len();
        let subtables = parse_subtables(&nested);
        let skipper = Skipper::new(gdef, &nested);
        if pos < buffer.infos.len() {
            let nested_planned = PlannedLookup {
                index: record.lookup_index,
                mask: planned.mask,
                alt_value: planned.alt_value,
            };
            apply_at(gsub, gdef, &subtables, &skipper, &nested_planned, buffer, pos, depth + 1);
        }
        // Length changes shift every matched position past the edit site.
        let delta = buffer.infos.len() as isize - before as isize;
        if delta != 0 {
            for p in input.iter_mut().filter(|p| **p > pos) {
                *p = (*p as isize + delta).max(0) as usize;
            }
        }
    }
}

/// Type 8 runs backward so later substitutions cannot feed earlier ones
fn apply_reverse_chain(
    subtables: &[GsubSubtable],
    skipper: &Skipper<'_>,
    mask: u32,
    buffer: &mut Buffer,
) {
    for i in (0..buffer.infos.len()).rev() {
        let info = buffer.infos[i];
        if info.mask & mask == 0 || skipper.skips(&info) {
            continue;
        }
        let glyph = info.codepoint as u16;
        for subtable in subtables {
            let GsubSubtable::ReverseChainSingle(s) = subtable else { continue };
            let Some(index) = s.coverage.get(glyph) else { continue };
            if !match_backward(&buffer.infos, skipper, i, s.backtrack.len(), |pos, g| {
                s.backtrack[pos].contains(g)
            }) {
                continue;
            }
            let ahead_ok = match_coverage_ahead(&buffer.infos, skipper, i, &s.lookahead);
            if !ahead_ok {
                continue;
            }
            if let Some(&out) = s.substitutes.get(index as usize) {
                buffer.infos[i].codepoint = out as u32;
            }
            break;
        }
    }
}

fn match_coverage_ahead(
    infos: &[GlyphInfo],
    skipper: &Skipper<'_>,
    i: usize,
    lookahead: &[Coverage],
) -> bool {
    match_forward(infos, skipper, i, lookahead.len(), |pos, g| lookahead[pos - 1].contains(g))
        .is_some()
}
