//! Codepoint normalization against font coverage
//!
//! Runs before glyph mapping: decomposes characters the font has no glyph
//! for, orders combining marks canonically, and recomposes pairs the font
//! does cover. The buffer stays in codepoint form throughout.

use crate::buffer::{Buffer, GlyphInfo};
use crate::font::Face;
use crate::unicode;

/// Normalize buffer codepoints for the given face
pub fn normalize(face: &Face<'_>, buffer: &mut Buffer) {
    decompose_uncovered(face, buffer);
    reorder_marks(buffer);
    recompose_covered(face, buffer);
}

/// Decompose any codepoint the font cannot map directly, recursively
fn decompose_uncovered(face: &Face<'_>, buffer: &mut Buffer) {
    let mut out: Vec<GlyphInfo> = Vec::with_capacity(buffer.infos.len());
    for info in &buffer.infos {
        push_decomposed(face, *info, &mut out, 0);
    }
    buffer.infos = out;
}

const MAX_DECOMPOSE_DEPTH: usize = 4;

fn push_decomposed(face: &Face<'_>, info: GlyphInfo, out: &mut Vec<GlyphInfo>, depth: usize) {
    let Some(c) = char::from_u32(info.codepoint) else {
        out.push(info);
        return;
    };
    if depth >= MAX_DECOMPOSE_DEPTH || face.has_codepoint(c) {
        out.push(info);
        return;
    }
    match unicode::decompose(c) {
        Some((first, second)) => {
            push_decomposed(face, GlyphInfo { codepoint: first as u32, ..info }, out, depth + 1);
            if let Some(second) = second {
                // Decomposition parts inherit the original cluster.
                out.push(GlyphInfo { codepoint: second as u32, ..info });
            }
        }
        None => out.push(info),
    }
}

/// Stable-sort every run of nonzero combining classes
fn reorder_marks(buffer: &mut Buffer) {
    let ccc_of = |info: &GlyphInfo| {
        char::from_u32(info.codepoint).map_or(0, unicode::combining_class)
    };
    let len = buffer.infos.len();
    let mut i = 0;
    while i < len {
        if ccc_of(&buffer.infos[i]) == 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < len && ccc_of(&buffer.infos[i]) != 0 {
            i += 1;
        }
        buffer.infos[start..i].sort_by_key(|info| {
            char::from_u32(info.codepoint).map_or(0, unicode::combining_class)
        });
    }
}

/// Recompose starter+mark pairs the font covers
fn recompose_covered(face: &Face<'_>, buffer: &mut Buffer) {
    let mut i = 0;
    while i + 1 < buffer.infos.len() {
        let (a, b) = (buffer.infos[i], buffer.infos[i + 1]);
        let pair = char::from_u32(a.codepoint).zip(char::from_u32(b.codepoint));
        let composed = pair.and_then(|(base, mark)| {
            if unicode::combining_class(base) != 0 {
                return None;
            }
            unicode::compose(base, mark).filter(|&c| face.has_codepoint(c))
        });
        match composed {
            Some(c) => {
                let cluster = a.cluster.min(b.cluster);
                buffer.infos[i] = GlyphInfo { codepoint: c as u32, cluster, mask: a.mask | b.mask };
                buffer.infos.remove(i + 1);
                // The new starter may compose again with the next mark.
            }
            None => i += 1,
        }
    }
}
