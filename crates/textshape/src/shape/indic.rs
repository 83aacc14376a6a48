//! Indic syllable analysis and reordering
//!
//! The nine Indic blocks share one 128-codepoint layout, so categories
//! derive from the offset within the block with a small per-script table
//! for the matras that render before the base. Reordering runs on
//! codepoints before substitution: pre-base matras move to the syllable
//! start and a syllable-initial Ra+halant (the reph) moves to the end.

use crate::buffer::Buffer;
use crate::script::Script;

/// Coarse syllabic category of one codepoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Consonant,
    IndependentVowel,
    Matra,
    Nukta,
    Halant,
    /// Other signs (anusvara, visarga, candrabindu)
    Sign,
    Other,
}

fn block_base(script: Script) -> Option<u32> {
    Some(match script {
        Script::Devanagari => 0x0900,
        Script::Bengali => 0x0980,
        Script::Gurmukhi => 0x0A00,
        Script::Gujarati => 0x0A80,
        Script::Oriya => 0x0B00,
        Script::Tamil => 0x0B80,
        Script::Telugu => 0x0C00,
        Script::Kannada => 0x0C80,
        Script::Malayalam => 0x0D00,
        _ => return None,
    })
}

fn category(cp: u32, base: u32) -> Category {
    let Some(offset) = cp.checked_sub(base).filter(|&o| o < 0x80) else {
        return Category::Other;
    };
    match offset {
        0x01..=0x03 => Category::Sign,
        0x04..=0x14 => Category::IndependentVowel,
        0x15..=0x39 => Category::Consonant,
        0x3C => Category::Nukta,
        0x3E..=0x4C => Category::Matra,
        0x4D => Category::Halant,
        // Extended consonants (qa, khha and friends).
        0x58..=0x5F => Category::Consonant,
        0x60..=0x61 => Category::IndependentVowel,
        0x62..=0x63 => Category::Matra,
        _ => Category::Other,
    }
}

/// Matras drawn to the left of the base consonant, per script
fn is_pre_base_matra(cp: u32, script: Script) -> bool {
    match script {
        Script::Devanagari => cp == 0x093F,
        Script::Bengali => matches!(cp, 0x09BF | 0x09C7 | 0x09C8),
        Script::Gurmukhi => cp == 0x0A3F,
        Script::Gujarati => cp == 0x0ABF,
        Script::Oriya => cp == 0x0B47,
        Script::Tamil => matches!(cp, 0x0BC6..=0x0BC8),
        Script::Malayalam => matches!(cp, 0x0D46..=0x0D48),
        _ => false,
    }
}

/// The reph-forming consonant is Ra, at a fixed block offset
fn is_ra(cp: u32, base: u32) -> bool {
    cp == base + 0x30
}

/// Reorder all syllables of the buffer for the given script
pub(crate) fn reorder(script: Script, buffer: &mut Buffer) {
    let Some(base) = block_base(script) else { return };

    let mut start = 0;
    while start < buffer.infos.len() {
        let end = syllable_end(buffer, base, start);
        if end > start + 1 {
            reorder_syllable(script, base, buffer, start, end);
        }
        start = end.max(start + 1);
    }
}

/// Find the end of the syllable starting at `start`
///
/// A syllable is a consonant cluster chained by halants and nuktas,
/// closed by any matras and signs; an independent vowel forms its own
/// syllable with trailing signs.
fn syllable_end(buffer: &Buffer, base: u32, start: usize) -> usize {
    let cat_at = |i: usize| category(buffer.infos[i].codepoint, base);

    let mut i = start;
    match cat_at(i) {
        Category::Consonant => {
            i += 1;
            // consonant (nukta? halant consonant (nukta?))*
            loop {
                if i < buffer.infos.len() && cat_at(i) == Category::Nukta {
                    i += 1;
                }
                if i + 1 < buffer.infos.len()
                    && cat_at(i) == Category::Halant
                    && cat_at(i + 1) == Category::Consonant
                {
                    i += 2;
                } else {
                    break;
                }
            }
            // A trailing halant (dead consonant) belongs to the syllable.
            if i < buffer.infos.len() && cat_at(i) == Category::Halant {
                i += 1;
            }
        }
        Category::IndependentVowel => i += 1,
        _ => return start + 1,
    }

    while i < buffer.infos.len() && matches!(cat_at(i), Category::Matra | Category::Sign) {
        i += 1;
    }
    i
}

fn reorder_syllable(script: Script, base: u32, buffer: &mut Buffer, start: usize, end: usize) {
    // Reph: syllable-initial Ra + halant followed by another consonant
    // moves to the syllable end.
    let has_reph = end - start >= 3
        && is_ra(buffer.infos[start].codepoint, base)
        && category(buffer.infos[start + 1].codepoint, base) == Category::Halant
        && category(buffer.infos[start + 2].codepoint, base) == Category::Consonant;
    if has_reph {
        let ra = buffer.infos.remove(start);
        let halant = buffer.infos.remove(start);
        // Signs stay syllable-final; the reph lands before them.
        let mut insert_at = end - 2;
        while insert_at > start
            && category(buffer.infos[insert_at - 1].codepoint, base) == Category::Sign
        {
            insert_at -= 1;
        }
        buffer.infos.insert(insert_at, ra);
        buffer.infos.insert(insert_at + 1, halant);
        buffer.merge_clusters(start, end);
    }

    // Pre-base matra moves to the front of the syllable.
    if let Some(matra) = (start..end)
        .find(|&i| is_pre_base_matra(buffer.infos[i].codepoint, script))
    {
        if matra > start {
            let info = buffer.infos.remove(matra);
            buffer.infos.insert(start, info);
            buffer.merge_clusters(start, end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reordered(script: Script, text: &str) -> Vec<u32> {
        let mut buf = Buffer::new();
        buf.add_str(text).unwrap();
        reorder(script, &mut buf);
        buf.infos.iter().map(|i| i.codepoint).collect()
    }

    #[test]
    fn test_pre_base_matra_moves_to_front() {
        // ka + i-matra renders as i-matra + ka.
        assert_eq!(
            reordered(Script::Devanagari, "\u{0915}\u{093F}"),
            vec![0x093F, 0x0915]
        );
    }

    #[test]
    fn test_post_base_matra_stays() {
        // ka + aa-matra keeps its order.
        assert_eq!(
            reordered(Script::Devanagari, "\u{0915}\u{093E}"),
            vec![0x0915, 0x093E]
        );
    }

    #[test]
    fn test_reph_moves_to_syllable_end() {
        // ra + halant + ka: the reph goes after ka.
        assert_eq!(
            reordered(Script::Devanagari, "\u{0930}\u{094D}\u{0915}"),
            vec![0x0915, 0x0930, 0x094D]
        );
    }

    #[test]
    fn test_reph_and_pre_base_matra_together() {
        // ra + halant + ka + i-matra: matra first, then ka, then the reph.
        assert_eq!(
            reordered(Script::Devanagari, "\u{0930}\u{094D}\u{0915}\u{093F}"),
            vec![0x093F, 0x0915, 0x0930, 0x094D]
        );
    }

    #[test]
    fn test_cluster_merge_on_reorder() {
        let mut buf = Buffer::new();
        buf.add_str("\u{0915}\u{093F}").unwrap();
        reorder(Script::Devanagari, &mut buf);
        assert_eq!(buf.infos[0].cluster, 0);
        assert_eq!(buf.infos[1].cluster, 0);
    }

    #[test]
    fn test_conjunct_syllable_spans_halant() {
        // ka + halant + ssa + i-matra is one syllable, matra to the front.
        assert_eq!(
            reordered(Script::Devanagari, "\u{0915}\u{094D}\u{0937}\u{093F}"),
            vec![0x093F, 0x0915, 0x094D, 0x0937]
        );
    }

    #[test]
    fn test_non_indic_text_untouched() {
        assert_eq!(
            reordered(Script::Devanagari, "ab"),
            vec!['a' as u32, 'b' as u32]
        );
    }
}
