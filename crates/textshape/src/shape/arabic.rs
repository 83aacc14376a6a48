//! Arabic-family joining analysis
//!
//! Assigns one positional-form mask bit (isol, fina, medi, init) to every
//! joining character before substitution runs, so the font's positional
//! features fire on exactly the glyphs their form applies to. Covers the
//! scripts that share the Arabic joining model.

use crate::buffer::Buffer;
use crate::shape::plan::ShapePlan;
use crate::unicode;

/// How a character participates in cursive joining
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoiningType {
    /// Never joins (and breaks joining on both sides)
    NonJoining,
    /// Joins to the preceding letter only
    Right,
    /// Joins on both sides
    Dual,
    /// Joins on both sides without taking a form itself (tatweel, ZWJ)
    JoinCausing,
    /// Invisible to joining (marks, most format characters)
    Transparent,
}

/// Positional form slots, indexing `ShapePlan::arabic_masks`
const ISOL: usize = 0;
const FINA: usize = 1;
const MEDI: usize = 2;
const INIT: usize = 3;

fn joining_type(c: char) -> JoiningType {
    use JoiningType::*;
    match c as u32 {
        // Tatweel and zero-width joiner extend joining through themselves.
        0x0640 | 0x200D | 0x07FA => JoinCausing,
        // Zero-width non-joiner breaks joining explicitly.
        0x200C => NonJoining,

        // Arabic right-joining letters: alef and its hamza forms, dal, ra,
        // waw families, teh marbuta.
        0x0622..=0x0625
        | 0x0627
        | 0x0629
        | 0x062F..=0x0632
        | 0x0648
        | 0x0671..=0x0673
        | 0x0675..=0x0677
        | 0x0688..=0x0699
        | 0x06C0..=0x06CB
        | 0x06CD
        | 0x06CF
        | 0x06D2..=0x06D3
        | 0x06D5 => Right,

        // Arabic dual-joining letters.
        0x0620
        | 0x0626
        | 0x0628
        | 0x062A..=0x062E
        | 0x0633..=0x063A
        | 0x063B..=0x063F
        | 0x0641..=0x0647
        | 0x0649..=0x064A
        | 0x066E..=0x066F
        | 0x0678..=0x0687
        | 0x069A..=0x06BF
        | 0x06CC
        | 0x06CE
        | 0x06D0..=0x06D1
        | 0x06FA..=0x06FC
        | 0x06FF => Dual,

        // Syriac.
        0x0710 | 0x0712..=0x0714 | 0x071A..=0x071D | 0x071F..=0x0727 | 0x0729 | 0x072B => Dual,
        0x0715..=0x0719 | 0x071E | 0x0728 | 0x072A | 0x072C => Right,

        // Nko letters are all dual-joining.
        0x07CA..=0x07EA => Dual,

        // Mandaic.
        0x0841..=0x0845 | 0x0848 | 0x084A..=0x0853 | 0x0855 => Dual,
        0x0840 | 0x0846..=0x0847 | 0x0849 | 0x0854 => Right,

        // Mongolian letters join dually within cursive text.
        0x1820..=0x1878 | 0x1887..=0x18A8 | 0x18AA => Dual,

        _ if unicode::is_mark(c) || unicode::is_default_ignorable(c) => Transparent,
        _ => NonJoining,
    }
}

/// Compute a positional form per glyph and rewrite the form mask bits
pub(crate) fn assign_joining_masks(plan: &ShapePlan, buffer: &mut Buffer) {
    let form_bits: u32 = plan.arabic_masks.iter().copied().fold(0, |acc, m| acc | m);
    if form_bits == 0 {
        return;
    }

    let types: Vec<JoiningType> = buffer
        .infos
        .iter()
        .map(|info| char::from_u32(info.codepoint).map_or(JoiningType::NonJoining, joining_type))
        .collect();

    // Whether the nearest non-transparent predecessor joins forward.
    let mut prev_joins_forward = false;
    for i in 0..types.len() {
        let jt = types[i];
        if jt == JoiningType::Transparent {
            continue;
        }
        if jt == JoiningType::NonJoining {
            prev_joins_forward = false;
            continue;
        }
        if jt == JoiningType::JoinCausing {
            prev_joins_forward = true;
            continue;
        }

        let joins_prev = prev_joins_forward;
        let joins_next = jt == JoiningType::Dual && next_joins_backward(&types, i);
        let slot = match (joins_prev, joins_next) {
            (true, true) => MEDI,
            (true, false) => FINA,
            (false, true) => INIT,
            (false, false) => ISOL,
        };
        let info = &mut buffer.infos[i];
        info.mask = (info.mask & !form_bits) | plan.arabic_masks[slot];

        // Right-joining letters consume the join without offering one.
        prev_joins_forward = jt == JoiningType::Dual;
    }
}

/// Does the nearest non-transparent successor accept a join from the left
fn next_joins_backward(types: &[JoiningType], i: usize) -> bool {
    types[i + 1..]
        .iter()
        .find(|&&t| t != JoiningType::Transparent)
        .is_some_and(|&t| {
            matches!(t, JoiningType::Right | JoiningType::Dual | JoiningType::JoinCausing)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::plan::GLOBAL_MASK;

    fn plan_with_form_masks() -> ShapePlan {
        ShapePlan {
            shaper: crate::shape::plan::ShaperKind::Arabic,
            global_mask: GLOBAL_MASK,
            mask_features: Vec::new(),
            arabic_masks: [0x2, 0x4, 0x8, 0x10],
            gsub_lookups: Vec::new(),
            gpos_lookups: Vec::new(),
        }
    }

    fn forms_of(text: &str) -> Vec<u32> {
        let plan = plan_with_form_masks();
        let mut buf = Buffer::new();
        buf.add_str(text).unwrap();
        buf.reset_masks(GLOBAL_MASK);
        assign_joining_masks(&plan, &mut buf);
        buf.infos.iter().map(|i| i.mask & !GLOBAL_MASK).collect()
    }

    #[test]
    fn test_isolated_letter() {
        // Lone beh takes the isolated form.
        assert_eq!(forms_of("\u{0628}"), vec![0x2]);
    }

    #[test]
    fn test_dual_joining_word() {
        // beh + beh + beh: init, medi, fina.
        assert_eq!(forms_of("\u{0628}\u{0628}\u{0628}"), vec![0x10, 0x8, 0x4]);
    }

    #[test]
    fn test_right_joiner_ends_the_chain() {
        // beh + alef: beh takes init, alef takes fina, and a following beh
        // restarts in isolated form.
        assert_eq!(
            forms_of("\u{0628}\u{0627}\u{0628}"),
            vec![0x10, 0x4, 0x2]
        );
    }

    #[test]
    fn test_zwnj_blocks_joining() {
        assert_eq!(
            forms_of("\u{0628}\u{200C}\u{0628}"),
            vec![0x2, 0, 0x2]
        );
    }

    #[test]
    fn test_marks_are_transparent() {
        // beh + fatha + beh still joins through the mark.
        let forms = forms_of("\u{0628}\u{064E}\u{0628}");
        assert_eq!(forms[0], 0x10);
        assert_eq!(forms[1], 0); // mark keeps no form bit
        assert_eq!(forms[2], 0x4);
    }
}
