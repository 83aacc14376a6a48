//! Unicode scripts
//!
//! Script identification per codepoint plus the script-level properties the
//! shaping planner needs: writing direction, joining behavior, Indic
//! reordering.

use crate::direction::Direction;
use crate::tag::Tag;

const fn tag(bytes: &[u8; 4]) -> u32 {
    ((bytes[0] as u32) << 24) | ((bytes[1] as u32) << 16) | ((bytes[2] as u32) << 8) | (bytes[3] as u32)
}

/// ISO 15924 script, with its OpenType script tag as discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Script {
    /// Unknown or punctuation shared between scripts
    #[default]
    Common = tag(b"DFLT"),
    /// Marks that inherit the script of their base
    Inherited = tag(b"zinh"),
    Latin = tag(b"latn"),
    Greek = tag(b"grek"),
    Cyrillic = tag(b"cyrl"),
    Armenian = tag(b"armn"),
    Georgian = tag(b"geor"),
    Hebrew = tag(b"hebr"),
    Arabic = tag(b"arab"),
    Syriac = tag(b"syrc"),
    Thaana = tag(b"thaa"),
    Nko = tag(b"nko "),
    Samaritan = tag(b"samr"),
    Mandaic = tag(b"mand"),
    Devanagari = tag(b"dev2"),
    Bengali = tag(b"bng2"),
    Gurmukhi = tag(b"gur2"),
    Gujarati = tag(b"gjr2"),
    Oriya = tag(b"ory2"),
    Tamil = tag(b"tml2"),
    Telugu = tag(b"tel2"),
    Kannada = tag(b"knd2"),
    Malayalam = tag(b"mlm2"),
    Sinhala = tag(b"sinh"),
    Thai = tag(b"thai"),
    Lao = tag(b"lao "),
    Tibetan = tag(b"tibt"),
    Myanmar = tag(b"mym2"),
    Khmer = tag(b"khmr"),
    Mongolian = tag(b"mong"),
    Ethiopic = tag(b"ethi"),
    Cherokee = tag(b"cher"),
    CanadianAboriginal = tag(b"cans"),
    Ogham = tag(b"ogam"),
    Runic = tag(b"runr"),
    Hangul = tag(b"hang"),
    Hiragana = tag(b"hira"),
    Katakana = tag(b"kana"),
    Bopomofo = tag(b"bopo"),
    Han = tag(b"hani"),
    Yi = tag(b"yi  "),
    Tifinagh = tag(b"tfng"),
    Vai = tag(b"vai "),
    Coptic = tag(b"copt"),
    Glagolitic = tag(b"glag"),
    Braille = tag(b"brai"),
    Adlam = tag(b"adlm"),
}

impl Script {
    /// OpenType script tag
    pub fn tag(self) -> Tag {
        // Both kana scripts share one OpenType script system.
        if self == Script::Hiragana {
            return Script::Katakana.tag();
        }
        Tag(self as u32)
    }

    /// Resolve a script from its OpenType/ISO-15924 tag, case-sensitively
    pub fn from_iso15924(t: Tag) -> Option<Self> {
        const ALL: &[Script] = &[
            Script::Latin,
            Script::Greek,
            Script::Cyrillic,
            Script::Armenian,
            Script::Georgian,
            Script::Hebrew,
            Script::Arabic,
            Script::Syriac,
            Script::Thaana,
            Script::Nko,
            Script::Samaritan,
            Script::Mandaic,
            Script::Devanagari,
            Script::Bengali,
            Script::Gurmukhi,
            Script::Gujarati,
            Script::Oriya,
            Script::Tamil,
            Script::Telugu,
            Script::Kannada,
            Script::Malayalam,
            Script::Sinhala,
            Script::Thai,
            Script::Lao,
            Script::Tibetan,
            Script::Myanmar,
            Script::Khmer,
            Script::Mongolian,
            Script::Ethiopic,
            Script::Cherokee,
            Script::CanadianAboriginal,
            Script::Ogham,
            Script::Runic,
            Script::Hangul,
            Script::Hiragana,
            Script::Katakana,
            Script::Bopomofo,
            Script::Han,
            Script::Yi,
            Script::Tifinagh,
            Script::Vai,
            Script::Coptic,
            Script::Glagolitic,
            Script::Braille,
            Script::Adlam,
        ];
        ALL.iter().copied().find(|&s| Tag(s as u32) == t)
    }

    /// Script of a Unicode codepoint
    pub fn of(c: char) -> Self {
        match c as u32 {
            0x0041..=0x005A | 0x0061..=0x007A |
            0x00C0..=0x00D6 | 0x00D8..=0x00F6 | 0x00F8..=0x00FF |
            0x0100..=0x024F | // Latin Extended-A/B
            0x1E00..=0x1EFF | // Latin Extended Additional
            0x2C60..=0x2C7F |
            0xA720..=0xA7FF |
            0xAB30..=0xAB6F |
            0xFB00..=0xFB06 => Script::Latin, // Latin ligature presentation forms

            0x0370..=0x0373 | 0x0375..=0x0377 | 0x037A..=0x037F |
            0x0384..=0x03FF | 0x1F00..=0x1FFF => Script::Greek,

            0x0400..=0x052F | 0x1C80..=0x1C8F | 0x2DE0..=0x2DFF |
            0xA640..=0xA69F => Script::Cyrillic,

            0x0531..=0x058F | 0xFB13..=0xFB17 => Script::Armenian,

            0x10A0..=0x10FF | 0x1C90..=0x1CBF | 0x2D00..=0x2D2F => Script::Georgian,

            0x0591..=0x05F4 | 0xFB1D..=0xFB4F => Script::Hebrew,

            0x0600..=0x0604 | 0x0606..=0x060B | 0x060D..=0x061A |
            0x061C..=0x061E | 0x0620..=0x063F | 0x0641..=0x064A |
            0x0656..=0x066F | 0x0671..=0x06DC | 0x06DE..=0x06FF |
            0x0750..=0x077F | 0x08A0..=0x08FF |
            0xFB50..=0xFDFF | 0xFE70..=0xFEFF => Script::Arabic,

            0x0700..=0x074F | 0x0860..=0x086F => Script::Syriac,

            0x0780..=0x07BF => Script::Thaana,

            0x07C0..=0x07FF => Script::Nko,

            0x0800..=0x083F => Script::Samaritan,

            0x0840..=0x085F => Script::Mandaic,

            0x0900..=0x0950 | 0x0953..=0x0963 | 0x0966..=0x097F |
            0xA8E0..=0xA8FF => Script::Devanagari,

            0x0980..=0x09FF => Script::Bengali,

            0x0A01..=0x0A7F => Script::Gurmukhi,

            0x0A81..=0x0AFF => Script::Gujarati,

            0x0B01..=0x0B7F => Script::Oriya,

            0x0B82..=0x0BFF => Script::Tamil,

            0x0C00..=0x0C7F => Script::Telugu,

            0x0C80..=0x0CFF => Script::Kannada,

            0x0D00..=0x0D7F => Script::Malayalam,

            0x0D81..=0x0DFF => Script::Sinhala,

            0x0E01..=0x0E7F => Script::Thai,

            0x0E81..=0x0EFF => Script::Lao,

            0x0F00..=0x0FFF => Script::Tibetan,

            0x1000..=0x109F | 0xA9E0..=0xA9FF | 0xAA60..=0xAA7F => Script::Myanmar,

            0x1780..=0x17FF | 0x19E0..=0x19FF => Script::Khmer,

            0x1800..=0x18AF => Script::Mongolian,

            0x1200..=0x139F | 0x2D80..=0x2DDF | 0xAB00..=0xAB2F => Script::Ethiopic,

            0x13A0..=0x13FF | 0xAB70..=0xABBF => Script::Cherokee,

            0x1400..=0x167F | 0x18B0..=0x18FF => Script::CanadianAboriginal,

            0x1680..=0x169F => Script::Ogham,

            0x16A0..=0x16FF => Script::Runic,

            0x1100..=0x11FF | 0x3130..=0x318F | 0xA960..=0xA97F |
            0xAC00..=0xD7FF => Script::Hangul,

            0x3041..=0x309F | 0x1B000..=0x1B16F => Script::Hiragana,

            0x30A1..=0x30FA | 0x30FD..=0x30FF | 0x31F0..=0x31FF |
            0xFF66..=0xFF9F => Script::Katakana,

            0x3105..=0x312F | 0x31A0..=0x31BF => Script::Bopomofo,

            0x2E80..=0x2FDF | // radicals
            0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF |
            0x20000..=0x2EBEF | 0x2F800..=0x2FA1F => Script::Han,

            0xA000..=0xA4CF => Script::Yi,

            0x2D30..=0x2D7F => Script::Tifinagh,

            0xA500..=0xA63F => Script::Vai,

            0x2C80..=0x2CFF | 0x03E2..=0x03EF => Script::Coptic,

            0x2C00..=0x2C5F | 0x1E000..=0x1E02F => Script::Glagolitic,

            0x2800..=0x28FF => Script::Braille,

            0x1E900..=0x1E95F => Script::Adlam,

            // Marks and joiners that take the script of their base
            0x0300..=0x036F | // Combining Diacritical Marks
            0x1AB0..=0x1AFF |
            0x1DC0..=0x1DFF |
            0x20D0..=0x20FF |
            0x200C..=0x200D | // ZWNJ, ZWJ
            0xFE00..=0xFE0F | // Variation Selectors
            0xFE20..=0xFE2F => Script::Inherited,

            _ => Script::Common,
        }
    }

    /// Horizontal direction this script is written in
    pub fn horizontal_direction(self) -> Direction {
        match self {
            Script::Arabic
            | Script::Hebrew
            | Script::Syriac
            | Script::Thaana
            | Script::Nko
            | Script::Samaritan
            | Script::Mandaic
            | Script::Adlam => Direction::RightToLeft,
            _ => Direction::LeftToRight,
        }
    }

    /// Scripts whose letters join cursively and need joining analysis
    pub fn uses_joining(self) -> bool {
        matches!(
            self,
            Script::Arabic | Script::Syriac | Script::Nko | Script::Mandaic | Script::Mongolian
        )
    }

    /// Scripts that use Indic syllable structure and matra reordering
    pub fn is_indic(self) -> bool {
        matches!(
            self,
            Script::Devanagari
                | Script::Bengali
                | Script::Gurmukhi
                | Script::Gujarati
                | Script::Oriya
                | Script::Tamil
                | Script::Telugu
                | Script::Kannada
                | Script::Malayalam
                | Script::Sinhala
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_of_latin() {
        assert_eq!(Script::of('A'), Script::Latin);
        assert_eq!(Script::of('é'), Script::Latin);
    }

    #[test]
    fn test_script_of_rtl() {
        assert_eq!(Script::of('א'), Script::Hebrew);
        assert_eq!(Script::of('ب'), Script::Arabic);
        assert_eq!(Script::Arabic.horizontal_direction(), Direction::RightToLeft);
        assert_eq!(Script::Hebrew.horizontal_direction(), Direction::RightToLeft);
    }

    #[test]
    fn test_script_of_cjk() {
        assert_eq!(Script::of('中'), Script::Han);
        assert_eq!(Script::of('あ'), Script::Hiragana);
        assert_eq!(Script::of('한'), Script::Hangul);
    }

    #[test]
    fn test_script_of_marks_inherited() {
        assert_eq!(Script::of('\u{0301}'), Script::Inherited);
        assert_eq!(Script::of('\u{200D}'), Script::Inherited);
        assert_eq!(Script::of(' '), Script::Common);
    }

    #[test]
    fn test_script_classes() {
        assert!(Script::Arabic.uses_joining());
        assert!(!Script::Hebrew.uses_joining());
        assert!(Script::Devanagari.is_indic());
        assert!(!Script::Thai.is_indic());
    }

    #[test]
    fn test_script_tag_round_trip() {
        assert_eq!(Script::from_iso15924(Tag::from_bytes(b"arab")), Some(Script::Arabic));
        assert_eq!(Script::from_iso15924(Tag::from_bytes(b"dev2")), Some(Script::Devanagari));
        assert_eq!(Script::from_iso15924(Tag::from_bytes(b"zzzz")), None);
    }
}
