//! Unicode character properties
//!
//! Per-codepoint lookups the shaping pipeline needs: coarse general
//! category, canonical combining class, bracket mirroring, and a canonical
//! (de)composition table for the precomposed characters fonts commonly
//! vary on. Hangul syllables (de)compose algorithmically.

/// Coarse general category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralCategory {
    Letter,
    Mark,
    Number,
    Punctuation,
    Symbol,
    Separator,
    Control,
    Format,
    Other,
}

impl GeneralCategory {
    /// Coarse category of a codepoint
    pub fn of(c: char) -> Self {
        let code = c as u32;
        match code {
            0x0000..=0x001F | 0x007F..=0x009F => GeneralCategory::Control,
            0x00AD | 0x200B..=0x200F | 0x202A..=0x202E | 0x2060..=0x2064 | 0xFEFF => {
                GeneralCategory::Format
            }
            0x0020 | 0x00A0 | 0x2000..=0x200A | 0x2028..=0x2029 | 0x202F | 0x3000 => {
                GeneralCategory::Separator
            }
            0x0030..=0x0039 | 0x0660..=0x0669 | 0x06F0..=0x06F9 | 0x0966..=0x096F
            | 0x09E6..=0x09EF | 0x0BE6..=0x0BEF | 0x0E50..=0x0E59 | 0xFF10..=0xFF19 => {
                GeneralCategory::Number
            }
            0x0021..=0x0023 | 0x0025..=0x002A | 0x002C..=0x002F | 0x003A..=0x003B
            | 0x003F..=0x0040 | 0x005B..=0x005D | 0x005F | 0x007B | 0x007D
            | 0x00A1 | 0x00BF | 0x060C | 0x061B | 0x061F | 0x066A..=0x066D
            | 0x2010..=0x2027 | 0x3001..=0x3011 | 0xFE50..=0xFE6B | 0xFF01..=0xFF0F => {
                GeneralCategory::Punctuation
            }
            _ if is_mark(c) => GeneralCategory::Mark,
            0x0024 | 0x002B | 0x003C..=0x003E | 0x005E | 0x0060 | 0x007C | 0x007E
            | 0x00A2..=0x00A9 | 0x20A0..=0x20CF | 0x2190..=0x2BFF => GeneralCategory::Symbol,
            _ if c.is_alphabetic() || matches!(code, 0x3040..=0x9FFF | 0xAC00..=0xD7FF) => {
                GeneralCategory::Letter
            }
            _ => GeneralCategory::Other,
        }
    }
}

/// Check if a codepoint is a combining mark (spacing or non-spacing)
pub fn is_mark(c: char) -> bool {
    let code = c as u32;
    matches!(code,
        0x0300..=0x036F
        | 0x0483..=0x0489
        | 0x0591..=0x05BD | 0x05BF | 0x05C1..=0x05C2 | 0x05C4..=0x05C5 | 0x05C7
        | 0x0610..=0x061A | 0x064B..=0x065F | 0x0670 | 0x06D6..=0x06DC
        | 0x06DF..=0x06E4 | 0x06E7..=0x06E8 | 0x06EA..=0x06ED
        | 0x0711 | 0x0730..=0x074A
        | 0x07A6..=0x07B0 | 0x07EB..=0x07F3
        | 0x0816..=0x0819 | 0x081B..=0x0823 | 0x0825..=0x0827 | 0x0829..=0x082D
        | 0x0859..=0x085B | 0x08D3..=0x08FF
        | 0x0900..=0x0903 | 0x093A..=0x093C | 0x093E..=0x094F | 0x0951..=0x0957
        | 0x0962..=0x0963
        | 0x0981..=0x0983 | 0x09BC | 0x09BE..=0x09CD | 0x09D7 | 0x09E2..=0x09E3
        | 0x0A01..=0x0A03 | 0x0A3C | 0x0A3E..=0x0A4D | 0x0A51 | 0x0A70..=0x0A71
        | 0x0A81..=0x0A83 | 0x0ABC | 0x0ABE..=0x0ACD | 0x0AE2..=0x0AE3
        | 0x0B01..=0x0B03 | 0x0B3C | 0x0B3E..=0x0B4D | 0x0B55..=0x0B57
        | 0x0B82 | 0x0BBE..=0x0BCD | 0x0BD7
        | 0x0C00..=0x0C04 | 0x0C3E..=0x0C4D | 0x0C55..=0x0C56 | 0x0C62..=0x0C63
        | 0x0C81..=0x0C83 | 0x0CBC | 0x0CBE..=0x0CCD | 0x0CD5..=0x0CD6
        | 0x0D00..=0x0D03 | 0x0D3B..=0x0D3C | 0x0D3E..=0x0D4D | 0x0D57
        | 0x0D81..=0x0D83 | 0x0DCA | 0x0DCF..=0x0DDF | 0x0DF2..=0x0DF3
        | 0x0E31 | 0x0E34..=0x0E3A | 0x0E47..=0x0E4E
        | 0x0EB1 | 0x0EB4..=0x0EBC | 0x0EC8..=0x0ECD
        | 0x0F18..=0x0F19 | 0x0F35 | 0x0F37 | 0x0F39 | 0x0F3E..=0x0F3F
        | 0x0F71..=0x0F84 | 0x0F86..=0x0F87 | 0x0F8D..=0x0FBC | 0x0FC6
        | 0x102B..=0x103E | 0x1056..=0x1059 | 0x105E..=0x1060 | 0x1062..=0x1064
        | 0x1067..=0x106D | 0x1071..=0x1074 | 0x1082..=0x108D | 0x108F
        | 0x109A..=0x109D
        | 0x135D..=0x135F
        | 0x1712..=0x1714 | 0x1732..=0x1734 | 0x1752..=0x1753 | 0x1772..=0x1773
        | 0x17B4..=0x17D3 | 0x17DD
        | 0x180B..=0x180D | 0x1885..=0x1886 | 0x18A9
        | 0x1920..=0x193B | 0x1A17..=0x1A1B | 0x1A55..=0x1A7F
        | 0x1AB0..=0x1AFF | 0x1B00..=0x1B04 | 0x1B34..=0x1B44
        | 0x1DC0..=0x1DFF
        | 0x20D0..=0x20F0
        | 0x2CEF..=0x2CF1 | 0x2DE0..=0x2DFF
        | 0x302A..=0x302F | 0x3099..=0x309A
        | 0xA66F..=0xA672 | 0xA674..=0xA67D | 0xA69E..=0xA69F
        | 0xA8E0..=0xA8F1 | 0xA926..=0xA92D | 0xA947..=0xA953 | 0xA980..=0xA983
        | 0xA9B3..=0xA9C0
        | 0xAA29..=0xAA36 | 0xAA43 | 0xAA4C..=0xAA4D | 0xAAB0..=0xAAC1
        | 0xABE3..=0xABEA | 0xABEC..=0xABED
        | 0xFB1E | 0xFE00..=0xFE0F | 0xFE20..=0xFE2F
    )
}

/// Canonical combining class
///
/// 0 means a starter; marks carry the class that orders them during
/// normalization. Only the blocks shaping actually reorders are covered;
/// everything else reports 0.
pub fn combining_class(c: char) -> u8 {
    match c as u32 {
        // General diacritics
        0x0300..=0x0314 => 230,
        0x0315 => 232,
        0x0316..=0x0319 => 220,
        0x031A => 232,
        0x031B => 216,
        0x031C..=0x0320 => 220,
        0x0321..=0x0322 => 202,
        0x0323..=0x0326 => 220,
        0x0327..=0x0328 => 202,
        0x0329..=0x0333 => 220,
        0x0334..=0x0338 => 1,
        0x0339..=0x033C => 220,
        0x033D..=0x0344 => 230,
        0x0345 => 240,
        0x0346..=0x036F => 230,
        0x1AB0..=0x1ABD => 230,
        0x1DC0..=0x1DFF => 230,
        0x20D0..=0x20DC => 230,

        // Hebrew points
        0x0591..=0x05BD => {
            let code = c as u32;
            match code {
                0x05B0..=0x05B9 => (code - 0x05B0 + 10) as u8,
                0x05BB => 20,
                0x05BC => 21,
                0x05BD => 22,
                _ => 230,
            }
        }
        0x05BF => 23,
        0x05C1 => 24,
        0x05C2 => 25,
        0x05C7 => 18,

        // Arabic harakat
        0x064B => 27,
        0x064C => 28,
        0x064D => 29,
        0x064E => 30,
        0x064F => 31,
        0x0650 => 32,
        0x0651 => 33,
        0x0652 => 34,
        0x0653..=0x0654 => 230,
        0x0655..=0x0656 => 220,
        0x0670 => 35,
        0x06D6..=0x06DC => 230,
        0x06DF..=0x06E4 => 230,
        0x06E7..=0x06E8 => 230,
        0x06EA => 220,
        0x06EB..=0x06EC => 230,
        0x06ED => 220,

        // Indic nukta and virama
        0x093C | 0x09BC | 0x0A3C | 0x0ABC | 0x0B3C | 0x0CBC => 7,
        0x094D | 0x09CD | 0x0A4D | 0x0ACD | 0x0B4D | 0x0BCD | 0x0C4D | 0x0CCD
        | 0x0D4D | 0x0DCA | 0x1B44 => 9,
        0x0951 => 230,
        0x0952 => 220,

        // Thai and Lao
        0x0E38..=0x0E39 => 103,
        0x0E3A => 9,
        0x0E48..=0x0E4B => 107,
        0x0EB8..=0x0EB9 => 118,
        0x0EC8..=0x0ECB => 122,

        // Kana voicing marks
        0x3099..=0x309A => 8,

        _ => 0,
    }
}

/// Mirrored counterpart for paired punctuation, if any
pub fn mirror(c: char) -> Option<char> {
    let m = match c {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '\u{00AB}' => '\u{00BB}',
        '\u{00BB}' => '\u{00AB}',
        '\u{2018}' => '\u{2019}',
        '\u{2019}' => '\u{2018}',
        '\u{201C}' => '\u{201D}',
        '\u{201D}' => '\u{201C}',
        '\u{2039}' => '\u{203A}',
        '\u{203A}' => '\u{2039}',
        '\u{2045}' => '\u{2046}',
        '\u{2046}' => '\u{2045}',
        '\u{2264}' => '\u{2265}',
        '\u{2265}' => '\u{2264}',
        '\u{2329}' => '\u{232A}',
        '\u{232A}' => '\u{2329}',
        '\u{3008}' => '\u{3009}',
        '\u{3009}' => '\u{3008}',
        '\u{300A}' => '\u{300B}',
        '\u{300B}' => '\u{300A}',
        '\u{300C}' => '\u{300D}',
        '\u{300D}' => '\u{300C}',
        '\u{FF08}' => '\u{FF09}',
        '\u{FF09}' => '\u{FF08}',
        _ => return None,
    };
    Some(m)
}

/// Codepoints the shaper hides from output (joiners, BOM, selectors)
pub fn is_default_ignorable(c: char) -> bool {
    matches!(c as u32,
        0x00AD // soft hyphen
        | 0x034F // CGJ
        | 0x180B..=0x180E
        | 0x200B..=0x200F
        | 0x202A..=0x202E
        | 0x2060..=0x206F
        | 0xFE00..=0xFE0F
        | 0xFEFF
        | 0xE0100..=0xE01EF
    )
}

/// Canonical decompositions: (composed, base, combining mark)
///
/// The pairs fonts most often carry precomposed or built from parts.
const DECOMPOSITIONS: &[(u32, u32, u32)] = &[
    // Latin-1 Supplement
    (0x00C0, 0x0041, 0x0300),
    (0x00C1, 0x0041, 0x0301),
    (0x00C2, 0x0041, 0x0302),
    (0x00C3, 0x0041, 0x0303),
    (0x00C4, 0x0041, 0x0308),
    (0x00C5, 0x0041, 0x030A),
    (0x00C7, 0x0043, 0x0327),
    (0x00C8, 0x0045, 0x0300),
    (0x00C9, 0x0045, 0x0301),
    (0x00CA, 0x0045, 0x0302),
    (0x00CB, 0x0045, 0x0308),
    (0x00CC, 0x0049, 0x0300),
    (0x00CD, 0x0049, 0x0301),
    (0x00CE, 0x0049, 0x0302),
    (0x00CF, 0x0049, 0x0308),
    (0x00D1, 0x004E, 0x0303),
    (0x00D2, 0x004F, 0x0300),
    (0x00D3, 0x004F, 0x0301),
    (0x00D4, 0x004F, 0x0302),
    (0x00D5, 0x004F, 0x0303),
    (0x00D6, 0x004F, 0x0308),
    (0x00D9, 0x0055, 0x0300),
    (0x00DA, 0x0055, 0x0301),
    (0x00DB, 0x0055, 0x0302),
    (0x00DC, 0x0055, 0x0308),
    (0x00DD, 0x0059, 0x0301),
    (0x00E0, 0x0061, 0x0300),
    (0x00E1, 0x0061, 0x0301),
    (0x00E2, 0x0061, 0x0302),
    (0x00E3, 0x0061, 0x0303),
    (0x00E4, 0x0061, 0x0308),
    (0x00E5, 0x0061, 0x030A),
    (0x00E7, 0x0063, 0x0327),
    (0x00E8, 0x0065, 0x0300),
    (0x00E9, 0x0065, 0x0301),
    (0x00EA, 0x0065, 0x0302),
    (0x00EB, 0x0065, 0x0308),
    (0x00EC, 0x0069, 0x0300),
    (0x00ED, 0x0069, 0x0301),
    (0x00EE, 0x0069, 0x0302),
    (0x00EF, 0x0069, 0x0308),
    (0x00F1, 0x006E, 0x0303),
    (0x00F2, 0x006F, 0x0300),
    (0x00F3, 0x006F, 0x0301),
    (0x00F4, 0x006F, 0x0302),
    (0x00F5, 0x006F, 0x0303),
    (0x00F6, 0x006F, 0x0308),
    (0x00F9, 0x0075, 0x0300),
    (0x00FA, 0x0075, 0x0301),
    (0x00FB, 0x0075, 0x0302),
    (0x00FC, 0x0075, 0x0308),
    (0x00FD, 0x0079, 0x0301),
    (0x00FF, 0x0079, 0x0308),
    // Latin Extended-A, common cases
    (0x0100, 0x0041, 0x0304),
    (0x0101, 0x0061, 0x0304),
    (0x0106, 0x0043, 0x0301),
    (0x0107, 0x0063, 0x0301),
    (0x010C, 0x0043, 0x030C),
    (0x010D, 0x0063, 0x030C),
    (0x010E, 0x0044, 0x030C),
    (0x010F, 0x0064, 0x030C),
    (0x0112, 0x0045, 0x0304),
    (0x0113, 0x0065, 0x0304),
    (0x0118, 0x0045, 0x0328),
    (0x0119, 0x0065, 0x0328),
    (0x011A, 0x0045, 0x030C),
    (0x011B, 0x0065, 0x030C),
    (0x011E, 0x0047, 0x0306),
    (0x011F, 0x0067, 0x0306),
    (0x012A, 0x0049, 0x0304),
    (0x012B, 0x0069, 0x0304),
    (0x0130, 0x0049, 0x0307),
    (0x0143, 0x004E, 0x0301),
    (0x0144, 0x006E, 0x0301),
    (0x0147, 0x004E, 0x030C),
    (0x0148, 0x006E, 0x030C),
    (0x014C, 0x004F, 0x0304),
    (0x014D, 0x006F, 0x0304),
    (0x0150, 0x004F, 0x030B),
    (0x0151, 0x006F, 0x030B),
    (0x0158, 0x0052, 0x030C),
    (0x0159, 0x0072, 0x030C),
    (0x015A, 0x0053, 0x0301),
    (0x015B, 0x0073, 0x0301),
    (0x015E, 0x0053, 0x0327),
    (0x015F, 0x0073, 0x0327),
    (0x0160, 0x0053, 0x030C),
    (0x0161, 0x0073, 0x030C),
    (0x0164, 0x0054, 0x030C),
    (0x0165, 0x0074, 0x030C),
    (0x016A, 0x0055, 0x0304),
    (0x016B, 0x0075, 0x0304),
    (0x016E, 0x0055, 0x030A),
    (0x016F, 0x0075, 0x030A),
    (0x0170, 0x0055, 0x030B),
    (0x0171, 0x0075, 0x030B),
    (0x0179, 0x005A, 0x0301),
    (0x017A, 0x007A, 0x0301),
    (0x017B, 0x005A, 0x0307),
    (0x017C, 0x007A, 0x0307),
    (0x017D, 0x005A, 0x030C),
    (0x017E, 0x007A, 0x030C),
    // Greek with tonos/dialytika
    (0x0386, 0x0391, 0x0301),
    (0x0388, 0x0395, 0x0301),
    (0x0389, 0x0397, 0x0301),
    (0x038A, 0x0399, 0x0301),
    (0x038C, 0x039F, 0x0301),
    (0x038E, 0x03A5, 0x0301),
    (0x038F, 0x03A9, 0x0301),
    (0x03AA, 0x0399, 0x0308),
    (0x03AB, 0x03A5, 0x0308),
    (0x03AC, 0x03B1, 0x0301),
    (0x03AD, 0x03B5, 0x0301),
    (0x03AE, 0x03B7, 0x0301),
    (0x03AF, 0x03B9, 0x0301),
    (0x03CA, 0x03B9, 0x0308),
    (0x03CB, 0x03C5, 0x0308),
    (0x03CC, 0x03BF, 0x0301),
    (0x03CD, 0x03C5, 0x0301),
    (0x03CE, 0x03C9, 0x0301),
    // Cyrillic
    (0x0401, 0x0415, 0x0308),
    (0x0419, 0x0418, 0x0306),
    (0x0439, 0x0438, 0x0306),
    (0x0451, 0x0435, 0x0308),
    // Arabic hamza forms
    (0x0622, 0x0627, 0x0653),
    (0x0623, 0x0627, 0x0654),
    (0x0624, 0x0648, 0x0654),
    (0x0625, 0x0627, 0x0655),
    (0x0626, 0x064A, 0x0654),
    // Kana voicing
    (0x304C, 0x304B, 0x3099),
    (0x304E, 0x304D, 0x3099),
    (0x3050, 0x304F, 0x3099),
    (0x3052, 0x3051, 0x3099),
    (0x3054, 0x3053, 0x3099),
    (0x30AC, 0x30AB, 0x3099),
    (0x30D1, 0x30CF, 0x309A),
];

const HANGUL_S_BASE: u32 = 0xAC00;
const HANGUL_L_BASE: u32 = 0x1100;
const HANGUL_V_BASE: u32 = 0x1161;
const HANGUL_T_BASE: u32 = 0x11A7;
const HANGUL_V_COUNT: u32 = 21;
const HANGUL_T_COUNT: u32 = 28;
const HANGUL_N_COUNT: u32 = HANGUL_V_COUNT * HANGUL_T_COUNT;
const HANGUL_S_COUNT: u32 = 11172;

/// One step of canonical decomposition
///
/// Returns `(first, second)` where `second` is `None` for singleton
/// decompositions. Hangul syllables decompose algorithmically (LVT to
/// LV + T, LV to L + V).
pub fn decompose(c: char) -> Option<(char, Option<char>)> {
    let code = c as u32;

    if (HANGUL_S_BASE..HANGUL_S_BASE + HANGUL_S_COUNT).contains(&code) {
        let s_index = code - HANGUL_S_BASE;
        let t_index = s_index % HANGUL_T_COUNT;
        if t_index != 0 {
            let lv = HANGUL_S_BASE + (s_index - t_index);
            let t = HANGUL_T_BASE + t_index;
            return Some((char::from_u32(lv)?, char::from_u32(t)));
        }
        let l = HANGUL_L_BASE + s_index / HANGUL_N_COUNT;
        let v = HANGUL_V_BASE + (s_index % HANGUL_N_COUNT) / HANGUL_T_COUNT;
        return Some((char::from_u32(l)?, char::from_u32(v)));
    }

    DECOMPOSITIONS
        .iter()
        .find(|&&(composed, _, _)| composed == code)
        .and_then(|&(_, base, mark)| Some((char::from_u32(base)?, char::from_u32(mark))))
}

/// Canonical composition of a base plus combining mark, if one exists
pub fn compose(base: char, mark: char) -> Option<char> {
    let (b, m) = (base as u32, mark as u32);

    if (HANGUL_L_BASE..HANGUL_L_BASE + 19).contains(&b)
        && (HANGUL_V_BASE..HANGUL_V_BASE + HANGUL_V_COUNT).contains(&m)
    {
        let l_index = b - HANGUL_L_BASE;
        let v_index = m - HANGUL_V_BASE;
        return char::from_u32(HANGUL_S_BASE + (l_index * HANGUL_V_COUNT + v_index) * HANGUL_T_COUNT);
    }
    if (HANGUL_S_BASE..HANGUL_S_BASE + HANGUL_S_COUNT).contains(&b)
        && (b - HANGUL_S_BASE) % HANGUL_T_COUNT == 0
        && (HANGUL_T_BASE + 1..HANGUL_T_BASE + HANGUL_T_COUNT).contains(&m)
    {
        return char::from_u32(b + (m - HANGUL_T_BASE));
    }

    DECOMPOSITIONS
        .iter()
        .find(|&&(_, db, dm)| db == b && dm == m)
        .and_then(|&(composed, _, _)| char::from_u32(composed))
}
