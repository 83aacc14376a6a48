//! OpenType language systems

use crate::tag::Tag;

/// OpenType language-system tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language(pub Tag);

impl Language {
    /// Default language system (`dflt`)
    pub const DEFAULT: Language = Language(Tag::from_bytes(b"dflt"));

    pub const ENGLISH: Language = Language(Tag::from_bytes(b"ENG "));
    pub const ARABIC: Language = Language(Tag::from_bytes(b"ARA "));
    pub const URDU: Language = Language(Tag::from_bytes(b"URD "));
    pub const FARSI: Language = Language(Tag::from_bytes(b"FAR "));
    pub const HINDI: Language = Language(Tag::from_bytes(b"HIN "));
    pub const TURKISH: Language = Language(Tag::from_bytes(b"TRK "));
    pub const JAPANESE: Language = Language(Tag::from_bytes(b"JAN "));
    pub const KOREAN: Language = Language(Tag::from_bytes(b"KOR "));
    pub const CHINESE_SIMPLIFIED: Language = Language(Tag::from_bytes(b"ZHS "));
    pub const CHINESE_TRADITIONAL: Language = Language(Tag::from_bytes(b"ZHT "));
    pub const ROMANIAN: Language = Language(Tag::from_bytes(b"ROM "));
    pub const MOLDAVIAN: Language = Language(Tag::from_bytes(b"MOL "));

    /// Map a BCP 47 language tag to an OpenType language system
    ///
    /// Only the primary subtag is considered, except for Chinese where the
    /// script/region subtags pick simplified versus traditional.
    pub fn from_bcp47(tag: &str) -> Self {
        let primary = tag.split(['-', '_']).next().unwrap_or_default();

        match primary.to_ascii_lowercase().as_str() {
            "en" => Self::ENGLISH,
            "ar" => Self::ARABIC,
            "ur" => Self::URDU,
            "fa" => Self::FARSI,
            "hi" => Self::HINDI,
            "tr" => Self::TURKISH,
            "ja" => Self::JAPANESE,
            "ko" => Self::KOREAN,
            "ro" => Self::ROMANIAN,
            "mo" => Self::MOLDAVIAN,
            "zh" => {
                let rest = &tag[primary.len()..];
                if rest.contains("Hant") || rest.contains("TW") || rest.contains("HK") {
                    Self::CHINESE_TRADITIONAL
                } else {
                    Self::CHINESE_SIMPLIFIED
                }
            }
            _ => Self::DEFAULT,
        }
    }

    /// Language system from the process environment (`LANG`), if set
    pub fn from_env() -> Option<Self> {
        let lang = std::env::var("LANG").ok()?;
        let trimmed = lang.split('.').next().unwrap_or_default();
        if trimmed.is_empty() || trimmed == "C" || trimmed == "POSIX" {
            return None;
        }
        Some(Self::from_bcp47(trimmed))
    }

    /// The OpenType tag
    pub fn tag(self) -> Tag {
        self.0
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_bcp47() {
        assert_eq!(Language::from_bcp47("en-US"), Language::ENGLISH);
        assert_eq!(Language::from_bcp47("ar"), Language::ARABIC);
        assert_eq!(Language::from_bcp47("zh-Hant"), Language::CHINESE_TRADITIONAL);
        assert_eq!(Language::from_bcp47("zh-CN"), Language::CHINESE_SIMPLIFIED);
        assert_eq!(Language::from_bcp47("xx"), Language::DEFAULT);
    }

    #[test]
    fn test_language_posix_locale_form() {
        assert_eq!(Language::from_bcp47("tr_TR"), Language::TURKISH);
    }
}
