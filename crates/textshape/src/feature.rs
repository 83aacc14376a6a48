//! Feature requests
//!
//! A feature request enables, disables or parametrizes a named font
//! capability over a cluster range of the buffer.

use crate::tag::Tag;
use crate::{Result, ShapeError};
use std::fmt;
use std::str::FromStr;

/// A request to apply a font feature over part of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Feature {
    /// Feature tag, e.g. `liga`, `kern`
    pub tag: Tag,
    /// 0 disables, 1 enables, >1 selects an alternate
    pub value: u32,
    /// First cluster the request covers (inclusive)
    pub start: u32,
    /// One past the last cluster covered
    pub end: u32,
}

impl Feature {
    /// Range sentinel meaning "from the beginning"
    pub const GLOBAL_START: u32 = 0;
    /// Range sentinel meaning "to the end"
    pub const GLOBAL_END: u32 = u32::MAX;

    /// Enable a feature over the whole buffer
    pub fn enable(tag: Tag) -> Self {
        Feature { tag, value: 1, start: Self::GLOBAL_START, end: Self::GLOBAL_END }
    }

    /// Disable a feature over the whole buffer
    pub fn disable(tag: Tag) -> Self {
        Feature { tag, value: 0, start: Self::GLOBAL_START, end: Self::GLOBAL_END }
    }

    /// True if the request covers every cluster
    pub fn is_global(&self) -> bool {
        self.start == Self::GLOBAL_START && self.end == Self::GLOBAL_END
    }

    /// True if the request covers the given cluster
    pub fn covers(&self, cluster: u32) -> bool {
        self.start <= cluster && cluster < self.end
    }
}

impl FromStr for Feature {
    type Err = ShapeError;

    /// Parse the textual feature-spec syntax `tag[=value][=start:end]`
    ///
    /// Examples: `"liga"`, `"kern=0"`, `"dlig=1=3:5"`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('=');

        let tag: Tag = parts
            .next()
            .filter(|t| !t.is_empty())
            .ok_or(ShapeError::InvalidOperation("empty feature string"))?
            .parse()?;

        let mut value = 1u32;
        if let Some(v) = parts.next() {
            value = v
                .parse()
                .map_err(|_| ShapeError::InvalidOperation("feature value is not an integer"))?;
        }

        let (mut start, mut end) = (Feature::GLOBAL_START, Feature::GLOBAL_END);
        if let Some(range) = parts.next() {
            let (s_str, e_str) = range
                .split_once(':')
                .ok_or(ShapeError::InvalidOperation("feature range must be start:end"))?;
            start = s_str
                .parse()
                .map_err(|_| ShapeError::InvalidOperation("feature range start is not an integer"))?;
            end = e_str
                .parse()
                .map_err(|_| ShapeError::InvalidOperation("feature range end is not an integer"))?;
            if end < start {
                return Err(ShapeError::InvalidOperation("feature range end precedes start"));
            }
        }

        if parts.next().is_some() {
            return Err(ShapeError::InvalidOperation("too many '=' sections in feature string"));
        }

        Ok(Feature { tag, value, start, end })
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        if self.value != 1 || !self.is_global() {
            write!(f, "={}", self.value)?;
        }
        if !self.is_global() {
            write!(f, "={}:{}", self.start, self.end)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_tag() {
        let f: Feature = "liga".parse().unwrap();
        assert_eq!(f.tag, Tag::from_bytes(b"liga"));
        assert_eq!(f.value, 1);
        assert!(f.is_global());
    }

    #[test]
    fn test_parse_disable() {
        let f: Feature = "kern=0".parse().unwrap();
        assert_eq!(f.tag, Tag::from_bytes(b"kern"));
        assert_eq!(f.value, 0);
        assert!(f.is_global());
    }

    #[test]
    fn test_parse_ranged() {
        let f: Feature = "dlig=1=3:5".parse().unwrap();
        assert_eq!(f.tag, Tag::from_bytes(b"dlig"));
        assert_eq!(f.value, 1);
        assert_eq!((f.start, f.end), (3, 5));
        assert!(f.covers(3));
        assert!(f.covers(4));
        assert!(!f.covers(5));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Feature>().is_err());
        assert!("liga=x".parse::<Feature>().is_err());
        assert!("liga=1=5".parse::<Feature>().is_err());
        assert!("liga=1=5:3".parse::<Feature>().is_err());
        assert!("liga=1=3:5=9".parse::<Feature>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["liga", "kern=0", "dlig=1=3:5", "aalt=2"] {
            let f: Feature = s.parse().unwrap();
            assert_eq!(f.to_string(), s);
        }
    }

    #[test]
    fn test_zero_width_range_covers_nothing() {
        let f: Feature = "liga=1=4:4".parse().unwrap();
        assert!(!f.covers(4));
    }
}
