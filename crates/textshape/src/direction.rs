//! Text direction

use crate::script::Script;
use std::str::FromStr;

/// Direction a glyph run is laid out in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Left-to-right
    #[default]
    LeftToRight,
    /// Right-to-left
    RightToLeft,
    /// Top-to-bottom
    TopToBottom,
    /// Bottom-to-top
    BottomToTop,
}

impl Direction {
    /// Check if horizontal
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LeftToRight | Direction::RightToLeft)
    }

    /// Check if vertical
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::TopToBottom | Direction::BottomToTop)
    }

    /// Check if the run flows against memory order (RTL or BTT)
    pub fn is_backward(self) -> bool {
        matches!(self, Direction::RightToLeft | Direction::BottomToTop)
    }

    /// Opposite direction
    pub fn reverse(self) -> Self {
        match self {
            Direction::LeftToRight => Direction::RightToLeft,
            Direction::RightToLeft => Direction::LeftToRight,
            Direction::TopToBottom => Direction::BottomToTop,
            Direction::BottomToTop => Direction::TopToBottom,
        }
    }

    /// Horizontal direction a script is written in
    pub fn from_script(script: Script) -> Self {
        script.horizontal_direction()
    }
}

impl FromStr for Direction {
    type Err = crate::ShapeError;

    fn from_str(s: &str) -> crate::Result<Self> {
        // Only the first letter matters, matching common usage ("ltr", "l", "LTR").
        match s.as_bytes().first().map(|b| b.to_ascii_lowercase()) {
            Some(b'l') => Ok(Direction::LeftToRight),
            Some(b'r') => Ok(Direction::RightToLeft),
            Some(b't') => Ok(Direction::TopToBottom),
            Some(b'b') => Ok(Direction::BottomToTop),
            _ => Err(crate::ShapeError::InvalidOperation("unrecognized direction string")),
        }
    }
}
