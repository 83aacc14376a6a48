//! OpenType layout tables
//!
//! Bounds-checked typed views over GSUB, GPOS and GDEF, plus the script,
//! feature and lookup lists they share. All offsets resolve to indices at
//! parse time; nothing here touches a buffer.

pub mod common;
pub mod gdef;
pub mod gpos;
pub mod gsub;
pub mod layout;
