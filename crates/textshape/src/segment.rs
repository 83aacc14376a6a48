//! Run segmentation
//!
//! Splits input text into script-homogeneous runs, additionally bounded by
//! externally supplied bidi embedding levels. Characters of Common or
//! Inherited script attach to the surrounding real script so punctuation
//! never breaks a run on its own.

use crate::direction::Direction;
use crate::script::Script;

/// A shapeable slice of the input text
///
/// Read-only once produced; consumed by one shaping call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRun {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Resolved script of the run
    pub script: Script,
    /// Layout direction, from the embedding level when supplied
    pub direction: Direction,
    /// Bidi embedding level (0 when none was supplied)
    pub level: u8,
}

/// Segments text into script/direction-homogeneous runs
#[derive(Debug, Default)]
pub struct ScriptSegmenter;

impl ScriptSegmenter {
    pub fn new() -> Self {
        ScriptSegmenter
    }

    /// Split `text` into runs
    ///
    /// `levels` holds one bidi embedding level per character, produced by an
    /// external bidi pass; pass `None` for single-direction text. A level
    /// boundary always ends a run even inside one script; odd levels lay
    /// out right-to-left. The finer of the two boundaries wins.
    pub fn runs(&self, text: &str, levels: Option<&[u8]>) -> Vec<ScriptRun> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut runs = Vec::new();
        let mut chars = text.char_indices().peekable();
        let mut char_index = 0usize;

        let mut run_start = 0usize;
        let mut run_script: Option<Script> = None;
        let mut run_level = level_at(levels, 0);
        let mut last_real_script: Option<Script> = None;

        while let Some((offset, c)) = chars.next() {
            let level = level_at(levels, char_index);
            let script = Script::of(c);

            let resolved = match script {
                Script::Common | Script::Inherited => {
                    // Attach to the previous real script, or the next one
                    // when the run opens with shared characters.
                    last_real_script.or_else(|| {
                        chars
                            .clone()
                            .map(|(_, ahead)| Script::of(ahead))
                            .find(|s| !matches!(s, Script::Common | Script::Inherited))
                    })
                }
                real => {
                    last_real_script = Some(real);
                    Some(real)
                }
            };

            let script_breaks = match (run_script, resolved) {
                (Some(a), Some(b)) => a != b,
                _ => false,
            };
            if (level != run_level || script_breaks) && offset > run_start {
                runs.push(make_run(run_start, offset, run_script, run_level));
                run_start = offset;
                run_script = None;
            }

            run_level = level;
            if run_script.is_none() {
                run_script = resolved;
            }
            char_index += 1;
        }

        runs.push(make_run(run_start, text.len(), run_script, run_level));
        runs
    }
}

fn level_at(levels: Option<&[u8]>, index: usize) -> u8 {
    levels.and_then(|l| l.get(index).copied()).unwrap_or(0)
}

fn make_run(start: usize, end: usize, script: Option<Script>, level: u8) -> ScriptRun {
    let script = script.unwrap_or(Script::Common);
    let direction = if level % 2 == 1 {
        Direction::RightToLeft
    } else {
        script.horizontal_direction()
    };
    ScriptRun { start, end, script, direction, level }
}
