//! Pattern: a looped bar table with an iteration cursor.

use crate::error::{Result, RudimentError};
use crate::notation::decode_strict;
use crate::types::bar_table::{Bar, BarTable};
use crate::types::frame::BeatFrame;
use crate::types::voice::{PerVoice, Voice, Voices};

/// A named set of bars for the four voices, played `num_loops` times.
///
/// The cursor counts emitted bars. It runs from 0 to `max_len`
/// (`num_bars * num_loops`); the bar read for cursor `c` is always
/// `c % num_bars`, so looping never changes which bar is read.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    name: String,
    bars: BarTable,
    num_loops: usize,
    max_len: usize,
    cursor: usize,
}

impl Pattern {
    /// Build a pattern from already decoded bars
    pub fn new(name: impl Into<String>, voices: Voices<Bar>, num_loops: usize) -> Result<Self> {
        let name = name.into();
        if num_loops == 0 {
            return Err(RudimentError::validation(format!(
                "pattern '{}' must loop at least once",
                name
            )));
        }
        let bars = BarTable::new(voices).map_err(|e| e.within(&format!("pattern '{}'", name)))?;
        let max_len = bars.num_bars().checked_mul(num_loops).ok_or_else(|| {
            RudimentError::validation(format!(
                "pattern '{}': {} bars looped {} times is too long",
                name,
                bars.num_bars(),
                num_loops
            ))
        })?;
        Ok(Pattern {
            name,
            bars,
            num_loops,
            max_len,
            cursor: 0,
        })
    }

    /// Build a pattern from one beat string per bar per voice
    pub fn from_notation<S: AsRef<str>>(
        name: impl Into<String>,
        voices: Voices<S>,
        num_loops: usize,
    ) -> Result<Self> {
        let name = name.into();
        let decoded = voices.try_map(|voice, beat_str| {
            decode_strict(beat_str.as_ref())
                .map_err(|e| e.within(&format!("pattern '{}' {}", name, voice.label())))
        })?;
        Self::new(name, decoded, num_loops)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bars(&self) -> &BarTable {
        &self.bars
    }

    pub fn num_bars(&self) -> usize {
        self.bars.num_bars()
    }

    pub fn num_loops(&self) -> usize {
        self.num_loops
    }

    /// Total number of bars this pattern emits before it is exhausted
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of bars left before exhaustion
    pub fn remaining(&self) -> usize {
        self.max_len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.max_len()
    }

    /// The bar at `index % num_bars`, independent of the cursor
    pub fn at(&self, index: usize) -> BeatFrame {
        let bar_index = index % self.num_bars();
        BeatFrame {
            name: self.name.clone(),
            bar_index,
            loop_index: index / self.num_bars(),
            hits: PerVoice::from_fn(|voice: Voice| self.bars.bar(voice, bar_index).to_vec()),
        }
    }

    /// Emit the bar under the cursor and move on; `None` once exhausted.
    ///
    /// Exhaustion is sticky until [`Pattern::reset`] or [`Pattern::seek`].
    pub fn advance(&mut self) -> Option<BeatFrame> {
        if self.is_exhausted() {
            return None;
        }
        let frame = self.at(self.cursor);
        self.cursor += 1;
        Some(frame)
    }

    /// The bar the next [`Pattern::advance`] would emit, without moving
    pub fn preview_next(&self) -> Option<BeatFrame> {
        (!self.is_exhausted()).then(|| self.at(self.cursor))
    }

    /// Whether at most one bar is left, i.e. the next emission is the final one
    pub fn is_last_beat(&self) -> bool {
        self.remaining() <= 1
    }

    /// Rewind to the first bar
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor, clamped to `max_len`
    pub fn seek(&mut self, position: usize) {
        self.cursor = position.min(self.max_len());
    }
}

impl Iterator for Pattern {
    type Item = BeatFrame;

    fn next(&mut self) -> Option<BeatFrame> {
        self.advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}
