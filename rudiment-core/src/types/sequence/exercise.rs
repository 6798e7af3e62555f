//! Exercise: patterns drained one after another.

use super::pattern::Pattern;
use crate::types::frame::BeatFrame;

/// Normalize an exercise name for lookup: lowercase, spaces removed
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().chars().filter(|c| *c != ' ').collect()
}

/// An ordered list of patterns iterated end to end.
///
/// When the current pattern is exhausted the exercise moves on to the next
/// one, which continues from its own cursor. The exercise is exhausted once
/// every pattern from `pattern_idx` onwards is.
#[derive(Clone, Debug, PartialEq)]
pub struct Exercise {
    name: String,
    patterns: Vec<Pattern>,
    pattern_idx: usize,
}

impl Exercise {
    pub fn new(name: impl Into<String>, patterns: Vec<Pattern>) -> Self {
        Exercise {
            name: name.into(),
            patterns,
            pattern_idx: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lookup key for this exercise
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn pattern_idx(&self) -> usize {
        self.pattern_idx
    }

    /// The pattern currently being drained, if any remain
    pub fn current_pattern(&self) -> Option<&Pattern> {
        self.patterns.get(self.pattern_idx)
    }

    /// Bars emitted by a full pass from a reset state
    ///
    /// Saturates at `usize::MAX` for exercises too long to count.
    pub fn total_len(&self) -> usize {
        self.patterns
            .iter()
            .map(Pattern::max_len)
            .fold(0, usize::saturating_add)
    }

    /// Bars left before the whole exercise is exhausted, saturating at
    /// `usize::MAX`
    pub fn remaining(&self) -> usize {
        self.checked_remaining().unwrap_or(usize::MAX)
    }

    fn checked_remaining(&self) -> Option<usize> {
        self.patterns
            .iter()
            .skip(self.pattern_idx)
            .map(Pattern::remaining)
            .try_fold(0usize, usize::checked_add)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Emit the next bar, moving past exhausted patterns; `None` once the
    /// last pattern is drained. Does not wrap.
    pub fn advance(&mut self) -> Option<BeatFrame> {
        while let Some(pattern) = self.patterns.get_mut(self.pattern_idx) {
            if let Some(frame) = pattern.advance() {
                return Some(frame);
            }
            self.pattern_idx += 1;
            if let Some(next) = self.patterns.get(self.pattern_idx) {
                tracing::debug!(exercise = %self.name, pattern = %next.name(), "next pattern");
            }
        }
        None
    }

    /// Index of the pattern the next emission comes from, without moving
    fn next_source(&self) -> Option<usize> {
        (self.pattern_idx..self.patterns.len()).find(|&idx| !self.patterns[idx].is_exhausted())
    }

    /// The bar the next [`Exercise::advance`] would emit, without moving
    pub fn preview_next(&self) -> Option<BeatFrame> {
        self.next_source()
            .and_then(|idx| self.patterns[idx].preview_next())
    }

    /// Up to `count` upcoming bars, in emission order, without moving
    pub fn upcoming(&self, count: usize) -> Vec<BeatFrame> {
        self.patterns
            .iter()
            .skip(self.pattern_idx)
            .flat_map(|pattern| (pattern.cursor()..pattern.max_len()).map(move |i| pattern.at(i)))
            .take(count)
            .collect()
    }

    /// Whether at most one bar is left across the whole exercise
    pub fn is_last_beat(&self) -> bool {
        self.remaining() <= 1
    }

    /// Rewind to the first bar of the first pattern
    pub fn reset(&mut self) {
        self.pattern_idx = 0;
        for pattern in &mut self.patterns {
            pattern.reset();
        }
    }
}

impl Iterator for Exercise {
    type Item = BeatFrame;

    fn next(&mut self) -> Option<BeatFrame> {
        self.advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), self.checked_remaining())
    }
}
