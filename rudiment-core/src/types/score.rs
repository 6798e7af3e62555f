//! Matching hits against the targets of the active bar.

use super::bar_table::Coordinate;
use super::frame::BeatFrame;
use super::voice::{PerVoice, Voice};

/// Default matching window, in beats, on either side of a target
pub const DEFAULT_TOLERANCE: f64 = 0.15;

/// Outcome of one hit
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Judgement {
    /// Matched the target at this coordinate; `offset` is hit minus target in beats
    Hit {
        voice: Voice,
        target: Coordinate,
        offset: f64,
    },
    /// Landed on a target that was already hit
    Repeat { voice: Voice, target: Coordinate },
    /// Nothing to hit within the tolerance
    Miss { voice: Voice },
}

/// The targets of one emitted bar and which of them were hit.
#[derive(Clone, Debug)]
pub struct TargetBoard {
    frame: BeatFrame,
    beats_per_bar: f64,
    tolerance: f64,
    hit: PerVoice<Vec<bool>>,
}

impl TargetBoard {
    pub fn new(frame: BeatFrame, beats_per_bar: usize, tolerance: f64) -> Self {
        let hit = PerVoice::from_fn(|voice| vec![false; frame[voice].len()]);
        TargetBoard {
            frame,
            beats_per_bar: beats_per_bar.max(1) as f64,
            tolerance,
            hit,
        }
    }

    pub fn frame(&self) -> &BeatFrame {
        &self.frame
    }

    /// Distance between two bar positions, wrapping around the bar line
    fn distance(&self, a: f64, b: f64) -> f64 {
        let d = (a - b).abs() % self.beats_per_bar;
        d.min(self.beats_per_bar - d)
    }

    /// Signed offset from target to hit, taking the short way round the bar line
    fn offset(&self, position: f64, target: f64) -> f64 {
        let raw = position - target;
        if raw > self.beats_per_bar / 2.0 {
            raw - self.beats_per_bar
        } else if raw < -self.beats_per_bar / 2.0 {
            raw + self.beats_per_bar
        } else {
            raw
        }
    }

    /// Judge a hit on `voice` at `position` beats into the bar.
    ///
    /// Picks the closest target of that voice within the tolerance; unhit
    /// targets win over already hit ones at equal distance.
    pub fn judge(&mut self, voice: Voice, position: f64) -> Judgement {
        let best = self.frame[voice]
            .iter()
            .enumerate()
            .map(|(i, target)| (i, *target, self.distance(position, *target)))
            .filter(|(_, _, d)| *d <= self.tolerance)
            .min_by(|a, b| {
                a.2.total_cmp(&b.2)
                    .then(self.hit[voice][a.0].cmp(&self.hit[voice][b.0]))
            });

        match best {
            None => Judgement::Miss { voice },
            Some((i, target, _)) if self.hit[voice][i] => Judgement::Repeat { voice, target },
            Some((i, target, _)) => {
                self.hit[voice][i] = true;
                Judgement::Hit {
                    voice,
                    target,
                    offset: self.offset(position, target),
                }
            }
        }
    }

    /// Targets not hit so far
    pub fn unhit(&self) -> Vec<(Voice, Coordinate)> {
        Voice::ALL
            .into_iter()
            .flat_map(|voice| {
                self.frame[voice]
                    .iter()
                    .zip(&self.hit[voice])
                    .filter(|(_, hit)| !**hit)
                    .map(move |(target, _)| (voice, *target))
            })
            .collect()
    }
}

/// Running totals for a practice session
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scoreboard {
    pub score: u32,
    pub misses: u32,
    pub combo: u32,
    pub max_combo: u32,
    /// Targets that passed without being hit
    pub missed_targets: u32,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, judgement: &Judgement) {
        match judgement {
            Judgement::Hit { .. } => {
                self.score += 1;
                self.combo += 1;
                self.max_combo = self.max_combo.max(self.combo);
            }
            Judgement::Repeat { .. } => {}
            Judgement::Miss { .. } => {
                self.misses += 1;
                self.combo = 0;
            }
        }
    }

    /// Account for a bar that has scrolled past
    pub fn close(&mut self, board: &TargetBoard) {
        let unhit = board.unhit().len() as u32;
        if unhit > 0 {
            self.missed_targets += unhit;
            self.combo = 0;
        }
    }

    /// Hit targets as a fraction of all targets seen, if any
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.score + self.missed_targets;
        (total > 0).then(|| self.score as f64 / total as f64)
    }
}
