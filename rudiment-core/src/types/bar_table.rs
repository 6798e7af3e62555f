//! Per-voice bar storage for a Pattern.

use super::voice::{PerVoice, Voice, Voices};
use crate::error::{Result, RudimentError};

/// Bar-relative position of one hit: `beat.fraction`
pub type Coordinate = f64;

/// Hits of one voice in one bar, in notation order
pub type Bar = Vec<Coordinate>;

/// Four equally long lists of bars, one per voice.
///
/// Every lane holds exactly `num_bars` bars; voices that were not supplied
/// are filled with empty bars at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct BarTable {
    lanes: PerVoice<Vec<Bar>>,
    num_bars: usize,
}

impl BarTable {
    /// Build a table from the supplied voices.
    ///
    /// Fails if no bars were supplied or if two supplied voices disagree on
    /// the number of bars.
    pub fn new(mut voices: Voices<Bar>) -> Result<Self> {
        let mut num_bars: Option<(Voice, usize)> = None;
        for voice in Voice::ALL {
            if let Some(bars) = voices.get(voice) {
                match num_bars {
                    None => num_bars = Some((voice, bars.len())),
                    Some((first, expected)) if expected != bars.len() => {
                        return Err(RudimentError::validation(format!(
                            "{} has {} bars but {} has {}",
                            voice,
                            bars.len(),
                            first,
                            expected
                        )));
                    }
                    Some(_) => {}
                }
            }
        }

        let num_bars = match num_bars {
            Some((_, n)) if n > 0 => n,
            _ => return Err(RudimentError::validation("pattern has no bars")),
        };

        let lanes =
            PerVoice::from_fn(|voice| voices.take(voice).unwrap_or_else(|| vec![Vec::new(); num_bars]));

        Ok(BarTable { lanes, num_bars })
    }

    pub fn num_bars(&self) -> usize {
        self.num_bars
    }

    /// All bars of one voice
    pub fn lane(&self, voice: Voice) -> &[Bar] {
        &self.lanes[voice]
    }

    /// One bar of one voice; `bar_index` wraps around `num_bars`
    pub fn bar(&self, voice: Voice, bar_index: usize) -> &[Coordinate] {
        &self.lanes[voice][bar_index % self.num_bars]
    }

    /// Total number of hits across all voices and bars
    pub fn hit_count(&self) -> usize {
        self.lanes
            .iter()
            .map(|(_, bars)| bars.iter().map(Vec::len).sum::<usize>())
            .sum()
    }
}
