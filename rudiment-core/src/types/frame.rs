//! The per-bar hit targets emitted by patterns and exercises.

use super::bar_table::{Bar, Coordinate};
use super::voice::{PerVoice, Voice};
use std::fmt;
use std::ops::Index;

/// Hit targets of every voice for one emitted bar.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeatFrame {
    /// Name of the pattern the bar came from
    pub name: String,
    /// Bar read from the pattern's table (0-indexed)
    pub bar_index: usize,
    /// Loop pass the bar belongs to (0-indexed)
    pub loop_index: usize,
    /// Coordinates per voice
    pub hits: PerVoice<Bar>,
}

impl BeatFrame {
    pub fn rh(&self) -> &[Coordinate] {
        &self.hits.rh
    }

    pub fn lh(&self) -> &[Coordinate] {
        &self.hits.lh
    }

    pub fn rf(&self) -> &[Coordinate] {
        &self.hits.rf
    }

    pub fn lf(&self) -> &[Coordinate] {
        &self.hits.lf
    }

    /// Whether no voice has a hit in this bar
    pub fn is_silent(&self) -> bool {
        self.hits.iter().all(|(_, bar)| bar.is_empty())
    }

    /// Every (voice, coordinate) target, ordered by time then voice
    pub fn targets(&self) -> Vec<(Voice, Coordinate)> {
        let mut targets: Vec<(Voice, Coordinate)> = self
            .hits
            .iter()
            .flat_map(|(voice, bar)| bar.iter().map(move |c| (voice, *c)))
            .collect();
        targets.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        targets
    }

    /// Render one voice as a row of `x`/`.` cells, `steps_per_beat` cells per beat.
    ///
    /// Coordinates are snapped to the nearest cell; hits past the end of the
    /// bar are not drawn.
    pub fn grid_row(&self, voice: Voice, beats_per_bar: usize, steps_per_beat: usize) -> String {
        let cells = beats_per_bar * steps_per_beat;
        let mut row = vec!['.'; cells];
        for coordinate in &self.hits[voice] {
            let cell = (coordinate * steps_per_beat as f64).round() as usize;
            if cell < cells {
                row[cell] = 'x';
            }
        }
        row.chunks(steps_per_beat.max(1))
            .map(|beat| beat.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl Index<Voice> for BeatFrame {
    type Output = [Coordinate];

    fn index(&self, voice: Voice) -> &[Coordinate] {
        &self.hits[voice]
    }
}

impl fmt::Display for BeatFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (bar {})", self.name, self.bar_index + 1)?;
        for (voice, bar) in self.hits.iter() {
            write!(f, " {} {:?}", voice, bar)?;
        }
        Ok(())
    }
}
