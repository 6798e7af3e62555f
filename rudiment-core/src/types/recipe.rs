//! Generated bars: note-value recipes and the rudiment library.

use std::fmt;

use num_traits::Zero;

use super::bar_table::Bar;
use super::sequence::Pattern;
use super::time::{beats, from_f64, time, to_coordinate, Time, RECIPE_PRECISION};
use super::voice::Voices;
use crate::error::{Result, RudimentError};
use crate::notation::{HIT, REST};

/// Note durations measured in beats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteValue {
    Quarter,
    Eighth,
    Triplet,
    Sixteenth,
    SixteenthTriplet,
    ThirtySecond,
    Empty,
}

impl NoteValue {
    pub const ALL: [NoteValue; 7] = [
        NoteValue::Quarter,
        NoteValue::Eighth,
        NoteValue::Triplet,
        NoteValue::Sixteenth,
        NoteValue::SixteenthTriplet,
        NoteValue::ThirtySecond,
        NoteValue::Empty,
    ];

    pub fn value(&self) -> Time {
        match self {
            NoteValue::Quarter => beats(1),
            NoteValue::Eighth => time(1, 2),
            NoteValue::Triplet => time(1, 3),
            NoteValue::Sixteenth => time(1, 4),
            NoteValue::SixteenthTriplet => time(1, 6),
            NoteValue::ThirtySecond => time(1, 8),
            NoteValue::Empty => Time::zero(),
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "quarter" | "q" | "4" => Some(NoteValue::Quarter),
            "eighth" | "e" | "8" => Some(NoteValue::Eighth),
            "triplet" | "eighthtriplet" | "t" => Some(NoteValue::Triplet),
            "sixteenth" | "s" | "16" => Some(NoteValue::Sixteenth),
            "sixteenthtriplet" | "st" => Some(NoteValue::SixteenthTriplet),
            "thirtysecond" | "ts" | "32" => Some(NoteValue::ThirtySecond),
            "empty" | "rest" => Some(NoteValue::Empty),
            _ => None,
        }
    }
}

impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NoteValue::Quarter => "quarter",
            NoteValue::Eighth => "eighth",
            NoteValue::Triplet => "triplet",
            NoteValue::Sixteenth => "sixteenth",
            NoteValue::SixteenthTriplet => "sixteenth-triplet",
            NoteValue::ThirtySecond => "thirty-second",
            NoteValue::Empty => "empty",
        };
        write!(f, "{}", name)
    }
}

/// Build a bar of evenly spaced hits.
///
/// `offset` is a fraction of `increment` that shifts every hit, so an
/// offset of 0.5 on sixteenths lands on the thirty-second upbeats.
pub fn bar_from_recipe(increment: NoteValue, offset: f64, num_beats: usize) -> Result<Bar> {
    let step = increment.value();
    if step.is_zero() {
        return Ok(Vec::new());
    }
    let start = step * from_f64(offset);
    let count = ((beats(num_beats as i64) - start) / step).ceil().to_integer();
    if count <= 0 {
        return Err(RudimentError::validation(format!(
            "recipe of {} notes offset by {} leaves no room in {} beats",
            increment, offset, num_beats
        )));
    }
    Ok((0..count)
        .map(|i| to_coordinate(start + step * beats(i), RECIPE_PRECISION))
        .collect())
}

/// Place notes back to back until they fill `num_beats`
pub fn bar_from_notes(values: &[NoteValue], num_beats: usize) -> Bar {
    let end = beats(num_beats as i64);
    let mut position = Time::zero();
    let mut bar = Vec::new();
    for value in values {
        bar.push(to_coordinate(position, RECIPE_PRECISION));
        position += value.value();
        if position >= end {
            break;
        }
    }
    bar
}

/// One-bar stickings over four beats. Sixteenth-based rudiments have four
/// steps per beat, triplet-based ones three.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rudiment {
    Quarters,
    QuartersOffset1,
    QuartersOffset2,
    QuartersOffset3,
    Singles,
    TrailingSingles,
    Doubles,
    TrailingDoubles,
    SplitDoubles,
    InnerDoubles,
    Paradiddle,
    TrailingParadiddle,
    ReverseParadiddle,
    TrailingReverseParadiddle,
    Fours,
    TrailingFours,
    TripletDowns,
    TripletMiddles,
    TripletUps,
    TripletDoubles,
    TripletSplit,
    TripletTrailingDoubles,
    TripletSingles,
    Threes,
}

impl Rudiment {
    pub const ALL: [Rudiment; 24] = [
        Rudiment::Quarters,
        Rudiment::QuartersOffset1,
        Rudiment::QuartersOffset2,
        Rudiment::QuartersOffset3,
        Rudiment::Singles,
        Rudiment::TrailingSingles,
        Rudiment::Doubles,
        Rudiment::TrailingDoubles,
        Rudiment::SplitDoubles,
        Rudiment::InnerDoubles,
        Rudiment::Paradiddle,
        Rudiment::TrailingParadiddle,
        Rudiment::ReverseParadiddle,
        Rudiment::TrailingReverseParadiddle,
        Rudiment::Fours,
        Rudiment::TrailingFours,
        Rudiment::TripletDowns,
        Rudiment::TripletMiddles,
        Rudiment::TripletUps,
        Rudiment::TripletDoubles,
        Rudiment::TripletSplit,
        Rudiment::TripletTrailingDoubles,
        Rudiment::TripletSingles,
        Rudiment::Threes,
    ];

    /// The right-hand sticking, one character per step
    pub fn sticking(&self) -> &'static str {
        match self {
            Rudiment::Quarters => "x---x---x---x---",
            Rudiment::QuartersOffset1 => "-x---x---x---x--",
            Rudiment::QuartersOffset2 => "--x---x---x---x-",
            Rudiment::QuartersOffset3 => "---x---x---x---x",
            Rudiment::Singles => "x-x-x-x-x-x-x-x-",
            Rudiment::TrailingSingles => "-x-x-x-x-x-x-x-x",
            Rudiment::Doubles => "xx--xx--xx--xx--",
            Rudiment::TrailingDoubles => "--xx--xx--xx--xx",
            Rudiment::SplitDoubles => "x--xx--xx--xx--x",
            Rudiment::InnerDoubles => "-xx--xx--xx--xx-",
            Rudiment::Paradiddle => "x-xx-x--x-xx-x--",
            Rudiment::TrailingParadiddle => "-x--x-xx-x--x-xx",
            Rudiment::ReverseParadiddle => "xx-x--x-xx-x--x-",
            Rudiment::TrailingReverseParadiddle => "--x-xx-x--x-xx-x",
            Rudiment::Fours => "xxxx----xxxx----",
            Rudiment::TrailingFours => "----xxxx----xxxx",
            Rudiment::TripletDowns => "x--x--x--x--",
            Rudiment::TripletMiddles => "-x--x--x--x-",
            Rudiment::TripletUps => "--x--x--x--x",
            Rudiment::TripletDoubles => "xx-xx-xx-xx-",
            Rudiment::TripletSplit => "x-xx-xx-xx-x",
            Rudiment::TripletTrailingDoubles => "-xx-xx-xx-xx",
            Rudiment::TripletSingles => "x-x-x-x-x-x-",
            Rudiment::Threes => "xxx---xxx---",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rudiment::Quarters => "quarters",
            Rudiment::QuartersOffset1 => "quarters-offset-1",
            Rudiment::QuartersOffset2 => "quarters-offset-2",
            Rudiment::QuartersOffset3 => "quarters-offset-3",
            Rudiment::Singles => "singles",
            Rudiment::TrailingSingles => "trailing-singles",
            Rudiment::Doubles => "doubles",
            Rudiment::TrailingDoubles => "trailing-doubles",
            Rudiment::SplitDoubles => "split-doubles",
            Rudiment::InnerDoubles => "inner-doubles",
            Rudiment::Paradiddle => "paradiddle",
            Rudiment::TrailingParadiddle => "trailing-paradiddle",
            Rudiment::ReverseParadiddle => "reverse-paradiddle",
            Rudiment::TrailingReverseParadiddle => "trailing-reverse-paradiddle",
            Rudiment::Fours => "fours",
            Rudiment::TrailingFours => "trailing-fours",
            Rudiment::TripletDowns => "triplet-downs",
            Rudiment::TripletMiddles => "triplet-middles",
            Rudiment::TripletUps => "triplet-ups",
            Rudiment::TripletDoubles => "triplet-doubles",
            Rudiment::TripletSplit => "triplet-split",
            Rudiment::TripletTrailingDoubles => "triplet-trailing-doubles",
            Rudiment::TripletSingles => "triplet-singles",
            Rudiment::Threes => "threes",
        }
    }

    /// Parse a rudiment name; case, spaces, dashes and underscores are ignored
    pub fn from_name(s: &str) -> Option<Self> {
        let wanted = s.to_lowercase().replace(['-', '_', ' '], "");
        let found = Rudiment::ALL
            .into_iter()
            .find(|r| r.name().replace('-', "") == wanted);
        found.or(match wanted.as_str() {
            "pd" | "diddle" => Some(Rudiment::Paradiddle),
            "rpd" => Some(Rudiment::ReverseParadiddle),
            _ => None,
        })
    }

    /// Steps per beat of the sticking
    pub fn steps_per_beat(&self) -> usize {
        self.sticking().len() / 4
    }

    /// The sticking with hits and rests swapped; the other hand's part
    pub fn flip(&self) -> String {
        flip_sticking(self.sticking())
    }

    /// Comma-separated notation for one bar of `beats_per_bar` beats,
    /// cycling through the sticking's beats
    pub fn to_notation(&self, beats_per_bar: usize) -> String {
        notation_for(self.sticking(), self.steps_per_beat(), beats_per_bar)
    }

    /// A pattern with the sticking on the right hand and its flip on the left
    pub fn pattern(&self, beats_per_bar: usize, num_loops: usize) -> Result<Pattern> {
        let steps = self.steps_per_beat();
        let right = notation_for(self.sticking(), steps, beats_per_bar);
        let left = notation_for(&self.flip(), steps, beats_per_bar);
        Pattern::from_notation(
            self.name(),
            Voices::new().right_hand(vec![right]).left_hand(vec![left]),
            num_loops,
        )
    }
}

impl fmt::Display for Rudiment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn flip_sticking(sticking: &str) -> String {
    sticking
        .chars()
        .map(|c| match c {
            HIT => REST,
            REST => HIT,
            other => other,
        })
        .collect()
}

fn notation_for(sticking: &str, steps_per_beat: usize, beats_per_bar: usize) -> String {
    let chunks: Vec<&str> = (0..sticking.len() / steps_per_beat)
        .map(|b| &sticking[b * steps_per_beat..(b + 1) * steps_per_beat])
        .collect();
    chunks
        .iter()
        .cycle()
        .take(beats_per_bar)
        .copied()
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixteenths_offset_by_half() {
        let bar = bar_from_recipe(NoteValue::Sixteenth, 0.5, 4).unwrap();
        assert_eq!(bar.len(), 16);
        assert_eq!(&bar[..3], &[0.125, 0.375, 0.625]);
        assert_eq!(bar[15], 3.875);
    }

    #[test]
    fn test_triplets_offset_by_half() {
        let bar = bar_from_recipe(NoteValue::Triplet, 0.5, 4).unwrap();
        assert_eq!(bar.len(), 12);
        assert_eq!(&bar[..4], &[0.167, 0.5, 0.833, 1.167]);
    }

    #[test]
    fn test_quarters_fill_the_bar() {
        let bar = bar_from_recipe(NoteValue::Quarter, 0.0, 3).unwrap();
        assert_eq!(bar, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_empty_recipe() {
        assert!(bar_from_recipe(NoteValue::Empty, 0.0, 4).unwrap().is_empty());
    }

    #[test]
    fn test_recipe_without_room_is_rejected() {
        let result = bar_from_recipe(NoteValue::Quarter, 5.0, 4);
        assert!(matches!(result, Err(RudimentError::Validation(_))));
    }

    #[test]
    fn test_bar_from_notes() {
        use NoteValue::*;
        let bar = bar_from_notes(&[Quarter, Eighth, Eighth, Triplet, Triplet, Triplet, Quarter, Quarter], 4);
        assert_eq!(bar, vec![0.0, 1.0, 1.5, 2.0, 2.333, 2.667, 3.0]);
    }

    #[test]
    fn test_note_value_names() {
        assert_eq!(NoteValue::from_name("16"), Some(NoteValue::Sixteenth));
        assert_eq!(
            NoteValue::from_name("Sixteenth-Triplet"),
            Some(NoteValue::SixteenthTriplet)
        );
        assert_eq!(NoteValue::from_name("whole"), None);
        for value in NoteValue::ALL {
            assert_eq!(NoteValue::from_name(&value.to_string()), Some(value));
        }
    }

    #[test]
    fn test_flip() {
        assert_eq!(Rudiment::Paradiddle.flip(), "-x--x-xx-x--x-xx");
        assert_eq!(
            Rudiment::Paradiddle.flip(),
            Rudiment::TrailingParadiddle.sticking()
        );
    }

    #[test]
    fn test_every_sticking_spans_four_beats() {
        for rudiment in Rudiment::ALL {
            let len = rudiment.sticking().len();
            assert!(len == 16 || len == 12, "{} has {} steps", rudiment, len);
            assert_eq!(Rudiment::from_name(rudiment.name()), Some(rudiment));
        }
    }

    #[test]
    fn test_to_notation_cycles_beats() {
        assert_eq!(Rudiment::Paradiddle.to_notation(4), "x-xx,-x--,x-xx,-x--");
        assert_eq!(Rudiment::Paradiddle.to_notation(3), "x-xx,-x--,x-xx");
        assert_eq!(Rudiment::TripletDowns.to_notation(2), "x--,x--");
    }

    #[test]
    fn test_rudiment_pattern_splits_hands() {
        let pattern = Rudiment::Singles.pattern(4, 2).unwrap();
        assert_eq!(pattern.name(), "singles");
        assert_eq!(pattern.max_len(), 2);
        let frame = pattern.at(0);
        assert_eq!(frame.rh(), &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]);
        assert_eq!(frame.lh(), &[0.25, 0.75, 1.25, 1.75, 2.25, 2.75, 3.25, 3.75]);
        assert!(frame.rf().is_empty());
    }

    #[test]
    fn test_rudiment_aliases() {
        assert_eq!(Rudiment::from_name("Reverse Paradiddle"), Some(Rudiment::ReverseParadiddle));
        assert_eq!(Rudiment::from_name("pd"), Some(Rudiment::Paradiddle));
        assert_eq!(Rudiment::from_name("flam"), None);
    }
}
