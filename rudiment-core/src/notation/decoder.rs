//! Beat-string decoder.
//!
//! A bar is written as comma-separated beats, each beat a run of `x` (hit)
//! and `-` (silence) characters that evenly subdivide that beat:
//!
//! ```text
//! x---,x---,x-x-,xxx
//! ```
//!
//! Chunk `n` is beat `n` of the bar. The subdivision is local to each chunk,
//! so triplets and sixteenths can be mixed freely inside one bar.

use crate::error::{Result, RudimentError};
use crate::types::time::{beats, time, to_coordinate, NOTATION_PRECISION};
use crate::types::{Bar, Coordinate};

/// Marks a hit inside a beat chunk
pub const HIT: char = 'x';
/// Marks a silent subdivision inside a beat chunk
pub const REST: char = '-';

/// Non-empty, trimmed beat chunks in bar order
fn beat_chunks(beat_str: &str) -> impl Iterator<Item = &str> {
    beat_str
        .split(',')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
}

/// Coordinates of the hits inside one beat chunk
fn chunk_coordinates(beat_index: usize, chunk: &str) -> impl Iterator<Item = Coordinate> + '_ {
    let subdivisions = chunk.chars().count() as i64;
    chunk
        .chars()
        .enumerate()
        .filter(|(_, c)| *c == HIT)
        .map(move |(i, _)| {
            let position = beats(beat_index as i64) + time(i as i64, subdivisions);
            to_coordinate(position, NOTATION_PRECISION)
        })
}

/// Decode a beat string into bar-relative coordinates.
///
/// Characters other than `x` never produce a coordinate; use
/// [`decode_strict`] to reject them instead.
pub fn decode(beat_str: &str) -> Bar {
    beat_chunks(beat_str)
        .enumerate()
        .flat_map(|(beat_index, chunk)| chunk_coordinates(beat_index, chunk))
        .collect()
}

/// [`decode`] for an optional cell; `None` is an empty bar
pub fn decode_opt(beat_str: Option<&str>) -> Bar {
    beat_str.map(decode).unwrap_or_default()
}

/// Decode a beat string, failing on anything outside the `{x, -}` alphabet
pub fn decode_strict(beat_str: &str) -> Result<Bar> {
    for (beat_index, chunk) in beat_chunks(beat_str).enumerate() {
        if let Some(bad) = chunk.chars().find(|c| *c != HIT && *c != REST) {
            return Err(RudimentError::parse(
                beat_str,
                format!(
                    "unexpected '{}' in beat {} (expected '{}' or '{}')",
                    bad,
                    beat_index + 1,
                    HIT,
                    REST
                ),
            ));
        }
    }
    Ok(decode(beat_str))
}

/// Split a multi-bar string on `|` and line breaks.
///
/// `\r\n`, `\n\r` and lone `\r` are all treated as one line break.
pub fn split_bars(multi_bar: &str) -> Vec<String> {
    multi_bar
        .replace("\r\n", "\n")
        .replace("\n\r", "\n")
        .replace('\r', "\n")
        .split(['|', '\n'])
        .map(str::trim)
        .filter(|bar| !bar.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode every bar of a multi-bar string
pub fn decode_bars(multi_bar: &str) -> Result<Vec<Bar>> {
    split_bars(multi_bar)
        .iter()
        .map(|bar| decode_strict(bar))
        .collect()
}
