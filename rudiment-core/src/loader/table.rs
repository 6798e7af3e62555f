//! Parsing one exercise block of the tab-separated exercise table.
//!
//! A block looks like this (tabs shown as `→`):
//!
//! ```text
//! Basic Rock
//! Section → Intro    → Groove A → Groove B →
//! RH      → x-,x-    → x-,x-    → xx,xx    →
//! LH      → -,x      → -,x      → -,x      →
//! RF      → x,-      → x,-      → x,x      →
//! LF      →          →          →          →
//! Loops   → 2        → 4        →          →
//! ```
//!
//! The first column holds row labels. A non-blank loop count starts a
//! section; blank loop counts after it add more bars to that section.

use crate::error::{Result, RudimentError};
use crate::types::sequence::{Exercise, Pattern};
use crate::types::voice::{Voice, Voices};

/// Rows after the name line, in order
const ROWS: [&str; 6] = ["section names", "RH", "LH", "RF", "LF", "loop counts"];

/// Row holding the section names
const NAME_ROW: usize = 0;
/// Row holding the loop counts
const LOOP_ROW: usize = 5;

/// Normalize line endings and drop blank lines
fn content_lines(block: &str) -> Vec<&str> {
    block
        .split(['\n', '\r'])
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Cells of a table row with the label column removed
fn row_cells(line: &str) -> Vec<&str> {
    line.split('\t').skip(1).map(str::trim).collect()
}

/// Column ranges `[start, end)` of each section, from the loop-count row
fn section_spans(loops: &[&str], width: usize) -> Vec<(usize, usize)> {
    let starts: Vec<usize> = (0..width).filter(|&i| !loops[i].is_empty()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| (start, starts.get(n + 1).copied().unwrap_or(width)))
        .collect()
}

/// Parse one exercise block into an [`Exercise`].
///
/// Fails with a `Parse` error when the name line or any of the six rows is
/// missing, when a loop count is not a whole number, or when notation sits
/// in a column before the first loop count. Notation and pattern errors
/// carry the exercise and section names.
pub fn parse_exercise_block(block: &str) -> Result<Exercise> {
    let lines = content_lines(block);
    if lines.len() < ROWS.len() + 1 {
        let missing = lines
            .len()
            .checked_sub(1)
            .and_then(|row| ROWS.get(row))
            .copied()
            .unwrap_or("name");
        return Err(RudimentError::parse(
            block.trim(),
            format!(
                "expected a name line and {} rows, found {} lines (missing {})",
                ROWS.len(),
                lines.len(),
                missing
            ),
        ));
    }

    let name = lines[0].replace('\t', "").trim().to_string();
    let mut rows: Vec<Vec<&str>> = lines[1..=ROWS.len()].iter().map(|l| row_cells(l)).collect();

    // Ragged rows are padded; columns blank in every row are dropped from the end
    let width = (0..rows.iter().map(Vec::len).max().unwrap_or(0))
        .rev()
        .find(|&col| rows.iter().any(|row| row.get(col).is_some_and(|c| !c.is_empty())))
        .map_or(0, |col| col + 1);
    for row in &mut rows {
        row.resize(width, "");
    }

    let context = format!("exercise '{}'", name);
    let spans = section_spans(&rows[LOOP_ROW], width);
    let Some(&(first, _)) = spans.first() else {
        return Err(RudimentError::parse(
            lines[ROWS.len()],
            format!("{}: no loop counts in the {} row", context, ROWS[LOOP_ROW]),
        ));
    };
    if let Some(col) = (0..first).find(|&col| rows.iter().any(|row| !row[col].is_empty())) {
        return Err(RudimentError::parse(
            rows.iter().map(|row| row[col]).find(|c| !c.is_empty()).unwrap_or(""),
            format!("{}: column {} comes before the first loop count", context, col + 1),
        ));
    }

    let mut patterns = Vec::with_capacity(spans.len());
    for (n, (start, end)) in spans.into_iter().enumerate() {
        let loops_cell = rows[LOOP_ROW][start];
        let num_loops: usize = loops_cell.parse().map_err(|_| {
            RudimentError::parse(
                loops_cell,
                format!("{}: loop count of section {} is not a whole number", context, n + 1),
            )
        })?;
        let section_name = match rows[NAME_ROW][start] {
            "" => format!("{} section {}", name, n + 1),
            named => named.to_string(),
        };
        let voices = Voice::ALL
            .into_iter()
            .fold(Voices::new(), |voices, voice| {
                voices.with(voice, rows[1 + voice.index()][start..end].to_vec())
            });
        let pattern =
            Pattern::from_notation(section_name, voices, num_loops).map_err(|e| e.within(&context))?;
        patterns.push(pattern);
    }

    Ok(Exercise::new(name, patterns))
}
