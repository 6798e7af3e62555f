//! Stateful bar sequencing.
//!
//! A [`Pattern`] loops its bar table a fixed number of times; an
//! [`Exercise`] drains a list of patterns end to end. Both keep an explicit
//! cursor, read bars through the pure `at` lookup, and answer lookahead
//! queries (`preview_next`, `is_last_beat`) arithmetically so asking never
//! moves the cursor.

mod exercise;
mod pattern;

#[cfg(test)]
mod tests;

pub use exercise::{normalize_name, Exercise};
pub use pattern::Pattern;
