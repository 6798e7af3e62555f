//! Exercise table loading.
//!
//! A table document is a tab-separated spreadsheet export holding any
//! number of exercise blocks separated by `!!!` marker lines.

mod factory;
mod table;

pub use factory::{ExerciseFactory, LoadWarning, BLOCK_SEPARATOR};
pub use table::parse_exercise_block;
