//! ExerciseFactory: every exercise in a table document, by name.

use std::fmt;

use tracing::{debug, info, warn};

use super::table::parse_exercise_block;
use crate::error::{Result, RudimentError};
use crate::types::sequence::{normalize_name, Exercise};

/// Marker line separating exercise blocks in a table document
pub const BLOCK_SEPARATOR: &str = "!!!";

/// A block that could not be loaded
#[derive(Clone, Debug, PartialEq)]
pub struct LoadWarning {
    /// 1-based position of the block in the document
    pub block: usize,
    /// First line of the block, if it had one
    pub name: Option<String>,
    pub error: RudimentError,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "block {} ('{}'): {}", self.block, name, self.error),
            None => write!(f, "block {}: {}", self.block, self.error),
        }
    }
}

/// Exercises loaded from a table document, in document order.
///
/// Loading never fails as a whole: blocks that do not parse are skipped
/// and reported through [`ExerciseFactory::warnings`]. Exercises are kept
/// rewound; [`ExerciseFactory::exercise`] hands out a fresh copy to iterate.
#[derive(Clone, Debug, Default)]
pub struct ExerciseFactory {
    exercises: Vec<Exercise>,
    warnings: Vec<LoadWarning>,
}

impl ExerciseFactory {
    /// Parse every `!!!`-separated block of `document`.
    ///
    /// Text before the first marker is a preamble (a sheet title, notes)
    /// and is ignored. A document without any marker is one block.
    pub fn load(document: &str) -> Self {
        let mut factory = ExerciseFactory::default();
        let mut segments = document.split(BLOCK_SEPARATOR);
        if document.contains(BLOCK_SEPARATOR) {
            if let Some(preamble) = segments.next().filter(|p| !p.trim().is_empty()) {
                debug!(lines = preamble.trim().lines().count(), "ignoring text before the first block");
            }
        }
        let blocks = segments.filter(|block| !block.trim().is_empty());

        for (idx, block) in blocks.enumerate() {
            let number = idx + 1;
            match parse_exercise_block(block) {
                Ok(exercise) => factory.add(number, exercise),
                Err(error) => {
                    let name = block
                        .lines()
                        .map(|line| line.replace('\t', "").trim().to_string())
                        .find(|line| !line.is_empty());
                    warn!(block = number, name = ?name, %error, "skipping exercise block");
                    factory.warnings.push(LoadWarning {
                        block: number,
                        name,
                        error,
                    });
                }
            }
        }

        info!(
            exercises = factory.exercises.len(),
            warnings = factory.warnings.len(),
            "loaded exercise table"
        );
        factory
    }

    fn add(&mut self, block: usize, exercise: Exercise) {
        let key = exercise.normalized_name();
        if self.by_name(&key).is_some() {
            let error = RudimentError::validation(format!(
                "duplicate exercise name '{}'; keeping the first",
                exercise.name()
            ));
            warn!(block, %error, "skipping exercise block");
            self.warnings.push(LoadWarning {
                block,
                name: Some(exercise.name().to_string()),
                error,
            });
            return;
        }
        debug!(block, exercise = %exercise.name(), patterns = exercise.patterns().len(), "loaded exercise");
        self.exercises.push(exercise);
    }

    /// Case- and space-insensitive exact lookup
    pub fn by_name(&self, name: &str) -> Option<&Exercise> {
        let key = normalize_name(name);
        self.exercises.iter().find(|ex| ex.normalized_name() == key)
    }

    /// A rewound copy of the named exercise, ready to iterate
    pub fn exercise(&self, name: &str) -> Result<Exercise> {
        self.by_name(name)
            .cloned()
            .ok_or_else(|| RudimentError::Lookup(name.to_string()))
    }

    /// Exercise names in document order
    pub fn list_names(&self) -> Vec<&str> {
        self.exercises.iter().map(Exercise::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.iter()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Blocks skipped during loading
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROOVE: &str = "Basic Rock\nSection\tGroove\nRH\tx-,x-,x-,x-\nLH\t-,x,-,x\nRF\tx,-,x,-\nLF\t\nLoops\t2\n";
    const FILL: &str = "Snare Fill\nSection\tFill\nRH\txxxx,xxxx,xxxx,xxxx\nLH\t\nRF\t\nLF\t\nLoops\t1\n";

    #[test]
    fn test_leading_separator_and_blank_blocks() {
        let doc = format!("!!!\n{}!!!\n\n!!!\n{}", GROOVE, FILL);
        let factory = ExerciseFactory::load(&doc);
        assert_eq!(factory.list_names(), vec!["Basic Rock", "Snare Fill"]);
        assert!(factory.warnings().is_empty());
    }

    #[test]
    fn test_text_before_first_separator_is_ignored() {
        let doc = format!("Drum Exercises\tv2\n\t\t\n!!!\n{}!!!\n{}", GROOVE, FILL);
        let factory = ExerciseFactory::load(&doc);
        assert_eq!(factory.list_names(), vec!["Basic Rock", "Snare Fill"]);
        assert!(factory.warnings().is_empty());
    }

    #[test]
    fn test_by_name_ignores_case_and_spaces() {
        let factory = ExerciseFactory::load(GROOVE);
        assert!(factory.by_name("basicrock").is_some());
        assert!(factory.by_name("BASIC ROCK").is_some());
        assert!(factory.by_name("basic").is_none());
    }

    #[test]
    fn test_exercise_lookup_error() {
        let factory = ExerciseFactory::load(GROOVE);
        assert_eq!(
            factory.exercise("Jazz"),
            Err(RudimentError::Lookup("Jazz".to_string()))
        );
    }

    #[test]
    fn test_exercise_copies_are_independent() {
        let factory = ExerciseFactory::load(GROOVE);
        let mut first = factory.exercise("basic rock").unwrap();
        first.advance();
        let second = factory.exercise("basic rock").unwrap();
        assert_eq!(second.remaining(), 2);
        assert_eq!(factory.by_name("basic rock").unwrap().remaining(), 2);
    }

    #[test]
    fn test_duplicate_names_warn() {
        let doc = format!("!!!\n{}!!!\n{}", GROOVE, GROOVE.replace("Basic Rock", "basic rock"));
        let factory = ExerciseFactory::load(&doc);
        assert_eq!(factory.len(), 1);
        assert_eq!(factory.warnings().len(), 1);
        let warning = &factory.warnings()[0];
        assert_eq!(warning.block, 2);
        assert!(matches!(warning.error, RudimentError::Validation(_)));
    }

    #[test]
    fn test_warning_display() {
        let factory = ExerciseFactory::load("Broken\nSection\tA\n");
        assert!(factory.is_empty());
        let text = factory.warnings()[0].to_string();
        assert!(text.starts_with("block 1 ('Broken'): cannot parse"), "{}", text);
    }
}
