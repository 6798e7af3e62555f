//! # Rudiment Core
//!
//! Notation decoding, bar sequencing and exercise loading for the Rudiment
//! drum practice engine. No I/O beyond parsing strings handed in by the host.
//!
//! ## Features
//!
//! - **serde**: Serialize and deserialize the plain data types
//!
//! ## Example
//!
//! ```
//! use rudiment_core::loader::ExerciseFactory;
//!
//! let table = "Warm Up\nSection\tIntro\nRH\tx,x,x,x\nLH\t\nRF\t\nLF\t\nLoops\t2\n";
//! let factory = ExerciseFactory::load(table);
//! let mut exercise = factory.exercise("warm up").unwrap();
//! let frame = exercise.next().unwrap();
//! assert_eq!(frame.rh(), &[0.0, 1.0, 2.0, 3.0]);
//! ```

pub mod error;
pub mod loader;
pub mod notation;
pub mod types;

// Re-export commonly used types
pub use error::{Result, RudimentError};
pub use loader::ExerciseFactory;
pub use types::{BeatFrame, Exercise, Pattern, Voice, Voices};
