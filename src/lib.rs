//! # Rudiment
//!
//! Interactive drum practice on top of [`rudiment_core`]. Exercises are
//! loaded from a tab-separated table and scroll past one bar per metronome
//! bar while hits from a drum sensor (or typed with `hit`) are scored
//! against the bar's targets.
//!
//! ## Modules
//!
//! - `config`: TOML file plus environment overrides.
//! - `sensor`: background reader for the sensor's line protocol.
//! - `metronome`: beat clock thread that publishes ticks.
//! - `session`: advances an exercise on downbeats and scores hits.
//! - `commands`: REPL command handlers.
//! - `repl`: the interactive loop and the exercise file watcher.

pub mod commands;
pub mod config;
pub mod metronome;
pub mod repl;
pub mod sensor;
pub mod session;

pub use crate::config::PracticeConfig;
pub use crate::metronome::{BeatTick, Metronome};
pub use crate::sensor::HitSensor;
pub use crate::session::{PracticeSession, SessionEvent};
