//! Command registry for REPL commands
//!
//! Each command is a prefix mapped to a handler taking the rest of the
//! line and the shared [`CommandContext`].

pub mod exercise;
pub mod general;
pub mod practice;

use crate::config::PracticeConfig;
use crate::metronome::{BeatTick, Metronome};
use crate::sensor::HitSensor;
use crate::session::PracticeSession;
use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use rudiment_core::loader::ExerciseFactory;
use rudiment_core::types::Exercise;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Result of executing a command
#[derive(Debug)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// No command matched the input
    NotACommand,
    /// Error occurred
    Error(String),
    /// Watch a file for changes
    Watch(PathBuf),
}

/// State shared by command handlers
pub struct CommandContext {
    pub config: PracticeConfig,
    pub factory: ExerciseFactory,
    /// Table the factory was loaded from
    pub exercises_path: Option<PathBuf>,
    /// Exercise stepped through by `next`/`peek`, and played by `practice`
    pub selected: Option<Exercise>,
    pub metronome: Arc<Metronome>,
    pub sensor: HitSensor,
    pub session: Option<PracticeSession>,
    /// Beat ticks while a session runs
    pub ticks: Option<Receiver<BeatTick>>,
}

impl CommandContext {
    /// A context with no exercises loaded and a keyboard-only sensor
    pub fn new(config: PracticeConfig) -> Self {
        let metronome = Arc::new(Metronome::new(config.tempo.bpm, config.beats_per_bar));
        Self::with_sensor(config, metronome, HitSensor::detached())
    }

    pub fn with_sensor(config: PracticeConfig, metronome: Arc<Metronome>, sensor: HitSensor) -> Self {
        Self {
            config,
            factory: ExerciseFactory::default(),
            exercises_path: None,
            selected: None,
            metronome,
            sensor,
            session: None,
            ticks: None,
        }
    }

    /// Replace the exercise table with the one at `path`.
    ///
    /// A selected exercise is swapped for a fresh copy of the same name
    /// from the new table, or dropped if the table no longer has it.
    pub fn load_exercises(&mut self, path: &Path) -> Result<String> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read exercises from {}", path.display()))?;
        self.factory = ExerciseFactory::load(&text);
        self.exercises_path = Some(path.to_path_buf());
        info!(path = %path.display(), exercises = self.factory.len(), "exercise table loaded");

        if let Some(selected) = self.selected.take() {
            self.selected = self.factory.by_name(selected.name()).cloned();
        }

        let mut summary = format!(
            "Loaded {} exercises from {}",
            self.factory.len(),
            path.display()
        );
        if !self.factory.warnings().is_empty() {
            summary.push_str(&format!(
                " ({} blocks skipped, see 'warnings')",
                self.factory.warnings().len()
            ));
        }
        Ok(summary)
    }

    /// Whether a practice session is running
    pub fn is_practicing(&self) -> bool {
        self.session.is_some()
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = input[prefix.len()..].trim();
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Exercise table
    registry.register("load", exercise::cmd_load);
    registry.register("list", exercise::cmd_list);
    registry.register("warnings", exercise::cmd_warnings);
    registry.register("select", exercise::cmd_select);
    registry.register("next", exercise::cmd_next);
    registry.register("peek", exercise::cmd_peek);
    registry.register("last", exercise::cmd_last);
    registry.register("reset", exercise::cmd_reset);
    registry.register("status", exercise::cmd_status);

    // Notation tools
    registry.register("decode", exercise::cmd_decode);
    registry.register("rudiment", exercise::cmd_rudiment);
    registry.register("recipe", exercise::cmd_recipe);

    // Practice
    registry.register("practice start", practice::cmd_practice_start);
    registry.register("practice stop", practice::cmd_practice_stop);
    registry.register("hit", practice::cmd_hit);

    // General commands
    registry.register("tempo", general::cmd_tempo);
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);
    registry.register("watch", general::cmd_watch);

    registry
}
