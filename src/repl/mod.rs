//! REPL (Read-Eval-Print Loop) for practice sessions
//!
//! One loop multiplexes typed commands, metronome ticks, sensor hits and
//! file-change events, so a session keeps scoring while the prompt waits.

use crate::commands::exercise::render_frame;
use crate::commands::practice::{format_score, stop_session};
use crate::commands::{create_registry, CommandContext, CommandRegistry, CommandResult};
use crate::metronome::BeatTick;
use crate::repl::watcher::FileWatcher;
use anyhow::Result;
use colored::*;
use crossbeam_channel::{never, unbounded, Receiver, Sender};
use notify::Event;
use rudiment_core::types::{HitEvent, Judgement};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RustylineResult};
use std::thread;
use tracing::debug;

pub mod watcher;

/// Types of events the REPL loop handles
enum ReplEvent {
    Input(Result<String, ReadlineError>),
}

/// What the loop should do after handling an event
enum Flow {
    Continue,
    Exit,
}

/// Interactive practice REPL
pub struct Repl {
    editor: Option<DefaultEditor>,
    ctx: CommandContext,
    registry: CommandRegistry,

    // Event channels
    tx_input: Sender<ReplEvent>,
    rx_input: Receiver<ReplEvent>,
    tx_watcher: Sender<notify::Result<Event>>,
    rx_watcher: Receiver<notify::Result<Event>>,

    // File watcher
    watcher: Option<FileWatcher>,
}

/// Describe a judged hit for the terminal
pub fn format_judgement(judgement: &Judgement) -> String {
    match judgement {
        Judgement::Hit {
            voice,
            target,
            offset,
        } => format!("{} hit {:.2} ({:+.2})", voice.key(), target, offset)
            .bright_green()
            .to_string(),
        Judgement::Repeat { voice, target } => format!("{} again {:.2}", voice.key(), target)
            .dimmed()
            .to_string(),
        Judgement::Miss { voice } => format!("{} miss", voice.key()).red().to_string(),
    }
}

impl Repl {
    /// Create a new REPL around a prepared context
    pub fn new(ctx: CommandContext) -> RustylineResult<Self> {
        let editor = DefaultEditor::new()?;
        let (tx_input, rx_input) = unbounded();
        let (tx_watcher, rx_watcher) = unbounded();

        Ok(Repl {
            editor: Some(editor),
            ctx,
            registry: create_registry(),
            tx_input,
            rx_input,
            tx_watcher,
            rx_watcher,
            watcher: None,
        })
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        if line.is_empty() {
            return Flow::Continue;
        }
        match self.registry.execute(line, &mut self.ctx) {
            CommandResult::Success => {}
            CommandResult::Message(msg) => println!("{}", msg),
            CommandResult::Exit => return Flow::Exit,
            CommandResult::Error(e) => println!("{} {}", "Error:".bright_red().bold(), e.red()),
            CommandResult::Watch(path) => self.watch(path),
            CommandResult::NotACommand => println!(
                "{} Unknown command '{}' (try 'help')",
                "Error:".bright_red().bold(),
                line
            ),
        }
        Flow::Continue
    }

    fn watch(&mut self, path: std::path::PathBuf) {
        if self.watcher.is_none() {
            match FileWatcher::new(self.tx_watcher.clone()) {
                Ok(w) => self.watcher = Some(w),
                Err(e) => println!("{} Failed to create watcher: {}", "Error:".red(), e),
            }
        }

        if let Some(w) = &mut self.watcher {
            if let Err(e) = w.watch(&path) {
                println!("{} Failed to watch {}: {}", "Error:".red(), path.display(), e);
            } else {
                println!(
                    "Watching {} for changes...",
                    path.display().to_string().bright_green()
                );
            }
        }
    }

    fn handle_file_event(&mut self, event: Event) {
        let changed = match &self.watcher {
            Some(w) => w.changed_files(&event),
            None => return,
        };
        for path in changed {
            println!("{} File changed: {}", "*".bright_yellow(), path.display());
            match self.ctx.load_exercises(&path) {
                Ok(summary) => println!("{}", summary.bright_green()),
                Err(e) => println!("{} {:#}", "Error:".red(), e),
            }
        }
    }

    fn handle_tick(&mut self, tick: BeatTick) {
        let beats_per_bar = self.ctx.config.beats_per_bar;
        let Some(session) = self.ctx.session.as_mut() else {
            return;
        };
        match session.on_tick(&tick) {
            crate::session::SessionEvent::Bar(frame) => {
                println!("{}", render_frame(&frame, beats_per_bar));
                if session.is_final_bar() {
                    println!("{}", "Last bar!".bright_yellow());
                }
            }
            crate::session::SessionEvent::Finished(_) => {
                if let Some(score) = stop_session(&mut self.ctx) {
                    println!("{}", "Exercise finished".bright_cyan().bold());
                    println!("{}", format_score(&score));
                }
            }
            crate::session::SessionEvent::Beat { .. } | crate::session::SessionEvent::Idle => {}
        }
    }

    fn handle_hit(&mut self, hit: HitEvent) {
        match self.ctx.session.as_mut() {
            Some(session) => {
                if let Some(judgement) = session.on_hit(&hit) {
                    println!("{}", format_judgement(&judgement));
                }
            }
            None => debug!(channel = hit.channel, "hit outside a session"),
        }
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!("{}", "Rudiment drum practice".bright_cyan().bold());
        println!(
            "Type '{}' for commands, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        let mut editor = self
            .editor
            .take()
            .ok_or_else(|| anyhow::anyhow!("REPL is already running"))?;
        let tx_input = self.tx_input.clone();

        thread::spawn(move || loop {
            let prompt = format!("{} ", "rudiment>".bright_magenta().bold());
            match editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    if tx_input.send(ReplEvent::Input(Ok(line))).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(ReplEvent::Input(Err(err)));
                    break;
                }
            }
        });

        loop {
            let rx_ticks = self.ctx.ticks.clone().unwrap_or_else(never);
            let rx_hits = self.ctx.sensor.receiver().clone();
            let rx_input = self.rx_input.clone();
            let rx_watcher = self.rx_watcher.clone();

            crossbeam_channel::select! {
                recv(rx_input) -> msg => match msg {
                    Ok(ReplEvent::Input(Ok(line))) => {
                        if let Flow::Exit = self.handle_line(&line) {
                            break;
                        }
                    }
                    Ok(ReplEvent::Input(Err(ReadlineError::Interrupted | ReadlineError::Eof))) => break,
                    Ok(ReplEvent::Input(Err(err))) => {
                        println!(
                            "{} {}",
                            "Error reading input:".bright_red().bold(),
                            err.to_string().red()
                        );
                        break;
                    }
                    Err(_) => break,
                },
                recv(rx_ticks) -> tick => {
                    if let Ok(tick) = tick {
                        self.handle_tick(tick);
                    }
                },
                recv(rx_hits) -> hit => {
                    if let Ok(hit) = hit {
                        self.handle_hit(hit);
                    }
                },
                recv(rx_watcher) -> msg => match msg {
                    Ok(Ok(event)) => self.handle_file_event(event),
                    Ok(Err(e)) => println!("{} Watch error: {}", "Error:".red(), e),
                    Err(_) => break,
                },
            }
        }

        if let Some(score) = stop_session(&mut self.ctx) {
            println!("{}", format_score(&score));
        }
        println!("{}", "Goodbye!".bright_cyan());
        Ok(())
    }
}

/// Convenience function to start the REPL
pub fn start(ctx: CommandContext) -> Result<()> {
    let mut repl = Repl::new(ctx).map_err(|e| anyhow::anyhow!("Failed to initialize REPL: {}", e))?;
    repl.run()
}
