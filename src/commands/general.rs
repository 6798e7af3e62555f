//! General REPL commands (help, quit, tempo, watch)

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use std::path::PathBuf;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `tempo [bpm]` command
pub fn cmd_tempo(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Message(format!(
            "Current tempo: {:.1} BPM",
            ctx.metronome.bpm()
        ));
    }

    match args.parse::<f32>() {
        Ok(bpm) if ctx.config.bpm_in_range(bpm) => {
            ctx.metronome.set_bpm(bpm);
            ctx.config.tempo.bpm = bpm;
            if let Some(session) = ctx.session.as_mut() {
                session.set_bpm(bpm);
            }
            CommandResult::Message(
                format!("Tempo set to {:.1} BPM", bpm)
                    .bright_green()
                    .to_string(),
            )
        }
        _ => CommandResult::Error(format!(
            "Invalid tempo. Use a value between {}-{} BPM",
            ctx.config.tempo.min_bpm, ctx.config.tempo.max_bpm
        )),
    }
}

/// Handle `watch [file]` command; defaults to the loaded exercise table
pub fn cmd_watch(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if !args.is_empty() {
        return CommandResult::Watch(PathBuf::from(args));
    }
    match &ctx.exercises_path {
        Some(path) => CommandResult::Watch(path.clone()),
        None => CommandResult::Error("Usage: watch <file>".to_string()),
    }
}

/// Print help information
fn print_help() {
    println!("{}", "Rudiment Practice Help".bold());
    println!("{}", "======================".bold());
    println!();
    println!("{}", "Exercises:".green());
    println!("  {}       - Load an exercise table (TSV)", "load [path]".cyan());
    println!("  {}              - List loaded exercises", "list".cyan());
    println!("  {}          - Show blocks skipped while loading", "warnings".cyan());
    println!("  {}     - Choose an exercise", "select <name>".cyan());
    println!("  {}              - Step to the next bar", "next".cyan());
    println!("  {}              - Show the bar after the current one", "peek".cyan());
    println!("  {}              - Is only one bar left?", "last".cyan());
    println!("  {}             - Rewind the selected exercise", "reset".cyan());
    println!("  {}     - Progress and score (add 'json' for JSON)", "status [json]".cyan());
    println!();
    println!("{}", "Notation:".green());
    println!(
        "  {}  - Decode a bar, e.g. {}",
        "decode <beats>".cyan(),
        "decode x-x-,xxx,x,----".cyan()
    );
    println!(
        "  {} - Show a rudiment, or list them all",
        "rudiment [name] [beats]".cyan()
    );
    println!(
        "  {} - Evenly spaced notes, e.g. {}",
        "recipe <value> <offset> <beats>".cyan(),
        "recipe sixteenth 0.5 4".cyan()
    );
    println!();
    println!("{}", "Practice:".green());
    println!(
        "  {} - Play the selected exercise with the metronome",
        "practice start [name]".cyan()
    );
    println!("  {}     - Stop and show the score", "practice stop".cyan());
    println!(
        "  {} - Send a hit by hand (rh, lh, rf, lf or 0-3)",
        "hit <voice> [amplitude]".cyan()
    );
    println!("  {}       - Show current tempo", "tempo".cyan());
    println!("  {} - Set tempo", "tempo <bpm>".cyan());
    println!();
    println!("{}", "Other Commands:".green());
    println!(
        "  {}      - Reload exercises when the file changes",
        "watch [file]".bright_green()
    );
    println!("  {}              - Show this help", "help".bright_green());
    println!("  {}              - Exit the REPL", "quit".bright_red());
}
