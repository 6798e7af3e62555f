//! Exercise and notation commands

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use rudiment_core::notation::decode_strict;
use rudiment_core::types::recipe::{bar_from_recipe, NoteValue, Rudiment};
use rudiment_core::types::{BeatFrame, Scoreboard, Voice};
use serde::Serialize;
use std::path::PathBuf;

/// Cell counts tried when drawing a bar, coarsest first
const GRID_STEPS: [usize; 7] = [1, 2, 3, 4, 6, 8, 12];

/// Coarsest grid that puts every hit of `frame` on a cell
fn steps_per_beat(frame: &BeatFrame) -> usize {
    GRID_STEPS
        .into_iter()
        .find(|&steps| {
            frame.hits.iter().all(|(_, bar)| {
                bar.iter().all(|c| {
                    let scaled = c * steps as f64;
                    (scaled - scaled.round()).abs() < 0.02
                })
            })
        })
        .unwrap_or(12)
}

/// Draw a bar as one grid row per voice
pub fn render_frame(frame: &BeatFrame, beats_per_bar: usize) -> String {
    let steps = steps_per_beat(frame);
    let mut out = format!(
        "{} {}\n",
        frame.name.bright_cyan().bold(),
        format!("(bar {}, pass {})", frame.bar_index + 1, frame.loop_index + 1).dimmed()
    );
    for voice in Voice::ALL {
        let row = frame.grid_row(voice, beats_per_bar, steps);
        let row = if frame[voice].is_empty() {
            row.dimmed().to_string()
        } else {
            row
        };
        out.push_str(&format!("  {} {}\n", voice.key().yellow(), row));
    }
    out.trim_end().to_string()
}

/// Handle `load [path]` command
pub fn cmd_load(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let path = if args.is_empty() {
        ctx.exercises_path
            .clone()
            .unwrap_or_else(|| ctx.config.exercises_path.clone())
    } else {
        PathBuf::from(args)
    };
    match ctx.load_exercises(&path) {
        Ok(summary) => CommandResult::Message(summary.bright_green().to_string()),
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

/// Handle `list` command
pub fn cmd_list(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    if ctx.factory.is_empty() {
        return CommandResult::Message("No exercises loaded (try 'load <path>')".to_string());
    }
    let selected = ctx.selected.as_ref().map(|e| e.normalized_name());
    let lines: Vec<String> = ctx
        .factory
        .iter()
        .map(|ex| {
            let marker = if selected.as_deref() == Some(ex.normalized_name().as_str()) {
                "*".bright_green().to_string()
            } else {
                " ".to_string()
            };
            format!(
                "{} {} ({} sections, {} bars)",
                marker,
                ex.name().cyan(),
                ex.patterns().len(),
                ex.total_len()
            )
        })
        .collect();
    CommandResult::Message(lines.join("\n"))
}

/// Handle `warnings` command
pub fn cmd_warnings(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let warnings = ctx.factory.warnings();
    if warnings.is_empty() {
        return CommandResult::Message("No warnings".to_string());
    }
    let lines: Vec<String> = warnings
        .iter()
        .map(|w| format!("{} {}", "warning:".yellow(), w))
        .collect();
    CommandResult::Message(lines.join("\n"))
}

/// Handle `select <name>` command
pub fn cmd_select(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: select <exercise name>".to_string());
    }
    match ctx.factory.exercise(args) {
        Ok(exercise) => {
            let msg = format!(
                "Selected {} ({} bars)",
                exercise.name().bright_cyan(),
                exercise.total_len()
            );
            ctx.selected = Some(exercise);
            CommandResult::Message(msg)
        }
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

fn no_selection() -> CommandResult {
    CommandResult::Error("No exercise selected (use 'select <name>')".to_string())
}

/// Handle `next` command
pub fn cmd_next(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let beats_per_bar = ctx.config.beats_per_bar;
    let Some(exercise) = ctx.selected.as_mut() else {
        return no_selection();
    };
    match exercise.advance() {
        Some(frame) => CommandResult::Message(render_frame(&frame, beats_per_bar)),
        None => CommandResult::Message(format!(
            "{} is finished (use 'reset' to start over)",
            exercise.name()
        )),
    }
}

/// Handle `peek` command
pub fn cmd_peek(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Some(exercise) = ctx.selected.as_ref() else {
        return no_selection();
    };
    match exercise.preview_next() {
        Some(frame) => CommandResult::Message(format!(
            "{}\n{}",
            "Up next:".dimmed(),
            render_frame(&frame, ctx.config.beats_per_bar)
        )),
        None => CommandResult::Message("Nothing left to play".to_string()),
    }
}

/// Handle `last` command
pub fn cmd_last(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Some(exercise) = ctx.selected.as_ref() else {
        return no_selection();
    };
    let answer = if exercise.is_last_beat() { "yes" } else { "no" };
    CommandResult::Message(format!(
        "Last bar: {} ({} left)",
        answer,
        exercise.remaining()
    ))
}

/// Handle `reset` command
pub fn cmd_reset(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let Some(exercise) = ctx.selected.as_mut() else {
        return no_selection();
    };
    exercise.reset();
    CommandResult::Message(format!("Rewound {}", exercise.name()))
}

#[derive(Debug, Serialize)]
struct StatusReport {
    exercise: Option<String>,
    pattern: Option<String>,
    remaining: usize,
    total: usize,
    bpm: f32,
    practicing: bool,
    score: Option<Scoreboard>,
}

fn status_report(ctx: &CommandContext) -> StatusReport {
    let exercise = ctx
        .session
        .as_ref()
        .map(|s| s.exercise())
        .or(ctx.selected.as_ref());
    StatusReport {
        exercise: exercise.map(|e| e.name().to_string()),
        pattern: exercise
            .and_then(|e| e.current_pattern())
            .map(|p| p.name().to_string()),
        remaining: exercise.map_or(0, |e| e.remaining()),
        total: exercise.map_or(0, |e| e.total_len()),
        bpm: ctx.metronome.bpm(),
        practicing: ctx.is_practicing(),
        score: ctx.session.as_ref().map(|s| s.scoreboard().clone()),
    }
}

/// Handle `status [json]` command
pub fn cmd_status(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let report = status_report(ctx);
    if args == "json" {
        return match serde_json::to_string_pretty(&report) {
            Ok(json) => CommandResult::Message(json),
            Err(e) => CommandResult::Error(e.to_string()),
        };
    }

    let mut lines = vec![format!("Tempo: {:.1} BPM", report.bpm)];
    match (&report.exercise, &report.pattern) {
        (Some(name), pattern) => lines.push(format!(
            "Exercise: {} [{}] {}/{} bars left",
            name.bright_cyan(),
            pattern.as_deref().unwrap_or("-"),
            report.remaining,
            report.total
        )),
        (None, _) => lines.push("Exercise: none selected".to_string()),
    }
    if let Some(score) = &report.score {
        lines.push(format!(
            "Score: {}  Misses: {}  Combo: {} (max {})",
            score.score, score.misses, score.combo, score.max_combo
        ));
    }
    CommandResult::Message(lines.join("\n"))
}

/// Handle `decode <beats>` command
pub fn cmd_decode(args: &str, _ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: decode <beats>, e.g. decode x---,x-x-".to_string());
    }
    match decode_strict(args) {
        Ok(bar) => CommandResult::Message(format!("{:?}", bar)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `rudiment [name] [beats]` command
pub fn cmd_rudiment(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut parts: Vec<&str> = args.split_whitespace().collect();
    if parts.is_empty() {
        let names: Vec<String> = Rudiment::ALL
            .iter()
            .map(|r| format!("  {:<28} {}", r.name().cyan(), r.sticking()))
            .collect();
        return CommandResult::Message(names.join("\n"));
    }

    let mut beats = ctx.config.beats_per_bar;
    if parts.len() > 1 {
        if let Some(Ok(n)) = parts.last().map(|p| p.parse::<usize>()) {
            beats = n;
            parts.pop();
        }
    }
    if beats == 0 {
        return CommandResult::Error("A bar needs at least one beat".to_string());
    }
    let name = parts.join(" ");
    let Some(rudiment) = Rudiment::from_name(&name) else {
        return CommandResult::Error(format!("Unknown rudiment '{}' (try 'rudiment')", name));
    };
    match rudiment.pattern(beats, 1) {
        Ok(pattern) => CommandResult::Message(format!(
            "{}\n{}",
            rudiment.to_notation(beats).dimmed(),
            render_frame(&pattern.at(0), beats)
        )),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `recipe <value> <offset> <beats>` command
pub fn cmd_recipe(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let usage = || {
        CommandResult::Error(
            "Usage: recipe <quarter|eighth|triplet|sixteenth|...> [offset] [beats]".to_string(),
        )
    };
    let Some(value) = parts.first().and_then(|p| NoteValue::from_name(p)) else {
        return usage();
    };
    let offset = match parts.get(1).map(|p| p.parse::<f64>()) {
        None => 0.0,
        Some(Ok(offset)) => offset,
        Some(Err(_)) => return usage(),
    };
    let beats = match parts.get(2).map(|p| p.parse::<usize>()) {
        None => ctx.config.beats_per_bar,
        Some(Ok(beats)) => beats,
        Some(Err(_)) => return usage(),
    };
    match bar_from_recipe(value, offset, beats) {
        Ok(bar) => CommandResult::Message(format!("{:?}", bar)),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::TABLE;
    use crate::config::PracticeConfig;
    use rudiment_core::loader::ExerciseFactory;

    fn ctx() -> CommandContext {
        colored::control::set_override(false);
        let mut ctx = CommandContext::new(PracticeConfig::default());
        ctx.factory = ExerciseFactory::load(TABLE);
        ctx
    }

    fn message(result: CommandResult) -> String {
        match result {
            CommandResult::Message(msg) => msg,
            other => panic!("Expected Message, got {:?}", other),
        }
    }

    #[test]
    fn test_select_and_step() {
        let mut ctx = ctx();
        assert!(matches!(cmd_next("", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_select("jazz", &mut ctx), CommandResult::Error(_)));
        message(cmd_select("basic rock", &mut ctx));

        let first = message(cmd_next("", &mut ctx));
        assert!(first.starts_with("Intro (bar 1, pass 1)"), "{}", first);
        assert!(first.contains("rh x|x|x|x"), "{}", first);

        let peek = message(cmd_peek("", &mut ctx));
        assert!(peek.contains("Groove"), "{}", peek);
        assert_eq!(message(cmd_last("", &mut ctx)), "Last bar: no (2 left)");

        message(cmd_next("", &mut ctx));
        assert_eq!(message(cmd_last("", &mut ctx)), "Last bar: yes (1 left)");
        message(cmd_next("", &mut ctx));
        assert!(message(cmd_next("", &mut ctx)).contains("finished"));

        message(cmd_reset("", &mut ctx));
        assert_eq!(message(cmd_last("", &mut ctx)), "Last bar: no (3 left)");
    }

    #[test]
    fn test_list_and_warnings() {
        let mut ctx = ctx();
        let list = message(cmd_list("", &mut ctx));
        assert!(list.contains("Basic Rock (2 sections, 3 bars)"), "{}", list);
        let warnings = message(cmd_warnings("", &mut ctx));
        assert!(warnings.contains("block 2 ('Broken')"), "{}", warnings);
    }

    #[test]
    fn test_render_picks_grid() {
        let frame = BeatFrame {
            name: "t".to_string(),
            bar_index: 0,
            loop_index: 0,
            hits: rudiment_core::types::PerVoice {
                rh: vec![0.0, 0.33, 0.67],
                lh: vec![],
                rf: vec![],
                lf: vec![],
            },
        };
        assert_eq!(steps_per_beat(&frame), 3);
        colored::control::set_override(false);
        let text = render_frame(&frame, 2);
        assert!(text.contains("rh xxx|..."), "{}", text);
    }

    #[test]
    fn test_decode_and_recipe() {
        let mut ctx = ctx();
        assert_eq!(
            message(cmd_decode("xxx,---,xxx,---", &mut ctx)),
            "[0.0, 0.33, 0.67, 2.0, 2.33, 2.67]"
        );
        assert!(matches!(cmd_decode("x-o", &mut ctx), CommandResult::Error(_)));
        assert_eq!(
            message(cmd_recipe("quarter 0.5 3", &mut ctx)),
            "[0.5, 1.5, 2.5]"
        );
        assert_eq!(message(cmd_recipe("eighth", &mut ctx)).matches(',').count(), 7);
        assert!(matches!(cmd_recipe("whole", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_rudiment_command() {
        let mut ctx = ctx();
        let all = message(cmd_rudiment("", &mut ctx));
        assert_eq!(all.lines().count(), Rudiment::ALL.len());
        let pd = message(cmd_rudiment("reverse paradiddle 2", &mut ctx));
        assert!(pd.starts_with("xx-x,--x-"), "{}", pd);
        assert!(matches!(cmd_rudiment("flam", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_status_json() {
        let mut ctx = ctx();
        message(cmd_select("basicrock", &mut ctx));
        let json = message(cmd_status("json", &mut ctx));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["exercise"], "Basic Rock");
        assert_eq!(value["remaining"], 3);
        assert_eq!(value["practicing"], false);
        assert!(value["score"].is_null());
    }
}
