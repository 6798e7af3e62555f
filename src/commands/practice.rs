//! Practice commands: start and stop a session, send hits by hand

use crate::commands::{CommandContext, CommandResult};
use crate::sensor::now_epoch;
use crate::session::PracticeSession;
use colored::*;
use rudiment_core::types::{HitEvent, Scoreboard, Voice};

/// Amplitude of hits sent with `hit` when none is given
const MANUAL_HIT_AMPLITUDE: f32 = 1023.0;

/// One-line summary of a finished session
pub fn format_score(score: &Scoreboard) -> String {
    let accuracy = score
        .accuracy()
        .map(|a| format!("{:.0}%", a * 100.0))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "Score: {}  Misses: {}  Missed targets: {}  Max combo: {}  Accuracy: {}",
        score.score, score.misses, score.missed_targets, score.max_combo, accuracy
    )
}

/// Handle `practice start [name]` command
pub fn cmd_practice_start(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if ctx.is_practicing() {
        return CommandResult::Error("Already practicing (use 'practice stop')".to_string());
    }
    if !args.is_empty() {
        match ctx.factory.exercise(args) {
            Ok(exercise) => ctx.selected = Some(exercise),
            Err(e) => return CommandResult::Error(e.to_string()),
        }
    }
    let Some(exercise) = ctx.selected.as_ref() else {
        return CommandResult::Error("No exercise selected (use 'select <name>')".to_string());
    };

    let mut exercise = exercise.clone();
    exercise.reset();
    let name = exercise.name().to_string();
    ctx.session = Some(PracticeSession::new(exercise, &ctx.config));

    ctx.metronome.set_beats_per_bar(ctx.config.beats_per_bar);
    ctx.metronome.reset();
    ctx.ticks = Some(ctx.metronome.subscribe());
    ctx.metronome.start();

    // Hits from before the session would land in its first bar
    ctx.sensor.drain();

    CommandResult::Message(
        format!(
            "Practicing {} at {:.0} BPM ({})",
            name,
            ctx.metronome.bpm(),
            ctx.sensor.source()
        )
        .bright_green()
        .to_string(),
    )
}

/// Stop the metronome and close the session, returning its score
pub fn stop_session(ctx: &mut CommandContext) -> Option<Scoreboard> {
    ctx.metronome.stop();
    ctx.ticks = None;
    ctx.session.take().map(PracticeSession::finish)
}

/// Handle `practice stop` command
pub fn cmd_practice_stop(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match stop_session(ctx) {
        Some(score) => CommandResult::Message(format_score(&score)),
        None => CommandResult::Error("Not practicing".to_string()),
    }
}

/// Handle `hit <voice|channel> [amplitude]` command
pub fn cmd_hit(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut parts = args.split_whitespace();
    let Some(target) = parts.next() else {
        return CommandResult::Error("Usage: hit <rh|lh|rf|lf|0-3> [amplitude]".to_string());
    };
    let channel = match target.parse::<i32>() {
        Ok(channel) => channel,
        Err(_) => match Voice::from_name(target) {
            Some(voice) => voice.channel(),
            None => return CommandResult::Error(format!("Unknown voice '{}'", target)),
        },
    };
    let amplitude = match parts.next().map(str::parse::<f32>) {
        None => MANUAL_HIT_AMPLITUDE,
        Some(Ok(amplitude)) => amplitude,
        Some(Err(_)) => return CommandResult::Error("Amplitude must be a number".to_string()),
    };

    let hit = HitEvent::new(channel, amplitude, now_epoch());
    if ctx.sensor.injector().send(hit).is_err() {
        return CommandResult::Error("Hit queue is closed".to_string());
    }
    CommandResult::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::TABLE;
    use crate::config::PracticeConfig;
    use rudiment_core::loader::ExerciseFactory;
    use std::time::Duration;

    fn ctx() -> CommandContext {
        let mut config = PracticeConfig::default();
        config.tempo.max_bpm = 2000.0;
        config.tempo.bpm = 1200.0;
        let mut ctx = CommandContext::new(config);
        ctx.factory = ExerciseFactory::load(TABLE);
        ctx
    }

    #[test]
    fn test_start_requires_exercise() {
        let mut ctx = ctx();
        assert!(matches!(
            cmd_practice_start("", &mut ctx),
            CommandResult::Error(_)
        ));
        assert!(matches!(
            cmd_practice_start("jazz", &mut ctx),
            CommandResult::Error(_)
        ));
        assert!(!ctx.is_practicing());
    }

    #[test]
    fn test_session_runs_on_ticks() {
        let mut ctx = ctx();
        assert!(matches!(
            cmd_practice_start("basic rock", &mut ctx),
            CommandResult::Message(_)
        ));
        assert!(ctx.is_practicing());
        assert!(matches!(
            cmd_practice_start("", &mut ctx),
            CommandResult::Error(_)
        ));

        let ticks = ctx.ticks.clone().unwrap();
        let tick = ticks.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(tick.is_downbeat());
        if let Some(session) = ctx.session.as_mut() {
            session.on_tick(&tick);
            assert_eq!(session.current_frame().unwrap().name, "Intro");
        }

        match cmd_practice_stop("", &mut ctx) {
            CommandResult::Message(msg) => assert!(msg.starts_with("Score: 0"), "{}", msg),
            other => panic!("Expected Message, got {:?}", other),
        }
        assert!(!ctx.is_practicing());
        assert!(ctx.ticks.is_none());
        assert!(matches!(
            cmd_practice_stop("", &mut ctx),
            CommandResult::Error(_)
        ));
    }

    #[test]
    fn test_hit_command_queues_hits() {
        let mut ctx = ctx();
        assert!(matches!(cmd_hit("rf 800", &mut ctx), CommandResult::Success));
        assert!(matches!(cmd_hit("3", &mut ctx), CommandResult::Success));
        assert!(matches!(cmd_hit("nose", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_hit("rh loud", &mut ctx), CommandResult::Error(_)));

        let hits = ctx.sensor.drain();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].channel, 2);
        assert_eq!(hits[0].amplitude, 800.0);
        assert_eq!(hits[1].channel, 3);
        assert_eq!(hits[1].amplitude, MANUAL_HIT_AMPLITUDE);
    }

    #[test]
    fn test_format_score() {
        let score = Scoreboard {
            score: 3,
            misses: 1,
            combo: 0,
            max_combo: 2,
            missed_targets: 1,
        };
        assert_eq!(
            format_score(&score),
            "Score: 3  Misses: 1  Missed targets: 1  Max combo: 2  Accuracy: 75%"
        );
    }
}
