//! Practice session: an exercise played against the metronome.
//!
//! Every downbeat moves the exercise on by one bar. Hits are placed inside
//! the active bar from their timestamps and judged against its targets.

use crate::config::PracticeConfig;
use crate::metronome::BeatTick;
use rudiment_core::types::{BeatFrame, Exercise, HitEvent, Judgement, Scoreboard, TargetBoard};
use tracing::{debug, info};

/// What a tick did to the session
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// A new bar became active
    Bar(BeatFrame),
    /// A beat inside the active bar
    Beat { beat_in_bar: usize },
    /// The exercise ran out of bars
    Finished(Scoreboard),
    /// Ticks after the session finished
    Idle,
}

pub struct PracticeSession {
    exercise: Exercise,
    beats_per_bar: usize,
    bpm: f32,
    tolerance: f64,
    amplitude_threshold: f32,
    board: Option<TargetBoard>,
    /// Epoch seconds of the active bar's downbeat
    bar_started: Option<f64>,
    bars_played: usize,
    scoreboard: Scoreboard,
    finished: bool,
}

impl PracticeSession {
    pub fn new(exercise: Exercise, config: &PracticeConfig) -> Self {
        info!(exercise = %exercise.name(), bars = exercise.remaining(), "practice started");
        PracticeSession {
            exercise,
            beats_per_bar: config.beats_per_bar.max(1),
            bpm: config.tempo.bpm,
            tolerance: config.scoring.tolerance_beats,
            amplitude_threshold: config.sensor.amplitude_threshold,
            board: None,
            bar_started: None,
            bars_played: 0,
            scoreboard: Scoreboard::new(),
            finished: false,
        }
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        self.bpm = bpm;
    }

    /// Targets of the active bar
    pub fn current_frame(&self) -> Option<&BeatFrame> {
        self.board.as_ref().map(TargetBoard::frame)
    }

    /// The bar after the active one
    pub fn preview_next(&self) -> Option<BeatFrame> {
        self.exercise.preview_next()
    }

    /// Whether the next downbeat brings the final bar
    pub fn is_last_beat(&self) -> bool {
        self.exercise.is_last_beat()
    }

    /// Whether the active bar is the final one
    pub fn is_final_bar(&self) -> bool {
        self.board.is_some() && self.exercise.is_exhausted()
    }

    pub fn bars_played(&self) -> usize {
        self.bars_played
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn on_tick(&mut self, tick: &BeatTick) -> SessionEvent {
        if self.finished {
            return SessionEvent::Idle;
        }
        if !tick.is_downbeat() {
            return SessionEvent::Beat {
                beat_in_bar: tick.beat_in_bar,
            };
        }

        self.close_bar();
        match self.exercise.advance() {
            Some(frame) => {
                debug!(pattern = %frame.name, bar = frame.bar_index, "bar started");
                self.bars_played += 1;
                self.bar_started = Some(tick.epoch);
                self.board = Some(TargetBoard::new(
                    frame.clone(),
                    self.beats_per_bar,
                    self.tolerance,
                ));
                SessionEvent::Bar(frame)
            }
            None => {
                self.finished = true;
                self.bar_started = None;
                info!(
                    score = self.scoreboard.score,
                    misses = self.scoreboard.misses,
                    max_combo = self.scoreboard.max_combo,
                    "practice finished"
                );
                SessionEvent::Finished(self.scoreboard.clone())
            }
        }
    }

    /// Beats from the active downbeat to `time`, wrapped into the bar
    fn position_in_bar(&self, time: f64) -> Option<f64> {
        let started = self.bar_started?;
        let beats = (time - started) * self.bpm as f64 / 60.0;
        Some(beats.rem_euclid(self.beats_per_bar as f64))
    }

    /// Judge a hit against the active bar.
    ///
    /// Quiet hits, hits on unwired channels and hits before the first bar
    /// are ignored and return `None`.
    pub fn on_hit(&mut self, hit: &HitEvent) -> Option<Judgement> {
        if hit.amplitude < self.amplitude_threshold {
            return None;
        }
        let voice = hit.voice()?;
        let position = self.position_in_bar(hit.time)?;
        let board = self.board.as_mut()?;
        let judgement = board.judge(voice, position);
        self.scoreboard.record(&judgement);
        Some(judgement)
    }

    fn close_bar(&mut self) {
        if let Some(board) = self.board.take() {
            self.scoreboard.close(&board);
        }
    }

    /// Stop early; unhit targets of the active bar count as missed
    pub fn finish(mut self) -> Scoreboard {
        self.close_bar();
        self.scoreboard
    }
}
