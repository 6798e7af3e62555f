//! Metronome clock
//!
//! Runs in its own thread and broadcasts one [`BeatTick`] per beat to every
//! subscriber. Tempo lives in an atomic so a change lands on the next beat
//! without a round trip through the command channel.

use crate::sensor::now_epoch;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

/// One beat of the metronome
#[derive(Clone, Debug, PartialEq)]
pub struct BeatTick {
    /// Beats since the metronome started (0-indexed)
    pub beat_number: u64,
    /// Beat within the current bar (0-indexed)
    pub beat_in_bar: usize,
    /// Bars since the metronome started (0-indexed)
    pub bar_number: u64,
    /// Seconds since the Unix epoch when the beat fell
    pub epoch: f64,
}

impl BeatTick {
    /// First beat of a bar
    pub fn is_downbeat(&self) -> bool {
        self.beat_in_bar == 0
    }
}

#[derive(Debug)]
enum MetronomeCommand {
    Start,
    Stop,
    Reset,
    AddSubscriber(Sender<BeatTick>),
    Shutdown,
}

pub struct Metronome {
    bpm: Arc<AtomicU32>,
    beats_per_bar: Arc<AtomicUsize>,
    running: Arc<AtomicBool>,
    command_tx: Sender<MetronomeCommand>,
    thread: Option<JoinHandle<()>>,
}

impl Metronome {
    pub fn new(bpm: f32, beats_per_bar: usize) -> Self {
        let bpm = Arc::new(AtomicU32::new(bpm.to_bits()));
        let beats_per_bar = Arc::new(AtomicUsize::new(beats_per_bar.max(1)));
        let running = Arc::new(AtomicBool::new(false));
        let (command_tx, command_rx) = bounded(64);

        let clock = ClockThread {
            bpm: bpm.clone(),
            beats_per_bar: beats_per_bar.clone(),
            running: running.clone(),
            command_rx,
            subscribers: Vec::new(),
            beat_number: 0,
        };
        let thread = thread::spawn(move || clock.run());

        Metronome {
            bpm,
            beats_per_bar,
            running,
            command_tx,
            thread: Some(thread),
        }
    }

    /// A new receiver for beat ticks; every subscriber sees every tick
    pub fn subscribe(&self) -> Receiver<BeatTick> {
        let (tx, rx) = unbounded();
        let _ = self.command_tx.send(MetronomeCommand::AddSubscriber(tx));
        rx
    }

    pub fn start(&self) {
        let _ = self.command_tx.send(MetronomeCommand::Start);
    }

    pub fn stop(&self) {
        let _ = self.command_tx.send(MetronomeCommand::Stop);
    }

    /// Restart counting from beat 0 on the next start
    pub fn reset(&self) {
        let _ = self.command_tx.send(MetronomeCommand::Reset);
    }

    pub fn set_bpm(&self, bpm: f32) {
        self.bpm.store(bpm.to_bits(), Ordering::Relaxed);
    }

    pub fn bpm(&self) -> f32 {
        f32::from_bits(self.bpm.load(Ordering::Relaxed))
    }

    pub fn set_beats_per_bar(&self, beats: usize) {
        self.beats_per_bar.store(beats.max(1), Ordering::Relaxed);
    }

    pub fn beats_per_bar(&self) -> usize {
        self.beats_per_bar.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Length of one beat at the current tempo
    pub fn beat_duration(&self) -> Duration {
        beat_duration(self.bpm())
    }
}

impl Drop for Metronome {
    fn drop(&mut self) {
        let _ = self.command_tx.send(MetronomeCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn beat_duration(bpm: f32) -> Duration {
    Duration::from_secs_f64(60.0 / bpm.max(1.0) as f64)
}

struct ClockThread {
    bpm: Arc<AtomicU32>,
    beats_per_bar: Arc<AtomicUsize>,
    running: Arc<AtomicBool>,
    command_rx: Receiver<MetronomeCommand>,
    subscribers: Vec<Sender<BeatTick>>,
    beat_number: u64,
}

impl ClockThread {
    fn bpm(&self) -> f32 {
        f32::from_bits(self.bpm.load(Ordering::Relaxed))
    }

    fn run(mut self) {
        let mut next_beat: Option<Instant> = None;

        loop {
            if self.running.load(Ordering::Relaxed) {
                if let Ok(cmd) = self.command_rx.try_recv() {
                    if self.handle_command(cmd) {
                        break;
                    }
                    if !self.running.load(Ordering::Relaxed) {
                        next_beat = None;
                        continue;
                    }
                }

                let now = Instant::now();
                let target = *next_beat.get_or_insert(now);
                if now >= target {
                    self.emit_beat();
                    next_beat = Some(target + beat_duration(self.bpm()));
                } else if target - now > Duration::from_millis(2) {
                    thread::sleep(Duration::from_millis(1));
                } else {
                    std::hint::spin_loop();
                }
            } else {
                match self.command_rx.recv() {
                    Ok(cmd) => {
                        if self.handle_command(cmd) {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        }
    }

    /// Returns true when the thread should exit
    fn handle_command(&mut self, cmd: MetronomeCommand) -> bool {
        match cmd {
            MetronomeCommand::Start => self.running.store(true, Ordering::Relaxed),
            MetronomeCommand::Stop => self.running.store(false, Ordering::Relaxed),
            MetronomeCommand::Reset => self.beat_number = 0,
            MetronomeCommand::AddSubscriber(tx) => self.subscribers.push(tx),
            MetronomeCommand::Shutdown => {
                self.running.store(false, Ordering::Relaxed);
                return true;
            }
        }
        false
    }

    fn emit_beat(&mut self) {
        let beats_per_bar = self.beats_per_bar.load(Ordering::Relaxed).max(1) as u64;
        let tick = BeatTick {
            beat_number: self.beat_number,
            beat_in_bar: (self.beat_number % beats_per_bar) as usize,
            bar_number: self.beat_number / beats_per_bar,
            epoch: now_epoch(),
        };
        if tick.is_downbeat() {
            debug!(bar = tick.bar_number, "bar");
        }
        // Drop subscribers that hung up
        self.subscribers.retain(|tx| tx.send(tick.clone()).is_ok());
        self.beat_number += 1;
    }
}
