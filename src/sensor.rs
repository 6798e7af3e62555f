//! Drum sensor reader
//!
//! The sensor writes one text line per event. A background thread reads
//! those lines, stamps hit lines with the arrival time, and forwards the
//! parsed [`HitEvent`]s on a channel the practice loop drains.

use crate::config::SensorConfig;
use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use rudiment_core::types::HitEvent;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Seconds since the Unix epoch, as stamped on hits
pub fn now_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Handle to the sensor reader thread
pub struct HitSensor {
    source: String,
    running: Arc<AtomicBool>,
    ready: Arc<AtomicBool>,
    hits_tx: Sender<HitEvent>,
    hits_rx: Receiver<HitEvent>,
    thread: Option<JoinHandle<()>>,
}

impl HitSensor {
    /// Open the configured port and start reading.
    ///
    /// The port is opened as a character device; its line settings (baud
    /// rate included) are expected to be set up by the OS.
    pub fn connect(config: &SensorConfig) -> Result<Self> {
        let port = config
            .port
            .as_deref()
            .context("No sensor port configured (set sensor.port or COM_PORT)")?;
        let file = File::open(port).with_context(|| format!("Failed to open sensor {}", port))?;
        info!(port, "connected to sensor");
        if let Some(stty) = config.stty_command() {
            info!(baud_rate = config.baud_rate, %stty, "port line settings are left to the OS");
        }
        Ok(Self::spawn(BufReader::new(file), port, &config.ready_message))
    }

    /// Start reading sensor lines from any line-framed source
    pub fn spawn<R>(reader: R, source: impl Into<String>, ready_message: &str) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let source = source.into();
        let running = Arc::new(AtomicBool::new(true));
        let ready = Arc::new(AtomicBool::new(false));
        let (hits_tx, hits_rx) = unbounded();

        let reader_thread = ReaderThread {
            reader,
            source: source.clone(),
            ready_message: ready_message.trim().to_string(),
            running: running.clone(),
            ready: ready.clone(),
            hits_tx: hits_tx.clone(),
        };
        let thread = thread::spawn(move || reader_thread.run());

        HitSensor {
            source,
            running,
            ready,
            hits_tx,
            hits_rx,
            thread: Some(thread),
        }
    }

    /// A sensor with no device behind it; hits only arrive through
    /// [`HitSensor::injector`]
    pub fn detached() -> Self {
        let (hits_tx, hits_rx) = unbounded();
        HitSensor {
            source: "keyboard".to_string(),
            running: Arc::new(AtomicBool::new(false)),
            ready: Arc::new(AtomicBool::new(true)),
            hits_tx,
            hits_rx,
            thread: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Sender for hits from other inputs (e.g. the keyboard)
    pub fn injector(&self) -> Sender<HitEvent> {
        self.hits_tx.clone()
    }

    pub fn receiver(&self) -> &Receiver<HitEvent> {
        &self.hits_rx
    }

    /// Next queued hit, if any
    pub fn try_hit(&self) -> Option<HitEvent> {
        self.hits_rx.try_recv().ok()
    }

    /// Every queued hit, oldest first
    pub fn drain(&self) -> Vec<HitEvent> {
        self.hits_rx.try_iter().collect()
    }

    /// Whether the sensor has announced it is ready
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Whether the reader thread is still reading
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stop reading. A read already blocked on the device finishes on the
    /// next line; the thread is only joined if it has already exited.
    pub fn disconnect(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.is_finished() {
                let _ = thread.join();
            }
            info!(source = %self.source, "sensor disconnected");
        }
    }
}

impl Drop for HitSensor {
    fn drop(&mut self) {
        self.disconnect();
    }
}

struct ReaderThread<R> {
    reader: R,
    source: String,
    ready_message: String,
    running: Arc<AtomicBool>,
    ready: Arc<AtomicBool>,
    hits_tx: Sender<HitEvent>,
}

impl<R: BufRead> ReaderThread<R> {
    fn run(mut self) {
        let mut line = String::new();
        while self.running.load(Ordering::Relaxed) {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    debug!(source = %self.source, "sensor stream closed");
                    break;
                }
                Ok(_) => {
                    if !self.handle_line(line.trim(), now_epoch()) {
                        break;
                    }
                }
                Err(e) => {
                    warn!(source = %self.source, error = %e, "sensor read failed");
                    break;
                }
            }
        }
        self.running.store(false, Ordering::Relaxed);
    }

    /// Returns false once nobody is listening for hits
    fn handle_line(&self, line: &str, time: f64) -> bool {
        if line.is_empty() {
            return true;
        }
        if line == self.ready_message {
            info!(source = %self.source, "sensor ready");
            self.ready.store(true, Ordering::Relaxed);
            return true;
        }
        if !HitEvent::is_hit_line(line) {
            debug!(source = %self.source, line, "ignoring sensor line");
            return true;
        }
        match HitEvent::parse_line(line, time) {
            Ok(hit) => self.hits_tx.send(hit).is_ok(),
            Err(error) => {
                warn!(source = %self.source, %error, "malformed hit message");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn wait_until_stopped(sensor: &HitSensor) {
        for _ in 0..200 {
            if !sensor.is_running() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("sensor thread did not finish");
    }

    #[test]
    fn test_reads_hits_and_ready_message() {
        let input = "booting\nready\nh0a812\nh3a99.5\n";
        let sensor = HitSensor::spawn(Cursor::new(input), "test", "ready");
        wait_until_stopped(&sensor);

        assert!(sensor.is_ready());
        let hits = sensor.drain();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].channel, 0);
        assert_eq!(hits[0].amplitude, 812.0);
        assert_eq!(hits[1].channel, 3);
        assert!(hits[0].time > 0.0);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let input = "h1\nhxa5\nh2a700\n";
        let sensor = HitSensor::spawn(Cursor::new(input), "test", "ready");
        wait_until_stopped(&sensor);

        assert!(!sensor.is_ready());
        let hit = sensor.try_hit().unwrap();
        assert_eq!(hit.channel, 2);
        assert!(sensor.try_hit().is_none());
    }

    #[test]
    fn test_injected_hits() {
        let sensor = HitSensor::detached();
        assert!(sensor.is_ready());
        assert!(!sensor.is_running());
        sensor
            .injector()
            .send(HitEvent::new(1, 1000.0, 5.0))
            .unwrap();
        assert_eq!(sensor.try_hit(), Some(HitEvent::new(1, 1000.0, 5.0)));
    }

    #[test]
    fn test_connect_without_port() {
        let config = SensorConfig::default();
        assert!(HitSensor::connect(&config).is_err());
    }

    #[test]
    fn test_connect_reads_device_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tty");
        std::fs::write(&path, "ready\nh2a900\n").unwrap();
        let config = SensorConfig {
            port: Some(path.display().to_string()),
            ..SensorConfig::default()
        };
        let mut sensor = HitSensor::connect(&config).unwrap();
        wait_until_stopped(&sensor);
        assert_eq!(sensor.drain().len(), 1);
        sensor.disconnect();
        assert!(!sensor.is_running());
    }
}
