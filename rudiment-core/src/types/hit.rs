//! Hit events reported by the drum sensor.
//!
//! The sensor sends one line per hit: `h<channel>a<amplitude>`, e.g.
//! `h2a734.5`. The timestamp is attached by whoever reads the line.

use super::voice::Voice;
use crate::error::{Result, RudimentError};

/// A single detected hit
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitEvent {
    /// Sensor channel; negative channels are not wired to a voice
    pub channel: i32,
    /// Raw amplitude reported by the sensor
    pub amplitude: f32,
    /// Arrival time in seconds since the Unix epoch
    pub time: f64,
}

impl HitEvent {
    pub fn new(channel: i32, amplitude: f32, time: f64) -> Self {
        HitEvent {
            channel,
            amplitude,
            time,
        }
    }

    /// Whether a sensor line looks like a hit message at all
    pub fn is_hit_line(line: &str) -> bool {
        line.trim_start().starts_with('h')
    }

    /// Parse one `h<channel>a<amplitude>` line received at `time`
    pub fn parse_line(line: &str, time: f64) -> Result<Self> {
        let trimmed = line.trim();
        let body = trimmed
            .strip_prefix('h')
            .ok_or_else(|| RudimentError::parse(trimmed, "hit messages start with 'h'"))?;
        let (channel, amplitude) = body.split_once('a').ok_or_else(|| {
            RudimentError::parse(trimmed, "expected 'a' between channel and amplitude")
        })?;
        let channel: i32 = channel.trim().parse().map_err(|_| {
            RudimentError::parse(trimmed, format!("channel '{}' is not an integer", channel))
        })?;
        let amplitude: f32 = amplitude.trim().parse().map_err(|_| {
            RudimentError::parse(trimmed, format!("amplitude '{}' is not a number", amplitude))
        })?;
        Ok(HitEvent::new(channel, amplitude, time))
    }

    /// Voice this hit's channel is wired to
    pub fn voice(&self) -> Option<Voice> {
        Voice::from_channel(self.channel)
    }

    /// Encode back into the sensor's line format (without the newline)
    pub fn to_line(&self) -> String {
        format!("h{}a{}", self.channel, self.amplitude)
    }
}
