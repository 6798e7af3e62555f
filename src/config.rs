//! Practice configuration
//!
//! Read from an optional TOML file, then overridden by environment
//! variables so a sensor port can be set without editing the file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "rudiment.toml";

/// Tempo settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    pub bpm: f32,
    pub min_bpm: f32,
    pub max_bpm: f32,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            bpm: 60.0,
            min_bpm: 20.0,
            max_bpm: 300.0,
        }
    }
}

/// Drum sensor connection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Device path; no sensor is opened when unset
    pub port: Option<String>,
    /// Expected line speed. The port is read as a plain device file, so
    /// this is not applied; set it with `stty` (see
    /// [`SensorConfig::stty_command`])
    pub baud_rate: u32,
    /// Line the sensor prints once it is ready to report hits
    pub ready_message: String,
    /// Hits quieter than this are ignored
    pub amplitude_threshold: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 115_200,
            ready_message: "ready".to_string(),
            amplitude_threshold: 700.0,
        }
    }
}

impl SensorConfig {
    /// Shell command that puts the port into the expected line settings
    pub fn stty_command(&self) -> Option<String> {
        self.port
            .as_deref()
            .map(|port| format!("stty -F {} {} raw -echo", port, self.baud_rate))
    }
}

/// Hit matching
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Beats on either side of a target that still count as a hit
    pub tolerance_beats: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            tolerance_beats: rudiment_core::types::DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    /// Exercise table loaded at startup
    pub exercises_path: PathBuf,
    pub beats_per_bar: usize,
    pub verbose: bool,
    pub tempo: TempoConfig,
    pub sensor: SensorConfig,
    pub scoring: ScoringConfig,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            exercises_path: PathBuf::from("./data/exercises.tsv"),
            beats_per_bar: 4,
            verbose: false,
            tempo: TempoConfig::default(),
            sensor: SensorConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Parse a boolean flag the way the environment spells them
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .ok()
        .with_context(|| format!("{}='{}' is not a valid value", key, value))
}

impl PracticeConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid practice configuration")
    }

    /// Load the config file (explicit path, or `rudiment.toml` if present),
    /// then apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::read(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("In {}", path.display()))
    }

    /// Override fields from `COM_PORT`, `BAUDRATE`, `EXERCISE_TSV_PATH`,
    /// `BPM`, `BEATS_PER_BAR` and `VERBOSE`, looked up through `lookup`
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("COM_PORT") {
            self.sensor.port = Some(port);
        }
        if let Some(baud) = lookup("BAUDRATE") {
            self.sensor.baud_rate = parse_var("BAUDRATE", &baud)?;
        }
        if let Some(path) = lookup("EXERCISE_TSV_PATH") {
            self.exercises_path = PathBuf::from(path);
        }
        if let Some(bpm) = lookup("BPM") {
            self.tempo.bpm = parse_var("BPM", &bpm)?;
        }
        if let Some(beats) = lookup("BEATS_PER_BAR") {
            self.beats_per_bar = parse_var("BEATS_PER_BAR", &beats)?;
        }
        if let Some(verbose) = lookup("VERBOSE") {
            self.verbose = parse_bool(&verbose)
                .with_context(|| format!("VERBOSE='{}' is not a boolean", verbose))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let tempo = &self.tempo;
        if !(tempo.min_bpm > 0.0 && tempo.min_bpm <= tempo.max_bpm) {
            bail!(
                "Tempo range {}-{} BPM is empty",
                tempo.min_bpm,
                tempo.max_bpm
            );
        }
        if !self.bpm_in_range(tempo.bpm) {
            bail!(
                "Tempo {} BPM is outside {}-{} BPM",
                tempo.bpm,
                tempo.min_bpm,
                tempo.max_bpm
            );
        }
        if self.beats_per_bar == 0 {
            bail!("beats_per_bar must be at least 1");
        }
        if self.scoring.tolerance_beats <= 0.0 {
            bail!("scoring.tolerance_beats must be positive");
        }
        Ok(())
    }

    pub fn bpm_in_range(&self, bpm: f32) -> bool {
        bpm >= self.tempo.min_bpm && bpm <= self.tempo.max_bpm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PracticeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sensor.baud_rate, 115_200);
        assert_eq!(config.sensor.ready_message, "ready");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PracticeConfig::from_toml(
            r#"
            beats_per_bar = 3

            [tempo]
            bpm = 100.0

            [sensor]
            port = "/dev/ttyACM0"
            "#,
        )
        .unwrap();
        assert_eq!(config.beats_per_bar, 3);
        assert_eq!(config.tempo.bpm, 100.0);
        assert_eq!(config.tempo.max_bpm, 300.0);
        assert_eq!(config.sensor.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(config.sensor.amplitude_threshold, 700.0);
    }

    #[test]
    fn test_stty_command_carries_baud_rate() {
        let mut sensor = SensorConfig::default();
        assert_eq!(sensor.stty_command(), None);
        sensor.port = Some("/dev/ttyACM0".to_string());
        sensor.baud_rate = 9600;
        assert_eq!(
            sensor.stty_command().as_deref(),
            Some("stty -F /dev/ttyACM0 9600 raw -echo")
        );
    }

    #[test]
    fn test_invalid_toml() {
        assert!(PracticeConfig::from_toml("beats_per_bar = \"four\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = PracticeConfig::default();
        config
            .apply_env_with(env(&[
                ("COM_PORT", "COM3"),
                ("BAUDRATE", "9600"),
                ("EXERCISE_TSV_PATH", "/tmp/ex.tsv"),
                ("BPM", " 72 "),
                ("VERBOSE", "True"),
            ]))
            .unwrap();
        assert_eq!(config.sensor.port.as_deref(), Some("COM3"));
        assert_eq!(config.sensor.baud_rate, 9600);
        assert_eq!(config.exercises_path, PathBuf::from("/tmp/ex.tsv"));
        assert_eq!(config.tempo.bpm, 72.0);
        assert!(config.verbose);
        assert_eq!(config.beats_per_bar, 4);
    }

    #[test]
    fn test_bad_env_value_names_the_variable() {
        let mut config = PracticeConfig::default();
        let err = config
            .apply_env_with(env(&[("BPM", "fast")]))
            .unwrap_err();
        assert!(err.to_string().contains("BPM='fast'"), "{}", err);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool(" FALSE "), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_validate_rejects_out_of_range_tempo() {
        let mut config = PracticeConfig::default();
        config.tempo.bpm = 500.0;
        assert!(config.validate().is_err());
        config.tempo.bpm = 120.0;
        config.beats_per_bar = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("practice.toml");
        std::fs::write(&path, "[scoring]\ntolerance_beats = 0.25\n").unwrap();
        let config = PracticeConfig::read(&path).unwrap();
        assert_eq!(config.scoring.tolerance_beats, 0.25);
        assert!(PracticeConfig::read(&dir.path().join("missing.toml")).is_err());
    }
}
