use anyhow::Result;
use clap::Parser;
use rudiment::commands::CommandContext;
use rudiment::{HitSensor, Metronome, PracticeConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rudiment", about = "Drum rudiment practice with sensor scoring", version)]
struct Cli {
    /// Config file (defaults to ./rudiment.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exercise table to load
    #[arg(short, long)]
    exercises: Option<PathBuf>,

    /// Exercise to select at startup
    #[arg(short = 'x', long)]
    exercise: Option<String>,

    /// Sensor port, overriding the config
    #[arg(short, long)]
    port: Option<String>,

    /// Tempo in BPM, overriding the config
    #[arg(short, long)]
    bpm: Option<f32>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PracticeConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.exercises {
        config.exercises_path = path;
    }
    if let Some(port) = cli.port {
        config.sensor.port = Some(port);
    }
    if let Some(bpm) = cli.bpm {
        config.tempo.bpm = bpm;
    }
    config.verbose |= cli.verbose;
    config.validate()?;

    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let sensor = match config.sensor.port {
        Some(_) => HitSensor::connect(&config.sensor).unwrap_or_else(|e| {
            warn!("{:#}; hits can still be entered with 'hit'", e);
            HitSensor::detached()
        }),
        None => {
            info!("no sensor port configured; use 'hit' to play");
            HitSensor::detached()
        }
    };

    let metronome = Arc::new(Metronome::new(config.tempo.bpm, config.beats_per_bar));
    let exercises_path = config.exercises_path.clone();
    let mut ctx = CommandContext::with_sensor(config, metronome, sensor);

    if exercises_path.exists() {
        let summary = ctx.load_exercises(&exercises_path)?;
        println!("{}", summary);
    } else {
        warn!(path = %exercises_path.display(), "exercise table not found; use 'load <path>'");
    }

    if let Some(name) = cli.exercise {
        ctx.selected = Some(ctx.factory.exercise(&name)?);
    }

    rudiment::repl::start(ctx)
}
