use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use whackamole_core::config::MAX_GRID_SIZE;
use whackamole_core::metrics::report;
use whackamole_core::{handler, GameEngine, GamePhase, JsonLinesSink};

/// Salt so the bot's choices don't mirror mole placement for the same seed.
const BOT_SEED_SALT: u64 = 0x5eed_b07;

#[derive(Args)]
pub struct SimulateArgs {
    /// Difficulty level (easy, medium, hard); defaults to the configured level
    #[arg(long)]
    difficulty: Option<String>,
    /// Board edge length
    #[arg(long)]
    grid: Option<usize>,
    /// Seed for mole placement and the bot
    #[arg(long)]
    seed: Option<u64>,
    /// Countdown length in seconds
    #[arg(long)]
    seconds: Option<u32>,
    /// Chance that the bot hits each visible mole per reaction step (0..=1)
    #[arg(long, default_value_t = 0.5)]
    hit_rate: f64,
    /// Bot reaction step in milliseconds
    #[arg(long, default_value_t = 250)]
    step_ms: u64,
    /// Append the final metrics record as a JSON line to this file
    #[arg(long)]
    metrics_out: Option<PathBuf>,
}

pub fn run(args: SimulateArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let mut settings = config.engine_settings();
    super::apply_overrides(&mut settings, args.difficulty.as_deref(), args.seed)?;
    if let Some(grid) = args.grid {
        if grid == 0 || grid > MAX_GRID_SIZE {
            return Err(format!("--grid must be between 1 and {MAX_GRID_SIZE}").into());
        }
        settings.grid_size = grid;
    }
    if let Some(seconds) = args.seconds {
        if seconds == 0 {
            return Err("--seconds must be at least 1".into());
        }
        settings.countdown_secs = seconds;
    }
    if !(0.0..=1.0).contains(&args.hit_rate) {
        return Err("--hit-rate must be between 0 and 1".into());
    }

    let mut bot = match settings.seed {
        Some(seed) => Pcg64::seed_from_u64(seed ^ BOT_SEED_SALT),
        None => Pcg64::from_entropy(),
    };
    let step = Duration::from_millis(args.step_ms.max(1));
    tracing::debug!(?settings, hit_rate = args.hit_rate, "starting simulation");

    let mut engine = GameEngine::with_settings(settings);
    // A closed stdout surfaces as a handler error instead of a panic.
    engine.event_bus_mut().subscribe_all(&handler(|event| {
        let mut out = std::io::stdout().lock();
        serde_json::to_writer(&mut out, event)?;
        writeln!(out)?;
        Ok(())
    }));

    engine.start();
    while engine.phase() != GamePhase::Ended {
        engine.advance(step);
        for mole in engine.state().active_moles {
            if bot.gen_bool(args.hit_rate) {
                engine.register_hit(mole.id);
            }
        }
    }

    let metrics = engine
        .last_metrics()
        .cloned()
        .ok_or("session ended without metrics")?;

    if let Some(path) = args.metrics_out {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let sink = JsonLinesSink::new(file);
        if report(&[&sink], &metrics) == 0 {
            return Err(format!("failed to write metrics to {}", path.display()).into());
        }
    }

    eprintln!("{}", metrics.summary());
    Ok(())
}
