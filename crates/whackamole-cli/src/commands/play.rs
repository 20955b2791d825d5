use std::path::Path;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use whackamole_core::{
    Command, CoreError, DifficultyError, EngineSettings, GameEngine, GameEvent, MoleId,
    SessionDriver,
};

const HELP: &str = "commands: start | pause | resume | reset | hit <id> | difficulty <level> | quit";

#[derive(Args)]
pub struct PlayArgs {
    /// Difficulty level (easy, medium, hard); defaults to the configured level
    #[arg(long)]
    difficulty: Option<String>,
    /// Seed for mole placement
    #[arg(long)]
    seed: Option<u64>,
}

pub fn run(args: PlayArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let mut settings = config.engine_settings();
    super::apply_overrides(&mut settings, args.difficulty.as_deref(), args.seed)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(play(settings));
    // A pending stdin read would otherwise keep the runtime alive.
    runtime.shutdown_background();
    Ok(result?)
}

/// Run until `quit` or end of input. A finished session stays on screen so
/// the player can `reset` and `start` again.
async fn play(settings: EngineSettings) -> whackamole_core::error::Result<()> {
    let (mut driver, handle) = SessionDriver::new(GameEngine::with_settings(settings));
    let mut events = driver.event_stream();
    let session = tokio::spawn(driver.run());

    eprintln!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(Some(Command::Shutdown)) => break,
                    Ok(Some(command)) => handle.send(command)?,
                    Ok(None) => {}
                    Err(message) => eprintln!("{message}\n{HELP}"),
                }
            }
            Some(event) = events.recv() => {
                println!("{}", serde_json::to_string(&event)?);
                if matches!(event, GameEvent::GameOver { .. }) {
                    eprintln!("session over: reset to play again, quit to exit");
                }
            }
        }
    }

    handle.send(Command::Shutdown)?;
    let engine = session
        .await
        .map_err(|e| CoreError::Custom(format!("session task failed: {e}")))?;
    while let Ok(event) = events.try_recv() {
        println!("{}", serde_json::to_string(&event)?);
    }
    if let Some(metrics) = engine.last_metrics() {
        eprintln!("{}", metrics.summary());
    }
    Ok(())
}

/// Parse one line of user input. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "start" | "s" => Command::Start,
        "pause" | "p" => Command::Pause,
        "resume" | "r" => Command::Resume,
        "reset" => Command::Reset,
        "quit" | "q" | "exit" => Command::Shutdown,
        "hit" | "h" => {
            let id = words.next().ok_or("usage: hit <mole-id>")?;
            Command::Hit(parse_mole_id(id)?)
        }
        "difficulty" | "d" => {
            let level = words
                .next()
                .ok_or("usage: difficulty <easy|medium|hard>")?;
            Command::SetDifficulty(level.parse().map_err(|e: DifficultyError| e.to_string())?)
        }
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(command))
}

/// Accepts both `7` and `mole-7`.
fn parse_mole_id(text: &str) -> Result<MoleId, String> {
    let digits = text.strip_prefix("mole-").unwrap_or(text);
    digits
        .parse::<u64>()
        .map(MoleId)
        .map_err(|_| format!("invalid mole id '{text}'"))
}
