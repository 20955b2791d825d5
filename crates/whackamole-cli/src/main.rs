use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "whackamole-cli", version, about = "Whack-a-Mole CLI")]
struct Cli {
    /// Config file to use instead of ~/.config/whackamole/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless session on a virtual clock, printing events as JSON lines
    Simulate(commands::simulate::SimulateArgs),
    /// Play in real time: commands on stdin, events as JSON lines on stdout
    Play(commands::play::PlayArgs),
    /// List difficulty profiles
    Profiles {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args, config_path),
        Commands::Play(args) => commands::play::run(args, config_path),
        Commands::Profiles { json } => commands::profiles::run(json),
        Commands::Config { action } => commands::config::run(action, config_path),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
