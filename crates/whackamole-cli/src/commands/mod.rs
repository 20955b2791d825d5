pub mod config;
pub mod play;
pub mod profiles;
pub mod simulate;

use std::path::{Path, PathBuf};

use whackamole_core::error::Result;
use whackamole_core::{Config, ConfigError, Difficulty, EngineSettings};

/// Resolve the config file: explicit `--config` path or the default location.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::path(),
    }
}

pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => Config::load_from(path),
        None => Ok(Config::load_or_default()),
    }
}

/// Apply `--difficulty` / `--seed` overrides shared by the session commands.
pub fn apply_overrides(
    settings: &mut EngineSettings,
    difficulty: Option<&str>,
    seed: Option<u64>,
) -> Result<()> {
    if let Some(level) = difficulty {
        settings.difficulty = level.parse::<Difficulty>()?;
    }
    if seed.is_some() {
        settings.seed = seed;
    }
    Ok(())
}
