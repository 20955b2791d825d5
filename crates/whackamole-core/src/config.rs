//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Board size and countdown length
//! - Starting difficulty and an optional RNG seed
//! - Pause/resume rule variants
//!
//! Configuration is stored at `~/.config/whackamole/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::error::ConfigError;
use crate::game::EngineSettings;

/// Largest accepted board edge.
pub const MAX_GRID_SIZE: usize = 32;

/// Largest seed TOML can store; its integers are signed 64-bit.
pub const MAX_SEED: u64 = i64::MAX as u64;

/// Session parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Fixed seed for mole placement. Entropy is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Behavioural switches for pause and resume.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Make an extra spawn attempt right after resuming.
    #[serde(default)]
    pub resume_spawns_immediately: bool,
    /// Stop mole expiry timers while paused instead of letting moles age.
    #[serde(default)]
    pub freeze_moles_on_pause: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/whackamole/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

fn default_grid_size() -> usize {
    4
}
fn default_countdown_secs() -> u32 {
    60
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            countdown_secs: default_countdown_secs(),
            difficulty: Difficulty::default(),
            seed: None,
        }
    }
}

/// Returns `~/.config/whackamole[-dev]/` based on WHACKAMOLE_ENV.
///
/// Set WHACKAMOLE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WHACKAMOLE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("whackamole-dev")
    } else {
        base_dir.join("whackamole")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            // Clears optional fields; required ones reject null on deserialize.
            if value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("null") {
                obj.insert(part.to_string(), serde_json::Value::Null);
                return Ok(());
            }

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                // Optional fields serialize as null; accept a JSON literal or fall back to text.
                serde_json::Value::Null => serde_json::from_str(value)
                    .unwrap_or_else(|_| serde_json::Value::String(value.into())),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Read `path`, returning defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write to `path` as pretty TOML.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from the default location, writing defaults there on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.grid_size == 0 || self.game.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::InvalidValue {
                key: "game.grid_size".into(),
                message: format!("must be between 1 and {MAX_GRID_SIZE}"),
            });
        }
        if self.game.countdown_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "game.countdown_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.game.seed.is_some_and(|seed| seed > MAX_SEED) {
            return Err(ConfigError::InvalidValue {
                key: "game.seed".into(),
                message: format!("must be at most {MAX_SEED}"),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The change is only kept if
    /// the resulting config is valid; call `save` or `save_to` to persist it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Engine parameters described by this config.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            grid_size: self.game.grid_size,
            countdown_secs: self.game.countdown_secs,
            difficulty: self.game.difficulty,
            seed: self.game.seed,
            resume_spawns_immediately: self.rules.resume_spawns_immediately,
            freeze_moles_on_pause: self.rules.freeze_moles_on_pause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.game.grid_size, 4);
        assert_eq!(cfg.game.countdown_secs, 60);
        assert_eq!(cfg.game.difficulty, Difficulty::Medium);
        assert_eq!(cfg.game.seed, None);
        assert!(!cfg.rules.resume_spawns_immediately);
        assert!(!cfg.rules.freeze_moles_on_pause);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[game]\ndifficulty = \"hard\"\n").unwrap();
        assert_eq!(cfg.game.difficulty, Difficulty::Hard);
        assert_eq!(cfg.game.grid_size, 4);
        assert_eq!(cfg.rules, RulesConfig::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("game.grid_size").as_deref(), Some("4"));
        assert_eq!(cfg.get("game.difficulty").as_deref(), Some("medium"));
        assert_eq!(cfg.get("rules.freeze_moles_on_pause").as_deref(), Some("false"));
        assert!(cfg.get("game.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("game.countdown_secs", "30").unwrap();
        cfg.set("game.difficulty", "hard").unwrap();
        cfg.set("rules.resume_spawns_immediately", "true").unwrap();
        cfg.set("game.seed", "42").unwrap();
        assert_eq!(cfg.game.countdown_secs, 30);
        assert_eq!(cfg.game.difficulty, Difficulty::Hard);
        assert!(cfg.rules.resume_spawns_immediately);
        assert_eq!(cfg.game.seed, Some(42));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("game.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("nope.grid_size", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_values_and_keeps_old_state() {
        let mut cfg = Config::default();
        assert!(cfg.set("rules.freeze_moles_on_pause", "maybe").is_err());
        assert!(cfg.set("game.difficulty", "extreme").is_err());
        assert!(cfg.set("game.grid_size", "0").is_err());
        assert!(cfg.set("game.countdown_secs", "-5").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn seed_must_fit_in_toml_integer() {
        let mut cfg = Config::default();
        let err = cfg.set("game.seed", &u64::MAX.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "game.seed"));
        assert_eq!(cfg.game.seed, None);

        cfg.set("game.seed", &MAX_SEED.to_string()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().game.seed, Some(MAX_SEED));
    }

    #[test]
    fn seed_can_be_cleared() {
        let mut cfg = Config::default();
        cfg.set("game.seed", "42").unwrap();
        cfg.set("game.seed", "none").unwrap();
        assert_eq!(cfg.game.seed, None);

        cfg.set("game.seed", "9").unwrap();
        cfg.set("game.seed", "NULL").unwrap();
        assert_eq!(cfg.game.seed, None);
        assert_eq!(cfg.get("game.seed").as_deref(), Some("null"));
    }

    #[test]
    fn required_values_cannot_be_cleared() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("game.grid_size", "none"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set("rules.freeze_moles_on_pause", "null").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.set("game.grid_size", "6").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.game.grid_size, 6);
    }

    #[test]
    fn load_from_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[game]\ngrid_size = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
        std::fs::write(&path, "not toml at all [").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseFailed(_))));
    }

    #[test]
    fn engine_settings_follow_config() {
        let mut cfg = Config::default();
        cfg.set("rules.freeze_moles_on_pause", "true").unwrap();
        cfg.set("game.seed", "7").unwrap();
        let settings = cfg.engine_settings();
        assert!(settings.freeze_moles_on_pause);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.grid_size, 4);
    }
}
