//! Difficulty levels and their immutable parameter bundles.
//!
//! Harder levels spawn faster, let moles live shorter, pay more per hit and
//! allow more moles on the board at once.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DifficultyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// The profile governing spawn cadence, lifetime and scoring at this level.
    pub fn profile(self) -> DifficultyProfile {
        DifficultyProfile::for_level(self)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(DifficultyError::Unknown(s.to_string())),
        }
    }
}

/// Immutable parameter set for one difficulty level.
///
/// All numeric fields are strictly positive and `max_concurrent_moles >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DifficultyProfile {
    pub level: Difficulty,
    pub name: &'static str,
    pub spawn_interval_ms: u64,
    pub mole_lifetime_ms: u64,
    pub points_per_hit: u32,
    pub max_concurrent_moles: usize,
}

const EASY: DifficultyProfile = DifficultyProfile {
    level: Difficulty::Easy,
    name: "Easy",
    spawn_interval_ms: 1200,
    mole_lifetime_ms: 1500,
    points_per_hit: 1,
    max_concurrent_moles: 1,
};

const MEDIUM: DifficultyProfile = DifficultyProfile {
    level: Difficulty::Medium,
    name: "Medium",
    spawn_interval_ms: 800,
    mole_lifetime_ms: 1000,
    points_per_hit: 2,
    max_concurrent_moles: 2,
};

const HARD: DifficultyProfile = DifficultyProfile {
    level: Difficulty::Hard,
    name: "Hard",
    spawn_interval_ms: 400,
    mole_lifetime_ms: 800,
    points_per_hit: 3,
    max_concurrent_moles: 3,
};

impl DifficultyProfile {
    pub const fn for_level(level: Difficulty) -> Self {
        match level {
            Difficulty::Easy => EASY,
            Difficulty::Medium => MEDIUM,
            Difficulty::Hard => HARD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_match_their_level() {
        for level in Difficulty::ALL {
            assert_eq!(level.profile().level, level);
        }
    }

    #[test]
    fn all_fields_are_positive() {
        for level in Difficulty::ALL {
            let p = level.profile();
            assert!(p.spawn_interval_ms > 0);
            assert!(p.mole_lifetime_ms > 0);
            assert!(p.points_per_hit > 0);
            assert!(p.max_concurrent_moles >= 1);
        }
    }

    #[test]
    fn harder_levels_are_faster_and_pay_more() {
        let pairs = [
            (Difficulty::Easy.profile(), Difficulty::Medium.profile()),
            (Difficulty::Medium.profile(), Difficulty::Hard.profile()),
        ];
        for (easier, harder) in pairs {
            assert!(harder.spawn_interval_ms < easier.spawn_interval_ms);
            assert!(harder.mole_lifetime_ms < easier.mole_lifetime_ms);
            assert!(harder.points_per_hit > easier.points_per_hit);
            assert!(harder.max_concurrent_moles > easier.max_concurrent_moles);
        }
    }

    #[test]
    fn medium_profile_values() {
        let p = DifficultyProfile::for_level(Difficulty::Medium);
        assert_eq!(p.name, "Medium");
        assert_eq!(p.spawn_interval_ms, 800);
        assert_eq!(p.mole_lifetime_ms, 1000);
        assert_eq!(p.points_per_hit, 2);
        assert_eq!(p.max_concurrent_moles, 2);
    }

    #[test]
    fn parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" easy ".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(
            "extreme".parse::<Difficulty>(),
            Err(DifficultyError::Unknown("extreme".into()))
        );
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Medium).unwrap(), "\"medium\"");
    }
}
