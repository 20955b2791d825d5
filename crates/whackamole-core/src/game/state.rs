use std::fmt;

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;

/// Identifier of a spawned mole. Unique for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoleId(pub u64);

impl fmt::Display for MoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mole-{}", self.0)
    }
}

/// Grid cell, both coordinates in `[0, grid_size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mole {
    pub id: MoleId,
    pub position: Position,
    /// Engine clock reading when the mole spawned.
    pub created_at_ms: u64,
    pub hit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero; only `reset` leaves this phase.
    Ended,
}

/// Snapshot of a session as returned by `GameEngine::state`.
///
/// Invariants: `paused` implies `running`, and every mole lies inside the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    pub time_remaining_secs: u32,
    pub difficulty: Difficulty,
    pub running: bool,
    pub paused: bool,
    pub active_moles: Vec<Mole>,
    pub grid_size: usize,
    pub phase: GamePhase,
    /// Milliseconds on the engine clock since construction.
    pub elapsed_ms: u64,
}

impl SessionState {
    pub(crate) fn new(grid_size: usize, countdown_secs: u32, difficulty: Difficulty) -> Self {
        Self {
            score: 0,
            time_remaining_secs: countdown_secs,
            difficulty,
            running: false,
            paused: false,
            active_moles: Vec::new(),
            grid_size,
            phase: GamePhase::Idle,
            elapsed_ms: 0,
        }
    }

    pub fn mole(&self, id: MoleId) -> Option<&Mole> {
        self.active_moles.iter().find(|m| m.id == id)
    }
}
