mod bus;

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::game::{MoleId, Position};

pub use bus::{handler, EventBus, Handler, HandlerError, HandlerResult};

/// Every state transition of the engine produces an Event.
/// Adapters subscribe to the kinds they render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    MoleSpawned {
        mole_id: MoleId,
        position: Position,
    },
    MoleHit {
        mole_id: MoleId,
        points: u32,
    },
    MoleTimeout {
        mole_id: MoleId,
    },
    ScoreUpdated {
        score: u64,
    },
    GameStarted {
        difficulty: Difficulty,
    },
    GamePaused {
        score: u64,
    },
    GameOver {
        final_score: u64,
        difficulty: Difficulty,
    },
    TimeTick {
        time_remaining: u32,
    },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::MoleSpawned { .. } => EventKind::MoleSpawned,
            GameEvent::MoleHit { .. } => EventKind::MoleHit,
            GameEvent::MoleTimeout { .. } => EventKind::MoleTimeout,
            GameEvent::ScoreUpdated { .. } => EventKind::ScoreUpdated,
            GameEvent::GameStarted { .. } => EventKind::GameStarted,
            GameEvent::GamePaused { .. } => EventKind::GamePaused,
            GameEvent::GameOver { .. } => EventKind::GameOver,
            GameEvent::TimeTick { .. } => EventKind::TimeTick,
        }
    }
}

/// Subscription key: the discriminant of [`GameEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    MoleSpawned,
    MoleHit,
    MoleTimeout,
    ScoreUpdated,
    GameStarted,
    GamePaused,
    GameOver,
    TimeTick,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::MoleSpawned,
        EventKind::MoleHit,
        EventKind::MoleTimeout,
        EventKind::ScoreUpdated,
        EventKind::GameStarted,
        EventKind::GamePaused,
        EventKind::GameOver,
        EventKind::TimeTick,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::MoleSpawned => "mole-spawned",
            EventKind::MoleHit => "mole-hit",
            EventKind::MoleTimeout => "mole-timeout",
            EventKind::ScoreUpdated => "score-updated",
            EventKind::GameStarted => "game-started",
            EventKind::GamePaused => "game-paused",
            EventKind::GameOver => "game-over",
            EventKind::TimeTick => "time-tick",
        }
    }
}
