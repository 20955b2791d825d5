mod engine;
mod state;
mod timers;

pub use engine::{EngineSettings, GameEngine, COUNTDOWN_TICK_MS};
pub use state::{GamePhase, Mole, MoleId, Position, SessionState};
pub use timers::{Fired, TimerId, TimerKind, TimerQueue};
