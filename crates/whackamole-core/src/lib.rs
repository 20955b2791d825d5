//! # Whack-a-Mole Core Library
//!
//! This library provides the core logic for a timed whack-a-mole game.
//! Moles appear at random cells of a square grid and vanish after a fixed
//! lifetime unless hit; hits score points scaled by difficulty; a countdown
//! ends the session. Rendering and transport belong to adapters, which talk
//! to the engine through commands and a typed event stream.
//!
//! ## Architecture
//!
//! - **Game Engine**: A virtual-clock state machine. Timers (countdown, spawn,
//!   per-mole expiry) fire only inside `advance()`, one at a time
//! - **Event Bus**: Synchronous typed publish/subscribe with per-handler
//!   failure isolation
//! - **Driver**: tokio task mapping wall-clock time onto the engine clock and
//!   accepting commands over a channel
//! - **Config**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`GameEngine`]: Session state machine
//! - [`EventBus`]: Subscription hub for [`GameEvent`]s
//! - [`DifficultyProfile`]: Per-level spawn, lifetime and scoring parameters
//! - [`SessionDriver`]: Real-time adapter
//! - [`Config`]: Application configuration management

pub mod config;
pub mod difficulty;
pub mod driver;
pub mod error;
pub mod events;
pub mod game;
pub mod metrics;

pub use config::Config;
pub use difficulty::{Difficulty, DifficultyProfile};
pub use driver::{Command, DriverHandle, SessionDriver};
pub use error::{ConfigError, CoreError, DifficultyError, DriverError};
pub use events::{handler, EventBus, EventKind, GameEvent, Handler, HandlerResult};
pub use game::{EngineSettings, GameEngine, GamePhase, Mole, MoleId, Position, SessionState};
pub use metrics::{GameMetrics, JsonLinesSink, MetricsSink};
