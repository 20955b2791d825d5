//! Real-time driver for a [`GameEngine`].
//!
//! One tokio task owns the engine. It waits for either the next timer
//! deadline or an incoming [`Command`], catches the engine clock up to the
//! wall clock, and applies the command. Everything runs on that one task,
//! so callbacks and commands never interleave.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::difficulty::Difficulty;
use crate::error::DriverError;
use crate::events::{handler, GameEvent};
use crate::game::{GameEngine, MoleId};

/// Commands an adapter can send to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Reset,
    SetDifficulty(Difficulty),
    Hit(MoleId),
    Shutdown,
}

/// Cloneable sender side of a [`SessionDriver`].
#[derive(Debug, Clone)]
pub struct DriverHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl DriverHandle {
    pub fn send(&self, command: Command) -> Result<(), DriverError> {
        self.tx.send(command).map_err(|_| DriverError::Closed)
    }
}

pub struct SessionDriver {
    engine: GameEngine,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl SessionDriver {
    pub fn new(engine: GameEngine) -> (Self, DriverHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        (Self { engine, commands }, DriverHandle { tx })
    }

    /// Forward every event the engine publishes into a channel.
    /// The forwarding handler starts failing (and is isolated by the bus)
    /// once the receiver is dropped.
    pub fn event_stream(&mut self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.engine.event_bus_mut().subscribe_all(&handler(move |event| {
            tx.send(event.clone())?;
            Ok(())
        }));
        rx
    }

    /// Drive the engine until `Shutdown` arrives or every handle is dropped.
    /// Returns the engine so callers can inspect the final state.
    pub async fn run(mut self) -> GameEngine {
        let origin = Instant::now();
        let base_ms = self.engine.elapsed_ms();
        tracing::debug!("session driver started");

        loop {
            let wake_at = self
                .engine
                .next_deadline_ms()
                .map(|deadline| origin + Duration::from_millis(deadline.saturating_sub(base_ms)));

            tokio::select! {
                command = self.commands.recv() => {
                    self.catch_up(origin, base_ms);
                    match command {
                        None | Some(Command::Shutdown) => break,
                        Some(command) => self.apply(command),
                    }
                }
                _ = sleep_until_deadline(wake_at) => {
                    self.catch_up(origin, base_ms);
                }
            }
        }

        tracing::debug!("session driver stopped");
        self.engine
    }

    fn catch_up(&mut self, origin: Instant, base_ms: u64) {
        let wall_ms = u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        let target = base_ms.saturating_add(wall_ms);
        let behind = target.saturating_sub(self.engine.elapsed_ms());
        if behind > 0 {
            self.engine.advance(Duration::from_millis(behind));
        }
    }

    fn apply(&mut self, command: Command) {
        tracing::trace!(?command, "applying command");
        match command {
            Command::Start => self.engine.start(),
            Command::Pause => self.engine.pause(),
            Command::Resume => self.engine.resume(),
            Command::Reset => self.engine.reset(),
            Command::SetDifficulty(level) => self.engine.set_difficulty(level),
            Command::Hit(mole_id) => self.engine.register_hit(mole_id),
            Command::Shutdown => {}
        }
    }
}

async fn sleep_until_deadline(at: Option<Instant>) {
    match at {
        Some(at) => sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}
