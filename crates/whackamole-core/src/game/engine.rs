//! Session engine implementation.
//!
//! The engine is a single-owner state machine over a virtual millisecond
//! clock. It does not use internal threads - timers only fire inside
//! `advance()`, one callback at a time, so state never needs locking.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!          Ended -(reset)-> Idle
//! ```
//!
//! ## Usage
//!
//! ```
//! use std::time::Duration;
//! use whackamole_core::{Difficulty, GameEngine};
//!
//! let mut engine = GameEngine::new(4, Difficulty::Medium);
//! engine.start();
//! engine.advance(Duration::from_millis(800));
//! assert!(engine.state().active_moles.len() <= 2);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{debug, trace};

use super::state::{GamePhase, Mole, MoleId, Position, SessionState};
use super::timers::{Fired, TimerId, TimerKind, TimerQueue};
use crate::difficulty::{Difficulty, DifficultyProfile};
use crate::events::{EventBus, GameEvent};
use crate::metrics::GameMetrics;

/// Countdown resolution.
pub const COUNTDOWN_TICK_MS: u64 = 1_000;

/// Construction parameters for [`GameEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub grid_size: usize,
    pub countdown_secs: u32,
    pub difficulty: Difficulty,
    pub seed: Option<u64>,
    pub resume_spawns_immediately: bool,
    pub freeze_moles_on_pause: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            grid_size: 4,
            countdown_secs: 60,
            difficulty: Difficulty::Medium,
            seed: None,
            resume_spawns_immediately: false,
            freeze_moles_on_pause: false,
        }
    }
}

/// Owns one session: its state, profile, event bus and every timer.
pub struct GameEngine {
    settings: EngineSettings,
    state: SessionState,
    profile: DifficultyProfile,
    bus: EventBus,
    timers: TimerQueue,
    countdown_timer: Option<TimerId>,
    spawn_timer: Option<TimerId>,
    expiry_timers: HashMap<MoleId, TimerId>,
    /// Remaining lifetime of moles frozen by a pause (freeze mode only).
    frozen_lifetimes: BTreeMap<MoleId, u64>,
    next_mole_id: u64,
    rng: Pcg64,
    last_metrics: Option<GameMetrics>,
}

impl GameEngine {
    pub fn new(grid_size: usize, difficulty: Difficulty) -> Self {
        Self::with_settings(EngineSettings {
            grid_size,
            difficulty,
            ..EngineSettings::default()
        })
    }

    pub fn with_settings(mut settings: EngineSettings) -> Self {
        settings.grid_size = settings.grid_size.max(1);
        let rng = match settings.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        Self {
            state: SessionState::new(settings.grid_size, settings.countdown_secs, settings.difficulty),
            profile: settings.difficulty.profile(),
            bus: EventBus::new(),
            timers: TimerQueue::new(),
            countdown_timer: None,
            spawn_timer: None,
            expiry_timers: HashMap::new(),
            frozen_lifetimes: BTreeMap::new(),
            next_mole_id: 1,
            rng,
            last_metrics: None,
            settings,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Immutable snapshot of the session.
    pub fn state(&self) -> SessionState {
        let mut snapshot = self.state.clone();
        snapshot.elapsed_ms = self.timers.now_ms();
        snapshot
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn event_bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    /// Earliest pending timer on the engine clock, if any.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Number of armed timers, including per-mole expiries.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Metrics of the most recent `game-over`.
    pub fn last_metrics(&self) -> Option<&GameMetrics> {
        self.last_metrics.as_ref()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) {
        if self.state.running || self.state.phase == GamePhase::Ended {
            trace!(phase = ?self.state.phase, "start ignored");
            return;
        }
        self.state.running = true;
        self.state.paused = false;
        self.state.phase = GamePhase::Running;
        debug!(difficulty = %self.state.difficulty, grid = self.state.grid_size, "session started");
        self.publish(GameEvent::GameStarted {
            difficulty: self.state.difficulty,
        });

        self.disarm_session_timers();
        self.countdown_timer = Some(
            self.timers
                .schedule_repeating(COUNTDOWN_TICK_MS, TimerKind::Countdown),
        );
        self.try_spawn();
        self.spawn_timer = Some(
            self.timers
                .schedule_repeating(self.profile.spawn_interval_ms, TimerKind::Spawn),
        );
    }

    pub fn pause(&mut self) {
        if !self.state.running || self.state.paused {
            trace!(phase = ?self.state.phase, "pause ignored");
            return;
        }
        self.state.paused = true;
        self.state.phase = GamePhase::Paused;
        self.disarm_session_timers();

        if self.settings.freeze_moles_on_pause {
            let now = self.timers.now_ms();
            for (mole_id, timer) in self.expiry_timers.drain() {
                let remaining = self
                    .timers
                    .deadline(timer)
                    .map_or(0, |deadline| deadline.saturating_sub(now));
                self.timers.cancel(timer);
                self.frozen_lifetimes.insert(mole_id, remaining);
            }
        }

        debug!(score = self.state.score, "session paused");
        self.publish(GameEvent::GamePaused {
            score: self.state.score,
        });
    }

    pub fn resume(&mut self) {
        if !self.state.running || !self.state.paused {
            trace!(phase = ?self.state.phase, "resume ignored");
            return;
        }
        self.state.paused = false;
        self.state.phase = GamePhase::Running;

        for (mole_id, remaining) in std::mem::take(&mut self.frozen_lifetimes) {
            let timer = self
                .timers
                .schedule_once(remaining, TimerKind::MoleExpiry(mole_id));
            self.expiry_timers.insert(mole_id, timer);
        }

        self.countdown_timer = Some(
            self.timers
                .schedule_repeating(COUNTDOWN_TICK_MS, TimerKind::Countdown),
        );
        if self.settings.resume_spawns_immediately {
            self.try_spawn();
        }
        self.spawn_timer = Some(
            self.timers
                .schedule_repeating(self.profile.spawn_interval_ms, TimerKind::Spawn),
        );
        debug!("session resumed");
    }

    /// End the session if running, then restore a fresh idle board.
    pub fn reset(&mut self) {
        if self.state.running {
            self.end_session();
        }
        self.disarm_session_timers();
        self.timers.cancel_all();
        self.expiry_timers.clear();
        self.frozen_lifetimes.clear();

        self.state.score = 0;
        self.state.time_remaining_secs = self.settings.countdown_secs;
        self.state.active_moles.clear();
        self.state.running = false;
        self.state.paused = false;
        self.state.phase = GamePhase::Idle;
        debug!("session reset");
    }

    /// Swap the profile. Moles already on the board keep their lifetime;
    /// the next spawn decision and the next hit use the new profile.
    pub fn set_difficulty(&mut self, level: Difficulty) {
        self.state.difficulty = level;
        self.settings.difficulty = level;
        self.profile = level.profile();
        debug!(difficulty = %level, "difficulty changed");
    }

    pub fn register_hit(&mut self, mole_id: MoleId) {
        let Some(mole) = self.state.active_moles.iter_mut().find(|m| m.id == mole_id) else {
            trace!(%mole_id, "hit on unknown mole ignored");
            return;
        };
        if mole.hit {
            return;
        }
        mole.hit = true;

        let points = self.profile.points_per_hit;
        self.state.score += u64::from(points);
        self.remove_mole(mole_id);

        self.publish(GameEvent::MoleHit { mole_id, points });
        self.publish(GameEvent::ScoreUpdated {
            score: self.state.score,
        });
    }

    /// Move the engine clock forward by `dt`, firing due timers in deadline order.
    pub fn advance(&mut self, dt: Duration) {
        let dt_ms = u64::try_from(dt.as_millis()).unwrap_or(u64::MAX);
        let target = self.timers.now_ms().saturating_add(dt_ms);
        while let Some(fired) = self.timers.pop_due(target) {
            self.dispatch(fired);
        }
        self.timers.advance_to(target);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn dispatch(&mut self, fired: Fired) {
        trace!(kind = ?fired.kind, at = fired.deadline_ms, "timer fired");
        match fired.kind {
            TimerKind::Countdown if self.countdown_timer == Some(fired.id) => self.on_countdown_tick(),
            TimerKind::Spawn if self.spawn_timer == Some(fired.id) => self.try_spawn(),
            TimerKind::MoleExpiry(mole_id) => self.on_mole_expired(mole_id, fired.id),
            _ => {}
        }
    }

    fn on_countdown_tick(&mut self) {
        self.state.time_remaining_secs = self.state.time_remaining_secs.saturating_sub(1);
        self.publish(GameEvent::TimeTick {
            time_remaining: self.state.time_remaining_secs,
        });
        if self.state.time_remaining_secs == 0 {
            self.end_session();
        }
    }

    fn try_spawn(&mut self) {
        if !self.state.running || self.state.paused {
            return;
        }
        if self.state.active_moles.len() >= self.profile.max_concurrent_moles {
            trace!(active = self.state.active_moles.len(), "board full, spawn skipped");
            return;
        }

        let mole_id = MoleId(self.next_mole_id);
        self.next_mole_id += 1;
        let grid = self.state.grid_size;
        let position = Position {
            row: self.rng.gen_range(0..grid),
            col: self.rng.gen_range(0..grid),
        };
        self.state.active_moles.push(Mole {
            id: mole_id,
            position,
            created_at_ms: self.timers.now_ms(),
            hit: false,
        });
        let timer = self
            .timers
            .schedule_once(self.profile.mole_lifetime_ms, TimerKind::MoleExpiry(mole_id));
        self.expiry_timers.insert(mole_id, timer);

        self.publish(GameEvent::MoleSpawned { mole_id, position });
    }

    fn on_mole_expired(&mut self, mole_id: MoleId, timer: TimerId) {
        if self.expiry_timers.get(&mole_id) != Some(&timer) {
            return;
        }
        self.expiry_timers.remove(&mole_id);
        let Some(index) = self.state.active_moles.iter().position(|m| m.id == mole_id) else {
            return;
        };
        if self.state.active_moles[index].hit {
            return;
        }
        self.state.active_moles.remove(index);
        self.publish(GameEvent::MoleTimeout { mole_id });
    }

    /// Drop a mole and its pending expiry together.
    fn remove_mole(&mut self, mole_id: MoleId) {
        self.state.active_moles.retain(|m| m.id != mole_id);
        if let Some(timer) = self.expiry_timers.remove(&mole_id) {
            self.timers.cancel(timer);
        }
        self.frozen_lifetimes.remove(&mole_id);
    }

    fn disarm_session_timers(&mut self) {
        if let Some(timer) = self.countdown_timer.take() {
            self.timers.cancel(timer);
        }
        if let Some(timer) = self.spawn_timer.take() {
            self.timers.cancel(timer);
        }
    }

    fn end_session(&mut self) {
        self.state.running = false;
        self.state.paused = false;
        self.state.phase = GamePhase::Ended;
        self.disarm_session_timers();
        for (_, timer) in self.expiry_timers.drain() {
            self.timers.cancel(timer);
        }
        self.frozen_lifetimes.clear();
        self.state.active_moles.clear();

        let survived = self
            .settings
            .countdown_secs
            .saturating_sub(self.state.time_remaining_secs);
        self.last_metrics = Some(GameMetrics::new(
            self.state.score,
            self.state.difficulty,
            survived,
        ));
        debug!(final_score = self.state.score, survived, "session over");
        self.publish(GameEvent::GameOver {
            final_score: self.state.score,
            difficulty: self.state.difficulty,
        });
    }

    fn publish(&self, event: GameEvent) {
        self.bus.publish(&event);
    }
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("state", &self.state)
            .field("profile", &self.profile.name)
            .field("pending_timers", &self.timers.len())
            .finish()
    }
}
