//! Cancellable timers on a virtual millisecond clock.
//!
//! The queue never sleeps and never spawns threads. The engine asks it for
//! the next due timer up to some target time and runs each callback to
//! completion before asking again, which gives the cooperative,
//! single-threaded scheduling the engine relies on.

use std::collections::{BTreeMap, HashMap};

use super::state::MoleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Countdown,
    Spawn,
    MoleExpiry(MoleId),
}

/// A timer popped from the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    pub deadline_ms: u64,
}

#[derive(Debug, Clone)]
struct Armed {
    kind: TimerKind,
    /// `(deadline_ms, seq)` key into the ordered queue.
    key: (u64, u64),
    period_ms: Option<u64>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_id: u64,
    next_seq: u64,
    queue: BTreeMap<(u64, u64), TimerId>,
    armed: HashMap<TimerId, Armed>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        self.armed.get(&id).map(|t| t.key.0)
    }

    /// Earliest deadline among armed timers.
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Fire once, `delay_ms` from now.
    pub fn schedule_once(&mut self, delay_ms: u64, kind: TimerKind) -> TimerId {
        self.insert(delay_ms, kind, None)
    }

    /// Fire every `period_ms`, first firing one period from now.
    /// A zero period is treated as 1 ms so the queue always makes progress.
    pub fn schedule_repeating(&mut self, period_ms: u64, kind: TimerKind) -> TimerId {
        let period_ms = period_ms.max(1);
        self.insert(period_ms, kind, Some(period_ms))
    }

    /// Returns false if the timer was not armed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.armed.remove(&id) {
            Some(timer) => {
                self.queue.remove(&timer.key);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.queue.clear();
        self.armed.clear();
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock
    /// to its deadline. Repeating timers are re-armed before being returned,
    /// so cancelling one from inside its own callback stops it.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Fired> {
        let (&key, &id) = self.queue.iter().next()?;
        let deadline_ms = key.0;
        if deadline_ms > until_ms {
            return None;
        }
        self.queue.remove(&key);
        self.now_ms = self.now_ms.max(deadline_ms);

        let seq = self.bump_seq();
        let timer = self.armed.get_mut(&id)?;
        let kind = timer.kind;
        let period_ms = timer.period_ms;
        match period_ms {
            Some(period) => {
                let next_key = (deadline_ms.saturating_add(period), seq);
                timer.key = next_key;
                self.queue.insert(next_key, id);
            }
            None => {
                self.armed.remove(&id);
            }
        }

        Some(Fired {
            id,
            kind,
            deadline_ms,
        })
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }

    fn insert(&mut self, delay_ms: u64, kind: TimerKind, period_ms: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let key = (self.now_ms.saturating_add(delay_ms), self.bump_seq());
        self.queue.insert(key, id);
        self.armed.insert(
            id,
            Armed {
                kind,
                key,
                period_ms,
            },
        );
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
