//! Synchronous, in-process publish/subscribe keyed by [`EventKind`].
//!
//! No queue and no backpressure: `publish` calls every handler registered for
//! the event's kind, in registration order, before returning. A handler that
//! fails or panics is logged and skipped; the rest still see the event.
//! Panic isolation relies on unwinding, so builds must not use `panic = "abort"`.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::{EventKind, GameEvent};

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

/// Shared handler. Identity is the allocation: clone the `Arc` to refer to
/// the same handler in `subscribe` and `unsubscribe`.
pub type Handler = Arc<dyn Fn(&GameEvent) -> HandlerResult + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&GameEvent) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`. Registering the same handler twice is a no-op.
    pub fn subscribe(&mut self, kind: EventKind, handler: &Handler) {
        let list = self.handlers.entry(kind).or_default();
        if list.iter().any(|h| same_handler(h, handler)) {
            return;
        }
        list.push(Arc::clone(handler));
    }

    pub fn subscribe_all(&mut self, handler: &Handler) {
        for kind in EventKind::ALL {
            self.subscribe(kind, handler);
        }
    }

    /// Remove `handler` from `kind`. Unknown handlers are ignored.
    pub fn unsubscribe(&mut self, kind: EventKind, handler: &Handler) {
        if let Some(list) = self.handlers.get_mut(&kind) {
            list.retain(|h| !same_handler(h, handler));
            if list.is_empty() {
                self.handlers.remove(&kind);
            }
        }
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn publish(&self, event: &GameEvent) {
        let kind = event.kind();
        let Some(list) = self.handlers.get(&kind) else {
            tracing::trace!(kind = kind.as_str(), "no subscribers");
            return;
        };

        for (index, h) in list.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| h(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(kind = kind.as_str(), index, error = %err, "event handler failed");
                }
                Err(_) => {
                    tracing::warn!(kind = kind.as_str(), index, "event handler panicked");
                }
            }
        }
    }

    /// Drop every subscription.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(kind, list)| (kind.as_str(), list.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

fn same_handler(a: &Handler, b: &Handler) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
