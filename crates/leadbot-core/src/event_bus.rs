//! Event bus between the turn controller and whoever renders the conversation.
//!
//! Events are buffered until drained; listeners, if any, see each event the
//! moment it is emitted so a front end can print progress mid-cycle.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use leadbot_types::event::TurnEvent;

type Listener = Arc<dyn Fn(&TurnEvent) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    pending: VecDeque<TurnEvent>,
    listeners: Vec<Listener>,
}

/// Shared event bus — clone-cheap via Arc.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event. Called by the turn controller.
    pub fn emit(&self, event: TurnEvent) {
        let listeners = {
            let mut inner = self.lock();
            inner.pending.push_back(event.clone());
            inner.listeners.clone()
        };
        for listener in listeners {
            listener(&event);
        }
    }

    /// Register a callback invoked synchronously on every emit.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&TurnEvent) + Send + Sync + 'static,
    {
        self.lock().listeners.push(Arc::new(listener));
    }

    /// Drain all pending events.
    pub fn drain(&self) -> Vec<TurnEvent> {
        self.lock().pending.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.lock().pending.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BusInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
