//! Signal change broadcast
//!
//! The controller publishes every vehicle color change through a
//! [`SignalBus`]. Dispatch is synchronous and follows subscription order.
//! Listeners cannot reach the bus while it dispatches; a listener that wants
//! to stop receiving events returns [`ListenerAction::Unsubscribe`], and the
//! removal is applied once the current event has reached every listener.

use std::cell::RefCell;
use std::rc::Rc;

use super::types::{Direction, SignalColor};

/// A vehicle signal head switched color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalChange {
    pub direction: Direction,
    pub color: SignalColor,
}

/// What a listener wants after handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerAction {
    Keep,
    Unsubscribe,
}

/// Receiver of signal change events
pub trait SignalListener {
    fn on_signal_changed(&mut self, change: SignalChange) -> ListenerAction;
}

/// Handle returned by [`SignalBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub type SharedListener = Rc<RefCell<dyn SignalListener>>;

/// Ordered list of listener handles with deferred removal
#[derive(Default)]
pub struct SignalBus {
    listeners: Vec<(ListenerId, SharedListener)>,
    pending_removals: Vec<ListenerId>,
    next_id: u64,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: SharedListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false when the handle was not subscribed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Deliver one event to every listener, then apply queued removals
    pub fn publish(&mut self, change: SignalChange) {
        for (id, listener) in &self.listeners {
            let action = listener.borrow_mut().on_signal_changed(change);
            if action == ListenerAction::Unsubscribe {
                self.pending_removals.push(*id);
            }
        }

        for id in std::mem::take(&mut self.pending_removals) {
            self.unsubscribe(id);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
        self.pending_removals.clear();
    }
}
