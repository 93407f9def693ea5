//! Change notification: explicit publish/subscribe for the rendering layer.
//!
//! Three channels, each fired synchronously after the mutation completes:
//! the ordered item list after any item-store change, the seating model after
//! any assignment change, and the operation state on every controller
//! transition. Listeners receive borrowed state and cannot call back into the
//! engine while it is notifying.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use crate::input::OperationState;
use crate::items::CanvasItem;
use crate::seating::SeatingModel;

pub type ItemsListener = dyn FnMut(&[&CanvasItem]);
pub type AssignmentsListener = dyn FnMut(&SeatingModel);
pub type OperationListener = dyn FnMut(&OperationState);

/// Handle returned by every `on_*` call; pass it to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct ListenerSet<F: ?Sized> {
    entries: Vec<(u64, Box<F>)>,
}

impl<F: ?Sized> ListenerSet<F> {
    fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn push(&mut self, id: u64, listener: Box<F>) {
        self.entries.push((id, listener));
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }
}

/// Registered listeners for all three channels.
pub struct Listeners {
    next_id: u64,
    items: ListenerSet<ItemsListener>,
    assignments: ListenerSet<AssignmentsListener>,
    operation: ListenerSet<OperationListener>,
}

impl Listeners {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            items: ListenerSet::new(),
            assignments: ListenerSet::new(),
            operation: ListenerSet::new(),
        }
    }

    fn next_subscription(&mut self) -> Subscription {
        self.next_id += 1;
        Subscription(self.next_id)
    }

    /// Subscribe to the ordered item list, fired after any item mutation.
    pub fn on_items_changed(&mut self, listener: impl FnMut(&[&CanvasItem]) + 'static) -> Subscription {
        let sub = self.next_subscription();
        self.items.push(sub.0, Box::new(listener));
        sub
    }

    /// Subscribe to the seating model, fired after any assignment mutation.
    pub fn on_assignments_changed(&mut self, listener: impl FnMut(&SeatingModel) + 'static) -> Subscription {
        let sub = self.next_subscription();
        self.assignments.push(sub.0, Box::new(listener));
        sub
    }

    /// Subscribe to controller state transitions.
    pub fn on_operation_state_changed(&mut self, listener: impl FnMut(&OperationState) + 'static) -> Subscription {
        let sub = self.next_subscription();
        self.operation.push(sub.0, Box::new(listener));
        sub
    }

    /// Remove a listener from whichever channel holds it. Returns `false` if
    /// it was already gone.
    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        self.items.remove(sub.0) || self.assignments.remove(sub.0) || self.operation.remove(sub.0)
    }

    pub(crate) fn emit_items(&mut self, items: &[&CanvasItem]) {
        for (_, listener) in &mut self.items.entries {
            listener(items);
        }
    }

    pub(crate) fn emit_assignments(&mut self, seating: &SeatingModel) {
        for (_, listener) in &mut self.assignments.entries {
            listener(seating);
        }
    }

    pub(crate) fn emit_operation(&mut self, state: &OperationState) {
        for (_, listener) in &mut self.operation.entries {
            listener(state);
        }
    }

    /// Total number of registered listeners across all channels.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.items.entries.len() + self.assignments.entries.len() + self.operation.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Listeners {
    fn default() -> Self {
        Self::new()
    }
}
