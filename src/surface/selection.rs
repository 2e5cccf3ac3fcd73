//! Single-element selection state and its change notifications.

use std::fmt;

use super::element::ElementId;

/// A change of the active element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Something became selected while nothing was.
    Created(ElementId),
    /// The selection moved from one element to another.
    Updated {
        previous: ElementId,
        current: ElementId,
    },
    /// The selection became empty.
    Cleared(ElementId),
}

/// Which overlay, if any, is currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    active: Option<ElementId>,
    revision: u64,
}

impl SelectionState {
    pub fn active(&self) -> Option<ElementId> {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    /// Bumps on every change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Moves to `next`, returning the event describing the change, if any.
    pub(crate) fn transition(&mut self, next: Option<ElementId>) -> Option<SelectionEvent> {
        let event = match (self.active, next) {
            (None, None) => return None,
            (Some(a), Some(b)) if a == b => return None,
            (None, Some(current)) => SelectionEvent::Created(current),
            (Some(previous), Some(current)) => SelectionEvent::Updated { previous, current },
            (Some(previous), None) => SelectionEvent::Cleared(previous),
        };
        self.active = next;
        self.revision = self.revision.wrapping_add(1);
        Some(event)
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

/// Handle returned by [`Surface::subscribe`](super::Surface::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SelectionEvent)>;

/// Registered selection listeners, called synchronously in subscription order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub(crate) fn dispatch(&mut self, event: &SelectionEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.listeners.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn transitions_emit_expected_events() {
        let mut state = SelectionState::default();
        assert!(state.is_empty());
        assert_eq!(state.transition(None), None);

        let a = ElementId(1);
        let b = ElementId(2);
        assert_eq!(state.transition(Some(a)), Some(SelectionEvent::Created(a)));
        assert_eq!(state.transition(Some(a)), None);
        assert_eq!(
            state.transition(Some(b)),
            Some(SelectionEvent::Updated {
                previous: a,
                current: b
            })
        );
        assert_eq!(state.transition(None), Some(SelectionEvent::Cleared(b)));
        assert_eq!(state.revision(), 3);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers = Subscribers::default();

        let log = Rc::clone(&seen);
        let first = subscribers.subscribe(Box::new(move |e| log.borrow_mut().push(*e)));
        let log = Rc::clone(&seen);
        subscribers.subscribe(Box::new(move |e| log.borrow_mut().push(*e)));

        subscribers.dispatch(&SelectionEvent::Created(ElementId(5)));
        assert_eq!(seen.borrow().len(), 2);

        assert!(subscribers.unsubscribe(first));
        assert!(!subscribers.unsubscribe(first));
        subscribers.dispatch(&SelectionEvent::Cleared(ElementId(5)));
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(subscribers.len(), 1);
    }
}
