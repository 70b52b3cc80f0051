//! Cut/copy/paste capability
//!
//! A viewer that supports the clipboard hands out an [`EditInterface`]. The
//! pane connects the interface's [`EditSignal`] to its own event queue, so
//! whenever the interface says its enable flags may have changed the pane
//! re-reads them on the next event-loop turn.

use crate::events::{EventSender, PaneEvent};
use crate::ui::clipboard::Clipboard;
use std::cell::RefCell;

/// The "states changed" signal of an edit interface
///
/// At most one receiver is connected at a time. Emitting with nothing
/// connected is a no-op.
#[derive(Debug, Default)]
pub struct EditSignal {
    target: RefCell<Option<EventSender<PaneEvent>>>,
}

impl EditSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to a receiver, or disconnect with `None`
    pub fn connect(&self, target: Option<EventSender<PaneEvent>>) {
        *self.target.borrow_mut() = target;
    }

    /// The receiver currently connected, for forwarding adapters
    pub fn target(&self) -> Option<EventSender<PaneEvent>> {
        self.target.borrow().clone()
    }

    pub fn emit(&self) {
        if let Some(target) = self.target.borrow().as_ref() {
            target.post(PaneEvent::EditStatesChanged);
        }
    }
}

/// Clipboard operations offered by a viewer or widget
///
/// Every operation is a no-op by default, and every `*_enabled` is false.
pub trait EditInterface {
    fn cut_enabled(&self) -> bool {
        false
    }

    fn copy_enabled(&self) -> bool {
        false
    }

    fn paste_enabled(&self) -> bool {
        false
    }

    fn cut(&mut self, _clipboard: &mut dyn Clipboard) {}

    fn copy(&mut self, _clipboard: &mut dyn Clipboard) {}

    fn paste(&mut self, _clipboard: &mut dyn Clipboard) {}

    fn states_changed(&self) -> &EditSignal;

    /// Route [`states_changed`](Self::states_changed) to `target`
    ///
    /// Adapters that forward to another interface override this so the
    /// forwarded interface's signal reaches the same receiver.
    fn connect(&mut self, target: Option<EventSender<PaneEvent>>) {
        self.states_changed().connect(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue;

    #[test]
    fn test_signal_posts_only_when_connected() {
        let queue = EventQueue::new();
        let signal = EditSignal::new();
        signal.emit();
        assert!(queue.is_empty());

        signal.connect(Some(queue.sender()));
        signal.emit();
        assert_eq!(queue.drain(), vec![PaneEvent::EditStatesChanged]);

        signal.connect(None);
        signal.emit();
        assert!(queue.is_empty());
    }
}
