// Typed events posted between UI elements
//
// Listener callbacks never act on the UI directly when they may run off the
// UI thread. Instead they post a small typed record to the receiver's queue,
// and the receiver drains its queue once per event-loop turn. Each receiver
// owns exactly one queue, so ordering is FIFO per receiver.

use crate::packet::PacketId;
use std::cell::RefCell;
use tokio::sync::mpsc;

/// Identity of a packet pane within the workspace
pub type PaneId = u64;

/// Events handled by a packet pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneEvent {
    /// The viewer's edits have been made or discarded
    SetDirty(bool),
    /// The viewer cannot report reliable dirtiness
    DirtinessBroken,
    /// The current edit interface's cut/copy/paste state may have changed
    EditStatesChanged,
    /// A child was added or removed, so the packet may have been locked or unlocked
    EditabilityMayHaveChanged,
    /// Read-write was switched while the viewer was busy; pass it on now
    ReadWriteChanged(bool),
    /// The packet changed while the viewer was busy; handle it now
    PacketChanged,
    /// Preferences were reloaded; viewers should re-read what they use
    PreferencesChanged,
    /// A viewer asked for its pane to be refreshed without prompting
    RefreshForce,
}

/// Events handled by the packet tree view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEvent {
    /// Reconcile the children of the item for this packet
    RefreshSubtree(PacketId),
    /// An item's packet was renamed or retagged; redraw its label
    Relabel(PacketId),
    /// An item's packet was destroyed; drop the item
    ItemDestroyed(PacketId),
    /// A packet's contents changed, so the document needs saving
    DocumentModified,
}

/// Requests from panes and the tree to the hosting workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    /// Open (or focus) a pane for this packet
    OpenPacket { packet: PacketId, select_in_tree: bool },
    /// Take this floating pane back into the dock
    Dock(PaneId),
    /// This docked pane is about to become floating
    AboutToUndock(PaneId),
    /// Close whatever pane is currently docked
    CloseDockedPane,
    /// Close this specific pane (routing through its close query)
    ClosePane(PaneId),
    /// This pane has closed and can be dropped
    PaneClosed(PaneId),
    /// This pane's read-write state changed
    ReadWriteChanged { pane: PaneId, read_write: bool },
}

/// Cloneable sending half of an [`EventQueue`]
#[derive(Debug)]
pub struct EventSender<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: std::fmt::Debug> EventSender<T> {
    /// Post an event; events sent after the receiver is gone are dropped
    pub fn post(&self, event: T) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("Dropping event for closed receiver: {:?}", e.0);
        }
    }
}

/// A per-receiver FIFO event queue drained on the UI thread
#[derive(Debug)]
pub struct EventQueue<T> {
    tx: mpsc::UnboundedSender<T>,
    rx: RefCell<mpsc::UnboundedReceiver<T>>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: RefCell::new(rx),
        }
    }

    pub fn sender(&self) -> EventSender<T> {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Take the next pending event, if any
    pub fn next(&self) -> Option<T> {
        self.rx.borrow_mut().try_recv().ok()
    }

    /// Take every event currently pending, oldest first
    pub fn drain(&self) -> Vec<T> {
        let mut rx = self.rx.borrow_mut();
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.rx.borrow().is_empty()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
