// Workspace state
//
// The workspace hosts one docked pane next to the packet tree, plus any
// number of floating frames drawn over the body. Panes and the tree talk to
// it only through `HostRequest`s, which are drained once per event-loop turn.

use crate::config::Preferences;
use crate::events::{EventQueue, EventSender, HostRequest, PaneEvent, PaneId};
use crate::logging::{LogBuffer, LogEntry, LogLevel};
use crate::packet::{PacketId, PacketRef};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::cell::Cell;
use std::rc::Rc;

use super::clipboard::Clipboard;
use super::dialogs::Dialogs;
use super::frame::FloatingFrame;
use super::pane::{PacketPane, PaneHost};
use super::theme::Theme;
use super::toast::Toast;
use super::traits::Handled;
use super::tree::PacketTreeView;

/// The window-level services every pane is given
pub struct WorkspaceHost {
    read_only: Cell<bool>,
    dialogs: Rc<dyn Dialogs>,
    prefs: Rc<Preferences>,
    requests: EventSender<HostRequest>,
}

impl PaneHost for WorkspaceHost {
    fn document_read_write(&self) -> bool {
        !self.read_only.get()
    }

    fn dialogs(&self) -> Rc<dyn Dialogs> {
        self.dialogs.clone()
    }

    fn preferences(&self) -> Rc<Preferences> {
        self.prefs.clone()
    }

    fn requests(&self) -> EventSender<HostRequest> {
        self.requests.clone()
    }
}

/// Which part of the workspace receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Tree,
    Docked,
    Floating(usize),
}

pub struct Workspace {
    host: Rc<WorkspaceHost>,
    requests: EventQueue<HostRequest>,
    root: PacketRef,

    pub tree: PacketTreeView,
    docked: Option<PacketPane>,
    floating: Vec<FloatingFrame>,
    pub focus: Focus,

    next_pane_id: PaneId,
    next_slot: u16,

    clipboard: Box<dyn Clipboard>,
    pub toast: Option<Toast>,
    pub log_buffer: LogBuffer,
    pub theme: Theme,
    prefs_generation: u64,
    document_modified: bool,

    pub show_help: bool,
    pub should_quit: bool,
    pub animation_frame: usize,
}

impl Workspace {
    pub fn new(
        root: PacketRef,
        dialogs: Rc<dyn Dialogs>,
        prefs: Rc<Preferences>,
        clipboard: Box<dyn Clipboard>,
        log_buffer: LogBuffer,
    ) -> Self {
        let requests = EventQueue::new();
        let (read_only, theme) = {
            let config = prefs.config();
            (config.read_only, Theme::by_name(&config.theme))
        };
        let host = Rc::new(WorkspaceHost {
            read_only: Cell::new(read_only),
            dialogs,
            prefs,
            requests: requests.sender(),
        });
        let mut tree = PacketTreeView::new(requests.sender());
        tree.fill(&root);

        Self {
            prefs_generation: host.prefs.generation(),
            host,
            requests,
            root,
            tree,
            docked: None,
            floating: Vec::new(),
            focus: Focus::Tree,
            next_pane_id: 1,
            next_slot: 0,
            clipboard,
            toast: None,
            log_buffer,
            theme,
            document_modified: false,
            show_help: false,
            should_quit: false,
            animation_frame: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn root(&self) -> &PacketRef {
        &self.root
    }

    pub fn preferences(&self) -> &Rc<Preferences> {
        &self.host.prefs
    }

    pub fn docked_pane(&self) -> Option<&PacketPane> {
        self.docked.as_ref()
    }

    pub fn floating(&self) -> &[FloatingFrame] {
        &self.floating
    }

    /// Every open pane, docked first
    pub fn panes(&self) -> impl Iterator<Item = &PacketPane> {
        self.docked
            .iter()
            .chain(self.floating.iter().map(|frame| frame.pane()))
    }

    pub fn pane_count(&self) -> usize {
        self.panes().count()
    }

    pub fn pane(&self, id: PaneId) -> Option<&PacketPane> {
        self.panes().find(|pane| pane.id() == id)
    }

    pub fn pane_for_packet(&self, packet: PacketId) -> Option<&PacketPane> {
        self.panes().find(|pane| pane.packet().id() == packet)
    }

    pub fn focused_pane(&self) -> Option<&PacketPane> {
        match self.focus {
            Focus::Tree => None,
            Focus::Docked => self.docked.as_ref(),
            Focus::Floating(i) => self.floating.get(i).map(|frame| frame.pane()),
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.host.read_only.get()
    }

    pub fn is_document_modified(&self) -> bool {
        self.document_modified
    }

    /// Most recent warning or error in the log
    pub fn latest_warning(&self) -> Option<LogEntry> {
        self.log_buffer.latest_at_least(LogLevel::Warn)
    }

    pub fn clipboard_mut(&mut self) -> &mut dyn Clipboard {
        self.clipboard.as_mut()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Opening, docking, closing
    // ─────────────────────────────────────────────────────────────────────────

    /// Focus the pane already showing `packet`, or open a new one
    ///
    /// A new pane takes the dock if it is free or if the docked pane agrees
    /// to close; otherwise it floats.
    pub fn open_packet(&mut self, packet: &PacketRef) -> PaneId {
        if let Some(id) = self.pane_for_packet(packet.id()).map(|pane| pane.id()) {
            self.focus_pane(id);
            return id;
        }

        let id = self.next_pane_id;
        self.next_pane_id += 1;
        let host: Rc<dyn PaneHost> = self.host.clone();
        let pane = PacketPane::new(id, packet.clone(), host);

        let dock_free = match &self.docked {
            None => true,
            Some(docked) => docked.query_close(),
        };
        if dock_free {
            self.docked = None;
            self.dock(pane);
        } else {
            self.float(pane);
        }
        tracing::info!("Opened {}", packet.full_name());
        id
    }

    fn dock(&mut self, pane: PacketPane) {
        pane.set_docked(true);
        pane.register_edit_operations();
        self.docked = Some(pane);
        self.focus = Focus::Docked;
    }

    fn float(&mut self, pane: PacketPane) {
        let slot = self.next_slot;
        self.next_slot = self.next_slot.wrapping_add(1);
        self.floating.push(FloatingFrame::new(pane, slot));
        self.focus = Focus::Floating(self.floating.len() - 1);
    }

    fn focus_pane(&mut self, id: PaneId) {
        if self.docked.as_ref().is_some_and(|pane| pane.id() == id) {
            self.focus = Focus::Docked;
        } else if let Some(i) = self.floating_index(id) {
            self.focus = Focus::Floating(i);
        }
    }

    fn floating_index(&self, id: PaneId) -> Option<usize> {
        self.floating.iter().position(|frame| frame.pane().id() == id)
    }

    fn remove_pane(&mut self, id: PaneId) {
        if self.docked.as_ref().is_some_and(|pane| pane.id() == id) {
            self.docked = None;
            if self.focus == Focus::Docked {
                self.focus = Focus::Tree;
            }
        } else if let Some(i) = self.floating_index(id) {
            self.floating.remove(i);
            self.focus = match self.focus {
                Focus::Floating(f) if f == i => self
                    .floating
                    .len()
                    .checked_sub(1)
                    .map(Focus::Floating)
                    .unwrap_or(if self.docked.is_some() {
                        Focus::Docked
                    } else {
                        Focus::Tree
                    }),
                Focus::Floating(f) if f > i => Focus::Floating(f - 1),
                other => other,
            };
        } else {
            return;
        }
        tracing::debug!("Removed pane {}", id);
    }

    /// Handle every pending request from panes and the tree
    pub fn process_requests(&mut self) {
        while let Some(request) = self.requests.next() {
            match request {
                HostRequest::OpenPacket {
                    packet,
                    select_in_tree,
                } => {
                    let Some(found) = self.root.find(packet) else {
                        tracing::warn!("Asked to open packet {} which is not in the tree", packet);
                        continue;
                    };
                    self.open_packet(&found);
                    if select_in_tree {
                        self.tree.select_packet(packet);
                    }
                }
                HostRequest::Dock(id) => {
                    let Some(i) = self.floating_index(id) else {
                        continue;
                    };
                    let pane = self.floating.remove(i).into_pane();
                    if let Some(previous) = self.docked.take() {
                        self.float(previous);
                    }
                    self.dock(pane);
                }
                HostRequest::AboutToUndock(id) => {
                    if self.docked.as_ref().is_some_and(|pane| pane.id() == id) {
                        if let Some(pane) = self.docked.take() {
                            pane.deregister_edit_operations();
                            self.float(pane);
                        }
                    }
                }
                HostRequest::CloseDockedPane => {
                    if let Some(pane) = &self.docked {
                        pane.query_close();
                    }
                }
                HostRequest::ClosePane(id) => {
                    if self.docked.as_ref().is_some_and(|pane| pane.id() == id) {
                        self.requests.sender().post(HostRequest::CloseDockedPane);
                    } else if let Some(i) = self.floating_index(id) {
                        self.floating[i].close_requested();
                    }
                }
                HostRequest::PaneClosed(id) => self.remove_pane(id),
                HostRequest::ReadWriteChanged { pane, read_write } => {
                    tracing::debug!("Pane {} is now read-write: {}", pane, read_write);
                }
            }
        }
    }

    /// Flip the document's read-only flag and let every pane re-evaluate
    pub fn set_read_only(&mut self, read_only: bool) {
        self.host.read_only.set(read_only);
        for pane in self.panes() {
            pane.update_read_write();
        }
        self.process_requests();
        tracing::info!(
            "Document is now {}",
            if read_only { "read-only" } else { "read-write" }
        );
        self.toast = Some(if read_only {
            Toast::warning("Document is read-only")
        } else {
            Toast::new("Document is writable")
        });
    }

    /// Close every pane, stopping at the first one that refuses
    pub fn query_close_all(&mut self) -> bool {
        let ids: Vec<PaneId> = self.panes().map(|pane| pane.id()).collect();
        let mut all_closed = true;
        for id in ids {
            if let Some(pane) = self.pane(id) {
                if !pane.query_close() {
                    all_closed = false;
                    break;
                }
            }
        }
        self.process_requests();
        all_closed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Periodic work
    // ─────────────────────────────────────────────────────────────────────────

    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);

        for pane in self.panes() {
            pane.poll();
        }
        self.tree.process_events();
        if self.tree.take_modified() {
            self.document_modified = true;
        }

        let generation = self.host.prefs.generation();
        if generation != self.prefs_generation {
            self.prefs_generation = generation;
            self.theme = Theme::by_name(&self.host.prefs.config().theme);
            for pane in self.panes() {
                pane.context().events.post(PaneEvent::PreferencesChanged);
                pane.process_events();
            }
        }

        self.process_requests();
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    /// Layered dispatch: help overlay, global keys, then the focused element
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        if !self.handle_global_key(key).was_handled() {
            match self.focus {
                Focus::Tree => {
                    self.tree.handle_key(key);
                }
                Focus::Docked | Focus::Floating(_) => {
                    if let Some(pane) = self.focused_pane() {
                        pane.handle_key(key);
                    }
                }
            }
        }
        self.process_requests();
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> Handled {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::F(1) => self.show_help = true,
            KeyCode::F(6) => self.cycle_focus(),
            KeyCode::Char('q') if ctrl => {
                if self.query_close_all() {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('r') if ctrl => self.set_read_only(!self.is_read_only()),
            KeyCode::Char('t') if ctrl => self.cycle_theme(),
            KeyCode::Char('g') if ctrl => self.host.prefs.update(|c| {
                c.graphviz.labels = !c.graphviz.labels;
            }),
            KeyCode::Char('x') if ctrl => self.clipboard_op(ClipboardOp::Cut),
            KeyCode::Char('c') if ctrl => self.clipboard_op(ClipboardOp::Copy),
            KeyCode::Char('v') if ctrl => self.clipboard_op(ClipboardOp::Paste),
            _ => return Handled::No,
        }
        Handled::Yes
    }

    /// Tree, docked pane, then each floating frame in turn
    pub fn cycle_focus(&mut self) {
        let mut order = vec![Focus::Tree];
        if self.docked.is_some() {
            order.push(Focus::Docked);
        }
        order.extend((0..self.floating.len()).map(Focus::Floating));
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(current + 1) % order.len()];
    }

    pub fn cycle_theme(&mut self) {
        let current = self.host.prefs.config().theme.clone();
        let next = Theme::NAMES
            .iter()
            .position(|name| *name == current)
            .map(|i| Theme::NAMES[(i + 1) % Theme::NAMES.len()])
            .unwrap_or(Theme::NAMES[0]);
        self.host.prefs.update(|c| c.theme = next.to_string());
        self.toast = Some(Toast::new(format!("Theme: {next}")));
    }

    fn clipboard_op(&mut self, op: ClipboardOp) {
        let pane = match self.focus {
            Focus::Tree => None,
            Focus::Docked => self.docked.as_ref(),
            Focus::Floating(i) => self.floating.get(i).map(|frame| frame.pane()),
        };
        let Some(pane) = pane else {
            return;
        };
        let clipboard = self.clipboard.as_mut();
        let (done, message) = match op {
            ClipboardOp::Cut => (pane.cut(clipboard), "Cut to clipboard"),
            ClipboardOp::Copy => (pane.copy(clipboard), "Copied to clipboard"),
            ClipboardOp::Paste => (pane.paste(clipboard), "Pasted"),
        };
        if done {
            self.toast = Some(Toast::new(message));
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ClipboardOp {
    Cut,
    Copy,
    Paste,
}
