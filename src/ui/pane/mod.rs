//! Packet pane - one packet, one viewer, and the dirty/commit/refresh machine
//!
//! # State
//!
//! ```text
//!            edit                   commit / refresh
//!   clean ─────────────▶ dirty ─────────────────────────▶ clean
//!     ▲                    │
//!     │   external change  │ (prompt: discard local edits?)
//!     └────────────────────┘
//! ```
//!
//! `read_write` is the conjunction of the document's read-write flag and
//! the packet's editability. When the viewer cannot track its own edits the
//! pane latches `dirtiness_broken` and treats itself as dirty whenever it is
//! read-write.
//!
//! # Listener hookup
//!
//! The pane subscribes to its packet in [`PacketPane::new`] and unsubscribes
//! in `Drop`. Callbacks that might arrive while the viewer is busy, or that
//! a full engine could fire off the UI thread, are turned into
//! [`PaneEvent`]s and handled by [`PaneCore::process_events`].

mod actions;
mod header;

pub use actions::{Action, PaneActions};
pub use header::PaneHeader;

use crate::config::Preferences;
use crate::error::UiError;
use crate::events::{EventQueue, EventSender, HostRequest, PaneEvent, PaneId};
use crate::packet::{Packet, PacketListener, PacketRef};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::cell::{Cell, Ref, RefCell};
use std::ops::Deref;
use std::rc::Rc;

use super::clipboard::Clipboard;
use super::dialogs::Dialogs;
use super::registry;
use super::traits::{EditInterface, Handled, RenderContext};
use super::viewer::{ActionRequirement, PacketViewer, PaneContext, ViewerAction};

/// What a pane needs from the window that hosts it
pub trait PaneHost {
    /// Whether the enclosing document may be modified at all
    fn document_read_write(&self) -> bool;
    fn dialogs(&self) -> Rc<dyn Dialogs>;
    fn preferences(&self) -> Rc<Preferences>;
    /// Where open/dock/close requests go
    fn requests(&self) -> EventSender<HostRequest>;
}

/// A single-packet pane
///
/// Owns the shared [`PaneCore`], which is also what the packet holds (weakly)
/// as a listener. Dropping the pane unsubscribes it.
pub struct PacketPane {
    core: Rc<PaneCore>,
}

pub struct PaneCore {
    id: PaneId,
    packet: PacketRef,
    viewer: RefCell<Box<dyn PacketViewer>>,
    header: RefCell<PaneHeader>,
    actions: RefCell<PaneActions>,

    read_write: Cell<bool>,
    dirty: Cell<bool>,
    dirtiness_broken: Cell<bool>,
    emergency_closure: Cell<bool>,
    emergency_refresh: Cell<bool>,
    is_committing: Cell<bool>,
    docked: Cell<bool>,
    edit_registered: Cell<bool>,

    events: EventQueue<PaneEvent>,
    ctx: PaneContext,
    host: Rc<dyn PaneHost>,
}

impl PacketPane {
    /// Build a pane and its viewer, and subscribe to the packet
    pub fn new(id: PaneId, packet: PacketRef, host: Rc<dyn PaneHost>) -> Self {
        let events = EventQueue::new();
        let ctx = PaneContext {
            pane: id,
            events: events.sender(),
            host: host.requests(),
            dialogs: host.dialogs(),
            prefs: host.preferences(),
        };
        let viewer = registry::registry().create_viewer(&packet, &ctx);
        let read_write = host.document_read_write() && packet.is_editable();

        let core = Rc::new(PaneCore {
            id,
            header: RefCell::new(PaneHeader::new(&packet, read_write)),
            actions: RefCell::new(PaneActions::new(true)),
            packet,
            viewer: RefCell::new(viewer),
            read_write: Cell::new(read_write),
            dirty: Cell::new(false),
            dirtiness_broken: Cell::new(false),
            emergency_closure: Cell::new(false),
            emergency_refresh: Cell::new(false),
            is_committing: Cell::new(false),
            docked: Cell::new(true),
            edit_registered: Cell::new(false),
            events,
            ctx,
            host,
        });

        let listener: Rc<dyn PacketListener> = core.clone();
        core.packet.listen(&listener);

        core.viewer.borrow_mut().set_read_write(read_write);
        if !core.viewer.borrow().dirtiness_reliable() {
            core.set_dirtiness_broken();
        }
        core.apply_dirty_policy();
        core.process_events();

        tracing::debug!("Opened pane {} for {}", id, core.packet.full_name());
        Self { core }
    }
}

impl Deref for PacketPane {
    type Target = PaneCore;

    fn deref(&self) -> &PaneCore {
        &self.core
    }
}

impl Drop for PacketPane {
    fn drop(&mut self) {
        self.core.deregister_edit_operations();
        self.core.packet.unlisten(self.core.as_ref());
        tracing::debug!("Dropped pane {} for {}", self.core.id, self.core.packet.label());
    }
}

impl PaneCore {
    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn packet(&self) -> &PacketRef {
        &self.packet
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn is_read_write(&self) -> bool {
        self.read_write.get()
    }

    pub fn is_dirtiness_broken(&self) -> bool {
        self.dirtiness_broken.get()
    }

    pub fn is_docked(&self) -> bool {
        self.docked.get()
    }

    pub fn header(&self) -> Ref<'_, PaneHeader> {
        self.header.borrow()
    }

    pub fn actions(&self) -> Ref<'_, PaneActions> {
        self.actions.borrow()
    }

    pub fn context(&self) -> &PaneContext {
        &self.ctx
    }

    /// Hold the viewer as if it were mid-callback
    #[cfg(test)]
    pub(crate) fn busy_viewer(&self) -> std::cell::RefMut<'_, Box<dyn PacketViewer>> {
        self.viewer.borrow_mut()
    }

    fn report(&self, err: &UiError) {
        err.report(self.ctx.dialogs.as_ref());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dirty tracking
    // ─────────────────────────────────────────────────────────────────────────

    /// Record whether the viewer holds uncommitted edits
    ///
    /// Ignored once dirtiness is broken; dirty then simply follows read-write.
    pub fn set_dirty(&self, dirty: bool) {
        if self.dirtiness_broken.get() {
            return;
        }
        self.dirty.set(dirty);
        self.apply_dirty_policy();
    }

    /// Give up on dirty tracking for good
    pub fn set_dirtiness_broken(&self) {
        if self.dirtiness_broken.replace(true) {
            return;
        }
        tracing::debug!("Pane {} cannot track edits; assuming dirty", self.id);
        self.dirty.set(self.read_write.get());
        self.apply_dirty_policy();
    }

    fn apply_dirty_policy(&self) {
        self.actions.borrow_mut().apply_dirty_policy(
            self.dirty.get(),
            self.read_write.get(),
            self.dirtiness_broken.get(),
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read-write
    // ─────────────────────────────────────────────────────────────────────────

    /// Switch between read-only and read-write
    ///
    /// Returns false, changing nothing, if read-write was requested but the
    /// packet or the document does not allow it.
    pub fn set_read_write(&self, allow: bool) -> bool {
        if allow && !(self.packet.is_editable() && self.host.document_read_write()) {
            return false;
        }
        let changed = self.read_write.replace(allow) != allow;

        match self.viewer.try_borrow_mut() {
            Ok(mut viewer) => viewer.set_read_write(allow),
            Err(_) => {
                tracing::debug!("Viewer busy; deferring read-write update");
                self.ctx.events.post(PaneEvent::ReadWriteChanged(allow));
            }
        }
        self.update_clipboard_actions();
        if self.dirtiness_broken.get() {
            self.dirty.set(allow);
        }
        self.apply_dirty_policy();
        self.refresh_header();

        if changed {
            self.ctx.host.post(HostRequest::ReadWriteChanged {
                pane: self.id,
                read_write: allow,
            });
        }
        true
    }

    /// Re-derive read-write from the document and the packet
    pub fn update_read_write(&self) {
        let allow = self.host.document_read_write() && self.packet.is_editable();
        if allow != self.read_write.get() {
            self.set_read_write(allow);
        } else {
            self.refresh_header();
        }
    }

    /// Hand a deferred read-write switch to the viewer
    fn apply_viewer_read_write(&self, allow: bool) {
        // Superseded by a later switch.
        if allow != self.read_write.get() {
            return;
        }
        match self.viewer.try_borrow_mut() {
            Ok(mut viewer) => viewer.set_read_write(allow),
            Err(_) => self.ctx.events.post(PaneEvent::ReadWriteChanged(allow)),
        }
        self.update_clipboard_actions();
    }

    pub fn refresh_header(&self) {
        if let Ok(mut header) = self.header.try_borrow_mut() {
            header.refresh(&self.packet, self.read_write.get());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Refresh and commit
    // ─────────────────────────────────────────────────────────────────────────

    /// Repopulate the viewer, asking first if that would lose edits
    pub fn refresh(&self) {
        if self.dirty.get()
            && !self.emergency_refresh.get()
            && !self.ctx.dialogs.confirm(
                "This packet has changes that have not yet been committed.",
                Some("Do you wish to discard these changes and reload the packet?"),
            )
        {
            return;
        }
        match self.viewer.try_borrow_mut() {
            Ok(mut viewer) => viewer.refresh(),
            Err(_) => {
                self.ctx.events.post(PaneEvent::RefreshForce);
                return;
            }
        }
        self.set_dirty(false);
    }

    /// Refresh without asking
    pub fn refresh_force(&self) {
        self.emergency_refresh.set(true);
        self.refresh();
        self.emergency_refresh.set(false);
    }

    /// Push the viewer's edits into the packet
    ///
    /// All writes happen inside one change span, so other listeners hear a
    /// single change. Our own echo of that change is ignored.
    pub fn commit(&self) -> bool {
        if !self.dirty.get() {
            return true;
        }
        if !self.packet.is_editable() {
            self.report(&UiError::not_editable(self.packet.label()));
            return false;
        }
        if !self.read_write.get() {
            self.report(&UiError::ReadOnly);
            return false;
        }
        let Ok(mut viewer) = self.viewer.try_borrow_mut() else {
            tracing::error!("Pane {} asked to commit while its viewer is busy", self.id);
            return false;
        };

        self.is_committing.set(true);
        {
            let _span = self.packet.change_span();
            viewer.commit();
        }
        drop(viewer);
        self.is_committing.set(false);

        self.set_dirty(false);
        tracing::debug!("Committed {}", self.packet.label());
        true
    }

    /// Bring the packet up to date before an operation that modifies it
    pub fn commit_to_modify(&self) -> bool {
        if !self.packet.is_editable() {
            self.report(&UiError::not_editable(self.packet.label()));
            return false;
        }
        if !self.read_write.get() {
            self.report(&UiError::ReadOnly);
            return false;
        }
        self.commit()
    }

    /// Commit if possible; otherwise offer to carry on with the old state
    pub fn try_commit(&self) -> bool {
        if !self.packet.is_editable() || !self.read_write.get() {
            if !self.dirty.get() {
                return true;
            }
            return self.ctx.dialogs.confirm(
                "This packet may not be changed at present, so your edits cannot be committed.",
                Some("Do you wish to continue using the packet as it was before your edits?"),
            );
        }
        self.commit()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Closing and docking
    // ─────────────────────────────────────────────────────────────────────────

    /// Ask whether the pane may close; on yes, tell the host it has closed
    pub fn query_close(&self) -> bool {
        if self.dirty.get()
            && !self.emergency_closure.get()
            && !self.ctx.dialogs.confirm(
                "This packet has changes that have not yet been committed.",
                Some("Do you wish to close it anyway, discarding your changes?"),
            )
        {
            return false;
        }
        self.deregister_edit_operations();
        self.ctx.host.post(HostRequest::PaneClosed(self.id));
        true
    }

    /// Ask the host to close this pane (through [`query_close`](Self::query_close))
    pub fn close(&self) {
        self.ctx.host.post(HostRequest::ClosePane(self.id));
    }

    /// Close without any prompts
    pub fn close_force(&self) {
        self.emergency_closure.set(true);
        self.close();
    }

    pub fn dock_pane(&self) {
        if !self.docked.get() {
            self.ctx.host.post(HostRequest::Dock(self.id));
        }
    }

    pub fn float_pane(&self) {
        if self.docked.get() {
            self.ctx.host.post(HostRequest::AboutToUndock(self.id));
        }
    }

    pub fn toggle_dock(&self) {
        if self.docked.get() {
            self.float_pane();
        } else {
            self.dock_pane();
        }
    }

    /// Called by the host once the pane has moved
    pub fn set_docked(&self, docked: bool) {
        self.docked.set(docked);
        self.actions.borrow_mut().set_docked(docked);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edit operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Bind cut/copy/paste to the viewer's edit interface, if it has one
    pub fn register_edit_operations(&self) {
        self.deregister_edit_operations();
        if let Ok(mut viewer) = self.viewer.try_borrow_mut() {
            if let Some(iface) = viewer.edit_interface() {
                iface.connect(Some(self.ctx.events.clone()));
                self.edit_registered.set(true);
            }
        }
        self.update_clipboard_actions();
    }

    pub fn deregister_edit_operations(&self) {
        if self.edit_registered.replace(false) {
            if let Ok(mut viewer) = self.viewer.try_borrow_mut() {
                if let Some(iface) = viewer.edit_interface() {
                    iface.connect(None);
                }
            }
        }
        self.actions.borrow_mut().set_clipboard(false, false, false);
    }

    pub fn edit_operations_registered(&self) -> bool {
        self.edit_registered.get()
    }

    /// Re-read the edit interface's enable flags
    pub fn update_clipboard_actions(&self) {
        let mut flags = (false, false, false);
        if self.edit_registered.get() {
            if let Ok(mut viewer) = self.viewer.try_borrow_mut() {
                if let Some(iface) = viewer.edit_interface() {
                    flags = (iface.cut_enabled(), iface.copy_enabled(), iface.paste_enabled());
                }
            }
        }
        self.actions.borrow_mut().set_clipboard(flags.0, flags.1, flags.2);
    }

    pub fn cut(&self, clipboard: &mut dyn Clipboard) -> bool {
        let enabled = self.actions.borrow().cut.enabled;
        self.clipboard_op(enabled, |iface| iface.cut(clipboard))
    }

    pub fn copy(&self, clipboard: &mut dyn Clipboard) -> bool {
        let enabled = self.actions.borrow().copy.enabled;
        self.clipboard_op(enabled, |iface| iface.copy(clipboard))
    }

    pub fn paste(&self, clipboard: &mut dyn Clipboard) -> bool {
        let enabled = self.actions.borrow().paste.enabled;
        self.clipboard_op(enabled, |iface| iface.paste(clipboard))
    }

    fn clipboard_op(
        &self,
        enabled: bool,
        op: impl FnOnce(&mut dyn EditInterface),
    ) -> bool {
        if !enabled {
            return false;
        }
        let done = match self.viewer.try_borrow_mut() {
            Ok(mut viewer) => match viewer.edit_interface() {
                Some(iface) => {
                    op(iface);
                    true
                }
                None => false,
            },
            Err(_) => false,
        };
        self.process_events();
        self.update_clipboard_actions();
        done
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Packet-type actions and input
    // ─────────────────────────────────────────────────────────────────────────

    pub fn packet_menu_text(&self) -> String {
        self.viewer.borrow().packet_menu_text()
    }

    pub fn packet_actions(&self) -> Vec<ViewerAction> {
        self.viewer.borrow().packet_type_actions()
    }

    /// Run the packet-type action at `index` (as listed by [`packet_actions`](Self::packet_actions))
    pub fn trigger_packet_action(&self, index: usize) -> bool {
        let Some(action) = self.packet_actions().into_iter().nth(index) else {
            return false;
        };
        self.trigger_action(&action)
    }

    pub fn trigger_action(&self, action: &ViewerAction) -> bool {
        let ready = match action.requirement {
            ActionRequirement::None => true,
            ActionRequirement::CommitToModify => self.commit_to_modify(),
            ActionRequirement::TryCommit => self.try_commit(),
        };
        if !ready {
            return false;
        }
        if !action.enabled {
            tracing::debug!("Action {} is disabled", action.id);
            return false;
        }

        let result = self.viewer.borrow_mut().trigger_action(action.id);
        if let Err(err) = &result {
            self.report(err);
        }
        self.process_events();
        result.is_ok()
    }

    /// Pane commands first, then the viewer
    pub fn handle_key(&self, key: KeyEvent) -> Handled {
        if self.handle_command_key(key).was_handled() {
            return Handled::Yes;
        }
        let result = match self.viewer.try_borrow_mut() {
            Ok(mut viewer) => viewer.handle_key(key),
            Err(_) => Ok(Handled::No),
        };
        let handled = match result {
            Ok(handled) => handled,
            Err(err) => {
                self.report(&err);
                Handled::Yes
            }
        };
        self.process_events();
        handled
    }

    fn handle_command_key(&self, key: KeyEvent) -> Handled {
        match (key.code, key.modifiers) {
            (KeyCode::F(2), _) | (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
                self.commit();
            }
            (KeyCode::F(5), _) => self.refresh(),
            (KeyCode::F(3), _) => self.toggle_dock(),
            (KeyCode::F(4), _) => self.close(),
            (KeyCode::Char(c @ '1'..='9'), KeyModifiers::ALT) => {
                let index = (c as usize) - ('1' as usize);
                self.trigger_packet_action(index);
            }
            _ => return Handled::No,
        }
        Handled::Yes
    }

    pub fn key_hints(&self) -> &'static str {
        self.viewer.borrow().key_hints()
    }

    /// Periodic housekeeping
    pub fn poll(&self) {
        if let Ok(mut viewer) = self.viewer.try_borrow_mut() {
            viewer.poll();
        }
        self.process_events();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle everything queued for this pane, oldest first
    pub fn process_events(&self) {
        while let Some(event) = self.events.next() {
            match event {
                PaneEvent::SetDirty(dirty) => self.set_dirty(dirty),
                PaneEvent::DirtinessBroken => self.set_dirtiness_broken(),
                PaneEvent::EditStatesChanged => self.update_clipboard_actions(),
                PaneEvent::EditabilityMayHaveChanged => self.update_read_write(),
                PaneEvent::ReadWriteChanged(allow) => self.apply_viewer_read_write(allow),
                PaneEvent::PacketChanged => self.adopt_packet_change(),
                PaneEvent::PreferencesChanged => {
                    if let Ok(mut viewer) = self.viewer.try_borrow_mut() {
                        viewer.update_preferences();
                        if !viewer.dirtiness_reliable() {
                            self.ctx.events.post(PaneEvent::DirtinessBroken);
                        }
                    }
                }
                PaneEvent::RefreshForce => self.refresh_force(),
            }
        }
    }

    /// React to a change made to the packet by someone else
    fn adopt_packet_change(&self) {
        let Ok(mut viewer) = self.viewer.try_borrow_mut() else {
            self.ctx.events.post(PaneEvent::PacketChanged);
            return;
        };
        if self.dirty.get()
            && !self.ctx.dialogs.confirm(
                "This packet has been changed from elsewhere.",
                Some(
                    "You have edits here that have not been committed. Do you wish to \
                     discard them and show the new contents of the packet?",
                ),
            )
        {
            return;
        }
        viewer.refresh();
        drop(viewer);
        self.set_dirty(false);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    pub fn render(&self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border_for(ctx.focused)))
            .title(self.header.borrow().line(theme, self.dirty.get()));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        if let Ok(mut viewer) = self.viewer.try_borrow_mut() {
            viewer.render(f, chunks[0], ctx);
        }
        f.render_widget(Paragraph::new(self.footer_line(ctx)), chunks[1]);
    }

    fn footer_line(&self, ctx: &RenderContext) -> Line<'static> {
        let theme = ctx.theme;
        let key_style = Style::default().fg(theme.action_key);
        let mut spans = Vec::new();
        let mut push = |key: String, label: String, enabled: bool| {
            let label_style = if enabled {
                Style::default().fg(theme.foreground)
            } else {
                Style::default().fg(theme.muted).add_modifier(Modifier::DIM)
            };
            spans.push(Span::styled(format!(" {key} "), key_style));
            spans.push(Span::styled(label, label_style));
        };

        for action in self.actions.borrow().footer() {
            push(action.key.to_string(), action.label.clone(), action.enabled);
        }
        let read_write = self.read_write.get();
        for (i, action) in self.packet_actions().iter().take(9).enumerate() {
            let enabled = action.enabled
                && (read_write || action.requirement != ActionRequirement::CommitToModify);
            push(format!("M-{}", i + 1), action.label.clone(), enabled);
        }
        Line::from(spans)
    }
}

impl PacketListener for PaneCore {
    fn packet_was_changed(&self, _packet: &Packet) {
        if self.is_committing.get() {
            return;
        }
        self.adopt_packet_change();
    }

    fn packet_was_renamed(&self, _packet: &Packet) {
        self.refresh_header();
    }

    fn packet_to_be_destroyed(&self, _packet: &Packet) {
        self.close_force();
    }

    fn child_was_added(&self, _packet: &Packet, _child: &PacketRef) {
        self.ctx.events.post(PaneEvent::EditabilityMayHaveChanged);
    }

    fn child_was_removed(&self, _packet: &Packet, _child: &PacketRef, _in_parent_destructor: bool) {
        self.ctx.events.post(PaneEvent::EditabilityMayHaveChanged);
    }
}
