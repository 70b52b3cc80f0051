//! The viewer contract
//!
//! A viewer is the packet-type-specific part of a pane. Everything beyond
//! [`PacketViewer::packet`], [`PacketViewer::render`] and
//! [`PacketViewer::refresh`] is an optional capability with a default that
//! means "not supported", so read-only viewers, editors, tabbed composites
//! and the fallback viewers are all the same trait with different
//! capabilities filled in.

use crate::config::Preferences;
use crate::error::{Result, UiError};
use crate::events::{EventSender, HostRequest, PaneEvent, PaneId};
use crate::packet::PacketRef;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
    Frame,
};
use std::rc::Rc;

use super::dialogs::Dialogs;
use super::traits::{EditInterface, Handled, RenderContext};

/// What a packet-type action needs from the pane before it can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRequirement {
    /// Runs from any state
    None,
    /// Modifies the packet, so pending edits must be committed first
    CommitToModify,
    /// Reads the packet; an older committed state is acceptable
    TryCommit,
}

/// A packet-type-specific action offered by a viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerAction {
    pub id: &'static str,
    pub label: String,
    pub requirement: ActionRequirement,
    pub enabled: bool,
}

impl ViewerAction {
    pub fn new(id: &'static str, label: impl Into<String>, requirement: ActionRequirement) -> Self {
        Self {
            id,
            label: label.into(),
            requirement,
            enabled: true,
        }
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Everything a viewer may use from its hosting pane
#[derive(Clone)]
pub struct PaneContext {
    pub pane: PaneId,
    pub events: EventSender<PaneEvent>,
    pub host: EventSender<HostRequest>,
    pub dialogs: Rc<dyn Dialogs>,
    pub prefs: Rc<Preferences>,
}

impl PaneContext {
    /// Tell the pane whether the viewer now holds uncommitted edits
    pub fn set_dirty(&self, dirty: bool) {
        self.events.post(PaneEvent::SetDirty(dirty));
    }

    pub fn report(&self, err: &UiError) {
        err.report(self.dialogs.as_ref());
    }
}

/// Polymorphic handler for one packet
pub trait PacketViewer {
    /// The packet this viewer shows; never changes
    fn packet(&self) -> &PacketRef;

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext);

    /// Repopulate from the packet, discarding local edits
    fn refresh(&mut self);

    /// Whether this viewer holds edits that [`commit`](Self::commit) pushes
    fn is_editor(&self) -> bool {
        false
    }

    /// Push local edits into the packet
    ///
    /// The pane opens a change span around this call and handles
    /// editability checks; the viewer only writes.
    fn commit(&mut self) {}

    fn set_read_write(&mut self, _read_write: bool) {}

    fn edit_interface(&mut self) -> Option<&mut dyn EditInterface> {
        None
    }

    /// Title for the packet-type action menu
    fn packet_menu_text(&self) -> String {
        self.packet().packet_type().name().to_string()
    }

    fn packet_type_actions(&self) -> Vec<ViewerAction> {
        Vec::new()
    }

    /// Run one of [`packet_type_actions`](Self::packet_type_actions)
    ///
    /// Called after the pane has satisfied the action's requirement.
    fn trigger_action(&mut self, id: &str) -> Result<()> {
        tracing::debug!("Viewer ignored unknown action {}", id);
        Ok(())
    }

    fn handle_key(&mut self, _key: KeyEvent) -> Result<Handled> {
        Ok(Handled::No)
    }

    /// Re-read whatever preferences this viewer uses
    fn update_preferences(&mut self) {}

    /// False if edits cannot be tracked, so the pane must assume dirtiness
    fn dirtiness_reliable(&self) -> bool {
        true
    }

    /// Periodic housekeeping (external processes and the like)
    fn poll(&mut self) {}

    /// Key hints for the status bar while this viewer has focus
    fn key_hints(&self) -> &'static str {
        ""
    }
}

/// Draw a centered message, used by the fallback viewers and empty tabs
pub fn render_message(f: &mut Frame, area: Rect, ctx: &RenderContext, title: &str, body: &str) {
    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(ctx.theme.highlight),
        )),
    ];
    if !body.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            body.to_string(),
            Style::default().fg(ctx.theme.muted),
        )));
    }
    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

/// Viewer for packet types nothing is registered for
pub struct DefaultViewer {
    packet: PacketRef,
}

impl DefaultViewer {
    pub fn new(packet: &PacketRef) -> Self {
        Self {
            packet: packet.clone(),
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Packets of type {} are not yet supported.",
            self.packet.packet_type().name()
        )
    }
}

impl PacketViewer for DefaultViewer {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        render_message(f, area, ctx, &self.message(), "");
    }

    fn refresh(&mut self) {}
}

/// Viewer shown when the real viewer could not be built
pub struct ErrorViewer {
    packet: PacketRef,
    message: String,
}

impl ErrorViewer {
    pub fn new(packet: &PacketRef, message: impl Into<String>) -> Self {
        Self {
            packet: packet.clone(),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl PacketViewer for ErrorViewer {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        render_message(f, area, ctx, "This packet cannot be shown.", &self.message);
    }

    fn refresh(&mut self) {}
}

/// A context wired to in-memory queues and scripted dialogs
#[cfg(test)]
pub(crate) struct TestContext {
    pub ctx: PaneContext,
    pub events: crate::events::EventQueue<PaneEvent>,
    pub requests: crate::events::EventQueue<HostRequest>,
    pub dialogs: Rc<super::dialogs::ScriptedDialogs>,
}

#[cfg(test)]
impl TestContext {
    pub fn new() -> Self {
        let events = crate::events::EventQueue::new();
        let requests = crate::events::EventQueue::new();
        let dialogs = Rc::new(super::dialogs::ScriptedDialogs::new());
        let ctx = PaneContext {
            pane: 1,
            events: events.sender(),
            host: requests.sender(),
            dialogs: dialogs.clone(),
            prefs: Rc::new(Preferences::default()),
        };
        Self {
            ctx,
            events,
            requests,
            dialogs,
        }
    }

    /// Whether the viewer asked for the dirty flag to be raised
    pub fn marked_dirty(&self) -> bool {
        self.events
            .drain()
            .into_iter()
            .any(|e| e == PaneEvent::SetDirty(true))
    }
}
