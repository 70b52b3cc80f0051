//! Tabbed composite viewer
//!
//! A viewer built out of other viewers for the same packet: an optional
//! header shown above a row of tabs. At most one tab is an editor.
//!
//! Tabs are refreshed lazily:
//!
//! ```text
//! add_tab        first tab and no editor ─▶ refresh now
//!                otherwise               ─▶ queue
//! add_editor_tab                         ─▶ refresh now
//! refresh()      header, editor, visible ─▶ refresh now
//!                every other tab         ─▶ queue
//! set_current_tab(i)  tab i queued       ─▶ refresh now, clear queue
//! ```
//!
//! The composite is also its own [`EditInterface`]: cut/copy/paste go to the
//! visible tab, and switching tabs rebinds the pane's edit signal.

use crate::config::{Preferences, TabFamily};
use crate::error::Result;
use crate::events::{EventSender, PaneEvent};
use crate::packet::PacketRef;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::Tabs,
    Frame,
};
use std::cell::RefCell;
use std::rc::Rc;

use super::clipboard::Clipboard;
use super::traits::{EditInterface, EditSignal, Handled, RenderContext};
use super::viewer::{PacketViewer, ViewerAction};

/// Height reserved for the header viewer
const HEADER_HEIGHT: u16 = 3;

struct Tab {
    title: String,
    viewer: RefCell<Box<dyn PacketViewer>>,
    /// Refresh before this tab is next shown
    queued: bool,
}

pub struct TabbedViewer {
    packet: PacketRef,
    header: Option<Box<dyn PacketViewer>>,
    tabs: Vec<Tab>,
    editor: Option<usize>,
    visible: usize,
    family: Option<TabFamily>,
    prefs: Rc<Preferences>,
    signal: EditSignal,
    target: Option<EventSender<PaneEvent>>,
}

impl TabbedViewer {
    pub fn new(packet: &PacketRef, prefs: Rc<Preferences>, family: Option<TabFamily>) -> Self {
        Self {
            packet: packet.clone(),
            header: None,
            tabs: Vec::new(),
            editor: None,
            visible: 0,
            family,
            prefs,
            signal: EditSignal::new(),
            target: None,
        }
    }

    /// Show `header` above the tabs; it is refreshed straight away
    pub fn set_header(&mut self, mut header: Box<dyn PacketViewer>) {
        header.refresh();
        self.header = Some(header);
    }

    /// Add a read-only tab
    pub fn add_tab(&mut self, title: impl Into<String>, mut viewer: Box<dyn PacketViewer>) {
        let queued = if self.tabs.is_empty() && self.editor.is_none() {
            viewer.refresh();
            false
        } else {
            true
        };
        self.push(title.into(), viewer, queued);
    }

    /// Add the single editor tab
    ///
    /// A second editor is a programming error; it is logged and ignored.
    pub fn add_editor_tab(&mut self, title: impl Into<String>, mut viewer: Box<dyn PacketViewer>) {
        let title = title.into();
        if self.editor.is_some() {
            tracing::error!(
                "Tabbed viewer for {} already has an editor; ignoring tab {}",
                self.packet.label(),
                title
            );
            return;
        }
        viewer.refresh();
        self.editor = Some(self.tabs.len());
        self.push(title, viewer, false);
    }

    fn push(&mut self, title: String, viewer: Box<dyn PacketViewer>, queued: bool) {
        self.tabs.push(Tab {
            title,
            viewer: RefCell::new(viewer),
            queued,
        });
        if let Some(family) = self.family {
            if self.tabs.len() == self.prefs.last_tab(family) + 1 {
                self.set_current_tab(self.tabs.len() - 1);
            }
        }
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn current_tab(&self) -> usize {
        self.visible
    }

    pub fn is_queued(&self, index: usize) -> bool {
        self.tabs.get(index).is_some_and(|t| t.queued)
    }

    /// Show tab `index`, refreshing it first if it is stale
    pub fn set_current_tab(&mut self, index: usize) {
        if index >= self.tabs.len() {
            return;
        }
        let old = self.visible;
        self.visible = index;

        let tab = &mut self.tabs[index];
        if tab.queued {
            tab.viewer.get_mut().refresh();
            tab.queued = false;
        }

        if old != index {
            if let Some(old_tab) = self.tabs.get_mut(old) {
                if let Some(iface) = old_tab.viewer.get_mut().edit_interface() {
                    iface.connect(None);
                }
            }
        }
        let target = self.target.clone();
        if let Some(iface) = self.tabs[index].viewer.get_mut().edit_interface() {
            iface.connect(target);
        }
        self.signal.emit();

        if let Some(family) = self.family {
            self.prefs.set_last_tab(family, index);
        }
    }

    fn cycle(&mut self, forward: bool) {
        let n = self.tabs.len();
        if n < 2 {
            return;
        }
        let next = if forward {
            (self.visible + 1) % n
        } else {
            (self.visible + n - 1) % n
        };
        self.set_current_tab(next);
    }

    fn render_tab_bar(&self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let titles: Vec<Line> = self
            .tabs
            .iter()
            .map(|t| Line::from(t.title.clone()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.visible)
            .style(Style::default().fg(theme.muted))
            .highlight_style(
                Style::default()
                    .fg(theme.highlight)
                    .add_modifier(Modifier::BOLD),
            )
            .divider("│");
        f.render_widget(tabs, area);
    }
}

impl PacketViewer for TabbedViewer {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let header_height = if self.header.is_some() { HEADER_HEIGHT } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(area);

        if let Some(header) = self.header.as_mut() {
            header.render(f, chunks[0], &ctx.unfocused());
        }
        self.render_tab_bar(f, chunks[1], ctx);
        if let Some(tab) = self.tabs.get_mut(self.visible) {
            tab.viewer.get_mut().render(f, chunks[2], ctx);
        }
    }

    fn refresh(&mut self) {
        if let Some(header) = self.header.as_mut() {
            header.refresh();
        }
        let visible = self.visible;
        let editor = self.editor;
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            if Some(i) == editor || i == visible {
                tab.viewer.get_mut().refresh();
                tab.queued = false;
            } else {
                tab.queued = true;
            }
        }
    }

    fn is_editor(&self) -> bool {
        self.editor.is_some()
    }

    fn commit(&mut self) {
        if let Some(i) = self.editor {
            self.tabs[i].viewer.get_mut().commit();
        }
    }

    fn set_read_write(&mut self, read_write: bool) {
        if let Some(header) = self.header.as_mut() {
            header.set_read_write(read_write);
        }
        for tab in &mut self.tabs {
            tab.viewer.get_mut().set_read_write(read_write);
        }
    }

    fn edit_interface(&mut self) -> Option<&mut dyn EditInterface> {
        Some(self)
    }

    fn packet_type_actions(&self) -> Vec<ViewerAction> {
        let mut actions = Vec::new();
        if let Some(header) = &self.header {
            actions.extend(header.packet_type_actions());
        }
        for tab in &self.tabs {
            actions.extend(tab.viewer.borrow().packet_type_actions());
        }
        actions
    }

    fn trigger_action(&mut self, id: &str) -> Result<()> {
        let owner = self
            .tabs
            .iter_mut()
            .map(|t| t.viewer.get_mut())
            .find(|v| v.packet_type_actions().iter().any(|a| a.id == id));
        match owner {
            Some(viewer) => viewer.trigger_action(id),
            None => match self.header.as_mut() {
                Some(header) => header.trigger_action(id),
                None => Ok(()),
            },
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled> {
        match (key.code, key.modifiers) {
            (KeyCode::Right, KeyModifiers::ALT) => {
                self.cycle(true);
                Ok(Handled::Yes)
            }
            (KeyCode::Left, KeyModifiers::ALT) => {
                self.cycle(false);
                Ok(Handled::Yes)
            }
            _ => match self.tabs.get_mut(self.visible) {
                Some(tab) => tab.viewer.get_mut().handle_key(key),
                None => Ok(Handled::No),
            },
        }
    }

    fn update_preferences(&mut self) {
        if let Some(header) = self.header.as_mut() {
            header.update_preferences();
        }
        for tab in &mut self.tabs {
            tab.viewer.get_mut().update_preferences();
        }
    }

    fn dirtiness_reliable(&self) -> bool {
        self.tabs.iter().all(|t| t.viewer.borrow().dirtiness_reliable())
    }

    fn poll(&mut self) {
        for tab in &mut self.tabs {
            tab.viewer.get_mut().poll();
        }
    }

    fn key_hints(&self) -> &'static str {
        "M-←/→ tabs"
    }
}

impl EditInterface for TabbedViewer {
    fn cut_enabled(&self) -> bool {
        self.visible_flag(|iface| iface.cut_enabled())
    }

    fn copy_enabled(&self) -> bool {
        self.visible_flag(|iface| iface.copy_enabled())
    }

    fn paste_enabled(&self) -> bool {
        self.visible_flag(|iface| iface.paste_enabled())
    }

    fn cut(&mut self, clipboard: &mut dyn Clipboard) {
        if let Some(iface) = self.visible_interface() {
            iface.cut(clipboard);
        }
    }

    fn copy(&mut self, clipboard: &mut dyn Clipboard) {
        if let Some(iface) = self.visible_interface() {
            iface.copy(clipboard);
        }
    }

    fn paste(&mut self, clipboard: &mut dyn Clipboard) {
        if let Some(iface) = self.visible_interface() {
            iface.paste(clipboard);
        }
    }

    fn states_changed(&self) -> &EditSignal {
        &self.signal
    }

    fn connect(&mut self, target: Option<EventSender<PaneEvent>>) {
        self.signal.connect(target.clone());
        self.target = target.clone();
        if let Some(iface) = self.visible_interface() {
            iface.connect(target);
        }
    }
}

impl TabbedViewer {
    fn visible_interface(&mut self) -> Option<&mut dyn EditInterface> {
        self.tabs
            .get_mut(self.visible)
            .and_then(|t| t.viewer.get_mut().edit_interface())
    }

    fn visible_flag(&self, f: impl Fn(&dyn EditInterface) -> bool) -> bool {
        let Some(tab) = self.tabs.get(self.visible) else {
            return false;
        };
        let Ok(mut viewer) = tab.viewer.try_borrow_mut() else {
            return false;
        };
        let enabled = viewer.edit_interface().is_some_and(|iface| f(&*iface));
        enabled
    }
}

impl Drop for TabbedViewer {
    fn drop(&mut self) {
        // The visible tab goes last.
        if self.visible < self.tabs.len() {
            let visible = self.tabs.remove(self.visible);
            self.tabs.clear();
            drop(visible);
        }
    }
}
