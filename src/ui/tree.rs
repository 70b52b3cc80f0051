//! Packet tree view
//!
//! A mirror of the packet tree with one item per live packet. Each item
//! listens to its packet; every callback becomes a [`TreeEvent`] that the
//! view handles on the next call to [`PacketTreeView::process_events`].
//!
//! Reconciliation keeps existing items (and their expansion state) wherever
//! the packet tree still has the same packet:
//!
//! ```text
//! live:   a  c  d          items:  a  b  c
//!         │  │  │                  │  │  │
//!         a ─┘  │   matched        │  │  │
//!            c ─┼── found ahead, moved into place
//!               d   created
//!                          b   left over, dropped
//! ```

use crate::events::{EventQueue, EventSender, HostRequest, TreeEvent};
use crate::packet::{Packet, PacketId, PacketListener, PacketRef};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use std::rc::{Rc, Weak};

use super::traits::{Handled, RenderContext};

/// Forwards one packet's callbacks to the tree's event queue
struct ItemListener {
    packet_id: PacketId,
    events: EventSender<TreeEvent>,
}

impl PacketListener for ItemListener {
    fn packet_was_changed(&self, _packet: &Packet) {
        self.events.post(TreeEvent::DocumentModified);
    }

    fn packet_was_renamed(&self, _packet: &Packet) {
        self.events.post(TreeEvent::Relabel(self.packet_id));
    }

    fn packet_to_be_destroyed(&self, _packet: &Packet) {
        self.events.post(TreeEvent::ItemDestroyed(self.packet_id));
    }

    fn child_was_added(&self, _packet: &Packet, _child: &PacketRef) {
        self.events.post(TreeEvent::RefreshSubtree(self.packet_id));
    }

    fn child_was_removed(&self, _packet: &Packet, _child: &PacketRef, in_parent_destructor: bool) {
        if !in_parent_destructor {
            self.events.post(TreeEvent::RefreshSubtree(self.packet_id));
        }
    }

    fn children_were_reordered(&self, _packet: &Packet) {
        self.events.post(TreeEvent::RefreshSubtree(self.packet_id));
    }
}

/// One row of the tree, mirroring one packet
pub struct TreeItem {
    packet_id: PacketId,
    packet: Weak<Packet>,
    icon: &'static str,
    label: String,
    /// Set while a child stops the packet from being edited
    locked: bool,
    expanded: bool,
    children: Vec<TreeItem>,
    listener: Rc<ItemListener>,
}

impl TreeItem {
    /// Create an item for `packet` and, recursively, for its children
    fn fill(packet: &PacketRef, events: &EventSender<TreeEvent>) -> Self {
        let listener = Rc::new(ItemListener {
            packet_id: packet.id(),
            events: events.clone(),
        });
        let as_dyn: Rc<dyn PacketListener> = listener.clone();
        packet.listen(&as_dyn);

        let mut item = Self {
            packet_id: packet.id(),
            packet: Rc::downgrade(packet),
            icon: packet.packet_type().icon(),
            label: String::new(),
            locked: false,
            expanded: packet.parent().is_none(),
            children: Vec::new(),
            listener,
        };
        item.relabel(packet);
        item.children = packet
            .children()
            .iter()
            .map(|child| Self::fill(child, events))
            .collect();
        item
    }

    pub fn packet_id(&self) -> PacketId {
        self.packet_id
    }

    pub fn packet(&self) -> Option<PacketRef> {
        self.packet.upgrade()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn children(&self) -> &[TreeItem] {
        &self.children
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn relabel(&mut self, packet: &Packet) {
        self.locked = !packet.is_editable();
        self.label = if packet.has_tags() {
            format!("{} +", packet.label())
        } else {
            packet.label()
        };
    }

    /// Bring this item's children into line with the packet's
    fn refresh_subtree(&mut self, events: &EventSender<TreeEvent>) {
        let Some(packet) = self.packet.upgrade() else {
            self.children.clear();
            return;
        };
        self.relabel(&packet);

        let mut remaining = std::mem::take(&mut self.children);
        let mut reconciled = Vec::with_capacity(packet.child_count());
        for child in packet.children() {
            match remaining.iter().position(|item| item.packet_id == child.id()) {
                Some(pos) => {
                    let mut item = remaining.remove(pos);
                    item.refresh_subtree(events);
                    reconciled.push(item);
                }
                None => reconciled.push(Self::fill(&child, events)),
            }
        }
        self.children = reconciled;
    }

    fn find_mut(&mut self, id: PacketId) -> Option<&mut TreeItem> {
        if self.packet_id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Drop the descendant item for `id`; true if it was found
    fn remove(&mut self, id: PacketId) -> bool {
        if let Some(pos) = self.children.iter().position(|c| c.packet_id == id) {
            self.children.remove(pos);
            return true;
        }
        self.children.iter_mut().any(|c| c.remove(id))
    }

    /// Expand every item on the way to `id`; true if it was found
    fn reveal(&mut self, id: PacketId) -> bool {
        if self.packet_id == id {
            return true;
        }
        let found = self.children.iter_mut().any(|c| c.reveal(id));
        if found {
            self.expanded = true;
        }
        found
    }

    fn flatten<'a>(&'a self, depth: usize, rows: &mut Vec<(usize, &'a TreeItem)>) {
        rows.push((depth, self));
        if self.expanded {
            for child in &self.children {
                child.flatten(depth + 1, rows);
            }
        }
    }
}

impl Drop for TreeItem {
    fn drop(&mut self) {
        if let Some(packet) = self.packet.upgrade() {
            packet.unlisten(self.listener.as_ref());
        }
    }
}

/// The tree panel of the workspace
pub struct PacketTreeView {
    root: Option<TreeItem>,
    events: EventQueue<TreeEvent>,
    host: EventSender<HostRequest>,
    selected: usize,
    modified: bool,
}

impl PacketTreeView {
    pub fn new(host: EventSender<HostRequest>) -> Self {
        Self {
            root: None,
            events: EventQueue::new(),
            host,
            selected: 0,
            modified: false,
        }
    }

    /// Throw away every item and mirror `root` from scratch
    pub fn fill(&mut self, root: &PacketRef) {
        self.root = None;
        self.root = Some(TreeItem::fill(root, &self.events.sender()));
        self.selected = 0;
        tracing::debug!("Tree filled with {} packets", root.descendant_count() + 1);
    }

    /// Reconcile against `root` if it is the packet already shown, else refill
    pub fn refresh(&mut self, root: &PacketRef) {
        let sender = self.events.sender();
        match self.root.as_mut() {
            Some(item) if item.packet_id == root.id() => {
                item.refresh_subtree(&sender);
                self.clamp_selection();
            }
            _ => self.fill(root),
        }
    }

    pub fn root(&self) -> Option<&TreeItem> {
        self.root.as_ref()
    }

    pub fn item(&self, id: PacketId) -> Option<&TreeItem> {
        fn find(item: &TreeItem, id: PacketId) -> Option<&TreeItem> {
            if item.packet_id == id {
                return Some(item);
            }
            item.children.iter().find_map(|c| find(c, id))
        }
        self.root.as_ref().and_then(|r| find(r, id))
    }

    /// Whether any packet's contents changed since the last call
    pub fn take_modified(&mut self) -> bool {
        std::mem::take(&mut self.modified)
    }

    /// Handle every pending item callback
    pub fn process_events(&mut self) {
        let sender = self.events.sender();
        while let Some(event) = self.events.next() {
            let Some(root) = self.root.as_mut() else {
                continue;
            };
            match event {
                TreeEvent::RefreshSubtree(id) => {
                    if let Some(item) = root.find_mut(id) {
                        item.refresh_subtree(&sender);
                    }
                }
                TreeEvent::Relabel(id) => {
                    if let Some(item) = root.find_mut(id) {
                        if let Some(packet) = item.packet.upgrade() {
                            item.relabel(&packet);
                        }
                    }
                }
                TreeEvent::ItemDestroyed(id) => {
                    if root.packet_id == id {
                        self.root = None;
                    } else {
                        root.remove(id);
                    }
                }
                TreeEvent::DocumentModified => self.modified = true,
            }
        }
        self.clamp_selection();
    }

    fn rows(&self) -> Vec<(usize, &TreeItem)> {
        let mut rows = Vec::new();
        if let Some(root) = &self.root {
            root.flatten(0, &mut rows);
        }
        rows
    }

    fn clamp_selection(&mut self) {
        let n = self.rows().len();
        self.selected = self.selected.min(n.saturating_sub(1));
    }

    pub fn selected_packet(&self) -> Option<PacketRef> {
        self.rows().get(self.selected).and_then(|(_, item)| item.packet())
    }

    /// Select `id`, expanding its ancestors
    pub fn select_packet(&mut self, id: PacketId) -> bool {
        let Some(root) = self.root.as_mut() else {
            return false;
        };
        if !root.reveal(id) {
            return false;
        }
        if let Some(pos) = self.rows().iter().position(|(_, item)| item.packet_id == id) {
            self.selected = pos;
        }
        true
    }

    fn set_expanded(&mut self, expanded: bool) {
        let Some(id) = self.rows().get(self.selected).map(|(_, item)| item.packet_id) else {
            return;
        };
        if let Some(item) = self.root.as_mut().and_then(|r| r.find_mut(id)) {
            item.expanded = expanded;
        }
        self.clamp_selection();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Handled {
        let rows = self.rows().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < rows {
                    self.selected += 1;
                }
            }
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => self.selected = rows.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => self.set_expanded(true),
            KeyCode::Left | KeyCode::Char('h') => self.set_expanded(false),
            KeyCode::Enter => {
                if let Some(packet) = self.selected_packet() {
                    self.host.post(HostRequest::OpenPacket {
                        packet: packet.id(),
                        select_in_tree: false,
                    });
                }
            }
            _ => return Handled::No,
        }
        Handled::Yes
    }

    pub fn render(&self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let items: Vec<ListItem> = self
            .rows()
            .iter()
            .map(|(depth, item)| {
                let marker = if item.children.is_empty() {
                    "  "
                } else if item.expanded {
                    "▾ "
                } else {
                    "▸ "
                };
                ListItem::new(Line::from(vec![
                    Span::raw("  ".repeat(*depth)),
                    Span::styled(marker, Style::default().fg(theme.muted)),
                    Span::styled(item.icon, Style::default().fg(theme.title)),
                    Span::raw(" "),
                    Span::styled(item.label.clone(), Style::default().fg(theme.foreground)),
                    Span::styled(
                        if item.locked { " (locked)" } else { "" },
                        Style::default().fg(theme.muted),
                    ),
                ]))
            })
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border_for(ctx.focused)))
            .title(Span::styled(" Packets ", Style::default().fg(theme.title)));
        let list = List::new(items)
            .block(block)
            .highlight_style(theme.selected());
        let mut state = ListState::default().with_selected(Some(self.selected));
        f.render_stateful_widget(list, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::PacketContent;

    fn text(label: &str) -> PacketRef {
        Packet::new(label, PacketContent::Text(String::new()))
    }

    fn labels(item: &TreeItem) -> Vec<String> {
        item.children().iter().map(|c| c.label().to_string()).collect()
    }

    fn view() -> (PacketTreeView, EventQueue<HostRequest>) {
        let host = EventQueue::new();
        (PacketTreeView::new(host.sender()), host)
    }

    #[test]
    fn test_reconcile_matches_live_children() {
        let root = Packet::new("root", PacketContent::Container);
        let a = text("a");
        let b = text("b");
        let c = text("c");
        for p in [&a, &b, &c] {
            root.insert_child_last(p.clone());
        }
        let (mut tree, _host) = view();
        tree.fill(&root);

        b.detach();
        root.move_child(1, 0);
        let d = text("d");
        root.insert_child_at(1, d.clone());
        tree.process_events();

        let item = tree.root().expect("root item");
        assert_eq!(labels(item), vec!["c", "d", "a"]);
        let ids: Vec<PacketId> = item.children().iter().map(|c| c.packet_id()).collect();
        let live: Vec<PacketId> = root.children().iter().map(|c| c.id()).collect();
        assert_eq!(ids, live);
        assert_eq!(b.listener_count(), 0);
    }

    #[test]
    fn test_rename_and_tags_relabel() {
        let root = Packet::new("root", PacketContent::Container);
        let a = text("a");
        root.insert_child_last(a.clone());
        let (mut tree, _host) = view();
        tree.fill(&root);

        a.set_label("renamed");
        a.add_tag("key");
        tree.process_events();
        assert_eq!(tree.item(a.id()).map(|i| i.label()), Some("renamed +"));
    }

    #[test]
    fn test_destroyed_subtree_is_dropped() {
        let root = Packet::new("root", PacketContent::Container);
        let parent = Packet::new("parent", PacketContent::Container);
        let child = text("child");
        root.insert_child_last(parent.clone());
        parent.insert_child_last(child.clone());
        let (mut tree, _host) = view();
        tree.fill(&root);
        assert_eq!(child.listener_count(), 1);

        parent.destroy();
        tree.process_events();
        assert!(tree.item(parent.id()).is_none());
        assert!(tree.item(child.id()).is_none());
        assert_eq!(tree.root().map(|r| r.children().len()), Some(0));
    }

    #[test]
    fn test_content_change_marks_modified() {
        let root = Packet::new("root", PacketContent::Container);
        let a = text("a");
        root.insert_child_last(a.clone());
        let (mut tree, _host) = view();
        tree.fill(&root);

        a.edit_content(|c| {
            if let PacketContent::Text(s) = c {
                s.push('x');
            }
        });
        tree.process_events();
        assert!(tree.take_modified());
        assert!(!tree.take_modified());
    }

    #[test]
    fn test_enter_requests_open() {
        let root = Packet::new("root", PacketContent::Container);
        let a = text("a");
        root.insert_child_last(a.clone());
        let (mut tree, host) = view();
        tree.fill(&root);

        assert!(tree.select_packet(a.id()));
        tree.handle_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(
            host.next(),
            Some(HostRequest::OpenPacket {
                packet: a.id(),
                select_in_tree: false
            })
        );
    }

    #[test]
    fn test_dependent_child_locks_parent() {
        use crate::packet::triangulation::Triangulation;
        use crate::packet::AngleStructureList;

        let root = Packet::new("root", PacketContent::Container);
        let tri = Packet::new("tri", PacketContent::Triangulation(Triangulation::new(3)));
        root.insert_child_last(tri.clone());
        let (mut tree, _host) = view();
        tree.fill(&root);
        assert_eq!(tree.item(tri.id()).map(|i| i.is_locked()), Some(false));

        let angles = Packet::new(
            "angles",
            PacketContent::AngleStructures(AngleStructureList::default()),
        );
        tri.insert_child_last(angles.clone());
        tree.process_events();
        assert_eq!(tree.item(tri.id()).map(|i| i.is_locked()), Some(true));
        assert_eq!(tree.item(angles.id()).map(|i| i.is_locked()), Some(false));

        angles.detach();
        tree.process_events();
        assert_eq!(tree.item(tri.id()).map(|i| i.is_locked()), Some(false));

        // A plain note beneath a triangulation does not lock it.
        tri.insert_child_last(text("note"));
        tree.process_events();
        assert_eq!(tree.item(tri.id()).map(|i| i.is_locked()), Some(false));
    }

    #[test]
    fn test_refresh_same_root_keeps_expansion() {
        let root = Packet::new("root", PacketContent::Container);
        let inner = Packet::new("inner", PacketContent::Container);
        root.insert_child_last(inner.clone());
        inner.insert_child_last(text("leaf"));
        let (mut tree, _host) = view();
        tree.fill(&root);
        tree.select_packet(inner.id());
        tree.set_expanded(true);

        tree.refresh(&root);
        assert_eq!(tree.item(inner.id()).map(|i| i.is_expanded()), Some(true));

        let other = Packet::new("other", PacketContent::Container);
        tree.refresh(&other);
        assert_eq!(tree.root().map(|r| r.packet_id()), Some(other.id()));
        assert_eq!(inner.listener_count(), 0);
    }
}
