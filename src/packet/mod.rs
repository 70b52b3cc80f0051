//! Packet tree - the document model the panes observe
//!
//! A packet is a typed node in a tree. Packets own their children and hold
//! weak references to their listeners; listeners (panes, tree items) hold
//! strong references back to the packets they watch.
//!
//! # Listener dispatch
//!
//! ```text
//! fire(event)
//!    │
//!    ├── snapshot: upgrade every live Weak listener
//!    │
//!    └── for each listener in snapshot
//!            │
//!            ├── still subscribed?  (it may have unsubscribed itself,
//!            │                       or been removed by an earlier callback)
//!            └── call the callback
//! ```
//!
//! Callbacks may therefore subscribe, unsubscribe, destroy packets, or drop
//! themselves without invalidating the iteration.
//!
//! # Change spans
//!
//! Mutations of packet contents happen inside a [`ChangeSpan`]. Spans nest;
//! listeners receive a single `packet_was_changed` when the outermost span
//! ends.

pub mod algebra;
pub mod content;
pub mod perm;
pub mod triangulation;

pub use content::{
    AngleStructureList, BoolSet, FilterType, NormalSurface, PacketContent, PropertiesFilter,
    Script, ScriptVariable, SurfaceFilter, SurfaceList,
};

use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

pub type PacketId = u64;
pub type PacketRef = Rc<Packet>;

static NEXT_PACKET_ID: AtomicU64 = AtomicU64::new(1);

/// Type tag of a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PacketType {
    Container,
    Text,
    Script,
    Triangulation2,
    Triangulation3,
    Triangulation4,
    NormalSurfaces,
    AngleStructures,
    SurfaceFilter,
    Pdf,
}

impl PacketType {
    pub const ALL: [PacketType; 10] = [
        Self::Container,
        Self::Text,
        Self::Script,
        Self::Triangulation2,
        Self::Triangulation3,
        Self::Triangulation4,
        Self::NormalSurfaces,
        Self::AngleStructures,
        Self::SurfaceFilter,
        Self::Pdf,
    ];

    /// Human-readable type name, as used in full names
    pub fn name(&self) -> &'static str {
        match self {
            Self::Container => "Container",
            Self::Text => "Text",
            Self::Script => "Script",
            Self::Triangulation2 => "2-D triangulation",
            Self::Triangulation3 => "3-D triangulation",
            Self::Triangulation4 => "4-D triangulation",
            Self::NormalSurfaces => "Normal surface list",
            Self::AngleStructures => "Angle structure list",
            Self::SurfaceFilter => "Surface filter",
            Self::Pdf => "PDF document",
        }
    }

    /// Short glyph shown in the tree and the pane header
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Container => "▣",
            Self::Text => "¶",
            Self::Script => "λ",
            Self::Triangulation2 => "△",
            Self::Triangulation3 => "▲",
            Self::Triangulation4 => "◆",
            Self::NormalSurfaces => "◎",
            Self::AngleStructures => "∠",
            Self::SurfaceFilter => "⧩",
            Self::Pdf => "⎙",
        }
    }

    pub fn is_triangulation(&self) -> bool {
        matches!(
            self,
            Self::Triangulation2 | Self::Triangulation3 | Self::Triangulation4
        )
    }
}

/// Callbacks fired by a packet to its subscribers
///
/// Every callback has an empty default so listeners only implement what
/// they care about. `child_was_added` may be fired from engine worker
/// threads in a full engine, so implementations must only post an event
/// from it and never touch UI state directly.
pub trait PacketListener {
    fn packet_was_changed(&self, _packet: &Packet) {}
    fn packet_was_renamed(&self, _packet: &Packet) {}
    fn packet_to_be_destroyed(&self, _packet: &Packet) {}
    fn child_was_added(&self, _packet: &Packet, _child: &PacketRef) {}
    fn child_was_removed(&self, _packet: &Packet, _child: &PacketRef, _in_parent_destructor: bool) {
    }
    fn children_were_reordered(&self, _packet: &Packet) {}
}

/// Identity of a listener: the address of its data
fn listener_key(listener: &dyn PacketListener) -> usize {
    listener as *const dyn PacketListener as *const () as usize
}

/// A node in the packet tree
pub struct Packet {
    id: PacketId,
    label: RefCell<String>,
    tags: RefCell<BTreeSet<String>>,
    content: RefCell<PacketContent>,
    parent: RefCell<Weak<Packet>>,
    children: RefCell<Vec<PacketRef>>,
    listeners: RefCell<Vec<(usize, Weak<dyn PacketListener>)>>,
    span_depth: Cell<usize>,
    destroyed: Cell<bool>,
}

impl std::fmt::Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("id", &self.id)
            .field("label", &*self.label.borrow())
            .field("type", &self.packet_type())
            .finish()
    }
}

impl Packet {
    pub fn new(label: impl Into<String>, content: PacketContent) -> PacketRef {
        Rc::new(Self {
            id: NEXT_PACKET_ID.fetch_add(1, Ordering::Relaxed),
            label: RefCell::new(label.into()),
            tags: RefCell::new(BTreeSet::new()),
            content: RefCell::new(content),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            span_depth: Cell::new(0),
            destroyed: Cell::new(false),
        })
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    pub fn packet_type(&self) -> PacketType {
        self.content.borrow().packet_type()
    }

    /// Filter sub-type, for surface filter packets only
    pub fn filter_type(&self) -> Option<FilterType> {
        match &*self.content.borrow() {
            PacketContent::SurfaceFilter(filter) => Some(filter.filter_type()),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    /// Label followed by the type name, e.g. "Poincaré sphere (3-D triangulation)"
    pub fn full_name(&self) -> String {
        format!("{} ({})", self.label.borrow(), self.packet_type().name())
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Labels and tags
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_label(&self, label: impl Into<String>) {
        let label = label.into();
        if *self.label.borrow() == label {
            return;
        }
        *self.label.borrow_mut() = label;
        self.fire(|l| l.packet_was_renamed(self));
    }

    pub fn has_tags(&self) -> bool {
        !self.tags.borrow().is_empty()
    }

    pub fn tags(&self) -> Vec<String> {
        self.tags.borrow().iter().cloned().collect()
    }

    /// Add a tag; returns false if it was already present
    pub fn add_tag(&self, tag: impl Into<String>) -> bool {
        let added = self.tags.borrow_mut().insert(tag.into());
        if added {
            self.fire(|l| l.packet_was_renamed(self));
        }
        added
    }

    pub fn remove_tag(&self, tag: &str) -> bool {
        let removed = self.tags.borrow_mut().remove(tag);
        if removed {
            self.fire(|l| l.packet_was_renamed(self));
        }
        removed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Contents
    // ─────────────────────────────────────────────────────────────────────────

    pub fn content(&self) -> Ref<'_, PacketContent> {
        self.content.borrow()
    }

    /// Open a change span on this packet
    pub fn change_span(&self) -> ChangeSpan<'_> {
        self.span_depth.set(self.span_depth.get() + 1);
        ChangeSpan { packet: self }
    }

    /// Mutate the contents inside a change span
    pub fn edit_content<R>(&self, f: impl FnOnce(&mut PacketContent) -> R) -> R {
        // The borrow is declared after the span, so it is released first.
        let _span = self.change_span();
        let mut content = self.content.borrow_mut();
        let before = content.packet_type();
        let result = f(&mut content);
        debug_assert_eq!(before, content.packet_type(), "packets cannot change type");
        result
    }

    /// Whether the packet may be modified right now
    ///
    /// A triangulation is locked while a normal surface list or angle
    /// structure list hangs beneath it, since those are indexed against it.
    pub fn is_editable(&self) -> bool {
        if !self.packet_type().is_triangulation() {
            return true;
        }
        !self.children.borrow().iter().any(|c| {
            matches!(
                c.packet_type(),
                PacketType::NormalSurfaces | PacketType::AngleStructures
            )
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tree accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn parent(&self) -> Option<PacketRef> {
        self.parent.borrow().upgrade()
    }

    pub fn children(&self) -> Vec<PacketRef> {
        self.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn descendant_count(&self) -> usize {
        self.children
            .borrow()
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    pub fn first_child(&self) -> Option<PacketRef> {
        self.children.borrow().first().cloned()
    }

    pub fn last_child(&self) -> Option<PacketRef> {
        self.children.borrow().last().cloned()
    }

    fn sibling(&self, offset: isize) -> Option<PacketRef> {
        let parent = self.parent()?;
        let siblings = parent.children.borrow();
        let pos = siblings.iter().position(|c| c.id == self.id)?;
        let target = pos.checked_add_signed(offset)?;
        siblings.get(target).cloned()
    }

    pub fn next_sibling(&self) -> Option<PacketRef> {
        self.sibling(1)
    }

    pub fn prev_sibling(&self) -> Option<PacketRef> {
        self.sibling(-1)
    }

    pub fn root(self: &Rc<Self>) -> PacketRef {
        let mut current = Rc::clone(self);
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Depth-first search of this subtree
    pub fn find(self: &Rc<Self>, id: PacketId) -> Option<PacketRef> {
        if self.id == id {
            return Some(Rc::clone(self));
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    /// All packets in this subtree, in depth-first order
    pub fn subtree(self: &Rc<Self>) -> Vec<PacketRef> {
        let mut out = vec![Rc::clone(self)];
        for child in self.children() {
            out.extend(child.subtree());
        }
        out
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tree mutation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn insert_child_last(self: &Rc<Self>, child: PacketRef) {
        let index = self.child_count();
        self.insert_child_at(index, child);
    }

    pub fn insert_child_at(self: &Rc<Self>, index: usize, child: PacketRef) {
        debug_assert!(child.parent().is_none(), "child already has a parent");
        *child.parent.borrow_mut() = Rc::downgrade(self);
        {
            let mut children = self.children.borrow_mut();
            let index = index.min(children.len());
            children.insert(index, Rc::clone(&child));
        }
        self.fire(|l| l.child_was_added(self, &child));
    }

    /// Remove this packet from its parent, keeping it alive
    pub fn detach(self: &Rc<Self>) {
        let Some(parent) = self.parent() else { return };
        parent.children.borrow_mut().retain(|c| c.id != self.id);
        *self.parent.borrow_mut() = Weak::new();
        parent.fire(|l| l.child_was_removed(&parent, self, false));
    }

    /// Move the child at `from` to position `to`
    pub fn move_child(&self, from: usize, to: usize) {
        {
            let mut children = self.children.borrow_mut();
            if from >= children.len() || to >= children.len() || from == to {
                return;
            }
            let child = children.remove(from);
            children.insert(to, child);
        }
        self.fire(|l| l.children_were_reordered(self));
    }

    /// Destroy this packet and its entire subtree
    ///
    /// Listeners on this packet hear `packet_to_be_destroyed` before anything
    /// is torn down. Children are destroyed in order, each reported to this
    /// packet's listeners with `in_parent_destructor` set. Finally the packet
    /// leaves its parent.
    pub fn destroy(self: &Rc<Self>) {
        if self.destroyed.get() {
            return;
        }
        self.fire(|l| l.packet_to_be_destroyed(self));
        self.destroyed.set(true);

        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.destroy_in_parent();
            self.fire(|l| l.child_was_removed(self, &child, true));
        }

        self.detach();
        self.listeners.borrow_mut().clear();
    }

    fn destroy_in_parent(self: &Rc<Self>) {
        *self.parent.borrow_mut() = Weak::new();
        self.destroy();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Listeners
    // ─────────────────────────────────────────────────────────────────────────

    /// Subscribe a listener; returns false if it was already subscribed
    pub fn listen(&self, listener: &Rc<dyn PacketListener>) -> bool {
        let key = listener_key(listener.as_ref());
        let mut listeners = self.listeners.borrow_mut();
        if listeners.iter().any(|(k, _)| *k == key) {
            return false;
        }
        listeners.push((key, Rc::downgrade(listener)));
        true
    }

    /// Unsubscribe a listener; returns false if it was not subscribed
    pub fn unlisten(&self, listener: &dyn PacketListener) -> bool {
        let key = listener_key(listener);
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(k, _)| *k != key);
        listeners.len() != before
    }

    pub fn is_listening(&self, listener: &dyn PacketListener) -> bool {
        self.is_listening_key(listener_key(listener))
    }

    fn is_listening_key(&self, key: usize) -> bool {
        self.listeners.borrow().iter().any(|(k, _)| *k == key)
    }

    /// Number of live subscribers
    pub fn listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(_, w)| w.strong_count() > 0)
            .count()
    }

    fn fire(&self, callback: impl Fn(&dyn PacketListener)) {
        let snapshot: Vec<(usize, Rc<dyn PacketListener>)> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|(_, w)| w.strong_count() > 0);
            listeners
                .iter()
                .filter_map(|(k, w)| w.upgrade().map(|l| (*k, l)))
                .collect()
        };
        for (key, listener) in snapshot {
            if self.is_listening_key(key) {
                callback(listener.as_ref());
            }
        }
    }
}

/// Scope that batches content changes into one notification
///
/// Created by [`Packet::change_span`]. When the outermost span on a packet
/// drops, every listener receives `packet_was_changed` exactly once.
#[must_use = "the change notification fires when the span is dropped"]
pub struct ChangeSpan<'a> {
    packet: &'a Packet,
}

impl Drop for ChangeSpan<'_> {
    fn drop(&mut self) {
        let depth = self.packet.span_depth.get().saturating_sub(1);
        self.packet.span_depth.set(depth);
        if depth == 0 && !self.packet.destroyed.get() {
            let packet = self.packet;
            packet.fire(|l| l.packet_was_changed(packet));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every callback as a short string
    #[derive(Default)]
    struct Recorder {
        log: RefCell<Vec<String>>,
    }

    impl Recorder {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.log.borrow_mut())
        }
    }

    impl PacketListener for Recorder {
        fn packet_was_changed(&self, p: &Packet) {
            self.log.borrow_mut().push(format!("changed {}", p.label()));
        }
        fn packet_was_renamed(&self, p: &Packet) {
            self.log.borrow_mut().push(format!("renamed {}", p.label()));
        }
        fn packet_to_be_destroyed(&self, p: &Packet) {
            self.log.borrow_mut().push(format!("destroy {}", p.label()));
        }
        fn child_was_added(&self, _p: &Packet, c: &PacketRef) {
            self.log.borrow_mut().push(format!("added {}", c.label()));
        }
        fn child_was_removed(&self, _p: &Packet, c: &PacketRef, in_dtor: bool) {
            self.log
                .borrow_mut()
                .push(format!("removed {} {}", c.label(), in_dtor));
        }
        fn children_were_reordered(&self, _p: &Packet) {
            self.log.borrow_mut().push("reordered".into());
        }
    }

    fn text(label: &str) -> PacketRef {
        Packet::new(label, PacketContent::Text(String::new()))
    }

    #[test]
    fn test_nested_spans_fire_once() {
        let p = text("note");
        let rec = Rc::new(Recorder::default());
        let listener: Rc<dyn PacketListener> = rec.clone();
        p.listen(&listener);

        {
            let _outer = p.change_span();
            p.edit_content(|c| {
                if let PacketContent::Text(s) = c {
                    s.push_str("hello");
                }
            });
            assert!(rec.take().is_empty());
        }
        assert_eq!(rec.take(), vec!["changed note"]);
    }

    #[test]
    fn test_listen_is_idempotent_and_unlisten_symmetric() {
        let p = text("note");
        let listener: Rc<dyn PacketListener> = Rc::new(Recorder::default());
        assert!(p.listen(&listener));
        assert!(!p.listen(&listener));
        assert_eq!(p.listener_count(), 1);
        assert!(p.unlisten(listener.as_ref()));
        assert!(!p.is_listening(listener.as_ref()));
        assert_eq!(p.listener_count(), 0);
    }

    #[test]
    fn test_dropped_listener_is_skipped() {
        let p = text("note");
        let listener: Rc<dyn PacketListener> = Rc::new(Recorder::default());
        p.listen(&listener);
        drop(listener);
        p.set_label("renamed");
        assert_eq!(p.listener_count(), 0);
    }

    /// Unsubscribes a second listener when notified
    struct Remover {
        other: RefCell<Option<Rc<dyn PacketListener>>>,
    }

    impl PacketListener for Remover {
        fn packet_was_renamed(&self, p: &Packet) {
            if let Some(other) = self.other.borrow_mut().take() {
                p.unlisten(other.as_ref());
            }
        }
    }

    #[test]
    fn test_listener_removed_mid_dispatch_is_not_called() {
        let p = text("note");
        let rec = Rc::new(Recorder::default());
        let rec_dyn: Rc<dyn PacketListener> = rec.clone();
        let remover: Rc<dyn PacketListener> = Rc::new(Remover {
            other: RefCell::new(Some(rec_dyn.clone())),
        });
        p.listen(&remover);
        p.listen(&rec_dyn);

        p.set_label("x");
        assert!(rec.take().is_empty());
    }

    #[test]
    fn test_tree_accessors() {
        let root = Packet::new("root", PacketContent::Container);
        let a = text("a");
        let b = text("b");
        let c = text("c");
        root.insert_child_last(a.clone());
        root.insert_child_last(c.clone());
        root.insert_child_at(1, b.clone());

        assert_eq!(b.prev_sibling().map(|p| p.label()), Some("a".into()));
        assert_eq!(b.next_sibling().map(|p| p.label()), Some("c".into()));
        assert!(a.prev_sibling().is_none());
        assert_eq!(root.last_child().map(|p| p.id()), Some(c.id()));
        assert_eq!(c.root().id(), root.id());
        assert_eq!(root.find(b.id()).map(|p| p.label()), Some("b".into()));
        assert_eq!(root.descendant_count(), 3);
    }

    #[test]
    fn test_destroy_order() {
        let root = Packet::new("root", PacketContent::Container);
        let parent = Packet::new("parent", PacketContent::Container);
        let child = text("child");
        root.insert_child_last(parent.clone());
        parent.insert_child_last(child.clone());

        let rec = Rc::new(Recorder::default());
        let listener: Rc<dyn PacketListener> = rec.clone();
        root.listen(&listener);
        parent.listen(&listener);
        child.listen(&listener);

        parent.destroy();
        assert_eq!(
            rec.take(),
            vec![
                "destroy parent",
                "destroy child",
                "removed child true",
                "removed parent false",
            ]
        );
        assert_eq!(root.child_count(), 0);
        assert!(child.is_destroyed());
    }

    #[test]
    fn test_editability_follows_dependent_children() {
        use super::triangulation::Triangulation;

        let tri = Packet::new("tri", PacketContent::Triangulation(Triangulation::new(3)));
        assert!(tri.is_editable());

        let surfaces = Packet::new(
            "surfaces",
            PacketContent::NormalSurfaces(SurfaceList {
                coords: "Standard".into(),
                embedded_only: true,
                surfaces: vec![],
            }),
        );
        tri.insert_child_last(surfaces.clone());
        assert!(!tri.is_editable());

        surfaces.detach();
        assert!(tri.is_editable());
    }

    #[test]
    fn test_tags_fire_rename() {
        let p = text("note");
        let rec = Rc::new(Recorder::default());
        let listener: Rc<dyn PacketListener> = rec.clone();
        p.listen(&listener);

        assert!(p.add_tag("important"));
        assert!(!p.add_tag("important"));
        assert!(p.has_tags());
        assert_eq!(rec.take(), vec!["renamed note"]);

        assert!(!p.remove_tag("missing"));
        assert!(p.remove_tag("important"));
        assert!(!p.has_tags());
        assert_eq!(rec.take(), vec!["renamed note"]);
    }

    #[test]
    fn test_full_name_and_filter_type() {
        let f = Packet::new(
            "filter",
            PacketContent::SurfaceFilter(SurfaceFilter::Combination { use_and: true }),
        );
        assert_eq!(f.full_name(), "filter (Surface filter)");
        assert_eq!(f.filter_type(), Some(FilterType::Combination));
        assert_eq!(text("t").filter_type(), None);
    }

    #[test]
    fn test_move_child_fires_reordered() {
        let root = Packet::new("root", PacketContent::Container);
        root.insert_child_last(text("a"));
        root.insert_child_last(text("b"));
        let rec = Rc::new(Recorder::default());
        let listener: Rc<dyn PacketListener> = rec.clone();
        root.listen(&listener);

        root.move_child(0, 1);
        assert_eq!(rec.take(), vec!["reordered"]);
        assert_eq!(root.first_child().map(|p| p.label()), Some("b".into()));
    }
}
