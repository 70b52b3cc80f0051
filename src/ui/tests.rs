// Scenario tests: panes and the workspace driven the way a user drives them
//
// Dialogs are scripted and the clipboard lives in memory, so every scenario
// runs headless.

use super::app::{Focus, Workspace};
use super::clipboard::{Clipboard, MemoryClipboard};
use super::dialogs::{DialogKind, Dialogs, ScriptedDialogs};
use super::pane::{PacketPane, PaneHost};
use super::registry;
use crate::config::{Preferences, TabFamily};
use crate::demo;
use crate::events::{EventQueue, EventSender, HostRequest};
use crate::logging::LogBuffer;
use crate::packet::perm::Perm;
use crate::packet::triangulation::{Gluing, Triangulation};
use crate::packet::{
    AngleStructureList, Packet, PacketContent, PacketListener, PacketRef, PacketType,
    SurfaceFilter, SurfaceList,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cell::Cell;
use std::rc::Rc;

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

struct TestHost {
    read_write: Cell<bool>,
    dialogs: Rc<ScriptedDialogs>,
    prefs: Rc<Preferences>,
    requests: EventQueue<HostRequest>,
}

impl TestHost {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            read_write: Cell::new(true),
            dialogs: Rc::new(ScriptedDialogs::new()),
            prefs: Rc::new(Preferences::default()),
            requests: EventQueue::new(),
        })
    }

    fn open(self: &Rc<Self>, id: u64, packet: &PacketRef) -> PacketPane {
        let host: Rc<dyn PaneHost> = self.clone();
        PacketPane::new(id, packet.clone(), host)
    }
}

impl PaneHost for TestHost {
    fn document_read_write(&self) -> bool {
        self.read_write.get()
    }

    fn dialogs(&self) -> Rc<dyn Dialogs> {
        self.dialogs.clone()
    }

    fn preferences(&self) -> Rc<Preferences> {
        self.prefs.clone()
    }

    fn requests(&self) -> EventSender<HostRequest> {
        self.requests.sender()
    }
}

#[derive(Default)]
struct ChangeCounter {
    changes: Cell<usize>,
}

impl PacketListener for ChangeCounter {
    fn packet_was_changed(&self, _packet: &Packet) {
        self.changes.set(self.changes.get() + 1);
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn alt(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::ALT)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn type_text(pane: &PacketPane, text: &str) {
    for c in text.chars() {
        pane.handle_key(key(KeyCode::Char(c)));
    }
}

/// Edit the gluing cell for facet 3 of tetrahedron 0
fn edit_first_gluing(pane: &PacketPane, text: &str) {
    pane.handle_key(key(KeyCode::Right));
    pane.handle_key(key(KeyCode::Enter));
    type_text(pane, text);
    pane.handle_key(key(KeyCode::Enter));
}

fn tetrahedra(n: usize) -> PacketRef {
    let mut tri = Triangulation::new(3);
    for _ in 0..n {
        tri.add_simplex("");
    }
    Packet::new("tri", PacketContent::Triangulation(tri))
}

fn adjacent(packet: &PacketRef, simplex: usize, facet: usize) -> Option<Gluing> {
    match &*packet.content() {
        PacketContent::Triangulation(tri) => tri.adjacent(simplex, facet),
        _ => None,
    }
}

fn empty_surfaces() -> PacketRef {
    Packet::new(
        "surfaces",
        PacketContent::NormalSurfaces(SurfaceList {
            coords: "Standard normal (tri-quad)".to_string(),
            embedded_only: true,
            surfaces: Vec::new(),
        }),
    )
}

fn workspace(root: &PacketRef) -> (Workspace, Rc<ScriptedDialogs>) {
    let dialogs = Rc::new(ScriptedDialogs::new());
    let ws = Workspace::new(
        root.clone(),
        dialogs.clone(),
        Rc::new(Preferences::default()),
        Box::new(MemoryClipboard::new()),
        LogBuffer::new(),
    );
    (ws, dialogs)
}

// ─────────────────────────────────────────────────────────────────────────────
// Editing and committing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_gluing_edit_commits_in_one_change() {
    let host = TestHost::new();
    let packet = tetrahedra(2);
    let counter = Rc::new(ChangeCounter::default());
    let listener: Rc<dyn PacketListener> = counter.clone();
    packet.listen(&listener);

    let pane = host.open(1, &packet);
    edit_first_gluing(&pane, "1 (012)");

    assert!(pane.is_dirty());
    assert_eq!(adjacent(&packet, 0, 3), None);
    assert_eq!(counter.changes.get(), 0);

    assert!(pane.commit());
    assert!(!pane.is_dirty());
    assert_eq!(
        adjacent(&packet, 0, 3),
        Some(Gluing {
            simplex: 1,
            perm: Perm::identity(4),
        })
    );
    assert_eq!(adjacent(&packet, 1, 3).map(|g| g.simplex), Some(0));
    assert_eq!(counter.changes.get(), 1);

    // A clean pane has nothing to push
    assert!(pane.commit());
    assert_eq!(counter.changes.get(), 1);
    assert_eq!(host.dialogs.count(), 0);
}

#[test]
fn test_invalid_gluing_is_explained_and_leaves_pane_clean() {
    let host = TestHost::new();
    let packet = tetrahedra(1);
    let pane = host.open(1, &packet);

    edit_first_gluing(&pane, "0 (012)");

    let record = host.dialogs.last().unwrap();
    assert_eq!(record.kind, DialogKind::Information);
    assert!(record.mentions("not a valid gluing"));
    assert!(record.mentions("cannot be glued to itself"));
    assert!(!pane.is_dirty());
    assert_eq!(adjacent(&packet, 0, 3), None);
}

#[test]
fn test_external_change_refreshes_a_clean_pane() {
    let host = TestHost::new();
    let packet = tetrahedra(2);
    let pane = host.open(1, &packet);

    packet.edit_content(|c| {
        if let PacketContent::Triangulation(tri) = c {
            tri.join(0, 3, 1, Perm::identity(4));
        }
    });
    pane.process_events();

    assert!(!pane.is_dirty());
    assert_eq!(host.dialogs.count(), 0);

    // Copy the cell we just learned about; the viewer must have seen the join
    let mut clipboard = MemoryClipboard::new();
    assert!(!pane.edit_operations_registered());
    pane.register_edit_operations();
    assert!(pane.edit_operations_registered());
    pane.handle_key(key(KeyCode::Right));
    assert!(pane.copy(&mut clipboard));
    assert_eq!(clipboard.get_text().as_deref(), Some("1 (012)"));
}

#[test]
fn test_external_change_while_dirty_asks_first() {
    let host = TestHost::new();
    let packet = tetrahedra(2);
    let pane = host.open(1, &packet);
    edit_first_gluing(&pane, "1 (012)");
    assert!(pane.is_dirty());

    host.dialogs.push_answer(false);
    packet.edit_content(|c| {
        if let PacketContent::Triangulation(tri) = c {
            tri.set_description(0, "changed elsewhere");
        }
    });
    pane.process_events();

    assert!(host.dialogs.last().unwrap().mentions("changed from elsewhere"));
    assert!(pane.is_dirty());
}

#[test]
fn test_refresh_of_dirty_pane_asks_before_discarding() {
    let host = TestHost::new();
    let packet = tetrahedra(2);
    let pane = host.open(1, &packet);
    edit_first_gluing(&pane, "1 (012)");
    assert!(pane.is_dirty());

    host.dialogs.push_answer(false);
    pane.handle_key(key(KeyCode::F(5)));
    assert!(host.dialogs.last().unwrap().mentions("discard these changes"));
    assert!(pane.is_dirty());

    // The edit survived the cancelled refresh and can still be committed
    host.dialogs.push_answer(true);
    pane.refresh();
    assert!(!pane.is_dirty());
    assert_eq!(host.dialogs.count(), 2);
    assert!(pane.commit());
    assert_eq!(adjacent(&packet, 0, 3), None);
}

#[test]
fn test_clean_pane_refreshes_without_asking() {
    let host = TestHost::new();
    let pane = host.open(1, &tetrahedra(1));
    pane.refresh();
    assert!(!pane.is_dirty());
    assert_eq!(host.dialogs.count(), 0);
}

#[test]
fn test_rename_updates_header() {
    let host = TestHost::new();
    let packet = tetrahedra(1);
    let pane = host.open(1, &packet);

    packet.set_label("Renamed");
    assert_eq!(pane.header().title, "Renamed (3-D triangulation)");
    assert!(!pane.is_dirty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Editability
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_surface_child_locks_triangulation_pane() {
    let host = TestHost::new();
    let packet = tetrahedra(1);
    let pane = host.open(1, &packet);
    assert!(pane.is_read_write());

    let surfaces = empty_surfaces();
    packet.insert_child_last(surfaces.clone());
    pane.process_events();

    assert!(!pane.is_read_write());
    assert!(pane.header().locked);
    assert!(!pane.commit_to_modify());
    let record = host.dialogs.last().unwrap();
    assert_eq!(record.kind, DialogKind::Sorry);
    assert!(record.mentions("may not be changed"));
    assert_eq!(
        host.requests.drain(),
        vec![HostRequest::ReadWriteChanged {
            pane: 1,
            read_write: false,
        }]
    );

    surfaces.detach();
    pane.process_events();
    assert!(pane.is_read_write());
    assert!(!pane.header().locked);
}

#[test]
fn test_try_commit_on_locked_dirty_pane_asks_to_continue() {
    let host = TestHost::new();
    let packet = tetrahedra(2);
    let pane = host.open(1, &packet);
    edit_first_gluing(&pane, "1 (012)");
    assert!(pane.is_dirty());

    packet.insert_child_last(empty_surfaces());
    pane.process_events();
    assert!(!pane.is_read_write());

    host.dialogs.push_answer(false);
    assert!(!pane.try_commit());
    let record = host.dialogs.last().unwrap();
    assert!(record.mentions("cannot be committed"));
    assert!(record.mentions("continue using the packet as it was"));

    host.dialogs.push_answer(true);
    assert!(pane.try_commit());
    assert_eq!(host.dialogs.count(), 2);

    // Either way nothing reached the packet
    assert_eq!(adjacent(&packet, 0, 3), None);
    assert!(pane.is_dirty());
}

#[test]
fn test_try_commit_on_clean_locked_pane_is_silent() {
    let host = TestHost::new();
    let packet = tetrahedra(1);
    let pane = host.open(1, &packet);
    packet.insert_child_last(empty_surfaces());
    pane.process_events();

    assert!(pane.try_commit());
    assert_eq!(host.dialogs.count(), 0);
}

#[test]
fn test_read_write_switch_reaches_a_busy_viewer() {
    let host = TestHost::new();
    let note = Packet::new("note", PacketContent::Text(String::new()));
    let pane = host.open(1, &note);

    {
        let _busy = pane.busy_viewer();
        assert!(pane.set_read_write(false));
    }
    assert!(!pane.is_read_write());
    pane.process_events();

    type_text(&pane, "ignored");
    assert!(!pane.is_dirty());

    assert!(pane.set_read_write(true));
    type_text(&pane, "kept");
    assert!(pane.is_dirty());
}

#[test]
fn test_read_only_document_refuses_edits() {
    let host = TestHost::new();
    host.read_write.set(false);
    let packet = tetrahedra(1);
    let pane = host.open(1, &packet);

    assert!(!pane.is_read_write());
    assert!(pane.header().read_only);
    assert!(!pane.set_read_write(true));

    // Enter does not open an editor on a read-only table
    edit_first_gluing(&pane, "0 (123)");
    assert!(!pane.is_dirty());
    assert_eq!(adjacent(&packet, 0, 3), None);
}

#[test]
fn test_add_simplex_action_requires_editable_packet() {
    let host = TestHost::new();
    let packet = tetrahedra(1);
    let pane = host.open(1, &packet);

    let index = pane
        .packet_actions()
        .iter()
        .position(|a| a.id == "add-simplex")
        .unwrap();
    assert!(pane.trigger_packet_action(index));
    assert_eq!(
        match &*packet.content() {
            PacketContent::Triangulation(tri) => tri.size(),
            _ => 0,
        },
        2
    );

    packet.insert_child_last(Packet::new(
        "angles",
        PacketContent::AngleStructures(AngleStructureList::default()),
    ));
    pane.process_events();
    assert!(!pane.trigger_packet_action(index));
    assert!(host.dialogs.last().unwrap().mentions("may not be changed"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Closing and listeners
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_closing_dirty_pane_asks_for_confirmation() {
    let host = TestHost::new();
    let packet = tetrahedra(2);
    let pane = host.open(7, &packet);
    edit_first_gluing(&pane, "1 (012)");
    host.requests.drain();

    host.dialogs.push_answer(false);
    assert!(!pane.query_close());
    assert!(host.requests.is_empty());

    host.dialogs.push_answer(true);
    assert!(pane.query_close());
    assert_eq!(host.requests.drain(), vec![HostRequest::PaneClosed(7)]);
    assert!(host.dialogs.last().unwrap().mentions("not yet been committed"));
}

#[test]
fn test_clean_pane_closes_without_asking() {
    let host = TestHost::new();
    let pane = host.open(2, &tetrahedra(1));
    assert!(pane.query_close());
    assert_eq!(host.dialogs.count(), 0);
}

#[test]
fn test_pane_listens_for_exactly_its_lifetime() {
    let host = TestHost::new();
    let packet = tetrahedra(1);
    let before = packet.listener_count();

    let pane = host.open(1, &packet);
    assert_eq!(packet.listener_count(), before + 1);
    drop(pane);
    assert_eq!(packet.listener_count(), before);
}

#[test]
fn test_destroyed_packet_closes_its_pane() {
    let host = TestHost::new();
    let root = Packet::new("root", PacketContent::Container);
    let packet = tetrahedra(2);
    root.insert_child_last(packet.clone());
    let pane = host.open(3, &packet);
    edit_first_gluing(&pane, "1 (012)");
    host.requests.drain();

    packet.destroy();
    // No prompt even though the pane was dirty
    assert!(host.requests.drain().contains(&HostRequest::ClosePane(3)));
    assert!(pane.query_close());
    assert_eq!(host.dialogs.count(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tabs and viewers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_last_tab_is_remembered_per_family() {
    let host = TestHost::new();
    let first = host.open(1, &tetrahedra(1));
    first.handle_key(alt(KeyCode::Right));
    assert_eq!(host.prefs.last_tab(TabFamily::Triangulation3), 1);
    drop(first);

    // The new pane starts on tab 1, so one step left reaches the gluings
    let second = host.open(2, &tetrahedra(1));
    second.handle_key(alt(KeyCode::Left));
    assert_eq!(host.prefs.last_tab(TabFamily::Triangulation3), 0);

    // Other families are untouched
    assert_eq!(host.prefs.last_tab(TabFamily::Triangulation2), 0);
}

#[test]
fn test_edits_stay_with_the_editor_tab() {
    let host = TestHost::new();
    host.prefs.set_last_tab(TabFamily::Triangulation3, 1);
    let packet = tetrahedra(2);
    let pane = host.open(1, &packet);

    // Enter on the skeleton tab does nothing
    pane.handle_key(key(KeyCode::Enter));
    assert!(!pane.is_dirty());

    pane.handle_key(alt(KeyCode::Left));
    edit_first_gluing(&pane, "1 (012)");
    assert!(pane.is_dirty());
    assert!(pane.commit());
    assert!(adjacent(&packet, 0, 3).is_some());
}

#[test]
fn test_every_packet_type_gets_a_viewer() {
    let host = TestHost::new();
    let packets = [
        Packet::new("c", PacketContent::Container),
        Packet::new("t", PacketContent::Text("hello".to_string())),
        Packet::new("s", PacketContent::Script(Default::default())),
        Packet::new("2", PacketContent::Triangulation(Triangulation::new(2))),
        Packet::new("3", PacketContent::Triangulation(Triangulation::new(3))),
        Packet::new("4", PacketContent::Triangulation(Triangulation::new(4))),
        empty_surfaces(),
        Packet::new(
            "a",
            PacketContent::AngleStructures(AngleStructureList::default()),
        ),
        Packet::new("f", PacketContent::SurfaceFilter(SurfaceFilter::Trivial)),
        Packet::new("p", PacketContent::Pdf(Vec::new())),
    ];
    for (i, packet) in packets.iter().enumerate() {
        let pane = host.open(i as u64, packet);
        assert_eq!(pane.packet().id(), packet.id());
    }
    assert_eq!(host.dialogs.count(), 0);

    let registered = registry::registry().registered_types();
    assert!(!registered.contains(&PacketType::AngleStructures));
    assert!(registered.contains(&PacketType::Triangulation4));
}

#[test]
fn test_text_pane_without_change_tracking_is_always_dirty() {
    let host = TestHost::new();
    host.prefs.update(|c| c.editor.track_changes = false);
    let packet = Packet::new("note", PacketContent::Text("hi".to_string()));
    let pane = host.open(1, &packet);

    assert!(pane.is_dirtiness_broken());
    assert!(pane.is_dirty());

    host.read_write.set(false);
    pane.update_read_write();
    assert!(!pane.is_dirty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Workspace
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_open_docks_then_focuses_existing_pane() {
    let root = demo::sample_document();
    let (mut ws, dialogs) = workspace(&root);
    let children = root.children();

    let first = ws.open_packet(&children[0]);
    assert_eq!(ws.docked_pane().map(|p| p.id()), Some(first));
    assert_eq!(ws.focus, Focus::Docked);

    // A clean docked pane gives way to the next packet
    let second = ws.open_packet(&children[1]);
    ws.process_requests();
    assert_eq!(ws.pane_count(), 1);
    assert_eq!(ws.docked_pane().map(|p| p.id()), Some(second));

    assert_eq!(ws.open_packet(&children[1]), second);
    assert_eq!(ws.pane_count(), 1);
    assert_eq!(dialogs.count(), 0);
}

#[test]
fn test_dirty_docked_pane_pushes_new_pane_to_float() {
    let root = Packet::new("root", PacketContent::Container);
    let tri = tetrahedra(2);
    let note = Packet::new("note", PacketContent::Text(String::new()));
    root.insert_child_last(tri.clone());
    root.insert_child_last(note.clone());
    let (mut ws, dialogs) = workspace(&root);

    let docked = ws.open_packet(&tri);
    edit_first_gluing(ws.docked_pane().unwrap(), "1 (012)");
    dialogs.push_answer(false);

    let floating = ws.open_packet(&note);
    ws.process_requests();
    assert_eq!(ws.docked_pane().map(|p| p.id()), Some(docked));
    assert_eq!(ws.floating().len(), 1);
    assert_eq!(ws.focus, Focus::Floating(0));
    assert!(!ws.pane(floating).unwrap().is_docked());

    // Docking the floating pane floats the dirty one in its place
    ws.pane(floating).unwrap().dock_pane();
    ws.process_requests();
    assert_eq!(ws.docked_pane().map(|p| p.id()), Some(floating));
    assert_eq!(ws.floating()[0].pane().id(), docked);
    assert!(ws.pane(docked).unwrap().is_dirty());
}

#[test]
fn test_float_pane_announces_undock() {
    let host = TestHost::new();
    let pane = host.open(4, &tetrahedra(1));
    host.requests.drain();

    pane.float_pane();
    assert_eq!(host.requests.drain(), vec![HostRequest::AboutToUndock(4)]);

    // A pane that is already floating stays put
    pane.set_docked(false);
    pane.float_pane();
    assert!(host.requests.is_empty());
}

#[test]
fn test_floating_the_docked_pane_empties_the_dock() {
    let root = Packet::new("root", PacketContent::Container);
    let tri = tetrahedra(2);
    root.insert_child_last(tri.clone());
    let (mut ws, dialogs) = workspace(&root);

    let id = ws.open_packet(&tri);
    edit_first_gluing(ws.docked_pane().unwrap(), "1 (012)");
    ws.pane(id).unwrap().handle_key(key(KeyCode::F(3)));
    ws.process_requests();

    assert!(ws.docked_pane().is_none());
    assert_eq!(ws.floating().len(), 1);
    let pane = ws.pane(id).unwrap();
    assert!(!pane.is_docked());
    assert!(pane.edit_operations_registered());
    // Undocking keeps the edits
    assert!(pane.is_dirty());
    assert_eq!(dialogs.count(), 0);

    pane.dock_pane();
    ws.process_requests();
    assert_eq!(ws.docked_pane().map(|p| p.id()), Some(id));
}

#[test]
fn test_close_request_routes_through_query_close() {
    let root = Packet::new("root", PacketContent::Container);
    let tri = tetrahedra(2);
    root.insert_child_last(tri.clone());
    let (mut ws, dialogs) = workspace(&root);
    let id = ws.open_packet(&tri);
    edit_first_gluing(ws.docked_pane().unwrap(), "1 (012)");

    dialogs.push_answer(false);
    ws.pane(id).unwrap().close();
    ws.process_requests();
    assert_eq!(ws.pane_count(), 1);

    dialogs.push_answer(true);
    ws.pane(id).unwrap().close();
    ws.process_requests();
    assert_eq!(ws.pane_count(), 0);
    assert_eq!(ws.focus, Focus::Tree);
}

#[test]
fn test_read_only_toggle_reaches_every_pane() {
    let root = demo::sample_document();
    let (mut ws, _dialogs) = workspace(&root);
    let note = root.children()[0].clone();
    ws.open_packet(&note);
    assert!(ws.docked_pane().unwrap().is_read_write());

    ws.handle_key(ctrl('r'));
    assert!(ws.is_read_only());
    assert!(!ws.docked_pane().unwrap().is_read_write());
    assert!(ws.toast.as_ref().is_some_and(|t| t.is_warning()));

    ws.handle_key(ctrl('r'));
    assert!(ws.docked_pane().unwrap().is_read_write());
}

#[test]
fn test_quit_stops_when_a_pane_refuses() {
    let root = Packet::new("root", PacketContent::Container);
    let tri = tetrahedra(2);
    root.insert_child_last(tri.clone());
    let (mut ws, dialogs) = workspace(&root);
    ws.open_packet(&tri);
    edit_first_gluing(ws.docked_pane().unwrap(), "1 (012)");

    dialogs.push_answer(false);
    ws.handle_key(ctrl('q'));
    assert!(!ws.should_quit);
    assert_eq!(ws.pane_count(), 1);

    dialogs.push_answer(true);
    ws.handle_key(ctrl('q'));
    assert!(ws.should_quit);
    assert_eq!(ws.pane_count(), 0);
}

#[test]
fn test_tree_enter_opens_selected_packet() {
    let root = demo::sample_document();
    let (mut ws, _dialogs) = workspace(&root);

    // Row 0 is the root container, row 1 its first child
    ws.handle_key(key(KeyCode::Down));
    ws.handle_key(key(KeyCode::Enter));
    let first = root.children()[0].id();
    assert_eq!(ws.docked_pane().map(|p| p.packet().id()), Some(first));
}

#[test]
fn test_tree_follows_document_changes() {
    let root = Packet::new("root", PacketContent::Container);
    let (mut ws, _dialogs) = workspace(&root);

    let note = Packet::new("note", PacketContent::Text(String::new()));
    root.insert_child_last(note.clone());
    ws.tick();
    assert!(ws.tree.item(note.id()).is_some());

    note.edit_content(|c| *c = PacketContent::Text("changed".to_string()));
    ws.tick();
    assert!(ws.is_document_modified());

    ws.open_packet(&note);
    note.destroy();
    ws.tick();
    assert!(ws.tree.item(note.id()).is_none());
    assert_eq!(ws.pane_count(), 0);
}

#[test]
fn test_preference_change_reaches_open_panes() {
    let root = Packet::new("root", PacketContent::Container);
    let (mut ws, _dialogs) = workspace(&root);
    let theme = ws.theme.name.clone();

    ws.handle_key(ctrl('t'));
    ws.tick();
    assert_ne!(ws.theme.name, theme);
    assert!(ws.toast.is_some());
}

#[test]
fn test_clipboard_keys_use_the_focused_pane() {
    let root = Packet::new("root", PacketContent::Container);
    let tri = tetrahedra(2);
    tri.edit_content(|c| {
        if let PacketContent::Triangulation(t) = c {
            t.join(0, 3, 1, Perm::identity(4));
        }
    });
    root.insert_child_last(tri.clone());
    let (mut ws, _dialogs) = workspace(&root);
    ws.open_packet(&tri);

    ws.handle_key(key(KeyCode::Right));
    ws.handle_key(ctrl('c'));
    assert_eq!(ws.clipboard_mut().get_text().as_deref(), Some("1 (012)"));
    assert!(ws.toast.is_some());

    // Paste into the description column of the second row
    ws.handle_key(key(KeyCode::Down));
    ws.handle_key(key(KeyCode::Left));
    ws.clipboard_mut().set_text("second");
    ws.handle_key(ctrl('v'));
    assert!(ws.docked_pane().unwrap().is_dirty());
}
