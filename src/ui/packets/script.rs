//! Script editor: a variable table above the script body
//!
//! Variables map names to packets elsewhere in the tree. Names are repaired
//! rather than rejected where possible: invalid characters are stripped, a
//! leading digit gets an underscore, and clashes get the first free numeric
//! suffix. The user is told what happened each time.

use crate::error::{Result, UiError};
use crate::events::{EventSender, PaneEvent};
use crate::packet::{PacketContent, PacketRef, Script, ScriptVariable};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};
use regex::Regex;
use std::rc::Rc;
use std::sync::OnceLock;

use super::{cell_rect, content_as, follow, header_style, wrong_content};
use crate::ui::clipboard::Clipboard;
use crate::ui::text_area::{LineEdit, LineOutcome, TextArea};
use crate::ui::traits::{EditInterface, EditSignal, Handled, RenderContext};
use crate::ui::viewer::{ActionRequirement, PacketViewer, PaneContext, ViewerAction};

const NAME_WIDTH: u16 = 20;
const VALUE_WIDTH: u16 = 40;

fn is_identifier(name: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

fn strip_invalid(name: &str) -> String {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    match RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").ok()).as_ref() {
        Some(re) => re.replace_all(name, "").into_owned(),
        None => name.to_string(),
    }
}

/// Which half of the viewer has the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Variables,
    Body,
}

pub fn create(packet: &PacketRef, ctx: &PaneContext) -> Result<Box<dyn PacketViewer>> {
    if content_as(packet, |c| match c {
        PacketContent::Script(s) => Some(s),
        _ => None,
    })
    .is_none()
    {
        return Err(wrong_content(packet, "a script"));
    }
    let mut viewer = ScriptViewer::new(packet, ctx);
    viewer.refresh();
    Ok(Box::new(viewer))
}

pub struct ScriptViewer {
    packet: PacketRef,
    ctx: PaneContext,
    variables: Vec<ScriptVariable>,
    body: TextArea,
    region: Region,
    selected: usize,
    /// First variable row drawn
    offset: usize,
    column: usize,
    editing: Option<LineEdit>,
    read_write: bool,
    signal: EditSignal,
}

impl ScriptViewer {
    pub fn new(packet: &PacketRef, ctx: &PaneContext) -> Self {
        Self {
            packet: packet.clone(),
            ctx: ctx.clone(),
            variables: Vec::new(),
            body: TextArea::new(),
            region: Region::Body,
            selected: 0,
            offset: 0,
            column: 0,
            editing: None,
            read_write: true,
            signal: EditSignal::new(),
        }
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn set_region(&mut self, region: Region) {
        if self.region != region {
            self.region = region;
            self.editing = None;
            self.signal.emit();
        }
    }

    fn working_script(&self) -> Script {
        Script {
            text: self.body.text(),
            variables: self.variables.clone(),
        }
    }

    fn name_used_elsewhere(&self, name: &str, row: usize) -> bool {
        self.variables
            .iter()
            .enumerate()
            .any(|(i, v)| i != row && v.name == name)
    }

    /// Rename the variable at `row`, repairing the name if needed
    pub fn rename_variable(&mut self, row: usize, name: &str) -> Result<()> {
        let Some(old) = self.variables.get(row).map(|v| v.name.clone()) else {
            return Ok(());
        };
        let mut name = name.trim().to_string();
        if name.is_empty() {
            return Err(UiError::invalid("Variable names cannot be empty.", ""));
        }
        if !is_identifier(&name) {
            let original = name.clone();
            name = strip_invalid(&name);
            if name.is_empty() {
                return Err(UiError::invalid(
                    format!("{original} is not a valid variable name."),
                    "",
                ));
            }
            if !is_identifier(&name) {
                name.insert(0, '_');
            }
            self.ctx.dialogs.info(
                &format!("{original} is not a valid variable name."),
                Some(&format!("I have changed it to {name} instead.")),
            );
        }
        if self.name_used_elsewhere(&name, row) {
            let original = name.clone();
            let suffix = (0..)
                .find(|i| !self.name_used_elsewhere(&format!("{original}{i}"), row))
                .unwrap_or(0);
            name = format!("{original}{suffix}");
            self.ctx.dialogs.info(
                &format!("Another variable is already using the name {original}."),
                Some(&format!("I will use {name} instead.")),
            );
        }
        if name != old {
            self.variables[row].name = name;
            self.ctx.set_dirty(true);
        }
        Ok(())
    }

    /// Packets a variable may point at: nothing, or anything in the document
    fn candidates(&self) -> Vec<Option<PacketRef>> {
        let mut out = vec![None];
        out.extend(self.packet.root().subtree().into_iter().map(Some));
        out
    }

    /// Move the value of the selected variable through the candidates
    pub fn cycle_value(&mut self, forward: bool) {
        let Some(var) = self.variables.get(self.selected) else {
            return;
        };
        let current = var.value.as_ref().and_then(|w| w.upgrade()).map(|p| p.id());
        let candidates = self.candidates();
        let pos = candidates
            .iter()
            .position(|c| c.as_ref().map(|p| p.id()) == current)
            .unwrap_or(0);
        let n = candidates.len();
        let next = if forward { (pos + 1) % n } else { (pos + n - 1) % n };
        self.variables[self.selected].value = candidates[next].as_ref().map(Rc::downgrade);
        self.ctx.set_dirty(true);
    }

    fn add_variable(&mut self) {
        let script = self.working_script();
        self.variables.push(ScriptVariable {
            name: script.fresh_variable_name(),
            value: None,
        });
        self.selected = self.variables.len() - 1;
        self.set_region(Region::Variables);
        self.ctx.set_dirty(true);
    }

    fn remove_variable(&mut self) -> Result<()> {
        let Some(var) = self.variables.get(self.selected) else {
            self.ctx.dialogs.sorry(
                "No variables are selected.",
                Some("Please select a variable to remove, then try again."),
            );
            return Ok(());
        };
        if !self.ctx.dialogs.confirm(
            &format!("The variable {} will be removed.", var.name),
            Some("Are you sure?"),
        ) {
            return Err(UiError::UserCancel);
        }
        self.variables.remove(self.selected);
        self.selected = self.selected.min(self.variables.len().saturating_sub(1));
        self.ctx.set_dirty(true);
        Ok(())
    }

    fn value_label(var: &ScriptVariable) -> String {
        match var.value.as_ref().and_then(|w| w.upgrade()) {
            None => "<None>".to_string(),
            Some(p) if p.label().is_empty() => "(no label)".to_string(),
            Some(p) => p.label(),
        }
    }

    fn handle_variables_key(&mut self, key: KeyEvent) -> Result<Handled> {
        if let Some(edit) = self.editing.as_mut() {
            match edit.handle_key(key) {
                LineOutcome::Submit => {
                    let value = edit.value().to_string();
                    self.editing = None;
                    self.rename_variable(self.selected, &value)?;
                }
                LineOutcome::Cancel => self.editing = None,
                LineOutcome::Editing | LineOutcome::Ignored => {}
            }
            return Ok(Handled::Yes);
        }

        let n = self.variables.len();
        match key.code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down if self.selected + 1 < n => self.selected += 1,
            KeyCode::Tab | KeyCode::BackTab => self.column = 1 - self.column,
            KeyCode::Enter if self.read_write && self.column == 0 && n > 0 => {
                self.editing = Some(LineEdit::new(self.variables[self.selected].name.clone()));
            }
            KeyCode::Left if self.read_write && self.column == 1 => self.cycle_value(false),
            KeyCode::Right | KeyCode::Enter if self.read_write && self.column == 1 => {
                self.cycle_value(true)
            }
            KeyCode::Insert if self.read_write => self.add_variable(),
            KeyCode::Delete if self.read_write => self.remove_variable()?,
            _ => return Ok(Handled::No),
        }
        Ok(Handled::Yes)
    }

    fn render_variables(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let focused = ctx.focused && self.region == Region::Variables;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border_for(focused)))
            .title(Span::styled(" Variables ", Style::default().fg(theme.title)));
        let inner = block.inner(area);
        let visible = inner.height.saturating_sub(1) as usize;
        follow(self.selected, &mut self.offset, visible);

        let rows: Vec<Row> = self
            .variables
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(visible)
            .map(|(i, var)| {
                let cells = [var.name.clone(), Self::value_label(var)]
                    .into_iter()
                    .enumerate()
                    .map(|(col, text)| {
                        let style = if focused && i == self.selected && col == self.column {
                            theme.selected()
                        } else {
                            Style::default().fg(theme.foreground)
                        };
                        Cell::from(text).style(style)
                    });
                Row::new(cells)
            })
            .collect();
        let header = Row::new(["Variable", "Value"]).style(header_style(theme));
        let widths = [Constraint::Length(NAME_WIDTH), Constraint::Length(VALUE_WIDTH)];
        f.render_widget(Table::new(rows, widths).header(header).block(block), area);

        if let Some(edit) = &self.editing {
            let rect = cell_rect(
                inner,
                &[NAME_WIDTH, VALUE_WIDTH],
                0,
                self.selected - self.offset + 1,
            );
            edit.render(f, rect, ctx);
        }
    }
}

impl PacketViewer for ScriptViewer {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let table_height = (self.variables.len() as u16 + 3).clamp(4, 10);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(table_height), Constraint::Min(1)])
            .split(area);
        self.render_variables(f, chunks[0], ctx);

        let body_ctx = RenderContext {
            focused: ctx.focused && self.region == Region::Body,
            ..*ctx
        };
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(ctx.theme.border_for(body_ctx.focused)))
            .title(Span::styled(" Script ", Style::default().fg(ctx.theme.title)));
        let inner = block.inner(chunks[1]);
        f.render_widget(block, chunks[1]);
        self.body.render(f, inner, &body_ctx);
    }

    fn refresh(&mut self) {
        let script = content_as(&self.packet, |c| match c {
            PacketContent::Script(s) => Some(s),
            _ => None,
        })
        .map(|s| (*s).clone())
        .unwrap_or_default();
        self.variables = script.variables;
        self.body.set_text(&script.text);
        self.selected = self.selected.min(self.variables.len().saturating_sub(1));
        self.editing = None;
    }

    fn is_editor(&self) -> bool {
        true
    }

    fn commit(&mut self) {
        let script = self.working_script();
        self.packet.edit_content(|c| {
            if let PacketContent::Script(s) = c {
                *s = script;
            }
        });
    }

    fn set_read_write(&mut self, read_write: bool) {
        self.read_write = read_write;
        self.body.set_read_only(!read_write);
        if !read_write {
            self.editing = None;
        }
        self.signal.emit();
    }

    fn edit_interface(&mut self) -> Option<&mut dyn EditInterface> {
        Some(self)
    }

    fn packet_type_actions(&self) -> Vec<ViewerAction> {
        vec![
            ViewerAction::new("add-var", "Add Var", ActionRequirement::None)
                .enabled(self.read_write),
            ViewerAction::new("remove-var", "Remove Var", ActionRequirement::None)
                .enabled(self.read_write && !self.variables.is_empty()),
            ViewerAction::new("run", "Run", ActionRequirement::TryCommit),
        ]
    }

    fn trigger_action(&mut self, id: &str) -> Result<()> {
        match id {
            "add-var" => self.add_variable(),
            "remove-var" => match self.remove_variable() {
                Err(UiError::UserCancel) => {}
                other => other?,
            },
            "run" => {
                tracing::info!("Run requested for script {}", self.packet.label());
                self.ctx.dialogs.info(
                    "This script cannot be run here.",
                    Some("No Python interpreter is attached to this workspace."),
                );
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled> {
        match (key.code, key.modifiers) {
            (KeyCode::Up, KeyModifiers::CONTROL) => {
                self.set_region(Region::Variables);
                return Ok(Handled::Yes);
            }
            (KeyCode::Down, KeyModifiers::CONTROL) => {
                self.set_region(Region::Body);
                return Ok(Handled::Yes);
            }
            _ => {}
        }
        match self.region {
            Region::Variables => self.handle_variables_key(key),
            Region::Body => {
                let handled = self.body.handle_key(key);
                if self.body.take_changed() {
                    self.ctx.set_dirty(true);
                }
                Ok(handled)
            }
        }
    }

    fn key_hints(&self) -> &'static str {
        match self.region {
            Region::Variables => "Ins add  Del remove  Enter rename  C-↓ script",
            Region::Body => "C-↑ variables",
        }
    }
}

impl EditInterface for ScriptViewer {
    fn cut_enabled(&self) -> bool {
        self.region == Region::Body && self.body.cut_enabled()
    }

    fn copy_enabled(&self) -> bool {
        match self.region {
            Region::Body => self.body.copy_enabled(),
            Region::Variables => !self.variables.is_empty(),
        }
    }

    fn paste_enabled(&self) -> bool {
        self.region == Region::Body && self.body.paste_enabled()
    }

    fn cut(&mut self, clipboard: &mut dyn Clipboard) {
        if self.region == Region::Body {
            self.body.cut(clipboard);
            if self.body.take_changed() {
                self.ctx.set_dirty(true);
            }
        }
    }

    fn copy(&mut self, clipboard: &mut dyn Clipboard) {
        match self.region {
            Region::Body => self.body.copy(clipboard),
            Region::Variables => {
                if let Some(var) = self.variables.get(self.selected) {
                    clipboard.set_text(&var.name);
                }
            }
        }
    }

    fn paste(&mut self, clipboard: &mut dyn Clipboard) {
        if self.region == Region::Body {
            self.body.paste(clipboard);
            if self.body.take_changed() {
                self.ctx.set_dirty(true);
            }
        }
    }

    fn states_changed(&self) -> &EditSignal {
        &self.signal
    }

    fn connect(&mut self, target: Option<EventSender<PaneEvent>>) {
        self.body.states_changed().connect(target.clone());
        self.signal.connect(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;
    use crate::ui::dialogs::DialogKind;
    use crate::ui::viewer::TestContext;

    fn script_packet(names: &[&str]) -> PacketRef {
        Packet::new(
            "script",
            PacketContent::Script(Script {
                text: "print(x)\n".to_string(),
                variables: names
                    .iter()
                    .map(|n| ScriptVariable {
                        name: n.to_string(),
                        value: None,
                    })
                    .collect(),
            }),
        )
    }

    fn viewer(packet: &PacketRef, t: &TestContext) -> ScriptViewer {
        let mut viewer = ScriptViewer::new(packet, &t.ctx);
        viewer.refresh();
        viewer
    }

    #[test]
    fn test_invalid_names_are_repaired() {
        let t = TestContext::new();
        let packet = script_packet(&["x", "y"]);
        let mut v = viewer(&packet, &t);

        v.rename_variable(1, "2 sides!").unwrap();
        assert_eq!(v.variable_names(), vec!["x", "_2sides"]);
        let record = t.dialogs.last().unwrap();
        assert_eq!(record.kind, DialogKind::Information);
        assert!(record.mentions("_2sides"));
        assert!(t.marked_dirty());

        assert!(matches!(
            v.rename_variable(0, "   "),
            Err(UiError::InvalidEdit { .. })
        ));
        assert!(matches!(
            v.rename_variable(0, "!!"),
            Err(UiError::InvalidEdit { .. })
        ));
        assert_eq!(v.variable_names()[0], "x");
    }

    #[test]
    fn test_clashing_name_gets_free_suffix() {
        let t = TestContext::new();
        let packet = script_packet(&["tri", "tri0", "other"]);
        let mut v = viewer(&packet, &t);

        v.rename_variable(2, "tri").unwrap();
        assert_eq!(v.variable_names(), vec!["tri", "tri0", "tri1"]);
        assert!(t.dialogs.last().unwrap().mentions("already using the name tri"));
    }

    #[test]
    fn test_add_and_remove_variable() {
        let t = TestContext::new();
        let packet = script_packet(&["var0"]);
        let mut v = viewer(&packet, &t);

        v.trigger_action("add-var").unwrap();
        assert_eq!(v.variable_names(), vec!["var0", "var1"]);
        assert_eq!(v.region(), Region::Variables);

        t.dialogs.push_answer(false);
        v.trigger_action("remove-var").unwrap();
        assert_eq!(v.variable_names().len(), 2);

        t.dialogs.push_answer(true);
        v.trigger_action("remove-var").unwrap();
        assert_eq!(v.variable_names(), vec!["var0"]);

        v.commit();
        match &*packet.content() {
            PacketContent::Script(s) => assert_eq!(s.variables.len(), 1),
            _ => panic!("not a script"),
        };
    }

    #[test]
    fn test_variables_table_follows_selection() {
        let t = TestContext::new();
        let names: Vec<String> = (0..20).map(|i| format!("v{i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let packet = script_packet(&names);
        let mut v = viewer(&packet, &t);
        v.set_region(Region::Variables);
        for _ in 0..19 {
            v.handle_key(KeyEvent::from(KeyCode::Down)).unwrap();
        }
        v.handle_key(KeyEvent::from(KeyCode::Enter)).unwrap();
        assert!(v.editing.is_some());

        let theme = crate::ui::theme::Theme::default();
        let ctx = RenderContext {
            theme: &theme,
            focused: true,
            animation_frame: 0,
        };
        let backend = ratatui::backend::TestBackend::new(40, 20);
        let mut terminal = ratatui::Terminal::new(backend).expect("test terminal");
        terminal
            .draw(|f| v.render(f, f.area(), &ctx))
            .expect("draw");

        // Ten rows for the table leave seven for variables under the header
        assert_eq!(v.offset, 13);

        v.handle_key(KeyEvent::from(KeyCode::Esc)).unwrap();
        assert!(v.editing.is_none());
        for _ in 0..19 {
            v.handle_key(KeyEvent::from(KeyCode::Up)).unwrap();
        }
        terminal
            .draw(|f| v.render(f, f.area(), &ctx))
            .expect("draw");
        assert_eq!(v.offset, 0);
    }

    #[test]
    fn test_value_cycles_through_document() {
        let t = TestContext::new();
        let root = Packet::new("root", PacketContent::Container);
        let packet = script_packet(&["x"]);
        root.insert_child_last(packet.clone());
        let mut v = viewer(&packet, &t);
        v.set_region(Region::Variables);

        v.cycle_value(true);
        assert_eq!(ScriptViewer::value_label(&v.variables[0]), "root");
        v.cycle_value(false);
        assert_eq!(ScriptViewer::value_label(&v.variables[0]), "<None>");
    }

    #[test]
    fn test_run_reports_missing_interpreter() {
        let t = TestContext::new();
        let packet = script_packet(&[]);
        let mut v = viewer(&packet, &t);
        v.trigger_action("run").unwrap();
        assert!(t.dialogs.last().unwrap().mentions("no python interpreter"));
    }
}
