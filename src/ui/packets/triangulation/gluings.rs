//! Facet gluing editor
//!
//! One row per simplex, one column per facet. A cell reads `5 (032)`: this
//! facet is glued to simplex 5, and the facet's vertices (in increasing
//! order) map to vertices 0, 3 and 2 of simplex 5. An empty cell is
//! boundary.
//!
//! Edits go into a working copy of the triangulation; [`commit`] replaces
//! the packet's triangulation in one change span, so listeners see a single
//! notification however many cells were edited.
//!
//! [`commit`]: PacketViewer::commit

use crate::error::{Result, UiError};
use crate::packet::perm::Perm;
use crate::packet::triangulation::{Gluing, Triangulation};
use crate::packet::{PacketContent, PacketRef};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Cell, Row, Table},
    Frame,
};
use regex::Regex;
use std::sync::OnceLock;

use super::{capitalised, facet_name, simplex_name, triangulation};
use crate::ui::clipboard::Clipboard;
use crate::ui::packets::{cell_rect, follow, header_style};
use crate::ui::text_area::{LineEdit, LineOutcome};
use crate::ui::traits::{EditInterface, EditSignal, Handled, RenderContext};
use crate::ui::viewer::{ActionRequirement, PacketViewer, PaneContext, ViewerAction};

const INDEX_WIDTH: u16 = 5;
const DESCRIPTION_WIDTH: u16 = 20;
const GLUING_WIDTH: u16 = 10;

/// Matches `simplex (vertices)`, capturing both parts
fn gluing_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s*\(([^)]*)\)$").ok())
        .as_ref()
}

pub struct GluingsEditor {
    packet: PacketRef,
    ctx: PaneContext,
    working: Triangulation,
    row: usize,
    column: usize,
    offset: usize,
    editing: Option<LineEdit>,
    read_write: bool,
    signal: EditSignal,
}

impl GluingsEditor {
    pub fn new(packet: &PacketRef, ctx: &PaneContext) -> Self {
        let working = triangulation(packet)
            .map(|t| t.clone())
            .unwrap_or_else(|| Triangulation::new(3));
        Self {
            packet: packet.clone(),
            ctx: ctx.clone(),
            working,
            row: 0,
            column: 0,
            offset: 0,
            editing: None,
            read_write: true,
            signal: EditSignal::new(),
        }
    }

    fn dim(&self) -> usize {
        self.working.dim()
    }

    /// The uncommitted triangulation
    pub fn working(&self) -> &Triangulation {
        &self.working
    }

    pub fn column_count(&self) -> usize {
        self.dim() + 2
    }

    /// Facet shown in a column, or `None` for the description column
    fn facet_for_column(&self, column: usize) -> Option<usize> {
        (1..self.column_count())
            .contains(&column)
            .then(|| self.dim() + 1 - column)
    }

    pub fn column_title(&self, column: usize) -> String {
        let dim = self.dim();
        match self.facet_for_column(column) {
            None => capitalised(simplex_name(dim)),
            Some(facet) => {
                let vertices: String = Perm::facet_ordering(dim, facet)
                    .image_string()
                    .chars()
                    .take(dim)
                    .collect();
                format!("{} {vertices}", capitalised(facet_name(dim)))
            }
        }
    }

    pub fn select(&mut self, row: usize, column: usize) {
        self.row = row.min(self.working.size().saturating_sub(1));
        self.column = column.min(self.column_count() - 1);
        self.signal.emit();
    }

    pub fn cell_text(&self, row: usize, column: usize) -> String {
        if row >= self.working.size() {
            return String::new();
        }
        match self.facet_for_column(column) {
            None => self.working.simplex(row).description.clone(),
            Some(facet) => match self.working.adjacent(row, facet) {
                Some(gluing) => Self::gluing_text(self.dim(), facet, &gluing),
                None => String::new(),
            },
        }
    }

    fn gluing_text(dim: usize, facet: usize, gluing: &Gluing) -> String {
        let images: String = gluing
            .perm
            .compose(&Perm::facet_ordering(dim, facet))
            .image_string()
            .chars()
            .take(dim)
            .collect();
        format!("{} ({images})", gluing.simplex)
    }

    fn invalid(detail: impl Into<String>) -> UiError {
        UiError::invalid("This is not a valid gluing.", detail)
    }

    /// Parse a cell's text into the gluing it describes for `facet` of `row`
    ///
    /// Either `dim` vertices (the last is inferred) or all `dim + 1` may be
    /// given. Empty text means boundary.
    pub fn parse_gluing(&self, row: usize, facet: usize, text: &str) -> Result<Option<Gluing>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let dim = self.dim();
        let simplex = simplex_name(dim);
        let facet_word = facet_name(dim);

        let example = match dim {
            2 => "10",
            3 => "032",
            _ => "0342",
        };
        let captures = gluing_pattern().and_then(|re| re.captures(text)).ok_or_else(|| {
            Self::invalid(format!(
                "The {facet_word} gluing should be of the form: {simplex} ({facet_word}). \
                 An example is 5 ({example}), which represents {facet_word} {example} \
                 of {simplex} 5."
            ))
        })?;
        let number = &captures[1];
        let dest: usize = number
            .parse()
            .ok()
            .filter(|n| *n < self.working.size())
            .ok_or_else(|| Self::invalid(format!("There is no {simplex} number {number}.")))?;

        let vertices: String = captures[2].chars().filter(|c| !c.is_whitespace()).collect();
        let bad_face = |reason: &str| {
            Self::invalid(format!(
                "{vertices} is not a valid {simplex} {facet_word}. {reason}"
            ))
        };
        let mut images = Vec::with_capacity(dim + 1);
        for c in vertices.chars() {
            match c.to_digit(10) {
                Some(d) if (d as usize) <= dim => images.push(d as u8),
                _ => {
                    return Err(bad_face(&format!(
                        "Each vertex must be between 0 and {dim} inclusive."
                    )))
                }
            }
        }
        if images.len() == dim {
            if let Some(missing) = (0..=dim as u8).find(|v| !images.contains(v)) {
                images.push(missing);
            }
        }
        if images.len() != dim + 1 {
            return Err(bad_face(&format!(
                "A {simplex} {facet_word} must be described by a sequence of {dim} vertices."
            )));
        }
        let full = Perm::from_images(&images)
            .ok_or_else(|| bad_face("The vertices must be distinct."))?;

        let perm = full.compose(&Perm::facet_ordering(dim, facet).inverse());
        if dest == row && perm.apply(facet) == facet {
            return Err(Self::invalid(format!(
                "A {facet_word} cannot be glued to itself."
            )));
        }
        Ok(Some(Gluing {
            simplex: dest,
            perm,
        }))
    }

    /// Apply an edit to one cell of the working copy
    ///
    /// Returns whether anything changed. Invalid gluings leave the working
    /// copy untouched.
    pub fn set_cell(&mut self, row: usize, column: usize, text: &str) -> Result<bool> {
        if row >= self.working.size() {
            return Ok(false);
        }
        let Some(facet) = self.facet_for_column(column) else {
            let description = text.trim();
            if description == self.working.simplex(row).description {
                return Ok(false);
            }
            self.working.set_description(row, description);
            self.ctx.set_dirty(true);
            return Ok(true);
        };

        let gluing = self.parse_gluing(row, facet, text)?;
        if gluing == self.working.adjacent(row, facet) {
            return Ok(false);
        }

        self.working.unjoin(row, facet);
        if let Some(gluing) = gluing {
            let partner_facet = gluing.perm.apply(facet);
            self.working.unjoin(gluing.simplex, partner_facet);
            self.working.join(row, facet, gluing.simplex, gluing.perm);
        }
        tracing::debug!(
            "Gluing of {} {} facet {} set to {:?}",
            simplex_name(self.dim()),
            row,
            facet,
            gluing
        );
        self.ctx.set_dirty(true);
        Ok(true)
    }

    fn add_simplex(&mut self) {
        self.packet.edit_content(|c| {
            if let PacketContent::Triangulation(t) = c {
                t.add_simplex("");
            }
        });
    }

    fn remove_simplex(&mut self) -> Result<()> {
        let dim = self.dim();
        if self.working.is_empty() {
            self.ctx.dialogs.sorry(
                &format!("No {} are selected.", super::simplex_plural(dim)),
                Some(&format!(
                    "Please select a {} to remove, then try again.",
                    simplex_name(dim)
                )),
            );
            return Ok(());
        }
        let row = self.row;
        if !self.ctx.dialogs.confirm(
            &format!(
                "{} number {row} will be removed.",
                capitalised(simplex_name(dim))
            ),
            Some("Are you sure?"),
        ) {
            return Err(UiError::UserCancel);
        }
        self.packet.edit_content(|c| {
            if let PacketContent::Triangulation(t) = c {
                if row < t.size() {
                    t.remove_simplex(row);
                }
            }
        });
        Ok(())
    }

    fn begin_edit(&mut self) {
        if self.read_write && !self.working.is_empty() {
            self.editing = Some(LineEdit::new(self.cell_text(self.row, self.column)));
        }
    }

    fn submit(&mut self, text: &str) -> Result<()> {
        self.set_cell(self.row, self.column, text)?;
        Ok(())
    }
}

impl PacketViewer for GluingsEditor {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let columns = self.column_count();
        let mut widths = vec![INDEX_WIDTH, DESCRIPTION_WIDTH];
        widths.extend(std::iter::repeat(GLUING_WIDTH).take(columns - 1));

        let visible = area.height.saturating_sub(1) as usize;
        follow(self.row, &mut self.offset, visible);

        let header = Row::new(
            std::iter::once(String::new()).chain((0..columns).map(|c| self.column_title(c))),
        )
        .style(header_style(theme));

        let rows: Vec<Row> = (self.offset..self.working.size())
            .take(visible)
            .map(|row| {
                let index = Cell::from(row.to_string()).style(Style::default().fg(theme.muted));
                let cells = (0..columns).map(|col| {
                    let style = if ctx.focused && row == self.row && col == self.column {
                        theme.selected()
                    } else {
                        Style::default().fg(theme.foreground)
                    };
                    Cell::from(self.cell_text(row, col)).style(style)
                });
                Row::new(std::iter::once(index).chain(cells))
            })
            .collect();

        let constraints: Vec<Constraint> = widths.iter().map(|w| Constraint::Length(*w)).collect();
        f.render_widget(Table::new(rows, constraints).header(header), area);

        if let Some(edit) = &self.editing {
            let rect = cell_rect(area, &widths, self.column + 1, self.row - self.offset + 1);
            edit.render(f, rect, ctx);
        }
    }

    fn refresh(&mut self) {
        if let Some(tri) = triangulation(&self.packet) {
            self.working = tri.clone();
        }
        self.row = self.row.min(self.working.size().saturating_sub(1));
        self.editing = None;
        self.signal.emit();
    }

    fn is_editor(&self) -> bool {
        true
    }

    fn commit(&mut self) {
        let working = self.working.clone();
        self.packet.edit_content(|c| {
            if let PacketContent::Triangulation(t) = c {
                *t = working;
            }
        });
    }

    fn set_read_write(&mut self, read_write: bool) {
        self.read_write = read_write;
        if !read_write {
            self.editing = None;
        }
        self.signal.emit();
    }

    fn edit_interface(&mut self) -> Option<&mut dyn EditInterface> {
        Some(self)
    }

    fn packet_type_actions(&self) -> Vec<ViewerAction> {
        let name = capitalised(simplex_name(self.dim()));
        vec![
            ViewerAction::new(
                "add-simplex",
                format!("Add {name}"),
                ActionRequirement::CommitToModify,
            )
            .enabled(self.read_write),
            ViewerAction::new(
                "remove-simplex",
                format!("Remove {name}"),
                ActionRequirement::CommitToModify,
            )
            .enabled(self.read_write && !self.working.is_empty()),
        ]
    }

    fn trigger_action(&mut self, id: &str) -> Result<()> {
        match id {
            "add-simplex" => self.add_simplex(),
            "remove-simplex" => self.remove_simplex()?,
            _ => tracing::debug!("Gluings editor ignored action {}", id),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled> {
        if let Some(edit) = self.editing.as_mut() {
            match edit.handle_key(key) {
                LineOutcome::Submit => {
                    let text = edit.value().to_string();
                    self.editing = None;
                    self.submit(&text)?;
                }
                LineOutcome::Cancel => self.editing = None,
                LineOutcome::Editing | LineOutcome::Ignored => {}
            }
            return Ok(Handled::Yes);
        }

        let rows = self.working.size();
        let columns = self.column_count();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select(self.row.saturating_sub(1), self.column),
            KeyCode::Down | KeyCode::Char('j') if self.row + 1 < rows => {
                self.select(self.row + 1, self.column)
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.select(self.row, self.column.saturating_sub(1))
            }
            KeyCode::Right | KeyCode::Char('l') if self.column + 1 < columns => {
                self.select(self.row, self.column + 1)
            }
            KeyCode::Home => self.select(0, self.column),
            KeyCode::End => self.select(rows.saturating_sub(1), self.column),
            KeyCode::Enter => self.begin_edit(),
            KeyCode::Delete | KeyCode::Backspace if self.read_write => {
                self.submit("")?;
            }
            _ => return Ok(Handled::No),
        }
        Ok(Handled::Yes)
    }

    fn key_hints(&self) -> &'static str {
        "Enter edit  Del unglue"
    }
}

impl EditInterface for GluingsEditor {
    fn cut_enabled(&self) -> bool {
        self.read_write && !self.cell_text(self.row, self.column).is_empty()
    }

    fn copy_enabled(&self) -> bool {
        !self.cell_text(self.row, self.column).is_empty()
    }

    fn paste_enabled(&self) -> bool {
        self.read_write && !self.working.is_empty()
    }

    fn cut(&mut self, clipboard: &mut dyn Clipboard) {
        self.copy(clipboard);
        if let Err(e) = self.submit("") {
            self.ctx.report(&e);
        }
        self.signal.emit();
    }

    fn copy(&mut self, clipboard: &mut dyn Clipboard) {
        let text = self.cell_text(self.row, self.column);
        if !text.is_empty() {
            clipboard.set_text(&text);
        }
    }

    fn paste(&mut self, clipboard: &mut dyn Clipboard) {
        let Some(text) = clipboard.get_text() else {
            return;
        };
        let line = text.lines().next().unwrap_or_default().to_string();
        if let Err(e) = self.submit(&line) {
            self.ctx.report(&e);
        }
        self.signal.emit();
    }

    fn states_changed(&self) -> &EditSignal {
        &self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;
    use crate::ui::clipboard::MemoryClipboard;
    use crate::ui::viewer::TestContext;

    fn two_tetrahedra() -> PacketRef {
        let mut tri = Triangulation::new(3);
        tri.add_simplex("first");
        tri.add_simplex("second");
        Packet::new("pair", PacketContent::Triangulation(tri))
    }

    #[test]
    fn test_column_titles() {
        let t = TestContext::new();
        let editor = GluingsEditor::new(&two_tetrahedra(), &t.ctx);
        assert_eq!(editor.column_title(0), "Tetrahedron");
        assert_eq!(editor.column_title(1), "Face 012");
        assert_eq!(editor.column_title(4), "Face 123");
    }

    #[test]
    fn test_short_form_gluing_round_trips_through_cell_text() {
        let t = TestContext::new();
        let mut editor = GluingsEditor::new(&two_tetrahedra(), &t.ctx);

        // Face 012 of tetrahedron 0 onto face 013 of tetrahedron 1
        assert_eq!(editor.set_cell(0, 1, "1 (013)"), Ok(true));
        assert!(t.marked_dirty());
        assert_eq!(editor.cell_text(0, 1), "1 (013)");

        // The partner facet (vertex 2 missing, so facet 2 = column 2)
        assert_eq!(editor.cell_text(1, 2), "0 (012)");
        assert_eq!(editor.working().boundary_facets(), 6);
    }

    #[test]
    fn test_full_form_and_unchanged_edit() {
        let t = TestContext::new();
        let mut editor = GluingsEditor::new(&two_tetrahedra(), &t.ctx);
        assert_eq!(editor.set_cell(0, 1, "1 (0123)"), Ok(true));
        t.events.drain();

        assert_eq!(editor.set_cell(0, 1, "1 (012)"), Ok(false));
        assert!(!t.marked_dirty());
    }

    #[test]
    fn test_self_gluing_is_rejected() {
        let t = TestContext::new();
        let mut editor = GluingsEditor::new(&two_tetrahedra(), &t.ctx);
        let err = editor.set_cell(0, 1, "0 (012)").unwrap_err();
        assert_eq!(
            err,
            UiError::invalid("This is not a valid gluing.", "A face cannot be glued to itself.")
        );
        assert_eq!(editor.working().boundary_facets(), 8);
    }

    #[test]
    fn test_bad_input_messages() {
        let t = TestContext::new();
        let mut editor = GluingsEditor::new(&two_tetrahedra(), &t.ctx);
        let detail = |e: UiError| e.detail().unwrap_or_default();

        assert!(detail(editor.set_cell(0, 1, "7 (012)").unwrap_err())
            .contains("There is no tetrahedron number 7."));
        assert!(detail(editor.set_cell(0, 1, "1 (015)").unwrap_err())
            .contains("between 0 and 3"));
        assert!(detail(editor.set_cell(0, 1, "1 (011)").unwrap_err()).contains("distinct"));
        assert!(detail(editor.set_cell(0, 1, "banana").unwrap_err()).contains("5 (032)"));
    }

    #[test]
    fn test_regluing_breaks_the_old_partner() {
        let t = TestContext::new();
        let mut editor = GluingsEditor::new(&two_tetrahedra(), &t.ctx);
        editor.set_cell(0, 1, "1 (012)").unwrap();
        // Glue face 013 of tetrahedron 0 onto the same face of tetrahedron 1
        editor.set_cell(0, 2, "1 (012)").unwrap();

        assert_eq!(editor.cell_text(0, 1), "");
        assert_eq!(editor.cell_text(0, 2), "1 (012)");
        assert_eq!(editor.working().boundary_facets(), 6);
    }

    #[test]
    fn test_commit_writes_working_copy_once() {
        let t = TestContext::new();
        let packet = two_tetrahedra();
        let mut editor = GluingsEditor::new(&packet, &t.ctx);
        editor.set_cell(0, 0, "renamed").unwrap();
        editor.set_cell(0, 1, "1 (012)").unwrap();
        assert_eq!(triangulation(&packet).unwrap().boundary_facets(), 8);

        editor.commit();
        let tri = triangulation(&packet).unwrap();
        assert_eq!(tri.boundary_facets(), 6);
        assert_eq!(tri.simplex(0).description, "renamed");
    }

    #[test]
    fn test_cut_then_paste_moves_a_gluing() {
        let t = TestContext::new();
        let mut editor = GluingsEditor::new(&two_tetrahedra(), &t.ctx);
        editor.set_cell(0, 1, "1 (013)").unwrap();
        let mut clipboard = MemoryClipboard::new();

        editor.select(0, 1);
        editor.cut(&mut clipboard);
        assert_eq!(editor.cell_text(0, 1), "");

        editor.select(0, 3);
        editor.paste(&mut clipboard);
        assert_eq!(editor.cell_text(0, 3), "1 (013)");
    }

    #[test]
    fn test_remove_simplex_confirms() {
        let t = TestContext::new();
        let packet = two_tetrahedra();
        let mut editor = GluingsEditor::new(&packet, &t.ctx);

        t.dialogs.push_answer(false);
        assert_eq!(editor.trigger_action("remove-simplex"), Err(UiError::UserCancel));
        assert!(t
            .dialogs
            .last()
            .is_some_and(|r| r.mentions("Tetrahedron number 0 will be removed.")));
        assert_eq!(triangulation(&packet).unwrap().size(), 2);

        t.dialogs.push_answer(true);
        assert_eq!(editor.trigger_action("remove-simplex"), Ok(()));
        assert_eq!(triangulation(&packet).unwrap().size(), 1);
    }
}
