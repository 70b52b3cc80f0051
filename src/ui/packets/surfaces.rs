//! Normal surface list viewer
//!
//! A tabbed composite: a summary of surface counts by topology, and a
//! coordinate table where surfaces can be renamed and a surface filter from
//! elsewhere in the tree can be applied.

use crate::config::TabFamily;
use crate::error::Result;
use crate::packet::{NormalSurface, PacketContent, PacketRef, PacketType, SurfaceList};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Line,
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};
use std::cell::Ref;
use std::collections::BTreeMap;

use super::{cell_rect, content_as, field_line, follow, header_style, wrong_content};
use crate::ui::clipboard::Clipboard;
use crate::ui::tabbed::TabbedViewer;
use crate::ui::text_area::{LineEdit, LineOutcome};
use crate::ui::traits::{EditInterface, EditSignal, Handled, RenderContext};
use crate::ui::viewer::{
    render_message, ActionRequirement, PacketViewer, PaneContext, ViewerAction,
};

fn surface_list(packet: &PacketRef) -> Option<Ref<'_, SurfaceList>> {
    content_as(packet, |c| match c {
        PacketContent::NormalSurfaces(list) => Some(list),
        _ => None,
    })
}

pub fn create(packet: &PacketRef, ctx: &PaneContext) -> Result<Box<dyn PacketViewer>> {
    if surface_list(packet).is_none() {
        return Err(wrong_content(packet, "a normal surface list"));
    }
    let mut tabs = TabbedViewer::new(packet, ctx.prefs.clone(), Some(TabFamily::NormalSurfaces));
    tabs.set_header(Box::new(SurfacesHeader {
        packet: packet.clone(),
        text: String::new(),
    }));
    tabs.add_tab("Summary", Box::new(SurfaceSummary::new(packet)));
    tabs.add_editor_tab("Coordinates", Box::new(CoordinateTable::new(packet, ctx)));
    Ok(Box::new(tabs))
}

struct SurfacesHeader {
    packet: PacketRef,
    text: String,
}

impl PacketViewer for SurfacesHeader {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        f.render_widget(
            Paragraph::new(Line::styled(self.text.clone(), ctx.theme.selected())),
            area,
        );
    }

    fn refresh(&mut self) {
        if let Some(list) = surface_list(&self.packet) {
            let n = list.surfaces.len();
            self.text = format!(
                "{n} {}normal surface{} ({})",
                if list.embedded_only { "embedded " } else { "" },
                if n == 1 { "" } else { "s" },
                list.coords
            );
        }
    }
}

/// Counts of surfaces, broken down by topology
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceCounts {
    pub closed: usize,
    pub bounded: usize,
    pub spun: usize,
    /// Closed compact surfaces by Euler characteristic: (orientable, non-orientable)
    pub by_euler: BTreeMap<i64, (usize, usize)>,
}

impl SurfaceCounts {
    pub fn of(surfaces: &[NormalSurface]) -> Self {
        let mut counts = Self::default();
        for s in surfaces {
            if !s.compact {
                counts.spun += 1;
                continue;
            }
            if s.has_boundary {
                counts.bounded += 1;
                continue;
            }
            counts.closed += 1;
            if let Some(chi) = s.euler {
                let entry = counts.by_euler.entry(chi).or_default();
                if s.orientable.unwrap_or(false) {
                    entry.0 += 1;
                } else {
                    entry.1 += 1;
                }
            }
        }
        counts
    }
}

pub struct SurfaceSummary {
    packet: PacketRef,
    counts: SurfaceCounts,
}

impl SurfaceSummary {
    pub fn new(packet: &PacketRef) -> Self {
        Self {
            packet: packet.clone(),
            counts: SurfaceCounts::default(),
        }
    }

    pub fn counts(&self) -> &SurfaceCounts {
        &self.counts
    }
}

impl PacketViewer for SurfaceSummary {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let c = &self.counts;
        let mut lines = vec![
            Line::raw(""),
            field_line(theme, "Closed compact", c.closed.to_string()),
            field_line(theme, "Bounded compact", c.bounded.to_string()),
            field_line(theme, "Non-compact (spun)", c.spun.to_string()),
            Line::raw(""),
        ];
        for (chi, (orientable, non_orientable)) in &c.by_euler {
            lines.push(field_line(
                theme,
                &format!("  Euler {chi}"),
                format!("{orientable} orientable, {non_orientable} non-orientable"),
            ));
        }
        f.render_widget(Paragraph::new(lines), area);
    }

    fn refresh(&mut self) {
        self.counts = surface_list(&self.packet)
            .map(|l| SurfaceCounts::of(&l.surfaces))
            .unwrap_or_default();
    }
}

/// Whether `filter_packet` accepts `surface`
///
/// Combination filters consult the filter packets among their children.
pub fn filter_accepts(filter_packet: &PacketRef, surface: &NormalSurface) -> bool {
    use crate::packet::SurfaceFilter;
    let filter = match &*filter_packet.content() {
        PacketContent::SurfaceFilter(f) => f.clone(),
        _ => return true,
    };
    match filter {
        SurfaceFilter::Trivial => true,
        SurfaceFilter::Properties(props) => props.accepts(surface),
        SurfaceFilter::Combination { use_and } => {
            let children: Vec<PacketRef> = filter_packet
                .children()
                .into_iter()
                .filter(|c| c.packet_type() == PacketType::SurfaceFilter)
                .collect();
            if use_and {
                children.iter().all(|c| filter_accepts(c, surface))
            } else {
                children.iter().any(|c| filter_accepts(c, surface))
            }
        }
    }
}

const FIXED_COLUMNS: [(&str, u16); 5] =
    [("#", 4), ("Name", 16), ("Euler", 6), ("Orient", 7), ("Bdry", 5)];
const COORD_WIDTH: u16 = 4;

pub struct CoordinateTable {
    packet: PacketRef,
    ctx: PaneContext,
    surfaces: Vec<NormalSurface>,
    filter: Option<PacketRef>,
    selected: usize,
    offset: usize,
    editing: Option<LineEdit>,
    read_write: bool,
    copy_json: bool,
    signal: EditSignal,
}

impl CoordinateTable {
    pub fn new(packet: &PacketRef, ctx: &PaneContext) -> Self {
        Self {
            packet: packet.clone(),
            ctx: ctx.clone(),
            surfaces: Vec::new(),
            filter: None,
            selected: 0,
            offset: 0,
            editing: None,
            read_write: true,
            copy_json: false,
            signal: EditSignal::new(),
        }
    }

    /// Indices of the surfaces that pass the current filter
    pub fn visible(&self) -> Vec<usize> {
        (0..self.surfaces.len())
            .filter(|&i| {
                self.filter
                    .as_ref()
                    .map_or(true, |f| filter_accepts(f, &self.surfaces[i]))
            })
            .collect()
    }

    pub fn surface_name(&self, index: usize) -> Option<&str> {
        self.surfaces.get(index).map(|s| s.name.as_str())
    }

    pub fn filter_label(&self) -> String {
        self.filter
            .as_ref()
            .map_or_else(|| "None".to_string(), |f| f.label())
    }

    /// Move to the next surface filter in the document, or back to none
    pub fn cycle_filter(&mut self) {
        let filters: Vec<PacketRef> = self
            .packet
            .root()
            .subtree()
            .into_iter()
            .filter(|p| p.packet_type() == PacketType::SurfaceFilter)
            .collect();
        let current = self
            .filter
            .as_ref()
            .and_then(|f| filters.iter().position(|c| c.id() == f.id()));
        self.filter = match current {
            None => filters.first().cloned(),
            Some(i) => filters.get(i + 1).cloned(),
        };
        self.selected = 0;
        self.offset = 0;
        tracing::debug!("Surface filter now {}", self.filter_label());
    }

    /// Rename the surface at `index` in the working copy
    pub fn rename(&mut self, index: usize, name: &str) {
        let name = name.trim();
        if let Some(surface) = self.surfaces.get_mut(index) {
            if surface.name != name {
                surface.name = name.to_string();
                self.ctx.set_dirty(true);
            }
        }
    }

    fn selected_surface(&self) -> Option<usize> {
        self.visible().get(self.selected).copied()
    }

    fn row_text(&self, index: usize) -> String {
        let s = &self.surfaces[index];
        let mut fields = vec![
            s.name.clone(),
            s.euler.map_or_else(String::new, |e| e.to_string()),
        ];
        fields.extend(s.coords.iter().map(i64::to_string));
        fields.join("\t")
    }

    /// One surface as a JSON object, for pasting into other programs
    fn row_json(&self, index: usize) -> String {
        let s = &self.surfaces[index];
        serde_json::json!({
            "index": index,
            "name": s.name,
            "euler": s.euler,
            "orientable": s.orientable,
            "compact": s.compact,
            "boundary": s.has_boundary,
            "coords": s.coords,
        })
        .to_string()
    }
}

fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "",
    }
}

impl PacketViewer for CoordinateTable {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let visible = self.visible();
        if visible.is_empty() {
            let body = if self.surfaces.is_empty() {
                ""
            } else {
                "No surfaces pass the current filter."
            };
            render_message(f, area, ctx, "No surfaces to show.", body);
            return;
        }
        let coords = self.surfaces[0].coords.len();
        let mut widths: Vec<u16> = FIXED_COLUMNS.iter().map(|(_, w)| *w).collect();
        widths.extend(std::iter::repeat(COORD_WIDTH).take(coords));

        let height = area.height.saturating_sub(1) as usize;
        follow(self.selected, &mut self.offset, height);

        let header = Row::new(
            FIXED_COLUMNS
                .iter()
                .map(|(t, _)| t.to_string())
                .chain((0..coords).map(|i| i.to_string())),
        )
        .style(header_style(theme));

        let rows: Vec<Row> = visible
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(height)
            .map(|(pos, &i)| {
                let s = &self.surfaces[i];
                let mut cells = vec![
                    i.to_string(),
                    s.name.clone(),
                    s.euler.map_or_else(String::new, |e| e.to_string()),
                    flag(s.orientable).to_string(),
                    flag(Some(s.has_boundary)).to_string(),
                ];
                cells.extend(s.coords.iter().map(i64::to_string));
                let style = if pos == self.selected {
                    theme.selected()
                } else {
                    Style::default().fg(theme.foreground)
                };
                Row::new(cells.into_iter().map(Cell::from)).style(style)
            })
            .collect();

        let constraints: Vec<Constraint> = widths.iter().map(|w| Constraint::Length(*w)).collect();
        f.render_widget(Table::new(rows, constraints).header(header), area);

        if let Some(edit) = &self.editing {
            let rect = cell_rect(area, &widths, 1, self.selected - self.offset + 1);
            edit.render(f, rect, ctx);
        }
    }

    fn refresh(&mut self) {
        self.surfaces = surface_list(&self.packet)
            .map(|l| l.surfaces.clone())
            .unwrap_or_default();
        if self.filter.as_ref().is_some_and(|f| f.is_destroyed()) {
            self.filter = None;
        }
        self.selected = self.selected.min(self.visible().len().saturating_sub(1));
        self.editing = None;
        self.signal.emit();
    }

    fn is_editor(&self) -> bool {
        true
    }

    fn commit(&mut self) {
        let names: Vec<String> = self.surfaces.iter().map(|s| s.name.clone()).collect();
        self.packet.edit_content(|c| {
            if let PacketContent::NormalSurfaces(list) = c {
                for (surface, name) in list.surfaces.iter_mut().zip(names) {
                    surface.name = name;
                }
            }
        });
    }

    fn set_read_write(&mut self, read_write: bool) {
        self.read_write = read_write;
        if !read_write {
            self.editing = None;
        }
    }

    fn edit_interface(&mut self) -> Option<&mut dyn EditInterface> {
        Some(self)
    }

    fn packet_type_actions(&self) -> Vec<ViewerAction> {
        vec![
            ViewerAction::new(
                "cycle-filter",
                format!("Filter: {}", self.filter_label()),
                ActionRequirement::None,
            ),
            ViewerAction::new(
                "copy-format",
                if self.copy_json { "Copy as: JSON" } else { "Copy as: text" },
                ActionRequirement::None,
            ),
        ]
    }

    fn trigger_action(&mut self, id: &str) -> Result<()> {
        match id {
            "cycle-filter" => {
                self.cycle_filter();
                self.signal.emit();
            }
            "copy-format" => self.copy_json = !self.copy_json,
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled> {
        if let Some(edit) = self.editing.as_mut() {
            match edit.handle_key(key) {
                LineOutcome::Submit => {
                    let name = edit.value().to_string();
                    self.editing = None;
                    if let Some(index) = self.selected_surface() {
                        self.rename(index, &name);
                    }
                }
                LineOutcome::Cancel => self.editing = None,
                LineOutcome::Editing | LineOutcome::Ignored => {}
            }
            return Ok(Handled::Yes);
        }
        let n = self.visible().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') if self.selected + 1 < n => self.selected += 1,
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = n.saturating_sub(1),
            KeyCode::Enter if self.read_write => {
                if let Some(index) = self.selected_surface() {
                    self.editing = Some(LineEdit::new(self.surfaces[index].name.clone()));
                }
            }
            _ => return Ok(Handled::No),
        }
        self.signal.emit();
        Ok(Handled::Yes)
    }

    fn key_hints(&self) -> &'static str {
        "Enter rename"
    }
}

impl EditInterface for CoordinateTable {
    fn copy_enabled(&self) -> bool {
        self.selected_surface().is_some()
    }

    fn copy(&mut self, clipboard: &mut dyn Clipboard) {
        if let Some(index) = self.selected_surface() {
            let text = if self.copy_json {
                self.row_json(index)
            } else {
                self.row_text(index)
            };
            clipboard.set_text(&text);
        }
    }

    fn states_changed(&self) -> &EditSignal {
        &self.signal
    }
}
