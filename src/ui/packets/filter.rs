//! Surface filter viewers, one per filter sub-type

use crate::error::{Result, UiError};
use crate::packet::{BoolSet, PacketContent, PacketRef, PacketType, PropertiesFilter, SurfaceFilter};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::collections::BTreeSet;

use super::{content_as, field_line, wrong_content};
use crate::ui::text_area::{LineEdit, LineOutcome};
use crate::ui::traits::{Handled, RenderContext};
use crate::ui::viewer::{render_message, PacketViewer, PaneContext};

fn filter_of(packet: &PacketRef) -> Option<SurfaceFilter> {
    content_as(packet, |c| match c {
        PacketContent::SurfaceFilter(f) => Some(f),
        _ => None,
    })
    .map(|f| f.clone())
}

/// Viewer for the default filter, which has nothing to edit
pub fn create_plain(packet: &PacketRef, _ctx: &PaneContext) -> Result<Box<dyn PacketViewer>> {
    if filter_of(packet).is_none() {
        return Err(wrong_content(packet, "a surface filter"));
    }
    Ok(Box::new(PlainFilterViewer {
        packet: packet.clone(),
    }))
}

pub fn create_properties(packet: &PacketRef, ctx: &PaneContext) -> Result<Box<dyn PacketViewer>> {
    if !matches!(filter_of(packet), Some(SurfaceFilter::Properties(_))) {
        return Err(wrong_content(packet, "a properties filter"));
    }
    let mut viewer = PropertiesEditor::new(packet, ctx);
    viewer.refresh();
    Ok(Box::new(viewer))
}

pub fn create_combination(packet: &PacketRef, ctx: &PaneContext) -> Result<Box<dyn PacketViewer>> {
    if !matches!(filter_of(packet), Some(SurfaceFilter::Combination { .. })) {
        return Err(wrong_content(packet, "a combination filter"));
    }
    let mut viewer = CombinationEditor {
        packet: packet.clone(),
        ctx: ctx.clone(),
        use_and: true,
        read_write: true,
    };
    viewer.refresh();
    Ok(Box::new(viewer))
}

struct PlainFilterViewer {
    packet: PacketRef,
}

impl PacketViewer for PlainFilterViewer {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        render_message(
            f,
            area,
            ctx,
            "This filter does not do anything.",
            "Every normal surface passes through it.",
        );
    }

    fn refresh(&mut self) {}
}

/// Parse a list of integers separated by commas and/or whitespace
pub fn parse_euler_list(text: &str) -> Result<BTreeSet<i64>> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                UiError::invalid(
                    "The list of Euler characteristics is invalid.",
                    format!(
                        "{s} is not an integer. Euler characteristics should be \
                         given as a list of integers separated by commas or spaces."
                    ),
                )
            })
        })
        .collect()
}

pub fn euler_list_text(values: &BTreeSet<i64>) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

const PROPERTY_ROWS: [&str; 4] = ["Orientability", "Compactness", "Boundary", "Euler characteristics"];
const EULER_ROW: usize = 3;

pub struct PropertiesEditor {
    packet: PacketRef,
    ctx: PaneContext,
    working: PropertiesFilter,
    selected: usize,
    editing: Option<LineEdit>,
    read_write: bool,
}

impl PropertiesEditor {
    pub fn new(packet: &PacketRef, ctx: &PaneContext) -> Self {
        Self {
            packet: packet.clone(),
            ctx: ctx.clone(),
            working: PropertiesFilter::default(),
            selected: 0,
            editing: None,
            read_write: true,
        }
    }

    pub fn working(&self) -> &PropertiesFilter {
        &self.working
    }

    fn bool_set(&mut self, row: usize) -> Option<&mut BoolSet> {
        match row {
            0 => Some(&mut self.working.orientability),
            1 => Some(&mut self.working.compactness),
            2 => Some(&mut self.working.boundary),
            _ => None,
        }
    }

    /// Advance the three-way constraint on `row`
    pub fn cycle(&mut self, row: usize) {
        if let Some(set) = self.bool_set(row) {
            *set = set.cycle();
            self.ctx.set_dirty(true);
        }
    }

    pub fn set_euler_text(&mut self, text: &str) -> Result<()> {
        let values = parse_euler_list(text)?;
        if values != self.working.euler {
            self.working.euler = values;
            self.ctx.set_dirty(true);
        }
        Ok(())
    }

    fn row_value(&self, row: usize) -> String {
        match row {
            0 => self.working.orientability.label().to_string(),
            1 => self.working.compactness.label().to_string(),
            2 => self.working.boundary.label().to_string(),
            _ if self.working.euler.is_empty() => "Any".to_string(),
            _ => euler_list_text(&self.working.euler),
        }
    }
}

impl PacketViewer for PropertiesEditor {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let mut lines = vec![Line::raw("")];
        for (row, label) in PROPERTY_ROWS.iter().enumerate() {
            let style = if ctx.focused && row == self.selected {
                theme.selected()
            } else {
                Style::default().fg(theme.foreground)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{label:<24}"), Style::default().fg(theme.muted)),
                Span::styled(self.row_value(row), style),
            ]));
        }
        f.render_widget(Paragraph::new(lines), area);

        if let Some(edit) = &self.editing {
            let rect = Rect {
                x: area.x + 24,
                y: area.y + 1 + EULER_ROW as u16,
                width: area.width.saturating_sub(24),
                height: 1,
            }
            .intersection(area);
            edit.render(f, rect, ctx);
        }
    }

    fn refresh(&mut self) {
        if let Some(SurfaceFilter::Properties(props)) = filter_of(&self.packet) {
            self.working = props;
        }
        self.editing = None;
    }

    fn is_editor(&self) -> bool {
        true
    }

    fn commit(&mut self) {
        let working = self.working.clone();
        self.packet.edit_content(|c| {
            if let PacketContent::SurfaceFilter(f) = c {
                *f = SurfaceFilter::Properties(working);
            }
        });
    }

    fn set_read_write(&mut self, read_write: bool) {
        self.read_write = read_write;
        if !read_write {
            self.editing = None;
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled> {
        if let Some(edit) = self.editing.as_mut() {
            match edit.handle_key(key) {
                LineOutcome::Submit => {
                    let text = edit.value().to_string();
                    self.editing = None;
                    self.set_euler_text(&text)?;
                }
                LineOutcome::Cancel => self.editing = None,
                LineOutcome::Editing | LineOutcome::Ignored => {}
            }
            return Ok(Handled::Yes);
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(PROPERTY_ROWS.len() - 1)
            }
            KeyCode::Enter | KeyCode::Char(' ') if self.read_write => {
                if self.selected == EULER_ROW {
                    self.editing = Some(LineEdit::new(euler_list_text(&self.working.euler)));
                } else {
                    self.cycle(self.selected);
                }
            }
            _ => return Ok(Handled::No),
        }
        Ok(Handled::Yes)
    }

    fn key_hints(&self) -> &'static str {
        "Space change"
    }
}

/// Editor for the AND/OR switch of a combination filter
pub struct CombinationEditor {
    packet: PacketRef,
    ctx: PaneContext,
    use_and: bool,
    read_write: bool,
}

impl CombinationEditor {
    pub fn uses_and(&self) -> bool {
        self.use_and
    }

    pub fn toggle(&mut self) {
        self.use_and = !self.use_and;
        self.ctx.set_dirty(true);
    }

    /// Labels of the filters this one combines
    pub fn child_filters(&self) -> Vec<String> {
        self.packet
            .children()
            .into_iter()
            .filter(|c| c.packet_type() == PacketType::SurfaceFilter)
            .map(|c| c.label())
            .collect()
    }
}

impl PacketViewer for CombinationEditor {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let mode = if self.use_and {
            "AND (passes all child filters)"
        } else {
            "OR (passes any child filter)"
        };
        let mut lines = vec![
            Line::raw(""),
            field_line(theme, "Combine using", mode),
            Line::raw(""),
        ];
        let children = self.child_filters();
        if children.is_empty() {
            lines.push(Line::styled(
                "This filter has no child filters.",
                Style::default().fg(theme.muted),
            ));
        }
        for label in children {
            lines.push(Line::styled(
                format!("  {label}"),
                Style::default().fg(theme.foreground),
            ));
        }
        f.render_widget(Paragraph::new(lines), area);
    }

    fn refresh(&mut self) {
        if let Some(SurfaceFilter::Combination { use_and }) = filter_of(&self.packet) {
            self.use_and = use_and;
        }
    }

    fn is_editor(&self) -> bool {
        true
    }

    fn commit(&mut self) {
        let use_and = self.use_and;
        self.packet.edit_content(|c| {
            if let PacketContent::SurfaceFilter(f) = c {
                *f = SurfaceFilter::Combination { use_and };
            }
        });
    }

    fn set_read_write(&mut self, read_write: bool) {
        self.read_write = read_write;
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled> {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') if self.read_write => {
                self.toggle();
                Ok(Handled::Yes)
            }
            _ => Ok(Handled::No),
        }
    }

    fn key_hints(&self) -> &'static str {
        "Space AND/OR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;
    use crate::ui::viewer::TestContext;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_parse_euler_list() {
        assert_eq!(
            parse_euler_list("0, -2  4,").unwrap(),
            BTreeSet::from([-2, 0, 4])
        );
        assert!(parse_euler_list("").unwrap().is_empty());
        let err = parse_euler_list("1, x").unwrap_err();
        assert!(err.detail().unwrap().starts_with("x is not an integer."));
    }

    #[test]
    fn test_properties_editor_cycles_and_commits() {
        let t = TestContext::new();
        let packet = Packet::new(
            "props",
            PacketContent::SurfaceFilter(SurfaceFilter::Properties(PropertiesFilter::default())),
        );
        let mut editor = PropertiesEditor::new(&packet, &t.ctx);
        editor.refresh();

        editor
            .handle_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE))
            .unwrap();
        assert_eq!(editor.working().orientability, BoolSet::Yes);
        assert!(t.marked_dirty());

        editor.set_euler_text("0 2").unwrap();
        editor.commit();
        match filter_of(&packet) {
            Some(SurfaceFilter::Properties(p)) => {
                assert_eq!(p.orientability, BoolSet::Yes);
                assert_eq!(p.euler, BTreeSet::from([0, 2]));
            }
            other => panic!("unexpected filter {other:?}"),
        }
    }

    #[test]
    fn test_bad_euler_text_keeps_working_copy() {
        let t = TestContext::new();
        let packet = Packet::new(
            "props",
            PacketContent::SurfaceFilter(SurfaceFilter::Properties(PropertiesFilter::default())),
        );
        let mut editor = PropertiesEditor::new(&packet, &t.ctx);
        editor.set_euler_text("1").unwrap();
        assert!(editor.set_euler_text("one").is_err());
        assert_eq!(editor.working().euler, BTreeSet::from([1]));
    }

    #[test]
    fn test_combination_lists_child_filters() {
        let t = TestContext::new();
        let packet = Packet::new(
            "combo",
            PacketContent::SurfaceFilter(SurfaceFilter::Combination { use_and: true }),
        );
        packet.insert_child_last(Packet::new(
            "all",
            PacketContent::SurfaceFilter(SurfaceFilter::Trivial),
        ));
        packet.insert_child_last(Packet::new("notes", PacketContent::Text(String::new())));

        let viewer = create_combination(&packet, &t.ctx);
        assert!(viewer.is_ok());

        let mut editor = CombinationEditor {
            packet: packet.clone(),
            ctx: t.ctx.clone(),
            use_and: true,
            read_write: true,
        };
        assert_eq!(editor.child_filters(), vec!["all".to_string()]);
        editor.toggle();
        assert!(!editor.uses_and());
        editor.commit();
        assert_eq!(
            filter_of(&packet),
            Some(SurfaceFilter::Combination { use_and: false })
        );
    }

    #[test]
    fn test_wrong_subtype_is_a_construction_error() {
        let t = TestContext::new();
        let packet = Packet::new("plain", PacketContent::SurfaceFilter(SurfaceFilter::Trivial));
        assert!(matches!(
            create_properties(&packet, &t.ctx),
            Err(UiError::ViewerConstruction { .. })
        ));
        assert!(create_plain(&packet, &t.ctx).is_ok());
    }
}
