//! Triangulation viewers for dimensions 2, 3 and 4
//!
//! One tabbed composite per triangulation:
//!
//! | Tab                 | Viewer                    | Role      |
//! |---------------------|---------------------------|-----------|
//! | Gluings             | [`gluings::GluingsEditor`]  | editor    |
//! | Skeleton            | [`skeleton::SkeletonViewer`] | read-only |
//! | Face pairing graph  | [`graph::FacePairingGraph`]  | read-only |
//! | Algebra (3-D only)  | [`algebra::AlgebraViewer`]   | read-only |

pub mod algebra;
pub mod gluings;
pub mod graph;
pub mod skeleton;

use crate::config::TabFamily;
use crate::error::Result;
use crate::packet::triangulation::Triangulation;
use crate::packet::{PacketContent, PacketRef, PacketType};
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::Paragraph,
    Frame,
};
use std::cell::Ref;

use super::{content_as, field_line, wrong_content};
use crate::ui::tabbed::TabbedViewer;
use crate::ui::traits::RenderContext;
use crate::ui::viewer::{PacketViewer, PaneContext};

/// Borrow the triangulation inside `packet`
pub(crate) fn triangulation(packet: &PacketRef) -> Option<Ref<'_, Triangulation>> {
    content_as(packet, |c| match c {
        PacketContent::Triangulation(t) => Some(t),
        _ => None,
    })
}

/// Name of a top-dimensional simplex
pub fn simplex_name(dim: usize) -> &'static str {
    match dim {
        2 => "triangle",
        3 => "tetrahedron",
        _ => "pentachoron",
    }
}

pub fn simplex_plural(dim: usize) -> &'static str {
    match dim {
        2 => "triangles",
        3 => "tetrahedra",
        _ => "pentachora",
    }
}

/// Name of a codimension-1 face
pub fn facet_name(dim: usize) -> &'static str {
    match dim {
        2 => "edge",
        3 => "face",
        _ => "facet",
    }
}

/// Upper-case first letter, for the start of a sentence or a column title
pub fn capitalised(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn family(packet_type: PacketType) -> TabFamily {
    match packet_type {
        PacketType::Triangulation2 => TabFamily::Triangulation2,
        PacketType::Triangulation4 => TabFamily::Triangulation4,
        _ => TabFamily::Triangulation3,
    }
}

pub fn create(packet: &PacketRef, ctx: &PaneContext) -> Result<Box<dyn PacketViewer>> {
    let Some(dim) = triangulation(packet).map(|t| t.dim()) else {
        return Err(wrong_content(packet, "a triangulation"));
    };

    let mut tabs = TabbedViewer::new(
        packet,
        ctx.prefs.clone(),
        Some(family(packet.packet_type())),
    );
    tabs.set_header(Box::new(TriangulationHeader::new(packet)));
    tabs.add_editor_tab("Gluings", Box::new(gluings::GluingsEditor::new(packet, ctx)));
    tabs.add_tab("Skeleton", Box::new(skeleton::SkeletonViewer::new(packet)));
    tabs.add_tab(
        "Face pairing graph",
        Box::new(graph::FacePairingGraph::new(packet, ctx)),
    );
    if dim == 3 {
        tabs.add_tab("Algebra", Box::new(algebra::AlgebraViewer::new(packet, ctx)));
    }
    Ok(Box::new(tabs))
}

/// One-line summary shown above the tabs
pub struct TriangulationHeader {
    packet: PacketRef,
    summary: String,
    detail: String,
}

impl TriangulationHeader {
    pub fn new(packet: &PacketRef) -> Self {
        Self {
            packet: packet.clone(),
            summary: String::new(),
            detail: String::new(),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

impl PacketViewer for TriangulationHeader {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let lines = vec![
            Line::styled(self.summary.clone(), ctx.theme.selected()),
            field_line(ctx.theme, "Structure", self.detail.clone()),
        ];
        f.render_widget(Paragraph::new(lines), area);
    }

    fn refresh(&mut self) {
        let Some(tri) = triangulation(&self.packet) else {
            return;
        };
        let dim = tri.dim();
        if tri.is_empty() {
            self.summary = "Empty".to_string();
            self.detail = String::new();
            return;
        }
        let size = tri.size();
        let noun = if size == 1 {
            simplex_name(dim)
        } else {
            simplex_plural(dim)
        };
        let boundary = tri.boundary_facets();
        self.summary = if tri.is_closed() {
            format!("Closed, {}", orientability(&tri))
        } else {
            format!(
                "Bounded, {} ({} boundary {}{})",
                orientability(&tri),
                boundary,
                facet_name(dim),
                if boundary == 1 { "" } else { "s" }
            )
        };
        let components = tri.component_count();
        self.detail = format!(
            "{size} {noun}, {components} component{}",
            if components == 1 { "" } else { "s" }
        );
    }
}

fn orientability(tri: &Triangulation) -> &'static str {
    if tri.is_orientable() {
        "orientable"
    } else {
        "non-orientable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::perm::Perm;
    use crate::packet::Packet;

    #[test]
    fn test_header_summary() {
        let mut tri = Triangulation::new(3);
        tri.add_simplex("");
        tri.add_simplex("");
        tri.join(0, 3, 1, Perm::identity(4));
        let packet = Packet::new("pair", PacketContent::Triangulation(tri));

        let mut header = TriangulationHeader::new(&packet);
        header.refresh();
        assert_eq!(header.summary(), "Bounded, orientable (6 boundary faces)");
        assert_eq!(header.detail, "2 tetrahedra, 1 component");
    }

    #[test]
    fn test_names() {
        assert_eq!(capitalised(simplex_name(4)), "Pentachoron");
        assert_eq!(facet_name(2), "edge");
    }
}
