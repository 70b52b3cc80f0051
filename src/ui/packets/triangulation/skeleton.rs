//! Skeleton summary: face counts and the invariants computed from them

use crate::packet::PacketRef;
use ratatui::{layout::Rect, text::Line, widgets::Paragraph, Frame};

use super::{capitalised, simplex_plural, triangulation};
use crate::ui::packets::field_line;
use crate::ui::traits::RenderContext;
use crate::ui::viewer::{render_message, PacketViewer};

const FACE_NAMES: [&str; 5] = ["Vertices", "Edges", "Triangles", "Tetrahedra", "Pentachora"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkeletonSummary {
    /// Number of k-faces, indexed by k
    pub faces: Vec<usize>,
    pub euler: i64,
    pub components: usize,
    pub boundary_facets: usize,
    pub orientable: bool,
}

pub struct SkeletonViewer {
    packet: PacketRef,
    summary: Option<SkeletonSummary>,
}

impl SkeletonViewer {
    pub fn new(packet: &PacketRef) -> Self {
        Self {
            packet: packet.clone(),
            summary: None,
        }
    }

    /// None until the first refresh, or while the triangulation is empty
    pub fn summary(&self) -> Option<&SkeletonSummary> {
        self.summary.as_ref()
    }
}

impl PacketViewer for SkeletonViewer {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let Some(summary) = &self.summary else {
            render_message(f, area, ctx, "This triangulation is empty.", "");
            return;
        };
        let theme = ctx.theme;
        let mut lines = vec![Line::raw("")];
        for (k, count) in summary.faces.iter().enumerate() {
            lines.push(field_line(theme, FACE_NAMES[k], count.to_string()));
        }
        lines.push(Line::raw(""));
        lines.push(field_line(theme, "Euler characteristic", summary.euler.to_string()));
        lines.push(field_line(theme, "Components", summary.components.to_string()));
        lines.push(field_line(
            theme,
            "Boundary facets",
            summary.boundary_facets.to_string(),
        ));
        lines.push(field_line(
            theme,
            "Orientable",
            if summary.orientable { "Yes" } else { "No" },
        ));
        f.render_widget(Paragraph::new(lines), area);
    }

    fn refresh(&mut self) {
        let Some(tri) = triangulation(&self.packet) else {
            self.summary = None;
            return;
        };
        if tri.is_empty() {
            self.summary = None;
            return;
        }
        let faces = (0..=tri.dim()).map(|k| tri.count_faces(k)).collect();
        self.summary = Some(SkeletonSummary {
            faces,
            euler: tri.euler_characteristic(),
            components: tri.component_count(),
            boundary_facets: tri.boundary_facets(),
            orientable: tri.is_orientable(),
        });
        tracing::trace!(
            "Skeleton refreshed for {} {}",
            tri.size(),
            capitalised(simplex_plural(tri.dim()))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::perm::Perm;
    use crate::packet::triangulation::Triangulation;
    use crate::packet::{Packet, PacketContent};

    #[test]
    fn test_single_triangle_counts() {
        let mut tri = Triangulation::new(2);
        tri.add_simplex("");
        let packet = Packet::new("t", PacketContent::Triangulation(tri));
        let mut viewer = SkeletonViewer::new(&packet);
        assert!(viewer.summary().is_none());

        viewer.refresh();
        let summary = viewer.summary().unwrap();
        assert_eq!(summary.faces, vec![3, 3, 1]);
        assert_eq!(summary.euler, 1);
        assert_eq!(summary.boundary_facets, 3);
        assert!(summary.orientable);
    }

    #[test]
    fn test_refresh_tracks_packet_changes() {
        let mut tri = Triangulation::new(3);
        tri.add_simplex("");
        tri.add_simplex("");
        let packet = Packet::new("t", PacketContent::Triangulation(tri));
        let mut viewer = SkeletonViewer::new(&packet);
        viewer.refresh();
        assert_eq!(viewer.summary().unwrap().components, 2);

        packet.edit_content(|c| {
            if let PacketContent::Triangulation(t) = c {
                t.join(0, 3, 1, Perm::identity(4));
            }
        });
        viewer.refresh();
        assert_eq!(viewer.summary().unwrap().components, 1);
    }
}
