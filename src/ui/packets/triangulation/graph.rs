//! Face pairing graph, laid out by Graphviz and drawn on a braille canvas

use crate::packet::PacketRef;
use crate::tools::graphviz::{self, Layout};
use ratatui::{
    layout::Rect,
    style::Style,
    symbols::Marker,
    widgets::canvas::{Canvas, Line as CanvasLine},
    Frame,
};

use super::{simplex_plural, triangulation};
use crate::ui::traits::RenderContext;
use crate::ui::viewer::{render_message, PacketViewer, PaneContext};

/// Larger graphs are not worth laying out in a terminal
pub const MAX_GRAPH_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphState {
    NotRefreshed,
    Empty,
    TooLarge(usize),
    /// Graphviz is missing or unsuitable; the text explains why
    Unavailable(String),
    Failed(String),
    Ready(Layout),
}

pub struct FacePairingGraph {
    packet: PacketRef,
    ctx: PaneContext,
    executable: String,
    labels: bool,
    state: GraphState,
}

impl FacePairingGraph {
    pub fn new(packet: &PacketRef, ctx: &PaneContext) -> Self {
        let mut graph = Self {
            packet: packet.clone(),
            ctx: ctx.clone(),
            executable: String::new(),
            labels: true,
            state: GraphState::NotRefreshed,
        };
        graph.update_preferences();
        graph
    }

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    fn compute(&self) -> GraphState {
        let Some(tri) = triangulation(&self.packet) else {
            return GraphState::Empty;
        };
        if tri.is_empty() {
            return GraphState::Empty;
        }
        if tri.size() > MAX_GRAPH_SIZE {
            return GraphState::TooLarge(tri.size());
        }
        let dot = tri.face_pairing_dot(self.labels);
        let plural = simplex_plural(tri.dim());
        drop(tri);

        let (status, path) = graphviz::status(&self.executable);
        let Some(path) = path.filter(|_| status.usable()) else {
            return GraphState::Unavailable(status.diagnostic(&self.executable));
        };
        match graphviz::layout(&path, &dot) {
            Ok(layout) => {
                tracing::debug!(
                    "Laid out face pairing graph with {} nodes for {}",
                    layout.nodes.len(),
                    plural
                );
                GraphState::Ready(layout)
            }
            Err(e) => {
                tracing::warn!("Graphviz layout failed: {}", e);
                GraphState::Failed(e.to_string())
            }
        }
    }

    fn draw(&self, f: &mut Frame, area: Rect, ctx: &RenderContext, layout: &Layout) {
        let theme = ctx.theme;
        let width = layout.width.max(1.0);
        let height = layout.height.max(1.0);
        let labels = self.labels;
        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-0.25, width + 0.25])
            .y_bounds([-0.25, height + 0.25])
            .paint(move |c| {
                for &(tail, head) in &layout.edges {
                    let (a, b) = (&layout.nodes[tail], &layout.nodes[head]);
                    c.draw(&CanvasLine {
                        x1: a.x,
                        y1: a.y,
                        x2: b.x,
                        y2: b.y,
                        color: theme.muted,
                    });
                }
                c.layer();
                for node in &layout.nodes {
                    let text = if labels { node.label.clone() } else { "●".to_string() };
                    c.print(
                        node.x,
                        node.y,
                        ratatui::text::Span::styled(text, Style::default().fg(theme.highlight)),
                    );
                }
            });
        f.render_widget(canvas, area);
    }
}

impl PacketViewer for FacePairingGraph {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        match &self.state {
            GraphState::NotRefreshed => {}
            GraphState::Empty => render_message(f, area, ctx, "This triangulation is empty.", ""),
            GraphState::TooLarge(size) => render_message(
                f,
                area,
                ctx,
                &format!("This triangulation has {size} top-dimensional simplices."),
                &format!(
                    "Face pairing graphs are only shown for triangulations of at most \
                     {MAX_GRAPH_SIZE} simplices."
                ),
            ),
            GraphState::Unavailable(why) => {
                render_message(f, area, ctx, "Graphviz is not available.", why)
            }
            GraphState::Failed(why) => render_message(
                f,
                area,
                ctx,
                "The face pairing graph could not be laid out.",
                why,
            ),
            GraphState::Ready(layout) => self.draw(f, area, ctx, layout),
        }
    }

    fn refresh(&mut self) {
        self.state = self.compute();
    }

    fn update_preferences(&mut self) {
        let prefs = self.ctx.prefs.config();
        let changed =
            prefs.graphviz.executable != self.executable || prefs.graphviz.labels != self.labels;
        self.executable = prefs.graphviz.executable.clone();
        self.labels = prefs.graphviz.labels;
        drop(prefs);
        if changed && self.state != GraphState::NotRefreshed {
            self.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::triangulation::Triangulation;
    use crate::packet::{Packet, PacketContent};
    use crate::ui::viewer::TestContext;

    #[test]
    fn test_empty_triangulation_skips_graphviz() {
        let t = TestContext::new();
        let packet = Packet::new("e", PacketContent::Triangulation(Triangulation::new(3)));
        let mut graph = FacePairingGraph::new(&packet, &t.ctx);
        assert_eq!(graph.state(), &GraphState::NotRefreshed);
        graph.refresh();
        assert_eq!(graph.state(), &GraphState::Empty);
    }

    #[test]
    fn test_oversized_triangulation_is_not_laid_out() {
        let t = TestContext::new();
        let mut tri = Triangulation::new(2);
        for _ in 0..=MAX_GRAPH_SIZE {
            tri.add_simplex("");
        }
        let packet = Packet::new("big", PacketContent::Triangulation(tri));
        let mut graph = FacePairingGraph::new(&packet, &t.ctx);
        graph.refresh();
        assert_eq!(graph.state(), &GraphState::TooLarge(MAX_GRAPH_SIZE + 1));
    }

    #[test]
    fn test_missing_executable_shows_diagnostic() {
        let t = TestContext::new();
        t.ctx
            .prefs
            .update(|c| c.graphviz.executable = "regina-no-such-graphviz".to_string());
        let mut tri = Triangulation::new(3);
        tri.add_simplex("");
        let packet = Packet::new("one", PacketContent::Triangulation(tri));
        let mut graph = FacePairingGraph::new(&packet, &t.ctx);
        graph.refresh();
        match graph.state() {
            GraphState::Unavailable(why) => assert!(why.contains("could not find")),
            other => panic!("unexpected state {other:?}"),
        }
    }
}
