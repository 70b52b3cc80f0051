//! Container viewer: child and descendant counts

use crate::error::Result;
use crate::packet::PacketRef;
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::Paragraph,
    Frame,
};

use super::field_line;
use crate::ui::traits::RenderContext;
use crate::ui::viewer::{PacketViewer, PaneContext};

pub fn create(packet: &PacketRef, _ctx: &PaneContext) -> Result<Box<dyn PacketViewer>> {
    let mut viewer = ContainerViewer {
        packet: packet.clone(),
        children: 0,
        descendants: 0,
    };
    viewer.refresh();
    Ok(Box::new(viewer))
}

pub struct ContainerViewer {
    packet: PacketRef,
    children: usize,
    descendants: usize,
}

impl ContainerViewer {
    pub fn counts(&self) -> (usize, usize) {
        (self.children, self.descendants)
    }
}

impl PacketViewer for ContainerViewer {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let lines = vec![
            Line::raw(""),
            field_line(ctx.theme, "Immediate children", self.children.to_string()),
            field_line(ctx.theme, "Total descendants", self.descendants.to_string()),
        ];
        f.render_widget(Paragraph::new(lines), area);
    }

    fn refresh(&mut self) {
        self.children = self.packet.child_count();
        self.descendants = self.packet.descendant_count();
    }
}
