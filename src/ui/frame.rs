//! Floating frame: a pane drawn as an overlay window above the workspace

use ratatui::{
    layout::Rect,
    widgets::Clear,
    Frame,
};

use super::pane::PacketPane;
use super::traits::RenderContext;

/// Top-level window around one floating pane
pub struct FloatingFrame {
    pane: PacketPane,
    /// Cascade position, so stacked frames stay distinguishable
    slot: u16,
}

impl FloatingFrame {
    /// Take ownership of `pane` and bind its edit actions to this window
    pub fn new(pane: PacketPane, slot: u16) -> Self {
        pane.set_docked(false);
        pane.register_edit_operations();
        Self { pane, slot }
    }

    pub fn pane(&self) -> &PacketPane {
        &self.pane
    }

    /// The window manager wants to close us; the pane may veto
    pub fn close_requested(&self) -> bool {
        self.pane.query_close()
    }

    /// Release the pane so the host can dock or drop it
    pub fn into_pane(self) -> PacketPane {
        self.pane.deregister_edit_operations();
        self.pane
    }

    /// Where this frame sits inside `area`
    pub fn area(&self, area: Rect) -> Rect {
        let width = (area.width * 3 / 4).max(20).min(area.width);
        let height = (area.height * 3 / 4).max(8).min(area.height);
        let step = self.slot % 4 * 2;
        let x = area.x + (area.width - width) / 2 + step;
        let y = area.y + (area.height - height) / 2 + step / 2;
        Rect {
            x: x.min(area.x + area.width - width),
            y: y.min(area.y + area.height - height),
            width,
            height,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let rect = self.area(area);
        f.render_widget(Clear, rect);
        self.pane.render(f, rect, ctx);
    }
}
