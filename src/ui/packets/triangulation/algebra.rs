//! Fundamental group, with optional simplification through GAP

use crate::error::Result;
use crate::packet::algebra::{fundamental_group, GroupPresentation};
use crate::packet::PacketRef;
use crate::tools::gap;
use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::triangulation;
use crate::ui::packets::field_line;
use crate::ui::traits::RenderContext;
use crate::ui::viewer::{
    render_message, ActionRequirement, PacketViewer, PaneContext, ViewerAction,
};

/// A common name for small presentations
pub fn recognise(group: &GroupPresentation) -> Option<String> {
    match (group.generators, group.relations.as_slice()) {
        (0, _) => Some("Trivial".to_string()),
        (1, []) => Some("Z".to_string()),
        (1, [relation]) if relation.iter().all(|&(_, exp)| exp == relation[0].1) => {
            Some(format!("Z_{}", relation.len()))
        }
        _ => None,
    }
}

pub struct AlgebraViewer {
    packet: PacketRef,
    ctx: PaneContext,
    group: Option<GroupPresentation>,
    simplified: bool,
}

impl AlgebraViewer {
    pub fn new(packet: &PacketRef, ctx: &PaneContext) -> Self {
        Self {
            packet: packet.clone(),
            ctx: ctx.clone(),
            group: None,
            simplified: false,
        }
    }

    pub fn group(&self) -> Option<&GroupPresentation> {
        self.group.as_ref()
    }

    fn simplify(&mut self) -> Result<()> {
        let Some(group) = &self.group else {
            return Ok(());
        };
        let config = self.ctx.prefs.config().gap.clone();
        let simplified = gap::simplify(&config, group)?;
        self.group = Some(simplified);
        self.simplified = true;
        Ok(())
    }
}

impl PacketViewer for AlgebraViewer {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let Some(group) = &self.group else {
            render_message(f, area, ctx, "This triangulation is empty.", "");
            return;
        };
        let theme = ctx.theme;
        let mut lines = vec![Line::raw("")];
        if let Some(name) = recognise(group) {
            lines.push(field_line(theme, "Fundamental group", name));
        }
        lines.push(field_line(theme, "Generators", group.generators.to_string()));
        lines.push(field_line(theme, "Relations", group.relations.len().to_string()));
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            group.to_string(),
            Style::default().fg(theme.foreground),
        ));
        if self.simplified {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                "Simplified by GAP",
                Style::default().fg(theme.muted),
            ));
        }
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
    }

    fn refresh(&mut self) {
        self.simplified = false;
        self.group = triangulation(&self.packet)
            .filter(|t| !t.is_empty())
            .and_then(|t| fundamental_group(&t))
            .map(|mut g| {
                g.reduce();
                g
            });
    }

    fn packet_type_actions(&self) -> Vec<ViewerAction> {
        vec![
            ViewerAction::new("simplify-gap", "Simplify with GAP", ActionRequirement::TryCommit)
                .enabled(self.group.is_some() && !self.simplified),
        ]
    }

    fn trigger_action(&mut self, id: &str) -> Result<()> {
        if id == "simplify-gap" {
            self.simplify()?;
        }
        Ok(())
    }
}
