//! Pane header: icon, label, tags and lock emblem

use crate::packet::Packet;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::ui::theme::Theme;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneHeader {
    pub icon: &'static str,
    pub title: String,
    pub has_tags: bool,
    /// The packet refuses modification (a dependent packet exists)
    pub locked: bool,
    /// The pane is read-only for any reason
    pub read_only: bool,
}

impl PaneHeader {
    pub fn new(packet: &Packet, read_write: bool) -> Self {
        let mut header = Self::default();
        header.refresh(packet, read_write);
        header
    }

    /// Re-read label, icon and editability from the packet
    pub fn refresh(&mut self, packet: &Packet, read_write: bool) {
        self.icon = packet.packet_type().icon();
        self.title = packet.full_name();
        self.has_tags = packet.has_tags();
        self.locked = !packet.is_editable();
        self.read_only = !read_write;
    }

    pub fn line(&self, theme: &Theme, dirty: bool) -> Line<'static> {
        let mut spans = vec![
            Span::raw(" "),
            Span::styled(self.icon, Style::default().fg(theme.title)),
            Span::raw(" "),
            Span::styled(
                self.title.clone(),
                Style::default()
                    .fg(theme.title)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if self.has_tags {
            spans.push(Span::styled(" +", Style::default().fg(theme.muted)));
        }
        if self.locked {
            spans.push(Span::styled(" 🔒", Style::default().fg(theme.locked)));
        } else if self.read_only {
            spans.push(Span::styled(" [read-only]", Style::default().fg(theme.muted)));
        }
        if dirty {
            spans.push(Span::styled(" ●", Style::default().fg(theme.dirty)));
        }
        spans.push(Span::raw(" "));
        Line::from(spans)
    }
}
