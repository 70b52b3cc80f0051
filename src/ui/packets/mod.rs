//! Concrete packet viewers, one module per packet family
//!
//! Every module exposes a `create` factory with the
//! [`ViewerFactory`](super::registry::ViewerFactory) signature. Factories
//! return a viewer that has already been refreshed.

pub mod container;
pub mod filter;
pub mod pdf;
pub mod script;
pub mod surfaces;
pub mod text;
pub mod triangulation;

use crate::error::UiError;
use crate::packet::{Packet, PacketContent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
};
use std::cell::Ref;

use super::theme::Theme;

/// Borrow the packet's contents if they are the expected variant
pub(crate) fn content_as<'a, T>(
    packet: &'a Packet,
    pick: impl FnOnce(&PacketContent) -> Option<&T>,
) -> Option<Ref<'a, T>> {
    Ref::filter_map(packet.content(), pick).ok()
}

/// The error a factory returns when handed a packet of the wrong variant
pub(crate) fn wrong_content(packet: &Packet, expected: &str) -> UiError {
    UiError::ViewerConstruction {
        packet: packet.full_name(),
        reason: format!("The packet does not hold {expected}."),
    }
}

/// A "label: value" line as used by summary panels
pub(crate) fn field_line(theme: &Theme, label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(theme.muted)),
        Span::styled(value.into(), Style::default().fg(theme.foreground)),
    ])
}

/// Style for a column header row
pub(crate) fn header_style(theme: &Theme) -> Style {
    Style::default()
        .fg(theme.title)
        .add_modifier(Modifier::BOLD)
}

/// Keep `selected` inside a window of `height` rows starting at `offset`
pub(crate) fn follow(selected: usize, offset: &mut usize, height: usize) {
    let height = height.max(1);
    if selected < *offset {
        *offset = selected;
    } else if selected >= *offset + height {
        *offset = selected + 1 - height;
    }
}

/// The rectangle of one cell in a table with fixed column widths
pub(crate) fn cell_rect(area: Rect, widths: &[u16], column: usize, row: usize) -> Rect {
    let x: u16 = widths.iter().take(column).map(|w| w + 1).sum();
    let width = widths.get(column).copied().unwrap_or(0);
    Rect {
        x: area.x + x.min(area.width),
        y: area.y + (row as u16).min(area.height.saturating_sub(1)),
        width: width.min(area.width.saturating_sub(x)),
        height: 1,
    }
}
