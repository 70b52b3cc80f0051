//! Toast notifications
//!
//! A non-blocking overlay in the bottom-right corner that dismisses itself
//! after a short while. Used for outcomes that need no acknowledgement
//! (copied to clipboard, committed, read-only toggled).

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;

pub struct Toast {
    pub message: String,
    warning: bool,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            warning: false,
            created_at: Instant::now(),
            duration: Duration::from_secs(2),
        }
    }

    /// A toast drawn in the warning colour that stays a little longer
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            warning: true,
            duration: Duration::from_secs(4),
            ..Self::new(message)
        }
    }

    pub fn is_warning(&self) -> bool {
        self.warning
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }

    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let width = (self.message.width() as u16 + 4).min(area.width.saturating_sub(4));
        let height = 3;
        let x = area.right().saturating_sub(width + 2);
        let y = area.bottom().saturating_sub(height + 2);
        let toast_area = Rect::new(x, y, width, height);

        let accent = if self.warning { theme.warning } else { theme.highlight };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(theme.background));
        let text = Paragraph::new(self.message.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.foreground))
            .block(block);

        f.render_widget(Clear, toast_area);
        f.render_widget(text, toast_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_outlives_plain_toast() {
        let plain = Toast::new("Copied");
        let warn = Toast::warning("Read-only");
        assert!(!plain.is_warning());
        assert!(warn.is_warning());
        assert!(warn.duration > plain.duration);
        assert!(!plain.is_expired());
    }
}
