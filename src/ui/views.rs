// Screen layout
//
// Title bar on top, the packet tree and the docked pane side by side in the
// body, the status bar at the bottom. Floating frames, the toast and the help
// overlay are drawn last so they sit above everything else.

use super::app::{Focus, Workspace};
use super::traits::RenderContext;
use crate::config::VERSION;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Main render function, called on every frame
pub fn draw(f: &mut Frame, app: &Workspace) {
    let bg_block = Block::default().style(Style::default().bg(app.theme.background));
    f.render_widget(bg_block, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_title(f, chunks[0], app);
    render_body(f, chunks[1], app);
    render_status(f, chunks[2], app);

    if let Some(toast) = &app.toast {
        toast.render(f, f.area(), &app.theme);
    }
    if app.show_help {
        render_help(f, f.area(), app);
    }
}

fn render_title(f: &mut Frame, area: Rect, app: &Workspace) {
    let modified = if app.is_document_modified() { " ●" } else { "" };
    let title_text = format!(" Regina v{} ──── {}{}", VERSION, app.root().label(), modified);

    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.title))
                .title_top(Line::from(" F1 help ").right_aligned()),
        );
    f.render_widget(title, area);
}

fn render_body(f: &mut Frame, area: Rect, app: &Workspace) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    let theme = &app.theme;
    let frame_no = app.animation_frame;
    app.tree.render(
        f,
        chunks[0],
        &RenderContext::new(theme, app.focus == Focus::Tree, frame_no),
    );

    match app.docked_pane() {
        Some(pane) => pane.render(
            f,
            chunks[1],
            &RenderContext::new(theme, app.focus == Focus::Docked, frame_no),
        ),
        None => {
            let hint = Paragraph::new(vec![
                Line::raw(""),
                Line::styled(
                    "  Select a packet in the tree and press Enter to open it.",
                    Style::default().fg(theme.muted),
                ),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(theme.border_type)
                    .border_style(Style::default().fg(theme.border)),
            );
            f.render_widget(hint, chunks[1]);
        }
    }

    for (i, frame) in app.floating().iter().enumerate() {
        let focused = app.focus == Focus::Floating(i);
        frame.render(f, area, &RenderContext::new(theme, focused, frame_no));
    }
}

fn render_status(f: &mut Frame, area: Rect, app: &Workspace) {
    let theme = &app.theme;
    let hints = match app.focused_pane() {
        Some(pane) => pane.key_hints(),
        None => "↑↓ move  ←→ collapse/expand  Enter open",
    };

    let mut spans = Vec::new();
    if app.is_read_only() {
        spans.push(Span::styled(
            " READ-ONLY ",
            Style::default()
                .fg(theme.background)
                .bg(theme.locked)
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(
        format!(" {hints}  │ F6 focus  Ctrl-Q quit"),
        Style::default().fg(theme.status_bar),
    ));
    if let Some(entry) = app.latest_warning() {
        spans.push(Span::styled(
            format!("  │ {}: {}", entry.level.as_str(), entry.summary()),
            Style::default().fg(theme.warning),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

const HELP: &[(&str, &str)] = &[
    ("Enter", "Open the selected packet"),
    ("F6", "Move focus between tree and panes"),
    ("F2 / Ctrl-S", "Commit changes"),
    ("F5", "Refresh from the packet"),
    ("F3", "Dock or float the pane"),
    ("F4", "Close the pane"),
    ("Alt-1..9", "Packet actions"),
    ("Alt-←/→", "Switch tabs"),
    ("Ctrl-X/C/V", "Cut, copy, paste"),
    ("Ctrl-R", "Toggle read-only"),
    ("Ctrl-T", "Cycle colour theme"),
    ("Ctrl-G", "Toggle graph labels"),
    ("Ctrl-Q", "Quit"),
];

fn render_help(f: &mut Frame, area: Rect, app: &Workspace) {
    let theme = &app.theme;
    let width = 52.min(area.width);
    let height = (HELP.len() as u16 + 4).min(area.height);
    let rect = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let mut lines = vec![Line::raw("")];
    for (key, what) in HELP {
        lines.push(Line::from(vec![
            Span::styled(format!(" {key:>12} "), Style::default().fg(theme.action_key)),
            Span::styled(*what, Style::default().fg(theme.foreground)),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.highlight))
        .title(Span::styled(" Keys ", Style::default().fg(theme.title)));
    f.render_widget(Clear, rect);
    f.render_widget(Paragraph::new(lines).block(block), rect);
}
