// Modal dialogs - warnings, information, apologies and yes/no questions
//
// Panes and viewers talk to the user through the `Dialogs` trait. In the
// running application `TerminalDialogs` draws a modal box over the last
// rendered frame and runs a nested key loop until the user answers. Tests
// use `ScriptedDialogs`, which records every message and replays canned
// answers.

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::Stdout;
use std::rc::Rc;

use super::theme::Theme;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// User-facing messages and questions
pub trait Dialogs {
    fn warn(&self, text: &str, detail: Option<&str>);
    fn info(&self, text: &str, detail: Option<&str>);
    fn sorry(&self, text: &str, detail: Option<&str>);

    /// Ask a yes/no question; true means the user agreed
    fn confirm(&self, text: &str, detail: Option<&str>) -> bool;
}

/// Kinds of modal dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Warning,
    Information,
    Sorry,
    Question,
}

/// Actions returned by dialog input handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    /// Input consumed, keep waiting
    None,
    /// OK / Yes
    Accept,
    /// Cancel / No
    Reject,
}

impl DialogKind {
    pub fn title(&self) -> &'static str {
        match self {
            DialogKind::Warning => " Warning ",
            DialogKind::Information => " Information ",
            DialogKind::Sorry => " Sorry ",
            DialogKind::Question => " Please confirm ",
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            DialogKind::Question => " y/Enter: Yes   n/Esc: No ",
            _ => " Enter/Esc: OK ",
        }
    }

    /// Handle keyboard input, return action for caller to execute
    pub fn handle_input(&self, key: KeyCode) -> DialogAction {
        match self {
            DialogKind::Question => match key {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => DialogAction::Accept,
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => DialogAction::Reject,
                _ => DialogAction::None,
            },
            _ => match key {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => DialogAction::Accept,
                _ => DialogAction::None,
            },
        }
    }
}

/// Calculate centered rect for a dialog
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Draw a dialog box centered in the frame
pub fn render_dialog(
    f: &mut Frame,
    theme: &Theme,
    kind: DialogKind,
    text: &str,
    detail: Option<&str>,
) {
    let accent = match kind {
        DialogKind::Warning => theme.warning,
        DialogKind::Information | DialogKind::Question => theme.info,
        DialogKind::Sorry => theme.error,
    };

    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            text.to_string(),
            Style::default()
                .fg(theme.foreground)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    if let Some(detail) = detail {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            detail.to_string(),
            Style::default().fg(theme.muted),
        )));
    }

    let width = 64u16;
    // Rough wrapped height: text and detail at (width - 4) columns each
    let inner = usize::from(width - 4);
    let wrapped = |s: &str| s.chars().count() / inner + 1;
    let body = 2 + wrapped(text) + detail.map(|d| 1 + wrapped(d)).unwrap_or(0);
    let height = u16::try_from(body + 3).unwrap_or(u16::MAX);
    let area = centered_rect(width, height, f.area());

    f.render_widget(Clear, area);
    let paragraph = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(theme.background))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(accent))
                .title(kind.title())
                .title_bottom(Line::from(kind.hint()).centered()),
        );
    f.render_widget(paragraph, area);
}

/// Dialogs drawn over the running terminal UI
///
/// The workspace hands over the buffer of every completed frame as the
/// backdrop, so a dialog appears on top of the current screen rather than
/// on a blank one.
pub struct TerminalDialogs {
    terminal: Rc<RefCell<Tui>>,
    backdrop: RefCell<Option<Buffer>>,
    theme: RefCell<Theme>,
}

impl TerminalDialogs {
    pub fn new(terminal: Rc<RefCell<Tui>>, theme: Theme) -> Self {
        Self {
            terminal,
            backdrop: RefCell::new(None),
            theme: RefCell::new(theme),
        }
    }

    pub fn set_backdrop(&self, buffer: Buffer) {
        *self.backdrop.borrow_mut() = Some(buffer);
    }

    pub fn set_theme(&self, theme: Theme) {
        *self.theme.borrow_mut() = theme;
    }

    /// Nested event loop; returns true on accept
    fn run(&self, kind: DialogKind, text: &str, detail: Option<&str>) -> bool {
        let fallback = kind != DialogKind::Question;
        let Ok(mut terminal) = self.terminal.try_borrow_mut() else {
            tracing::warn!("Dialog requested while drawing: {}", text);
            return fallback;
        };
        let backdrop = self.backdrop.borrow();
        let theme = self.theme.borrow();

        loop {
            let drawn = terminal.draw(|f| {
                if let Some(buffer) = backdrop.as_ref() {
                    if buffer.area == f.area() {
                        f.buffer_mut().clone_from(buffer);
                    }
                }
                render_dialog(f, &theme, kind, text, detail);
            });
            if let Err(e) = drawn {
                tracing::error!("Failed to draw dialog: {}", e);
                return fallback;
            }

            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    match kind.handle_input(key.code) {
                        DialogAction::Accept => return true,
                        DialogAction::Reject => return false,
                        DialogAction::None => {}
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Failed to read dialog input: {}", e);
                    return fallback;
                }
            }
        }
    }
}

impl Dialogs for TerminalDialogs {
    fn warn(&self, text: &str, detail: Option<&str>) {
        self.run(DialogKind::Warning, text, detail);
    }

    fn info(&self, text: &str, detail: Option<&str>) {
        self.run(DialogKind::Information, text, detail);
    }

    fn sorry(&self, text: &str, detail: Option<&str>) {
        self.run(DialogKind::Sorry, text, detail);
    }

    fn confirm(&self, text: &str, detail: Option<&str>) -> bool {
        self.run(DialogKind::Question, text, detail)
    }
}

/// A dialog that was shown, as recorded by [`ScriptedDialogs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRecord {
    pub kind: DialogKind,
    pub text: String,
    pub detail: Option<String>,
}

impl DialogRecord {
    /// Whether the text or detail mentions `needle` (case-insensitive)
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.text.to_lowercase().contains(&needle)
            || self
                .detail
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// Non-interactive dialogs with queued answers
///
/// Questions take answers from the queue in order; once it is empty they
/// get the default answer.
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    answers: RefCell<VecDeque<bool>>,
    default_answer: Cell<bool>,
    log: RefCell<Vec<DialogRecord>>,
}

impl ScriptedDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_answer(&self, answer: bool) {
        self.answers.borrow_mut().push_back(answer);
    }

    pub fn set_default_answer(&self, answer: bool) {
        self.default_answer.set(answer);
    }

    pub fn records(&self) -> Vec<DialogRecord> {
        self.log.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn last(&self) -> Option<DialogRecord> {
        self.log.borrow().last().cloned()
    }

    fn record(&self, kind: DialogKind, text: &str, detail: Option<&str>) {
        tracing::debug!("{:?} dialog: {}", kind, text);
        self.log.borrow_mut().push(DialogRecord {
            kind,
            text: text.to_string(),
            detail: detail.map(str::to_string),
        });
    }
}

impl Dialogs for ScriptedDialogs {
    fn warn(&self, text: &str, detail: Option<&str>) {
        self.record(DialogKind::Warning, text, detail);
    }

    fn info(&self, text: &str, detail: Option<&str>) {
        self.record(DialogKind::Information, text, detail);
    }

    fn sorry(&self, text: &str, detail: Option<&str>) {
        self.record(DialogKind::Sorry, text, detail);
    }

    fn confirm(&self, text: &str, detail: Option<&str>) -> bool {
        self.record(DialogKind::Question, text, detail);
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or(self.default_answer.get())
    }
}
