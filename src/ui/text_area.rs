//! Text editing widgets
//!
//! [`TextArea`] is a multi-line editor with a shift-extended selection, used
//! by the text and script viewers. [`LineEdit`] is the single-line editor
//! that table viewers open over a cell.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::clipboard::Clipboard;
use super::traits::{EditInterface, EditSignal, Handled, RenderContext};

/// Byte offset of character `col` in `s`
fn byte_at(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map_or(s.len(), |(i, _)| i)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

type Pos = (usize, usize);

/// Multi-line plain text editor
#[derive(Debug)]
pub struct TextArea {
    lines: Vec<String>,
    cursor: Pos,
    anchor: Option<Pos>,
    scroll: usize,
    read_only: bool,
    tab_width: usize,
    changed: bool,
    signal: EditSignal,
}

impl Default for TextArea {
    fn default() -> Self {
        Self::new()
    }
}

impl TextArea {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: (0, 0),
            anchor: None,
            scroll: 0,
            read_only: false,
            tab_width: 4,
            changed: false,
            signal: EditSignal::new(),
        }
    }

    /// Replace the whole text and move to the top
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.cursor = (0, 0);
        self.anchor = None;
        self.scroll = 0;
        self.changed = false;
        self.signal.emit();
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn cursor(&self) -> Pos {
        self.cursor
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        if self.read_only != read_only {
            self.read_only = read_only;
            self.signal.emit();
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_tab_width(&mut self, width: usize) {
        self.tab_width = width.max(1);
    }

    /// Whether the text was edited since the last call
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn has_selection(&self) -> bool {
        self.anchor.is_some_and(|a| a != self.cursor)
    }

    fn selection_range(&self) -> Option<(Pos, Pos)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some(if anchor < self.cursor {
            (anchor, self.cursor)
        } else {
            (self.cursor, anchor)
        })
    }

    pub fn selected_text(&self) -> Option<String> {
        let ((r0, c0), (r1, c1)) = self.selection_range()?;
        if r0 == r1 {
            let line = &self.lines[r0];
            return Some(line[byte_at(line, c0)..byte_at(line, c1)].to_string());
        }
        let mut out = self.lines[r0][byte_at(&self.lines[r0], c0)..].to_string();
        for line in &self.lines[r0 + 1..r1] {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        out.push_str(&self.lines[r1][..byte_at(&self.lines[r1], c1)]);
        Some(out)
    }

    fn delete_selection(&mut self) -> bool {
        let Some(((r0, c0), (r1, c1))) = self.selection_range() else {
            return false;
        };
        let tail = self.lines[r1][byte_at(&self.lines[r1], c1)..].to_string();
        let head_end = byte_at(&self.lines[r0], c0);
        self.lines[r0].truncate(head_end);
        self.lines[r0].push_str(&tail);
        self.lines.drain(r0 + 1..=r1);
        self.cursor = (r0, c0);
        self.anchor = None;
        self.changed = true;
        true
    }

    /// Insert `text` at the cursor, replacing any selection
    pub fn insert_str(&mut self, text: &str) {
        if self.read_only {
            return;
        }
        self.delete_selection();
        let (row, col) = self.cursor;
        let split = byte_at(&self.lines[row], col);
        let rest = self.lines[row].split_off(split);

        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            self.lines[row].push_str(first);
        }
        let mut row = row;
        for piece in pieces {
            row += 1;
            self.lines.insert(row, piece.to_string());
        }
        let col = char_len(&self.lines[row]);
        self.lines[row].push_str(&rest);
        self.cursor = (row, col);
        self.changed = true;
    }

    fn backspace(&mut self) {
        if self.delete_selection() {
            return;
        }
        let (row, col) = self.cursor;
        if col > 0 {
            let line = &mut self.lines[row];
            let start = byte_at(line, col - 1);
            let end = byte_at(line, col);
            line.replace_range(start..end, "");
            self.cursor = (row, col - 1);
        } else if row > 0 {
            let line = self.lines.remove(row);
            let prev = char_len(&self.lines[row - 1]);
            self.lines[row - 1].push_str(&line);
            self.cursor = (row - 1, prev);
        } else {
            return;
        }
        self.changed = true;
    }

    fn delete(&mut self) {
        if self.delete_selection() {
            return;
        }
        let (row, col) = self.cursor;
        if col < char_len(&self.lines[row]) {
            let line = &mut self.lines[row];
            let start = byte_at(line, col);
            let end = byte_at(line, col + 1);
            line.replace_range(start..end, "");
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
        } else {
            return;
        }
        self.changed = true;
    }

    fn move_cursor(&mut self, code: KeyCode) {
        let (row, col) = self.cursor;
        let len = |r: usize| char_len(&self.lines[r]);
        self.cursor = match code {
            KeyCode::Left if col > 0 => (row, col - 1),
            KeyCode::Left if row > 0 => (row - 1, len(row - 1)),
            KeyCode::Right if col < len(row) => (row, col + 1),
            KeyCode::Right if row + 1 < self.lines.len() => (row + 1, 0),
            KeyCode::Up if row > 0 => (row - 1, col.min(len(row - 1))),
            KeyCode::Down if row + 1 < self.lines.len() => (row + 1, col.min(len(row + 1))),
            KeyCode::Home => (row, 0),
            KeyCode::End => (row, len(row)),
            KeyCode::PageUp => (row.saturating_sub(10), 0),
            KeyCode::PageDown => ((row + 10).min(self.lines.len() - 1), 0),
            _ => (row, col),
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Handled {
        let had_selection = self.has_selection();
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let handled = match key.code {
            KeyCode::Left
            | KeyCode::Right
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Home
            | KeyCode::End
            | KeyCode::PageUp
            | KeyCode::PageDown => {
                if shift {
                    self.anchor.get_or_insert(self.cursor);
                } else {
                    self.anchor = None;
                }
                self.move_cursor(key.code);
                true
            }
            _ if self.read_only => false,
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_str(c.encode_utf8(&mut [0; 4]));
                true
            }
            KeyCode::Enter => {
                self.insert_str("\n");
                true
            }
            KeyCode::Tab => {
                self.insert_str(&" ".repeat(self.tab_width));
                true
            }
            KeyCode::Backspace => {
                self.backspace();
                true
            }
            KeyCode::Delete => {
                self.delete();
                true
            }
            _ => false,
        };
        if had_selection != self.has_selection() {
            self.signal.emit();
        }
        Handled::from_bool(handled)
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let height = area.height.max(1) as usize;
        let row = self.cursor.0;
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + height {
            self.scroll = row + 1 - height;
        }

        let theme = ctx.theme;
        let selection = self.selection_range();
        let lines: Vec<Line> = self
            .lines
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(height)
            .map(|(r, line)| match selection {
                Some(((r0, c0), (r1, c1))) if r >= r0 && r <= r1 => {
                    let start = if r == r0 { byte_at(line, c0) } else { 0 };
                    let end = if r == r1 { byte_at(line, c1) } else { line.len() };
                    Line::from(vec![
                        Span::raw(line[..start].to_string()),
                        Span::styled(line[start..end].to_string(), theme.selected()),
                        Span::raw(line[end..].to_string()),
                    ])
                }
                _ => Line::raw(line.clone()),
            })
            .collect();
        f.render_widget(
            Paragraph::new(lines).style(Style::default().fg(theme.foreground)),
            area,
        );

        if ctx.focused {
            let line = &self.lines[row];
            let x = line[..byte_at(line, self.cursor.1)].width() as u16;
            let y = (row - self.scroll) as u16;
            if x < area.width && y < area.height {
                f.set_cursor_position(Position::new(area.x + x, area.y + y));
            }
        }
    }
}

impl EditInterface for TextArea {
    fn cut_enabled(&self) -> bool {
        !self.read_only && self.has_selection()
    }

    fn copy_enabled(&self) -> bool {
        self.has_selection()
    }

    fn paste_enabled(&self) -> bool {
        !self.read_only
    }

    fn cut(&mut self, clipboard: &mut dyn Clipboard) {
        if let Some(text) = self.selected_text() {
            if clipboard.set_text(&text) {
                self.delete_selection();
                self.signal.emit();
            }
        }
    }

    fn copy(&mut self, clipboard: &mut dyn Clipboard) {
        if let Some(text) = self.selected_text() {
            clipboard.set_text(&text);
        }
    }

    fn paste(&mut self, clipboard: &mut dyn Clipboard) {
        if let Some(text) = clipboard.get_text() {
            self.insert_str(&text.replace("\r\n", "\n"));
            self.signal.emit();
        }
    }

    fn states_changed(&self) -> &EditSignal {
        &self.signal
    }
}

/// What a key did to a [`LineEdit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Editing,
    Submit,
    Cancel,
    Ignored,
}

/// Single-line editor
#[derive(Debug, Clone, Default)]
pub struct LineEdit {
    value: String,
    cursor: usize,
}

impl LineEdit {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = char_len(&value);
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LineOutcome {
        match key.code {
            KeyCode::Enter => return LineOutcome::Submit,
            KeyCode::Esc => return LineOutcome::Cancel,
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let at = byte_at(&self.value, self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                let start = byte_at(&self.value, self.cursor - 1);
                let end = byte_at(&self.value, self.cursor);
                self.value.replace_range(start..end, "");
                self.cursor -= 1;
            }
            KeyCode::Delete if self.cursor < char_len(&self.value) => {
                let start = byte_at(&self.value, self.cursor);
                let end = byte_at(&self.value, self.cursor + 1);
                self.value.replace_range(start..end, "");
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(char_len(&self.value)),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = char_len(&self.value),
            KeyCode::Backspace | KeyCode::Delete => {}
            _ => return LineOutcome::Ignored,
        }
        LineOutcome::Editing
    }

    pub fn render(&self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let style = Style::default()
            .fg(ctx.theme.foreground)
            .bg(ctx.theme.selection_bg);
        f.render_widget(Paragraph::new(self.value.as_str()).style(style), area);
        let x = self.value[..byte_at(&self.value, self.cursor)].width() as u16;
        if x < area.width {
            f.set_cursor_position(Position::new(area.x + x, area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::clipboard::MemoryClipboard;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    fn shift(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    fn type_str(area: &mut TextArea, s: &str) {
        for c in s.chars() {
            area.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_and_newlines() {
        let mut area = TextArea::new();
        type_str(&mut area, "ab");
        area.handle_key(key(KeyCode::Enter));
        type_str(&mut area, "cd");
        area.handle_key(key(KeyCode::Backspace));
        assert_eq!(area.text(), "ab\nc");
        assert!(area.take_changed());
        assert!(!area.take_changed());
    }

    #[test]
    fn test_selection_cut_and_paste() {
        let mut area = TextArea::new();
        area.set_text("hello world");
        area.handle_key(key(KeyCode::End));
        for _ in 0..5 {
            area.handle_key(shift(KeyCode::Left));
        }
        assert_eq!(area.selected_text().as_deref(), Some("world"));
        assert!(area.cut_enabled());

        let mut clipboard = MemoryClipboard::new();
        area.cut(&mut clipboard);
        assert_eq!(area.text(), "hello ");
        area.handle_key(key(KeyCode::Home));
        area.paste(&mut clipboard);
        assert_eq!(area.text(), "worldhello ");
    }

    #[test]
    fn test_multiline_selection() {
        let mut area = TextArea::new();
        area.set_text("one\ntwo\nthree");
        area.handle_key(key(KeyCode::Right));
        area.handle_key(shift(KeyCode::Down));
        area.handle_key(shift(KeyCode::Down));
        assert_eq!(area.selected_text().as_deref(), Some("ne\ntwo\nt"));
        area.handle_key(key(KeyCode::Delete));
        assert_eq!(area.text(), "ohree");
    }

    #[test]
    fn test_read_only_blocks_edits() {
        let mut area = TextArea::new();
        area.set_text("fixed");
        area.set_read_only(true);
        assert!(!area.handle_key(key(KeyCode::Char('x'))).was_handled());
        assert!(area.handle_key(key(KeyCode::End)).was_handled());
        assert!(!area.paste_enabled());
        assert_eq!(area.text(), "fixed");
    }

    #[test]
    fn test_line_edit() {
        let mut edit = LineEdit::new("1 (012");
        assert_eq!(edit.handle_key(key(KeyCode::Char('3'))), LineOutcome::Editing);
        assert_eq!(edit.handle_key(key(KeyCode::Char(')'))), LineOutcome::Editing);
        assert_eq!(edit.value(), "1 (0123)");
        edit.handle_key(key(KeyCode::Home));
        edit.handle_key(key(KeyCode::Delete));
        assert_eq!(edit.value(), " (0123)");
        assert_eq!(edit.handle_key(key(KeyCode::Enter)), LineOutcome::Submit);
        assert_eq!(edit.handle_key(key(KeyCode::F(9))), LineOutcome::Ignored);
    }
}
