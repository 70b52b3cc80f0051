//! Text packet editor

use crate::error::Result;
use crate::packet::{PacketContent, PacketRef};
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use super::{content_as, wrong_content};
use crate::ui::text_area::TextArea;
use crate::ui::clipboard::Clipboard;
use crate::ui::traits::{EditInterface, EditSignal, Handled, RenderContext};
use crate::ui::viewer::{PacketViewer, PaneContext};

pub fn create(packet: &PacketRef, ctx: &PaneContext) -> Result<Box<dyn PacketViewer>> {
    if content_as(packet, |c| match c {
        PacketContent::Text(s) => Some(s),
        _ => None,
    })
    .is_none()
    {
        return Err(wrong_content(packet, "text"));
    }
    let mut viewer = TextViewer {
        packet: packet.clone(),
        ctx: ctx.clone(),
        area: TextArea::new(),
        track_changes: true,
    };
    viewer.update_preferences();
    viewer.refresh();
    Ok(Box::new(viewer))
}

/// Cut and paste change the text, so they mark the pane dirty too
impl EditInterface for TextViewer {
    fn cut_enabled(&self) -> bool {
        self.area.cut_enabled()
    }

    fn copy_enabled(&self) -> bool {
        self.area.copy_enabled()
    }

    fn paste_enabled(&self) -> bool {
        self.area.paste_enabled()
    }

    fn cut(&mut self, clipboard: &mut dyn Clipboard) {
        self.area.cut(clipboard);
        if self.area.take_changed() {
            self.ctx.set_dirty(true);
        }
    }

    fn copy(&mut self, clipboard: &mut dyn Clipboard) {
        self.area.copy(clipboard);
    }

    fn paste(&mut self, clipboard: &mut dyn Clipboard) {
        self.area.paste(clipboard);
        if self.area.take_changed() {
            self.ctx.set_dirty(true);
        }
    }

    fn states_changed(&self) -> &EditSignal {
        self.area.states_changed()
    }
}

pub struct TextViewer {
    packet: PacketRef,
    ctx: PaneContext,
    area: TextArea,
    track_changes: bool,
}

impl TextViewer {
    pub fn text(&self) -> String {
        self.area.text()
    }
}

impl PacketViewer for TextViewer {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        self.area.render(f, area, ctx);
    }

    fn refresh(&mut self) {
        let text = content_as(&self.packet, |c| match c {
            PacketContent::Text(s) => Some(s),
            _ => None,
        })
        .map(|s| s.clone())
        .unwrap_or_default();
        self.area.set_text(&text);
    }

    fn is_editor(&self) -> bool {
        true
    }

    fn commit(&mut self) {
        let text = self.area.text();
        self.packet.edit_content(|c| {
            if let PacketContent::Text(s) = c {
                *s = text;
            }
        });
    }

    fn set_read_write(&mut self, read_write: bool) {
        self.area.set_read_only(!read_write);
    }

    fn edit_interface(&mut self) -> Option<&mut dyn EditInterface> {
        Some(self)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled> {
        let handled = self.area.handle_key(key);
        if self.area.take_changed() {
            self.ctx.set_dirty(true);
        }
        Ok(handled)
    }

    fn update_preferences(&mut self) {
        let prefs = self.ctx.prefs.config();
        self.track_changes = prefs.editor.track_changes;
        self.area.set_tab_width(prefs.editor.tab_width);
    }

    fn dirtiness_reliable(&self) -> bool {
        self.track_changes
    }

    fn key_hints(&self) -> &'static str {
        "S-arrows select"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;
    use crate::ui::viewer::TestContext;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_typing_marks_dirty_and_commit_writes_text() {
        let t = TestContext::new();
        let packet = Packet::new("note", PacketContent::Text("ab".to_string()));
        let mut viewer = create(&packet, &t.ctx).unwrap();
        assert!(viewer.dirtiness_reliable());

        viewer
            .handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE))
            .unwrap();
        assert!(t.marked_dirty());

        viewer.commit();
        match &*packet.content() {
            PacketContent::Text(s) => assert_eq!(s.len(), 3),
            _ => panic!("not text"),
        };
    }

    #[test]
    fn test_untracked_editor_reports_unreliable_dirtiness() {
        let t = TestContext::new();
        t.ctx.prefs.update(|c| c.editor.track_changes = false);
        let packet = Packet::new("note", PacketContent::Text(String::new()));
        let viewer = create(&packet, &t.ctx).unwrap();
        assert!(!viewer.dirtiness_reliable());
    }

    #[test]
    fn test_wrong_content_is_rejected() {
        let t = TestContext::new();
        let packet = Packet::new("box", PacketContent::Container);
        assert!(create(&packet, &t.ctx).is_err());
    }
}
