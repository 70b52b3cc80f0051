//! Render context passed down the widget tree

use crate::ui::theme::Theme;

/// Immutable context passed to viewers during rendering
///
/// Viewers only see what they need to draw; they never get the workspace.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Color theme for styling
    pub theme: &'a Theme,

    /// Whether the pane being drawn has keyboard focus
    pub focused: bool,

    /// Animation frame counter (for spinners)
    pub animation_frame: usize,
}

impl<'a> RenderContext<'a> {
    pub fn new(theme: &'a Theme, focused: bool, animation_frame: usize) -> Self {
        Self {
            theme,
            focused,
            animation_frame,
        }
    }

    /// The same context for a child that does not hold focus
    pub fn unfocused(&self) -> Self {
        Self {
            focused: false,
            ..*self
        }
    }

    /// Spinner glyph for work that is still in progress
    pub fn spinner(&self) -> char {
        const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];
        SPINNER[self.animation_frame % SPINNER.len()]
    }
}
