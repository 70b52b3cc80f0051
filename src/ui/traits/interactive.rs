//! Key-handling result

/// Result of handling a key event
///
/// Tells the caller whether the viewer consumed the event or if it should
/// bubble up for pane-level or workspace-level handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Event was consumed
    Yes,
    /// Event was not handled, should bubble up
    No,
}

impl Handled {
    pub fn from_bool(handled: bool) -> Self {
        if handled {
            Self::Yes
        } else {
            Self::No
        }
    }

    pub fn was_handled(self) -> bool {
        self == Self::Yes
    }
}

impl From<bool> for Handled {
    fn from(handled: bool) -> Self {
        Self::from_bool(handled)
    }
}
