//! Per-pane actions: commit, refresh, dock toggle, close and clipboard

/// One user-triggerable pane action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub enabled: bool,
    /// Key shown next to the label in the footer
    pub key: &'static str,
}

impl Action {
    fn new(label: &str, key: &'static str, enabled: bool) -> Self {
        Self {
            label: label.to_string(),
            enabled,
            key,
        }
    }
}

/// The actions every pane owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneActions {
    pub commit: Action,
    pub refresh: Action,
    pub dock: Action,
    pub close: Action,
    pub cut: Action,
    pub copy: Action,
    pub paste: Action,
}

impl PaneActions {
    pub fn new(docked: bool) -> Self {
        let mut actions = Self {
            commit: Action::new("Commit", "F2", false),
            refresh: Action::new("Refresh", "F5", true),
            dock: Action::new("Float", "F3", true),
            close: Action::new("Close", "F4", true),
            cut: Action::new("Cut", "^X", false),
            copy: Action::new("Copy", "^C", false),
            paste: Action::new("Paste", "^V", false),
        };
        actions.set_docked(docked);
        actions
    }

    /// Commit and refresh follow the pane's dirty state
    pub fn apply_dirty_policy(&mut self, dirty: bool, read_write: bool, dirtiness_broken: bool) {
        if dirtiness_broken {
            self.commit.enabled = read_write;
            self.refresh.label = if dirty { "Discard / Refresh" } else { "Refresh" }.to_string();
        } else {
            self.commit.enabled = dirty;
            self.refresh.label = if dirty { "Discard" } else { "Refresh" }.to_string();
        }
    }

    /// The dock toggle always offers the opposite of the current state
    pub fn set_docked(&mut self, docked: bool) {
        self.dock.label = if docked { "Float" } else { "Dock" }.to_string();
    }

    pub fn set_clipboard(&mut self, cut: bool, copy: bool, paste: bool) {
        self.cut.enabled = cut;
        self.copy.enabled = copy;
        self.paste.enabled = paste;
    }

    /// Actions shown in the pane footer, in display order
    pub fn footer(&self) -> [&Action; 4] {
        [&self.commit, &self.refresh, &self.dock, &self.close]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_policy_labels() {
        let mut actions = PaneActions::new(true);
        actions.apply_dirty_policy(true, true, false);
        assert!(actions.commit.enabled);
        assert_eq!(actions.refresh.label, "Discard");

        actions.apply_dirty_policy(false, true, false);
        assert!(!actions.commit.enabled);
        assert_eq!(actions.refresh.label, "Refresh");

        actions.apply_dirty_policy(true, true, true);
        assert_eq!(actions.refresh.label, "Discard / Refresh");
        actions.apply_dirty_policy(false, false, true);
        assert!(!actions.commit.enabled);
    }

    #[test]
    fn test_dock_label_reverses() {
        let mut actions = PaneActions::new(true);
        assert_eq!(actions.dock.label, "Float");
        actions.set_docked(false);
        assert_eq!(actions.dock.label, "Dock");
    }
}
