//! Runtime preferences shared by every pane
//!
//! Wraps the loaded [`Config`] for on-demand reads. Panes never cache values;
//! they re-read whatever they need when the workspace broadcasts a
//! preferences change (detected through [`Preferences::generation`]).

use super::Config;
use std::cell::{Cell, Ref, RefCell};

/// Families of tabbed viewers that remember their last selected tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabFamily {
    Triangulation2,
    Triangulation3,
    Triangulation4,
    NormalSurfaces,
}

#[derive(Debug)]
pub struct Preferences {
    config: RefCell<Config>,
    generation: Cell<u64>,
}

impl Preferences {
    pub fn new(config: Config) -> Self {
        Self {
            config: RefCell::new(config),
            generation: Cell::new(0),
        }
    }

    pub fn config(&self) -> Ref<'_, Config> {
        self.config.borrow()
    }

    /// Apply a change and bump the generation so panes re-read it
    pub fn update(&self, f: impl FnOnce(&mut Config)) {
        f(&mut self.config.borrow_mut());
        self.generation.set(self.generation.get() + 1);
        tracing::debug!("Preferences changed (generation {})", self.generation.get());
    }

    /// Incremented on every [`update`](Self::update)
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn last_tab(&self, family: TabFamily) -> usize {
        let config = self.config.borrow();
        match family {
            TabFamily::Triangulation2 => config.tabs.triangulation2,
            TabFamily::Triangulation3 => config.tabs.triangulation3,
            TabFamily::Triangulation4 => config.tabs.triangulation4,
            TabFamily::NormalSurfaces => config.tabs.surfaces,
        }
    }

    /// Record the tab the user last looked at
    ///
    /// This is bookkeeping rather than a user-visible preference change, so
    /// it does not bump the generation.
    pub fn set_last_tab(&self, family: TabFamily, index: usize) {
        let mut config = self.config.borrow_mut();
        let cell = match family {
            TabFamily::Triangulation2 => &mut config.tabs.triangulation2,
            TabFamily::Triangulation3 => &mut config.tabs.triangulation3,
            TabFamily::Triangulation4 => &mut config.tabs.triangulation4,
            TabFamily::NormalSurfaces => &mut config.tabs.surfaces,
        };
        *cell = index;
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
