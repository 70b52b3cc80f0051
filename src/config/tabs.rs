//! Remembered tab selection per family of tabbed viewers

use serde::Deserialize;

/// Index of the last tab selected in each tabbed family
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabsConfig {
    pub triangulation2: usize,
    pub triangulation3: usize,
    pub triangulation4: usize,
    pub surfaces: usize,
}

#[derive(Debug, Deserialize, Default)]
pub struct FileTabs {
    pub triangulation2: Option<usize>,
    pub triangulation3: Option<usize>,
    pub triangulation4: Option<usize>,
    pub surfaces: Option<usize>,
}

impl TabsConfig {
    pub fn from_file(file: Option<FileTabs>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            triangulation2: file.triangulation2.unwrap_or(0),
            triangulation3: file.triangulation3.unwrap_or(0),
            triangulation4: file.triangulation4.unwrap_or(0),
            surfaces: file.surfaces.unwrap_or(0),
        }
    }
}
