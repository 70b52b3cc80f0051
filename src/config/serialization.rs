//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// Quote a string for TOML, escaping backslashes and quotes
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Config {
    /// Serialize the persistable settings as a commented TOML document
    ///
    /// `read_only` is a runtime flag and is never written.
    pub fn to_toml(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# regina-tui configuration (v{})\n",
            super::VERSION
        ));
        out.push_str("# Environment overrides: REGINA_TUI_GRAPHVIZ, REGINA_TUI_GAP,\n");
        out.push_str("# REGINA_TUI_PDF_VIEWER, REGINA_TUI_READ_ONLY\n\n");

        out.push_str("# Colour theme: \"dark\" or \"light\"\n");
        out.push_str(&format!("theme = {}\n", quoted(&self.theme)));

        out.push_str("\n[logging]\n");
        out.push_str("# trace, debug, info, warn, error (RUST_LOG takes precedence)\n");
        out.push_str(&format!("level = {}\n", quoted(&self.logging.level)));
        out.push_str(&format!("file_enabled = {}\n", self.logging.file_enabled));
        out.push_str(&format!(
            "file_dir = {}\n",
            quoted(&self.logging.file_dir.display().to_string())
        ));
        out.push_str("# hourly, daily, never\n");
        out.push_str(&format!(
            "file_rotation = {}\n",
            quoted(self.logging.file_rotation.as_str())
        ));
        out.push_str(&format!("file_prefix = {}\n", quoted(&self.logging.file_prefix)));

        out.push_str("\n[pdf]\n");
        out.push_str("# Kill the external viewer when its pane closes\n");
        out.push_str(&format!("auto_close = {}\n", self.pdf.auto_close));
        out.push_str("# Show document details in the pane rather than launching a viewer on open\n");
        out.push_str(&format!("embed = {}\n", self.pdf.embed));
        out.push_str("# Empty means the platform default (xdg-open / open)\n");
        out.push_str(&format!(
            "external_viewer = {}\n",
            quoted(&self.pdf.external_viewer)
        ));

        out.push_str("\n[graphviz]\n");
        out.push_str(&format!("executable = {}\n", quoted(&self.graphviz.executable)));
        out.push_str(&format!("labels = {}\n", self.graphviz.labels));

        out.push_str("\n[gap]\n");
        out.push_str(&format!("executable = {}\n", quoted(&self.gap.executable)));
        out.push_str(&format!("timeout_secs = {}\n", self.gap.timeout_secs));

        out.push_str("\n[editor]\n");
        out.push_str(&format!("track_changes = {}\n", self.editor.track_changes));
        out.push_str(&format!("tab_width = {}\n", self.editor.tab_width));

        out.push_str("\n[tabs]\n");
        out.push_str("# Last selected tab per viewer family (restored on open)\n");
        out.push_str(&format!("triangulation2 = {}\n", self.tabs.triangulation2));
        out.push_str(&format!("triangulation3 = {}\n", self.tabs.triangulation3));
        out.push_str(&format!("triangulation4 = {}\n", self.tabs.triangulation4));
        out.push_str(&format!("surfaces = {}\n", self.tabs.surfaces));

        out
    }
}
