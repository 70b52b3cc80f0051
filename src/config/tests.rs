//! Configuration tests
//!
//! The round-trip tests guard the hand-written serializer: when a field is
//! added to `Config`, they fail until `to_toml` writes it.

use super::*;
use std::collections::HashMap;

fn parse(toml_str: &str) -> FileConfig {
    toml::from_str(toml_str).expect("valid TOML")
}

fn no_env(_: &str) -> Option<String> {
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

#[test]
fn test_config_roundtrip_preserves_values() {
    let mut config = Config::default();
    config.theme = "light".to_string();
    config.pdf.auto_close = false;
    config.pdf.external_viewer = "/usr/bin/evince".to_string();
    config.graphviz.executable = "dot".to_string();
    config.graphviz.labels = false;
    config.gap.executable = "/opt/gap/bin/gap.sh".to_string();
    config.editor.track_changes = false;
    config.tabs.triangulation3 = 2;
    config.tabs.surfaces = 1;
    config.logging.file_rotation = LogRotation::Hourly;

    let reloaded = Config::from_sources(parse(&config.to_toml()), no_env);
    assert_eq!(reloaded, config);
}

#[test]
fn test_quotes_are_escaped() {
    let mut config = Config::default();
    config.pdf.external_viewer = r#"C:\Tools\"viewer".exe"#.to_string();
    let reloaded = Config::from_sources(parse(&config.to_toml()), no_env);
    assert_eq!(reloaded.pdf.external_viewer, config.pdf.external_viewer);
}

#[test]
fn test_read_only_is_never_persisted() {
    let config = Config {
        read_only: true,
        ..Config::default()
    };
    assert!(!config.to_toml().contains("read_only"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_partial_file_uses_defaults() {
    let file = parse("[graphviz]\nlabels = false\n");
    let config = Config::from_sources(file, no_env);
    assert!(!config.graphviz.labels);
    assert_eq!(config.graphviz.executable, "neato");
    assert_eq!(config.pdf, PdfConfig::default());
}

#[test]
fn test_env_overrides_file() {
    let file = parse("[gap]\nexecutable = \"gap-from-file\"\n");
    let env: HashMap<&str, &str> = [
        (ENV_GAP, "gap-from-env"),
        (ENV_GRAPHVIZ, "dot"),
        (ENV_PDF_VIEWER, "zathura"),
        (ENV_READ_ONLY, "true"),
    ]
    .into_iter()
    .collect();

    let config = Config::from_sources(file, |name| env.get(name).map(|v| v.to_string()));
    assert_eq!(config.gap.executable, "gap-from-env");
    assert_eq!(config.graphviz.executable, "dot");
    assert_eq!(config.pdf.external_viewer, "zathura");
    assert!(config.read_only);
}

#[test]
fn test_unknown_rotation_falls_back_to_daily() {
    let file = parse("[logging]\nfile_rotation = \"weekly\"\n");
    let config = Config::from_sources(file, no_env);
    assert_eq!(config.logging.file_rotation, LogRotation::Daily);
}

#[test]
fn test_log_level_is_normalised() {
    let file = parse("[logging]\nlevel = \" DEBUG \"\nfile_rotation = \"Never\"\n");
    let config = Config::from_sources(file, no_env);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file_rotation, LogRotation::Never);

    let file = parse("[logging]\nlevel = \"verbose\"\nfile_prefix = \"  \"\n");
    let config = Config::from_sources(file, no_env);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_prefix, "regina-tui");
}

#[test]
fn test_tab_width_is_clamped() {
    let file = parse("[editor]\ntab_width = 0\n");
    assert_eq!(Config::from_sources(file, no_env).editor.tab_width, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Preferences
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_preferences_generation_and_tab_cells() {
    let prefs = Preferences::default();
    assert_eq!(prefs.generation(), 0);

    prefs.set_last_tab(TabFamily::Triangulation3, 2);
    assert_eq!(prefs.last_tab(TabFamily::Triangulation3), 2);
    assert_eq!(prefs.last_tab(TabFamily::Triangulation2), 0);
    assert_eq!(prefs.generation(), 0);

    prefs.update(|c| c.graphviz.labels = false);
    assert_eq!(prefs.generation(), 1);
    assert!(!prefs.config().graphviz.labels);
}
