// Regina TUI - packet workspace in the terminal
//
// Opens a packet tree (the sample document unless --no-demo is given) and
// runs the workspace until the user quits.
//
// Architecture:
// - Packet model: a tree of packets with change listeners
// - Panes: one per open packet, docked beside the tree or floating above it
// - Viewers: one per packet type, looked up in the viewer registry
// - Event queues: listener callbacks post typed events drained each tick

mod cli;

use anyhow::Result;
use clap::Parser;
use regina_tui::config::{Config, LogRotation, Preferences};
use regina_tui::logging::{LogBuffer, TuiLogLayer};
use regina_tui::packet::{Packet, PacketContent};
use regina_tui::{demo, ui};
use std::rc::Rc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, --path)
    let cli = cli::Cli::parse();
    if cli::handle_command(&cli)? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::load()?;
    if cli.read_only {
        config.read_only = true;
    }

    // Logs go to the buffer shown in the status bar, never to stdout, which
    // would garble the display. File logging is optional and in addition.
    //
    // Precedence: RUST_LOG env var > config file > default "info"
    let log_buffer = LogBuffer::new();
    let default_filter = format!("regina_tui={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    // The guard must be kept alive for the duration of the program to ensure logs flush
    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard> =
        if config.logging.file_enabled {
            if let Err(e) = std::fs::create_dir_all(&config.logging.file_dir) {
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.logging.file_dir, e
                );
                tracing_subscriber::registry()
                    .with(filter)
                    .with(TuiLogLayer::new(log_buffer.clone()))
                    .init();
                None
            } else {
                let file_appender = match config.logging.file_rotation {
                    LogRotation::Hourly => tracing_appender::rolling::hourly(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                    LogRotation::Daily => tracing_appender::rolling::daily(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                    LogRotation::Never => tracing_appender::rolling::never(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                };

                // Wrap in non-blocking writer (writes happen in background thread)
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                // File layer uses JSON format for structured log parsing
                tracing_subscriber::registry()
                    .with(filter)
                    .with(TuiLogLayer::new(log_buffer.clone()))
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(non_blocking)
                            .with_ansi(false),
                    )
                    .init();

                Some(guard)
            }
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(TuiLogLayer::new(log_buffer.clone()))
                .init();
            None
        };

    let registry = ui::registry::init();
    tracing::debug!(
        "Viewer registry ready for {} packet types",
        registry.registered_types().len()
    );

    let root = if cli.no_demo {
        Packet::new("Untitled", PacketContent::Container)
    } else {
        demo::sample_document()
    };

    if config.read_only {
        tracing::info!("Opening {} read-only", root.label());
    }

    let prefs = Rc::new(Preferences::new(config));
    let result = ui::run_tui(root, prefs.clone(), log_buffer).await;

    // Remember the theme and last selected tabs for next time. The terminal
    // is restored by now, so report straight to stderr.
    if let Err(e) = prefs.config().save() {
        eprintln!("Warning: Could not save preferences: {:#}", e);
    }

    result
}
