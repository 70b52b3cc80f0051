// UI module - the packet workspace in the terminal
//
// This module owns the terminal for the lifetime of the session:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks)
// - Rendering the workspace
// - Handing modal dialogs the last completed frame as their backdrop

pub mod app;
pub mod clipboard;
pub mod dialogs;
pub mod frame;
pub mod packets;
pub mod pane;
pub mod registry;
pub mod tabbed;
pub mod text_area;
pub mod theme;
pub mod toast;
pub mod traits;
pub mod tree;
pub mod viewer;
pub mod views;

#[cfg(test)]
mod tests;

use crate::config::Preferences;
use crate::logging::LogBuffer;
use crate::packet::PacketRef;
use anyhow::{Context, Result};
use app::Workspace;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dialogs::{TerminalDialogs, Tui};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;
use theme::Theme;

/// Run the workspace on `root` until the user quits
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// afterwards even when the loop failed.
pub async fn run_tui(root: PacketRef, prefs: Rc<Preferences>, log_buffer: LogBuffer) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    let terminal = Rc::new(RefCell::new(terminal));

    let theme = Theme::by_name(&prefs.config().theme);
    let dialogs = Rc::new(TerminalDialogs::new(terminal.clone(), theme));
    let mut app = Workspace::new(
        root,
        dialogs.clone(),
        prefs,
        clipboard::default_clipboard(),
        log_buffer,
    );

    let result = run_event_loop(&terminal, &dialogs, &mut app).await;

    let mut terminal = terminal.borrow_mut();
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Keyboard input and timer ticks are awaited together with
/// `tokio::select!`; whichever arrives first is handled, then the workspace
/// is redrawn.
async fn run_event_loop(
    terminal: &Rc<RefCell<Tui>>,
    dialogs: &TerminalDialogs,
    app: &mut Workspace,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));
    let mut theme_name = app.theme.name.clone();

    loop {
        {
            let mut terminal = terminal.borrow_mut();
            let completed = terminal
                .draw(|f| views::draw(f, app))
                .context("Failed to draw terminal")?;
            dialogs.set_backdrop(completed.buffer.clone());
        }

        tokio::select! {
            input = async { event::poll(Duration::from_millis(10)) } => {
                if input.unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key_event)) => app.handle_key(key_event),
                        Ok(_) => {}
                        Err(e) => tracing::warn!("Failed to read terminal input: {}", e),
                    }
                }
            }

            _ = tick_interval.tick() => app.tick(),
        }

        if app.theme.name != theme_name {
            theme_name = app.theme.name.clone();
            dialogs.set_theme(app.theme.clone());
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
