//! Main event loop for the TUI.
//!
//! This module contains the single loop that multiplexes terminal input,
//! the feed refresh timer and shutdown signals.

use crate::app::{Action, App, Message};
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::input::handle_input;
use super::render::render;

pub const WINDOW_TITLE: &str = "Gnome RSS Stalker";

/// Runs the TUI application event loop.
///
/// Uses `tokio::select!` to multiplex:
/// - **Terminal input**: Key presses from crossterm's async event stream
/// - **Refresh timer**: Re-fetches the displayed feed every `refresh_period`
/// - **Status tick**: 250ms timer for status message expiry
///
/// Messages are dispatched inline, so a slow fetch holds up input until it
/// completes.
///
/// # Panic Safety
///
/// Installs a panic hook that restores terminal state before unwinding,
/// ensuring the terminal is not left in raw mode on panic.
///
/// # Returns
///
/// `Ok(())` on user quit or shutdown signal. Errors from dispatching a
/// message end the loop; the terminal is restored before they are returned.
pub async fn run(app: &mut App, refresh_period: Duration) -> Result<()> {
    // Install panic hook BEFORE setting up terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, app, refresh_period).await;
    restore_terminal(terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    refresh_period: Duration,
) -> Result<()> {
    let mut event_stream = EventStream::new();

    // First refresh one full period after startup; feeds were just fetched
    let mut refresh_interval =
        tokio::time::interval_at(Instant::now() + refresh_period, refresh_period);
    refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut status_interval = tokio::time::interval(Duration::from_millis(250));

    // Signal handlers for graceful shutdown (Unix only)
    // On non-Unix platforms, these become pending futures that never complete
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        // Clear expired status messages and trigger redraw if cleared
        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Only render when state has changed
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        // Platform-specific signal futures
        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;  // Process in order listed for predictable behavior

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if handle_input(app, key.code, key.modifiers).await? == Action::Quit {
                            break;
                        }
                    }
                    Some(Ok(Event::Resize(_, _))) => app.needs_redraw = true,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }

            _ = refresh_interval.tick() => {
                app.dispatch(Message::Tick).await?;
            }

            _ = status_interval.tick() => {}
        }
    }

    Ok(())
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle(WINDOW_TITLE))?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
