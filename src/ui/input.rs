//! Input handling for the TUI.
//!
//! Key presses move cursors and switch focus directly. Anything the
//! application reacts to (a new feed under the cursor, an activated
//! article, quitting) goes through [`App::dispatch`].

use crate::app::{Action, App, Focus, Message};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};

/// Rows moved by PageUp/PageDown.
const PAGE: isize = 10;

/// Handle one key press.
pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<Action> {
    app.needs_redraw = true;

    let message = match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Message::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Message::Quit),
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::PageDown => app.move_cursor(PAGE),
        KeyCode::PageUp => app.move_cursor(-PAGE),
        KeyCode::Char('g') | KeyCode::Home => app.jump_cursor(false),
        KeyCode::Char('G') | KeyCode::End => app.jump_cursor(true),
        KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_focus();
            None
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.set_focus(Focus::Feeds);
            None
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.set_focus(Focus::Articles);
            None
        }
        KeyCode::Enter | KeyCode::Char('o') => match app.focus {
            Focus::Feeds => {
                app.set_focus(Focus::Articles);
                None
            }
            Focus::Articles => app.selected_article.map(Message::ActivateArticle),
        },
        _ => None,
    };

    match message {
        Some(message) => app.dispatch(message).await,
        None => Ok(Action::Continue),
    }
}
