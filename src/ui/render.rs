//! Render functions for the TUI.
//!
//! Lays out the feed and article panes side by side above a one-line
//! status bar.

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::Paragraph,
    Frame,
};

use super::{articles, feeds, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 5;

/// Main render function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        f.render_widget(msg, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    feeds::render(f, app, panes[0]);
    articles::render(f, app, panes[1]);
    status::render(f, app, rows[1]);
}

/// Text safe to put on one terminal row.
///
/// Feed-controlled strings may carry escape sequences or line breaks.
/// Control characters are dropped and whitespace runs become one space.
pub(super) fn single_line(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(super) fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

pub(super) fn highlight_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{FeedList, Message};
    use crate::browser::BrowserCommand;
    use crate::config::FeedSource;
    use crate::feed::{Feed, FeedId, Fetcher};
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn test_app() -> App {
        let source = FeedSource {
            name: "Planet".to_string(),
            url: None,
        };
        let mut feed = Feed::new(FeedId(0), &source);
        feed.load(b"<rss><channel><item><title>Hello world</title><link>http://h</link></item></channel></rss>".to_vec())
            .unwrap();
        App::new(
            FeedList::from_feeds(vec![feed]),
            Fetcher::new(None).unwrap(),
            BrowserCommand::parse("firefox").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_renders_feed_and_article_panes() {
        let mut app = test_app();
        app.dispatch(Message::SelectFeed(0)).await.unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Feeds (1)"));
        assert!(text.contains("Planet"));
        assert!(text.contains("Articles - Planet"));
        assert!(text.contains("Hello world"));
    }

    #[test]
    fn test_single_line_strips_controls_and_breaks() {
        assert_eq!(single_line("Plain title"), "Plain title");
        assert_eq!(single_line("  two\n  lines\t here "), "two lines here");
        assert_eq!(single_line("bell\x07 esc\x1b[31m red"), "bell esc[31m red");
        assert_eq!(single_line("\x1b \x07"), "");
    }

    #[tokio::test]
    async fn test_small_terminal_shows_notice() {
        let app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(20, 3)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();

        assert!(screen_text(&terminal).contains("too small"));
    }
}
