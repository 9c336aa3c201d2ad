use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use super::render::{border_style, highlight_style, single_line};

/// Render the feed list panel
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Feeds;

    let items: Vec<ListItem> = if app.feed_list.is_empty() {
        vec![ListItem::new("No feeds configured").style(Style::default().fg(Color::DarkGray))]
    } else {
        app.feed_list
            .iter()
            .map(|feed| ListItem::new(single_line(&feed.name)))
            .collect()
    };

    let title = format!("Feeds ({})", app.feed_list.len());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(is_focused))
                .title(title),
        )
        .highlight_style(highlight_style(is_focused));

    let mut state = ListState::default();
    state.select(app.selected_feed);
    f.render_stateful_widget(list, area, &mut state);
}
