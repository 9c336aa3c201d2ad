use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use super::render::{border_style, highlight_style, single_line};

/// Render the article list panel
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Articles;

    let items: Vec<ListItem> = if app.article_list.is_empty() {
        let hint = if app.article_list.displayed_feed().is_some() {
            "No articles"
        } else {
            "Select a feed"
        };
        vec![ListItem::new(hint).style(Style::default().fg(Color::DarkGray))]
    } else {
        app.article_list
            .rows()
            .iter()
            .map(|article| {
                // Articles without a link cannot be opened; show them dimmed
                let style = if article.link.is_empty() {
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC)
                } else {
                    Style::default()
                };
                ListItem::new(Span::styled(single_line(&article.title), style))
            })
            .collect()
    };

    let title = match app
        .article_list
        .displayed_feed()
        .and_then(|id| app.feed_list.get(id))
    {
        Some(feed) => format!("Articles - {}", single_line(&feed.name)),
        None => "Articles".to_string(),
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(is_focused))
                .title(title),
        )
        .highlight_style(highlight_style(is_focused));

    let mut state = ListState::default();
    state.select(app.selected_article);
    f.render_stateful_widget(list, area, &mut state);
}
