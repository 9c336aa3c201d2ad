use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text = if let Some((msg, _)) = &app.status_message {
        msg.as_str()
    } else {
        match app.focus {
            Focus::Feeds => "[j/k]move [Enter]articles [Tab]switch [q]uit",
            Focus::Articles => "[j/k]move [Enter/o]open in browser [Tab]switch [q]uit",
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}
