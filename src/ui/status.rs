use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

use super::page::Page;

const KEY_HINTS: &str = "[s]ubscribe [w]atch all [Tab/n]ext topic [r]eload [q]uit";

/// Render the status bar: the transient message if any, else key hints.
pub fn render(f: &mut Frame, page: &Page, username: Option<&str>, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = match (page.status(), username) {
        (Some(msg), _) => Cow::Borrowed(msg),
        (None, Some(user)) => Cow::Owned(format!("{} | signed in as {}", KEY_HINTS, user)),
        (None, None) => Cow::Owned(format!("{} | anonymous", KEY_HINTS)),
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
