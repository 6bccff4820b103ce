//! Draws the terminal page: topic header, banner slot, body and status bar.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::page::Page;
use super::renderer::TerminalRenderer;
use super::status;
use super::widget::BannerWidget;
use crate::banner::{BannerRuntime, BannerState, HiddenReason};

pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 8;

pub(super) fn render(f: &mut Frame, runtime: &BannerRuntime<TerminalRenderer>, page: &Page) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = Paragraph::new(format!(
            "Terminal too small\n\nMinimum: {}x{}",
            MIN_WIDTH, MIN_HEIGHT
        ))
        .alignment(Alignment::Center);
        f.render_widget(msg, area);
        return;
    }

    let banner = runtime.controller().renderer().container();
    let banner_height = banner.map_or(0, |b| BannerWidget::new(b).height());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, runtime, page, chunks[0]);
    if let Some(banner) = banner {
        f.render_widget(BannerWidget::new(banner), chunks[1]);
    }
    render_body(f, runtime, chunks[2]);
    status::render(
        f,
        page,
        runtime.user().map(|u| u.username.as_str()),
        chunks[3],
    );
}

fn render_header(f: &mut Frame, runtime: &BannerRuntime<TerminalRenderer>, page: &Page, area: Rect) {
    let (position, total) = page.position();
    let url = runtime.current_url().unwrap_or("-");
    let title = match runtime.topic() {
        Some(topic) => {
            let category = topic
                .category
                .as_ref()
                .map(|c| c.name.as_str())
                .unwrap_or("uncategorized");
            format!("{} ({})", topic.title, category)
        }
        None => "No topic".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Topic {}/{} ", position, total));
    let line = Line::from(vec![
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {}", url), Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_body(f: &mut Frame, runtime: &BannerRuntime<TerminalRenderer>, area: Rect) {
    let text = describe_state(runtime.state());
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// One-line explanation of the banner state for the page body.
pub fn describe_state(state: &BannerState) -> &'static str {
    match state {
        BannerState::Idle => "",
        BannerState::Evaluating => "Checking category...",
        BannerState::Hidden(reason) => match reason {
            HiddenReason::NoUser => "No banner: not signed in.",
            HiddenReason::NoTopic => "No banner: this page is not a topic.",
            HiddenReason::NoCategory => "No banner: the topic has no category.",
            HiddenReason::NotConfigured => "No banner: this category has no subscription program.",
            HiddenReason::AlreadySubscribed => "No banner: you already follow this category.",
        },
        BannerState::Showing(_) => "",
    }
}
