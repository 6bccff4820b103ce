//! Banner widget and its plain-text rendition.
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::banner::{Affordance, AffordanceKind, AffordanceStatus, Banner};
use crate::util::{display_width, truncate_to_width};

/// Key that activates an affordance in the interactive page.
pub fn key_hint(kind: AffordanceKind) -> char {
    match kind {
        AffordanceKind::Subscribe => 's',
        AffordanceKind::WatchAll => 'w',
    }
}

fn button_text(affordance: &Affordance) -> Option<String> {
    let kind = affordance.kind;
    match affordance.status {
        AffordanceStatus::Ready => Some(format!("[{}] {}", key_hint(kind), kind.button())),
        AffordanceStatus::Pending => Some(format!("[{}...]", kind.button())),
        AffordanceStatus::Confirmed | AffordanceStatus::Failed { .. } => None,
    }
}

/// Heading plus one line per affordance, for non-interactive output.
pub fn banner_lines(banner: &Banner) -> Vec<String> {
    let heading = banner
        .affordances()
        .first()
        .map(|a| a.kind.heading())
        .unwrap_or_default();

    let mut lines = vec![heading.to_string()];
    for affordance in banner.affordances() {
        let message = affordance.message(&banner.label);
        match button_text(affordance) {
            Some(button) => lines.push(format!("{}  {}", message, button)),
            None => lines.push(message),
        }
    }
    lines
}

/// Draws a [`Banner`] as a bordered box, one row per affordance with the
/// button right-aligned.
pub struct BannerWidget<'a> {
    banner: &'a Banner,
}

impl<'a> BannerWidget<'a> {
    pub fn new(banner: &'a Banner) -> Self {
        Self { banner }
    }

    /// Rows needed to draw the banner, borders included.
    pub fn height(&self) -> u16 {
        self.banner.affordances().len().min(8) as u16 + 2
    }

    fn affordance_line(&self, affordance: &'a Affordance, width: usize) -> Line<'a> {
        let message = affordance.message(&self.banner.label);
        let message_style = match affordance.status {
            AffordanceStatus::Confirmed => Style::default().fg(Color::Green),
            AffordanceStatus::Failed { .. } => Style::default().fg(Color::Red),
            AffordanceStatus::Ready | AffordanceStatus::Pending => Style::default(),
        };

        let Some(button) = button_text(affordance) else {
            return Line::from(Span::styled(
                truncate_to_width(&message, width).into_owned(),
                message_style,
            ));
        };

        let button_style = if affordance.is_enabled() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let button_width = display_width(&button);
        let room = width.saturating_sub(button_width + 1);
        let message = truncate_to_width(&message, room).into_owned();
        let gap = width.saturating_sub(display_width(&message) + button_width).max(1);

        Line::from(vec![
            Span::styled(message, message_style),
            Span::raw(" ".repeat(gap)),
            Span::styled(button, button_style),
        ])
    }
}

impl Widget for BannerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }

        let heading = self
            .banner
            .affordances()
            .first()
            .map(|a| a.kind.heading())
            .unwrap_or_default();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                format!(" {} ", heading),
                Style::default().add_modifier(Modifier::BOLD),
            ));

        let inner_width = usize::from(area.width.saturating_sub(2));
        let lines: Vec<Line> = self
            .banner
            .affordances()
            .iter()
            .map(|affordance| self.affordance_line(affordance, inner_width))
            .collect();

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
