// Breadcrumb rendering for navigation trail.
// Shows the current route path with the age of the data on screen.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::state::BreadcrumbNode;

use super::feed::format_relative_time;

/// Render the breadcrumb trail.
pub fn draw_breadcrumb(
    frame: &mut Frame,
    breadcrumbs: &[BreadcrumbNode],
    area: Rect,
    updated_at: Option<DateTime<Utc>>,
) {
    let mut spans = vec![Span::styled(
        " feedview ",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    for (i, node) in breadcrumbs.iter().enumerate() {
        spans.push(Span::styled(
            if i == 0 { " " } else { " > " },
            Style::default().fg(Color::DarkGray),
        ));

        let style = if i == breadcrumbs.len() - 1 {
            // Current level is highlighted
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        spans.push(Span::styled(node.label.clone(), style));
    }

    if let Some(title) = breadcrumbs
        .last()
        .map(|node| node.route.title())
        .filter(|title| breadcrumbs.len() > 1 && !title.is_empty())
    {
        spans.push(Span::styled(
            format!("  {}", title),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);

    // Data age on the right
    if let Some(ts) = updated_at {
        let updated = Paragraph::new(Line::from(Span::styled(
            format!("updated {} ", format_relative_time(&ts)),
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Right);
        frame.render_widget(
            updated,
            Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: 1,
            },
        );
    }
}
