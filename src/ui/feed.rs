// Feed list rendering.
// Draws the post list with its loading, error, and empty states.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::state::feed::{EMPTY_MESSAGE, LOADING_LABEL};
use crate::state::{FeedState, FeedView};

/// Format a timestamp as relative time (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*dt);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, centered_line(area));
}

/// Render an error message.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let text = Paragraph::new(format!("❌ {}", error))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red));
    frame.render_widget(text, centered_line(area));
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, centered_line(area));
}

/// Vertically centered band for a short status message.
fn centered_line(area: Rect) -> Rect {
    let height = area.height.min(3);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    }
}

/// Render the feed view.
pub fn draw_feed(frame: &mut Frame, feed: &mut FeedState, area: Rect) {
    let view = feed.view();
    feed.sync_selection(view.posts().len());

    match view {
        FeedView::Loading => render_loading(frame, area, LOADING_LABEL),
        FeedView::Error(message) => render_error(frame, area, &message),
        FeedView::Empty => render_empty(frame, area, EMPTY_MESSAGE),
        FeedView::Posts { posts, refreshing } => {
            let items: Vec<ListItem> = posts
                .iter()
                .map(|post| {
                    let preview = post.body.lines().next().unwrap_or_default().to_string();
                    ListItem::new(vec![
                        Line::from(Span::styled(
                            post.title.clone(),
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        )),
                        Line::from(Span::styled(
                            format!("  {}", preview),
                            Style::default().fg(Color::DarkGray),
                        )),
                    ])
                })
                .collect();

            let title = if refreshing {
                format!(" Feed ({}) ⟳ Refreshing ", posts.len())
            } else {
                format!(" Feed ({}) ", posts.len())
            };

            let list_widget = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");

            frame.render_stateful_widget(list_widget, area, &mut feed.list_state);
        }
    }
}
