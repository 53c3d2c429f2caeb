// Post detail rendering.
// Shows the title and body of one post as separate widgets.

use ratatui::{prelude::*, widgets::*};

use crate::state::{DetailState, DetailView};

use super::feed::{render_error, render_loading};

/// Render the detail view.
pub fn draw_detail(frame: &mut Frame, detail: &DetailState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Post #{} ", detail.id()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match detail.view() {
        DetailView::Loading => render_loading(frame, inner, "Loading post"),
        DetailView::Error(message) => render_error(frame, inner, &message),
        DetailView::Post { title, body } => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Title
                    Constraint::Min(1),    // Body
                ])
                .split(inner);

            let title_widget = Paragraph::new(title)
                .wrap(Wrap { trim: true })
                .style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                );
            frame.render_widget(title_widget, chunks[0]);

            let body_widget = Paragraph::new(body)
                .wrap(Wrap { trim: false })
                .scroll((detail.scroll, 0))
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(body_widget, chunks[1]);
        }
    }
}
