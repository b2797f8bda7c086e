use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::util::unicode::truncate_to_width;

use super::popup_rect;

/// Ask before a delete goes out
pub fn render_confirm_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(request) = &app.confirm else {
        return;
    };
    let bg = app.theme.background;
    let popup_w: u16 = 44;
    let inner_w = popup_w.saturating_sub(4) as usize;

    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(app.theme.text).bg(bg);

    let lines = vec![
        Line::from(Span::styled(
            "Delete this task?",
            Style::default()
                .fg(app.theme.red)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate_to_width(
                &format!("\u{201c}{}\u{201d}", request.title()),
                inner_w,
            ),
            Style::default().fg(app.theme.text_bright).bg(bg),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", key_style),
            Span::styled(" delete   ", text_style),
            Span::styled("n", key_style),
            Span::styled(" keep", text_style),
        ]),
    ];

    let popup = popup_rect(popup_w, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.red).bg(bg))
        .style(Style::default().bg(bg));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let content = Rect {
        x: inner.x + 1,
        width: inner.width.saturating_sub(2),
        ..inner
    };
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(bg)),
        content,
    );
}
