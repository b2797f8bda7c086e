use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;

/// Landing screen shown when there is no session
pub fn render_welcome(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let title_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let key_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let lines = vec![
        Line::from(Span::styled("TaskMate", title_style)),
        Line::from(""),
        Line::from(Span::styled(
            "Your Personal Task Management Solution",
            text_style,
        )),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", dim_style),
            Span::styled("Enter", key_style),
            Span::styled(" to get started", dim_style),
        ]),
        Line::from(vec![
            Span::styled("l", key_style),
            Span::styled(" sign in   ", dim_style),
            Span::styled("r", key_style),
            Span::styled(" sign up   ", dim_style),
            Span::styled("q", key_style),
            Span::styled(" quit", dim_style),
        ]),
    ];

    // Vertically center the block
    let height = lines.len() as u16;
    let top = area.y + area.height.saturating_sub(height) / 2;
    let content = Rect {
        x: area.x,
        y: top,
        width: area.width,
        height: height.min(area.height),
    };

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, content);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn welcome_shows_tagline_and_keys() {
        let (app, _api) = app_with(FakeBackend::new());
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_welcome(frame, &app, area);
        });
        assert!(out.contains("Your Personal Task Management Solution"));
        assert!(out.contains("r sign up"));
    }
}
