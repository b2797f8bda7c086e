use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode, Screen};
use crate::util::unicode::truncate_to_width;

/// Key hints for the current screen and mode
fn hints(app: &App) -> &'static str {
    match (app.screen, app.mode) {
        (Screen::Welcome, _) => "Enter start  r sign up  q quit",
        (Screen::Login, _) => "Tab next field  Enter sign in  Esc back",
        (Screen::Register, _) => "Tab next field  Enter sign up  Esc back",
        (Screen::Dashboard, Mode::Navigate) => {
            "n new  e edit  c complete  d delete  Tab filter  r reload  ? help"
        }
        (Screen::Dashboard, Mode::Create) => "Tab next field  Space status  Enter create",
        (Screen::Dashboard, Mode::Edit) => "Tab next field  Enter save  Esc cancel  Ctrl-d delete",
        (Screen::Dashboard, Mode::Confirm) => "y delete  n keep",
    }
}

/// Render the status row (bottom of screen): the last error, else key hints
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = if let Some(message) = app.error_message() {
        Line::from(Span::styled(
            truncate_to_width(&format!(" {}", message), width),
            Style::default()
                .fg(app.theme.red)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
    } else if app.show_key_hints {
        Line::from(Span::styled(
            truncate_to_width(&format!(" {}", hints(app)), width),
            Style::default().fg(app.theme.dim).bg(bg),
        ))
    } else {
        Line::from(Span::styled(" ".repeat(width), Style::default().bg(bg)))
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
