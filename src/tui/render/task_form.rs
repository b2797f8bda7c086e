use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, Field};

use super::{input_spans, popup_rect};

const POPUP_W: u16 = 60;

/// The "Create New Task" popup
pub fn render_task_form(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let header_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let label_style = Style::default().fg(app.theme.dim).bg(bg);
    let focused_label = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let value_style = Style::default().fg(app.theme.text).bg(bg);
    let cursor_style = Style::default().fg(bg).bg(app.theme.text_bright);

    let inner_w = POPUP_W.saturating_sub(4) as usize;
    let label_w = 13;

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("Create New Task", header_style)),
        Line::from(""),
    ];

    for &field in app.fields() {
        let focused = app.focus == field;
        let mut spans = vec![Span::styled(
            format!("{:<width$}", field.label(), width = label_w),
            if focused { focused_label } else { label_style },
        )];
        match field {
            Field::Status => {
                let status = app.create.status;
                spans.push(Span::styled(
                    format!("\u{25C2} {} \u{25B8}", status.title()),
                    Style::default()
                        .fg(app.theme.status_color(status))
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            _ => {
                let text = app.field_text(field).unwrap_or("");
                if text.is_empty() && !focused && field == Field::Deadline {
                    spans.push(Span::styled("YYYY-MM-DD (optional)", label_style));
                } else {
                    spans.extend(input_spans(
                        text,
                        focused.then_some(app.edit_cursor),
                        inner_w.saturating_sub(label_w),
                        value_style,
                        cursor_style,
                    ));
                }
            }
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter create  Esc cancel  Ctrl-r reset",
        label_style,
    )));

    let popup = popup_rect(POPUP_W, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use crate::tui::app::{Mode, Screen};
    use crate::tui::render::test_helpers::*;

    #[test]
    fn shows_fields_and_status() {
        let (mut app, _api) = app_with(crate::api::fake::FakeBackend::new());
        app.screen = Screen::Dashboard;
        app.mode = Mode::Create;
        app.create.title = "Buy milk".into();
        app.create.status = TaskStatus::InProgress;
        app.focus_field(Field::Title);
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_task_form(frame, &app, area);
        });
        assert!(out.contains("Create New Task"));
        assert!(out.contains("Buy milk"));
        assert!(out.contains("Description"));
        assert!(out.contains("YYYY-MM-DD (optional)"));
        assert!(out.contains("In Progress"));
    }
}
