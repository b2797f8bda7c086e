use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ops::auth::banner_tone;
use crate::tui::app::{App, Field, Screen};
use crate::util::unicode::mask;

use super::{input_spans, popup_rect};

const CARD_W: u16 = 52;

/// Login and registration card
pub fn render_auth_form(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let title_style = Style::default()
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

    let (title, hint, message) = match app.screen {
        Screen::Register => (
            "Create your account",
            "Already have an account? Ctrl-l to sign in",
            app.register.message.as_deref(),
        ),
        _ => (
            "Welcome back",
            "No account yet? Ctrl-r to sign up",
            app.login.message.as_deref(),
        ),
    };

    let inner_w = CARD_W.saturating_sub(4) as usize;
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(title, title_style)));
    lines.push(Line::from(""));

    for &field in app.fields() {
        let focused = app.focus == field;
        lines.push(Line::from(Span::styled(
            field.label(),
            if focused { focused_label } else { label_style },
        )));

        let raw = app.field_text(field).unwrap_or("");
        let text = if field == Field::Password {
            mask(raw)
        } else {
            raw.to_string()
        };
        // Mask is one cell per grapheme, so place the cursor by grapheme count
        let cursor = focused.then(|| {
            if field == Field::Password {
                mask(&raw[..app.edit_cursor.min(raw.len())]).len()
            } else {
                app.edit_cursor
            }
        });
        let marker = if focused { "\u{25B8} " } else { "  " };
        let mut spans = vec![Span::styled(marker, title_style)];
        spans.extend(input_spans(
            &text,
            cursor,
            inner_w.saturating_sub(2),
            value_style,
            cursor_style,
        ));
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    if let Some(message) = message {
        let color = app.theme.banner_color(banner_tone(message));
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(color).bg(bg).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(hint, label_style)));

    let card = popup_rect(CARD_W, lines.len() as u16 + 2, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
        .style(Style::default().bg(bg));
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let content = Rect {
        x: inner.x + 1,
        width: inner.width.saturating_sub(2),
        ..inner
    };
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, content);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::ops::LoginForm;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn login_masks_password() {
        let (mut app, _api) = app_with(FakeBackend::new());
        app.show_login(LoginForm::new());
        app.login.username = "ada".into();
        app.login.password = "hunter2".into();
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_auth_form(frame, &app, area);
        });
        assert!(out.contains("Welcome back"));
        assert!(out.contains("ada"));
        assert!(!out.contains("hunter2"));
        assert!(out.contains("\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}"));
        assert!(out.contains("No account yet? Ctrl-r to sign up"));
    }

    #[test]
    fn register_shows_all_fields_and_banner() {
        let (mut app, _api) = app_with(FakeBackend::new());
        app.show_register();
        app.register.message = Some("Registration failed".into());
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_auth_form(frame, &app, area);
        });
        assert!(out.contains("Create your account"));
        assert!(out.contains("Email"));
        assert!(out.contains("Registration failed"));
    }
}
