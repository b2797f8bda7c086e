use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, Screen};

use super::popup_rect;

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));
    lines.push(Line::from(""));

    if app.screen == Screen::Dashboard {
        lines.push(Line::from(Span::styled(" Tasks", header_style)));
        add_binding(&mut lines, " \u{2191}\u{2193}/jk", "Move cursor", key_style, desc_style);
        add_binding(&mut lines, " Tab/1-4", "Switch status filter", key_style, desc_style);
        add_binding(&mut lines, " n", "New task", key_style, desc_style);
        add_binding(&mut lines, " e/Enter", "Edit task", key_style, desc_style);
        add_binding(&mut lines, " c", "Mark complete", key_style, desc_style);
        add_binding(&mut lines, " d", "Delete task", key_style, desc_style);
        add_binding(&mut lines, " r", "Reload", key_style, desc_style);
        add_binding(&mut lines, " L", "Log out", key_style, desc_style);
        lines.push(Line::from(""));

        lines.push(Line::from(Span::styled(" Forms", header_style)));
        add_binding(&mut lines, " Tab/\u{2191}\u{2193}", "Next/previous field", key_style, desc_style);
        add_binding(&mut lines, " Space", "Cycle status", key_style, desc_style);
        add_binding(&mut lines, " Enter/Esc", "Save / cancel", key_style, desc_style);
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(" Global", header_style)));
    add_binding(&mut lines, " ?", "Toggle this help", key_style, desc_style);
    add_binding(&mut lines, " q", "Quit", key_style, desc_style);
    add_binding(&mut lines, " Ctrl+C", "Quit (immediate)", key_style, desc_style);

    let overlay_area = popup_rect(48, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 14;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::tui::render::test_helpers::*;

    #[tokio::test]
    async fn dashboard_help_lists_task_keys() {
        let (app, _api) = dashboard_with(vec![]).await;
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_help_overlay(frame, &app, area);
        });
        assert!(out.contains("Mark complete"));
        assert!(out.contains("Toggle this help"));
    }

    #[test]
    fn welcome_help_only_has_global_keys() {
        let (app, _api) = app_with(FakeBackend::new());
        let out = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_help_overlay(frame, &app, area);
        });
        assert!(!out.contains("Mark complete"));
        assert!(out.contains("Quit"));
    }
}
