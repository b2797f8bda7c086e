pub mod auth_form;
pub mod confirm_popup;
pub mod dashboard;
pub mod help_overlay;
pub mod status_row;
pub mod task_form;
pub mod welcome;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;

use super::app::{App, Mode, Screen};
use crate::util::unicode::{cursor_col, display_width, next_boundary, truncate_to_width};

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    match app.screen {
        Screen::Welcome => welcome::render_welcome(frame, app, chunks[0]),
        Screen::Login | Screen::Register => auth_form::render_auth_form(frame, app, chunks[0]),
        Screen::Dashboard => {
            dashboard::render_dashboard(frame, app, chunks[0]);
            match app.mode {
                Mode::Create => task_form::render_task_form(frame, app, chunks[0]),
                Mode::Confirm => confirm_popup::render_confirm_popup(frame, app, chunks[0]),
                Mode::Navigate | Mode::Edit => {}
            }
        }
    }

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, chunks[0]);
    }

    status_row::render_status_row(frame, app, chunks[1]);
}

/// A `w` x `h` rect centered in `area`, shrunk to fit
pub(super) fn popup_rect(w: u16, h: u16, area: Rect) -> Rect {
    let w = w.min(area.width);
    let h = h.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

/// Spans for an editable value with a block cursor at byte offset `cursor`.
/// The text is scrolled left so the cursor stays inside `width` cells.
pub(super) fn input_spans<'a>(
    text: &str,
    cursor: Option<usize>,
    width: usize,
    style: Style,
    cursor_style: Style,
) -> Vec<Span<'a>> {
    let Some(cursor) = cursor else {
        return vec![Span::styled(truncate_to_width(text, width), style)];
    };
    let width = width.max(1);
    let cursor = cursor.min(text.len());
    let (before, after) = text.split_at(cursor);

    // Drop leading graphemes until the cursor fits
    let mut start = 0;
    while cursor_col(text, cursor) - cursor_col(text, start) + 1 > width
        && let Some(next) = next_boundary(text, start)
    {
        start = next;
    }
    let visible_before = &before[start.min(before.len())..];

    let mut chars = after.chars();
    let (under, rest) = match chars.next() {
        Some(c) => (c.to_string(), chars.as_str()),
        None => (" ".to_string(), ""),
    };
    let room = width.saturating_sub(display_width(visible_before) + display_width(&under));

    vec![
        Span::styled(visible_before.to_string(), style),
        Span::styled(under, cursor_style),
        Span::styled(truncate_to_width(rest, room), style),
    ]
}
