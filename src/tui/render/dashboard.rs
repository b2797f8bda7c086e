use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::{StatusFilter, Task, greeting};
use crate::ops::task_store::{RowState, StagedEdit};
use crate::tui::app::{App, Field, Mode};
use crate::util::unicode::{display_width, truncate_to_width};

use super::input_spans;

const EMPTY_MESSAGE: &str = "No tasks yet - press n to add one!";
const NO_MATCH_MESSAGE: &str = "No tasks with this status";

/// Rows a task occupies in the list
fn row_height(app: &App, task: &Task) -> usize {
    match app.store.row_state(task.id) {
        RowState::Editing(_) => 3,
        RowState::Viewing => 2,
    }
}

/// Header, filter tabs and the task list
pub fn render_dashboard(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // greeting + blank
            Constraint::Length(2), // tabs + separator
            Constraint::Min(1),    // task list
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_task_list(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let lines = vec![
        Line::from(Span::styled(
            format!(" {}", greeting(app.user.as_ref())),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            " Welcome back - manage your tasks",
            Style::default().fg(app.theme.dim).bg(bg),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let counts = app.store.counts();
    let current = app.store.filter_value();

    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));
    let mut spans: Vec<Span> = vec![Span::styled(" ", Style::default().bg(bg))];
    for (i, filter) in StatusFilter::TABS.iter().enumerate() {
        if i > 0 {
            spans.push(sep.clone());
        }
        let count = match filter {
            StatusFilter::All => counts.total(),
            StatusFilter::Only(status) => counts.get(*status),
        };
        let style = if *filter == current {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        spans.push(Span::styled(
            format!(" {} ({}) ", filter.label(), count),
            style,
        ));
    }

    // Right-aligned total
    let total = format!("Total: {} ", counts.total());
    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    if used + total.len() < width {
        spans.push(Span::styled(
            " ".repeat(width - used - total.len()),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(
            total,
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let lines = vec![
        Line::from(spans),
        Line::from(Span::styled(
            "\u{2500}".repeat(width),
            Style::default().fg(app.theme.dim).bg(bg),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

/// Keep the cursor's task fully on screen. `heights` holds the row
/// count of each visible task.
fn adjust_scroll(app: &mut App, heights: &[usize], height: usize) {
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    }
    while app.scroll_offset < app.cursor
        && heights[app.scroll_offset..=app.cursor].iter().sum::<usize>() > height
    {
        app.scroll_offset += 1;
    }
}

fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let height = area.height as usize;
    let width = area.width as usize;

    let heights: Vec<usize> = app
        .visible_tasks()
        .iter()
        .map(|t| row_height(app, t))
        .collect();
    if heights.is_empty() {
        let message = if app.store.is_empty() {
            EMPTY_MESSAGE
        } else {
            NO_MATCH_MESSAGE
        };
        let line = Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
        return;
    }
    app.cursor = app.cursor.min(heights.len() - 1);
    adjust_scroll(app, &heights, height);

    let mut lines: Vec<Line> = Vec::new();
    for (idx, task) in app.visible_tasks().into_iter().enumerate().skip(app.scroll_offset) {
        if lines.len() >= height {
            break;
        }
        let selected = idx == app.cursor;
        match app.store.row_state(task.id) {
            RowState::Editing(staged) => {
                lines.extend(editing_lines(app, staged, width));
            }
            RowState::Viewing => lines.extend(task_lines(app, task, selected, width)),
        }
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

/// Title row with status badge and date, then the description row
fn task_lines<'a>(app: &App, task: &Task, selected: bool, width: usize) -> Vec<Line<'a>> {
    let row_bg = if selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let marker = if selected { "\u{258E}" } else { " " };
    let marker_style = Style::default().fg(app.theme.selection_border).bg(row_bg);
    let title_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(row_bg)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(app.theme.dim).bg(row_bg);
    let badge_style = Style::default()
        .fg(app.theme.status_color(task.status))
        .bg(row_bg)
        .add_modifier(Modifier::BOLD);

    let badge = format!("[{}]", task.status.label());
    let date = task.created_at.format("%Y-%m-%d").to_string();
    let right_w = display_width(&badge) + 1 + date.len() + 1;
    let title_w = width.saturating_sub(right_w + 3);
    let title = truncate_to_width(&task.title, title_w);
    let pad = width.saturating_sub(2 + display_width(&title) + right_w);

    let first = Line::from(vec![
        Span::styled(marker, marker_style),
        Span::styled(" ", dim_style),
        Span::styled(title, title_style),
        Span::styled(" ".repeat(pad), dim_style),
        Span::styled(badge, badge_style),
        Span::styled(" ", dim_style),
        Span::styled(date, dim_style),
        Span::styled(" ", dim_style),
    ]);

    let mut detail = task.description.lines().next().unwrap_or("").to_string();
    if let Some(deadline) = task.deadline {
        if !detail.is_empty() {
            detail.push_str("  ");
        }
        detail.push_str(&format!("due {}", deadline.format("%Y-%m-%d")));
    }
    let detail = truncate_to_width(&detail, width.saturating_sub(3));
    let pad = width.saturating_sub(3 + display_width(&detail));
    let second = Line::from(vec![
        Span::styled(marker, marker_style),
        Span::styled("  ", dim_style),
        Span::styled(detail, dim_style),
        Span::styled(" ".repeat(pad), dim_style),
    ]);

    vec![first, second]
}

/// The inline editor for the task being edited
fn editing_lines<'a>(app: &App, staged: &StagedEdit, width: usize) -> Vec<Line<'a>> {
    let bg = app.theme.selection_bg;
    let marker = Span::styled(
        "\u{258E}",
        Style::default().fg(app.theme.highlight).bg(bg),
    );
    let label_w = 13;
    let value_w = width.saturating_sub(label_w + 3);
    let value_style = Style::default().fg(app.theme.text_bright).bg(bg);
    let cursor_style = Style::default().fg(bg).bg(app.theme.text_bright);
    let editing = app.mode == Mode::Edit;

    let label = |field: Field| {
        let focused = editing && app.focus == field;
        let style = if focused {
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.dim).bg(bg)
        };
        Span::styled(format!(" {:<width$}", field.label(), width = label_w), style)
    };
    let cursor_for = |field: Field| (editing && app.focus == field).then_some(app.edit_cursor);

    let text_line = |field: Field, text: &str| {
        let mut spans = vec![marker.clone(), label(field)];
        let value = input_spans(text, cursor_for(field), value_w, value_style, cursor_style);
        let used: usize = value.iter().map(|s| display_width(&s.content)).sum();
        spans.extend(value);
        spans.push(Span::styled(
            " ".repeat(width.saturating_sub(label_w + 2 + used)),
            value_style,
        ));
        Line::from(spans)
    };

    let status_text = format!("\u{25C2} {} \u{25B8}", staged.status.title());
    let hint = "Enter save  Esc cancel";
    let status_used = label_w + 2 + display_width(&status_text);
    let mut status_spans = vec![
        marker.clone(),
        label(Field::Status),
        Span::styled(
            status_text,
            Style::default()
                .fg(app.theme.status_color(staged.status))
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if status_used + hint.len() + 1 < width {
        status_spans.push(Span::styled(
            " ".repeat(width - status_used - hint.len() - 1),
            value_style,
        ));
        status_spans.push(Span::styled(
            format!("{} ", hint),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    vec![
        text_line(Field::Title, &staged.title),
        text_line(Field::Description, &staged.description),
        Line::from(status_spans),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::task;
    use crate::model::TaskStatus;
    use crate::tui::render::test_helpers::*;

    fn draw(app: &mut App) -> String {
        render_to_string(TERM_W, TERM_H, |frame, area| {
            render_dashboard(frame, app, area);
        })
    }

    #[tokio::test]
    async fn shows_greeting_tabs_and_rows() {
        let mut milk = task(1, "Buy milk", TaskStatus::Pending);
        milk.description = "Two litres".into();
        let (mut app, _api) =
            dashboard_with(vec![milk, task(2, "File taxes", TaskStatus::Completed)]).await;
        let out = draw(&mut app);
        assert!(out.contains("Hello, ada"));
        assert!(out.contains("All (2)"));
        assert!(out.contains("Pending (1)"));
        assert!(out.contains("In Progress (0)"));
        assert!(out.contains("Total: 2"));
        assert!(out.contains("Buy milk"));
        assert!(out.contains("Two litres"));
        assert!(out.contains("[completed]"));
        assert!(out.contains("2024-01-01"));
    }

    #[tokio::test]
    async fn empty_list_invites_adding() {
        let (mut app, _api) = dashboard_with(vec![]).await;
        let out = draw(&mut app);
        assert!(out.contains(EMPTY_MESSAGE));
    }

    #[tokio::test]
    async fn filter_with_no_matches_says_so() {
        let (mut app, _api) = dashboard_with(vec![task(1, "A", TaskStatus::Pending)]).await;
        app.store
            .set_filter(StatusFilter::Only(TaskStatus::Completed));
        let out = draw(&mut app);
        assert!(out.contains(NO_MATCH_MESSAGE));
        assert!(!out.contains(EMPTY_MESSAGE));
    }

    #[tokio::test]
    async fn edited_row_shows_staged_values() {
        let (mut app, _api) = dashboard_with(vec![task(1, "Old title", TaskStatus::Pending)]).await;
        assert!(app.store.begin_edit(1));
        app.mode = Mode::Edit;
        app.focus_field(Field::Title);
        if let Some(staged) = app.store.staged_mut() {
            staged.title = "New title".into();
            staged.status = TaskStatus::InProgress;
        }
        let out = draw(&mut app);
        assert!(out.contains("New title"));
        assert!(!out.contains("Old title"));
        assert!(out.contains("In Progress \u{25B8}"));
        assert!(out.contains("Enter save"));
    }

    #[tokio::test]
    async fn scrolls_to_keep_cursor_visible() {
        let tasks = (1..=30)
            .map(|i| task(i, &format!("Task number {i}"), TaskStatus::Pending))
            .collect();
        let (mut app, _api) = dashboard_with(tasks).await;
        app.cursor = 29;
        let out = draw(&mut app);
        assert!(out.contains("Task number 30"));
        assert!(!out.contains("Task number 1 "));
        assert!(app.scroll_offset > 0);
    }
}
