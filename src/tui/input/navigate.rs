use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::StatusFilter;
use crate::tui::app::{Action, App, CreateForm, Field, Mode};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) -> Option<Action> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) => app.should_quit = true,
        (_, KeyCode::Char('?')) => app.show_help = true,
        (_, KeyCode::Esc) => {
            app.notice = None;
            app.store.clear_error();
        }

        // Cursor
        (_, KeyCode::Down | KeyCode::Char('j')) => move_cursor(app, 1),
        (_, KeyCode::Up | KeyCode::Char('k')) => move_cursor(app, -1),
        (_, KeyCode::Char('g') | KeyCode::Home) => app.cursor = 0,
        (_, KeyCode::Char('G') | KeyCode::End) => {
            app.cursor = app.visible_tasks().len().saturating_sub(1);
        }

        // Filter tabs
        (_, KeyCode::Tab | KeyCode::Right | KeyCode::Char('l')) => step_filter(app, 1),
        (_, KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h')) => step_filter(app, -1),
        (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='4')) => {
            let idx = c as usize - '1' as usize;
            set_filter(app, StatusFilter::TABS[idx]);
        }

        // Task actions
        (_, KeyCode::Char('n') | KeyCode::Char('+')) => {
            app.create = CreateForm::default();
            app.mode = Mode::Create;
            app.focus_field(Field::Title);
        }
        (_, KeyCode::Char('e') | KeyCode::Enter) => {
            if let Some(id) = app.selected_id()
                && app.store.begin_edit(id)
            {
                app.mode = Mode::Edit;
                app.focus_field(Field::Title);
            }
        }
        (_, KeyCode::Char('c')) => return app.selected_id().map(Action::Complete),
        (_, KeyCode::Char('d') | KeyCode::Delete) => {
            if let Some(id) = app.selected_id()
                && let Some(request) = app.store.request_delete(id)
            {
                app.confirm = Some(request);
                app.mode = Mode::Confirm;
            }
        }
        (_, KeyCode::Char('r')) => return Some(Action::Reload),
        (_, KeyCode::Char('L')) => return Some(Action::Logout),
        _ => {}
    }
    None
}

fn move_cursor(app: &mut App, delta: isize) {
    let len = app.visible_tasks().len();
    if len == 0 {
        return;
    }
    app.cursor = app.cursor.saturating_add_signed(delta).min(len - 1);
}

fn step_filter(app: &mut App, delta: i32) {
    let next = app.store.filter_value().step(delta);
    set_filter(app, next);
}

fn set_filter(app: &mut App, filter: StatusFilter) {
    app.store.set_filter(filter);
    app.cursor = 0;
    app.scroll_offset = 0;
}
