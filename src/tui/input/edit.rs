use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{Action, App, CreateForm, Field, Mode};

use super::*;

/// Keys shared by the create popup and the inline editor: field focus,
/// status cycling, text editing. Returns true if handled.
fn handle_form_key(app: &mut App, key: KeyEvent) -> bool {
    if move_focus(app, key) {
        return true;
    }
    if app.focus == Field::Status {
        if matches!(
            key.code,
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right
        ) {
            app.cycle_form_status();
        }
        return true;
    }
    edit_text(app, key)
}

pub(super) fn handle_create(app: &mut App, key: KeyEvent) -> Option<Action> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => return Some(Action::CreateTask),
        (_, KeyCode::Esc) => {
            app.create = CreateForm::default();
            app.notice = None;
            app.mode = Mode::Navigate;
        }
        // Reset the form without closing it
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
            app.create = CreateForm::default();
            app.focus_field(Field::Title);
        }
        _ => {
            handle_form_key(app, key);
        }
    }
    None
}

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) -> Option<Action> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => return Some(Action::SaveEdit),
        (_, KeyCode::Esc) => {
            app.store.cancel_edit();
            app.mode = Mode::Navigate;
        }
        // Delete from inside the editor, still behind a confirmation
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => {
            if let Some(id) = app.store.editing_id()
                && let Some(request) = app.store.request_delete(id)
            {
                app.confirm = Some(request);
                app.mode = Mode::Confirm;
            }
        }
        _ => {
            handle_form_key(app, key);
        }
    }
    None
}
