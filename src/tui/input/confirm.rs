use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{Action, App, Mode};

/// `y` sends the delete; `n` or Esc drops the request
pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) -> Option<Action> {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('y')) => {
            let request = app.confirm.take();
            app.mode = return_mode(app);
            request.map(Action::Delete)
        }
        (KeyModifiers::NONE, KeyCode::Char('n')) | (_, KeyCode::Esc) => {
            app.confirm = None;
            app.mode = return_mode(app);
            None
        }
        _ => None,
    }
}

/// Back to the editor if the delete was asked for from there
fn return_mode(app: &App) -> Mode {
    if app.store.editing_id().is_some() {
        Mode::Edit
    } else {
        Mode::Navigate
    }
}
