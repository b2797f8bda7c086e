use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::LoginForm;
use crate::tui::app::{Action, App};

use super::*;

pub(super) fn handle_welcome(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter | KeyCode::Char('l') => app.show_login(LoginForm::new()),
        KeyCode::Char('r') => app.show_register(),
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
    None
}

pub(super) fn handle_login(app: &mut App, key: KeyEvent) -> Option<Action> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => return Some(Action::SubmitLogin),
        (_, KeyCode::Esc) => app.show_welcome(),
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => app.show_register(),
        _ => {
            if !move_focus(app, key) {
                edit_text(app, key);
            }
        }
    }
    None
}

/// Input is ignored while the success banner waits to hand off to login
pub(super) fn handle_register(app: &mut App, key: KeyEvent) -> Option<Action> {
    if app.pending_handoff.is_some() {
        return None;
    }
    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => return Some(Action::SubmitRegister),
        (_, KeyCode::Esc) => app.show_welcome(),
        (KeyModifiers::CONTROL, KeyCode::Char('l')) => app.show_login(LoginForm::new()),
        _ => {
            if !move_focus(app, key) {
                edit_text(app, key);
            }
        }
    }
    None
}
