mod auth;
mod common;
mod confirm;
mod edit;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{Action, App, Mode, Screen};

use auth::*;
use common::*;
use confirm::*;
use edit::*;
use navigate::*;

/// Handle a key event. Returns the server work it asks for, if any.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return None;
    }

    // Help overlay swallows the next key
    if app.show_help {
        app.show_help = false;
        return None;
    }

    let key = normalize_key(key);
    match app.screen {
        Screen::Welcome => handle_welcome(app, key),
        Screen::Login => handle_login(app, key),
        Screen::Register => handle_register(app, key),
        Screen::Dashboard => match app.mode {
            Mode::Navigate => handle_navigate(app, key),
            Mode::Create => handle_create(app, key),
            Mode::Edit => handle_edit(app, key),
            Mode::Confirm => handle_confirm(app, key),
        },
    }
}
