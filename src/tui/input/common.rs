use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::util::unicode::{next_boundary, prev_boundary, word_left, word_right};

/// Shifted symbol for a base key on a US layout
fn shift_symbol(c: char) -> Option<char> {
    match c {
        '1' => Some('!'),
        '2' => Some('@'),
        '3' => Some('#'),
        '/' => Some('?'),
        '=' => Some('+'),
        '[' => Some('{'),
        ']' => Some('}'),
        _ => None,
    }
}

/// Normalize key events from terminals using the kitty keyboard protocol.
///
/// Kitty sends `Char(lowercase) + SHIFT` instead of `Char(UPPERCASE)`, and
/// `Char(base) + SHIFT` instead of the shifted symbol. Traditional terminals
/// already send the final character, so this is a no-op for them.
pub(super) fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
    {
        if c.is_ascii_lowercase() {
            key.code = KeyCode::Char(c.to_ascii_uppercase());
        } else if let Some(shifted) = shift_symbol(c) {
            key.code = KeyCode::Char(shifted);
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
    }
    key
}

/// Tab / Shift-Tab / Up / Down move between fields. Returns true if handled.
pub(super) fn move_focus(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Tab | KeyCode::Down => app.step_focus(1),
        KeyCode::BackTab | KeyCode::Up => app.step_focus(-1),
        _ => return false,
    }
    true
}

/// Apply a line-editing key to the focused text field. Returns true if the
/// key was consumed.
pub(super) fn edit_text(app: &mut App, key: KeyEvent) -> bool {
    let field = app.focus;
    let cursor = app.edit_cursor;
    let Some(text) = app.field_text_mut(field) else {
        return false;
    };
    let mut cursor = cursor.min(text.len());
    let word_mod = key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::CONTROL);

    match (key.modifiers, key.code) {
        (m, KeyCode::Char(c)) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            text.insert(cursor, c);
            cursor += c.len_utf8();
        }
        (KeyModifiers::CONTROL, KeyCode::Char('a')) | (_, KeyCode::Home) => cursor = 0,
        (KeyModifiers::CONTROL, KeyCode::Char('e')) | (_, KeyCode::End) => cursor = text.len(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
            text.drain(..cursor);
            cursor = 0;
        }
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => {
            let start = word_left(text, cursor);
            text.drain(start..cursor);
            cursor = start;
        }
        (_, KeyCode::Left) if word_mod => cursor = word_left(text, cursor),
        (_, KeyCode::Right) if word_mod => cursor = word_right(text, cursor),
        (_, KeyCode::Left) => cursor = prev_boundary(text, cursor).unwrap_or(cursor),
        (_, KeyCode::Right) => cursor = next_boundary(text, cursor).unwrap_or(cursor),
        (_, KeyCode::Backspace) => {
            let start = if word_mod {
                word_left(text, cursor)
            } else {
                prev_boundary(text, cursor).unwrap_or(cursor)
            };
            text.drain(start..cursor);
            cursor = start;
        }
        (_, KeyCode::Delete) => {
            if let Some(end) = next_boundary(text, cursor) {
                text.drain(cursor..end);
            }
        }
        _ => return false,
    }
    app.edit_cursor = cursor;
    true
}
