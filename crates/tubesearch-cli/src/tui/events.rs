use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Keyboard intents. Their meaning depends on the current screen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Quit,
    Confirm,
    Cancel,
    Logout,
    Insert(char),
    DeleteChar,
    ScrollUp,
    ScrollDown,
    None,
}

pub fn poll_event(timeout: Duration) -> io::Result<Action> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind != KeyEventKind::Release
    {
        return Ok(key_to_action(key));
    }
    Ok(Action::None)
}

fn key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Char('o'), KeyModifiers::CONTROL) => Action::Logout,
        (KeyCode::Esc, _) => Action::Cancel,
        (KeyCode::Enter, _) => Action::Confirm,

        (KeyCode::Up, _) | (KeyCode::PageUp, _) => Action::ScrollUp,
        (KeyCode::Down, _) | (KeyCode::PageDown, _) => Action::ScrollDown,

        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::Insert(c)
        }
        (KeyCode::Backspace, _) => Action::DeleteChar,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Action {
        key_to_action(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn control_chords() {
        assert_eq!(key(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
        assert_eq!(key(KeyCode::Char('o'), KeyModifiers::CONTROL), Action::Logout);
        assert_eq!(key(KeyCode::Char('x'), KeyModifiers::CONTROL), Action::None);
    }

    #[test]
    fn enter_and_escape() {
        assert_eq!(key(KeyCode::Enter, KeyModifiers::NONE), Action::Confirm);
        assert_eq!(key(KeyCode::Esc, KeyModifiers::NONE), Action::Cancel);
    }

    #[test]
    fn typed_characters_keep_case() {
        assert_eq!(key(KeyCode::Char('q'), KeyModifiers::NONE), Action::Insert('q'));
        assert_eq!(key(KeyCode::Char('Q'), KeyModifiers::SHIFT), Action::Insert('Q'));
        assert_eq!(key(KeyCode::Char(' '), KeyModifiers::NONE), Action::Insert(' '));
        assert_eq!(key(KeyCode::Backspace, KeyModifiers::NONE), Action::DeleteChar);
    }

    #[test]
    fn scrolling() {
        assert_eq!(key(KeyCode::Up, KeyModifiers::NONE), Action::ScrollUp);
        assert_eq!(key(KeyCode::PageDown, KeyModifiers::NONE), Action::ScrollDown);
    }
}
