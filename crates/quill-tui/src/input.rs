//! Input handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Processed input action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter/submit
    Submit,
    /// Backspace
    Backspace,
    /// Delete
    Delete,
    /// Move cursor left
    Left,
    /// Move cursor right
    Right,
    /// Selector navigation up
    Up,
    /// Selector navigation down
    Down,
    /// Move to start of line
    Home,
    /// Move to end of line
    End,
    /// Scroll chat up a page
    PageUp,
    /// Scroll chat down a page
    PageDown,
    /// Escape (close popup / abort stream)
    Escape,
    /// Ctrl+C (abort stream / quit)
    Interrupt,
    /// Ctrl+Q (quit)
    Quit,
    /// Ctrl+L (clear conversation)
    ClearChat,
    /// Ctrl+U (clear input line)
    ClearLine,
    /// Ctrl+W (delete word)
    DeleteWord,
    /// Ctrl+K (open model selector)
    ModelSelect,
    /// Ctrl+'+' (larger font)
    FontIncrease,
    /// Ctrl+'-' (smaller font)
    FontDecrease,
    /// Paste (bracketed paste)
    Paste(String),
    /// Unknown/unhandled
    Unknown,
}

/// Convert a crossterm key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Interrupt,
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('l') => Action::ClearChat,
            KeyCode::Char('u') => Action::ClearLine,
            KeyCode::Char('w') => Action::DeleteWord,
            KeyCode::Char('k') => Action::ModelSelect,
            KeyCode::Char('+') | KeyCode::Char('=') => Action::FontIncrease,
            KeyCode::Char('-') => Action::FontDecrease,
            _ => Action::Unknown,
        };
    }

    if modifiers.contains(KeyModifiers::ALT) {
        return Action::Unknown;
    }

    match code {
        KeyCode::Char(c) => Action::Char(c),
        KeyCode::Enter => Action::Submit,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Esc => Action::Escape,
        _ => Action::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_plain_chars_pass_through() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('a'), KeyModifiers::NONE)),
            Action::Char('a')
        );
        assert_eq!(
            key_to_action(key(KeyCode::Enter, KeyModifiers::NONE)),
            Action::Submit
        );
    }

    #[test]
    fn test_font_bindings() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('+'), KeyModifiers::CONTROL)),
            Action::FontIncrease
        );
        // Unshifted layout sends '=' for the same physical key.
        assert_eq!(
            key_to_action(key(KeyCode::Char('='), KeyModifiers::CONTROL)),
            Action::FontIncrease
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('-'), KeyModifiers::CONTROL)),
            Action::FontDecrease
        );
    }

    #[test]
    fn test_control_bindings() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('k'), KeyModifiers::CONTROL)),
            Action::ModelSelect
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            Action::ClearChat
        );
    }
}
