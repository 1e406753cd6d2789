use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Keys the screens react to. Letters stay as `Char` because forms need them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Char(char),
    Interrupt,
    None,
}

pub fn map_event(ev: Event) -> Input {
    if let Event::Key(KeyEvent {
        code, modifiers, kind, ..
    }) = ev
    {
        // windows reports releases too
        if kind == KeyEventKind::Release {
            return Input::None;
        }
        match (code, modifiers) {
            (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => Input::Interrupt,
            (KeyCode::Up, _) => Input::Up,
            (KeyCode::Down, _) => Input::Down,
            (KeyCode::Left, _) => Input::Left,
            (KeyCode::Right, _) => Input::Right,
            (KeyCode::Enter, _) => Input::Enter,
            (KeyCode::Esc, _) => Input::Esc,
            (KeyCode::Tab, _) => Input::Tab,
            (KeyCode::BackTab, _) => Input::BackTab,
            (KeyCode::Backspace, _) => Input::Backspace,
            (KeyCode::Delete, _) => Input::Delete,
            (KeyCode::Char(c), _) => Input::Char(c),
            _ => Input::None,
        }
    } else {
        Input::None
    }
}

/// Navigation keys outside of text fields: arrows or vim-style j/k.
pub fn is_up(input: Input) -> bool {
    matches!(input, Input::Up | Input::Char('k'))
}

pub fn is_down(input: Input) -> bool {
    matches!(input, Input::Down | Input::Char('j'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent { code, modifiers, kind, state: KeyEventState::NONE })
    }

    #[test]
    fn maps_keys() {
        let press = KeyEventKind::Press;
        assert_eq!(map_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL, press)), Input::Interrupt);
        assert_eq!(map_event(key(KeyCode::Char('c'), KeyModifiers::NONE, press)), Input::Char('c'));
        assert_eq!(map_event(key(KeyCode::Enter, KeyModifiers::NONE, press)), Input::Enter);
        assert_eq!(map_event(key(KeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Release)), Input::None);
        assert_eq!(map_event(Event::FocusGained), Input::None);
    }

    #[test]
    fn vim_navigation() {
        assert!(is_up(Input::Char('k')) && is_up(Input::Up));
        assert!(is_down(Input::Char('j')) && !is_down(Input::Char('k')));
    }
}
