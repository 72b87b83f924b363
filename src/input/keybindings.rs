use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Navigation
    Up,
    Down,
    Left,
    Right,
    Top,
    Bottom,

    // History
    HistoryBack,
    HistoryForward,

    // Paging
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,

    // Actions
    Open,
    Search,
    Options,
    Refresh,
    Redeliver,
    Quit,

    // Modal control
    Submit,
    CloseModal,
    Toggle,
}

pub struct KeyBindings {
    bindings: HashMap<(KeyCode, KeyModifiers), Action>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();
        let mut bind = |code: KeyCode, action: Action| {
            bindings.insert((code, KeyModifiers::NONE), action);
        };

        bind(KeyCode::Char('q'), Action::Quit);

        bind(KeyCode::Char('j'), Action::Down);
        bind(KeyCode::Down, Action::Down);
        bind(KeyCode::Char('k'), Action::Up);
        bind(KeyCode::Up, Action::Up);
        bind(KeyCode::Char('h'), Action::Left);
        bind(KeyCode::Left, Action::Left);
        bind(KeyCode::Char('l'), Action::Right);
        bind(KeyCode::Right, Action::Right);
        bind(KeyCode::Char('g'), Action::Top);
        bind(KeyCode::Home, Action::Top);
        bind(KeyCode::Char('G'), Action::Bottom);
        bind(KeyCode::End, Action::Bottom);

        bind(KeyCode::Enter, Action::Open);
        bind(KeyCode::Char('/'), Action::Search);
        bind(KeyCode::Char('f'), Action::Options);
        bind(KeyCode::Char('r'), Action::Refresh);
        bind(KeyCode::Char('d'), Action::Redeliver);

        bind(KeyCode::Char('n'), Action::NextPage);
        bind(KeyCode::PageDown, Action::NextPage);
        bind(KeyCode::Char('p'), Action::PrevPage);
        bind(KeyCode::PageUp, Action::PrevPage);
        bind(KeyCode::Char('<'), Action::FirstPage);
        bind(KeyCode::Char('>'), Action::LastPage);

        bind(KeyCode::Char('['), Action::HistoryBack);
        bind(KeyCode::Backspace, Action::HistoryBack);
        bind(KeyCode::Char(']'), Action::HistoryForward);

        Self { bindings }
    }

    /// Look up a key event. SHIFT is folded into character keys already
    /// (an uppercase char arrives with the SHIFT modifier set), so it is
    /// stripped before the lookup.
    pub fn get(&self, key: &KeyEvent) -> Option<Action> {
        let modifiers = match key.code {
            KeyCode::Char(_) => key.modifiers - KeyModifiers::SHIFT,
            _ => key.modifiers,
        };
        self.bindings.get(&(key.code, modifiers)).copied()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_is_stripped_for_char_keys() {
        let bindings = KeyBindings::new();
        let key = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(bindings.get(&key), Some(Action::Bottom));
    }

    #[test]
    fn test_unbound_key_maps_to_nothing() {
        let bindings = KeyBindings::new();
        let key = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE);
        assert_eq!(bindings.get(&key), None);
    }
}
