use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::keybindings::{Action, KeyBindings};
use crate::app::state::{AppState, View};

pub enum InputResult {
    Continue,
    Quit,
    Action(Action),
    Char(char),
    Backspace,
}

pub fn handle_input(event: Event, state: &AppState, bindings: &KeyBindings) -> InputResult {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key(key_event, state, bindings)
        }
        _ => InputResult::Continue,
    }
}

fn handle_key(key: KeyEvent, state: &AppState, bindings: &KeyBindings) -> InputResult {
    if state.modal.is_query() {
        return handle_query_input(key);
    }

    if state.modal.is_options() {
        return handle_options_input(key, bindings);
    }

    if let Some(action) = bindings.get(&key) {
        if action == Action::Quit {
            return InputResult::Quit;
        }
        return InputResult::Action(action);
    }

    // Esc in the message view goes back, like the web UI's back button
    if key.code == KeyCode::Esc && state.view == View::Message {
        return InputResult::Action(Action::HistoryBack);
    }

    InputResult::Continue
}

/// Query editor: free text plus Enter to commit, Esc to cancel.
fn handle_query_input(key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Enter => InputResult::Action(Action::Submit),
        KeyCode::Esc => InputResult::Action(Action::CloseModal),
        KeyCode::Backspace => InputResult::Backspace,
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            InputResult::Char(c)
        }
        _ => InputResult::Continue,
    }
}

/// Options panel: j/k move, Space toggles, h/l step the day window,
/// Esc or f closes.
fn handle_options_input(key: KeyEvent, bindings: &KeyBindings) -> InputResult {
    match key.code {
        KeyCode::Esc => return InputResult::Action(Action::CloseModal),
        KeyCode::Char(' ') => return InputResult::Action(Action::Toggle),
        KeyCode::Enter => return InputResult::Action(Action::Submit),
        _ => {}
    }

    if let Some(action) = bindings.get(&key) {
        match action {
            Action::Up | Action::Down | Action::Left | Action::Right => {
                return InputResult::Action(action);
            }
            Action::Options => return InputResult::Action(Action::CloseModal),
            Action::Quit => return InputResult::Quit,
            _ => {}
        }
    }

    InputResult::Continue
}
