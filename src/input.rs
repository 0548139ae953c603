use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    /// Letter keys, stored upper-case.
    Character(char),
}

impl KeyCode {
    /// Letter key for `ch`, case-insensitive.
    pub fn letter(ch: char) -> Self {
        Self::Character(ch.to_ascii_uppercase())
    }
}

/// Non-letter keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Escape,
    NumpadAdd,
    NumpadSubtract,
}

/// Set of keys currently held down, fed by the window event loop.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn set_key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_letter_down(&self, ch: char) -> bool {
        self.is_key_down(KeyCode::letter(ch))
    }

    /// Forgets every held key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_are_case_insensitive() {
        assert_eq!(KeyCode::letter('w'), KeyCode::Character('W'));
        let mut state = InputState::new();
        state.set_key_down(KeyCode::letter('w'));
        assert!(state.is_letter_down('W'));
    }

    #[test]
    fn input_state_tracks_keys() {
        let mut state = InputState::new();
        state.set_key_down(KeyCode::Named(NamedKey::Escape));
        assert!(state.is_key_down(KeyCode::Named(NamedKey::Escape)));
        state.set_key_up(KeyCode::Named(NamedKey::Escape));
        assert!(!state.is_key_down(KeyCode::Named(NamedKey::Escape)));
    }

    #[test]
    fn clear_releases_everything() {
        let mut state = InputState::new();
        state.set_key_down(KeyCode::letter('a'));
        state.set_key_down(KeyCode::Named(NamedKey::NumpadAdd));
        state.clear();
        assert!(!state.is_letter_down('a'));
        assert!(!state.is_key_down(KeyCode::Named(NamedKey::NumpadAdd)));
    }
}
