// Raw input snapshot: the set of currently active device signals.

use winit::keyboard::KeyCode;

use crate::action::{Action, RawEvent};

/// Identifier of a raw device signal prior to semantic translation.
///
/// Gamepad buttons map straight to actions at the device layer, so their
/// entries are keyed by the mapped action rather than a button name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    Key(KeyCode),
    PointerTap,
    Pad(Action),
}

/// Insertion-ordered map of currently active raw inputs.
///
/// Owned and mutated exclusively by the input manager's device listeners;
/// read by the translation tick. Entries are added on press/connect and
/// removed on release/disconnect, so the map stays small (bounded by the
/// number of simultaneously held inputs).
#[derive(Debug, Default)]
pub struct RawInputMap {
    entries: Vec<(RawInput, RawEvent)>,
}

impl RawInputMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the payload for `input`. Replacement keeps the
    /// entry's original position so snapshot ordering stays stable while a
    /// key is held.
    pub fn insert(&mut self, input: RawInput, event: RawEvent) {
        match self.entries.iter_mut().find(|(i, _)| *i == input) {
            Some(entry) => entry.1 = event,
            None => self.entries.push((input, event)),
        }
    }

    /// Remove the entry for `input`. Returns whether it was present.
    pub fn remove(&mut self, input: RawInput) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(i, _)| *i != input);
        self.entries.len() != before
    }

    pub fn contains(&self, input: RawInput) -> bool {
        self.entries.iter().any(|(i, _)| *i == input)
    }

    pub fn get(&self, input: RawInput) -> Option<&RawEvent> {
        self.entries
            .iter()
            .find(|(i, _)| *i == input)
            .map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop all gamepad-sourced entries. Used when the adopted pad goes away.
    pub fn clear_pad_entries(&mut self) {
        self.entries.retain(|(i, _)| !matches!(i, RawInput::Pad(_)));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(RawInput, RawEvent)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_remove_round_trip() {
        let mut map = RawInputMap::new();
        assert!(map.is_empty());

        map.insert(RawInput::Key(KeyCode::ArrowUp), RawEvent::Key(KeyCode::ArrowUp));
        assert!(map.contains(RawInput::Key(KeyCode::ArrowUp)));
        assert_eq!(map.len(), 1);

        assert!(map.remove(RawInput::Key(KeyCode::ArrowUp)));
        assert!(map.is_empty());
    }

    #[test]
    fn remove_absent_entry_is_false() {
        let mut map = RawInputMap::new();
        assert!(!map.remove(RawInput::PointerTap));
    }

    #[test]
    fn replacement_keeps_position() {
        let mut map = RawInputMap::new();
        map.insert(RawInput::Pad(Action::MoveUp), RawEvent::Stick(0.5));
        map.insert(RawInput::PointerTap, RawEvent::Pointer);
        map.insert(RawInput::Pad(Action::MoveUp), RawEvent::Stick(0.9));

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, RawInput::Pad(Action::MoveUp));
        assert_eq!(entries[0].1, RawEvent::Stick(0.9));
    }

    #[test]
    fn clear_pad_entries_leaves_other_devices() {
        let mut map = RawInputMap::new();
        map.insert(RawInput::Pad(Action::Activate), RawEvent::Button);
        map.insert(RawInput::Key(KeyCode::Enter), RawEvent::Key(KeyCode::Enter));
        map.insert(RawInput::Pad(Action::MoveLeft), RawEvent::Stick(-0.7));

        map.clear_pad_entries();

        assert_eq!(map.len(), 1);
        assert!(map.contains(RawInput::Key(KeyCode::Enter)));
    }
}
