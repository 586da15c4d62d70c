// Control mapping tables and analog stick normalization.
//
// The keyboard table is user-configurable and persisted as JSON; the gamepad
// button tables are static per controller kind. Translation from raw inputs
// to actions has no state beyond these tables.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

use crate::action::{Action, RawEvent};
use crate::gamepad::{GamepadKind, PadButton};
use crate::raw_map::{RawInput, RawInputMap};

/// Stick deflections below this magnitude are treated as centered.
pub const DEAD_ZONE: f32 = 0.15;

/// Normalized stick deflection after dead-zone clamping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StickValues {
    pub x: f32,
    pub y: f32,
}

/// Configurable keyboard bindings plus the pointer-tap action.
/// Missing entries are filled from defaults on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsConfig {
    pub keyboard: HashMap<Action, Vec<KeyCode>>,
    pub pointer: Action,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        let mut keyboard = HashMap::new();
        keyboard.insert(Action::MoveUp, vec![KeyCode::ArrowUp, KeyCode::KeyW]);
        keyboard.insert(Action::MoveDown, vec![KeyCode::ArrowDown, KeyCode::KeyS]);
        keyboard.insert(Action::MoveLeft, vec![KeyCode::ArrowLeft, KeyCode::KeyA]);
        keyboard.insert(Action::MoveRight, vec![KeyCode::ArrowRight, KeyCode::KeyD]);
        keyboard.insert(Action::MoveIn, vec![KeyCode::KeyR]);
        keyboard.insert(Action::MoveOut, vec![KeyCode::KeyF]);
        keyboard.insert(Action::RotateUp, vec![KeyCode::KeyI]);
        keyboard.insert(Action::RotateDown, vec![KeyCode::KeyK]);
        keyboard.insert(Action::RotateLeft, vec![KeyCode::KeyQ]);
        keyboard.insert(Action::RotateRight, vec![KeyCode::KeyE]);
        keyboard.insert(Action::Activate, vec![KeyCode::Enter, KeyCode::Space]);
        keyboard.insert(Action::GoBack, vec![KeyCode::Escape, KeyCode::Backspace]);
        keyboard.insert(Action::Pause, vec![KeyCode::KeyP]);

        Self {
            keyboard,
            pointer: Action::Activate,
        }
    }
}

impl ControlsConfig {
    /// Load bindings from a path. A missing file yields the defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no controls file at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;
        config.normalize();
        Ok(config)
    }

    /// Save bindings to a path as pretty JSON.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Back-fill actions absent from a loaded file with their defaults.
    fn normalize(&mut self) {
        let defaults = Self::default();
        for action in Action::all() {
            self.keyboard
                .entry(*action)
                .or_insert_with(|| defaults.keyboard.get(action).cloned().unwrap_or_default());
        }
    }
}

/// Runtime raw-to-action lookup built from `ControlsConfig`.
///
/// Read-only once constructed; the gamepad tables live in `pad_action`.
#[derive(Debug, Clone)]
pub struct ControlMap {
    keys: HashMap<KeyCode, Action>,
    pointer: Action,
}

impl ControlMap {
    pub fn from_config(config: &ControlsConfig) -> Self {
        let mut keys = HashMap::new();
        for (action, bound_keys) in &config.keyboard {
            for key in bound_keys {
                keys.insert(*key, *action);
            }
        }
        Self {
            keys,
            pointer: config.pointer,
        }
    }

    /// Action a keyboard key maps to, if any. Unmapped keys yield `None`
    /// and are never stored in the raw snapshot.
    pub fn action_for_key(&self, key: KeyCode) -> Option<Action> {
        self.keys.get(&key).copied()
    }

    /// Translate a raw input identifier into its semantic action.
    pub fn action_for(&self, input: RawInput) -> Option<Action> {
        match input {
            RawInput::Key(key) => self.action_for_key(key),
            RawInput::PointerTap => Some(self.pointer),
            RawInput::Pad(action) => Some(action),
        }
    }
}

impl Default for ControlMap {
    fn default() -> Self {
        Self::from_config(&ControlsConfig::default())
    }
}

/// Static per-kind gamepad button table. Generic pads only carry the
/// face-button essentials; Xbox-class pads get the full layout.
pub fn pad_action(kind: GamepadKind, button: PadButton) -> Option<Action> {
    match (kind, button) {
        (_, PadButton::South) => Some(Action::Activate),
        (_, PadButton::East) => Some(Action::GoBack),
        (GamepadKind::Xbox, PadButton::Start) => Some(Action::Pause),
        (GamepadKind::Xbox, PadButton::DPadUp) => Some(Action::MoveUp),
        (GamepadKind::Xbox, PadButton::DPadDown) => Some(Action::MoveDown),
        (GamepadKind::Xbox, PadButton::DPadLeft) => Some(Action::MoveLeft),
        (GamepadKind::Xbox, PadButton::DPadRight) => Some(Action::MoveRight),
        (GamepadKind::Xbox, PadButton::LeftShoulder) => Some(Action::MoveIn),
        (GamepadKind::Xbox, PadButton::RightShoulder) => Some(Action::MoveOut),
        _ => None,
    }
}

/// Clamp raw stick input to zero inside the dead zone; values outside pass
/// through unchanged.
pub fn normalize_joystick(x: f32, y: f32) -> StickValues {
    StickValues {
        x: if x.abs() < DEAD_ZONE { 0.0 } else { x },
        y: if y.abs() < DEAD_ZONE { 0.0 } else { y },
    }
}

/// Fold normalized left-stick values into the raw snapshot as translation
/// actions. A centered axis removes both of its direction entries.
pub fn map_stick_translation_to_actions(stick: StickValues, map: &mut RawInputMap) {
    apply_axis(stick.y, Action::MoveUp, Action::MoveDown, map);
    apply_axis(stick.x, Action::MoveRight, Action::MoveLeft, map);
}

/// Fold normalized right-stick values into the raw snapshot as rotation
/// actions.
pub fn map_stick_rotation_to_actions(stick: StickValues, map: &mut RawInputMap) {
    apply_axis(stick.y, Action::RotateUp, Action::RotateDown, map);
    apply_axis(stick.x, Action::RotateRight, Action::RotateLeft, map);
}

fn apply_axis(value: f32, positive: Action, negative: Action, map: &mut RawInputMap) {
    if value > 0.0 {
        map.insert(RawInput::Pad(positive), RawEvent::Stick(value));
        map.remove(RawInput::Pad(negative));
    } else if value < 0.0 {
        map.insert(RawInput::Pad(negative), RawEvent::Stick(value));
        map.remove(RawInput::Pad(positive));
    } else {
        map.remove(RawInput::Pad(positive));
        map.remove(RawInput::Pad(negative));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_cover_every_action() {
        let config = ControlsConfig::default();
        for action in Action::all() {
            assert!(config.keyboard.contains_key(action), "missing {action}");
        }
    }

    #[test]
    fn default_map_translates_arrows_and_pointer() {
        let map = ControlMap::default();
        assert_eq!(map.action_for_key(KeyCode::ArrowUp), Some(Action::MoveUp));
        assert_eq!(map.action_for_key(KeyCode::KeyW), Some(Action::MoveUp));
        assert_eq!(map.action_for_key(KeyCode::F12), None);
        assert_eq!(map.action_for(RawInput::PointerTap), Some(Action::Activate));
        assert_eq!(
            map.action_for(RawInput::Pad(Action::GoBack)),
            Some(Action::GoBack)
        );
    }

    #[test]
    fn config_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("controls.json");

        let mut config = ControlsConfig::default();
        config.keyboard.insert(Action::Pause, vec![KeyCode::KeyO]);
        config.save_to(&path).unwrap();

        let loaded = ControlsConfig::load_from(&path).unwrap();
        assert_eq!(loaded.keyboard[&Action::Pause], vec![KeyCode::KeyO]);
        assert_eq!(loaded.pointer, Action::Activate);
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ControlsConfig::load_from(dir.path().join("absent.json")).unwrap();
        assert_eq!(config.keyboard[&Action::Activate][0], KeyCode::Enter);
    }

    #[test]
    fn load_normalizes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(
            &path,
            r#"{ "keyboard": { "PAUSE": ["Home"] }, "pointer": "ACTIVATE" }"#,
        )
        .unwrap();

        let config = ControlsConfig::load_from(&path).unwrap();
        assert_eq!(config.keyboard[&Action::Pause], vec![KeyCode::Home]);
        // Back-filled from defaults.
        assert_eq!(config.keyboard[&Action::MoveUp][0], KeyCode::ArrowUp);
    }

    #[test]
    fn pad_tables_differ_by_kind() {
        assert_eq!(
            pad_action(GamepadKind::Generic, PadButton::South),
            Some(Action::Activate)
        );
        assert_eq!(pad_action(GamepadKind::Generic, PadButton::DPadUp), None);
        assert_eq!(
            pad_action(GamepadKind::Xbox, PadButton::DPadUp),
            Some(Action::MoveUp)
        );
        assert_eq!(
            pad_action(GamepadKind::Xbox, PadButton::Start),
            Some(Action::Pause)
        );
    }

    #[test]
    fn stick_translation_inserts_and_removes() {
        let mut map = RawInputMap::new();

        map_stick_translation_to_actions(StickValues { x: 0.0, y: 0.9 }, &mut map);
        assert!(map.contains(RawInput::Pad(Action::MoveUp)));
        assert!(!map.contains(RawInput::Pad(Action::MoveDown)));

        // Reversing direction swaps the entries.
        map_stick_translation_to_actions(StickValues { x: 0.0, y: -0.4 }, &mut map);
        assert!(!map.contains(RawInput::Pad(Action::MoveUp)));
        assert!(map.contains(RawInput::Pad(Action::MoveDown)));

        // Centering removes both.
        map_stick_translation_to_actions(StickValues::default(), &mut map);
        assert!(map.is_empty());
    }

    #[test]
    fn stick_rotation_uses_rotate_actions() {
        let mut map = RawInputMap::new();
        map_stick_rotation_to_actions(StickValues { x: -0.6, y: 0.0 }, &mut map);
        assert!(map.contains(RawInput::Pad(Action::RotateLeft)));
        assert_eq!(
            map.get(RawInput::Pad(Action::RotateLeft)),
            Some(&RawEvent::Stick(-0.6))
        );
    }

    proptest! {
        #[test]
        fn dead_zone_clamps_small_values(x in -1.0f32..1.0, y in -1.0f32..1.0) {
            let normalized = normalize_joystick(x, y);
            if x.abs() < DEAD_ZONE {
                prop_assert_eq!(normalized.x, 0.0);
            } else {
                prop_assert_eq!(normalized.x, x);
            }
            if y.abs() < DEAD_ZONE {
                prop_assert_eq!(normalized.y, 0.0);
            } else {
                prop_assert_eq!(normalized.y, y);
            }
        }

        #[test]
        fn opposite_directions_never_coexist(y in -1.0f32..1.0) {
            let mut map = RawInputMap::new();
            let stick = normalize_joystick(0.0, y);
            map_stick_translation_to_actions(stick, &mut map);
            prop_assert!(
                !(map.contains(RawInput::Pad(Action::MoveUp))
                    && map.contains(RawInput::Pad(Action::MoveDown)))
            );
        }
    }
}
