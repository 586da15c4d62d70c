// Semantic input actions and the snapshot entries derived from raw input.

use std::fmt;

use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

/// Semantic game action, decoupled from the physical device that produced it.
///
/// Screens opt into the subset they handle through their binding list; an
/// action no screen handles is simply never dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveIn,
    MoveOut,
    RotateUp,
    RotateDown,
    RotateLeft,
    RotateRight,
    Activate,
    GoBack,
    Pause,
}

impl Action {
    pub fn all() -> &'static [Action] {
        &[
            Action::MoveUp,
            Action::MoveDown,
            Action::MoveLeft,
            Action::MoveRight,
            Action::MoveIn,
            Action::MoveOut,
            Action::RotateUp,
            Action::RotateDown,
            Action::RotateLeft,
            Action::RotateRight,
            Action::Activate,
            Action::GoBack,
            Action::Pause,
        ]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::MoveUp => "MOVE_UP",
            Action::MoveDown => "MOVE_DOWN",
            Action::MoveLeft => "MOVE_LEFT",
            Action::MoveRight => "MOVE_RIGHT",
            Action::MoveIn => "MOVE_IN",
            Action::MoveOut => "MOVE_OUT",
            Action::RotateUp => "ROTATE_UP",
            Action::RotateDown => "ROTATE_DOWN",
            Action::RotateLeft => "ROTATE_LEFT",
            Action::RotateRight => "ROTATE_RIGHT",
            Action::Activate => "ACTIVATE",
            Action::GoBack => "GO_BACK",
            Action::Pause => "PAUSE",
        };
        write!(f, "{name}")
    }
}

/// Declares that a screen wants `action`, and whether its handler is wrapped
/// in the debounce cooldown when the dispatch table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionBinding {
    pub action: Action,
    pub bounce: bool,
}

impl ActionBinding {
    /// One-shot binding: repeated firings are suppressed for the cooldown
    /// window after each dispatch.
    pub fn bounced(action: Action) -> Self {
        Self {
            action,
            bounce: true,
        }
    }

    /// Continuous binding: dispatched every frame the input is active.
    pub fn continuous(action: Action) -> Self {
        Self {
            action,
            bounce: false,
        }
    }
}

/// Most recent raw payload recorded for an active input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    /// Keyboard event, carrying the physical key.
    Key(KeyCode),
    /// Pointer tap.
    Pointer,
    /// Gamepad button press, a synthetic full-magnitude signal.
    Button,
    /// Analog stick deflection beyond the dead zone. The magnitude rides
    /// along, but mapped actions treat it as a presence signal.
    Stick(f32),
}

/// One entry of an action snapshot: a mapped action plus the raw event that
/// most recently triggered it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggeredAction {
    pub action: Action,
    pub event: RawEvent,
}
