// Application lifecycle states and the generic state machine that tracks
// them with one frame of history.

use std::fmt;

/// Top-level lifecycle state of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Constructed, nothing initialized yet.
    Created,
    /// Subsystems coming up; holds for a short countdown.
    Initializing,
    /// Splash cutscene playing.
    Cutscene,
    /// Main menu active.
    Menu,
    /// Route-planning gameplay active.
    Running,
    /// Terminal: the driver tears down the event loop.
    Exiting,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppState::Created => "CREATED",
            AppState::Initializing => "INITIALIZING",
            AppState::Cutscene => "CUTSCENE",
            AppState::Menu => "MENU",
            AppState::Running => "RUNNING",
            AppState::Exiting => "EXITING",
        };
        write!(f, "{name}")
    }
}

/// Current/previous state pair.
///
/// `previous` is only advanced by an explicit `set_previous` at the end of a
/// tick, so `is_changed` reports true for the whole frame in which a
/// transition happened, however early in the frame it occurred.
#[derive(Debug)]
pub struct StateMachine<T: Copy + PartialEq> {
    current: T,
    previous: T,
}

impl<T: Copy + PartialEq> StateMachine<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            previous: initial,
        }
    }

    pub fn state(&self) -> T {
        self.current
    }

    pub fn set_state(&mut self, state: T) {
        self.current = state;
    }

    pub fn previous(&self) -> T {
        self.previous
    }

    /// End-of-tick bookkeeping.
    pub fn set_previous(&mut self, state: T) {
        self.previous = state;
    }

    pub fn is_changed(&self) -> bool {
        self.current != self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_machine_reports_unchanged() {
        let machine = StateMachine::new(AppState::Created);
        assert_eq!(machine.state(), AppState::Created);
        assert_eq!(machine.previous(), AppState::Created);
        assert!(!machine.is_changed());
    }

    #[test]
    fn change_is_visible_until_previous_advances() {
        let mut machine = StateMachine::new(AppState::Created);
        machine.set_state(AppState::Initializing);
        assert!(machine.is_changed());
        assert_eq!(machine.previous(), AppState::Created);

        machine.set_previous(AppState::Initializing);
        assert!(!machine.is_changed());
    }

    #[test]
    fn setting_same_state_is_not_a_change() {
        let mut machine = StateMachine::new(AppState::Menu);
        machine.set_state(AppState::Menu);
        assert!(!machine.is_changed());
    }

    #[test]
    fn display_names() {
        assert_eq!(AppState::Cutscene.to_string(), "CUTSCENE");
        assert_eq!(AppState::Exiting.to_string(), "EXITING");
    }
}
