// Gamepad device abstraction.
//
// The manager talks to a `GamepadBackend` trait so tests can drive pad input
// without hardware; `GilrsGamepads` adapts real devices.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use gilrs::{Axis, EventType, Gilrs, MappingSource};
use log::debug;

/// Controller family, used to pick a button table and adoption priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamepadKind {
    Xbox,
    Generic,
}

/// Physical button identifiers, standard-layout naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadButton {
    South,
    East,
    North,
    West,
    LeftShoulder,
    RightShoulder,
    Select,
    Start,
    LeftThumb,
    RightThumb,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

/// Stable identifier a backend assigns to each connected pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadId(pub usize);

/// Which analog stick to sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickSide {
    Left,
    Right,
}

/// Device-level event produced by a backend poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadEvent {
    Connected { id: PadId, kind: GamepadKind },
    Disconnected { id: PadId },
    ButtonDown { id: PadId, button: PadButton },
    ButtonUp { id: PadId, button: PadButton },
}

/// Gamepad device access used by the input manager.
pub trait GamepadBackend {
    /// Drain device events accumulated since the last poll.
    fn poll_events(&mut self) -> Vec<PadEvent>;

    /// Pads currently connected that look like genuine controllers.
    fn connected_pads(&self) -> Vec<(PadId, GamepadKind)>;

    /// Current deflection of one of a pad's sticks, each axis in [-1, 1].
    fn stick(&self, id: PadId, side: StickSide) -> (f32, f32);
}

/// Backend used when gamepad support is unavailable at runtime.
#[derive(Debug, Default)]
pub struct NullGamepads;

impl GamepadBackend for NullGamepads {
    fn poll_events(&mut self) -> Vec<PadEvent> {
        Vec::new()
    }

    fn connected_pads(&self) -> Vec<(PadId, GamepadKind)> {
        Vec::new()
    }

    fn stick(&self, _id: PadId, _side: StickSide) -> (f32, f32) {
        (0.0, 0.0)
    }
}

/// In-memory backend for tests: pads are connected and driven by hand.
#[derive(Debug, Default)]
pub struct VirtualGamepads {
    pending: Vec<PadEvent>,
    pads: Vec<(PadId, GamepadKind)>,
    sticks: Vec<(PadId, StickSide, (f32, f32))>,
}

impl VirtualGamepads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, id: PadId, kind: GamepadKind) {
        if !self.pads.iter().any(|(p, _)| *p == id) {
            self.pads.push((id, kind));
        }
        self.pending.push(PadEvent::Connected { id, kind });
    }

    pub fn disconnect(&mut self, id: PadId) {
        self.pads.retain(|(p, _)| *p != id);
        self.sticks.retain(|(p, _, _)| *p != id);
        self.pending.push(PadEvent::Disconnected { id });
    }

    pub fn press(&mut self, id: PadId, button: PadButton) {
        self.pending.push(PadEvent::ButtonDown { id, button });
    }

    pub fn release(&mut self, id: PadId, button: PadButton) {
        self.pending.push(PadEvent::ButtonUp { id, button });
    }

    pub fn set_stick(&mut self, id: PadId, side: StickSide, x: f32, y: f32) {
        match self
            .sticks
            .iter_mut()
            .find(|(p, s, _)| *p == id && *s == side)
        {
            Some(entry) => entry.2 = (x, y),
            None => self.sticks.push((id, side, (x, y))),
        }
    }
}

impl GamepadBackend for VirtualGamepads {
    fn poll_events(&mut self) -> Vec<PadEvent> {
        std::mem::take(&mut self.pending)
    }

    fn connected_pads(&self) -> Vec<(PadId, GamepadKind)> {
        self.pads.clone()
    }

    fn stick(&self, id: PadId, side: StickSide) -> (f32, f32) {
        self.sticks
            .iter()
            .find(|(p, s, _)| *p == id && *s == side)
            .map(|(_, _, v)| *v)
            .unwrap_or((0.0, 0.0))
    }
}

/// Cloneable handle over a `VirtualGamepads`, letting tests keep driving
/// the device after the manager takes ownership of its box.
#[derive(Debug, Clone, Default)]
pub struct SharedVirtualGamepads {
    inner: Rc<RefCell<VirtualGamepads>>,
}

impl SharedVirtualGamepads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, id: PadId, kind: GamepadKind) {
        self.inner.borrow_mut().connect(id, kind);
    }

    pub fn disconnect(&self, id: PadId) {
        self.inner.borrow_mut().disconnect(id);
    }

    pub fn press(&self, id: PadId, button: PadButton) {
        self.inner.borrow_mut().press(id, button);
    }

    pub fn release(&self, id: PadId, button: PadButton) {
        self.inner.borrow_mut().release(id, button);
    }

    pub fn set_stick(&self, id: PadId, side: StickSide, x: f32, y: f32) {
        self.inner.borrow_mut().set_stick(id, side, x, y);
    }
}

impl GamepadBackend for SharedVirtualGamepads {
    fn poll_events(&mut self) -> Vec<PadEvent> {
        self.inner.borrow_mut().poll_events()
    }

    fn connected_pads(&self) -> Vec<(PadId, GamepadKind)> {
        self.inner.borrow().connected_pads()
    }

    fn stick(&self, id: PadId, side: StickSide) -> (f32, f32) {
        self.inner.borrow().stick(id, side)
    }
}

/// gilrs-backed implementation for real devices.
pub struct GilrsGamepads {
    gilrs: Gilrs,
}

impl GilrsGamepads {
    pub fn new() -> Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| anyhow!("failed to initialize gilrs: {e}"))?;
        Ok(Self { gilrs })
    }

    fn kind_of(&self, id: gilrs::GamepadId) -> GamepadKind {
        let name = self.gilrs.gamepad(id).name().to_ascii_lowercase();
        if name.contains("xbox") || name.contains("x-box") {
            GamepadKind::Xbox
        } else {
            GamepadKind::Generic
        }
    }

    /// Heuristic for genuine controllers: the driver or SDL database knows
    /// how to map the device. Filters out devices the host reports as pads
    /// but that have no usable buttons.
    fn is_genuine(&self, id: gilrs::GamepadId) -> bool {
        self.gilrs.gamepad(id).mapping_source() != MappingSource::None
    }
}

impl GamepadBackend for GilrsGamepads {
    fn poll_events(&mut self) -> Vec<PadEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.gilrs.next_event() {
            let id = PadId(event.id.into());
            match event.event {
                EventType::Connected => {
                    if self.is_genuine(event.id) {
                        let kind = self.kind_of(event.id);
                        debug!("gamepad connected: {:?} ({:?})", id, kind);
                        events.push(PadEvent::Connected { id, kind });
                    }
                }
                EventType::Disconnected => {
                    debug!("gamepad disconnected: {:?}", id);
                    events.push(PadEvent::Disconnected { id });
                }
                EventType::ButtonPressed(button, _) => {
                    if let Some(button) = map_button(button) {
                        events.push(PadEvent::ButtonDown { id, button });
                    }
                }
                EventType::ButtonReleased(button, _) => {
                    if let Some(button) = map_button(button) {
                        events.push(PadEvent::ButtonUp { id, button });
                    }
                }
                _ => {}
            }
        }
        events
    }

    fn connected_pads(&self) -> Vec<(PadId, GamepadKind)> {
        self.gilrs
            .gamepads()
            .filter(|(id, _)| self.is_genuine(*id))
            .map(|(id, _)| (PadId(id.into()), self.kind_of(id)))
            .collect()
    }

    fn stick(&self, id: PadId, side: StickSide) -> (f32, f32) {
        let Some((_, pad)) = self
            .gilrs
            .gamepads()
            .find(|(gid, _)| usize::from(*gid) == id.0)
        else {
            return (0.0, 0.0);
        };
        match side {
            StickSide::Left => (pad.value(Axis::LeftStickX), pad.value(Axis::LeftStickY)),
            StickSide::Right => (pad.value(Axis::RightStickX), pad.value(Axis::RightStickY)),
        }
    }
}

fn map_button(button: gilrs::Button) -> Option<PadButton> {
    use gilrs::Button;
    match button {
        Button::South => Some(PadButton::South),
        Button::East => Some(PadButton::East),
        Button::North => Some(PadButton::North),
        Button::West => Some(PadButton::West),
        Button::LeftTrigger => Some(PadButton::LeftShoulder),
        Button::RightTrigger => Some(PadButton::RightShoulder),
        Button::Select => Some(PadButton::Select),
        Button::Start => Some(PadButton::Start),
        Button::LeftThumb => Some(PadButton::LeftThumb),
        Button::RightThumb => Some(PadButton::RightThumb),
        Button::DPadUp => Some(PadButton::DPadUp),
        Button::DPadDown => Some(PadButton::DPadDown),
        Button::DPadLeft => Some(PadButton::DPadLeft),
        Button::DPadRight => Some(PadButton::DPadRight),
        _ => None,
    }
}
