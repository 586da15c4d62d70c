// Route planning: aim and launch a cargo unit from the origin planet.
//
// Translation and rotation are continuous bindings whose handlers fold the
// prior-frame token into a hold counter, ramping speed the longer the input
// is held.

use std::time::Duration;

use log::info;

use hauler_input::action::{Action, ActionBinding, RawEvent};
use hauler_input::manager::{InputManager, SurfaceId};
use hauler_input::processor::{ActionFrame, ActionTarget, ActionToken, InputProcessor};

use super::Screen;
use crate::orbital;

const ORIGIN_ORBIT_RADIUS: f32 = 20.0;
const ORIGIN_ANGULAR_VELOCITY: f32 = 0.12;
const BASE_LINEAR_SPEED: f32 = 5.0;
const BASE_ANGULAR_SPEED: f32 = 0.8;
/// Frames of hold needed to reach full speed.
const RAMP_FRAMES: f32 = 10.0;

/// Planning state; the screen's action target.
#[derive(Debug, Default)]
pub struct PlanningModel {
    cargo_position: [f32; 3],
    cargo_rotation: [f32; 3],
    paused: bool,
    back_requested: bool,
    launched: bool,
    elapsed_s: f32,
    frame_dt_s: f32,
}

impl PlanningModel {
    pub fn origin_position(&self) -> [f32; 3] {
        orbital::orbital_position(ORIGIN_ORBIT_RADIUS, ORIGIN_ANGULAR_VELOCITY, self.elapsed_s)
    }

    fn advance(&mut self, dt: Duration) {
        self.frame_dt_s = dt.as_secs_f32();
        if !self.paused {
            self.elapsed_s += self.frame_dt_s;
        }
    }

    /// Hold counter folded from the prior token: first frame of a press
    /// starts at 1, each held frame adds one.
    fn hold_frames(frame: ActionFrame) -> f32 {
        match frame.prior_state {
            ActionToken::Value(n) => n + 1.0,
            _ => 1.0,
        }
    }

    fn ramp(held: f32) -> f32 {
        (held / RAMP_FRAMES).min(1.0)
    }

    fn translate(&mut self, axis: usize, sign: f32, frame: ActionFrame) -> ActionToken {
        let held = Self::hold_frames(frame);
        self.cargo_position[axis] += sign * BASE_LINEAR_SPEED * Self::ramp(held) * self.frame_dt_s;
        ActionToken::Value(held)
    }

    fn rotate(&mut self, axis: usize, sign: f32, frame: ActionFrame) -> ActionToken {
        let held = Self::hold_frames(frame);
        self.cargo_rotation[axis] += sign * BASE_ANGULAR_SPEED * Self::ramp(held) * self.frame_dt_s;
        ActionToken::Value(held)
    }
}

impl ActionTarget for PlanningModel {
    fn handles(&self, action: Action) -> bool {
        !matches!(action, Action::Activate)
    }

    fn dispatch(&mut self, action: Action, frame: ActionFrame, _event: &RawEvent) -> ActionToken {
        match action {
            Action::MoveUp => self.translate(1, 1.0, frame),
            Action::MoveDown => self.translate(1, -1.0, frame),
            Action::MoveLeft => self.translate(0, -1.0, frame),
            Action::MoveRight => self.translate(0, 1.0, frame),
            Action::MoveIn => self.translate(2, -1.0, frame),
            Action::MoveOut => self.translate(2, 1.0, frame),
            Action::RotateUp => self.rotate(0, -1.0, frame),
            Action::RotateDown => self.rotate(0, 1.0, frame),
            Action::RotateLeft => self.rotate(1, -1.0, frame),
            Action::RotateRight => self.rotate(1, 1.0, frame),
            Action::Pause => {
                self.paused = !self.paused;
                info!("simulation {}", if self.paused { "paused" } else { "resumed" });
                ActionToken::Empty
            }
            Action::GoBack => {
                self.back_requested = true;
                ActionToken::Empty
            }
            Action::Activate => ActionToken::Empty,
        }
    }
}

pub struct RoutePlanningScreen {
    surface: SurfaceId,
    model: PlanningModel,
    processor: InputProcessor,
}

impl RoutePlanningScreen {
    pub fn new(surface: SurfaceId) -> Self {
        let model = PlanningModel::default();
        let mut bindings = vec![
            ActionBinding::bounced(Action::Pause),
            ActionBinding::bounced(Action::GoBack),
        ];
        for action in [
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
        ] {
            bindings.push(ActionBinding::continuous(action));
        }
        let processor = InputProcessor::new(surface, &model, bindings);
        Self {
            surface,
            model,
            processor,
        }
    }

    /// Start a run: place the cargo unit at the origin planet.
    pub fn launch(&mut self) {
        self.model.cargo_position = self.model.origin_position();
        self.model.cargo_rotation = [0.0; 3];
        self.model.launched = true;
        self.model.back_requested = false;
        self.model.paused = false;
        info!("cargo launched from origin at {:?}", self.model.cargo_position);
    }

    pub fn cargo_position(&self) -> [f32; 3] {
        self.model.cargo_position
    }

    pub fn cargo_rotation(&self) -> [f32; 3] {
        self.model.cargo_rotation
    }

    pub fn is_paused(&self) -> bool {
        self.model.paused
    }

    pub fn is_launched(&self) -> bool {
        self.model.launched
    }

    pub fn back_requested(&self) -> bool {
        self.model.back_requested
    }

    pub fn input_attached(&self) -> bool {
        self.processor.is_attached()
    }
}

impl Screen for RoutePlanningScreen {
    fn surface(&self) -> SurfaceId {
        self.surface
    }

    fn update(&mut self, dt: Duration, manager: &mut InputManager) {
        self.model.advance(dt);
        self.processor.update(&mut self.model, dt, manager);
    }

    fn render(&mut self) {}

    fn attach_input(&mut self, manager: &mut InputManager) {
        self.processor.attach_control(manager);
    }

    fn detach_input(&mut self, manager: &mut InputManager) {
        self.processor.detach_control(manager);
    }
}
