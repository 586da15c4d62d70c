// Application orchestrator: owns the state machine, the input manager, and
// the screens, and drives exactly one active screen per tick.

use std::time::Duration;

use log::{debug, info};
use winit::keyboard::KeyCode;

use hauler_input::controls::ControlMap;
use hauler_input::gamepad::GamepadBackend;
use hauler_input::manager::{InputManager, SurfaceId};

use crate::app_state::{AppState, StateMachine};
use crate::screens::{MainMenuScreen, RoutePlanningScreen, Screen, SplashScreen};

/// Hold in `Initializing` before the cutscene starts, standing in for
/// asset loading.
const INIT_DELAY: Duration = Duration::from_millis(500);

pub const SPLASH_SURFACE: SurfaceId = SurfaceId(1);
pub const MENU_SURFACE: SurfaceId = SurfaceId(2);
pub const PLANNING_SURFACE: SurfaceId = SurfaceId(3);

pub struct Application {
    machine: StateMachine<AppState>,
    manager: InputManager,
    splash: SplashScreen,
    menu: MainMenuScreen,
    planning: RoutePlanningScreen,
    init_remaining: Duration,
}

impl Application {
    pub fn new(control_map: ControlMap, backend: Box<dyn GamepadBackend>) -> Self {
        Self {
            machine: StateMachine::new(AppState::Created),
            manager: InputManager::new(control_map, backend),
            splash: SplashScreen::new(SPLASH_SURFACE),
            menu: MainMenuScreen::new(MENU_SURFACE),
            planning: RoutePlanningScreen::new(PLANNING_SURFACE),
            init_remaining: INIT_DELAY,
        }
    }

    /// Leave `Created`. Called once by the driver when the window exists.
    pub fn initialize(&mut self) {
        if self.machine.state() != AppState::Created {
            return;
        }
        info!("application initializing");
        self.machine.set_state(AppState::Initializing);
    }

    pub fn state(&self) -> AppState {
        self.machine.state()
    }

    pub fn exited(&self) -> bool {
        self.machine.state() == AppState::Exiting
    }

    /// Per-frame step: advance the current state, update and render only the
    /// active screen, then advance the previous-state bookkeeping.
    pub fn tick(&mut self, dt: Duration) {
        let state = self.machine.state();
        match state {
            AppState::Created => {}
            AppState::Initializing => {
                self.init_remaining = self.init_remaining.saturating_sub(dt);
                if self.init_remaining.is_zero() {
                    self.goto_cutscene();
                }
            }
            AppState::Cutscene => {
                self.splash.update(dt, &mut self.manager);
                if self.splash.finished() {
                    self.goto_menu();
                } else {
                    self.splash.render();
                }
            }
            AppState::Menu => {
                self.menu.update(dt, &mut self.manager);
                if self.menu.exit_requested() {
                    self.goto_exiting();
                } else if self.menu.play_requested() {
                    self.goto_running();
                } else {
                    self.menu.render();
                }
            }
            AppState::Running => {
                self.planning.update(dt, &mut self.manager);
                if self.planning.back_requested() {
                    self.goto_menu();
                } else {
                    self.planning.render();
                }
            }
            AppState::Exiting => {}
        }
        self.machine.set_previous(self.machine.state());
    }

    fn goto_cutscene(&mut self) {
        info!("state transition: {} -> {}", self.machine.state(), AppState::Cutscene);
        self.detach_active();
        self.splash.attach_input(&mut self.manager);
        self.splash.run();
        self.machine.set_state(AppState::Cutscene);
    }

    fn goto_menu(&mut self) {
        info!("state transition: {} -> {}", self.machine.state(), AppState::Menu);
        self.detach_active();
        self.menu.reset_signals();
        self.menu.attach_input(&mut self.manager);
        self.machine.set_state(AppState::Menu);
    }

    fn goto_running(&mut self) {
        info!("state transition: {} -> {}", self.machine.state(), AppState::Running);
        self.detach_active();
        self.planning.launch();
        self.planning.attach_input(&mut self.manager);
        self.machine.set_state(AppState::Running);
    }

    fn goto_exiting(&mut self) {
        info!("state transition: {} -> {}", self.machine.state(), AppState::Exiting);
        self.detach_active();
        self.machine.set_state(AppState::Exiting);
    }

    fn detach_active(&mut self) {
        match self.machine.state() {
            AppState::Cutscene => self.splash.detach_input(&mut self.manager),
            AppState::Menu => self.menu.detach_input(&mut self.manager),
            AppState::Running => self.planning.detach_input(&mut self.manager),
            _ => {}
        }
    }

    fn active_surface(&self) -> Option<SurfaceId> {
        match self.machine.state() {
            AppState::Cutscene => Some(self.splash.surface()),
            AppState::Menu => Some(self.menu.surface()),
            AppState::Running => Some(self.planning.surface()),
            _ => None,
        }
    }

    pub fn handle_key_event(&mut self, key: KeyCode, pressed: bool) {
        if let Some(surface) = self.active_surface() {
            self.manager.handle_key_event(surface, key, pressed);
        }
    }

    pub fn handle_pointer_event(&mut self, pressed: bool) {
        if let Some(surface) = self.active_surface() {
            self.manager.handle_pointer_event(surface, pressed);
        }
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) {
        debug!("surface resized to {width}x{height}");
    }
}
