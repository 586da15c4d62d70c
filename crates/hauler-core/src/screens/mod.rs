// Screen layer: each screen owns an input processor and an action-target
// model, and only the active screen's processor is attached.

use std::time::Duration;

use hauler_input::manager::{InputManager, SurfaceId};

pub mod main_menu;
pub mod route_planning;
pub mod splash;

pub use main_menu::MainMenuScreen;
pub use route_planning::RoutePlanningScreen;
pub use splash::SplashScreen;

/// Contract every screen fulfils toward the application orchestrator.
pub trait Screen {
    /// Surface this screen's input is scoped to.
    fn surface(&self) -> SurfaceId;

    /// Per-frame update while this screen is active.
    fn update(&mut self, dt: Duration, manager: &mut InputManager);

    /// Draw the screen's scene. Placeholder until a renderer is wired in.
    fn render(&mut self);

    fn attach_input(&mut self, manager: &mut InputManager);

    fn detach_input(&mut self, manager: &mut InputManager);
}
