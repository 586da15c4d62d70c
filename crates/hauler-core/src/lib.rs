//! Application core: lifecycle state machine, screens, and the orchestrator
//! that routes window events and input between them.

pub mod app_state;
pub mod application;
pub mod orbital;
pub mod screens;

pub use app_state::{AppState, StateMachine};
pub use application::Application;
