// Windowed driver: owns the event loop, forwards window events into the
// application core, and ticks it on every redraw.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use hauler_core::Application;
use hauler_input::controls::{ControlMap, ControlsConfig};
use hauler_input::gamepad::{GamepadBackend, GilrsGamepads, NullGamepads};

#[derive(Debug, Parser)]
#[command(name = "hauler", about = "Space-hauling route planner")]
struct Args {
    /// Path to the key bindings file; defaults are used if it is missing.
    #[arg(long, env = "HAULER_CONTROLS", default_value = "controls.json")]
    controls: PathBuf,

    /// Log filter directives, e.g. "debug" or "hauler_input=trace".
    /// Overrides RUST_LOG.
    #[arg(long, env = "HAULER_LOG")]
    log_filter: Option<String>,
}

fn init_logging(filter: Option<&str>) {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.init();
}

struct Driver {
    app: Application,
    window: Option<Window>,
    last_tick: Instant,
}

impl ApplicationHandler for Driver {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes().with_title("Space Hauler");
        match event_loop.create_window(attributes) {
            Ok(window) => {
                window.request_redraw();
                self.window = Some(window);
                self.last_tick = Instant::now();
                self.app.initialize();
            }
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.app.handle_resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                // OS key repeat would fight the action cooldowns.
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.app
                        .handle_key_event(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.app
                    .handle_pointer_event(state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now - self.last_tick;
                self.last_tick = now;
                self.app.tick(dt);
                if self.app.exited() {
                    event_loop.exit();
                } else if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn gamepad_backend() -> Box<dyn GamepadBackend> {
    match GilrsGamepads::new() {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            warn!("gamepad support unavailable: {e}");
            Box::new(NullGamepads)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_filter.as_deref());

    let config = ControlsConfig::load_from(&args.controls)
        .with_context(|| format!("loading controls from {}", args.controls.display()))?;
    let app = Application::new(ControlMap::from_config(&config), gamepad_backend());

    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut driver = Driver {
        app,
        window: None,
        last_tick: Instant::now(),
    };
    event_loop.run_app(&mut driver)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_flag_parses() {
        let args = Args::try_parse_from(["hauler", "--log-filter", "debug"]).unwrap();
        assert_eq!(args.log_filter.as_deref(), Some("debug"));
        assert_eq!(args.controls, PathBuf::from("controls.json"));
    }

    #[test]
    fn controls_flag_overrides_default() {
        let args = Args::try_parse_from(["hauler", "--controls", "/tmp/keys.json"]).unwrap();
        assert_eq!(args.controls, PathBuf::from("/tmp/keys.json"));
        assert!(args.log_filter.is_none());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["hauler", "--verbose"]).is_err());
    }
}
