// Splash cutscene: four timed billboard segments, skippable with Activate.

use std::time::Duration;

use log::{debug, info};

use hauler_input::action::{Action, ActionBinding, RawEvent};
use hauler_input::manager::{InputManager, SurfaceId};
use hauler_input::processor::{ActionFrame, ActionTarget, ActionToken, InputProcessor};

use super::Screen;

/// One billboard of the cutscene and how long it stays up.
#[derive(Debug, Clone, Copy)]
pub struct CutSceneSegment {
    pub name: &'static str,
    pub duration: Duration,
}

const SEGMENTS: &[CutSceneSegment] = &[
    CutSceneSegment {
        name: "powered-by",
        duration: Duration::from_millis(8500),
    },
    CutSceneSegment {
        name: "engine-billboard",
        duration: Duration::from_millis(7500),
    },
    CutSceneSegment {
        name: "community-production",
        duration: Duration::from_millis(9500),
    },
    CutSceneSegment {
        name: "call-to-action",
        duration: Duration::from_millis(8500),
    },
];

/// Cutscene state driven by elapsed time; the screen's action target.
#[derive(Debug, Default)]
pub struct SplashModel {
    elapsed: Duration,
    skip_requested: bool,
    running: bool,
}

impl SplashModel {
    /// Index of the segment currently showing, or `None` once past the end.
    pub fn current_segment(&self) -> Option<usize> {
        let mut cursor = Duration::ZERO;
        for (i, segment) in SEGMENTS.iter().enumerate() {
            cursor += segment.duration;
            if self.elapsed < cursor {
                return Some(i);
            }
        }
        None
    }

    pub fn total_duration() -> Duration {
        SEGMENTS.iter().map(|s| s.duration).sum()
    }

    pub fn finished(&self) -> bool {
        self.skip_requested || self.elapsed >= Self::total_duration()
    }

    fn advance(&mut self, dt: Duration) {
        if !self.running || self.finished() {
            return;
        }
        let before = self.current_segment();
        self.elapsed += dt;
        let after = self.current_segment();
        if before != after {
            match after {
                Some(i) => debug!("cutscene segment: {}", SEGMENTS[i].name),
                None => info!("cutscene complete"),
            }
        }
    }
}

impl ActionTarget for SplashModel {
    fn handles(&self, action: Action) -> bool {
        action == Action::Activate
    }

    fn dispatch(&mut self, action: Action, _frame: ActionFrame, _event: &RawEvent) -> ActionToken {
        if action == Action::Activate {
            info!("cutscene skip requested");
            self.skip_requested = true;
        }
        ActionToken::Empty
    }
}

pub struct SplashScreen {
    surface: SurfaceId,
    model: SplashModel,
    processor: InputProcessor,
    ready: bool,
}

impl SplashScreen {
    pub fn new(surface: SurfaceId) -> Self {
        let model = SplashModel::default();
        let bindings = vec![ActionBinding::bounced(Action::Activate)];
        let processor = InputProcessor::new(surface, &model, bindings);
        Self {
            surface,
            model,
            processor,
            ready: false,
        }
    }

    /// Mark assets loaded and start the cutscene clock.
    pub fn run(&mut self) {
        self.ready = true;
        self.model.running = true;
        info!("cutscene segment: {}", SEGMENTS[0].name);
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn skip_requested(&self) -> bool {
        self.model.skip_requested
    }

    pub fn finished(&self) -> bool {
        self.model.finished()
    }

    pub fn input_attached(&self) -> bool {
        self.processor.is_attached()
    }
}

impl Screen for SplashScreen {
    fn surface(&self) -> SurfaceId {
        self.surface
    }

    fn update(&mut self, dt: Duration, manager: &mut InputManager) {
        self.processor.update(&mut self.model, dt, manager);
        self.model.advance(dt);
    }

    fn render(&mut self) {}

    fn attach_input(&mut self, manager: &mut InputManager) {
        self.processor.attach_control(manager);
    }

    fn detach_input(&mut self, manager: &mut InputManager) {
        self.processor.detach_control(manager);
    }
}
