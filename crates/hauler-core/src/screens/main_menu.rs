// Main menu: selectable items with wrap-around, all bindings bounced.

use std::time::Duration;

use log::info;

use hauler_input::action::{Action, ActionBinding, RawEvent};
use hauler_input::manager::{InputManager, SurfaceId};
use hauler_input::processor::{ActionFrame, ActionTarget, ActionToken, InputProcessor};

use super::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Play,
    Exit,
}

const ITEMS: &[MenuItem] = &[MenuItem::Play, MenuItem::Exit];

/// Menu selection state; the screen's action target.
#[derive(Debug, Default)]
pub struct MenuModel {
    selected: usize,
    play_requested: bool,
    exit_requested: bool,
}

impl MenuModel {
    pub fn selected_item(&self) -> MenuItem {
        ITEMS[self.selected]
    }

    fn move_selection(&mut self, delta: isize) {
        let len = ITEMS.len() as isize;
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
    }

    fn select(&mut self) {
        match self.selected_item() {
            MenuItem::Play => {
                info!("menu: play selected");
                self.play_requested = true;
            }
            MenuItem::Exit => {
                info!("menu: exit selected");
                self.exit_requested = true;
            }
        }
    }
}

impl ActionTarget for MenuModel {
    fn handles(&self, action: Action) -> bool {
        matches!(
            action,
            Action::MoveUp | Action::MoveDown | Action::Activate | Action::GoBack
        )
    }

    fn dispatch(&mut self, action: Action, _frame: ActionFrame, _event: &RawEvent) -> ActionToken {
        match action {
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::Activate => self.select(),
            Action::GoBack => self.selected = 0,
            _ => {}
        }
        ActionToken::Empty
    }
}

pub struct MainMenuScreen {
    surface: SurfaceId,
    model: MenuModel,
    processor: InputProcessor,
}

impl MainMenuScreen {
    pub fn new(surface: SurfaceId) -> Self {
        let model = MenuModel::default();
        let bindings = vec![
            ActionBinding::bounced(Action::MoveUp),
            ActionBinding::bounced(Action::MoveDown),
            ActionBinding::bounced(Action::Activate),
            ActionBinding::bounced(Action::GoBack),
        ];
        let processor = InputProcessor::new(surface, &model, bindings);
        Self {
            surface,
            model,
            processor,
        }
    }

    pub fn selected_item(&self) -> MenuItem {
        self.model.selected_item()
    }

    pub fn play_requested(&self) -> bool {
        self.model.play_requested
    }

    pub fn exit_requested(&self) -> bool {
        self.model.exit_requested
    }

    /// Clear one-shot signals when the menu becomes active again.
    pub fn reset_signals(&mut self) {
        self.model.play_requested = false;
        self.model.exit_requested = false;
    }

    pub fn input_attached(&self) -> bool {
        self.processor.is_attached()
    }
}

impl Screen for MainMenuScreen {
    fn surface(&self) -> SurfaceId {
        self.surface
    }

    fn update(&mut self, dt: Duration, manager: &mut InputManager) {
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
