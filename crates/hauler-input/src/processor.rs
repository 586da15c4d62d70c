// Per-screen input processor.
//
// Subscribes to the manager's published snapshots, queues them, and drains
// the queue during the screen's own update pass, mapping each action to the
// screen's handler with debounce and one-frame-back handler state.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use log::info;

use crate::action::{Action, ActionBinding, RawEvent, TriggeredAction};
use crate::manager::{InputManager, SubscriberId, SurfaceId};

/// Cooldown window for bounced actions, measured against the screen's own
/// frame clock rather than wall time.
pub const BOUNCE_COOLDOWN: Duration = Duration::from_millis(250);

/// Opaque per-action state a handler may carry across frames.
///
/// `Empty` is the falsy value: handlers with no state to carry forward
/// return it, and it is what `prior_state` holds on the first frame of a
/// press.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ActionToken {
    #[default]
    Empty,
    Held,
    Value(f32),
}

impl ActionToken {
    pub fn is_empty(&self) -> bool {
        matches!(self, ActionToken::Empty)
    }
}

/// Frame context passed to a handler along with the raw event.
#[derive(Debug, Clone, Copy)]
pub struct ActionFrame {
    /// Token this action's handler returned last frame (`Empty` if none),
    /// letting a handler tell "first frame of a press" from "held".
    pub prior_state: ActionToken,
}

/// Capability interface a screen implements for the actions it opts into.
///
/// Replaces handler lookup by method name: the dispatch table consults
/// `handles` once when it is built, and actions the screen does not claim
/// are skipped silently.
pub trait ActionTarget {
    fn handles(&self, action: Action) -> bool;

    /// Invoke the handler for `action`. Only called for actions `handles`
    /// accepted when the dispatch table was built.
    fn dispatch(&mut self, action: Action, frame: ActionFrame, event: &RawEvent) -> ActionToken;
}

/// Dispatch-table entry, carrying the explicit cooldown for bounced actions.
#[derive(Debug)]
struct BoundAction {
    bounce: bool,
    cooldown_remaining: Duration,
}

pub struct InputProcessor {
    surface: SurfaceId,
    bindings: Vec<ActionBinding>,
    action_map: HashMap<Action, BoundAction>,
    attached: bool,
    subscription: Option<(SubscriberId, Receiver<Vec<TriggeredAction>>)>,
    action_state: HashMap<Action, ActionToken>,
    last_action_state: HashMap<Action, ActionToken>,
}

impl InputProcessor {
    /// Builds the dispatch table once from the screen's declared bindings.
    pub fn new(
        surface: SurfaceId,
        target: &dyn ActionTarget,
        bindings: Vec<ActionBinding>,
    ) -> Self {
        let mut processor = Self {
            surface,
            bindings,
            action_map: HashMap::new(),
            attached: false,
            subscription: None,
            action_state: HashMap::new(),
            last_action_state: HashMap::new(),
        };
        processor.build_action_map(target, false);
        processor
    }

    /// Rebuild the dispatch table from the stored bindings. With
    /// `create_new` the existing table is discarded wholesale first.
    pub fn build_action_map(&mut self, target: &dyn ActionTarget, create_new: bool) {
        if create_new {
            self.action_map.clear();
        }
        for binding in &self.bindings {
            if !target.handles(binding.action) {
                continue;
            }
            self.action_map.insert(
                binding.action,
                BoundAction {
                    bounce: binding.bounce,
                    cooldown_remaining: Duration::ZERO,
                },
            );
        }
    }

    /// Register this screen's surface with the manager and subscribe to
    /// snapshot publication. No-op while already attached.
    pub fn attach_control(&mut self, manager: &mut InputManager) {
        if self.attached {
            return;
        }
        info!("input processor attaching control for surface {:?}", self.surface);
        manager.register_input_for_scene(self.surface);
        self.subscription = Some(manager.subscribe());
        self.attached = true;
    }

    /// Reverse `attach_control` and discard any unconsumed queued input.
    /// No-op while already detached.
    pub fn detach_control(&mut self, manager: &mut InputManager) {
        if !self.attached {
            return;
        }
        info!("input processor detaching control for surface {:?}", self.surface);
        if let Some((id, receiver)) = self.subscription.take() {
            manager.unsubscribe(id);
            // Dropping the receiver discards pending snapshots; they are
            // not replayed on re-attach.
            drop(receiver);
        }
        manager.unregister_input_for_scene(self.surface);
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Per-frame dispatch pass. No-op while detached.
    ///
    /// Triggers the manager's poll first, so this tick's snapshot is queued
    /// at every attached processor before any dispatch happens here.
    pub fn update(&mut self, target: &mut dyn ActionTarget, dt: Duration, manager: &mut InputManager) {
        if !self.attached {
            return;
        }

        manager.get_inputs(self.surface);

        for bound in self.action_map.values_mut() {
            bound.cooldown_remaining = bound.cooldown_remaining.saturating_sub(dt);
        }

        self.last_action_state = std::mem::take(&mut self.action_state);

        let mut pending: Vec<Vec<TriggeredAction>> = Vec::new();
        if let Some((_, receiver)) = &self.subscription {
            while let Ok(snapshot) = receiver.try_recv() {
                pending.push(snapshot);
            }
        }

        // Newest-first: when several snapshots arrive in one frame, the most
        // recently queued one is dispatched first and its handler state wins.
        while let Some(snapshot) = pending.pop() {
            self.input_command_handler(target, &snapshot);
        }
    }

    fn input_command_handler(&mut self, target: &mut dyn ActionTarget, snapshot: &[TriggeredAction]) {
        for triggered in snapshot {
            let Some(bound) = self.action_map.get_mut(&triggered.action) else {
                // The screen never claimed this action.
                continue;
            };
            if bound.bounce {
                if !bound.cooldown_remaining.is_zero() {
                    continue;
                }
                bound.cooldown_remaining = BOUNCE_COOLDOWN;
            }
            let prior_state = self
                .last_action_state
                .get(&triggered.action)
                .copied()
                .unwrap_or_default();
            let token = target.dispatch(
                triggered.action,
                ActionFrame { prior_state },
                &triggered.event,
            );
            self.action_state.insert(triggered.action, token);
        }
    }
}
