// Process-wide input manager.
//
// Owns device listener lifecycles, the raw input snapshot, and the
// authoritative raw-to-action translation tick. One instance exists per
// process and is passed by reference; screens never mutate it directly.

use std::sync::mpsc::{Receiver, Sender, channel};

use log::{debug, info, warn};
use winit::keyboard::KeyCode;

use crate::action::{RawEvent, TriggeredAction};
use crate::controls::{self, ControlMap};
use crate::gamepad::{GamepadBackend, GamepadKind, PadEvent, PadId, StickSide};
use crate::raw_map::{RawInput, RawInputMap};

/// Opaque handle for a screen's renderable surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

/// Handle identifying a snapshot subscriber, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

/// One device's listener set for a registered surface.
///
/// Keyboard and pointer listeners are passive (events are routed in from
/// the host window); the gamepad subscription is the sampling point for
/// device events and analog sticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceSubscription {
    Keyboard,
    Pointer,
    Gamepad,
}

struct SceneRegistration {
    surface: SurfaceId,
    subscriptions: Vec<DeviceSubscription>,
}

pub struct InputManager {
    control_map: ControlMap,
    raw_map: RawInputMap,
    backend: Box<dyn GamepadBackend>,
    adopted: Option<(PadId, GamepadKind)>,
    registrations: Vec<SceneRegistration>,
    subscribers: Vec<(SubscriberId, Sender<Vec<TriggeredAction>>)>,
    next_subscriber: u64,
}

impl InputManager {
    pub fn new(control_map: ControlMap, backend: Box<dyn GamepadBackend>) -> Self {
        Self {
            control_map,
            raw_map: RawInputMap::new(),
            backend,
            adopted: None,
            registrations: Vec::new(),
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }

    /// Attach keyboard, pointer, and gamepad listeners for a surface.
    ///
    /// Not guarded against duplicate registration; the orchestrator attaches
    /// one screen's controls at a time.
    pub fn register_input_for_scene(&mut self, surface: SurfaceId) {
        info!("registering input for surface {surface:?}");
        let subscriptions = vec![
            DeviceSubscription::Keyboard,
            DeviceSubscription::Pointer,
            self.enable_gamepad(),
        ];
        self.registrations.push(SceneRegistration {
            surface,
            subscriptions,
        });
    }

    /// Dispose all listener sets for a surface. Logs and no-ops if the
    /// surface was never registered.
    pub fn unregister_input_for_scene(&mut self, surface: SurfaceId) {
        let Some(pos) = self
            .registrations
            .iter()
            .position(|r| r.surface == surface)
        else {
            warn!("no input registration found for surface {surface:?}");
            return;
        };
        info!("unregistering input for surface {surface:?}");
        let registration = self.registrations.remove(pos);
        for subscription in registration.subscriptions {
            self.dispose_subscription(subscription);
        }
    }

    /// Subscribe to published action snapshots. Delivery is synchronous
    /// within `get_inputs`, so a snapshot is queued at every subscriber
    /// before any processor drains its own queue.
    pub fn subscribe(&mut self) -> (SubscriberId, Receiver<Vec<TriggeredAction>>) {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        let (tx, rx) = channel();
        self.subscribers.push((id, tx));
        (id, rx)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Poll the surface's device subscriptions, derive the action snapshot
    /// from the raw snapshot, and publish it to all subscribers if it is
    /// non-empty. Returns `None` for a surface that was never registered.
    pub fn get_inputs(&mut self, surface: SurfaceId) -> Option<Vec<TriggeredAction>> {
        let Some(pos) = self
            .registrations
            .iter()
            .position(|r| r.surface == surface)
        else {
            warn!("get_inputs for unregistered surface {surface:?}");
            return None;
        };

        // Analog gamepad state is sampled here, inside the subscription's
        // check pass, before translation.
        if self.registrations[pos]
            .subscriptions
            .contains(&DeviceSubscription::Gamepad)
        {
            self.check_gamepad_inputs();
        }

        let control_map = &self.control_map;
        let inputs: Vec<TriggeredAction> = self
            .raw_map
            .iter()
            .filter_map(|(input, event)| {
                control_map.action_for(*input).map(|action| TriggeredAction {
                    action,
                    event: *event,
                })
            })
            .collect();

        if !inputs.is_empty() {
            self.publish(&inputs);
        }
        Some(inputs)
    }

    /// Route a keyboard event scoped to a registered surface. Keys without
    /// a mapping are ignored entirely and never enter the raw snapshot.
    pub fn handle_key_event(&mut self, surface: SurfaceId, key: KeyCode, pressed: bool) {
        if !self.is_registered(surface) {
            return;
        }
        if self.control_map.action_for_key(key).is_none() {
            return;
        }
        if pressed {
            self.raw_map.insert(RawInput::Key(key), RawEvent::Key(key));
        } else {
            self.raw_map.remove(RawInput::Key(key));
        }
    }

    /// Route a pointer event scoped to a registered surface.
    pub fn handle_pointer_event(&mut self, surface: SurfaceId, pressed: bool) {
        if !self.is_registered(surface) {
            return;
        }
        if pressed {
            self.raw_map.insert(RawInput::PointerTap, RawEvent::Pointer);
        } else {
            self.raw_map.remove(RawInput::PointerTap);
        }
    }

    pub fn is_registered(&self, surface: SurfaceId) -> bool {
        self.registrations.iter().any(|r| r.surface == surface)
    }

    /// Currently adopted gamepad, if any.
    pub fn adopted_gamepad(&self) -> Option<(PadId, GamepadKind)> {
        self.adopted
    }

    /// Adopt a pad at subscription start: a connected preferred-kind pad
    /// wins, otherwise the first available pad.
    fn enable_gamepad(&mut self) -> DeviceSubscription {
        let pads = self.backend.connected_pads();
        let adopted = pads
            .iter()
            .copied()
            .find(|(_, kind)| *kind == GamepadKind::Xbox)
            .or_else(|| pads.first().copied());
        if let Some((id, kind)) = adopted {
            debug!("gamepad enabled: {id:?} ({kind:?})");
        }
        self.adopted = adopted;
        DeviceSubscription::Gamepad
    }

    fn dispose_subscription(&mut self, subscription: DeviceSubscription) {
        if subscription == DeviceSubscription::Gamepad {
            self.adopted = None;
            self.raw_map.clear_pad_entries();
        }
    }

    /// Drain backend events (connect, disconnect, buttons) and fold the
    /// adopted pad's stick deflections into the raw snapshot.
    fn check_gamepad_inputs(&mut self) {
        for event in self.backend.poll_events() {
            match event {
                PadEvent::Connected { id, kind } => match self.adopted {
                    // An adopted preferred pad is never displaced.
                    Some((_, GamepadKind::Xbox)) => {}
                    Some(_) if kind == GamepadKind::Xbox => {
                        debug!("adopting preferred gamepad {id:?}");
                        self.adopted = Some((id, kind));
                    }
                    Some(_) => {}
                    None => {
                        debug!("adopting gamepad {id:?} ({kind:?})");
                        self.adopted = Some((id, kind));
                    }
                },
                PadEvent::Disconnected { id } => {
                    if self.adopted.map(|(a, _)| a) == Some(id) {
                        debug!("adopted gamepad {id:?} disconnected");
                        self.adopted = None;
                        self.raw_map.clear_pad_entries();
                    }
                }
                PadEvent::ButtonDown { id, button } => {
                    if let Some((adopted, kind)) = self.adopted
                        && adopted == id
                        && let Some(action) = controls::pad_action(kind, button)
                    {
                        // Buttons map straight to actions; no key-name
                        // indirection for pads.
                        self.raw_map.insert(RawInput::Pad(action), RawEvent::Button);
                    }
                }
                PadEvent::ButtonUp { id, button } => {
                    if let Some((adopted, kind)) = self.adopted
                        && adopted == id
                        && let Some(action) = controls::pad_action(kind, button)
                    {
                        self.raw_map.remove(RawInput::Pad(action));
                    }
                }
            }
        }

        if let Some((id, _)) = self.adopted {
            let (lx, ly) = self.backend.stick(id, StickSide::Left);
            let left = controls::normalize_joystick(lx, ly);
            controls::map_stick_translation_to_actions(left, &mut self.raw_map);

            let (rx, ry) = self.backend.stick(id, StickSide::Right);
            let right = controls::normalize_joystick(rx, ry);
            controls::map_stick_rotation_to_actions(right, &mut self.raw_map);
        }
    }

    fn publish(&mut self, inputs: &[TriggeredAction]) {
        // Prune subscribers whose receiving end has been dropped.
        self.subscribers
            .retain(|(_, tx)| tx.send(inputs.to_vec()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn raw_map(&self) -> &RawInputMap {
        &self.raw_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::gamepad::{NullGamepads, PadButton, SharedVirtualGamepads, VirtualGamepads};

    const SURFACE: SurfaceId = SurfaceId(1);

    fn manager_with(backend: Box<dyn GamepadBackend>) -> InputManager {
        InputManager::new(ControlMap::default(), backend)
    }

    fn manager() -> InputManager {
        manager_with(Box::new(NullGamepads))
    }

    #[test]
    fn get_inputs_unregistered_surface_is_none() {
        let mut manager = manager();
        assert!(manager.get_inputs(SURFACE).is_none());
    }

    #[test]
    fn unregister_unknown_surface_is_noop() {
        let mut manager = manager();
        manager.unregister_input_for_scene(SURFACE);
        assert!(!manager.is_registered(SURFACE));
    }

    #[test]
    fn unmapped_key_never_enters_raw_snapshot() {
        let mut manager = manager();
        manager.register_input_for_scene(SURFACE);

        manager.handle_key_event(SURFACE, KeyCode::F12, true);
        assert!(manager.raw_map().is_empty());
        assert_eq!(manager.get_inputs(SURFACE), Some(Vec::new()));
    }

    #[test]
    fn mapped_key_round_trip_restores_snapshot() {
        let mut manager = manager();
        manager.register_input_for_scene(SURFACE);

        manager.handle_key_event(SURFACE, KeyCode::ArrowUp, true);
        assert_eq!(manager.raw_map().len(), 1);

        manager.handle_key_event(SURFACE, KeyCode::ArrowUp, false);
        assert!(manager.raw_map().is_empty());
    }

    #[test]
    fn key_events_for_unregistered_surface_are_dropped() {
        let mut manager = manager();
        manager.register_input_for_scene(SURFACE);
        manager.handle_key_event(SurfaceId(99), KeyCode::ArrowUp, true);
        assert!(manager.raw_map().is_empty());
    }

    #[test]
    fn snapshot_translates_keys_to_actions() {
        let mut manager = manager();
        manager.register_input_for_scene(SURFACE);
        manager.handle_key_event(SURFACE, KeyCode::ArrowUp, true);

        let inputs = manager.get_inputs(SURFACE).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].action, Action::MoveUp);
        assert_eq!(inputs[0].event, RawEvent::Key(KeyCode::ArrowUp));
    }

    #[test]
    fn pointer_tap_maps_to_activate() {
        let mut manager = manager();
        manager.register_input_for_scene(SURFACE);

        manager.handle_pointer_event(SURFACE, true);
        let inputs = manager.get_inputs(SURFACE).unwrap();
        assert_eq!(inputs[0].action, Action::Activate);

        manager.handle_pointer_event(SURFACE, false);
        assert_eq!(manager.get_inputs(SURFACE), Some(Vec::new()));
    }

    #[test]
    fn non_empty_snapshot_is_published_to_all_subscribers() {
        let mut manager = manager();
        manager.register_input_for_scene(SURFACE);
        let (_id_a, rx_a) = manager.subscribe();
        let (_id_b, rx_b) = manager.subscribe();

        manager.handle_key_event(SURFACE, KeyCode::Enter, true);
        manager.get_inputs(SURFACE);

        assert_eq!(rx_a.try_recv().unwrap()[0].action, Action::Activate);
        assert_eq!(rx_b.try_recv().unwrap()[0].action, Action::Activate);
    }

    #[test]
    fn empty_snapshot_is_not_published() {
        let mut manager = manager();
        manager.register_input_for_scene(SURFACE);
        let (_id, rx) = manager.subscribe();

        manager.get_inputs(SURFACE);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut manager = manager();
        manager.register_input_for_scene(SURFACE);
        let (id, rx) = manager.subscribe();
        manager.unsubscribe(id);

        manager.handle_key_event(SURFACE, KeyCode::Enter, true);
        manager.get_inputs(SURFACE);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn registration_adopts_connected_pad_preferring_xbox() {
        let mut pads = VirtualGamepads::new();
        pads.connect(PadId(0), GamepadKind::Generic);
        pads.connect(PadId(1), GamepadKind::Xbox);

        let mut manager = manager_with(Box::new(pads));
        manager.register_input_for_scene(SURFACE);

        assert_eq!(manager.adopted_gamepad(), Some((PadId(1), GamepadKind::Xbox)));
    }

    #[test]
    fn registration_falls_back_to_first_pad() {
        let mut pads = VirtualGamepads::new();
        pads.connect(PadId(3), GamepadKind::Generic);

        let mut manager = manager_with(Box::new(pads));
        manager.register_input_for_scene(SURFACE);

        assert_eq!(
            manager.adopted_gamepad(),
            Some((PadId(3), GamepadKind::Generic))
        );
    }

    #[test]
    fn late_xbox_connect_displaces_generic_pad() {
        let pads = SharedVirtualGamepads::new();
        pads.connect(PadId(0), GamepadKind::Generic);

        let mut manager = manager_with(Box::new(pads.clone()));
        manager.register_input_for_scene(SURFACE);
        manager.get_inputs(SURFACE);
        assert_eq!(
            manager.adopted_gamepad(),
            Some((PadId(0), GamepadKind::Generic))
        );

        pads.connect(PadId(1), GamepadKind::Xbox);
        manager.get_inputs(SURFACE);
        assert_eq!(manager.adopted_gamepad(), Some((PadId(1), GamepadKind::Xbox)));
    }

    #[test]
    fn adopted_pad_buttons_map_to_actions() {
        let mut pads = VirtualGamepads::new();
        pads.connect(PadId(0), GamepadKind::Xbox);
        pads.press(PadId(0), PadButton::South);

        let mut manager = manager_with(Box::new(pads));
        manager.register_input_for_scene(SURFACE);

        let inputs = manager.get_inputs(SURFACE).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].action, Action::Activate);
        assert_eq!(inputs[0].event, RawEvent::Button);
    }

    #[test]
    fn stick_deflection_triggers_translation_actions() {
        let mut pads = VirtualGamepads::new();
        pads.connect(PadId(0), GamepadKind::Xbox);
        pads.set_stick(PadId(0), StickSide::Left, 0.0, 0.8);

        let mut manager = manager_with(Box::new(pads));
        manager.register_input_for_scene(SURFACE);

        let inputs = manager.get_inputs(SURFACE).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].action, Action::MoveUp);
        assert_eq!(inputs[0].event, RawEvent::Stick(0.8));
    }

    #[test]
    fn stick_inside_dead_zone_triggers_nothing() {
        let mut pads = VirtualGamepads::new();
        pads.connect(PadId(0), GamepadKind::Xbox);
        pads.set_stick(PadId(0), StickSide::Left, 0.1, -0.05);

        let mut manager = manager_with(Box::new(pads));
        manager.register_input_for_scene(SURFACE);
        assert_eq!(manager.get_inputs(SURFACE), Some(Vec::new()));
    }

    #[test]
    fn disconnect_clears_adopted_pad_and_entries() {
        let mut pads = VirtualGamepads::new();
        pads.connect(PadId(0), GamepadKind::Xbox);
        pads.press(PadId(0), PadButton::DPadLeft);
        pads.disconnect(PadId(0));

        let mut manager = manager_with(Box::new(pads));
        manager.register_input_for_scene(SURFACE);
        manager.get_inputs(SURFACE);

        assert_eq!(manager.adopted_gamepad(), None);
        assert!(manager.raw_map().is_empty());
    }

    #[test]
    fn unregister_disposes_gamepad_subscription() {
        let mut pads = VirtualGamepads::new();
        pads.connect(PadId(0), GamepadKind::Xbox);

        let mut manager = manager_with(Box::new(pads));
        manager.register_input_for_scene(SURFACE);
        assert!(manager.adopted_gamepad().is_some());

        manager.unregister_input_for_scene(SURFACE);
        assert_eq!(manager.adopted_gamepad(), None);
        assert!(manager.get_inputs(SURFACE).is_none());
    }
}
