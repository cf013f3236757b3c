// Input manager - turns window events into normalized sandbox input

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use glam::Vec2;
use log::trace;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::action::{
    Action, InputEvent, InputSource, Modifiers, PointerEvent, PointerPhase, POINTER_BUTTON,
};
use super::config::InputConfig;

/// A second press within this long of the previous one is a double activation
pub const DOUBLE_WINDOW: Duration = Duration::from_millis(300);

/// ...and within this distance of it
pub const DOUBLE_DISTANCE: f32 = 6.0;

/// Collects raw window input and queues normalized events for the sandbox.
///
/// Positions are logical window coordinates, which the sandbox uses as world
/// coordinates directly.
pub struct InputManager {
    config: InputConfig,
    shift: bool,
    cursor: Option<Vec2>,
    pointer_held: bool,
    /// Time and place of the last press, for double detection
    last_press: Option<(Instant, Vec2)>,
    queue: VecDeque<InputEvent>,
}

impl InputManager {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            shift: false,
            cursor: None,
            pointer_held: false,
            last_press: None,
            queue: VecDeque::new(),
        }
    }

    /// Process a winit window event
    pub fn process_window_event(&mut self, event: &WindowEvent, scale_factor: f64, now: Instant) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.process_keyboard_event(event),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.set_shift(modifiers.state().shift_key());
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(scale_factor);
                self.pointer_moved(Vec2::new(logical.x, logical.y));
            }
            WindowEvent::MouseInput { state, button, .. } if *button == POINTER_BUTTON => {
                match state {
                    ElementState::Pressed => self.pointer_pressed(now),
                    ElementState::Released => self.pointer_released(),
                }
            }
            _ => {}
        }
    }

    /// Process a keyboard event from winit
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        if let PhysicalKey::Code(code) = event.physical_key {
            self.key_pressed(code, event.repeat);
        }
    }

    /// A key went down; auto-repeats only count for repeating actions
    pub fn key_pressed(&mut self, code: KeyCode, repeat: bool) {
        let Some(action) = self.config.get_action(InputSource::key(code)) else {
            return;
        };
        if repeat && !action.repeats() {
            return;
        }
        trace!("{:?} -> {:?}", code, action);
        self.queue.push_back(InputEvent::Action(action));
    }

    pub fn set_shift(&mut self, shift: bool) {
        self.shift = shift;
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.cursor = Some(position);
        self.push_pointer(PointerPhase::Move, position, false);
    }

    pub fn pointer_pressed(&mut self, now: Instant) {
        let Some(position) = self.cursor else {
            return;
        };

        let double = self.last_press.is_some_and(|(at, place)| {
            now.saturating_duration_since(at) <= DOUBLE_WINDOW
                && place.distance(position) <= DOUBLE_DISTANCE
        });
        // A double consumes the pair so a third press starts over
        self.last_press = if double { None } else { Some((now, position)) };

        self.pointer_held = true;
        self.push_pointer(PointerPhase::Down, position, double);
    }

    pub fn pointer_released(&mut self) {
        let Some(position) = self.cursor else {
            return;
        };
        if !self.pointer_held {
            return;
        }
        self.pointer_held = false;
        self.push_pointer(PointerPhase::Up, position, false);
    }

    fn push_pointer(&mut self, phase: PointerPhase, position: Vec2, double: bool) {
        self.queue.push_back(InputEvent::Pointer(PointerEvent {
            phase,
            position,
            modifiers: Modifiers {
                shift: self.shift,
                double,
            },
        }));
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.queue.drain(..)
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}
