// Sandbox actions, normalized pointer events and default bindings

use glam::Vec2;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::game::construction::ToolKind;

/// Everything a key press can ask the sandbox to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SelectTool(ToolKind),

    // Simulation
    ToggleRun,
    DriveForward,
    DriveBackward,

    /// Abandon the gesture in progress
    Cancel,
}

impl Action {
    /// Actions that fire again on key auto-repeat
    pub fn repeats(self) -> bool {
        matches!(self, Self::DriveForward | Self::DriveBackward)
    }
}

/// A bindable input. The drawing button is fixed, so only keys rebind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard(KeyCode),
}

impl InputSource {
    pub fn key(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }
}

/// Modifier state captured with each pointer event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Place the shape as static
    pub shift: bool,
    /// Second press close in time and space to the previous one
    pub double: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// A pointer event in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Vec2,
    pub modifiers: Modifiers,
}

/// What the input layer hands to the sandbox
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Action(Action),
}

/// The mouse button that draws
pub const POINTER_BUTTON: MouseButton = MouseButton::Left;

/// Default keyboard bindings
pub fn default_bindings() -> Vec<(InputSource, Action)> {
    vec![
        // Tools
        (InputSource::key(KeyCode::KeyW), Action::SelectTool(ToolKind::Wheel)),
        (InputSource::key(KeyCode::KeyC), Action::SelectTool(ToolKind::Circle)),
        (InputSource::key(KeyCode::KeyP), Action::SelectTool(ToolKind::Plank)),
        (InputSource::key(KeyCode::KeyB), Action::SelectTool(ToolKind::Box)),
        (InputSource::key(KeyCode::KeyJ), Action::SelectTool(ToolKind::Joint)),
        (InputSource::key(KeyCode::KeyS), Action::SelectTool(ToolKind::Spring)),
        (InputSource::key(KeyCode::KeyL), Action::SelectTool(ToolKind::Lemon)),
        (InputSource::key(KeyCode::KeyD), Action::SelectTool(ToolKind::Drag)),
        // Simulation
        (InputSource::key(KeyCode::Space), Action::ToggleRun),
        (InputSource::key(KeyCode::ArrowUp), Action::DriveForward),
        (InputSource::key(KeyCode::ArrowDown), Action::DriveBackward),
        (InputSource::key(KeyCode::Escape), Action::Cancel),
    ]
}
