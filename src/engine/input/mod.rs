// Input handling system
//
// Window events come in through `InputManager`, which keeps the modifier and
// double-click state and queues normalized `InputEvent`s. Keys are looked up
// in a remappable `InputConfig`.
//
// - `action`: sandbox actions, pointer events and default key bindings
// - `config`: key binding and remapping
// - `manager`: winit adapter and event queue

pub mod action;
pub mod config;
pub mod manager;

// Re-export commonly used types
pub use action::{Action, InputEvent, InputSource, Modifiers, PointerEvent, PointerPhase};
pub use config::InputConfig;
pub use manager::InputManager;
