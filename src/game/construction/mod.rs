// Construction: turning pointer gestures into bodies and constraints
//
// - `factory`: body descriptions from a drag
// - `resolver`: what a joint or spring attaches to
// - `merge`: fusing overlapping solids into compounds
// - `tool` / `drag`: the per-tool gesture state machines
// - `registry`: the tracked object sets
// - `sandbox`: owner of all of the above

pub mod config;
pub mod drag;
pub mod factory;
pub mod merge;
pub mod registry;
pub mod resolver;
pub mod sandbox;
pub mod tool;

pub use config::SandboxConfig;
pub use sandbox::Sandbox;
pub use tool::ToolKind;
