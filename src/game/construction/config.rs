// Sandbox tuning - one record for every constant the construction rules use

use glam::Vec2;

/// Tunable constants for building and driving.
///
/// Lengths are world units (the arena is about 1000 units tall, y grows
/// downward). Velocities are per second.
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxConfig {
    // World
    /// Gravity applied while the simulation runs
    pub gravity: Vec2,

    // Shapes
    /// Smallest wheel/circle radius, used when the drag is shorter
    pub min_radius: f32,
    /// Smallest plank length
    pub min_plank_length: f32,
    /// Thickness of every plank
    pub plank_width: f32,
    /// Added on each side of a dragged box so a click still yields a box
    pub box_padding: f32,
    /// Radius of the lemon stamp
    pub lemon_radius: f32,

    // Constraints
    /// Anchors closer than this to a hub's centre snap onto the axle
    pub snap_radius: f32,
    /// A joint gesture shorter than this becomes a pin
    pub pin_tolerance: f32,
    /// Spring constant that makes a joint hold its length
    pub joint_stiffness: f32,
    pub joint_damping: f32,
    pub spring_stiffness: f32,
    pub spring_damping: f32,

    // Driving
    /// Angular velocity added per input, before dividing by mass
    pub wheel_torque: f32,
    /// Added to the wheel's mass so small and large wheels differ less
    pub wheel_responsiveness: f32,
    /// Wheels never spin faster than this in either direction
    pub max_angular_velocity: f32,
}

/// The stock rules
pub const DEFAULT_CONFIG: SandboxConfig = SandboxConfig {
    // World - roughly 1000 units/s^2, a comfortable fall across the arena
    gravity: Vec2::new(0.0, 1000.0),

    // Shapes
    min_radius: 10.0,
    min_plank_length: 20.0,
    plank_width: 20.0,
    box_padding: 10.0,
    lemon_radius: 15.0,

    // Constraints
    snap_radius: 10.0,
    pin_tolerance: 2.0,
    joint_stiffness: 4000.0,
    joint_damping: 60.0,
    spring_stiffness: 60.0,
    spring_damping: 2.0,

    // Driving - 0.2 and 0.5 rad per 1/60 s tick
    wheel_torque: 12.0,
    wheel_responsiveness: 1.0,
    max_angular_velocity: 30.0,
};

impl Default for SandboxConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}
