// Math utilities and helper functions

use glam::Vec2;
use rapier2d::na::{Isometry2, Point2, Vector2};

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Check if two f32 values are approximately equal
pub fn approx_equal(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Midpoint of the segment between two points
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}

/// Slope angle of the segment from `from` to `to`, in radians.
///
/// Uses `atan2`, so a purely vertical segment yields +/- PI/2 and a zero-length
/// segment yields 0.
pub fn slope_angle(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

/// Rotate a vector counter-clockwise by `angle` radians
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Express a world-space point in the local frame of a pose
pub fn world_to_local(point: Vec2, origin: Vec2, angle: f32) -> Vec2 {
    rotate(point - origin, -angle)
}

/// Express a local-frame point in world space
pub fn local_to_world(local: Vec2, origin: Vec2, angle: f32) -> Vec2 {
    origin + rotate(local, angle)
}

pub fn to_na_vector(v: Vec2) -> Vector2<f32> {
    Vector2::new(v.x, v.y)
}

pub fn to_na_point(v: Vec2) -> Point2<f32> {
    Point2::new(v.x, v.y)
}

pub fn from_na_vector(v: &Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Build an isometry from a translation and a rotation angle
pub fn isometry(translation: Vec2, angle: f32) -> Isometry2<f32> {
    Isometry2::new(to_na_vector(translation), angle)
}
