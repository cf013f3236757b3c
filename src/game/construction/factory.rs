// Shape factory: turns a drag gesture into a body description

use glam::Vec2;

use super::config::SandboxConfig;
use crate::core::math;
use crate::engine::physics::{BodyDesc, BodyKind, Geometry, Material};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    #[error("No shape rule for {0} bodies")]
    Unimplemented(&'static str),
}

/// Caller-supplied properties that win over the per-kind defaults
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PropOverrides {
    pub is_static: Option<bool>,
    pub restitution: Option<f32>,
    pub friction: Option<f32>,
    pub friction_static: Option<f32>,
    pub density: Option<f32>,
}

impl PropOverrides {
    /// Previews hang in place while the gesture is in progress
    pub fn preview() -> Self {
        Self {
            is_static: Some(true),
            ..Self::default()
        }
    }

    pub fn with_static(is_static: bool) -> Self {
        Self {
            is_static: Some(is_static),
            ..Self::default()
        }
    }

    fn apply(&self, mut material: Material) -> Material {
        if let Some(restitution) = self.restitution {
            material.restitution = restitution;
        }
        if let Some(friction) = self.friction {
            material.friction = friction;
        }
        if let Some(friction_static) = self.friction_static {
            material.friction_static = friction_static;
        }
        if let Some(density) = self.density {
            material.density = density;
        }
        material
    }
}

/// Default material for each kind
pub fn default_material(kind: BodyKind) -> Material {
    match kind {
        BodyKind::Wheel => Material {
            restitution: 0.2,
            friction: 0.9,
            friction_static: 2.0,
            density: 0.001,
            air_friction: 0.0,
        },
        BodyKind::Circle | BodyKind::Box => Material {
            restitution: 0.5,
            friction: 0.4,
            friction_static: 1.5,
            density: 0.001,
            air_friction: 0.0,
        },
        BodyKind::Plank => Material {
            restitution: 0.3,
            friction: 0.4,
            friction_static: 1.5,
            density: 0.002,
            air_friction: 0.0,
        },
        BodyKind::Lemon => Material {
            restitution: 0.3,
            friction: 0.6,
            friction_static: 1.0,
            density: 0.0005,
            air_friction: 0.01,
        },
        BodyKind::Ground => Material {
            restitution: 0.1,
            friction: 0.8,
            friction_static: 2.0,
            density: 0.001,
            air_friction: 0.0,
        },
    }
}

/// Radius of a dragged circle, never below the minimum
pub fn drag_radius(anchor: Vec2, pointer: Vec2, min_radius: f32) -> f32 {
    anchor.distance(pointer).max(min_radius)
}

/// Build the description of a body of `kind` dragged from `anchor` to `pointer`.
///
/// Circles and wheels are centred on the anchor and sized by the pointer.
/// Planks and boxes span the two points. Lemons are stamped at the pointer.
pub fn create(
    kind: BodyKind,
    anchor: Vec2,
    pointer: Vec2,
    overrides: &PropOverrides,
    config: &SandboxConfig,
) -> Result<BodyDesc, FactoryError> {
    let (position, angle, geometry) = match kind {
        BodyKind::Wheel | BodyKind::Circle => (
            anchor,
            0.0,
            Geometry::Circle {
                radius: drag_radius(anchor, pointer, config.min_radius),
            },
        ),
        BodyKind::Plank => (
            math::midpoint(anchor, pointer),
            math::slope_angle(anchor, pointer),
            Geometry::Rect {
                width: anchor.distance(pointer).max(config.min_plank_length),
                height: config.plank_width,
            },
        ),
        BodyKind::Box => {
            let extent = (pointer - anchor).abs() + Vec2::splat(2.0 * config.box_padding);
            (
                math::midpoint(anchor, pointer),
                0.0,
                Geometry::Rect {
                    width: extent.x,
                    height: extent.y,
                },
            )
        }
        BodyKind::Lemon => (
            pointer,
            0.0,
            Geometry::Circle {
                radius: config.lemon_radius,
            },
        ),
        BodyKind::Ground => return Err(FactoryError::Unimplemented(kind.name())),
    };

    Ok(BodyDesc {
        kind,
        position,
        angle,
        geometry,
        material: overrides.apply(default_material(kind)),
        is_static: overrides.is_static.unwrap_or(false),
    })
}
