use crate::core::math;
use glam::Vec2;
use rapier2d::prelude::*;

pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

/// Stable identifier of a live body in the [`PhysicsWorld`](super::PhysicsWorld).
///
/// Ids are handed out monotonically and never reused, so a lower id always
/// means an earlier creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

/// Stable identifier of a single shape. Parts survive merges: when bodies are
/// fused into a compound, their parts move over with their ids intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub u32);

/// What a body (or part) was built as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Wheel,
    Circle,
    Plank,
    Box,
    /// Fruit payload, the thing being hauled
    Lemon,
    /// The arena floor
    Ground,
}

impl BodyKind {
    /// Rotational hubs: constraints near their centre snap onto the axle
    pub fn is_hub(self) -> bool {
        matches!(self, Self::Wheel)
    }

    /// Kinds that may be placed as static with the modifier held
    pub fn can_be_static(self) -> bool {
        matches!(self, Self::Circle | Self::Plank | Self::Box)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Wheel => "wheel",
            Self::Circle => "circle",
            Self::Plank => "plank",
            Self::Box => "box",
            Self::Lemon => "lemon",
            Self::Ground => "ground",
        }
    }
}

/// Shape of a single part, in its own frame (centred on the origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

impl Geometry {
    pub fn area(&self) -> f32 {
        match *self {
            Self::Circle { radius } => std::f32::consts::PI * radius * radius,
            Self::Rect { width, height } => width * height,
        }
    }

    pub fn to_shape(&self) -> SharedShape {
        match *self {
            Self::Circle { radius } => SharedShape::ball(radius),
            Self::Rect { width, height } => SharedShape::cuboid(width / 2.0, height / 2.0),
        }
    }
}

/// Physical properties, passed through to the engine unchanged.
///
/// rapier has a single friction coefficient, so `friction_static` is carried
/// on the record for callers but only `friction` reaches the solver.
/// `air_friction` becomes the body's linear damping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub restitution: f32,
    pub friction: f32,
    pub friction_static: f32,
    pub density: f32,
    pub air_friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.1,
            friction_static: 0.5,
            density: 0.001,
            air_friction: 0.01,
        }
    }
}

/// Everything needed to create a standalone body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec2,
    pub angle: f32,
    pub geometry: Geometry,
    pub material: Material,
    pub is_static: bool,
}

impl BodyDesc {
    /// A static body, used for the arena and for placement previews
    pub fn fixed(kind: BodyKind, position: Vec2, geometry: Geometry) -> Self {
        Self {
            kind,
            position,
            angle: 0.0,
            geometry,
            material: Material::default(),
            is_static: true,
        }
    }
}

/// A part as it currently sits in world space; the input for building a
/// compound out of existing parts.
#[derive(Debug, Clone, PartialEq)]
pub struct PartPlacement {
    pub id: PartId,
    pub kind: BodyKind,
    pub geometry: Geometry,
    pub material: Material,
    pub position: Vec2,
    pub angle: f32,
}

/// One shape of a body
#[derive(Debug, Clone)]
pub struct Part {
    pub id: PartId,
    pub kind: BodyKind,
    pub geometry: Geometry,
    pub material: Material,
    /// Pose relative to the owning body
    pub local_position: Vec2,
    pub local_angle: f32,
    pub collider: ColliderHandle,
}

/// A simulated body: a standalone shape or a compound of several parts.
///
/// The first part is the canonical one; a compound's `kind` comes from its
/// earliest-created part.
#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub kind: BodyKind,
    pub handle: RigidBodyHandle,
    pub is_static: bool,
    pub material: Material,
    pub parts: Vec<Part>,
}

impl Body {
    pub fn is_compound(&self) -> bool {
        self.parts.len() > 1
    }

    pub fn part_ids(&self) -> Vec<PartId> {
        self.parts.iter().map(|p| p.id).collect()
    }
}

/// Build the rapier rigid body for a pose
pub(super) fn build_rigid_body(
    position: Vec2,
    angle: f32,
    is_static: bool,
    material: &Material,
) -> RigidBody {
    let body_type = if is_static {
        RigidBodyType::Fixed
    } else {
        RigidBodyType::Dynamic
    };

    RigidBodyBuilder::new(body_type)
        .translation(math::to_na_vector(position))
        .rotation(angle)
        .linear_damping(material.air_friction)
        .build()
}

/// Build the rapier collider for a part, positioned relative to its parent
pub(super) fn build_collider(
    geometry: &Geometry,
    material: &Material,
    local_position: Vec2,
    local_angle: f32,
) -> Collider {
    ColliderBuilder::new(geometry.to_shape())
        .position(math::isometry(local_position, local_angle))
        .friction(material.friction)
        .restitution(material.restitution)
        .density(material.density)
        .build()
}
