// Constraint resolver: finds what a joint or spring gesture attaches to

use glam::Vec2;

use super::config::SandboxConfig;
use crate::core::math;
use crate::engine::physics::{
    Attachment, BodyId, BodyKind, ConstraintDesc, ConstraintKind, Endpoint, PhysicsWorld,
};

/// Fruit payloads are never attachment targets
pub const NEVER_ATTACHABLE: [BodyKind; 1] = [BodyKind::Lemon];

/// Why a constraint gesture produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("neither end is over an attachable body")]
    NoAttachment,

    #[error("one end is not over an attachable body")]
    Unattached,

    #[error("both ends are on the same body")]
    SameBody,
}

/// Both ends of a committed constraint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub a: Attachment,
    pub b: Attachment,
    /// Distance between the two anchors in world space
    pub length: f32,
}

fn attachable(world: &PhysicsWorld, id: BodyId, exclude: &[BodyKind]) -> bool {
    world
        .body(id)
        .map(|body| !exclude.contains(&body.kind) && !NEVER_ATTACHABLE.contains(&body.kind))
        .unwrap_or(false)
}

/// Attach to the topmost eligible body under `point`.
///
/// When `avoid` names a body and another eligible body is also under the
/// point, the other one wins; that is how a pin joins two stacked bodies.
pub fn attach_at(
    world: &PhysicsWorld,
    point: Vec2,
    exclude: &[BodyKind],
    avoid: Option<BodyId>,
    snap_radius: f32,
) -> Option<Attachment> {
    let candidates: Vec<BodyId> = world
        .bodies_at(point)
        .into_iter()
        .filter(|&id| attachable(world, id, exclude))
        .collect();

    let body = candidates
        .iter()
        .copied()
        .find(|&id| Some(id) != avoid)
        .or_else(|| candidates.first().copied())?;

    let position = world.position(body)?;
    let angle = world.angle(body)?;
    let mut offset = math::world_to_local(point, position, angle);

    let is_hub = world.body(body).map(|b| b.kind.is_hub()).unwrap_or(false);
    if is_hub && offset.length() < snap_radius {
        offset = Vec2::ZERO;
    }

    Some(Attachment { body, offset })
}

/// Resolve both ends of a gesture from `point_a` to `point_b`.
///
/// A gesture shorter than `pin_tolerance` becomes a pin: the second end is
/// re-expressed at the first end's world anchor so the rest length is zero.
pub fn resolve(
    world: &PhysicsWorld,
    point_a: Vec2,
    point_b: Vec2,
    exclude: &[BodyKind],
    config: &SandboxConfig,
) -> Result<Resolution, RejectReason> {
    let a = attach_at(world, point_a, exclude, None, config.snap_radius);
    let b = attach_at(
        world,
        point_b,
        exclude,
        a.map(|a| a.body),
        config.snap_radius,
    );

    let (a, mut b) = match (a, b) {
        (None, None) => return Err(RejectReason::NoAttachment),
        (Some(_), None) | (None, Some(_)) => return Err(RejectReason::Unattached),
        (Some(a), Some(b)) => (a, b),
    };
    if a.body == b.body {
        return Err(RejectReason::SameBody);
    }

    let anchor_a = world.anchor_position(&a).unwrap_or(point_a);
    if math::approx_equal(point_a.distance(point_b), 0.0, config.pin_tolerance) {
        if let (Some(position), Some(angle)) = (world.position(b.body), world.angle(b.body)) {
            b.offset = math::world_to_local(anchor_a, position, angle);
        }
        return Ok(Resolution { a, b, length: 0.0 });
    }

    let anchor_b = world.anchor_position(&b).unwrap_or(point_b);
    Ok(Resolution {
        a,
        b,
        length: anchor_a.distance(anchor_b),
    })
}

/// Stiffness and damping for a constraint kind
pub fn spring_constants(kind: ConstraintKind, config: &SandboxConfig) -> (f32, f32) {
    match kind {
        ConstraintKind::Joint => (config.joint_stiffness, config.joint_damping),
        ConstraintKind::Spring => (config.spring_stiffness, config.spring_damping),
    }
}

/// Description of the constraint to commit
pub fn describe(
    kind: ConstraintKind,
    resolution: &Resolution,
    config: &SandboxConfig,
) -> ConstraintDesc {
    let (stiffness, damping) = spring_constants(kind, config);
    ConstraintDesc {
        kind,
        a: Endpoint::Body(resolution.a),
        b: Endpoint::Body(resolution.b),
        length: resolution.length,
        stiffness,
        damping,
    }
}

/// Description of the constraint shown while the gesture is in progress;
/// ends that are not over a body stay free points.
pub fn preview(
    world: &PhysicsWorld,
    kind: ConstraintKind,
    point_a: Vec2,
    point_b: Vec2,
    exclude: &[BodyKind],
    config: &SandboxConfig,
) -> ConstraintDesc {
    let a = attach_at(world, point_a, exclude, None, config.snap_radius);
    let b = attach_at(
        world,
        point_b,
        exclude,
        a.map(|a| a.body),
        config.snap_radius,
    );
    let (stiffness, damping) = spring_constants(kind, config);

    ConstraintDesc {
        kind,
        a: a.map(Endpoint::Body).unwrap_or(Endpoint::World(point_a)),
        b: b.map(Endpoint::Body).unwrap_or(Endpoint::World(point_b)),
        length: point_a.distance(point_b),
        stiffness,
        damping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::{BodyDesc, Geometry, Material};
    use approx::assert_relative_eq;

    fn spawn(
        world: &mut PhysicsWorld,
        kind: BodyKind,
        position: Vec2,
        geometry: Geometry,
    ) -> BodyId {
        world.spawn(&BodyDesc {
            kind,
            position,
            angle: 0.0,
            geometry,
            material: Material::default(),
            is_static: true,
        })
    }

    fn world_with_two_boxes() -> (PhysicsWorld, BodyId, BodyId) {
        let mut world = PhysicsWorld::with_gravity(Vec2::ZERO);
        let rect = Geometry::Rect {
            width: 40.0,
            height: 40.0,
        };
        let left = spawn(&mut world, BodyKind::Box, Vec2::new(0.0, 0.0), rect);
        let right = spawn(&mut world, BodyKind::Box, Vec2::new(100.0, 0.0), rect);
        (world, left, right)
    }

    #[test]
    fn test_resolve_two_bodies() {
        let (world, left, right) = world_with_two_boxes();
        let config = SandboxConfig::default();

        let resolution = resolve(
            &world,
            Vec2::new(5.0, 5.0),
            Vec2::new(95.0, -5.0),
            &[],
            &config,
        )
        .unwrap();

        assert_eq!(resolution.a.body, left);
        assert_eq!(resolution.a.offset, Vec2::new(5.0, 5.0));
        assert_eq!(resolution.b.body, right);
        assert_eq!(resolution.b.offset, Vec2::new(-5.0, -5.0));
        assert_relative_eq!(resolution.length, Vec2::new(90.0, -10.0).length());
    }

    #[test]
    fn test_reject_missing_ends() {
        let (world, _, _) = world_with_two_boxes();
        let config = SandboxConfig::default();

        assert_eq!(
            resolve(&world, Vec2::new(500.0, 500.0), Vec2::new(600.0, 500.0), &[], &config),
            Err(RejectReason::NoAttachment)
        );
        assert_eq!(
            resolve(&world, Vec2::new(0.0, 0.0), Vec2::new(600.0, 500.0), &[], &config),
            Err(RejectReason::Unattached)
        );
    }

    #[test]
    fn test_reject_same_body() {
        let (world, _, _) = world_with_two_boxes();
        let config = SandboxConfig::default();
        assert_eq!(
            resolve(&world, Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0), &[], &config),
            Err(RejectReason::SameBody)
        );
    }

    #[test]
    fn test_wheel_snaps_to_centre() {
        let mut world = PhysicsWorld::with_gravity(Vec2::ZERO);
        let wheel = spawn(
            &mut world,
            BodyKind::Wheel,
            Vec2::new(50.0, 50.0),
            Geometry::Circle { radius: 30.0 },
        );

        let near = attach_at(&world, Vec2::new(56.0, 53.0), &[], None, 10.0).unwrap();
        assert_eq!(near.body, wheel);
        assert_eq!(near.offset, Vec2::ZERO);

        let far = attach_at(&world, Vec2::new(70.0, 50.0), &[], None, 10.0).unwrap();
        assert_eq!(far.offset, Vec2::new(20.0, 0.0));
    }

    #[test]
    fn test_lemons_are_never_targets() {
        let mut world = PhysicsWorld::with_gravity(Vec2::ZERO);
        spawn(
            &mut world,
            BodyKind::Lemon,
            Vec2::ZERO,
            Geometry::Circle { radius: 15.0 },
        );
        assert!(attach_at(&world, Vec2::ZERO, &[], None, 10.0).is_none());
    }

    #[test]
    fn test_excluded_kinds_fall_through() {
        let mut world = PhysicsWorld::with_gravity(Vec2::ZERO);
        let floor = spawn(
            &mut world,
            BodyKind::Ground,
            Vec2::ZERO,
            Geometry::Rect {
                width: 200.0,
                height: 20.0,
            },
        );
        assert!(attach_at(&world, Vec2::ZERO, &[BodyKind::Ground], None, 10.0).is_none());
        assert_eq!(
            attach_at(&world, Vec2::ZERO, &[], None, 10.0).map(|a| a.body),
            Some(floor)
        );
    }

    #[test]
    fn test_click_over_stacked_bodies_makes_pin() {
        let mut world = PhysicsWorld::with_gravity(Vec2::ZERO);
        let chassis = spawn(
            &mut world,
            BodyKind::Box,
            Vec2::new(0.0, 0.0),
            Geometry::Rect {
                width: 200.0,
                height: 40.0,
            },
        );
        let wheel = spawn(
            &mut world,
            BodyKind::Wheel,
            Vec2::new(60.0, 10.0),
            Geometry::Circle { radius: 25.0 },
        );
        let config = SandboxConfig::default();

        let click = Vec2::new(63.0, 12.0);
        let resolution = resolve(&world, click, click, &[], &config).unwrap();
        assert_eq!(resolution.a.body, wheel);
        assert_eq!(resolution.a.offset, Vec2::ZERO);
        assert_eq!(resolution.b.body, chassis);
        assert_eq!(resolution.length, 0.0);

        // Second end sits on the wheel's axle
        let anchor_b = world.anchor_position(&resolution.b).unwrap();
        assert_relative_eq!(anchor_b.x, 60.0, epsilon = 1e-4);
        assert_relative_eq!(anchor_b.y, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_preview_keeps_free_ends() {
        let (world, left, _) = world_with_two_boxes();
        let config = SandboxConfig::default();
        let desc = preview(
            &world,
            ConstraintKind::Spring,
            Vec2::new(0.0, 0.0),
            Vec2::new(300.0, 0.0),
            &[],
            &config,
        );
        assert_eq!(desc.a.attachment().map(|a| a.body), Some(left));
        assert_eq!(desc.b, Endpoint::World(Vec2::new(300.0, 0.0)));
        assert_eq!(desc.stiffness, config.spring_stiffness);
    }
}
