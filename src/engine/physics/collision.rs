use glam::Vec2;
use rapier2d::parry::query;

use super::body::BodyId;
use super::world::PhysicsWorld;
use crate::core::math;

/// A pair of bodies whose shapes overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapPair {
    pub body_a: BodyId,
    pub body_b: BodyId,
}

impl PhysicsWorld {
    /// Bodies among `candidates` with a part containing `point`.
    ///
    /// Results keep the order of `candidates`; callers that pick "the body
    /// under the cursor" take the first match.
    pub fn point_query<I>(&self, candidates: I, point: Vec2) -> Vec<BodyId>
    where
        I: IntoIterator<Item = BodyId>,
    {
        let point = math::to_na_point(point);
        candidates
            .into_iter()
            .filter(|&id| {
                self.part_shapes(id)
                    .iter()
                    .any(|(_, pose, shape)| shape.contains_point(pose, &point))
            })
            .collect()
    }

    /// Every body in the world under `point`, newest (topmost) first
    pub fn bodies_at(&self, point: Vec2) -> Vec<BodyId> {
        let ids: Vec<BodyId> = self.bodies().map(|b| b.id).rev().collect();
        self.point_query(ids, point)
    }

    /// Overlaps between `body` and `candidates`, one pair per overlapping
    /// candidate. Pairing a body with itself is skipped.
    pub fn overlap_query<I>(&self, body: BodyId, candidates: I) -> Vec<OverlapPair>
    where
        I: IntoIterator<Item = BodyId>,
    {
        let shapes = self.part_shapes(body);
        if shapes.is_empty() {
            return Vec::new();
        }

        candidates
            .into_iter()
            .filter(|&other| other != body)
            .filter(|&other| {
                let other_shapes = self.part_shapes(other);
                shapes.iter().any(|(_, pose, shape)| {
                    other_shapes.iter().any(|(_, other_pose, other_shape)| {
                        // Shape pairs parry cannot test are treated as disjoint
                        query::intersection_test(pose, *shape, other_pose, *other_shape)
                            .unwrap_or(false)
                    })
                })
            })
            .map(|other| OverlapPair {
                body_a: body,
                body_b: other,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::body::{BodyDesc, BodyKind, Geometry, Material};

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
            is_static: false,
        })
    }

    #[test]
    fn test_point_query_circle_and_rect() {
        let mut world = PhysicsWorld::with_gravity(Vec2::ZERO);
        let ball = spawn(
            &mut world,
            BodyKind::Circle,
            Vec2::new(0.0, 0.0),
            Geometry::Circle { radius: 10.0 },
        );
        let crate_box = spawn(
            &mut world,
            BodyKind::Box,
            Vec2::new(100.0, 0.0),
            Geometry::Rect {
                width: 20.0,
                height: 20.0,
            },
        );

        assert_eq!(world.point_query([ball, crate_box], Vec2::new(5.0, 5.0)), vec![ball]);
        assert_eq!(
            world.point_query([ball, crate_box], Vec2::new(109.0, -9.0)),
            vec![crate_box]
        );
        assert!(world
            .point_query([ball, crate_box], Vec2::new(50.0, 0.0))
            .is_empty());
    }

    #[test]
    fn test_bodies_at_newest_first() {
        let mut world = PhysicsWorld::with_gravity(Vec2::ZERO);
        let below = spawn(
            &mut world,
            BodyKind::Box,
            Vec2::ZERO,
            Geometry::Rect {
                width: 50.0,
                height: 50.0,
            },
        );
        let above = spawn(
            &mut world,
            BodyKind::Wheel,
            Vec2::ZERO,
            Geometry::Circle { radius: 10.0 },
        );
        assert_eq!(world.bodies_at(Vec2::ZERO), vec![above, below]);
    }

    #[test]
    fn test_overlap_query_skips_self_and_disjoint() {
        let mut world = PhysicsWorld::with_gravity(Vec2::ZERO);
        let a = spawn(
            &mut world,
            BodyKind::Circle,
            Vec2::ZERO,
            Geometry::Circle { radius: 10.0 },
        );
        let b = spawn(
            &mut world,
            BodyKind::Circle,
            Vec2::new(15.0, 0.0),
            Geometry::Circle { radius: 10.0 },
        );
        let far = spawn(
            &mut world,
            BodyKind::Circle,
            Vec2::new(500.0, 0.0),
            Geometry::Circle { radius: 10.0 },
        );

        let pairs = world.overlap_query(a, [a, b, far]);
        assert_eq!(
            pairs,
            vec![OverlapPair {
                body_a: a,
                body_b: b
            }]
        );
    }
}
