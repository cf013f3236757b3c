use glam::Vec2;
use log::debug;
use rapier2d::prelude::*;
use std::collections::{BTreeMap, HashMap};

use super::body::{
    build_collider, build_rigid_body, Body, BodyDesc, BodyId, BodyKind, Part, PartId,
    PartPlacement,
};
use super::constraint::{build_joint, Attachment, Constraint, ConstraintDesc, ConstraintId};
use super::PhysicsError;
use crate::core::math;

/// Physics world: the rapier pipeline plus the bodies and constraints built on
/// top of it, keyed by stable ids.
pub struct PhysicsWorld {
    /// Gravity vector (y grows downward, like screen space)
    gravity: Vector<Real>,

    /// Integration parameters for the physics simulation
    integration_parameters: IntegrationParameters,

    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,

    /// Live bodies by id, iterated in creation order
    bodies: BTreeMap<BodyId, Body>,

    /// Live constraints by id
    constraints: BTreeMap<ConstraintId, Constraint>,

    /// Which live body currently owns each part
    part_owner: HashMap<PartId, BodyId>,

    next_body_id: u32,
    next_part_id: u32,
    next_constraint_id: u32,
}

impl PhysicsWorld {
    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vec2) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        // Fixed timestep of 1/60 seconds (60 FPS)
        integration_parameters.dt = 1.0 / 60.0;

        Self {
            gravity: math::to_na_vector(gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            bodies: BTreeMap::new(),
            constraints: BTreeMap::new(),
            part_owner: HashMap::new(),
            next_body_id: 1,
            next_part_id: 1,
            next_constraint_id: 1,
        }
    }

    /// Step the physics simulation forward by one timestep
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    /// Set the timestep for physics simulation
    pub fn set_timestep(&mut self, dt: Real) {
        self.integration_parameters.dt = dt;
    }

    fn allocate_body_id(&mut self) -> BodyId {
        let id = BodyId(self.next_body_id);
        self.next_body_id += 1;
        id
    }

    fn allocate_part_id(&mut self) -> PartId {
        let id = PartId(self.next_part_id);
        self.next_part_id += 1;
        id
    }

    /// Create a standalone single-part body
    pub fn spawn(&mut self, desc: &BodyDesc) -> BodyId {
        let id = self.allocate_body_id();
        let part_id = self.allocate_part_id();

        let rigid_body =
            build_rigid_body(desc.position, desc.angle, desc.is_static, &desc.material);
        let handle = self.rigid_body_set.insert(rigid_body);
        let collider = build_collider(&desc.geometry, &desc.material, Vec2::ZERO, 0.0);
        let collider = self
            .collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        self.part_owner.insert(part_id, id);
        self.bodies.insert(
            id,
            Body {
                id,
                kind: desc.kind,
                handle,
                is_static: desc.is_static,
                material: desc.material,
                parts: vec![Part {
                    id: part_id,
                    kind: desc.kind,
                    geometry: desc.geometry,
                    material: desc.material,
                    local_position: Vec2::ZERO,
                    local_angle: 0.0,
                    collider,
                }],
            },
        );

        debug!("Spawned {} body {:?} at {}", desc.kind.name(), id, desc.position);
        id
    }

    /// Create one dynamic body out of already-placed parts.
    ///
    /// The body sits at the density-weighted centroid of its parts with zero
    /// rotation; every part keeps its world pose, its material and its id, and
    /// is re-owned by the new body. The first placement is the canonical part.
    /// Callers remove the bodies the parts came from.
    pub fn spawn_compound(&mut self, parts: &[PartPlacement]) -> Result<BodyId, PhysicsError> {
        let first = parts.first().ok_or(PhysicsError::EmptyCompound)?;
        if parts.iter().any(|p| p.kind == BodyKind::Ground) {
            return Err(PhysicsError::GroundPart);
        }

        let kind = parts
            .iter()
            .min_by_key(|p| p.id)
            .map(|p| p.kind)
            .unwrap_or(first.kind);

        let total_weight: f32 = parts
            .iter()
            .map(|p| p.geometry.area() * p.material.density)
            .sum();
        let centroid = if total_weight > f32::EPSILON {
            parts
                .iter()
                .map(|p| p.position * p.geometry.area() * p.material.density)
                .sum::<Vec2>()
                / total_weight
        } else {
            parts.iter().map(|p| p.position).sum::<Vec2>() / parts.len() as f32
        };

        let id = self.allocate_body_id();
        let rigid_body = build_rigid_body(centroid, 0.0, false, &first.material);
        let handle = self.rigid_body_set.insert(rigid_body);

        let mut built = Vec::with_capacity(parts.len());
        for placement in parts {
            let local_position = placement.position - centroid;
            let collider = build_collider(
                &placement.geometry,
                &placement.material,
                local_position,
                placement.angle,
            );
            let collider = self
                .collider_set
                .insert_with_parent(collider, handle, &mut self.rigid_body_set);
            self.part_owner.insert(placement.id, id);
            built.push(Part {
                id: placement.id,
                kind: placement.kind,
                geometry: placement.geometry,
                material: placement.material,
                local_position,
                local_angle: placement.angle,
                collider,
            });
        }

        self.bodies.insert(
            id,
            Body {
                id,
                kind,
                handle,
                is_static: false,
                material: first.material,
                parts: built,
            },
        );

        debug!("Spawned compound {:?} with {} parts", id, parts.len());
        Ok(id)
    }

    /// Remove a body, its colliders and every constraint attached to it
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let body = self.bodies.remove(&id)?;

        let attached = self.constraints_attached_to(id);
        for constraint in &attached {
            self.constraints.remove(constraint);
        }
        if !attached.is_empty() {
            debug!(
                "Removing {:?} also dropped {} attached constraints",
                id,
                attached.len()
            );
        }

        // rapier drops the attached joints and colliders along with the body
        self.rigid_body_set.remove(
            body.handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );

        for part in &body.parts {
            if self.part_owner.get(&part.id) == Some(&id) {
                self.part_owner.remove(&part.id);
            }
        }

        Some(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn contains_body(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    /// All live bodies in creation order
    pub fn bodies(&self) -> impl DoubleEndedIterator<Item = &Body> {
        self.bodies.values()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// The live body that owns a part
    pub fn owner_of(&self, part: PartId) -> Option<BodyId> {
        self.part_owner.get(&part).copied()
    }

    fn rigid_body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies
            .get(&id)
            .and_then(|b| self.rigid_body_set.get(b.handle))
    }

    fn rigid_body_mut(&mut self, id: BodyId) -> Result<&mut RigidBody, PhysicsError> {
        let handle = self
            .bodies
            .get(&id)
            .map(|b| b.handle)
            .ok_or(PhysicsError::BodyNotFound(id))?;
        self.rigid_body_set
            .get_mut(handle)
            .ok_or(PhysicsError::BodyNotFound(id))
    }

    pub fn position(&self, id: BodyId) -> Option<Vec2> {
        self.rigid_body(id)
            .map(|rb| math::from_na_vector(rb.translation()))
    }

    pub fn angle(&self, id: BodyId) -> Option<f32> {
        self.rigid_body(id).map(|rb| rb.rotation().angle())
    }

    pub fn mass(&self, id: BodyId) -> Option<f32> {
        self.rigid_body(id).map(|rb| rb.mass())
    }

    pub fn angular_velocity(&self, id: BodyId) -> Option<f32> {
        self.rigid_body(id).map(|rb| rb.angvel())
    }

    pub fn set_angular_velocity(&mut self, id: BodyId, angvel: f32) -> Result<(), PhysicsError> {
        self.rigid_body_mut(id)?.set_angvel(angvel, true);
        Ok(())
    }

    /// Teleport a body, keeping its rotation
    pub fn set_position(&mut self, id: BodyId, position: Vec2) -> Result<(), PhysicsError> {
        self.rigid_body_mut(id)?
            .set_translation(math::to_na_vector(position), true);
        Ok(())
    }

    /// Switch a body between fixed and dynamic. Velocities are cleared so a
    /// body released after being held does not fly off.
    pub fn set_static(&mut self, id: BodyId, is_static: bool) -> Result<(), PhysicsError> {
        let rigid_body = self.rigid_body_mut(id)?;
        let body_type = if is_static {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };
        rigid_body.set_body_type(body_type, true);
        rigid_body.set_linvel(Vector::zeros(), true);
        rigid_body.set_angvel(0.0, true);

        if let Some(body) = self.bodies.get_mut(&id) {
            body.is_static = is_static;
        }
        Ok(())
    }

    pub fn is_static(&self, id: BodyId) -> Option<bool> {
        self.bodies.get(&id).map(|b| b.is_static)
    }

    /// World poses of every part of a body, ready to be rebuilt into a compound
    pub fn part_placements(&self, id: BodyId) -> Vec<PartPlacement> {
        let (Some(body), Some(position), Some(angle)) =
            (self.bodies.get(&id), self.position(id), self.angle(id))
        else {
            return Vec::new();
        };

        body.parts
            .iter()
            .map(|part| PartPlacement {
                id: part.id,
                kind: part.kind,
                geometry: part.geometry,
                material: part.material,
                position: math::local_to_world(part.local_position, position, angle),
                angle: angle + part.local_angle,
            })
            .collect()
    }

    /// World pose and shape of every collider of a body
    pub fn part_shapes(&self, id: BodyId) -> Vec<(PartId, Isometry<Real>, &dyn Shape)> {
        let (Some(body), Some(rigid_body)) = (self.bodies.get(&id), self.rigid_body(id)) else {
            return Vec::new();
        };

        body.parts
            .iter()
            .filter_map(|part| {
                let collider = self.collider_set.get(part.collider)?;
                let local = math::isometry(part.local_position, part.local_angle);
                Some((part.id, rigid_body.position() * local, collider.shape()))
            })
            .collect()
    }

    /// Create a constraint between two distinct live bodies
    pub fn add_constraint(&mut self, desc: &ConstraintDesc) -> Result<ConstraintId, PhysicsError> {
        let (Some(a), Some(b)) = (desc.a.attachment(), desc.b.attachment()) else {
            return Err(PhysicsError::UnattachedEndpoint);
        };
        if a.body == b.body {
            return Err(PhysicsError::SelfConstraint(a.body));
        }

        let handle_a = self
            .bodies
            .get(&a.body)
            .map(|body| body.handle)
            .ok_or(PhysicsError::BodyNotFound(a.body))?;
        let handle_b = self
            .bodies
            .get(&b.body)
            .map(|body| body.handle)
            .ok_or(PhysicsError::BodyNotFound(b.body))?;

        let joint = build_joint(desc.kind, &a, &b, desc.length, desc.stiffness, desc.damping);
        let handle = self.impulse_joint_set.insert(handle_a, handle_b, joint, true);

        let id = ConstraintId(self.next_constraint_id);
        self.next_constraint_id += 1;
        self.constraints.insert(
            id,
            Constraint {
                id,
                kind: desc.kind,
                a,
                b,
                length: desc.length,
                stiffness: desc.stiffness,
                damping: desc.damping,
                pin: desc.is_pin(),
                handle,
            },
        );

        Ok(id)
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> Option<Constraint> {
        let constraint = self.constraints.remove(&id)?;
        self.impulse_joint_set.remove(constraint.handle, true);
        Some(constraint)
    }

    /// Change a constraint's rest length. The engine joint is rebuilt; the id
    /// stays the same.
    pub fn set_constraint_length(
        &mut self,
        id: ConstraintId,
        length: f32,
    ) -> Result<(), PhysicsError> {
        let constraint = self
            .constraints
            .get(&id)
            .ok_or(PhysicsError::ConstraintNotFound(id))?;
        let (kind, a, b, stiffness, damping) = (
            constraint.kind,
            constraint.a,
            constraint.b,
            constraint.stiffness,
            constraint.damping,
        );
        let old_handle = constraint.handle;

        let handle_a = self
            .bodies
            .get(&a.body)
            .map(|body| body.handle)
            .ok_or(PhysicsError::BodyNotFound(a.body))?;
        let handle_b = self
            .bodies
            .get(&b.body)
            .map(|body| body.handle)
            .ok_or(PhysicsError::BodyNotFound(b.body))?;

        self.impulse_joint_set.remove(old_handle, true);
        let joint = build_joint(kind, &a, &b, length, stiffness, damping);
        let handle = self.impulse_joint_set.insert(handle_a, handle_b, joint, true);

        if let Some(constraint) = self.constraints.get_mut(&id) {
            constraint.length = length;
            constraint.pin = length <= super::constraint::PIN_LENGTH;
            constraint.handle = handle;
        }
        Ok(())
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(&id)
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Ids of every constraint with an end on `body`
    pub fn constraints_attached_to(&self, body: BodyId) -> Vec<ConstraintId> {
        self.constraints
            .values()
            .filter(|c| c.touches(body))
            .map(|c| c.id)
            .collect()
    }

    /// Current world position of an attachment point
    pub fn anchor_position(&self, attachment: &Attachment) -> Option<Vec2> {
        let position = self.position(attachment.body)?;
        let angle = self.angle(attachment.body)?;
        Some(math::local_to_world(attachment.offset, position, angle))
    }
}
