// Merge engine: fuses a freshly placed solid with everything it overlaps

use std::collections::HashSet;

use log::{debug, info};

use super::registry::Registry;
use crate::core::math;
use crate::engine::physics::{
    Attachment, BodyId, BodyKind, ConstraintId, Endpoint, PhysicsError, PhysicsWorld,
};

/// Kinds that may not cross a wheel; they fuse with wheels they overlap
pub fn avoids_crossing_solids(kind: BodyKind) -> bool {
    matches!(kind, BodyKind::Plank | BodyKind::Box)
}

/// Bodies a new body of `kind` may fuse with
pub fn merge_candidates(registry: &Registry, kind: BodyKind) -> Vec<BodyId> {
    let mut candidates: Vec<BodyId> = registry.non_static_parts.iter().collect();
    if avoids_crossing_solids(kind) {
        candidates.extend(registry.wheels.iter());
    }
    candidates
}

/// The live body that currently owns `id`'s canonical part
fn owning_body(world: &PhysicsWorld, id: BodyId) -> BodyId {
    world
        .body(id)
        .and_then(|body| body.parts.first())
        .and_then(|part| world.owner_of(part.id))
        .unwrap_or(id)
}

/// Fuse `new_body` with every registered solid it overlaps.
///
/// Whole compounds are pulled in, never single parts of them. Constraints on
/// any absorbed body move to the compound with their world anchor unchanged
/// and keep their registry slot. Absorbed bodies leave the world and the
/// registry. Returns the compound, or `new_body` itself when nothing overlaps.
pub fn merge_if_overlapping(
    world: &mut PhysicsWorld,
    registry: &mut Registry,
    new_body: BodyId,
) -> Result<BodyId, PhysicsError> {
    let kind = world
        .body(new_body)
        .map(|body| body.kind)
        .ok_or(PhysicsError::BodyNotFound(new_body))?;

    let mut colliding: Vec<BodyId> = Vec::new();
    for pair in world.overlap_query(new_body, merge_candidates(registry, kind)) {
        for id in [pair.body_a, pair.body_b] {
            if id != new_body && !colliding.contains(&id) {
                colliding.push(id);
            }
        }
    }
    if colliding.is_empty() {
        return Ok(new_body);
    }

    let mut absorbed: Vec<BodyId> = Vec::with_capacity(colliding.len() + 1);
    for id in std::iter::once(new_body).chain(colliding) {
        let owner = owning_body(world, id);
        if !absorbed.contains(&owner) {
            absorbed.push(owner);
        }
    }

    let mut seen = HashSet::new();
    let placements: Vec<_> = absorbed
        .iter()
        .flat_map(|&id| world.part_placements(id))
        .filter(|placement| seen.insert(placement.id))
        .collect();

    let compound = world.spawn_compound(&placements)?;
    retarget_constraints(world, registry, &absorbed, compound)?;

    for &id in &absorbed {
        registry.forget_body(id);
        world.remove_body(id);
    }

    info!(
        "Merged {} bodies ({} parts) into {:?}",
        absorbed.len(),
        placements.len(),
        compound
    );
    Ok(compound)
}

/// Re-express an attachment on `target`, keeping its current world position
fn reanchor(
    world: &PhysicsWorld,
    attachment: &Attachment,
    target: BodyId,
) -> Result<Attachment, PhysicsError> {
    let anchor = world
        .anchor_position(attachment)
        .ok_or(PhysicsError::BodyNotFound(attachment.body))?;
    let position = world
        .position(target)
        .ok_or(PhysicsError::BodyNotFound(target))?;
    let angle = world.angle(target).unwrap_or(0.0);

    Ok(Attachment {
        body: target,
        offset: math::world_to_local(anchor, position, angle),
    })
}

/// Move every constraint touching an absorbed body onto `compound`
fn retarget_constraints(
    world: &mut PhysicsWorld,
    registry: &mut Registry,
    absorbed: &[BodyId],
    compound: BodyId,
) -> Result<(), PhysicsError> {
    let affected: Vec<ConstraintId> = world
        .constraints()
        .filter(|c| absorbed.contains(&c.a.body) || absorbed.contains(&c.b.body))
        .map(|c| c.id)
        .collect();

    for old_id in affected {
        let Some(old) = world.constraint(old_id).cloned() else {
            continue;
        };
        let moves_a = absorbed.contains(&old.a.body);
        let moves_b = absorbed.contains(&old.b.body);

        let mut desc = old.describe();
        if moves_a {
            desc.a = Endpoint::Body(reanchor(world, &old.a, compound)?);
        }
        if moves_b {
            desc.b = Endpoint::Body(reanchor(world, &old.b, compound)?);
        }

        world.remove_constraint(old_id);

        if moves_a && moves_b {
            // Both ends are inside the compound now; it would hold nothing
            registry.constraints.remove(&old_id);
            debug!("Dropped {:?}, both ends were absorbed", old_id);
            continue;
        }

        let new_id = world.add_constraint(&desc)?;
        if !registry.constraints.replace(&old_id, new_id) {
            registry.constraints.insert(new_id);
        }
        debug!("Retargeted {:?} -> {:?} onto {:?}", old_id, new_id, compound);
    }

    Ok(())
}
