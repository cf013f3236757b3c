// Drag tool: pick up, move and delete what has been built

use glam::Vec2;
use log::{debug, info};

use super::registry::Registry;
use crate::engine::physics::{BodyId, BodyKind, PhysicsError, PhysicsWorld};

/// A body held by the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGrab {
    pub body: BodyId,
    /// Restored on release; a held body is always static
    pub was_static: bool,
    /// Body position relative to the pointer, fixed for the whole drag
    pub grab_offset: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrabOutcome {
    Grabbed(DragGrab),
    Deleted(BodyId),
    Missed,
}

/// Topmost body under `point` that the player is allowed to move
pub fn pick(world: &PhysicsWorld, point: Vec2) -> Option<BodyId> {
    world.bodies_at(point).into_iter().find(|&id| {
        world
            .body(id)
            .map(|body| body.kind != BodyKind::Ground)
            .unwrap_or(false)
    })
}

/// Start a drag at `point`. A double activation deletes the body instead.
pub fn grab(
    world: &mut PhysicsWorld,
    registry: &mut Registry,
    point: Vec2,
    double: bool,
) -> Result<GrabOutcome, PhysicsError> {
    let Some(body) = pick(world, point) else {
        return Ok(GrabOutcome::Missed);
    };

    if double {
        delete(world, registry, body)?;
        return Ok(GrabOutcome::Deleted(body));
    }

    let was_static = world
        .is_static(body)
        .ok_or(PhysicsError::BodyNotFound(body))?;
    let position = world
        .position(body)
        .ok_or(PhysicsError::BodyNotFound(body))?;
    world.set_static(body, true)?;

    debug!("Grabbed {:?}", body);
    Ok(GrabOutcome::Grabbed(DragGrab {
        body,
        was_static,
        grab_offset: position - point,
    }))
}

/// Remove a body together with its constraints and registry entries.
/// Returns how many constraints went with it.
pub fn delete(
    world: &mut PhysicsWorld,
    registry: &mut Registry,
    body: BodyId,
) -> Result<usize, PhysicsError> {
    if !world.contains_body(body) {
        return Err(PhysicsError::BodyNotFound(body));
    }

    let attached = world.constraints_attached_to(body);
    for id in &attached {
        world.remove_constraint(*id);
        registry.constraints.remove(id);
    }
    registry.forget_body(body);
    world.remove_body(body);

    info!("Deleted {:?} and {} constraints", body, attached.len());
    Ok(attached.len())
}

pub fn track(world: &mut PhysicsWorld, grab: &DragGrab, pointer: Vec2) -> Result<(), PhysicsError> {
    world.set_position(grab.body, pointer + grab.grab_offset)
}

/// Let go of a body. Constraints on it take their current span as the new
/// rest length, except pins.
pub fn release(world: &mut PhysicsWorld, grab: &DragGrab) -> Result<(), PhysicsError> {
    world.set_static(grab.body, grab.was_static)?;

    for id in world.constraints_attached_to(grab.body) {
        let Some(constraint) = world.constraint(id) else {
            continue;
        };
        if constraint.pin {
            continue;
        }
        let (Some(a), Some(b)) = (
            world.anchor_position(&constraint.a),
            world.anchor_position(&constraint.b),
        ) else {
            continue;
        };
        let length = a.distance(b);
        world.set_constraint_length(id, length)?;
    }

    debug!("Released {:?}", grab.body);
    Ok(())
}

/// Drop a grab without adjusting anything but the static flag
pub fn abandon(world: &mut PhysicsWorld, grab: &DragGrab) -> Result<(), PhysicsError> {
    world.set_static(grab.body, grab.was_static)
}
