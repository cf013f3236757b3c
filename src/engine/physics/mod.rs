// Physics system using rapier2d
//
// The rest of the game only ever sees `BodyId`/`ConstraintId`; rapier handles
// stay inside this module.

pub mod body;
mod collision;
pub mod constraint;
mod world;

pub use body::{Body, BodyDesc, BodyId, BodyKind, Geometry, Material, PartId, PartPlacement};
pub use collision::OverlapPair;
pub use constraint::{
    Attachment, Constraint, ConstraintDesc, ConstraintId, ConstraintKind, Endpoint,
};
pub use world::PhysicsWorld;

/// Errors raised by the physics wrapper
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("Body not found: {0:?}")]
    BodyNotFound(BodyId),

    #[error("Constraint not found: {0:?}")]
    ConstraintNotFound(ConstraintId),

    #[error("Constraint endpoint is not attached to a body")]
    UnattachedEndpoint,

    #[error("Constraint would join {0:?} to itself")]
    SelfConstraint(BodyId),

    #[error("Compound needs at least one part")]
    EmptyCompound,

    #[error("Ground cannot be part of a compound")]
    GroundPart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_error_display() {
        let err = PhysicsError::BodyNotFound(BodyId(7));
        assert_eq!(err.to_string(), "Body not found: BodyId(7)");
    }
}
