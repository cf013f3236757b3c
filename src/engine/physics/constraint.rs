use super::body::BodyId;
use crate::core::math;
use glam::Vec2;
use rapier2d::prelude::*;

/// Stable identifier of a live constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Holds its two anchors at a fixed distance
    Joint,
    /// Pulls its two anchors toward the rest length
    Spring,
}

/// A point fixed to a body, in the body's local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub body: BodyId,
    pub offset: Vec2,
}

/// One end of a constraint being described. `World` ends only exist while a
/// constraint is being previewed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    Body(Attachment),
    World(Vec2),
}

impl Endpoint {
    pub fn attachment(&self) -> Option<Attachment> {
        match *self {
            Self::Body(attachment) => Some(attachment),
            Self::World(_) => None,
        }
    }
}

/// Unvalidated description of a joint or spring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintDesc {
    pub kind: ConstraintKind,
    pub a: Endpoint,
    pub b: Endpoint,
    pub length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl ConstraintDesc {
    /// Zero rest length, drawn as a pin
    pub fn is_pin(&self) -> bool {
        self.length <= PIN_LENGTH
    }
}

/// Rest lengths at or below this are pins
pub const PIN_LENGTH: f32 = 1.0e-3;

/// A committed constraint, both ends on distinct live bodies
#[derive(Debug, Clone)]
pub struct Constraint {
    pub id: ConstraintId,
    pub kind: ConstraintKind,
    pub a: Attachment,
    pub b: Attachment,
    pub length: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub pin: bool,
    pub handle: ImpulseJointHandle,
}

impl Constraint {
    pub fn touches(&self, body: BodyId) -> bool {
        self.a.body == body || self.b.body == body
    }

    /// The same constraint, described again with new ends
    pub fn describe(&self) -> ConstraintDesc {
        ConstraintDesc {
            kind: self.kind,
            a: Endpoint::Body(self.a),
            b: Endpoint::Body(self.b),
            length: self.length,
            stiffness: self.stiffness,
            damping: self.damping,
        }
    }
}

/// Build the rapier joint for two attachments.
///
/// A joint pin is a revolute joint at the shared anchor. Everything else is a
/// spring joint, a zero-length spring included; a joint just uses a much
/// stiffer spring than a spring does.
pub(super) fn build_joint(
    kind: ConstraintKind,
    a: &Attachment,
    b: &Attachment,
    length: f32,
    stiffness: f32,
    damping: f32,
) -> GenericJoint {
    let anchor1 = math::to_na_point(a.offset);
    let anchor2 = math::to_na_point(b.offset);

    if kind == ConstraintKind::Joint && length <= PIN_LENGTH {
        RevoluteJointBuilder::new()
            .local_anchor1(anchor1)
            .local_anchor2(anchor2)
            .build()
            .into()
    } else {
        SpringJointBuilder::new(length, stiffness, damping)
            .local_anchor1(anchor1)
            .local_anchor2(anchor2)
            .build()
            .into()
    }
}
