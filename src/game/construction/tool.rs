// Construction tools - one begin/update/commit state machine per tool kind

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use log::{debug, info, warn};

use super::config::SandboxConfig;
use super::drag::{self, DragGrab, GrabOutcome};
use super::factory::{self, FactoryError, PropOverrides};
use super::merge;
use super::registry::Registry;
use super::resolver::{self, RejectReason};
use crate::engine::input::Modifiers;
use crate::engine::physics::{
    BodyId, BodyKind, ConstraintDesc, ConstraintId, ConstraintKind, PhysicsError, PhysicsWorld,
};

/// Kinds that joints and springs never attach to, on top of fruit
const JOINT_EXCLUDE: [BodyKind; 1] = [BodyKind::Ground];

/// The tool currently selected by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Wheel,
    Circle,
    Plank,
    Box,
    Joint,
    Spring,
    Lemon,
    Drag,
}

impl ToolKind {
    pub const ALL: [ToolKind; 8] = [
        Self::Wheel,
        Self::Circle,
        Self::Plank,
        Self::Box,
        Self::Joint,
        Self::Spring,
        Self::Lemon,
        Self::Drag,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Wheel => "wheel",
            Self::Circle => "circle",
            Self::Plank => "plank",
            Self::Box => "box",
            Self::Joint => "joint",
            Self::Spring => "spring",
            Self::Lemon => "lemon",
            Self::Drag => "drag",
        }
    }

    /// The body this tool places, if it places one
    pub fn body_kind(self) -> Option<BodyKind> {
        match self {
            Self::Wheel => Some(BodyKind::Wheel),
            Self::Circle => Some(BodyKind::Circle),
            Self::Plank => Some(BodyKind::Plank),
            Self::Box => Some(BodyKind::Box),
            Self::Lemon => Some(BodyKind::Lemon),
            Self::Joint | Self::Spring | Self::Drag => None,
        }
    }

    /// The constraint this tool places, if it places one
    pub fn constraint_kind(self) -> Option<ConstraintKind> {
        match self {
            Self::Joint => Some(ConstraintKind::Joint),
            Self::Spring => Some(ConstraintKind::Spring),
            _ => None,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| ConstructionError::UnknownTool(s.to_string()))
    }
}

/// Errors from driving a tool machine
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    #[error("A {0} gesture is already in progress")]
    SessionActive(ToolKind),

    #[error("No gesture in progress")]
    NoSession,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Shape error: {0}")]
    Factory(#[from] FactoryError),

    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),
}

/// Everything a tool needs to touch while it runs
pub struct Workbench<'a> {
    pub world: &'a mut PhysicsWorld,
    pub registry: &'a mut Registry,
    pub config: &'a SandboxConfig,
}

/// What the player sees while a gesture is in progress
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// A static stand-in body, replaced on every pointer move
    Body(BodyId),
    /// Not in the world yet; unattached ends are free points
    Constraint(ConstraintDesc),
    Grab(DragGrab),
    /// The gesture landed on nothing (or deleted what it landed on)
    Nothing,
}

/// One in-progress gesture
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub anchor: Vec2,
    pub pointer: Vec2,
    pub preview: Preview,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolState {
    Idle,
    Previewing(Session),
}

/// Result of a commit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommitOutcome {
    Body(BodyId),
    Constraint(ConstraintId),
    /// The constraint could not be attached; nothing was created
    Dropped(RejectReason),
    Released(BodyId),
    Nothing,
}

/// Per-tool gesture state machine.
///
/// `begin` opens a session, `update` follows the pointer and `commit` turns
/// the session into world objects. `cancel` throws the session away. At most
/// one session exists at a time.
#[derive(Debug)]
pub struct ToolMachine {
    kind: ToolKind,
    state: ToolState,
}

impl ToolMachine {
    pub fn new(kind: ToolKind) -> Self {
        Self {
            kind,
            state: ToolState::Idle,
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ToolState::Idle)
    }

    pub fn preview(&self) -> Option<&Preview> {
        match &self.state {
            ToolState::Idle => None,
            ToolState::Previewing(session) => Some(&session.preview),
        }
    }

    /// Switch tools. Ignored mid-gesture; returns whether the switch happened.
    pub fn set_kind(&mut self, kind: ToolKind) -> bool {
        if !self.is_idle() {
            debug!("Ignoring switch to {} while a {} gesture is open", kind, self.kind);
            return false;
        }
        self.kind = kind;
        true
    }

    pub fn begin(
        &mut self,
        bench: &mut Workbench<'_>,
        position: Vec2,
        modifiers: Modifiers,
    ) -> Result<(), ConstructionError> {
        if !self.is_idle() {
            return Err(ConstructionError::SessionActive(self.kind));
        }

        let preview = if self.kind == ToolKind::Drag {
            match drag::grab(bench.world, bench.registry, position, modifiers.double)? {
                GrabOutcome::Grabbed(grab) => Preview::Grab(grab),
                GrabOutcome::Deleted(_) | GrabOutcome::Missed => Preview::Nothing,
            }
        } else {
            build_preview(self.kind, bench, position, position)?
        };

        self.state = ToolState::Previewing(Session {
            anchor: position,
            pointer: position,
            preview,
        });
        Ok(())
    }

    pub fn update(
        &mut self,
        bench: &mut Workbench<'_>,
        position: Vec2,
    ) -> Result<(), ConstructionError> {
        let kind = self.kind;
        let ToolState::Previewing(session) = &mut self.state else {
            return Err(ConstructionError::NoSession);
        };
        session.pointer = position;

        match std::mem::replace(&mut session.preview, Preview::Nothing) {
            Preview::Grab(grab) => {
                session.preview = Preview::Grab(grab);
                drag::track(bench.world, &grab, position)?;
            }
            Preview::Body(id) => {
                bench.world.remove_body(id);
                session.preview = build_preview(kind, bench, session.anchor, position)?;
            }
            Preview::Constraint(_) => {
                session.preview = build_preview(kind, bench, session.anchor, position)?;
            }
            Preview::Nothing => {}
        }
        Ok(())
    }

    pub fn commit(
        &mut self,
        bench: &mut Workbench<'_>,
        position: Vec2,
        modifiers: Modifiers,
    ) -> Result<CommitOutcome, ConstructionError> {
        let ToolState::Previewing(session) = std::mem::replace(&mut self.state, ToolState::Idle)
        else {
            return Err(ConstructionError::NoSession);
        };

        match session.preview {
            Preview::Grab(grab) => {
                drag::track(bench.world, &grab, position)?;
                drag::release(bench.world, &grab)?;
                Ok(CommitOutcome::Released(grab.body))
            }
            Preview::Body(id) => {
                bench.world.remove_body(id);
                match self.kind.body_kind() {
                    Some(kind) => commit_body(kind, bench, session.anchor, position, modifiers),
                    None => Ok(CommitOutcome::Nothing),
                }
            }
            Preview::Constraint(_) => match self.kind.constraint_kind() {
                Some(kind) => commit_constraint(kind, bench, session.anchor, position),
                None => Ok(CommitOutcome::Nothing),
            },
            Preview::Nothing => Ok(CommitOutcome::Nothing),
        }
    }

    /// Discard the open session, if any. A held body gets its static flag back.
    pub fn cancel(&mut self, bench: &mut Workbench<'_>) -> bool {
        let ToolState::Previewing(session) = std::mem::replace(&mut self.state, ToolState::Idle)
        else {
            return false;
        };

        match session.preview {
            Preview::Body(id) => {
                bench.world.remove_body(id);
            }
            Preview::Grab(grab) => {
                if let Err(err) = drag::abandon(bench.world, &grab) {
                    warn!("Could not restore {:?} after cancel: {}", grab.body, err);
                }
            }
            Preview::Constraint(_) | Preview::Nothing => {}
        }
        debug!("Cancelled {} gesture", self.kind);
        true
    }
}

fn build_preview(
    kind: ToolKind,
    bench: &mut Workbench<'_>,
    anchor: Vec2,
    pointer: Vec2,
) -> Result<Preview, ConstructionError> {
    if let Some(body_kind) = kind.body_kind() {
        let desc = factory::create(
            body_kind,
            anchor,
            pointer,
            &PropOverrides::preview(),
            bench.config,
        )?;
        return Ok(Preview::Body(bench.world.spawn(&desc)));
    }
    if let Some(constraint_kind) = kind.constraint_kind() {
        return Ok(Preview::Constraint(resolver::preview(
            bench.world,
            constraint_kind,
            anchor,
            pointer,
            &JOINT_EXCLUDE,
            bench.config,
        )));
    }
    Ok(Preview::Nothing)
}

fn commit_body(
    kind: BodyKind,
    bench: &mut Workbench<'_>,
    anchor: Vec2,
    pointer: Vec2,
    modifiers: Modifiers,
) -> Result<CommitOutcome, ConstructionError> {
    let place_static = modifiers.shift && kind.can_be_static();
    let desc = factory::create(
        kind,
        anchor,
        pointer,
        &PropOverrides::with_static(place_static),
        bench.config,
    )?;
    let id = bench.world.spawn(&desc);

    let id = match kind {
        BodyKind::Wheel => {
            bench.registry.wheels.insert(id);
            id
        }
        BodyKind::Lemon => {
            bench.registry.lemons.insert(id);
            id
        }
        _ if place_static => id,
        _ => {
            let merged = merge::merge_if_overlapping(bench.world, bench.registry, id)?;
            bench.registry.non_static_parts.insert(merged);
            merged
        }
    };

    info!(
        "Placed {}{} as {:?}",
        if place_static { "static " } else { "" },
        kind.name(),
        id
    );
    Ok(CommitOutcome::Body(id))
}

fn commit_constraint(
    kind: ConstraintKind,
    bench: &mut Workbench<'_>,
    anchor: Vec2,
    pointer: Vec2,
) -> Result<CommitOutcome, ConstructionError> {
    match resolver::resolve(bench.world, anchor, pointer, &JOINT_EXCLUDE, bench.config) {
        Ok(resolution) => {
            let desc = resolver::describe(kind, &resolution, bench.config);
            let id = bench.world.add_constraint(&desc)?;
            bench.registry.constraints.insert(id);
            info!(
                "Placed {:?} {:?} between {:?} and {:?}",
                kind, id, resolution.a.body, resolution.b.body
            );
            Ok(CommitOutcome::Constraint(id))
        }
        Err(reason) => {
            debug!("Dropped {:?}: {}", kind, reason);
            Ok(CommitOutcome::Dropped(reason))
        }
    }
}
