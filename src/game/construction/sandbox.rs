// Sandbox - owns the world and routes input to the active tool

use glam::Vec2;
use log::{debug, info, warn};

use super::config::SandboxConfig;
use super::factory;
use super::registry::Registry;
use super::tool::{CommitOutcome, ConstructionError, ToolKind, ToolMachine, Workbench};
use crate::core::math;
use crate::engine::game_loop::FIXED_TIMESTEP;
use crate::engine::input::{Action, InputEvent, Modifiers, PointerPhase};
use crate::engine::physics::{
    BodyDesc, BodyKind, ConstraintId, ConstraintKind, Geometry, PhysicsWorld,
};

/// Arena floor: centre and size
const GROUND_POSITION: Vec2 = Vec2::new(0.0, 1000.0);
const GROUND_SIZE: Vec2 = Vec2::new(8000.0, 80.0);

/// Static blocks in the corners of the arena
const CORNER_BLOCKS: [Vec2; 4] = [
    Vec2::new(50.0, 50.0),
    Vec2::new(50.0, 950.0),
    Vec2::new(950.0, 50.0),
    Vec2::new(950.0, 950.0),
];
const CORNER_BLOCK_SIZE: f32 = 80.0;

/// RGBA colours for drawing constraints
const JOINT_COLOUR: [f32; 4] = [0.25, 0.25, 0.3, 1.0];
const SPRING_COLOUR: [f32; 4] = [0.85, 0.55, 0.1, 1.0];
const RUNNING_ALPHA: f32 = 0.5;

/// How a constraint should be drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintStyle {
    pub stroke: [f32; 4],
    /// Draw a pin marker instead of a line
    pub pin: bool,
}

/// The construction sandbox: world, registry, active tool and run state.
pub struct Sandbox {
    world: PhysicsWorld,
    registry: Registry,
    config: SandboxConfig,
    tool: ToolMachine,
    running: bool,
}

impl Sandbox {
    pub fn new(config: SandboxConfig) -> Self {
        let mut world = PhysicsWorld::with_gravity(config.gravity);
        world.set_timestep(FIXED_TIMESTEP);
        seed_arena(&mut world);

        info!("Sandbox ready with {} arena bodies", world.body_count());
        Self {
            world,
            registry: Registry::new(),
            config,
            tool: ToolMachine::new(ToolKind::Wheel),
            running: false,
        }
    }

    /// Route one normalized input event. Failures are logged, never fatal.
    pub fn handle(&mut self, event: InputEvent) {
        let result = match event {
            InputEvent::Pointer(pointer) => match pointer.phase {
                PointerPhase::Down => self.pointer_down(pointer.position, pointer.modifiers),
                PointerPhase::Move => self.pointer_move(pointer.position),
                PointerPhase::Up => self
                    .pointer_up(pointer.position, pointer.modifiers)
                    .map(|_| ()),
            },
            InputEvent::Action(action) => {
                self.apply(action);
                Ok(())
            }
        };

        if let Err(err) = result {
            warn!("Ignored input: {}", err);
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SelectTool(kind) => {
                self.select_tool(kind);
            }
            Action::ToggleRun => {
                self.toggle_running();
            }
            Action::DriveForward => self.turn_wheels(1.0),
            Action::DriveBackward => self.turn_wheels(-1.0),
            Action::Cancel => {
                self.cancel();
            }
        }
    }

    pub fn pointer_down(
        &mut self,
        position: Vec2,
        modifiers: Modifiers,
    ) -> Result<(), ConstructionError> {
        let Self {
            world,
            registry,
            config,
            tool,
            ..
        } = self;
        tool.begin(
            &mut Workbench {
                world,
                registry,
                config,
            },
            position,
            modifiers,
        )
    }

    /// Pointer moves with no gesture open are ordinary hovering
    pub fn pointer_move(&mut self, position: Vec2) -> Result<(), ConstructionError> {
        if self.tool.is_idle() {
            return Ok(());
        }
        let Self {
            world,
            registry,
            config,
            tool,
            ..
        } = self;
        tool.update(
            &mut Workbench {
                world,
                registry,
                config,
            },
            position,
        )
    }

    pub fn pointer_up(
        &mut self,
        position: Vec2,
        modifiers: Modifiers,
    ) -> Result<CommitOutcome, ConstructionError> {
        let Self {
            world,
            registry,
            config,
            tool,
            ..
        } = self;
        tool.commit(
            &mut Workbench {
                world,
                registry,
                config,
            },
            position,
            modifiers,
        )
    }

    /// Abandon the gesture in progress
    pub fn cancel(&mut self) -> bool {
        let Self {
            world,
            registry,
            config,
            tool,
            ..
        } = self;
        tool.cancel(&mut Workbench {
            world,
            registry,
            config,
        })
    }

    /// Switch tools; ignored while a gesture is open
    pub fn select_tool(&mut self, kind: ToolKind) -> bool {
        let switched = self.tool.set_kind(kind);
        if switched {
            info!("Tool: {}", kind);
        }
        switched
    }

    pub fn select_tool_by_name(&mut self, name: &str) -> bool {
        match name.parse::<ToolKind>() {
            Ok(kind) => self.select_tool(kind),
            Err(err) => {
                warn!("{}", err);
                false
            }
        }
    }

    /// Start or pause the simulation; returns whether it is now running
    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        info!(
            "Simulation {}",
            if self.running { "running" } else { "paused" }
        );
        self.running
    }

    /// Spin every registered wheel. Heavier wheels respond less, and no wheel
    /// goes past the speed limit in either direction.
    pub fn turn_wheels(&mut self, direction: f32) {
        let limit = self.config.max_angular_velocity;
        let wheels: Vec<_> = self.registry.wheels.iter().collect();

        for id in wheels {
            if self.world.is_static(id).unwrap_or(true) {
                continue;
            }
            let (Some(mass), Some(angvel)) = (self.world.mass(id), self.world.angular_velocity(id))
            else {
                continue;
            };
            let delta =
                direction * self.config.wheel_torque / (mass + self.config.wheel_responsiveness);
            let target = math::clamp(angvel + delta, -limit, limit);
            if let Err(err) = self.world.set_angular_velocity(id, target) {
                warn!("Could not turn wheel {:?}: {}", id, err);
            }
        }
    }

    /// Advance the physics one fixed step if running
    pub fn step(&mut self) -> bool {
        if self.running {
            self.world.step();
        }
        self.running
    }

    /// Average position of all fruit, for the camera to follow
    pub fn fruit_centroid(&self) -> Option<Vec2> {
        let positions: Vec<Vec2> = self
            .registry
            .lemons
            .iter()
            .filter_map(|id| self.world.position(id))
            .collect();
        if positions.is_empty() {
            return None;
        }
        Some(positions.iter().copied().sum::<Vec2>() / positions.len() as f32)
    }

    pub fn constraint_style(&self, id: ConstraintId) -> Option<ConstraintStyle> {
        let constraint = self.world.constraint(id)?;
        let mut stroke = match constraint.kind {
            ConstraintKind::Joint => JOINT_COLOUR,
            ConstraintKind::Spring => SPRING_COLOUR,
        };
        if self.running {
            stroke[3] *= RUNNING_ALPHA;
        }
        Some(ConstraintStyle {
            stroke,
            pin: constraint.pin,
        })
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tool(&self) -> &ToolMachine {
        &self.tool
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new(SandboxConfig::default())
    }
}

fn seed_arena(world: &mut PhysicsWorld) {
    world.spawn(&BodyDesc {
        material: factory::default_material(BodyKind::Ground),
        ..BodyDesc::fixed(
            BodyKind::Ground,
            GROUND_POSITION,
            Geometry::Rect {
                width: GROUND_SIZE.x,
                height: GROUND_SIZE.y,
            },
        )
    });

    for corner in CORNER_BLOCKS {
        world.spawn(&BodyDesc {
            material: factory::default_material(BodyKind::Box),
            ..BodyDesc::fixed(
                BodyKind::Box,
                corner,
                Geometry::Rect {
                    width: CORNER_BLOCK_SIZE,
                    height: CORNER_BLOCK_SIZE,
                },
            )
        });
    }
    debug!("Seeded arena");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::PointerEvent;
    use crate::engine::physics::BodyId;
    use crate::game::construction::resolver::RejectReason;
    use approx::assert_relative_eq;

    fn drag(sandbox: &mut Sandbox, from: Vec2, to: Vec2, modifiers: Modifiers) -> CommitOutcome {
        sandbox.pointer_down(from, modifiers).unwrap();
        sandbox.pointer_move(to).unwrap();
        sandbox.pointer_up(to, modifiers).unwrap()
    }

    fn pointer(phase: PointerPhase, x: f32, y: f32) -> InputEvent {
        InputEvent::Pointer(PointerEvent {
            phase,
            position: Vec2::new(x, y),
            modifiers: Modifiers::default(),
        })
    }

    fn place_wheel(sandbox: &mut Sandbox, at: Vec2) -> BodyId {
        sandbox.select_tool(ToolKind::Wheel);
        match drag(sandbox, at, at + Vec2::new(20.0, 0.0), Modifiers::default()) {
            CommitOutcome::Body(id) => id,
            other => panic!("expected a wheel, got {:?}", other),
        }
    }

    #[test]
    fn test_new_sandbox_seeds_arena() {
        let sandbox = Sandbox::default();
        assert_eq!(sandbox.world().body_count(), 5);
        assert!(!sandbox.is_running());
        assert!(sandbox.registry().non_static_parts.is_empty());
        assert!(sandbox
            .world()
            .bodies()
            .all(|body| body.is_static));
        assert_eq!(
            sandbox
                .world()
                .bodies()
                .filter(|body| body.kind == BodyKind::Ground)
                .count(),
            1
        );
    }

    #[test]
    fn test_events_drive_the_tool() {
        let mut sandbox = Sandbox::default();
        sandbox.handle(InputEvent::Action(Action::SelectTool(ToolKind::Circle)));
        sandbox.handle(pointer(PointerPhase::Move, 500.0, 500.0));
        sandbox.handle(pointer(PointerPhase::Down, 500.0, 500.0));
        sandbox.handle(pointer(PointerPhase::Move, 530.0, 500.0));
        sandbox.handle(pointer(PointerPhase::Up, 530.0, 500.0));

        assert_eq!(sandbox.registry().non_static_parts.len(), 1);
        assert_eq!(sandbox.world().body_count(), 6);
        assert!(sandbox.tool().is_idle());
    }

    #[test]
    fn test_stray_pointer_up_is_ignored() {
        let mut sandbox = Sandbox::default();
        sandbox.handle(pointer(PointerPhase::Up, 500.0, 500.0));
        assert_eq!(sandbox.world().body_count(), 5);
    }

    #[test]
    fn test_tool_switch_waits_for_gesture() {
        let mut sandbox = Sandbox::default();
        sandbox.select_tool(ToolKind::Plank);
        sandbox
            .pointer_down(Vec2::new(400.0, 400.0), Modifiers::default())
            .unwrap();

        sandbox.handle(InputEvent::Action(Action::SelectTool(ToolKind::Lemon)));
        assert_eq!(sandbox.tool().kind(), ToolKind::Plank);

        sandbox.handle(InputEvent::Action(Action::Cancel));
        assert!(sandbox.tool().is_idle());
        assert_eq!(sandbox.world().body_count(), 5);

        assert!(sandbox.select_tool_by_name("lemon"));
        assert_eq!(sandbox.tool().kind(), ToolKind::Lemon);
        assert!(!sandbox.select_tool_by_name("anvil"));
        assert_eq!(sandbox.tool().kind(), ToolKind::Lemon);
    }

    #[test]
    fn test_wheel_speed_is_clamped() {
        let mut sandbox = Sandbox::default();
        let wheel = place_wheel(&mut sandbox, Vec2::new(500.0, 500.0));
        let config = sandbox.config().clone();

        sandbox.turn_wheels(-1.0);
        let mass = sandbox.world().mass(wheel).unwrap();
        assert_relative_eq!(
            sandbox.world().angular_velocity(wheel).unwrap(),
            -config.wheel_torque / (mass + config.wheel_responsiveness),
            epsilon = 1e-4
        );

        for _ in 0..500 {
            sandbox.turn_wheels(1.0);
        }
        assert_relative_eq!(
            sandbox.world().angular_velocity(wheel).unwrap(),
            config.max_angular_velocity
        );

        for _ in 0..1000 {
            sandbox.apply(Action::DriveBackward);
        }
        assert_relative_eq!(
            sandbox.world().angular_velocity(wheel).unwrap(),
            -config.max_angular_velocity
        );
    }

    #[test]
    fn test_physics_only_steps_while_running() {
        let mut sandbox = Sandbox::default();
        sandbox.select_tool(ToolKind::Lemon);
        let at = Vec2::new(500.0, 400.0);
        drag(&mut sandbox, at, at, Modifiers::default());
        let lemon = sandbox.registry().lemons.iter().next().unwrap();

        for _ in 0..10 {
            assert!(!sandbox.step());
        }
        assert_eq!(sandbox.world().position(lemon), Some(at));

        sandbox.handle(InputEvent::Action(Action::ToggleRun));
        for _ in 0..10 {
            assert!(sandbox.step());
        }
        assert!(sandbox.world().position(lemon).unwrap().y > at.y);
    }

    #[test]
    fn test_fruit_centroid() {
        let mut sandbox = Sandbox::default();
        assert_eq!(sandbox.fruit_centroid(), None);

        sandbox.select_tool(ToolKind::Lemon);
        for at in [Vec2::new(300.0, 300.0), Vec2::new(500.0, 400.0)] {
            drag(&mut sandbox, at, at, Modifiers::default());
        }
        let centroid = sandbox.fruit_centroid().unwrap();
        assert_relative_eq!(centroid.x, 400.0, epsilon = 1e-4);
        assert_relative_eq!(centroid.y, 350.0, epsilon = 1e-4);
    }

    #[test]
    fn test_pin_and_style() {
        let mut sandbox = Sandbox::default();
        sandbox.select_tool(ToolKind::Box);
        drag(
            &mut sandbox,
            Vec2::new(400.0, 500.0),
            Vec2::new(600.0, 520.0),
            Modifiers::default(),
        );
        place_wheel(&mut sandbox, Vec2::new(580.0, 510.0));

        // A click on the axle pins the wheel to the box under it
        sandbox.select_tool(ToolKind::Joint);
        let click = Vec2::new(582.0, 511.0);
        let CommitOutcome::Constraint(pin) = drag(&mut sandbox, click, click, Modifiers::default())
        else {
            panic!("expected a pin");
        };

        let style = sandbox.constraint_style(pin).unwrap();
        assert!(style.pin);
        assert_eq!(style.stroke, JOINT_COLOUR);

        sandbox.toggle_running();
        let running = sandbox.constraint_style(pin).unwrap();
        assert!(running.stroke[3] < style.stroke[3]);
    }

    #[test]
    fn test_ground_is_never_a_joint_target() {
        let mut sandbox = Sandbox::default();
        let wheel = place_wheel(&mut sandbox, Vec2::new(500.0, 800.0));

        sandbox.select_tool(ToolKind::Spring);
        let outcome = drag(
            &mut sandbox,
            Vec2::new(500.0, 800.0),
            Vec2::new(500.0, 990.0),
            Modifiers::default(),
        );
        assert_eq!(
            outcome,
            CommitOutcome::Dropped(RejectReason::Unattached)
        );
        assert!(sandbox.world().constraints_attached_to(wheel).is_empty());
    }
}
