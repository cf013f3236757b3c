/// Simulation timing
///
/// Fixed timestep physics driven from a variable-rate window loop. The clock
/// only decides how many steps to run; the caller runs them.
use std::time::{Duration, Instant};

/// Physics rate (60 steps per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const FIXED_TIMESTEP_DURATION: Duration = Duration::from_micros(16_667); // ~1/60 second

/// Maximum number of physics steps per frame to prevent spiral of death
pub const MAX_PHYSICS_STEPS: u32 = 5;

pub struct SimulationClock {
    /// Time owed to the simulation
    accumulator: Duration,

    last_frame_time: Instant,

    frame_count: u64,

    /// Total steps handed out
    step_count: u64,
}

impl SimulationClock {
    pub fn new(now: Instant) -> Self {
        Self {
            accumulator: Duration::ZERO,
            last_frame_time: now,
            frame_count: 0,
            step_count: 0,
        }
    }

    /// Begin a new frame, returns the number of fixed steps to run.
    ///
    /// While the simulation is paused no time accumulates, so resuming does
    /// not replay the pause as a burst of steps.
    pub fn begin_frame(&mut self, now: Instant, running: bool) -> u32 {
        let frame_time = now.saturating_duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.frame_count += 1;

        if !running {
            self.accumulator = Duration::ZERO;
            return 0;
        }

        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= FIXED_TIMESTEP_DURATION && steps < MAX_PHYSICS_STEPS {
            self.accumulator -= FIXED_TIMESTEP_DURATION;
            steps += 1;
        }
        // Drop what could not be caught up on
        if steps == MAX_PHYSICS_STEPS {
            self.accumulator = Duration::ZERO;
        }

        self.step_count += steps as u64;
        steps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}
