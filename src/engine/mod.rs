// Engine modules: physics, input, simulation timing

pub mod game_loop;
pub mod input;
pub mod physics;
