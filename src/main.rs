use std::time::Instant;

use anyhow::Result;
use log::info;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

mod core;
mod engine;
mod game;

use engine::game_loop::SimulationClock;
use engine::input::InputManager;
use game::construction::{Sandbox, SandboxConfig};

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting citrohaul...");

    // The arena is 1000 x 1000 world units, one per logical pixel
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("citrohaul")
        .with_inner_size(winit::dpi::LogicalSize::new(1000, 1000))
        .with_resizable(true)
        .build(&event_loop)?;

    info!("Window created successfully");

    let mut input = InputManager::default();
    let mut sandbox = Sandbox::new(SandboxConfig::default());
    let mut clock = SimulationClock::new(Instant::now());

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, shutting down...");
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                for _ in 0..clock.begin_frame(Instant::now(), sandbox.is_running()) {
                    sandbox.step();
                }
            }
            Event::WindowEvent { event, .. } => {
                input.process_window_event(&event, window.scale_factor(), Instant::now());
                for input_event in input.drain() {
                    sandbox.handle(input_event);
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
