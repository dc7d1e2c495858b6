//! Lanerace headless runner.
//!
//! Drives the simulation core without a renderer:
//! - **bevy_ecs** world holding every body and resource
//! - typed event bus and collision system wiring the collaborators together
//! - scripted control intent instead of keyboard capture
//!
//! # Project Structure
//!
//! - [`lanerace::components`] – ECS components (position, collider, category, vehicles, tint)
//! - [`lanerace::events`] – event bus and event types
//! - [`lanerace::game`] – simulation assembly and render snapshots
//! - [`lanerace::resources`] – ECS resources (collision system, physics, traffic, config)
//! - [`lanerace::systems`] – listeners and per-frame passes
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (defaults when missing or invalid)
//! 2. Build the simulation and spawn the controlled vehicle
//! 3. For every frame: update the control intent, tick, optionally print a snapshot
//! 4. On game over either restart or stop, then log a summary
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --frames 3600 --throttle --weave
//! ```

use clap::Parser;
use log::{error, info};

use lanerace::error::SimError;
use lanerace::events::input::ControlIntent;
use lanerace::game::Simulation;
use lanerace::resources::gameconfig::SimConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Headless lane racing simulation")]
struct Cli {
    /// Path to the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: String,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Seconds per frame.
    #[arg(long, value_name = "SECONDS", default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Seed for a deterministic run.
    #[arg(long)]
    seed: Option<u64>,

    /// Hold the accelerator.
    #[arg(long)]
    throttle: bool,

    /// Steer left and right, switching every second.
    #[arg(long)]
    weave: bool,

    /// Start over after a game over instead of stopping.
    #[arg(long)]
    restart: bool,

    /// Print one JSON snapshot per frame on stdout.
    #[arg(long)]
    json: bool,
}

fn intent_at(cli: &Cli, elapsed: f32) -> ControlIntent {
    let left = cli.weave && (elapsed as u64) % 2 == 0;
    ControlIntent {
        forward: cli.throttle,
        back: false,
        left,
        right: cli.weave && !left,
    }
}

fn print_snapshot(sim: &Simulation) -> Result<(), SimError> {
    let line = serde_json::to_string(&sim.snapshot())?;
    println!("{}", line);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = SimConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        info!("Using default configuration: {}", e);
    }

    let mut sim = match cli.seed {
        Some(seed) => Simulation::with_seed(config, seed),
        None => Simulation::new(config),
    };
    sim.spawn_controlled_vehicle();

    let mut intent = ControlIntent::default();
    let mut games = 1u32;
    let mut best_score = 0u32;
    let mut elapsed = 0.0f32;

    for _ in 0..cli.frames {
        let next = intent_at(&cli, elapsed);
        if next != intent {
            intent = next;
            sim.set_controls(intent);
        }

        if !sim.tick(cli.dt) {
            best_score = best_score.max(sim.score());
            if !cli.restart {
                break;
            }
            info!("Game {} over with score {}, restarting", games, sim.score());
            games += 1;
            sim.restart();
            continue;
        }
        elapsed += cli.dt;

        if cli.json
            && let Err(e) = print_snapshot(&sim)
        {
            error!("Failed to print snapshot: {}", e);
        }
    }

    let last = sim.snapshot();
    best_score = best_score.max(last.score);
    info!(
        "Finished after {} frames: games={}, best score={}, distance={:.1}, state={:?}",
        last.frame, games, best_score, last.distance, last.state
    );
}
