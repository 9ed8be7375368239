//! ghost_drive - turn-based driving puzzle simulation
//!
//! Headless runner for the simulation core. It:
//! - loads a level definition and car tuning from the environment
//! - drives the fixed-step simulation from a tokio interval
//! - feeds steering input from a drive script or stdin
//! - synthesizes the classified contact events the core consumes
//!   (the core itself owns no collision detection)

mod config;
mod events;
mod hooks;
mod level;
mod sim;

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::events::{ContactKind, SignalBus};
use crate::hooks::{SingleScene, TracingPresenter};
use crate::level::{Level, LevelDef, MarkerKind, ObstacleDef};
use crate::sim::{CarId, Rotation};

/// Overlap radius used by the demo proximity probe
const CONTACT_RADIUS: f32 = 0.5;

/// Scripted steering input, keyed by driver tick
#[derive(Debug, Clone, Deserialize)]
struct ScriptedInput {
    at_tick: u64,
    rotation: Rotation,
}

#[derive(Debug, Clone, Deserialize)]
struct DriveScript {
    inputs: Vec<ScriptedInput>,
}

impl DriveScript {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting ghost_drive simulation");
    info!("Level file: {}", config.level_path.display());

    let def = LevelDef::from_path(&config.level_path)?;
    let obstacles = def.obstacles.clone();

    let mut bus = SignalBus::new();
    bus.subscribe(|signal| {
        let encoded = serde_json::to_string(signal).unwrap_or_default();
        info!(signal = %encoded, "level signal");
    });

    let mut level = Level::new(
        &def,
        config.car_tuning(),
        bus,
        Box::new(TracingPresenter),
        Box::new(SingleScene),
    )?;
    level.start_level();

    let script = match &config.script_path {
        Some(path) => {
            info!("Drive script: {}", path.display());
            Some(DriveScript::from_path(path)?)
        }
        None => {
            info!("No drive script; reading steering from stdin (l/r/s, q to quit)");
            None
        }
    };

    let mut input_rx = match script {
        Some(_) => None,
        None => Some(spawn_stdin_reader()),
    };

    let tick_duration = Duration::from_secs_f32(config.movement_precision);
    let mut tick_interval = interval(tick_duration);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut driver_tick: u64 = 0;

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, stopping simulation");
                break;
            }
        }

        driver_tick += 1;

        // Deliver pending inputs before the simulation step; buffered input
        // applies on the upcoming tick, never retroactively.
        match (&script, input_rx.as_mut()) {
            (Some(script), _) => {
                for input in script.inputs.iter().filter(|i| i.at_tick == driver_tick) {
                    level.player_input(input.rotation);
                }
            }
            (None, Some(rx)) => {
                while let Ok(command) = rx.try_recv() {
                    match command {
                        InputCommand::Steer(rotation) => level.player_input(rotation),
                        InputCommand::Quit => {
                            info!("Quit requested");
                            return Ok(());
                        }
                    }
                }
            }
            (None, None) => {}
        }

        level.tick();

        for (car_id, contact) in detect_contacts(&level, &obstacles) {
            level.report_contact(car_id, contact);
        }

        if driver_tick % 50 == 0 {
            log_status(&level, driver_tick);
        }

        if level.is_complete() {
            info!(played_turns = level.played_turns(), "level complete");
            level.advance_to_next_level();
            break;
        }

        if let Some(script) = &script {
            let script_done = script.inputs.iter().all(|i| i.at_tick <= driver_tick);
            let nothing_moving = level.cars().iter().all(|c| !c.is_moving());
            if script_done && nothing_moving && !level.is_turn_started() {
                warn!("drive script exhausted before the level completed");
                break;
            }
        }
    }

    info!("Simulation shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

#[derive(Debug, Clone, Copy)]
enum InputCommand {
    Steer(Rotation),
    Quit,
}

/// Read steering commands from stdin on a background task
fn spawn_stdin_reader() -> mpsc::Receiver<InputCommand> {
    let (tx, rx) = mpsc::channel(64);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let command = match line.trim() {
                "l" | "left" => InputCommand::Steer(Rotation::Left),
                "r" | "right" => InputCommand::Steer(Rotation::Right),
                "s" | "straight" => InputCommand::Steer(Rotation::Straight),
                "q" | "quit" => InputCommand::Quit,
                "" => continue,
                other => {
                    warn!(input = other, "unrecognized steering command");
                    continue;
                }
            };
            if tx.send(command).await.is_err() {
                break;
            }
        }
    });

    rx
}

/// Periodic simulation status for debugging
fn log_status(level: &Level, driver_tick: u64) {
    debug!(
        driver_tick,
        turn = level.current_turn_index(),
        initiated = level.is_turn_initiated(),
        started = level.is_turn_started(),
        frozen = level.is_frozen(),
        "level status"
    );
    for car in level.cars() {
        debug!(
            car_id = %car.id(),
            role = ?car.role(),
            turn = car.turn_index(),
            tick = car.tick_count(),
            x = car.pose().x,
            y = car.pose().y,
            speed = car.speed(),
            rotation = ?car.rotation(),
            "car status"
        );
    }
}

/// Proximity probe standing in for an engine's overlap detection
///
/// Only moving cars report contacts; a car resting on a marker after a reset
/// must not re-trigger it.
fn detect_contacts(level: &Level, obstacles: &[ObstacleDef]) -> Vec<(CarId, ContactKind)> {
    let mut contacts = Vec::new();
    let cars = level.cars();

    for (i, car) in cars.iter().enumerate() {
        if !car.is_moving() {
            continue;
        }
        let pose = car.pose();

        for (j, other) in cars.iter().enumerate() {
            if i == j {
                continue;
            }
            let other_pose = other.pose();
            if distance(pose.x, pose.y, other_pose.x, other_pose.y) <= CONTACT_RADIUS * 2.0 {
                contacts.push((car.id(), ContactKind::Car));
            }
        }

        for obstacle in obstacles {
            if distance(pose.x, pose.y, obstacle.x, obstacle.y) <= obstacle.radius + CONTACT_RADIUS
            {
                contacts.push((car.id(), ContactKind::Obstacle));
            }
        }

        for marker in level.markers() {
            if let MarkerKind::Exit { turn_index } = marker.kind {
                if distance(pose.x, pose.y, marker.x, marker.y) <= CONTACT_RADIUS * 2.0 {
                    contacts.push((car.id(), ContactKind::Exit { turn_index }));
                }
            }
        }
    }

    contacts
}

fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}
