use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;

use crossroads_sim::arcade::{self, Decoration, MemoryStore, RunnerGame, RunnerTick, Wallet};
use crossroads_sim::simulation::{Direction, IntersectionSim, LogObserver, ManualClock, SimConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Signalised intersection with vehicles and pedestrians
    Traffic,
    /// Lane runner played by a simple autopilot
    Runner,
}

#[derive(Parser)]
#[command(name = "crossroads_sim")]
#[command(about = "Intersection simulation and lane runner, headless or with a UI")]
struct Cli {
    /// Run the intersection with the Bevy game engine UI
    #[arg(long)]
    ui: bool,

    /// Which simulation to run headless
    #[arg(long, value_enum, default_value_t = Mode::Traffic)]
    mode: Mode,

    /// Number of simulation ticks to run in headless mode
    #[arg(long, default_value = "3000")]
    ticks: u32,

    /// Simulated milliseconds per tick
    #[arg(long, default_value = "16")]
    tick_ms: u64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Vehicles spawned per second
    #[arg(long)]
    spawn_rate: Option<f32>,

    /// Green phase length in milliseconds
    #[arg(long)]
    green_ms: Option<u64>,

    /// Yellow phase length in milliseconds
    #[arg(long)]
    yellow_ms: Option<u64>,

    /// Pedestrian walk phase length in milliseconds
    #[arg(long)]
    walk_ms: Option<u64>,

    /// Car speed in world units per tick
    #[arg(long)]
    car_speed: Option<f32>,

    /// Truck speed in world units per tick
    #[arg(long)]
    truck_speed: Option<f32>,

    /// Probability that a new vehicle turns left
    #[arg(long)]
    left_turn_probability: Option<f32>,

    /// Probability that a new vehicle is a truck
    #[arg(long)]
    truck_probability: Option<f32>,

    /// Request a pedestrian crossing at start-up (repeatable)
    #[arg(long = "request")]
    requests: Vec<Direction>,

    /// Print the summary and a map once per simulated second
    #[arg(long)]
    map: bool,
}

impl Cli {
    fn sim_config(&self) -> Result<SimConfig> {
        let defaults = SimConfig::default();
        let config = SimConfig {
            spawn_rate: self.spawn_rate.unwrap_or(defaults.spawn_rate),
            green_duration_ms: self.green_ms.unwrap_or(defaults.green_duration_ms),
            yellow_duration_ms: self.yellow_ms.unwrap_or(defaults.yellow_duration_ms),
            pedestrian_duration_ms: self.walk_ms.unwrap_or(defaults.pedestrian_duration_ms),
            car_speed: self.car_speed.unwrap_or(defaults.car_speed),
            truck_speed: self.truck_speed.unwrap_or(defaults.truck_speed),
            left_turn_probability: self
                .left_turn_probability
                .unwrap_or(defaults.left_turn_probability),
            truck_probability: self.truck_probability.unwrap_or(defaults.truck_probability),
        };
        config.validate()?;
        Ok(config.sanitized())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.sim_config()?;

    if cli.ui {
        #[cfg(feature = "ui")]
        {
            run_with_ui(config, &cli.requests);
            return Ok(());
        }
        #[cfg(not(feature = "ui"))]
        {
            anyhow::bail!("UI feature is not enabled. Rebuild with --features ui");
        }
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,crossroads_sim=info"),
    )
    .init();

    match cli.mode {
        Mode::Traffic => run_headless(&cli, config),
        Mode::Runner => run_runner(&cli),
    }
}

/// Run the intersection in headless mode (no graphics)
fn run_headless(cli: &Cli, config: SimConfig) -> Result<()> {
    let tick_ms = cli.tick_ms.max(1);
    println!("Running intersection simulation in headless mode...");
    println!("Ticks: {}, Tick: {}ms", cli.ticks, tick_ms);

    let ticks_per_second = (1000 / tick_ms).max(1) as u32;
    println!("Running {} ticks per second (simulated time)", ticks_per_second);
    println!();

    let clock = Arc::new(ManualClock::new(0));
    let mut sim = match cli.seed {
        Some(seed) => IntersectionSim::with_clock_and_seed(config, clock.clone(), seed),
        None => IntersectionSim::with_clock(config, clock.clone()),
    };
    let mut observer = LogObserver::default();

    for direction in &cli.requests {
        sim.request_crossing(*direction, &mut observer);
    }

    println!("Initial state:");
    sim.print_summary();
    if cli.map {
        sim.draw_map();
    }
    println!();

    for tick in 1..=cli.ticks {
        clock.advance(tick_ms);
        sim.tick(&mut observer);

        if cli.map && tick % ticks_per_second == 0 {
            println!(
                "--- After tick {} ({:.1}s simulated time) ---",
                tick,
                sim.time_ms() as f64 / 1000.0
            );
            sim.print_summary();
            sim.draw_map();
            println!();
        }
    }

    println!("=== Final State ===");
    sim.print_summary();
    sim.log_summary();
    Ok(())
}

/// Play the runner headless with an autopilot that dodges what it can
fn run_runner(cli: &Cli) -> Result<()> {
    let tick_ms = cli.tick_ms.max(1);
    let mut wallet = Wallet::open(Box::new(MemoryStore::default()))?;
    let mut game = match cli.seed {
        Some(seed) => RunnerGame::new_with_seed(seed),
        None => RunnerGame::new(),
    };

    game.start(0);
    let mut now_ms = 0;
    let mut ended = None;
    for _ in 0..cli.ticks {
        now_ms += tick_ms;
        steer(&mut game);
        if let RunnerTick::GameOver(summary) = game.tick(now_ms) {
            ended = Some(summary);
            break;
        }
    }

    let summary = ended.unwrap_or_else(|| game.summary());
    wallet.record_run(&summary);

    info!("=== RUN COMPLETE ===");
    info!("Distance: {}", summary.distance);
    info!("Coins collected: {}", summary.coins);
    info!("Crashed: {}", ended.is_some());
    info!("Wallet coins: {}", wallet.coins());
    info!("High score: {}", wallet.high_score());

    let bench = Decoration::new("bench", 100);
    if wallet.can_afford(bench.price) {
        arcade::garden::place(&mut wallet, &bench, 0.0, 0.0)?;
        info!("Bought a bench, {} coins left", wallet.coins());
    }
    Ok(())
}

/// Look a few units down the current lane and get out of the way
fn steer(game: &mut RunnerGame) {
    use crossroads_sim::arcade::{ItemKind, LANE_SPACING};

    let lane_blocked = |lane: i8| {
        let x = f32::from(lane) * LANE_SPACING;
        game.items().iter().any(|item| {
            matches!(item.kind, ItemKind::Obstacle(_))
                && (item.position.x - x).abs() < 1.5
                && item.position.z > -4.0
                && item.position.z < 1.0
        })
    };

    let lane = game.lane();
    if !lane_blocked(lane) {
        return;
    }
    let left_clear = lane > -1 && !lane_blocked(lane - 1);
    let right_clear = lane < 1 && !lane_blocked(lane + 1);
    if left_clear {
        game.move_left();
    } else if right_clear {
        game.move_right();
    } else {
        game.jump();
    }
}

#[cfg(feature = "ui")]
fn run_with_ui(config: SimConfig, requests: &[Direction]) {
    use bevy::log::LogPlugin;
    use bevy::prelude::*;
    use crossroads_sim::ui;

    println!("Starting Crossroads UI...");
    println!();
    println!("Controls:");
    println!("  N/S/E/W     - Request a pedestrian crossing");
    println!("  +/-         - Raise/lower the spawn rate");
    println!("  [ / ]       - Shorten/lengthen the green phase");
    println!("  Left/Right  - Orbit camera around the intersection");
    println!("  Up/Down     - Zoom in/out");
    println!("  ESC         - Exit");
    println!();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(LogPlugin {
                    filter: "warn,crossroads_sim=debug".to_string(),
                    level: bevy::log::Level::DEBUG,
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Crossroads - Intersection".into(),
                        resolution: (1280, 720).into(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .add_plugins(ui::CrossroadsUIPlugin {
            config,
            requests: requests.to_vec(),
        })
        .run();
}
