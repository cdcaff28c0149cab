#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that races a policy through a button maze track.

mod race_config;

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use button_maze_core::{Cell, Delta, RunStatus};
use button_maze_engine::{Engine, Policy, PolicyFault};
use button_maze_system_policies::{PlannerPolicy, RandomPolicy, StayPolicy};
use button_maze_world::{GridWorld, TrackLayout};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use race_config::{Overrides, PolicyKind, RaceConfig};

const DEFAULT_LOG_FILTER: &str = "button_maze=info";

/// Race a policy through a button maze track.
#[derive(Debug, Parser)]
#[command(name = "button-maze", version)]
struct Cli {
    /// Track definition in JSON.
    #[arg(long, value_name = "FILE")]
    track: Option<PathBuf>,
    /// Race settings in TOML; flags override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Racer to drive through the track.
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,
    /// Seed for the random racer.
    #[arg(long)]
    seed: Option<u64>,
    /// Total decision time in seconds.
    #[arg(long, value_name = "SECONDS")]
    time_budget: Option<f64>,
    /// Decision time credited back after each tick, in seconds.
    #[arg(long, value_name = "SECONDS")]
    per_tick: Option<f64>,
    /// Ticks without progress before the racer is stopped.
    #[arg(long, value_name = "TICKS")]
    stall_limit: Option<u32>,
    /// Print every applied step after the result.
    #[arg(long)]
    print_history: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            track: self.track.clone(),
            policy: self.policy,
            seed: self.seed,
            time_budget: self.time_budget,
            per_tick: self.per_tick,
            stall_limit: self.stall_limit,
        }
    }
}

/// Racer selected at startup.
enum Racer {
    Planner(PlannerPolicy),
    Random(RandomPolicy),
    Stay(StayPolicy),
}

impl Racer {
    fn new(kind: PolicyKind, seed: u64) -> Self {
        match kind {
            PolicyKind::Planner => Self::Planner(PlannerPolicy::new()),
            PolicyKind::Random => Self::Random(RandomPolicy::new(seed)),
            PolicyKind::Stay => Self::Stay(StayPolicy),
        }
    }
}

impl Policy for Racer {
    fn decide(&mut self, position: Cell, world: &GridWorld) -> Result<Delta, PolicyFault> {
        match self {
            Self::Planner(policy) => policy.decide(position, world),
            Self::Random(policy) => policy.decide(position, world),
            Self::Stay(policy) => policy.decide(position, world),
        }
    }
}

/// Entry point for the button maze command-line interface.
fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RaceConfig::load(path)?,
        None => RaceConfig::default(),
    }
    .apply(cli.overrides())?;

    let track_path = config
        .track
        .as_deref()
        .context("no track given; pass --track or set `track` in the config file")?;
    let track = load_track(track_path)?;
    let racer = Racer::new(config.policy, config.seed);
    let mut engine = Engine::new(racer, &track, config.engine);
    let limits = engine.config();
    info!(
        track = %track_path.display(),
        rows = track.rows(),
        columns = track.columns(),
        policy = ?config.policy,
        time_budget_s = limits.time_budget.as_secs_f64(),
        per_tick_s = limits.per_tick_allowance.as_secs_f64(),
        stall_limit = limits.stall_limit,
        "starting race"
    );

    let report = engine.run_to_completion();

    println!("{}", report.message);
    if cli.print_history {
        for step in &report.history {
            println!("{step:?}");
        }
    }

    Ok(if report.status == RunStatus::Finished {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_track(path: &Path) -> Result<GridWorld> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read track at {}", path.display()))?;
    let layout: TrackLayout = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse track at {}", path.display()))?;
    GridWorld::from_layout(layout).with_context(|| format!("invalid track at {}", path.display()))
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
