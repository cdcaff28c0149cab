use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use button_maze_engine::EngineConfig;
use clap::ValueEnum;
use serde::Deserialize;

/// Racer driven through the track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PolicyKind {
    /// Replans button presses every tick.
    #[default]
    Planner,
    /// Wanders randomly among safe steps.
    Random,
    /// Never moves.
    Stay,
}

/// Settings for a single race, read from TOML and refined by flags.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RaceConfig {
    /// Track definition in JSON.
    pub(crate) track: Option<PathBuf>,
    /// Racer to use.
    pub(crate) policy: PolicyKind,
    /// Seed for racers that draw random numbers.
    pub(crate) seed: u64,
    /// Limits handed to the engine.
    pub(crate) engine: EngineConfig,
}

/// Values supplied on the command line; each one present replaces the file value.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Overrides {
    pub(crate) track: Option<PathBuf>,
    pub(crate) policy: Option<PolicyKind>,
    pub(crate) seed: Option<u64>,
    pub(crate) time_budget: Option<f64>,
    pub(crate) per_tick: Option<f64>,
    pub(crate) stall_limit: Option<u32>,
}

impl RaceConfig {
    /// Reads a config file. A relative track path is resolved against the
    /// directory holding the file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read race config at {}", path.display()))?;
        let mut config = Self::parse(&contents)
            .with_context(|| format!("failed to parse race config at {}", path.display()))?;
        if let (Some(track), Some(base)) = (config.track.as_mut(), path.parent()) {
            if track.is_relative() {
                *track = base.join(&*track);
            }
        }
        Ok(config)
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid race config toml")
    }

    pub(crate) fn apply(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(track) = overrides.track {
            self.track = Some(track);
        }
        if let Some(policy) = overrides.policy {
            self.policy = policy;
        }
        if let Some(seed) = overrides.seed {
            self.seed = seed;
        }
        if let Some(seconds) = overrides.time_budget {
            self.engine.time_budget = seconds_flag("--time-budget", seconds)?;
        }
        if let Some(seconds) = overrides.per_tick {
            self.engine.per_tick_allowance = seconds_flag("--per-tick", seconds)?;
        }
        if let Some(stall_limit) = overrides.stall_limit {
            self.engine.stall_limit = stall_limit;
        }
        Ok(self)
    }
}

fn seconds_flag(flag: &str, seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("{flag} expects a non-negative number of seconds, got {seconds}"))
}
