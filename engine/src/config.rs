//! Run configuration passed to the engine at construction.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(10);
const DEFAULT_PER_TICK_ALLOWANCE: Duration = Duration::from_secs(5);
const DEFAULT_STALL_LIMIT: u32 = 100;

/// Limits applied to a single run.
///
/// Durations are written as fractional seconds when serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Total wall-clock time the policy may spend deciding.
    #[serde(with = "seconds")]
    pub time_budget: Duration,
    /// Decision time credited back after each tick, capped at the time spent.
    #[serde(with = "seconds")]
    pub per_tick_allowance: Duration,
    /// Consecutive ticks without getting closer to the target before the run
    /// is declared stalled.
    pub stall_limit: u32,
}

impl EngineConfig {
    /// Creates a configuration from explicit limits.
    #[must_use]
    pub const fn new(time_budget: Duration, per_tick_allowance: Duration, stall_limit: u32) -> Self {
        Self {
            time_budget,
            per_tick_allowance,
            stall_limit,
        }
    }

    /// Configuration that never times out, used when replaying recorded runs.
    #[must_use]
    pub const fn untimed(stall_limit: u32) -> Self {
        Self::new(Duration::MAX, Duration::ZERO, stall_limit)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_TIME_BUDGET,
            DEFAULT_PER_TICK_ALLOWANCE,
            DEFAULT_STALL_LIMIT,
        )
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
