//! Game configuration.
//!
//! Hosts create a `GameConfig` once and hand it to the board. The grid size
//! is the only value a player-facing reset supplies; the timing constants
//! exist so hosts can tune pacing and tests can drive simulated time with
//! known numbers.
//!
//! Durations serialise as integer milliseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::GameError;

/// Smallest accepted board edge.
pub const MIN_GRID_SIZE: u8 = 2;
/// Largest accepted board edge.
pub const MAX_GRID_SIZE: u8 = 10;
/// Board edge used when none is supplied.
pub const DEFAULT_GRID_SIZE: u8 = 3;

/// Full configuration for one board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board edge length, always within `MIN_GRID_SIZE..=MAX_GRID_SIZE`.
    pub grid_size: u8,

    /// Starting clock for each duel contestant.
    #[serde(with = "millis")]
    pub max_timer: Duration,

    /// Duel clock cadence. Each tick removes this much from the active side.
    #[serde(with = "millis")]
    pub tick_interval: Duration,

    /// Gap between the "3", "2", "1", "GO!" countdown labels.
    #[serde(with = "millis")]
    pub countdown_step: Duration,

    /// Delay between "GO!" and the clocks starting.
    #[serde(with = "millis")]
    pub countdown_tail: Duration,

    /// How long both answer controls stay locked after a pass.
    #[serde(with = "millis")]
    pub pass_cooldown: Duration,

    /// Highlight cadence of the random challenger spin.
    #[serde(with = "millis")]
    pub selector_step: Duration,

    /// Assumed length of the spin's audio cue until the host reports the real one.
    #[serde(with = "millis")]
    pub selector_cue: Duration,

    /// How much earlier than the cue's end the spin lands.
    #[serde(with = "millis")]
    pub selector_scroll_lead: Duration,

    /// Lower bound on the spin duration.
    #[serde(with = "millis")]
    pub selector_min_spin: Duration,

    /// Seed for the board's `GameRng`.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            max_timer: Duration::from_secs(25),
            tick_interval: Duration::from_millis(250),
            countdown_step: Duration::from_millis(800),
            countdown_tail: Duration::from_millis(600),
            pass_cooldown: Duration::from_millis(3000),
            selector_step: Duration::from_millis(70),
            selector_cue: Duration::from_millis(9000),
            selector_scroll_lead: Duration::from_millis(2500),
            selector_min_spin: Duration::from_millis(1500),
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp a requested edge length into the supported range.
    ///
    /// ```
    /// use tile_duel::core::GameConfig;
    ///
    /// assert_eq!(GameConfig::clamp_grid_size(1), 2);
    /// assert_eq!(GameConfig::clamp_grid_size(5), 5);
    /// assert_eq!(GameConfig::clamp_grid_size(40), 10);
    /// ```
    #[must_use]
    pub fn clamp_grid_size(requested: i64) -> u8 {
        requested.clamp(MIN_GRID_SIZE as i64, MAX_GRID_SIZE as i64) as u8
    }

    /// Set the grid size, clamping out-of-range values.
    #[must_use]
    pub fn with_grid_size(mut self, requested: i64) -> Self {
        self.grid_size = Self::clamp_grid_size(requested);
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the per-contestant duel clock.
    #[must_use]
    pub fn with_max_timer(mut self, max_timer: Duration) -> Self {
        self.max_timer = max_timer;
        self
    }

    /// Set the pass lockout window.
    #[must_use]
    pub fn with_pass_cooldown(mut self, cooldown: Duration) -> Self {
        self.pass_cooldown = cooldown;
        self
    }

    /// Set the default spin cue length.
    #[must_use]
    pub fn with_selector_cue(mut self, cue: Duration) -> Self {
        self.selector_cue = cue;
        self
    }

    /// Total time from duel start until the clocks run.
    #[must_use]
    pub fn countdown_total(&self) -> Duration {
        self.countdown_step * 3 + self.countdown_tail
    }

    /// Load a configuration document. Missing fields take defaults and the
    /// grid size is clamped.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let mut config: Self =
            serde_json::from_str(json).map_err(|e| GameError::InvalidConfig(e.to_string()))?;
        config.grid_size = Self::clamp_grid_size(config.grid_size as i64);
        if config.tick_interval.is_zero() || config.selector_step.is_zero() {
            return Err(GameError::InvalidConfig(
                "tick_interval and selector_step must be non-zero".into(),
            ));
        }
        Ok(config)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
