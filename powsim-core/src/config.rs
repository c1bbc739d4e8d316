//! Scenario configuration
//!
//! A scenario is fully described by a [`ScenarioConfig`]. The defaults model a
//! single onion service under a large sustained flood; every field can be
//! overridden with the `with_*` setters before the simulation is built.
//! Configuration is validated once, when the simulation is constructed.

use crate::error::ConfigError;
use crate::Tick;
use serde::{Deserialize, Serialize};

/// Clients served per tick at nominal capacity.
pub const DEFAULT_BASE_SERVICE_RATE: usize = 180;
/// Ceiling on the number of sustained-flood arrivals per tick.
pub const DEFAULT_TOP_CAPACITY: u64 = 3200;
/// Units of effort a single client machine computes per tick.
pub const DEFAULT_CLIENT_PERFORMANCE_RATE: f64 = 1000.0;
pub const DEFAULT_TIMEOUT_WINDOW: u64 = 30;
pub const DEFAULT_UPDATE_PERIOD: u64 = 300;
pub const DEFAULT_EFFORT_FLOOR: f64 = 1000.0;
pub const DEFAULT_LEGITIMATE_ARRIVALS: usize = 20;
pub const DEFAULT_SMALL_BOTNET_MACHINES: u64 = 500;
pub const DEFAULT_LARGE_BOTNET_MACHINES: u64 = 100_000;
pub const DEFAULT_TICKS: u64 = 9000;

/// Which attacker strategy drives adversarial arrivals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    /// Constant flood that always presents just enough effort to be admitted
    Sustained,
    /// Work offline, then burst right before an update boundary
    Precomputed,
}

/// Size of the botnet behind the attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotnetSize {
    /// No adversarial machines; useful as a baseline run
    Absent,
    Small,
    Large,
}

/// Which effort recommendation policy the service runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommenderKind {
    /// Total observed effort divided by nominal capacity over the period
    Throughput,
    /// Raise toward the backed-off maximum trimmed effort, relax toward the served median
    MaxTrimmed,
    /// Raise toward the median trimmed effort, relax toward the served median
    MedianTrimmed,
}

/// Active attack for a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackConfig {
    pub kind: AttackKind,
    pub botnet: BotnetSize,
    /// First tick with attacker machines active
    pub start: Tick,
    /// Last tick with attacker machines active (inclusive)
    pub end: Tick,
}

impl AttackConfig {
    pub fn sustained(botnet: BotnetSize, start: Tick, end: Tick) -> Self {
        Self {
            kind: AttackKind::Sustained,
            botnet,
            start,
            end,
        }
    }

    pub fn precomputed(botnet: BotnetSize, start: Tick, end: Tick) -> Self {
        Self {
            kind: AttackKind::Precomputed,
            botnet,
            start,
            end,
        }
    }

    /// An attack that never produces arrivals
    pub fn none() -> Self {
        Self::sustained(BotnetSize::Absent, Tick::zero(), Tick::zero())
    }
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self::sustained(BotnetSize::Large, Tick::new(150), Tick::new(7350))
    }
}

/// Complete description of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub base_service_rate: usize,
    pub top_capacity: u64,
    pub client_performance_rate: f64,
    pub timeout_window: u64,
    pub update_period: u64,
    pub effort_floor: f64,
    pub legitimate_arrivals_per_tick: usize,
    pub small_botnet_machines: u64,
    pub large_botnet_machines: u64,
    pub attack: AttackConfig,
    pub recommender: RecommenderKind,
    /// Default run length used by `Simulation::run`
    pub ticks: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            base_service_rate: DEFAULT_BASE_SERVICE_RATE,
            top_capacity: DEFAULT_TOP_CAPACITY,
            client_performance_rate: DEFAULT_CLIENT_PERFORMANCE_RATE,
            timeout_window: DEFAULT_TIMEOUT_WINDOW,
            update_period: DEFAULT_UPDATE_PERIOD,
            effort_floor: DEFAULT_EFFORT_FLOOR,
            legitimate_arrivals_per_tick: DEFAULT_LEGITIMATE_ARRIVALS,
            small_botnet_machines: DEFAULT_SMALL_BOTNET_MACHINES,
            large_botnet_machines: DEFAULT_LARGE_BOTNET_MACHINES,
            attack: AttackConfig::default(),
            recommender: RecommenderKind::Throughput,
            ticks: DEFAULT_TICKS,
        }
    }
}

impl ScenarioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_service_rate(mut self, rate: usize) -> Self {
        self.base_service_rate = rate;
        self
    }

    pub fn with_top_capacity(mut self, capacity: u64) -> Self {
        self.top_capacity = capacity;
        self
    }

    pub fn with_client_performance_rate(mut self, rate: f64) -> Self {
        self.client_performance_rate = rate;
        self
    }

    pub fn with_timeout_window(mut self, ticks: u64) -> Self {
        self.timeout_window = ticks;
        self
    }

    pub fn with_update_period(mut self, ticks: u64) -> Self {
        self.update_period = ticks;
        self
    }

    pub fn with_effort_floor(mut self, floor: f64) -> Self {
        self.effort_floor = floor;
        self
    }

    pub fn with_legitimate_arrivals(mut self, per_tick: usize) -> Self {
        self.legitimate_arrivals_per_tick = per_tick;
        self
    }

    pub fn with_botnet_machines(mut self, small: u64, large: u64) -> Self {
        self.small_botnet_machines = small;
        self.large_botnet_machines = large;
        self
    }

    pub fn with_attack(mut self, attack: AttackConfig) -> Self {
        self.attack = attack;
        self
    }

    pub fn with_recommender(mut self, recommender: RecommenderKind) -> Self {
        self.recommender = recommender;
        self
    }

    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.ticks = ticks;
        self
    }

    /// Admission queue capacity: the demand a full timeout window can sustain
    pub fn queue_capacity(&self) -> usize {
        self.base_service_rate
            .saturating_mul(usize::try_from(self.timeout_window).unwrap_or(usize::MAX))
    }

    /// Number of machines behind the configured attack
    pub fn attacker_machines(&self) -> u64 {
        match self.attack.botnet {
            BotnetSize::Absent => 0,
            BotnetSize::Small => self.small_botnet_machines,
            BotnetSize::Large => self.large_botnet_machines,
        }
    }

    /// Nominal number of clients served over one update period
    pub fn period_capacity(&self) -> f64 {
        self.base_service_rate as f64 * self.update_period as f64
    }

    /// Reject configurations the tick loop cannot run meaningfully.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_service_rate == 0 {
            return Err(ConfigError::positive("base_service_rate"));
        }
        if self.top_capacity == 0 {
            return Err(ConfigError::positive("top_capacity"));
        }
        if self.timeout_window == 0 {
            return Err(ConfigError::positive("timeout_window"));
        }
        if self.update_period == 0 {
            return Err(ConfigError::positive("update_period"));
        }
        if self.ticks == 0 {
            return Err(ConfigError::positive("ticks"));
        }
        if !(self.client_performance_rate.is_finite() && self.client_performance_rate > 0.0) {
            return Err(ConfigError::finite_positive(
                "client_performance_rate",
                self.client_performance_rate,
            ));
        }
        if !(self.effort_floor.is_finite() && self.effort_floor > 0.0) {
            return Err(ConfigError::finite_positive(
                "effort_floor",
                self.effort_floor,
            ));
        }
        self.validate_attack()
    }

    fn validate_attack(&self) -> Result<(), ConfigError> {
        let AttackConfig {
            kind, start, end, ..
        } = self.attack;
        if start > end {
            return Err(ConfigError::AttackWindow {
                start,
                end,
                reason: "start is after end".to_string(),
            });
        }
        if kind == AttackKind::Precomputed
            && self.attacker_machines() > 0
            && end.ticks_since(start) < self.update_period
        {
            return Err(ConfigError::AttackWindow {
                start,
                end,
                reason: format!(
                    "a precomputed attack needs at least one update period ({}) of preparation",
                    self.update_period
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScenarioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.queue_capacity(), 5400);
        assert_eq!(config.attacker_machines(), 100_000);
        assert_eq!(config.period_capacity(), 54_000.0);
    }

    #[test]
    fn test_zero_rates_rejected() {
        let err = ScenarioConfig::default()
            .with_base_service_rate(0)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::positive("base_service_rate"));

        let err = ScenarioConfig::default()
            .with_update_period(0)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::positive("update_period"));
    }

    #[test]
    fn test_non_finite_floor_rejected() {
        assert!(ScenarioConfig::default()
            .with_effort_floor(f64::NAN)
            .validate()
            .is_err());
        assert!(ScenarioConfig::default()
            .with_client_performance_rate(-1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_attack_window_checks() {
        let inverted = ScenarioConfig::default().with_attack(AttackConfig::sustained(
            BotnetSize::Small,
            Tick::new(100),
            Tick::new(50),
        ));
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::AttackWindow { .. })
        ));

        let short = ScenarioConfig::default().with_attack(AttackConfig::precomputed(
            BotnetSize::Large,
            Tick::new(0),
            Tick::new(299),
        ));
        assert!(short.validate().is_err());

        let absent = ScenarioConfig::default().with_attack(AttackConfig::precomputed(
            BotnetSize::Absent,
            Tick::new(0),
            Tick::new(10),
        ));
        assert!(absent.validate().is_ok());
    }
}
