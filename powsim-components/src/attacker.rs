//! Adversarial arrival strategies
//!
//! An [`AttackStrategy`] decides, per tick, how many adversarial clients show
//! up and how much effort each presents. Both may depend on the effort the
//! service is currently publishing. Attackers skip the backlog: they are
//! assumed to have the work ready and go straight to the admission queue.

use powsim_core::{AttackKind, ConfigError, ScenarioConfig, Tick};

/// Per-tick adversarial arrivals
pub trait AttackStrategy: Send + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Number of adversarial clients arriving at `tick`
    fn count(&self, tick: Tick, descriptor_effort: f64) -> u64;

    /// Effort each adversarial client presents at `tick`
    fn effort(&self, tick: Tick, descriptor_effort: f64) -> f64;
}

/// A botnet that floods continuously and always clears the current bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SustainedFlood {
    machines: u64,
    start: Tick,
    end: Tick,
    top_capacity: u64,
    client_performance_rate: f64,
}

impl SustainedFlood {
    pub fn new(
        machines: u64,
        start: Tick,
        end: Tick,
        top_capacity: u64,
        client_performance_rate: f64,
    ) -> Self {
        Self {
            machines,
            start,
            end,
            top_capacity,
            client_performance_rate,
        }
    }

    fn machines_at(&self, tick: Tick) -> u64 {
        if tick < self.start || tick > self.end {
            0
        } else {
            self.machines
        }
    }
}

impl AttackStrategy for SustainedFlood {
    fn name(&self) -> &'static str {
        "sustained"
    }

    fn count(&self, tick: Tick, descriptor_effort: f64) -> u64 {
        let machines = self.machines_at(tick);
        if machines == 0 {
            return 0;
        }
        let effort = self.effort(tick, descriptor_effort).max(1.0);
        let affordable = machines as f64 * self.client_performance_rate / effort;
        (affordable as u64).min(self.top_capacity)
    }

    /// One unit above the published effort, or nothing while no effort is required
    fn effort(&self, _tick: Tick, descriptor_effort: f64) -> f64 {
        if descriptor_effort > 0.0 {
            descriptor_effort + 1.0
        } else {
            0.0
        }
    }
}

/// A botnet that computes offline and floods just before an update boundary.
///
/// All machines work from `start` until one update period before `end`. The
/// accumulated work is spread over one period's worth of service slots, and
/// the burst runs at the service rate over the last period `[end - period,
/// end]`, which is exactly what the recommender samples next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecomputedBurst {
    machines: u64,
    window_start: Tick,
    end: Tick,
    effort: f64,
    burst_rate: u64,
}

impl PrecomputedBurst {
    pub fn new(
        machines: u64,
        start: Tick,
        end: Tick,
        base_service_rate: usize,
        update_period: u64,
        client_performance_rate: f64,
    ) -> Result<Self, ConfigError> {
        if end.ticks_since(start) < update_period {
            return Err(ConfigError::AttackWindow {
                start,
                end,
                reason: format!("shorter than one update period ({update_period})"),
            });
        }
        let duration = (end - start - update_period) as f64;
        let period_capacity = base_service_rate as f64 * update_period as f64;
        let effort = duration * machines as f64 * client_performance_rate / period_capacity;
        Ok(Self {
            machines,
            window_start: end - update_period,
            end,
            effort,
            burst_rate: base_service_rate as u64,
        })
    }

    /// First tick of the burst
    pub fn window_start(&self) -> Tick {
        self.window_start
    }

    pub fn is_active(&self, tick: Tick) -> bool {
        self.machines > 0 && tick >= self.window_start && tick <= self.end
    }
}

impl AttackStrategy for PrecomputedBurst {
    fn name(&self) -> &'static str {
        "precomputed"
    }

    fn count(&self, tick: Tick, _descriptor_effort: f64) -> u64 {
        if self.is_active(tick) {
            self.burst_rate
        } else {
            0
        }
    }

    fn effort(&self, _tick: Tick, _descriptor_effort: f64) -> f64 {
        self.effort
    }
}

/// Build the attack selected in the scenario
pub fn strategy_for(config: &ScenarioConfig) -> Result<Box<dyn AttackStrategy>, ConfigError> {
    let attack = config.attack;
    let machines = config.attacker_machines();
    match attack.kind {
        AttackKind::Sustained => Ok(Box::new(SustainedFlood::new(
            machines,
            attack.start,
            attack.end,
            config.top_capacity,
            config.client_performance_rate,
        ))),
        AttackKind::Precomputed if machines == 0 => Ok(Box::new(SustainedFlood::new(
            0,
            attack.start,
            attack.end,
            config.top_capacity,
            config.client_performance_rate,
        ))),
        AttackKind::Precomputed => Ok(Box::new(PrecomputedBurst::new(
            machines,
            attack.start,
            attack.end,
            config.base_service_rate,
            config.update_period,
            config.client_performance_rate,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powsim_core::{AttackConfig, BotnetSize};

    fn sustained() -> SustainedFlood {
        SustainedFlood::new(100_000, Tick::new(150), Tick::new(7350), 3200, 1000.0)
    }

    #[test]
    fn test_sustained_silent_outside_window() {
        let attack = sustained();
        assert_eq!(attack.count(Tick::new(149), 1000.0), 0);
        assert_eq!(attack.count(Tick::new(7351), 1000.0), 0);
        assert!(attack.count(Tick::new(150), 1000.0) > 0);
        assert!(attack.count(Tick::new(7350), 1000.0) > 0);
    }

    #[test]
    fn test_sustained_clears_the_bar() {
        let attack = sustained();
        assert_eq!(attack.effort(Tick::new(200), 0.0), 0.0);
        assert_eq!(attack.effort(Tick::new(200), 5000.0), 5001.0);
    }

    #[test]
    fn test_sustained_count_capped_and_adaptive() {
        let attack = sustained();
        // 1e8 / 1001 > 3200
        assert_eq!(attack.count(Tick::new(200), 1000.0), 3200);
        // 1e8 / 200_001 = 499.99..
        assert_eq!(attack.count(Tick::new(200), 200_000.0), 499);
        // zero effort uses the max(effort, 1) guard
        assert_eq!(attack.count(Tick::new(200), 0.0), 3200);
    }

    #[test]
    fn test_zero_machines_zero_arrivals() {
        let attack = SustainedFlood::new(0, Tick::new(0), Tick::new(100), 3200, 1000.0);
        assert_eq!(attack.count(Tick::new(50), 1000.0), 0);
    }

    #[test]
    fn test_precomputed_window() {
        let attack =
            PrecomputedBurst::new(500, Tick::new(150), Tick::new(7350), 180, 300, 1000.0).unwrap();
        assert_eq!(attack.window_start(), Tick::new(7050));
        assert_eq!(attack.count(Tick::new(7049), 0.0), 0);
        assert_eq!(attack.count(Tick::new(7050), 0.0), 180);
        assert_eq!(attack.count(Tick::new(7350), 0.0), 180);
        assert_eq!(attack.count(Tick::new(7351), 0.0), 0);
        assert_eq!(attack.count(Tick::new(1000), 0.0), 0);
    }

    #[test]
    fn test_precomputed_effort_amortized() {
        let attack =
            PrecomputedBurst::new(500, Tick::new(150), Tick::new(7350), 180, 300, 1000.0).unwrap();
        let expected = 6900.0 * 500.0 * 1000.0 / 54_000.0;
        assert!((attack.effort(Tick::new(7100), 0.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_precomputed_rejects_short_window() {
        assert!(
            PrecomputedBurst::new(500, Tick::new(100), Tick::new(300), 180, 300, 1000.0).is_err()
        );
    }

    #[test]
    fn test_strategy_from_config() {
        let config = ScenarioConfig::default().with_attack(AttackConfig::precomputed(
            BotnetSize::Small,
            Tick::new(150),
            Tick::new(7350),
        ));
        let strategy = strategy_for(&config).unwrap();
        assert_eq!(strategy.name(), "precomputed");

        let idle = ScenarioConfig::default().with_attack(AttackConfig::none());
        let strategy = strategy_for(&idle).unwrap();
        assert_eq!(strategy.count(Tick::zero(), 0.0), 0);
    }
}
