//! Effort recommendation
//!
//! At every update-period boundary the service publishes a new required
//! effort (the "descriptor effort") computed from what it observed during the
//! period that just ended. The computation is pluggable through
//! [`EffortPolicy`]; three policies are provided:
//!
//! - [`ThroughputPolicy`]: all observed effort spread over nominal capacity.
//!   Smooth, reacts only once per period.
//! - [`MaxTrimmedPolicy`]: chase the backed-off maximum of trimmed effort,
//!   relax toward the median served effort. Reactive, but one outlier can
//!   drive it up.
//! - [`MedianTrimmedPolicy`]: same control loop, chasing the median of
//!   trimmed effort instead.
//!
//! The published value lives in a [`RecommenderState`] owned by the
//! [`EffortRecommender`]; policies receive the previous state and return the
//! next one, so no policy keeps hidden state of its own.

use crate::backoff::EffortBackoff;
use crate::client::Client;
use crate::queue::AdmissionQueue;
use powsim_core::logging::events;
use powsim_core::{RecommenderKind, ScenarioConfig, Tick};
use serde::{Deserialize, Serialize};

/// The published effort
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RecommenderState {
    pub descriptor_effort: f64,
}

impl RecommenderState {
    pub fn new(descriptor_effort: f64) -> Self {
        Self { descriptor_effort }
    }
}

/// Everything the service saw during the period that just ended
#[derive(Debug, Clone, Copy)]
pub struct PeriodObservation<'a> {
    /// Clients served since the last boundary
    pub handled: &'a [Client],
    /// Effort of clients trimmed since the last boundary
    pub trimmed_efforts: &'a [f64],
    /// Clients still waiting in the admission queue
    pub queue: &'a AdmissionQueue,
}

impl PeriodObservation<'_> {
    /// Effort of every client observed: served, trimmed and queued
    pub fn total_effort(&self) -> f64 {
        let handled: f64 = self.handled.iter().map(|c| c.effort).sum();
        let trimmed: f64 = self.trimmed_efforts.iter().sum();
        handled + trimmed + self.queue.total_effort()
    }

    pub fn max_trimmed(&self) -> Option<f64> {
        self.trimmed_efforts.iter().copied().max_by(f64::total_cmp)
    }

    pub fn median_trimmed(&self) -> Option<f64> {
        median(self.trimmed_efforts.to_vec())
    }

    pub fn median_handled(&self) -> Option<f64> {
        median(self.handled.iter().map(|c| c.effort).collect())
    }

    pub fn legitimate_handled(&self) -> usize {
        self.handled.iter().filter(|c| !c.is_attacker()).count()
    }
}

/// Median of a set of values; the mean of the middle pair for even sizes.
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// A rule for turning one period of observations into the next published effort
pub trait EffortPolicy: Send + std::fmt::Debug {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    fn recommend(
        &self,
        current: RecommenderState,
        observed: &PeriodObservation<'_>,
    ) -> RecommenderState;
}

/// Total observed effort divided by what the service can process in a period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputPolicy {
    floor: f64,
    period_capacity: f64,
}

impl ThroughputPolicy {
    /// `period_capacity` is `base_service_rate * update_period`.
    pub fn new(floor: f64, period_capacity: f64) -> Self {
        Self {
            floor,
            period_capacity,
        }
    }
}

impl EffortPolicy for ThroughputPolicy {
    fn name(&self) -> &'static str {
        "throughput"
    }

    fn recommend(
        &self,
        _current: RecommenderState,
        observed: &PeriodObservation<'_>,
    ) -> RecommenderState {
        let effort = observed.total_effort() / self.period_capacity;
        RecommenderState::new(effort.max(self.floor))
    }
}

/// Raise toward `backoff(max trimmed)`, otherwise relax toward the served median
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxTrimmedPolicy {
    backoff: EffortBackoff,
}

impl MaxTrimmedPolicy {
    pub fn new(floor: f64) -> Self {
        Self {
            backoff: EffortBackoff::new(floor),
        }
    }
}

impl EffortPolicy for MaxTrimmedPolicy {
    fn name(&self) -> &'static str {
        "max_trimmed"
    }

    fn recommend(
        &self,
        current: RecommenderState,
        observed: &PeriodObservation<'_>,
    ) -> RecommenderState {
        let target = observed
            .max_trimmed()
            .map(|max| self.backoff.next_effort(max))
            .unwrap_or(0.0);
        hybrid_step(current, target, observed, self.backoff.floor())
    }
}

/// Raise toward the median trimmed effort, otherwise relax toward the served median
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedianTrimmedPolicy {
    floor: f64,
}

impl MedianTrimmedPolicy {
    pub fn new(floor: f64) -> Self {
        Self { floor }
    }
}

impl EffortPolicy for MedianTrimmedPolicy {
    fn name(&self) -> &'static str {
        "median_trimmed"
    }

    fn recommend(
        &self,
        current: RecommenderState,
        observed: &PeriodObservation<'_>,
    ) -> RecommenderState {
        let target = observed.median_trimmed().unwrap_or(0.0);
        hybrid_step(current, target, observed, self.floor)
    }
}

/// Shared control loop of the two hybrid policies.
///
/// Overload (a raise target above the current value) wins; otherwise the
/// effort drops to the served median when it is above it. A positive result
/// is never below the floor, zero stays zero.
fn hybrid_step(
    current: RecommenderState,
    raise_target: f64,
    observed: &PeriodObservation<'_>,
    floor: f64,
) -> RecommenderState {
    let mut effort = current.descriptor_effort;
    if effort < raise_target {
        effort = raise_target;
    } else if let Some(median_handled) = observed.median_handled() {
        if effort > median_handled {
            effort = median_handled;
        }
    }
    if effort > 0.0 && effort < floor {
        effort = floor;
    }
    RecommenderState::new(effort)
}

/// Build the policy selected in the scenario
pub fn policy_for(config: &ScenarioConfig) -> Box<dyn EffortPolicy> {
    match config.recommender {
        RecommenderKind::Throughput => Box::new(ThroughputPolicy::new(
            config.effort_floor,
            config.period_capacity(),
        )),
        RecommenderKind::MaxTrimmed => Box::new(MaxTrimmedPolicy::new(config.effort_floor)),
        RecommenderKind::MedianTrimmed => Box::new(MedianTrimmedPolicy::new(config.effort_floor)),
    }
}

/// Owns the published effort and applies a policy at period boundaries
#[derive(Debug)]
pub struct EffortRecommender {
    policy: Box<dyn EffortPolicy>,
    state: RecommenderState,
    update_period: u64,
    updates: u64,
}

impl EffortRecommender {
    pub fn new(policy: Box<dyn EffortPolicy>, update_period: u64) -> Self {
        Self {
            policy,
            state: RecommenderState::default(),
            update_period,
            updates: 0,
        }
    }

    pub fn from_config(config: &ScenarioConfig) -> Self {
        Self::new(policy_for(config), config.update_period)
    }

    /// Start from a published effort other than zero
    pub fn with_state(mut self, state: RecommenderState) -> Self {
        self.state = state;
        self
    }

    pub fn descriptor_effort(&self) -> f64 {
        self.state.descriptor_effort
    }

    pub fn state(&self) -> RecommenderState {
        self.state
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Number of boundaries processed so far
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn is_update_tick(&self, tick: Tick) -> bool {
        tick.is_period_boundary(self.update_period)
    }

    /// Publish a new effort if `tick` is a period boundary.
    ///
    /// Off-boundary calls leave the state alone and return the current value.
    pub fn update(&mut self, tick: Tick, observed: &PeriodObservation<'_>) -> f64 {
        if !self.is_update_tick(tick) {
            return self.state.descriptor_effort;
        }
        let previous = self.state.descriptor_effort;
        self.state = self.policy.recommend(self.state, observed);
        self.updates += 1;
        events::effort_updated(tick, self.policy.name(), previous, self.state.descriptor_effort);
        self.state.descriptor_effort
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn served(efforts: &[f64]) -> Vec<Client> {
        efforts
            .iter()
            .map(|&e| Client::attacker(Tick::zero(), e))
            .collect()
    }

    fn observe<'a>(
        handled: &'a [Client],
        trimmed: &'a [f64],
        queue: &'a AdmissionQueue,
    ) -> PeriodObservation<'a> {
        PeriodObservation {
            handled,
            trimmed_efforts: trimmed,
            queue,
        }
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![]), None);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_throughput_counts_everything() {
        let handled = served(&[1000.0, 3000.0]);
        let trimmed = [2000.0];
        let mut queue = AdmissionQueue::new(10, 30);
        queue.enqueue(Client::attacker(Tick::zero(), 4000.0));

        let policy = ThroughputPolicy::new(1.0, 10.0);
        let next = policy.recommend(
            RecommenderState::default(),
            &observe(&handled, &trimmed, &queue),
        );
        assert_eq!(next.descriptor_effort, 1000.0);
    }

    #[test]
    fn test_throughput_clamped_to_floor() {
        let queue = AdmissionQueue::new(10, 30);
        let policy = ThroughputPolicy::new(1000.0, 54_000.0);
        let next = policy.recommend(RecommenderState::default(), &observe(&[], &[], &queue));
        assert_eq!(next.descriptor_effort, 1000.0);
    }

    #[test]
    fn test_max_trimmed_raises_with_backoff() {
        let queue = AdmissionQueue::new(10, 30);
        let trimmed = [1500.0, 3000.0, 1200.0];
        let policy = MaxTrimmedPolicy::new(1000.0);
        let next = policy.recommend(
            RecommenderState::new(1000.0),
            &observe(&[], &trimmed, &queue),
        );
        assert_eq!(next.descriptor_effort, 6000.0);
    }

    #[test]
    fn test_hybrid_relaxes_toward_served_median() {
        let queue = AdmissionQueue::new(10, 30);
        let handled = served(&[1500.0, 2000.0, 2500.0]);
        let policy = MaxTrimmedPolicy::new(1000.0);
        let next = policy.recommend(
            RecommenderState::new(8000.0),
            &observe(&handled, &[], &queue),
        );
        assert_eq!(next.descriptor_effort, 2000.0);
    }

    #[test]
    fn test_hybrid_floor_and_zero() {
        let queue = AdmissionQueue::new(10, 30);
        let policy = MedianTrimmedPolicy::new(1000.0);

        let idle = policy.recommend(RecommenderState::default(), &observe(&[], &[], &queue));
        assert_eq!(idle.descriptor_effort, 0.0);

        let trimmed = [0.0, 10.0, 20.0];
        let raised = policy.recommend(
            RecommenderState::default(),
            &observe(&[], &trimmed, &queue),
        );
        assert_eq!(raised.descriptor_effort, 1000.0);
    }

    #[test]
    fn test_median_policy_ignores_single_outlier() {
        let queue = AdmissionQueue::new(10, 30);
        let trimmed = [1000.0, 1000.0, 1_000_000.0];
        let median_next = MedianTrimmedPolicy::new(1000.0).recommend(
            RecommenderState::new(500.0),
            &observe(&[], &trimmed, &queue),
        );
        let max_next = MaxTrimmedPolicy::new(1000.0).recommend(
            RecommenderState::new(500.0),
            &observe(&[], &trimmed, &queue),
        );
        assert_eq!(median_next.descriptor_effort, 1000.0);
        assert_eq!(max_next.descriptor_effort, 2_000_000.0);
    }

    #[test]
    fn test_recommender_only_updates_on_boundaries() {
        let config = ScenarioConfig::default();
        let mut recommender = EffortRecommender::from_config(&config);
        let queue = AdmissionQueue::new(10, 30);
        let trimmed = [900_000_000.0];
        let obs = observe(&[], &trimmed, &queue);

        assert_eq!(recommender.update(Tick::new(17), &obs), 0.0);
        assert_eq!(recommender.updates(), 0);

        let published = recommender.update(Tick::new(300), &obs);
        assert!(published > config.effort_floor);
        assert_eq!(recommender.updates(), 1);
        assert_eq!(recommender.policy_name(), "throughput");
    }
}
