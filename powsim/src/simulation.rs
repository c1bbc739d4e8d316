//! The tick loop
//!
//! [`Simulation`] owns every piece of mutable state of a run and advances it
//! one tick at a time. Each tick runs the same fixed sequence:
//!
//! 1. at a period boundary, publish a new effort and reset the period
//!    accumulators;
//! 2. inject adversarial clients straight into the queue;
//! 3. release ready clients from the backlog, earliest first;
//! 4. admit new legitimate clients, directly when no effort is required and
//!    through the backlog otherwise;
//! 5. trim the queue to capacity, rescheduling trimmed legitimate clients;
//! 6. serve up to the service rate from the front of the queue;
//! 7. report the tick.
//!
//! Later steps read what earlier ones wrote in the same tick, so the order is
//! part of the model.

use crate::execute::{Execute, Executor};
use powsim_components::{
    strategy_for, AdmissionQueue, AttackStrategy, Backlog, Client, EffortRecommender, Origin,
    PeriodObservation, RetrySchedule,
};
use powsim_core::logging::{diagnostics, events};
use powsim_core::{period_span, simulation_span, tick_span, ScenarioConfig, SimError, Tick};
use powsim_metrics::{
    PeriodSummary, RecordSink, TickDetail, TickRecord, TickReport, TimeToConnect,
};
use tracing::{debug, info, instrument};

/// Output of a single [`Simulation::step`]
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub report: TickReport,
    /// Present when the tick was an update-period boundary
    pub period: Option<PeriodSummary>,
}

/// Running totals of clients presented to the queue in one tick
#[derive(Debug, Default)]
struct Presented {
    count: usize,
    attackers: usize,
    effort: f64,
}

impl Presented {
    fn add(&mut self, client: &Client) {
        self.count += 1;
        self.effort += client.effort;
        if client.is_attacker() {
            self.attackers += 1;
        }
    }

    fn mean_effort(&self) -> Option<f64> {
        (self.count > 0).then(|| self.effort / self.count as f64)
    }
}

/// One admission-control scenario and all of its state
#[derive(Debug)]
pub struct Simulation {
    config: ScenarioConfig,
    tick: Tick,
    recommender: EffortRecommender,
    attacker: Box<dyn AttackStrategy>,
    retry: RetrySchedule,
    backlog: Backlog,
    queue: AdmissionQueue,
    /// Clients served since the last boundary
    handled: Vec<Client>,
    /// Effort of clients trimmed since the last boundary
    trimmed_efforts: Vec<f64>,
    served_legitimate: u64,
}

impl Simulation {
    /// Build a simulation with the recommender and attacker the config selects.
    pub fn new(config: ScenarioConfig) -> Result<Self, SimError> {
        config.validate()?;
        let recommender = EffortRecommender::from_config(&config);
        let attacker = strategy_for(&config)?;
        Self::with_strategies(config, recommender, attacker)
    }

    /// Build a simulation around caller-supplied strategies.
    ///
    /// The config still provides capacities, rates and the arrival count.
    pub fn with_strategies(
        config: ScenarioConfig,
        recommender: EffortRecommender,
        attacker: Box<dyn AttackStrategy>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let queue = AdmissionQueue::new(config.queue_capacity(), config.timeout_window);
        Ok(Self {
            retry: RetrySchedule::from_config(&config),
            tick: Tick::zero(),
            recommender,
            attacker,
            backlog: Backlog::new(),
            queue,
            handled: Vec::new(),
            trimmed_efforts: Vec::new(),
            served_legitimate: 0,
            config,
        })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// The tick the next call to [`step`](Self::step) will simulate
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn descriptor_effort(&self) -> f64 {
        self.recommender.descriptor_effort()
    }

    pub fn recommender(&self) -> &EffortRecommender {
        &self.recommender
    }

    pub fn attacker(&self) -> &dyn AttackStrategy {
        self.attacker.as_ref()
    }

    pub fn queue(&self) -> &AdmissionQueue {
        &self.queue
    }

    pub fn backlog(&self) -> &Backlog {
        &self.backlog
    }

    /// Clients served since the last update boundary
    pub fn handled(&self) -> &[Client] {
        &self.handled
    }

    /// Effort of clients trimmed since the last update boundary
    pub fn trimmed_efforts(&self) -> &[f64] {
        &self.trimmed_efforts
    }

    /// Legitimate clients served since the start of the run
    pub fn served_legitimate(&self) -> u64 {
        self.served_legitimate
    }

    /// Simulate one tick and advance the clock.
    pub fn step(&mut self) -> StepOutput {
        let tick = self.tick;
        let _span = tick_span(tick).entered();

        let period = self.update_boundary(tick);

        let mut presented = Presented::default();
        self.admit_attackers(tick, &mut presented);
        self.release_backlog(tick, &mut presented);
        self.admit_new_clients(tick, &mut presented);

        let queue_len = self.queue.len();
        if self.queue.is_over_capacity() {
            diagnostics::queue_saturated(tick, queue_len, self.queue.capacity());
        }

        let trim = self.queue.trim(tick, &self.retry);
        let trimmed = trim.trimmed();
        self.trimmed_efforts.extend(trim.trimmed_efforts);
        for retry in trim.retries {
            self.backlog.schedule(retry);
        }

        let service = self.queue.serve(tick, self.config.base_service_rate);
        let legitimate_waits: Vec<u64> = service
            .legitimate()
            .map(|client| client.time_to_connect(tick))
            .collect();
        let served_attackers = service.served.len() - legitimate_waits.len();
        let expired = service.expired;
        self.served_legitimate += legitimate_waits.len() as u64;
        self.handled.extend(service.served);

        let record = TickRecord {
            tick,
            descriptor_effort: self.recommender.descriptor_effort(),
            queue_len,
            served_legitimate: legitimate_waits.len(),
            time_to_connect: TimeToConnect::mean(
                legitimate_waits.iter().sum(),
                legitimate_waits.len(),
            ),
        };
        debug!(
            queue_len = queue_len,
            trimmed = trimmed,
            expired = expired,
            served_legitimate = record.served_legitimate,
            backlog = self.backlog.len(),
            "Tick complete"
        );

        let detail = TickDetail {
            backlog_len: self.backlog.len(),
            presented: presented.count,
            attackers_presented: presented.attackers,
            mean_presented_effort: presented.mean_effort(),
            trimmed,
            expired,
            served_attackers,
            legitimate_waits,
        };

        self.tick = tick.next();
        StepOutput {
            report: TickReport { record, detail },
            period,
        }
    }

    /// Run with the given executor, feeding every tick into `sink`.
    #[instrument(skip_all, fields(start = self.tick.as_u64()))]
    pub fn execute<E: Execute>(
        &mut self,
        executor: E,
        sink: &mut dyn RecordSink,
    ) -> Result<(), SimError> {
        info!(
            recommender = self.recommender.policy_name(),
            attacker = self.attacker.name(),
            "Starting simulation execution"
        );
        executor.execute(self, sink)?;
        info!(
            final_tick = self.tick.as_u64(),
            "Simulation execution completed"
        );
        Ok(())
    }

    /// Run the configured number of ticks into `sink`.
    pub fn run(&mut self, sink: &mut dyn RecordSink) -> Result<(), SimError> {
        let name = format!("{}/{}", self.recommender.policy_name(), self.attacker.name());
        let _span = simulation_span(&name).entered();
        let ticks = self.config.ticks;
        events::simulation_started(&name, ticks, self.queue.capacity());
        self.execute(Executor::ticks(ticks), sink)?;
        events::simulation_completed(&name, self.tick, self.served_legitimate);
        Ok(())
    }

    /// Step 1: publish a new effort at period boundaries
    fn update_boundary(&mut self, tick: Tick) -> Option<PeriodSummary> {
        if !self.recommender.is_update_tick(tick) {
            return None;
        }
        let index = tick.period_index(self.config.update_period);
        let _span = period_span(index).entered();

        let observed = PeriodObservation {
            handled: &self.handled,
            trimmed_efforts: &self.trimmed_efforts,
            queue: &self.queue,
        };
        let handled_legitimate = observed.legitimate_handled();
        let descriptor_effort = self.recommender.update(tick, &observed);

        let summary = PeriodSummary {
            index,
            tick,
            descriptor_effort,
            handled: self.handled.len(),
            handled_legitimate,
            backlog_len: self.backlog.len(),
            trimmed: self.trimmed_efforts.len(),
        };
        events::period_summary(
            tick,
            summary.handled,
            summary.handled_legitimate,
            summary.backlog_len,
            summary.trimmed,
        );
        if summary.is_starved() {
            diagnostics::legitimate_starvation(tick, summary.handled);
        }

        self.handled.clear();
        self.trimmed_efforts.clear();
        Some(summary)
    }

    /// Step 2: attackers bypass the backlog
    fn admit_attackers(&mut self, tick: Tick, presented: &mut Presented) {
        let descriptor_effort = self.recommender.descriptor_effort();
        let count = self.attacker.count(tick, descriptor_effort);
        if count == 0 {
            return;
        }
        let effort = self.attacker.effort(tick, descriptor_effort);
        for _ in 0..count {
            let client = Client::attacker(tick, effort);
            presented.add(&client);
            self.queue.enqueue(client);
        }
    }

    /// Step 3: move every client whose attempt time has come into the queue
    fn release_backlog(&mut self, tick: Tick, presented: &mut Presented) {
        for client in self.backlog.release_ready(tick) {
            presented.add(&client);
            self.queue.enqueue(client);
        }
    }

    /// Step 4: new legitimate clients work for the published effort first
    fn admit_new_clients(&mut self, tick: Tick, presented: &mut Presented) {
        let descriptor_effort = self.recommender.descriptor_effort();
        for _ in 0..self.config.legitimate_arrivals_per_tick {
            if descriptor_effort == 0.0 {
                let client = Client::arriving(tick, 0.0, Origin::Legitimate);
                presented.add(&client);
                self.queue.enqueue(client);
            } else {
                let work_time = self.retry.work_time(descriptor_effort);
                self.backlog
                    .schedule(Client::working(tick, descriptor_effort, work_time));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powsim_components::{EffortPolicy, RecommenderState, SustainedFlood, ThroughputPolicy};
    use powsim_core::{AttackConfig, ConfigError};

    fn quiet_config() -> ScenarioConfig {
        ScenarioConfig::default()
            .with_attack(AttackConfig::none())
            .with_ticks(10)
    }

    /// Publishes zero effort forever
    #[derive(Debug)]
    struct ZeroPolicy;

    impl EffortPolicy for ZeroPolicy {
        fn name(&self) -> &'static str {
            "zero"
        }

        fn recommend(
            &self,
            _current: RecommenderState,
            _observed: &PeriodObservation<'_>,
        ) -> RecommenderState {
            RecommenderState::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected_before_running() {
        let err = Simulation::new(ScenarioConfig::default().with_timeout_window(0)).unwrap_err();
        assert!(matches!(
            err,
            SimError::Configuration(ConfigError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn test_first_tick_publishes_floor_and_backlogs_new_clients() {
        let mut sim = Simulation::new(quiet_config()).unwrap();
        let out = sim.step();

        assert_eq!(out.report.record.descriptor_effort, 1000.0);
        assert!(out.period.is_some());
        // Clients need one tick of work before presenting.
        assert_eq!(out.report.record.queue_len, 0);
        assert_eq!(sim.backlog().len(), 20);
        assert_eq!(out.report.record.time_to_connect, TimeToConnect::undefined());

        let out = sim.step();
        assert!(out.period.is_none());
        assert_eq!(out.report.record.queue_len, 20);
        assert_eq!(out.report.record.served_legitimate, 20);
        assert_eq!(out.report.record.time_to_connect.value(), Some(1.0));
        assert_eq!(sim.current_tick(), Tick::new(2));
    }

    #[test]
    fn test_zero_effort_admits_directly() {
        let config = quiet_config();
        let recommender = EffortRecommender::new(Box::new(ZeroPolicy), config.update_period);
        let attacker = Box::new(SustainedFlood::new(0, Tick::zero(), Tick::zero(), 1, 1.0));
        let mut sim = Simulation::with_strategies(config, recommender, attacker).unwrap();

        let out = sim.step();
        assert_eq!(out.report.record.queue_len, 20);
        assert_eq!(out.report.record.served_legitimate, 20);
        assert_eq!(out.report.record.time_to_connect.value(), Some(0.0));
        assert!(sim.backlog().is_empty());
        assert_eq!(sim.handled().len(), 20);
    }

    #[test]
    fn test_accumulators_reset_at_boundary() {
        let config = quiet_config().with_update_period(5);
        let recommender = EffortRecommender::new(
            Box::new(ThroughputPolicy::new(1000.0, config.period_capacity())),
            config.update_period,
        );
        let attacker = Box::new(SustainedFlood::new(0, Tick::zero(), Tick::zero(), 1, 1.0));
        let mut sim = Simulation::with_strategies(config, recommender, attacker).unwrap();

        for _ in 0..5 {
            sim.step();
        }
        assert_eq!(sim.handled().len(), 80);
        let out = sim.step();
        let period = out.period.unwrap();
        assert_eq!(period.index, 1);
        assert_eq!(period.handled, 80);
        assert_eq!(period.handled_legitimate, 80);
        // Only what was served after the reset remains.
        assert_eq!(sim.handled().len(), 20);
        assert!(sim.trimmed_efforts().is_empty());
    }
}
