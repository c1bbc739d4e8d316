//! # powsim
//!
//! A deterministic, tick-stepped simulator of proof-of-work admission control
//! for a service under connection flooding.
//!
//! Every tick, adversarial and legitimate clients present proofs of work to a
//! bounded admission queue. The queue keeps the highest-effort live clients,
//! trimmed legitimate clients retry with escalated effort, and a recommender
//! republishes the required effort at the end of every update period. Runs
//! involve no randomness and no wall clock: the same [`ScenarioConfig`]
//! always produces the same record stream.
//!
//! ```no_run
//! use powsim::prelude::*;
//!
//! let config = ScenarioConfig::default().with_recommender(RecommenderKind::MaxTrimmed);
//! let mut sim = Simulation::new(config).unwrap();
//! let mut sink = LineWriterSink::new(std::io::stdout());
//! sim.run(&mut sink).unwrap();
//! ```

pub mod execute;
pub mod simulation;

pub use execute::{Execute, Executor, ExecutorWithSideEffect};
pub use simulation::{Simulation, StepOutput};

pub use powsim_components as components;
pub use powsim_core as core;
pub use powsim_metrics as metrics;

pub mod prelude {
    //! Commonly used types and traits

    pub use crate::{Execute, Executor, Simulation, StepOutput};

    pub use powsim_core::{
        AttackConfig, AttackKind, BotnetSize, ConfigError, RecommenderKind, ScenarioConfig,
        SimError, Tick,
    };

    pub use powsim_components::{AttackStrategy, EffortPolicy, EffortRecommender};

    pub use powsim_metrics::{
        LineWriterSink, NullSink, RecordSink, RunRecorder, RunSummary, TickRecord, TimeToConnect,
    };
}
