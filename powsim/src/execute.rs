use crate::simulation::{Simulation, StepOutput};
use powsim_core::{SimError, Tick};
use powsim_metrics::RecordSink;

/// Simulation execution trait.
pub trait Execute {
    /// Steps the simulation until some stopping condition is reached, handing
    /// every tick to `sink`. The condition is implementation-specific.
    fn execute(self, sim: &mut Simulation, sink: &mut dyn RecordSink) -> Result<(), SimError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndCondition {
    Ticks(u64),
    Until(Tick),
}

/// Executor is used for simple execution of an entire run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executor {
    end_condition: EndCondition,
}

impl Executor {
    /// Simulation will execute exactly this many ticks.
    #[must_use]
    pub fn ticks(ticks: u64) -> Self {
        Self {
            end_condition: EndCondition::Ticks(ticks),
        }
    }

    /// Simulation will run every tick before `end`.
    #[must_use]
    pub fn until(end: Tick) -> Self {
        Self {
            end_condition: EndCondition::Until(end),
        }
    }

    /// Registers a side effect that is called _after_ each tick is recorded.
    #[must_use]
    pub fn side_effect<F>(self, func: F) -> ExecutorWithSideEffect<F>
    where
        F: FnMut(&Simulation, &StepOutput),
    {
        ExecutorWithSideEffect {
            end_condition: self.end_condition,
            side_effect: func,
        }
    }
}

impl Execute for Executor {
    fn execute(self, sim: &mut Simulation, sink: &mut dyn RecordSink) -> Result<(), SimError> {
        run_with(sim, sink, self.end_condition, |_, _| {})
    }
}

pub struct ExecutorWithSideEffect<F>
where
    F: FnMut(&Simulation, &StepOutput),
{
    end_condition: EndCondition,
    side_effect: F,
}

impl<F> Execute for ExecutorWithSideEffect<F>
where
    F: FnMut(&Simulation, &StepOutput),
{
    fn execute(self, sim: &mut Simulation, sink: &mut dyn RecordSink) -> Result<(), SimError> {
        run_with(sim, sink, self.end_condition, self.side_effect)
    }
}

fn run_with<F>(
    sim: &mut Simulation,
    sink: &mut dyn RecordSink,
    end_condition: EndCondition,
    mut side_effect: F,
) -> Result<(), SimError>
where
    F: FnMut(&Simulation, &StepOutput),
{
    let end = match end_condition {
        EndCondition::Ticks(ticks) => sim.current_tick() + ticks,
        EndCondition::Until(end) => end,
    };
    while sim.current_tick() < end {
        let output = sim.step();
        if let Some(period) = &output.period {
            sink.record_period(period)?;
        }
        sink.record_tick(&output.report)?;
        side_effect(sim, &output);
    }
    sink.finish()?;
    Ok(())
}
