//! A botnet that precomputes offline and bursts just before an update boundary
//!
//! Prints one line per update period showing how each recommender reacts.

use powsim::prelude::*;

fn main() -> Result<(), SimError> {
    powsim::core::init_simulation_logging_with_level("warn");

    for kind in [
        RecommenderKind::Throughput,
        RecommenderKind::MaxTrimmed,
        RecommenderKind::MedianTrimmed,
    ] {
        let config = ScenarioConfig::default()
            .with_recommender(kind)
            .with_attack(AttackConfig::precomputed(
                BotnetSize::Small,
                Tick::new(150),
                Tick::new(1950),
            ))
            .with_ticks(3000);
        let mut sim = Simulation::new(config)?;
        let mut recorder = RunRecorder::new(sim.queue().capacity());
        sim.run(&mut recorder)?;

        println!("== {kind:?}");
        for period in recorder.periods() {
            println!(
                "tick {:>5}  effort {:>12.1}  handled {:>6} ({:>5} legitimate)  trimmed {:>6}",
                period.tick,
                period.descriptor_effort,
                period.handled,
                period.handled_legitimate,
                period.trimmed
            );
        }
        let summary = recorder.summary();
        println!(
            "starved periods: {}, mean time-to-connect: {:?}",
            summary.starved_periods, summary.ttc_mean
        );
    }
    Ok(())
}
