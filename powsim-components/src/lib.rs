//! Simulation components for proof-of-work admission control
//!
//! The pieces the tick loop is assembled from, leaves first:
//!
//! - [`backoff`]: how a retried client's effort escalates
//! - [`client`]: one connection attempt
//! - [`backlog`]: clients still computing or waiting to retry
//! - [`queue`]: the bounded admission queue with trimming and service
//! - [`recommender`]: policies that publish the required effort
//! - [`attacker`]: adversarial arrival strategies

pub mod attacker;
pub mod backlog;
pub mod backoff;
pub mod client;
pub mod queue;
pub mod recommender;

pub use attacker::{strategy_for, AttackStrategy, PrecomputedBurst, SustainedFlood};
pub use backlog::Backlog;
pub use backoff::{next_effort, EffortBackoff, RetrySchedule};
pub use client::{Client, Origin};
pub use queue::{AdmissionQueue, ServiceOutcome, TrimOutcome};
pub use recommender::{
    median, policy_for, EffortPolicy, EffortRecommender, MaxTrimmedPolicy, MedianTrimmedPolicy,
    PeriodObservation, RecommenderState, ThroughputPolicy,
};
