//! Backlog of clients waiting to present an attempt
//!
//! Holds legitimate clients that are still computing the required effort and
//! trimmed clients waiting to retry. Release is a prefix scan over the
//! clients sorted by attempt time.

use crate::client::Client;
use powsim_core::Tick;
use std::vec::Drain;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct Backlog {
    clients: Vec<Client>,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client; ordering is restored lazily on release.
    pub fn schedule(&mut self, client: Client) {
        self.clients.push(client);
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.clients.iter()
    }

    /// Earliest scheduled attempt, if any
    pub fn next_attempt_tick(&self) -> Option<f64> {
        self.clients
            .iter()
            .map(|c| c.next_attempt_tick)
            .min_by(f64::total_cmp)
    }

    /// Remove every client whose attempt time has been reached.
    ///
    /// Clients come out in ascending attempt-time order. The sort is stable,
    /// so clients scheduled for the same time keep their insertion order.
    pub fn release_ready(&mut self, tick: Tick) -> Drain<'_, Client> {
        self.clients
            .sort_by(|a, b| a.next_attempt_tick.total_cmp(&b.next_attempt_tick));
        let now = tick.as_f64();
        let ready = self
            .clients
            .partition_point(|client| client.next_attempt_tick <= now);
        trace!(
            released = ready,
            remaining = self.clients.len() - ready,
            "Backlog release"
        );
        self.clients.drain(..ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(time: f64, effort: f64) -> Client {
        Client::working(Tick::zero(), effort, time)
    }

    #[test]
    fn test_release_prefix_in_order() {
        let mut backlog = Backlog::new();
        backlog.schedule(at(5.0, 1.0));
        backlog.schedule(at(2.5, 2.0));
        backlog.schedule(at(3.0, 3.0));
        backlog.schedule(at(9.0, 4.0));

        let released: Vec<f64> = backlog
            .release_ready(Tick::new(5))
            .map(|c| c.next_attempt_tick)
            .collect();
        assert_eq!(released, vec![2.5, 3.0, 5.0]);
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog.next_attempt_tick(), Some(9.0));
    }

    #[test]
    fn test_nothing_ready() {
        let mut backlog = Backlog::new();
        backlog.schedule(at(1.5, 1.0));
        assert_eq!(backlog.release_ready(Tick::new(1)).count(), 0);
        assert_eq!(backlog.len(), 1);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut backlog = Backlog::new();
        backlog.schedule(at(4.0, 10.0));
        backlog.schedule(at(4.0, 20.0));
        backlog.schedule(at(4.0, 30.0));
        let efforts: Vec<f64> = backlog.release_ready(Tick::new(4)).map(|c| c.effort).collect();
        assert_eq!(efforts, vec![10.0, 20.0, 30.0]);
        assert!(backlog.is_empty());
    }
}
