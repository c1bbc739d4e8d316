//! Bounded admission queue
//!
//! Clients presented during a tick are appended in arrival order. Once all
//! arrivals for the tick are in, [`AdmissionQueue::trim`] ranks the queue by
//! effort (stale attempts last) and cuts it back to capacity; service then
//! pops from the front of that ranking.

use crate::backoff::RetrySchedule;
use crate::client::Client;
use powsim_core::logging::events;
use powsim_core::Tick;
use std::collections::VecDeque;

/// What a trim pass removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrimOutcome {
    /// Effort of every removed client, in removal order
    pub trimmed_efforts: Vec<f64>,
    /// Retry clients for removed legitimate clients, ready for the backlog
    pub retries: Vec<Client>,
    /// Removed attackers, which are discarded
    pub discarded_attackers: usize,
}

impl TrimOutcome {
    pub fn trimmed(&self) -> usize {
        self.trimmed_efforts.len()
    }
}

/// What a service pass removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceOutcome {
    pub served: Vec<Client>,
    /// Clients popped but dropped because their window had closed
    pub expired: usize,
}

impl ServiceOutcome {
    pub fn legitimate(&self) -> impl Iterator<Item = &Client> {
        self.served.iter().filter(|c| !c.is_attacker())
    }
}

#[derive(Debug, Clone)]
pub struct AdmissionQueue {
    items: VecDeque<Client>,
    capacity: usize,
    timeout_window: u64,
    /// Total number of clients enqueued (for metrics)
    total_enqueued: u64,
    /// Total number of clients removed by trimming (for metrics)
    total_trimmed: u64,
}

impl AdmissionQueue {
    pub fn new(capacity: usize, timeout_window: u64) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            timeout_window,
            total_enqueued: 0,
            total_trimmed: 0,
        }
    }

    pub fn enqueue(&mut self, client: Client) {
        self.total_enqueued += 1;
        self.items.push_back(client);
    }

    /// Remove the client at the front of the current ordering
    pub fn dequeue(&mut self) -> Option<Client> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&Client> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the queue holds more clients than a trim would keep
    pub fn is_over_capacity(&self) -> bool {
        self.items.len() > self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.items.iter()
    }

    /// Sum of the effort currently waiting in the queue
    pub fn total_effort(&self) -> f64 {
        self.items.iter().map(|c| c.effort).sum()
    }

    pub fn total_enqueued(&self) -> u64 {
        self.total_enqueued
    }

    pub fn total_trimmed(&self) -> u64 {
        self.total_trimmed
    }

    /// Rank the queue and cut it back to capacity.
    ///
    /// Clients still inside their window are ordered by effort, highest
    /// first; timed-out clients rank as zero effort. The sort is stable, so
    /// equal priorities keep arrival order and trimming an already trimmed
    /// queue changes nothing.
    pub fn trim(&mut self, tick: Tick, schedule: &RetrySchedule) -> TrimOutcome {
        let timeout = self.timeout_window;
        self.items.make_contiguous().sort_by(|a, b| {
            b.trim_priority(tick, timeout)
                .total_cmp(&a.trim_priority(tick, timeout))
        });

        let mut outcome = TrimOutcome::default();
        if self.items.len() <= self.capacity {
            return outcome;
        }

        let removed = self.items.split_off(self.capacity);
        self.total_trimmed += removed.len() as u64;
        for client in removed {
            events::client_trimmed(tick, client.effort, client.is_attacker());
            outcome.trimmed_efforts.push(client.effort);
            if client.is_attacker() {
                outcome.discarded_attackers += 1;
            } else {
                outcome.retries.push(client.retry(tick, schedule));
            }
        }
        outcome
    }

    /// Serve up to `rate` clients from the front of the queue.
    ///
    /// Expired clients are popped and dropped without using a service slot.
    pub fn serve(&mut self, tick: Tick, rate: usize) -> ServiceOutcome {
        let mut outcome = ServiceOutcome::default();
        while outcome.served.len() < rate {
            let Some(client) = self.items.pop_front() else {
                break;
            };
            if client.is_expired(tick, self.timeout_window) {
                events::client_expired(tick, client.deadline(self.timeout_window));
                outcome.expired += 1;
                continue;
            }
            outcome.served.push(client);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::EffortBackoff;

    fn schedule() -> RetrySchedule {
        RetrySchedule {
            backoff: EffortBackoff::new(1000.0),
            timeout_window: 30,
            client_performance_rate: 1000.0,
        }
    }

    #[test]
    fn test_trim_keeps_highest_effort() {
        let mut queue = AdmissionQueue::new(2, 30);
        queue.enqueue(Client::attacker(Tick::new(0), 1001.0));
        queue.enqueue(Client::arriving(Tick::new(0), 3000.0, crate::Origin::Legitimate));
        queue.enqueue(Client::arriving(Tick::new(0), 500.0, crate::Origin::Legitimate));
        queue.enqueue(Client::attacker(Tick::new(0), 2000.0));

        let outcome = queue.trim(Tick::new(0), &schedule());
        assert_eq!(queue.len(), 2);
        let kept: Vec<f64> = queue.iter().map(|c| c.effort).collect();
        assert_eq!(kept, vec![3000.0, 2000.0]);
        assert_eq!(outcome.trimmed_efforts, vec![1001.0, 500.0]);
        assert_eq!(outcome.discarded_attackers, 1);
        assert_eq!(outcome.retries.len(), 1);
        assert_eq!(outcome.retries[0].effort, 1000.0);
        assert_eq!(outcome.retries[0].next_attempt_tick, 31.0);
        assert_eq!(queue.total_trimmed(), 2);
    }

    #[test]
    fn test_stale_clients_rank_last() {
        let mut queue = AdmissionQueue::new(1, 30);
        let stale = Client::working(Tick::new(0), 9000.0, 0.0);
        queue.enqueue(stale);
        queue.enqueue(Client::attacker(Tick::new(40), 1.0));

        let outcome = queue.trim(Tick::new(40), &schedule());
        assert_eq!(queue.peek().map(|c| c.effort), Some(1.0));
        assert_eq!(outcome.trimmed_efforts, vec![9000.0]);
    }

    #[test]
    fn test_trim_is_idempotent() {
        let mut queue = AdmissionQueue::new(3, 30);
        for effort in [5.0, 1.0, 4.0, 2.0, 3.0] {
            queue.enqueue(Client::attacker(Tick::new(1), effort));
        }
        queue.trim(Tick::new(1), &schedule());
        let before: Vec<Client> = queue.iter().cloned().collect();

        let again = queue.trim(Tick::new(1), &schedule());
        let after: Vec<Client> = queue.iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(again, TrimOutcome::default());
    }

    #[test]
    fn test_serve_skips_expired_without_using_slots() {
        let mut queue = AdmissionQueue::new(10, 30);
        queue.enqueue(Client::working(Tick::new(0), 1000.0, 0.0)); // deadline 30
        queue.enqueue(Client::attacker(Tick::new(30), 1.0));
        queue.enqueue(Client::attacker(Tick::new(30), 1.0));

        let outcome = queue.serve(Tick::new(30), 2);
        assert_eq!(outcome.expired, 1);
        assert_eq!(outcome.served.len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_serve_stops_at_rate_or_empty() {
        let mut queue = AdmissionQueue::new(10, 30);
        for _ in 0..5 {
            queue.enqueue(Client::attacker(Tick::new(0), 1.0));
        }
        assert_eq!(queue.serve(Tick::new(0), 3).served.len(), 3);
        assert_eq!(queue.serve(Tick::new(0), 3).served.len(), 2);
        assert_eq!(queue.serve(Tick::new(0), 3), ServiceOutcome::default());
    }
}
