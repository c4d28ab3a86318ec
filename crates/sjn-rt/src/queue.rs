// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Admission queue: the SJN waiting room.
//!
//! Members are ordered by declared duration, ties by submission order.
//! A request stays a member from `submit` until `remove`, admitted or not,
//! and eligibility is "my key is the minimum key present". Waiters sleep on
//! one condvar that every mutation signals.

use std::collections::BTreeMap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::error::{Result, SchedError, WaitStage};
use crate::request::{Key, Phase, Request, RequestId, Ticket};

struct Entry {
    request: Request,
    phase: Phase,
}

struct QueueState {
    members: BTreeMap<Key, Entry>,
    next_seq: u64,
    interrupted: bool,
}

impl QueueState {
    fn is_head(&self, ticket: &Ticket) -> bool {
        self.members.keys().next() == Some(&ticket.key())
    }

    fn entry(&self, ticket: &Ticket) -> Option<&Entry> {
        self.members
            .get(&ticket.key())
            .filter(|e| e.request.id() == ticket.id())
    }
}

/// Priority-ordered set of pending requests. Unbounded.
pub struct AdmissionQueue {
    state: Mutex<QueueState>,
    changed: Condvar,
}

impl AdmissionQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                members: BTreeMap::new(),
                next_seq: 0,
                interrupted: false,
            }),
            changed: Condvar::new(),
        }
    }

    // No critical section below can panic halfway through an update, so a
    // poisoned guard still holds consistent state.
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a request. Always succeeds.
    pub fn submit(&self, request: Request) -> Ticket {
        let ticket = {
            let mut state = self.state();
            let ticket = Ticket::new(&request, state.next_seq);
            state.next_seq += 1;
            state.members.insert(
                ticket.key(),
                Entry {
                    request,
                    phase: Phase::Waiting,
                },
            );
            ticket
        };
        self.changed.notify_all();
        ticket
    }

    /// Is `ticket` the current minimum? Pure query.
    pub fn is_head(&self, ticket: &Ticket) -> bool {
        self.state().is_head(ticket)
    }

    /// Block until `ticket` is head of the queue.
    pub fn wait_for_head(&self, ticket: &Ticket) -> Result<()> {
        let mut state = self.state();
        loop {
            if state.interrupted {
                return Err(SchedError::InterruptedWait {
                    id: ticket.id(),
                    stage: WaitStage::Head,
                });
            }
            if state.entry(ticket).is_none() {
                return Err(SchedError::QueueConsistency { id: ticket.id() });
            }
            if state.is_head(ticket) {
                return Ok(());
            }
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            trace!(id = %ticket.id(), "woke on queue change");
        }
    }

    pub fn phase(&self, ticket: &Ticket) -> Option<Phase> {
        self.state().entry(ticket).map(|e| e.phase)
    }

    /// Move a member from `from` to `to`. Fails if the ticket is absent or
    /// in any other phase, which is how double admission and double
    /// completion get caught.
    pub fn transition(&self, ticket: &Ticket, from: Phase, to: Phase) -> Result<()> {
        let mut state = self.state();
        match state.members.get_mut(&ticket.key()) {
            Some(entry) if entry.request.id() == ticket.id() && entry.phase == from => {
                entry.phase = to;
                Ok(())
            }
            _ => Err(SchedError::QueueConsistency { id: ticket.id() }),
        }
    }

    /// Remove a member, handing back its request.
    pub fn remove(&self, ticket: &Ticket) -> Result<Request> {
        let removed = {
            let mut state = self.state();
            if state.entry(ticket).is_none() {
                return Err(SchedError::QueueConsistency { id: ticket.id() });
            }
            state.members.remove(&ticket.key())
        };
        self.changed.notify_all();
        removed
            .map(|e| e.request)
            .ok_or(SchedError::QueueConsistency { id: ticket.id() })
    }

    /// Remove a member only if it has not been admitted yet.
    pub fn remove_waiting(&self, ticket: &Ticket) -> Result<Request> {
        let removed = {
            let mut state = self.state();
            match state.entry(ticket) {
                Some(entry) if entry.phase == Phase::Waiting => {}
                _ => return Err(SchedError::QueueConsistency { id: ticket.id() }),
            }
            state.members.remove(&ticket.key())
        };
        self.changed.notify_all();
        removed
            .map(|e| e.request)
            .ok_or(SchedError::QueueConsistency { id: ticket.id() })
    }

    pub fn head(&self) -> Option<RequestId> {
        self.state().members.values().next().map(|e| e.request.id())
    }

    /// Member ids in priority order.
    pub fn snapshot(&self) -> Vec<RequestId> {
        self.state().members.values().map(|e| e.request.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.state().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().members.is_empty()
    }

    /// Fail every current and future head wait with `InterruptedWait`.
    pub fn shutdown(&self) {
        self.state().interrupted = true;
        self.changed.notify_all();
    }
}

impl Default for AdmissionQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn head_is_shortest() {
        let q = AdmissionQueue::new();
        let a = q.submit(Request::reader(1, ms(3)));
        let b = q.submit(Request::reader(2, ms(5)));
        let c = q.submit(Request::writer(3, ms(2)));
        assert!(q.is_head(&c));
        assert!(!q.is_head(&a));
        assert!(!q.is_head(&b));
        assert_eq!(q.snapshot(), vec![RequestId(3), RequestId(1), RequestId(2)]);
    }

    #[test]
    fn equal_durations_keep_submission_order() {
        let q = AdmissionQueue::new();
        let first = q.submit(Request::reader(10, ms(4)));
        let second = q.submit(Request::writer(11, ms(4)));
        assert!(q.is_head(&first));
        q.remove(&first).unwrap();
        assert!(q.is_head(&second));
    }

    #[test]
    fn is_head_has_no_side_effects() {
        let q = AdmissionQueue::new();
        let t = q.submit(Request::reader(1, ms(1)));
        for _ in 0..5 {
            assert!(q.is_head(&t));
        }
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn empty_queue_has_no_head() {
        let q = AdmissionQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.head(), None);
    }

    #[test]
    fn remove_twice_is_rejected() {
        let q = AdmissionQueue::new();
        let t = q.submit(Request::reader(5, ms(1)));
        assert_eq!(q.remove(&t).unwrap().id(), RequestId(5));
        assert_eq!(
            q.remove(&t),
            Err(SchedError::QueueConsistency { id: RequestId(5) })
        );
    }

    #[test]
    fn remove_waiting_leaves_admitted_members() {
        let q = AdmissionQueue::new();
        let t = q.submit(Request::reader(1, ms(1)));
        q.transition(&t, Phase::Waiting, Phase::Admitted).unwrap();
        assert!(q.remove_waiting(&t).is_err());
        assert_eq!(q.phase(&t), Some(Phase::Admitted));

        let waiting = q.submit(Request::reader(2, ms(2)));
        assert_eq!(q.remove_waiting(&waiting).unwrap().id(), RequestId(2));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn transition_checks_phase() {
        let q = AdmissionQueue::new();
        let t = q.submit(Request::writer(1, ms(1)));
        assert_eq!(q.phase(&t), Some(Phase::Waiting));
        q.transition(&t, Phase::Waiting, Phase::Admitted).unwrap();
        assert!(q.transition(&t, Phase::Waiting, Phase::Admitted).is_err());
        assert_eq!(q.phase(&t), Some(Phase::Admitted));
    }

    #[test]
    fn waiter_wakes_when_head_removed() {
        let q = AdmissionQueue::new();
        let head = q.submit(Request::reader(1, ms(1)));
        let next = q.submit(Request::reader(2, ms(2)));
        let (tx, rx) = mpsc::channel();
        let q = &q;
        std::thread::scope(|s| {
            s.spawn(move || {
                q.wait_for_head(&next).unwrap();
                tx.send(()).unwrap();
            });
            assert!(rx.recv_timeout(ms(30)).is_err());
            q.remove(&head).unwrap();
            assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        });
    }

    #[test]
    fn shutdown_interrupts_waiters() {
        let q = AdmissionQueue::new();
        let _head = q.submit(Request::reader(1, ms(1)));
        let next = q.submit(Request::reader(2, ms(2)));
        std::thread::scope(|s| {
            let waiter = s.spawn(|| q.wait_for_head(&next));
            std::thread::sleep(ms(20));
            q.shutdown();
            assert_eq!(
                waiter.join().unwrap(),
                Err(SchedError::InterruptedWait {
                    id: RequestId(2),
                    stage: WaitStage::Head
                })
            );
        });
        assert!(q.wait_for_head(&next).is_err());
    }
}
