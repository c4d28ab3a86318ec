// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The admission protocol: queue head first, then the lock.
//!
//! Every request goes `submit → wait for head → acquire → work → release →
//! remove`. The head wait and the lock wait are separate: a reader can be
//! head while a writer is still writing, and the lock can be free while a
//! request is not yet head.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::error::{Result, SchedError};
use crate::lock::{LockSnapshot, SharedResourceLock};
use crate::observer::{Event, EventKind, Observer};
use crate::queue::AdmissionQueue;
use crate::request::{Mode, Phase, Request, RequestId, Ticket};

/// Shortest-job-next readers-writers scheduler.
///
/// Owns the queue and the lock; participants only see tickets.
pub struct Scheduler {
    queue: AdmissionQueue,
    lock: SharedResourceLock,
    observer: Option<Arc<dyn Observer>>,
    next_id: AtomicU64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            queue: AdmissionQueue::new(),
            lock: SharedResourceLock::new(),
            observer: None,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_observer(observer: Arc<dyn Observer>) -> Self {
        Self {
            observer: Some(observer),
            ..Self::new()
        }
    }

    fn emit(&self, ticket: &Ticket, kind: EventKind) {
        if let Some(observer) = &self.observer {
            observer.on_event(&Event::new(ticket, kind));
        }
    }

    /// Submit with an engine-assigned id.
    pub fn submit(&self, duration: Duration, mode: Mode) -> Ticket {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.submit_request(Request::new(id, duration, mode))
    }

    /// Submit a request carrying its own id.
    pub fn submit_request(&self, request: Request) -> Ticket {
        let ticket = self.queue.submit(request);
        debug!(
            id = %ticket.id(),
            mode = %ticket.mode(),
            duration = ?ticket.duration(),
            seq = ticket.seq(),
            "submitted"
        );
        self.emit(&ticket, EventKind::Submitted);
        ticket
    }

    /// Wait until `ticket` is head, then take the lock in its mode.
    ///
    /// On interruption the request is dequeued before the error returns.
    pub fn admit(&self, ticket: &Ticket) -> Result<()> {
        if self.queue.phase(ticket) != Some(Phase::Waiting) {
            return Err(SchedError::QueueConsistency { id: ticket.id() });
        }
        loop {
            if let Err(err) = self.queue.wait_for_head(ticket) {
                return Err(self.abandon(ticket, err));
            }
            // Head status is re-checked on every lock wake-up: a shorter
            // request may have arrived while this one was parked.
            match self
                .lock
                .acquire_gated(ticket.mode(), || self.queue.is_head(ticket))
            {
                Ok(true) => break,
                Ok(false) => trace!(id = %ticket.id(), "lost head while waiting for lock"),
                Err(err) => {
                    return Err(self.abandon(ticket, SchedError::from_lock(err, ticket.id())))
                }
            }
        }
        if let Err(err) = self.queue.transition(ticket, Phase::Waiting, Phase::Admitted) {
            // Someone else admitted or removed this ticket meanwhile.
            let _ = self.lock.release(ticket.mode());
            return Err(err);
        }
        debug!(id = %ticket.id(), mode = %ticket.mode(), "admitted");
        self.emit(ticket, EventKind::Admitted);
        Ok(())
    }

    /// Release the lock and dequeue. Only valid once per admitted ticket.
    pub fn complete(&self, ticket: &Ticket) -> Result<Request> {
        self.queue
            .transition(ticket, Phase::Admitted, Phase::Releasing)?;
        self.lock
            .release(ticket.mode())
            .map_err(|err| SchedError::from_lock(err, ticket.id()))?;
        let request = self.queue.remove(ticket)?;
        debug!(id = %ticket.id(), mode = %ticket.mode(), "completed");
        self.emit(ticket, EventKind::Completed);
        Ok(request)
    }

    fn abandon(&self, ticket: &Ticket, err: SchedError) -> SchedError {
        if let SchedError::InterruptedWait { stage, .. } = &err {
            // Only a still-waiting ticket is ours to drop. If another caller
            // admitted it meanwhile, that caller owns the lock and the removal.
            if self.queue.remove_waiting(ticket).is_ok() {
                warn!(id = %ticket.id(), %stage, "wait interrupted, dequeuing");
                self.emit(ticket, EventKind::Interrupted);
            }
        }
        err
    }

    /// Admit `ticket`, run `work`, then release and dequeue.
    ///
    /// Cleanup happens on every exit path, including a panic in `work`.
    pub fn run<R, F>(&self, ticket: Ticket, work: F) -> Result<R>
    where
        F: FnOnce(&Ticket) -> R,
    {
        self.admit(&ticket)?;
        let mut admission = Admission {
            scheduler: self,
            ticket,
            done: false,
        };
        let output = work(&ticket);
        admission.finish()?;
        Ok(output)
    }

    /// Submit and block until `work` has run and the request is cleaned up.
    pub fn request<R, F>(&self, duration: Duration, mode: Mode, work: F) -> Result<R>
    where
        F: FnOnce(&Ticket) -> R,
    {
        let ticket = self.submit(duration, mode);
        self.run(ticket, work)
    }

    /// Interrupt every suspended wait. In-progress work finishes normally.
    pub fn shutdown(&self) {
        warn!(pending = self.queue.len(), "scheduler shutting down");
        self.queue.shutdown();
        self.lock.shutdown();
    }

    pub fn is_head(&self, ticket: &Ticket) -> bool {
        self.queue.is_head(ticket)
    }

    pub fn head(&self) -> Option<RequestId> {
        self.queue.head()
    }

    /// Queued ids (waiting and admitted) in priority order.
    pub fn pending(&self) -> Vec<RequestId> {
        self.queue.snapshot()
    }

    pub fn phase(&self, ticket: &Ticket) -> Option<Phase> {
        self.queue.phase(ticket)
    }

    pub fn lock_snapshot(&self) -> LockSnapshot {
        self.lock.snapshot()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Completes its ticket on drop unless `finish` already did.
struct Admission<'a> {
    scheduler: &'a Scheduler,
    ticket: Ticket,
    done: bool,
}

impl Admission<'_> {
    fn finish(&mut self) -> Result<Request> {
        self.done = true;
        self.scheduler.complete(&self.ticket)
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        if !self.done {
            warn!(id = %self.ticket.id(), "work unwound, releasing");
            let _ = self.scheduler.complete(&self.ticket);
        }
    }
}
