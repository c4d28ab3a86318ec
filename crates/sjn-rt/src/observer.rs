// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Transition notifications.
//!
//! The engine never prints. Harnesses hook an `Observer` in to report
//! submissions, admissions and completions however they like.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::request::{Mode, RequestId, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Submitted,
    /// Lock acquired; work is about to start.
    Admitted,
    /// Lock released and request dequeued.
    Completed,
    /// Shutdown cut a wait short; the request was dequeued unserved.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: RequestId,
    pub mode: Mode,
    pub duration: Duration,
    pub kind: EventKind,
}

impl Event {
    pub(crate) fn new(ticket: &Ticket, kind: EventKind) -> Self {
        Self {
            id: ticket.id(),
            mode: ticket.mode(),
            duration: ticket.duration(),
            kind,
        }
    }
}

/// Receives every transition. Called from participant threads, outside
/// any engine lock.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &Event);
}

impl<F> Observer for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// Records events in arrival order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn events_mut(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events_mut().clone()
    }

    /// Ids of the requests that reached `kind`, in the order they did.
    pub fn order_of(&self, kind: EventKind) -> Vec<RequestId> {
        self.events_mut()
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.id)
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events_mut().iter().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.events_mut().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events_mut().is_empty()
    }
}

impl Observer for EventLog {
    fn on_event(&self, event: &Event) {
        self.events_mut().push(event.clone());
    }
}
