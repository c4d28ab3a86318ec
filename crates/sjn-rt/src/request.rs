// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Requests and the tickets that track them through admission.

use std::fmt;
use std::time::Duration;

/// Identity of a submitted request. Caller-supplied or engine-assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access mode asked of the shared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Shared access, compatible with other readers.
    Read,
    /// Exclusive access.
    Write,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Read => write!(f, "read"),
            Mode::Write => write!(f, "write"),
        }
    }
}

/// A participant's bid for the resource. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    id: RequestId,
    duration: Duration,
    mode: Mode,
}

impl Request {
    pub fn new(id: RequestId, duration: Duration, mode: Mode) -> Self {
        Self { id, duration, mode }
    }

    pub fn reader(id: u64, duration: Duration) -> Self {
        Self::new(RequestId(id), duration, Mode::Read)
    }

    pub fn writer(id: u64, duration: Duration) -> Self {
        Self::new(RequestId(id), duration, Mode::Write)
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Declared service time, the SJN priority key.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// Ordering key inside the admission queue: duration first, then
/// submission sequence. Sequence numbers are unique per queue, so the
/// key is a total order.
pub(crate) type Key = (Duration, u64);

/// Handle to a submitted request.
///
/// Tickets are plain values: holding one proves nothing about membership,
/// the queue checks that on every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    id: RequestId,
    mode: Mode,
    duration: Duration,
    seq: u64,
}

impl Ticket {
    pub(crate) fn new(request: &Request, seq: u64) -> Self {
        Self {
            id: request.id,
            mode: request.mode,
            duration: request.duration,
            seq,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Position in submission order (0-based).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn key(&self) -> Key {
        (self.duration, self.seq)
    }
}

/// Where a queued request is in its admission cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Submitted, not yet holding the lock.
    Waiting,
    /// Holding the lock; work may be running.
    Admitted,
    /// Lock being handed back; removal follows.
    Releasing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_copies_request_fields() {
        let req = Request::writer(7, Duration::from_secs(2));
        let t = Ticket::new(&req, 3);
        assert_eq!(t.id(), RequestId(7));
        assert_eq!(t.mode(), Mode::Write);
        assert_eq!(t.duration(), Duration::from_secs(2));
        assert_eq!(t.seq(), 3);
    }

    #[test]
    fn key_orders_by_duration_then_seq() {
        let short_late = Ticket::new(&Request::reader(1, Duration::from_millis(1)), 9);
        let long_early = Ticket::new(&Request::reader(2, Duration::from_millis(5)), 0);
        let long_later = Ticket::new(&Request::reader(3, Duration::from_millis(5)), 1);
        assert!(short_late.key() < long_early.key());
        assert!(long_early.key() < long_later.key());
    }

    #[test]
    fn mode_display() {
        assert_eq!(Mode::Read.to_string(), "read");
        assert_eq!(Mode::Write.to_string(), "write");
    }
}
