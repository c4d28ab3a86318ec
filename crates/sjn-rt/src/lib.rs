// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Shortest-job-next readers-writers admission engine.
//!
//! Requests queue by declared duration (ties by submission order). Only
//! the head of the queue may try the lock; readers share it, a writer
//! holds it alone. Waits are condvar-driven, never polled.
//!
//! Components:
//! - request   - Request, Ticket, Mode, Phase
//! - queue     - AdmissionQueue, the SJN waiting room
//! - lock      - SharedResourceLock, readers-writers exclusion
//! - scheduler - the submit/admit/work/complete protocol
//! - observer  - transition hooks for harness reporting
//! - error     - SchedError, LockError

pub mod error;
pub mod lock;
pub mod observer;
pub mod queue;
pub mod request;
pub mod scheduler;

pub use error::{LockError, Result, SchedError, WaitStage};
pub use lock::{LockSnapshot, SharedResourceLock};
pub use observer::{Event, EventKind, EventLog, Observer};
pub use queue::AdmissionQueue;
pub use request::{Mode, Phase, Request, RequestId, Ticket};
pub use scheduler::Scheduler;
