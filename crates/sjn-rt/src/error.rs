// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Engine error types.

use std::fmt;

use thiserror::Error;

use crate::request::{Mode, RequestId};

/// The suspension point a wait was cut short at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStage {
    /// Waiting to become head of the admission queue.
    Head,
    /// Head of queue, waiting for the shared resource lock.
    Lock,
}

impl fmt::Display for WaitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitStage::Head => write!(f, "queue head"),
            WaitStage::Lock => write!(f, "resource lock"),
        }
    }
}

/// Errors from the bare readers-writers lock. It does not know which
/// request is calling, the scheduler attaches that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("lock wait interrupted by shutdown")]
    Interrupted,
    #[error("{0} lock released but not held")]
    NotHeld(Mode),
}

/// A scheduling error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedError {
    /// The ticket is not a member of the queue, or not in the phase the
    /// operation needs. A protocol violation by the caller; never retried.
    #[error("request {id} is not an eligible member of the admission queue")]
    QueueConsistency { id: RequestId },

    /// Shutdown interrupted the wait. The request was removed from the
    /// queue and holds no lock.
    #[error("request {id} interrupted while waiting for {stage}")]
    InterruptedWait { id: RequestId, stage: WaitStage },

    /// A release for a lock mode nobody holds.
    #[error("{mode} lock released but not held")]
    LockNotHeld { mode: Mode },
}

impl SchedError {
    pub(crate) fn from_lock(err: LockError, id: RequestId) -> Self {
        match err {
            LockError::Interrupted => SchedError::InterruptedWait {
                id,
                stage: WaitStage::Lock,
            },
            LockError::NotHeld(mode) => SchedError::LockNotHeld { mode },
        }
    }

    /// True for the protocol violations (as opposed to shutdown).
    pub fn is_protocol_violation(&self) -> bool {
        !matches!(self, SchedError::InterruptedWait { .. })
    }
}

pub type Result<T> = std::result::Result<T, SchedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_interrupt_maps_to_lock_stage() {
        let err = SchedError::from_lock(LockError::Interrupted, RequestId(4));
        assert_eq!(
            err,
            SchedError::InterruptedWait {
                id: RequestId(4),
                stage: WaitStage::Lock
            }
        );
        assert!(!err.is_protocol_violation());
    }

    #[test]
    fn messages_name_the_request() {
        let err = SchedError::QueueConsistency { id: RequestId(2) };
        assert_eq!(
            err.to_string(),
            "request 2 is not an eligible member of the admission queue"
        );
        let err = SchedError::InterruptedWait {
            id: RequestId(9),
            stage: WaitStage::Head,
        };
        assert_eq!(err.to_string(), "request 9 interrupted while waiting for queue head");
    }
}
