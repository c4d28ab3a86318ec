// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `sjn run`: play the scenario against the scheduler.

use std::sync::Arc;
use std::thread;

use sjn_rt::{EventKind, Request, RequestId, SchedError, Scheduler, Ticket};
use thiserror::Error;
use tracing::{error, info};

use crate::config::Scenario;
use crate::output;
use crate::reporter::ConsoleReporter;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Sched(#[from] SchedError),
    #[error("could not start participant thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("participant {0} panicked")]
    Panicked(RequestId),
}

/// Exit code for an interrupted run, as opposed to a failed one.
pub const EXIT_INTERRUPTED: i32 = 3;

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Sched(err) if !err.is_protocol_violation() => EXIT_INTERRUPTED,
            _ => 1,
        }
    }
}

/// Run every participant to completion. Returns the admission order.
pub fn cmd_run(scenario: &Scenario) -> Result<Vec<RequestId>, RunError> {
    let reporter = Arc::new(ConsoleReporter::new(scenario.unit()));
    let scheduler = Scheduler::with_observer(reporter.clone());

    println!(
        "{} {} participants, {} ms per unit {}\n",
        output::dim("==="),
        scenario.participants.len(),
        scenario.unit_ms,
        output::dim("===")
    );

    // Everyone is submitted before anyone runs, so admission is pure SJN.
    let tickets: Vec<Ticket> = scenario
        .participants
        .iter()
        .map(|p| {
            scheduler.submit_request(Request::new(
                RequestId(p.id),
                scenario.work_time(p),
                p.role.mode(),
            ))
        })
        .collect();
    info!(count = tickets.len(), "all participants submitted");

    let scheduler = &scheduler;
    let outcomes = thread::scope(|s| {
        let mut handles = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let spawned = thread::Builder::new()
                .name(format!("participant-{}", ticket.id()))
                .spawn_scoped(s, move || {
                    scheduler.run(ticket, |t| thread::sleep(t.duration()))
                });
            match spawned {
                Ok(handle) => handles.push((ticket.id(), handle)),
                Err(err) => {
                    // The unstarted ticket would block everyone behind it.
                    error!(id = %ticket.id(), %err, "spawn failed, shutting down");
                    scheduler.shutdown();
                    return Err(RunError::Spawn(err));
                }
            }
        }
        handles
            .into_iter()
            .map(|(id, handle)| match handle.join() {
                Ok(result) => result.map_err(RunError::from),
                Err(_) => Err(RunError::Panicked(id)),
            })
            .collect::<Result<Vec<()>, RunError>>()
    });
    outcomes?;

    let order = reporter.log().order_of(EventKind::Admitted);
    println!();
    println!("Admission order: {}", summary(scenario, &order));
    println!("{}", output::banner_ok("Run"));
    Ok(order)
}

/// `W4 R3 R1 W2`
pub fn summary(scenario: &Scenario, order: &[RequestId]) -> String {
    order
        .iter()
        .filter_map(|id| scenario.participants.iter().find(|p| p.id == id.0))
        .map(|p| output::tag(p.role, p.id).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_role_tags() {
        colored::control::set_override(false);
        let scenario = Scenario::default();
        let order = [RequestId(4), RequestId(3), RequestId(1), RequestId(2)];
        assert_eq!(summary(&scenario, &order), "W4 R3 R1 W2");
    }

    #[test]
    fn interruption_exits_differently_from_misuse() {
        let interrupted = RunError::from(SchedError::InterruptedWait {
            id: RequestId(1),
            stage: sjn_rt::WaitStage::Lock,
        });
        assert_eq!(interrupted.exit_code(), EXIT_INTERRUPTED);
        let misuse = RunError::from(SchedError::QueueConsistency { id: RequestId(1) });
        assert_eq!(misuse.exit_code(), 1);
        assert_eq!(RunError::Panicked(RequestId(2)).exit_code(), 1);
    }

    #[test]
    fn fast_run_follows_sjn() {
        let scenario = Scenario {
            unit_ms: 2,
            ..Scenario::default()
        };
        let order = cmd_run(&scenario).unwrap();
        assert_eq!(
            order,
            vec![RequestId(4), RequestId(3), RequestId(1), RequestId(2)]
        );
    }
}
