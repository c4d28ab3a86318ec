// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Console reporting of participant transitions.

use std::time::Duration;

use sjn_rt::{Event, EventKind, EventLog, Observer};

use crate::config::Role;
use crate::output;

/// Prints one line per transition and keeps a log for the summary.
pub struct ConsoleReporter {
    unit: Duration,
    log: EventLog,
}

impl ConsoleReporter {
    pub fn new(unit: Duration) -> Self {
        Self {
            unit,
            log: EventLog::new(),
        }
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    fn units(&self, d: Duration) -> u64 {
        let unit = self.unit.as_millis().max(1);
        (d.as_millis() / unit) as u64
    }

    pub fn line(&self, event: &Event) -> String {
        let role = Role::from_mode(event.mode);
        let who = output::participant(role, event.id.0);
        match event.kind {
            EventKind::Submitted => format!(
                "{} {}",
                who,
                output::dim(&format!("queued ({})", output::units(self.units(event.duration))))
            ),
            EventKind::Admitted => format!(
                "{} is {} for {}.",
                who,
                role.verb(),
                output::units(self.units(event.duration))
            ),
            EventKind::Completed => format!("{} finished {}.", who, role.verb()),
            EventKind::Interrupted => format!("{} was interrupted before starting.", who),
        }
    }
}

impl Observer for ConsoleReporter {
    fn on_event(&self, event: &Event) {
        println!("{}", self.line(event));
        self.log.on_event(event);
    }
}
