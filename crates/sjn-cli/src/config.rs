// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Scenario configuration.
//!
//! Precedence: `--unit-ms` flag, then `SJN_UNIT_MS`, then the scenario
//! file, then the built-in demo cast.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sjn_rt::Mode;
use thiserror::Error;

pub const DEFAULT_UNIT_MS: u64 = 1000;
pub const UNIT_ENV: &str = "SJN_UNIT_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot render scenario as JSON: {0}")]
    Render(#[source] serde_json::Error),
    #[error("scenario has no participants")]
    Empty,
    #[error("participant {id} has a zero duration")]
    ZeroDuration { id: u64 },
    #[error("participant id {id} appears more than once")]
    DuplicateId { id: u64 },
    #[error("time unit must be at least 1 ms")]
    ZeroUnit,
    #[error("invalid value for {name}: `{value}`")]
    BadValue { name: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reader,
    Writer,
}

impl Role {
    pub fn mode(self) -> Mode {
        match self {
            Role::Reader => Mode::Read,
            Role::Writer => Mode::Write,
        }
    }

    pub fn from_mode(mode: Mode) -> Self {
        match mode {
            Mode::Read => Role::Reader,
            Mode::Write => Role::Writer,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Role::Reader => "Reader",
            Role::Writer => "Writer",
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Role::Reader => "reading",
            Role::Writer => "writing",
        }
    }

    /// One-letter tag for compact summaries: `R3`, `W4`.
    pub fn tag(self) -> char {
        match self {
            Role::Reader => 'R',
            Role::Writer => 'W',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSpec {
    pub id: u64,
    pub role: Role,
    /// Declared duration in time units.
    pub duration: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_unit_ms")]
    pub unit_ms: u64,
    pub participants: Vec<ParticipantSpec>,
}

fn default_unit_ms() -> u64 {
    DEFAULT_UNIT_MS
}

impl Default for Scenario {
    fn default() -> Self {
        let cast = [
            (1, Role::Reader, 3),
            (2, Role::Writer, 5),
            (3, Role::Reader, 2),
            (4, Role::Writer, 1),
        ];
        Self {
            unit_ms: DEFAULT_UNIT_MS,
            participants: cast
                .into_iter()
                .map(|(id, role, duration)| ParticipantSpec { id, role, duration })
                .collect(),
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit_ms == 0 {
            return Err(ConfigError::ZeroUnit);
        }
        if self.participants.is_empty() {
            return Err(ConfigError::Empty);
        }
        let mut seen = std::collections::HashSet::new();
        for p in &self.participants {
            if p.duration == 0 {
                return Err(ConfigError::ZeroDuration { id: p.id });
            }
            if !seen.insert(p.id) {
                return Err(ConfigError::DuplicateId { id: p.id });
            }
        }
        Ok(())
    }

    pub fn unit(&self) -> Duration {
        Duration::from_millis(self.unit_ms)
    }

    /// Wall-clock work time for a participant.
    pub fn work_time(&self, participant: &ParticipantSpec) -> Duration {
        Duration::from_millis(self.unit_ms.saturating_mul(participant.duration))
    }

    /// Admission order when every participant is submitted at once:
    /// shortest first, ties in cast order.
    pub fn expected_order(&self) -> Vec<&ParticipantSpec> {
        let mut order: Vec<_> = self.participants.iter().collect();
        order.sort_by_key(|p| p.duration);
        order
    }
}

/// Settings that come from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub scenario: Option<PathBuf>,
    pub unit_ms: Option<u64>,
}

/// Build the effective scenario. `env_unit` is the raw `SJN_UNIT_MS` value.
pub fn resolve(overrides: &Overrides, env_unit: Option<&str>) -> Result<Scenario, ConfigError> {
    let mut scenario = match &overrides.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    if let Some(raw) = env_unit {
        scenario.unit_ms = parse_unit(UNIT_ENV, raw)?;
    }
    if let Some(unit_ms) = overrides.unit_ms {
        scenario.unit_ms = unit_ms;
    }
    scenario.validate()?;
    Ok(scenario)
}

pub fn parse_unit(name: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::BadValue {
        name: name.to_string(),
        value: raw.to_string(),
    })
}
