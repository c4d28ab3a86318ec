// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `sjn show`: print the resolved scenario and the order SJN will admit it in.

use sjn_rt::RequestId;

use crate::config::{ConfigError, Scenario};
use crate::output;

pub fn cmd_show(scenario: &Scenario) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(scenario).map_err(ConfigError::Render)?;
    println!("{}", output::section_header("Scenario:"));
    println!("{}", json);
    println!();

    let order: Vec<RequestId> = scenario
        .expected_order()
        .iter()
        .map(|p| RequestId(p.id))
        .collect();
    println!(
        "{} {}",
        output::section_header("Expected admission order:"),
        super::run::summary(scenario, &order)
    );
    Ok(())
}
