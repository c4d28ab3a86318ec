// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Help text.

use crate::output;

pub fn print_usage() {
    println!(
        "{} {} - shortest-job-next readers/writers demo",
        output::title("sjn"),
        output::version(env!("CARGO_PKG_VERSION"))
    );
    println!();
    println!(
        "{}: {} {} {}",
        output::section_header("Usage"),
        output::command("sjn"),
        output::arg("[command]"),
        output::arg("[options]")
    );
    println!();
    println!("{}", output::section_header("Commands:"));
    println!("  {}              Run the participants (default)", output::command("run"));
    println!("  {}             Print the scenario and expected admission order", output::command("show"));
    println!("  {}             Show this help", output::command("help"));
    println!("  {}          Show version", output::command("version"));
    println!();
    println!("{}", output::section_header("Options:"));
    println!("  {} {}  Load participants from a JSON file", output::arg("-s, --scenario"), output::arg("<file>"));
    println!("  {} {}         Milliseconds per duration unit (env SJN_UNIT_MS)", output::arg("--unit-ms"), output::arg("<n>"));
    println!("  {}          Debug logging (env SJN_LOG overrides)", output::arg("-v, --verbose"));
    println!("  {}            Errors only", output::arg("-q, --quiet"));
    println!("  {}           Disable colors", output::arg("--no-color"));
}
