// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI output formatting with colors and styling.
//!
//! Respects NO_COLOR and FORCE_COLOR environment variables.

use colored::{ColoredString, Colorize};

use crate::config::Role;

/// Initialize color support based on environment and `--no-color`.
/// Call once at startup.
pub fn init(no_color: bool) {
    if no_color || std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    } else if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
    }
}

// === Errors ===

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn hint_label() -> ColoredString {
    "hint".cyan()
}

pub fn banner_ok(phase: &str) -> String {
    format!(
        "{} {} {}",
        "===".dimmed(),
        format!("{} OK", phase).green().bold(),
        "===".dimmed()
    )
}

pub fn banner_fail(phase: &str, msg: &str) -> String {
    format!(
        "{} {} {}",
        "===".dimmed(),
        format!("{} FAILED: {}", phase, msg).red().bold(),
        "===".dimmed()
    )
}

// === Participants ===

/// `Reader 3` / `Writer 4`, colored by role.
pub fn participant(role: Role, id: u64) -> ColoredString {
    let label = format!("{} {}", role.title(), id);
    match role {
        Role::Reader => label.cyan().bold(),
        Role::Writer => label.magenta().bold(),
    }
}

/// `R3` / `W4`, colored by role.
pub fn tag(role: Role, id: u64) -> ColoredString {
    let label = format!("{}{}", role.tag(), id);
    match role {
        Role::Reader => label.cyan(),
        Role::Writer => label.magenta(),
    }
}

pub fn units(n: u64) -> String {
    if n == 1 {
        "1 unit".to_string()
    } else {
        format!("{} units", n)
    }
}

pub fn dim(msg: &str) -> ColoredString {
    msg.dimmed()
}

// === Help ===

pub fn title(name: &str) -> ColoredString {
    name.bold()
}

pub fn version(v: &str) -> ColoredString {
    v.dimmed()
}

pub fn section_header(header: &str) -> ColoredString {
    header.yellow().bold()
}

pub fn command(name: &str) -> ColoredString {
    name.green()
}

pub fn arg(name: &str) -> ColoredString {
    name.cyan()
}
