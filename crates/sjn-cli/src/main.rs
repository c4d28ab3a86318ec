// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! sjn - drives a fixed cast of readers and writers through the SJN scheduler.

mod cli;
mod commands;
mod config;
mod help;
mod logging;
mod output;
mod reporter;

use std::env;
use std::process;

use cli::Command;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let cli = match cli::parse(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}: {}", output::error_label(), e);
            eprintln!("{}: run `sjn help` for usage", output::hint_label());
            process::exit(2);
        }
    };

    output::init(cli.no_color);
    logging::init(cli.verbosity, cli.no_color);

    match cli.command {
        Command::Help => help::print_usage(),
        Command::Version => println!("sjn {}", env!("CARGO_PKG_VERSION")),
        Command::Run | Command::Show => {
            let env_unit = env::var(config::UNIT_ENV).ok();
            let scenario = match config::resolve(&cli.overrides, env_unit.as_deref()) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}: {}", output::error_label(), e);
                    process::exit(1);
                }
            };
            let result = if cli.command == Command::Show {
                commands::show::cmd_show(&scenario).map_err(|e| (e.to_string(), 1))
            } else {
                commands::run::cmd_run(&scenario)
                    .map(|_| ())
                    .map_err(|e| (e.to_string(), e.exit_code()))
            };
            if let Err((msg, code)) = result {
                eprintln!("{}: {}", output::error_label(), msg);
                eprintln!("\n{}", output::banner_fail("Run", &msg));
                process::exit(code);
            }
        }
    }
}
