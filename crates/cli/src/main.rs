// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing_subscriber::EnvFilter;

use conboot::config::Config;

fn main() {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = config.validate() {
        eprintln!("ERROR: {e}");
        std::process::exit(2);
    }

    match conboot::run::run(config) {
        Ok(outcome) if outcome.failed => {
            let message = outcome.errmsg.as_deref().unwrap_or("bootstrap failed");
            eprintln!("ERROR: {message}");
            std::process::exit(1);
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            std::process::exit(1);
        }
    }
}
