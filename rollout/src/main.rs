//! # Rollout
//!
//! Entry point for the rollout binary.
//!
//! Builds a batch of reference environments, drives them with a random
//! policy and logs a line per finished episode plus a final summary. Useful
//! for smoke-testing the driver and for eyeballing episode statistics of the
//! bundled environments.

mod app;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = app::Args::parse();
    tracing_subscriber::fmt().with_max_level(args.log_level).init();
    app::run(&args)
}
