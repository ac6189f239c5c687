//! # Rollout Application Logic
//!
//! Command-line options and the collection loop behind the `rollout` binary.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use driver::{Config, Driver, Env, Episode, EpisodeLogger, Transition};
use envs::{FixedLengthEnv, RandomPolicy, RollingSphereEnv};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvKind {
    /// Deterministic episodes of `--episode-length` steps.
    Fixed,
    /// One-dimensional rolling sphere with a time limit.
    Sphere,
}

#[derive(Debug, Parser)]
#[command(name = "rollout", about = "Collect batched rollouts with a random policy")]
pub struct Args {
    /// Environment to instantiate in every slot.
    #[arg(long, value_enum, default_value_t = EnvKind::Sphere)]
    pub env: EnvKind,

    /// Number of environments stepped in lockstep.
    #[arg(long, default_value_t = 4)]
    pub envs: usize,

    /// Minimum number of environment steps, summed over slots.
    #[arg(long, default_value_t = 0)]
    pub steps: usize,

    /// Minimum number of finished episodes, summed over slots.
    #[arg(long, default_value_t = 8)]
    pub episodes: usize,

    /// Episode length for `fixed`, step limit for `sphere`.
    #[arg(long, default_value_t = 100)]
    pub episode_length: u32,

    /// Seed for the random policy.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// JSON object forwarded to the policy and every callback.
    #[arg(long, default_value = "{}")]
    pub config: String,

    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

fn make_env(kind: EnvKind, episode_length: u32) -> Box<dyn Env> {
    match kind {
        EnvKind::Fixed => Box::new(FixedLengthEnv::new(episode_length.max(1))),
        EnvKind::Sphere => Box::new(RollingSphereEnv::new(episode_length as usize)),
    }
}

/// Collects rollouts as described by `args`.
///
/// # Errors
///
/// Returns an error if `--config` is not a JSON object or if the rollout
/// itself fails.
pub fn run(args: &Args) -> Result<()> {
    let config = Config::from_json(&args.config).context("--config must be a JSON object")?;
    let envs = (0..args.envs).map(|_| make_env(args.env, args.episode_length)).collect();
    let mut driver = Driver::new(envs, config);

    let returns = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&returns);
    driver.on_episode(move |episode: &Episode, _: &Config| -> Result<()> {
        sink.borrow_mut().push(episode.total_reward());
        Ok(())
    });
    driver.on_episode(EpisodeLogger::new());

    let counter = Rc::new(RefCell::new(0usize));
    let steps = Rc::clone(&counter);
    driver.on_step(move |_: &Transition, _: &Config| -> Result<()> {
        *steps.borrow_mut() += 1;
        Ok(())
    });

    tracing::info!(
        env = ?args.env,
        slots = args.envs,
        steps = args.steps,
        episodes = args.episodes,
        "collecting rollouts"
    );
    let mut policy = RandomPolicy::new(RollingSphereEnv::ACTION, 1, -10.0, 10.0, args.seed);
    let stats = driver.run(&mut policy, args.steps, args.episodes)?;
    let transitions = *counter.borrow();

    let returns = returns.borrow();
    #[allow(clippy::cast_precision_loss)]
    let mean_return = if returns.is_empty() {
        0.0
    } else {
        returns.iter().sum::<f64>() / returns.len() as f64
    };
    tracing::info!(
        iterations = stats.iterations,
        transitions,
        episodes = stats.episodes,
        mean_return,
        "done"
    );
    Ok(())
}
