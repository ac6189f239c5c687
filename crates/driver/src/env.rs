use crate::array::Array;
use crate::transition::{Action, Fields, Observation};

/// Outcome of a single [`Env::step`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvStep {
    pub observation: Observation,
    /// Scalar reward for the step.
    pub reward: Array,
    pub done: bool,
    /// Extra per-step data. A `discount` entry overrides the default of
    /// `1 - done`, e.g. to keep bootstrapping through a time-limit cut.
    pub info: Fields,
}

impl EnvStep {
    #[must_use]
    pub fn new(observation: Observation, reward: Array, done: bool) -> Self {
        Self { observation, reward, done, info: Fields::new() }
    }

    #[must_use]
    pub fn with_info(mut self, key: impl Into<String>, value: Array) -> Self {
        self.info.insert(key.into(), value);
        self
    }
}

/// Reinforcement learning environment trait.
///
/// Inspired by classic frameworks like OpenAI Gym, this trait defines the core
/// interface an environment must provide to be driven by a
/// [`Driver`](crate::Driver). Observations and actions are open-ended field
/// maps; each environment decides its own schema.
pub trait Env {
    /// Reset the environment to its starting state and return the initial
    /// observation.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the rollout that triggered the reset.
    fn reset(&mut self) -> anyhow::Result<Observation>;

    /// Advance the environment by one action.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the rollout that triggered the step.
    fn step(&mut self, action: &Action) -> anyhow::Result<EnvStep>;
}

impl<E: Env + ?Sized> Env for Box<E> {
    fn reset(&mut self) -> anyhow::Result<Observation> {
        (**self).reset()
    }

    fn step(&mut self, action: &Action) -> anyhow::Result<EnvStep> {
        (**self).step(action)
    }
}
