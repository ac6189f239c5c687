use crate::config::Config;
use crate::transition::{Episode, Transition};

/// Observer invoked once per slot for every transition.
pub trait StepCallback {
    /// # Errors
    ///
    /// Any error aborts the current rollout.
    fn on_step(&mut self, transition: &Transition, config: &Config) -> anyhow::Result<()>;
}

/// Observer invoked once for every finished episode.
pub trait EpisodeCallback {
    /// # Errors
    ///
    /// Any error aborts the current rollout.
    fn on_episode(&mut self, episode: &Episode, config: &Config) -> anyhow::Result<()>;
}

impl<F> StepCallback for F
where
    F: FnMut(&Transition, &Config) -> anyhow::Result<()>,
{
    fn on_step(&mut self, transition: &Transition, config: &Config) -> anyhow::Result<()> {
        self(transition, config)
    }
}

impl<F> EpisodeCallback for F
where
    F: FnMut(&Episode, &Config) -> anyhow::Result<()>,
{
    fn on_episode(&mut self, episode: &Episode, config: &Config) -> anyhow::Result<()> {
        self(episode, config)
    }
}
