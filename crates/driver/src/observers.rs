//! Ready-made observers for [`Driver`](crate::Driver).

use crate::callback::{EpisodeCallback, StepCallback};
use crate::config::Config;
use crate::transition::{Episode, Transition};
use std::cell::RefCell;
use std::rc::Rc;

/// Logs length and return of every finished episode.
///
/// The `mode` config entry, if present, is attached to every event so that
/// train and eval drivers sharing one logger stay distinguishable.
#[derive(Debug, Default)]
pub struct EpisodeLogger {
    episodes: usize,
}

impl EpisodeLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EpisodeCallback for EpisodeLogger {
    fn on_episode(&mut self, episode: &Episode, config: &Config) -> anyhow::Result<()> {
        self.episodes += 1;
        tracing::info!(
            mode = config.get_str("mode").unwrap_or("default"),
            episode = self.episodes,
            length = episode.len(),
            total_reward = episode.total_reward(),
            "episode"
        );
        Ok(())
    }
}

/// In-memory sink for transitions or episodes.
///
/// Clones share the same storage, so keep one handle and register the other
/// with the driver.
#[derive(Debug)]
pub struct Collector<T> {
    items: Rc<RefCell<Vec<T>>>,
}

impl<T> Collector<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { items: Rc::new(RefCell::new(Vec::new())) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Removes and returns everything collected so far.
    #[must_use]
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.items.borrow_mut())
    }
}

impl<T: Clone> Collector<T> {
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.items.borrow().clone()
    }
}

impl<T> Clone for Collector<T> {
    fn clone(&self) -> Self {
        Self { items: Rc::clone(&self.items) }
    }
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl StepCallback for Collector<Transition> {
    fn on_step(&mut self, transition: &Transition, _config: &Config) -> anyhow::Result<()> {
        self.items.borrow_mut().push(transition.clone());
        Ok(())
    }
}

impl EpisodeCallback for Collector<Episode> {
    fn on_episode(&mut self, episode: &Episode, _config: &Config) -> anyhow::Result<()> {
        self.items.borrow_mut().push(episode.clone());
        Ok(())
    }
}
