//! # Rollout Driver
//!
//! [`Driver`] steps a fixed batch of environments with a single policy. Each
//! iteration resets finished environments, stacks the per-slot observations
//! into one batch, asks the policy for a batch of actions, steps every
//! environment with its slice of that batch and hands the resulting
//! transitions and finished episodes to the registered observers.
//!
//! Environments terminate independently. A slot whose episode ended is reset
//! at the start of the next iteration while the other slots keep running, so
//! the batch always holds exactly one live episode per environment.

use crate::array::Array;
use crate::callback::{EpisodeCallback, StepCallback};
use crate::config::Config;
use crate::env::{Env, EnvStep};
use crate::episode::EpisodeBuffer;
use crate::error::DriverError;
use crate::policy::{Policy, PolicyState};
use crate::transition::{Action, Fields, Observation, Transition, DISCOUNT, REWARD};
use std::fmt;

/// Per-environment bookkeeping.
#[derive(Debug, Clone)]
pub struct SlotState {
    observation: Observation,
    done: bool,
    episode: EpisodeBuffer,
}

impl SlotState {
    fn new() -> Self {
        Self { observation: Observation::new(), done: true, episode: EpisodeBuffer::default() }
    }

    /// Observation the next action will be chosen from.
    #[must_use]
    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    /// Whether the environment will be reset before the next step.
    #[must_use]
    pub fn done(&self) -> bool {
        self.done
    }

    #[must_use]
    pub fn episode(&self) -> &EpisodeBuffer {
        &self.episode
    }
}

/// Everything the driver carries from one iteration to the next.
///
/// Starts with every slot marked done so the first iteration resets all
/// environments, and with no policy state.
pub struct DriverState {
    slots: Vec<SlotState>,
    policy_state: Option<PolicyState>,
}

impl DriverState {
    #[must_use]
    pub fn new(num_slots: usize) -> Self {
        Self { slots: (0..num_slots).map(|_| SlotState::new()).collect(), policy_state: None }
    }

    #[must_use]
    pub fn slots(&self) -> &[SlotState] {
        &self.slots
    }

    #[must_use]
    pub fn has_policy_state(&self) -> bool {
        self.policy_state.is_some()
    }
}

impl fmt::Debug for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverState")
            .field("slots", &self.slots)
            .field("policy_state", &self.policy_state.as_ref().map(|_| "<opaque>"))
            .finish()
    }
}

/// Counters for a single [`Driver::run`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Batched policy calls made.
    pub iterations: usize,
    /// Environment steps taken, summed over slots.
    pub steps: usize,
    /// Episodes that finished, summed over slots.
    pub episodes: usize,
}

pub struct Driver<E: Env> {
    envs: Vec<E>,
    config: Config,
    step_callbacks: Vec<Box<dyn StepCallback>>,
    episode_callbacks: Vec<Box<dyn EpisodeCallback>>,
    state: DriverState,
}

impl<E: Env> Driver<E> {
    /// Creates a driver with one batch slot per environment. `config` is
    /// forwarded unchanged to the policy and every callback.
    #[must_use]
    pub fn new(envs: Vec<E>, config: Config) -> Self {
        let state = DriverState::new(envs.len());
        Self {
            envs,
            config,
            step_callbacks: Vec::new(),
            episode_callbacks: Vec::new(),
            state,
        }
    }

    #[must_use]
    pub fn num_slots(&self) -> usize {
        self.envs.len()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &DriverState {
        &self.state
    }

    #[must_use]
    pub fn envs(&self) -> &[E] {
        &self.envs
    }

    /// Registers an observer for every transition. Observers run in
    /// registration order.
    pub fn on_step(&mut self, callback: impl StepCallback + 'static) {
        self.step_callbacks.push(Box::new(callback));
    }

    /// Registers an observer for every finished episode. Observers run in
    /// registration order.
    pub fn on_episode(&mut self, callback: impl EpisodeCallback + 'static) {
        self.episode_callbacks.push(Box::new(callback));
    }

    /// Forgets all running episodes and the policy state. Environments are
    /// reset lazily on the next iteration.
    pub fn reset(&mut self) {
        self.state = DriverState::new(self.envs.len());
    }

    /// Runs until at least `steps` environment steps have been taken.
    ///
    /// # Errors
    ///
    /// See [`Driver::run`].
    pub fn run_steps<P: Policy + ?Sized>(
        &mut self,
        policy: &mut P,
        steps: usize,
    ) -> Result<RunStats, DriverError> {
        self.run(policy, steps, 0)
    }

    /// Runs until at least `episodes` episodes have finished.
    ///
    /// # Errors
    ///
    /// See [`Driver::run`].
    pub fn run_episodes<P: Policy + ?Sized>(
        &mut self,
        policy: &mut P,
        episodes: usize,
    ) -> Result<RunStats, DriverError> {
        self.run(policy, 0, episodes)
    }

    /// Steps the batch until both `steps` and `episodes` are reached.
    ///
    /// One iteration steps every slot once and counts as `num_slots` steps. A
    /// threshold of zero is already satisfied, so passing only one of them
    /// lets that one decide when to stop. Episodes in progress when the run
    /// ends are continued by the next call.
    ///
    /// # Errors
    ///
    /// Any environment, policy or callback failure aborts the run and is
    /// returned as is. State already updated by the failing iteration is not
    /// rolled back; call [`Driver::reset`] to start from scratch. A failed
    /// policy call leaves the policy state as the policy left it. Malformed
    /// action batches and observations whose fields disagree across slots or
    /// across time are reported instead of being realigned.
    pub fn run<P: Policy + ?Sized>(
        &mut self,
        policy: &mut P,
        steps: usize,
        episodes: usize,
    ) -> Result<RunStats, DriverError> {
        let span = tracing::info_span!("rollout", slots = self.envs.len(), steps, episodes);
        let _enter = span.enter();

        let mut stats = RunStats::default();
        if self.envs.is_empty() && (steps > 0 || episodes > 0) {
            return Err(DriverError::NoEnvironments);
        }
        while stats.steps < steps || stats.episodes < episodes {
            self.iterate(policy, &mut stats)?;
        }
        tracing::info!(
            iterations = stats.iterations,
            steps = stats.steps,
            episodes = stats.episodes,
            "rollout finished"
        );
        Ok(stats)
    }

    fn iterate<P: Policy + ?Sized>(
        &mut self,
        policy: &mut P,
        stats: &mut RunStats,
    ) -> Result<(), DriverError> {
        let num_slots = self.envs.len();

        for (slot, (env, state)) in self.envs.iter_mut().zip(&mut self.state.slots).enumerate() {
            if state.done {
                let observation = env.reset().map_err(|source| DriverError::Reset { slot, source })?;
                tracing::debug!(slot, "environment reset");
                state.episode = EpisodeBuffer::start(&observation);
                state.observation = observation;
            }
        }

        let batch = self.batch_observation()?;

        let actions = policy
            .act(&batch, &mut self.state.policy_state, &self.config)
            .map_err(DriverError::Policy)?;
        let actions = split_actions(&actions, num_slots)?;

        let mut results = Vec::with_capacity(num_slots);
        for (slot, (env, action)) in self.envs.iter_mut().zip(&actions).enumerate() {
            results.push(env.step(action).map_err(|source| DriverError::Step { slot, source })?);
        }

        for (slot, (action, result)) in actions.into_iter().zip(&results).enumerate() {
            let transition = build_transition(&batch, slot, action, result)?;
            let state = &mut self.state.slots[slot];
            state.episode.push(transition);
            if let Some(transition) = state.episode.transitions().last() {
                for callback in &mut self.step_callbacks {
                    callback
                        .on_step(transition, &self.config)
                        .map_err(|source| DriverError::StepCallback { slot, source })?;
                }
            }
        }

        for (slot, result) in results.iter().enumerate() {
            if !result.done {
                continue;
            }
            let episode = self.state.slots[slot].episode.finalize(slot)?;
            tracing::debug!(
                slot,
                length = episode.len(),
                total_reward = episode.total_reward(),
                "episode finished"
            );
            for callback in &mut self.episode_callbacks {
                callback
                    .on_episode(&episode, &self.config)
                    .map_err(|source| DriverError::EpisodeCallback { slot, source })?;
            }
        }

        let mut finished = 0;
        for (state, result) in self.state.slots.iter_mut().zip(results) {
            state.observation = result.observation;
            state.done = result.done;
            finished += usize::from(result.done);
        }

        stats.iterations += 1;
        stats.episodes += finished;
        stats.steps += num_slots;
        Ok(())
    }

    /// Stacks the current observation of every slot along a new leading axis.
    fn batch_observation(&self) -> Result<Fields, DriverError> {
        let Some((first, rest)) = self.state.slots.split_first() else {
            return Ok(Fields::new());
        };
        for (offset, state) in rest.iter().enumerate() {
            if !state.observation.keys().eq(first.observation.keys()) {
                return Err(DriverError::SchemaDivergence {
                    slot: offset + 1,
                    expected: first.observation.keys().cloned().collect(),
                    got: state.observation.keys().cloned().collect(),
                });
            }
        }
        let mut batch = Fields::new();
        for key in first.observation.keys() {
            let column: Vec<&Array> =
                self.state.slots.iter().filter_map(|s| s.observation.get(key)).collect();
            batch.insert(key.clone(), Array::stack(&column).map_err(DriverError::field(key))?);
        }
        Ok(batch)
    }
}

/// Splits a batched action into one action per slot.
fn split_actions(actions: &Fields, num_slots: usize) -> Result<Vec<Action>, DriverError> {
    for (field, value) in actions {
        let leading = value.shape().first().copied();
        if leading != Some(num_slots) {
            return Err(DriverError::ActionShape {
                field: field.clone(),
                expected: num_slots,
                got: leading,
            });
        }
    }
    (0..num_slots)
        .map(|slot| {
            actions
                .iter()
                .map(|(field, value)| {
                    let row = value.index(slot).map_err(DriverError::field(field))?;
                    Ok::<_, DriverError>((field.clone(), row))
                })
                .collect()
        })
        .collect()
}

/// Pairs the observation the action was chosen from with the action itself
/// and the reward and discount the environment returned for it.
fn build_transition(
    batch: &Fields,
    slot: usize,
    action: Action,
    result: &EnvStep,
) -> Result<Transition, DriverError> {
    let mut fields = Fields::new();
    for (key, value) in batch {
        let row = value.index(slot).map_err(DriverError::field(key))?;
        fields.insert(key.clone(), row.convert());
    }
    for (key, value) in action {
        fields.insert(key, value.convert());
    }
    fields.insert(REWARD.to_owned(), result.reward.clone().convert());
    let discount = match result.info.get(DISCOUNT) {
        Some(discount) => discount.clone(),
        None => Array::scalar(1.0 - f64::from(u8::from(result.done))),
    };
    fields.insert(DISCOUNT.to_owned(), discount.convert());
    Ok(Transition::new(fields))
}
