#![allow(dead_code)]

use driver::{Action, Array, Config, Env, EnvStep, Fields, Observation, PolicyState, DISCOUNT};

/// Deterministic environment: reward equals the step index and the episode
/// ends after `length` steps.
pub struct CountdownEnv {
    pub length: usize,
    pub discount: Option<f64>,
    pub resets: usize,
    pub steps: usize,
    pub actions: Vec<Action>,
    t: usize,
}

impl CountdownEnv {
    pub fn new(length: usize) -> Self {
        Self { length, discount: None, resets: 0, steps: 0, actions: Vec::new(), t: 0 }
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = Some(discount);
        self
    }
}

pub fn observation(t: usize) -> Observation {
    Fields::from([
        ("t".to_owned(), Array::vector(vec![t as f64])),
        ("pixels".to_owned(), Array::from_vec(vec![2, 2], vec![t as u8; 4]).unwrap()),
    ])
}

impl Env for CountdownEnv {
    fn reset(&mut self) -> anyhow::Result<Observation> {
        self.t = 0;
        self.resets += 1;
        Ok(observation(0))
    }

    fn step(&mut self, action: &Action) -> anyhow::Result<EnvStep> {
        self.actions.push(action.clone());
        let reward = self.t as f64;
        self.t += 1;
        self.steps += 1;
        let done = self.t >= self.length;
        let mut step = EnvStep::new(observation(self.t), Array::scalar(reward), done);
        if let Some(discount) = self.discount {
            step = step.with_info(DISCOUNT, Array::scalar(discount));
        }
        Ok(step)
    }
}

/// Leading dimension of the first observation field.
pub fn batch_size(observation: &Fields) -> usize {
    observation.values().next().map_or(0, |a| a.shape()[0])
}

/// Returns an `action` field of zeros, one row per slot.
pub fn zero_policy(
    observation: &Fields,
    _state: &mut Option<PolicyState>,
    _config: &Config,
) -> anyhow::Result<Fields> {
    let n = batch_size(observation);
    let action = Array::from_vec(vec![n, 1], vec![0.0f64; n])?;
    Ok(Fields::from([("action".to_owned(), action)]))
}

/// Returns an `action` field holding the slot index, as `i64`.
pub fn slot_index_policy(
    observation: &Fields,
    _state: &mut Option<PolicyState>,
    _config: &Config,
) -> anyhow::Result<Fields> {
    let n = batch_size(observation);
    let action = Array::vector((0..n as i64).collect());
    Ok(Fields::from([("slot".to_owned(), action)]))
}
