use anyhow::Context;
use driver::{Array, Config, Fields, Policy, PolicyState};

/// Leading dimension shared by every field of a batched observation.
fn batch_size(observation: &Fields) -> anyhow::Result<usize> {
    observation
        .values()
        .next()
        .and_then(|a| a.shape().first().copied())
        .context("cannot infer batch size from an empty observation")
}

/// Samples every action component uniformly from `[low, high)`.
pub struct RandomPolicy {
    rng: fastrand::Rng,
    field: String,
    dims: usize,
    low: f32,
    high: f32,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(field: impl Into<String>, dims: usize, low: f32, high: f32, seed: u64) -> Self {
        Self { rng: fastrand::Rng::with_seed(seed), field: field.into(), dims, low, high }
    }
}

impl Policy for RandomPolicy {
    fn act(
        &mut self,
        observation: &Fields,
        _state: &mut Option<PolicyState>,
        _config: &Config,
    ) -> anyhow::Result<Fields> {
        let n = batch_size(observation)?;
        let values = (0..n * self.dims)
            .map(|_| self.low + self.rng.f32() * (self.high - self.low))
            .collect();
        let action = Array::from_vec(vec![n, self.dims], values)?;
        Ok(Fields::from([(self.field.clone(), action)]))
    }
}

/// Emits the same action for every slot.
pub struct ConstantPolicy {
    field: String,
    value: Vec<f32>,
}

impl ConstantPolicy {
    #[must_use]
    pub fn new(field: impl Into<String>, value: Vec<f32>) -> Self {
        Self { field: field.into(), value }
    }
}

impl Policy for ConstantPolicy {
    fn act(
        &mut self,
        observation: &Fields,
        _state: &mut Option<PolicyState>,
        _config: &Config,
    ) -> anyhow::Result<Fields> {
        let n = batch_size(observation)?;
        let values = self.value.iter().copied().cycle().take(n * self.value.len()).collect();
        let action = Array::from_vec(vec![n, self.value.len()], values)?;
        Ok(Fields::from([(self.field.clone(), action)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(n: usize) -> Fields {
        Fields::from([("x".to_owned(), Array::from_vec(vec![n, 2], vec![0.0f64; n * 2]).unwrap())])
    }

    #[test]
    fn random_actions_are_in_range() {
        let mut policy = RandomPolicy::new("force", 3, -1.0, 1.0, 7);
        let mut state = None;
        let actions = policy.act(&batch(4), &mut state, &Config::new()).unwrap();
        assert!(state.is_none());
        let force = &actions["force"];
        assert_eq!(force.shape(), &[4, 3]);
        assert!(force.as_slice::<f32>().unwrap().iter().all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn constant_actions_repeat_per_slot() {
        let mut policy = ConstantPolicy::new("force", vec![1.0, 2.0]);
        let actions = policy.act(&batch(3), &mut None, &Config::new()).unwrap();
        let force = &actions["force"];
        assert_eq!(force.shape(), &[3, 2]);
        assert_eq!(force.as_slice::<f32>(), Some(&[1.0f32, 2.0, 1.0, 2.0, 1.0, 2.0][..]));
    }

    #[test]
    fn empty_observation_is_an_error() {
        let mut policy = ConstantPolicy::new("force", vec![0.0]);
        assert!(policy.act(&Fields::new(), &mut None, &Config::new()).is_err());
    }
}
