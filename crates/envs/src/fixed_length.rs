use driver::{Action, Array, Env, EnvStep, Fields, Observation};

/// Deterministic environment whose episodes last exactly `length` steps.
///
/// The reward of a step is its index within the episode, so an episode of
/// length 3 pays `0, 1, 2`. Actions are ignored.
#[derive(Debug, Clone)]
pub struct FixedLengthEnv {
    length: u32,
    t: u32,
}

impl FixedLengthEnv {
    /// # Panics
    ///
    /// Panics if `length` is zero.
    #[must_use]
    pub fn new(length: u32) -> Self {
        assert!(length > 0, "episodes need at least one step");
        Self { length, t: 0 }
    }

    fn observation(&self) -> Observation {
        Fields::from([
            ("step".to_owned(), Array::scalar(i64::from(self.t))),
            (
                "progress".to_owned(),
                Array::vector(vec![f64::from(self.t) / f64::from(self.length)]),
            ),
        ])
    }
}

impl Env for FixedLengthEnv {
    fn reset(&mut self) -> anyhow::Result<Observation> {
        self.t = 0;
        Ok(self.observation())
    }

    fn step(&mut self, _action: &Action) -> anyhow::Result<EnvStep> {
        let reward = f64::from(self.t);
        self.t += 1;
        let done = self.t >= self.length;
        Ok(EnvStep::new(self.observation(), Array::scalar(reward), done))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewards_count_up_until_done() {
        let mut env = FixedLengthEnv::new(3);
        let obs = env.reset().unwrap();
        assert_eq!(obs["step"].item::<i64>(), Some(0));
        let mut rewards = Vec::new();
        loop {
            let step = env.step(&Action::new()).unwrap();
            rewards.push(step.reward.item::<f64>().unwrap());
            if step.done {
                break;
            }
        }
        assert_eq!(rewards, vec![0.0, 1.0, 2.0]);
    }
}
