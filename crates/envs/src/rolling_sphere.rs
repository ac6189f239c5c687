use anyhow::Context;
use driver::{Action, Array, Env, EnvStep, Fields, Observation, DISCOUNT};

/// A simple environment where the agent must learn to roll a sphere to the right.
///
/// The action is a single `force` value, clamped to `[-10, 10]`. The reward is
/// the distance travelled this step and the episode terminates once the sphere
/// leaves `[-5, 5]`. Episodes that hit `max_steps` first are cut off with
/// `discount = 1` in the step info, since the sphere could have kept rolling.
#[derive(Debug, Clone)]
pub struct RollingSphereEnv {
    pos_x: f32,
    steps: usize,
    max_steps: usize,
}

impl RollingSphereEnv {
    pub const ACTION: &'static str = "force";

    /// Creates a new `RollingSphereEnv`.
    #[must_use]
    pub fn new(max_steps: usize) -> Self {
        Self { pos_x: 0.0, steps: 0, max_steps }
    }

    fn observation(&self) -> Observation {
        Fields::from([("position".to_owned(), Array::vector(vec![self.pos_x]))])
    }
}

impl Default for RollingSphereEnv {
    fn default() -> Self {
        Self::new(200)
    }
}

impl Env for RollingSphereEnv {
    fn reset(&mut self) -> anyhow::Result<Observation> {
        self.pos_x = 0.0;
        self.steps = 0;
        Ok(self.observation())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn step(&mut self, action: &Action) -> anyhow::Result<EnvStep> {
        let force = action
            .get(Self::ACTION)
            .and_then(|a| a.to_f64_vec().first().copied())
            .with_context(|| format!("missing `{}` action", Self::ACTION))?;
        let force = (force as f32).clamp(-10.0, 10.0);
        let old_pos_x = self.pos_x;
        self.pos_x += force * 0.02;
        self.steps += 1;

        let reward = self.pos_x - old_pos_x;
        let terminated = self.pos_x.abs() > 5.0;
        let truncated = !terminated && self.steps >= self.max_steps;
        let step = EnvStep::new(self.observation(), Array::scalar(reward), terminated || truncated);
        Ok(if truncated {
            step.with_info(DISCOUNT, Array::scalar(1.0f32))
        } else {
            step
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(force: f32) -> Action {
        Fields::from([(RollingSphereEnv::ACTION.to_owned(), Array::vector(vec![force]))])
    }

    #[test]
    fn pushing_right_terminates() {
        let mut env = RollingSphereEnv::new(1000);
        env.reset().unwrap();
        let mut steps = 0;
        loop {
            let step = env.step(&push(50.0)).unwrap();
            steps += 1;
            assert!(step.reward.item::<f32>().unwrap() > 0.0);
            if step.done {
                assert!(step.info.get(DISCOUNT).is_none());
                break;
            }
        }
        // 0.2 per step after clamping.
        assert!((25..=26).contains(&steps), "terminated after {steps} steps");
    }

    #[test]
    fn time_limit_keeps_discount() {
        let mut env = RollingSphereEnv::new(3);
        env.reset().unwrap();
        let mut last = None;
        for _ in 0..3 {
            last = Some(env.step(&push(0.0)).unwrap());
        }
        let last = last.unwrap();
        assert!(last.done);
        assert_eq!(last.info[DISCOUNT].item::<f32>(), Some(1.0));
    }

    #[test]
    fn missing_action_is_an_error() {
        let mut env = RollingSphereEnv::default();
        env.reset().unwrap();
        assert!(env.step(&Action::new()).is_err());
    }
}
