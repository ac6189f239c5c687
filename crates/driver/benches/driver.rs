use criterion::{criterion_group, criterion_main, Criterion};
use driver::{
    Action, Array, Config, Driver, Env, EnvStep, Episode, Fields, Observation, PolicyState,
};
use std::hint::black_box;

/// Episodes of fixed length with an 8x8 image and a small state vector.
struct FixedEnv {
    t: u32,
}

impl FixedEnv {
    fn observation(&self) -> Observation {
        let t = f64::from(self.t);
        Fields::from([
            ("image".to_owned(), Array::from_vec(vec![8, 8], vec![0u8; 64]).unwrap()),
            ("state".to_owned(), Array::vector(vec![t; 4])),
        ])
    }
}

impl Env for FixedEnv {
    fn reset(&mut self) -> anyhow::Result<Observation> {
        self.t = 0;
        Ok(self.observation())
    }

    fn step(&mut self, _action: &Action) -> anyhow::Result<EnvStep> {
        self.t += 1;
        Ok(EnvStep::new(self.observation(), Array::scalar(1.0f64), self.t >= 50))
    }
}

fn zeros(
    obs: &Fields,
    _state: &mut Option<PolicyState>,
    _config: &Config,
) -> anyhow::Result<Fields> {
    let n = obs["state"].shape()[0];
    let action = Array::from_vec(vec![n, 2], vec![0.0f32; n * 2])?;
    Ok(Fields::from([("action".to_owned(), action)]))
}

fn bench_rollout(c: &mut Criterion) {
    for slots in [1usize, 8] {
        c.bench_function(&format!("rollout_{slots}_slots_200_steps"), |b| {
            let envs: Vec<FixedEnv> = (0..slots).map(|_| FixedEnv { t: 0 }).collect();
            let mut driver = Driver::new(envs, Config::new());
            driver.on_episode(|episode: &Episode, _: &Config| -> anyhow::Result<()> {
                black_box(episode.len());
                Ok(())
            });
            b.iter(|| driver.run_steps(&mut zeros, black_box(200)).unwrap());
        });
    }
}

criterion_group!(benches, bench_rollout);
criterion_main!(benches);
