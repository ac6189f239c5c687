mod common;

use common::{zero_policy, CountdownEnv};
use driver::{Config, Driver, DriverError, RunStats};

#[test]
fn steps_only_counts_batched_iterations() {
    let mut driver = Driver::new(vec![CountdownEnv::new(1)], Config::new());
    let stats = driver.run(&mut zero_policy, 5, 0).unwrap();
    assert_eq!(stats, RunStats { iterations: 5, steps: 5, episodes: 5 });
    assert_eq!(driver.envs()[0].steps, 5);
}

#[test]
fn steps_advance_by_slot_count() {
    let envs = vec![CountdownEnv::new(1), CountdownEnv::new(1)];
    let mut driver = Driver::new(envs, Config::new());
    let stats = driver.run_steps(&mut zero_policy, 5).unwrap();
    assert_eq!(stats.iterations, 3);
    assert_eq!(stats.steps, 6);
}

#[test]
fn episodes_only_counts_terminations_across_slots() {
    let envs = vec![CountdownEnv::new(1), CountdownEnv::new(4)];
    let mut driver = Driver::new(envs, Config::new());
    let stats = driver.run_episodes(&mut zero_policy, 3).unwrap();
    assert_eq!(stats.iterations, 3);
    assert_eq!(stats.episodes, 3);
    assert_eq!(driver.envs()[1].steps, 3);
}

#[test]
fn both_thresholds_must_hold() {
    // Episodes are the later condition here.
    let mut driver = Driver::new(vec![CountdownEnv::new(2)], Config::new());
    let stats = driver.run(&mut zero_policy, 2, 4).unwrap();
    assert_eq!(stats.iterations, 8);
    assert_eq!(stats.episodes, 4);

    // And steps here.
    driver.reset();
    let stats = driver.run(&mut zero_policy, 10, 1).unwrap();
    assert_eq!(stats.iterations, 10);
    assert_eq!(stats.episodes, 5);
}

#[test]
fn zero_thresholds_do_nothing() {
    let mut driver = Driver::new(vec![CountdownEnv::new(3)], Config::new());
    let stats = driver.run(&mut zero_policy, 0, 0).unwrap();
    assert_eq!(stats, RunStats::default());
    assert_eq!(driver.envs()[0].resets, 0);
}

#[test]
fn empty_batch_is_rejected() {
    let mut driver: Driver<CountdownEnv> = Driver::new(Vec::new(), Config::new());
    assert!(matches!(driver.run_steps(&mut zero_policy, 1), Err(DriverError::NoEnvironments)));
}

#[test]
fn episodes_continue_across_runs() {
    let mut driver = Driver::new(vec![CountdownEnv::new(3)], Config::new());
    let first = driver.run_steps(&mut zero_policy, 2).unwrap();
    assert_eq!(first.episodes, 0);
    assert_eq!(driver.state().slots()[0].episode().len(), 3);

    let second = driver.run_steps(&mut zero_policy, 1).unwrap();
    assert_eq!(second.episodes, 1);
    assert_eq!(driver.envs()[0].resets, 1);
    assert!(driver.state().slots()[0].done());
}
