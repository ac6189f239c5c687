#![deny(clippy::all, clippy::pedantic)]

//! Reference environments and policies for the rollout [`driver`].
//!
//! These are small, dependency-free collaborators used by the `rollout`
//! binary and by tests. Real experiments plug in their own simulators and
//! agents through the same [`driver::Env`] and [`driver::Policy`] traits.

pub mod fixed_length;
pub mod policies;
pub mod rolling_sphere;

pub use fixed_length::FixedLengthEnv;
pub use policies::{ConstantPolicy, RandomPolicy};
pub use rolling_sphere::RollingSphereEnv;
