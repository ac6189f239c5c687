#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # Driver
//!
//! Batched rollout collection for reinforcement learning experiments.
//!
//! A [`Driver`] owns a fixed batch of [`Env`] instances and repeatedly asks a
//! [`Policy`] for one batch of actions, steps every environment with its share
//! and reports each [`Transition`] and every finished [`Episode`] to the
//! registered [`StepCallback`]s and [`EpisodeCallback`]s. Trainers, loggers
//! and replay buffers all plug in as callbacks; the driver itself keeps no
//! history beyond the episodes still running.
//!
//! Observations, actions and transitions are [`Fields`]: ordered maps from a
//! field name to an [`Array`] whose dtype is only known at runtime. Values are
//! narrowed to 32-bit types (see [`Array::convert`]) before they reach any
//! callback.

pub mod array;
pub mod callback;
pub mod config;
pub mod driver;
pub mod env;
pub mod episode;
pub mod error;
pub mod observers;
pub mod policy;
pub mod transition;

pub use array::{Array, ArrayData, ArrayError, DType, Element};
pub use callback::{EpisodeCallback, StepCallback};
pub use config::Config;
pub use driver::{Driver, DriverState, RunStats, SlotState};
pub use env::{Env, EnvStep};
pub use episode::EpisodeBuffer;
pub use error::DriverError;
pub use observers::{Collector, EpisodeLogger};
pub use policy::{Policy, PolicyState};
pub use transition::{Action, Episode, Fields, Observation, Transition, DISCOUNT, REWARD};
