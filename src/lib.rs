//! Toy probabilistic generative models of disease transmission.
//!
//! A transmission scenario is a four-step chain of random choices: the quarantine protocol an
//! infected person follows, how many people they contact, the rate at which they infect those
//! contacts, and how many people end up infected. This crate provides
//! * a prior sampler drawing whole scenarios from fixed hyperparameters,
//! * a parameterized sampler reading the same hyperparameters from a [`ParamStore`] of
//!   learnable values,
//! * an observation model scoring observed infection counts, per record, against that chain,
//! * a likelihood-weighting estimate of how well the current parameters explain a dataset.
//!
//! Models run against a [`Context`], which holds the random number generators and records
//! every named random choice ("site") in a [`Trace`](trace::Trace). Sites can be conditioned to
//! fixed values before a run.
//!
//! ```rust
//! use infection_models::prelude::*;
//!
//! let mut context = Context::new();
//! context.init_random(42);
//! let (scenario, trace) = context.trace_model(sample_default_transmission).unwrap();
//! assert_eq!(trace.len(), 4);
//! assert!((0.0..=1.0).contains(&scenario.infection_rate));
//! ```
pub mod context;
pub mod distributions;
pub mod error;
pub mod hashing;
pub mod hyperparameters;
pub mod inference;
pub mod log;
pub mod models;
pub mod params;
pub mod prelude;
pub mod protocol;
pub mod random;
pub mod trace;

pub use context::Context;
pub use error::ModelError;
pub use hashing::HashMap;
pub use params::ParamStore;

// Re-exported for the `define_rng!` macro
pub use paste;
pub use rand;
