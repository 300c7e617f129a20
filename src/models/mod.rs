//! The transmission models: a prior over whole scenarios, its parameterized variant reading
//! learnable hyperparameters, and an observation model scoring observed infection counts.
pub mod learned;
pub mod observation;
pub mod prior;

pub use learned::LearnedHyperparameters;
pub use observation::{observe_transmission, Likelihood, ObservationModel, ObservationRecord};
pub use prior::{
    sample_default_transmission, sample_learned_transmission, sample_transmission,
    sample_transmission_from_value, Scenario,
};
