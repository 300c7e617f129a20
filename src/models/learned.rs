use std::sync::Arc;

use crate::error::ModelError;
use crate::hyperparameters::Hyperparameters;
use crate::params::{Constraint, Param, ParamStore};

/// Handles to the learnable hyperparameters in a [`ParamStore`].
///
/// Registering is idempotent, so building this twice against the same store yields handles to
/// the same values, and whatever an optimizer wrote into the store is what the next scenario
/// draws from.
#[derive(Debug, Clone)]
pub struct LearnedHyperparameters {
    pub distancing: Arc<Param>,
    pub normal_contact: Arc<Param>,
    pub distance_contact: Arc<Param>,
    pub normal_conc1: Arc<Param>,
    pub normal_conc0: Arc<Param>,
    pub distance_conc1: Arc<Param>,
    pub distance_conc0: Arc<Param>,
}

impl LearnedHyperparameters {
    /// Registers (or looks up) every hyperparameter, initializing new ones from `init`.
    pub fn register(store: &ParamStore, init: &Hyperparameters) -> Result<Self, ModelError> {
        init.validate()?;
        Ok(LearnedHyperparameters {
            distancing: store.get_or_create(
                "distancing",
                init.distancing,
                Constraint::UnitInterval,
            )?,
            normal_contact: store.get_or_create(
                "normal_contact",
                init.normal_contact,
                Constraint::Positive,
            )?,
            distance_contact: store.get_or_create(
                "distance_contact",
                init.distance_contact,
                Constraint::Positive,
            )?,
            normal_conc1: store.get_or_create(
                "normal_conc1",
                init.normal_ir_conc.0,
                Constraint::Positive,
            )?,
            normal_conc0: store.get_or_create(
                "normal_conc0",
                init.normal_ir_conc.1,
                Constraint::Positive,
            )?,
            distance_conc1: store.get_or_create(
                "distance_conc1",
                init.distance_ir_conc.0,
                Constraint::Positive,
            )?,
            distance_conc0: store.get_or_create(
                "distance_conc0",
                init.distance_ir_conc.1,
                Constraint::Positive,
            )?,
        })
    }

    /// The current values as a plain bundle.
    #[must_use]
    pub fn current(&self) -> Hyperparameters {
        Hyperparameters {
            distancing: self.distancing.value(),
            normal_contact: self.normal_contact.value(),
            distance_contact: self.distance_contact.value(),
            normal_ir_conc: (self.normal_conc1.value(), self.normal_conc0.value()),
            distance_ir_conc: (self.distance_conc1.value(), self.distance_conc0.value()),
        }
    }
}
