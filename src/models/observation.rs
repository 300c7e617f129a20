//! The observation model couples the transmission prior to data.
//!
//! Given records `(protocol, num_infected)`, record `i` gets its own latent
//! `contacted_people_i` and `infection_rate_i`, drawn from the distributions its protocol
//! selects, and the observed count is scored as `num_infected_i` against a distribution
//! centered on `contacted_people_i * infection_rate_i`. The model returns nothing; the
//! observed sites' log-probabilities in the trace are the likelihood an inference driver
//! works with.
//!
//! Two likelihoods are available, chosen per [`ObservationModel`]:
//!
//! * [`Likelihood::Count`] keeps the generative story: Poisson contacts and a Poisson
//!   observation.
//! * [`Likelihood::Relaxed`] uses Normal contacts and a Normal observation with learnable
//!   scales (`normal_contact_scale`, `distance_contact_scale`, `num_infected_scale`), which is
//!   smoother for gradient-based fitting.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::define_rng;
use crate::distributions::Dist;
use crate::error::ModelError;
use crate::hyperparameters::Hyperparameters;
use crate::models::learned::LearnedHyperparameters;
use crate::params::{Constraint, ParamStore};
use crate::protocol::Protocol;
use crate::trace::ContextTraceExt;

define_rng!(ObservationRng);

/// Initial scale of the relaxed observation.
pub const DEFAULT_NUM_INFECTED_SCALE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// Protocol name as given; validated when the model runs.
    pub protocol: String,
    pub num_infected: f64,
}

impl ObservationRecord {
    pub fn new(protocol: impl Into<String>, num_infected: f64) -> Self {
        ObservationRecord {
            protocol: protocol.into(),
            num_infected,
        }
    }
}

impl<S: Into<String>> From<(S, f64)> for ObservationRecord {
    fn from((protocol, num_infected): (S, f64)) -> Self {
        ObservationRecord::new(protocol, num_infected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Likelihood {
    #[default]
    Count,
    Relaxed,
}

#[must_use]
pub fn contacted_people_site(index: usize) -> String {
    format!("contacted_people_{index}")
}

#[must_use]
pub fn infection_rate_site(index: usize) -> String {
    format!("infection_rate_{index}")
}

#[must_use]
pub fn num_infected_site(index: usize) -> String {
    format!("num_infected_{index}")
}

/// Parses every record up front so that a bad record leaves no sites behind.
fn validate_records(
    records: &[ObservationRecord],
    likelihood: Likelihood,
) -> Result<Vec<Protocol>, ModelError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let protocol = record.protocol.parse::<Protocol>().map_err(|_| {
                ModelError::InvalidProtocol {
                    index,
                    value: record.protocol.clone(),
                }
            })?;
            let value = record.num_infected;
            let whole = value.fract() == 0.0;
            if !value.is_finite() || value < 0.0 || (likelihood == Likelihood::Count && !whole) {
                return Err(ModelError::InvalidObservation { index, value });
            }
            Ok(protocol)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationModel {
    pub likelihood: Likelihood,
    /// Values for hyperparameters not yet in the store.
    pub init: Hyperparameters,
}

impl Default for ObservationModel {
    fn default() -> Self {
        ObservationModel::new(Likelihood::default())
    }
}

/// The relaxed likelihood's learnable scales.
struct Scales {
    normal_contact: f64,
    distance_contact: f64,
    num_infected: f64,
}

impl ObservationModel {
    #[must_use]
    pub fn new(likelihood: Likelihood) -> Self {
        ObservationModel {
            likelihood,
            init: Hyperparameters::default(),
        }
    }

    #[must_use]
    pub fn with_init(mut self, init: Hyperparameters) -> Self {
        self.init = init;
        self
    }

    // Contact scales start at the Poisson standard deviation of the matching rate.
    fn register_scales(&self, store: &ParamStore) -> Result<Scales, ModelError> {
        Ok(Scales {
            normal_contact: store
                .get_or_create(
                    "normal_contact_scale",
                    self.init.normal_contact.sqrt(),
                    Constraint::Positive,
                )?
                .value(),
            distance_contact: store
                .get_or_create(
                    "distance_contact_scale",
                    self.init.distance_contact.sqrt(),
                    Constraint::Positive,
                )?
                .value(),
            num_infected: store
                .get_or_create(
                    "num_infected_scale",
                    DEFAULT_NUM_INFECTED_SCALE,
                    Constraint::Positive,
                )?
                .value(),
        })
    }

    /// Runs the model over `records` in order, recording sites in `context`'s trace.
    pub fn observe(
        &self,
        context: &mut Context,
        store: &ParamStore,
        records: &[ObservationRecord],
    ) -> Result<(), ModelError> {
        let protocols = validate_records(records, self.likelihood)?;
        let hyperparameters = LearnedHyperparameters::register(store, &self.init)?.current();
        let scales = match self.likelihood {
            Likelihood::Count => None,
            Likelihood::Relaxed => Some(self.register_scales(store)?),
        };
        debug!(
            "observing {} records with {:?} likelihood",
            records.len(),
            self.likelihood
        );

        for (index, (record, protocol)) in records.iter().zip(protocols).enumerate() {
            let bundle = hyperparameters.for_protocol(protocol);
            let contact_distribution = match &scales {
                None => bundle.contact_distribution()?,
                Some(scales) => {
                    let scale = match protocol {
                        Protocol::NormalBehavior => scales.normal_contact,
                        Protocol::SocialDistancing => scales.distance_contact,
                    };
                    Dist::normal(bundle.contact_rate, scale)?
                }
            };
            let contacted_people = context.sample_site(
                ObservationRng,
                &contacted_people_site(index),
                contact_distribution,
            )?;
            let infection_rate = context.sample_site(
                ObservationRng,
                &infection_rate_site(index),
                bundle.infection_rate_distribution()?,
            )?;

            let rate = contacted_people * infection_rate;
            let observation_distribution = match &scales {
                None => Dist::poisson(rate)?,
                Some(scales) => Dist::normal(rate, scales.num_infected)?,
            };
            context.observe_site(
                &num_infected_site(index),
                observation_distribution,
                record.num_infected,
            )?;
        }
        Ok(())
    }
}

/// Runs the count-likelihood observation model with default initial hyperparameters.
pub fn observe_transmission(
    context: &mut Context,
    store: &ParamStore,
    records: &[ObservationRecord],
) -> Result<(), ModelError> {
    ObservationModel::default().observe(context, store, records)
}
