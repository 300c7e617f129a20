//! The transmission prior.
//!
//! One call draws one scenario along the chain
//! `protocol → contacted_people → infection_rate → num_infected`:
//!
//! 1. `protocol` ~ Bernoulli(`distancing`); 1 is normal behavior, 0 is social distancing.
//! 2. `contacted_people` ~ Poisson(contact rate of the protocol).
//! 3. `infection_rate` ~ Beta(concentrations of the protocol).
//! 4. `num_infected` ~ Poisson(`contacted_people * infection_rate`).
//!
//! Contacts and infection rate are independent given the protocol. Every draw is a named site
//! in the context's trace, so any of them can be conditioned.
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::Context;
use crate::define_rng;
use crate::distributions::Dist;
use crate::error::ModelError;
use crate::hyperparameters::Hyperparameters;
use crate::models::learned::LearnedHyperparameters;
use crate::params::ParamStore;
use crate::protocol::Protocol;
use crate::trace::ContextTraceExt;

define_rng!(TransmissionRng);

pub const PROTOCOL_SITE: &str = "protocol";
pub const CONTACTED_PEOPLE_SITE: &str = "contacted_people";
pub const INFECTION_RATE_SITE: &str = "infection_rate";
pub const NUM_INFECTED_SITE: &str = "num_infected";

/// One fully sampled transmission scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub protocol: Protocol,
    pub contacted_people: u64,
    pub infection_rate: f64,
    pub num_infected: u64,
}

impl Scenario {
    /// The scenario as `(protocol name, contacted people, infection rate, number infected)`.
    #[must_use]
    pub fn into_tuple(self) -> (String, u64, f64, u64) {
        (
            self.protocol.to_string(),
            self.contacted_people,
            self.infection_rate,
            self.num_infected,
        )
    }
}

impl From<Scenario> for (String, u64, f64, u64) {
    fn from(scenario: Scenario) -> Self {
        scenario.into_tuple()
    }
}

// Site values are whole numbers unless a condition fixed them to something else.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count(site: &str, value: f64) -> Result<u64, ModelError> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Ok(value as u64)
    } else {
        Err(ModelError::InvalidArgument(format!(
            "site `{site}` must be a non-negative whole number, got {value}"
        )))
    }
}

fn to_unit_interval(site: &str, value: f64) -> Result<f64, ModelError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ModelError::InvalidArgument(format!(
            "site `{site}` must lie in [0, 1], got {value}"
        )))
    }
}

fn to_protocol(flag: f64) -> Result<Protocol, ModelError> {
    if flag == 1.0 || flag == 0.0 {
        Ok(Protocol::from_flag(flag == 1.0))
    } else {
        Err(ModelError::InvalidArgument(format!(
            "site `{PROTOCOL_SITE}` must be 0 or 1, got {flag}"
        )))
    }
}

/// Draws one scenario from fixed hyperparameters.
pub fn sample_transmission(
    context: &mut Context,
    hyperparameters: &Hyperparameters,
) -> Result<Scenario, ModelError> {
    hyperparameters.validate()?;

    let flag = context.sample_site(
        TransmissionRng,
        PROTOCOL_SITE,
        hyperparameters.protocol_distribution()?,
    )?;
    let protocol = to_protocol(flag)?;
    let bundle = hyperparameters.for_protocol(protocol);

    let contacted_people = context.sample_site(
        TransmissionRng,
        CONTACTED_PEOPLE_SITE,
        bundle.contact_distribution()?,
    )?;
    let infection_rate = to_unit_interval(
        INFECTION_RATE_SITE,
        context.sample_site(
            TransmissionRng,
            INFECTION_RATE_SITE,
            bundle.infection_rate_distribution()?,
        )?,
    )?;
    let num_infected = context.sample_site(
        TransmissionRng,
        NUM_INFECTED_SITE,
        Dist::poisson(contacted_people * infection_rate)?,
    )?;

    let scenario = Scenario {
        protocol,
        contacted_people: to_count(CONTACTED_PEOPLE_SITE, contacted_people)?,
        infection_rate,
        num_infected: to_count(NUM_INFECTED_SITE, num_infected)?,
    };
    debug!("sampled scenario {scenario:?}");
    Ok(scenario)
}

/// Draws one scenario with the toy model's fixed constants.
pub fn sample_default_transmission(context: &mut Context) -> Result<Scenario, ModelError> {
    sample_transmission(context, &Hyperparameters::default())
}

/// Draws one scenario from a loose hyperparameter mapping, failing on the first missing key.
pub fn sample_transmission_from_value(
    context: &mut Context,
    mapping: &Value,
) -> Result<Scenario, ModelError> {
    let hyperparameters = Hyperparameters::from_value(mapping)?;
    sample_transmission(context, &hyperparameters)
}

/// Draws one scenario with hyperparameters read from `store`, registering any that are
/// missing with the values in `init`.
pub fn sample_learned_transmission(
    context: &mut Context,
    store: &ParamStore,
    init: &Hyperparameters,
) -> Result<Scenario, ModelError> {
    let learned = LearnedHyperparameters::register(store, init)?;
    sample_transmission(context, &learned.current())
}
