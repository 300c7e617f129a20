//! Hyperparameters of the transmission prior.
//!
//! A [`Hyperparameters`] bundle is either built in code (its `Default` holds the standard
//! toy-model constants) or loaded from a JSON object with the keys
//!
//! ```json
//! {
//!     "distancing": 0.3,
//!     "normal_contact": 100.0,
//!     "distance_contact": 30.0,
//!     "normal_ir_conc": [6.0, 24.0],
//!     "distance_ir_conc": [3.0, 27.0]
//! }
//! ```
//!
//! where each `*_ir_conc` pair is `[concentration1, concentration0]` of the infection-rate
//! Beta distribution. All keys are required.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::distributions::Dist;
use crate::error::ModelError;
use crate::protocol::Protocol;

/// Keys every hyperparameter mapping must contain, in the order they are checked.
pub const REQUIRED_KEYS: [&str; 5] = [
    "distancing",
    "normal_contact",
    "distance_contact",
    "normal_ir_conc",
    "distance_ir_conc",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Probability of the protocol draw succeeding (normal behavior).
    pub distancing: f64,
    pub normal_contact: f64,
    pub distance_contact: f64,
    pub normal_ir_conc: (f64, f64),
    pub distance_ir_conc: (f64, f64),
}

/// The hyperparameters that apply to a single protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtocolParams {
    pub contact_rate: f64,
    pub concentration1: f64,
    pub concentration0: f64,
}

impl ProtocolParams {
    pub fn contact_distribution(&self) -> Result<Dist, ModelError> {
        Dist::poisson(self.contact_rate)
    }

    pub fn infection_rate_distribution(&self) -> Result<Dist, ModelError> {
        Dist::beta(self.concentration1, self.concentration0)
    }
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Hyperparameters {
            distancing: 0.3,
            normal_contact: 100.0,
            distance_contact: 30.0,
            normal_ir_conc: (6.0, 24.0),
            distance_ir_conc: (3.0, 27.0),
        }
    }
}

fn check_positive(key: &str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidHyperparameter {
            key: key.to_string(),
            value,
        })
    }
}

impl Hyperparameters {
    /// Checks every value lies in its domain: `distancing` in [0, 1], rates and
    /// concentrations finite and positive.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(0.0..=1.0).contains(&self.distancing) {
            return Err(ModelError::InvalidHyperparameter {
                key: "distancing".to_string(),
                value: self.distancing,
            });
        }
        check_positive("normal_contact", self.normal_contact)?;
        check_positive("distance_contact", self.distance_contact)?;
        check_positive("normal_ir_conc", self.normal_ir_conc.0)?;
        check_positive("normal_ir_conc", self.normal_ir_conc.1)?;
        check_positive("distance_ir_conc", self.distance_ir_conc.0)?;
        check_positive("distance_ir_conc", self.distance_ir_conc.1)?;
        Ok(())
    }

    /// Builds validated hyperparameters from a JSON object. A missing key is reported by
    /// name before any value is parsed.
    pub fn from_value(value: &Value) -> Result<Self, ModelError> {
        let Some(map) = value.as_object() else {
            return Err(ModelError::InvalidArgument(
                "hyperparameters must be a JSON object".to_string(),
            ));
        };
        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !map.contains_key(**key)) {
            return Err(ModelError::MissingHyperparameter((*missing).to_string()));
        }
        let hyperparameters: Hyperparameters = serde_json::from_value(value.clone())?;
        hyperparameters.validate()?;
        Ok(hyperparameters)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_json_file(file_path: &Path) -> Result<Self, ModelError> {
        debug!("loading hyperparameters from {}", file_path.display());
        let reader = BufReader::new(File::open(file_path)?);
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_value(&value)
    }

    /// Resolves the bundle a protocol selects.
    #[must_use]
    pub fn for_protocol(&self, protocol: Protocol) -> ProtocolParams {
        let (contact_rate, (concentration1, concentration0)) = match protocol {
            Protocol::NormalBehavior => (self.normal_contact, self.normal_ir_conc),
            Protocol::SocialDistancing => (self.distance_contact, self.distance_ir_conc),
        };
        ProtocolParams {
            contact_rate,
            concentration1,
            concentration0,
        }
    }

    pub fn protocol_distribution(&self) -> Result<Dist, ModelError> {
        Dist::bernoulli(self.distancing)
    }
}
