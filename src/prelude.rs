pub use crate::context::Context;
pub use crate::distributions::Dist;
pub use crate::error::ModelError;
pub use crate::hyperparameters::Hyperparameters;
pub use crate::inference::{estimate_log_evidence, EvidenceEstimate};
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::models::{
    observe_transmission, sample_default_transmission, sample_learned_transmission,
    sample_transmission, sample_transmission_from_value, LearnedHyperparameters, Likelihood,
    ObservationModel, ObservationRecord, Scenario,
};
pub use crate::params::{Constraint, ParamStore};
pub use crate::protocol::Protocol;
pub use crate::random::ContextRandomExt;
pub use crate::trace::{ContextTraceExt, SiteKind, Trace};
pub use crate::{define_data_plugin, define_rng};
