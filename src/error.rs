use std::fmt::{self, Display};
use std::io;

/// Provides `ModelError` and maps other errors to
/// convert to a `ModelError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum ModelError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    /// An observation record named a protocol other than the two known ones.
    InvalidProtocol {
        index: usize,
        value: String,
    },
    /// A hyperparameter mapping is missing a required key.
    MissingHyperparameter(String),
    InvalidHyperparameter {
        key: String,
        value: f64,
    },
    InvalidDistribution(String),
    InvalidObservation {
        index: usize,
        value: f64,
    },
    /// A sample site name was recorded twice in the same trace.
    DuplicateSite(String),
    InvalidParameter {
        name: String,
        value: f64,
    },
    /// A parameter was registered again under a different constraint.
    ParamConstraintMismatch {
        name: String,
    },
    InvalidArgument(String),
}

impl From<io::Error> for ModelError {
    fn from(error: io::Error) -> Self {
        ModelError::IoError(error)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(error: serde_json::Error) -> Self {
        ModelError::JsonError(error)
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::IoError(error) => Some(error),
            ModelError::JsonError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelError::IoError(error) => write!(f, "I/O error: {error}"),
            ModelError::JsonError(error) => write!(f, "JSON error: {error}"),
            ModelError::InvalidProtocol { index, value } => write!(
                f,
                "record {index}: invalid protocol {value:?} (expected \"normal_behavior\" or \"social_distancing\")"
            ),
            ModelError::MissingHyperparameter(key) => {
                write!(f, "missing hyperparameter `{key}`")
            }
            ModelError::InvalidHyperparameter { key, value } => {
                write!(f, "hyperparameter `{key}` has invalid value {value}")
            }
            ModelError::InvalidDistribution(message) => {
                write!(f, "invalid distribution: {message}")
            }
            ModelError::InvalidObservation { index, value } => {
                write!(f, "record {index}: invalid observed value {value}")
            }
            ModelError::DuplicateSite(name) => {
                write!(f, "sample site `{name}` is already in the trace")
            }
            ModelError::InvalidParameter { name, value } => {
                write!(f, "parameter `{name}` cannot take value {value}")
            }
            ModelError::ParamConstraintMismatch { name } => write!(
                f,
                "parameter `{name}` is already registered with a different constraint"
            ),
            ModelError::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
        }
    }
}
