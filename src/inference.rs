//! Likelihood weighting over the observation model.
//!
//! Each particle runs the observation model once with every latent drawn from its prior, so
//! the particle's weight is the trace's observed log-likelihood. Averaging the weights in
//! probability space estimates the marginal likelihood of the dataset under the parameters
//! currently in the store, which is the quantity an outer fitting loop compares across
//! parameter settings.
use log::{debug, info};

use crate::context::Context;
use crate::error::ModelError;
use crate::models::observation::{ObservationModel, ObservationRecord};
use crate::params::ParamStore;
use crate::trace::ContextTraceExt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvidenceEstimate {
    /// Estimated log marginal likelihood.
    pub log_evidence: f64,
    /// Kish effective sample size of the normalized weights; low values mean few particles
    /// carried the estimate.
    pub effective_sample_size: f64,
    pub num_particles: usize,
}

/// `ln(Σ exp(v))` without overflow. Empty or all `-∞` input gives `-∞`.
#[must_use]
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

#[allow(clippy::cast_precision_loss)]
pub fn estimate_log_evidence(
    context: &mut Context,
    store: &ParamStore,
    model: &ObservationModel,
    records: &[ObservationRecord],
    num_particles: usize,
) -> Result<EvidenceEstimate, ModelError> {
    if num_particles == 0 {
        return Err(ModelError::InvalidArgument(
            "evidence estimation needs at least one particle".to_string(),
        ));
    }

    let mut log_weights = Vec::with_capacity(num_particles);
    for _ in 0..num_particles {
        let ((), trace) = context.trace_model(|context| model.observe(context, store, records))?;
        log_weights.push(trace.observed_log_prob());
    }

    let total = log_sum_exp(&log_weights);
    let log_evidence = total - (num_particles as f64).ln();
    let effective_sample_size = if total == f64::NEG_INFINITY {
        0.0
    } else {
        let squares: Vec<f64> = log_weights.iter().map(|w| 2.0 * (w - total)).collect();
        (-log_sum_exp(&squares)).exp()
    };
    debug!("log weights: {log_weights:?}");
    info!(
        "log evidence {log_evidence:.4} over {num_particles} particles (ESS {effective_sample_size:.1})"
    );

    Ok(EvidenceEstimate {
        log_evidence,
        effective_sample_size,
        num_particles,
    })
}
