//! Sample sites and traces.
//!
//! Every random choice a model makes goes through [`ContextTraceExt::sample_site`] (a latent
//! draw) or [`ContextTraceExt::observe_site`] (scoring a known value). Both record a named
//! [`Site`] in the context's current [`Trace`], which is what an inference driver inspects
//! afterwards: the values drawn, their log-probabilities and which ones were observed.
//!
//! Conditioning fixes a site's value ahead of time. A conditioned sample site does not draw;
//! it takes the fixed value, scores it and is recorded as observed.
use indexmap::IndexMap;
use log::trace;
use rand::Rng;

use crate::context::Context;
use crate::distributions::Dist;
use crate::error::ModelError;
use crate::random::{ContextRandomExt, RngId};
use crate::{define_data_plugin, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    Latent,
    Observed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub name: String,
    pub distribution: Dist,
    pub value: f64,
    pub log_prob: f64,
    pub kind: SiteKind,
}

/// The sites recorded during one model run, in the order they were recorded.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    sites: IndexMap<String, Site>,
}

impl Trace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a site. Names are unique within a trace.
    pub fn record(&mut self, site: Site) -> Result<(), ModelError> {
        if self.sites.contains_key(&site.name) {
            return Err(ModelError::DuplicateSite(site.name));
        }
        self.sites.insert(site.name.clone(), site);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Site> {
        self.sites.get(name)
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        self.sites.get(name).map(|site| site.value)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.sites.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    pub fn latent_sites(&self) -> impl Iterator<Item = &Site> {
        self.iter().filter(|site| site.kind == SiteKind::Latent)
    }

    pub fn observed_sites(&self) -> impl Iterator<Item = &Site> {
        self.iter().filter(|site| site.kind == SiteKind::Observed)
    }

    /// Joint log-probability of every site.
    #[must_use]
    pub fn log_prob_sum(&self) -> f64 {
        self.iter().map(|site| site.log_prob).sum()
    }

    #[must_use]
    pub fn latent_log_prob(&self) -> f64 {
        self.latent_sites().map(|site| site.log_prob).sum()
    }

    /// Log-likelihood of the observed sites given the latent values in this trace.
    #[must_use]
    pub fn observed_log_prob(&self) -> f64 {
        self.observed_sites().map(|site| site.log_prob).sum()
    }
}

struct TraceData {
    trace: Trace,
    conditions: HashMap<String, f64>,
}

define_data_plugin!(
    TracePlugin,
    TraceData,
    TraceData {
        trace: Trace::new(),
        conditions: HashMap::default(),
    }
);

pub trait ContextTraceExt {
    /// Fixes the value of the site `name` for every subsequent run until removed.
    fn condition(&mut self, name: &str, value: f64);

    fn remove_condition(&mut self, name: &str) -> Option<f64>;

    fn clear_conditions(&mut self);

    #[must_use]
    fn get_condition(&self, name: &str) -> Option<f64>;

    /// Draws a value for the site `name` from `distribution` using the rng stream `rng_id`,
    /// or takes the conditioned value if there is one, and records it.
    fn sample_site<R: RngId + 'static>(
        &mut self,
        rng_id: R,
        name: &str,
        distribution: Dist,
    ) -> Result<f64, ModelError>
    where
        R::RngType: Rng;

    /// Scores a known `value` against `distribution` and records it as an observed site.
    fn observe_site(&mut self, name: &str, distribution: Dist, value: f64)
        -> Result<(), ModelError>;

    /// The sites recorded since the trace was last taken.
    #[must_use]
    fn get_trace(&self) -> Option<&Trace>;

    /// Removes and returns the current trace, leaving an empty one.
    fn take_trace(&mut self) -> Trace;

    /// Runs `model` against a fresh trace and returns its result with the recorded trace.
    fn trace_model<T>(
        &mut self,
        model: impl FnOnce(&mut Context) -> Result<T, ModelError>,
    ) -> Result<(T, Trace), ModelError>;
}

fn record_site(context: &mut Context, site: Site) -> Result<(), ModelError> {
    trace!(
        "{:?} site {} = {} (log_prob={})",
        site.kind,
        site.name,
        site.value,
        site.log_prob
    );
    context.get_data_mut(TracePlugin).trace.record(site)
}

impl ContextTraceExt for Context {
    fn condition(&mut self, name: &str, value: f64) {
        self.get_data_mut(TracePlugin)
            .conditions
            .insert(name.to_string(), value);
    }

    fn remove_condition(&mut self, name: &str) -> Option<f64> {
        self.get_data_mut(TracePlugin).conditions.remove(name)
    }

    fn clear_conditions(&mut self) {
        self.get_data_mut(TracePlugin).conditions.clear();
    }

    fn get_condition(&self, name: &str) -> Option<f64> {
        self.get_data(TracePlugin)
            .and_then(|data| data.conditions.get(name).copied())
    }

    fn sample_site<R: RngId + 'static>(
        &mut self,
        rng_id: R,
        name: &str,
        distribution: Dist,
    ) -> Result<f64, ModelError>
    where
        R::RngType: Rng,
    {
        if self.get_trace().is_some_and(|trace| trace.contains(name)) {
            return Err(ModelError::DuplicateSite(name.to_string()));
        }
        let (value, kind) = match self.get_condition(name) {
            Some(value) => (value, SiteKind::Observed),
            None => (
                self.sample(rng_id, |rng| distribution.sample(rng))?,
                SiteKind::Latent,
            ),
        };
        record_site(
            self,
            Site {
                name: name.to_string(),
                distribution,
                value,
                log_prob: distribution.log_prob(value),
                kind,
            },
        )?;
        Ok(value)
    }

    fn observe_site(
        &mut self,
        name: &str,
        distribution: Dist,
        value: f64,
    ) -> Result<(), ModelError> {
        record_site(
            self,
            Site {
                name: name.to_string(),
                distribution,
                value,
                log_prob: distribution.log_prob(value),
                kind: SiteKind::Observed,
            },
        )
    }

    fn get_trace(&self) -> Option<&Trace> {
        self.get_data(TracePlugin).map(|data| &data.trace)
    }

    fn take_trace(&mut self) -> Trace {
        std::mem::take(&mut self.get_data_mut(TracePlugin).trace)
    }

    fn trace_model<T>(
        &mut self,
        model: impl FnOnce(&mut Context) -> Result<T, ModelError>,
    ) -> Result<(T, Trace), ModelError> {
        self.take_trace();
        let result = model(self);
        let trace = self.take_trace();
        result.map(|value| (value, trace))
    }
}
