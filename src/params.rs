//! A registry of named learnable parameters.
//!
//! Each [`Param`] keeps an *unconstrained* real value and exposes it through a transform onto
//! its constraint's domain, so an optimizer can move the unconstrained value freely while the
//! model always reads a valid probability or positive rate. [`ParamStore::get_or_create`] is
//! idempotent: asking for a name that is already registered returns the same shared [`Param`]
//! and ignores the initial value.
//!
//! The store is `Send + Sync`. Lookups take a read lock; creation re-checks under the write
//! lock, so concurrent callers registering the same name all receive one handle.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use log::debug;

use crate::error::ModelError;

/// The domain a parameter's value is constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Real,
    /// `[0, 1]`, through the logistic function.
    UnitInterval,
    /// `(0, ∞)`, through the exponential.
    Positive,
}

impl Constraint {
    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        match self {
            Constraint::Real => value.is_finite(),
            Constraint::UnitInterval => (0.0..=1.0).contains(&value),
            Constraint::Positive => value.is_finite() && value > 0.0,
        }
    }

    /// Maps an unconstrained value onto the domain.
    #[must_use]
    pub fn transform(self, unconstrained: f64) -> f64 {
        match self {
            Constraint::Real => unconstrained,
            Constraint::UnitInterval => 1.0 / (1.0 + (-unconstrained).exp()),
            Constraint::Positive => unconstrained.exp(),
        }
    }

    /// Maps a value in the domain back to the unconstrained reals. The endpoints of the
    /// unit interval map to the infinities.
    #[must_use]
    pub fn inverse(self, value: f64) -> f64 {
        match self {
            Constraint::Real => value,
            Constraint::UnitInterval => (value / (1.0 - value)).ln(),
            Constraint::Positive => value.ln(),
        }
    }
}

#[derive(Debug)]
pub struct Param {
    name: String,
    constraint: Constraint,
    // f64 bits
    unconstrained: AtomicU64,
}

impl Param {
    fn new(name: &str, constraint: Constraint, init: f64) -> Result<Self, ModelError> {
        if !constraint.contains(init) {
            return Err(ModelError::InvalidParameter {
                name: name.to_string(),
                value: init,
            });
        }
        Ok(Param {
            name: name.to_string(),
            constraint,
            unconstrained: AtomicU64::new(constraint.inverse(init).to_bits()),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn constraint(&self) -> Constraint {
        self.constraint
    }

    /// The current value in the constrained domain.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.constraint.transform(self.unconstrained_value())
    }

    #[must_use]
    pub fn unconstrained_value(&self) -> f64 {
        f64::from_bits(self.unconstrained.load(Ordering::Acquire))
    }

    /// Overwrites the unconstrained value; this is what an optimizer step changes. Fails,
    /// leaving the value untouched, if the transformed value falls outside the domain, as
    /// happens when the exponential overflows to infinity or underflows to zero.
    pub fn set_unconstrained(&self, unconstrained: f64) -> Result<(), ModelError> {
        let value = self.constraint.transform(unconstrained);
        if unconstrained.is_nan() || !self.constraint.contains(value) {
            return Err(ModelError::InvalidParameter {
                name: self.name.clone(),
                value: unconstrained,
            });
        }
        self.unconstrained
            .store(unconstrained.to_bits(), Ordering::Release);
        Ok(())
    }

    /// Sets the constrained value directly.
    pub fn set_value(&self, value: f64) -> Result<(), ModelError> {
        if !self.constraint.contains(value) {
            return Err(ModelError::InvalidParameter {
                name: self.name.clone(),
                value,
            });
        }
        self.set_unconstrained(self.constraint.inverse(value))
    }
}

#[derive(Debug, Default)]
pub struct ParamStore {
    params: RwLock<IndexMap<String, Arc<Param>>>,
}

impl ParamStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Arc<Param>>> {
        self.params.read().expect("RwLock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Arc<Param>>> {
        self.params.write().expect("RwLock poisoned")
    }

    /// Returns the parameter registered under `name`, registering it with value `init` if
    /// it does not exist yet. Fails if `init` is outside the constraint's domain, or if the
    /// name is already registered under another constraint.
    pub fn get_or_create(
        &self,
        name: &str,
        init: f64,
        constraint: Constraint,
    ) -> Result<Arc<Param>, ModelError> {
        if let Some(param) = self.read().get(name) {
            return Self::check_constraint(param, constraint);
        }

        let mut params = self.write();
        // Another caller may have registered it between the two locks.
        if let Some(param) = params.get(name) {
            return Self::check_constraint(param, constraint);
        }
        let param = Arc::new(Param::new(name, constraint, init)?);
        debug!("registered parameter {name} = {init} ({constraint:?})");
        params.insert(name.to_string(), Arc::clone(&param));
        Ok(param)
    }

    fn check_constraint(
        param: &Arc<Param>,
        constraint: Constraint,
    ) -> Result<Arc<Param>, ModelError> {
        if param.constraint == constraint {
            Ok(Arc::clone(param))
        } else {
            Err(ModelError::ParamConstraintMismatch {
                name: param.name.clone(),
            })
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Param>> {
        self.read().get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Parameter names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Current constrained values by name, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> IndexMap<String, f64> {
        self.read()
            .iter()
            .map(|(name, param)| (name.clone(), param.value()))
            .collect()
    }

    /// Forgets every parameter. Handles already handed out stay valid but are no
    /// longer reachable by name.
    pub fn clear(&self) {
        self.write().clear();
    }
}
