//! The `Context` owns every piece of per-run state a model touches: random
//! number generators, the trace of sample sites recorded so far and the set of
//! conditioned site values. Each module stores its state in a *data plugin*,
//! a type-keyed container that is created lazily the first time it is needed.
//!
//! Learnable parameters are deliberately not kept here; see
//! [`ParamStore`](crate::params::ParamStore), which outlives any single context.
use std::any::{Any, TypeId};

use log::trace;

use crate::HashMap;

/// A trait for objects that can provide data containers to be held by `Context`
pub trait DataPlugin: Any {
    type DataContainer;

    fn create_data_container() -> Self::DataContainer;
}

/// Defines a new type for storing data in Context.
#[macro_export]
macro_rules! define_data_plugin {
    ($plugin:ident, $data_container:ty, $default: expr) => {
        struct $plugin;

        impl $crate::context::DataPlugin for $plugin {
            type DataContainer = $data_container;

            fn create_data_container() -> Self::DataContainer {
                $default
            }
        }
    };
}
pub use define_data_plugin;

/// Execution context for a model run.
pub struct Context {
    data_plugins: HashMap<TypeId, Box<dyn Any>>,
}

impl Context {
    #[must_use]
    pub fn new() -> Context {
        Context {
            data_plugins: HashMap::default(),
        }
    }

    /// Retrieves a mutable reference to the data container associated with a
    /// `DataPlugin`, creating it first if it does not exist yet.
    #[allow(clippy::needless_pass_by_value)]
    pub fn get_data_mut<T: DataPlugin>(&mut self, _plugin: T) -> &mut T::DataContainer {
        self.data_plugins
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                trace!("creating data container for {}", std::any::type_name::<T>());
                let container: Box<dyn Any> = Box::new(T::create_data_container());
                container
            })
            .downcast_mut::<T::DataContainer>()
            .expect("data plugin container has the wrong type")
    }

    /// Retrieves a reference to the data container associated with a
    /// `DataPlugin`, or `None` if nothing has created it yet.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn get_data<T: DataPlugin>(&self, _plugin: T) -> Option<&T::DataContainer> {
        self.data_plugins
            .get(&TypeId::of::<T>())
            .and_then(|container| container.downcast_ref::<T::DataContainer>())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
