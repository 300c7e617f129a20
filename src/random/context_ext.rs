use std::any::{Any, TypeId};

use log::trace;

use crate::context::Context;
use crate::hashing::hash_str;
use crate::rand::distr::Distribution;
use crate::rand::{Rng, SeedableRng};
use crate::random::{RngId, RngPlugin};

/// Gets a mutable reference to the random number generator associated with the given
/// [`RngId`]. If the Rng has not been used before, one will be created from the base seed
/// set by `init_random` (zero if it was never called) offset by a hash of the rng's name.
fn get_rng<R: RngId + 'static>(context: &mut Context) -> &mut R::RngType {
    let data_container = context.get_data_mut(RngPlugin);
    let base_seed = data_container.base_seed;
    data_container
        .rng_holders
        .entry(TypeId::of::<R>())
        .or_insert_with(|| {
            trace!("creating new RNG {} (base seed={})", R::get_name(), base_seed);
            let seed_offset = hash_str(R::get_name());
            let rng: Box<dyn Any> =
                Box::new(R::RngType::seed_from_u64(base_seed.wrapping_add(seed_offset)));
            rng
        })
        .downcast_mut::<R::RngType>()
        .expect("rng holder has the wrong type")
}

// This is a trait extension on Context for
// random number generation functionality.
pub trait ContextRandomExt {
    /// Sets the base seed for every rng stream. Existing streams are dropped so that
    /// they are re-seeded the next time they are used.
    fn init_random(&mut self, base_seed: u64);

    /// Gets a random sample from the random number generator associated with the given
    /// [`RngId`] by applying the specified sampler function.
    fn sample<R: RngId + 'static, T>(
        &mut self,
        rng_id: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T;

    /// Gets a random sample from the specified distribution using the random number
    /// generator associated with the given [`RngId`].
    fn sample_distr<R: RngId + 'static, T>(
        &mut self,
        rng_id: R,
        distribution: impl Distribution<T>,
    ) -> T
    where
        R::RngType: Rng,
    {
        self.sample(rng_id, |rng| distribution.sample(rng))
    }

    /// Gets a random boolean value which is true with probability `p`
    /// using the generator associated with the given [`RngId`].
    fn sample_bool<R: RngId + 'static>(&mut self, rng_id: R, p: f64) -> bool
    where
        R::RngType: Rng,
    {
        self.sample(rng_id, |rng| rng.random_bool(p))
    }
}

impl ContextRandomExt for Context {
    fn init_random(&mut self, base_seed: u64) {
        trace!("initializing random module with base seed {base_seed}");
        let data_container = self.get_data_mut(RngPlugin);
        data_container.base_seed = base_seed;
        data_container.rng_holders.clear();
    }

    fn sample<R: RngId + 'static, T>(
        &mut self,
        _rng_id: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T {
        sampler(get_rng::<R>(self))
    }
}

#[cfg(test)]
mod test {
    use crate::context::Context;
    use crate::define_rng;
    use crate::rand::RngCore;
    use crate::random::ContextRandomExt;
    use rand_distr::Poisson;

    define_rng!(FooRng);
    define_rng!(BarRng);

    #[test]
    fn get_rng_basic() {
        let mut context = Context::new();
        context.init_random(42);

        assert_ne!(
            context.sample(FooRng, RngCore::next_u64),
            context.sample(FooRng, RngCore::next_u64)
        );
    }

    #[test]
    fn multiple_rng_types() {
        let mut context = Context::new();
        context.init_random(42);

        assert_ne!(
            context.sample(FooRng, RngCore::next_u64),
            context.sample(BarRng, RngCore::next_u64)
        );
    }

    #[test]
    fn reset_seed() {
        let mut context = Context::new();
        context.init_random(42);

        let run_0 = context.sample(FooRng, RngCore::next_u64);
        let run_1 = context.sample(FooRng, RngCore::next_u64);

        // Reset with same seed, ensure we get the same values
        context.init_random(42);
        assert_eq!(run_0, context.sample(FooRng, RngCore::next_u64));
        assert_eq!(run_1, context.sample(FooRng, RngCore::next_u64));

        // Reset with different seed, ensure we get different values
        context.init_random(88);
        assert_ne!(run_0, context.sample(FooRng, RngCore::next_u64));
        assert_ne!(run_1, context.sample(FooRng, RngCore::next_u64));
    }

    #[test]
    fn sample_distribution() {
        let mut context = Context::new();
        context.init_random(42);
        let poisson = Poisson::new(4.0).unwrap();
        let n_samples = 5000;
        let total: f64 = (0..n_samples)
            .map(|_| {
                let sample: f64 = context.sample_distr(FooRng, &poisson);
                sample
            })
            .sum();
        let mean = total / f64::from(n_samples);
        assert!((mean - 4.0).abs() < 0.15, "mean was {mean}");
    }

    #[test]
    fn sample_bool() {
        let mut context = Context::new();
        context.init_random(42);
        assert!(context.sample_bool(FooRng, 1.0));
        assert!(!context.sample_bool(FooRng, 0.0));
    }
}
