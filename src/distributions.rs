//! The four distributions the transmission models are built from. Sampling goes through
//! `rand_distr`; log-densities come from `statrs`. Every value is a plain `f64`, with counts and
//! Bernoulli outcomes represented by whole numbers.

use rand::Rng;
use rand_distr::Distribution;
use statrs::distribution::{Continuous, Discrete};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dist {
    /// Outcome 1.0 with probability `p`, else 0.0.
    Bernoulli { p: f64 },
    /// A rate of zero is the point mass at zero.
    Poisson { rate: f64 },
    Beta {
        concentration1: f64,
        concentration0: f64,
    },
    Normal { loc: f64, scale: f64 },
}

fn invalid(message: String) -> ModelError {
    ModelError::InvalidDistribution(message)
}

/// Interprets `value` as a count, if it is one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Some(value as u64)
    } else {
        None
    }
}

impl Dist {
    pub fn bernoulli(p: f64) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(invalid(format!("Bernoulli probability {p} is outside [0, 1]")));
        }
        Ok(Dist::Bernoulli { p })
    }

    pub fn poisson(rate: f64) -> Result<Self, ModelError> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(invalid(format!("Poisson rate {rate} must be finite and non-negative")));
        }
        Ok(Dist::Poisson { rate })
    }

    pub fn beta(concentration1: f64, concentration0: f64) -> Result<Self, ModelError> {
        for concentration in [concentration1, concentration0] {
            if !concentration.is_finite() || concentration <= 0.0 {
                return Err(invalid(format!(
                    "Beta concentration {concentration} must be finite and positive"
                )));
            }
        }
        Ok(Dist::Beta {
            concentration1,
            concentration0,
        })
    }

    pub fn normal(loc: f64, scale: f64) -> Result<Self, ModelError> {
        if !loc.is_finite() {
            return Err(invalid(format!("Normal location {loc} must be finite")));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(invalid(format!("Normal scale {scale} must be finite and positive")));
        }
        Ok(Dist::Normal { loc, scale })
    }

    /// Draws one value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, ModelError> {
        let value = match *self {
            Dist::Bernoulli { p } => {
                let bernoulli =
                    rand::distr::Bernoulli::new(p).map_err(|e| invalid(e.to_string()))?;
                if bernoulli.sample(rng) {
                    1.0
                } else {
                    0.0
                }
            }
            Dist::Poisson { rate } if rate == 0.0 => 0.0,
            Dist::Poisson { rate } => rand_distr::Poisson::new(rate)
                .map_err(|e| invalid(e.to_string()))?
                .sample(rng),
            Dist::Beta {
                concentration1,
                concentration0,
            } => rand_distr::Beta::new(concentration1, concentration0)
                .map_err(|e| invalid(e.to_string()))?
                .sample(rng),
            Dist::Normal { loc, scale } => rand_distr::Normal::new(loc, scale)
                .map_err(|e| invalid(e.to_string()))?
                .sample(rng),
        };
        Ok(value)
    }

    /// Log-probability (mass for discrete distributions, density otherwise) of `value`.
    /// Values outside the support score negative infinity.
    #[must_use]
    pub fn log_prob(&self, value: f64) -> f64 {
        match *self {
            Dist::Bernoulli { p } => match as_count(value) {
                Some(k) => statrs::distribution::Bernoulli::new(p)
                    .map_or(f64::NEG_INFINITY, |d| d.ln_pmf(k)),
                None => f64::NEG_INFINITY,
            },
            Dist::Poisson { rate } => match as_count(value) {
                Some(0) if rate == 0.0 => 0.0,
                Some(_) if rate == 0.0 => f64::NEG_INFINITY,
                Some(k) => statrs::distribution::Poisson::new(rate)
                    .map_or(f64::NEG_INFINITY, |d| d.ln_pmf(k)),
                None => f64::NEG_INFINITY,
            },
            Dist::Beta {
                concentration1,
                concentration0,
            } => {
                if !(0.0..=1.0).contains(&value) {
                    return f64::NEG_INFINITY;
                }
                statrs::distribution::Beta::new(concentration1, concentration0)
                    .map_or(f64::NEG_INFINITY, |d| d.ln_pdf(value))
            }
            Dist::Normal { loc, scale } => {
                if !value.is_finite() {
                    return f64::NEG_INFINITY;
                }
                statrs::distribution::Normal::new(loc, scale)
                    .map_or(f64::NEG_INFINITY, |d| d.ln_pdf(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Dist;
    use crate::error::ModelError;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn constructors_reject_out_of_domain_parameters() {
        assert!(matches!(
            Dist::bernoulli(1.5),
            Err(ModelError::InvalidDistribution(_))
        ));
        assert!(Dist::bernoulli(f64::NAN).is_err());
        assert!(Dist::poisson(-1.0).is_err());
        assert!(Dist::poisson(f64::INFINITY).is_err());
        assert!(Dist::beta(0.0, 1.0).is_err());
        assert!(Dist::beta(1.0, -2.0).is_err());
        assert!(Dist::normal(0.0, 0.0).is_err());
        assert!(Dist::normal(f64::NAN, 1.0).is_err());
        assert!(Dist::poisson(0.0).is_ok());
    }

    #[test]
    fn bernoulli_log_prob() {
        let dist = Dist::bernoulli(0.3).unwrap();
        assert_abs_diff_eq!(dist.log_prob(1.0), 0.3_f64.ln(), epsilon = 1e-10);
        assert_abs_diff_eq!(dist.log_prob(0.0), 0.7_f64.ln(), epsilon = 1e-10);
        assert_eq!(dist.log_prob(0.5), f64::NEG_INFINITY);
    }

    #[test]
    fn poisson_log_prob() {
        let dist = Dist::poisson(2.0).unwrap();
        assert_abs_diff_eq!(dist.log_prob(0.0), -2.0, epsilon = 1e-10);
        // ln(2^3 e^-2 / 3!)
        assert_abs_diff_eq!(
            dist.log_prob(3.0),
            3.0 * 2.0_f64.ln() - 2.0 - 6.0_f64.ln(),
            epsilon = 1e-10
        );
        assert_eq!(dist.log_prob(1.5), f64::NEG_INFINITY);
        assert_eq!(dist.log_prob(-1.0), f64::NEG_INFINITY);
    }

    #[test]
    fn zero_rate_poisson_is_point_mass() {
        let dist = Dist::poisson(0.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(dist.sample(&mut rng).unwrap(), 0.0);
        assert_eq!(dist.log_prob(0.0), 0.0);
        assert_eq!(dist.log_prob(1.0), f64::NEG_INFINITY);
    }

    #[test]
    fn beta_log_prob() {
        let uniform = Dist::beta(1.0, 1.0).unwrap();
        assert_abs_diff_eq!(uniform.log_prob(0.25), 0.0, epsilon = 1e-10);
        assert_eq!(uniform.log_prob(1.5), f64::NEG_INFINITY);

        // Beta(2, 1) has density 2x
        let skewed = Dist::beta(2.0, 1.0).unwrap();
        assert_abs_diff_eq!(skewed.log_prob(0.5), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(skewed.log_prob(0.25), 0.5_f64.ln(), epsilon = 1e-10);
    }

    #[test]
    fn normal_log_prob() {
        let dist = Dist::normal(1.0, 2.0).unwrap();
        let expected = -0.5 * (2.0 * std::f64::consts::PI).ln() - 2.0_f64.ln();
        assert_abs_diff_eq!(dist.log_prob(1.0), expected, epsilon = 1e-10);
        assert_eq!(dist.log_prob(f64::NAN), f64::NEG_INFINITY);
    }

    #[test]
    fn samples_stay_in_support() {
        let mut rng = SmallRng::seed_from_u64(42);
        let bernoulli = Dist::bernoulli(0.5).unwrap();
        let poisson = Dist::poisson(12.0).unwrap();
        let beta = Dist::beta(6.0, 24.0).unwrap();
        for _ in 0..1000 {
            let flag = bernoulli.sample(&mut rng).unwrap();
            assert!(flag == 0.0 || flag == 1.0);
            let count = poisson.sample(&mut rng).unwrap();
            assert!(count >= 0.0 && count.fract() == 0.0);
            let rate = beta.sample(&mut rng).unwrap();
            assert!((0.0..=1.0).contains(&rate));
        }
    }
}
