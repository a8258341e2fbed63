// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Probability distributions for noise injection and randomization
//!
//! Sampling never panics: a distribution whose parameters are invalid yields
//! `0.0` (no noise). Use [`ProbDistribution::validate`] at construction time
//! to surface bad parameters as errors instead.

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Exp, Gamma, LogNormal, Normal};
use serde::{Deserialize, Serialize};

use crate::types::{NeuralError, NeuralResult};

/// A sampleable scalar distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProbDistribution {
    Uniform { lower: f64, upper: f64 },
    Normal { mean: f64, std_dev: f64 },
    Exponential { lambda: f64 },
    Gamma { shape: f64, scale: f64 },
    LogNormal { location: f64, scale: f64 },
}

impl Default for ProbDistribution {
    fn default() -> Self {
        ProbDistribution::Uniform {
            lower: -1.0,
            upper: 1.0,
        }
    }
}

impl ProbDistribution {
    pub fn uniform(lower: f64, upper: f64) -> Self {
        ProbDistribution::Uniform { lower, upper }
    }

    pub fn normal(mean: f64, std_dev: f64) -> Self {
        ProbDistribution::Normal { mean, std_dev }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ProbDistribution::Uniform { .. } => "uniform",
            ProbDistribution::Normal { .. } => "normal",
            ProbDistribution::Exponential { .. } => "exponential",
            ProbDistribution::Gamma { .. } => "gamma",
            ProbDistribution::LogNormal { .. } => "log-normal",
        }
    }

    pub fn validate(&self) -> NeuralResult<()> {
        let ok = match *self {
            ProbDistribution::Uniform { lower, upper } => {
                lower.is_finite() && upper.is_finite() && lower <= upper
            }
            ProbDistribution::Normal { mean, std_dev } => Normal::new(mean, std_dev).is_ok(),
            ProbDistribution::Exponential { lambda } => lambda > 0.0 && Exp::new(lambda).is_ok(),
            ProbDistribution::Gamma { shape, scale } => Gamma::new(shape, scale).is_ok(),
            ProbDistribution::LogNormal { location, scale } => {
                LogNormal::new(location, scale).is_ok()
            }
        };
        if ok {
            Ok(())
        } else {
            Err(NeuralError::InvalidDistribution(format!("{:?}", self)))
        }
    }

    /// Draw one sample
    pub fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        match *self {
            ProbDistribution::Uniform { lower, upper } => {
                if lower < upper {
                    rng.gen_range(lower..upper)
                } else if lower == upper {
                    lower
                } else {
                    0.0
                }
            }
            ProbDistribution::Normal { mean, std_dev } => Normal::new(mean, std_dev)
                .map(|d| d.sample(rng))
                .unwrap_or(0.0),
            ProbDistribution::Exponential { lambda } => {
                Exp::new(lambda).map(|d| d.sample(rng)).unwrap_or(0.0)
            }
            ProbDistribution::Gamma { shape, scale } => Gamma::new(shape, scale)
                .map(|d| d.sample(rng))
                .unwrap_or(0.0),
            ProbDistribution::LogNormal { location, scale } => LogNormal::new(location, scale)
                .map(|d| d.sample(rng))
                .unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let dist = ProbDistribution::uniform(-0.5, 0.25);
        for _ in 0..1000 {
            let x = dist.sample(&mut rng);
            assert!((-0.5..0.25).contains(&x));
        }
    }

    #[test]
    fn test_degenerate_uniform() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(ProbDistribution::uniform(0.3, 0.3).sample(&mut rng), 0.3);
        assert_eq!(ProbDistribution::uniform(1.0, 0.0).sample(&mut rng), 0.0);
    }

    #[test]
    fn test_invalid_parameters_yield_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        let bad = ProbDistribution::Normal {
            mean: 0.0,
            std_dev: f64::NAN,
        };
        assert!(bad.validate().is_err());
        assert_eq!(bad.sample(&mut rng), 0.0);

        let bad_exp = ProbDistribution::Exponential { lambda: -1.0 };
        assert!(bad_exp.validate().is_err());
        assert_eq!(bad_exp.sample(&mut rng), 0.0);
    }

    #[test]
    fn test_normal_mean() {
        let mut rng = StdRng::seed_from_u64(11);
        let dist = ProbDistribution::normal(2.0, 0.5);
        let n = 5000;
        let mean: f64 = (0..n).map(|_| dist.sample(&mut rng)).sum::<f64>() / n as f64;
        assert!((mean - 2.0).abs() < 0.05, "mean was {}", mean);
    }

    #[test]
    fn test_positive_support_distributions() {
        let mut rng = StdRng::seed_from_u64(5);
        let dists = [
            ProbDistribution::Exponential { lambda: 2.0 },
            ProbDistribution::Gamma {
                shape: 2.0,
                scale: 1.0,
            },
            ProbDistribution::LogNormal {
                location: 0.0,
                scale: 0.5,
            },
        ];
        for dist in dists {
            assert!(dist.validate().is_ok(), "{}", dist.name());
            for _ in 0..100 {
                assert!(dist.sample(&mut rng) >= 0.0);
            }
        }
    }
}
