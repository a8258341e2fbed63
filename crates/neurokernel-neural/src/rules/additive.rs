// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Additive (continuous Hopfield) Rule
//!
//! ```text
//! g(x)   = (2/π) × atan(π·λ·x / 2)
//! a(t+dt) = clip( a + dt × (−a/R + Σ w·g(src) + I_ext) + noise )
//! ```

use std::f64::consts::PI;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::data::{NeuronData, RuleInput};
use super::traits::{BoundedRule, NeuronRule, NoisyRule, uniform_in};
use crate::context::{StepContext, TimeType};
use crate::noise::ProbDistribution;
use crate::types::error::invalid;
use crate::types::{check_bounds, NeuralResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditiveRule {
    /// Gain λ of the source nonlinearity
    pub lambda: f64,
    /// Leak resistance R
    pub resistance: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub clipping: bool,
    pub noise: Option<ProbDistribution>,
}

impl Default for AdditiveRule {
    fn default() -> Self {
        Self {
            lambda: 1.4,
            resistance: 1.0,
            lower_bound: -1.0,
            upper_bound: 1.0,
            clipping: true,
            noise: None,
        }
    }
}

impl AdditiveRule {
    /// Source nonlinearity
    pub fn squash(&self, x: f64) -> f64 {
        2.0 / PI * (PI * self.lambda * x / 2.0).atan()
    }
}

impl NeuronRule for AdditiveRule {
    fn rule_name(&self) -> &'static str {
        "Additive"
    }

    fn time_type(&self) -> TimeType {
        TimeType::Continuous
    }

    fn apply(
        &self,
        ctx: &StepContext,
        input: &RuleInput<'_>,
        _data: &mut NeuronData,
        rng: &mut dyn RngCore,
    ) -> f64 {
        let act = input.activation;
        let weighted: f64 = input
            .fan_in
            .iter()
            .map(|s| s.strength * self.squash(s.source_activation))
            .sum();
        // Non-positive resistance disables the leak term
        let leak = if self.resistance > 0.0 {
            -act / self.resistance
        } else {
            0.0
        };
        let derivative = leak + weighted + input.external_input;
        self.clip(act + ctx.time_step * derivative + self.sample_noise(rng))
    }

    fn random_value(&self, rng: &mut dyn RngCore) -> f64 {
        uniform_in(rng, self.lower_bound, self.upper_bound)
    }

    fn validate(&self) -> NeuralResult<()> {
        if !(self.resistance > 0.0) {
            return Err(invalid(self.rule_name(), "resistance", "must be positive"));
        }
        check_bounds(self.lower_bound, self.upper_bound)
    }
}

impl BoundedRule for AdditiveRule {
    fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    fn clipping(&self) -> bool {
        self.clipping
    }
}

impl NoisyRule for AdditiveRule {
    fn noise(&self) -> Option<&ProbDistribution> {
        self.noise.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::data::FanInSample;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_squash_is_odd_and_bounded() {
        let rule = AdditiveRule::default();
        assert_eq!(rule.squash(0.0), 0.0);
        assert!((rule.squash(0.7) + rule.squash(-0.7)).abs() < 1e-12);
        assert!(rule.squash(1e9) < 1.0);
    }

    #[test]
    fn test_nonlinearity_applied_per_source() {
        let rule = AdditiveRule {
            clipping: false,
            ..AdditiveRule::default()
        };
        let fan_in = [FanInSample::new(0.5, 2.0)];
        let mut rng = StdRng::seed_from_u64(0);
        let next = rule.apply(
            &StepContext::new(0.1),
            &RuleInput::from_fan_in(0.2, 0.0, &fan_in),
            &mut NeuronData::default(),
            &mut rng,
        );
        let expected = 0.2 + 0.1 * (-0.2 + 2.0 * rule.squash(0.5));
        assert!((next - expected).abs() < 1e-12);
    }

    #[test]
    fn test_leaks_toward_zero() {
        let rule = AdditiveRule::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut act = 0.8;
        for _ in 0..200 {
            act = rule.apply(
                &StepContext::new(0.1),
                &RuleInput::isolated(act, 0.0),
                &mut NeuronData::default(),
                &mut rng,
            );
        }
        assert!(act.abs() < 1e-6);
    }

    #[test]
    fn test_random_value_with_equal_bounds() {
        let rule = AdditiveRule {
            lower_bound: 0.5,
            upper_bound: 0.5,
            ..AdditiveRule::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(rule.random_value(&mut rng), 0.5);
    }

    #[test]
    fn test_zero_resistance_means_no_leak() {
        let rule = AdditiveRule {
            resistance: 0.0,
            clipping: false,
            ..AdditiveRule::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let next = rule.apply(
            &StepContext::new(0.1),
            &RuleInput::isolated(0.4, 1.0),
            &mut NeuronData::default(),
            &mut rng,
        );
        assert!(next.is_finite());
        assert!((next - 0.5).abs() < 1e-12);
        assert!(rule.validate().is_err());
    }
}
