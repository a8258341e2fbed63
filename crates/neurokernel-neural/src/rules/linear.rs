// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Linear Rule
//!
//! ```text
//! a(t+1) = clip( slope × net + bias + noise )
//! ```

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::data::{NeuronData, RuleInput};
use super::traits::{
    uniform_in, BoundedRule, DifferentiableRule, InvertibleRule, NeuronRule, NoisyRule,
};
use crate::context::StepContext;
use crate::noise::ProbDistribution;
use crate::types::error::invalid;
use crate::types::{check_bounds, NeuralResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRule {
    pub slope: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub clipping: bool,
    pub noise: Option<ProbDistribution>,
}

impl Default for LinearRule {
    fn default() -> Self {
        Self {
            slope: 1.0,
            lower_bound: -1.0,
            upper_bound: 1.0,
            clipping: true,
            noise: None,
        }
    }
}

impl LinearRule {
    /// Identity transfer with no clipping
    pub fn identity() -> Self {
        Self {
            clipping: false,
            ..Self::default()
        }
    }
}

impl NeuronRule for LinearRule {
    fn rule_name(&self) -> &'static str {
        "Linear"
    }

    fn apply(
        &self,
        _ctx: &StepContext,
        input: &RuleInput<'_>,
        data: &mut NeuronData,
        rng: &mut dyn RngCore,
    ) -> f64 {
        let value = self.slope * input.net_input + data.bias + self.sample_noise(rng);
        self.clip(value)
    }

    fn random_value(&self, rng: &mut dyn RngCore) -> f64 {
        uniform_in(rng, self.lower_bound, self.upper_bound)
    }

    fn validate(&self) -> NeuralResult<()> {
        if !self.slope.is_finite() {
            return Err(invalid(self.rule_name(), "slope", "must be finite"));
        }
        check_bounds(self.lower_bound, self.upper_bound)?;
        match &self.noise {
            Some(noise) => noise.validate(),
            None => Ok(()),
        }
    }
}

impl BoundedRule for LinearRule {
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

impl DifferentiableRule for LinearRule {
    fn derivative(&self, input: f64) -> f64 {
        if self.clipping {
            let value = self.slope * input;
            if value <= self.lower_bound || value >= self.upper_bound {
                return 0.0;
            }
        }
        self.slope
    }
}

impl InvertibleRule for LinearRule {
    /// Bias is excluded; a zero slope maps everything back to zero
    fn inverse(&self, activation: f64) -> f64 {
        if self.slope == 0.0 {
            0.0
        } else {
            activation / self.slope
        }
    }
}

impl NoisyRule for LinearRule {
    fn noise(&self) -> Option<&ProbDistribution> {
        self.noise.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn step(rule: &LinearRule, net: f64, bias: f64) -> f64 {
        let mut rng = StdRng::seed_from_u64(0);
        let mut data = NeuronData {
            bias,
            ..NeuronData::default()
        };
        rule.apply(
            &StepContext::default(),
            &RuleInput::isolated(0.0, net),
            &mut data,
            &mut rng,
        )
    }

    #[test]
    fn test_slope_and_bias() {
        let rule = LinearRule {
            slope: 2.0,
            ..LinearRule::identity()
        };
        assert_eq!(step(&rule, 1.5, 0.5), 3.5);
    }

    #[test]
    fn test_clipping_saturates_at_bounds() {
        let rule = LinearRule::default();
        assert_eq!(step(&rule, 5.0, 0.0), 1.0);
        assert_eq!(step(&rule, -5.0, 0.0), -1.0);
        assert_eq!(step(&rule, 0.25, 0.0), 0.25);
    }

    #[test]
    fn test_derivative_and_inverse() {
        let rule = LinearRule {
            slope: 4.0,
            ..LinearRule::identity()
        };
        assert_eq!(rule.derivative(10.0), 4.0);
        assert_eq!(rule.inverse(2.0), 0.5);
        assert_eq!(LinearRule::default().derivative(3.0), 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(LinearRule::default().validate().is_ok());
        let bad = LinearRule {
            lower_bound: 1.0,
            upper_bound: -1.0,
            ..LinearRule::default()
        };
        assert!(bad.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_identity_without_clipping(x in -1.0e6f64..1.0e6) {
            prop_assert_eq!(step(&LinearRule::identity(), x, 0.0), x);
        }

        #[test]
        fn prop_clipped_output_within_bounds(
            x in -1.0e3f64..1.0e3,
            lo in -10.0f64..0.0,
            width in 0.1f64..10.0,
        ) {
            let hi = lo + width;
            let rule = LinearRule { lower_bound: lo, upper_bound: hi, ..LinearRule::default() };
            let y = step(&rule, x, 0.0);
            prop_assert!(y >= lo && y <= hi);
            if x >= hi {
                prop_assert_eq!(y, hi);
            }
            if x <= lo {
                prop_assert_eq!(y, lo);
            }
        }
    }
}
