// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # IAC (Interactive Activation and Competition) Rule
//!
//! ```text
//! effect = (upper − a) × net    if net > 0
//!        = (a − lower) × net    otherwise
//! a(t+1) = clip( a + effect − decay × (a − rest) + noise )
//! ```

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::data::{NeuronData, RuleInput};
use super::traits::{BoundedRule, NeuronRule, NoisyRule, uniform_in};
use crate::context::StepContext;
use crate::noise::ProbDistribution;
use crate::types::error::invalid;
use crate::types::{check_bounds, NeuralResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IacRule {
    pub decay: f64,
    pub rest: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub clipping: bool,
    pub noise: Option<ProbDistribution>,
}

impl Default for IacRule {
    fn default() -> Self {
        Self {
            decay: 0.05,
            rest: 0.1,
            lower_bound: -0.2,
            upper_bound: 1.0,
            clipping: true,
            noise: None,
        }
    }
}

impl NeuronRule for IacRule {
    fn rule_name(&self) -> &'static str {
        "IAC"
    }

    fn apply(
        &self,
        _ctx: &StepContext,
        input: &RuleInput<'_>,
        data: &mut NeuronData,
        rng: &mut dyn RngCore,
    ) -> f64 {
        let act = input.activation;
        let net = input.net_input + data.bias;
        let effect = if net > 0.0 {
            (self.upper_bound - act) * net
        } else {
            (act - self.lower_bound) * net
        };
        let value = act + effect - self.decay * (act - self.rest) + self.sample_noise(rng);
        self.clip(value)
    }

    fn random_value(&self, rng: &mut dyn RngCore) -> f64 {
        uniform_in(rng, self.lower_bound, self.upper_bound)
    }

    fn validate(&self) -> NeuralResult<()> {
        check_bounds(self.lower_bound, self.upper_bound)?;
        if !(0.0..=1.0).contains(&self.decay) {
            return Err(invalid(self.rule_name(), "decay", "must lie in [0, 1]"));
        }
        Ok(())
    }
}

impl BoundedRule for IacRule {
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

impl NoisyRule for IacRule {
    fn noise(&self) -> Option<&ProbDistribution> {
        self.noise.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn step(rule: &IacRule, act: f64, net: f64) -> f64 {
        let mut rng = StdRng::seed_from_u64(0);
        rule.apply(
            &StepContext::default(),
            &RuleInput::isolated(act, net),
            &mut NeuronData::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_decays_to_rest_without_input() {
        let rule = IacRule::default();
        let mut act = 0.9;
        for _ in 0..500 {
            act = step(&rule, act, 0.0);
        }
        assert!((act - rule.rest).abs() < 1e-6);
    }

    #[test]
    fn test_asymmetric_effect() {
        let rule = IacRule {
            decay: 0.0,
            ..IacRule::default()
        };
        // Excitation scales with distance to the upper bound
        assert!((step(&rule, 0.5, 0.2) - 0.6).abs() < 1e-12);
        // Inhibition scales with distance to the lower bound
        assert!((step(&rule, 0.5, -0.2) - 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_clips_to_bounds() {
        let rule = IacRule::default();
        assert_eq!(step(&rule, 0.9, 50.0), 1.0);
        assert_eq!(step(&rule, 0.0, -50.0), -0.2);
    }

    #[test]
    fn test_contextual_increment_respects_upper_bound() {
        let rule = IacRule::default();
        assert!((rule.contextual_increment(0.5, 0.1) - 0.6).abs() < 1e-12);
        assert_eq!(rule.contextual_increment(0.95, 0.1), 1.0);
        assert_eq!(rule.contextual_increment(1.0, 0.1), 1.0);
        assert_eq!(rule.contextual_decrement(-0.15, 0.1), -0.2);
    }

    #[test]
    fn test_random_value_with_inverted_bounds() {
        let rule = IacRule {
            lower_bound: 1.0,
            upper_bound: -1.0,
            ..IacRule::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(rule.random_value(&mut rng), 1.0);

        let rule = IacRule::default();
        let value = rule.random_value(&mut rng);
        assert!((rule.lower_bound..rule.upper_bound).contains(&value));
    }
}
