// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Naka-Rushton Rule
//!
//! Saturating rate response, relaxed toward with a fixed Euler fraction:
//!
//! ```text
//! S(p) = M·pᴺ / ((σ + A)ᴺ + pᴺ)    for p > 0
//!      = 0                          for p ≤ 0
//!
//! a ← a + 0.1 × (S(p) − a)
//! A ← A + 0.1 × (α·a − A)          (adaptation, when enabled)
//! ```

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::data::{NeuronData, RuleInput, RuleState};
use super::traits::{BoundedRule, NeuronRule, NoisyRule, uniform_in};
use crate::context::{StepContext, TimeType};
use crate::noise::ProbDistribution;
use crate::types::error::invalid;
use crate::types::NeuralResult;

/// Fraction of the distance to the target response covered per step
pub const STEP_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NakaRushtonRule {
    /// Saturation level M
    pub max_value: f64,
    /// Exponent N
    pub steepness: f64,
    /// Input producing half-maximal response, σ
    pub semi_saturation: f64,
    pub use_adaptation: bool,
    /// Adaptation gain α
    pub adaptation_parameter: f64,
    pub clipping: bool,
    pub noise: Option<ProbDistribution>,
}

impl Default for NakaRushtonRule {
    fn default() -> Self {
        Self {
            max_value: 100.0,
            steepness: 2.0,
            semi_saturation: 120.0,
            use_adaptation: false,
            adaptation_parameter: 0.7,
            clipping: false,
            noise: None,
        }
    }
}

impl NakaRushtonRule {
    /// Target response for input `p` under adaptation `adaptation`
    pub fn saturation(&self, p: f64, adaptation: f64) -> f64 {
        if p <= 0.0 {
            return 0.0;
        }
        let pn = p.powf(self.steepness);
        let denom = (self.semi_saturation + adaptation).powf(self.steepness) + pn;
        if denom <= 0.0 || !denom.is_finite() {
            return 0.0;
        }
        self.max_value * pn / denom
    }
}

impl NeuronRule for NakaRushtonRule {
    fn rule_name(&self) -> &'static str {
        "Naka-Rushton"
    }

    fn time_type(&self) -> TimeType {
        TimeType::Continuous
    }

    fn create_data(&self) -> NeuronData {
        NeuronData::with_state(RuleState::NakaRushton { adaptation: 0.0 })
    }

    fn apply(
        &self,
        _ctx: &StepContext,
        input: &RuleInput<'_>,
        data: &mut NeuronData,
        rng: &mut dyn RngCore,
    ) -> f64 {
        let act = input.activation;
        let p = input.net_input + self.sample_noise(rng);
        let mut adaptation = match data.state {
            RuleState::NakaRushton { adaptation } if self.use_adaptation => adaptation,
            _ => 0.0,
        };

        let target = self.saturation(p, adaptation);
        if self.use_adaptation {
            adaptation += STEP_FRACTION * (self.adaptation_parameter * act - adaptation);
        }
        data.state = RuleState::NakaRushton { adaptation };

        self.clip(act + STEP_FRACTION * (target - act))
    }

    fn random_value(&self, rng: &mut dyn RngCore) -> f64 {
        uniform_in(rng, 0.0, self.max_value)
    }

    fn validate(&self) -> NeuralResult<()> {
        if !(self.max_value > 0.0) {
            return Err(invalid(self.rule_name(), "max_value", "must be positive"));
        }
        if !(self.semi_saturation > 0.0) {
            return Err(invalid(self.rule_name(), "semi_saturation", "must be positive"));
        }
        Ok(())
    }
}

impl BoundedRule for NakaRushtonRule {
    fn lower_bound(&self) -> f64 {
        0.0
    }

    fn upper_bound(&self) -> f64 {
        self.max_value
    }

    fn clipping(&self) -> bool {
        self.clipping
    }
}

impl NoisyRule for NakaRushtonRule {
    fn noise(&self) -> Option<&ProbDistribution> {
        self.noise.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(rule: &NakaRushtonRule, net: f64, steps: usize) -> (f64, NeuronData) {
        let mut rng = StdRng::seed_from_u64(0);
        let mut data = rule.create_data();
        let mut act = 0.0;
        for _ in 0..steps {
            act = rule.apply(
                &StepContext::default(),
                &RuleInput::isolated(act, net),
                &mut data,
                &mut rng,
            );
        }
        (act, data)
    }

    #[test]
    fn test_half_saturation_at_sigma() {
        let rule = NakaRushtonRule::default();
        assert!((rule.saturation(120.0, 0.0) - 50.0).abs() < 1e-9);
        let (act, _) = run(&rule, 120.0, 400);
        assert!((act - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_positive_input_short_circuits() {
        let rule = NakaRushtonRule::default();
        assert_eq!(rule.saturation(0.0, 0.0), 0.0);
        assert_eq!(rule.saturation(-5.0, 0.0), 0.0);

        let mut rng = StdRng::seed_from_u64(0);
        let next = rule.apply(
            &StepContext::default(),
            &RuleInput::isolated(10.0, -3.0),
            &mut rule.create_data(),
            &mut rng,
        );
        assert!((next - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_adaptation_lowers_steady_state() {
        let plain = NakaRushtonRule::default();
        let adapting = NakaRushtonRule {
            use_adaptation: true,
            ..NakaRushtonRule::default()
        };
        let (plain_act, _) = run(&plain, 120.0, 400);
        let (adapted_act, data) = run(&adapting, 120.0, 400);
        assert!(adapted_act < plain_act);
        match data.state {
            RuleState::NakaRushton { adaptation } => assert!(adaptation > 0.0),
            ref other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_random_value_with_non_positive_max() {
        let rule = NakaRushtonRule {
            max_value: 0.0,
            ..NakaRushtonRule::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(rule.random_value(&mut rng), 0.0);

        let rule = NakaRushtonRule {
            max_value: -5.0,
            ..NakaRushtonRule::default()
        };
        assert_eq!(rule.random_value(&mut rng), 0.0);
    }
}
