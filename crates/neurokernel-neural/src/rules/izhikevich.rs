// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Izhikevich Rule
//!
//! Two-variable spiking model integrated with forward Euler:
//!
//! ```text
//! u ← u + dt × a(b·v − u)
//! v ← v + dt × (0.04v² + 5v + 140 − u + I + I_bg + noise)
//!
//! if v ≥ threshold:  v ← c,  u ← u + d,  spike
//! ```
//!
//! `v` is the neuron's activation; `u` lives in the neuron's private data.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::data::{NeuronData, RuleInput, RuleState};
use super::traits::{NeuronRule, NoisyRule, SpikingRule, uniform_in};
use crate::context::{StepContext, TimeType};
use crate::noise::ProbDistribution;
use crate::types::error::invalid;
use crate::types::NeuralResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IzhikevichRule {
    /// Recovery time scale
    pub a: f64,
    /// Recovery sensitivity to v
    pub b: f64,
    /// Post-spike reset of v
    pub c: f64,
    /// Post-spike increment of u
    pub d: f64,
    /// Constant background current
    pub background_current: f64,
    pub threshold: f64,
    pub noise: Option<ProbDistribution>,
}

impl Default for IzhikevichRule {
    fn default() -> Self {
        Self {
            a: 0.02,
            b: 0.2,
            c: -65.0,
            d: 8.0,
            background_current: 0.0,
            threshold: 30.0,
            noise: None,
        }
    }
}

impl NeuronRule for IzhikevichRule {
    fn rule_name(&self) -> &'static str {
        "Izhikevich"
    }

    fn time_type(&self) -> TimeType {
        TimeType::Continuous
    }

    fn create_data(&self) -> NeuronData {
        NeuronData::with_state(RuleState::Izhikevich { recovery: 0.0 })
    }

    fn apply(
        &self,
        ctx: &StepContext,
        input: &RuleInput<'_>,
        data: &mut NeuronData,
        rng: &mut dyn RngCore,
    ) -> f64 {
        let dt = ctx.time_step;
        let v = input.activation;
        let mut recovery = match data.state {
            RuleState::Izhikevich { recovery } => recovery,
            _ => 0.0,
        };

        recovery += dt * (self.a * (self.b * v - recovery));
        let noise = self.sample_noise(rng);
        let mut next = v
            + dt * (0.04 * v * v + 5.0 * v + 140.0 - recovery
                + input.net_input
                + self.background_current
                + noise);

        if next >= self.threshold {
            next = self.c;
            recovery += self.d;
            data.spiked = true;
        }

        data.state = RuleState::Izhikevich { recovery };
        next
    }

    fn random_value(&self, rng: &mut dyn RngCore) -> f64 {
        uniform_in(rng, self.c, self.threshold)
    }

    fn validate(&self) -> NeuralResult<()> {
        if self.c >= self.threshold {
            return Err(invalid(self.rule_name(), "c", "reset must be below threshold"));
        }
        match &self.noise {
            Some(noise) => noise.validate(),
            None => Ok(()),
        }
    }
}

impl NoisyRule for IzhikevichRule {
    fn noise(&self) -> Option<&ProbDistribution> {
        self.noise.as_ref()
    }
}

impl SpikingRule for IzhikevichRule {
    fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spike_resets_and_increments_recovery() {
        let rule = IzhikevichRule::default();
        let mut data = rule.create_data();
        let mut rng = StdRng::seed_from_u64(1);
        let ctx = StepContext::new(1.0);

        let next = rule.apply(&ctx, &RuleInput::isolated(29.0, 0.0), &mut data, &mut rng);

        assert_eq!(next, -65.0);
        assert!(data.spiked);
        match data.state {
            RuleState::Izhikevich { recovery } => {
                // u = 0 + 1·0.02·(0.2·29 − 0) = 0.116, then + d
                assert!((recovery - 8.116).abs() < 1e-12);
            }
            ref other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_constant_drive_produces_repeated_spikes() {
        let rule = IzhikevichRule {
            background_current: 10.0,
            ..IzhikevichRule::default()
        };
        let mut data = rule.create_data();
        let mut rng = StdRng::seed_from_u64(1);
        let ctx = StepContext::new(0.5);
        let mut v = -65.0;
        let mut spikes = 0;
        for _ in 0..2000 {
            data.spiked = false;
            v = rule.apply(&ctx, &RuleInput::isolated(v, 0.0), &mut data, &mut rng);
            if data.spiked {
                spikes += 1;
            }
        }
        assert!(spikes > 5, "only {} spikes", spikes);
        assert!(v < rule.threshold);
    }

    #[test]
    fn test_subthreshold_no_spike() {
        let rule = IzhikevichRule::default();
        let mut data = rule.create_data();
        let mut rng = StdRng::seed_from_u64(1);
        let next = rule.apply(
            &StepContext::new(0.1),
            &RuleInput::isolated(-65.0, 0.0),
            &mut data,
            &mut rng,
        );
        assert!(!data.spiked);
        // dv = 0.1·(169 − 325 + 140 + 0.026)
        assert!((next - -66.5974).abs() < 1e-9);
    }

    #[test]
    fn test_random_value_with_reset_above_threshold() {
        let rule = IzhikevichRule {
            c: 40.0,
            ..IzhikevichRule::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(rule.random_value(&mut rng), 40.0);
        assert!(rule.validate().is_err());
    }
}
