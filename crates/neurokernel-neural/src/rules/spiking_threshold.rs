// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Spiking threshold rule: emits 1 when the noisy net input reaches the
//! threshold, 0 otherwise.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::data::{NeuronData, RuleInput};
use super::traits::{NeuronRule, NoisyRule, SpikingRule};
use crate::context::StepContext;
use crate::noise::ProbDistribution;
use crate::types::NeuralResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikingThresholdRule {
    pub threshold: f64,
    pub noise: Option<ProbDistribution>,
}

impl Default for SpikingThresholdRule {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            noise: None,
        }
    }
}

impl NeuronRule for SpikingThresholdRule {
    fn rule_name(&self) -> &'static str {
        "Spiking Threshold"
    }

    fn apply(
        &self,
        _ctx: &StepContext,
        input: &RuleInput<'_>,
        data: &mut NeuronData,
        rng: &mut dyn RngCore,
    ) -> f64 {
        if input.net_input + self.sample_noise(rng) >= self.threshold {
            data.spiked = true;
            1.0
        } else {
            0.0
        }
    }

    fn random_value(&self, rng: &mut dyn RngCore) -> f64 {
        if rng.gen_bool(0.5) {
            1.0
        } else {
            0.0
        }
    }

    fn validate(&self) -> NeuralResult<()> {
        match &self.noise {
            Some(noise) => noise.validate(),
            None => Ok(()),
        }
    }
}

impl NoisyRule for SpikingThresholdRule {
    fn noise(&self) -> Option<&ProbDistribution> {
        self.noise.as_ref()
    }
}

impl SpikingRule for SpikingThresholdRule {
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
    fn test_threshold_is_inclusive() {
        let rule = SpikingThresholdRule::default();
        let mut rng = StdRng::seed_from_u64(0);
        let ctx = StepContext::default();

        let mut data = NeuronData::default();
        assert_eq!(rule.apply(&ctx, &RuleInput::isolated(0.0, 0.5), &mut data, &mut rng), 1.0);
        assert!(data.spiked);

        let mut data = NeuronData::default();
        assert_eq!(rule.apply(&ctx, &RuleInput::isolated(0.0, 0.49), &mut data, &mut rng), 0.0);
        assert!(!data.spiked);
    }

    #[test]
    fn test_noise_can_push_over_threshold() {
        let rule = SpikingThresholdRule {
            threshold: 0.5,
            noise: Some(ProbDistribution::uniform(0.2, 0.3)),
        };
        let mut rng = StdRng::seed_from_u64(0);
        let out = rule.apply(
            &StepContext::default(),
            &RuleInput::isolated(0.0, 0.35),
            &mut NeuronData::default(),
            &mut rng,
        );
        assert_eq!(out, 1.0);
    }
}
