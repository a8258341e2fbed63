// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synapse entity
//!
//! Holds a strength and its endpoints. Learning is not part of the kernel:
//! [`Synapse::update`] does nothing unless a [`SynapseRule`] is attached.

use core::fmt::Debug;
use std::sync::Arc;

use rand::RngCore;

use crate::context::StepContext;
use crate::noise::ProbDistribution;
use crate::types::{GroupId, NeuronId};

pub const DEFAULT_STRENGTH_BOUNDS: (f64, f64) = (-10.0, 10.0);

/// Extension point for synaptic plasticity
pub trait SynapseRule: Debug + Send + Sync {
    fn rule_name(&self) -> &'static str;

    /// New strength given pre-step endpoint activations
    fn apply(&self, ctx: &StepContext, source_activation: f64, target_activation: f64, strength: f64) -> f64;
}

#[derive(Debug, Clone)]
pub struct Synapse {
    source: NeuronId,
    target: NeuronId,
    strength: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub increment: f64,
    group: Option<GroupId>,
    rule: Option<Arc<dyn SynapseRule>>,
}

impl Synapse {
    pub fn new(source: NeuronId, target: NeuronId, strength: f64) -> Self {
        Self {
            source,
            target,
            strength,
            lower_bound: DEFAULT_STRENGTH_BOUNDS.0,
            upper_bound: DEFAULT_STRENGTH_BOUNDS.1,
            increment: 1.0,
            group: None,
            rule: None,
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn source(&self) -> NeuronId {
        self.source
    }

    pub fn target(&self) -> NeuronId {
        self.target
    }

    pub fn is_self_connection(&self) -> bool {
        self.source == self.target
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn set_strength(&mut self, strength: f64) {
        self.strength = strength;
    }

    /// Clamp strength into `[lower_bound, upper_bound]`
    pub fn clip(&mut self) {
        self.strength = self.strength.max(self.lower_bound).min(self.upper_bound);
    }

    /// Draw a new strength from `distribution`, clipped to bounds
    pub fn randomize(&mut self, distribution: &ProbDistribution, rng: &mut dyn RngCore) {
        self.strength = distribution.sample(rng);
        self.clip();
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn set_group(&mut self, group: Option<GroupId>) {
        self.group = group;
    }

    pub fn rule(&self) -> Option<&Arc<dyn SynapseRule>> {
        self.rule.as_ref()
    }

    pub fn set_rule(&mut self, rule: Option<Arc<dyn SynapseRule>>) {
        self.rule = rule;
    }

    /// Apply the attached rule, if any; weights stay put while clamped
    pub fn update(&mut self, ctx: &StepContext, source_activation: f64, target_activation: f64) {
        if ctx.clamp_weights {
            return;
        }
        if let Some(rule) = &self.rule {
            self.strength = rule.apply(ctx, source_activation, target_activation, self.strength);
            self.clip();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Debug)]
    struct Hebbian {
        rate: f64,
    }

    impl SynapseRule for Hebbian {
        fn rule_name(&self) -> &'static str {
            "Hebbian"
        }

        fn apply(&self, _ctx: &StepContext, src: f64, tgt: f64, strength: f64) -> f64 {
            strength + self.rate * src * tgt
        }
    }

    #[test]
    fn test_update_without_rule_is_noop() {
        let mut synapse = Synapse::new(NeuronId(0), NeuronId(1), 0.4);
        synapse.update(&StepContext::default(), 1.0, 1.0);
        assert_eq!(synapse.strength(), 0.4);
    }

    #[test]
    fn test_attached_rule_runs_and_clips() {
        let mut synapse = Synapse::new(NeuronId(0), NeuronId(1), 0.5).with_bounds(-1.0, 1.0);
        synapse.set_rule(Some(Arc::new(Hebbian { rate: 0.25 })));
        synapse.update(&StepContext::default(), 1.0, 1.0);
        assert_eq!(synapse.strength(), 0.75);
        synapse.update(&StepContext::default(), 1.0, 1.0);
        assert_eq!(synapse.strength(), 1.0);
    }

    #[test]
    fn test_clamp_weights_suppresses_rule() {
        let mut synapse = Synapse::new(NeuronId(0), NeuronId(1), 0.5);
        synapse.set_rule(Some(Arc::new(Hebbian { rate: 1.0 })));
        let ctx = StepContext {
            clamp_weights: true,
            ..StepContext::default()
        };
        synapse.update(&ctx, 1.0, 1.0);
        assert_eq!(synapse.strength(), 0.5);
    }

    #[test]
    fn test_randomize_clips() {
        let mut synapse = Synapse::new(NeuronId(0), NeuronId(0), 0.0).with_bounds(0.0, 0.5);
        assert!(synapse.is_self_connection());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            synapse.randomize(&ProbDistribution::uniform(-1.0, 1.0), &mut rng);
            assert!((0.0..=0.5).contains(&synapse.strength()));
        }
    }
}
