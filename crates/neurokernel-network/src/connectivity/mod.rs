// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Connection strategies.

A strategy turns a list of source neurons and a list of target neurons into
fresh, unregistered synapses. The network registers them and wraps them in a
synapse group.
*/

pub mod patterns;

pub use patterns::{AllToAll, OneToOne, Sparse};

use neurokernel_neural::{
    synapse::DEFAULT_STRENGTH_BOUNDS, NeuronId, ProbDistribution, Synapse,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Pluggable synapse generator for `connect_neuron_groups`
pub trait ConnectionStrategy: std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn connect(
        &self,
        sources: &[NeuronId],
        targets: &[NeuronId],
        rng: &mut dyn RngCore,
    ) -> Vec<Synapse>;
}

/// How new synapses are initialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynapseTemplate {
    pub strength: ProbDistribution,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Default for SynapseTemplate {
    fn default() -> Self {
        Self::fixed(1.0)
    }
}

impl SynapseTemplate {
    /// Every synapse starts at `strength`
    pub fn fixed(strength: f64) -> Self {
        Self::random(ProbDistribution::uniform(strength, strength))
    }

    /// Strengths drawn from `distribution`
    pub fn random(distribution: ProbDistribution) -> Self {
        Self {
            strength: distribution,
            lower_bound: DEFAULT_STRENGTH_BOUNDS.0,
            upper_bound: DEFAULT_STRENGTH_BOUNDS.1,
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn build(&self, source: NeuronId, target: NeuronId, rng: &mut dyn RngCore) -> Synapse {
        let strength = self.strength.sample(rng);
        Synapse::new(source, target, strength).with_bounds(self.lower_bound, self.upper_bound)
    }
}
