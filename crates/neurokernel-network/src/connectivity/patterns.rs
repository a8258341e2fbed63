// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Built-in connection patterns: all-to-all, one-to-one and sparse.
*/

use neurokernel_neural::{NeuronId, Synapse};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::{ConnectionStrategy, SynapseTemplate};

/// Every source connects to every target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllToAll {
    pub template: SynapseTemplate,
    pub allow_self_connections: bool,
}

impl Default for AllToAll {
    fn default() -> Self {
        Self {
            template: SynapseTemplate::default(),
            allow_self_connections: true,
        }
    }
}

impl AllToAll {
    pub fn new(template: SynapseTemplate) -> Self {
        Self {
            template,
            ..Self::default()
        }
    }

    pub fn without_self_connections(mut self) -> Self {
        self.allow_self_connections = false;
        self
    }
}

impl ConnectionStrategy for AllToAll {
    fn name(&self) -> &'static str {
        "all-to-all"
    }

    fn connect(
        &self,
        sources: &[NeuronId],
        targets: &[NeuronId],
        rng: &mut dyn RngCore,
    ) -> Vec<Synapse> {
        let mut out = Vec::with_capacity(sources.len() * targets.len());
        for &src in sources {
            for &tgt in targets {
                if src == tgt && !self.allow_self_connections {
                    continue;
                }
                out.push(self.template.build(src, tgt, rng));
            }
        }
        out
    }
}

/// The i-th source connects to the i-th target; extras are left out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneToOne {
    pub template: SynapseTemplate,
}

impl OneToOne {
    pub fn new(template: SynapseTemplate) -> Self {
        Self { template }
    }
}

impl ConnectionStrategy for OneToOne {
    fn name(&self) -> &'static str {
        "one-to-one"
    }

    fn connect(
        &self,
        sources: &[NeuronId],
        targets: &[NeuronId],
        rng: &mut dyn RngCore,
    ) -> Vec<Synapse> {
        sources
            .iter()
            .zip(targets)
            .map(|(&src, &tgt)| self.template.build(src, tgt, rng))
            .collect()
    }
}

/// Each candidate pair connects with a fixed probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sparse {
    pub connection_probability: f64,
    pub template: SynapseTemplate,
    pub allow_self_connections: bool,
}

impl Default for Sparse {
    fn default() -> Self {
        Self {
            connection_probability: 0.1,
            template: SynapseTemplate::default(),
            allow_self_connections: false,
        }
    }
}

impl Sparse {
    pub fn new(connection_probability: f64) -> Self {
        Self {
            connection_probability: connection_probability.clamp(0.0, 1.0),
            ..Self::default()
        }
    }
}

impl ConnectionStrategy for Sparse {
    fn name(&self) -> &'static str {
        "sparse"
    }

    fn connect(
        &self,
        sources: &[NeuronId],
        targets: &[NeuronId],
        rng: &mut dyn RngCore,
    ) -> Vec<Synapse> {
        let mut out = Vec::new();
        for &src in sources {
            for &tgt in targets {
                if src == tgt && !self.allow_self_connections {
                    continue;
                }
                if rng.gen::<f64>() < self.connection_probability {
                    out.push(self.template.build(src, tgt, rng));
                }
            }
        }
        out
    }
}
