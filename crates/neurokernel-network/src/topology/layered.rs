// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Generic stack of neuron groups connected front to back

use std::sync::Arc;

use neurokernel_neural::{GroupId, Neuron, UpdateRule};

use super::{check_layer_sizes, LAYER_SPACING, NEURON_SPACING};
use crate::connectivity::ConnectionStrategy;
use crate::groups::SubnetworkKind;
use crate::network::Network;
use crate::types::NetworkResult;

/// One layer of a layered network
#[derive(Debug, Clone)]
pub struct LayerSpec {
    pub size: usize,
    pub rule: Arc<UpdateRule>,
    pub label: String,
    pub priority: i32,
    pub clamped: bool,
}

impl LayerSpec {
    pub fn new(size: usize, rule: Arc<UpdateRule>, label: impl Into<String>) -> Self {
        Self {
            size,
            rule,
            label: label.into(),
            priority: 0,
            clamped: false,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn clamped(mut self) -> Self {
        self.clamped = true;
        self
    }

    fn neurons(&self, row: usize) -> Vec<Neuron> {
        (0..self.size)
            .map(|j| {
                let mut n = Neuron::new(Arc::clone(&self.rule))
                    .at(j as f64 * NEURON_SPACING, -(row as f64) * LAYER_SPACING)
                    .with_priority(self.priority);
                n.set_clamped(self.clamped);
                n
            })
            .collect()
    }
}

/// Handle to a built layered network; always holds at least one layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredNetwork {
    subnet: GroupId,
    layers: Vec<GroupId>,
    weights: Vec<GroupId>,
}

impl LayeredNetwork {
    /// Build `layers` in a new subnetwork, connecting each to the next
    pub fn build(
        net: &mut Network,
        label: impl Into<String>,
        kind: SubnetworkKind,
        layers: &[LayerSpec],
        strategy: &dyn ConnectionStrategy,
    ) -> NetworkResult<Self> {
        let sizes: Vec<usize> = layers.iter().map(|l| l.size).collect();
        check_layer_sizes(&sizes, 1)?;

        let subnet = net.create_subnetwork(label, kind);
        let mut groups = Vec::with_capacity(layers.len());
        for (row, spec) in layers.iter().enumerate() {
            let gid = net.add_neuron_group_to_subnetwork(subnet, spec.neurons(row), spec.label.clone())?;
            groups.push(gid);
        }

        let mut weights = Vec::with_capacity(groups.len().saturating_sub(1));
        for pair in groups.windows(2) {
            weights.push(net.connect_neuron_groups(subnet, pair[0], pair[1], strategy)?);
        }

        Ok(Self {
            subnet,
            layers: groups,
            weights,
        })
    }

    pub fn subnet(&self) -> GroupId {
        self.subnet
    }

    /// Neuron groups, input first
    pub fn layers(&self) -> &[GroupId] {
        &self.layers
    }

    /// Synapse groups; `weights()[i]` connects `layers()[i]` to `layers()[i + 1]`
    pub fn weights(&self) -> &[GroupId] {
        &self.weights
    }

    pub fn input_layer(&self) -> GroupId {
        self.layers[0]
    }

    pub fn output_layer(&self) -> GroupId {
        self.layers[self.layers.len() - 1]
    }

    /// Layers between input and output
    pub fn hidden_layers(&self) -> &[GroupId] {
        if self.layers.len() < 2 {
            return &[];
        }
        &self.layers[1..self.layers.len() - 1]
    }
}
