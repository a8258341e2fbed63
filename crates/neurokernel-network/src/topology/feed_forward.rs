// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Feed-forward network
//!
//! A clamped input layer followed by sigmoidal layers whose update priority
//! equals their layer index, so priority scheduling propagates strictly
//! front to back. Consecutive layers are fully connected with strengths
//! drawn uniformly from the configured weight range.

use std::sync::Arc;

use neurokernel_config::TopologyConfig;
use neurokernel_neural::{
    check_bounds, rules::ClampedRule, rules::SigmoidalRule, GroupId, ProbDistribution, UpdateRule,
};
use tracing::info;

use super::{check_layer_sizes, LayerSpec, LayeredNetwork};
use crate::connectivity::{AllToAll, SynapseTemplate};
use crate::groups::SubnetworkKind;
use crate::network::Network;
use crate::types::NetworkResult;

#[derive(Debug, Clone)]
pub struct FeedForwardOptions {
    /// Neurons per layer, input first
    pub layer_sizes: Vec<usize>,
    pub weight_lower: f64,
    pub weight_upper: f64,
    pub input_rule: Arc<UpdateRule>,
    /// Rule for every non-input layer
    pub layer_rule: Arc<UpdateRule>,
}

impl Default for FeedForwardOptions {
    fn default() -> Self {
        Self::from_config(&TopologyConfig::default())
    }
}

impl FeedForwardOptions {
    pub fn from_config(config: &TopologyConfig) -> Self {
        Self {
            layer_sizes: config.layer_sizes.clone(),
            weight_lower: config.weight_lower,
            weight_upper: config.weight_upper,
            input_rule: Arc::new(UpdateRule::Clamped(ClampedRule)),
            layer_rule: Arc::new(UpdateRule::Sigmoidal(SigmoidalRule::default())),
        }
    }

    pub fn with_layers(mut self, layer_sizes: &[usize]) -> Self {
        self.layer_sizes = layer_sizes.to_vec();
        self
    }

    pub fn validate(&self) -> NetworkResult<()> {
        check_layer_sizes(&self.layer_sizes, 2)?;
        check_bounds(self.weight_lower, self.weight_upper)?;
        self.input_rule.validate()?;
        self.layer_rule.validate()?;
        Ok(())
    }

    fn layer_specs(&self) -> Vec<LayerSpec> {
        self.layer_sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                if i == 0 {
                    LayerSpec::new(*size, Arc::clone(&self.input_rule), "Input layer")
                } else {
                    let label = if i == self.layer_sizes.len() - 1 {
                        "Output layer".to_string()
                    } else {
                        format!("Hidden layer {i}")
                    };
                    LayerSpec::new(*size, Arc::clone(&self.layer_rule), label).with_priority(i as i32)
                }
            })
            .collect()
    }
}

/// Handle to a built feed-forward network
#[derive(Debug, Clone, PartialEq)]
pub struct FeedForward {
    layered: LayeredNetwork,
}

impl FeedForward {
    pub fn build(
        net: &mut Network,
        label: impl Into<String>,
        options: &FeedForwardOptions,
    ) -> NetworkResult<Self> {
        Self::build_as(net, label, options, SubnetworkKind::FeedForward)
    }

    pub(crate) fn build_as(
        net: &mut Network,
        label: impl Into<String>,
        options: &FeedForwardOptions,
        kind: SubnetworkKind,
    ) -> NetworkResult<Self> {
        options.validate()?;
        let template = SynapseTemplate::random(ProbDistribution::uniform(
            options.weight_lower,
            options.weight_upper,
        ));
        let layered = LayeredNetwork::build(
            net,
            label,
            kind,
            &options.layer_specs(),
            &AllToAll::new(template),
        )?;
        for (i, weights) in layered.weights().iter().enumerate() {
            net.set_label(*weights, format!("Weights {} > {}", i + 1, i + 2))?;
        }
        info!(
            subnet = %layered.subnet(),
            layers = ?options.layer_sizes,
            "Built feed-forward network"
        );
        Ok(Self { layered })
    }

    pub fn subnet(&self) -> GroupId {
        self.layered.subnet()
    }

    pub fn layers(&self) -> &[GroupId] {
        self.layered.layers()
    }

    pub fn weights(&self) -> &[GroupId] {
        self.layered.weights()
    }

    pub fn input_layer(&self) -> GroupId {
        self.layered.input_layer()
    }

    pub fn output_layer(&self) -> GroupId {
        self.layered.output_layer()
    }

    pub fn hidden_layers(&self) -> &[GroupId] {
        self.layered.hidden_layers()
    }

    /// Set the input layer's activations
    pub fn apply_input(&self, net: &mut Network, values: &[f64]) -> NetworkResult<()> {
        net.set_activations(self.input_layer(), values)
    }

    pub fn output(&self, net: &Network) -> NetworkResult<Vec<f64>> {
        net.activations(self.output_layer())
    }
}
