// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Simple recurrent (Elman) network
//!
//! Input, hidden, context and output layers. Each step updates input, then
//! hidden, then copies the hidden activations from before that hidden
//! update into the context layer index by index, then updates output.
//! Context starts at 0.5.

use std::sync::Arc;

use neurokernel_config::TopologyConfig;
use neurokernel_neural::{
    check_bounds, rules::ClampedRule, rules::SigmoidalRule, GroupId, Neuron, ProbDistribution,
    UpdateRule,
};
use tracing::info;

use super::{check_layer_sizes, LAYER_SPACING, NEURON_SPACING};
use crate::connectivity::{AllToAll, SynapseTemplate};
use crate::groups::{SimpleRecurrentLayers, SubnetworkKind};
use crate::network::Network;
use crate::types::NetworkResult;

/// Strength bounds of the generated weights
const SRN_WEIGHT_BOUNDS: (f64, f64) = (-1.0, 1.0);

#[derive(Debug, Clone)]
pub struct SimpleRecurrentOptions {
    pub input_size: usize,
    /// Also the context layer's size
    pub hidden_size: usize,
    pub output_size: usize,
    pub weight_lower: f64,
    pub weight_upper: f64,
    pub context_initial_activation: f64,
    pub hidden_rule: Arc<UpdateRule>,
    pub output_rule: Arc<UpdateRule>,
}

impl SimpleRecurrentOptions {
    pub fn new(input_size: usize, hidden_size: usize, output_size: usize) -> Self {
        Self::from_config(input_size, hidden_size, output_size, &TopologyConfig::default())
    }

    pub fn from_config(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        config: &TopologyConfig,
    ) -> Self {
        let sigmoid = Arc::new(UpdateRule::Sigmoidal(SigmoidalRule::default()));
        Self {
            input_size,
            hidden_size,
            output_size,
            weight_lower: config.weight_lower,
            weight_upper: config.weight_upper,
            context_initial_activation: config.context_initial_activation,
            hidden_rule: Arc::clone(&sigmoid),
            output_rule: sigmoid,
        }
    }

    pub fn validate(&self) -> NetworkResult<()> {
        check_layer_sizes(&[self.input_size, self.hidden_size, self.output_size], 3)?;
        check_bounds(self.weight_lower, self.weight_upper)?;
        self.hidden_rule.validate()?;
        self.output_rule.validate()?;
        Ok(())
    }
}

/// Handle to a built simple recurrent network
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleRecurrentNetwork {
    subnet: GroupId,
    layers: SimpleRecurrentLayers,
}

impl SimpleRecurrentNetwork {
    pub fn build(
        net: &mut Network,
        label: impl Into<String>,
        options: &SimpleRecurrentOptions,
    ) -> NetworkResult<Self> {
        options.validate()?;
        let clamped = Arc::new(UpdateRule::Clamped(ClampedRule));
        let subnet = net.create_subnetwork(label, SubnetworkKind::Plain);

        let input = net.add_neuron_group_to_subnetwork(
            subnet,
            layer(options.input_size, &clamped, 0),
            "Inputs",
        )?;
        let hidden = net.add_neuron_group_to_subnetwork(
            subnet,
            layer(options.hidden_size, &options.hidden_rule, 1),
            "Hidden layer",
        )?;
        let context = net.add_neuron_group_to_subnetwork(
            subnet,
            layer_at(
                options.hidden_size,
                &clamped,
                1,
                options.hidden_size as f64 * NEURON_SPACING + LAYER_SPACING,
            ),
            "Context nodes",
        )?;
        let output = net.add_neuron_group_to_subnetwork(
            subnet,
            layer(options.output_size, &options.output_rule, 2),
            "Output layer",
        )?;
        let context_values = vec![options.context_initial_activation; options.hidden_size];
        net.set_activations(context, &context_values)?;

        let template = SynapseTemplate::random(ProbDistribution::uniform(
            options.weight_lower,
            options.weight_upper,
        ))
        .with_bounds(SRN_WEIGHT_BOUNDS.0, SRN_WEIGHT_BOUNDS.1);
        let strategy = AllToAll::new(template).without_self_connections();
        net.connect_neuron_groups(subnet, input, hidden, &strategy)?;
        net.connect_neuron_groups(subnet, context, hidden, &strategy)?;
        net.connect_neuron_groups(subnet, hidden, output, &strategy)?;

        let layers = SimpleRecurrentLayers {
            input,
            hidden,
            output,
            context,
        };
        net.subnetwork_mut(subnet)?.kind = SubnetworkKind::SimpleRecurrent(layers);
        info!(
            subnet = %subnet,
            input = options.input_size,
            hidden = options.hidden_size,
            output = options.output_size,
            "Built simple recurrent network"
        );
        Ok(Self { subnet, layers })
    }

    pub fn subnet(&self) -> GroupId {
        self.subnet
    }

    pub fn layers(&self) -> SimpleRecurrentLayers {
        self.layers
    }

    pub fn input_layer(&self) -> GroupId {
        self.layers.input
    }

    pub fn hidden_layer(&self) -> GroupId {
        self.layers.hidden
    }

    pub fn context_layer(&self) -> GroupId {
        self.layers.context
    }

    pub fn output_layer(&self) -> GroupId {
        self.layers.output
    }

    pub fn apply_input(&self, net: &mut Network, values: &[f64]) -> NetworkResult<()> {
        net.set_activations(self.layers.input, values)
    }
}

fn layer(size: usize, rule: &Arc<UpdateRule>, row: usize) -> Vec<Neuron> {
    layer_at(size, rule, row, 0.0)
}

fn layer_at(size: usize, rule: &Arc<UpdateRule>, row: usize, x_offset: f64) -> Vec<Neuron> {
    (0..size)
        .map(|j| {
            let mut n = Neuron::new(Arc::clone(rule))
                .at(x_offset + j as f64 * NEURON_SPACING, -(row as f64) * LAYER_SPACING);
            n.increment = 1.0;
            n
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_labels_and_sizes() {
        let mut net = Network::seeded(13);
        let srn = SimpleRecurrentNetwork::build(&mut net, "srn", &SimpleRecurrentOptions::new(2, 3, 1))
            .unwrap();
        assert_eq!(net.label(srn.input_layer()).unwrap(), "Inputs");
        assert_eq!(net.label(srn.hidden_layer()).unwrap(), "Hidden layer");
        assert_eq!(net.label(srn.context_layer()).unwrap(), "Context nodes");
        assert_eq!(net.label(srn.output_layer()).unwrap(), "Output layer");
        assert_eq!(net.neuron_group(srn.context_layer()).unwrap().len(), 3);
        assert_eq!(net.activations(srn.context_layer()).unwrap(), vec![0.5; 3]);
        assert_eq!(net.subnetwork(srn.subnet()).unwrap().synapse_groups().len(), 3);
    }

    #[test]
    fn test_context_receives_previous_hidden() {
        let mut net = Network::seeded(13);
        let srn = SimpleRecurrentNetwork::build(&mut net, "srn", &SimpleRecurrentOptions::new(2, 3, 1))
            .unwrap();
        net.set_activations(srn.hidden_layer(), &[0.2, 0.7, 0.4]).unwrap();
        srn.apply_input(&mut net, &[1.0, -1.0]).unwrap();

        net.update();

        assert_eq!(net.activations(srn.context_layer()).unwrap(), vec![0.2, 0.7, 0.4]);
        assert_ne!(net.activations(srn.hidden_layer()).unwrap(), vec![0.2, 0.7, 0.4]);
    }
}
