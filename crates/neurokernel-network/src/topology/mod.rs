// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Topology builders.

Each builder creates its neurons and synapses inside a fresh subnetwork and
returns a small handle naming the groups it made. Builders validate their
arguments before touching the network, so a failed build leaves nothing
behind.
*/

pub mod backprop;
pub mod feed_forward;
pub mod layered;
pub mod srn;
pub mod winner_take_all;

pub use backprop::{BackpropNetwork, Trainable, Trainer, TrainerWiring, TrainingSet};
pub use feed_forward::{FeedForward, FeedForwardOptions};
pub use layered::{LayerSpec, LayeredNetwork};
pub use srn::{SimpleRecurrentNetwork, SimpleRecurrentOptions};
pub use winner_take_all::{select_winner, WinnerTakeAll};

use crate::types::{NetworkError, NetworkResult};

/// Horizontal distance between neurons in a layer
pub const NEURON_SPACING: f64 = 50.0;

/// Vertical distance between layers
pub const LAYER_SPACING: f64 = 150.0;

pub(crate) fn check_layer_sizes(sizes: &[usize], minimum_layers: usize) -> NetworkResult<()> {
    if sizes.len() < minimum_layers {
        return Err(NetworkError::InvalidTopology(format!(
            "need at least {minimum_layers} layers, got {}",
            sizes.len()
        )));
    }
    if let Some(i) = sizes.iter().position(|s| *s == 0) {
        return Err(NetworkError::InvalidTopology(format!("layer {i} is empty")));
    }
    Ok(())
}
