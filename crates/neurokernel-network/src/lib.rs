// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neurokernel-network
//!
//! Structural layer of the simulation kernel:
//! - **Network**: arena owning every neuron, synapse and group by id
//! - **Groups**: neuron groups, synapse groups and subnetworks
//! - **Scheduling**: staged, per-scope updates driven by [`Network::update`]
//! - **Deletion**: cascading removal bounded by a [`DeletionTransaction`]
//! - **Routing**: post-step placement of new synapses into synapse groups
//! - **Topologies**: feed-forward, simple recurrent, winner-take-all,
//!   backprop and generic layered networks
//!
//! ## Example
//!
//! ```
//! use neurokernel_network::{FeedForward, FeedForwardOptions, Network};
//!
//! let mut net = Network::seeded(42);
//! let ff = FeedForward::build(&mut net, "ff", &FeedForwardOptions::default()).unwrap();
//! ff.apply_input(&mut net, &[1.0, 0.0]).unwrap();
//! net.update();
//! assert_eq!(ff.output(&net).unwrap().len(), 1);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod connectivity;
pub mod deletion;
pub mod events;
pub mod groups;
pub mod network;
pub mod rng;
pub mod routing;
pub mod topology;
pub mod types;
mod update;

pub use connectivity::{AllToAll, ConnectionStrategy, OneToOne, Sparse, SynapseTemplate};
pub use deletion::DeletionTransaction;
pub use events::{GroupChange, NetworkEvent};
pub use groups::{
    Group, GroupMeta, NeuronGroup, NeuronGroupKind, SimpleRecurrentLayers, Subnetwork,
    SubnetworkKind, SynapseGroup, SynapseRouter, WinnerTakeAllParams,
};
pub use network::Network;
pub use routing::AttachmentSide;
pub use topology::{
    select_winner, BackpropNetwork, FeedForward, FeedForwardOptions, LayerSpec, LayeredNetwork,
    SimpleRecurrentNetwork, SimpleRecurrentOptions, Trainable, Trainer, TrainerWiring,
    TrainingSet, WinnerTakeAll,
};
pub use types::{NetworkError, NetworkResult};
