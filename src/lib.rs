// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neurokernel - Neural simulation kernel
//!
//! Per-neuron dynamics, structural grouping and synapse routing for building
//! and stepping small to medium neural networks.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! neurokernel = "0.1"
//! ```
//!
//! ```rust
//! use neurokernel::prelude::*;
//!
//! let mut net = Network::seeded(7);
//! let ff = FeedForward::build(&mut net, "ff", &FeedForwardOptions::default())?;
//! ff.apply_input(&mut net, &[1.0, 0.0])?;
//! net.update();
//! let output = ff.output(&net)?;
//! assert_eq!(output.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`file-logging`**: JSON log files in timestamped run folders
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: neurokernel-config, neurokernel-observability │
//! │  (TOML configuration, tracing setup)                    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Dynamics: neurokernel-neural                           │
//! │  (Update rules, Neuron, Synapse)                        │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Structure: neurokernel-network                         │
//! │  (Groups, subnetworks, routing, topologies)             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use neurokernel_config as config;
pub use neurokernel_observability as observability;

// Re-export dynamics
pub use neurokernel_neural as neural;

// Re-export structure
pub use neurokernel_network as network;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::neural::{
        GroupId, Neuron, NeuronId, ProbDistribution, StepContext, Synapse, SynapseId, TimeType,
        UpdateRule,
    };

    pub use crate::network::{
        AllToAll, BackpropNetwork, ConnectionStrategy, FeedForward, FeedForwardOptions, Network,
        NetworkError, NetworkEvent, NetworkResult, OneToOne, SimpleRecurrentNetwork,
        SimpleRecurrentOptions, Sparse, SubnetworkKind, WinnerTakeAll, WinnerTakeAllParams,
    };

    pub use crate::config::{NeurokernelConfig, UpdateMode};
}
