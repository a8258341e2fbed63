// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neurokernel-neural
//!
//! Per-neuron dynamics for the simulation kernel:
//! - **Update rules**: linear, sigmoidal, Izhikevich, IAC, Naka-Rushton,
//!   point neuron, spiking threshold, three-value, additive, clamped
//! - **Capabilities**: bounded, differentiable, invertible, noisy, spiking
//! - **Entities**: [`Neuron`] and [`Synapse`], referenced by id
//! - **Noise**: [`ProbDistribution`] sampling on top of `rand_distr`
//!
//! Rules are immutable and shared through `Arc`; each neuron keeps its own
//! [`NeuronData`](rules::NeuronData). Every rule receives an explicit
//! [`StepContext`].

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod context;
pub mod neuron;
pub mod noise;
pub mod rules;
pub mod synapse;
pub mod types;

pub use context::{StepContext, TimeType};
pub use neuron::Neuron;
pub use noise::ProbDistribution;
pub use rules::{
    BoundedRule, DifferentiableRule, FanInSample, InvertibleRule, NeuronData, NeuronRule,
    NoisyRule, RuleInput, RuleState, SpikingRule, UpdateRule,
};
pub use synapse::{Synapse, SynapseRule};
pub use types::{check_bounds, GroupId, NeuralError, NeuralResult, NeuronId, SynapseId};
