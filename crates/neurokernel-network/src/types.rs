// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for structural network operations

use neurokernel_neural::{GroupId, NeuralError, NeuronId, SynapseId};

/// Errors raised by network and group operations
///
/// Numeric stepping never produces these; only structural calls with
/// unknown ids, wrong group kinds, bad indices or degenerate topologies do.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("Neuron not found: {0}")]
    NeuronNotFound(NeuronId),

    #[error("Synapse not found: {0}")]
    SynapseNotFound(SynapseId),

    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("{id} is not a {expected}")]
    WrongGroupKind { id: GroupId, expected: &'static str },

    #[error("Index {index} out of range for {what} (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{child} is not part of {parent}")]
    NotAChild { parent: GroupId, child: GroupId },

    #[error("{child} already belongs to {parent}")]
    AlreadyParented { parent: GroupId, child: GroupId },

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Neural(#[from] NeuralError),
}

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;
