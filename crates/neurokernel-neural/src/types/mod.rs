// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Core types shared across the kernel

pub mod error;
pub mod ids;

pub use error::{check_bounds, NeuralError, NeuralResult};
pub use ids::{GroupId, NeuronId, SynapseId};
