// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-step simulation context
//!
//! Every rule receives the context explicitly instead of reading global
//! network state, so a rule is a function of (context, own data, input).

use serde::{Deserialize, Serialize};

/// Whether a rule integrates over `time_step` or advances in unit ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeType {
    Discrete,
    Continuous,
}

/// Immutable view of the global step state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepContext {
    /// Simulation time at the start of this step
    pub time: f64,
    /// Integration step for continuous rules
    pub time_step: f64,
    /// Suppresses dynamic updates in topologies that honour it
    pub clamp_neurons: bool,
    /// Suppresses synapse updates
    pub clamp_weights: bool,
}

impl StepContext {
    pub fn new(time_step: f64) -> Self {
        Self {
            time: 0.0,
            time_step,
            clamp_neurons: false,
            clamp_weights: false,
        }
    }
}

impl Default for StepContext {
    fn default() -> Self {
        Self::new(0.1)
    }
}
