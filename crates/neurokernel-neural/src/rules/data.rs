// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Rule inputs and per-neuron private state

use serde::{Deserialize, Serialize};

/// One incoming connection as seen by a rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FanInSample {
    /// Pre-step activation of the source neuron
    pub source_activation: f64,
    pub strength: f64,
}

impl FanInSample {
    pub fn new(source_activation: f64, strength: f64) -> Self {
        Self {
            source_activation,
            strength,
        }
    }

    #[inline]
    pub fn weighted(&self) -> f64 {
        self.source_activation * self.strength
    }
}

/// Aggregated input handed to a rule for one step
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    /// Activation before this step
    pub activation: f64,
    /// Σ source activation × strength over fan-in, plus external input
    pub net_input: f64,
    /// Externally injected input only
    pub external_input: f64,
    pub fan_in: &'a [FanInSample],
}

impl<'a> RuleInput<'a> {
    /// Build from fan-in samples, summing the weighted input
    pub fn from_fan_in(activation: f64, external_input: f64, fan_in: &'a [FanInSample]) -> Self {
        let weighted: f64 = fan_in.iter().map(FanInSample::weighted).sum();
        Self {
            activation,
            net_input: weighted + external_input,
            external_input,
            fan_in,
        }
    }

    /// Input without any connections, used by tests and clamped layers
    pub fn isolated(activation: f64, net_input: f64) -> RuleInput<'static> {
        RuleInput {
            activation,
            net_input,
            external_input: net_input,
            fan_in: &[],
        }
    }
}

/// Mutable state a neuron keeps for its rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeuronData {
    pub bias: f64,
    /// Raised for exactly the step in which the neuron spiked
    pub spiked: bool,
    pub last_spike_time: Option<f64>,
    pub state: RuleState,
}

impl NeuronData {
    pub fn with_state(state: RuleState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }
}

/// Rule-specific extras
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum RuleState {
    #[default]
    None,
    Izhikevich {
        recovery: f64,
    },
    NakaRushton {
        adaptation: f64,
    },
    PointNeuron(PointNeuronState),
}

/// Conductance-based integrator state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointNeuronState {
    pub membrane_potential: f64,
    pub excitatory_conductance: f64,
    pub inhibitory_conductance: f64,
    /// Fan-in positions with positive strength
    pub excitatory: Vec<usize>,
    /// Fan-in positions with non-positive strength
    pub inhibitory: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fan_in_sums_weighted_input() {
        let fan_in = [FanInSample::new(0.5, 2.0), FanInSample::new(1.0, -0.25)];
        let input = RuleInput::from_fan_in(0.0, 0.1, &fan_in);
        assert!((input.net_input - 0.85).abs() < 1e-12);
        assert_eq!(input.external_input, 0.1);
    }

    #[test]
    fn test_default_data_is_blank() {
        let data = NeuronData::default();
        assert_eq!(data.bias, 0.0);
        assert!(!data.spiked);
        assert_eq!(data.state, RuleState::None);
    }
}
