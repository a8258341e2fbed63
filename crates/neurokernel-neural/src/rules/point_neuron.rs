// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Point Neuron Rule
//!
//! Conductance-based integrator (O'Reilly & Munakata, ch. 2):
//!
//! ```text
//! gE ← (1 − τnet)·gE + τnet·Σ⁺(src × w)
//! gI ← (1 − τnet)·gI + τnet·Σ⁻(src × |w|)
//!
//! I  = gE·ḡE·(V − E_e) + gI·ḡI·(V − E_i) + gL·ḡL·(V − E_l)
//! V ← V − τv·I
//! ```
//!
//! Fan-in is split into excitatory (w > 0) and inhibitory positions when
//! the neuron's connections change, not on every step.
//!
//! ## Output
//!
//! ```text
//! DiscreteSpiking:   1 and V ← V_refr if V > θ, else 0
//! RateCode:          g[V−θ]⁺ / (g[V−θ]⁺ + 1) + bias
//! Linear:            g[V−θ]⁺ + bias
//! MembranePotential: V
//! ```
//!
//! Only the rate-code and linear outputs add the neuron's bias. This
//! asymmetry is long-standing behaviour and is kept as-is.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::data::{FanInSample, NeuronData, PointNeuronState, RuleInput, RuleState};
use super::traits::{BoundedRule, NeuronRule, SpikingRule};
use crate::context::StepContext;
use crate::types::error::invalid;
use crate::types::NeuralResult;

/// How the membrane potential becomes an activation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointNeuronOutput {
    #[default]
    DiscreteSpiking,
    RateCode,
    Linear,
    MembranePotential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointNeuronRule {
    pub net_time_constant: f64,
    pub excitatory_max_conductance: f64,
    pub inhibitory_max_conductance: f64,
    pub leak_max_conductance: f64,
    pub leak_conductance: f64,
    pub excitatory_reversal: f64,
    pub inhibitory_reversal: f64,
    pub leak_reversal: f64,
    pub potential_time_constant: f64,
    pub initial_potential: f64,
    pub threshold: f64,
    pub refractory_potential: f64,
    pub gain: f64,
    pub output: PointNeuronOutput,
}

impl Default for PointNeuronRule {
    fn default() -> Self {
        Self {
            net_time_constant: 0.7,
            excitatory_max_conductance: 0.4,
            inhibitory_max_conductance: 1.0,
            leak_max_conductance: 2.8,
            leak_conductance: 1.0,
            excitatory_reversal: 1.0,
            inhibitory_reversal: 0.15,
            leak_reversal: 0.15,
            potential_time_constant: 0.1,
            initial_potential: 0.15,
            threshold: 0.25,
            refractory_potential: 0.0,
            gain: 600.0,
            output: PointNeuronOutput::DiscreteSpiking,
        }
    }
}

impl PointNeuronRule {
    fn positive_drive(&self, potential: f64) -> f64 {
        self.gain * (potential - self.threshold).max(0.0)
    }
}

impl NeuronRule for PointNeuronRule {
    fn rule_name(&self) -> &'static str {
        "Point Neuron"
    }

    fn create_data(&self) -> NeuronData {
        NeuronData::with_state(RuleState::PointNeuron(PointNeuronState {
            membrane_potential: self.initial_potential,
            ..PointNeuronState::default()
        }))
    }

    fn refresh_fan_in(&self, fan_in: &[FanInSample], data: &mut NeuronData) {
        if !matches!(data.state, RuleState::PointNeuron(_)) {
            data.state = self.create_data().state;
        }
        if let RuleState::PointNeuron(state) = &mut data.state {
            state.excitatory.clear();
            state.inhibitory.clear();
            for (index, sample) in fan_in.iter().enumerate() {
                if sample.strength > 0.0 {
                    state.excitatory.push(index);
                } else {
                    state.inhibitory.push(index);
                }
            }
        }
    }

    fn apply(
        &self,
        _ctx: &StepContext,
        input: &RuleInput<'_>,
        data: &mut NeuronData,
        _rng: &mut dyn RngCore,
    ) -> f64 {
        let bias = data.bias;
        let RuleState::PointNeuron(state) = &mut data.state else {
            return input.activation;
        };

        let fan_in = input.fan_in;
        let mut excitatory: f64 = state
            .excitatory
            .iter()
            .filter_map(|&i| fan_in.get(i))
            .map(FanInSample::weighted)
            .sum();
        let mut inhibitory: f64 = state
            .inhibitory
            .iter()
            .filter_map(|&i| fan_in.get(i))
            .map(|s| s.source_activation * s.strength.abs())
            .sum();
        if input.external_input > 0.0 {
            excitatory += input.external_input;
        } else {
            inhibitory -= input.external_input;
        }

        let tau = self.net_time_constant;
        state.excitatory_conductance = (1.0 - tau) * state.excitatory_conductance + tau * excitatory;
        state.inhibitory_conductance = (1.0 - tau) * state.inhibitory_conductance + tau * inhibitory;

        let v = state.membrane_potential;
        let excitatory_current =
            state.excitatory_conductance * self.excitatory_max_conductance * (v - self.excitatory_reversal);
        let inhibitory_current =
            state.inhibitory_conductance * self.inhibitory_max_conductance * (v - self.inhibitory_reversal);
        let leak_current = self.leak_conductance * self.leak_max_conductance * (v - self.leak_reversal);
        state.membrane_potential -=
            self.potential_time_constant * (leak_current + excitatory_current + inhibitory_current);

        let potential = state.membrane_potential;
        match self.output {
            PointNeuronOutput::DiscreteSpiking => {
                if potential > self.threshold {
                    state.membrane_potential = self.refractory_potential;
                    data.spiked = true;
                    1.0
                } else {
                    0.0
                }
            }
            PointNeuronOutput::RateCode => {
                let drive = self.positive_drive(potential);
                drive / (drive + 1.0) + bias
            }
            PointNeuronOutput::Linear => self.positive_drive(potential) + bias,
            PointNeuronOutput::MembranePotential => potential,
        }
    }

    fn random_value(&self, rng: &mut dyn RngCore) -> f64 {
        match self.output {
            PointNeuronOutput::DiscreteSpiking => {
                if rng.gen_bool(0.5) {
                    1.0
                } else {
                    0.0
                }
            }
            PointNeuronOutput::Linear => self.gain * self.threshold * rng.gen::<f64>(),
            PointNeuronOutput::RateCode | PointNeuronOutput::MembranePotential => rng.gen::<f64>(),
        }
    }

    fn validate(&self) -> NeuralResult<()> {
        if !(0.0..=1.0).contains(&self.net_time_constant) {
            return Err(invalid(self.rule_name(), "net_time_constant", "must lie in [0, 1]"));
        }
        if !(self.potential_time_constant > 0.0) {
            return Err(invalid(self.rule_name(), "potential_time_constant", "must be positive"));
        }
        Ok(())
    }
}

impl BoundedRule for PointNeuronRule {
    fn lower_bound(&self) -> f64 {
        0.0
    }

    fn upper_bound(&self) -> f64 {
        1.0
    }

    fn clipping(&self) -> bool {
        false
    }
}

impl SpikingRule for PointNeuronRule {
    fn threshold(&self) -> f64 {
        self.threshold
    }
}
