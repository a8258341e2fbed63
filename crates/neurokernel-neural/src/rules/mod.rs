// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Neuron update rules
//!
//! Each variant is a plain parameter struct implementing [`NeuronRule`].
//! [`UpdateRule`] is the closed set the kernel dispatches over; neurons hold
//! it behind an `Arc` so one parameter set can drive many neurons.
//!
//! | Rule | Time | Bounded | Differentiable | Invertible | Noisy | Spiking |
//! |---|---|---|---|---|---|---|
//! | Linear | discrete | ✓ | ✓ | ✓ | ✓ | |
//! | Sigmoidal | discrete | ✓ | ✓ | ✓ | ✓ | |
//! | Izhikevich | continuous | | | | ✓ | ✓ |
//! | IAC | discrete | ✓ | | | ✓ | |
//! | Naka-Rushton | continuous | ✓ | | | ✓ | |
//! | Point Neuron | continuous | ✓ | | | | ✓ |
//! | Spiking Threshold | discrete | | | | ✓ | ✓ |
//! | Three Value | discrete | | | | | |
//! | Additive | continuous | ✓ | | | ✓ | |
//! | Clamped | discrete | ✓ | | | | |

pub mod additive;
pub mod clamped;
pub mod data;
pub mod iac;
pub mod izhikevich;
pub mod linear;
pub mod naka_rushton;
pub mod point_neuron;
pub mod sigmoidal;
pub mod spiking_threshold;
pub mod three_value;
pub mod traits;

pub use additive::AdditiveRule;
pub use clamped::ClampedRule;
pub use data::{FanInSample, NeuronData, PointNeuronState, RuleInput, RuleState};
pub use iac::IacRule;
pub use izhikevich::IzhikevichRule;
pub use linear::LinearRule;
pub use naka_rushton::NakaRushtonRule;
pub use point_neuron::{PointNeuronOutput, PointNeuronRule};
pub use sigmoidal::{SigmoidalRule, SquashingFunction};
pub use spiking_threshold::SpikingThresholdRule;
pub use three_value::ThreeValueRule;
pub use traits::{
    BoundedRule, DifferentiableRule, InvertibleRule, NeuronRule, NoisyRule, SpikingRule,
};

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::context::{StepContext, TimeType};
use crate::types::{NeuralError, NeuralResult};

/// The closed set of update rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpdateRule {
    Linear(LinearRule),
    Sigmoidal(SigmoidalRule),
    Izhikevich(IzhikevichRule),
    Iac(IacRule),
    NakaRushton(NakaRushtonRule),
    PointNeuron(PointNeuronRule),
    SpikingThreshold(SpikingThresholdRule),
    ThreeValue(ThreeValueRule),
    Additive(AdditiveRule),
    Clamped(ClampedRule),
}

impl Default for UpdateRule {
    fn default() -> Self {
        UpdateRule::Linear(LinearRule::default())
    }
}

impl UpdateRule {
    /// Build a rule with default parameters from a short name
    ///
    /// Accepted names are case-insensitive: `linear`, `sigmoidal`, `tanh`,
    /// `arctan`, `izhikevich`, `iac`, `naka-rushton`, `point-neuron`,
    /// `spiking-threshold`, `three-value`, `additive`, `clamped`.
    pub fn from_name(name: &str) -> NeuralResult<Self> {
        let normalized = name.trim().to_lowercase().replace(['_', ' '], "-");
        let rule = match normalized.as_str() {
            "linear" => UpdateRule::Linear(LinearRule::default()),
            "sigmoidal" | "logistic" => UpdateRule::Sigmoidal(SigmoidalRule::default()),
            "tanh" => UpdateRule::Sigmoidal(SigmoidalRule::new(SquashingFunction::Tanh)),
            "arctan" => UpdateRule::Sigmoidal(SigmoidalRule::new(SquashingFunction::Arctan)),
            "izhikevich" => UpdateRule::Izhikevich(IzhikevichRule::default()),
            "iac" => UpdateRule::Iac(IacRule::default()),
            "naka-rushton" => UpdateRule::NakaRushton(NakaRushtonRule::default()),
            "point-neuron" => UpdateRule::PointNeuron(PointNeuronRule::default()),
            "spiking-threshold" => UpdateRule::SpikingThreshold(SpikingThresholdRule::default()),
            "three-value" => UpdateRule::ThreeValue(ThreeValueRule::default()),
            "additive" => UpdateRule::Additive(AdditiveRule::default()),
            "clamped" => UpdateRule::Clamped(ClampedRule),
            _ => return Err(NeuralError::UnknownRule(name.to_string())),
        };
        Ok(rule)
    }

    /// Core behaviour of the wrapped rule
    pub fn as_rule(&self) -> &dyn NeuronRule {
        match self {
            UpdateRule::Linear(r) => r,
            UpdateRule::Sigmoidal(r) => r,
            UpdateRule::Izhikevich(r) => r,
            UpdateRule::Iac(r) => r,
            UpdateRule::NakaRushton(r) => r,
            UpdateRule::PointNeuron(r) => r,
            UpdateRule::SpikingThreshold(r) => r,
            UpdateRule::ThreeValue(r) => r,
            UpdateRule::Additive(r) => r,
            UpdateRule::Clamped(r) => r,
        }
    }

    pub fn as_bounded(&self) -> Option<&dyn BoundedRule> {
        match self {
            UpdateRule::Linear(r) => Some(r),
            UpdateRule::Sigmoidal(r) => Some(r),
            UpdateRule::Iac(r) => Some(r),
            UpdateRule::NakaRushton(r) => Some(r),
            UpdateRule::PointNeuron(r) => Some(r),
            UpdateRule::Additive(r) => Some(r),
            UpdateRule::Clamped(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_differentiable(&self) -> Option<&dyn DifferentiableRule> {
        match self {
            UpdateRule::Linear(r) => Some(r),
            UpdateRule::Sigmoidal(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_invertible(&self) -> Option<&dyn InvertibleRule> {
        match self {
            UpdateRule::Linear(r) => Some(r),
            UpdateRule::Sigmoidal(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_noisy(&self) -> Option<&dyn NoisyRule> {
        match self {
            UpdateRule::Linear(r) => Some(r),
            UpdateRule::Sigmoidal(r) => Some(r),
            UpdateRule::Izhikevich(r) => Some(r),
            UpdateRule::Iac(r) => Some(r),
            UpdateRule::NakaRushton(r) => Some(r),
            UpdateRule::SpikingThreshold(r) => Some(r),
            UpdateRule::Additive(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_spiking(&self) -> Option<&dyn SpikingRule> {
        match self {
            UpdateRule::Izhikevich(r) => Some(r),
            UpdateRule::PointNeuron(r) => Some(r),
            UpdateRule::SpikingThreshold(r) => Some(r),
            _ => None,
        }
    }

    pub fn rule_name(&self) -> &'static str {
        self.as_rule().rule_name()
    }

    pub fn time_type(&self) -> TimeType {
        self.as_rule().time_type()
    }

    pub fn create_data(&self) -> NeuronData {
        self.as_rule().create_data()
    }

    pub fn apply(
        &self,
        ctx: &StepContext,
        input: &RuleInput<'_>,
        data: &mut NeuronData,
        rng: &mut dyn RngCore,
    ) -> f64 {
        self.as_rule().apply(ctx, input, data, rng)
    }

    pub fn random_value(&self, rng: &mut dyn RngCore) -> f64 {
        self.as_rule().random_value(rng)
    }

    pub fn refresh_fan_in(&self, fan_in: &[FanInSample], data: &mut NeuronData) {
        self.as_rule().refresh_fan_in(fan_in, data)
    }

    pub fn validate(&self) -> NeuralResult<()> {
        self.as_rule().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &[
        "linear",
        "sigmoidal",
        "tanh",
        "arctan",
        "izhikevich",
        "iac",
        "naka-rushton",
        "point-neuron",
        "spiking-threshold",
        "three-value",
        "additive",
        "clamped",
    ];

    #[test]
    fn test_every_named_default_validates() {
        for name in NAMES {
            let rule = UpdateRule::from_name(name).unwrap();
            assert!(rule.validate().is_ok(), "{} failed validation", name);
        }
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(
            UpdateRule::from_name("Naka_Rushton").unwrap().rule_name(),
            "Naka-Rushton"
        );
        assert!(matches!(
            UpdateRule::from_name("hodgkin-huxley"),
            Err(NeuralError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_capabilities() {
        let sigmoid = UpdateRule::from_name("tanh").unwrap();
        assert!(sigmoid.as_bounded().is_some());
        assert!(sigmoid.as_invertible().is_some());
        assert!(sigmoid.as_spiking().is_none());

        let izh = UpdateRule::from_name("izhikevich").unwrap();
        assert_eq!(izh.time_type(), TimeType::Continuous);
        assert_eq!(izh.as_spiking().map(|s| s.threshold()), Some(30.0));
        assert!(izh.as_bounded().is_none());
    }

    #[test]
    fn test_create_data_matches_rule() {
        assert!(matches!(
            UpdateRule::from_name("izhikevich").unwrap().create_data().state,
            RuleState::Izhikevich { .. }
        ));
        assert!(matches!(
            UpdateRule::from_name("point-neuron").unwrap().create_data().state,
            RuleState::PointNeuron(_)
        ));
        assert_eq!(
            UpdateRule::default().create_data().state,
            RuleState::None
        );
    }

    #[test]
    fn test_rule_parameters_survive_json() {
        let rule = UpdateRule::from_name("tanh").unwrap();
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.starts_with("{\"Sigmoidal\""));
        let back: UpdateRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }
}
