// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Update rule contract and optional capabilities
//!
//! A rule instance is shared by every neuron that uses it, so `apply` takes
//! `&self`. Anything a rule needs to remember between steps for a particular
//! neuron lives in that neuron's [`NeuronData`].

use core::fmt::Debug;

use rand::{Rng, RngCore};

use super::data::{FanInSample, NeuronData, RuleInput};
use crate::context::{StepContext, TimeType};
use crate::noise::ProbDistribution;
use crate::types::NeuralResult;

/// Core neuron update behaviour
pub trait NeuronRule: Debug + Send + Sync {
    /// Human-readable rule name
    fn rule_name(&self) -> &'static str;

    fn time_type(&self) -> TimeType {
        TimeType::Discrete
    }

    /// Fresh private record for a neuron adopting this rule
    fn create_data(&self) -> NeuronData {
        NeuronData::default()
    }

    /// Compute the next activation
    ///
    /// `data.spiked` is cleared by the caller before this runs.
    fn apply(
        &self,
        ctx: &StepContext,
        input: &RuleInput<'_>,
        data: &mut NeuronData,
        rng: &mut dyn RngCore,
    ) -> f64;

    /// A plausible activation for randomization
    fn random_value(&self, rng: &mut dyn RngCore) -> f64;

    /// Called before the first step after the neuron's fan-in changed
    fn refresh_fan_in(&self, _fan_in: &[FanInSample], _data: &mut NeuronData) {}

    /// Check parameters for consistency
    fn validate(&self) -> NeuralResult<()> {
        Ok(())
    }
}

/// Uniform draw from `[lower, upper)`
///
/// An empty, inverted or unbounded range yields `lower` instead of panicking,
/// since rule parameters are public and may be set without `validate`.
pub fn uniform_in(rng: &mut dyn RngCore, lower: f64, upper: f64) -> f64 {
    if lower < upper && (upper - lower).is_finite() {
        rng.gen_range(lower..upper)
    } else {
        lower
    }
}

/// Rules with an activation range and a clip policy
pub trait BoundedRule {
    fn lower_bound(&self) -> f64;
    fn upper_bound(&self) -> f64;
    fn clipping(&self) -> bool;

    /// Clamp to the bounds when clipping is enabled
    fn clip(&self, value: f64) -> f64 {
        if self.clipping() {
            value.max(self.lower_bound()).min(self.upper_bound())
        } else {
            value
        }
    }

    /// Nudge `activation` up by `increment` unless already at the upper bound
    fn contextual_increment(&self, activation: f64, increment: f64) -> f64 {
        if activation >= self.upper_bound() {
            return activation;
        }
        self.clip(activation + increment)
    }

    /// Nudge `activation` down by `increment` unless already at the lower bound
    fn contextual_decrement(&self, activation: f64, increment: f64) -> f64 {
        if activation <= self.lower_bound() {
            return activation;
        }
        self.clip(activation - increment)
    }
}

/// Rules whose transfer function has a derivative w.r.t. net input
pub trait DifferentiableRule {
    fn derivative(&self, input: f64) -> f64;
}

/// Rules whose transfer function can be inverted exactly
pub trait InvertibleRule {
    /// Net input producing `activation`
    fn inverse(&self, activation: f64) -> f64;
}

/// Rules that add a noise sample each step
pub trait NoisyRule {
    fn noise(&self) -> Option<&ProbDistribution>;

    fn sample_noise(&self, rng: &mut dyn RngCore) -> f64 {
        self.noise().map(|dist| dist.sample(rng)).unwrap_or(0.0)
    }
}

/// Rules that emit discrete spikes
pub trait SpikingRule {
    fn threshold(&self) -> f64;
}
