// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Sigmoidal Rule
//!
//! A squashing function scaled into `[lower, upper]` with slope `s` at the
//! midpoint. With `diff = upper - lower` and `mid = (upper + lower) / 2`:
//!
//! ```text
//! Logistic:  y = diff × σ(4·s·x / diff) + lower
//! Tanh:      y = (diff / 2) × tanh(a·x) + mid,   a = 2·s / diff
//! Arctan:    y = (diff / π) × atan(a·x) + mid,   a = π·s / diff
//! ```
//!
//! where `x = net + bias`. Each family has default bounds; bounds that were
//! never set explicitly follow the family when it changes.

use std::f64::consts::PI;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::data::{NeuronData, RuleInput};
use super::traits::{
    uniform_in, BoundedRule, DifferentiableRule, InvertibleRule, NeuronRule, NoisyRule,
};
use crate::context::StepContext;
use crate::noise::ProbDistribution;
use crate::types::error::invalid;
use crate::types::{check_bounds, NeuralResult};

/// Squashing function family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SquashingFunction {
    #[default]
    Logistic,
    Tanh,
    Arctan,
}

impl SquashingFunction {
    pub fn default_bounds(self) -> (f64, f64) {
        match self {
            SquashingFunction::Logistic => (0.0, 1.0),
            SquashingFunction::Tanh => (-1.0, 1.0),
            SquashingFunction::Arctan => (-PI / 2.0, PI / 2.0),
        }
    }

    pub fn value(self, x: f64, lower: f64, upper: f64, slope: f64) -> f64 {
        let diff = upper - lower;
        let mid = (upper + lower) / 2.0;
        match self {
            SquashingFunction::Logistic => diff * logistic(4.0 * slope * x / diff) + lower,
            SquashingFunction::Tanh => (diff / 2.0) * (2.0 * slope / diff * x).tanh() + mid,
            SquashingFunction::Arctan => (diff / PI) * (PI * slope / diff * x).atan() + mid,
        }
    }

    pub fn derivative(self, x: f64, lower: f64, upper: f64, slope: f64) -> f64 {
        let diff = upper - lower;
        match self {
            SquashingFunction::Logistic => {
                let y = self.value(x, lower, upper, slope);
                4.0 * slope / (diff * diff) * (y - lower) * (upper - y)
            }
            SquashingFunction::Tanh => {
                let sech = 1.0 / (2.0 * slope / diff * x).cosh();
                slope * sech * sech
            }
            SquashingFunction::Arctan => {
                let ax = PI * slope / diff * x;
                slope / (1.0 + ax * ax)
            }
        }
    }

    /// Exact inverse; values at or beyond a bound map to ±infinity
    pub fn inverse(self, y: f64, lower: f64, upper: f64, slope: f64) -> f64 {
        let diff = upper - lower;
        let z = (y - lower) / diff;
        if z <= 0.0 {
            return f64::NEG_INFINITY;
        }
        if z >= 1.0 {
            return f64::INFINITY;
        }
        // Centered position in (-1, 1)
        let centered = 2.0 * z - 1.0;
        match self {
            SquashingFunction::Logistic => (z / (1.0 - z)).ln() * diff / (4.0 * slope),
            SquashingFunction::Tanh => centered.atanh() / (2.0 * slope / diff),
            SquashingFunction::Arctan => (centered * PI / 2.0).tan() / (PI * slope / diff),
        }
    }
}

#[inline]
fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigmoidalRule {
    function: SquashingFunction,
    pub slope: f64,
    /// Explicit bounds; `None` follows the family default
    bounds_override: Option<(f64, f64)>,
    pub clipping: bool,
    pub noise: Option<ProbDistribution>,
}

impl Default for SigmoidalRule {
    fn default() -> Self {
        Self::new(SquashingFunction::Logistic)
    }
}

impl SigmoidalRule {
    pub fn new(function: SquashingFunction) -> Self {
        Self {
            function,
            slope: 1.0,
            bounds_override: None,
            clipping: false,
            noise: None,
        }
    }

    pub fn function(&self) -> SquashingFunction {
        self.function
    }

    /// Change family; bounds follow unless explicitly overridden
    pub fn set_function(&mut self, function: SquashingFunction) {
        self.function = function;
    }

    pub fn set_bounds(&mut self, lower: f64, upper: f64) -> NeuralResult<()> {
        check_bounds(lower, upper)?;
        self.bounds_override = Some((lower, upper));
        Ok(())
    }

    /// Return to the family's default bounds
    pub fn reset_bounds(&mut self) {
        self.bounds_override = None;
    }

    pub fn has_bounds_override(&self) -> bool {
        self.bounds_override.is_some()
    }

    fn bounds(&self) -> (f64, f64) {
        self.bounds_override
            .unwrap_or_else(|| self.function.default_bounds())
    }
}

impl NeuronRule for SigmoidalRule {
    fn rule_name(&self) -> &'static str {
        match self.function {
            SquashingFunction::Logistic => "Sigmoidal (logistic)",
            SquashingFunction::Tanh => "Sigmoidal (tanh)",
            SquashingFunction::Arctan => "Sigmoidal (arctan)",
        }
    }

    fn apply(
        &self,
        _ctx: &StepContext,
        input: &RuleInput<'_>,
        data: &mut NeuronData,
        rng: &mut dyn RngCore,
    ) -> f64 {
        let (lower, upper) = self.bounds();
        let x = input.net_input + data.bias;
        let value = self.function.value(x, lower, upper, self.slope) + self.sample_noise(rng);
        self.clip(value)
    }

    fn random_value(&self, rng: &mut dyn RngCore) -> f64 {
        let (lower, upper) = self.bounds();
        uniform_in(rng, lower, upper)
    }

    fn validate(&self) -> NeuralResult<()> {
        if !(self.slope.is_finite() && self.slope > 0.0) {
            return Err(invalid(self.rule_name(), "slope", "must be finite and positive"));
        }
        let (lower, upper) = self.bounds();
        check_bounds(lower, upper)
    }
}

impl BoundedRule for SigmoidalRule {
    fn lower_bound(&self) -> f64 {
        self.bounds().0
    }

    fn upper_bound(&self) -> f64 {
        self.bounds().1
    }

    fn clipping(&self) -> bool {
        self.clipping
    }
}

impl DifferentiableRule for SigmoidalRule {
    fn derivative(&self, input: f64) -> f64 {
        let (lower, upper) = self.bounds();
        self.function.derivative(input, lower, upper, self.slope)
    }
}

impl InvertibleRule for SigmoidalRule {
    fn inverse(&self, activation: f64) -> f64 {
        let (lower, upper) = self.bounds();
        self.function.inverse(activation, lower, upper, self.slope)
    }
}

impl NoisyRule for SigmoidalRule {
    fn noise(&self) -> Option<&ProbDistribution> {
        self.noise.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAMILIES: [SquashingFunction; 3] = [
        SquashingFunction::Logistic,
        SquashingFunction::Tanh,
        SquashingFunction::Arctan,
    ];

    #[test]
    fn test_midpoint_and_slope() {
        for f in FAMILIES {
            let rule = SigmoidalRule::new(f);
            let (lo, hi) = f.default_bounds();
            let y0 = f.value(0.0, lo, hi, rule.slope);
            assert!((y0 - (lo + hi) / 2.0).abs() < 1e-12, "{:?}", f);
            assert!((rule.derivative(0.0) - 1.0).abs() < 1e-12, "{:?}", f);
        }
    }

    #[test]
    fn test_inverse_round_trips() {
        for f in FAMILIES {
            let mut rule = SigmoidalRule::new(f);
            rule.slope = 2.5;
            rule.set_bounds(-3.0, 5.0).unwrap();
            for x in [-1.3, -0.2, 0.0, 0.4, 1.1] {
                let y = f.value(x, -3.0, 5.0, 2.5);
                assert!((rule.inverse(y) - x).abs() < 1e-9, "{:?} at {}", f, x);
            }
        }
    }

    #[test]
    fn test_inverse_saturates_at_bounds() {
        let rule = SigmoidalRule::default();
        assert_eq!(rule.inverse(1.0), f64::INFINITY);
        assert_eq!(rule.inverse(-0.5), f64::NEG_INFINITY);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let h = 1e-6;
        for f in FAMILIES {
            let (lo, hi) = f.default_bounds();
            for x in [-0.7, 0.3, 1.9] {
                let numeric = (f.value(x + h, lo, hi, 1.5) - f.value(x - h, lo, hi, 1.5)) / (2.0 * h);
                let analytic = f.derivative(x, lo, hi, 1.5);
                assert!((numeric - analytic).abs() < 1e-6, "{:?} at {}", f, x);
            }
        }
    }

    #[test]
    fn test_bounds_follow_family_unless_overridden() {
        let mut rule = SigmoidalRule::default();
        assert_eq!(rule.lower_bound(), 0.0);
        rule.set_function(SquashingFunction::Tanh);
        assert_eq!(rule.lower_bound(), -1.0);

        rule.set_bounds(-2.0, 2.0).unwrap();
        rule.set_function(SquashingFunction::Logistic);
        assert_eq!((rule.lower_bound(), rule.upper_bound()), (-2.0, 2.0));

        rule.reset_bounds();
        assert_eq!(rule.upper_bound(), 1.0);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let mut rule = SigmoidalRule::default();
        assert!(rule.set_bounds(1.0, 0.0).is_err());
        assert!(!rule.has_bounds_override());
    }
}
