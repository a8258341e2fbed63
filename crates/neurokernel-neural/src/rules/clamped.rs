// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Clamped rule: activation is only ever set from outside.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::data::{NeuronData, RuleInput};
use super::traits::{BoundedRule, NeuronRule};
use crate::context::StepContext;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClampedRule;

impl NeuronRule for ClampedRule {
    fn rule_name(&self) -> &'static str {
        "Clamped"
    }

    fn apply(
        &self,
        _ctx: &StepContext,
        input: &RuleInput<'_>,
        _data: &mut NeuronData,
        _rng: &mut dyn RngCore,
    ) -> f64 {
        input.activation
    }

    fn random_value(&self, rng: &mut dyn RngCore) -> f64 {
        rng.gen_range(-1.0..1.0)
    }
}

impl BoundedRule for ClampedRule {
    fn lower_bound(&self) -> f64 {
        -1.0
    }

    fn upper_bound(&self) -> f64 {
        1.0
    }

    fn clipping(&self) -> bool {
        false
    }
}
