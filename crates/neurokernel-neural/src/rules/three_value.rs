// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Three-value rule: a ternary step function over `net + bias`.
//!
//! ```text
//! x < lower_threshold  → low_value
//! x > upper_threshold  → high_value
//! otherwise            → middle_value
//! ```

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::data::{NeuronData, RuleInput};
use super::traits::NeuronRule;
use crate::context::StepContext;
use crate::types::error::invalid;
use crate::types::NeuralResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeValueRule {
    pub lower_threshold: f64,
    pub upper_threshold: f64,
    pub low_value: f64,
    pub middle_value: f64,
    pub high_value: f64,
}

impl Default for ThreeValueRule {
    fn default() -> Self {
        Self {
            lower_threshold: 0.0,
            upper_threshold: 1.0,
            low_value: -1.0,
            middle_value: 0.0,
            high_value: 1.0,
        }
    }
}

impl NeuronRule for ThreeValueRule {
    fn rule_name(&self) -> &'static str {
        "Three Value"
    }

    fn apply(
        &self,
        _ctx: &StepContext,
        input: &RuleInput<'_>,
        data: &mut NeuronData,
        _rng: &mut dyn RngCore,
    ) -> f64 {
        let x = input.net_input + data.bias;
        if x < self.lower_threshold {
            self.low_value
        } else if x > self.upper_threshold {
            self.high_value
        } else {
            self.middle_value
        }
    }

    fn random_value(&self, rng: &mut dyn RngCore) -> f64 {
        match rng.gen_range(0..3) {
            0 => self.low_value,
            1 => self.middle_value,
            _ => self.high_value,
        }
    }

    fn validate(&self) -> NeuralResult<()> {
        if self.lower_threshold > self.upper_threshold {
            return Err(invalid(
                self.rule_name(),
                "lower_threshold",
                "must not exceed upper_threshold",
            ));
        }
        Ok(())
    }
}
