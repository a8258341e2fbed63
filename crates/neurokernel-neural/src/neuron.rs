// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Neuron entity
//!
//! A neuron owns its activation and a private [`NeuronData`] record, and
//! delegates dynamics to a shared [`UpdateRule`]. Stepping is two-phase:
//! [`Neuron::stage`] computes the next activation into a buffer from
//! pre-step inputs, [`Neuron::commit`] makes it visible.

use std::sync::Arc;

use rand::RngCore;
use tracing::trace;

use crate::context::{StepContext, TimeType};
use crate::rules::{FanInSample, NeuronData, RuleInput, UpdateRule};
use crate::types::{GroupId, SynapseId};

/// Step used by increment/decrement
pub const DEFAULT_INCREMENT: f64 = 0.1;

/// Bounds used when the rule has none of its own
pub const DEFAULT_BOUNDS: (f64, f64) = (-1.0, 1.0);

#[derive(Debug, Clone)]
pub struct Neuron {
    activation: f64,
    buffer: f64,
    lower_bound: f64,
    upper_bound: f64,
    pub increment: f64,
    /// Lower values update first in priority scheduling
    pub update_priority: i32,
    clamped: bool,
    pub x: f64,
    pub y: f64,
    pub label: Option<String>,
    group: Option<GroupId>,
    fan_in: Vec<SynapseId>,
    fan_out: Vec<SynapseId>,
    rule: Arc<UpdateRule>,
    data: NeuronData,
    input_value: f64,
    fan_in_dirty: bool,
}

impl Default for Neuron {
    fn default() -> Self {
        Self::new(Arc::new(UpdateRule::default()))
    }
}

impl Neuron {
    pub fn new(rule: Arc<UpdateRule>) -> Self {
        let (lower_bound, upper_bound) = rule_bounds(&rule);
        let data = rule.create_data();
        Self {
            activation: 0.0,
            buffer: 0.0,
            lower_bound,
            upper_bound,
            increment: DEFAULT_INCREMENT,
            update_priority: 0,
            clamped: false,
            x: 0.0,
            y: 0.0,
            label: None,
            group: None,
            fan_in: Vec::new(),
            fan_out: Vec::new(),
            rule,
            data,
            input_value: 0.0,
            fan_in_dirty: true,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.update_priority = priority;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Compute the next activation into the buffer
    ///
    /// `fan_in` must list this neuron's incoming connections in the same
    /// order as [`Neuron::fan_in`], carrying pre-step source activations.
    pub fn stage(&mut self, ctx: &StepContext, fan_in: &[FanInSample], rng: &mut dyn RngCore) {
        if self.clamped {
            self.buffer = self.activation;
            self.input_value = 0.0;
            return;
        }
        if self.fan_in_dirty {
            self.rule.refresh_fan_in(fan_in, &mut self.data);
            self.fan_in_dirty = false;
        }

        self.data.spiked = false;
        let input = RuleInput::from_fan_in(self.activation, self.input_value, fan_in);
        self.buffer = self.rule.apply(ctx, &input, &mut self.data, rng);
        if self.data.spiked {
            self.data.last_spike_time = Some(ctx.time);
        }
        self.input_value = 0.0;
    }

    /// Publish the staged activation
    pub fn commit(&mut self) {
        self.activation = self.buffer;
    }

    // ========================================================================
    // Activation
    // ========================================================================

    pub fn activation(&self) -> f64 {
        self.activation
    }

    pub fn buffer(&self) -> f64 {
        self.buffer
    }

    /// Set the activation under the rule's clip policy
    ///
    /// Returns false (and changes nothing) when the neuron is clamped.
    pub fn set_activation(&mut self, value: f64) -> bool {
        if self.clamped {
            return false;
        }
        let value = match self.rule.as_bounded() {
            Some(bounded) => bounded.clip(value),
            None => value,
        };
        self.activation = value;
        self.buffer = value;
        true
    }

    /// Set the activation ignoring clamping and clipping
    pub fn force_set_activation(&mut self, value: f64) {
        self.activation = value;
        self.buffer = value;
    }

    /// Queue external input for the next step
    pub fn add_input(&mut self, value: f64) {
        self.input_value += value;
    }

    pub fn input_value(&self) -> f64 {
        self.input_value
    }

    /// Consume the queued external input
    pub fn take_input(&mut self) -> f64 {
        std::mem::take(&mut self.input_value)
    }

    pub fn increment(&mut self) {
        let next = match self.rule.as_bounded() {
            Some(bounded) => bounded.contextual_increment(self.activation, self.increment),
            None => self.activation + self.increment,
        };
        self.force_set_activation(next);
    }

    pub fn decrement(&mut self) {
        let next = match self.rule.as_bounded() {
            Some(bounded) => bounded.contextual_decrement(self.activation, self.increment),
            None => self.activation - self.increment,
        };
        self.force_set_activation(next);
    }

    /// Set a random activation appropriate for the rule
    pub fn randomize(&mut self, rng: &mut dyn RngCore) {
        let value = self.rule.random_value(rng);
        self.force_set_activation(value);
    }

    /// Zero activation and input, reset rule state; bias survives
    pub fn clear(&mut self) {
        let bias = self.data.bias;
        self.data = self.rule.create_data();
        self.data.bias = bias;
        self.activation = 0.0;
        self.buffer = 0.0;
        self.input_value = 0.0;
        self.fan_in_dirty = true;
    }

    // ========================================================================
    // Rule and private data
    // ========================================================================

    pub fn rule(&self) -> &Arc<UpdateRule> {
        &self.rule
    }

    /// Swap the rule; private data is recreated, bias survives
    pub fn set_update_rule(&mut self, rule: Arc<UpdateRule>) {
        let bias = self.data.bias;
        if let Some(bounded) = rule.as_bounded() {
            self.lower_bound = bounded.lower_bound();
            self.upper_bound = bounded.upper_bound();
        }
        trace!(from = self.rule.rule_name(), to = rule.rule_name(), "Replacing update rule");
        self.data = rule.create_data();
        self.data.bias = bias;
        self.rule = rule;
        self.fan_in_dirty = true;
    }

    pub fn time_type(&self) -> TimeType {
        self.rule.time_type()
    }

    pub fn data(&self) -> &NeuronData {
        &self.data
    }

    pub fn bias(&self) -> f64 {
        self.data.bias
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.data.bias = bias;
    }

    pub fn spiked(&self) -> bool {
        self.data.spiked
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn is_clamped(&self) -> bool {
        self.clamped
    }

    pub fn set_clamped(&mut self, clamped: bool) {
        self.clamped = clamped;
    }

    // ========================================================================
    // Structure
    // ========================================================================

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn set_group(&mut self, group: Option<GroupId>) {
        self.group = group;
    }

    pub fn fan_in(&self) -> &[SynapseId] {
        &self.fan_in
    }

    pub fn fan_out(&self) -> &[SynapseId] {
        &self.fan_out
    }

    pub fn add_fan_in(&mut self, synapse: SynapseId) {
        if !self.fan_in.contains(&synapse) {
            self.fan_in.push(synapse);
            self.fan_in_dirty = true;
        }
    }

    pub fn remove_fan_in(&mut self, synapse: SynapseId) {
        if let Some(pos) = self.fan_in.iter().position(|s| *s == synapse) {
            self.fan_in.remove(pos);
            self.fan_in_dirty = true;
        }
    }

    pub fn add_fan_out(&mut self, synapse: SynapseId) {
        if !self.fan_out.contains(&synapse) {
            self.fan_out.push(synapse);
        }
    }

    pub fn remove_fan_out(&mut self, synapse: SynapseId) {
        self.fan_out.retain(|s| *s != synapse);
    }

    /// Force the rule to re-examine fan-in before the next step
    pub fn mark_fan_in_changed(&mut self) {
        self.fan_in_dirty = true;
    }
}

fn rule_bounds(rule: &UpdateRule) -> (f64, f64) {
    rule.as_bounded()
        .map(|b| (b.lower_bound(), b.upper_bound()))
        .unwrap_or(DEFAULT_BOUNDS)
}
