// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Neuron group: an ordered collection of neurons updated as one scope
//!
//! Members are ordered by x position when the group is built (stable for
//! ties), and that order is the index order used by every batch call.

use std::sync::Arc;

use neurokernel_config::WinnerTakeAllConfig;
use neurokernel_neural::{
    check_bounds, GroupId, Neuron, NeuronId, ProbDistribution, SynapseId, UpdateRule,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Group, GroupMeta};
use crate::events::GroupChange;
use crate::network::Network;
use crate::types::{NetworkError, NetworkResult};

/// Winner-take-all settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinnerTakeAllParams {
    pub win_value: f64,
    pub lose_value: f64,
    /// Chance per step of picking a random winner instead of the maximum
    pub random_prob: f64,
}

impl Default for WinnerTakeAllParams {
    fn default() -> Self {
        Self {
            win_value: 1.0,
            lose_value: 0.0,
            random_prob: 0.0,
        }
    }
}

impl From<&WinnerTakeAllConfig> for WinnerTakeAllParams {
    fn from(config: &WinnerTakeAllConfig) -> Self {
        Self {
            win_value: config.win_value,
            lose_value: config.lose_value,
            random_prob: config.random_prob,
        }
    }
}

impl WinnerTakeAllParams {
    pub fn validate(&self) -> NetworkResult<()> {
        if !(0.0..=1.0).contains(&self.random_prob) {
            return Err(NetworkError::InvalidTopology(format!(
                "winner-take-all random_prob must be in [0, 1], got {}",
                self.random_prob
            )));
        }
        Ok(())
    }
}

/// How a neuron group turns inputs into activations
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NeuronGroupKind {
    /// Each member runs its own rule
    #[default]
    Plain,
    /// Exactly one member wins each step
    WinnerTakeAll(WinnerTakeAllParams),
}

#[derive(Debug, Clone)]
pub struct NeuronGroup {
    pub meta: GroupMeta,
    members: Vec<NeuronId>,
    pub kind: NeuronGroupKind,
}

impl NeuronGroup {
    pub(crate) fn new(
        id: GroupId,
        label: impl Into<String>,
        members: Vec<NeuronId>,
        kind: NeuronGroupKind,
    ) -> Self {
        Self {
            meta: GroupMeta::new(id, label),
            members,
            kind,
        }
    }

    pub fn members(&self) -> &[NeuronId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, neuron: NeuronId) -> bool {
        self.members.contains(&neuron)
    }

    pub fn index_of(&self, neuron: NeuronId) -> Option<usize> {
        self.members.iter().position(|n| *n == neuron)
    }

    pub fn get(&self, index: usize) -> NetworkResult<NeuronId> {
        self.members
            .get(index)
            .copied()
            .ok_or(NetworkError::IndexOutOfRange {
                what: "neuron group",
                index,
                len: self.members.len(),
            })
    }

    pub fn is_winner_take_all(&self) -> bool {
        matches!(self.kind, NeuronGroupKind::WinnerTakeAll(_))
    }

    pub(crate) fn remove_member(&mut self, neuron: NeuronId) -> bool {
        match self.index_of(neuron) {
            Some(i) => {
                self.members.remove(i);
                true
            }
            None => false,
        }
    }
}

impl Network {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Register `neurons` as a new top-level neuron group
    pub fn create_neuron_group(
        &mut self,
        neurons: Vec<Neuron>,
        label: impl Into<String>,
    ) -> NetworkResult<GroupId> {
        self.create_neuron_group_of_kind(neurons, label, NeuronGroupKind::Plain)
    }

    pub fn create_neuron_group_of_kind(
        &mut self,
        mut neurons: Vec<Neuron>,
        label: impl Into<String>,
        kind: NeuronGroupKind,
    ) -> NetworkResult<GroupId> {
        if let NeuronGroupKind::WinnerTakeAll(params) = &kind {
            params.validate()?;
        }
        neurons.sort_by(|a, b| a.x.total_cmp(&b.x));

        let gid = self.allocate_group_id();
        let mut members = Vec::with_capacity(neurons.len());
        for mut neuron in neurons {
            neuron.set_group(Some(gid));
            members.push(self.add_neuron(neuron));
        }
        let group = NeuronGroup::new(gid, label, members, kind);
        Ok(self.register_group(Group::Neuron(group)))
    }

    /// Group of `size` default-rule neurons laid out on a line
    pub fn create_neuron_group_with_rule(
        &mut self,
        size: usize,
        rule: Arc<UpdateRule>,
        label: impl Into<String>,
    ) -> NetworkResult<GroupId> {
        let neurons = (0..size)
            .map(|i| Neuron::new(Arc::clone(&rule)).at(i as f64, 0.0))
            .collect();
        self.create_neuron_group(neurons, label)
    }

    // ========================================================================
    // Batch access
    // ========================================================================

    pub fn neuron_at(&self, group: GroupId, index: usize) -> NetworkResult<NeuronId> {
        self.neuron_group(group)?.get(index)
    }

    /// Activations in member order
    pub fn activations(&self, group: GroupId) -> NetworkResult<Vec<f64>> {
        let g = self.neuron_group(group)?;
        g.members()
            .iter()
            .map(|id| self.activation(*id))
            .collect()
    }

    /// Force-set every member's activation, in member order
    pub fn set_activations(&mut self, group: GroupId, values: &[f64]) -> NetworkResult<()> {
        let members = self.neuron_group(group)?.members().to_vec();
        if members.len() != values.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: members.len(),
                actual: values.len(),
            });
        }
        for (id, value) in members.into_iter().zip(values) {
            self.neuron_mut(id)?.force_set_activation(*value);
        }
        Ok(())
    }

    /// Queue external input on every member, in member order
    pub fn add_inputs(&mut self, group: GroupId, values: &[f64]) -> NetworkResult<()> {
        let members = self.neuron_group(group)?.members().to_vec();
        if members.len() != values.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: members.len(),
                actual: values.len(),
            });
        }
        for (id, value) in members.into_iter().zip(values) {
            self.neuron_mut(id)?.add_input(*value);
        }
        Ok(())
    }

    pub fn clear_group(&mut self, group: GroupId) -> NetworkResult<()> {
        for id in self.neuron_group(group)?.members().to_vec() {
            self.neuron_mut(id)?.clear();
        }
        Ok(())
    }

    pub fn randomize_group(&mut self, group: GroupId) -> NetworkResult<()> {
        for id in self.neuron_group(group)?.members().to_vec() {
            if let Some(neuron) = self.neurons.get_mut(&id) {
                neuron.randomize(&mut self.rng);
            }
        }
        Ok(())
    }

    /// Draw each member's bias uniformly from `[lower, upper]`
    pub fn randomize_biases(&mut self, group: GroupId, lower: f64, upper: f64) -> NetworkResult<()> {
        check_bounds(lower, upper)?;
        for id in self.neuron_group(group)?.members().to_vec() {
            let bias = self.rng.gen_range(lower..=upper);
            self.neuron_mut(id)?.set_bias(bias);
        }
        Ok(())
    }

    pub fn set_group_update_rule(&mut self, group: GroupId, rule: Arc<UpdateRule>) -> NetworkResult<()> {
        for id in self.neuron_group(group)?.members().to_vec() {
            self.neuron_mut(id)?.set_update_rule(Arc::clone(&rule));
        }
        self.emit_group_change(group, GroupChange::ParametersChanged);
        Ok(())
    }

    pub fn set_group_clamped(&mut self, group: GroupId, clamped: bool) -> NetworkResult<()> {
        for id in self.neuron_group(group)?.members().to_vec() {
            self.neuron_mut(id)?.set_clamped(clamped);
        }
        Ok(())
    }

    pub fn set_winner_take_all_params(
        &mut self,
        group: GroupId,
        params: WinnerTakeAllParams,
    ) -> NetworkResult<()> {
        params.validate()?;
        let g = self.neuron_group_mut(group)?;
        match &mut g.kind {
            NeuronGroupKind::WinnerTakeAll(current) => *current = params,
            NeuronGroupKind::Plain => {
                return Err(NetworkError::WrongGroupKind {
                    id: group,
                    expected: "winner-take-all group",
                })
            }
        }
        self.emit_group_change(group, GroupChange::ParametersChanged);
        Ok(())
    }

    // ========================================================================
    // Connectivity views
    // ========================================================================

    /// Synapses whose target is a member, in member then fan-in order
    pub fn incoming_synapses(&self, group: GroupId) -> NetworkResult<Vec<SynapseId>> {
        let g = self.neuron_group(group)?;
        let mut out = Vec::new();
        for id in g.members() {
            out.extend_from_slice(self.neuron(*id)?.fan_in());
        }
        Ok(out)
    }

    /// Synapses whose source is a member, in member then fan-out order
    pub fn outgoing_synapses(&self, group: GroupId) -> NetworkResult<Vec<SynapseId>> {
        let g = self.neuron_group(group)?;
        let mut out = Vec::new();
        for id in g.members() {
            out.extend_from_slice(self.neuron(*id)?.fan_out());
        }
        Ok(out)
    }

    /// Redraw every incoming strength from `distribution`
    pub fn randomize_incoming_weights(
        &mut self,
        group: GroupId,
        distribution: &ProbDistribution,
    ) -> NetworkResult<()> {
        distribution.validate()?;
        let incoming = self.incoming_synapses(group)?;
        debug!(group = %group, count = incoming.len(), "Randomizing incoming weights");
        for sid in incoming {
            if let Some(synapse) = self.synapses.get_mut(&sid) {
                synapse.randomize(distribution, &mut self.rng);
            }
        }
        for id in self.neuron_group(group)?.members().to_vec() {
            self.neuron_mut(id)?.mark_fan_in_changed();
        }
        Ok(())
    }
}
