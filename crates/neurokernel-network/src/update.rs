// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Step scheduling
//!
//! One call to [`Network::update`] advances the simulation by one step:
//!
//! 1. Build the schedule of update units (top-level groups, loose neurons)
//! 2. For each unit, stage every neuron from pre-step inputs, then commit
//! 3. Update loose synapses
//! 4. Advance time
//! 5. Reconcile synapses created during the step against routing tables
//!
//! Neurons in a unit never see each other's new activations; later units
//! see the committed values of earlier ones.

use neurokernel_config::UpdateMode;
use neurokernel_neural::{GroupId, NeuronId, SynapseId, TimeType};
use rand::Rng;
use tracing::trace;

use crate::groups::{Group, NeuronGroupKind, SimpleRecurrentLayers, SubnetworkKind, WinnerTakeAllParams};
use crate::network::Network;
use crate::topology::winner_take_all::select_winner;

/// One schedulable piece of work
#[derive(Debug, Clone, PartialEq)]
enum UpdateUnit {
    Group(GroupId),
    Neurons(Vec<NeuronId>),
}

impl Network {
    /// Advance the simulation by one step
    pub fn update(&mut self) {
        self.in_step = true;

        for unit in self.build_schedule() {
            match unit {
                UpdateUnit::Group(gid) => self.update_group(gid),
                UpdateUnit::Neurons(ids) => self.update_neurons(&ids),
            }
        }

        let loose: Vec<SynapseId> = self
            .synapses
            .iter()
            .filter(|(_, s)| s.group().is_none())
            .map(|(id, _)| *id)
            .collect();
        self.update_synapses(&loose);

        let continuous = self
            .neurons
            .values()
            .any(|n| n.time_type() == TimeType::Continuous);
        self.context.time += if continuous {
            self.context.time_step
        } else {
            1.0
        };
        trace!(time = self.context.time, "Step complete");

        self.in_step = false;
        self.reconcile_routing();
    }

    /// Run `steps` updates
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.update();
        }
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    fn build_schedule(&self) -> Vec<UpdateUnit> {
        let loose: Vec<NeuronId> = self
            .neurons
            .iter()
            .filter(|(_, n)| n.group().is_none())
            .map(|(id, _)| *id)
            .collect();

        match self.update_mode {
            UpdateMode::Buffered => {
                let mut units: Vec<UpdateUnit> =
                    self.group_order.iter().map(|g| UpdateUnit::Group(*g)).collect();
                if !loose.is_empty() {
                    units.push(UpdateUnit::Neurons(loose));
                }
                units
            }
            UpdateMode::Priority => {
                let mut keyed: Vec<(i32, UpdateUnit)> = self
                    .group_order
                    .iter()
                    .map(|g| (self.group_priority(*g), UpdateUnit::Group(*g)))
                    .collect();

                let mut tiers: std::collections::BTreeMap<i32, Vec<NeuronId>> =
                    std::collections::BTreeMap::new();
                for id in loose {
                    if let Some(n) = self.neurons.get(&id) {
                        tiers.entry(n.update_priority).or_default().push(id);
                    }
                }
                keyed.extend(
                    tiers
                        .into_iter()
                        .map(|(p, ids)| (p, UpdateUnit::Neurons(ids))),
                );

                keyed.sort_by_key(|(p, _)| *p);
                keyed.into_iter().map(|(_, unit)| unit).collect()
            }
        }
    }

    /// Lowest priority among a group's neurons; synapse-only groups go last
    fn group_priority(&self, gid: GroupId) -> i32 {
        let members: Vec<NeuronId> = match self.groups.get(&gid) {
            Some(Group::Neuron(g)) => g.members().to_vec(),
            Some(Group::Subnetwork(s)) => s
                .neuron_groups()
                .iter()
                .filter_map(|g| self.neuron_group(*g).ok())
                .flat_map(|g| g.members().iter().copied())
                .collect(),
            _ => Vec::new(),
        };
        members
            .iter()
            .filter_map(|id| self.neurons.get(id))
            .map(|n| n.update_priority)
            .min()
            .unwrap_or(i32::MAX)
    }

    // ========================================================================
    // Group updates
    // ========================================================================

    fn update_group(&mut self, gid: GroupId) {
        let Some(group) = self.groups.get(&gid) else {
            return;
        };
        match group {
            Group::Neuron(g) => {
                let members = g.members().to_vec();
                let kind = g.kind;
                match kind {
                    NeuronGroupKind::Plain => self.update_neurons(&members),
                    NeuronGroupKind::WinnerTakeAll(params) => {
                        self.update_winner_take_all(&members, params)
                    }
                }
            }
            Group::Synapse(g) => {
                let members: Vec<SynapseId> = g.members().collect();
                self.update_synapses(&members);
            }
            Group::Subnetwork(s) => {
                let kind = s.kind;
                let mut layers = s.neuron_groups().to_vec();
                let weights = s.synapse_groups().to_vec();
                match kind {
                    SubnetworkKind::SimpleRecurrent(roles) => self.update_simple_recurrent(roles),
                    _ => {
                        if self.update_mode == UpdateMode::Priority {
                            layers.sort_by_key(|g| self.group_priority(*g));
                        }
                        for layer in layers {
                            self.update_group(layer);
                        }
                    }
                }
                for sg in weights {
                    self.update_group(sg);
                }
            }
        }
    }

    /// Input, hidden, copy pre-step hidden into context, output
    fn update_simple_recurrent(&mut self, roles: SimpleRecurrentLayers) {
        self.update_group(roles.input);
        let previous_hidden = self.activations(roles.hidden).unwrap_or_default();
        self.update_group(roles.hidden);

        if let Ok(context) = self.neuron_group(roles.context) {
            let members = context.members().to_vec();
            for (id, value) in members.into_iter().zip(previous_hidden) {
                if let Some(n) = self.neurons.get_mut(&id) {
                    n.force_set_activation(value);
                }
            }
        }
        self.update_group(roles.output);
    }

    /// Stage every neuron, then commit every neuron
    pub(crate) fn update_neurons(&mut self, ids: &[NeuronId]) {
        let ctx = self.context;
        let mut samples = std::mem::take(&mut self.scratch);
        let mut staged = Vec::with_capacity(ids.len());
        for id in ids {
            self.collect_fan_in(*id, &mut samples);
            if let Some(n) = self.neurons.get_mut(id) {
                n.stage(&ctx, &samples, &mut self.rng);
                staged.push(*id);
            }
        }
        self.scratch = samples;
        for id in staged {
            if let Some(n) = self.neurons.get_mut(&id) {
                n.commit();
            }
        }
    }

    fn update_winner_take_all(&mut self, ids: &[NeuronId], params: WinnerTakeAllParams) {
        if self.context.clamp_neurons || ids.is_empty() {
            return;
        }
        let mut inputs = Vec::with_capacity(ids.len());
        for id in ids {
            let weighted = self.weighted_input(*id).unwrap_or(0.0);
            if let Some(n) = self.neurons.get_mut(id) {
                n.take_input();
            }
            inputs.push(weighted);
        }

        let random = params.random_prob > 0.0 && self.rng.gen::<f64>() < params.random_prob;
        let winner = if random {
            Some(self.rng.gen_range(0..ids.len()))
        } else {
            select_winner(&inputs, &mut self.rng)
        };

        for (i, id) in ids.iter().enumerate() {
            if let Some(n) = self.neurons.get_mut(id) {
                let value = if Some(i) == winner {
                    params.win_value
                } else {
                    params.lose_value
                };
                n.force_set_activation(value);
            }
        }
    }

    fn update_synapses(&mut self, ids: &[SynapseId]) {
        let ctx = self.context;
        for id in ids {
            let Some(synapse) = self.synapses.get(id) else {
                continue;
            };
            if synapse.rule().is_none() {
                continue;
            }
            let source = self
                .neurons
                .get(&synapse.source())
                .map(|n| n.activation())
                .unwrap_or(0.0);
            let target = self
                .neurons
                .get(&synapse.target())
                .map(|n| n.activation())
                .unwrap_or(0.0);
            let target_id = synapse.target();
            let Some(s) = self.synapses.get_mut(id) else {
                continue;
            };
            let was_excitatory = s.strength() > 0.0;
            s.update(&ctx, source, target);
            if was_excitatory != (s.strength() > 0.0) {
                if let Some(n) = self.neurons.get_mut(&target_id) {
                    n.mark_fan_in_changed();
                }
            }
        }
    }
}
