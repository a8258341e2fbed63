// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Network arena
//!
//! The [`Network`] owns every neuron, synapse and group, keyed by id. It is
//! the only place entities are created or destroyed, and it is the external
//! driver's entry point for stepping (see `update.rs`).
//!
//! ## Responsibilities
//!
//! 1. **Registry**: add/remove neurons, synapses and groups
//! 2. **Scheduling**: staged per-scope updates each step
//! 3. **Routing**: post-step reconciliation of new synapses into groups
//! 4. **Events**: queued change notifications for observers

use std::collections::BTreeMap;
use std::sync::Arc;

use neurokernel_config::{SimulationConfig, UpdateMode};
use neurokernel_neural::{
    FanInSample, GroupId, Neuron, NeuronId, StepContext, Synapse, SynapseId, SynapseRule,
};
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::events::{GroupChange, NetworkEvent};
use crate::groups::{Group, NeuronGroup, Subnetwork, SynapseGroup};
use crate::rng::seeded_rng;
use crate::types::{NetworkError, NetworkResult};

pub struct Network {
    pub(crate) neurons: BTreeMap<NeuronId, Neuron>,
    pub(crate) synapses: BTreeMap<SynapseId, Synapse>,
    pub(crate) groups: BTreeMap<GroupId, Group>,
    /// Top-level groups in insertion order
    pub(crate) group_order: Vec<GroupId>,
    next_neuron_id: u32,
    next_synapse_id: u32,
    next_group_id: u32,
    pub(crate) context: StepContext,
    pub(crate) update_mode: UpdateMode,
    pub(crate) rng: StdRng,
    pub(crate) events: Vec<NetworkEvent>,
    /// Subnetworks with routing enabled, in registration order
    pub(crate) routing_subscribers: Vec<GroupId>,
    /// Synapses created since the last reconciliation
    pub(crate) pending_routing: Vec<SynapseId>,
    pub(crate) in_step: bool,
    /// Reused fan-in buffer
    pub(crate) scratch: Vec<FanInSample>,
}

impl Default for Network {
    fn default() -> Self {
        Self::with_config(&SimulationConfig::default())
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("neurons", &self.neurons.len())
            .field("synapses", &self.synapses.len())
            .field("groups", &self.groups.len())
            .field("time", &self.context.time)
            .field("update_mode", &self.update_mode)
            .finish()
    }
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &SimulationConfig) -> Self {
        info!(
            time_step = config.time_step,
            update_mode = %config.update_mode,
            seed = ?config.seed,
            "Creating network"
        );
        Self {
            neurons: BTreeMap::new(),
            synapses: BTreeMap::new(),
            groups: BTreeMap::new(),
            group_order: Vec::new(),
            next_neuron_id: 0,
            next_synapse_id: 0,
            next_group_id: 0,
            context: StepContext::new(config.time_step),
            update_mode: config.update_mode,
            rng: seeded_rng(config.seed),
            events: Vec::new(),
            routing_subscribers: Vec::new(),
            pending_routing: Vec::new(),
            in_step: false,
            scratch: Vec::new(),
        }
    }

    /// Network with a fixed seed and default settings
    pub fn seeded(seed: u64) -> Self {
        Self::with_config(&SimulationConfig {
            seed: Some(seed),
            ..SimulationConfig::default()
        })
    }

    // ========================================================================
    // Global state
    // ========================================================================

    pub fn context(&self) -> StepContext {
        self.context
    }

    pub fn time(&self) -> f64 {
        self.context.time
    }

    pub fn time_step(&self) -> f64 {
        self.context.time_step
    }

    pub fn set_time_step(&mut self, time_step: f64) {
        self.context.time_step = time_step;
    }

    pub fn clamp_neurons(&self) -> bool {
        self.context.clamp_neurons
    }

    pub fn set_clamp_neurons(&mut self, clamp: bool) {
        self.context.clamp_neurons = clamp;
    }

    pub fn set_clamp_weights(&mut self, clamp: bool) {
        self.context.clamp_weights = clamp;
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.update_mode
    }

    pub fn set_update_mode(&mut self, mode: UpdateMode) {
        self.update_mode = mode;
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub(crate) fn emit(&mut self, event: NetworkEvent) {
        self.events.push(event);
    }

    pub(crate) fn emit_group_change(&mut self, group: GroupId, change: GroupChange) {
        self.events.push(NetworkEvent::GroupChanged { group, change });
    }

    /// Take all queued events, oldest first
    pub fn drain_events(&mut self) -> Vec<NetworkEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[NetworkEvent] {
        &self.events
    }

    // ========================================================================
    // Neurons
    // ========================================================================

    /// Register a loose neuron
    pub fn add_neuron(&mut self, neuron: Neuron) -> NeuronId {
        let id = NeuronId(self.next_neuron_id);
        self.next_neuron_id += 1;
        self.neurons.insert(id, neuron);
        self.emit(NetworkEvent::NeuronAdded(id));
        id
    }

    pub fn neuron(&self, id: NeuronId) -> NetworkResult<&Neuron> {
        self.neurons.get(&id).ok_or(NetworkError::NeuronNotFound(id))
    }

    pub fn neuron_mut(&mut self, id: NeuronId) -> NetworkResult<&mut Neuron> {
        self.neurons
            .get_mut(&id)
            .ok_or(NetworkError::NeuronNotFound(id))
    }

    pub fn neurons(&self) -> impl Iterator<Item = (NeuronId, &Neuron)> {
        self.neurons.iter().map(|(id, n)| (*id, n))
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    pub fn activation(&self, id: NeuronId) -> NetworkResult<f64> {
        Ok(self.neuron(id)?.activation())
    }

    // ========================================================================
    // Synapses
    // ========================================================================

    /// Register a synapse and queue it for routing
    ///
    /// Outside of a step the routing pass runs immediately; during a step it
    /// runs once the step completes.
    pub fn add_synapse(&mut self, synapse: Synapse) -> NetworkResult<SynapseId> {
        let id = self.insert_synapse(synapse, None)?;
        if !self.in_step {
            self.reconcile_routing();
        }
        Ok(id)
    }

    /// Register a synapse directly into a synapse group
    pub fn add_synapse_to_new_group(
        &mut self,
        synapse: Synapse,
        group: GroupId,
    ) -> NetworkResult<SynapseId> {
        let id = self.insert_synapse(synapse, Some(group))?;
        if !self.in_step {
            self.reconcile_routing();
        }
        Ok(id)
    }

    /// Register without running the routing pass
    pub(crate) fn insert_synapse(
        &mut self,
        mut synapse: Synapse,
        group: Option<GroupId>,
    ) -> NetworkResult<SynapseId> {
        let source = synapse.source();
        let target = synapse.target();
        if !self.neurons.contains_key(&source) {
            return Err(NetworkError::NeuronNotFound(source));
        }
        if !self.neurons.contains_key(&target) {
            return Err(NetworkError::NeuronNotFound(target));
        }
        if let Some(gid) = group {
            self.synapse_group(gid)?;
        }

        let id = SynapseId(self.next_synapse_id);
        self.next_synapse_id += 1;
        synapse.set_group(None);
        self.synapses.insert(id, synapse);

        if let Some(n) = self.neurons.get_mut(&source) {
            n.add_fan_out(id);
        }
        if let Some(n) = self.neurons.get_mut(&target) {
            n.add_fan_in(id);
        }
        self.emit(NetworkEvent::SynapseAdded(id));
        self.pending_routing.push(id);

        if let Some(gid) = group {
            self.add_synapse_to_group(id, gid)?;
        }
        Ok(id)
    }

    pub fn synapse(&self, id: SynapseId) -> NetworkResult<&Synapse> {
        self.synapses.get(&id).ok_or(NetworkError::SynapseNotFound(id))
    }

    /// Strength writes go through [`Network::set_strength`] so fan-in
    /// partitions stay current
    pub(crate) fn synapse_mut(&mut self, id: SynapseId) -> NetworkResult<&mut Synapse> {
        self.synapses
            .get_mut(&id)
            .ok_or(NetworkError::SynapseNotFound(id))
    }

    pub fn synapses(&self) -> impl Iterator<Item = (SynapseId, &Synapse)> {
        self.synapses.iter().map(|(id, s)| (*id, s))
    }

    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    /// Change a synapse's strength
    ///
    /// The target's rule is told its fan-in changed so sign-partitioned rules
    /// re-examine their inputs.
    pub fn set_strength(&mut self, id: SynapseId, strength: f64) -> NetworkResult<()> {
        let synapse = self.synapse_mut(id)?;
        synapse.set_strength(strength);
        let target = synapse.target();
        if let Some(n) = self.neurons.get_mut(&target) {
            n.mark_fan_in_changed();
        }
        Ok(())
    }

    /// Attach or remove a learning rule on a registered synapse
    pub fn set_synapse_rule(
        &mut self,
        id: SynapseId,
        rule: Option<Arc<dyn SynapseRule>>,
    ) -> NetworkResult<()> {
        self.synapse_mut(id)?.set_rule(rule);
        Ok(())
    }

    /// Fill `out` with `id`'s fan-in as seen at the start of the step
    pub(crate) fn collect_fan_in(&self, id: NeuronId, out: &mut Vec<FanInSample>) {
        out.clear();
        let Some(neuron) = self.neurons.get(&id) else {
            return;
        };
        for sid in neuron.fan_in() {
            if let Some(synapse) = self.synapses.get(sid) {
                let source = self
                    .neurons
                    .get(&synapse.source())
                    .map(Neuron::activation)
                    .unwrap_or(0.0);
                out.push(FanInSample::new(source, synapse.strength()));
            }
        }
    }

    /// Σ source activation × strength over fan-in, plus pending external input
    pub fn weighted_input(&self, id: NeuronId) -> NetworkResult<f64> {
        let neuron = self.neuron(id)?;
        let mut samples = Vec::with_capacity(neuron.fan_in().len());
        self.collect_fan_in(id, &mut samples);
        let weighted: f64 = samples.iter().map(FanInSample::weighted).sum();
        Ok(weighted + neuron.input_value())
    }

    // ========================================================================
    // Groups
    // ========================================================================

    pub(crate) fn allocate_group_id(&mut self) -> GroupId {
        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        id
    }

    /// Insert a fully built group at top level
    pub(crate) fn register_group(&mut self, group: Group) -> GroupId {
        let id = group.id();
        debug!(group = %id, kind = group.kind_name(), label = group.label(), "Registering group");
        self.groups.insert(id, group);
        self.group_order.push(id);
        self.emit(NetworkEvent::GroupAdded(id));
        id
    }

    pub fn group(&self, id: GroupId) -> NetworkResult<&Group> {
        self.groups.get(&id).ok_or(NetworkError::GroupNotFound(id))
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> NetworkResult<&mut Group> {
        self.groups
            .get_mut(&id)
            .ok_or(NetworkError::GroupNotFound(id))
    }

    pub fn contains_group(&self, id: GroupId) -> bool {
        self.groups.contains_key(&id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Top-level groups in update order
    pub fn top_level_groups(&self) -> &[GroupId] {
        &self.group_order
    }

    pub fn neuron_group(&self, id: GroupId) -> NetworkResult<&NeuronGroup> {
        self.group(id)?
            .as_neuron_group()
            .ok_or(NetworkError::WrongGroupKind {
                id,
                expected: "neuron group",
            })
    }

    pub(crate) fn neuron_group_mut(&mut self, id: GroupId) -> NetworkResult<&mut NeuronGroup> {
        match self.group_mut(id)? {
            Group::Neuron(g) => Ok(g),
            _ => Err(NetworkError::WrongGroupKind {
                id,
                expected: "neuron group",
            }),
        }
    }

    pub fn synapse_group(&self, id: GroupId) -> NetworkResult<&SynapseGroup> {
        self.group(id)?
            .as_synapse_group()
            .ok_or(NetworkError::WrongGroupKind {
                id,
                expected: "synapse group",
            })
    }

    pub(crate) fn synapse_group_mut(&mut self, id: GroupId) -> NetworkResult<&mut SynapseGroup> {
        match self.group_mut(id)? {
            Group::Synapse(g) => Ok(g),
            _ => Err(NetworkError::WrongGroupKind {
                id,
                expected: "synapse group",
            }),
        }
    }

    pub fn subnetwork(&self, id: GroupId) -> NetworkResult<&Subnetwork> {
        self.group(id)?
            .as_subnetwork()
            .ok_or(NetworkError::WrongGroupKind {
                id,
                expected: "subnetwork",
            })
    }

    pub(crate) fn subnetwork_mut(&mut self, id: GroupId) -> NetworkResult<&mut Subnetwork> {
        match self.group_mut(id)? {
            Group::Subnetwork(g) => Ok(g),
            _ => Err(NetworkError::WrongGroupKind {
                id,
                expected: "subnetwork",
            }),
        }
    }

    pub fn label(&self, id: GroupId) -> NetworkResult<&str> {
        Ok(self.group(id)?.label())
    }

    pub fn set_label(&mut self, id: GroupId, label: impl Into<String>) -> NetworkResult<()> {
        let new = label.into();
        let meta = self.group_mut(id)?.meta_mut();
        if meta.label == new {
            return Ok(());
        }
        let old = std::mem::replace(&mut meta.label, new.clone());
        self.emit(NetworkEvent::LabelChanged { group: id, old, new });
        Ok(())
    }

    pub fn parent_group(&self, id: GroupId) -> NetworkResult<Option<GroupId>> {
        Ok(self.group(id)?.meta().parent)
    }

    pub fn set_delete_when_empty(&mut self, id: GroupId, delete_when_empty: bool) -> NetworkResult<()> {
        self.group_mut(id)?.meta_mut().delete_when_empty = delete_when_empty;
        Ok(())
    }

    /// Emptiness as each group kind defines it
    ///
    /// A subnetwork is empty when it has no neuron groups and every one of
    /// its synapse groups is empty. Unknown ids count as empty.
    pub fn is_group_empty(&self, id: GroupId) -> bool {
        match self.groups.get(&id) {
            None => true,
            Some(Group::Neuron(g)) => g.is_empty(),
            Some(Group::Synapse(g)) => g.is_empty(),
            Some(Group::Subnetwork(s)) => {
                s.neuron_groups().is_empty()
                    && s.synapse_groups()
                        .iter()
                        .all(|sg| self.is_group_empty(*sg))
            }
        }
    }

    // ========================================================================
    // Synapse group membership
    // ========================================================================

    /// Create an empty top-level synapse group
    pub fn create_synapse_group(&mut self, label: impl Into<String>) -> GroupId {
        let id = self.allocate_group_id();
        self.register_group(Group::Synapse(SynapseGroup::new(id, label)))
    }

    /// Put a synapse into `group`, taking it out of any previous group
    ///
    /// Returns false if it was already a member.
    pub fn add_synapse_to_group(&mut self, synapse: SynapseId, group: GroupId) -> NetworkResult<bool> {
        self.synapse_group(group)?;
        let previous = self.synapse(synapse)?.group();
        if previous == Some(group) {
            return Ok(false);
        }
        if let Some(old) = previous {
            self.remove_synapse_from_group(synapse, old)?;
        }

        self.synapse_group_mut(group)?.insert(synapse);
        self.synapse_mut(synapse)?.set_group(Some(group));
        self.emit_group_change(group, GroupChange::SynapseAddedToGroup(synapse));
        Ok(true)
    }

    /// Take a synapse out of `group`, leaving it loose in the network
    ///
    /// Returns false if it was not a member. A delete-when-empty group left
    /// empty is deleted.
    pub fn remove_synapse_from_group(&mut self, synapse: SynapseId, group: GroupId) -> NetworkResult<bool> {
        if !self.synapse_group_mut(group)?.remove(synapse) {
            return Ok(false);
        }
        if let Some(s) = self.synapses.get_mut(&synapse) {
            s.set_group(None);
        }
        self.emit_group_change(group, GroupChange::SynapseRemovedFromGroup(synapse));
        self.delete_if_empty(group);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential_and_events_queued() {
        let mut net = Network::seeded(1);
        let a = net.add_neuron(Neuron::default());
        let b = net.add_neuron(Neuron::default());
        let s = net.add_synapse(Synapse::new(a, b, 0.5)).unwrap();

        assert_eq!((a, b, s), (NeuronId(0), NeuronId(1), SynapseId(0)));
        assert_eq!(
            net.drain_events(),
            vec![
                NetworkEvent::NeuronAdded(a),
                NetworkEvent::NeuronAdded(b),
                NetworkEvent::SynapseAdded(s),
            ]
        );
        assert!(net.drain_events().is_empty());
    }

    #[test]
    fn test_synapse_wires_fan_lists() {
        let mut net = Network::seeded(1);
        let a = net.add_neuron(Neuron::default());
        let b = net.add_neuron(Neuron::default());
        let s = net.add_synapse(Synapse::new(a, b, 0.5)).unwrap();
        assert_eq!(net.neuron(a).unwrap().fan_out(), &[s]);
        assert_eq!(net.neuron(b).unwrap().fan_in(), &[s]);
    }

    #[test]
    fn test_synapse_requires_endpoints() {
        let mut net = Network::seeded(1);
        let a = net.add_neuron(Neuron::default());
        let err = net.add_synapse(Synapse::new(a, NeuronId(99), 1.0)).unwrap_err();
        assert!(matches!(err, NetworkError::NeuronNotFound(NeuronId(99))));
        assert_eq!(net.synapse_count(), 0);
    }

    #[test]
    fn test_weighted_input_includes_external() {
        let mut net = Network::seeded(1);
        let a = net.add_neuron(Neuron::default());
        let b = net.add_neuron(Neuron::default());
        net.add_synapse(Synapse::new(a, b, 0.5)).unwrap();
        net.neuron_mut(a).unwrap().force_set_activation(0.8);
        net.neuron_mut(b).unwrap().add_input(0.1);
        assert!((net.weighted_input(b).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_moving_synapse_between_groups() {
        let mut net = Network::seeded(1);
        let a = net.add_neuron(Neuron::default());
        let s = net.add_synapse(Synapse::new(a, a, 1.0)).unwrap();
        let g1 = net.create_synapse_group("one");
        let g2 = net.create_synapse_group("two");
        net.set_delete_when_empty(g1, false).unwrap();

        assert!(net.add_synapse_to_group(s, g1).unwrap());
        assert!(!net.add_synapse_to_group(s, g1).unwrap());
        assert!(net.add_synapse_to_group(s, g2).unwrap());

        assert_eq!(net.synapse(s).unwrap().group(), Some(g2));
        assert!(net.synapse_group(g1).unwrap().is_empty());
        assert_eq!(net.synapse_group(g2).unwrap().len(), 1);
    }

    #[test]
    fn test_wrong_group_kind() {
        let mut net = Network::seeded(1);
        let g = net.create_synapse_group("weights");
        assert!(matches!(
            net.neuron_group(g),
            Err(NetworkError::WrongGroupKind { .. })
        ));
    }

    #[test]
    fn test_label_change_event() {
        let mut net = Network::seeded(1);
        let g = net.create_synapse_group("a");
        net.drain_events();
        net.set_label(g, "b").unwrap();
        net.set_label(g, "b").unwrap();
        assert_eq!(
            net.drain_events(),
            vec![NetworkEvent::LabelChanged {
                group: g,
                old: "a".to_string(),
                new: "b".to_string()
            }]
        );
    }
}
