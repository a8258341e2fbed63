// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Deletion with cascading cleanup
//!
//! Deleting a neuron removes its synapses; deleting a group removes its
//! members and children; a delete-when-empty parent left empty is removed
//! as well. A [`DeletionTransaction`] records every group it has started
//! deleting so a child and its parent never recurse into each other.

use ahash::AHashSet;
use neurokernel_neural::{GroupId, NeuronId, SynapseId};
use tracing::debug;

use crate::events::{GroupChange, NetworkEvent};
use crate::groups::Group;
use crate::network::Network;

/// Groups visited by one cascading deletion
#[derive(Debug, Default)]
pub struct DeletionTransaction {
    visited: AHashSet<GroupId>,
}

impl DeletionTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `group`; false if it was already being deleted
    pub fn visit(&mut self, group: GroupId) -> bool {
        self.visited.insert(group)
    }

    pub fn has_visited(&self, group: GroupId) -> bool {
        self.visited.contains(&group)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

impl Network {
    // ========================================================================
    // Neurons and synapses
    // ========================================================================

    /// Remove a neuron and every synapse touching it
    ///
    /// Returns false if the neuron does not exist.
    pub fn delete_neuron(&mut self, id: NeuronId) -> bool {
        let mut tx = DeletionTransaction::new();
        self.delete_neuron_in(id, &mut tx)
    }

    fn delete_neuron_in(&mut self, id: NeuronId, tx: &mut DeletionTransaction) -> bool {
        let Some(neuron) = self.neurons.get(&id) else {
            return false;
        };
        let mut attached: Vec<SynapseId> = neuron.fan_in().to_vec();
        for sid in neuron.fan_out() {
            if !attached.contains(sid) {
                attached.push(*sid);
            }
        }
        let group = neuron.group();

        for sid in attached {
            self.delete_synapse_in(sid, tx);
        }

        if let Some(gid) = group {
            let removed = match self.groups.get_mut(&gid) {
                Some(Group::Neuron(g)) => g.remove_member(id),
                _ => false,
            };
            if removed {
                self.emit_group_change(gid, GroupChange::NeuronRemovedFromGroup(id));
            }
        }
        self.neurons.remove(&id);
        self.emit(NetworkEvent::NeuronRemoved(id));

        if let Some(gid) = group {
            self.delete_if_empty_in(gid, tx);
        }
        true
    }

    /// Remove a synapse from its endpoints and its group
    ///
    /// Returns false if the synapse does not exist.
    pub fn delete_synapse(&mut self, id: SynapseId) -> bool {
        let mut tx = DeletionTransaction::new();
        self.delete_synapse_in(id, &mut tx)
    }

    fn delete_synapse_in(&mut self, id: SynapseId, tx: &mut DeletionTransaction) -> bool {
        let Some(synapse) = self.synapses.remove(&id) else {
            return false;
        };
        if let Some(n) = self.neurons.get_mut(&synapse.source()) {
            n.remove_fan_out(id);
        }
        if let Some(n) = self.neurons.get_mut(&synapse.target()) {
            n.remove_fan_in(id);
        }
        self.pending_routing.retain(|s| *s != id);

        if let Some(gid) = synapse.group() {
            let removed = match self.groups.get_mut(&gid) {
                Some(Group::Synapse(g)) => g.remove(id),
                _ => false,
            };
            if removed {
                self.emit_group_change(gid, GroupChange::SynapseRemovedFromGroup(id));
            }
        }
        self.emit(NetworkEvent::SynapseRemoved(id));

        if let Some(gid) = synapse.group() {
            self.delete_if_empty_in(gid, tx);
        }
        true
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Remove a group with everything it contains
    ///
    /// Returns false if the group does not exist or is already being
    /// deleted.
    pub fn delete_group(&mut self, id: GroupId) -> bool {
        let mut tx = DeletionTransaction::new();
        self.delete_group_in(id, &mut tx)
    }

    fn delete_group_in(&mut self, id: GroupId, tx: &mut DeletionTransaction) -> bool {
        if !self.groups.contains_key(&id) || !tx.visit(id) {
            return false;
        }
        let parent = match self.groups.get_mut(&id) {
            Some(group) => {
                let meta = group.meta_mut();
                meta.marked_for_deletion = true;
                meta.parent
            }
            None => return false,
        };
        debug!(group = %id, "Deleting group");

        let (neurons, synapses, children): (Vec<NeuronId>, Vec<SynapseId>, Vec<GroupId>) =
            match self.groups.get(&id) {
                Some(Group::Neuron(g)) => (g.members().to_vec(), Vec::new(), Vec::new()),
                Some(Group::Synapse(g)) => (Vec::new(), g.members().collect(), Vec::new()),
                Some(Group::Subnetwork(s)) => (Vec::new(), Vec::new(), s.children().collect()),
                None => return false,
            };
        if self.subnetwork(id).is_ok() {
            self.disable_routing(id);
        }
        for nid in neurons {
            self.delete_neuron_in(nid, tx);
        }
        for sid in synapses {
            self.delete_synapse_in(sid, tx);
        }
        for child in children {
            self.delete_group_in(child, tx);
        }

        self.groups.remove(&id);
        self.group_order.retain(|g| *g != id);
        self.routing_subscribers.retain(|g| *g != id);
        if let Some(pid) = parent {
            let removed = match self.groups.get_mut(&pid) {
                Some(Group::Subnetwork(s)) => s.remove_child(id),
                _ => false,
            };
            if removed {
                self.emit_group_change(pid, GroupChange::ChildRemoved(id));
            }
        }
        self.emit(NetworkEvent::GroupRemoved(id));

        if let Some(pid) = parent {
            self.delete_if_empty_in(pid, tx);
        }
        true
    }

    /// Delete `group` if it wants deleting when empty and is empty
    pub(crate) fn delete_if_empty(&mut self, group: GroupId) {
        let mut tx = DeletionTransaction::new();
        self.delete_if_empty_in(group, &mut tx);
    }

    fn delete_if_empty_in(&mut self, group: GroupId, tx: &mut DeletionTransaction) {
        let Some(g) = self.groups.get(&group) else {
            return;
        };
        let meta = g.meta();
        if meta.delete_when_empty && !meta.marked_for_deletion && self.is_group_empty(group) {
            self.delete_group_in(group, tx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::SubnetworkKind;
    use neurokernel_neural::{Neuron, Synapse};

    #[test]
    fn test_transaction_visits_once() {
        let mut tx = DeletionTransaction::new();
        assert!(tx.visit(GroupId(1)));
        assert!(!tx.visit(GroupId(1)));
        assert!(tx.has_visited(GroupId(1)));
        assert_eq!(tx.visited_count(), 1);
    }

    #[test]
    fn test_delete_neuron_cascades_to_synapses() {
        let mut net = Network::seeded(2);
        let a = net.add_neuron(Neuron::default());
        let b = net.add_neuron(Neuron::default());
        net.add_synapse(Synapse::new(a, b, 1.0)).unwrap();
        net.add_synapse(Synapse::new(b, a, 1.0)).unwrap();
        net.add_synapse(Synapse::new(a, a, 1.0)).unwrap();

        assert!(net.delete_neuron(a));
        assert!(!net.delete_neuron(a));
        assert_eq!(net.synapse_count(), 0);
        assert!(net.neuron(b).unwrap().fan_in().is_empty());
        assert!(net.neuron(b).unwrap().fan_out().is_empty());
    }

    #[test]
    fn test_absent_ids_are_noops() {
        let mut net = Network::seeded(2);
        assert!(!net.delete_neuron(NeuronId(3)));
        assert!(!net.delete_synapse(SynapseId(3)));
        assert!(!net.delete_group(GroupId(3)));
        assert!(net.drain_events().is_empty());
    }

    #[test]
    fn test_empty_group_deletes_itself() {
        let mut net = Network::seeded(2);
        let g = net
            .create_neuron_group(vec![Neuron::default(), Neuron::default()], "g")
            .unwrap();
        let first = net.neuron_at(g, 0).unwrap();
        let second = net.neuron_at(g, 1).unwrap();

        net.delete_neuron(first);
        assert!(net.contains_group(g));
        net.delete_neuron(second);
        assert!(!net.contains_group(g));
        assert!(net.top_level_groups().is_empty());
    }

    #[test]
    fn test_subnetwork_deletion_removes_everything_once() {
        let mut net = Network::seeded(2);
        let subnet = net.create_subnetwork("net", SubnetworkKind::Plain);
        let a = net
            .add_neuron_group_to_subnetwork(subnet, vec![Neuron::default()], "a")
            .unwrap();
        net.add_neuron_group_to_subnetwork(subnet, vec![Neuron::default()], "b")
            .unwrap();
        let b = net.subnetwork_neuron_group(subnet, 1).unwrap();
        net.connect_neuron_groups(subnet, a, b, &crate::connectivity::AllToAll::default())
            .unwrap();
        net.drain_events();

        assert!(net.delete_group(subnet));
        let removed_subnets = net
            .drain_events()
            .iter()
            .filter(|e| **e == NetworkEvent::GroupRemoved(subnet))
            .count();
        assert_eq!(removed_subnets, 1);
        assert_eq!(net.neuron_count(), 0);
        assert_eq!(net.synapse_count(), 0);
        assert_eq!(net.groups().count(), 0);
    }
}
