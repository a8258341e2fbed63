// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Subnetwork: a composite of neuron groups ("layers") and synapse groups
//! ("weight groups") with optional synapse routing
//!
//! Children are held by id in insertion order. The routing table maps a
//! neuron group to the synapse group that should absorb new synapses
//! leaving it (source side) or entering it (target side).

use ahash::AHashMap;
use neurokernel_neural::{GroupId, Neuron, NeuronId, SynapseId};
use tracing::debug;

use super::{Group, GroupMeta};
use crate::connectivity::ConnectionStrategy;
use crate::events::GroupChange;
use crate::network::Network;
use crate::types::{NetworkError, NetworkResult};

/// Layer roles of a simple recurrent network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleRecurrentLayers {
    pub input: GroupId,
    pub hidden: GroupId,
    pub output: GroupId,
    pub context: GroupId,
}

/// Topology a subnetwork was built as; drives its update order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubnetworkKind {
    #[default]
    Plain,
    Layered,
    FeedForward,
    /// Hidden state is copied into the context layer each step
    SimpleRecurrent(SimpleRecurrentLayers),
    Backprop,
}

impl SubnetworkKind {
    pub fn name(&self) -> &'static str {
        match self {
            SubnetworkKind::Plain => "subnetwork",
            SubnetworkKind::Layered => "layered network",
            SubnetworkKind::FeedForward => "feed-forward network",
            SubnetworkKind::SimpleRecurrent(_) => "simple recurrent network",
            SubnetworkKind::Backprop => "backprop network",
        }
    }
}

/// Source/target attachments for routing new synapses
#[derive(Debug, Clone, Default)]
pub struct SynapseRouter {
    source_attachments: AHashMap<GroupId, GroupId>,
    target_attachments: AHashMap<GroupId, GroupId>,
    enabled: bool,
}

impl SynapseRouter {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn source_attachment(&self, neuron_group: GroupId) -> Option<GroupId> {
        self.source_attachments.get(&neuron_group).copied()
    }

    pub fn target_attachment(&self, neuron_group: GroupId) -> Option<GroupId> {
        self.target_attachments.get(&neuron_group).copied()
    }

    pub(crate) fn attach_source(&mut self, neuron_group: GroupId, synapse_group: GroupId) {
        self.source_attachments.insert(neuron_group, synapse_group);
    }

    pub(crate) fn attach_target(&mut self, neuron_group: GroupId, synapse_group: GroupId) {
        self.target_attachments.insert(neuron_group, synapse_group);
    }

    pub(crate) fn detach_source(&mut self, neuron_group: GroupId) -> bool {
        self.source_attachments.remove(&neuron_group).is_some()
    }

    pub(crate) fn detach_target(&mut self, neuron_group: GroupId) -> bool {
        self.target_attachments.remove(&neuron_group).is_some()
    }

    /// Drop every attachment that mentions `group` on either side
    pub(crate) fn forget(&mut self, group: GroupId) {
        self.source_attachments
            .retain(|ng, sg| *ng != group && *sg != group);
        self.target_attachments
            .retain(|ng, sg| *ng != group && *sg != group);
    }

    /// Destination for a synapse from `source_group` to `target_group`
    ///
    /// A shared attachment wins, then the source side, then the target side.
    pub fn resolve(
        &self,
        source_group: Option<GroupId>,
        target_group: Option<GroupId>,
    ) -> Option<GroupId> {
        let by_source = source_group.and_then(|g| self.source_attachment(g));
        let by_target = target_group.and_then(|g| self.target_attachment(g));
        match (by_source, by_target) {
            (Some(s), Some(t)) if s == t => Some(s),
            (Some(s), _) => Some(s),
            (None, t) => t,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Subnetwork {
    pub meta: GroupMeta,
    neuron_groups: Vec<GroupId>,
    synapse_groups: Vec<GroupId>,
    pub router: SynapseRouter,
    pub kind: SubnetworkKind,
}

impl Subnetwork {
    pub(crate) fn new(id: GroupId, label: impl Into<String>, kind: SubnetworkKind) -> Self {
        Self {
            meta: GroupMeta::new(id, label),
            neuron_groups: Vec::new(),
            synapse_groups: Vec::new(),
            router: SynapseRouter::default(),
            kind,
        }
    }

    /// Neuron groups in insertion order
    pub fn neuron_groups(&self) -> &[GroupId] {
        &self.neuron_groups
    }

    /// Synapse groups in insertion order
    pub fn synapse_groups(&self) -> &[GroupId] {
        &self.synapse_groups
    }

    pub fn contains(&self, group: GroupId) -> bool {
        self.neuron_groups.contains(&group) || self.synapse_groups.contains(&group)
    }

    pub fn children(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.neuron_groups
            .iter()
            .chain(self.synapse_groups.iter())
            .copied()
    }

    /// 1-based position among neuron groups, used in auto-labels
    fn layer_number(&self, group: GroupId) -> Option<usize> {
        self.neuron_groups
            .iter()
            .position(|g| *g == group)
            .map(|i| i + 1)
    }

    pub(crate) fn remove_child(&mut self, group: GroupId) -> bool {
        let before = self.neuron_groups.len() + self.synapse_groups.len();
        self.neuron_groups.retain(|g| *g != group);
        self.synapse_groups.retain(|g| *g != group);
        self.router.forget(group);
        before != self.neuron_groups.len() + self.synapse_groups.len()
    }
}

impl Network {
    // ========================================================================
    // Composition
    // ========================================================================

    pub fn create_subnetwork(&mut self, label: impl Into<String>, kind: SubnetworkKind) -> GroupId {
        let id = self.allocate_group_id();
        self.register_group(Group::Subnetwork(Subnetwork::new(id, label, kind)))
    }

    /// Move a top-level neuron or synapse group into `subnet`
    pub fn add_group_to_subnetwork(&mut self, subnet: GroupId, child: GroupId) -> NetworkResult<()> {
        self.subnetwork(subnet)?;
        let group = self.group(child)?;
        if group.as_subnetwork().is_some() {
            return Err(NetworkError::WrongGroupKind {
                id: child,
                expected: "neuron group or synapse group",
            });
        }
        if let Some(parent) = group.meta().parent {
            return Err(NetworkError::AlreadyParented { parent, child });
        }
        let is_neuron_group = group.as_neuron_group().is_some();

        self.group_mut(child)?.meta_mut().parent = Some(subnet);
        self.group_order.retain(|g| *g != child);
        let s = self.subnetwork_mut(subnet)?;
        if is_neuron_group {
            s.neuron_groups.push(child);
        } else {
            s.synapse_groups.push(child);
        }
        self.emit_group_change(subnet, GroupChange::ChildAdded(child));
        Ok(())
    }

    /// Build a neuron group directly inside `subnet`
    pub fn add_neuron_group_to_subnetwork(
        &mut self,
        subnet: GroupId,
        neurons: Vec<Neuron>,
        label: impl Into<String>,
    ) -> NetworkResult<GroupId> {
        self.subnetwork(subnet)?;
        let gid = self.create_neuron_group(neurons, label)?;
        self.add_group_to_subnetwork(subnet, gid)?;
        Ok(gid)
    }

    /// Connect two of `subnet`'s neuron groups with a new synapse group
    ///
    /// The group is labeled by layer number ("Weights 1 → 2", or
    /// "Weights 2 ↻" for a self-loop) and is kept alive when empty since
    /// routing may drain it.
    pub fn connect_neuron_groups(
        &mut self,
        subnet: GroupId,
        source: GroupId,
        target: GroupId,
        strategy: &dyn ConnectionStrategy,
    ) -> NetworkResult<GroupId> {
        self.connect_with_label(subnet, source, target, strategy, None)
    }

    /// Like [`Network::connect_neuron_groups`] with an explicit label
    pub fn connect_neuron_groups_labeled(
        &mut self,
        subnet: GroupId,
        source: GroupId,
        target: GroupId,
        strategy: &dyn ConnectionStrategy,
        label: impl Into<String>,
    ) -> NetworkResult<GroupId> {
        self.connect_with_label(subnet, source, target, strategy, Some(label.into()))
    }

    fn connect_with_label(
        &mut self,
        subnet: GroupId,
        source: GroupId,
        target: GroupId,
        strategy: &dyn ConnectionStrategy,
        label: Option<String>,
    ) -> NetworkResult<GroupId> {
        let s = self.subnetwork(subnet)?;
        let src_n = s.layer_number(source).ok_or(NetworkError::NotAChild {
            parent: subnet,
            child: source,
        })?;
        let tgt_n = s.layer_number(target).ok_or(NetworkError::NotAChild {
            parent: subnet,
            child: target,
        })?;
        let label = match label {
            Some(label) => label,
            None if source == target => format!("Weights {src_n} \u{21BB}"),
            None => format!("Weights {src_n} \u{2192} {tgt_n}"),
        };

        let sources = self.neuron_group(source)?.members().to_vec();
        let targets = self.neuron_group(target)?.members().to_vec();
        let synapses = strategy.connect(&sources, &targets, &mut self.rng);
        debug!(
            strategy = strategy.name(),
            count = synapses.len(),
            label = %label,
            "Connecting neuron groups"
        );

        let sg = self.create_synapse_group(label);
        self.set_delete_when_empty(sg, false)?;
        self.add_group_to_subnetwork(subnet, sg)?;
        for synapse in synapses {
            self.insert_synapse(synapse, Some(sg))?;
        }
        if !self.in_step {
            self.reconcile_routing();
        }
        Ok(sg)
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn subnetwork_neuron_group(&self, subnet: GroupId, index: usize) -> NetworkResult<GroupId> {
        let s = self.subnetwork(subnet)?;
        s.neuron_groups
            .get(index)
            .copied()
            .ok_or(NetworkError::IndexOutOfRange {
                what: "subnetwork neuron groups",
                index,
                len: s.neuron_groups.len(),
            })
    }

    pub fn subnetwork_synapse_group(&self, subnet: GroupId, index: usize) -> NetworkResult<GroupId> {
        let s = self.subnetwork(subnet)?;
        s.synapse_groups
            .get(index)
            .copied()
            .ok_or(NetworkError::IndexOutOfRange {
                what: "subnetwork synapse groups",
                index,
                len: s.synapse_groups.len(),
            })
    }

    /// Every neuron of every neuron group, layer by layer
    pub fn subnetwork_neurons(&self, subnet: GroupId) -> NetworkResult<Vec<NeuronId>> {
        let s = self.subnetwork(subnet)?;
        let mut out = Vec::new();
        for g in &s.neuron_groups {
            out.extend_from_slice(self.neuron_group(*g)?.members());
        }
        Ok(out)
    }

    /// Every synapse of every synapse group, group by group
    pub fn subnetwork_synapses(&self, subnet: GroupId) -> NetworkResult<Vec<SynapseId>> {
        let s = self.subnetwork(subnet)?;
        let mut out = Vec::new();
        for g in &s.synapse_groups {
            out.extend(self.synapse_group(*g)?.members());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{AllToAll, OneToOne};

    fn layer(n: usize) -> Vec<Neuron> {
        (0..n).map(|i| Neuron::default().at(i as f64, 0.0)).collect()
    }

    #[test]
    fn test_router_resolution_order() {
        let (a, b, c) = (GroupId(1), GroupId(2), GroupId(3));
        let (g, h) = (GroupId(10), GroupId(11));
        let mut router = SynapseRouter::default();
        assert_eq!(router.resolve(Some(a), Some(b)), None);

        router.attach_target(b, h);
        assert_eq!(router.resolve(Some(a), Some(b)), Some(h));

        router.attach_source(a, g);
        assert_eq!(router.resolve(Some(a), Some(b)), Some(g));

        router.attach_target(b, g);
        assert_eq!(router.resolve(Some(a), Some(b)), Some(g));
        assert_eq!(router.resolve(Some(c), None), None);
    }

    #[test]
    fn test_connect_labels_and_lifecycle() {
        let mut net = Network::seeded(5);
        let subnet = net.create_subnetwork("net", SubnetworkKind::Plain);
        let a = net.add_neuron_group_to_subnetwork(subnet, layer(2), "a").unwrap();
        let b = net.add_neuron_group_to_subnetwork(subnet, layer(3), "b").unwrap();

        let ab = net
            .connect_neuron_groups(subnet, a, b, &AllToAll::default())
            .unwrap();
        let bb = net
            .connect_neuron_groups(subnet, b, b, &OneToOne::default())
            .unwrap();

        assert_eq!(net.label(ab).unwrap(), "Weights 1 \u{2192} 2");
        assert_eq!(net.label(bb).unwrap(), "Weights 2 \u{21BB}");
        assert_eq!(net.synapse_group(ab).unwrap().len(), 6);
        assert_eq!(net.synapse_group(bb).unwrap().len(), 3);
        assert!(!net.group(ab).unwrap().meta().delete_when_empty);
        assert_eq!(net.subnetwork_synapses(subnet).unwrap().len(), 9);
        assert_eq!(net.subnetwork_neurons(subnet).unwrap().len(), 5);
    }

    #[test]
    fn test_connect_with_explicit_label() {
        let mut net = Network::seeded(5);
        let subnet = net.create_subnetwork("net", SubnetworkKind::Plain);
        let a = net.add_neuron_group_to_subnetwork(subnet, layer(2), "a").unwrap();
        let b = net.add_neuron_group_to_subnetwork(subnet, layer(2), "b").unwrap();
        let sg = net
            .connect_neuron_groups_labeled(subnet, a, b, &OneToOne::default(), "lateral")
            .unwrap();
        assert_eq!(net.label(sg).unwrap(), "lateral");
        assert_eq!(net.synapse_group(sg).unwrap().len(), 2);
    }

    #[test]
    fn test_children_leave_top_level() {
        let mut net = Network::seeded(5);
        let subnet = net.create_subnetwork("net", SubnetworkKind::Plain);
        let a = net.add_neuron_group_to_subnetwork(subnet, layer(2), "a").unwrap();
        assert_eq!(net.top_level_groups(), &[subnet]);
        assert_eq!(net.parent_group(a).unwrap(), Some(subnet));
        assert!(matches!(
            net.add_group_to_subnetwork(subnet, a),
            Err(NetworkError::AlreadyParented { .. })
        ));
    }

    #[test]
    fn test_connect_requires_membership() {
        let mut net = Network::seeded(5);
        let subnet = net.create_subnetwork("net", SubnetworkKind::Plain);
        let a = net.add_neuron_group_to_subnetwork(subnet, layer(2), "a").unwrap();
        let outside = net.create_neuron_group(layer(2), "outside").unwrap();
        let err = net
            .connect_neuron_groups(subnet, a, outside, &AllToAll::default())
            .unwrap_err();
        assert!(matches!(err, NetworkError::NotAChild { .. }));
        assert_eq!(net.synapse_count(), 0);
    }

    #[test]
    fn test_index_accessors() {
        let mut net = Network::seeded(5);
        let subnet = net.create_subnetwork("net", SubnetworkKind::Plain);
        let a = net.add_neuron_group_to_subnetwork(subnet, layer(1), "a").unwrap();
        assert_eq!(net.subnetwork_neuron_group(subnet, 0).unwrap(), a);
        assert!(net.subnetwork_neuron_group(subnet, 1).is_err());
        assert!(net.subnetwork_synapse_group(subnet, 0).is_err());
    }
}
