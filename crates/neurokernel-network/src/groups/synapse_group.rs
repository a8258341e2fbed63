// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synapse group: a set of synapses treated as one unit

use std::collections::BTreeSet;

use neurokernel_neural::{GroupId, SynapseId};

use super::GroupMeta;

#[derive(Debug, Clone)]
pub struct SynapseGroup {
    pub meta: GroupMeta,
    members: BTreeSet<SynapseId>,
}

impl SynapseGroup {
    pub fn new(id: GroupId, label: impl Into<String>) -> Self {
        Self {
            meta: GroupMeta::new(id, label),
            members: BTreeSet::new(),
        }
    }

    /// Add a member; false if it was already present
    pub fn insert(&mut self, synapse: SynapseId) -> bool {
        self.members.insert(synapse)
    }

    /// Remove a member; false if it was absent
    pub fn remove(&mut self, synapse: SynapseId) -> bool {
        self.members.remove(&synapse)
    }

    pub fn contains(&self, synapse: SynapseId) -> bool {
        self.members.contains(&synapse)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = SynapseId> + '_ {
        self.members.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut group = SynapseGroup::new(GroupId(1), "weights");
        assert!(group.insert(SynapseId(4)));
        assert!(!group.insert(SynapseId(4)));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_absent_remove_is_noop() {
        let mut group = SynapseGroup::new(GroupId(1), "weights");
        group.insert(SynapseId(4));
        assert!(!group.remove(SynapseId(5)));
        assert_eq!(group.len(), 1);
        assert!(group.remove(SynapseId(4)));
        assert!(group.is_empty());
    }

    #[test]
    fn test_new_group_deletes_when_empty_by_default() {
        let group = SynapseGroup::new(GroupId(2), "g");
        assert!(group.meta.delete_when_empty);
        assert!(!group.meta.marked_for_deletion);
        assert_eq!(group.meta.parent, None);
    }
}
