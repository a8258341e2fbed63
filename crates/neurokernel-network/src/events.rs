// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Change notifications
//!
//! The network queues events as structure changes; observers drain them with
//! [`crate::Network::drain_events`].

use neurokernel_neural::{GroupId, NeuronId, SynapseId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NetworkEvent {
    NeuronAdded(NeuronId),
    NeuronRemoved(NeuronId),
    SynapseAdded(SynapseId),
    SynapseRemoved(SynapseId),
    GroupAdded(GroupId),
    GroupRemoved(GroupId),
    GroupChanged { group: GroupId, change: GroupChange },
    LabelChanged {
        group: GroupId,
        old: String,
        new: String,
    },
}

/// What changed inside a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupChange {
    SynapseAddedToGroup(SynapseId),
    SynapseRemovedFromGroup(SynapseId),
    NeuronRemovedFromGroup(NeuronId),
    ChildAdded(GroupId),
    ChildRemoved(GroupId),
    ParametersChanged,
}

impl NetworkEvent {
    /// True for a "synapse added to group" notification about `synapse`
    pub fn is_synapse_added_to_group(&self, synapse: SynapseId) -> bool {
        matches!(
            self,
            NetworkEvent::GroupChanged {
                change: GroupChange::SynapseAddedToGroup(s),
                ..
            } if *s == synapse
        )
    }
}
