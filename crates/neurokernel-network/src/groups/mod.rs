// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Group containers
//!
//! Every group carries a [`GroupMeta`] (identity, label, parent, lifecycle
//! flags). Parent/child links are ids resolved through the owning
//! [`crate::Network`], never direct references.

pub mod neuron_group;
pub mod subnetwork;
pub mod synapse_group;

pub use neuron_group::{NeuronGroup, NeuronGroupKind, WinnerTakeAllParams};
pub use subnetwork::{SimpleRecurrentLayers, Subnetwork, SubnetworkKind, SynapseRouter};
pub use synapse_group::SynapseGroup;

use neurokernel_neural::GroupId;
use serde::{Deserialize, Serialize};

/// State shared by all group kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMeta {
    pub id: GroupId,
    pub label: String,
    pub parent: Option<GroupId>,
    /// Owner deletes the group as soon as it becomes empty
    pub delete_when_empty: bool,
    /// Set once deletion has begun
    pub marked_for_deletion: bool,
}

impl GroupMeta {
    pub fn new(id: GroupId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            parent: None,
            delete_when_empty: true,
            marked_for_deletion: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Group {
    Neuron(NeuronGroup),
    Synapse(SynapseGroup),
    Subnetwork(Subnetwork),
}

impl Group {
    pub fn meta(&self) -> &GroupMeta {
        match self {
            Group::Neuron(g) => &g.meta,
            Group::Synapse(g) => &g.meta,
            Group::Subnetwork(g) => &g.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut GroupMeta {
        match self {
            Group::Neuron(g) => &mut g.meta,
            Group::Synapse(g) => &mut g.meta,
            Group::Subnetwork(g) => &mut g.meta,
        }
    }

    pub fn id(&self) -> GroupId {
        self.meta().id
    }

    pub fn label(&self) -> &str {
        &self.meta().label
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Group::Neuron(_) => "neuron group",
            Group::Synapse(_) => "synapse group",
            Group::Subnetwork(_) => "subnetwork",
        }
    }

    pub fn as_neuron_group(&self) -> Option<&NeuronGroup> {
        match self {
            Group::Neuron(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_synapse_group(&self) -> Option<&SynapseGroup> {
        match self {
            Group::Synapse(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_subnetwork(&self) -> Option<&Subnetwork> {
        match self {
            Group::Subnetwork(g) => Some(g),
            _ => None,
        }
    }
}
