// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synapse routing
//!
//! A subnetwork with routing enabled absorbs newly created synapses into the
//! synapse group its routing table names for the synapse's endpoint groups.
//! New synapses are queued as they are created and reconciled once the
//! current step finishes (or immediately outside a step), so membership is
//! never mutated while a scope is being updated.
//!
//! Enabling is idempotent: a subnetwork is registered at most once, and each
//! synapse is moved and announced at most once.

use neurokernel_neural::{GroupId, SynapseId};
use tracing::debug;

use crate::network::Network;
use crate::types::{NetworkError, NetworkResult};

/// Which endpoint of a synapse an attachment matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentSide {
    Source,
    Target,
}

impl Network {
    // ========================================================================
    // Configuration
    // ========================================================================

    /// Route synapses leaving `neuron_group` into `synapse_group`
    pub fn attach_source(
        &mut self,
        subnet: GroupId,
        neuron_group: GroupId,
        synapse_group: GroupId,
    ) -> NetworkResult<()> {
        self.attach(subnet, neuron_group, synapse_group, AttachmentSide::Source)
    }

    /// Route synapses entering `neuron_group` into `synapse_group`
    pub fn attach_target(
        &mut self,
        subnet: GroupId,
        neuron_group: GroupId,
        synapse_group: GroupId,
    ) -> NetworkResult<()> {
        self.attach(subnet, neuron_group, synapse_group, AttachmentSide::Target)
    }

    /// Attach `neuron_group` on `side`; also enables routing
    ///
    /// The synapse group is kept alive when empty since routing fills it.
    pub fn attach(
        &mut self,
        subnet: GroupId,
        neuron_group: GroupId,
        synapse_group: GroupId,
        side: AttachmentSide,
    ) -> NetworkResult<()> {
        self.neuron_group(neuron_group)?;
        self.synapse_group(synapse_group)?;
        let s = self.subnetwork(subnet)?;
        for child in [neuron_group, synapse_group] {
            if !s.contains(child) {
                return Err(NetworkError::NotAChild { parent: subnet, child });
            }
        }

        self.set_delete_when_empty(synapse_group, false)?;
        let router = &mut self.subnetwork_mut(subnet)?.router;
        match side {
            AttachmentSide::Source => router.attach_source(neuron_group, synapse_group),
            AttachmentSide::Target => router.attach_target(neuron_group, synapse_group),
        }
        debug!(
            subnet = %subnet,
            neuron_group = %neuron_group,
            synapse_group = %synapse_group,
            side = ?side,
            "Attached routing"
        );
        self.enable_routing(subnet)?;
        Ok(())
    }

    /// Remove an attachment; false if there was none
    pub fn detach(
        &mut self,
        subnet: GroupId,
        neuron_group: GroupId,
        side: AttachmentSide,
    ) -> NetworkResult<bool> {
        let router = &mut self.subnetwork_mut(subnet)?.router;
        Ok(match side {
            AttachmentSide::Source => router.detach_source(neuron_group),
            AttachmentSide::Target => router.detach_target(neuron_group),
        })
    }

    /// Start routing for `subnet`; false if it was already enabled
    pub fn enable_routing(&mut self, subnet: GroupId) -> NetworkResult<bool> {
        self.subnetwork_mut(subnet)?.router.set_enabled(true);
        if self.routing_subscribers.contains(&subnet) {
            return Ok(false);
        }
        self.routing_subscribers.push(subnet);
        debug!(subnet = %subnet, "Routing enabled");
        Ok(true)
    }

    /// Stop routing for `subnet`; false if it was not enabled
    pub fn disable_routing(&mut self, subnet: GroupId) -> bool {
        if let Ok(s) = self.subnetwork_mut(subnet) {
            s.router.set_enabled(false);
        }
        let before = self.routing_subscribers.len();
        self.routing_subscribers.retain(|g| *g != subnet);
        let removed = before != self.routing_subscribers.len();
        if removed {
            debug!(subnet = %subnet, "Routing disabled");
        }
        removed
    }

    pub fn is_routing_enabled(&self, subnet: GroupId) -> bool {
        self.routing_subscribers.contains(&subnet)
    }

    /// Subnetworks with routing enabled, in registration order
    pub fn routing_subscribers(&self) -> &[GroupId] {
        &self.routing_subscribers
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Route every queued synapse; the first subscriber that resolves wins
    pub(crate) fn reconcile_routing(&mut self) {
        let pending = std::mem::take(&mut self.pending_routing);
        if self.routing_subscribers.is_empty() {
            return;
        }
        for sid in pending {
            if let Some(destination) = self.resolve_destination(sid) {
                self.route_synapse(sid, destination);
            }
        }
    }

    fn resolve_destination(&self, sid: SynapseId) -> Option<GroupId> {
        let synapse = self.synapses.get(&sid)?;
        let source_group = self.neurons.get(&synapse.source())?.group();
        let target_group = self.neurons.get(&synapse.target())?.group();
        self.routing_subscribers.iter().find_map(|subnet| {
            self.subnetwork(*subnet)
                .ok()
                .and_then(|s| s.router.resolve(source_group, target_group))
                .filter(|sg| self.synapse_group(*sg).is_ok())
        })
    }

    fn route_synapse(&mut self, sid: SynapseId, destination: GroupId) {
        match self.add_synapse_to_group(sid, destination) {
            Ok(true) => {
                debug!(synapse = %sid, group = %destination, "Routed synapse");
            }
            Ok(false) => {}
            Err(e) => {
                debug!(synapse = %sid, group = %destination, error = %e, "Routing skipped");
            }
        }
    }
}
