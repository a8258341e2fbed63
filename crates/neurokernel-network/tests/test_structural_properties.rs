// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Structural invariants under random edit sequences

use neurokernel_network::{AllToAll, Group, Network, SubnetworkKind};
use neurokernel_neural::{Neuron, NeuronId, Synapse};
use proptest::prelude::*;

/// Every synapse's recorded group lists it, and no group lists a stranger
fn assert_membership_consistent(net: &Network) {
    for (sid, synapse) in net.synapses() {
        if let Some(gid) = synapse.group() {
            let group = net.synapse_group(gid).expect("recorded group exists");
            assert!(group.contains(sid));
        }
    }
    for group in net.groups() {
        if let Group::Synapse(g) = group {
            for sid in g.members() {
                assert_eq!(net.synapse(sid).unwrap().group(), Some(g.meta.id));
            }
        }
    }
}

/// Fan lists only name live synapses with matching endpoints
fn assert_no_dangling(net: &Network) {
    for (nid, neuron) in net.neurons() {
        for sid in neuron.fan_in() {
            assert_eq!(net.synapse(*sid).unwrap().target(), nid);
        }
        for sid in neuron.fan_out() {
            assert_eq!(net.synapse(*sid).unwrap().source(), nid);
        }
    }
    for (_, synapse) in net.synapses() {
        assert!(net.neuron(synapse.source()).is_ok());
        assert!(net.neuron(synapse.target()).is_ok());
    }
}

fn build(seed: u64) -> (Network, Vec<NeuronId>) {
    let mut net = Network::seeded(seed);
    let subnet = net.create_subnetwork("net", SubnetworkKind::Plain);
    let a = net
        .add_neuron_group_to_subnetwork(subnet, vec![Neuron::default(); 4], "a")
        .unwrap();
    let b = net
        .add_neuron_group_to_subnetwork(subnet, vec![Neuron::default(); 4], "b")
        .unwrap();
    let w = net
        .connect_neuron_groups(subnet, a, b, &AllToAll::default())
        .unwrap();
    net.attach_source(subnet, a, w).unwrap();

    let mut ids = net.subnetwork_neurons(subnet).unwrap();
    for _ in 0..4 {
        ids.push(net.add_neuron(Neuron::default()));
    }
    (net, ids)
}

proptest! {
    #[test]
    fn prop_routing_keeps_membership_consistent(
        edges in prop::collection::vec((0usize..12, 0usize..12), 0..40)
    ) {
        let (mut net, ids) = build(1);
        for (i, (s, t)) in edges.into_iter().enumerate() {
            net.add_synapse(Synapse::new(ids[s], ids[t], 0.1)).unwrap();
            if i % 5 == 0 {
                net.update();
            }
        }
        assert_membership_consistent(&net);
    }

    #[test]
    fn prop_deletion_leaves_no_dangling_references(
        edges in prop::collection::vec((0usize..12, 0usize..12), 0..40),
        doomed in prop::collection::vec(0usize..12, 0..8)
    ) {
        let (mut net, ids) = build(2);
        for (s, t) in edges {
            net.add_synapse(Synapse::new(ids[s], ids[t], 0.1)).unwrap();
        }
        for d in doomed {
            net.delete_neuron(ids[d]);
        }
        assert_no_dangling(&net);
        assert_membership_consistent(&net);
        net.update();
    }
}
