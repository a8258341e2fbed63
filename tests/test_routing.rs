// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synapse routing across steps

use neurokernel::network::{AllToAll, AttachmentSide, Network, SubnetworkKind};
use neurokernel::neural::{GroupId, Neuron, Synapse, SynapseId};

struct Routed {
    net: Network,
    subnet: GroupId,
    a: GroupId,
    b: GroupId,
    g: GroupId,
}

fn routed() -> Routed {
    let mut net = Network::seeded(41);
    let subnet = net.create_subnetwork("net", SubnetworkKind::Plain);
    let a = net
        .add_neuron_group_to_subnetwork(subnet, vec![Neuron::default(); 3], "A")
        .unwrap();
    let b = net
        .add_neuron_group_to_subnetwork(subnet, vec![Neuron::default(); 2], "B")
        .unwrap();
    let g = net
        .connect_neuron_groups(subnet, a, b, &AllToAll::default())
        .unwrap();
    net.attach_source(subnet, a, g).unwrap();
    net.attach_target(subnet, b, g).unwrap();
    net.drain_events();
    Routed { net, subnet, a, b, g }
}

fn added_to_group_count(net: &mut Network, sid: SynapseId) -> usize {
    net.drain_events()
        .iter()
        .filter(|e| e.is_synapse_added_to_group(sid))
        .count()
}

#[test]
fn test_synapse_from_a_to_b_lands_in_g_once() {
    let Routed { mut net, a, b, g, .. } = routed();
    let src = net.neuron_at(a, 2).unwrap();
    let tgt = net.neuron_at(b, 0).unwrap();

    let sid = net.add_synapse(Synapse::new(src, tgt, 0.3)).unwrap();

    assert_eq!(added_to_group_count(&mut net, sid), 1);
    assert_eq!(net.synapse(sid).unwrap().group(), Some(g));
    assert!(net.synapse_group(g).unwrap().contains(sid));
}

#[test]
fn test_repeated_enable_does_not_duplicate() {
    let Routed {
        mut net,
        subnet,
        a,
        b,
        ..
    } = routed();
    for _ in 0..5 {
        net.enable_routing(subnet).unwrap();
    }
    let src = net.neuron_at(a, 0).unwrap();
    let tgt = net.neuron_at(b, 1).unwrap();

    let sid = net.add_synapse(Synapse::new(src, tgt, 0.3)).unwrap();
    assert_eq!(added_to_group_count(&mut net, sid), 1);
}

#[test]
fn test_unattached_groups_untouched() {
    let Routed { mut net, .. } = routed();
    let x = net.create_neuron_group(vec![Neuron::default(); 2], "X").unwrap();
    let src = net.neuron_at(x, 0).unwrap();
    let tgt = net.neuron_at(x, 1).unwrap();

    let sid = net.add_synapse(Synapse::new(src, tgt, 0.3)).unwrap();

    assert_eq!(net.synapse(sid).unwrap().group(), None);
    assert_eq!(added_to_group_count(&mut net, sid), 0);
}

#[test]
fn test_source_side_wins_over_target_side() {
    let Routed {
        mut net,
        subnet,
        a,
        b,
        g,
    } = routed();
    let h = net.create_synapse_group("H");
    net.add_group_to_subnetwork(subnet, h).unwrap();
    net.attach_target(subnet, b, h).unwrap();

    let src = net.neuron_at(a, 0).unwrap();
    let tgt = net.neuron_at(b, 0).unwrap();
    let sid = net.add_synapse(Synapse::new(src, tgt, 0.3)).unwrap();
    assert_eq!(net.synapse(sid).unwrap().group(), Some(g));

    assert!(net.detach(subnet, a, AttachmentSide::Source).unwrap());
    let sid = net.add_synapse(Synapse::new(src, tgt, 0.3)).unwrap();
    assert_eq!(net.synapse(sid).unwrap().group(), Some(h));
}

#[test]
fn test_disabled_routing_leaves_synapses_loose() {
    let Routed {
        mut net, subnet, a, ..
    } = routed();
    assert!(net.disable_routing(subnet));
    let src = net.neuron_at(a, 0).unwrap();
    let sid = net.add_synapse(Synapse::new(src, src, 0.3)).unwrap();
    assert_eq!(net.synapse(sid).unwrap().group(), None);
}

#[test]
fn test_routing_survives_steps() {
    let Routed { mut net, a, g, .. } = routed();
    net.run(3);
    let src = net.neuron_at(a, 1).unwrap();
    let sid = net.add_synapse(Synapse::new(src, src, 0.3)).unwrap();
    net.update();
    assert_eq!(net.synapse(sid).unwrap().group(), Some(g));
    assert_eq!(added_to_group_count(&mut net, sid), 1);
}
