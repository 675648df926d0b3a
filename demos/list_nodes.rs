//! Enumerate the nodes of a simulated device rig with their status and
//! tracking support.

use tracknet_rs::sim::{SimNetwork, SimNodeKind, SimTaskConstructor};
use tracknet_rs::{DeviceNetwork, NodeStatus, TaskConstructor};

fn main() {
    env_logger::init();

    let network = SimNetwork::new();
    let socket = network.attach_node(SimNodeKind::Socket);
    let bracer = network.attach_node(SimNodeKind::Tracker);
    let hmd = network.attach_node(SimNodeKind::Tracker);
    network.set_node_status(bracer, NodeStatus::Busy);

    let constructor = SimTaskConstructor::new();
    let tracking_nodes = constructor.find_supported_nodes(&network);

    let nodes = [socket, bracer, hmd];
    println!("Update id: {}", network.update_id());
    println!("Found {} node(s):", nodes.len());
    for node in nodes {
        let tracking = if tracking_nodes.contains(&node) {
            "yes"
        } else {
            "no"
        };
        println!(
            "  node {}  status: {:?}  tracking: {}",
            node,
            network.node_status(node),
            tracking
        );
    }
}
