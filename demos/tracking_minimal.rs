//! Minimal tracking session over a simulated device rig: find an idle
//! tracking node, run a task on it and print extrapolated state until the
//! network closes.
//!
//! Usage: tracking_minimal [environment-code placement-code]
//!
//! With no arguments the codes come from `TRACKNET_STORAGE_DIR` (files
//! `default/environment` and `default/placement`) when that variable is set,
//! otherwise from built-in defaults.

use std::process;
use tracknet_rs::sim::{SimNetwork, SimNodeKind, SimTaskConstructor};
use tracknet_rs::{
    decode_environment, decode_placement, LocalStorage, Session, Storage,
};

const DEFAULT_ENVIRONMENT_CODE: &str =
    "AQEEAJqZmb4AAAAAmpmZvpqZmT4AAAAAmpmZvpqZmT4AAAAAmpmZPpqZmb4AAAAAmpmZPg";
const DEFAULT_PLACEMENT_CODE: &str = "AQIBAAAAAADNzEy9AAAAAAAAAAAAAAAAAAAAAAAAgD8";

fn codes_from_storage(storage: &LocalStorage) -> (String, String) {
    let environment = match storage.read("environment", "default") {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Failed to read environment from storage: {}", e);
            process::exit(1);
        }
    };
    let placement = match storage.read("placement", "default") {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Failed to read placement from storage: {}", e);
            process::exit(1);
        }
    };
    (environment, placement)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (environment_code, placement_code) = match args.len() {
        0 => match LocalStorage::from_env() {
            Some(storage) => codes_from_storage(&storage),
            None => (
                DEFAULT_ENVIRONMENT_CODE.to_string(),
                DEFAULT_PLACEMENT_CODE.to_string(),
            ),
        },
        2 => (args[0].clone(), args[1].clone()),
        _ => {
            eprintln!("usage: tracking_minimal [environment-code placement-code]");
            process::exit(1);
        }
    };

    let environment = match decode_environment(&environment_code) {
        Ok(environment) => environment,
        Err(e) => {
            eprintln!("Failed to decode environment: {}", e);
            process::exit(1);
        }
    };
    let placement = match decode_placement(&placement_code) {
        Ok(placement) => placement,
        Err(e) => {
            eprintln!("Failed to decode placement: {}", e);
            process::exit(1);
        }
    };

    // A small rig: one plain socket and two trackers. The network closes on
    // its own after two tasks have run to completion.
    let network = SimNetwork::new();
    network.attach_node(SimNodeKind::Socket);
    network.attach_node(SimNodeKind::Tracker);
    network.attach_node(SimNodeKind::Tracker);
    network.close_after_tasks(2);

    println!("Device network created");

    let mut session = Session::new(SimTaskConstructor::new(), environment, placement);
    session.run(&network, |state| {
        println!("State:");
        println!(
            "  Position: [{:.3}, {:.3}, {:.3}] m",
            state.pose.position[0], state.pose.position[1], state.pose.position[2]
        );
        println!(
            "  Rotation: [{:.3}, {:.3}, {:.3}, {:.3}]",
            state.pose.rotation[0],
            state.pose.rotation[1],
            state.pose.rotation[2],
            state.pose.rotation[3]
        );
        println!(
            "  Stability: {:?} ({:.2})",
            state.stability.stage, state.stability.value
        );
        println!(
            "  Velocity: [{:.3}, {:.3}, {:.3}] m/s",
            state.velocity[0], state.velocity[1], state.velocity[2]
        );
        println!(
            "  Angular velocity: [{:.3}, {:.3}, {:.3}] rad/s",
            state.local_angular_velocity[0],
            state.local_angular_velocity[1],
            state.local_angular_velocity[2]
        );
        println!();
    });

    println!("Device network closed");
}
