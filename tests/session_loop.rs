//! Session loop behavior against the simulated device network: change-driven
//! selection, task lifecycle and termination.

#![cfg(feature = "sim")]

use std::time::Duration;
use tracknet_rs::sim::{SimNetwork, SimNodeKind, SimTaskConstructor};
use tracknet_rs::{
    DeviceNetwork, Environment, ExtrapolatedState, NodeStatus, Placement, Session, SessionConfig,
};

fn fast_config() -> SessionConfig {
    SessionConfig {
        watch_interval: Duration::ZERO,
        track_interval: Duration::ZERO,
        extrapolation_horizon_s: 0.03,
    }
}

fn test_environment() -> Environment {
    Environment {
        markers: vec![[-0.3, 0.0, -0.3], [0.3, 0.0, -0.3], [0.0, 0.0, 0.4]],
    }
}

fn test_session() -> Session<SimTaskConstructor> {
    Session::with_config(
        SimTaskConstructor::new(),
        test_environment(),
        Placement::default(),
        fast_config(),
    )
}

fn run_collecting(
    session: &mut Session<SimTaskConstructor>,
    network: &SimNetwork,
) -> Vec<ExtrapolatedState> {
    let mut states = Vec::new();
    session.run(network, |state| states.push(state.clone()));
    states
}

#[test]
fn stays_watching_without_capable_nodes() {
    let network = SimNetwork::new();
    network.attach_node(SimNodeKind::Socket);
    network.attach_node(SimNodeKind::Socket);
    network.script_update_ids([2, 3, 4]);

    let mut session = test_session();
    let states = run_collecting(&mut session, &network);

    assert_eq!(network.find_calls(), 3);
    assert_eq!(network.start_calls(), 0);
    assert!(states.is_empty());
}

#[test]
fn unchanged_update_id_makes_no_selection() {
    let network = SimNetwork::new();
    network.attach_node(SimNodeKind::Tracker);
    network.script_update_ids([7, 7, 7, 7]);

    let mut session = test_session();
    session.resume_from(7);
    let states = run_collecting(&mut session, &network);

    assert_eq!(network.find_calls(), 0);
    assert_eq!(network.start_calls(), 0);
    assert!(states.is_empty());
}

#[test]
fn selection_fires_once_per_counter_change() {
    let network = SimNetwork::new();
    network.attach_node(SimNodeKind::Tracker);
    network.finish_tasks_after_polls(0);
    network.script_update_ids([5, 5, 6, 6, 7]);

    let mut session = test_session();
    session.resume_from(5);
    run_collecting(&mut session, &network);

    // Two value changes in the script, so selection and task start fire
    // exactly twice, not once per poll.
    assert_eq!(network.find_calls(), 2);
    assert_eq!(network.start_calls(), 2);
    assert_eq!(network.task_records().len(), 2);
}

#[test]
fn task_start_failure_returns_to_watching() {
    let network = SimNetwork::new();
    network.attach_node(SimNodeKind::Tracker);
    network.fail_task_starts(true);
    network.script_update_ids([1, 2, 2, 2]);

    let mut session = test_session();
    session.resume_from(1);
    let states = run_collecting(&mut session, &network);

    // One attempt at the counter change, no retry on the quiet polls after.
    assert_eq!(network.start_calls(), 1);
    assert!(network.task_records().is_empty());
    assert!(states.is_empty());
}

#[test]
fn finished_task_is_never_queried_again() {
    let network = SimNetwork::new();
    network.attach_node(SimNodeKind::Tracker);
    network.finish_tasks_after_polls(2);
    network.script_update_ids([1, 1, 1]);

    let mut session = test_session();
    let states = run_collecting(&mut session, &network);

    assert_eq!(states.len(), 2);

    let records = network.task_records();
    assert_eq!(records.len(), 1);
    assert!(records[0].finished);
    assert_eq!(records[0].state_queries, 2);
    assert_eq!(records[0].queries_after_finish, 0);
}

#[test]
fn first_idle_tracker_gets_the_task() {
    let network = SimNetwork::new();
    let a = network.attach_node(SimNodeKind::Tracker);
    let b = network.attach_node(SimNodeKind::Tracker);
    network.attach_node(SimNodeKind::Tracker);
    network.set_node_status(a, NodeStatus::Busy);
    network.finish_tasks_after_polls(0);
    network.script_update_ids([9]);

    let mut session = test_session();
    run_collecting(&mut session, &network);

    let records = network.task_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].node, b);
}

#[test]
fn network_death_ends_the_run() {
    let network = SimNetwork::new();
    network.attach_node(SimNodeKind::Tracker);
    network.finish_tasks_after_polls(3);
    network.close_after_tasks(1);

    let mut session = test_session();
    let states = run_collecting(&mut session, &network);

    assert!(!network.is_alive());
    assert_eq!(states.len(), 3);
    assert!(network.task_records()[0].finished);
}

#[test]
fn shutdown_from_outside_ends_the_run() {
    let network = SimNetwork::new();
    network.attach_node(SimNodeKind::Socket);

    let closer = network.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        closer.shut_down();
    });

    let mut session = test_session();
    let states = run_collecting(&mut session, &network);
    handle.join().unwrap();

    assert!(!network.is_alive());
    assert!(states.is_empty());
}

#[test]
fn task_restarts_after_completion_bumps_the_counter() {
    let network = SimNetwork::new();
    network.attach_node(SimNodeKind::Tracker);
    network.finish_tasks_after_polls(1);
    network.close_after_tasks(2);

    let mut session = test_session();
    run_collecting(&mut session, &network);

    // Finishing a task changes the counter, so the session re-selects and
    // runs a second task without any external topology event.
    assert_eq!(network.task_records().len(), 2);
    assert!(network.task_records().iter().all(|r| r.finished));
}
