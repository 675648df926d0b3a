use crate::network::{DeviceNetwork, NodeHandle, NodeStatus, UpdateId};
use crate::pose::{Environment, ExtrapolatedState, Placement};
use crate::tracking::{TaskConstructor, TrackingTask};
use log::{info, warn};
use std::thread;
use std::time::Duration;

/// First idle tracking-capable node, in the constructor's enumeration order.
///
/// Node statuses are read after enumeration, so a status may change between
/// the two steps; the caller sees that as a failed task start on the next
/// tick rather than as an error here.
pub fn select_idle_node<C: TaskConstructor>(
    network: &C::Network,
    constructor: &C,
) -> Option<NodeHandle> {
    let nodes = constructor.find_supported_nodes(network);
    if nodes.is_empty() {
        info!("no nodes supporting tracking tasks found");
        return None;
    }

    for node in &nodes {
        if network.node_status(*node) == NodeStatus::Idle {
            return Some(*node);
        }
    }

    info!("no idle tracking nodes found");
    None
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Rest between change-counter polls while no task is running.
    pub watch_interval: Duration,
    /// Cadence of state queries while a task is running.
    pub track_interval: Duration,
    /// Forward-extrapolation horizon for state queries, in seconds.
    pub extrapolation_horizon_s: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            watch_interval: Duration::from_millis(10),
            track_interval: Duration::from_millis(500),
            extrapolation_horizon_s: 0.03,
        }
    }
}

/// Drives tracking-task lifecycle on a device network: watches the network's
/// update counter, picks an idle capable node whenever the counter moves,
/// starts a task on it and polls extrapolated state until the task ends.
///
/// The session borrows the network only inside [`Session::run`], so one
/// session value can be reused across networks.
pub struct Session<C: TaskConstructor> {
    constructor: C,
    environment: Environment,
    placement: Placement,
    config: SessionConfig,
    last_update_id: Option<UpdateId>,
}

impl<C: TaskConstructor> Session<C> {
    pub fn new(constructor: C, environment: Environment, placement: Placement) -> Self {
        Self::with_config(constructor, environment, placement, SessionConfig::default())
    }

    pub fn with_config(
        constructor: C,
        environment: Environment,
        placement: Placement,
        config: SessionConfig,
    ) -> Self {
        Self {
            constructor,
            environment,
            placement,
            config,
            last_update_id: None,
        }
    }

    /// Install a counter baseline so the session reacts only to changes after
    /// `update_id`. A fresh session treats its first observation as a change.
    pub fn resume_from(&mut self, update_id: UpdateId) {
        self.last_update_id = Some(update_id);
    }

    /// Run until the network dies. Selection and task-start failures keep the
    /// session watching; every extrapolated state is handed to `on_state`.
    pub fn run<F>(&mut self, network: &C::Network, mut on_state: F)
    where
        F: FnMut(&ExtrapolatedState),
    {
        while network.is_alive() {
            let current = network.update_id();

            if self.last_update_id != Some(current) {
                self.last_update_id = Some(current);
                info!("device network changed, update id {current}");

                if let Some(node) = select_idle_node(network, &self.constructor) {
                    match self.constructor.start_task(network, node, &self.environment) {
                        Ok(task) => self.track(network, &task, &mut on_state),
                        Err(e) => warn!("failed to start tracking task on node {node}: {e}"),
                    }
                }
            }

            thread::sleep(self.config.watch_interval);
        }
    }

    fn track<F>(&self, network: &C::Network, task: &C::Task, on_state: &mut F)
    where
        F: FnMut(&ExtrapolatedState),
    {
        while network.is_alive() {
            if task.is_finished() {
                info!("tracking task finished");
                return;
            }

            let state = task.extrapolated_state(&self.placement, self.config.extrapolation_horizon_s);
            on_state(&state);

            thread::sleep(self.config.track_interval);
        }
    }
}
