//! In-process device network backend. Stands in for real hardware in demos
//! and tests: nodes attach and detach, tasks flip node status and bump the
//! network update counter, and state queries synthesize a deterministic
//! circular motion.

use crate::error::{Error, Result};
use crate::network::{DeviceNetwork, NodeHandle, NodeStatus, UpdateId};
use crate::pose::{
    Environment, ExtrapolatedState, Placement, Pose, Stability, StabilityStage,
};
use crate::tracking::{TaskConstructor, TrackingTask};
use log::debug;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

const ORBIT_RADIUS_M: f32 = 1.2;
const ORBIT_RATE_RAD_S: f32 = 0.4;
const RIG_HEIGHT_M: f32 = 1.75;
/// Simulated time advanced per state query.
const SIM_TICK_S: f32 = 0.5;
/// State queries before the solution settles into full 6DOF.
const STABILITY_WARMUP_POLLS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimNodeKind {
    /// Optical-inertial tracker; supports tracking tasks.
    Tracker,
    /// Plain radio socket; carries no tracking hardware.
    Socket,
}

struct SimNode {
    kind: SimNodeKind,
    status: NodeStatus,
}

/// Bookkeeping for one started task, readable by tests after the task ended.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub node: NodeHandle,
    /// `is_finished` polls answered `false` before the task completes.
    pub polls_before_finish: u32,
    pub finish_polls: u32,
    pub state_queries: u32,
    /// Queries of any kind made after the task reported finished.
    pub queries_after_finish: u32,
    pub finished: bool,
}

impl TaskRecord {
    fn new(node: NodeHandle, polls_before_finish: u32) -> Self {
        Self {
            node,
            polls_before_finish,
            finish_polls: 0,
            state_queries: 0,
            queries_after_finish: 0,
            finished: false,
        }
    }
}

struct Inner {
    alive: bool,
    update_id: UpdateId,
    next_node: u32,
    nodes: Vec<(NodeHandle, SimNode)>,
    scripted: Option<VecDeque<UpdateId>>,
    fail_starts: bool,
    finish_after: u32,
    close_after: Option<u32>,
    completed: u32,
    find_calls: u32,
    start_calls: u32,
    tasks: Vec<TaskRecord>,
}

/// Simulated device network. Cheap to clone; clones share the same rig.
#[derive(Clone)]
pub struct SimNetwork {
    inner: Arc<Mutex<Inner>>,
}

impl SimNetwork {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                alive: true,
                update_id: 1,
                next_node: 1,
                nodes: Vec::new(),
                scripted: None,
                fail_starts: false,
                finish_after: 8,
                close_after: None,
                completed: 0,
                find_calls: 0,
                start_calls: 0,
                tasks: Vec::new(),
            })),
        }
    }

    pub fn attach_node(&self, kind: SimNodeKind) -> NodeHandle {
        let mut inner = self.inner.lock();
        let handle = NodeHandle::from_raw(inner.next_node);
        inner.next_node += 1;
        inner.nodes.push((
            handle,
            SimNode {
                kind,
                status: NodeStatus::Idle,
            },
        ));
        inner.update_id = inner.update_id.wrapping_add(1);
        handle
    }

    /// Detach a node from the rig; its handle goes stale.
    pub fn detach_node(&self, node: NodeHandle) {
        let mut inner = self.inner.lock();
        if let Some((_, n)) = inner.nodes.iter_mut().find(|(h, _)| *h == node) {
            n.status = NodeStatus::Invalid;
            inner.update_id = inner.update_id.wrapping_add(1);
        }
    }

    pub fn set_node_status(&self, node: NodeHandle, status: NodeStatus) {
        let mut inner = self.inner.lock();
        if let Some((_, n)) = inner.nodes.iter_mut().find(|(h, _)| *h == node) {
            n.status = status;
            inner.update_id = inner.update_id.wrapping_add(1);
        }
    }

    pub fn shut_down(&self) {
        self.inner.lock().alive = false;
    }

    /// Replace the change counter with a fixed per-poll script. The network
    /// dies once the script runs out, which bounds test loops.
    pub fn script_update_ids<I>(&self, ids: I)
    where
        I: IntoIterator<Item = UpdateId>,
    {
        self.inner.lock().scripted = Some(ids.into_iter().collect());
    }

    /// Make every subsequent task start fail.
    pub fn fail_task_starts(&self, fail: bool) {
        self.inner.lock().fail_starts = fail;
    }

    /// Shut the network down after `count` tasks have completed.
    pub fn close_after_tasks(&self, count: u32) {
        self.inner.lock().close_after = Some(count);
    }

    /// How many `is_finished` polls a task answers `false` before completing.
    pub fn finish_tasks_after_polls(&self, polls: u32) {
        self.inner.lock().finish_after = polls;
    }

    pub fn find_calls(&self) -> u32 {
        self.inner.lock().find_calls
    }

    pub fn start_calls(&self) -> u32 {
        self.inner.lock().start_calls
    }

    pub fn task_records(&self) -> Vec<TaskRecord> {
        self.inner.lock().tasks.clone()
    }
}

impl Default for SimNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceNetwork for SimNetwork {
    fn is_alive(&self) -> bool {
        let inner = self.inner.lock();
        match &inner.scripted {
            Some(script) => inner.alive && !script.is_empty(),
            None => inner.alive,
        }
    }

    fn update_id(&self) -> UpdateId {
        let mut inner = self.inner.lock();
        if let Some(script) = &mut inner.scripted {
            if let Some(id) = script.pop_front() {
                inner.update_id = id;
            }
        }
        inner.update_id
    }

    fn node_status(&self, node: NodeHandle) -> NodeStatus {
        self.inner
            .lock()
            .nodes
            .iter()
            .find(|(h, _)| *h == node)
            .map(|(_, n)| n.status)
            .unwrap_or(NodeStatus::Invalid)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimTaskConstructor;

impl SimTaskConstructor {
    pub fn new() -> Self {
        Self
    }
}

impl TaskConstructor for SimTaskConstructor {
    type Network = SimNetwork;
    type Task = SimTask;

    fn find_supported_nodes(&self, network: &SimNetwork) -> Vec<NodeHandle> {
        let mut inner = network.inner.lock();
        inner.find_calls += 1;
        inner
            .nodes
            .iter()
            .filter(|(_, n)| n.kind == SimNodeKind::Tracker && n.status != NodeStatus::Invalid)
            .map(|(h, _)| *h)
            .collect()
    }

    fn start_task(
        &self,
        network: &SimNetwork,
        node: NodeHandle,
        environment: &Environment,
    ) -> Result<SimTask> {
        let mut inner = network.inner.lock();
        inner.start_calls += 1;

        if !inner.alive {
            return Err(Error::NetworkDown);
        }
        if inner.fail_starts {
            return Err(Error::TaskRefused(node));
        }

        let sim_node = inner
            .nodes
            .iter_mut()
            .find(|(h, _)| *h == node)
            .map(|(_, n)| n)
            .ok_or(Error::NodeNotFound(node))?;

        if sim_node.kind != SimNodeKind::Tracker {
            return Err(Error::TaskUnsupported(node));
        }
        match sim_node.status {
            NodeStatus::Idle => {}
            NodeStatus::Busy => return Err(Error::NodeBusy(node)),
            NodeStatus::Invalid => return Err(Error::NodeNotFound(node)),
        }

        debug!(
            "starting tracking task on node {node} with {} markers",
            environment.markers.len()
        );

        sim_node.status = NodeStatus::Busy;
        inner.update_id = inner.update_id.wrapping_add(1);
        let finish_after = inner.finish_after;
        inner.tasks.push(TaskRecord::new(node, finish_after));

        Ok(SimTask {
            inner: Arc::clone(&network.inner),
            index: inner.tasks.len() - 1,
            node,
        })
    }
}

pub struct SimTask {
    inner: Arc<Mutex<Inner>>,
    index: usize,
    node: NodeHandle,
}

impl SimTask {
    pub fn node(&self) -> NodeHandle {
        self.node
    }
}

impl TrackingTask for SimTask {
    fn is_finished(&self) -> bool {
        let mut inner = self.inner.lock();
        let record = &mut inner.tasks[self.index];

        if record.finished {
            record.queries_after_finish += 1;
            return true;
        }

        record.finish_polls += 1;
        if record.finish_polls <= record.polls_before_finish {
            return false;
        }

        record.finished = true;
        let node = record.node;
        if let Some((_, n)) = inner.nodes.iter_mut().find(|(h, _)| *h == node) {
            if n.status == NodeStatus::Busy {
                n.status = NodeStatus::Idle;
            }
        }
        inner.update_id = inner.update_id.wrapping_add(1);
        inner.completed += 1;
        if inner.close_after == Some(inner.completed) {
            inner.alive = false;
        }
        true
    }

    fn extrapolated_state(&self, placement: &Placement, horizon_s: f32) -> ExtrapolatedState {
        let mut inner = self.inner.lock();
        let record = &mut inner.tasks[self.index];

        if record.finished {
            record.queries_after_finish += 1;
        }
        let tick = record.state_queries;
        record.state_queries += 1;

        // Rig rides a horizontal circle at head height; extrapolation just
        // advances the same motion by the horizon.
        let t = tick as f32 * SIM_TICK_S + horizon_s;
        let angle = ORBIT_RATE_RAD_S * t;
        let (sin, cos) = angle.sin_cos();

        let position = [
            ORBIT_RADIUS_M * cos + placement.position[0],
            RIG_HEIGHT_M + placement.position[1],
            ORBIT_RADIUS_M * sin + placement.position[2],
        ];
        let rotation = quat_mul(yaw_quat(angle), placement.rotation);
        let velocity = [
            -ORBIT_RADIUS_M * ORBIT_RATE_RAD_S * sin,
            0.0,
            ORBIT_RADIUS_M * ORBIT_RATE_RAD_S * cos,
        ];

        let queries = record.state_queries;
        let stability = if queries <= STABILITY_WARMUP_POLLS {
            Stability {
                stage: StabilityStage::Inertial3Dof,
                value: 0.15 * queries as f32,
            }
        } else {
            Stability {
                stage: StabilityStage::Full6Dof,
                value: 0.97,
            }
        };

        ExtrapolatedState {
            pose: Pose { position, rotation },
            stability,
            velocity,
            local_angular_velocity: [0.0, ORBIT_RATE_RAD_S, 0.0],
        }
    }
}

fn yaw_quat(angle: f32) -> [f32; 4] {
    let half = 0.5 * angle;
    [0.0, half.sin(), 0.0, half.cos()]
}

// Hamilton product, components (x, y, z, w).
fn quat_mul(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [
        a[3] * b[0] + a[0] * b[3] + a[1] * b[2] - a[2] * b[1],
        a[3] * b[1] - a[0] * b[2] + a[1] * b[3] + a[2] * b[0],
        a[3] * b[2] + a[0] * b[1] - a[1] * b[0] + a[2] * b[3],
        a[3] * b[3] - a[0] * b[0] - a[1] * b[1] - a[2] * b[2],
    ]
}
