use crate::error::Result;
use crate::network::{DeviceNetwork, NodeHandle};
use crate::pose::{Environment, ExtrapolatedState, Placement};

/// A tracking task running on one node. The backend destroys the underlying
/// task when it finishes or when its network dies; after `is_finished`
/// returns true the handle must not be queried again.
pub trait TrackingTask {
    fn is_finished(&self) -> bool;

    /// Current tracking solution, forward-projected by `horizon_s` seconds.
    fn extrapolated_state(&self, placement: &Placement, horizon_s: f32) -> ExtrapolatedState;
}

/// Factory for tracking tasks on a given backend.
pub trait TaskConstructor {
    type Network: DeviceNetwork;
    type Task: TrackingTask;

    /// All nodes currently able to run a tracking task, in the backend's
    /// enumeration order, regardless of their status.
    fn find_supported_nodes(&self, network: &Self::Network) -> Vec<NodeHandle>;

    fn start_task(
        &self,
        network: &Self::Network,
        node: NodeHandle,
        environment: &Environment,
    ) -> Result<Self::Task>;
}
